//! Frame-driven recurring timers.
//!
//! All periodic work (polling, selection auto-advance) is advanced by the
//! wall-clock time between animation frames rather than by separate browser
//! intervals, so a single `tick(elapsed)` drives everything and tests can step
//! time directly.

/// A repeating timer accumulated from frame deltas.
#[derive(Clone, Debug)]
pub struct Cadence {
	period: f64,
	elapsed: f64,
	running: bool,
}

impl Cadence {
	/// A stopped timer firing every `period` seconds once started.
	pub fn new(period: f64) -> Self {
		Self {
			period: period.max(f64::EPSILON),
			elapsed: 0.0,
			running: false,
		}
	}

	/// Starts the period from zero.
	pub fn start(&mut self) {
		self.running = true;
		self.elapsed = 0.0;
	}

	/// Cancels and restarts the period from zero.
	pub fn restart(&mut self) {
		self.start();
	}

	/// Whether the timer has been started.
	pub fn is_running(&self) -> bool {
		self.running
	}

	/// Seconds between firings.
	pub fn period(&self) -> f64 {
		self.period
	}

	/// Advances by `dt` seconds; true when the period elapsed. A long frame
	/// fires at most once.
	pub fn advance(&mut self, dt: f64) -> bool {
		if !self.running {
			return false;
		}
		self.elapsed += dt;
		if self.elapsed >= self.period {
			self.elapsed %= self.period;
			true
		} else {
			false
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn stopped_timer_never_fires() {
		let mut c = Cadence::new(1.0);
		assert!(!c.advance(5.0));
	}

	#[test]
	fn fires_once_per_period() {
		let mut c = Cadence::new(1.0);
		c.start();
		let fired = (0..10).filter(|_| c.advance(0.25)).count();
		assert_eq!(fired, 2);
	}

	#[test]
	fn restart_resets_progress() {
		let mut c = Cadence::new(1.0);
		c.start();
		assert!(!c.advance(0.9));
		c.restart();
		assert!(!c.advance(0.9));
		assert!(c.advance(0.2));
	}

	#[test]
	fn long_frame_fires_once() {
		let mut c = Cadence::new(0.5);
		c.start();
		assert!(c.advance(3.2));
		assert!(!c.advance(0.1));
	}
}
