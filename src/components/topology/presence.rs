//! Enter/exit bookkeeping for rendered elements.
//!
//! Every rendered node and link is tracked by its render key (node id, or
//! `"<sourceId>-<targetId>"` for links). Keys that enter start fully
//! transparent and fade in with exponential smoothing; keys that leave are
//! dropped at once.

use std::collections::HashMap;

/// Fade-in speed; higher is faster. At 60fps, 4.0 reaches 95% in ~0.75s.
const FADE_IN_SPEED: f64 = 4.0;

/// Per-key fade-in opacity for rendered nodes or links.
#[derive(Clone, Debug, Default)]
pub struct Presence {
	opacity: HashMap<String, f64>,
}

/// Keys that appeared and disappeared in one [`Presence::observe`] call.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PresenceDiff {
	pub entered: Vec<String>,
	pub exited: Vec<String>,
}

impl PresenceDiff {
	/// Whether nothing changed.
	pub fn is_empty(&self) -> bool {
		self.entered.is_empty() && self.exited.is_empty()
	}
}

impl Presence {
	/// Reconciles the tracked keys with the keys now being rendered.
	pub fn observe<I, S>(&mut self, keys: I) -> PresenceDiff
	where
		I: IntoIterator<Item = S>,
		S: Into<String>,
	{
		let mut current: HashMap<String, f64> = HashMap::new();
		let mut diff = PresenceDiff::default();
		for key in keys {
			let key = key.into();
			let opacity = match self.opacity.remove(&key) {
				Some(opacity) => opacity,
				None => {
					diff.entered.push(key.clone());
					0.0
				}
			};
			current.insert(key, opacity);
		}
		diff.exited = self.opacity.drain().map(|(key, _)| key).collect();
		diff.exited.sort();
		self.opacity = current;
		diff
	}

	/// Fades every tracked key towards full opacity.
	pub fn tick(&mut self, dt: f64) {
		let factor = 1.0 - (-FADE_IN_SPEED * dt).exp();
		for opacity in self.opacity.values_mut() {
			if *opacity < 1.0 {
				*opacity += (1.0 - *opacity) * factor;
				if *opacity > 0.995 {
					*opacity = 1.0;
				}
			}
		}
	}

	/// Current opacity of a key; untracked keys are fully visible.
	pub fn opacity(&self, key: &str) -> f64 {
		self.opacity.get(key).copied().unwrap_or(1.0)
	}

	/// Number of tracked keys.
	pub fn len(&self) -> usize {
		self.opacity.len()
	}

	/// Whether no keys are tracked.
	pub fn is_empty(&self) -> bool {
		self.opacity.is_empty()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn entering_keys_start_transparent_and_fade_in() {
		let mut p = Presence::default();
		let diff = p.observe(["a", "b"]);
		assert_eq!(diff.entered, ["a", "b"]);
		assert_eq!(p.opacity("a"), 0.0);

		p.tick(0.1);
		let mid = p.opacity("a");
		assert!(mid > 0.0 && mid < 1.0);

		for _ in 0..200 {
			p.tick(0.016);
		}
		assert_eq!(p.opacity("a"), 1.0);
	}

	#[test]
	fn surviving_keys_keep_progress_and_exits_are_reported() {
		let mut p = Presence::default();
		p.observe(["a", "b"]);
		p.tick(0.1);
		let a = p.opacity("a");

		let diff = p.observe(["a", "c"]);
		assert_eq!(diff.entered, ["c"]);
		assert_eq!(diff.exited, ["b"]);
		assert_eq!(p.opacity("a"), a);
		assert_eq!(p.len(), 2);
	}

	#[test]
	fn unchanged_keys_produce_empty_diff() {
		let mut p = Presence::default();
		p.observe(["a"]);
		assert!(p.observe(["a"]).is_empty());
	}
}
