//! Snapshot fetching and the single-flight poll schedule.

use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Response;

use super::cadence::Cadence;
use super::types::TreeNode;

/// Why a poll produced no snapshot. Every variant is retried on the next tick.
#[derive(Debug, Error)]
pub enum PollError {
	#[error("no browser window available")]
	NoWindow,
	#[error("fetch failed: {0}")]
	Fetch(String),
	#[error("server answered with status {0}")]
	Status(u16),
	#[error("malformed snapshot: {0}")]
	Parse(#[from] serde_json::Error),
}

fn js_error(value: JsValue) -> PollError {
	PollError::Fetch(
		value
			.as_string()
			.unwrap_or_else(|| format!("{value:?}")),
	)
}

/// Parses a snapshot body.
pub fn parse_snapshot(text: &str) -> Result<TreeNode, PollError> {
	Ok(serde_json::from_str(text)?)
}

/// Fetches and parses one snapshot from `url`.
pub async fn fetch_snapshot(url: &str) -> Result<TreeNode, PollError> {
	let window = web_sys::window().ok_or(PollError::NoWindow)?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(js_error)?
		.dyn_into()
		.map_err(js_error)?;
	if !response.ok() {
		return Err(PollError::Status(response.status()));
	}
	let body = JsFuture::from(response.text().map_err(js_error)?)
		.await
		.map_err(js_error)?;
	let text = body
		.as_string()
		.ok_or_else(|| PollError::Fetch("response body is not text".to_string()))?;
	parse_snapshot(&text)
}

/// Poll schedule. The first poll is due immediately; later polls are due once
/// per period, and a due tick is skipped while a fetch is still in flight.
#[derive(Clone, Debug)]
pub struct PollLoop {
	cadence: Cadence,
	in_flight: bool,
	pending_first: bool,
	pub completed: u64,
	pub failed: u64,
	pub skipped: u64,
	pub last_error: Option<String>,
}

impl PollLoop {
	/// A schedule whose first poll is due at once.
	pub fn new(period: f64) -> Self {
		let mut cadence = Cadence::new(period);
		cadence.start();
		Self {
			cadence,
			in_flight: false,
			pending_first: true,
			completed: 0,
			failed: 0,
			skipped: 0,
			last_error: None,
		}
	}

	/// Whether a fetch has not settled yet.
	pub fn in_flight(&self) -> bool {
		self.in_flight
	}

	/// Advances the schedule; true means the caller should start a fetch now.
	pub fn due(&mut self, dt: f64) -> bool {
		let fire = self.cadence.advance(dt) || std::mem::take(&mut self.pending_first);
		if !fire {
			return false;
		}
		if self.in_flight {
			self.skipped += 1;
			log::debug!("cf-topology: poll still in flight, skipping tick");
			return false;
		}
		self.in_flight = true;
		true
	}

	/// Marks the in-flight fetch as applied.
	pub fn record_success(&mut self) {
		self.in_flight = false;
		self.completed += 1;
		self.last_error = None;
	}

	/// Marks the in-flight fetch as failed and logs it.
	pub fn record_failure(&mut self, error: &PollError) {
		self.in_flight = false;
		self.failed += 1;
		self.last_error = Some(error.to_string());
		log::warn!("cf-topology: poll failed, retrying next tick: {error}");
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn first_poll_is_immediate() {
		let mut poll = PollLoop::new(2.0);
		assert!(poll.due(0.0));
		assert!(poll.in_flight());
	}

	#[test]
	fn overlapping_ticks_are_skipped() {
		let mut poll = PollLoop::new(1.0);
		assert!(poll.due(0.0));
		assert!(!poll.due(1.0));
		assert_eq!(poll.skipped, 1);
		poll.record_success();
		assert!(!poll.due(0.5));
		assert!(poll.due(0.5));
	}

	#[test]
	fn failure_clears_in_flight_and_records_error() {
		let mut poll = PollLoop::new(1.0);
		assert!(poll.due(0.0));
		let err = parse_snapshot("{not json").unwrap_err();
		poll.record_failure(&err);
		assert!(!poll.in_flight());
		assert_eq!(poll.failed, 1);
		assert!(poll.last_error.as_deref().unwrap().starts_with("malformed snapshot"));
		assert!(poll.due(1.0));
		poll.record_success();
		assert_eq!(poll.last_error, None);
	}

	#[test]
	fn parse_snapshot_reads_tree() {
		let tree = parse_snapshot(r#"{"id":"root","type":"root","children":[]}"#).unwrap();
		assert_eq!(tree.id, "root");
		assert!(matches!(parse_snapshot("[]"), Err(PollError::Parse(_))));
	}
}
