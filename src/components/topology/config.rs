//! Runtime configuration: data source, cadences and layout tuning.

use serde::Deserialize;

/// Force simulation tuning, mapped onto `force_graph::SimulationParameters`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutParams {
	/// Node repulsion strength.
	pub charge: f32,
	/// Link spring constant.
	pub spring: f32,
	/// Upper bound on the force applied per step.
	pub max_force: f32,
	pub node_speed: f32,
	/// Velocity retained between steps (0..1).
	pub damping: f32,
	/// Simulation mass of agents; instances and the root use 1/3 of it.
	pub agent_mass: f32,
}

impl Default for LayoutParams {
	fn default() -> Self {
		Self {
			charge: 300.0,
			spring: 0.05,
			max_force: 100.0,
			node_speed: 3000.0,
			damping: 0.6,
			agent_mass: 30.0,
		}
	}
}

/// Top-level configuration, read from `<script id="viz-config">` when present.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct VizConfig {
	/// Snapshot endpoint, relative to the page.
	pub data_url: String,
	/// Seconds between snapshot polls.
	pub poll_interval: f64,
	/// Seconds between automatic selection advances.
	pub auto_advance_interval: f64,
	/// Fixed simulation step per animation frame, in seconds. Also stands in
	/// for the elapsed time of the very first frame.
	pub frame_dt: f64,
	pub layout: LayoutParams,
}

impl Default for VizConfig {
	fn default() -> Self {
		Self {
			data_url: "data.json".to_string(),
			poll_interval: 2.0,
			auto_advance_interval: 5.0,
			frame_dt: 0.016,
			layout: LayoutParams::default(),
		}
	}
}

impl VizConfig {
	/// Parses a possibly partial JSON config.
	pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
		serde_json::from_str(text)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn partial_config_keeps_defaults() {
		let config =
			VizConfig::from_json(r#"{"poll_interval": 10, "layout": {"damping": 0.3}}"#).unwrap();
		assert_eq!(config.poll_interval, 10.0);
		assert_eq!(config.data_url, "data.json");
		assert_eq!(config.layout.damping, 0.3);
		assert_eq!(config.layout.charge, LayoutParams::default().charge);
	}

	#[test]
	fn empty_object_is_default() {
		assert_eq!(VizConfig::from_json("{}").unwrap(), VizConfig::default());
	}

	#[test]
	fn malformed_config_errors() {
		assert!(VizConfig::from_json(r#"{"poll_interval": "soon"}"#).is_err());
	}
}
