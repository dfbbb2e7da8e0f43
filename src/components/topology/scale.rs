//! Zoom-dependent sizing of nodes, links and labels.
//!
//! Sizes are given in world units (the layout's coordinate space) or screen
//! pixels. [`ScaledValues`] turns them into world-space values for the current
//! zoom level `k`, ready to use after the canvas transform is applied.

use super::types::NodeKind;

/// How a size reacts to zoom.
#[derive(Clone, Debug)]
#[allow(
	dead_code,
	reason = "World/Screen complete the API for callers customizing ScaleConfig"
)]
pub enum ScaleBehavior {
	/// Constant world-space size. Appears larger when zoomed in.
	World,
	/// Constant screen-space size (pixels).
	Screen,
	/// World-space size whose on-screen size is clamped to the given pixels.
	Clamped { min_screen: f64, max_screen: f64 },
}

impl ScaleBehavior {
	/// World-space value for `base` at zoom `k`.
	pub fn apply(&self, base: f64, k: f64) -> f64 {
		match self {
			ScaleBehavior::World => base,
			ScaleBehavior::Screen => base / k,
			ScaleBehavior::Clamped {
				min_screen,
				max_screen,
			} => base.clamp(min_screen / k, max_screen / k),
		}
	}
}

/// Node sizing, in world units unless noted.
#[derive(Clone, Debug)]
pub struct NodeScaleConfig {
	pub root_radius: f64,
	pub agent_radius: f64,
	pub instance_radius: f64,
	pub radius_behavior: ScaleBehavior,
	/// Extra hit-test margin around a node, in screen pixels.
	pub hit_padding: f64,
	/// Memory pie extends this far past an instance's edge.
	pub memory_ring: f64,
	/// Selection ring band (inner offset, outer offset) past a node's edge.
	pub selector_band: (f64, f64),
	/// Label font size in screen pixels.
	pub label_size: f64,
	/// Labels stop shrinking below this zoom.
	pub label_min_k: f64,
	/// Horizontal label offset from the node center.
	pub label_offset: f64,
}

/// Link sizing.
#[derive(Clone, Debug)]
pub struct LinkScaleConfig {
	/// Line width in screen pixels.
	pub line_width: f64,
	pub arrow_size: f64,
	pub arrow_behavior: ScaleBehavior,
	/// Sibling link dash and gap, in screen pixels.
	pub sibling_dash: (f64, f64),
}

#[derive(Clone, Debug)]
pub struct ScaleConfig {
	pub node: NodeScaleConfig,
	pub link: LinkScaleConfig,
}

impl ScaleConfig {
	/// Unscaled radius for a node kind.
	pub fn base_radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Root => self.node.root_radius,
			NodeKind::Agent => self.node.agent_radius,
			NodeKind::Instance => self.node.instance_radius,
		}
	}
}

impl Default for ScaleConfig {
	fn default() -> Self {
		Self {
			node: NodeScaleConfig {
				root_radius: 2.0,
				agent_radius: 15.0,
				instance_radius: 10.0,
				radius_behavior: ScaleBehavior::Clamped {
					min_screen: 2.0,
					max_screen: f64::INFINITY,
				},
				hit_padding: 4.0,
				memory_ring: 4.0,
				selector_band: (4.0, 8.0),
				label_size: 11.0,
				label_min_k: 0.5,
				label_offset: 20.0,
			},
			link: LinkScaleConfig {
				line_width: 1.5,
				arrow_size: 7.0,
				arrow_behavior: ScaleBehavior::Clamped {
					min_screen: 0.0,
					max_screen: 14.0,
				},
				sibling_dash: (4.0, 3.0),
			},
		}
	}
}

/// Scale values for one frame at zoom `k`.
#[derive(Clone, Debug)]
pub struct ScaledValues {
	pub k: f64,
	radius: [f64; 3],
	pub hit_padding: f64,
	pub memory_ring: f64,
	pub selector_band: (f64, f64),
	pub label_font: String,
	pub label_offset: f64,
	pub line_width: f64,
	pub arrow_size: f64,
	pub sibling_dash: (f64, f64),
}

impl ScaledValues {
	/// Resolves every size for zoom `k`.
	pub fn new(config: &ScaleConfig, k: f64) -> Self {
		let radius = |kind| config.node.radius_behavior.apply(config.base_radius(kind), k);
		let label_size = config.node.label_size / k.max(config.node.label_min_k);
		Self {
			k,
			radius: [
				radius(NodeKind::Root),
				radius(NodeKind::Agent),
				radius(NodeKind::Instance),
			],
			hit_padding: config.node.hit_padding / k,
			memory_ring: config.node.memory_ring,
			selector_band: config.node.selector_band,
			label_font: format!("{label_size}px sans-serif"),
			label_offset: config.node.label_offset,
			line_width: config.link.line_width / k,
			arrow_size: config.link.arrow_behavior.apply(config.link.arrow_size, k),
			sibling_dash: (config.link.sibling_dash.0 / k, config.link.sibling_dash.1 / k),
		}
	}

	/// Body radius for a node kind.
	pub fn node_radius(&self, kind: NodeKind) -> f64 {
		match kind {
			NodeKind::Root => self.radius[0],
			NodeKind::Agent => self.radius[1],
			NodeKind::Instance => self.radius[2],
		}
	}

	/// Radius used for hit testing and link end points.
	pub fn outer_radius(&self, kind: NodeKind) -> f64 {
		let band = if kind == NodeKind::Instance {
			self.memory_ring
		} else {
			0.0
		};
		self.node_radius(kind) + band
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn clamped_radius_never_drops_below_screen_minimum() {
		let config = ScaleConfig::default();
		let far = ScaledValues::new(&config, 0.125);
		// 2px on screen at k=0.125 is 16 world units.
		assert_eq!(far.node_radius(NodeKind::Root), 16.0);
		assert_eq!(far.node_radius(NodeKind::Agent), 16.0);

		let near = ScaledValues::new(&config, 2.0);
		assert_eq!(near.node_radius(NodeKind::Agent), 15.0);
	}

	#[test]
	fn instances_reserve_room_for_memory_ring() {
		let scaled = ScaledValues::new(&ScaleConfig::default(), 1.0);
		assert_eq!(scaled.outer_radius(NodeKind::Instance), 14.0);
		assert_eq!(scaled.outer_radius(NodeKind::Agent), 15.0);
	}

	#[test]
	fn screen_behavior_counteracts_zoom() {
		assert_eq!(ScaleBehavior::Screen.apply(10.0, 2.0), 5.0);
		assert_eq!(ScaleBehavior::World.apply(10.0, 2.0), 10.0);
	}
}
