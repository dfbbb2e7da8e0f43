//! Visual theming: colors, the application color ramp and per-release colors.

use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

use super::graph::{GraphNode, LinkKind};
use super::siblings::{APP_KEY, VERSION_KEY};
use super::types::NodeKind;

/// RGBA color representation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
	pub r: u8,
	pub g: u8,
	pub b: u8,
	pub a: f64,
}

impl Color {
	pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
		Self { r, g, b, a: 1.0 }
	}

	pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
		Self { r, g, b, a }
	}

	/// Parses `#rrggbb`.
	pub fn from_hex(hex: &str) -> Option<Self> {
		let digits = hex.strip_prefix('#')?;
		if digits.len() != 6 {
			return None;
		}
		let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
		Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
	}

	/// Same color with another alpha.
	pub fn with_alpha(self, a: f64) -> Self {
		Self { a, ..self }
	}

	/// Darken the color by a factor (0.0 = unchanged, 1.0 = black)
	pub fn darken(self, factor: f64) -> Self {
		let f = 1.0 - factor.clamp(0.0, 1.0);
		Self {
			r: (self.r as f64 * f) as u8,
			g: (self.g as f64 * f) as u8,
			b: (self.b as f64 * f) as u8,
			a: self.a,
		}
	}

	/// Linear interpolation between two colors
	pub fn lerp(self, other: Color, t: f64) -> Self {
		let t = t.clamp(0.0, 1.0);
		let mix = |a: u8, b: u8| (a as f64 * (1.0 - t) + b as f64 * t).round() as u8;
		Self {
			r: mix(self.r, other.r),
			g: mix(self.g, other.g),
			b: mix(self.b, other.b),
			a: self.a * (1.0 - t) + other.a * t,
		}
	}

	/// CSS color string.
	pub fn to_css(self) -> String {
		if (self.a - 1.0).abs() < 0.001 {
			format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
		} else {
			format!("rgba({}, {}, {}, {})", self.r, self.g, self.b, self.a)
		}
	}
}

/// Stops of the application ramp: darkred, orange, lightyellow, lightgreen,
/// deep blue.
pub const RAMP_STOPS: [Color; 5] = [
	Color::rgb(139, 0, 0),
	Color::rgb(255, 165, 0),
	Color::rgb(255, 255, 224),
	Color::rgb(144, 238, 144),
	Color::rgb(0, 68, 153),
];

/// Samples a piecewise-linear ramp through `stops` at `steps` evenly spaced
/// points, both ends included.
pub fn ramp(stops: &[Color], steps: usize) -> Vec<Color> {
	match stops {
		[] => return Vec::new(),
		[only] => return vec![*only; steps],
		_ => {}
	}
	let segments = (stops.len() - 1) as f64;
	(0..steps)
		.map(|i| {
			let t = if steps > 1 {
				i as f64 / (steps - 1) as f64
			} else {
				0.0
			};
			let pos = t * segments;
			let seg = (pos.floor() as usize).min(stops.len() - 2);
			stops[seg].lerp(stops[seg + 1], pos - seg as f64)
		})
		.collect()
}

/// Session-scoped memo of one palette color per application release.
#[derive(Clone, Debug)]
pub struct ReleaseColors {
	palette: Vec<Color>,
	assigned: HashMap<String, Color>,
}

impl ReleaseColors {
	/// Assigns colors from `palette`.
	pub fn new(palette: Vec<Color>) -> Self {
		Self {
			palette,
			assigned: HashMap::new(),
		}
	}

	fn release_key(node: &GraphNode) -> String {
		format!(
			"{}-{}",
			node.property(APP_KEY).unwrap_or_default(),
			node.property(VERSION_KEY).unwrap_or_default()
		)
	}

	/// Color of the node's release, picking and remembering one on first use.
	pub fn assign(&mut self, node: &GraphNode) -> Color {
		let key = Self::release_key(node);
		if let Some(color) = self.assigned.get(&key) {
			return *color;
		}
		let mut hasher = DefaultHasher::new();
		key.hash(&mut hasher);
		let color = match self.palette.len() {
			0 => Color::rgb(128, 128, 128),
			n => self.palette[(hasher.finish() % n as u64) as usize],
		};
		self.assigned.insert(key, color);
		color
	}

	/// Previously assigned color of the node's release.
	pub fn get(&self, node: &GraphNode) -> Option<Color> {
		self.assigned.get(&Self::release_key(node)).copied()
	}

	/// Number of releases seen.
	pub fn len(&self) -> usize {
		self.assigned.len()
	}

	/// Whether no release has a color yet.
	pub fn is_empty(&self) -> bool {
		self.assigned.is_empty()
	}
}

impl Default for ReleaseColors {
	fn default() -> Self {
		Self::new(ramp(&RAMP_STOPS, 100))
	}
}

/// Background style configuration.
#[derive(Clone, Debug)]
pub struct BackgroundStyle {
	pub color: Color,
	/// Center color of the radial gradient.
	pub color_secondary: Color,
	pub use_gradient: bool,
}

/// Per-kind link colors.
#[derive(Clone, Debug)]
pub struct LinkStyle {
	pub tree: Color,
	pub placement: Color,
	/// Used when a sibling link's release has no color yet.
	pub sibling: Color,
	/// Curve tension for curved links (0.0 = straight).
	pub curve_tension: f64,
}

impl LinkStyle {
	/// Stroke color for a link kind.
	pub fn color(&self, kind: LinkKind) -> Color {
		match kind {
			LinkKind::Tree => self.tree,
			LinkKind::Placement => self.placement,
			LinkKind::Sibling => self.sibling,
		}
	}
}

/// Node drawing style.
#[derive(Clone, Debug)]
pub struct NodeStyle {
	pub root: Color,
	pub agent: Color,
	/// Instance fallback when its release has no color yet.
	pub instance: Color,
	pub stroke: Color,
	pub stroke_width: f64,
	/// Memory usage pie behind instances.
	pub memory_ring: Color,
	/// Ring around the selected node.
	pub selector: Color,
	pub label: Color,
}

impl NodeStyle {
	/// Fill color for a node kind.
	pub fn fill(&self, kind: NodeKind) -> Color {
		match kind {
			NodeKind::Root => self.root,
			NodeKind::Agent => self.agent,
			NodeKind::Instance => self.instance,
		}
	}
}

/// Complete visual theme.
#[derive(Clone, Debug)]
pub struct Theme {
	pub background: BackgroundStyle,
	pub link: LinkStyle,
	pub node: NodeStyle,
}

impl Default for Theme {
	fn default() -> Self {
		Self {
			background: BackgroundStyle {
				color: Color::rgb(12, 22, 25),
				color_secondary: Color::rgb(24, 38, 42),
				use_gradient: true,
			},
			link: LinkStyle {
				tree: Color::rgba(140, 160, 180, 0.6),
				placement: Color::rgba(110, 150, 160, 0.5),
				sibling: Color::rgba(200, 200, 200, 0.4),
				curve_tension: 0.6,
			},
			node: NodeStyle {
				root: Color::rgb(220, 220, 220),
				agent: Color::rgb(60, 104, 120),
				instance: Color::rgb(128, 128, 128),
				stroke: Color::rgb(20, 35, 39),
				stroke_width: 1.5,
				memory_ring: Color::rgb(255, 0, 0),
				selector: Color::rgb(34, 150, 21),
				label: Color::rgba(230, 236, 240, 0.9),
			},
		}
	}
}
