//! Visualization controller.
//!
//! `TopologyState` owns everything the visualization mutates over time: the
//! flat graph, derived links, layout simulation, selection, poll schedule and
//! view interaction. It is created once when the canvas mounts and driven by
//! the animation loop through [`TopologyState::tick`]; snapshots arrive through
//! [`TopologyState::complete_poll`].

use std::f64::consts::PI;

use log::{debug, info, warn};

use super::cadence::Cadence;
use super::config::VizConfig;
use super::flatten::flatten;
use super::graph::{FlatGraph, GraphNode, Link};
use super::layout::LayoutDriver;
use super::poll::{PollError, PollLoop};
use super::presence::Presence;
use super::properties::{PropertyRow, display_rows};
use super::scale::{ScaleConfig, ScaledValues};
use super::selection::Selection;
use super::siblings::derive_links;
use super::sync::{SyncReport, sync};
use super::theme::ReleaseColors;
use super::types::{NodeKind, TreeNode};

/// Radius of the ring new graphs are laid out on before the simulation runs.
const SEED_RING: f64 = 100.0;
/// Pointer travel (screen pixels) that turns a press on a node into a drag.
const DRAG_THRESHOLD: f64 = 3.0;

/// Pan and zoom transform applied to the entire graph view.
#[derive(Clone, Debug)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	/// Zoom factor (1.0 = 100%, clamped to 0.1..10.0).
	pub k: f64,
}

impl Default for ViewTransform {
	fn default() -> Self {
		Self {
			x: 0.0,
			y: 0.0,
			k: 1.0,
		}
	}
}

/// A press on a node: a click until it moves, then a drag.
#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub node_id: Option<String>,
	pub moved: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start_x: f64,
	pub node_start_y: f64,
}

/// Tracks an in-progress canvas pan operation.
#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

/// What the animation loop must do after a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickOutcome {
	/// Start a snapshot fetch now.
	pub poll_due: bool,
}

/// Controller for one mounted canvas: graph, layout, selection and polling.
pub struct TopologyState {
	pub graph: FlatGraph,
	pub links: Vec<Link>,
	pub selection: Selection,
	pub poll: PollLoop,
	pub colors: ReleaseColors,
	pub node_presence: Presence,
	pub link_presence: Presence,
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub width: f64,
	pub height: f64,
	layout: LayoutDriver,
	/// Fixed simulation step, independent of the real frame interval.
	frame_dt: f64,
	auto_advance: Cadence,
	installed: bool,
	details_dirty: bool,
}

impl TopologyState {
	/// An empty controller for a canvas of the given size.
	pub fn new(config: &VizConfig, width: f64, height: f64) -> Self {
		Self {
			graph: FlatGraph::default(),
			links: Vec::new(),
			selection: Selection::default(),
			poll: PollLoop::new(config.poll_interval),
			colors: ReleaseColors::default(),
			node_presence: Presence::default(),
			link_presence: Presence::default(),
			transform: ViewTransform::default(),
			drag: DragState::default(),
			pan: PanState::default(),
			width,
			height,
			layout: LayoutDriver::new(config.layout.clone()),
			frame_dt: config.frame_dt,
			auto_advance: Cadence::new(config.auto_advance_interval),
			installed: false,
			details_dirty: false,
		}
	}

	/// Whether the first snapshot has been installed.
	pub fn is_installed(&self) -> bool {
		self.installed
	}

	/// Feeds the outcome of a fetch back into the graph. Failures leave the
	/// graph untouched.
	pub fn complete_poll(&mut self, result: Result<TreeNode, PollError>) {
		match result {
			Ok(tree) => {
				self.poll.record_success();
				self.apply_snapshot(tree);
			}
			Err(err) => self.poll.record_failure(&err),
		}
	}

	/// Installs the first snapshot directly and syncs every later one.
	pub fn apply_snapshot(&mut self, tree: TreeNode) -> Option<SyncReport> {
		let records = flatten(tree);
		let report = if self.installed {
			let report = sync(&mut self.graph, records);
			self.anchor_root();
			debug!(
				"cf-topology: sync +{} ~{} -{} moved {}",
				report.added, report.updated, report.removed, report.reparented
			);
			self.selection.resolve(&self.graph);
			Some(report)
		} else {
			self.install(records);
			None
		};
		self.refresh();
		self.details_dirty = true;
		report
	}

	fn install(&mut self, records: Vec<GraphNode>) {
		self.graph = FlatGraph::from_nodes(records);
		if self.graph.root().is_none() {
			warn!("cf-topology: first snapshot has no root node");
		}

		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		let count = self.graph.len().max(1) as f64;
		for (i, node) in self.graph.iter_mut().enumerate() {
			let angle = i as f64 * 2.0 * PI / count;
			node.x = cx + SEED_RING * angle.cos();
			node.y = cy + SEED_RING * angle.sin();
		}
		self.anchor_root();

		self.selection.initialize(&self.graph);
		self.auto_advance.start();
		self.installed = true;
		info!("cf-topology: installed {} nodes", self.graph.len());
	}

	/// Pins a root that is not yet fixed to the center of the view. A root
	/// that is already fixed keeps its place.
	fn anchor_root(&mut self) {
		let (cx, cy) = (self.width / 2.0, self.height / 2.0);
		if let Some(root) = self.graph.root_mut().filter(|root| !root.fixed) {
			root.fixed = true;
			root.x = cx;
			root.y = cy;
		}
	}

	/// Recomputes links, release colors and presence, and restarts the
	/// simulation when the rendered structure changed.
	fn refresh(&mut self) {
		self.links = derive_links(&self.graph);
		for node in self.graph.iter().filter(|n| n.kind == NodeKind::Instance) {
			self.colors.assign(node);
		}

		let nodes = self.node_presence.observe(self.graph.ids());
		let links = self.link_presence.observe(self.links.iter().map(Link::key));
		if !nodes.is_empty() || !links.is_empty() || self.layout.node_count() != self.graph.len() {
			self.layout.rebuild(&self.graph, &self.links);
			debug!(
				"cf-topology: layout rebuilt, {} nodes {} links",
				self.node_presence.len(),
				self.link_presence.len()
			);
		}
	}

	/// Advances one animation frame. `elapsed` is the wall-clock time since
	/// the previous frame in seconds and drives fades and timers; the layout
	/// always steps by the configured frame delta.
	pub fn tick(&mut self, elapsed: f64) -> TickOutcome {
		let elapsed = elapsed.max(0.0);
		if self.installed {
			self.layout.step(self.frame_dt as f32, &mut self.graph);
		}
		self.node_presence.tick(elapsed);
		self.link_presence.tick(elapsed);

		if self.auto_advance.advance(elapsed) {
			self.selection.select_next(&self.graph);
			self.details_dirty = true;
		}

		TickOutcome {
			poll_due: self.poll.due(elapsed),
		}
	}

	/// The currently selected node, if any.
	pub fn selected(&self) -> Option<&GraphNode> {
		self.selection.node(&self.graph)
	}

	/// Keyboard step forward; restarts the auto-advance period.
	pub fn select_next(&mut self) {
		self.selection.select_next(&self.graph);
		self.after_manual_selection();
	}

	/// Keyboard step back; restarts the auto-advance period.
	pub fn select_previous(&mut self) {
		self.selection.select_previous(&self.graph);
		self.after_manual_selection();
	}

	/// Selects a node by id, as a click does.
	pub fn select_node(&mut self, id: &str) {
		if self.selection.select_explicit(&self.graph, id) {
			self.after_manual_selection();
		}
	}

	fn after_manual_selection(&mut self) {
		self.details_dirty = true;
		if self.installed {
			self.auto_advance.restart();
		}
	}

	/// Detail rows for the selected node, if they changed since last taken.
	pub fn take_details(&mut self) -> Option<Vec<PropertyRow>> {
		if !std::mem::take(&mut self.details_dirty) {
			return None;
		}
		Some(self.selected().map(display_rows).unwrap_or_default())
	}

	/// Converts canvas pixels to layout coordinates.
	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> (f64, f64) {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	/// Topmost node under a screen position.
	pub fn node_at_position(&self, sx: f64, sy: f64, config: &ScaleConfig) -> Option<&str> {
		let (gx, gy) = self.screen_to_graph(sx, sy);
		let scale = ScaledValues::new(config, self.transform.k);
		self.graph
			.iter()
			.filter(|node| {
				let reach = scale.outer_radius(node.kind) + scale.hit_padding;
				(node.x - gx).hypot(node.y - gy) <= reach
			})
			.last()
			.map(|node| node.id.as_str())
	}

	/// Pointer pressed: grabs the node under it, or starts panning.
	pub fn pointer_down(&mut self, x: f64, y: f64, config: &ScaleConfig) {
		let hit = self.node_at_position(x, y, config).map(str::to_string);
		match hit.and_then(|id| self.graph.get(&id)) {
			Some(node) => {
				self.drag = DragState {
					node_id: Some(node.id.clone()),
					moved: false,
					start_x: x,
					start_y: y,
					node_start_x: node.x,
					node_start_y: node.y,
				};
			}
			None => {
				self.pan = PanState {
					active: true,
					start_x: x,
					start_y: y,
					transform_start_x: self.transform.x,
					transform_start_y: self.transform.y,
				};
			}
		}
	}

	/// Pointer moved: drags (and pins) the grabbed node, or pans the view.
	pub fn pointer_move(&mut self, x: f64, y: f64) {
		if let Some(id) = self.drag.node_id.clone() {
			let (dx, dy) = (x - self.drag.start_x, y - self.drag.start_y);
			if !self.drag.moved && dx.hypot(dy) < DRAG_THRESHOLD {
				return;
			}
			self.drag.moved = true;
			let nx = self.drag.node_start_x + dx / self.transform.k;
			let ny = self.drag.node_start_y + dy / self.transform.k;
			if let Some(node) = self.graph.get_mut(&id) {
				node.x = nx;
				node.y = ny;
				node.fixed = true;
			}
			self.layout.place(&id, nx, ny, true);
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (x - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (y - self.pan.start_y);
		}
	}

	/// Pointer released: a press that never moved selects its node.
	pub fn pointer_up(&mut self) {
		let drag = std::mem::take(&mut self.drag);
		if let (Some(id), false) = (drag.node_id, drag.moved) {
			self.select_node(&id);
		}
		self.pan.active = false;
	}

	/// Pointer left the canvas: abandons any press without selecting.
	pub fn pointer_cancel(&mut self) {
		self.drag = DragState::default();
		self.pan.active = false;
	}

	/// Zooms around a screen position; positive `delta_y` zooms out.
	pub fn zoom_at(&mut self, x: f64, y: f64, delta_y: f64) {
		let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
		let new_k = (self.transform.k * factor).clamp(0.1, 10.0);
		let ratio = new_k / self.transform.k;
		self.transform.x = x - (x - self.transform.x) * ratio;
		self.transform.y = y - (y - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Records the new canvas size.
	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}
