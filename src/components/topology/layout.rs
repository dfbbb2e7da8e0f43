//! Force layout driver.
//!
//! Wraps the `force_graph` simulation. The flat graph stays the authority for
//! positions: the simulation is rebuilt from it whenever the node or link set
//! changes, and every step writes the simulated positions back into it.

use std::collections::{HashMap, HashSet};

use force_graph::{DefaultNodeIdx, EdgeData, ForceGraph, NodeData, SimulationParameters};

use super::config::LayoutParams;
use super::graph::{FlatGraph, Link};
use super::types::NodeKind;

/// Per-node payload carried through the simulation.
#[derive(Clone, Debug, Default)]
pub struct LayoutNode {
	pub id: String,
}

/// Owns the force simulation and the id to simulation index map.
pub struct LayoutDriver {
	params: LayoutParams,
	graph: ForceGraph<LayoutNode, ()>,
	index: HashMap<String, DefaultNodeIdx>,
}

/// Golden angle in radians, spreads stacked nodes on a spiral.
const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

impl LayoutDriver {
	/// An empty simulation with the given tuning.
	pub fn new(params: LayoutParams) -> Self {
		Self {
			graph: Self::simulation(&params),
			params,
			index: HashMap::new(),
		}
	}

	fn simulation(params: &LayoutParams) -> ForceGraph<LayoutNode, ()> {
		ForceGraph::new(SimulationParameters {
			force_charge: params.charge,
			force_spring: params.spring,
			force_max: params.max_force,
			node_speed: params.node_speed,
			damping_factor: params.damping,
		})
	}

	fn mass(&self, kind: NodeKind) -> f32 {
		match kind {
			NodeKind::Agent => self.params.agent_mass,
			NodeKind::Root | NodeKind::Instance => self.params.agent_mass / 3.0,
		}
	}

	/// Nodes in the current simulation.
	pub fn node_count(&self) -> usize {
		self.index.len()
	}

	/// Replaces the simulation with the current nodes and links, starting
	/// every node from its position in `nodes`. Free nodes that share a spot
	/// (new children seeded on their parent) are fanned out slightly so the
	/// simulation can separate them.
	pub fn rebuild(&mut self, nodes: &FlatGraph, links: &[Link]) {
		let mut graph = Self::simulation(&self.params);
		let mut index = HashMap::with_capacity(nodes.len());
		let mut occupied: HashSet<(i64, i64)> = nodes
			.iter()
			.filter(|n| n.fixed)
			.map(|n| cell(n.x, n.y))
			.collect();

		for node in nodes.iter() {
			let (mut x, mut y) = (node.x, node.y);
			if !node.fixed {
				let mut k = 0.0;
				while occupied.contains(&cell(x, y)) {
					k += 1.0;
					let (angle, radius) = (k * GOLDEN_ANGLE, 2.0 * f64::sqrt(k));
					x = node.x + radius * angle.cos();
					y = node.y + radius * angle.sin();
				}
			}
			occupied.insert(cell(x, y));

			let idx = graph.add_node(NodeData {
				x: x as f32,
				y: y as f32,
				mass: self.mass(node.kind),
				is_anchor: node.fixed,
				user_data: LayoutNode {
					id: node.id.clone(),
				},
			});
			index.insert(node.id.clone(), idx);
		}

		for link in links {
			if let (Some(&src), Some(&tgt)) = (index.get(&link.source), index.get(&link.target)) {
				graph.add_edge(src, tgt, EdgeData::default());
			}
		}

		self.graph = graph;
		self.index = index;
	}

	/// Advances the simulation and copies free node positions back.
	pub fn step(&mut self, dt: f32, nodes: &mut FlatGraph) {
		self.graph.update(dt);
		self.graph.visit_nodes(|sim| {
			if let Some(node) = nodes.get_mut(&sim.data.user_data.id) {
				if !node.fixed {
					node.x = sim.x() as f64;
					node.y = sim.y() as f64;
				}
			}
		});
	}

	/// Moves a node inside the simulation, optionally pinning it there.
	pub fn place(&mut self, id: &str, x: f64, y: f64, pinned: bool) {
		let Some(&idx) = self.index.get(id) else {
			return;
		};
		self.graph.visit_nodes_mut(|sim| {
			if sim.index() == idx {
				sim.data.x = x as f32;
				sim.data.y = y as f32;
				sim.data.is_anchor = pinned;
			}
		});
	}
}

fn cell(x: f64, y: f64) -> (i64, i64) {
	((x * 100.0).round() as i64, (y * 100.0).round() as i64)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::graph::GraphNode;
	use crate::components::topology::siblings::derive_links;

	fn star() -> FlatGraph {
		let mut root = GraphNode::new("root", NodeKind::Root, "");
		root.children = vec!["a".into(), "b".into()];
		root.fixed = true;
		root.x = 200.0;
		root.y = 100.0;
		let mut a = GraphNode::new("a", NodeKind::Agent, "root");
		let mut b = GraphNode::new("b", NodeKind::Agent, "root");
		(a.x, a.y) = (200.0, 100.0);
		(b.x, b.y) = (200.0, 100.0);
		FlatGraph::from_nodes([a, b, root])
	}

	#[test]
	fn steps_move_free_nodes_and_keep_anchors() {
		let mut graph = star();
		let links = derive_links(&graph);
		let mut layout = LayoutDriver::new(LayoutParams::default());
		layout.rebuild(&graph, &links);
		assert_eq!(layout.node_count(), 3);

		for _ in 0..30 {
			layout.step(0.016, &mut graph);
		}

		let root = graph.get("root").unwrap();
		assert_eq!((root.x, root.y), (200.0, 100.0));
		let (a, b) = (graph.get("a").unwrap(), graph.get("b").unwrap());
		assert!(a.x.is_finite() && a.y.is_finite());
		assert!((a.x - b.x).abs() + (a.y - b.y).abs() > 0.0);
	}

	#[test]
	fn stacked_nodes_get_distinct_start_cells() {
		let graph = star();
		let mut layout = LayoutDriver::new(LayoutParams::default());
		layout.rebuild(&graph, &[]);
		let mut cells = HashSet::new();
		layout.graph.visit_nodes(|sim| {
			cells.insert(cell(sim.x() as f64, sim.y() as f64));
		});
		assert_eq!(cells.len(), 3);
	}
}
