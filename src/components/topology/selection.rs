//! Selected-node tracking and keyboard-style navigation over the flat graph.
//!
//! Navigation walks flat-graph order, but the selection itself is remembered by
//! node id and re-resolved after every sync, so inserts and removals elsewhere
//! in the graph do not silently move it to a different node. The root is never
//! shown; stepping onto it keeps stepping in the same direction.

use super::graph::{FlatGraph, GraphNode};
use super::types::NodeKind;

/// Index after `index`, wrapping to 0 past the end.
pub fn next_index(index: usize, len: usize) -> usize {
	if len == 0 || index + 1 >= len {
		0
	} else {
		index + 1
	}
}

/// Index before `index`, wrapping to the last slot below 0.
pub fn previous_index(index: usize, len: usize) -> usize {
	if len == 0 {
		0
	} else if index == 0 || index >= len {
		len - 1
	} else {
		index - 1
	}
}

/// The selected node, by flat index and by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Selection {
	index: usize,
	id: Option<String>,
}

impl Selection {
	/// Position of the selection in flat order.
	pub fn index(&self) -> usize {
		self.index
	}

	/// Id of the selected node.
	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	/// The selected node, looked up in `graph`.
	pub fn node<'a>(&self, graph: &'a FlatGraph) -> Option<&'a GraphNode> {
		self.id.as_deref().and_then(|id| graph.get(id))
	}

	/// Selects the first slot (or the first non-root node after it).
	pub fn initialize(&mut self, graph: &FlatGraph) {
		self.land(graph, 0);
	}

	/// Moves to the next non-root node, wrapping at the end.
	pub fn select_next(&mut self, graph: &FlatGraph) {
		self.step(graph, next_index);
	}

	/// Moves to the previous non-root node, wrapping below the first slot.
	pub fn select_previous(&mut self, graph: &FlatGraph) {
		self.step(graph, previous_index);
	}

	/// Selects the node with `id`; selecting the root moves on to the next
	/// node instead. Returns false for unknown ids.
	pub fn select_explicit(&mut self, graph: &FlatGraph, id: &str) -> bool {
		match graph.position_of(id) {
			Some(index) => {
				self.land(graph, index);
				true
			}
			None => false,
		}
	}

	/// Re-anchors the selection after the graph changed. A selection whose
	/// node vanished falls back to whatever now occupies its old slot.
	pub fn resolve(&mut self, graph: &FlatGraph) {
		if let Some(index) = self.id.as_deref().and_then(|id| graph.position_of(id)) {
			self.index = index;
			return;
		}
		if graph.is_empty() {
			*self = Self::default();
			return;
		}
		self.land(graph, self.index.min(graph.len() - 1));
	}

	fn land(&mut self, graph: &FlatGraph, index: usize) {
		self.index = index;
		match graph.at(index) {
			Some(node) if node.kind != NodeKind::Root => self.id = Some(node.id.clone()),
			_ => self.select_next(graph),
		}
	}

	fn step(&mut self, graph: &FlatGraph, advance: fn(usize, usize) -> usize) {
		let len = graph.len();
		let mut index = self.index;
		for _ in 0..len {
			index = advance(index, len);
			if let Some(node) = graph.at(index) {
				if node.kind != NodeKind::Root {
					self.index = index;
					self.id = Some(node.id.clone());
					return;
				}
			}
		}
		self.index = index;
		self.id = None;
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	/// Flattener order: instances, agent, root last.
	fn graph() -> FlatGraph {
		let mut root = GraphNode::new("root", NodeKind::Root, "");
		root.children = vec!["d1".into()];
		let mut d1 = GraphNode::new("d1", NodeKind::Agent, "root");
		d1.children = vec!["i1".into(), "i2".into()];
		FlatGraph::from_nodes([
			GraphNode::new("i1", NodeKind::Instance, "d1"),
			GraphNode::new("i2", NodeKind::Instance, "d1"),
			d1,
			root,
		])
	}

	#[test]
	fn indices_wrap_at_both_ends() {
		let m = 7;
		assert_eq!(next_index(m - 1, m), 0);
		assert_eq!(previous_index(0, m), m - 1);
		assert_eq!(next_index(2, m), 3);
		assert_eq!(previous_index(3, m), 2);
	}

	#[test]
	fn next_wraps_past_the_root() {
		let g = graph();
		let mut s = Selection::default();
		s.select_explicit(&g, "d1");
		s.select_next(&g);
		assert_eq!((s.index(), s.id()), (0, Some("i1")));
	}

	#[test]
	fn previous_wraps_past_the_root() {
		let g = graph();
		let mut s = Selection::default();
		s.initialize(&g);
		assert_eq!(s.id(), Some("i1"));
		s.select_previous(&g);
		assert_eq!((s.index(), s.id()), (2, Some("d1")));
	}

	#[test]
	fn previous_from_first_slot_never_stays_on_it() {
		// The root is last in flat order, so wrapping back from slot 0 skips
		// it and lands one further back, at len - 2.
		let g = graph();
		let mut s = Selection::default();
		s.initialize(&g);
		assert_eq!(s.index(), 0);

		s.select_previous(&g);
		assert_eq!(s.index(), g.len() - 2);
		assert_ne!(s.index(), 0);
		assert_ne!(s.node(&g).map(|n| n.kind), Some(NodeKind::Root));

		s.select_previous(&g);
		assert_eq!((s.index(), s.id()), (1, Some("i2")));
	}

	#[test]
	fn explicit_root_falls_through_to_next() {
		let g = graph();
		let mut s = Selection::default();
		assert!(s.select_explicit(&g, "root"));
		assert_eq!(s.id(), Some("i1"));
		assert!(!s.select_explicit(&g, "missing"));
		assert_eq!(s.id(), Some("i1"));
	}

	#[test]
	fn selection_follows_its_node_across_removals() {
		let mut g = graph();
		let mut s = Selection::default();
		s.select_explicit(&g, "i2");
		assert_eq!(s.index(), 1);

		g.remove("i1");
		// A bare index would now point at d1.
		assert_eq!(g.at(s.index()).map(|n| n.id.as_str()), Some("d1"));

		s.resolve(&g);
		assert_eq!((s.index(), s.id()), (0, Some("i2")));
	}

	#[test]
	fn vanished_selection_takes_the_node_in_its_slot() {
		let mut g = graph();
		let mut s = Selection::default();
		s.select_explicit(&g, "i1");
		g.remove("i1");
		s.resolve(&g);
		assert_eq!((s.index(), s.id()), (0, Some("i2")));
	}

	#[test]
	fn vanished_selection_past_the_end_skips_root() {
		let g = FlatGraph::from_nodes([GraphNode::new("root", NodeKind::Root, "")]);
		let mut s = Selection::default();
		s.resolve(&g);
		assert_eq!(s.id(), None);

		let mut g = graph();
		s.select_explicit(&g, "d1");
		g.remove("d1");
		g.remove("i2");
		// [i1, root]: old slot 2 clamps onto the root, which is skipped.
		s.resolve(&g);
		assert_eq!(s.id(), Some("i1"));
	}

	#[test]
	fn empty_graph_clears_selection() {
		let mut s = Selection::default();
		s.select_explicit(&graph(), "i2");
		s.resolve(&FlatGraph::default());
		assert_eq!(s, Selection::default());
		s.select_next(&FlatGraph::default());
		assert_eq!(s.id(), None);
	}
}
