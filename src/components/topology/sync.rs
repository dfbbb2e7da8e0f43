//! Incremental reconciliation of a fresh snapshot against the held graph.
//!
//! Nodes that survive a poll keep their identity, position and pin state;
//! only their properties are replaced. New nodes are seeded at their parent's
//! current position so they grow out of it instead of appearing at the origin.

use std::collections::{HashMap, HashSet};

use super::graph::{FlatGraph, GraphNode};

/// Counts of what a sync pass changed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SyncReport {
	pub added: usize,
	pub updated: usize,
	pub removed: usize,
	pub reparented: usize,
}

impl SyncReport {
	/// Whether the set of nodes or their wiring changed.
	pub fn structure_changed(&self) -> bool {
		self.added > 0 || self.removed > 0 || self.reparented > 0
	}
}

/// Reconciles `graph` with the flattened `snapshot`.
pub fn sync(graph: &mut FlatGraph, snapshot: Vec<GraphNode>) -> SyncReport {
	let mut report = SyncReport::default();

	let mut incoming: HashMap<String, GraphNode> = HashMap::with_capacity(snapshot.len());
	let mut order = Vec::with_capacity(snapshot.len());
	for node in snapshot {
		order.push(node.id.clone());
		incoming.insert(node.id.clone(), node);
	}

	let vanished: Vec<String> = graph
		.ids()
		.filter(|id| !incoming.contains_key(*id))
		.map(str::to_string)
		.collect();
	for id in vanished {
		graph.remove(&id);
		report.removed += 1;
	}

	// Walk from the tops of the snapshot so every parent is resolved before
	// its subtree.
	let tops: Vec<String> = order
		.iter()
		.filter(|id| {
			incoming
				.get(*id)
				.is_some_and(|n| !n.has_parent() || !incoming.contains_key(&n.parent))
		})
		.cloned()
		.collect();

	let mut visited = HashSet::with_capacity(order.len());
	for id in &tops {
		add_or_update(graph, &mut incoming, id, &mut visited, &mut report);
	}

	report
}

fn add_or_update(
	graph: &mut FlatGraph,
	incoming: &mut HashMap<String, GraphNode>,
	id: &str,
	visited: &mut HashSet<String>,
	report: &mut SyncReport,
) {
	if !visited.insert(id.to_string()) {
		return;
	}
	let Some(fresh) = incoming.get_mut(id) else {
		return;
	};
	let properties = std::mem::take(&mut fresh.properties);
	let parent = fresh.parent.clone();
	let kind = fresh.kind;
	let children = fresh.children.clone();

	match graph.get_mut(id) {
		Some(existing) => {
			existing.properties = properties;
			report.updated += 1;
			if existing.parent != parent {
				let old_parent = std::mem::replace(&mut existing.parent, parent.clone());
				graph.detach(&old_parent, id);
				report.reparented += 1;
			}
			if !parent.is_empty() {
				graph.attach(&parent, id);
			}
		}
		None => {
			let (x, y) = seed_position(graph, &parent);
			let mut node = GraphNode::new(id, kind, parent.clone());
			node.properties = properties;
			node.x = x;
			node.y = y;
			graph.push(node);
			if !parent.is_empty() {
				graph.attach(&parent, id);
			}
			report.added += 1;
		}
	}

	for child in &children {
		add_or_update(graph, incoming, child, visited, report);
	}
}

/// Parent position, else root position, else the origin.
fn seed_position(graph: &FlatGraph, parent: &str) -> (f64, f64) {
	graph
		.get(parent)
		.or_else(|| graph.root())
		.map(|n| (n.x, n.y))
		.unwrap_or((0.0, 0.0))
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::flatten::flatten;
	use crate::components::topology::types::{NodeKind, TreeNode};

	fn snapshot(json: &str) -> Vec<GraphNode> {
		flatten(serde_json::from_str::<TreeNode>(json).unwrap())
	}

	const ROOT_A_B: &str = r#"{"id":"root","type":"root","children":[
		{"id":"a","type":"agent","parent":"root","properties":{"ip":"10.0.0.1"}},
		{"id":"b","type":"agent","parent":"root","properties":{"ip":"10.0.0.2"}}]}"#;

	fn installed(json: &str) -> FlatGraph {
		let mut graph = FlatGraph::from_nodes(snapshot(json));
		for (i, node) in graph.iter_mut().enumerate() {
			node.x = 10.0 * i as f64;
			node.y = 5.0 + i as f64;
		}
		graph
	}

	#[test]
	fn preserves_identity_and_updates_properties() {
		let mut graph = installed(ROOT_A_B);
		let before: Vec<_> = graph.iter().map(|n| (n.id.clone(), n.x, n.y)).collect();

		let report = sync(
			&mut graph,
			snapshot(
				r#"{"id":"root","type":"root","children":[
				{"id":"a","type":"agent","parent":"root","properties":{"ip":"10.0.0.9"}},
				{"id":"b","type":"agent","parent":"root","properties":{"ip":"10.0.0.2"}}]}"#,
			),
		);

		let after: Vec<_> = graph.iter().map(|n| (n.id.clone(), n.x, n.y)).collect();
		assert_eq!(before, after);
		assert_eq!(graph.get("a").unwrap().property("ip"), Some("10.0.0.9"));
		assert_eq!(graph.get("b").unwrap().property("ip"), Some("10.0.0.2"));
		assert!(!report.structure_changed());
		assert_eq!(report.updated, 3);
	}

	#[test]
	fn adds_and_removes() {
		let mut graph = installed(ROOT_A_B);
		graph.get_mut("root").unwrap().x = 400.0;
		graph.get_mut("root").unwrap().y = 300.0;

		let report = sync(
			&mut graph,
			snapshot(
				r#"{"id":"root","type":"root","children":[
				{"id":"a","type":"agent","parent":"root"},
				{"id":"c","type":"agent","parent":"root"}]}"#,
			),
		);

		let mut ids: Vec<_> = graph.ids().collect();
		ids.sort();
		assert_eq!(ids, ["a", "c", "root"]);
		assert!(graph.iter().all(|n| !n.children.iter().any(|c| c == "b")));

		let c = graph.get("c").unwrap();
		assert_eq!(c.parent, "root");
		assert_eq!((c.x, c.y), (400.0, 300.0));
		assert_eq!(
			graph.get("root").unwrap().children,
			vec!["a".to_string(), "c".to_string()]
		);
		assert_eq!((report.added, report.removed), (1, 1));
	}

	#[test]
	fn applying_same_snapshot_twice_is_stable() {
		let next = r#"{"id":"root","type":"root","children":[
			{"id":"a","type":"agent","parent":"root","children":[
				{"id":"i1","type":"instance","parent":"a"}]},
			{"id":"c","type":"agent","parent":"root"}]}"#;
		let mut graph = installed(ROOT_A_B);

		sync(&mut graph, snapshot(next));
		let once: Vec<_> = graph.iter().cloned().collect();
		let report = sync(&mut graph, snapshot(next));
		let twice: Vec<_> = graph.iter().cloned().collect();

		assert_eq!(once, twice);
		assert!(!report.structure_changed());
	}

	#[test]
	fn new_subtree_is_seeded_from_new_parent() {
		let mut graph = installed(ROOT_A_B);
		graph.get_mut("root").unwrap().x = 50.0;
		graph.get_mut("root").unwrap().y = 60.0;

		sync(
			&mut graph,
			snapshot(
				r#"{"id":"root","type":"root","children":[
				{"id":"a","type":"agent","parent":"root"},
				{"id":"b","type":"agent","parent":"root"},
				{"id":"d","type":"agent","parent":"root","children":[
					{"id":"i9","type":"instance","parent":"d"}]}]}"#,
			),
		);

		let d = graph.get("d").unwrap();
		assert_eq!(d.children, vec!["i9".to_string()]);
		let i9 = graph.get("i9").unwrap();
		assert_eq!((i9.x, i9.y), (50.0, 60.0));
		assert_eq!(i9.kind, NodeKind::Instance);
	}

	#[test]
	fn removing_parent_and_child_together_is_silent() {
		let mut graph = installed(
			r#"{"id":"root","type":"root","children":[
			{"id":"a","type":"agent","parent":"root","children":[
				{"id":"i1","type":"instance","parent":"a"},
				{"id":"i2","type":"instance","parent":"a"}]}]}"#,
		);

		let report = sync(&mut graph, snapshot(r#"{"id":"root","type":"root"}"#));

		assert_eq!(graph.len(), 1);
		assert!(graph.get("root").unwrap().children.is_empty());
		assert_eq!(report.removed, 3);
	}

	#[test]
	fn migrated_instance_moves_between_agents() {
		let mut graph = installed(
			r#"{"id":"root","type":"root","children":[
			{"id":"a","type":"agent","parent":"root","children":[
				{"id":"i1","type":"instance","parent":"a"}]},
			{"id":"b","type":"agent","parent":"root"}]}"#,
		);
		let position = {
			let i1 = graph.get("i1").unwrap();
			(i1.x, i1.y)
		};

		let report = sync(
			&mut graph,
			snapshot(
				r#"{"id":"root","type":"root","children":[
				{"id":"a","type":"agent","parent":"root"},
				{"id":"b","type":"agent","parent":"root","children":[
					{"id":"i1","type":"instance","parent":"b"}]}]}"#,
			),
		);

		assert!(graph.get("a").unwrap().children.is_empty());
		assert_eq!(graph.get("b").unwrap().children, vec!["i1".to_string()]);
		let i1 = graph.get("i1").unwrap();
		assert_eq!(i1.parent, "b");
		assert_eq!((i1.x, i1.y), position);
		assert_eq!(report.reparented, 1);
	}

	#[test]
	fn fixed_root_stays_fixed() {
		let mut graph = installed(ROOT_A_B);
		graph.get_mut("root").unwrap().fixed = true;
		sync(&mut graph, snapshot(ROOT_A_B));
		assert!(graph.get("root").unwrap().fixed);
	}
}
