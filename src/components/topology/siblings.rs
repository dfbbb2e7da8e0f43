//! Derived links between instances of the same application release.

use std::collections::HashSet;

use super::graph::{FlatGraph, GraphNode, Link};
use super::types::NodeKind;

/// Property holding the application id of an instance.
pub const APP_KEY: &str = "droplet";
/// Property holding the application version.
pub const VERSION_KEY: &str = "version";
/// Property holding the instance index within the application.
pub const INSTANCE_KEY: &str = "instance";

fn is_sibling(a: &GraphNode, b: &GraphNode) -> bool {
	a.property(APP_KEY) == b.property(APP_KEY)
		&& a.property(VERSION_KEY) == b.property(VERSION_KEY)
		&& a.property(INSTANCE_KEY) != b.property(INSTANCE_KEY)
}

/// Links instances that share app id and version but differ in instance index.
///
/// Claiming is greedy: the first unclaimed instance of a release links to every
/// other unclaimed instance of it, so `n` co-located instances produce `n - 1`
/// links rather than every pair.
pub fn sibling_links(graph: &FlatGraph) -> Vec<Link> {
	let instances: Vec<&GraphNode> = graph
		.iter()
		.filter(|n| n.kind == NodeKind::Instance && n.property(APP_KEY).is_some())
		.collect();

	let mut claimed: HashSet<&str> = HashSet::new();
	let mut links = Vec::new();

	for anchor in &instances {
		if !claimed.insert(anchor.id.as_str()) {
			continue;
		}
		for sibling in &instances {
			if claimed.contains(sibling.id.as_str()) || !is_sibling(anchor, sibling) {
				continue;
			}
			claimed.insert(sibling.id.as_str());
			links.push(Link::between(anchor, sibling));
		}
	}

	links
}

/// Hierarchy links followed by sibling links.
pub fn derive_links(graph: &FlatGraph) -> Vec<Link> {
	let mut links = graph.hierarchy_links();
	links.extend(sibling_links(graph));
	links
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::graph::LinkKind;

	fn instance(id: &str, app: &str, version: &str, index: &str) -> GraphNode {
		let mut node = GraphNode::new(id, NodeKind::Instance, "dea");
		node.properties.insert(APP_KEY.into(), app.into());
		node.properties.insert(VERSION_KEY.into(), version.into());
		node.properties.insert(INSTANCE_KEY.into(), index.into());
		node
	}

	#[test]
	fn three_instances_form_two_links() {
		let graph = FlatGraph::from_nodes([
			instance("a0", "app", "v1", "0"),
			instance("a1", "app", "v1", "1"),
			instance("a2", "app", "v1", "2"),
		]);
		let links = sibling_links(&graph);
		let keys: Vec<_> = links.iter().map(Link::key).collect();
		assert_eq!(keys, ["a0-a1", "a0-a2"]);
		assert!(links.iter().all(|l| l.kind == LinkKind::Sibling));
	}

	#[test]
	fn different_versions_do_not_pair() {
		let graph = FlatGraph::from_nodes([
			instance("a0", "app", "v1", "0"),
			instance("a1", "app", "v2", "1"),
			instance("b0", "other", "v1", "1"),
		]);
		assert!(sibling_links(&graph).is_empty());
	}

	#[test]
	fn same_instance_index_does_not_pair() {
		let graph = FlatGraph::from_nodes([
			instance("a0", "app", "v1", "0"),
			instance("a0-dup", "app", "v1", "0"),
		]);
		assert!(sibling_links(&graph).is_empty());
	}

	#[test]
	fn separate_releases_link_independently() {
		let graph = FlatGraph::from_nodes([
			instance("a0", "app", "v1", "0"),
			instance("b0", "blog", "v3", "0"),
			instance("a1", "app", "v1", "1"),
			instance("b1", "blog", "v3", "1"),
		]);
		let keys: Vec<_> = sibling_links(&graph).iter().map(Link::key).collect();
		assert_eq!(keys, ["a0-a1", "b0-b1"]);
	}

	#[test]
	fn agents_and_unlabelled_instances_are_ignored() {
		let mut agent = GraphNode::new("dea", NodeKind::Agent, "root");
		agent.properties.insert(APP_KEY.into(), "app".into());
		let graph = FlatGraph::from_nodes([
			agent,
			GraphNode::new("x", NodeKind::Instance, "dea"),
			GraphNode::new("y", NodeKind::Instance, "dea"),
			instance("a0", "app", "v1", "0"),
		]);
		assert!(sibling_links(&graph).is_empty());
	}
}
