//! Flat, id-keyed node arena and the links derived from it.
//!
//! The arena is the only owner of nodes. Parent/child structure is expressed
//! twice, by the `parent` id on each node and by the ordered `children` id list
//! on its parent, and both are kept in step by [`FlatGraph::detach`] and
//! [`FlatGraph::attach`].

use std::collections::HashMap;

use indexmap::IndexMap;

use super::types::NodeKind;

/// A node as held by the visualization.
#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub kind: NodeKind,
	/// Parent id, empty for the root.
	pub parent: String,
	/// Ordered child ids.
	pub children: Vec<String>,
	pub properties: HashMap<String, String>,
	/// Layout position, owned by the simulation.
	pub x: f64,
	pub y: f64,
	/// Pinned nodes are never moved by the simulation.
	pub fixed: bool,
}

impl GraphNode {
	/// A node at the origin with no children or properties.
	pub fn new(id: impl Into<String>, kind: NodeKind, parent: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			kind,
			parent: parent.into(),
			children: Vec::new(),
			properties: HashMap::new(),
			x: 0.0,
			y: 0.0,
			fixed: false,
		}
	}

	/// Raw value of a property.
	pub fn property(&self, key: &str) -> Option<&str> {
		self.properties.get(key).map(String::as_str)
	}

	/// False for the root and for nodes whose parent was never given.
	pub fn has_parent(&self) -> bool {
		!self.parent.is_empty()
	}
}

/// The authoritative ordered collection of all nodes.
#[derive(Clone, Debug, Default)]
pub struct FlatGraph {
	nodes: IndexMap<String, GraphNode>,
}

impl FlatGraph {
	/// Installs flattened records as-is. Later duplicates of an id replace the
	/// earlier record in place.
	pub fn from_nodes(nodes: impl IntoIterator<Item = GraphNode>) -> Self {
		let mut graph = Self::default();
		for node in nodes {
			if graph.nodes.contains_key(&node.id) {
				log::warn!("cf-topology: duplicate node id {} in snapshot", node.id);
			}
			graph.nodes.insert(node.id.clone(), node);
		}
		graph
	}

	/// Number of nodes.
	pub fn len(&self) -> usize {
		self.nodes.len()
	}

	/// Whether there are no nodes.
	pub fn is_empty(&self) -> bool {
		self.nodes.is_empty()
	}

	/// Whether a node with `id` exists.
	pub fn contains(&self, id: &str) -> bool {
		self.nodes.contains_key(id)
	}

	/// Node by id.
	pub fn get(&self, id: &str) -> Option<&GraphNode> {
		self.nodes.get(id)
	}

	/// Mutable node by id.
	pub fn get_mut(&mut self, id: &str) -> Option<&mut GraphNode> {
		self.nodes.get_mut(id)
	}

	/// Node at a position in flat order.
	pub fn at(&self, index: usize) -> Option<&GraphNode> {
		self.nodes.get_index(index).map(|(_, node)| node)
	}

	/// Flat index of a node.
	pub fn position_of(&self, id: &str) -> Option<usize> {
		self.nodes.get_index_of(id)
	}

	/// Nodes in flat order.
	pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
		self.nodes.values()
	}

	/// Mutable nodes in flat order.
	pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GraphNode> {
		self.nodes.values_mut()
	}

	/// Node ids in flat order.
	pub fn ids(&self) -> impl Iterator<Item = &str> {
		self.nodes.keys().map(String::as_str)
	}

	/// The first root node.
	pub fn root(&self) -> Option<&GraphNode> {
		self.nodes.values().find(|n| n.kind == NodeKind::Root)
	}

	/// Mutable access to the first root node.
	pub fn root_mut(&mut self) -> Option<&mut GraphNode> {
		self.nodes.values_mut().find(|n| n.kind == NodeKind::Root)
	}

	/// Appends a node at the end of flat order.
	pub fn push(&mut self, node: GraphNode) {
		self.nodes.insert(node.id.clone(), node);
	}

	/// Adds `child` to the children of `parent` if it is not listed yet.
	/// Returns false when the parent does not exist.
	pub fn attach(&mut self, parent: &str, child: &str) -> bool {
		match self.nodes.get_mut(parent) {
			Some(p) => {
				if !p.children.iter().any(|c| c == child) {
					p.children.push(child.to_string());
				}
				true
			}
			None => false,
		}
	}

	/// Removes `child` from the children of `parent`, if both exist.
	pub fn detach(&mut self, parent: &str, child: &str) {
		if let Some(p) = self.nodes.get_mut(parent) {
			p.children.retain(|c| c != child);
		}
	}

	/// Removes a node and unlinks it from its parent. Remaining nodes keep
	/// their relative order.
	pub fn remove(&mut self, id: &str) -> Option<GraphNode> {
		let node = self.nodes.shift_remove(id)?;
		if node.has_parent() {
			self.detach(&node.parent, id);
		}
		Some(node)
	}

	/// Parent to child links for every child that is still present.
	pub fn hierarchy_links(&self) -> Vec<Link> {
		let mut links = Vec::new();
		for parent in self.nodes.values() {
			for child_id in &parent.children {
				if let Some(child) = self.nodes.get(child_id) {
					links.push(Link::between(parent, child));
				}
			}
		}
		links
	}
}

/// Visual category of a link.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LinkKind {
	/// Root to agent.
	Tree,
	/// Agent to the instances it runs.
	Placement,
	/// Instances of the same application and version.
	Sibling,
}

/// A directed edge between two nodes, by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Link {
	pub source: String,
	pub target: String,
	pub kind: LinkKind,
}

impl Link {
	/// Classifies the link by its end points.
	pub fn between(source: &GraphNode, target: &GraphNode) -> Self {
		let kind = match (source.kind, target.kind) {
			(NodeKind::Instance, NodeKind::Instance) => LinkKind::Sibling,
			(NodeKind::Agent, _) => LinkKind::Placement,
			_ => LinkKind::Tree,
		};
		Self {
			source: source.id.clone(),
			target: target.id.clone(),
			kind,
		}
	}

	/// Render key, `"<sourceId>-<targetId>"`.
	pub fn key(&self) -> String {
		format!("{}-{}", self.source, self.target)
	}
}
