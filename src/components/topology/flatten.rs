//! Tree to flat record conversion.

use super::graph::GraphNode;
use super::types::TreeNode;

/// Flattens a snapshot tree depth-first, children before their parent.
///
/// Each record carries the ids of its direct children in snapshot order. A
/// nested node with an empty `parent` inherits the id of the node it is
/// nested under.
pub fn flatten(root: TreeNode) -> Vec<GraphNode> {
	let mut out = Vec::new();
	collect(root, "", &mut out);
	out
}

fn collect(tree: TreeNode, enclosing: &str, out: &mut Vec<GraphNode>) {
	let TreeNode {
		id,
		kind,
		parent,
		properties,
		children,
	} = tree;

	let parent = if parent.is_empty() {
		enclosing.to_string()
	} else {
		parent
	};

	let mut node = GraphNode::new(id, kind, parent);
	node.properties = properties;
	node.children = children.iter().map(|c| c.id.clone()).collect();

	for child in children {
		collect(child, &node.id, out);
	}
	out.push(node);
}
