//! Snapshot data structures as served by the `data.json` endpoint.

use std::collections::HashMap;
use std::fmt;

use serde::Deserialize;

/// Role of a node in the platform topology.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
	/// The single anchor representing the whole platform.
	Root,
	/// Execution agent (DEA) hosting application instances.
	#[serde(alias = "dea")]
	Agent,
	/// One running copy of a deployed application (droplet).
	#[serde(alias = "droplet")]
	Instance,
}

impl NodeKind {
	/// Wire name of the kind.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Root => "root",
			NodeKind::Agent => "agent",
			NodeKind::Instance => "instance",
		}
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// One node of the nested snapshot tree.
#[derive(Clone, Debug, Deserialize)]
pub struct TreeNode {
	/// Stable identifier across polls.
	pub id: String,
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Parent id, empty for the root.
	#[serde(default)]
	pub parent: String,
	/// Free-form metrics (memory, disk, cpu, uptime, uris, ...).
	#[serde(default, deserialize_with = "nullable")]
	pub properties: HashMap<String, String>,
	/// Nested children. The server emits `null` for leaves.
	#[serde(default, deserialize_with = "nullable")]
	pub children: Vec<TreeNode>,
}

/// Treats an explicit JSON `null` like a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
	D: serde::Deserializer<'de>,
	T: Default + Deserialize<'de>,
{
	Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
