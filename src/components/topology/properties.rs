//! Human-readable projection of node properties for the details panel.

use super::graph::GraphNode;

const MIB: f64 = 1_048_576.0;

/// Legend entries in display order: property key and its caption.
/// Properties without an entry are not shown.
pub const LEGEND: &[(&str, &str)] = &[
	("name", "Name"),
	("node_type", "Type"),
	("ip", "IP"),
	("uris", "URIs"),
	("state", "State"),
	("droplet", "Droplet"),
	("version", "Version"),
	("instance", "Instance"),
	("index", "Index"),
	("host", "Host"),
	("port", "Port"),
	("uptime", "Uptime"),
	("cpu_usage", "CPU"),
	("mem_usage", "Memory used"),
	("mem_quota", "Memory quota"),
	("disk_usage", "Disk used"),
	("disk_quota", "Disk quota"),
	("fds_quota", "FD quota"),
	("Max_memory", "Max memory"),
	("Reserved_memory", "Reserved memory"),
	("Used_memory", "Used memory"),
	("last_seen", "Last seen"),
];

/// A formatted property value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DisplayValue {
	Text(String),
	/// Hyperlinks, one per route.
	Links(Vec<String>),
}

/// One visible row of the details panel.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PropertyRow {
	pub key: String,
	pub label: String,
	pub value: DisplayValue,
}

/// Whole days, hours, minutes and seconds of a duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Uptime {
	pub days: u64,
	pub hours: u64,
	pub minutes: u64,
	pub seconds: u64,
}

impl Uptime {
	/// Splits a number of seconds.
	pub fn from_seconds(total: u64) -> Self {
		Self {
			days: total / 86_400,
			hours: total % 86_400 / 3_600,
			minutes: total % 3_600 / 60,
			seconds: total % 60,
		}
	}
}

fn number(raw: &str) -> Option<f64> {
	raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Applies the registered formatter for `key`; unregistered keys and
/// unparsable numbers pass through unchanged.
pub fn format_property(key: &str, raw: &str) -> DisplayValue {
	let formatted = match key {
		"cpu_usage" => number(raw).map(|v| format!("{v:.4}%")),
		"mem_usage" | "mem_quota" | "disk_usage" | "disk_quota" => {
			number(raw).map(|v| format!("{:.2}MB", v / MIB))
		}
		"Max_memory" | "Reserved_memory" | "Used_memory" => {
			number(raw).map(|v| format!("{v:.2}MB"))
		}
		"uptime" => number(raw).filter(|v| *v >= 0.0).map(|v| {
			let t = Uptime::from_seconds(v as u64);
			format!(
				"{} days, {} hours, {} minutes, {} seconds",
				t.days, t.hours, t.minutes, t.seconds
			)
		}),
		"uris" => {
			return DisplayValue::Links(
				raw.split(',')
					.map(str::trim)
					.filter(|u| !u.is_empty())
					.map(str::to_string)
					.collect(),
			);
		}
		_ => None,
	};
	DisplayValue::Text(formatted.unwrap_or_else(|| raw.to_string()))
}

/// Rows for the details panel, in legend order. The node's type is always
/// listed and a missing `name` falls back to its IP, then its id.
pub fn display_rows(node: &GraphNode) -> Vec<PropertyRow> {
	let fallback_name = node
		.property("ip")
		.filter(|ip| !ip.is_empty())
		.unwrap_or(node.id.as_str());

	LEGEND
		.iter()
		.filter_map(|&(key, label)| {
			let raw = match key {
				"node_type" => node.kind.as_str(),
				"name" => node
					.property("name")
					.filter(|n| !n.is_empty())
					.unwrap_or(fallback_name),
				_ => node.property(key)?,
			};
			Some(PropertyRow {
				key: key.to_string(),
				label: label.to_string(),
				value: format_property(key, raw),
			})
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::components::topology::types::NodeKind;

	fn text(s: &str) -> DisplayValue {
		DisplayValue::Text(s.to_string())
	}

	#[test]
	fn formats_sizes_and_cpu() {
		assert_eq!(format_property("mem_usage", "1048576"), text("1.00MB"));
		assert_eq!(format_property("disk_quota", "2097152"), text("2.00MB"));
		assert_eq!(format_property("cpu_usage", "0.5"), text("0.5000%"));
		assert_eq!(format_property("Used_memory", "512"), text("512.00MB"));
	}

	#[test]
	fn formats_uptime() {
		assert_eq!(
			format_property("uptime", "90061"),
			text("1 days, 1 hours, 1 minutes, 1 seconds")
		);
		assert_eq!(
			Uptime::from_seconds(59),
			Uptime {
				days: 0,
				hours: 0,
				minutes: 0,
				seconds: 59
			}
		);
	}

	#[test]
	fn uris_become_links() {
		assert_eq!(
			format_property("uris", "a.example.com, b.example.com"),
			DisplayValue::Links(vec!["a.example.com".into(), "b.example.com".into()])
		);
	}

	#[test]
	fn unknown_or_unparsable_values_pass_through() {
		assert_eq!(format_property("state", "RUNNING"), text("RUNNING"));
		assert_eq!(format_property("mem_usage", "n/a"), text("n/a"));
	}

	#[test]
	fn rows_follow_legend_and_default_name() {
		let mut node = GraphNode::new("dea-7", NodeKind::Agent, "root");
		node.properties.insert("ip".into(), "10.0.0.1".into());
		node.properties.insert("Used_memory".into(), "128".into());
		node.properties.insert("unlisted".into(), "x".into());

		let rows = display_rows(&node);
		let keys: Vec<_> = rows.iter().map(|r| r.key.as_str()).collect();
		assert_eq!(keys, ["name", "node_type", "ip", "Used_memory"]);
		assert_eq!(rows[0].value, text("10.0.0.1"));
		assert_eq!(rows[1].value, text("agent"));
		assert_eq!(rows[3].value, text("128.00MB"));
	}

	#[test]
	fn name_falls_back_to_id() {
		let node = GraphNode::new("app-3", NodeKind::Instance, "dea");
		assert_eq!(display_rows(&node)[0].value, text("app-3"));
	}
}
