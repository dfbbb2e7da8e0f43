//! Live Cloud Foundry topology visualization.
//!
//! Polls a JSON snapshot of the deployment tree (root, DEA agents and their
//! droplet instances) and keeps a force-directed drawing of it up to date:
//! - Snapshots are flattened into an id-keyed graph and synced incrementally,
//!   so surviving nodes keep their positions across polls
//! - Instances of the same application release are chained by sibling links
//! - One node is selected at a time; the selection auto-advances and its
//!   properties are shown in a details panel
//!
//! # Example
//!
//! ```ignore
//! use cf_topology_graph::{NodeDetailsPanel, PropertyRow, TopologyCanvas, VizConfig};
//!
//! let (details, set_details) = signal(Vec::<PropertyRow>::new());
//! view! {
//!     <TopologyCanvas config=VizConfig::default() set_details=set_details />
//!     <NodeDetailsPanel details=details />
//! }
//! ```

mod cadence;
mod component;
pub mod config;
pub mod flatten;
pub mod graph;
mod layout;
mod panel;
pub mod poll;
mod presence;
pub mod properties;
mod render;
pub mod scale;
pub mod selection;
pub mod siblings;
mod state;
pub mod sync;
pub mod theme;
pub mod types;

pub use component::TopologyCanvas;
pub use config::VizConfig;
pub use flatten::flatten;
pub use graph::{FlatGraph, GraphNode, Link, LinkKind};
pub use panel::NodeDetailsPanel;
pub use properties::PropertyRow;
pub use siblings::{derive_links, sibling_links};
pub use sync::{SyncReport, sync};
pub use theme::Theme;
pub use types::{NodeKind, TreeNode};
