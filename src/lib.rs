//! cf-topology: live force-directed view of a Cloud Foundry deployment.
//!
//! This crate provides a WASM canvas component that polls a topology snapshot,
//! lays out the root, DEA agents and droplet instances with a force simulation,
//! and cycles a selection whose properties are shown beside the graph.

use leptos::prelude::*;
use leptos_meta::*;
use log::{Level, info, warn};
use wasm_bindgen::JsCast;
use web_sys::{HtmlScriptElement, Window};

pub mod components;

pub use components::topology::{
	NodeDetailsPanel, NodeKind, PropertyRow, TopologyCanvas, TreeNode, VizConfig,
};

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("cf-topology: logging initialized");
}

/// Text of the script element with id="viz-config", if the page has one.
fn config_script_text() -> Option<String> {
	let window: Window = web_sys::window()?;
	let document = window.document()?;
	let element = document.get_element_by_id("viz-config")?;
	let script: HtmlScriptElement = element.dyn_into().ok()?;
	script.text().ok()
}

/// Reads configuration from the page's config script.
/// Missing fields, a missing element or malformed JSON fall back to defaults.
fn load_config() -> VizConfig {
	let Some(text) = config_script_text().filter(|t| !t.trim().is_empty()) else {
		return VizConfig::default();
	};

	match VizConfig::from_json(&text) {
		Ok(config) => {
			info!(
				"cf-topology: polling {} every {}s",
				config.data_url, config.poll_interval
			);
			config
		}
		Err(e) => {
			warn!("cf-topology: failed to parse viz config, using defaults: {}", e);
			VizConfig::default()
		}
	}
}

/// Main application component.
/// Renders the topology canvas with the selected node's details beside it.
#[component]
pub fn App() -> impl IntoView {
	provide_meta_context();

	let config = load_config();
	let (details, set_details) = signal(Vec::<PropertyRow>::new());

	view! {
		<Html attr:lang="en" attr:dir="ltr" attr:data-theme="dark" />
		<Title text="Cloud Foundry Topology" />
		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<div class="fullscreen-graph">
			<TopologyCanvas config=config set_details=set_details fullscreen=true />
			<div class="graph-overlay">
				<h1>"Cloud Foundry"</h1>
				<p class="subtitle">"A / D to step the selection. Click a node to select it. Scroll to zoom."</p>
				<NodeDetailsPanel details=details />
			</div>
		</div>
	}
}
