//! Canvas rendering of the topology.
//!
//! Draw order gives the z-ordering:
//! 1. Background (screen space)
//! 2. Links: tree and placement links with arrowheads, sibling links dashed
//!    (world space)
//! 3. Nodes: selection ring, memory pie, body, label
//!
//! Elements that just entered are drawn with their fade-in opacity.

use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use super::graph::{GraphNode, Link, LinkKind};
use super::scale::{ScaleConfig, ScaledValues};
use super::state::TopologyState;
use super::theme::{Color, Theme};
use super::types::NodeKind;

/// Start of a pie in canvas angles (12 o'clock).
const TWELVE_O_CLOCK: f64 = -PI / 2.0;

/// Renders the complete graph to the canvas.
pub fn render(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	config: &ScaleConfig,
	theme: &Theme,
) {
	let scale = ScaledValues::new(config, state.transform.k);

	draw_background(state, ctx, theme);

	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);

	for link in &state.links {
		draw_link(state, ctx, &scale, theme, link);
	}
	let selected = state.selection.id();
	for node in state.graph.iter() {
		draw_node(state, ctx, &scale, theme, node, selected == Some(node.id.as_str()));
	}

	ctx.restore();
	ctx.set_global_alpha(1.0);
}

fn draw_background(state: &TopologyState, ctx: &CanvasRenderingContext2d, theme: &Theme) {
	let background = &theme.background;
	let gradient = background
		.use_gradient
		.then(|| {
			ctx.create_radial_gradient(
				state.width / 2.0,
				state.height / 2.0,
				0.0,
				state.width / 2.0,
				state.height / 2.0,
				state.width.max(state.height) * 0.8,
			)
			.ok()
		})
		.flatten();

	match gradient {
		Some(gradient) => {
			let _ = gradient.add_color_stop(0.0, &background.color_secondary.to_css());
			let _ = gradient.add_color_stop(1.0, &background.color.to_css());
			#[allow(deprecated)]
			ctx.set_fill_style(&gradient);
		}
		None => ctx.set_fill_style_str(&background.color.to_css()),
	}
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
}

fn link_color(state: &TopologyState, theme: &Theme, link: &Link, source: &GraphNode) -> Color {
	match link.kind {
		LinkKind::Sibling => state
			.colors
			.get(source)
			.map(|c| c.darken(0.3))
			.unwrap_or(theme.link.sibling),
		kind => theme.link.color(kind),
	}
}

fn draw_link(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	link: &Link,
) {
	let (Some(source), Some(target)) = (state.graph.get(&link.source), state.graph.get(&link.target))
	else {
		return;
	};
	let (x1, y1, x2, y2) = (source.x, source.y, target.x, target.y);
	let (dx, dy) = (x2 - x1, y2 - y1);
	let dist = dx.hypot(dy);
	let start_gap = scale.outer_radius(source.kind);
	let end_gap = scale.outer_radius(target.kind);
	if dist < start_gap + end_gap + 0.001 {
		return;
	}

	let opacity = state.link_presence.opacity(&link.key());
	let color = link_color(state, theme, link, source);
	let with_arrow = link.kind != LinkKind::Sibling;
	let arrow = if with_arrow { scale.arrow_size } else { 0.0 };
	let (ux, uy) = (dx / dist, dy / dist);

	ctx.set_global_alpha(opacity);
	ctx.set_stroke_style_str(&color.to_css());
	ctx.set_line_width(scale.line_width);

	if link.kind == LinkKind::Sibling {
		let (dash, gap) = scale.sibling_dash;
		let _ = ctx.set_line_dash(&js_sys::Array::of2(
			&JsValue::from_f64(dash),
			&JsValue::from_f64(gap),
		));
	}

	let (sx, sy) = (x1 + ux * start_gap, y1 + uy * start_gap);
	let (ex, ey) = (x2 - ux * (end_gap + arrow), y2 - uy * (end_gap + arrow));
	ctx.begin_path();
	ctx.move_to(sx, sy);
	match link.kind {
		LinkKind::Tree => ctx.line_to(ex, ey),
		LinkKind::Placement | LinkKind::Sibling => {
			// Bend to the right of travel, like a clockwise arc.
			let bend = dist * theme.link.curve_tension * 0.3;
			let (mx, my) = ((x1 + x2) / 2.0 - uy * bend, (y1 + y2) / 2.0 + ux * bend);
			ctx.quadratic_curve_to(mx, my, ex, ey);
		}
	}
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());

	if with_arrow && arrow > 0.0 {
		let (tip_x, tip_y) = (x2 - ux * end_gap, y2 - uy * end_gap);
		let (back_x, back_y) = (tip_x - ux * arrow, tip_y - uy * arrow);
		let (px, py) = (-uy * arrow * 0.5, ux * arrow * 0.5);

		ctx.set_fill_style_str(&color.to_css());
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(back_x + px, back_y + py);
		ctx.line_to(back_x - px, back_y - py);
		ctx.close_path();
		ctx.fill();
	}
}

/// Fraction of the memory quota in use, as whole degrees rounded up.
pub fn memory_sweep(node: &GraphNode) -> Option<f64> {
	let usage: f64 = node.property("mem_usage")?.trim().parse().ok()?;
	let quota: f64 = node.property("mem_quota")?.trim().parse().ok()?;
	if quota <= 0.0 || !usage.is_finite() {
		return None;
	}
	let degrees = (360.0 * usage / quota).ceil().clamp(0.0, 360.0);
	Some(degrees * PI / 180.0)
}

fn draw_node(
	state: &TopologyState,
	ctx: &CanvasRenderingContext2d,
	scale: &ScaledValues,
	theme: &Theme,
	node: &GraphNode,
	selected: bool,
) {
	let (x, y) = (node.x, node.y);
	let radius = scale.node_radius(node.kind);
	let style = &theme.node;
	ctx.set_global_alpha(state.node_presence.opacity(&node.id));

	if selected {
		let (inner, outer) = match node.kind {
			NodeKind::Instance => scale.selector_band,
			_ => (0.0, scale.selector_band.0),
		};
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius + (inner + outer) / 2.0, 0.0, 2.0 * PI);
		ctx.set_stroke_style_str(&style.selector.to_css());
		ctx.set_line_width(outer - inner);
		ctx.stroke();
	}

	if node.kind == NodeKind::Instance {
		if let Some(sweep) = memory_sweep(node) {
			ctx.begin_path();
			ctx.move_to(x, y);
			let _ = ctx.arc(
				x,
				y,
				radius + scale.memory_ring,
				TWELVE_O_CLOCK,
				TWELVE_O_CLOCK + sweep,
			);
			ctx.close_path();
			ctx.set_fill_style_str(&style.memory_ring.to_css());
			ctx.fill();
		}
	}

	let (fill, stroke) = match node.kind {
		NodeKind::Instance => {
			let color = state.colors.get(node).unwrap_or(style.instance);
			(color, color.darken(0.3))
		}
		kind => (style.fill(kind), style.stroke),
	};
	ctx.begin_path();
	let _ = ctx.arc(x, y, radius, 0.0, 2.0 * PI);
	ctx.set_fill_style_str(&fill.to_css());
	ctx.fill();
	ctx.set_stroke_style_str(&stroke.to_css());
	ctx.set_line_width(style.stroke_width / scale.k);
	ctx.stroke();

	let label = match node.kind {
		NodeKind::Instance => node.property("name"),
		NodeKind::Agent => node.property("ip"),
		NodeKind::Root => None,
	};
	if let Some(label) = label.filter(|l| !l.is_empty()) {
		ctx.set_fill_style_str(&style.label.to_css());
		ctx.set_font(&scale.label_font);
		let _ = ctx.fill_text(label, x + scale.label_offset, y + 4.0);
	}
}
