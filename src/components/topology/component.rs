//! Leptos component wrapping the topology canvas.
//!
//! The component owns a [`TopologyState`] for the lifetime of the canvas. One
//! `requestAnimationFrame` loop drives everything: layout steps, fades, the
//! auto-advance timer and the poll schedule. Timers run on the time between
//! frame timestamps, so they keep wall-clock pace at any refresh rate. Fetches
//! run as spawned futures and hand their result back to the state when they
//! settle.

use std::cell::RefCell;
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use super::config::VizConfig;
use super::poll::fetch_snapshot;
use super::properties::PropertyRow;
use super::render;
use super::scale::ScaleConfig;
use super::state::TopologyState;
use super::theme::Theme;

/// Shared with the animation loop, event handlers and in-flight fetches.
struct GraphContext {
	state: TopologyState,
	scale: ScaleConfig,
	theme: Theme,
}

type SharedContext = Rc<RefCell<Option<GraphContext>>>;

fn viewport(window: &Window) -> (f64, f64) {
	let dim = |v: Result<JsValue, JsValue>, fallback: f64| {
		v.ok().and_then(|v| v.as_f64()).unwrap_or(fallback)
	};
	(dim(window.inner_width(), 800.0), dim(window.inner_height(), 600.0))
}

fn canvas_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Starts a fetch for the next snapshot. The context is only borrowed once
/// the response has settled.
fn spawn_poll(context: SharedContext, url: String) {
	spawn_local(async move {
		let result = fetch_snapshot(&url).await;
		if let Some(ref mut c) = *context.borrow_mut() {
			c.state.complete_poll(result);
		}
	});
}

/// Renders the live topology on a canvas and keeps it in sync with the
/// configured snapshot endpoint.
///
/// Detail rows for the selected node are published through `set_details`
/// whenever the selection or its properties change. Keys `A` and `D` step the
/// selection backwards and forwards.
#[component]
pub fn TopologyCanvas(
	config: VizConfig,
	set_details: WriteSignal<Vec<PropertyRow>>,
	#[prop(default = true)] fullscreen: bool,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let context: SharedContext = Rc::new(RefCell::new(None));
	let animate: Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>> = Rc::new(RefCell::new(None));
	let resize_cb: Rc<RefCell<Option<Closure<dyn FnMut()>>>> = Rc::new(RefCell::new(None));
	let keyup_cb: Rc<RefCell<Option<Closure<dyn FnMut(KeyboardEvent)>>>> =
		Rc::new(RefCell::new(None));
	let (context_init, animate_init, resize_cb_init, keyup_cb_init) = (
		context.clone(),
		animate.clone(),
		resize_cb.clone(),
		keyup_cb.clone(),
	);

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};

		let (w, h) = if fullscreen {
			viewport(&window)
		} else {
			canvas
				.parent_element()
				.map(|p| (p.client_width() as f64, p.client_height() as f64))
				.unwrap_or((800.0, 600.0))
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("cf-topology: canvas has no 2d context");
			return;
		};

		*context_init.borrow_mut() = Some(GraphContext {
			state: TopologyState::new(&config, w, h),
			scale: ScaleConfig::default(),
			theme: Theme::default(),
		});

		if fullscreen {
			let (context_resize, canvas_resize) = (context_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some(win) = web_sys::window() else {
					return;
				};
				let (nw, nh) = viewport(&win);
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut c) = *context_resize.borrow_mut() {
					c.state.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let context_keys = context_init.clone();
		*keyup_cb_init.borrow_mut() = Some(Closure::new(move |ev: KeyboardEvent| {
			if let Some(ref mut c) = *context_keys.borrow_mut() {
				match ev.code().as_str() {
					"KeyA" => c.state.select_previous(),
					"KeyD" => c.state.select_next(),
					_ => {}
				}
			}
		}));
		if let Some(ref cb) = *keyup_cb_init.borrow() {
			let _ = window.add_event_listener_with_callback("keyup", cb.as_ref().unchecked_ref());
		}

		let (context_anim, animate_inner) = (context_init.clone(), animate_init.clone());
		let (first_frame, url) = (config.frame_dt, config.data_url.clone());
		let mut last_timestamp: Option<f64> = None;
		*animate_init.borrow_mut() = Some(Closure::new(move |timestamp: f64| {
			// Frame timestamps are in milliseconds.
			let elapsed = last_timestamp
				.map(|last| (timestamp - last) / 1000.0)
				.unwrap_or(first_frame);
			last_timestamp = Some(timestamp);

			let mut poll_due = false;
			if let Some(ref mut c) = *context_anim.borrow_mut() {
				poll_due = c.state.tick(elapsed).poll_due;
				if let Some(rows) = c.state.take_details() {
					set_details.set(rows);
				}
				render::render(&c.state, &ctx, &c.scale, &c.theme);
			}
			if poll_due {
				spawn_poll(context_anim.clone(), url.clone());
			}
			if let (Some(cb), Some(win)) = (animate_inner.borrow().as_ref(), web_sys::window()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let context_md = context.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		if let Some(ref mut c) = *context_md.borrow_mut() {
			c.state.pointer_down(x, y, &c.scale);
		}
	};

	let context_mm = context.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		if let Some(ref mut c) = *context_mm.borrow_mut() {
			c.state.pointer_move(x, y);
		}
	};

	let context_mu = context.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_mu.borrow_mut() {
			c.state.pointer_up();
		}
	};

	let context_ml = context.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(ref mut c) = *context_ml.borrow_mut() {
			c.state.pointer_cancel();
		}
	};

	let context_wh = context.clone();
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let (x, y) = canvas_point(&canvas.into(), &ev);
		if let Some(ref mut c) = *context_wh.borrow_mut() {
			c.state.zoom_at(x, y, ev.delta_y());
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="topology-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
