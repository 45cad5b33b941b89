use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use leptos::prelude::*;
use log::{debug, error};
use wasm_bindgen::prelude::*;
use web_sys::{
	CanvasRenderingContext2d, HtmlCanvasElement, KeyboardEvent, MouseEvent, WheelEvent, Window,
};

use crate::graph::GraphState;

use super::render;
use super::state::CanvasState;
use super::types::{CanvasConfig, CanvasEvent};

type SharedState = Rc<RefCell<Option<CanvasState>>>;
type SharedClosure = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

fn emit(on_event: Callback<CanvasEvent>, events: Vec<CanvasEvent>) {
	for event in events {
		on_event.run(event);
	}
}

fn local_point(canvas_ref: NodeRef<leptos::html::Canvas>, ev: &MouseEvent) -> Option<(f64, f64)> {
	let canvas: HtmlCanvasElement = canvas_ref.get_untracked()?.into();
	let rect = canvas.get_bounding_client_rect();
	Some((
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	))
}

fn window_size(window: &Window) -> Option<(f64, f64)> {
	Some((
		window.inner_width().ok()?.as_f64()?,
		window.inner_height().ok()?.as_f64()?,
	))
}

/// Run `f` against the canvas state and the current graph, then hand the
/// resulting events to the owner once every borrow is released.
fn with_state(
	state: &SharedState,
	graph: Signal<GraphState>,
	on_event: Callback<CanvasEvent>,
	f: impl FnOnce(&mut CanvasState, &GraphState) -> Vec<CanvasEvent>,
) {
	let events = match state.borrow_mut().as_mut() {
		Some(s) => graph.with_untracked(|g| f(s, g)),
		None => Vec::new(),
	};
	emit(on_event, events);
}

/// Hand the current graph and grid flag to `draw`. Returns `false` once the
/// signals are disposed, which ends the animation loop.
fn draw_frame(
	graph: Signal<GraphState>,
	show_grid: Signal<bool>,
	draw: impl FnOnce(&GraphState, bool),
) -> bool {
	let Some(grid) = show_grid.try_get_untracked() else {
		return false;
	};
	graph.try_with_untracked(|g| draw(g, grid)).is_some()
}

/// Drop the animation and resize closures and detach the resize listener.
fn stop_loop(animate: &SharedClosure, resize_cb: &SharedClosure) {
	if let Some(cb) = resize_cb.borrow_mut().take() {
		if let Some(window) = web_sys::window() {
			let _ = window
				.remove_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}
	}
	animate.borrow_mut().take();
}

/// Interactive canvas drawing an OSINT graph.
///
/// The graph is read-only here: every gesture is reported through
/// `on_event` and only shows up once the owner has applied it.
#[component]
pub fn GraphCanvas(
	#[prop(into)] graph: Signal<GraphState>,
	#[prop(into)] show_grid: Signal<bool>,
	#[prop(into)] on_event: Callback<CanvasEvent>,
	#[prop(optional)] config: CanvasConfig,
	#[prop(default = false)] fullscreen: bool,
	#[prop(default = None)] width: Option<f64>,
	#[prop(default = None)] height: Option<f64>,
) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let config = Rc::new(config);
	let state: SharedState = Rc::new(RefCell::new(None));
	let animate: SharedClosure = Rc::new(RefCell::new(None));
	let resize_cb: SharedClosure = Rc::new(RefCell::new(None));
	let (state_init, animate_init, resize_cb_init, config_init) =
		(state.clone(), animate.clone(), resize_cb.clone(), config.clone());

	// Cleared on unmount; the next frame then tears the loop down.
	let mounted = Arc::new(AtomicBool::new(true));
	let mounted_cleanup = mounted.clone();
	on_cleanup(move || mounted_cleanup.store(false, Ordering::Relaxed));

	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			error!("no window, canvas not started");
			return;
		};

		let (w, h) = if fullscreen {
			window_size(&window).unwrap_or((800.0, 600.0))
		} else {
			(
				width.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_width() as f64)
						.unwrap_or(800.0)
				}),
				height.unwrap_or_else(|| {
					canvas
						.parent_element()
						.map(|p| p.client_height() as f64)
						.unwrap_or(600.0)
				}),
			)
		};
		canvas.set_width(w as u32);
		canvas.set_height(h as u32);

		let ctx: CanvasRenderingContext2d = match canvas.get_context("2d") {
			Ok(Some(ctx)) => match ctx.dyn_into() {
				Ok(ctx) => ctx,
				Err(_) => {
					error!("2d context has an unexpected type");
					return;
				}
			},
			_ => {
				error!("canvas has no 2d context");
				return;
			}
		};
		let mut initial = CanvasState::new(w, h);
		graph.with_untracked(|g| initial.fit_view(g, &config_init));
		*state_init.borrow_mut() = Some(initial);

		if fullscreen {
			let (state_resize, canvas_resize) = (state_init.clone(), canvas.clone());
			*resize_cb_init.borrow_mut() = Some(Closure::new(move || {
				let Some((nw, nh)) = web_sys::window().as_ref().and_then(window_size) else {
					return;
				};
				canvas_resize.set_width(nw as u32);
				canvas_resize.set_height(nh as u32);
				if let Some(ref mut s) = *state_resize.borrow_mut() {
					s.resize(nw, nh);
				}
			}));
			if let Some(ref cb) = *resize_cb_init.borrow() {
				let _ =
					window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
			}
		}

		let (state_anim, animate_inner, resize_inner, config_anim, mounted_anim) = (
			state_init.clone(),
			animate_init.clone(),
			resize_cb_init.clone(),
			config_init.clone(),
			mounted.clone(),
		);
		*animate_init.borrow_mut() = Some(Closure::new(move || {
			let live = mounted_anim.load(Ordering::Relaxed)
				&& match *state_anim.borrow() {
					Some(ref s) => draw_frame(graph, show_grid, |g, grid| {
						render::render(s, g, grid, &config_anim, &ctx)
					}),
					None => true,
				};
			if !live {
				debug!("graph canvas unmounted, render loop stopped");
				stop_loop(&animate_inner, &resize_inner);
				return;
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), animate_inner.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(ref cb) = *animate_init.borrow() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	let state_md = state.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(canvas) = canvas_ref.get_untracked() {
			let _ = canvas.focus();
		}
		with_state(&state_md, graph, on_event, |s, g| s.pointer_down(g, x, y));
	};

	let state_mm = state.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		with_state(&state_mm, graph, on_event, |s, g| s.pointer_move(g, x, y));
	};

	let state_mu = state.clone();
	let on_mouseup = move |ev: MouseEvent| {
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		with_state(&state_mu, graph, on_event, |s, g| s.pointer_up(g, x, y));
	};

	let state_ml = state.clone();
	let on_mouseleave = move |_: MouseEvent| {
		with_state(&state_ml, graph, on_event, |s, _| s.pointer_leave());
	};

	let (state_wh, config_wh) = (state.clone(), config.clone());
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some((x, y)) = local_point(canvas_ref, &ev) else {
			return;
		};
		if let Some(ref mut s) = *state_wh.borrow_mut() {
			let factor = if ev.delta_y() > 0.0 {
				1.0 / config_wh.zoom_step
			} else {
				config_wh.zoom_step
			};
			s.zoom_at(x, y, factor, &config_wh);
		}
	};

	let state_kd = state.clone();
	let on_keydown = move |ev: KeyboardEvent| {
		if !matches!(ev.key().as_str(), "Delete" | "Backspace") {
			return;
		}
		ev.prevent_default();
		with_state(&state_kd, graph, on_event, |s, _| {
			s.delete_selection().into_iter().collect()
		});
	};

	let (state_zi, config_zi) = (state.clone(), config.clone());
	let zoom_in = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zi.borrow_mut() {
			s.zoom_center(config_zi.zoom_step, &config_zi);
		}
	};
	let (state_zo, config_zo) = (state.clone(), config.clone());
	let zoom_out = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_zo.borrow_mut() {
			s.zoom_center(1.0 / config_zo.zoom_step, &config_zo);
		}
	};
	let (state_fit, config_fit) = (state.clone(), config.clone());
	let fit = move |_: MouseEvent| {
		if let Some(ref mut s) = *state_fit.borrow_mut() {
			graph.with_untracked(|g| s.fit_view(g, &config_fit));
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="graph-canvas"
			tabindex="0"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			on:keydown=on_keydown
			style="display: block; cursor: grab; outline: none;"
		/>
		<div class="graph-controls">
			<button title="Zoom in" on:click=zoom_in>"+"</button>
			<button title="Zoom out" on:click=zoom_out>"−"</button>
			<button title="Adatta vista" on:click=fit>"⤢"</button>
		</div>
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn frames_stop_once_signals_are_disposed() {
		let owner = Owner::new();
		let (graph, show_grid) = owner.with(|| {
			(
				Signal::from(RwSignal::new(GraphState::sample())),
				Signal::from(RwSignal::new(false)),
			)
		});

		let mut seen = None;
		assert!(draw_frame(graph, show_grid, |g, grid| seen = Some((g.node_count(), grid))));
		assert_eq!(seen, Some((2, false)));

		drop(owner);
		let mut drawn = false;
		assert!(!draw_frame(graph, show_grid, |_, _| drawn = true));
		assert!(!drawn);
	}
}
