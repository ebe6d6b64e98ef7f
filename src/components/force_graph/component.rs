use std::cell::{Cell, RefCell};
use std::rc::Rc;

use leptos::prelude::*;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, MouseEvent, WheelEvent};

use super::render;
use super::state::GraphView;
use super::types::GraphData;

type Callback = Rc<RefCell<Option<Closure<dyn FnMut()>>>>;

const FALLBACK_SIZE: (f64, f64) = (800.0, 600.0);

/// Size the canvas to its container.
fn fit(canvas: &HtmlCanvasElement) -> (f64, f64) {
	let (w, h) = canvas
		.parent_element()
		.map(|p| (p.client_width() as f64, p.client_height() as f64))
		.filter(|&(w, h)| w > 0.0 && h > 0.0)
		.unwrap_or(FALLBACK_SIZE);
	canvas.set_width(w as u32);
	canvas.set_height(h as u32);
	(w, h)
}

fn local_point(canvas: &HtmlCanvasElement, ev: &MouseEvent) -> (f64, f64) {
	let rect = canvas.get_bounding_client_rect();
	(
		ev.client_x() as f64 - rect.left(),
		ev.client_y() as f64 - rect.top(),
	)
}

/// Canvas showing `data` as a force-directed tree; blank while `data` is `None`.
#[component]
pub fn ForceGraphCanvas(#[prop(into)] data: Signal<Option<GraphData>>) -> impl IntoView {
	let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
	let view: Rc<RefCell<Option<GraphView>>> = Rc::new(RefCell::new(None));
	let size = Rc::new(Cell::new(FALLBACK_SIZE));
	let frame: Callback = Rc::new(RefCell::new(None));
	let on_resize: Callback = Rc::new(RefCell::new(None));

	// Animation loop and resize handling, installed once the canvas exists.
	let (view_loop, size_loop) = (view.clone(), size.clone());
	Effect::new(move |_| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		if frame.borrow().is_some() {
			return;
		}
		let canvas: HtmlCanvasElement = canvas.into();
		let Some(window) = web_sys::window() else {
			return;
		};
		let Some(ctx) = canvas
			.get_context("2d")
			.ok()
			.flatten()
			.and_then(|c| c.dyn_into::<CanvasRenderingContext2d>().ok())
		else {
			log::error!("2d canvas context unavailable");
			return;
		};
		size_loop.set(fit(&canvas));

		let (view_resize, size_resize, canvas_resize) =
			(view_loop.clone(), size_loop.clone(), canvas.clone());
		*on_resize.borrow_mut() = Some(Closure::new(move || {
			let (w, h) = fit(&canvas_resize);
			size_resize.set((w, h));
			if let Some(v) = view_resize.borrow_mut().as_mut() {
				v.resize(w, h);
			}
		}));
		if let Some(cb) = on_resize.borrow().as_ref() {
			let _ = window.add_event_listener_with_callback("resize", cb.as_ref().unchecked_ref());
		}

		let (view_frame, size_frame, next) = (view_loop.clone(), size_loop.clone(), frame.clone());
		*frame.borrow_mut() = Some(Closure::new(move || {
			match view_frame.borrow_mut().as_mut() {
				Some(v) => {
					v.tick(0.016);
					render::draw(v, &ctx);
				}
				None => {
					let (w, h) = size_frame.get();
					render::blank(&ctx, w, h);
				}
			}
			if let (Some(win), Some(cb)) = (web_sys::window(), next.borrow().as_ref()) {
				let _ = win.request_animation_frame(cb.as_ref().unchecked_ref());
			}
		}));
		if let Some(cb) = frame.borrow().as_ref() {
			let _ = window.request_animation_frame(cb.as_ref().unchecked_ref());
		}
	});

	// Rebuild the simulation whenever new data arrives.
	let (view_data, size_data) = (view.clone(), size.clone());
	Effect::new(move |_| {
		let next = data.get();
		let (w, h) = size_data.get();
		*view_data.borrow_mut() = next.map(|d| GraphView::new(&d, w, h));
	});

	let view_down = view.clone();
	let on_mousedown = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, &ev);
		if let Some(v) = view_down.borrow_mut().as_mut() {
			v.pointer_down(x, y);
		}
	};

	let view_move = view.clone();
	let on_mousemove = move |ev: MouseEvent| {
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, &ev);
		if let Some(v) = view_move.borrow_mut().as_mut() {
			v.pointer_move(x, y);
		}
	};

	let view_up = view.clone();
	let on_mouseup = move |_: MouseEvent| {
		if let Some(v) = view_up.borrow_mut().as_mut() {
			v.pointer_up();
		}
	};

	let view_leave = view.clone();
	let on_mouseleave = move |_: MouseEvent| {
		if let Some(v) = view_leave.borrow_mut().as_mut() {
			v.pointer_leave();
		}
	};

	let view_wheel = view;
	let on_wheel = move |ev: WheelEvent| {
		ev.prevent_default();
		let Some(canvas) = canvas_ref.get() else {
			return;
		};
		let canvas: HtmlCanvasElement = canvas.into();
		let (x, y) = local_point(&canvas, &ev);
		let factor = if ev.delta_y() > 0.0 { 0.9 } else { 1.1 };
		if let Some(v) = view_wheel.borrow_mut().as_mut() {
			v.camera.zoom_at(x, y, factor);
		}
	};

	view! {
		<canvas
			node_ref=canvas_ref
			class="force-graph-canvas"
			on:mousedown=on_mousedown
			on:mousemove=on_mousemove
			on:mouseup=on_mouseup
			on:mouseleave=on_mouseleave
			on:wheel=on_wheel
			style="display: block; cursor: grab;"
		/>
	}
}
