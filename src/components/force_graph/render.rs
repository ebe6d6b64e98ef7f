use std::f64::consts::TAU;

use web_sys::CanvasRenderingContext2d;

use super::state::{GraphView, NODE_RADIUS};

const BACKGROUND: &str = "#0a1930";

fn smoothstep(t: f64) -> f64 {
	let t = t.clamp(0.0, 1.0);
	t * t * (3.0 - 2.0 * t)
}

pub fn blank(ctx: &CanvasRenderingContext2d, width: f64, height: f64) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, width, height);
}

pub fn draw(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	blank(ctx, view.width, view.height);
	ctx.save();
	let _ = ctx.translate(view.camera.x, view.camera.y);
	let _ = ctx.scale(view.camera.k, view.camera.k);
	draw_links(view, ctx);
	draw_nodes(view, ctx);
	ctx.restore();
}

fn draw_links(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let k = view.camera.k;
	let t = smoothstep(view.focus.fade);
	let head = 7.0 / k;

	view.graph.visit_edges(|from, to, _| {
		let (x1, y1, x2, y2) = (from.x() as f64, from.y() as f64, to.x() as f64, to.y() as f64);
		let len = (x2 - x1).hypot(y2 - y1);
		if len < NODE_RADIUS * 2.0 {
			return;
		}
		let (ux, uy) = ((x2 - x1) / len, (y2 - y1) / len);

		let lit = view.is_highlighted(from.index()) && view.is_highlighted(to.index());
		let alpha = if lit { 0.5 + 0.4 * t } else { 0.5 - 0.35 * t };
		let color = format!("rgba(138, 180, 248, {alpha})");

		ctx.set_stroke_style_str(&color);
		ctx.set_line_width(1.2 / k);
		ctx.begin_path();
		ctx.move_to(x1 + ux * NODE_RADIUS, y1 + uy * NODE_RADIUS);
		ctx.line_to(x2 - ux * (NODE_RADIUS + head), y2 - uy * (NODE_RADIUS + head));
		ctx.stroke();

		let (tip_x, tip_y) = (x2 - ux * NODE_RADIUS, y2 - uy * NODE_RADIUS);
		let (base_x, base_y) = (tip_x - ux * head, tip_y - uy * head);
		let (px, py) = (-uy * head * 0.5, ux * head * 0.5);
		ctx.set_fill_style_str(&color);
		ctx.begin_path();
		ctx.move_to(tip_x, tip_y);
		ctx.line_to(base_x + px, base_y + py);
		ctx.line_to(base_x - px, base_y - py);
		ctx.close_path();
		ctx.fill();
	});
}

fn draw_nodes(view: &GraphView, ctx: &CanvasRenderingContext2d) {
	let k = view.camera.k;
	let t = smoothstep(view.focus.fade);
	let focused = view.focus.node.is_some();
	ctx.set_font(&format!("{}px sans-serif", 11.0 / k.max(0.5)));

	view.graph.visit_nodes(|node| {
		let idx = node.index();
		let (x, y) = (node.x() as f64, node.y() as f64);
		let style = &node.data.user_data;
		let lit = focused && view.is_highlighted(idx);

		let (alpha, radius) = match (focused, lit) {
			(false, _) => (1.0, NODE_RADIUS),
			(true, true) if view.focus.node == Some(idx) => (1.0, NODE_RADIUS * (1.0 + 0.4 * t)),
			(true, true) => (1.0, NODE_RADIUS * (1.0 + 0.2 * t)),
			(true, false) => (1.0 - 0.7 * t, NODE_RADIUS),
		};

		ctx.set_global_alpha(alpha);
		ctx.begin_path();
		let _ = ctx.arc(x, y, radius, 0.0, TAU);
		ctx.set_fill_style_str(style.color);
		ctx.fill();

		if view.focus.node == Some(idx) && t > 0.01 {
			ctx.set_stroke_style_str(&format!("rgba(255, 255, 255, {})", 0.8 * t));
			ctx.set_line_width(1.5 / k);
			ctx.begin_path();
			let _ = ctx.arc(x, y, radius + 2.5 / k, 0.0, TAU);
			ctx.stroke();
		}

		if let Some(label) = &style.label {
			ctx.set_fill_style_str("#e6e6ff");
			let _ = ctx.fill_text(label, x + radius + 3.0, y + 3.0);
		}
		ctx.set_global_alpha(1.0);
	});
}
