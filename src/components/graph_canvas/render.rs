use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::graph::{GraphState, PRIMARY, Side, edge_stroke, node_style};

use super::geometry::{BezierPath, HANDLE_RADIUS, NodeBox, Point, fit_label};
use super::state::{CanvasState, graph_bounds};
use super::types::CanvasConfig;

const BACKGROUND: &str = "#ffffff";
const GRID_DOT: &str = "#d4d4d8";
const ARROW_SIZE: f64 = 10.0;
const CARD_RADIUS: f64 = 8.0;
const MINIMAP_MARGIN: f64 = 12.0;

pub fn render(
	state: &CanvasState,
	graph: &GraphState,
	show_grid: bool,
	config: &CanvasConfig,
	ctx: &CanvasRenderingContext2d,
) {
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(0.0, 0.0, state.width, state.height);
	if show_grid {
		draw_grid(state, config, ctx);
	}
	ctx.save();
	let _ = ctx.translate(state.transform.x, state.transform.y);
	let _ = ctx.scale(state.transform.k, state.transform.k);
	draw_edges(state, graph, ctx);
	draw_pending_link(state, graph, ctx);
	draw_nodes(state, graph, ctx);
	ctx.restore();
	draw_minimap(state, graph, config, ctx);
}

fn draw_grid(state: &CanvasState, config: &CanvasConfig, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	let gap = config.grid_gap * k;
	// Too dense to read; skip rather than flood the canvas.
	if gap < 4.0 {
		return;
	}
	let size = (config.grid_dot * k).max(1.0);
	let (ox, oy) = (state.transform.x.rem_euclid(gap), state.transform.y.rem_euclid(gap));
	ctx.set_fill_style_str(GRID_DOT);
	let mut y = oy;
	while y < state.height {
		let mut x = ox;
		while x < state.width {
			ctx.fill_rect(x - size / 2.0, y - size / 2.0, size, size);
			x += gap;
		}
		y += gap;
	}
}

fn draw_arrow(ctx: &CanvasRenderingContext2d, tip: Point, (ux, uy): Point, size: f64) {
	let (back_x, back_y) = (tip.0 - ux * size, tip.1 - uy * size);
	let (px, py) = (-uy * size * 0.5, ux * size * 0.5);
	ctx.begin_path();
	ctx.move_to(tip.0, tip.1);
	ctx.line_to(back_x + px, back_y + py);
	ctx.line_to(back_x - px, back_y - py);
	ctx.close_path();
	ctx.fill();
}

fn stroke_curve(ctx: &CanvasRenderingContext2d, path: &BezierPath) {
	ctx.begin_path();
	ctx.move_to(path.start.0, path.start.1);
	ctx.bezier_curve_to(path.c1.0, path.c1.1, path.c2.0, path.c2.1, path.end.0, path.end.1);
	ctx.stroke();
}

fn rounded_rect(ctx: &CanvasRenderingContext2d, x: f64, y: f64, w: f64, h: f64, r: f64) {
	let r = r.min(w / 2.0).min(h / 2.0);
	ctx.begin_path();
	ctx.move_to(x + r, y);
	let _ = ctx.arc_to(x + w, y, x + w, y + h, r);
	let _ = ctx.arc_to(x + w, y + h, x, y + h, r);
	let _ = ctx.arc_to(x, y + h, x, y, r);
	let _ = ctx.arc_to(x, y, x + w, y, r);
	ctx.close_path();
}

fn draw_edges(state: &CanvasState, graph: &GraphState, ctx: &CanvasRenderingContext2d) {
	let k = state.transform.k;
	for edge in graph.edges() {
		// Dangling edges are kept but not drawn.
		let Some(path) = state.edge_path(graph, edge) else {
			continue;
		};
		let selected = state.is_edge_selected(&edge.id);
		let stroke = edge_stroke(selected);

		ctx.set_global_alpha(stroke.alpha);
		ctx.set_stroke_style_str(PRIMARY);
		ctx.set_fill_style_str(PRIMARY);
		ctx.set_line_width(stroke.width);
		stroke_curve(ctx, &path);
		draw_arrow(ctx, path.end, path.end_direction(), ARROW_SIZE);

		if selected {
			for end in [path.start, path.end] {
				ctx.begin_path();
				let _ = ctx.arc(end.0, end.1, 5.0 / k, 0.0, 2.0 * PI);
				ctx.set_fill_style_str(BACKGROUND);
				ctx.fill();
				ctx.set_line_width(1.5 / k);
				ctx.stroke();
			}
		}
		ctx.set_global_alpha(1.0);

		if let Some(label) = &edge.data.label {
			draw_edge_label(ctx, path.midpoint(), label);
		}
	}
}

fn draw_edge_label(ctx: &CanvasRenderingContext2d, (mx, my): Point, label: &str) {
	ctx.set_font("500 12px sans-serif");
	let text_w = ctx
		.measure_text(label)
		.map(|m| m.width())
		.unwrap_or(label.chars().count() as f64 * 6.5);
	let (w, h) = (text_w + 16.0, 22.0);
	rounded_rect(ctx, mx - w / 2.0, my - h / 2.0, w, h, 6.0);
	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill();
	ctx.set_stroke_style_str("#e4e4e7");
	ctx.set_line_width(1.0);
	ctx.stroke();
	ctx.set_fill_style_str(PRIMARY);
	ctx.set_text_align("center");
	ctx.set_text_baseline("middle");
	let _ = ctx.fill_text(label, mx, my);
	ctx.set_text_align("start");
	ctx.set_text_baseline("alphabetic");
}

fn draw_pending_link(state: &CanvasState, graph: &GraphState, ctx: &CanvasRenderingContext2d) {
	let Some(origin) = state.link_origin(graph) else {
		return;
	};
	let k = state.transform.k;
	ctx.set_stroke_style_str(PRIMARY);
	ctx.set_line_width(1.5 / k);
	let _ = ctx.set_line_dash(&js_sys::Array::of2(
		&JsValue::from_f64(6.0 / k),
		&JsValue::from_f64(4.0 / k),
	));
	ctx.begin_path();
	ctx.move_to(origin.0, origin.1);
	ctx.line_to(state.pointer.0, state.pointer.1);
	ctx.stroke();
	let _ = ctx.set_line_dash(&js_sys::Array::new());
}

fn draw_nodes(state: &CanvasState, graph: &GraphState, ctx: &CanvasRenderingContext2d) {
	let linking = state.link.is_some();
	for node in graph.nodes() {
		let b = NodeBox::of(node);
		let style = node_style(node.kind());
		let selected = state.is_node_selected(&node.id);
		let hovered = state.hover.as_deref() == Some(node.id.as_str());

		if hovered {
			ctx.set_shadow_color("rgba(0, 0, 0, 0.15)");
			ctx.set_shadow_blur(8.0);
			ctx.set_shadow_offset_y(2.0);
		}
		rounded_rect(ctx, b.x, b.y, b.w, b.h, CARD_RADIUS);
		ctx.set_fill_style_str(style.fill);
		ctx.fill();
		ctx.set_shadow_color("transparent");
		ctx.set_shadow_blur(0.0);
		ctx.set_shadow_offset_y(0.0);
		ctx.set_stroke_style_str(style.border);
		ctx.set_line_width(2.0);
		ctx.stroke();

		if selected {
			rounded_rect(ctx, b.x - 3.0, b.y - 3.0, b.w + 6.0, b.h + 6.0, CARD_RADIUS + 3.0);
			ctx.set_stroke_style_str(PRIMARY);
			ctx.set_line_width(2.0);
			ctx.stroke();
		}

		let cy = b.y + b.h / 2.0;
		ctx.set_text_baseline("middle");
		ctx.set_font("18px sans-serif");
		ctx.set_fill_style_str(style.text);
		let _ = ctx.fill_text(style.glyph, b.x + 10.0, cy);
		ctx.set_font("600 14px sans-serif");
		ctx.set_fill_style_str(PRIMARY);
		let _ = ctx.fill_text(&fit_label(node.label(), b.w), b.x + 36.0, cy);
		ctx.set_text_baseline("alphabetic");

		if hovered || selected || linking {
			draw_handles(ctx, &b);
		}
	}
}

fn draw_handles(ctx: &CanvasRenderingContext2d, b: &NodeBox) {
	for side in Side::ALL {
		let (x, y) = b.anchor(side);
		ctx.begin_path();
		let _ = ctx.arc(x, y, HANDLE_RADIUS, 0.0, 2.0 * PI);
		ctx.set_fill_style_str("#71717a");
		ctx.fill();
		ctx.set_stroke_style_str(BACKGROUND);
		ctx.set_line_width(1.0);
		ctx.stroke();
	}
}

fn draw_minimap(
	state: &CanvasState,
	graph: &GraphState,
	config: &CanvasConfig,
	ctx: &CanvasRenderingContext2d,
) {
	let (mw, mh) = (config.minimap_width, config.minimap_height);
	let (mx, my) = (
		state.width - mw - MINIMAP_MARGIN,
		state.height - mh - MINIMAP_MARGIN,
	);
	if mx < 0.0 || my < 0.0 {
		return;
	}

	// The minimap frames both the nodes and the current viewport.
	let (vx0, vy0) = state.screen_to_graph(0.0, 0.0);
	let (vx1, vy1) = state.screen_to_graph(state.width, state.height);
	let (x0, y0, x1, y1) = match graph_bounds(graph) {
		Some((a, b, c, d)) => (a.min(vx0), b.min(vy0), c.max(vx1), d.max(vy1)),
		None => (vx0, vy0, vx1, vy1),
	};
	let scale = (mw / (x1 - x0).max(1.0)).min(mh / (y1 - y0).max(1.0));
	let (ox, oy) = (
		mx + (mw - (x1 - x0) * scale) / 2.0,
		my + (mh - (y1 - y0) * scale) / 2.0,
	);
	let to_map = |x: f64, y: f64| (ox + (x - x0) * scale, oy + (y - y0) * scale);

	ctx.set_fill_style_str(BACKGROUND);
	ctx.fill_rect(mx, my, mw, mh);
	ctx.set_stroke_style_str("#e4e4e7");
	ctx.set_line_width(1.0);
	ctx.stroke_rect(mx, my, mw, mh);

	for node in graph.nodes() {
		let b = NodeBox::of(node);
		let (nx, ny) = to_map(b.x, b.y);
		ctx.set_fill_style_str(node_style(node.kind()).minimap);
		ctx.fill_rect(nx, ny, (b.w * scale).max(2.0), (b.h * scale).max(2.0));
	}

	let (rx, ry) = to_map(vx0, vy0);
	ctx.set_stroke_style_str("#a1a1aa");
	ctx.stroke_rect(rx, ry, (vx1 - vx0) * scale, (vy1 - vy0) * scale);
}
