use crate::graph::{Edge, Node, Side};

pub type Point = (f64, f64);

pub const NODE_HEIGHT: f64 = 40.0;
pub const NODE_MIN_WIDTH: f64 = 120.0;
pub const NODE_MAX_WIDTH: f64 = 260.0;
/// Space taken by the icon and the card padding.
pub const NODE_CHROME: f64 = 44.0;
/// Average advance of the label font, used instead of measuring text.
pub const CHAR_WIDTH: f64 = 7.5;
pub const HANDLE_RADIUS: f64 = 4.0;

const CURVATURE: f64 = 0.25;
const EDGE_SAMPLES: usize = 24;

/// Screen footprint of a node card in graph space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBox {
	pub x: f64,
	pub y: f64,
	pub w: f64,
	pub h: f64,
}

impl NodeBox {
	pub fn of(node: &Node) -> Self {
		let chars = node.label().chars().count() as f64;
		Self {
			x: node.position.x,
			y: node.position.y,
			w: (NODE_CHROME + chars * CHAR_WIDTH).clamp(NODE_MIN_WIDTH, NODE_MAX_WIDTH),
			h: NODE_HEIGHT,
		}
	}

	pub fn contains(&self, (px, py): Point) -> bool {
		px >= self.x && px <= self.x + self.w && py >= self.y && py <= self.y + self.h
	}

	pub fn center(&self) -> Point {
		(self.x + self.w / 2.0, self.y + self.h / 2.0)
	}

	/// Midpoint of `side`, where that side's handles sit.
	pub fn anchor(&self, side: Side) -> Point {
		let (cx, cy) = self.center();
		match side {
			Side::Top => (cx, self.y),
			Side::Right => (self.x + self.w, cy),
			Side::Bottom => (cx, self.y + self.h),
			Side::Left => (self.x, cy),
		}
	}

	/// Side whose handle lies within `radius` of `p`.
	pub fn handle_at(&self, p: Point, radius: f64) -> Option<Side> {
		Side::ALL
			.into_iter()
			.find(|side| distance(self.anchor(*side), p) <= radius)
	}
}

pub fn distance((x1, y1): Point, (x2, y2): Point) -> f64 {
	((x2 - x1).powi(2) + (y2 - y1).powi(2)).sqrt()
}

/// Sides facing each other along the dominant axis between two boxes.
pub fn facing_sides(from: &NodeBox, to: &NodeBox) -> (Side, Side) {
	let ((fx, fy), (tx, ty)) = (from.center(), to.center());
	let (dx, dy) = (tx - fx, ty - fy);
	if dx.abs() > dy.abs() {
		if dx > 0.0 { (Side::Right, Side::Left) } else { (Side::Left, Side::Right) }
	} else if dy > 0.0 {
		(Side::Bottom, Side::Top)
	} else {
		(Side::Top, Side::Bottom)
	}
}

/// Sides an edge attaches to: its handles when set, facing sides otherwise.
pub fn edge_sides(edge: &Edge, source: &NodeBox, target: &NodeBox) -> (Side, Side) {
	let (auto_src, auto_tgt) = facing_sides(source, target);
	(
		edge.source_handle.as_deref().and_then(Side::from_handle).unwrap_or(auto_src),
		edge.target_handle.as_deref().and_then(Side::from_handle).unwrap_or(auto_tgt),
	)
}

fn control_offset(distance: f64) -> f64 {
	if distance >= 0.0 {
		0.5 * distance
	} else {
		CURVATURE * 25.0 * (-distance).sqrt()
	}
}

fn control_point(side: Side, (x1, y1): Point, (x2, y2): Point) -> Point {
	let (nx, ny) = side.normal();
	let offset = control_offset((x2 - x1) * nx + (y2 - y1) * ny);
	(x1 + nx * offset, y1 + ny * offset)
}

/// A cubic curve leaving `start` and entering `end` perpendicular to the
/// sides they sit on.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BezierPath {
	pub start: Point,
	pub c1: Point,
	pub c2: Point,
	pub end: Point,
}

impl BezierPath {
	pub fn between(start: Point, start_side: Side, end: Point, end_side: Side) -> Self {
		Self {
			start,
			c1: control_point(start_side, start, end),
			c2: control_point(end_side, end, start),
			end,
		}
	}

	pub fn point_at(&self, t: f64) -> Point {
		let u = 1.0 - t;
		let (a, b, c, d) = (u * u * u, 3.0 * u * u * t, 3.0 * u * t * t, t * t * t);
		(
			a * self.start.0 + b * self.c1.0 + c * self.c2.0 + d * self.end.0,
			a * self.start.1 + b * self.c1.1 + c * self.c2.1 + d * self.end.1,
		)
	}

	/// Where the label chip is centered.
	pub fn midpoint(&self) -> Point {
		self.point_at(0.5)
	}

	/// Unit direction of travel when reaching `end`.
	pub fn end_direction(&self) -> Point {
		let from = if distance(self.c2, self.end) > 1e-6 { self.c2 } else { self.start };
		let (dx, dy) = (self.end.0 - from.0, self.end.1 - from.1);
		let len = (dx * dx + dy * dy).sqrt();
		if len < 1e-6 { (1.0, 0.0) } else { (dx / len, dy / len) }
	}

	/// Approximate distance from `p` to the curve.
	pub fn distance_to(&self, p: Point) -> f64 {
		let mut best = f64::INFINITY;
		let mut prev = self.start;
		for i in 1..=EDGE_SAMPLES {
			let next = self.point_at(i as f64 / EDGE_SAMPLES as f64);
			best = best.min(segment_distance(prev, next, p));
			prev = next;
		}
		best
	}
}

fn segment_distance(a: Point, b: Point, p: Point) -> f64 {
	let (dx, dy) = (b.0 - a.0, b.1 - a.1);
	let len2 = dx * dx + dy * dy;
	if len2 < 1e-12 {
		return distance(a, p);
	}
	let t = (((p.0 - a.0) * dx + (p.1 - a.1) * dy) / len2).clamp(0.0, 1.0);
	distance((a.0 + t * dx, a.1 + t * dy), p)
}

/// Label shortened with an ellipsis so it fits a card of `width`.
pub fn fit_label(label: &str, width: f64) -> String {
	let max = ((width - NODE_CHROME) / CHAR_WIDTH).floor().max(1.0) as usize;
	if label.chars().count() <= max {
		return label.to_owned();
	}
	let mut out: String = label.chars().take(max.saturating_sub(1)).collect();
	out.push('…');
	out
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{NodeData, NodeKind, Position};

	fn node(label: &str, x: f64, y: f64) -> Node {
		Node {
			id: label.into(),
			position: Position::new(x, y),
			data: NodeData {
				label: label.into(),
				kind: NodeKind::Generic,
				metadata: Default::default(),
			},
		}
	}

	#[test]
	fn node_width_is_clamped() {
		assert_eq!(NodeBox::of(&node("a", 0.0, 0.0)).w, NODE_MIN_WIDTH);
		assert_eq!(NodeBox::of(&node(&"x".repeat(200), 0.0, 0.0)).w, NODE_MAX_WIDTH);
	}

	#[test]
	fn anchors_sit_on_side_midpoints() {
		let b = NodeBox::of(&node("a", 10.0, 20.0));
		assert_eq!(b.anchor(Side::Top), (70.0, 20.0));
		assert_eq!(b.anchor(Side::Right), (130.0, 40.0));
		assert_eq!(b.anchor(Side::Bottom), (70.0, 60.0));
		assert_eq!(b.anchor(Side::Left), (10.0, 40.0));
		assert_eq!(b.handle_at((131.0, 41.0), 4.0), Some(Side::Right));
		assert_eq!(b.handle_at((70.0, 40.0), 4.0), None);
	}

	#[test]
	fn facing_sides_follow_dominant_axis() {
		let a = NodeBox::of(&node("a", 0.0, 0.0));
		let right = NodeBox::of(&node("b", 400.0, 30.0));
		let below = NodeBox::of(&node("c", 20.0, 300.0));
		assert_eq!(facing_sides(&a, &right), (Side::Right, Side::Left));
		assert_eq!(facing_sides(&right, &a), (Side::Left, Side::Right));
		assert_eq!(facing_sides(&a, &below), (Side::Bottom, Side::Top));
		assert_eq!(facing_sides(&below, &a), (Side::Top, Side::Bottom));
	}

	#[test]
	fn straight_curve_has_centered_label() {
		let path = BezierPath::between((0.0, 0.0), Side::Right, (100.0, 0.0), Side::Left);
		assert_eq!(path.c1, (50.0, 0.0));
		assert_eq!(path.c2, (50.0, 0.0));
		assert_eq!(path.midpoint(), (50.0, 0.0));
		assert_eq!(path.end_direction(), (1.0, 0.0));
		assert!(path.distance_to((30.0, 3.0)) < 3.01);
		assert!(path.distance_to((30.0, 40.0)) > 39.0);
	}

	#[test]
	fn backwards_curve_loops_outward() {
		let path = BezierPath::between((100.0, 0.0), Side::Right, (0.0, 0.0), Side::Left);
		assert!(path.c1.0 > 100.0);
		assert!(path.c2.0 < 0.0);
	}

	#[test]
	fn long_labels_are_elided() {
		assert_eq!(fit_label("short", 120.0), "short");
		let fitted = fit_label(&"y".repeat(100), 120.0);
		assert!(fitted.ends_with('…'));
		assert_eq!(fitted.chars().count(), 10);
	}
}
