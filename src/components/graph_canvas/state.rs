use crate::graph::{Edge, GraphState, Node, Position, Side};

use super::geometry::{
	BezierPath, HANDLE_RADIUS, NodeBox, Point, distance, edge_sides, facing_sides,
};
use super::types::{CanvasConfig, CanvasEvent};

/// How close, in screen pixels, the pointer must be to grab an edge.
pub const EDGE_HIT_PX: f64 = 6.0;
/// How close, in screen pixels, the pointer must be to grab a handle or an edge end.
pub const HANDLE_HIT_PX: f64 = 10.0;

#[derive(Clone, Debug, Default)]
pub struct ViewTransform {
	pub x: f64,
	pub y: f64,
	pub k: f64,
}

#[derive(Clone, Debug, Default)]
pub struct DragState {
	pub active: bool,
	pub node_id: Option<String>,
	pub start_x: f64,
	pub start_y: f64,
	pub node_start: Position,
}

#[derive(Clone, Debug, Default)]
pub struct PanState {
	pub active: bool,
	pub start_x: f64,
	pub start_y: f64,
	pub transform_start_x: f64,
	pub transform_start_y: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeEnd {
	Source,
	Target,
}

/// A link being drawn with the pointer.
#[derive(Clone, Debug, PartialEq)]
pub enum LinkGesture {
	/// A new edge dragged out of a handle.
	Connect { from: String, side: Side },
	/// One end of an existing edge detached; the other stays on `fixed`.
	/// `grab` is where the end was picked up, in graph space.
	Reconnect {
		edge: String,
		moving: EdgeEnd,
		fixed: String,
		fixed_side: Side,
		grab: Point,
	},
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum Selection {
	#[default]
	None,
	Node(String),
	Edge(String),
}

pub struct CanvasState {
	pub transform: ViewTransform,
	pub drag: DragState,
	pub pan: PanState,
	pub link: Option<LinkGesture>,
	pub selection: Selection,
	pub hover: Option<String>,
	/// Last pointer position, in graph space.
	pub pointer: Point,
	pub width: f64,
	pub height: f64,
}

impl CanvasState {
	pub fn new(width: f64, height: f64) -> Self {
		Self {
			transform: ViewTransform { x: 0.0, y: 0.0, k: 1.0 },
			drag: DragState::default(),
			pan: PanState::default(),
			link: None,
			selection: Selection::None,
			hover: None,
			pointer: (0.0, 0.0),
			width,
			height,
		}
	}

	pub fn screen_to_graph(&self, sx: f64, sy: f64) -> Point {
		(
			(sx - self.transform.x) / self.transform.k,
			(sy - self.transform.y) / self.transform.k,
		)
	}

	pub fn is_node_selected(&self, id: &str) -> bool {
		matches!(&self.selection, Selection::Node(s) if s == id)
	}

	pub fn is_edge_selected(&self, id: &str) -> bool {
		matches!(&self.selection, Selection::Edge(s) if s == id)
	}

	/// Topmost node under a graph-space point.
	pub fn node_at<'g>(&self, graph: &'g GraphState, p: Point) -> Option<&'g Node> {
		graph.nodes().iter().rev().find(|n| NodeBox::of(n).contains(p))
	}

	/// Topmost node with a handle under a graph-space point.
	pub fn handle_at(&self, graph: &GraphState, p: Point) -> Option<(String, Side)> {
		let radius = HANDLE_HIT_PX / self.transform.k;
		graph.nodes().iter().rev().find_map(|n| {
			NodeBox::of(n).handle_at(p, radius.max(HANDLE_RADIUS)).map(|side| (n.id.clone(), side))
		})
	}

	/// Curve of an edge, or `None` while an endpoint is missing.
	pub fn edge_path(&self, graph: &GraphState, edge: &Edge) -> Option<BezierPath> {
		let source = NodeBox::of(graph.node(&edge.source)?);
		let target = NodeBox::of(graph.node(&edge.target)?);
		let (src_side, tgt_side) = edge_sides(edge, &source, &target);
		Some(BezierPath::between(
			source.anchor(src_side),
			src_side,
			target.anchor(tgt_side),
			tgt_side,
		))
	}

	pub fn edge_at<'g>(&self, graph: &'g GraphState, p: Point) -> Option<&'g Edge> {
		let tolerance = EDGE_HIT_PX / self.transform.k;
		graph.edges().iter().rev().find(|e| {
			self.edge_path(graph, e)
				.is_some_and(|path| path.distance_to(p) <= tolerance)
		})
	}

	/// End of the selected edge under a graph-space point.
	fn selected_edge_end(&self, graph: &GraphState, p: Point) -> Option<LinkGesture> {
		let Selection::Edge(id) = &self.selection else {
			return None;
		};
		let edge = graph.edge(id)?;
		let path = self.edge_path(graph, edge)?;
		let source = NodeBox::of(graph.node(&edge.source)?);
		let target = NodeBox::of(graph.node(&edge.target)?);
		let (src_side, tgt_side) = edge_sides(edge, &source, &target);
		let radius = HANDLE_HIT_PX / self.transform.k;
		if distance(path.end, p) <= radius {
			Some(LinkGesture::Reconnect {
				edge: edge.id.clone(),
				moving: EdgeEnd::Target,
				fixed: edge.source.clone(),
				fixed_side: src_side,
				grab: p,
			})
		} else if distance(path.start, p) <= radius {
			Some(LinkGesture::Reconnect {
				edge: edge.id.clone(),
				moving: EdgeEnd::Source,
				fixed: edge.target.clone(),
				fixed_side: tgt_side,
				grab: p,
			})
		} else {
			None
		}
	}

	/// Start point of the link being drawn, in graph space.
	pub fn link_origin(&self, graph: &GraphState) -> Option<Point> {
		let (node, side) = match self.link.as_ref()? {
			LinkGesture::Connect { from, side } => (from, *side),
			LinkGesture::Reconnect { fixed, fixed_side, .. } => (fixed, *fixed_side),
		};
		Some(NodeBox::of(graph.node(node)?).anchor(side))
	}

	pub fn pointer_down(&mut self, graph: &GraphState, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		self.pointer = p;

		if let Some(gesture) = self.selected_edge_end(graph, p) {
			let LinkGesture::Reconnect { edge, .. } = &gesture else {
				return Vec::new();
			};
			let started = CanvasEvent::ReconnectStarted { edge: edge.clone() };
			self.link = Some(gesture);
			return vec![started];
		}

		if let Some((from, side)) = self.handle_at(graph, p) {
			self.selection = Selection::Node(from.clone());
			self.link = Some(LinkGesture::Connect { from, side });
			return Vec::new();
		}

		if let Some(node) = self.node_at(graph, p) {
			self.selection = Selection::Node(node.id.clone());
			self.drag = DragState {
				active: true,
				node_id: Some(node.id.clone()),
				start_x: sx,
				start_y: sy,
				node_start: node.position,
			};
			return Vec::new();
		}

		if let Some(edge) = self.edge_at(graph, p) {
			self.selection = Selection::Edge(edge.id.clone());
			return Vec::new();
		}

		self.selection = Selection::None;
		self.pan = PanState {
			active: true,
			start_x: sx,
			start_y: sy,
			transform_start_x: self.transform.x,
			transform_start_y: self.transform.y,
		};
		Vec::new()
	}

	pub fn pointer_move(&mut self, graph: &GraphState, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		self.pointer = p;

		if !self.drag.active {
			self.hover = self.node_at(graph, p).map(|n| n.id.clone());
		}

		if self.drag.active {
			if let Some(id) = &self.drag.node_id {
				let (dx, dy) = (
					(sx - self.drag.start_x) / self.transform.k,
					(sy - self.drag.start_y) / self.transform.k,
				);
				let position =
					Position::new(self.drag.node_start.x + dx, self.drag.node_start.y + dy);
				return vec![CanvasEvent::NodeMoved {
					id: id.clone(),
					position,
				}];
			}
		} else if self.pan.active {
			self.transform.x = self.pan.transform_start_x + (sx - self.pan.start_x);
			self.transform.y = self.pan.transform_start_y + (sy - self.pan.start_y);
		}
		Vec::new()
	}

	/// Node and side a link dropped at `p` lands on.
	fn drop_target(
		&self,
		graph: &GraphState,
		p: Point,
		origin: &str,
	) -> Option<(String, Option<Side>)> {
		if let Some((id, side)) = self.handle_at(graph, p) {
			return (id != origin).then_some((id, Some(side)));
		}
		let node = self.node_at(graph, p)?;
		(node.id != origin).then(|| (node.id.clone(), None))
	}

	pub fn pointer_up(&mut self, graph: &GraphState, sx: f64, sy: f64) -> Vec<CanvasEvent> {
		let p = self.screen_to_graph(sx, sy);
		self.pointer = p;
		self.drag = DragState::default();
		self.pan.active = false;

		let Some(gesture) = self.link.take() else {
			return Vec::new();
		};
		match gesture {
			LinkGesture::Connect { from, side } => {
				let Some((target, target_side)) = self.drop_target(graph, p, &from) else {
					return Vec::new();
				};
				let target_side = target_side.unwrap_or_else(|| {
					let (Some(a), Some(b)) = (graph.node(&from), graph.node(&target)) else {
						return side;
					};
					facing_sides(&NodeBox::of(a), &NodeBox::of(b)).1
				});
				vec![CanvasEvent::Connected {
					source: from,
					target,
					source_handle: Some(side.source_handle()),
					target_handle: Some(target_side.target_handle()),
				}]
			}
			LinkGesture::Reconnect {
				edge,
				moving,
				fixed,
				fixed_side,
				grab,
			} => {
				let mut events = Vec::new();
				let released_in_place = distance(grab, p) <= HANDLE_HIT_PX / self.transform.k;
				if released_in_place {
					// A click on the end: put the edge back as it was.
					if let Some(e) = graph.edge(&edge) {
						events.push(CanvasEvent::Reconnected {
							edge: edge.clone(),
							source: e.source.clone(),
							target: e.target.clone(),
							source_handle: e.source_handle.clone(),
							target_handle: e.target_handle.clone(),
						});
					}
				} else if let Some((dropped, dropped_side)) = self.drop_target(graph, p, &fixed) {
					let (source, target, source_side, target_side) = match moving {
						EdgeEnd::Target => (fixed, dropped, Some(fixed_side), dropped_side),
						EdgeEnd::Source => (dropped, fixed, dropped_side, Some(fixed_side)),
					};
					events.push(CanvasEvent::Reconnected {
						edge: edge.clone(),
						source,
						target,
						source_handle: source_side.map(Side::source_handle),
						target_handle: target_side.map(Side::target_handle),
					});
				}
				events.push(CanvasEvent::ReconnectEnded { edge });
				events
			}
		}
	}

	/// Pointer left the canvas: every gesture is cancelled.
	pub fn pointer_leave(&mut self) -> Vec<CanvasEvent> {
		self.drag = DragState::default();
		self.pan.active = false;
		self.hover = None;
		match self.link.take() {
			Some(LinkGesture::Reconnect { edge, .. }) => vec![CanvasEvent::ReconnectEnded { edge }],
			_ => Vec::new(),
		}
	}

	/// Delete whatever is selected.
	pub fn delete_selection(&mut self) -> Option<CanvasEvent> {
		match std::mem::take(&mut self.selection) {
			Selection::None => None,
			Selection::Node(id) => Some(CanvasEvent::NodeDeleted { id }),
			Selection::Edge(id) => Some(CanvasEvent::EdgeDeleted { id }),
		}
	}

	/// Scale by `factor` keeping the screen point `(sx, sy)` still.
	pub fn zoom_at(&mut self, sx: f64, sy: f64, factor: f64, config: &CanvasConfig) {
		let new_k = (self.transform.k * factor).clamp(config.min_zoom, config.max_zoom);
		let ratio = new_k / self.transform.k;
		self.transform.x = sx - (sx - self.transform.x) * ratio;
		self.transform.y = sy - (sy - self.transform.y) * ratio;
		self.transform.k = new_k;
	}

	/// Zoom around the middle of the viewport.
	pub fn zoom_center(&mut self, factor: f64, config: &CanvasConfig) {
		self.zoom_at(self.width / 2.0, self.height / 2.0, factor, config);
	}

	/// Frame every node in the viewport.
	pub fn fit_view(&mut self, graph: &GraphState, config: &CanvasConfig) {
		let Some((min_x, min_y, max_x, max_y)) = graph_bounds(graph) else {
			self.transform = ViewTransform {
				x: self.width / 2.0,
				y: self.height / 2.0,
				k: 1.0,
			};
			return;
		};
		let (w, h) = ((max_x - min_x).max(1.0), (max_y - min_y).max(1.0));
		let usable = 1.0 - 2.0 * config.fit_padding;
		let k = (self.width * usable / w)
			.min(self.height * usable / h)
			.clamp(config.min_zoom, config.max_zoom);
		let (cx, cy) = ((min_x + max_x) / 2.0, (min_y + max_y) / 2.0);
		self.transform = ViewTransform {
			x: self.width / 2.0 - cx * k,
			y: self.height / 2.0 - cy * k,
			k,
		};
	}

	pub fn resize(&mut self, width: f64, height: f64) {
		self.width = width;
		self.height = height;
	}
}

/// Bounding box `(min_x, min_y, max_x, max_y)` of every node card.
pub fn graph_bounds(graph: &GraphState) -> Option<(f64, f64, f64, f64)> {
	graph.nodes().iter().map(NodeBox::of).fold(None, |acc, b| {
		let (x0, y0, x1, y1) = acc.unwrap_or((b.x, b.y, b.x + b.w, b.y + b.h));
		Some((x0.min(b.x), y0.min(b.y), x1.max(b.x + b.w), y1.max(b.y + b.h)))
	})
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::graph::{Command, NodeKind};

	/// Two nodes side by side, "1" at (0,0) and "2" at (300,0), no edges.
	fn pair() -> GraphState {
		GraphState::new()
			.apply(Command::AddNode {
				kind: NodeKind::Email,
				position: Position::new(0.0, 0.0),
			})
			.apply(Command::AddNode {
				kind: NodeKind::Domain,
				position: Position::new(300.0, 0.0),
			})
	}

	fn connected() -> GraphState {
		pair().apply(Command::Connect {
			source: "1".into(),
			target: "2".into(),
			source_handle: Some("right".into()),
			target_handle: Some("left-target".into()),
		})
	}

	fn fold(graph: GraphState, events: Vec<CanvasEvent>) -> GraphState {
		events.into_iter().fold(graph, |g, e| g.apply(e.into()))
	}

	#[test]
	fn dragging_a_node_reports_moves() {
		let graph = pair();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.transform.k = 2.0;
		assert!(canvas.pointer_down(&graph, 20.0, 20.0).is_empty());
		assert!(canvas.is_node_selected("1"));
		let events = canvas.pointer_move(&graph, 60.0, 30.0);
		assert_eq!(
			events,
			vec![CanvasEvent::NodeMoved {
				id: "1".into(),
				position: Position::new(20.0, 5.0),
			}]
		);
		assert!(canvas.pointer_up(&graph, 60.0, 30.0).is_empty());
		assert!(!canvas.drag.active);
	}

	#[test]
	fn background_drag_pans() {
		let graph = pair();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.pointer_down(&graph, 500.0, 500.0);
		assert_eq!(canvas.selection, Selection::None);
		canvas.pointer_move(&graph, 520.0, 490.0);
		assert_eq!((canvas.transform.x, canvas.transform.y), (20.0, -10.0));
	}

	#[test]
	fn dragging_from_handle_to_node_connects() {
		let graph = pair();
		let mut canvas = CanvasState::new(800.0, 600.0);
		// Right handle of "1" sits at (126.5, 20).
		canvas.pointer_down(&graph, 121.0, 20.0);
		assert!(canvas.link.is_some());
		let events = canvas.pointer_up(&graph, 350.0, 20.0);
		assert_eq!(
			events,
			vec![CanvasEvent::Connected {
				source: "1".into(),
				target: "2".into(),
				source_handle: Some("right".into()),
				target_handle: Some("left-target".into()),
			}]
		);
		assert_eq!(fold(graph, events).edge_count(), 1);
	}

	#[test]
	fn dropping_link_on_origin_or_background_does_nothing() {
		let graph = pair();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.pointer_down(&graph, 121.0, 20.0);
		assert!(canvas.pointer_up(&graph, 50.0, 20.0).is_empty());
		canvas.pointer_down(&graph, 121.0, 20.0);
		assert!(canvas.pointer_up(&graph, 200.0, 400.0).is_empty());
		assert!(canvas.link.is_none());
	}

	#[test]
	fn clicking_an_edge_selects_it() {
		let graph = connected();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.pointer_down(&graph, 210.0, 20.0);
		assert!(canvas.is_edge_selected("e3"));
		assert_eq!(canvas.delete_selection(), Some(CanvasEvent::EdgeDeleted { id: "e3".into() }));
		assert_eq!(canvas.delete_selection(), None);
	}

	#[test]
	fn reconnecting_target_to_another_node() {
		let graph = connected().apply(Command::AddNode {
			kind: NodeKind::Ip,
			position: Position::new(300.0, 200.0),
		});
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.selection = Selection::Edge("e3".into());
		// Edge ends at the left handle of "2", (300, 20).
		let started = canvas.pointer_down(&graph, 302.0, 20.0);
		assert_eq!(started, vec![CanvasEvent::ReconnectStarted { edge: "e3".into() }]);
		let mut events = started;
		events.extend(canvas.pointer_up(&graph, 350.0, 220.0));
		assert_eq!(events.len(), 3);
		let graph = fold(graph, events);
		let edge = graph.edge("e3").unwrap();
		assert_eq!((edge.source.as_str(), edge.target.as_str()), ("1", "4"));
		assert_eq!(edge.target_handle, None);
	}

	#[test]
	fn reconnect_dropped_on_background_removes_edge() {
		let graph = connected();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.selection = Selection::Edge("e3".into());
		let mut events = canvas.pointer_down(&graph, 302.0, 20.0);
		events.extend(canvas.pointer_up(&graph, 600.0, 500.0));
		assert_eq!(
			events,
			vec![
				CanvasEvent::ReconnectStarted { edge: "e3".into() },
				CanvasEvent::ReconnectEnded { edge: "e3".into() },
			]
		);
		assert_eq!(fold(graph, events).edge_count(), 0);
	}

	#[test]
	fn clicking_a_self_loop_end_keeps_the_edge() {
		let graph = pair().apply(Command::Connect {
			source: "1".into(),
			target: "1".into(),
			source_handle: Some("right".into()),
			target_handle: Some("left-target".into()),
		});
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.selection = Selection::Edge("e3".into());
		// The loop enters "1" on its left handle, (0, 20).
		let mut events = canvas.pointer_down(&graph, 2.0, 20.0);
		events.extend(canvas.pointer_up(&graph, 3.0, 21.0));
		assert_eq!(
			events,
			vec![
				CanvasEvent::ReconnectStarted { edge: "e3".into() },
				CanvasEvent::Reconnected {
					edge: "e3".into(),
					source: "1".into(),
					target: "1".into(),
					source_handle: Some("right".into()),
					target_handle: Some("left-target".into()),
				},
				CanvasEvent::ReconnectEnded { edge: "e3".into() },
			]
		);
		let after = fold(graph.clone(), events);
		assert_eq!(after.edges(), graph.edges());
		assert!(!after.is_reconnecting());
	}

	#[test]
	fn leaving_mid_reconnect_ends_it() {
		let graph = connected();
		let mut canvas = CanvasState::new(800.0, 600.0);
		canvas.selection = Selection::Edge("e3".into());
		canvas.pointer_down(&graph, 302.0, 20.0);
		assert_eq!(
			canvas.pointer_leave(),
			vec![CanvasEvent::ReconnectEnded { edge: "e3".into() }]
		);
	}

	#[test]
	fn zoom_keeps_cursor_point_fixed() {
		let config = CanvasConfig::default();
		let mut canvas = CanvasState::new(800.0, 600.0);
		let before = canvas.screen_to_graph(200.0, 100.0);
		canvas.zoom_at(200.0, 100.0, 2.0, &config);
		assert_eq!(canvas.transform.k, 2.0);
		assert_eq!(canvas.screen_to_graph(200.0, 100.0), before);
		canvas.zoom_at(0.0, 0.0, 100.0, &config);
		assert_eq!(canvas.transform.k, config.max_zoom);
	}

	#[test]
	fn fit_view_centers_the_graph() {
		let graph = pair();
		let mut canvas = CanvasState::new(840.0, 400.0);
		canvas.fit_view(&graph, &CanvasConfig::default());
		// Bounds are (0,0)-(434,40); width limits the zoom.
		assert!((canvas.transform.k - 840.0 * 0.8 / 434.0).abs() < 1e-9);
		let (cx, cy) = canvas.screen_to_graph(420.0, 200.0);
		assert!((cx - 217.0).abs() < 1e-9);
		assert!((cy - 20.0).abs() < 1e-9);
	}
}
