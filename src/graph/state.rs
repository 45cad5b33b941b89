use log::debug;

use super::snapshot::ImportError;
use super::types::{
	Edge, EdgeData, Metadata, Node, NodeData, NodeKind, Position, Relationship, Snapshot,
};

/// Label given to edges drawn by hand.
pub const DEFAULT_EDGE_LABEL: &str = "Relazionato a";

/// A state transition of the graph.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
	/// Create a node of `kind` at `position` with a fresh id.
	AddNode {
		/// Entity kind.
		kind: NodeKind,
		/// Where to place it.
		position: Position,
	},
	/// Append an edge from `source` to `target`.
	Connect {
		/// Source node id.
		source: String,
		/// Target node id.
		target: String,
		/// Handle on the source side, if the gesture picked one.
		source_handle: Option<String>,
		/// Handle on the target side, if the gesture picked one.
		target_handle: Option<String>,
	},
	/// A reconnect gesture started on `edge`.
	BeginReconnect {
		/// Edge being detached.
		edge: String,
	},
	/// Move the endpoints of `edge`.
	Reconnect {
		/// Edge being moved.
		edge: String,
		/// New source node id.
		source: String,
		/// New target node id.
		target: String,
		/// New source handle.
		source_handle: Option<String>,
		/// New target handle.
		target_handle: Option<String>,
	},
	/// The reconnect gesture on `edge` finished, successfully or not.
	EndReconnect {
		/// Edge that was being moved.
		edge: String,
	},
	/// Place node `id` at `position`.
	MoveNode {
		/// Node id.
		id: String,
		/// New top-left corner.
		position: Position,
	},
	/// Remove a node and every edge touching it.
	DeleteNode {
		/// Node id.
		id: String,
	},
	/// Remove one edge.
	DeleteEdge {
		/// Edge id.
		id: String,
	},
	/// Remove everything.
	Clear,
	/// Swap the whole graph for an imported snapshot.
	Replace(Snapshot),
}

#[derive(Clone, Debug, PartialEq)]
struct PendingReconnect {
	edge: String,
	completed: bool,
}

/// The authoritative in-memory graph.
///
/// Every mutation goes through [`GraphState::apply`], which consumes the
/// state and returns the next one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphState {
	nodes: Vec<Node>,
	edges: Vec<Edge>,
	next_id: u64,
	reconnect: Option<PendingReconnect>,
}

impl GraphState {
	/// An empty graph.
	pub fn new() -> Self {
		Self::default()
	}

	/// The demo graph shown on first load.
	pub fn sample() -> Self {
		let mut email_meta = Metadata::manual();
		email_meta.insert("verified", true);
		let mut domain_meta = Metadata::manual();
		domain_meta.insert("registrar", "Example Registrar");

		Self::from_snapshot(Snapshot {
			nodes: vec![
				Node {
					id: "1".into(),
					position: Position::new(250.0, 100.0),
					data: NodeData {
						label: "example@email.com".into(),
						kind: NodeKind::Email,
						metadata: email_meta,
					},
				},
				Node {
					id: "2".into(),
					position: Position::new(100.0, 300.0),
					data: NodeData {
						label: "example.com".into(),
						kind: NodeKind::Domain,
						metadata: domain_meta,
					},
				},
			],
			edges: vec![Edge {
				id: "e1-2".into(),
				source: "1".into(),
				target: "2".into(),
				source_handle: None,
				target_handle: None,
				data: EdgeData {
					relationship: Relationship::AssociatedWith,
					label: Some("Associato a".into()),
				},
			}],
		})
	}

	/// Build a state holding `snapshot`.
	pub fn from_snapshot(snapshot: Snapshot) -> Self {
		Self::default().apply(Command::Replace(snapshot))
	}

	/// Current nodes, in insertion order.
	pub fn nodes(&self) -> &[Node] {
		&self.nodes
	}

	/// Current edges, in insertion order.
	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// Number of nodes.
	pub fn node_count(&self) -> usize {
		self.nodes.len()
	}

	/// Number of edges.
	pub fn edge_count(&self) -> usize {
		self.edges.len()
	}

	/// Find a node by id.
	pub fn node(&self, id: &str) -> Option<&Node> {
		self.nodes.iter().find(|n| n.id == id)
	}

	/// Find an edge by id.
	pub fn edge(&self, id: &str) -> Option<&Edge> {
		self.edges.iter().find(|e| e.id == id)
	}

	/// `true` while a reconnect gesture is open.
	pub fn is_reconnecting(&self) -> bool {
		self.reconnect.is_some()
	}

	/// Copy of the nodes and edges, ready for export.
	pub fn snapshot(&self) -> Snapshot {
		Snapshot {
			nodes: self.nodes.clone(),
			edges: self.edges.clone(),
		}
	}

	/// Apply `command` and return the resulting state.
	pub fn apply(mut self, command: Command) -> Self {
		match command {
			Command::AddNode { kind, position } => {
				let id = self.fresh_id("", |s, id| s.node(id).is_some());
				self.nodes.push(Node {
					id,
					position,
					data: NodeData {
						label: format!("Nuovo {kind}"),
						kind,
						metadata: Metadata::manual(),
					},
				});
			}
			Command::Connect {
				source,
				target,
				source_handle,
				target_handle,
			} => {
				if self.node(&source).is_none() || self.node(&target).is_none() {
					debug!("connect {source} -> {target} ignored: unknown node");
					return self;
				}
				let id = self.fresh_id("e", |s, id| s.edge(id).is_some());
				self.edges.push(Edge {
					id,
					source,
					target,
					source_handle,
					target_handle,
					data: EdgeData {
						relationship: Relationship::RelatedTo,
						label: Some(DEFAULT_EDGE_LABEL.into()),
					},
				});
			}
			Command::BeginReconnect { edge } => {
				if self.edge(&edge).is_some() {
					self.reconnect = Some(PendingReconnect {
						edge,
						completed: false,
					});
				}
			}
			Command::Reconnect {
				edge,
				source,
				target,
				source_handle,
				target_handle,
			} => {
				if self.node(&source).is_none() || self.node(&target).is_none() {
					debug!("reconnect of {edge} ignored: unknown node");
					return self;
				}
				let Some(e) = self.edges.iter_mut().find(|e| e.id == edge) else {
					return self;
				};
				e.source = source;
				e.target = target;
				e.source_handle = source_handle;
				e.target_handle = target_handle;
				if let Some(pending) = self.reconnect.as_mut().filter(|p| p.edge == edge) {
					pending.completed = true;
				}
			}
			Command::EndReconnect { edge } => {
				match self.reconnect.take() {
					Some(pending) if pending.edge == edge => {
						if !pending.completed {
							debug!("reconnect of {edge} aborted, dropping edge");
							self.edges.retain(|e| e.id != edge);
						}
					}
					other => self.reconnect = other,
				}
			}
			Command::MoveNode { id, position } => {
				if let Some(node) = self.nodes.iter_mut().find(|n| n.id == id) {
					node.position = position;
				}
			}
			Command::DeleteNode { id } => {
				self.nodes.retain(|n| n.id != id);
				self.edges.retain(|e| !e.touches(&id));
				self.drop_stale_reconnect();
			}
			Command::DeleteEdge { id } => {
				self.edges.retain(|e| e.id != id);
				self.drop_stale_reconnect();
			}
			Command::Clear => {
				self.nodes.clear();
				self.edges.clear();
				self.reconnect = None;
			}
			Command::Replace(snapshot) => {
				self.nodes = snapshot.nodes;
				self.edges = snapshot.edges;
				self.reconnect = None;
			}
		}
		self
	}

	/// Replace the graph with the document in `text`.
	///
	/// A document that fails to parse leaves the state as it was and hands
	/// back the reason.
	pub fn import(self, text: &str) -> (Self, Result<(), ImportError>) {
		match Snapshot::from_json(text) {
			Ok(snapshot) => (self.apply(Command::Replace(snapshot)), Ok(())),
			Err(err) => {
				debug!("import refused: {err}");
				(self, Err(err))
			}
		}
	}

	/// Next `prefix<n>` id for which `taken` is false.
	fn fresh_id(&mut self, prefix: &str, taken: impl Fn(&Self, &str) -> bool) -> String {
		loop {
			self.next_id += 1;
			let id = format!("{prefix}{}", self.next_id);
			if !taken(self, &id) {
				return id;
			}
		}
	}

	fn drop_stale_reconnect(&mut self) {
		if let Some(pending) = &self.reconnect {
			if self.edge(&pending.edge).is_none() {
				self.reconnect = None;
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn add(state: GraphState, kind: NodeKind) -> GraphState {
		state.apply(Command::AddNode {
			kind,
			position: Position::new(10.0, 20.0),
		})
	}

	fn connect(state: GraphState, source: &str, target: &str) -> GraphState {
		state.apply(Command::Connect {
			source: source.into(),
			target: target.into(),
			source_handle: None,
			target_handle: None,
		})
	}

	#[test]
	fn add_node_uses_kind_and_manual_source() {
		let state = add(GraphState::new(), NodeKind::Phone);
		let node = &state.nodes()[0];
		assert_eq!(node.kind(), NodeKind::Phone);
		assert_eq!(node.label(), "Nuovo phone");
		assert_eq!(node.data.metadata.source(), Some("manual"));
		assert_eq!(node.position, Position::new(10.0, 20.0));
	}

	#[test]
	fn fresh_ids_skip_imported_ones() {
		// The sample graph already uses "1" and "2".
		let state = add(GraphState::sample(), NodeKind::Email);
		let state = add(state, NodeKind::Ip);
		let ids: Vec<_> = state.nodes().iter().map(|n| n.id.as_str()).collect();
		assert_eq!(ids, ["1", "2", "3", "4"]);
	}

	#[test]
	fn connect_uses_default_relationship() {
		let state = add(add(GraphState::new(), NodeKind::Email), NodeKind::Domain);
		let state = connect(state, "1", "2");
		let edge = &state.edges()[0];
		assert_eq!(edge.source, "1");
		assert_eq!(edge.target, "2");
		assert_eq!(edge.data.relationship, Relationship::RelatedTo);
		assert_eq!(edge.data.label.as_deref(), Some(DEFAULT_EDGE_LABEL));
	}

	#[test]
	fn connect_to_unknown_node_is_ignored() {
		let state = add(GraphState::new(), NodeKind::Email);
		let before = state.clone();
		assert_eq!(connect(state, "1", "missing"), before);
	}

	#[test]
	fn reconnect_moves_endpoints() {
		let state = GraphState::sample();
		let state = add(state, NodeKind::Person);
		let state = state
			.apply(Command::BeginReconnect { edge: "e1-2".into() })
			.apply(Command::Reconnect {
				edge: "e1-2".into(),
				source: "1".into(),
				target: "3".into(),
				source_handle: Some("bottom".into()),
				target_handle: Some("top-target".into()),
			})
			.apply(Command::EndReconnect { edge: "e1-2".into() });
		let edge = state.edge("e1-2").unwrap();
		assert_eq!(edge.target, "3");
		assert_eq!(edge.target_handle.as_deref(), Some("top-target"));
		assert!(!state.is_reconnecting());
	}

	#[test]
	fn reconnect_to_unknown_node_counts_as_abort() {
		let state = GraphState::sample()
			.apply(Command::BeginReconnect { edge: "e1-2".into() })
			.apply(Command::Reconnect {
				edge: "e1-2".into(),
				source: "1".into(),
				target: "nope".into(),
				source_handle: None,
				target_handle: None,
			})
			.apply(Command::EndReconnect { edge: "e1-2".into() });
		assert_eq!(state.edge_count(), 0);
	}

	#[test]
	fn end_reconnect_for_other_edge_keeps_pending() {
		let state = GraphState::sample()
			.apply(Command::BeginReconnect { edge: "e1-2".into() })
			.apply(Command::EndReconnect { edge: "other".into() });
		assert!(state.is_reconnecting());
		assert_eq!(state.edge_count(), 1);
	}

	#[test]
	fn move_node_updates_position() {
		let state = GraphState::sample().apply(Command::MoveNode {
			id: "2".into(),
			position: Position::new(-5.0, 7.5),
		});
		assert_eq!(state.node("2").unwrap().position, Position::new(-5.0, 7.5));
	}

	#[test]
	fn delete_edge_removes_only_that_edge() {
		let state = connect(GraphState::sample(), "2", "1");
		let state = state.apply(Command::DeleteEdge { id: "e1-2".into() });
		assert_eq!(state.edge_count(), 1);
		assert_eq!(state.edges()[0].source, "2");
		assert_eq!(state.node_count(), 2);
	}

	#[test]
	fn deleting_reconnecting_edge_clears_gesture() {
		let state = GraphState::sample()
			.apply(Command::BeginReconnect { edge: "e1-2".into() })
			.apply(Command::DeleteNode { id: "1".into() });
		assert!(!state.is_reconnecting());
	}

	#[test]
	fn replace_swaps_everything() {
		let state = GraphState::sample().apply(Command::Replace(Snapshot::default()));
		assert_eq!(state.node_count(), 0);
		assert_eq!(state.edge_count(), 0);
	}

	#[test]
	fn import_replaces_graph_and_ends_gesture() {
		let text = add(GraphState::new(), NodeKind::Username).snapshot().to_json();
		let pending = GraphState::sample().apply(Command::BeginReconnect { edge: "e1-2".into() });
		let (state, result) = pending.import(&text);
		assert!(result.is_ok());
		assert!(!state.is_reconnecting());
		assert_eq!(state.node_count(), 1);
		assert_eq!(state.nodes()[0].kind(), NodeKind::Username);
		assert_eq!(state.edge_count(), 0);
	}

	#[test]
	fn refused_import_keeps_graph() {
		let before = GraphState::sample();
		for text in ["", "[]", r#"{"edges": []}"#, r#"{"nodes": [{"id": 1}], "edges": []}"#] {
			let (state, result) = before.clone().import(text);
			assert!(result.is_err(), "{text:?} was accepted");
			assert_eq!(state, before);
		}
	}
}
