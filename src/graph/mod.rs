//! The OSINT graph model: entity types, the state reducer and the snapshot
//! codec. Nothing here touches the browser.

mod presentation;
mod snapshot;
mod state;
mod types;

pub use presentation::{
	EdgeStroke, NodeStyle, PRIMARY, Side, edge_stroke, node_style, node_style_by_name,
};
pub use snapshot::{ImportError, export_file_name};
pub use state::{Command, DEFAULT_EDGE_LABEL, GraphState};
pub use types::{
	Edge, EdgeData, MetaValue, Metadata, Node, NodeData, NodeKind, Position, Relationship, Snapshot,
};
