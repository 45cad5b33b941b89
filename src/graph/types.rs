use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A point in graph space.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
	/// Horizontal coordinate.
	pub x: f64,
	/// Vertical coordinate.
	pub y: f64,
}

impl Position {
	/// Build a position from its two coordinates.
	pub const fn new(x: f64, y: f64) -> Self {
		Self { x, y }
	}
}

/// The kind of entity a node stands for.
///
/// Unknown names read from a snapshot fall back to [`NodeKind::Generic`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
	/// An email address.
	#[default]
	Email,
	/// A domain name.
	Domain,
	/// An IP address.
	Ip,
	/// A person.
	Person,
	/// A username or handle.
	Username,
	/// A phone number.
	Phone,
	/// Anything else.
	#[serde(other)]
	Generic,
}

impl NodeKind {
	/// Every kind, in menu order.
	pub const ALL: [NodeKind; 7] = [
		NodeKind::Email,
		NodeKind::Domain,
		NodeKind::Ip,
		NodeKind::Person,
		NodeKind::Username,
		NodeKind::Phone,
		NodeKind::Generic,
	];

	/// The wire name of this kind.
	pub fn as_str(self) -> &'static str {
		match self {
			NodeKind::Email => "email",
			NodeKind::Domain => "domain",
			NodeKind::Ip => "ip",
			NodeKind::Person => "person",
			NodeKind::Username => "username",
			NodeKind::Phone => "phone",
			NodeKind::Generic => "generic",
		}
	}

	/// Resolve a wire name, falling back to [`NodeKind::Generic`].
	pub fn from_name(name: &str) -> Self {
		Self::ALL
			.into_iter()
			.find(|kind| kind.as_str() == name)
			.unwrap_or(NodeKind::Generic)
	}
}

impl fmt::Display for NodeKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// The kind of link between two entities.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
	/// Loosely associated.
	AssociatedWith,
	/// Source owns target.
	Owns,
	/// Source belongs to target.
	BelongsTo,
	/// Source talks to target.
	CommunicatesWith,
	/// Source hosts target.
	Hosts,
	/// Source resolves to target.
	ResolvesTo,
	/// Generic relation, the default for new connections. Unknown names
	/// read back as this one.
	#[default]
	#[serde(other)]
	RelatedTo,
}

impl Relationship {
	/// The wire name of this relationship.
	pub fn as_str(self) -> &'static str {
		match self {
			Relationship::AssociatedWith => "associated_with",
			Relationship::RelatedTo => "related_to",
			Relationship::Owns => "owns",
			Relationship::BelongsTo => "belongs_to",
			Relationship::CommunicatesWith => "communicates_with",
			Relationship::Hosts => "hosts",
			Relationship::ResolvesTo => "resolves_to",
		}
	}
}

impl fmt::Display for Relationship {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

/// A loosely typed metadata value.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetaValue {
	/// `true` / `false`.
	Bool(bool),
	/// Any JSON number. Integers keep their exact value.
	Number(serde_json::Number),
	/// Free text.
	Text(String),
	/// Anything else (null, arrays, objects), kept verbatim.
	Other(serde_json::Value),
}

impl From<bool> for MetaValue {
	fn from(value: bool) -> Self {
		MetaValue::Bool(value)
	}
}

impl From<f64> for MetaValue {
	/// NaN and infinities have no JSON form and become `null`.
	fn from(value: f64) -> Self {
		serde_json::Number::from_f64(value)
			.map_or(MetaValue::Other(serde_json::Value::Null), MetaValue::Number)
	}
}

impl From<i64> for MetaValue {
	fn from(value: i64) -> Self {
		MetaValue::Number(value.into())
	}
}

impl From<u64> for MetaValue {
	fn from(value: u64) -> Self {
		MetaValue::Number(value.into())
	}
}

impl From<&str> for MetaValue {
	fn from(value: &str) -> Self {
		MetaValue::Text(value.to_owned())
	}
}

impl From<String> for MetaValue {
	fn from(value: String) -> Self {
		MetaValue::Text(value)
	}
}

/// Open-ended key/value metadata attached to a node.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Metadata(BTreeMap<String, MetaValue>);

impl Metadata {
	/// Metadata for a node created by hand: `{source: "manual"}`.
	pub fn manual() -> Self {
		let mut meta = Self::default();
		meta.insert("source", "manual");
		meta
	}

	/// Set `key` to `value`, replacing any previous value.
	pub fn insert(&mut self, key: impl Into<String>, value: impl Into<MetaValue>) {
		self.0.insert(key.into(), value.into());
	}

	/// Look up a raw value.
	pub fn get(&self, key: &str) -> Option<&MetaValue> {
		self.0.get(key)
	}

	fn text(&self, key: &str) -> Option<&str> {
		match self.0.get(key) {
			Some(MetaValue::Text(s)) => Some(s),
			_ => None,
		}
	}

	/// Where the entity came from.
	pub fn source(&self) -> Option<&str> {
		self.text("source")
	}

	/// Registrar of a domain.
	pub fn registrar(&self) -> Option<&str> {
		self.text("registrar")
	}

	/// Whether the entity has been verified.
	pub fn verified(&self) -> Option<bool> {
		match self.0.get("verified") {
			Some(MetaValue::Bool(b)) => Some(*b),
			_ => None,
		}
	}

	/// Iterate entries in key order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &MetaValue)> {
		self.0.iter().map(|(k, v)| (k.as_str(), v))
	}

	/// Number of entries.
	pub fn len(&self) -> usize {
		self.0.len()
	}

	/// `true` when there are no entries.
	pub fn is_empty(&self) -> bool {
		self.0.is_empty()
	}
}

/// The typed payload of a node.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodeData {
	/// Display label.
	pub label: String,
	/// Entity kind.
	#[serde(rename = "type")]
	pub kind: NodeKind,
	/// Extra attributes.
	#[serde(default)]
	pub metadata: Metadata,
}

/// A node of the graph.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Node {
	/// Unique identifier.
	pub id: String,
	/// Top-left corner in graph space.
	pub position: Position,
	/// Typed payload.
	pub data: NodeData,
}

impl Node {
	/// Entity kind shortcut.
	pub fn kind(&self) -> NodeKind {
		self.data.kind
	}

	/// Label shortcut.
	pub fn label(&self) -> &str {
		&self.data.label
	}
}

/// The typed payload of an edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
	/// Relationship kind.
	#[serde(default)]
	pub relationship: Relationship,
	/// Optional label drawn at the middle of the curve.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub label: Option<String>,
}

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Edge {
	/// Unique identifier.
	pub id: String,
	/// Source node id.
	pub source: String,
	/// Target node id.
	pub target: String,
	/// Handle the edge leaves from, e.g. `right`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub source_handle: Option<String>,
	/// Handle the edge arrives at, e.g. `left-target`.
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub target_handle: Option<String>,
	/// Typed payload.
	#[serde(default)]
	pub data: EdgeData,
}

impl Edge {
	/// `true` if either endpoint is `node_id`.
	pub fn touches(&self, node_id: &str) -> bool {
		self.source == node_id || self.target == node_id
	}
}

/// The unit of export and import: every node and every edge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
	/// All nodes.
	pub nodes: Vec<Node>,
	/// All edges.
	pub edges: Vec<Edge>,
}
