//! JSON export and import of graph snapshots.

use serde_json::Value;
use thiserror::Error;

use super::types::Snapshot;

/// Why an imported document was refused.
#[derive(Error, Debug)]
pub enum ImportError {
	/// The text is not valid JSON or a list has the wrong shape.
	#[error("invalid JSON: {0}")]
	Json(#[from] serde_json::Error),

	/// The document is valid JSON but not an object.
	#[error("the document is not a JSON object")]
	NotAnObject,

	/// A required top-level list is absent.
	#[error("missing `{0}` list")]
	MissingField(&'static str),

	/// The browser could not read the chosen file.
	#[error("could not read file: {0}")]
	Read(String),
}

/// Result of an import.
pub type Result<T> = std::result::Result<T, ImportError>;

/// File name for an export taken at `epoch_ms`.
pub fn export_file_name(epoch_ms: u64) -> String {
	format!("grafo-{epoch_ms}.json")
}

impl Snapshot {
	/// Pretty-printed JSON document.
	pub fn to_json(&self) -> String {
		// Plain data with string keys cannot fail to serialize.
		serde_json::to_string_pretty(self).unwrap_or_default()
	}

	/// Parse a document produced by [`Snapshot::to_json`] (or any editor
	/// writing the same `{nodes, edges}` shape).
	pub fn from_json(text: &str) -> Result<Self> {
		let value: Value = serde_json::from_str(text)?;
		let Value::Object(map) = &value else {
			return Err(ImportError::NotAnObject);
		};
		for field in ["nodes", "edges"] {
			if !map.contains_key(field) {
				return Err(ImportError::MissingField(field));
			}
		}
		Ok(serde_json::from_value(value)?)
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::graph::{GraphState, NodeKind, Relationship};

	#[test]
	fn export_name_uses_millis() {
		assert_eq!(export_file_name(1_700_000_000_123), "grafo-1700000000123.json");
	}

	#[test]
	fn export_is_pretty_and_keyed() {
		let text = GraphState::sample().snapshot().to_json();
		assert!(text.contains('\n'));
		let value: Value = serde_json::from_str(&text).unwrap();
		assert_eq!(value["nodes"][0]["data"]["type"], "email");
		assert_eq!(value["edges"][0]["data"]["relationship"], "associated_with");
		assert_eq!(value["nodes"][1]["data"]["metadata"]["registrar"], "Example Registrar");
	}

	#[test]
	fn reads_foreign_editor_fields() {
		let doc = json!({
			"nodes": [{
				"id": "a",
				"type": "osint",
				"width": 150,
				"selected": false,
				"position": { "x": 1.5, "y": 2 },
				"data": { "label": "10.0.0.1", "type": "ip" }
			}],
			"edges": [{
				"id": "x",
				"source": "a",
				"sourceHandle": "right",
				"target": "a",
				"targetHandle": null
			}]
		});
		let snap = Snapshot::from_json(&doc.to_string()).unwrap();
		assert_eq!(snap.nodes[0].kind(), NodeKind::Ip);
		assert!(snap.nodes[0].data.metadata.is_empty());
		assert_eq!(snap.edges[0].source_handle.as_deref(), Some("right"));
		assert_eq!(snap.edges[0].target_handle, None);
		assert_eq!(snap.edges[0].data.relationship, Relationship::RelatedTo);
	}

	#[test]
	fn unknown_kinds_fall_back() {
		let doc = json!({
			"nodes": [{
				"id": "a",
				"position": { "x": 0, "y": 0 },
				"data": { "label": "?", "type": "vehicle", "metadata": { "seen": [1, 2] } }
			}],
			"edges": [{
				"id": "x", "source": "a", "target": "a",
				"data": { "relationship": "knows" }
			}]
		});
		let snap = Snapshot::from_json(&doc.to_string()).unwrap();
		assert_eq!(snap.nodes[0].kind(), NodeKind::Generic);
		assert_eq!(snap.edges[0].data.relationship, Relationship::RelatedTo);
		assert!(matches!(
			snap.nodes[0].data.metadata.get("seen"),
			Some(crate::graph::MetaValue::Other(_))
		));
	}

	#[test]
	fn relationship_names_read_back() {
		let names = [
			"associated_with",
			"owns",
			"belongs_to",
			"communicates_with",
			"hosts",
			"resolves_to",
			"related_to",
		];
		for name in names {
			let rel: Relationship = serde_json::from_value(json!(name)).unwrap();
			assert_eq!(rel.as_str(), name);
			assert_eq!(serde_json::to_value(rel).unwrap(), json!(name));
		}
		let rel: Relationship = serde_json::from_value(json!("knows")).unwrap();
		assert_eq!(rel, Relationship::RelatedTo);
	}

	#[test]
	fn integer_metadata_is_kept_exactly() {
		let metadata = json!({
			"port": 443,
			"asn": 9_007_199_254_740_993_u64,
			"offset": -12,
			"score": 0.5
		});
		let doc = json!({
			"nodes": [{
				"id": "a",
				"position": { "x": 0, "y": 0 },
				"data": { "label": "mx", "type": "domain", "metadata": metadata }
			}],
			"edges": []
		});
		let exported = Snapshot::from_json(&doc.to_string()).unwrap().to_json();
		assert!(!exported.contains("443.0"));
		let value: Value = serde_json::from_str(&exported).unwrap();
		assert_eq!(value["nodes"][0]["data"]["metadata"], metadata);
	}

	#[test]
	fn missing_lists_are_reported() {
		let err = Snapshot::from_json(r#"{"nodes": []}"#).unwrap_err();
		assert!(matches!(err, ImportError::MissingField("edges")));
		let err = Snapshot::from_json(r#"{"edges": []}"#).unwrap_err();
		assert!(matches!(err, ImportError::MissingField("nodes")));
	}

	#[test]
	fn non_object_and_garbage_are_rejected() {
		assert!(matches!(Snapshot::from_json("[1, 2]"), Err(ImportError::NotAnObject)));
		assert!(matches!(Snapshot::from_json("{not json"), Err(ImportError::Json(_))));
		assert!(matches!(
			Snapshot::from_json(r#"{"nodes": 3, "edges": []}"#),
			Err(ImportError::Json(_))
		));
	}
}
