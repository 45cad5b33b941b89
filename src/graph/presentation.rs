//! Pure lookup tables mapping graph data to visual attributes.

use super::types::NodeKind;

/// Colors and glyph used to draw one kind of node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeStyle {
	/// Icon glyph drawn before the label.
	pub glyph: &'static str,
	/// Human name shown in the kind picker.
	pub name: &'static str,
	/// Icon color.
	pub text: &'static str,
	/// Card background.
	pub fill: &'static str,
	/// Card border.
	pub border: &'static str,
	/// Dot color in the minimap.
	pub minimap: &'static str,
}

const EMAIL: NodeStyle = NodeStyle {
	glyph: "✉",
	name: "Email",
	text: "#2563eb",
	fill: "#eff6ff",
	border: "#bfdbfe",
	minimap: "#3b82f6",
};
const DOMAIN: NodeStyle = NodeStyle {
	glyph: "🌐",
	name: "Dominio",
	text: "#16a34a",
	fill: "#f0fdf4",
	border: "#bbf7d0",
	minimap: "#10b981",
};
const IP: NodeStyle = NodeStyle {
	glyph: "🖥",
	name: "IP Address",
	text: "#d97706",
	fill: "#fffbeb",
	border: "#fde68a",
	minimap: "#f59e0b",
};
const PERSON: NodeStyle = NodeStyle {
	glyph: "👤",
	name: "Persona",
	text: "#9333ea",
	fill: "#faf5ff",
	border: "#e9d5ff",
	minimap: "#8b5cf6",
};
const USERNAME: NodeStyle = NodeStyle {
	glyph: "@",
	name: "Username",
	text: "#db2777",
	fill: "#fdf2f8",
	border: "#fbcfe8",
	minimap: "#ec4899",
};
const PHONE: NodeStyle = NodeStyle {
	glyph: "☎",
	name: "Telefono",
	text: "#0891b2",
	fill: "#ecfeff",
	border: "#a5f3fc",
	minimap: "#06b6d4",
};
const GENERIC: NodeStyle = NodeStyle {
	glyph: "●",
	name: "Generico",
	text: "#4b5563",
	fill: "#f9fafb",
	border: "#e5e7eb",
	minimap: "#6b7280",
};

/// Style of a node kind.
pub fn node_style(kind: NodeKind) -> &'static NodeStyle {
	match kind {
		NodeKind::Email => &EMAIL,
		NodeKind::Domain => &DOMAIN,
		NodeKind::Ip => &IP,
		NodeKind::Person => &PERSON,
		NodeKind::Username => &USERNAME,
		NodeKind::Phone => &PHONE,
		NodeKind::Generic => &GENERIC,
	}
}

/// Style for a kind given by name; unknown names get the generic style.
pub fn node_style_by_name(name: &str) -> &'static NodeStyle {
	node_style(NodeKind::from_name(name))
}

/// One side of a node card.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
	/// Upper edge.
	Top,
	/// Right edge.
	Right,
	/// Lower edge.
	Bottom,
	/// Left edge.
	Left,
}

impl Side {
	/// All four sides.
	pub const ALL: [Side; 4] = [Side::Top, Side::Right, Side::Bottom, Side::Left];

	/// Outward unit normal, in screen orientation (y grows downwards).
	pub fn normal(self) -> (f64, f64) {
		match self {
			Side::Top => (0.0, -1.0),
			Side::Right => (1.0, 0.0),
			Side::Bottom => (0.0, 1.0),
			Side::Left => (-1.0, 0.0),
		}
	}

	fn name(self) -> &'static str {
		match self {
			Side::Top => "top",
			Side::Right => "right",
			Side::Bottom => "bottom",
			Side::Left => "left",
		}
	}

	/// Id of the outgoing handle on this side, e.g. `right`.
	pub fn source_handle(self) -> String {
		self.name().to_owned()
	}

	/// Id of the incoming handle on this side, e.g. `right-target`.
	pub fn target_handle(self) -> String {
		format!("{}-target", self.name())
	}

	/// Side named by a handle id, source or target.
	pub fn from_handle(handle: &str) -> Option<Side> {
		let name = handle.strip_suffix("-target").unwrap_or(handle);
		Side::ALL.into_iter().find(|side| side.name() == name)
	}
}

/// Stroke of an edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeStroke {
	/// Line width in graph units.
	pub width: f64,
	/// Line opacity.
	pub alpha: f64,
}

/// Stroke for an edge, thicker and opaque while selected.
pub fn edge_stroke(selected: bool) -> EdgeStroke {
	if selected {
		EdgeStroke { width: 3.0, alpha: 1.0 }
	} else {
		EdgeStroke { width: 2.0, alpha: 0.75 }
	}
}

/// Color of edges, arrowheads and selection rings.
pub const PRIMARY: &str = "#18181b";
