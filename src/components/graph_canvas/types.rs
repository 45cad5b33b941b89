use crate::graph::{Command, Position};

/// A completed gesture the canvas reports to its owner.
///
/// The canvas never edits the graph itself; the owner folds these back into
/// its state, usually through `Command::from`.
#[derive(Clone, Debug, PartialEq)]
pub enum CanvasEvent {
	NodeMoved {
		id: String,
		position: Position,
	},
	Connected {
		source: String,
		target: String,
		source_handle: Option<String>,
		target_handle: Option<String>,
	},
	ReconnectStarted {
		edge: String,
	},
	Reconnected {
		edge: String,
		source: String,
		target: String,
		source_handle: Option<String>,
		target_handle: Option<String>,
	},
	/// Always follows `ReconnectStarted`, whether or not `Reconnected` came
	/// in between.
	ReconnectEnded {
		edge: String,
	},
	NodeDeleted {
		id: String,
	},
	EdgeDeleted {
		id: String,
	},
}

impl From<CanvasEvent> for Command {
	fn from(event: CanvasEvent) -> Self {
		match event {
			CanvasEvent::NodeMoved { id, position } => Command::MoveNode { id, position },
			CanvasEvent::Connected {
				source,
				target,
				source_handle,
				target_handle,
			} => Command::Connect {
				source,
				target,
				source_handle,
				target_handle,
			},
			CanvasEvent::ReconnectStarted { edge } => Command::BeginReconnect { edge },
			CanvasEvent::Reconnected {
				edge,
				source,
				target,
				source_handle,
				target_handle,
			} => Command::Reconnect {
				edge,
				source,
				target,
				source_handle,
				target_handle,
			},
			CanvasEvent::ReconnectEnded { edge } => Command::EndReconnect { edge },
			CanvasEvent::NodeDeleted { id } => Command::DeleteNode { id },
			CanvasEvent::EdgeDeleted { id } => Command::DeleteEdge { id },
		}
	}
}

/// Tuning knobs of the canvas.
#[derive(Clone, Debug, PartialEq)]
pub struct CanvasConfig {
	/// Distance between background dots, in graph units.
	pub grid_gap: f64,
	/// Side of a background dot, in graph units.
	pub grid_dot: f64,
	pub min_zoom: f64,
	pub max_zoom: f64,
	/// Zoom factor of one wheel notch or control click.
	pub zoom_step: f64,
	pub minimap_width: f64,
	pub minimap_height: f64,
	/// Margin kept around the graph by "fit view", as a fraction of the viewport.
	pub fit_padding: f64,
}

impl Default for CanvasConfig {
	fn default() -> Self {
		Self {
			grid_gap: 12.0,
			grid_dot: 1.0,
			min_zoom: 0.2,
			max_zoom: 4.0,
			zoom_step: 1.2,
			minimap_width: 200.0,
			minimap_height: 150.0,
			fit_padding: 0.1,
		}
	}
}
