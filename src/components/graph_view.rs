use leptos::prelude::*;
use leptos::task::spawn_local;
use log::{error, info};
use web_sys::File;

use crate::browser;
use crate::graph::{Command, GraphState, NodeKind, Position, export_file_name};

use super::command_bar::CommandBar;
use super::graph_canvas::{CanvasConfig, CanvasEvent, GraphCanvas};

/// Settings of the graph editor screen.
#[derive(Clone, Debug)]
pub struct GraphViewConfig {
	/// New nodes land at a random point of `[0, spawn_extent)²`.
	pub spawn_extent: f64,
	/// Whether the dot grid starts visible.
	pub show_grid: bool,
	/// Start from the demo graph instead of an empty one.
	pub sample: bool,
	pub canvas: CanvasConfig,
}

impl Default for GraphViewConfig {
	fn default() -> Self {
		Self {
			spawn_extent: 500.0,
			show_grid: true,
			sample: true,
			canvas: CanvasConfig::default(),
		}
	}
}

/// The graph editor: owns the graph and wires the canvas and the command bar
/// to it.
#[component]
pub fn GraphView(#[prop(optional)] config: GraphViewConfig) -> impl IntoView {
	let initial = if config.sample {
		GraphState::sample()
	} else {
		GraphState::new()
	};
	let graph = RwSignal::new(initial);
	let kind = RwSignal::new(NodeKind::Email);
	let show_grid = RwSignal::new(config.show_grid);
	let import_error = RwSignal::new(None::<String>);

	let dispatch = move |command: Command| {
		graph.update(|g| *g = std::mem::take(g).apply(command));
	};

	let on_canvas_event = Callback::new(move |event: CanvasEvent| dispatch(event.into()));

	let spawn_extent = config.spawn_extent;
	let on_add = Callback::new(move |_: ()| {
		let position = Position::new(
			js_sys::Math::random() * spawn_extent,
			js_sys::Math::random() * spawn_extent,
		);
		dispatch(Command::AddNode {
			kind: kind.get_untracked(),
			position,
		});
	});

	let on_clear = Callback::new(move |_: ()| dispatch(Command::Clear));

	let on_export = Callback::new(move |_: ()| {
		let snapshot = graph.with_untracked(GraphState::snapshot);
		let name = export_file_name(browser::now_millis());
		match browser::download_text(&name, "application/json", &snapshot.to_json()) {
			Ok(()) => info!(
				"exported {} nodes and {} edges to {name}",
				snapshot.nodes.len(),
				snapshot.edges.len()
			),
			Err(err) => error!("export failed: {err}"),
		}
	});

	let on_import = Callback::new(move |file: File| {
		spawn_local(async move {
			let result = match browser::read_file_text(&file).await {
				Ok(text) => {
					let replaced = graph.try_update(|g| {
						let (next, result) = std::mem::take(g).import(&text);
						*g = next;
						result
					});
					// The editor went away while the file was being read.
					let Some(result) = replaced else { return };
					result
				}
				Err(err) => Err(err),
			};
			match result {
				Ok(()) => {
					let (nodes, edges) = graph
						.try_with_untracked(|g| (g.node_count(), g.edge_count()))
						.unwrap_or_default();
					info!("imported {nodes} nodes and {edges} edges from {}", file.name());
					import_error.try_set(None);
				}
				Err(err) => {
					error!("import of {} failed: {err}", file.name());
					import_error.try_set(Some(format!("Importazione fallita: {err}")));
				}
			}
		});
	});

	let node_count = Signal::derive(move || graph.with(GraphState::node_count));
	let edge_count = Signal::derive(move || graph.with(GraphState::edge_count));

	view! {
		<div class="graph-view">
			<GraphCanvas
				graph=graph
				show_grid=show_grid
				on_event=on_canvas_event
				config=config.canvas
				fullscreen=true
			/>
			<CommandBar
				kind=kind
				show_grid=show_grid
				node_count=node_count
				edge_count=edge_count
				import_error=import_error
				on_add=on_add
				on_clear=on_clear
				on_export=on_export
				on_import=on_import
			/>
		</div>
	}
}
