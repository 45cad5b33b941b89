pub mod command_bar;
pub mod graph_canvas;
pub mod graph_view;
