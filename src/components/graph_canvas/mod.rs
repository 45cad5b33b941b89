mod component;
mod geometry;
mod render;
mod state;
mod types;

pub use component::GraphCanvas;
pub use types::{CanvasConfig, CanvasEvent};
