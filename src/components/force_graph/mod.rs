mod adapter;
mod component;
mod render;
mod state;
mod types;

pub use adapter::CanvasMount;
pub use component::ForceGraphCanvas;
pub use types::GraphData;
