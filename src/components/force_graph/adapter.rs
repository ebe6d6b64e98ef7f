//! The canvas as the controller's visualizer.

use std::cell::Cell;

use leptos::prelude::*;
use log::info;

use super::types::GraphData;
use crate::error::{BridgeError, BridgeResult};
use crate::protocol::AnalysisResult;
use crate::visualizer::{Visualizer, VisualizerFactory};
use crate::web::dom;

/// Hands out visualizers that feed the page's [`super::ForceGraphCanvas`].
#[derive(Clone, Copy)]
pub struct CanvasMount {
	graph: RwSignal<Option<GraphData>>,
}

impl CanvasMount {
	/// Mount feeding the canvas bound to `graph`.
	pub fn new(graph: RwSignal<Option<GraphData>>) -> Self {
		Self { graph }
	}
}

impl VisualizerFactory for CanvasMount {
	type Output = CanvasVisualizer;

	fn mount(&self, mount_id: &str) -> BridgeResult<CanvasVisualizer> {
		if !dom::element_exists(mount_id) {
			return Err(BridgeError::MountNotFound {
				mount_id: mount_id.to_string(),
			});
		}
		info!("Visualizer mounted on #{mount_id}");
		Ok(CanvasVisualizer {
			graph: self.graph,
			disposed: Cell::new(false),
		})
	}
}

pub struct CanvasVisualizer {
	graph: RwSignal<Option<GraphData>>,
	disposed: Cell<bool>,
}

impl Visualizer for CanvasVisualizer {
	async fn render(&self, data: &AnalysisResult) -> BridgeResult<()> {
		if self.disposed.get() {
			return Err(BridgeError::Render("visualizer was disposed".into()));
		}
		let graph = GraphData::try_from(data)?;
		info!(
			"Drawing {} nodes and {} links",
			graph.nodes.len(),
			graph.links.len()
		);
		if self.graph.try_set(Some(graph)).is_some() {
			return Err(BridgeError::Render("canvas is gone".into()));
		}
		Ok(())
	}

	fn clear(&self) {
		let _ = self.graph.try_set(None);
	}

	fn dispose(&self) {
		self.disposed.set(true);
		let _ = self.graph.try_set(None);
	}
}
