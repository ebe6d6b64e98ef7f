//! Boundary to the rendering component.

use crate::error::BridgeResult;
use crate::protocol::AnalysisResult;

/// Something that can draw an analysis result.
///
/// All methods take `&self`; implementations keep their own interior state
/// so a clear can arrive while a render is pending.
#[allow(async_fn_in_trait)]
pub trait Visualizer {
	/// Draw `data`. Resolves once drawn, fails on data it cannot draw.
	async fn render(&self, data: &AnalysisResult) -> BridgeResult<()>;

	/// Remove the current drawing.
	fn clear(&self);

	/// Release rendering resources. The visualizer is not used afterwards.
	fn dispose(&self);
}

/// Creates visualizers bound to a page element.
pub trait VisualizerFactory {
	/// Visualizer type produced.
	type Output: Visualizer;

	/// Bind a new visualizer to the element with id `mount_id`.
	///
	/// Fails with [`crate::error::BridgeError::MountNotFound`] if there is no such element.
	fn mount(&self, mount_id: &str) -> BridgeResult<Self::Output>;
}
