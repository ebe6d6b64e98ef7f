//! Error types for the controller.

use thiserror::Error;

/// Result type alias for controller operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Failures the controller reports to diagnostics.
///
/// Only [`BridgeError::MountNotFound`] stops startup; everything else is
/// reported and the page keeps running.
#[derive(Debug, Error)]
pub enum BridgeError {
	/// The visualization mount point is not in the document.
	#[error("Visualization container not found: #{mount_id}")]
	MountNotFound {
		/// Element id that was looked up.
		mount_id: String,
	},

	/// The credential endpoint failed or returned something unusable.
	#[error("{0}")]
	CredentialLoad(String),

	/// The analyze endpoint failed, timed out at the transport, or returned garbage.
	#[error("{0}")]
	BackendRequest(String),

	/// The adapter rejected the data it was asked to draw.
	#[error("render failed: {0}")]
	Render(String),

	/// An `analyze` payload was neither result-shaped nor request-shaped.
	#[error("malformed analyze payload: {0}")]
	MalformedPayload(String),

	/// No adapter is mounted (initialization never succeeded).
	#[error("visualizer not initialized")]
	VisualizerUnavailable,

	/// JSON encoding or decoding failed.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}
