//! The analysis backend as seen by the controller.

use crate::error::BridgeResult;
use crate::protocol::{AnalysisRequest, AnalysisResult};

/// Calls the controller makes against the backend API.
#[allow(async_fn_in_trait)]
pub trait Backend {
	/// `GET /api/v1/config/openai-key`, returning the short-lived key.
	async fn fetch_key(&self) -> BridgeResult<String>;

	/// `POST /api/v1/analyze`. `api_key` goes into `X-API-Key` when present.
	async fn analyze(
		&self,
		request: &AnalysisRequest,
		api_key: Option<&str>,
	) -> BridgeResult<AnalysisResult>;
}
