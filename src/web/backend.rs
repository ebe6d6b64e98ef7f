//! HTTP client for the analysis backend.
//!
//! Uses gloo-net in the browser. Native builds get a stub that always fails.

use crate::backend::Backend;
use crate::config::BridgeConfig;
use crate::error::BridgeResult;
use crate::protocol::{AnalysisRequest, AnalysisResult};

/// Talks to the backend over `fetch`.
#[derive(Clone, Debug)]
pub struct HttpBackend {
	key_url: String,
	analyze_url: String,
}

impl HttpBackend {
	/// Client for the endpoints described by `config`.
	pub fn new(config: &BridgeConfig) -> Self {
		Self {
			key_url: config.key_url(),
			analyze_url: config.analyze_url(),
		}
	}
}

#[cfg(target_arch = "wasm32")]
mod wasm_impl {
	use gloo_net::http::Request;
	use serde::Deserialize;

	use super::*;
	use crate::error::BridgeError;

	#[derive(Deserialize)]
	struct KeyResponse {
		key: String,
	}

	impl Backend for HttpBackend {
		async fn fetch_key(&self) -> BridgeResult<String> {
			let resp = Request::get(&self.key_url)
				.send()
				.await
				.map_err(|e| BridgeError::CredentialLoad(format!("Network error: {e}")))?;

			if !resp.ok() {
				let text = resp.text().await.unwrap_or_default();
				let message = if text.is_empty() {
					"Failed to load API key".to_string()
				} else {
					text
				};
				return Err(BridgeError::CredentialLoad(message));
			}

			let body: KeyResponse = resp
				.json()
				.await
				.map_err(|e| BridgeError::CredentialLoad(format!("JSON parse error: {e}")))?;
			Ok(body.key)
		}

		async fn analyze(
			&self,
			request: &AnalysisRequest,
			api_key: Option<&str>,
		) -> BridgeResult<AnalysisResult> {
			let mut builder = Request::post(&self.analyze_url);
			if let Some(key) = api_key {
				builder = builder.header("X-API-Key", key);
			}

			let resp = builder
				.json(request)
				.map_err(|e| BridgeError::BackendRequest(format!("Failed to build request: {e}")))?
				.send()
				.await
				.map_err(|e| BridgeError::BackendRequest(format!("Network error: {e}")))?;

			if !resp.ok() {
				return Err(BridgeError::BackendRequest(format!(
					"HTTP {}: {}",
					resp.status(),
					resp.status_text()
				)));
			}

			resp.json::<AnalysisResult>()
				.await
				.map_err(|e| BridgeError::BackendRequest(format!("JSON parse error: {e}")))
		}
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl Backend for HttpBackend {
	async fn fetch_key(&self) -> BridgeResult<String> {
		Err(crate::error::BridgeError::CredentialLoad(format!(
			"{} is only reachable from the browser",
			self.key_url
		)))
	}

	async fn analyze(
		&self,
		_request: &AnalysisRequest,
		_api_key: Option<&str>,
	) -> BridgeResult<AnalysisResult> {
		Err(crate::error::BridgeError::BackendRequest(format!(
			"{} is only reachable from the browser",
			self.analyze_url
		)))
	}
}
