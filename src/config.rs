//! Controller configuration.

use serde::Deserialize;

const KEY_PATH: &str = "/api/v1/config/openai-key";
const ANALYZE_PATH: &str = "/api/v1/analyze";

/// Where the backend lives and which page elements the controller drives.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
	/// Backend origin; empty means same origin as the page.
	pub backend_url: String,
	/// Id of the element the visualizer is mounted into.
	pub mount_id: String,
	/// Id of the diagnostics log container.
	pub diagnostics_id: String,
	/// Commit limit sent with every analyze request built by the controller.
	pub result_limit: u32,
	/// Target origin for messages posted to the parent window.
	pub host_target_origin: String,
	/// Global the host may define to hand over a ready result.
	pub injected_data_global: String,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			backend_url: String::new(),
			mount_id: "visualization".into(),
			diagnostics_id: "diagnosticsContent".into(),
			result_limit: 50,
			host_target_origin: "*".into(),
			injected_data_global: "initialRepoData".into(),
		}
	}
}

impl BridgeConfig {
	/// Defaults, with `REPOVIZ_BACKEND_URL` applied if it was set at build time.
	pub fn from_build_env() -> Self {
		let config = Self::default();
		match option_env!("REPOVIZ_BACKEND_URL") {
			Some(url) => config.with_backend_url(url),
			None => config,
		}
	}

	/// Replace the backend origin. A trailing slash is dropped.
	pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
		let url = url.into();
		self.backend_url = url.trim_end_matches('/').to_string();
		self
	}

	/// Credential endpoint.
	pub fn key_url(&self) -> String {
		format!("{}{}", self.backend_url, KEY_PATH)
	}

	/// Analyze endpoint.
	pub fn analyze_url(&self) -> String {
		format!("{}{}", self.backend_url, ANALYZE_PATH)
	}
}
