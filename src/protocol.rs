//! Wire shapes: backend request/response bodies and host envelopes.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::BridgeError;

/// Body of `POST /api/v1/analyze`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisRequest {
	/// Repository owner.
	pub owner: String,
	/// Repository name.
	pub repo: String,
	/// Maximum number of commits the backend should analyze.
	pub limit: u32,
}

impl AnalysisRequest {
	/// Build a request.
	pub fn new(owner: impl Into<String>, repo: impl Into<String>, limit: u32) -> Self {
		Self {
			owner: owner.into(),
			repo: repo.into(),
			limit,
		}
	}
}

/// What the backend returns and what the visualizer draws.
///
/// Node and edge records are passed through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
	/// Opaque node records, in backend order.
	pub nodes: Vec<Value>,
	/// Opaque edge records, in backend order.
	pub edges: Vec<Value>,
}

impl AnalysisResult {
	/// Extract a result from arbitrary data if it carries `nodes` and `edges` arrays.
	pub fn from_payload(data: &Value) -> Option<Self> {
		let nodes = data.get("nodes")?.as_array()?;
		let edges = data.get("edges")?.as_array()?;
		Some(Self {
			nodes: nodes.clone(),
			edges: edges.clone(),
		})
	}
}

/// The two shapes an `analyze` command may carry.
#[derive(Clone, Debug, PartialEq)]
pub enum AnalyzePayload {
	/// Already-computed result, drawn as-is.
	Result(AnalysisResult),
	/// Repository coordinates, fetched from the backend first.
	Request(AnalysisRequest),
}

impl AnalyzePayload {
	/// Classify a host payload. Result-shaped data wins when both shapes match.
	///
	/// `default_limit` fills in a missing `limit` on request-shaped data.
	pub fn decode(data: Value, default_limit: u32) -> Result<Self, BridgeError> {
		if let Some(result) = AnalysisResult::from_payload(&data) {
			return Ok(Self::Result(result));
		}

		let owner = data.get("owner").and_then(Value::as_str);
		let repo = data.get("repo").and_then(Value::as_str);
		match (owner, repo) {
			(Some(owner), Some(repo)) if !owner.is_empty() && !repo.is_empty() => {
				let limit = match data.get("limit") {
					None | Some(Value::Null) => default_limit,
					Some(raw) => raw
						.as_u64()
						.and_then(|limit| u32::try_from(limit).ok())
						.ok_or_else(|| {
							BridgeError::MalformedPayload(format!("invalid limit {raw}"))
						})?,
				};
				Ok(Self::Request(AnalysisRequest::new(owner, repo, limit)))
			}
			_ => Err(BridgeError::MalformedPayload(
				"expected nodes/edges or owner/repo".into(),
			)),
		}
	}
}

/// Commands the host sends into the frame.
#[derive(Clone, Debug, PartialEq)]
pub enum HostCommand {
	/// Analyze or draw the given payload.
	Analyze {
		/// Result-shaped or request-shaped data.
		payload: Value,
	},
	/// Drop the current drawing, diagnostics and progress.
	Clear,
}

/// Diagnostic severity, sent as `messageType`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
	/// Normal progress chatter.
	Info,
	/// A failure converted to a diagnostic.
	Error,
}

impl Severity {
	/// CSS class / wire name.
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Info => "info",
			Self::Error => "error",
		}
	}
}

/// Events relayed to the host.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum HostEvent {
	/// A diagnostic log entry.
	Diagnostics {
		/// `"{timestamp} - {message}"`.
		message: String,
		/// Severity tag.
		#[serde(rename = "messageType")]
		message_type: Severity,
	},
	/// A progress update.
	Progress {
		/// 0..=100.
		percentage: u8,
		/// Status text; `""` hides the indicator, `"failed"` flags an error.
		status: String,
	},
}
