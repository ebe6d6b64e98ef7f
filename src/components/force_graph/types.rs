use serde_json::Value;

use crate::error::BridgeError;
use crate::protocol::AnalysisResult;

#[derive(Clone, Debug, PartialEq)]
pub struct GraphNode {
	pub id: String,
	pub label: Option<String>,
	pub kind: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct GraphLink {
	pub source: String,
	pub target: String,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct GraphData {
	pub nodes: Vec<GraphNode>,
	pub links: Vec<GraphLink>,
}

/// Strings and numbers both work as ids.
fn scalar(value: Option<&Value>) -> Option<String> {
	match value? {
		Value::String(s) if !s.is_empty() => Some(s.clone()),
		Value::Number(n) => Some(n.to_string()),
		_ => None,
	}
}

fn first_of(record: &Value, keys: &[&str]) -> Option<String> {
	keys.iter().find_map(|key| scalar(record.get(*key)))
}

impl TryFrom<&AnalysisResult> for GraphData {
	type Error = BridgeError;

	fn try_from(result: &AnalysisResult) -> Result<Self, Self::Error> {
		let nodes = result
			.nodes
			.iter()
			.enumerate()
			.map(|(i, record)| {
				let id = scalar(record.get("id"))
					.ok_or_else(|| BridgeError::Render(format!("node {i} has no id")))?;
				Ok(GraphNode {
					id,
					label: first_of(record, &["label", "name", "title"]),
					kind: first_of(record, &["type", "group", "kind"]),
				})
			})
			.collect::<Result<Vec<_>, BridgeError>>()?;

		let links = result
			.edges
			.iter()
			.enumerate()
			.map(|(i, record)| {
				match (
					first_of(record, &["source", "from"]),
					first_of(record, &["target", "to"]),
				) {
					(Some(source), Some(target)) => Ok(GraphLink { source, target }),
					_ => Err(BridgeError::Render(format!(
						"edge {i} needs a source and a target"
					))),
				}
			})
			.collect::<Result<Vec<_>, BridgeError>>()?;

		Ok(Self { nodes, links })
	}
}
