//! Host messaging: typed commands in, typed events out.
//!
//! The bridge never calls the orchestrator directly. A channel delivers
//! decoded [`HostCommand`]s to whatever router subscribed, and schedules the
//! future the router returns.
//!
//! Inbound messages are not origin-checked; any frame that can post to this
//! window can issue commands.

use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use log::debug;
use serde_json::Value;

use crate::protocol::{HostCommand, HostEvent};

/// Work produced by routing one command.
pub type CommandFuture = Pin<Box<dyn Future<Output = ()>>>;

/// Subscriber that turns a command into work.
pub type CommandRouter = Rc<dyn Fn(HostCommand) -> CommandFuture>;

/// Cross-window channel to the host.
pub trait HostChannel {
	/// Fire-and-forget an event to the host.
	fn publish(&self, event: &HostEvent);

	/// Route every future inbound command to `router`.
	fn subscribe(&self, router: CommandRouter);
}

/// Envelope decoding for inbound host messages.
pub struct HostBridge;

impl HostBridge {
	/// Decode an inbound envelope.
	///
	/// Unknown or missing `type`s, and `analyze` without a payload, yield `None`.
	pub fn decode(raw: &Value) -> Option<HostCommand> {
		let command = match raw.get("type").and_then(Value::as_str) {
			Some("analyze") => raw
				.get("payload")
				.filter(|payload| !payload.is_null())
				.map(|payload| HostCommand::Analyze {
					payload: payload.clone(),
				}),
			Some("clear") => Some(HostCommand::Clear),
			_ => None,
		};
		if command.is_none() {
			debug!("Ignoring host message: {raw}");
		}
		command
	}

	/// Decode an envelope that arrived as JSON text.
	pub fn decode_str(raw: &str) -> Option<HostCommand> {
		match serde_json::from_str::<Value>(raw) {
			Ok(value) => Self::decode(&value),
			Err(e) => {
				debug!("Ignoring non-JSON host message: {e}");
				None
			}
		}
	}
}
