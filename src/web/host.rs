//! The parent window as a host channel, plus page globals the host can set.

use std::cell::RefCell;

use log::{debug, warn};
use serde_json::Value;
use wasm_bindgen::prelude::*;
use web_sys::MessageEvent;

use crate::bridge::{CommandRouter, HostBridge, HostChannel};
use crate::config::BridgeConfig;
use crate::protocol::HostEvent;

const CONFIG_GLOBAL: &str = "repoVizConfig";

/// `postMessage` to `window.parent`, `message` events from anyone.
pub struct ParentWindow {
	target_origin: String,
	listener: RefCell<Option<Closure<dyn FnMut(MessageEvent)>>>,
}

impl ParentWindow {
	/// Channel posting with `target_origin`.
	pub fn new(target_origin: impl Into<String>) -> Self {
		Self {
			target_origin: target_origin.into(),
			listener: RefCell::new(None),
		}
	}
}

impl HostChannel for ParentWindow {
	fn publish(&self, event: &HostEvent) {
		let Some(parent) = web_sys::window().and_then(|w| w.parent().ok().flatten()) else {
			return;
		};
		let message = match serde_json::to_string(event) {
			Ok(json) => js_sys::JSON::parse(&json),
			Err(e) => {
				warn!("Could not encode host event: {e}");
				return;
			}
		};
		match message {
			Ok(message) => {
				if let Err(e) = parent.post_message(&message, &self.target_origin) {
					warn!("postMessage to host failed: {e:?}");
				}
			}
			Err(e) => warn!("Could not build host message: {e:?}"),
		}
	}

	fn subscribe(&self, router: CommandRouter) {
		let Some(window) = web_sys::window() else {
			warn!("No window, host commands disabled");
			return;
		};
		let listener = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
			let Some(text) = json_text(&event.data()) else {
				debug!("Ignoring host message with no JSON form");
				return;
			};
			debug!("Received message from host: {text}");
			if let Some(command) = HostBridge::decode_str(&text) {
				leptos::task::spawn_local(router(command));
			}
		});
		if let Err(e) =
			window.add_event_listener_with_callback("message", listener.as_ref().unchecked_ref())
		{
			warn!("Could not listen for host messages: {e:?}");
			return;
		}
		*self.listener.borrow_mut() = Some(listener);
	}
}

/// `JSON.stringify(value)`, or `None` when it throws or yields `undefined`.
fn json_text(value: &JsValue) -> Option<String> {
	js_sys::JSON::stringify(value).ok()?.as_string()
}

fn global_json(name: &str) -> Option<Value> {
	let window = web_sys::window()?;
	let value = js_sys::Reflect::get(&window, &JsValue::from_str(name)).ok()?;
	if value.is_undefined() || value.is_null() {
		return None;
	}
	let text = json_text(&value)?;
	match serde_json::from_str(&text) {
		Ok(json) => Some(json),
		Err(e) => {
			warn!("Ignoring window.{name}: {e}");
			None
		}
	}
}

/// Data the host placed in `window[global]` before load.
pub fn injected_data(global: &str) -> Option<Value> {
	global_json(global)
}

/// Build-time defaults overridden by `window.repoVizConfig`, if present.
pub fn page_config() -> BridgeConfig {
	let defaults = BridgeConfig::from_build_env();
	let Some(overrides) = global_json(CONFIG_GLOBAL) else {
		return defaults;
	};
	let backend_url = match overrides.get("backendUrl").and_then(Value::as_str) {
		Some(url) => url.to_string(),
		None => defaults.backend_url.clone(),
	};
	match serde_json::from_value::<BridgeConfig>(overrides) {
		Ok(config) => config.with_backend_url(backend_url),
		Err(e) => {
			warn!("Ignoring window.{CONFIG_GLOBAL}: {e}");
			defaults
		}
	}
}
