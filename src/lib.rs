//! Repository visualizer controller.
//!
//! Sits in a frame inside a host page, loads a short-lived backend key,
//! asks the backend to analyze a repository and draws the resulting graph,
//! reporting progress and diagnostics back to the host as it goes.

use leptos::prelude::*;
use leptos_meta::*;
use leptos_router::components::*;
use leptos_router::path;
use log::{Level, info};

// Controller core
pub mod backend;
pub mod bridge;
pub mod config;
pub mod credentials;
pub mod error;
pub mod orchestrator;
pub mod progress;
pub mod protocol;
pub mod session;
pub mod visualizer;

// Browser wiring
mod components;
mod pages;
mod web;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use orchestrator::{Orchestrator, Phase, StartupSource};

// Top-Level pages
use crate::pages::home::Home;
use crate::pages::not_found::NotFound;

/// Initialize logging and panic hooks for the WASM target.
pub fn init_logging() {
	let _ = console_log::init_with_level(Level::Debug);
	console_error_panic_hook::set_once();
	info!("Logging initialized");
}

/// Router for the visualizer page.
#[component]
pub fn App() -> impl IntoView {
	// Provides context that manages stylesheets, titles, meta tags, etc.
	provide_meta_context();

	view! {
		<Html attr:lang="en" attr:dir="ltr" />

		<Title text="Repository Visualizer" />

		<Meta charset="UTF-8" />
		<Meta name="viewport" content="width=device-width, initial-scale=1.0" />

		<Router>
			<Routes fallback=|| view! { <NotFound /> }>
				<Route path=path!("/") view=Home />
			</Routes>
		</Router>
	}
}
