//! Browser implementations of the controller's ports.

pub mod backend;
pub mod dom;
pub mod host;

use std::rc::Rc;

use crate::components::force_graph::CanvasMount;
use crate::config::BridgeConfig;
use crate::orchestrator::Orchestrator;

use self::backend::HttpBackend;
use self::dom::DomStatusView;
use self::host::ParentWindow;

/// The controller as wired in the browser.
pub type WebOrchestrator = Orchestrator<HttpBackend, CanvasMount, DomStatusView, ParentWindow>;

/// Wire the browser ports together. Nothing runs until `start`.
pub fn build(config: BridgeConfig, mount: CanvasMount) -> Rc<WebOrchestrator> {
	let backend = HttpBackend::new(&config);
	let view = DomStatusView::new(config.diagnostics_id.clone());
	let channel = Rc::new(ParentWindow::new(config.host_target_origin.clone()));
	Rc::new(Orchestrator::new(config, backend, mount, view, channel))
}
