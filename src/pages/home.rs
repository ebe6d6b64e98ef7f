use leptos::prelude::*;
use leptos_router::hooks::use_query_map;

use crate::components::force_graph::{CanvasMount, ForceGraphCanvas, GraphData};
use crate::orchestrator::StartupSource;
use crate::web::{self, host};

/// The visualizer page: progress bar, canvas and diagnostics log.
///
/// `?owner=..&repo=..` analyzes that repository on load; otherwise data
/// the host injected is drawn, or the page waits for host commands.
#[component]
pub fn Home() -> impl IntoView {
	let graph = RwSignal::new(None::<GraphData>);
	let config = host::page_config();
	let (mount_id, diagnostics_id) = (config.mount_id.clone(), config.diagnostics_id.clone());
	let controller = StoredValue::new_local(web::build(config, CanvasMount::new(graph)));
	let query = use_query_map();

	// Runs once, after the shell below is in the DOM.
	Effect::new(move |_| {
		let (owner, repo) = query.with_untracked(|q| (q.get("owner"), q.get("repo")));
		let orchestrator = controller.get_value();
		let injected = host::injected_data(&orchestrator.config().injected_data_global);
		let source = StartupSource::select(owner, repo, injected);
		leptos::task::spawn_local(async move {
			orchestrator.start(source).await;
		});
	});

	on_cleanup(move || controller.with_value(|orchestrator| orchestrator.dispose()));

	view! {
		<div class="app">
			<div class="progress-container hidden">
				<div class="progress-bar">
					<div class="progress-fill"></div>
				</div>
				<div class="progress-text">
					<span class="progress-percentage">"0%"</span>
					<span class="progress-status"></span>
				</div>
			</div>

			<div id=mount_id class="visualization-container">
				<ForceGraphCanvas data=graph />
			</div>

			<div class="diagnostics-panel">
				<h3>"Diagnostics"</h3>
				<div id=diagnostics_id class="diagnostics-content"></div>
			</div>
		</div>
	}
}
