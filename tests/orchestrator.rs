//! End-to-end behaviour of the controller against in-memory ports.
//!
//! Run with: `cargo test --test orchestrator`

mod common;

use common::{Harness, Step, sample_result};
use repo_viz::progress::{Progress, ProgressStatus, Stage};
use repo_viz::protocol::{AnalysisRequest, AnalysisResult, HostEvent, Severity};
use repo_viz::{BridgeError, Phase, StartupSource};
use serde_json::json;
use tokio::sync::oneshot;

// =============================================================================
// In-flight guard
// =============================================================================

#[tokio::test]
async fn overlapping_analyze_is_dropped() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();

	let (release, gate) = oneshot::channel();
	h.vis.script.borrow_mut().push_back(Step::Wait(gate));

	let first = h.orchestrator.handle_analyze(sample_result());
	let second = async {
		h.orchestrator.handle_analyze(sample_result()).await;
		release.send(()).unwrap();
	};
	tokio::join!(first, second);

	assert_eq!(h.vis.renders.borrow().len(), 1);
	assert_eq!(h.vis.max_active.get(), 1);
	assert!(h.messages(Severity::Error).is_empty());
	assert_eq!(
		h.last_progress(),
		Some(Progress::step(Stage::Complete, "Complete"))
	);
	assert!(!h.orchestrator.session().is_in_flight());
	assert_eq!(h.orchestrator.phase(), Phase::Ready);
}

#[tokio::test]
async fn rejected_render_releases_guard() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();
	h.vis.script.borrow_mut().push_back(Step::Reject);

	h.orchestrator.handle_analyze(sample_result()).await;
	assert!(!h.orchestrator.session().is_in_flight());
	assert_eq!(h.last_progress(), Some(Progress::failed()));
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m.contains("bad node shape"))
	);

	h.orchestrator.handle_analyze(sample_result()).await;
	assert_eq!(h.vis.renders.borrow().len(), 2);
	assert_eq!(h.last_progress().unwrap().percentage(), 100);
}

// =============================================================================
// Startup paths
// =============================================================================

#[tokio::test]
async fn url_params_post_once_and_complete() {
	let h = Harness::healthy();
	h.orchestrator
		.start(StartupSource::select(
			Some("foo".into()),
			Some("bar".into()),
			None,
		))
		.await;

	let requests = h.backend.requests.borrow();
	assert_eq!(requests.len(), 1);
	assert_eq!(requests[0].0, AnalysisRequest::new("foo", "bar", 50));
	assert_eq!(requests[0].1.as_deref(), Some("sk-test"));
	assert_eq!(
		serde_json::to_value(&requests[0].0).unwrap(),
		json!({"owner": "foo", "repo": "bar", "limit": 50})
	);

	assert_eq!(*h.vis.renders.borrow(), vec![AnalysisResult::default()]);
	let last = h.last_progress().unwrap();
	assert_eq!(last.percentage(), 100);
	assert_eq!(last.status.as_str(), "Complete");
	assert_eq!(
		h.channel.progress_events().last(),
		Some(&(100, "Complete".to_string()))
	);
}

#[tokio::test]
async fn url_params_backend_failure_marks_failed() {
	let h = Harness::new(Ok("sk-test"), Err("HTTP 502: Bad Gateway"));
	h.orchestrator
		.run_from_url_params("foo".into(), "bar".into())
		.await;

	assert_eq!(h.backend.requests.borrow().len(), 1);
	assert!(h.vis.renders.borrow().is_empty());
	assert_eq!(h.last_progress(), Some(Progress::failed()));
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m == "Error: HTTP 502: Bad Gateway")
	);
	assert!(!h.orchestrator.session().is_in_flight());
}

#[tokio::test]
async fn injected_payload_renders_without_network() {
	let h = Harness::healthy();
	h.orchestrator
		.start(StartupSource::HostPayload(sample_result()))
		.await;

	assert!(h.backend.requests.borrow().is_empty());
	assert_eq!(h.vis.renders.borrow().len(), 1);
	assert_eq!(h.vis.renders.borrow()[0].nodes.len(), 2);
	let pcts: Vec<u8> = h.channel.progress_events().iter().map(|(p, _)| *p).collect();
	assert_eq!(pcts, vec![0, 50, 100]);
	assert!(
		h.messages(Severity::Info)
			.contains(&"Visualization initialized with provided data".to_string())
	);
}

#[tokio::test]
async fn injected_data_without_graph_waits_for_host() {
	let h = Harness::healthy();
	h.orchestrator
		.start(StartupSource::HostPayload(json!({"repo": "bar"})))
		.await;

	assert!(h.vis.renders.borrow().is_empty());
	assert_eq!(h.orchestrator.phase(), Phase::Ready);
	assert_eq!(h.channel.routers.borrow().len(), 1);
}

// =============================================================================
// Initialization
// =============================================================================

#[tokio::test]
async fn credential_failure_is_not_fatal() {
	let h = Harness::new(Err("Internal Server Error"), Ok(AnalysisResult::default()));
	assert!(h.orchestrator.initialize().await.is_ok());

	assert_eq!(h.backend.key_calls.get(), 1);
	assert_eq!(h.orchestrator.session().api_key(), None);
	assert_eq!(h.orchestrator.phase(), Phase::Ready);
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m == "Error loading API key: Internal Server Error")
	);
	assert!(h.channel.events.borrow().iter().any(|e| matches!(
		e,
		HostEvent::Diagnostics {
			message_type: Severity::Error,
			..
		}
	)));

	// Requests still go out, just without a key.
	h.channel
		.deliver(json!({"type": "analyze", "payload": {"owner": "foo", "repo": "bar"}}))
		.await;
	assert_eq!(h.backend.requests.borrow()[0].1, None);
}

#[tokio::test]
async fn credential_error_survives_display_reset() {
	let h = Harness::new(Err("Internal Server Error"), Ok(AnalysisResult::default()));
	h.orchestrator.initialize().await.unwrap();

	let shown: Vec<String> = h
		.view
		.diagnostics
		.borrow()
		.iter()
		.map(|d| d.message.clone())
		.collect();
	assert_eq!(shown, vec!["Error loading API key: Internal Server Error"]);
	assert_eq!(h.last_progress(), Some(Progress::hidden()));
}

#[tokio::test]
async fn missing_mount_fails_initialization() {
	let h = Harness::healthy();
	h.mount_present.set(false);

	let err = h.orchestrator.initialize().await.unwrap_err();
	assert!(matches!(err, BridgeError::MountNotFound { .. }));
	assert_eq!(h.orchestrator.phase(), Phase::Failed);
	assert_eq!(h.last_progress().unwrap().status, ProgressStatus::Failed);
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m.contains("Initialization error"))
	);
	assert!(h.channel.routers.borrow().is_empty());
}

#[tokio::test]
async fn missing_mount_skips_url_request() {
	let h = Harness::healthy();
	h.mount_present.set(false);
	h.orchestrator
		.run_from_url_params("foo".into(), "bar".into())
		.await;

	assert!(h.backend.requests.borrow().is_empty());
	assert_eq!(h.last_progress(), Some(Progress::failed()));
}

#[tokio::test]
async fn analyze_without_visualizer_reports_and_releases() {
	let h = Harness::healthy();
	h.mount_present.set(false);
	let _ = h.orchestrator.initialize().await;

	h.orchestrator.handle_analyze(sample_result()).await;
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m == "Error: visualizer not initialized")
	);
	assert!(!h.orchestrator.session().is_in_flight());
	assert_eq!(h.orchestrator.phase(), Phase::Failed);
}

#[tokio::test]
async fn reinitializing_remounts_without_second_subscription() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();
	h.orchestrator.initialize().await.unwrap();

	assert_eq!(h.vis.mounts.get(), 2);
	assert_eq!(h.vis.disposes.get(), 1);
	assert_eq!(h.channel.routers.borrow().len(), 1);
	assert_eq!(h.last_progress(), Some(Progress::hidden()));
}

// =============================================================================
// Host commands
// =============================================================================

#[tokio::test]
async fn host_analyze_request_fetches_then_renders() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();

	h.channel
		.deliver(json!({"type": "analyze", "payload": {"owner": "a", "repo": "b", "limit": 5}}))
		.await;

	assert_eq!(
		h.backend.requests.borrow()[0],
		(AnalysisRequest::new("a", "b", 5), Some("sk-test".into()))
	);
	assert_eq!(h.vis.renders.borrow().len(), 1);
	let pcts: Vec<u8> = h.channel.progress_events().iter().map(|(p, _)| *p).collect();
	assert_eq!(pcts, vec![0, 0, 20, 80, 100]);
}

#[tokio::test]
async fn malformed_host_payload_is_reported() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();

	h.channel
		.deliver(json!({"type": "analyze", "payload": {"something": "else"}}))
		.await;

	assert!(h.vis.renders.borrow().is_empty());
	assert_eq!(h.last_progress(), Some(Progress::failed()));
	assert!(
		h.messages(Severity::Error)
			.iter()
			.any(|m| m.starts_with("Error: malformed analyze payload"))
	);
}

#[tokio::test]
async fn clear_empties_log_and_hides_progress() {
	let h = Harness::new(Ok("sk-test"), Err("HTTP 500: Internal Server Error"));
	h.orchestrator.initialize().await.unwrap();
	h.channel
		.deliver(json!({"type": "analyze", "payload": {"owner": "a", "repo": "b"}}))
		.await;
	assert!(!h.view.diagnostics.borrow().is_empty());
	assert_eq!(h.last_progress(), Some(Progress::failed()));

	let clears_before = h.vis.clears.get();
	h.channel.deliver(json!({"type": "clear"})).await;

	assert!(h.view.diagnostics.borrow().is_empty());
	assert_eq!(h.last_progress(), Some(Progress::hidden()));
	assert_eq!(
		h.channel.progress_events().last(),
		Some(&(0, String::new()))
	);
	assert_eq!(h.vis.clears.get(), clears_before + 1);
}

#[tokio::test]
async fn unknown_host_messages_are_ignored() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();
	let events_before = h.channel.events.borrow().len();

	h.channel.deliver(json!({"type": "streamlit:setFrameHeight"})).await;
	h.channel.deliver(json!({"type": "analyze"})).await;

	assert_eq!(h.channel.events.borrow().len(), events_before);
	assert!(h.vis.renders.borrow().is_empty());
}

// =============================================================================
// Progress reporting
// =============================================================================

#[tokio::test]
async fn progress_only_takes_known_values() {
	let h = Harness::healthy();
	h.orchestrator
		.run_from_url_params("foo".into(), "bar".into())
		.await;
	h.vis.script.borrow_mut().push_back(Step::Reject);
	h.orchestrator.handle_analyze(sample_result()).await;
	h.orchestrator
		.handle_analyze(json!({"owner": "x", "repo": "y"}))
		.await;
	h.orchestrator.handle_clear();

	let events = h.channel.progress_events();
	assert!(!events.is_empty());
	for (pct, status) in events {
		assert!([0, 20, 50, 80, 100].contains(&pct), "unexpected {pct}");
		if status == "failed" {
			assert_eq!(pct, 0);
		}
	}
}

#[tokio::test]
async fn missing_progress_elements_do_not_stop_analysis() {
	let h = Harness::healthy();
	h.view.progress_missing.set(true);
	h.orchestrator.initialize().await.unwrap();

	h.orchestrator.handle_analyze(sample_result()).await;

	assert_eq!(h.vis.renders.borrow().len(), 1);
	assert!(h.channel.progress_events().is_empty());
	assert!(
		h.messages(Severity::Info)
			.contains(&"Analysis completed successfully".to_string())
	);
}

#[tokio::test]
async fn diagnostics_are_mirrored_to_host() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();
	h.orchestrator.handle_analyze(sample_result()).await;

	let relayed: Vec<String> = h
		.channel
		.events
		.borrow()
		.iter()
		.filter_map(|e| match e {
			HostEvent::Diagnostics { message, .. } => Some(message.clone()),
			_ => None,
		})
		.collect();
	let logged: Vec<String> = h.view.history.borrow().iter().map(|d| d.to_string()).collect();
	assert_eq!(relayed, logged);
	assert!(relayed.iter().all(|m| m.contains(" - ")));
}

#[tokio::test]
async fn dispose_releases_visualizer() {
	let h = Harness::healthy();
	h.orchestrator.initialize().await.unwrap();
	h.orchestrator.dispose();

	assert_eq!(h.vis.disposes.get(), 1);
	assert!(h.orchestrator.session().visualizer().is_none());
	assert_eq!(h.orchestrator.phase(), Phase::Idle);
}
