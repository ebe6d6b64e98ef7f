//! In-memory ports shared by the integration tests.

#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use repo_viz::backend::Backend;
use repo_viz::bridge::{CommandRouter, HostBridge, HostChannel};
use repo_viz::progress::{Diagnostic, MissingElement, Progress, StatusView};
use repo_viz::protocol::{AnalysisRequest, AnalysisResult, HostEvent, Severity};
use repo_viz::visualizer::{Visualizer, VisualizerFactory};
use repo_viz::{BridgeConfig, BridgeError, BridgeResult, Orchestrator};
use serde_json::{Value, json};
use tokio::sync::oneshot;

// =============================================================================
// Doubles
// =============================================================================

#[derive(Default)]
pub struct BackendLog {
	pub key_calls: Cell<usize>,
	pub requests: RefCell<Vec<(AnalysisRequest, Option<String>)>>,
}

pub struct StubBackend {
	pub log: Rc<BackendLog>,
	pub key: Result<String, String>,
	pub response: Result<AnalysisResult, String>,
}

impl Backend for StubBackend {
	async fn fetch_key(&self) -> BridgeResult<String> {
		self.log.key_calls.set(self.log.key_calls.get() + 1);
		self.key.clone().map_err(BridgeError::CredentialLoad)
	}

	async fn analyze(
		&self,
		request: &AnalysisRequest,
		api_key: Option<&str>,
	) -> BridgeResult<AnalysisResult> {
		self.log
			.requests
			.borrow_mut()
			.push((request.clone(), api_key.map(str::to_string)));
		self.response.clone().map_err(BridgeError::BackendRequest)
	}
}

/// What the next render does.
pub enum Step {
	Reject,
	Wait(oneshot::Receiver<()>),
}

#[derive(Default)]
pub struct VisLog {
	pub mounts: Cell<usize>,
	pub renders: RefCell<Vec<AnalysisResult>>,
	pub active: Cell<usize>,
	pub max_active: Cell<usize>,
	pub clears: Cell<usize>,
	pub disposes: Cell<usize>,
	pub script: RefCell<VecDeque<Step>>,
}

pub struct StubVisualizer {
	pub log: Rc<VisLog>,
}

impl Visualizer for StubVisualizer {
	async fn render(&self, data: &AnalysisResult) -> BridgeResult<()> {
		let log = &self.log;
		log.active.set(log.active.get() + 1);
		log.max_active.set(log.max_active.get().max(log.active.get()));
		log.renders.borrow_mut().push(data.clone());

		let step = log.script.borrow_mut().pop_front();
		let outcome = match step {
			Some(Step::Reject) => Err(BridgeError::Render("bad node shape".into())),
			Some(Step::Wait(gate)) => {
				let _ = gate.await;
				Ok(())
			}
			None => Ok(()),
		};
		log.active.set(log.active.get() - 1);
		outcome
	}

	fn clear(&self) {
		self.log.clears.set(self.log.clears.get() + 1);
	}

	fn dispose(&self) {
		self.log.disposes.set(self.log.disposes.get() + 1);
	}
}

pub struct StubMount {
	pub log: Rc<VisLog>,
	pub present: Rc<Cell<bool>>,
}

impl VisualizerFactory for StubMount {
	type Output = StubVisualizer;

	fn mount(&self, mount_id: &str) -> BridgeResult<StubVisualizer> {
		if !self.present.get() {
			return Err(BridgeError::MountNotFound {
				mount_id: mount_id.to_string(),
			});
		}
		self.log.mounts.set(self.log.mounts.get() + 1);
		Ok(StubVisualizer {
			log: self.log.clone(),
		})
	}
}

#[derive(Default)]
pub struct ViewLog {
	pub progress: RefCell<Vec<Progress>>,
	pub diagnostics: RefCell<Vec<Diagnostic>>,
	pub history: RefCell<Vec<Diagnostic>>,
	pub progress_missing: Cell<bool>,
}

pub struct RecordingView(pub Rc<ViewLog>);

impl StatusView for RecordingView {
	fn show_progress(&self, progress: &Progress) -> Result<(), MissingElement> {
		if self.0.progress_missing.get() {
			return Err(MissingElement(".progress-fill".into()));
		}
		self.0.progress.borrow_mut().push(progress.clone());
		Ok(())
	}

	fn append_diagnostic(&self, entry: &Diagnostic) -> Result<(), MissingElement> {
		self.0.diagnostics.borrow_mut().push(entry.clone());
		self.0.history.borrow_mut().push(entry.clone());
		Ok(())
	}

	fn clear_diagnostics(&self) {
		self.0.diagnostics.borrow_mut().clear();
	}
}

#[derive(Default)]
pub struct RecordingChannel {
	pub events: RefCell<Vec<HostEvent>>,
	pub routers: RefCell<Vec<CommandRouter>>,
}

impl HostChannel for RecordingChannel {
	fn publish(&self, event: &HostEvent) {
		self.events.borrow_mut().push(event.clone());
	}

	fn subscribe(&self, router: CommandRouter) {
		self.routers.borrow_mut().push(router);
	}
}

impl RecordingChannel {
	/// Deliver a raw envelope the way the browser listener does.
	pub async fn deliver(&self, raw: Value) {
		let Some(command) = HostBridge::decode(&raw) else {
			return;
		};
		let routers = self.routers.borrow().clone();
		for router in routers {
			router(command.clone()).await;
		}
	}

	pub fn progress_events(&self) -> Vec<(u8, String)> {
		self.events
			.borrow()
			.iter()
			.filter_map(|e| match e {
				HostEvent::Progress { percentage, status } => Some((*percentage, status.clone())),
				_ => None,
			})
			.collect()
	}
}

pub type TestOrchestrator = Orchestrator<StubBackend, StubMount, RecordingView, RecordingChannel>;

pub struct Harness {
	pub orchestrator: Rc<TestOrchestrator>,
	pub backend: Rc<BackendLog>,
	pub vis: Rc<VisLog>,
	pub view: Rc<ViewLog>,
	pub channel: Rc<RecordingChannel>,
	pub mount_present: Rc<Cell<bool>>,
}

impl Harness {
	pub fn new(key: Result<&str, &str>, response: Result<AnalysisResult, &str>) -> Self {
		let backend = Rc::new(BackendLog::default());
		let vis = Rc::new(VisLog::default());
		let view = Rc::new(ViewLog::default());
		let channel = Rc::new(RecordingChannel::default());
		let mount_present = Rc::new(Cell::new(true));

		let orchestrator = Orchestrator::new(
			BridgeConfig::default(),
			StubBackend {
				log: backend.clone(),
				key: key.map(str::to_string).map_err(str::to_string),
				response: response.map_err(str::to_string),
			},
			StubMount {
				log: vis.clone(),
				present: mount_present.clone(),
			},
			RecordingView(view.clone()),
			channel.clone(),
		);

		Self {
			orchestrator: Rc::new(orchestrator),
			backend,
			vis,
			view,
			channel,
			mount_present,
		}
	}

	pub fn healthy() -> Self {
		Self::new(Ok("sk-test"), Ok(AnalysisResult::default()))
	}

	pub fn last_progress(&self) -> Option<Progress> {
		self.view.progress.borrow().last().cloned()
	}

	pub fn messages(&self, severity: Severity) -> Vec<String> {
		self.view
			.history
			.borrow()
			.iter()
			.filter(|d| d.severity == severity)
			.map(|d| d.message.clone())
			.collect()
	}
}

pub fn sample_result() -> Value {
	json!({
		"nodes": [{"id": "root", "type": "directory"}, {"id": "main.rs", "type": "file"}],
		"edges": [{"source": "root", "target": "main.rs"}]
	})
}
