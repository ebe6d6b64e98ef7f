//! Top-level controller: startup, host commands and the analysis pipeline.

use std::cell::Cell;
use std::rc::Rc;

use log::{info, warn};
use serde_json::Value;

use crate::backend::Backend;
use crate::bridge::{CommandFuture, CommandRouter, HostChannel};
use crate::config::BridgeConfig;
use crate::credentials;
use crate::error::{BridgeError, BridgeResult};
use crate::progress::{Progress, Reporter, Stage, StatusView};
use crate::protocol::{AnalysisRequest, AnalysisResult, AnalyzePayload, HostCommand};
use crate::session::SessionState;
use crate::visualizer::{Visualizer, VisualizerFactory};

/// Where the first analysis comes from.
#[derive(Clone, Debug, PartialEq)]
pub enum StartupSource {
	/// `?owner=..&repo=..` on the page URL.
	UrlParams {
		/// Repository owner.
		owner: String,
		/// Repository name.
		repo: String,
	},
	/// Data the host injected into the page before load.
	HostPayload(Value),
	/// Nothing to do until the host sends a command.
	Idle,
}

impl StartupSource {
	/// URL parameters win over injected data; blank parameters count as absent.
	pub fn select(owner: Option<String>, repo: Option<String>, injected: Option<Value>) -> Self {
		let non_blank = |s: Option<String>| s.filter(|s| !s.trim().is_empty());
		match (non_blank(owner), non_blank(repo), injected) {
			(Some(owner), Some(repo), _) => Self::UrlParams { owner, repo },
			(_, _, Some(data)) if !data.is_null() => Self::HostPayload(data),
			_ => Self::Idle,
		}
	}
}

/// Lifecycle of the controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
	/// Constructed, not started.
	Idle,
	/// Loading the key and mounting the visualizer.
	Initializing,
	/// Waiting for work.
	Ready,
	/// An analysis holds the in-flight guard.
	Analyzing,
	/// The visualizer could not be mounted.
	Failed,
}

/// Sequences credential loading, visualizer setup, backend calls and rendering.
pub struct Orchestrator<B, F: VisualizerFactory, V, C> {
	config: BridgeConfig,
	backend: B,
	factory: F,
	reporter: Reporter<V, C>,
	session: SessionState<F::Output>,
	phase: Cell<Phase>,
	subscribed: Cell<bool>,
}

impl<B, F, V, C> Orchestrator<B, F, V, C>
where
	B: Backend + 'static,
	F: VisualizerFactory + 'static,
	F::Output: 'static,
	V: StatusView + 'static,
	C: HostChannel + 'static,
{
	/// Wire up a controller. Nothing runs until [`Self::start`] or [`Self::initialize`].
	pub fn new(config: BridgeConfig, backend: B, factory: F, view: V, channel: Rc<C>) -> Self {
		Self {
			config,
			backend,
			factory,
			reporter: Reporter::new(view, channel),
			session: SessionState::new(),
			phase: Cell::new(Phase::Idle),
			subscribed: Cell::new(false),
		}
	}

	/// Current lifecycle phase.
	pub fn phase(&self) -> Phase {
		self.phase.get()
	}

	/// Page-lifetime state.
	pub fn session(&self) -> &SessionState<F::Output> {
		&self.session
	}

	/// Configuration in use.
	pub fn config(&self) -> &BridgeConfig {
		&self.config
	}

	/// Run the startup path for `source`.
	pub async fn start(self: &Rc<Self>, source: StartupSource) {
		match source {
			StartupSource::UrlParams { owner, repo } => self.run_from_url_params(owner, repo).await,
			StartupSource::HostPayload(data) => self.run_from_host_payload(data).await,
			StartupSource::Idle => {
				let _ = self.initialize().await;
			}
		}
	}

	/// Load the key, mount the visualizer and start listening to the host.
	///
	/// Only a missing mount point is fatal. Calling this again remounts the
	/// visualizer and resets the status display; it must not overlap itself.
	pub async fn initialize(self: &Rc<Self>) -> BridgeResult<()> {
		info!("Initializing application...");
		self.phase.set(Phase::Initializing);
		// Reset ahead of the key load, not after mounting, so a key error stays on screen.
		self.reporter.progress(Progress::hidden());
		self.reporter.clear_diagnostics();

		if let Err(e) = credentials::load_key(&self.backend, &self.session).await {
			self.reporter.error(format!("Error loading API key: {e}"));
		}

		match self.factory.mount(&self.config.mount_id) {
			Ok(visualizer) => {
				if let Some(previous) = self.session.replace_visualizer(Some(Rc::new(visualizer))) {
					previous.dispose();
				}
				self.subscribe();
				self.phase.set(Phase::Ready);
				info!("Application initialized successfully");
				Ok(())
			}
			Err(e) => {
				if let Some(previous) = self.session.replace_visualizer(None) {
					previous.dispose();
				}
				self.reporter.error(format!("Initialization error: {e}"));
				self.reporter.progress(Progress::failed());
				self.phase.set(Phase::Failed);
				Err(e)
			}
		}
	}

	/// Initialize, then fetch and draw `owner/repo`.
	pub async fn run_from_url_params(self: &Rc<Self>, owner: String, repo: String) {
		if self.initialize().await.is_err() {
			return;
		}
		let Some(_guard) = self.session.try_begin() else {
			warn!("Analysis already in progress, skipping URL request for {owner}/{repo}");
			return;
		};
		self.phase.set(Phase::Analyzing);

		let request = AnalysisRequest::new(owner, repo, self.config.result_limit);
		let outcome = self.analyze_request(&request).await;
		self.finish(outcome, "Analysis completed successfully");
	}

	/// Initialize, then draw injected data without a network call.
	///
	/// Data without `nodes`/`edges` arrays leaves the controller waiting for the host.
	pub async fn run_from_host_payload(self: &Rc<Self>, data: Value) {
		info!("Initial repository data provided by host");
		if self.initialize().await.is_err() {
			return;
		}
		let Some(result) = AnalysisResult::from_payload(&data) else {
			info!("Injected data has no nodes/edges, waiting for host");
			return;
		};
		let Some(_guard) = self.session.try_begin() else {
			warn!("Analysis already in progress, skipping injected data");
			return;
		};
		self.phase.set(Phase::Analyzing);

		let outcome = self.draw_injected(&result).await;
		self.finish(outcome, "Visualization initialized with provided data");
	}

	/// Route one host command.
	pub async fn dispatch(&self, command: HostCommand) {
		match command {
			HostCommand::Analyze { payload } => self.handle_analyze(payload).await,
			HostCommand::Clear => self.handle_clear(),
		}
	}

	/// Analyze or draw `payload`. Dropped if another analysis is running.
	pub async fn handle_analyze(&self, payload: Value) {
		let Some(_guard) = self.session.try_begin() else {
			warn!("Analysis already in progress, dropping request");
			return;
		};
		self.phase.set(Phase::Analyzing);

		self.reporter
			.progress(Progress::step(Stage::Start, "Initializing..."));
		self.reporter.clear_diagnostics();
		self.reporter.info("Processing repository data...");

		let outcome = self.analyze_payload(payload).await;
		self.finish(outcome, "Analysis completed successfully");
	}

	/// Drop the drawing, the diagnostics log and the progress indicator.
	pub fn handle_clear(&self) {
		if let Some(visualizer) = self.session.visualizer() {
			visualizer.clear();
		}
		self.reporter.clear_diagnostics();
		self.reporter.progress(Progress::hidden());
	}

	/// Release the visualizer.
	pub fn dispose(&self) {
		if let Some(visualizer) = self.session.replace_visualizer(None) {
			visualizer.dispose();
		}
		self.phase.set(Phase::Idle);
	}

	fn subscribe(self: &Rc<Self>) {
		if self.subscribed.replace(true) {
			return;
		}
		let this = Rc::downgrade(self);
		let router: CommandRouter = Rc::new(move |command| -> CommandFuture {
			let this = this.clone();
			Box::pin(async move {
				if let Some(this) = this.upgrade() {
					this.dispatch(command).await;
				}
			})
		});
		self.reporter.channel().subscribe(router);
	}

	async fn analyze_request(&self, request: &AnalysisRequest) -> BridgeResult<()> {
		let visualizer = self.mounted()?;
		let result = self.fetch(request).await?;
		self.draw(&visualizer, &result, Stage::Rendering).await
	}

	async fn analyze_payload(&self, payload: Value) -> BridgeResult<()> {
		let visualizer = self.mounted()?;
		visualizer.clear();
		let result = match AnalyzePayload::decode(payload, self.config.result_limit)? {
			AnalyzePayload::Result(result) => result,
			AnalyzePayload::Request(request) => self.fetch(&request).await?,
		};
		self.draw(&visualizer, &result, Stage::Rendering).await
	}

	async fn draw_injected(&self, result: &AnalysisResult) -> BridgeResult<()> {
		let visualizer = self.mounted()?;
		self.draw(&visualizer, result, Stage::Received).await
	}

	fn mounted(&self) -> BridgeResult<Rc<F::Output>> {
		self.session
			.visualizer()
			.ok_or(BridgeError::VisualizerUnavailable)
	}

	async fn fetch(&self, request: &AnalysisRequest) -> BridgeResult<AnalysisResult> {
		self.reporter.progress(Progress::step(
			Stage::Requesting,
			format!("Fetching analysis for {}/{}...", request.owner, request.repo),
		));
		let key = self.session.api_key();
		let result = self.backend.analyze(request, key.as_deref()).await?;
		self.reporter.info(format!(
			"Received {} nodes and {} edges",
			result.nodes.len(),
			result.edges.len()
		));
		Ok(result)
	}

	async fn draw(
		&self,
		visualizer: &F::Output,
		result: &AnalysisResult,
		stage: Stage,
	) -> BridgeResult<()> {
		self.reporter
			.progress(Progress::step(stage, "Rendering visualization..."));
		visualizer.render(result).await
	}

	fn finish(&self, outcome: BridgeResult<()>, success: &str) {
		match outcome {
			Ok(()) => {
				self.reporter.info(success);
				self.reporter
					.progress(Progress::step(Stage::Complete, "Complete"));
			}
			Err(e) => {
				self.reporter.error(format!("Error: {e}"));
				self.reporter.progress(Progress::failed());
			}
		}
		let phase = if self.session.visualizer().is_some() {
			Phase::Ready
		} else {
			Phase::Failed
		};
		self.phase.set(phase);
	}
}
