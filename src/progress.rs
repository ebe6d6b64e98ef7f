//! Progress and diagnostics: what the page shows and what the host hears.

use std::fmt;
use std::rc::Rc;

use log::{error, info, warn};

use crate::bridge::HostChannel;
use crate::protocol::{HostEvent, Severity};

/// Progress checkpoints. The percentage is fixed per stage.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
	/// Nothing done yet (also used for hidden and failed).
	Start,
	/// Backend request sent.
	Requesting,
	/// Data in hand, drawing about to start.
	Received,
	/// Drawing.
	Rendering,
	/// Done.
	Complete,
}

impl Stage {
	/// Percentage shown for this stage.
	pub fn percentage(self) -> u8 {
		match self {
			Self::Start => 0,
			Self::Requesting => 20,
			Self::Received => 50,
			Self::Rendering => 80,
			Self::Complete => 100,
		}
	}
}

/// Status text attached to a progress update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ProgressStatus {
	/// Empty status: hide the indicator.
	Hidden,
	/// The reserved `"failed"` status.
	Failed,
	/// Free-form status text.
	Text(String),
}

impl ProgressStatus {
	/// Wire form of the status.
	pub fn as_str(&self) -> &str {
		match self {
			Self::Hidden => "",
			Self::Failed => "failed",
			Self::Text(text) => text,
		}
	}

	/// Text shown next to the bar.
	pub fn label(&self) -> &str {
		match self {
			Self::Failed => "Analysis failed",
			other => other.as_str(),
		}
	}
}

/// A single progress update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Progress {
	/// Checkpoint reached.
	pub stage: Stage,
	/// Status text.
	pub status: ProgressStatus,
}

impl Progress {
	/// 0% with the indicator hidden.
	pub fn hidden() -> Self {
		Self {
			stage: Stage::Start,
			status: ProgressStatus::Hidden,
		}
	}

	/// 0% flagged as failed.
	pub fn failed() -> Self {
		Self {
			stage: Stage::Start,
			status: ProgressStatus::Failed,
		}
	}

	/// A visible step with status text.
	pub fn step(stage: Stage, status: impl Into<String>) -> Self {
		Self {
			stage,
			status: ProgressStatus::Text(status.into()),
		}
	}

	/// Shorthand for `stage.percentage()`.
	pub fn percentage(&self) -> u8 {
		self.stage.percentage()
	}

	/// Whether the indicator should be hidden.
	pub fn is_hidden(&self) -> bool {
		self.status == ProgressStatus::Hidden
	}

	/// Envelope relayed to the host.
	pub fn to_event(&self) -> HostEvent {
		HostEvent::Progress {
			percentage: self.percentage(),
			status: self.status.as_str().to_string(),
		}
	}
}

/// A timestamped diagnostic log entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
	/// Local time the entry was made.
	pub timestamp: String,
	/// Message text.
	pub message: String,
	/// Severity tag.
	pub severity: Severity,
}

impl Diagnostic {
	/// New entry stamped with the current time.
	pub fn now(message: impl Into<String>, severity: Severity) -> Self {
		Self {
			timestamp: time_label(),
			message: message.into(),
			severity,
		}
	}

	/// Envelope relayed to the host.
	pub fn to_event(&self) -> HostEvent {
		HostEvent::Diagnostics {
			message: self.to_string(),
			message_type: self.severity,
		}
	}
}

impl fmt::Display for Diagnostic {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} - {}", self.timestamp, self.message)
	}
}

const FALLBACK_LOCALE: &str = "en-US";

/// The browser's language, or a fixed fallback when it reports none.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
fn locale_or_default(language: Option<String>) -> String {
	language
		.filter(|lang| !lang.trim().is_empty())
		.unwrap_or_else(|| FALLBACK_LOCALE.to_string())
}

#[cfg(target_arch = "wasm32")]
fn time_label() -> String {
	let language = web_sys::window().and_then(|w| w.navigator().language());
	js_sys::Date::new_0()
		.to_locale_time_string(&locale_or_default(language))
		.into()
}

#[cfg(not(target_arch = "wasm32"))]
fn time_label() -> String {
	let secs = std::time::SystemTime::now()
		.duration_since(std::time::UNIX_EPOCH)
		.map(|d| d.as_secs())
		.unwrap_or_default()
		% 86_400;
	format!("{:02}:{:02}:{:02}", secs / 3600, secs / 60 % 60, secs % 60)
}

/// A required piece of the status UI is missing from the page.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MissingElement(pub String);

impl fmt::Display for MissingElement {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{} element not found", self.0)
	}
}

/// On-page progress bar and diagnostics log.
pub trait StatusView {
	/// Draw a progress update. Fails if any progress element is missing.
	fn show_progress(&self, progress: &Progress) -> Result<(), MissingElement>;

	/// Append one diagnostic entry. Fails if the log container is missing.
	fn append_diagnostic(&self, entry: &Diagnostic) -> Result<(), MissingElement>;

	/// Empty the diagnostics log.
	fn clear_diagnostics(&self);
}

/// Writes status to the page and mirrors it to the host.
///
/// Updates the page could not show are not relayed either.
pub struct Reporter<V, C> {
	view: V,
	channel: Rc<C>,
}

impl<V: StatusView, C: HostChannel> Reporter<V, C> {
	/// Pair a view with the host channel.
	pub fn new(view: V, channel: Rc<C>) -> Self {
		Self { view, channel }
	}

	/// The host channel.
	pub fn channel(&self) -> &Rc<C> {
		&self.channel
	}

	/// Show a progress update and relay it.
	pub fn progress(&self, progress: Progress) {
		if let Err(missing) = self.view.show_progress(&progress) {
			error!("Progress update skipped: {missing}");
			return;
		}
		self.channel.publish(&progress.to_event());
	}

	/// Log an info diagnostic.
	pub fn info(&self, message: impl Into<String>) {
		self.diagnostic(message.into(), Severity::Info);
	}

	/// Log an error diagnostic.
	pub fn error(&self, message: impl Into<String>) {
		self.diagnostic(message.into(), Severity::Error);
	}

	/// Empty the diagnostics log.
	pub fn clear_diagnostics(&self) {
		self.view.clear_diagnostics();
	}

	fn diagnostic(&self, message: String, severity: Severity) {
		match severity {
			Severity::Info => info!("{message}"),
			Severity::Error => error!("{message}"),
		}
		let entry = Diagnostic::now(message, severity);
		if let Err(missing) = self.view.append_diagnostic(&entry) {
			warn!("Dropping diagnostic: {missing}");
			return;
		}
		self.channel.publish(&entry.to_event());
	}
}
