//! Status UI backed by the page DOM.

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

use crate::progress::{Diagnostic, MissingElement, Progress, ProgressStatus, StatusView};

fn document() -> Option<Document> {
	web_sys::window()?.document()
}

fn html_element(doc: &Document, selector: &str) -> Result<HtmlElement, MissingElement> {
	doc.query_selector(selector)
		.ok()
		.flatten()
		.and_then(|el| el.dyn_into::<HtmlElement>().ok())
		.ok_or_else(|| MissingElement(selector.to_string()))
}

/// Whether the page has an element with this id.
pub fn element_exists(id: &str) -> bool {
	document()
		.and_then(|doc| doc.get_element_by_id(id))
		.is_some()
}

/// Drives `.progress-container` and the diagnostics log.
pub struct DomStatusView {
	diagnostics_id: String,
}

impl DomStatusView {
	/// View writing diagnostics into the element with id `diagnostics_id`.
	pub fn new(diagnostics_id: impl Into<String>) -> Self {
		Self {
			diagnostics_id: diagnostics_id.into(),
		}
	}

	fn log(&self) -> Result<(Document, Element), MissingElement> {
		let missing = || MissingElement(format!("#{}", self.diagnostics_id));
		let doc = document().ok_or_else(missing)?;
		let log = doc.get_element_by_id(&self.diagnostics_id).ok_or_else(missing)?;
		Ok((doc, log))
	}
}

impl StatusView for DomStatusView {
	fn show_progress(&self, progress: &Progress) -> Result<(), MissingElement> {
		let doc = document().ok_or_else(|| MissingElement("document".into()))?;
		let container = html_element(&doc, ".progress-container")?;
		let fill = html_element(&doc, ".progress-fill")?;
		let percentage = html_element(&doc, ".progress-percentage")?;
		let status = html_element(&doc, ".progress-status")?;

		let classes = container.class_list();
		let _ = if progress.is_hidden() {
			classes.add_1("hidden")
		} else {
			classes.remove_1("hidden")
		};
		let _ = if progress.status == ProgressStatus::Failed {
			classes.add_1("failed")
		} else {
			classes.remove_1("failed")
		};

		let pct = format!("{}%", progress.percentage());
		let _ = fill.style().set_property("width", &pct);
		percentage.set_text_content(Some(&pct));
		status.set_text_content(Some(progress.status.label()));
		Ok(())
	}

	fn append_diagnostic(&self, entry: &Diagnostic) -> Result<(), MissingElement> {
		let (doc, log) = self.log()?;
		let row = doc
			.create_element("div")
			.map_err(|_| MissingElement("div".into()))?;
		row.set_class_name(&format!("diagnostic-entry {}", entry.severity.as_str()));
		row.set_text_content(Some(&entry.to_string()));
		let _ = log.append_child(&row);
		log.set_scroll_top(log.scroll_height());
		Ok(())
	}

	fn clear_diagnostics(&self) {
		if let Ok((_, log)) = self.log() {
			log.set_inner_html("");
		}
	}
}
