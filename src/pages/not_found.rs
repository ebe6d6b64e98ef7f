use leptos::prelude::*;

/// 404 page
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Nothing here"</h1>
			<p>"The visualizer lives at "<a href="/">"/"</a>"."</p>
		</div>
	}
}
