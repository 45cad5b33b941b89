use leptos::prelude::*;

/// 404 - Not Found
#[component]
pub fn NotFound() -> impl IntoView {
	view! {
		<div class="not-found">
			<h1>"Pagina non trovata"</h1>
			<a href="/dashboard/graph">"Torna al grafo"</a>
		</div>
	}
}
