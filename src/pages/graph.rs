use leptos::prelude::*;
use leptos_meta::Title;

use crate::components::graph_view::GraphView;

/// Full-screen OSINT graph editor.
#[component]
pub fn GraphPage() -> impl IntoView {
	view! {
		<Title text="Dashboard: OSINT Graph" />
		<ErrorBoundary fallback=|errors| {
			view! {
				<h1>"Uh oh! Something went wrong!"</h1>

				<p>"Errors: "</p>
				<ul>
					{move || {
						errors
							.get()
							.into_iter()
							.map(|(_, e)| view! { <li>{e.to_string()}</li> })
							.collect_view()
					}}
				</ul>
			}
		}>
			<div class="graph-page">
				<GraphView />
			</div>
		</ErrorBoundary>
	}
}
