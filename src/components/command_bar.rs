use leptos::prelude::*;
use web_sys::{File, HtmlInputElement};

use crate::graph::{NodeKind, node_style};

/// Floating toolbar dispatching the editor actions.
#[component]
pub fn CommandBar(
	kind: RwSignal<NodeKind>,
	show_grid: RwSignal<bool>,
	#[prop(into)] node_count: Signal<usize>,
	#[prop(into)] edge_count: Signal<usize>,
	#[prop(into)] import_error: Signal<Option<String>>,
	on_add: Callback<()>,
	on_clear: Callback<()>,
	on_export: Callback<()>,
	on_import: Callback<File>,
) -> impl IntoView {
	let file_input = NodeRef::<leptos::html::Input>::new();

	let pick_file = move |_: leptos::ev::MouseEvent| {
		if let Some(input) = file_input.get_untracked() {
			input.click();
		}
	};

	let file_chosen = move |ev: leptos::ev::Event| {
		let input: HtmlInputElement = event_target(&ev);
		if let Some(file) = input.files().and_then(|files| files.get(0)) {
			on_import.run(file);
		}
		// Reset so choosing the same file again still fires `change`.
		input.set_value("");
	};

	let kind_items = NodeKind::ALL
		.into_iter()
		.map(|k| {
			let style = node_style(k);
			view! {
				<li>
					<button class="menu-item" on:click=move |_| kind.set(k)>
						<span class="glyph" style=format!("color: {}", style.text)>
							{style.glyph}
						</span>
						<span>{style.name}</span>
						<Show when=move || kind.get() == k>
							<span class="check">"✓"</span>
						</Show>
					</button>
				</li>
			}
		})
		.collect_view();

	view! {
		<div class="command-bar">
			<details class="menu">
				<summary>
					<span class="glyph">{move || node_style(kind.get()).glyph}</span>
					<span>"Tipo Nodo"</span>
				</summary>
				<ul class="menu-content">{kind_items}</ul>
			</details>

			<span class="separator" />

			<button on:click=move |_| on_add.run(())>"＋ Aggiungi Nodo"</button>
			<button on:click=move |_| on_clear.run(())>"🗑 Pulisci Grafo"</button>

			<span class="separator" />

			<button on:click=move |_| on_export.run(())>"⭳ Esporta"</button>
			<button on:click=pick_file>"⭱ Importa"</button>
			<input
				node_ref=file_input
				type="file"
				accept=".json,application/json"
				style="display: none;"
				on:change=file_chosen
			/>

			<span class="separator" />

			<label class="toggle">
				<input
					type="checkbox"
					prop:checked=move || show_grid.get()
					on:change=move |_| show_grid.update(|v| *v = !*v)
				/>
				"Griglia"
			</label>

			<span class="badge">{move || format!("{} Nodi", node_count.get())}</span>
			<span class="badge">{move || format!("{} Connessioni", edge_count.get())}</span>

			<Show when=move || import_error.with(Option::is_some)>
				<span class="error">{move || import_error.get().unwrap_or_default()}</span>
			</Show>
		</div>
	}
}
