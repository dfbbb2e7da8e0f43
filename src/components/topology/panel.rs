//! Details panel for the selected node.

use leptos::prelude::*;

use super::properties::{DisplayValue, PropertyRow};

fn row_value(value: DisplayValue) -> AnyView {
	match value {
		DisplayValue::Text(text) => view! { <span class="value">{text}</span> }.into_any(),
		DisplayValue::Links(uris) => uris
			.into_iter()
			.map(|uri| {
				let href = format!("http://{uri}");
				view! {
					<a class="value" href=href target="_new">
						{uri}
					</a>
				}
			})
			.collect_view()
			.into_any(),
	}
}

/// Lists the formatted properties of the selected node, one row per key.
#[component]
pub fn NodeDetailsPanel(#[prop(into)] details: Signal<Vec<PropertyRow>>) -> impl IntoView {
	view! {
		<div id="legend">
			<ul>
				{move || {
					details
						.get()
						.into_iter()
						.map(|PropertyRow { key, label, value }| {
							let class = format!("property-{key}");
							view! {
								<li class=class>
									<span class="label">{label}": "</span>
									{row_value(value)}
								</li>
							}
						})
						.collect_view()
				}}
			</ul>
		</div>
	}
}
