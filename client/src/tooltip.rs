use leptos::prelude::*;

use choropleth_shared::HoverState;

const TOOLTIP_STYLE: &str = "position: absolute; pointer-events: none; z-index: 100; \
    padding: 10px; border-radius: 10%; color: #ffffff; text-align: center; \
    font-family: 'Trebuchet MS', sans-serif; font-size: 0.85rem; \
    transition: opacity 250ms ease;";

/// Floating label that follows the pointer over a county.
///
/// Always mounted; hiding fades opacity to zero and parks it offscreen so the
/// CSS transition runs in both directions.
#[component]
pub fn Tooltip(hover: RwSignal<HoverState>, background: String) -> impl IntoView {
    let left = move || hover.with(|h| format!("{}px", h.tooltip().left));
    let top = move || hover.with(|h| format!("{}px", h.tooltip().top));
    let opacity = move || hover.with(|h| h.tooltip().opacity.to_string());
    let education = move || hover.with(|h| h.tooltip().education.map(|v| v.to_string()));
    let text = move || hover.with(|h| h.tooltip().text.clone());
    let hidden = move || hover.with(|h| (!h.tooltip().is_visible()).to_string());

    view! {
        <div
            id="tooltip"
            style=format!("{TOOLTIP_STYLE} background: {background};")
            style:left=left
            style:top=top
            style:opacity=opacity
            data-education=education
            aria-hidden=hidden
        >
            {text}
        </div>
    }
}
