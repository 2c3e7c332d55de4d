mod app;
mod config;
mod fetch;
mod map;
mod tooltip;

use leptos::mount::mount_to;
use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

/// Id of the host element in `index.html`.
const MOUNT_ID: &str = "app";

/// The `#app` element, or `<body>` when the page has none.
fn mount_point() -> Option<HtmlElement> {
    let document = web_sys::window()?.document()?;
    document
        .get_element_by_id(MOUNT_ID)
        .and_then(|node| node.dyn_into::<HtmlElement>().ok())
        .or_else(|| document.body())
}

fn main() {
    console_error_panic_hook::set_once();
    let Some(target) = mount_point() else {
        web_sys::console::error_1(&format!("no #{MOUNT_ID} element or <body> to mount into").into());
        return;
    };
    // The map lives for the whole page, so the handle is never unmounted.
    mount_to(target, app::App).forget();
}
