use std::sync::Arc;

use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;

use choropleth_shared::{MapScene, SceneLayout};

use crate::config::DataSources;
use crate::fetch;
use crate::map::ChoroplethMap;

#[derive(Clone)]
enum LoadState {
    Loading,
    Ready(Arc<MapScene>),
    Failed(String),
}

async fn load_scene(sources: &DataSources) -> Result<MapScene, String> {
    let datasets = fetch::fetch_datasets(sources).await?;
    let arcs = datasets.topology.arcs.len();
    let scene = MapScene::build(
        &datasets.topology,
        datasets.education,
        SceneLayout::default(),
    )
    .map_err(|e| format!("scene error: {e}"))?;
    web_sys::console::info_1(
        &format!(
            "Built map: {} counties from {arcs} arcs, {} education records",
            scene.counties.len(),
            scene.record_count()
        )
        .into(),
    );
    Ok(scene)
}

/// Root component: fetches both datasets once, then hands the finished scene to the map.
#[component]
pub fn App() -> impl IntoView {
    let load_state: RwSignal<LoadState> = RwSignal::new(LoadState::Loading);

    Effect::new(move || {
        let sources = DataSources::from_location();
        spawn_local(async move {
            match load_scene(&sources).await {
                Ok(scene) => {
                    if scene.unjoined > 0 {
                        web_sys::console::warn_1(
                            &format!(
                                "{} of {} counties have no education record; drawn as no data",
                                scene.unjoined,
                                scene.counties.len()
                            )
                            .into(),
                        );
                    }
                    load_state.set(LoadState::Ready(Arc::new(scene)));
                }
                Err(e) => {
                    web_sys::console::error_1(&format!("Map load failed: {e}").into());
                    load_state.set(LoadState::Failed(e));
                }
            }
        });
    });

    view! {
        <section style="font-family: 'Trebuchet MS', sans-serif; margin: 0 auto; width: fit-content;">
            {move || match load_state.get() {
                LoadState::Loading => view! {
                    <p id="loading" style="color: #5a5860;">"Loading map data\u{2026}"</p>
                }
                .into_any(),
                LoadState::Failed(message) => view! {
                    <div
                        id="load-error"
                        role="alert"
                        style="padding: 12px 16px; border: 1px solid #cb181d; border-radius: 6px; background: #fee5d9; color: #99000d;"
                    >
                        {format!("The map could not be loaded. {message}")}
                    </div>
                }
                .into_any(),
                LoadState::Ready(scene) => view! { <ChoroplethMap scene=scene /> }.into_any(),
            }}
        </section>
    }
}
