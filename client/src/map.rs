use std::sync::Arc;

use leptos::prelude::*;
use web_sys::PointerEvent;

use choropleth_shared::HoverState;
use choropleth_shared::colors::hex_css;
use choropleth_shared::hover::shape_opacity;
use choropleth_shared::scene::Legend;
use choropleth_shared::MapScene;

use crate::tooltip::Tooltip;

/// Palette index used for the tooltip background.
const TOOLTIP_SHADE: usize = 5;

fn page_position(e: &PointerEvent) -> (f64, f64) {
    (e.page_x() as f64, e.page_y() as f64)
}

/// Title block, county fills, state borders and legend, drawn once from `scene`.
#[component]
pub fn ChoroplethMap(scene: Arc<MapScene>) -> impl IntoView {
    let hover: RwSignal<HoverState> = RwSignal::new(HoverState::default());
    // Shapes only re-evaluate opacity when the hovered county changes, not on every move.
    let hovered = Memo::new(move |_| hover.with(|h| h.hovered()));

    let layout = &scene.layout;
    let width = layout.width.to_string();
    let height = layout.height.to_string();
    let tooltip_background = hex_css(layout.palette[TOOLTIP_SHADE]);

    let counties = scene
        .counties
        .iter()
        .map(|shape| {
            let id = shape.id;
            let on_enter = {
                let scene = Arc::clone(&scene);
                move |e: PointerEvent| {
                    hover.update(|h| h.enter(id, scene.record(id), page_position(&e)));
                }
            };
            let on_move = move |e: PointerEvent| {
                hover.update(|h| h.move_to(page_position(&e)));
            };
            let on_leave = move |_: PointerEvent| {
                hover.update(|h| h.exit(id));
            };
            view! {
                <path
                    class="county"
                    d=shape.path.clone()
                    fill=shape.fill.clone()
                    data-fips=id.to_string()
                    data-education=shape.education.map(|v| v.to_string())
                    opacity=move || shape_opacity(hovered.get(), id).to_string()
                    on:pointerenter=on_enter
                    on:pointermove=on_move
                    on:pointerleave=on_leave
                />
            }
        })
        .collect_view();

    view! {
        <header>
            <h1 id="title" style="font-family: 'Trebuchet MS', sans-serif;">
                {layout.title.clone()}
            </h1>
            <h2 id="description" style="font-family: 'Trebuchet MS', sans-serif; font-size: 20px;">
                {layout.description.clone()}
            </h2>
        </header>
        <svg xmlns="http://www.w3.org/2000/svg" width=width height=height>
            <g class="counties">{counties}</g>
            <path
                class="state-border"
                d=scene.state_borders.clone()
                fill="none"
                stroke=scene.border_stroke()
                style="pointer-events: none;"
            />
            <LegendView legend=scene.legend.clone() />
        </svg>
        <Tooltip hover=hover background=tooltip_background />
    }
}

/// Swatch strip with a tick axis underneath; the axis baseline is not drawn.
#[component]
fn LegendView(legend: Legend) -> impl IntoView {
    let (ox, oy) = legend.origin;
    let tick_size = legend.tick_size;

    let swatches = legend
        .swatches
        .into_iter()
        .map(|s| {
            view! {
                <rect
                    x=s.x.to_string()
                    y="0"
                    width=s.width.to_string()
                    height=s.height.to_string()
                    fill=s.fill
                />
            }
        })
        .collect_view();

    let ticks = legend
        .ticks
        .into_iter()
        .map(|t| {
            view! {
                <g class="tick" transform=format!("translate({},0)", t.x)>
                    <line y2=tick_size.to_string() stroke="currentColor" />
                    <text
                        y=(tick_size + 3.0).to_string()
                        dy="0.71em"
                        fill="currentColor"
                        style="text-anchor: middle; font-size: 10px; font-family: sans-serif;"
                    >
                        {t.label}
                    </text>
                </g>
            }
        })
        .collect_view();

    view! {
        <g id="legend" transform=format!("translate({ox},{oy})")>
            {swatches}
            <g id="legend-axis">{ticks}</g>
        </g>
    }
}
