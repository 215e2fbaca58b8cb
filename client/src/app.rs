use std::cell::RefCell;

use frontier_shared::{PlayerId, RendererStats};
use leptos::prelude::*;

use crate::canvas::TerritoryCanvas;
use crate::settings::{self, ClientSettings};

/// Newtype wrappers so each signal gets its own context slot.
#[derive(Clone, Copy)]
pub(crate) struct AlternateView(pub RwSignal<bool>);
#[derive(Clone, Copy)]
pub(crate) struct Focused(pub RwSignal<Option<PlayerId>>);
#[derive(Clone, Copy)]
pub(crate) struct LayerStats(pub RwSignal<RendererStats>);
#[derive(Clone, Copy)]
pub(crate) struct StepClock(pub RwSignal<u64>);

struct KeydownBinding {
    window: web_sys::Window,
    _handler: wasm_bindgen::closure::Closure<dyn Fn(web_sys::KeyboardEvent)>,
}

thread_local! {
    static KEYDOWN_BINDING: RefCell<Option<KeydownBinding>> = const { RefCell::new(None) };
}

/// One-line summary for the stats overlay.
pub(crate) fn stats_line(stats: &RendererStats, tick: u64, focused: Option<PlayerId>) -> String {
    let focus = focused.map_or_else(|| "none".to_string(), |p| format!("#{}", p.0));
    format!(
        "tick {tick} | queued {} | painted {} | drains {} | full repaints {} | failed queries {} | focus {focus}",
        stats.queued, stats.tiles_painted, stats.drains, stats.full_repaints, stats.failed_queries
    )
}

/// Root component. Loads persisted settings and provides the shared signals.
#[component]
pub fn App() -> impl IntoView {
    let saved: ClientSettings = settings::load_settings();
    let config = settings::load_config();
    // Write back so the effective config is visible (and editable) in storage.
    settings::save_config(&config);
    let palette = settings::load_palette();

    let alternate_view: RwSignal<bool> = RwSignal::new(saved.alternate_view);
    let show_stats: RwSignal<bool> = RwSignal::new(saved.show_stats);
    let focused: RwSignal<Option<PlayerId>> = RwSignal::new(None);
    let stats: RwSignal<RendererStats> = RwSignal::new(RendererStats::default());
    let tick: RwSignal<u64> = RwSignal::new(0);

    provide_context(AlternateView(alternate_view));
    provide_context(Focused(focused));
    provide_context(LayerStats(stats));
    provide_context(StepClock(tick));

    // Persist host preferences
    let persisted = saved.clone();
    Effect::new(move || {
        let settings = ClientSettings {
            alternate_view: alternate_view.get(),
            show_stats: show_stats.get(),
            ..persisted.clone()
        };
        settings::save_settings(&settings);
    });

    // Keyboard shortcuts
    Effect::new(move || {
        use wasm_bindgen::JsCast;
        use wasm_bindgen::prelude::*;

        let Some(window) = web_sys::window() else {
            return;
        };

        KEYDOWN_BINDING.with(|slot| {
            if let Some(old) = slot.borrow_mut().take() {
                let _ = old.window.remove_event_listener_with_callback(
                    "keydown",
                    old._handler.as_ref().unchecked_ref(),
                );
            }
        });

        let handler =
            Closure::<dyn Fn(web_sys::KeyboardEvent)>::new(move |e: web_sys::KeyboardEvent| {
                if e.repeat() || e.ctrl_key() || e.meta_key() {
                    return;
                }
                match e.key().as_str() {
                    "v" | "V" => alternate_view.update(|v| *v = !*v),
                    "s" | "S" => show_stats.update(|v| *v = !*v),
                    "Escape" => focused.set(None),
                    _ => {}
                }
            });

        if window
            .add_event_listener_with_callback("keydown", handler.as_ref().unchecked_ref())
            .is_ok()
        {
            KEYDOWN_BINDING.with(|slot| {
                *slot.borrow_mut() = Some(KeydownBinding {
                    window: window.clone(),
                    _handler: handler,
                });
            });
        }
    });

    view! {
        <div style="width: 100%; height: 100%; position: relative; overflow: hidden; background: #0c0e17;">
            <TerritoryCanvas config=config palette=palette settings=saved />
            {move || {
                if show_stats.get() {
                    let line = stats_line(&stats.get(), tick.get(), focused.get());
                    view! {
                        <div style="position: absolute; left: 12px; bottom: 12px; padding: 4px 8px; background: rgba(19,22,31,0.85); border: 1px solid #282c3e; border-radius: 4px; color: #e2e0d8; font-family: 'JetBrains Mono', monospace; font-size: 0.7rem; pointer-events: none;">
                            {line}
                        </div>
                    }
                    .into_any()
                } else {
                    ().into_any()
                }
            }}
        </div>
    }
}
