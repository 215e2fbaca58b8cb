use std::cell::{Cell, RefCell};
use std::rc::Rc;

use frontier_shared::{
    EngineConfig, FrameGate, GridSize, PaletteTheme, TerritoryRenderer, WorldView,
};
use gloo_timers::callback::Interval;
use leptos::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{HtmlCanvasElement, PointerEvent, WheelEvent};

use crate::app::{AlternateView, Focused, LayerStats, StepClock};
use crate::demo::DemoWorld;
use crate::render_loop::FrameLoop;
use crate::settings::ClientSettings;
use crate::surface::{CanvasSurface, context_2d};
use crate::viewport::Viewport;

const GRID_WIDTH: u32 = 320;
const GRID_HEIGHT: u32 = 200;
const PLAYER_COUNT: u16 = 8;
/// Pointer travel (CSS px) below which a press counts as a click.
const CLICK_SLOP: f64 = 5.0;

thread_local! {
    static STEP_TIMER: RefCell<Option<Interval>> = const { RefCell::new(None) };
}

type SharedRenderer = Rc<RefCell<TerritoryRenderer<PaletteTheme>>>;

/// Monotonic clock shared with the rAF timestamps.
fn perf_now() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}

fn warn(message: &str) {
    web_sys::console::warn_1(&message.into());
}

/// Territory layer over a stand-in world: stepped by an interval timer,
/// drained and composited on animation frames.
#[component]
pub fn TerritoryCanvas(
    config: EngineConfig,
    palette: PaletteTheme,
    settings: ClientSettings,
) -> impl IntoView {
    let AlternateView(alternate_view) = expect_context();
    let Focused(focused) = expect_context();
    let LayerStats(stats) = expect_context();
    let StepClock(clock) = expect_context();

    let canvas_ref = NodeRef::<leptos::html::Canvas>::new();
    let viewport: RwSignal<Viewport> = RwSignal::new(Viewport::default());

    let world = Rc::new(RefCell::new(DemoWorld::new(
        GridSize::new(GRID_WIDTH, GRID_HEIGHT),
        PLAYER_COUNT,
        settings.demo_seed,
    )));
    let mut palette = palette;
    for player in world.borrow().players() {
        palette.player_names.entry(player.id).or_insert(player.name);
    }
    let renderer: SharedRenderer = match TerritoryRenderer::new(config, palette) {
        Ok(renderer) => Rc::new(RefCell::new(renderer)),
        Err(e) => {
            warn(&format!("Territory layer disabled: {e}"));
            return ().into_any();
        }
    };

    // Frame function: (re)initialize on size changes, drain, composite.
    let surface: Rc<RefCell<Option<CanvasSurface>>> = Rc::new(RefCell::new(None));
    let last_size: Rc<Cell<(u32, u32)>> = Rc::new(Cell::new((0, 0)));
    let world_frame = world.clone();
    let renderer_frame = renderer.clone();
    let frames = Rc::new(FrameLoop::new(move |now_ms| {
        let Some(canvas) = canvas_ref.get_untracked() else {
            return false;
        };
        let canvas: &HtmlCanvasElement = &canvas;
        let Some(parent) = canvas.parent_element() else {
            return false;
        };
        let w = parent.client_width().max(0) as u32;
        let h = parent.client_height().max(0) as u32;
        if w == 0 || h == 0 {
            return false;
        }

        let world = world_frame.borrow();
        let mut renderer = renderer_frame.borrow_mut();
        let mut surface = surface.borrow_mut();
        if last_size.get() != (w, h) {
            canvas.set_width(w);
            canvas.set_height(h);
            last_size.set((w, h));
            viewport.update(|vp| vp.fit_grid(world.size(), w as f64, h as f64));
            let result = if renderer.is_ready() {
                renderer.on_resize(&*world)
            } else {
                renderer.initialize(&*world)
            };
            if let Err(e) = result {
                warn(&format!("Territory layer failed to initialize: {e}"));
                return false;
            }
            if let Some(surface) = surface.as_mut() {
                surface.reset();
            }
        }
        if surface.is_none() {
            match context_2d(canvas) {
                Ok(ctx) => *surface = Some(CanvasSurface::new(ctx)),
                Err(e) => {
                    warn(&format!("Territory layer failed to initialize: {e}"));
                    return false;
                }
            }
        }
        let Some(surface) = surface.as_mut() else {
            return false;
        };

        surface.begin_frame(&viewport.get_untracked(), w as f64, h as f64);
        let report = renderer.on_display_frame(&*world, surface, now_ms);
        world.deliver_queries();
        stats.set(renderer.stats());

        // Keep ticking while there is backlog or the gate held the drain back.
        renderer.queued() > 0 || report.gate != FrameGate::Drain
    }));

    // Simulation steps
    {
        let world = world.clone();
        let renderer = renderer.clone();
        let frames = frames.clone();
        let step_ms = settings.step_interval_ms.max(1);
        Effect::new(move || {
            let world = world.clone();
            let renderer = renderer.clone();
            let frames = frames.clone();
            let timer = Interval::new(step_ms, move || {
                world.borrow_mut().step();
                let world = world.borrow();
                renderer.borrow_mut().on_simulation_step(&*world);
                world.deliver_queries();
                clock.set(world.ticks());
                frames.wake();
            });
            STEP_TIMER.with(|slot| {
                // Dropping the previous Interval cancels it.
                *slot.borrow_mut() = Some(timer);
            });
        });
    }

    {
        let renderer = renderer.clone();
        let frames = frames.clone();
        Effect::new(move || {
            let alternate = alternate_view.get();
            renderer.borrow_mut().on_view_mode_changed(alternate);
            frames.wake();
        });
    }

    {
        let world = world.clone();
        let renderer = renderer.clone();
        let frames = frames.clone();
        Effect::new(move || {
            let player = focused.get();
            let world = world.borrow();
            renderer
                .borrow_mut()
                .on_focused_player_changed(&*world, player);
            world.deliver_queries();
            frames.wake();
        });
    }

    {
        let frames = frames.clone();
        Effect::new(move || {
            viewport.track();
            frames.wake();
        });
    }

    // --- Input handlers ---

    let is_dragging = Rc::new(Cell::new(false));
    let press_pos = Rc::new(Cell::new((0.0f64, 0.0f64)));
    let last_pos = Rc::new(Cell::new((0.0f64, 0.0f64)));

    let on_wheel = move |e: WheelEvent| {
        e.prevent_default();
        let (x, y) = (e.offset_x() as f64, e.offset_y() as f64);
        viewport.update(|vp| vp.zoom_at(e.delta_y(), x, y));
    };

    let on_pointer_down = {
        let is_dragging = is_dragging.clone();
        let press_pos = press_pos.clone();
        let last_pos = last_pos.clone();
        move |e: PointerEvent| {
            let pos = (e.client_x() as f64, e.client_y() as f64);
            is_dragging.set(true);
            press_pos.set(pos);
            last_pos.set(pos);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.set_pointer_capture(e.pointer_id()).ok();
                el.style().set_property("cursor", "grabbing").ok();
            }
        }
    };

    let on_pointer_move = {
        let is_dragging = is_dragging.clone();
        let last_pos = last_pos.clone();
        let renderer = renderer.clone();
        move |e: PointerEvent| {
            if !is_dragging.get() {
                return;
            }
            let (x, y) = (e.client_x() as f64, e.client_y() as f64);
            let (lx, ly) = last_pos.get();
            last_pos.set((x, y));
            renderer.borrow_mut().on_drag_activity(perf_now());
            viewport.update(|vp| vp.pan(x - lx, y - ly));
        }
    };

    let on_pointer_up = {
        let world = world.clone();
        move |e: PointerEvent| {
            is_dragging.set(false);
            if let Some(target) = e.target()
                && let Ok(el) = target.dyn_into::<web_sys::HtmlElement>()
            {
                el.style().set_property("cursor", "grab").ok();
            }

            let (px, py) = press_pos.get();
            let (x, y) = (e.client_x() as f64, e.client_y() as f64);
            if (x - px).abs() >= CLICK_SLOP || (y - py).abs() >= CLICK_SLOP {
                return;
            }
            let Some(canvas) = canvas_ref.get_untracked() else {
                return;
            };
            let rect = canvas.get_bounding_client_rect();
            let world = world.borrow();
            let tile = viewport
                .get_untracked()
                .screen_to_tile(world.size(), x - rect.left(), y - rect.top());
            let clicked = tile.and_then(|t| world.owner(t).player());
            // Clicking the focused player's land again clears the focus.
            let next = if clicked == focused.get_untracked() { None } else { clicked };
            focused.set(next);
        }
    };

    view! {
        <div
            style="position: relative; width: 100%; height: 100%; overflow: hidden;"
            on:wheel=on_wheel
            on:pointerdown=on_pointer_down
            on:pointermove=on_pointer_move
            on:pointerup=on_pointer_up
        >
            <canvas
                node_ref=canvas_ref
                style="position: absolute; inset: 0; width: 100%; height: 100%; touch-action: none; image-rendering: pixelated; cursor: grab;"
            />
        </div>
    }
    .into_any()
}
