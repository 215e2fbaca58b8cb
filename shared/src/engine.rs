//! Incremental territory raster.
//!
//! Driven by two external callbacks: [`TerritoryRenderer::on_simulation_step`]
//! turns world deltas into stale tiles, and
//! [`TerritoryRenderer::on_display_frame`] repaints a bounded slice of them
//! and blits the result. All raster writes happen inside these callbacks (or
//! the focus/resize entry points), never from query completions directly.

use tracing::{debug, info, trace};

use crate::compositor::{DisplaySurface, composite};
use crate::config::EngineConfig;
use crate::error::RasterError;
use crate::paint::{PaintContext, paint_rule};
use crate::queue::StalenessQueue;
use crate::raster::{LayerKind, Raster};
use crate::schedule::{DrainScheduler, FrameGate};
use crate::spawn::repaint_spawn_highlights;
use crate::tasks::{Completion, CompletionQueue, Followup};
use crate::theme::Theme;
use crate::tiers::TierTracker;
use crate::tile::{Owner, PlayerId, TileRef};
use crate::world::{TileSetKind, UnitKind, WorldUpdate, WorldView, euclidean_within};

/// Counters for host-side diagnostics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RendererStats {
    pub queued: usize,
    pub tiles_painted: u64,
    pub drains: u64,
    pub full_repaints: u64,
    pub failed_queries: u64,
}

/// What a display frame did.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    pub gate: FrameGate,
    pub drained: usize,
    pub layers: Vec<LayerKind>,
}

struct Surfaces {
    territory: Raster,
    highlight: Raster,
}

enum Lifecycle {
    Uninitialized,
    Ready(Surfaces),
    Disposed,
}

pub struct TerritoryRenderer<T: Theme> {
    config: EngineConfig,
    theme: T,
    queue: StalenessQueue,
    tiers: TierTracker,
    scheduler: DrainScheduler,
    completions: CompletionQueue,
    state: Lifecycle,
    focused: Option<PlayerId>,
    alternate_view: bool,
    stats: RendererStats,
}

impl<T: Theme> TerritoryRenderer<T> {
    pub fn new(config: EngineConfig, theme: T) -> Result<Self, RasterError> {
        config.validate()?;
        Ok(Self {
            queue: StalenessQueue::new(config.queue_seed, config.max_jitter),
            tiers: TierTracker::new(config.capture_tiers),
            scheduler: DrainScheduler::new(
                config.refresh_interval_ms,
                config.drag_suppression_ms,
                config.drain_divisor,
            ),
            completions: CompletionQueue::default(),
            state: Lifecycle::Uninitialized,
            focused: None,
            alternate_view: false,
            stats: RendererStats::default(),
            config,
            theme,
        })
    }

    /// Allocate both rasters and paint every tile once.
    pub fn initialize<W: WorldView + ?Sized>(&mut self, world: &W) -> Result<(), RasterError> {
        if matches!(self.state, Lifecycle::Disposed) {
            return Err(RasterError::Disposed);
        }
        let size = world.size();
        if size.is_empty() {
            return Err(RasterError::EmptyGrid {
                width: size.width,
                height: size.height,
            });
        }

        self.state = Lifecycle::Ready(Surfaces {
            territory: Raster::new(LayerKind::Territory, size),
            highlight: Raster::new(LayerKind::SpawnHighlight, size),
        });
        self.queue.clear();
        self.scheduler.reset();
        // Replies to queries issued against the previous grid must not land here.
        self.completions.close();
        self.completions = CompletionQueue::default();
        for tile in size.tiles() {
            self.paint_tile(world, tile, false);
        }
        info!(
            width = size.width,
            height = size.height,
            "territory layer initialized"
        );
        Ok(())
    }

    /// Reallocate for a new world/display size; equivalent to initialization.
    pub fn on_resize<W: WorldView + ?Sized>(&mut self, world: &W) -> Result<(), RasterError> {
        info!("territory layer resizing");
        self.initialize(world)
    }

    pub fn on_simulation_step<W: WorldView + ?Sized>(&mut self, world: &W) {
        if !self.is_ready() {
            debug!("simulation step ignored, territory layer not ready");
            return;
        }
        self.pump_completions(world);

        let step = world.ticks();
        for &tile in world.recently_updated_tiles() {
            self.queue.enqueue(tile, step);
        }
        for update in world.updates_since_last_step() {
            self.apply_update(world, update, step);
        }
        // Worlds that answer queries synchronously have already replied.
        self.pump_completions(world);

        if world.in_spawn_phase() && step % self.config.spawn_highlight_interval == 0 {
            self.refresh_spawn_highlights(world);
        }
        self.stats.queued = self.queue.len();
    }

    /// Drain per the scheduler, then composite onto `surface`.
    pub fn on_display_frame<W, S>(&mut self, world: &W, surface: &mut S, now_ms: f64) -> FrameReport
    where
        W: WorldView + ?Sized,
        S: DisplaySurface + ?Sized,
    {
        let gate = self.scheduler.gate(now_ms);
        let Lifecycle::Ready(_) = self.state else {
            return FrameReport {
                gate,
                drained: 0,
                layers: Vec::new(),
            };
        };
        self.pump_completions(world);

        let drained = if gate == FrameGate::Drain {
            self.scheduler.mark_drained(now_ms);
            self.drain(world)
        } else {
            0
        };

        let layers = match &self.state {
            Lifecycle::Ready(surfaces) => composite(
                surface,
                &surfaces.territory,
                &surfaces.highlight,
                self.alternate_view,
                world.in_spawn_phase(),
            ),
            _ => Vec::new(),
        };
        FrameReport {
            gate,
            drained,
            layers,
        }
    }

    pub fn on_view_mode_changed(&mut self, alternate: bool) {
        self.alternate_view = alternate;
    }

    pub fn on_drag_activity(&mut self, now_ms: f64) {
        self.scheduler.note_drag(now_ms);
    }

    /// Repaint the borders of the old and new focus right away, bypassing the queue.
    pub fn on_focused_player_changed<W: WorldView + ?Sized>(
        &mut self,
        world: &W,
        player: Option<PlayerId>,
    ) {
        if player == self.focused {
            return;
        }
        let previous = std::mem::replace(&mut self.focused, player);
        debug!(?previous, focused = ?player, "focused player changed");
        if !self.is_ready() {
            return;
        }
        for p in [previous, player].into_iter().flatten() {
            let reply = self
                .completions
                .reply(p, TileSetKind::Border, Followup::PaintBorderNow);
            world.request_tiles(p, TileSetKind::Border, reply);
        }
        self.pump_completions(world);
    }

    /// Queue (rather than paint) every border tile of `player`.
    pub fn enqueue_player_border<W: WorldView + ?Sized>(&mut self, world: &W, player: PlayerId) {
        let reply = self
            .completions
            .reply(player, TileSetKind::Border, Followup::Enqueue);
        world.request_tiles(player, TileSetKind::Border, reply);
        if self.is_ready() {
            self.pump_completions(world);
            self.stats.queued = self.queue.len();
        }
    }

    /// Swap the colour policy and queue every tile for repaint.
    pub fn set_theme<W: WorldView + ?Sized>(&mut self, world: &W, theme: T) {
        self.theme = theme;
        if !self.is_ready() {
            return;
        }
        let step = world.ticks();
        for tile in world.size().tiles() {
            self.queue.enqueue(tile, step);
        }
        self.stats.queued = self.queue.len();
    }

    /// Release both rasters. Completions arriving afterwards are discarded.
    pub fn dispose(&mut self) {
        if matches!(self.state, Lifecycle::Disposed) {
            return;
        }
        self.completions.close();
        self.queue.clear();
        self.state = Lifecycle::Disposed;
        self.stats.queued = 0;
        info!("territory layer disposed");
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, Lifecycle::Ready(_))
    }

    pub fn is_disposed(&self) -> bool {
        matches!(self.state, Lifecycle::Disposed)
    }

    pub fn territory_raster(&self) -> Option<&Raster> {
        match &self.state {
            Lifecycle::Ready(surfaces) => Some(&surfaces.territory),
            _ => None,
        }
    }

    pub fn highlight_raster(&self) -> Option<&Raster> {
        match &self.state {
            Lifecycle::Ready(surfaces) => Some(&surfaces.highlight),
            _ => None,
        }
    }

    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    pub fn stats(&self) -> RendererStats {
        RendererStats {
            queued: self.queue.len(),
            ..self.stats
        }
    }

    pub fn focused_player(&self) -> Option<PlayerId> {
        self.focused
    }

    pub fn alternate_view(&self) -> bool {
        self.alternate_view
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn theme(&self) -> &T {
        &self.theme
    }

    fn apply_update<W: WorldView + ?Sized>(&mut self, world: &W, update: &WorldUpdate, step: u64) {
        match *update {
            WorldUpdate::Unit {
                kind: UnitKind::DefensePost,
                position,
                owner,
                previous_owner,
            } => {
                let size = world.size();
                if !size.contains(position) {
                    debug!(tile = position.0, "defense post outside grid ignored");
                    return;
                }
                let within = euclidean_within(size, position, self.config.defense_post_range);
                for tile in world.bfs(position, &within) {
                    if !world.is_border(tile) {
                        continue;
                    }
                    let affected = match world.owner(tile) {
                        Owner::Owned(p) => p == owner || Some(p) == previous_owner,
                        Owner::Unowned => false,
                    };
                    if affected {
                        self.queue.enqueue(tile, step);
                    }
                }
            }
            WorldUpdate::Unit { .. } => {}
            WorldUpdate::Player {
                player,
                tiles_owned,
            } => {
                if let Some(crossing) = self.tiers.observe(player, tiles_owned) {
                    debug!(
                        player = player.0,
                        previous = crossing.previous,
                        current = crossing.current,
                        "capture tier crossed, repainting territory"
                    );
                    self.stats.full_repaints += 1;
                    let reply = self
                        .completions
                        .reply(player, TileSetKind::Owned, Followup::Enqueue);
                    world.request_tiles(player, TileSetKind::Owned, reply);
                }
            }
        }
    }

    fn pump_completions<W: WorldView + ?Sized>(&mut self, world: &W) {
        for completion in self.completions.drain_ready() {
            self.apply_completion(world, completion);
        }
    }

    fn apply_completion<W: WorldView + ?Sized>(&mut self, world: &W, completion: Completion) {
        let tiles = match completion.result {
            Ok(tiles) => tiles,
            Err(reason) => {
                self.stats.failed_queries += 1;
                debug!(
                    player = completion.player.0,
                    kind = ?completion.kind,
                    %reason,
                    "tile set query failed"
                );
                return;
            }
        };
        match completion.followup {
            Followup::Enqueue => {
                let step = world.ticks();
                for tile in tiles {
                    self.queue.enqueue(tile, step);
                }
            }
            Followup::PaintBorderNow => {
                for tile in tiles {
                    self.paint_tile(world, tile, true);
                }
            }
        }
    }

    fn drain<W: WorldView + ?Sized>(&mut self, world: &W) -> usize {
        let budget = self.scheduler.budget(self.queue.len(), world.in_spawn_phase());
        if budget == 0 {
            return 0;
        }
        let tiles = self.queue.drain(budget);
        for &tile in &tiles {
            self.paint_tile(world, tile, false);
            for neighbor in world.neighbors(tile) {
                self.paint_tile(world, neighbor, true);
            }
        }
        self.stats.drains += 1;
        self.stats.queued = self.queue.len();
        trace!(drained = tiles.len(), remaining = self.queue.len(), "drained stale tiles");
        tiles.len()
    }

    fn paint_tile<W: WorldView + ?Sized>(&mut self, world: &W, tile: TileRef, border_only: bool) {
        let Lifecycle::Ready(surfaces) = &mut self.state else {
            return;
        };
        let ctx = PaintContext {
            theme: &self.theme,
            tiers: self.config.capture_tiers,
            focused: self.focused,
            defense_post_range: self.config.defense_post_range,
        };
        let op = paint_rule(world, &ctx, tile, border_only);
        if surfaces.territory.apply(tile, op) {
            self.stats.tiles_painted += 1;
        }
    }

    fn refresh_spawn_highlights<W: WorldView + ?Sized>(&mut self, world: &W) {
        let Lifecycle::Ready(surfaces) = &mut self.state else {
            return;
        };
        let painted = repaint_spawn_highlights(
            world,
            &self.theme,
            &mut surfaces.highlight,
            &mut surfaces.territory,
            self.config.spawn_highlight_radius,
        );
        trace!(painted, "spawn highlights rebuilt");
    }
}
