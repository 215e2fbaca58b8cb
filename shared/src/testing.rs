//! In-crate fixtures: a scriptable world, a fixed palette and a recording surface.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use crate::colors::Rgb;
use crate::compositor::DisplaySurface;
use crate::raster::{LayerKind, Raster};
use crate::tasks::TileSetReply;
use crate::theme::PaletteTheme;
use crate::tile::{GridSize, Owner, PlayerId, TileRef};
use crate::world::{PlayerKind, PlayerSummary, TileSetKind, UnitKind, WorldUpdate, WorldView};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Immediate,
    Deferred,
    Failing,
}

pub struct TestWorld {
    size: GridSize,
    owners: Vec<Owner>,
    borders: Vec<bool>,
    fallout: Vec<bool>,
    units: Vec<(TileRef, UnitKind, PlayerId)>,
    tiles_owned: HashMap<PlayerId, u32>,
    ticks: u64,
    spawn_phase: bool,
    recent: Vec<TileRef>,
    updates: Vec<WorldUpdate>,
    players: Vec<PlayerSummary>,
    local: Option<PlayerId>,
    friends: HashSet<(PlayerId, PlayerId)>,
    pub query_mode: QueryMode,
    pending: RefCell<Vec<TileSetReply>>,
    pub requests: RefCell<Vec<(PlayerId, TileSetKind)>>,
}

impl TestWorld {
    pub fn new(width: u32, height: u32) -> Self {
        let size = GridSize::new(width, height);
        let n = size.tile_count();
        Self {
            size,
            owners: vec![Owner::Unowned; n],
            borders: vec![false; n],
            fallout: vec![false; n],
            units: Vec::new(),
            tiles_owned: HashMap::new(),
            ticks: 0,
            spawn_phase: false,
            recent: Vec::new(),
            updates: Vec::new(),
            players: Vec::new(),
            local: None,
            friends: HashSet::new(),
            query_mode: QueryMode::Immediate,
            pending: RefCell::new(Vec::new()),
            requests: RefCell::new(Vec::new()),
        }
    }

    pub fn at(&self, x: u32, y: u32) -> TileRef {
        self.size
            .tile_at(x as i64, y as i64)
            .expect("test coordinates inside grid")
    }

    /// Assign `tile` to `player`, keeping per-player counts in step.
    pub fn set_owner(&mut self, tile: TileRef, player: PlayerId) {
        self.assign(tile, Owner::Owned(player));
    }

    pub fn clear_owner(&mut self, tile: TileRef) {
        self.assign(tile, Owner::Unowned);
    }

    fn assign(&mut self, tile: TileRef, owner: Owner) {
        let slot = &mut self.owners[tile.index()];
        if let Owner::Owned(old) = *slot
            && let Some(count) = self.tiles_owned.get_mut(&old)
        {
            *count = count.saturating_sub(1);
        }
        *slot = owner;
        if let Owner::Owned(new) = owner {
            *self.tiles_owned.entry(new).or_default() += 1;
        }
    }

    pub fn set_tiles_owned(&mut self, player: PlayerId, count: u32) {
        self.tiles_owned.insert(player, count);
    }

    pub fn set_border(&mut self, tile: TileRef, border: bool) {
        self.borders[tile.index()] = border;
    }

    pub fn set_fallout(&mut self, tile: TileRef, fallout: bool) {
        self.fallout[tile.index()] = fallout;
    }

    pub fn add_unit(&mut self, tile: TileRef, kind: UnitKind, owner: PlayerId) {
        self.units.push((tile, kind, owner));
    }

    pub fn set_spawn_phase(&mut self, spawn_phase: bool) {
        self.spawn_phase = spawn_phase;
    }

    pub fn set_ticks(&mut self, ticks: u64) {
        self.ticks = ticks;
    }

    pub fn add_player(&mut self, id: PlayerId, kind: PlayerKind, anchor: Option<(i64, i64)>) {
        self.players.push(PlayerSummary {
            id,
            name: format!("player-{}", id.0),
            kind,
            anchor,
        });
    }

    pub fn move_anchor(&mut self, id: PlayerId, anchor: Option<(i64, i64)>) {
        if let Some(player) = self.players.iter_mut().find(|p| p.id == id) {
            player.anchor = anchor;
        }
    }

    pub fn set_local_player(&mut self, id: PlayerId) {
        self.local = Some(id);
    }

    pub fn set_friendly(&mut self, a: PlayerId, b: PlayerId) {
        self.friends.insert((a, b));
        self.friends.insert((b, a));
    }

    /// Mark a tile as changed during the current step.
    pub fn touch(&mut self, tile: TileRef) {
        self.recent.push(tile);
    }

    pub fn push_update(&mut self, update: WorldUpdate) {
        self.updates.push(update);
    }

    /// Start the next step: bump the counter and forget the previous deltas.
    pub fn advance(&mut self) {
        self.ticks += 1;
        self.recent.clear();
        self.updates.clear();
    }

    pub fn pending_queries(&self) -> usize {
        self.pending.borrow().len()
    }

    /// Answer every deferred query against the current state.
    pub fn resolve_pending(&self) {
        let pending: Vec<_> = self.pending.borrow_mut().drain(..).collect();
        for reply in pending {
            let tiles = self.tile_set(reply.player(), reply.kind());
            reply.resolve(tiles);
        }
    }

    pub fn tile_set(&self, player: PlayerId, kind: TileSetKind) -> Vec<TileRef> {
        self.size
            .tiles()
            .filter(|&t| self.owners[t.index()] == Owner::Owned(player))
            .filter(|&t| kind == TileSetKind::Owned || self.borders[t.index()])
            .collect()
    }
}

impl WorldView for TestWorld {
    fn size(&self) -> GridSize {
        self.size
    }

    fn owner(&self, tile: TileRef) -> Owner {
        self.owners[tile.index()]
    }

    fn is_border(&self, tile: TileRef) -> bool {
        self.borders[tile.index()]
    }

    fn has_fallout(&self, tile: TileRef) -> bool {
        self.fallout[tile.index()]
    }

    fn has_unit_nearby(&self, tile: TileRef, radius: u32, kind: UnitKind, owner: PlayerId) -> bool {
        let (x, y) = self.size.xy(tile);
        self.units.iter().any(|&(at, k, o)| {
            let (ux, uy) = self.size.xy(at);
            let dx = ux as i64 - x as i64;
            let dy = uy as i64 - y as i64;
            k == kind && o == owner && dx * dx + dy * dy <= (radius as i64).pow(2)
        })
    }

    fn tiles_owned(&self, player: PlayerId) -> u32 {
        self.tiles_owned.get(&player).copied().unwrap_or(0)
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn in_spawn_phase(&self) -> bool {
        self.spawn_phase
    }

    fn recently_updated_tiles(&self) -> &[TileRef] {
        &self.recent
    }

    fn updates_since_last_step(&self) -> &[WorldUpdate] {
        &self.updates
    }

    fn players(&self) -> Vec<PlayerSummary> {
        self.players.clone()
    }

    fn local_player(&self) -> Option<PlayerId> {
        self.local
    }

    fn is_friendly(&self, a: PlayerId, b: PlayerId) -> bool {
        self.friends.contains(&(a, b))
    }

    fn request_tiles(&self, player: PlayerId, kind: TileSetKind, reply: TileSetReply) {
        self.requests.borrow_mut().push((player, kind));
        match self.query_mode {
            QueryMode::Immediate => {
                reply.resolve(self.tile_set(player, kind));
            }
            QueryMode::Deferred => self.pending.borrow_mut().push(reply),
            QueryMode::Failing => {
                reply.fail("world unavailable");
            }
        }
    }
}

/// Palette with fixed, mutually distinct colours for players 1-4.
pub fn test_theme() -> PaletteTheme {
    let mut theme = PaletteTheme::default();
    theme.set_player_color(PlayerId(1), Rgb(200, 30, 30));
    theme.set_player_color(PlayerId(2), Rgb(30, 200, 30));
    theme.set_player_color(PlayerId(3), Rgb(30, 30, 200));
    theme.set_player_color(PlayerId(4), Rgb(200, 200, 30));
    theme
}

#[derive(Default)]
pub struct RecordingSurface {
    pub draws: Vec<(LayerKind, f64, f64)>,
}

impl DisplaySurface for RecordingSurface {
    fn draw_layer(&mut self, layer: &Raster, x: f64, y: f64) {
        self.draws.push((layer.kind(), x, y));
    }
}
