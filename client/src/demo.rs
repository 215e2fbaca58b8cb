//! Stand-in world for running the territory layer in the browser without a
//! game server: seeded players expand into neighbouring land step by step.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

use frontier_shared::{
    GridSize, Owner, PlayerId, PlayerKind, PlayerSummary, TileRef, TileSetKind, TileSetReply,
    UnitKind, WorldUpdate, WorldView,
};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

const SPAWN_TICKS: u64 = 40;
const START_RADIUS: i64 = 2;
const CLAIMS_PER_STEP: usize = 6;
const CAPTURE_CHANCE: f64 = 0.15;
const POST_CHANCE: f64 = 0.01;
const FALLOUT_CHANCE: f64 = 0.02;

pub struct DemoWorld {
    size: GridSize,
    owners: Vec<Owner>,
    borders: Vec<bool>,
    fallout: Vec<bool>,
    posts: Vec<(TileRef, PlayerId)>,
    counts: HashMap<PlayerId, u32>,
    players: Vec<PlayerSummary>,
    allies: HashSet<(PlayerId, PlayerId)>,
    local: Option<PlayerId>,
    ticks: u64,
    recent: Vec<TileRef>,
    updates: Vec<WorldUpdate>,
    rng: SmallRng,
    pending: RefCell<Vec<(TileSetReply, Vec<TileRef>)>>,
}

impl DemoWorld {
    pub fn new(size: GridSize, player_count: u16, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed ^ 0x5eed_f00d);
        let mut players = Vec::with_capacity(player_count as usize);
        for i in 1..=player_count {
            let anchor = (
                rng.gen_range(0..size.width.max(1)) as i64,
                rng.gen_range(0..size.height.max(1)) as i64,
            );
            players.push(PlayerSummary {
                id: PlayerId(i),
                name: format!("Player {i}"),
                kind: if i % 3 == 0 { PlayerKind::Bot } else { PlayerKind::Human },
                anchor: Some(anchor),
            });
        }

        let mut allies = HashSet::new();
        if player_count >= 2 {
            allies.insert((PlayerId(1), PlayerId(2)));
            allies.insert((PlayerId(2), PlayerId(1)));
        }

        let n = size.tile_count();
        Self {
            size,
            owners: vec![Owner::Unowned; n],
            borders: vec![false; n],
            fallout: vec![false; n],
            posts: Vec::new(),
            counts: HashMap::new(),
            players,
            allies,
            local: (player_count > 0).then_some(PlayerId(1)),
            ticks: 0,
            recent: Vec::new(),
            updates: Vec::new(),
            rng,
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Advance one simulation step.
    pub fn step(&mut self) {
        self.ticks += 1;
        self.recent.clear();
        self.updates.clear();
        let before = self.counts.clone();

        let mut changed = Vec::new();
        if self.ticks == SPAWN_TICKS {
            self.claim_start_areas(&mut changed);
        } else if self.ticks > SPAWN_TICKS {
            self.expand(&mut changed);
            self.scatter_fallout(&mut changed);
            self.maybe_place_post();
        }
        self.refresh_borders(&changed);

        for player in &self.players {
            let now = self.counts.get(&player.id).copied().unwrap_or(0);
            if before.get(&player.id).copied().unwrap_or(0) != now {
                self.updates.push(WorldUpdate::Player {
                    player: player.id,
                    tiles_owned: now,
                });
            }
        }
    }

    /// Spawn tasks answering every query received so far.
    pub fn deliver_queries(&self) {
        for (reply, tiles) in self.pending.borrow_mut().drain(..) {
            wasm_bindgen_futures::spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(0).await;
                reply.resolve(tiles);
            });
        }
    }

    pub fn pending_queries(&self) -> usize {
        self.pending.borrow().len()
    }

    fn claim_start_areas(&mut self, changed: &mut Vec<TileRef>) {
        let anchors: Vec<_> = self
            .players
            .iter()
            .filter_map(|p| p.anchor.map(|a| (p.id, a)))
            .collect();
        for (player, (ax, ay)) in anchors {
            for dy in -START_RADIUS..=START_RADIUS {
                for dx in -START_RADIUS..=START_RADIUS {
                    if dx * dx + dy * dy > START_RADIUS * START_RADIUS {
                        continue;
                    }
                    if let Some(tile) = self.size.tile_at(ax + dx, ay + dy)
                        && !self.owners[tile.index()].is_owned()
                    {
                        self.assign(tile, Owner::Owned(player));
                        changed.push(tile);
                    }
                }
            }
        }
    }

    fn expand(&mut self, changed: &mut Vec<TileRef>) {
        let ids: Vec<_> = self.players.iter().map(|p| p.id).collect();
        for player in ids {
            let frontier: Vec<_> = self
                .size
                .tiles()
                .filter(|&t| self.borders[t.index()] && self.owners[t.index()] == Owner::Owned(player))
                .collect();
            if frontier.is_empty() {
                continue;
            }
            for _ in 0..CLAIMS_PER_STEP {
                let from = frontier[self.rng.gen_range(0..frontier.len())];
                let options: Vec<_> = self
                    .size
                    .neighbors(from)
                    .filter(|&t| self.owners[t.index()] != Owner::Owned(player))
                    .collect();
                if options.is_empty() {
                    continue;
                }
                let target = options[self.rng.gen_range(0..options.len())];
                let take = match self.owners[target.index()] {
                    Owner::Unowned => true,
                    Owner::Owned(_) => self.rng.gen_bool(CAPTURE_CHANCE),
                };
                if take {
                    self.fallout[target.index()] = false;
                    self.assign(target, Owner::Owned(player));
                    changed.push(target);
                }
            }
        }
    }

    fn scatter_fallout(&mut self, changed: &mut Vec<TileRef>) {
        if !self.rng.gen_bool(FALLOUT_CHANCE) || self.size.is_empty() {
            return;
        }
        let tile = TileRef(self.rng.gen_range(0..self.size.tile_count() as u32));
        if !self.owners[tile.index()].is_owned() {
            self.fallout[tile.index()] = true;
            changed.push(tile);
        }
    }

    fn maybe_place_post(&mut self) {
        if !self.rng.gen_bool(POST_CHANCE) || self.size.is_empty() {
            return;
        }
        let tile = TileRef(self.rng.gen_range(0..self.size.tile_count() as u32));
        if let Owner::Owned(owner) = self.owners[tile.index()] {
            self.posts.push((tile, owner));
            self.updates.push(WorldUpdate::Unit {
                kind: UnitKind::DefensePost,
                position: tile,
                owner,
                previous_owner: None,
            });
        }
    }

    fn assign(&mut self, tile: TileRef, owner: Owner) {
        if let Owner::Owned(old) = self.owners[tile.index()]
            && let Some(count) = self.counts.get_mut(&old)
        {
            *count = count.saturating_sub(1);
        }
        self.owners[tile.index()] = owner;
        if let Owner::Owned(new) = owner {
            *self.counts.entry(new).or_default() += 1;
        }
    }

    /// Recompute border flags around `changed` and record every touched tile.
    fn refresh_borders(&mut self, changed: &[TileRef]) {
        let mut touched = HashSet::new();
        for &tile in changed {
            touched.insert(tile);
            touched.extend(self.size.neighbors(tile));
        }
        for &tile in &touched {
            let owner = self.owners[tile.index()];
            let border = owner.is_owned()
                && self
                    .size
                    .neighbors(tile)
                    .any(|n| self.owners[n.index()] != owner);
            self.borders[tile.index()] = border;
        }
        let mut touched: Vec<_> = touched.into_iter().collect();
        touched.sort_unstable();
        self.recent = touched;
    }

    fn tile_set(&self, player: PlayerId, kind: TileSetKind) -> Vec<TileRef> {
        self.size
            .tiles()
            .filter(|&t| self.owners[t.index()] == Owner::Owned(player))
            .filter(|&t| kind == TileSetKind::Owned || self.borders[t.index()])
            .collect()
    }
}

impl WorldView for DemoWorld {
    fn size(&self) -> GridSize {
        self.size
    }

    fn owner(&self, tile: TileRef) -> Owner {
        self.owners.get(tile.index()).copied().unwrap_or_default()
    }

    fn is_border(&self, tile: TileRef) -> bool {
        self.borders.get(tile.index()).copied().unwrap_or(false)
    }

    fn has_fallout(&self, tile: TileRef) -> bool {
        self.fallout.get(tile.index()).copied().unwrap_or(false)
    }

    fn has_unit_nearby(&self, tile: TileRef, radius: u32, kind: UnitKind, owner: PlayerId) -> bool {
        if kind != UnitKind::DefensePost {
            return false;
        }
        let (x, y) = self.size.xy(tile);
        let limit = radius as i64 * radius as i64;
        self.posts.iter().any(|&(post, post_owner)| {
            let (px, py) = self.size.xy(post);
            let dx = px as i64 - x as i64;
            let dy = py as i64 - y as i64;
            post_owner == owner && dx * dx + dy * dy <= limit
        })
    }

    fn tiles_owned(&self, player: PlayerId) -> u32 {
        self.counts.get(&player).copied().unwrap_or(0)
    }

    fn ticks(&self) -> u64 {
        self.ticks
    }

    fn in_spawn_phase(&self) -> bool {
        self.ticks < SPAWN_TICKS
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
        self.allies.contains(&(a, b))
    }

    fn request_tiles(&self, player: PlayerId, kind: TileSetKind, reply: TileSetReply) {
        let tiles = self.tile_set(player, kind);
        self.pending.borrow_mut().push((reply, tiles));
    }
}
