//! Read-only view of the authoritative world model.
//!
//! The renderer never mutates the world. It polls these accessors from the
//! step and frame callbacks and receives owned/border tile sets through
//! [`TileSetReply`] completions.

use std::collections::{HashSet, VecDeque};

use crate::tasks::TileSetReply;
use crate::tile::{GridSize, Owner, PlayerId, TileRef};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnitKind {
    DefensePost,
    City,
    Port,
    MissileSilo,
    Warship,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerKind {
    Human,
    Bot,
    Nation,
}

/// Per-step change record. Closed set; handled exhaustively by the renderer.
#[derive(Debug, Clone, PartialEq)]
pub enum WorldUpdate {
    Unit {
        kind: UnitKind,
        position: TileRef,
        owner: PlayerId,
        previous_owner: Option<PlayerId>,
    },
    Player {
        player: PlayerId,
        tiles_owned: u32,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerSummary {
    pub id: PlayerId,
    pub name: String,
    pub kind: PlayerKind,
    /// Map anchor of the player's name label, if one has been placed.
    pub anchor: Option<(i64, i64)>,
}

/// Which tile set of a player an asynchronous query resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TileSetKind {
    Owned,
    Border,
}

pub trait WorldView {
    fn size(&self) -> GridSize;
    fn owner(&self, tile: TileRef) -> Owner;
    fn is_border(&self, tile: TileRef) -> bool;
    fn has_fallout(&self, tile: TileRef) -> bool;
    fn has_unit_nearby(&self, tile: TileRef, radius: u32, kind: UnitKind, owner: PlayerId)
    -> bool;
    fn tiles_owned(&self, player: PlayerId) -> u32;

    fn ticks(&self) -> u64;
    fn in_spawn_phase(&self) -> bool;

    /// Tiles whose state changed since the previous step.
    fn recently_updated_tiles(&self) -> &[TileRef];
    fn updates_since_last_step(&self) -> &[WorldUpdate];

    fn players(&self) -> Vec<PlayerSummary>;
    fn local_player(&self) -> Option<PlayerId>;
    fn is_friendly(&self, a: PlayerId, b: PlayerId) -> bool;

    /// Resolve `kind` tiles of `player`, now or later, through `reply`.
    fn request_tiles(&self, player: PlayerId, kind: TileSetKind, reply: TileSetReply);

    fn neighbors(&self, tile: TileRef) -> Vec<TileRef> {
        self.size().neighbors(tile).collect()
    }

    /// Breadth-first flood from `seed`, visiting only tiles accepted by `within`.
    fn bfs(&self, seed: TileRef, within: &dyn Fn(TileRef) -> bool) -> Vec<TileRef> {
        let mut seen = HashSet::from([seed]);
        let mut frontier = VecDeque::from([seed]);
        let mut out = Vec::new();
        while let Some(tile) = frontier.pop_front() {
            if !within(tile) {
                continue;
            }
            out.push(tile);
            for next in self.neighbors(tile) {
                if seen.insert(next) {
                    frontier.push_back(next);
                }
            }
        }
        out
    }
}

/// Predicate accepting tiles within Euclidean `radius` of `center`.
pub fn euclidean_within(size: GridSize, center: TileRef, radius: u32) -> impl Fn(TileRef) -> bool {
    let (cx, cy) = size.xy(center);
    let limit = radius as i64 * radius as i64;
    move |tile| {
        let (x, y) = size.xy(tile);
        let dx = x as i64 - cx as i64;
        let dy = y as i64 - cy as i64;
        dx * dx + dy * dy <= limit
    }
}
