//! Spawn-phase overlay: reserved areas around each human player's anchor.

use crate::colors::Rgb;
use crate::raster::Raster;
use crate::theme::Theme;
use crate::tile::PlayerId;
use crate::world::{PlayerKind, PlayerSummary, WorldView, euclidean_within};

pub const HIGHLIGHT_ALPHA: u8 = 255;

/// Rebuild the overlay from scratch. Returns the number of cells painted.
///
/// Each highlighted cell is also cleared in `territory`, so a reserved tile
/// shows only the overlay colour.
pub fn repaint_spawn_highlights<W, T>(
    world: &W,
    theme: &T,
    raster: &mut Raster,
    territory: &mut Raster,
    radius: u32,
) -> usize
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    raster.clear_all();
    let size = world.size();
    let viewer = world.local_player();
    let mut painted = 0;

    for human in world.players().iter().filter(|p| p.kind == PlayerKind::Human) {
        let Some(anchor) = human
            .anchor
            .and_then(|(x, y)| size.tile_at(x, y))
        else {
            continue;
        };
        let Some(color) = highlight_color(world, theme, viewer, human) else {
            tracing::trace!(player = human.id.0, "no spawn highlight colour");
            continue;
        };

        let within = euclidean_within(size, anchor, radius);
        for tile in world.bfs(anchor, &within) {
            if world.owner(tile).is_owned() {
                continue;
            }
            if raster.fill_cell(tile, color, HIGHLIGHT_ALPHA) {
                territory.clear_cell(tile);
                painted += 1;
            }
        }
    }
    painted
}

/// Allies of the viewer get the self/ally colour; the viewer and everyone else the neutral one.
fn highlight_color<W, T>(
    world: &W,
    theme: &T,
    viewer: Option<PlayerId>,
    human: &PlayerSummary,
) -> Option<Rgb>
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    match viewer {
        Some(me) if me != human.id && world.is_friendly(me, human.id) => theme.self_color(),
        _ => theme.spawn_highlight_color(),
    }
}
