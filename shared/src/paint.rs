//! Per-tile colour rules for the territory raster.

use crate::colors::Rgb;
use crate::theme::Theme;
use crate::tiers::CaptureTiers;
use crate::tile::{Owner, PlayerId, TileRef};
use crate::world::{UnitKind, WorldView};

pub const TERRITORY_ALPHA: u8 = 150;
pub const BORDER_ALPHA: u8 = 255;
pub const FALLOUT_ALPHA: u8 = 150;

/// Outcome of evaluating the rules for one tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaintOp {
    /// Leave the pixel untouched.
    Skip,
    /// Make the pixel fully transparent.
    Clear,
    Fill { color: Rgb, alpha: u8 },
}

/// Everything besides the world that the rules read.
pub struct PaintContext<'a, T: Theme + ?Sized> {
    pub theme: &'a T,
    pub tiers: CaptureTiers,
    pub focused: Option<PlayerId>,
    pub defense_post_range: u32,
}

/// Evaluate the paint rules for `tile`.
///
/// A border-only pass never touches unowned tiles, so neighbour propagation
/// cannot erase fallout or clear pixels it was not asked about.
pub fn paint_rule<W, T>(world: &W, ctx: &PaintContext<'_, T>, tile: TileRef, border_only: bool) -> PaintOp
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    let size = world.size();
    debug_assert!(size.contains(tile), "tile {tile:?} outside {size:?}");
    if !size.contains(tile) {
        tracing::warn!(tile = tile.0, "paint requested for tile outside the grid");
        return PaintOp::Skip;
    }

    let owner = match world.owner(tile) {
        Owner::Unowned if border_only => return PaintOp::Skip,
        Owner::Unowned => return unowned_op(world, ctx, tile),
        Owner::Owned(player) => player,
    };

    let (x, y) = size.xy(tile);
    let op = if world.is_border(tile) {
        border_fill(world, ctx, tile, owner, (x, y))
    } else {
        interior_fill(world, ctx, owner, (x, y))
    };
    op.unwrap_or_else(|| {
        tracing::trace!(tile = tile.0, player = owner.0, "no theme colour, tile skipped");
        PaintOp::Skip
    })
}

fn unowned_op<W, T>(world: &W, ctx: &PaintContext<'_, T>, tile: TileRef) -> PaintOp
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    if !world.has_fallout(tile) {
        return PaintOp::Clear;
    }
    match ctx.theme.fallout_color() {
        Some(color) => PaintOp::Fill {
            color,
            alpha: FALLOUT_ALPHA,
        },
        None => PaintOp::Skip,
    }
}

fn border_fill<W, T>(
    world: &W,
    ctx: &PaintContext<'_, T>,
    tile: TileRef,
    owner: PlayerId,
    (x, y): (u32, u32),
) -> Option<PaintOp>
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    let defended =
        world.has_unit_nearby(tile, ctx.defense_post_range, UnitKind::DefensePost, owner);
    let color = if defended {
        let pair = ctx.theme.defended_border_colors(owner)?;
        if x % 2 == y % 2 { pair.light } else { pair.dark }
    } else if ctx.focused == Some(owner) {
        ctx.theme.focused_border_color()?
    } else {
        ctx.theme.border_color(owner)?
    };
    Some(PaintOp::Fill {
        color,
        alpha: BORDER_ALPHA,
    })
}

fn interior_fill<W, T>(
    world: &W,
    ctx: &PaintContext<'_, T>,
    owner: PlayerId,
    (x, y): (u32, u32),
) -> Option<PaintOp>
where
    W: WorldView + ?Sized,
    T: Theme + ?Sized,
{
    let young = !world.in_spawn_phase()
        && ctx
            .tiers
            .dither_modulus(world.tiles_owned(owner))
            .is_some_and(|modulus| (x + y) % modulus == 0);
    let color = if young {
        ctx.theme.spawn_highlight_color()?
    } else {
        ctx.theme.territory_color(owner)?
    };
    Some(PaintOp::Fill {
        color,
        alpha: TERRITORY_ALPHA,
    })
}
