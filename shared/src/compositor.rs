use crate::raster::{LayerKind, Raster};
use crate::tile::GridSize;

/// Host drawing target, already transformed by the viewport.
pub trait DisplaySurface {
    /// Draw `layer` one pixel per tile with its top-left corner at `(x, y)`.
    fn draw_layer(&mut self, layer: &Raster, x: f64, y: f64);
}

/// Top-left corner that centres a grid of `size` on the origin.
pub fn centered_origin(size: GridSize) -> (f64, f64) {
    (-(size.width as f64) / 2.0, -(size.height as f64) / 2.0)
}

/// Blit the persistent rasters. The alternate view hides the whole layer;
/// the highlight overlay is only shown during the spawn phase.
pub fn composite<S>(
    surface: &mut S,
    territory: &Raster,
    highlight: &Raster,
    alternate_view: bool,
    in_spawn_phase: bool,
) -> Vec<LayerKind>
where
    S: DisplaySurface + ?Sized,
{
    if alternate_view {
        return Vec::new();
    }
    let (x, y) = centered_origin(territory.size());
    surface.draw_layer(territory, x, y);
    let mut drawn = vec![territory.kind()];
    if in_spawn_phase {
        surface.draw_layer(highlight, x, y);
        drawn.push(highlight.kind());
    }
    drawn
}
