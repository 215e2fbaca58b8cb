use frontier_shared::{GridSize, TileRef, centered_origin};

/// Pan/zoom transform from map coordinates (one unit per tile, grid centred
/// on the origin) to canvas pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Viewport {
    pub offset_x: f64,
    pub offset_y: f64,
    pub scale: f64,
}

const MIN_SCALE: f64 = 0.25;
const MAX_SCALE: f64 = 64.0;
const ZOOM_SENSITIVITY: f64 = 0.001;
const FIT_PADDING: f64 = 0.05;

impl Default for Viewport {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            scale: 1.0,
        }
    }
}

impl Viewport {
    pub fn world_to_screen(&self, wx: f64, wy: f64) -> (f64, f64) {
        (
            wx * self.scale + self.offset_x,
            wy * self.scale + self.offset_y,
        )
    }

    pub fn screen_to_world(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            (sx - self.offset_x) / self.scale,
            (sy - self.offset_y) / self.scale,
        )
    }

    /// Tile under a canvas pixel, if any.
    pub fn screen_to_tile(&self, size: GridSize, sx: f64, sy: f64) -> Option<TileRef> {
        let (wx, wy) = self.screen_to_world(sx, sy);
        let (ox, oy) = centered_origin(size);
        size.tile_at((wx - ox).floor() as i64, (wy - oy).floor() as i64)
    }

    /// Zoom toward a focus point (screen coordinates).
    pub fn zoom_at(&mut self, delta: f64, screen_x: f64, screen_y: f64) {
        let factor = (-delta * ZOOM_SENSITIVITY).exp();
        let new_scale = (self.scale * factor).clamp(MIN_SCALE, MAX_SCALE);
        let ratio = new_scale / self.scale;

        // Keep the point under the cursor fixed
        self.offset_x = screen_x - (screen_x - self.offset_x) * ratio;
        self.offset_y = screen_y - (screen_y - self.offset_y) * ratio;
        self.scale = new_scale;
    }

    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.offset_x += dx;
        self.offset_y += dy;
    }

    /// Fit the whole grid into a canvas of the given size.
    pub fn fit_grid(&mut self, size: GridSize, canvas_w: f64, canvas_h: f64) {
        let world_w = size.width as f64;
        let world_h = size.height as f64;
        if world_w <= 0.0 || world_h <= 0.0 || canvas_w <= 0.0 || canvas_h <= 0.0 {
            return;
        }

        let scale_x = canvas_w / (world_w * (1.0 + FIT_PADDING * 2.0));
        let scale_y = canvas_h / (world_h * (1.0 + FIT_PADDING * 2.0));
        self.scale = scale_x.min(scale_y).clamp(MIN_SCALE, MAX_SCALE);
        self.offset_x = canvas_w / 2.0;
        self.offset_y = canvas_h / 2.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fit_centres_grid_on_canvas() {
        let mut vp = Viewport::default();
        vp.fit_grid(GridSize::new(100, 50), 1100.0, 1100.0);
        assert!((vp.scale - 10.0).abs() < 1e-9);
        assert_eq!(vp.world_to_screen(0.0, 0.0), (550.0, 550.0));
    }

    #[test]
    fn screen_to_tile_round_trips_tile_centres() {
        let size = GridSize::new(8, 6);
        let mut vp = Viewport::default();
        vp.fit_grid(size, 880.0, 660.0);
        let (ox, oy) = centered_origin(size);
        let (sx, sy) = vp.world_to_screen(ox + 3.5, oy + 2.5);
        assert_eq!(vp.screen_to_tile(size, sx, sy), size.tile_at(3, 2));
    }

    #[test]
    fn screen_outside_grid_has_no_tile() {
        let size = GridSize::new(4, 4);
        let vp = Viewport::default();
        assert_eq!(vp.screen_to_tile(size, -10.0, 0.5), None);
        assert_eq!(vp.screen_to_tile(size, 0.5, 0.5), size.tile_at(2, 2));
    }

    #[test]
    fn zoom_keeps_focus_point_fixed() {
        let mut vp = Viewport::default();
        let before = vp.screen_to_world(200.0, 120.0);
        vp.zoom_at(-300.0, 200.0, 120.0);
        let after = vp.screen_to_world(200.0, 120.0);
        assert!((before.0 - after.0).abs() < 1e-9);
        assert!((before.1 - after.1).abs() < 1e-9);
        assert!(vp.scale > 1.0);
    }
}
