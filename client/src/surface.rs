use frontier_shared::{DisplaySurface, GridSize, LayerKind, Raster, RasterError};
use wasm_bindgen::{Clamped, JsCast};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, ImageData};

use crate::viewport::Viewport;

/// 2D context of `canvas`, or `SurfaceUnavailable`.
pub fn context_2d(canvas: &HtmlCanvasElement) -> Result<CanvasRenderingContext2d, RasterError> {
    canvas
        .get_context("2d")
        .map_err(|e| RasterError::SurfaceUnavailable(format!("{e:?}")))?
        .ok_or_else(|| RasterError::SurfaceUnavailable("2d context not supported".into()))?
        .dyn_into::<CanvasRenderingContext2d>()
        .map_err(|_| RasterError::SurfaceUnavailable("unexpected context type".into()))
}

fn offscreen_canvas(size: GridSize) -> Result<HtmlCanvasElement, RasterError> {
    let document = web_sys::window()
        .and_then(|w| w.document())
        .ok_or_else(|| RasterError::SurfaceUnavailable("no document".into()))?;
    let canvas = document
        .create_element("canvas")
        .map_err(|e| RasterError::SurfaceUnavailable(format!("{e:?}")))?
        .dyn_into::<HtmlCanvasElement>()
        .map_err(|_| RasterError::SurfaceUnavailable("created element is not a canvas".into()))?;
    canvas.set_width(size.width);
    canvas.set_height(size.height);
    Ok(canvas)
}

/// Offscreen copy of one engine raster; re-uploaded only when its revision moves.
struct LayerCache {
    kind: LayerKind,
    size: GridSize,
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    uploaded: Option<u64>,
}

impl LayerCache {
    fn new(kind: LayerKind, size: GridSize) -> Result<Self, RasterError> {
        let canvas = offscreen_canvas(size)?;
        let ctx = context_2d(&canvas)?;
        Ok(Self {
            kind,
            size,
            canvas,
            ctx,
            uploaded: None,
        })
    }

    fn sync(&mut self, layer: &Raster) -> Result<(), RasterError> {
        if !needs_upload(self.uploaded, layer.revision()) {
            return Ok(());
        }
        let data = ImageData::new_with_u8_clamped_array_and_sh(
            Clamped(layer.pixels()),
            self.size.width,
            self.size.height,
        )
        .map_err(|e| RasterError::SurfaceUnavailable(format!("{e:?}")))?;
        self.ctx
            .put_image_data(&data, 0.0, 0.0)
            .map_err(|e| RasterError::SurfaceUnavailable(format!("{e:?}")))?;
        self.uploaded = Some(layer.revision());
        Ok(())
    }
}

fn needs_upload(uploaded: Option<u64>, revision: u64) -> bool {
    uploaded != Some(revision)
}

/// The visible map canvas. Layers are blitted one canvas pixel per tile,
/// scaled by the current viewport.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
    layers: Vec<LayerCache>,
}

impl CanvasSurface {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self {
            ctx,
            viewport: Viewport::default(),
            layers: Vec::new(),
        }
    }

    /// Clear the canvas and adopt the viewport for this frame's draws.
    pub fn begin_frame(&mut self, viewport: &Viewport, width: f64, height: f64) {
        self.viewport = viewport.clone();
        self.ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0).ok();
        self.ctx.clear_rect(0.0, 0.0, width, height);
    }

    /// Drop cached layer canvases, as after the engine reallocated its rasters.
    pub fn reset(&mut self) {
        self.layers.clear();
    }

    fn cache_for(&mut self, layer: &Raster) -> Result<&mut LayerCache, RasterError> {
        let kind = layer.kind();
        let size = layer.size();
        self.layers.retain(|c| c.kind != kind || c.size == size);
        let index = match self.layers.iter().position(|c| c.kind == kind) {
            Some(index) => index,
            None => {
                self.layers.push(LayerCache::new(kind, size)?);
                self.layers.len() - 1
            }
        };
        Ok(&mut self.layers[index])
    }
}

impl DisplaySurface for CanvasSurface {
    fn draw_layer(&mut self, layer: &Raster, x: f64, y: f64) {
        let vp = self.viewport.clone();
        let ctx = self.ctx.clone();
        let cache = match self.cache_for(layer).and_then(|cache| {
            cache.sync(layer)?;
            Ok(cache)
        }) {
            Ok(cache) => cache,
            Err(e) => {
                web_sys::console::warn_1(&format!("layer {:?} not drawn: {e}", layer.kind()).into());
                return;
            }
        };

        ctx.set_transform(vp.scale, 0.0, 0.0, vp.scale, vp.offset_x, vp.offset_y)
            .ok();
        ctx.set_image_smoothing_enabled(false);
        ctx.draw_image_with_html_canvas_element(&cache.canvas, x, y)
            .ok();
    }
}
