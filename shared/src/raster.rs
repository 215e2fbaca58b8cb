use crate::colors::Rgb;
use crate::paint::PaintOp;
use crate::tile::{GridSize, TileRef};

/// Which persistent surface a raster backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayerKind {
    Territory,
    SpawnHighlight,
}

/// RGBA8 pixel buffer, one pixel per tile. Alpha 0 means unpainted.
///
/// `revision` increases on every mutation so hosts can skip re-uploading an
/// unchanged buffer.
#[derive(Debug, Clone)]
pub struct Raster {
    kind: LayerKind,
    size: GridSize,
    pixels: Vec<u8>,
    revision: u64,
}

impl Raster {
    pub fn new(kind: LayerKind, size: GridSize) -> Self {
        Self {
            kind,
            size,
            pixels: vec![0; size.tile_count() * 4],
            revision: 0,
        }
    }

    pub fn kind(&self) -> LayerKind {
        self.kind
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixel(&self, tile: TileRef) -> Option<[u8; 4]> {
        let offset = tile.index().checked_mul(4)?;
        let px = self.pixels.get(offset..offset + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Apply a paint decision. Returns `true` if the buffer was touched.
    pub fn apply(&mut self, tile: TileRef, op: PaintOp) -> bool {
        match op {
            PaintOp::Skip => false,
            PaintOp::Clear => self.clear_cell(tile),
            PaintOp::Fill { color, alpha } => self.fill_cell(tile, color, alpha),
        }
    }

    pub fn fill_cell(&mut self, tile: TileRef, color: Rgb, alpha: u8) -> bool {
        let Some(px) = self.cell_mut(tile) else {
            return false;
        };
        px[0] = color.0;
        px[1] = color.1;
        px[2] = color.2;
        px[3] = alpha;
        self.revision += 1;
        true
    }

    /// Make a cell transparent. Colour channels are left as they were.
    pub fn clear_cell(&mut self, tile: TileRef) -> bool {
        let Some(px) = self.cell_mut(tile) else {
            return false;
        };
        px[3] = 0;
        self.revision += 1;
        true
    }

    pub fn clear_all(&mut self) {
        self.pixels.fill(0);
        self.revision += 1;
    }

    pub fn painted_count(&self) -> usize {
        self.pixels.chunks_exact(4).filter(|px| px[3] != 0).count()
    }

    fn cell_mut(&mut self, tile: TileRef) -> Option<&mut [u8]> {
        let offset = tile.index().checked_mul(4)?;
        self.pixels.get_mut(offset..offset + 4)
    }
}
