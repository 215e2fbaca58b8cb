use serde::{Deserialize, Serialize};

/// Opaque reference to one cell of the world grid (row-major index).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TileRef(pub u32);

impl TileRef {
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Compact numeric player identifier assigned by the world model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(pub u16);

/// Ownership of a tile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Owner {
    #[default]
    Unowned,
    Owned(PlayerId),
}

impl Owner {
    pub const fn player(self) -> Option<PlayerId> {
        match self {
            Owner::Unowned => None,
            Owner::Owned(player) => Some(player),
        }
    }

    pub const fn is_owned(self) -> bool {
        matches!(self, Owner::Owned(_))
    }
}

/// Fixed dimensions of the world grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridSize {
    pub width: u32,
    pub height: u32,
}

impl GridSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const fn tile_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    pub const fn contains(&self, tile: TileRef) -> bool {
        tile.index() < self.tile_count()
    }

    /// Tile at integer coordinates, or `None` outside the grid.
    pub fn tile_at(&self, x: i64, y: i64) -> Option<TileRef> {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return None;
        }
        Some(TileRef((y as u32) * self.width + x as u32))
    }

    /// Decode a tile into `(x, y)`. Callers must pass a tile inside the grid.
    pub const fn xy(&self, tile: TileRef) -> (u32, u32) {
        (tile.0 % self.width, tile.0 / self.width)
    }

    pub fn tiles(&self) -> impl Iterator<Item = TileRef> + use<> {
        (0..self.tile_count() as u32).map(TileRef)
    }

    /// Orthogonal neighbours, clipped at the grid edge.
    pub fn neighbors(&self, tile: TileRef) -> impl Iterator<Item = TileRef> + use<> {
        let size = *self;
        let (x, y) = size.xy(tile);
        let (x, y) = (x as i64, y as i64);
        [(x, y - 1), (x + 1, y), (x, y + 1), (x - 1, y)]
            .into_iter()
            .filter_map(move |(nx, ny)| size.tile_at(nx, ny))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn xy_decodes_row_major_index() {
        let size = GridSize::new(5, 3);
        assert_eq!(size.xy(TileRef(0)), (0, 0));
        assert_eq!(size.xy(TileRef(7)), (2, 1));
        assert_eq!(size.tile_at(2, 1), Some(TileRef(7)));
    }

    #[test]
    fn tile_at_rejects_out_of_bounds() {
        let size = GridSize::new(4, 4);
        assert_eq!(size.tile_at(-1, 0), None);
        assert_eq!(size.tile_at(4, 0), None);
        assert_eq!(size.tile_at(0, 4), None);
        assert!(!size.contains(TileRef(16)));
    }

    #[test]
    fn corner_has_two_neighbors() {
        let size = GridSize::new(4, 4);
        let corner: Vec<_> = size.neighbors(TileRef(0)).collect();
        assert_eq!(corner, vec![TileRef(1), TileRef(4)]);

        let inner = size.neighbors(size.tile_at(1, 1).unwrap()).count();
        assert_eq!(inner, 4);
    }
}
