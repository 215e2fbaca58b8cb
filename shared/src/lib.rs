pub mod colors;
pub mod compositor;
pub mod config;
pub mod engine;
pub mod error;
pub mod paint;
pub mod queue;
pub mod raster;
pub mod schedule;
pub mod spawn;
pub mod tasks;
pub mod theme;
pub mod tiers;
pub mod tile;
pub mod world;

#[cfg(test)]
mod testing;

pub use colors::{Rgb, player_color};
pub use compositor::{DisplaySurface, centered_origin};
pub use config::EngineConfig;
pub use engine::{FrameReport, RendererStats, TerritoryRenderer};
pub use error::RasterError;
pub use raster::{LayerKind, Raster};
pub use schedule::FrameGate;
pub use tasks::TileSetReply;
pub use theme::{DefendedBorderColors, PaletteTheme, Theme};
pub use tiers::CaptureTiers;
pub use tile::*;
pub use world::*;
