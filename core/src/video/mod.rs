pub mod bitmap;
pub mod gfx;
pub mod palette;
pub mod resnet;
pub mod tilemap;

pub use bitmap::{Bitmap, Rect};
pub use gfx::{GfxElement, GfxLayout};
pub use palette::{PaletteTable, Rgb};
pub use resnet::{ResistorNetwork, ResistorWeights};
pub use tilemap::{TileInfo, Tilemap};
