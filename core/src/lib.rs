pub mod core;
pub mod device;
pub mod video;

pub mod prelude {
    pub use crate::core::machine::{ControlLine, FrameStatus, VideoBoard, VideoRegion};
    pub use crate::core::MemoryRead;
    pub use crate::video::{Bitmap, GfxElement, GfxLayout, PaletteTable, Rect, Rgb, TileInfo, Tilemap};
}
