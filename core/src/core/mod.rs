pub mod bus;
pub mod machine;

pub use bus::MemoryRead;
pub use machine::{ControlLine, FrameStatus, VideoBoard, VideoRegion};
