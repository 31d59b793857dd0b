pub mod gomoku;
pub mod registry;
pub mod rom_loader;
pub mod wiping;

pub use gomoku::GomokuVideo;
pub use wiping::WipingVideo;
