pub mod hiscore;

pub use hiscore::{MemoryRange, ScoreEvent, ScoreWatch};
