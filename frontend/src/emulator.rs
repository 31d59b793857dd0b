//! Replays captured video state into a board and renders one frame.

use std::path::PathBuf;
use std::str::FromStr;

use nichi_core::core::machine::{ControlLine, VideoBoard, VideoRegion};

use crate::error::SnapError;

/// `--dump region=file`: bytes written to a region from offset 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemoryDump {
    pub region: VideoRegion,
    pub path: PathBuf,
}

impl FromStr for MemoryDump {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (region, path) = s
            .split_once('=')
            .ok_or_else(|| format!("expected REGION=FILE, got '{s}'"))?;
        Ok(Self {
            region: region.trim().parse()?,
            path: PathBuf::from(path),
        })
    }
}

/// `--line name=level`: a raw level latched on a control line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LineLevel {
    pub line: ControlLine,
    pub level: bool,
}

impl FromStr for LineLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (line, level) = s
            .split_once('=')
            .ok_or_else(|| format!("expected LINE=LEVEL, got '{s}'"))?;
        let level = match level.trim() {
            "1" | "high" | "true" => true,
            "0" | "low" | "false" => false,
            other => return Err(format!("invalid line level '{other}'")),
        };
        Ok(Self {
            line: line.trim().parse()?,
            level,
        })
    }
}

/// An RGB24 image of a board's visible area.
pub struct Frame {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

/// Feed dumps and line levels through the board's host entry points, then
/// render the visible area.
pub fn snapshot(
    board: &mut dyn VideoBoard,
    dumps: &[MemoryDump],
    lines: &[LineLevel],
) -> Result<Frame, SnapError> {
    for dump in dumps {
        let data = std::fs::read(&dump.path).map_err(|source| SnapError::Read {
            path: dump.path.clone(),
            source,
        })?;
        tracing::debug!(region = %dump.region, bytes = data.len(), "replaying dump");
        replay(board, dump.region, &data);
    }

    for setting in lines {
        board.on_line_change(setting.line, setting.level);
    }

    let area = board.visible_area();
    let (width, height) = (area.width() as u32, area.height() as u32);
    let mut rgb = vec![0u8; (width * height * 3) as usize];
    let status = board.render_rgb24(&mut rgb);
    tracing::debug!(width, height, status = status.code(), "frame rendered");

    Ok(Frame { width, height, rgb })
}

/// Write `data` to `region` one byte at a time, starting at offset 0.
pub fn replay(board: &mut dyn VideoBoard, region: VideoRegion, data: &[u8]) {
    for (offset, &value) in data.iter().enumerate() {
        board.on_memory_write(region, offset, value);
    }
}
