use std::fmt;
use std::str::FromStr;

use crate::video::{Bitmap, PaletteTable, Rect};

/// Memory areas a video board receives write notifications for.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VideoRegion {
    /// Tile pattern codes.
    VideoRam,
    /// Tile color/flip attributes.
    ColorRam,
    /// Movable object records.
    SpriteRam,
    /// Live per-cell board state (stones, cursors).
    BoardRam,
}

impl VideoRegion {
    pub const ALL: [VideoRegion; 4] = [
        VideoRegion::VideoRam,
        VideoRegion::ColorRam,
        VideoRegion::SpriteRam,
        VideoRegion::BoardRam,
    ];

    pub const fn name(self) -> &'static str {
        match self {
            VideoRegion::VideoRam => "videoram",
            VideoRegion::ColorRam => "colorram",
            VideoRegion::SpriteRam => "spriteram",
            VideoRegion::BoardRam => "boardram",
        }
    }
}

impl fmt::Display for VideoRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for VideoRegion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|r| r.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown video region: {s}"))
    }
}

/// Single-bit control lines driven by the board's output latch.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ControlLine {
    FlipScreen,
    BackgroundEnable,
}

impl ControlLine {
    pub const ALL: [ControlLine; 2] = [ControlLine::FlipScreen, ControlLine::BackgroundEnable];

    pub const fn name(self) -> &'static str {
        match self {
            ControlLine::FlipScreen => "flip",
            ControlLine::BackgroundEnable => "background",
        }
    }
}

impl fmt::Display for ControlLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ControlLine {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|l| l.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown control line: {s}"))
    }
}

/// Result of a frame-render call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStatus {
    Ok,
}

impl FrameStatus {
    /// Numeric status reported to the host (0 = success).
    pub const fn code(self) -> u32 {
        match self {
            FrameStatus::Ok => 0,
        }
    }
}

/// Host-facing interface of an emulated video board.
///
/// The host owns scheduling: it calls [`on_memory_write`](Self::on_memory_write)
/// and [`on_line_change`](Self::on_line_change) whenever the emulated CPU
/// touches video hardware, and [`on_frame_render`](Self::on_frame_render)
/// once per displayed frame. These never run concurrently.
pub trait VideoBoard {
    /// Size of the output bitmap as (width, height) in pixels.
    fn display_size(&self) -> (u32, u32);

    /// Part of the output bitmap that reaches the monitor.
    fn visible_area(&self) -> Rect;

    /// Pen → RGB table used to resolve rendered pens.
    fn palette(&self) -> &PaletteTable;

    /// Store a byte written by the CPU. Offsets wrap to the region size;
    /// regions the board does not have are ignored.
    fn on_memory_write(&mut self, region: VideoRegion, offset: usize, value: u8);

    /// Read back a byte of video memory (0xFF for regions the board lacks).
    fn read_memory(&self, region: VideoRegion, offset: usize) -> u8;

    /// Latch a new level on a control line.
    fn on_line_change(&mut self, line: ControlLine, level: bool);

    /// Compose one frame into `buffer`, touching only pixels inside `clip`.
    fn on_frame_render(&mut self, buffer: &mut Bitmap, clip: &Rect) -> FrameStatus;

    /// Render the visible area and convert it to RGB24.
    ///
    /// `buffer` must hold at least `width * height * 3` bytes of the visible
    /// area. Pixels are stored left-to-right, top-to-bottom, 3 bytes per
    /// pixel (R, G, B).
    fn render_rgb24(&mut self, buffer: &mut [u8]) -> FrameStatus {
        let (w, h) = self.display_size();
        let mut bitmap = Bitmap::new(w as usize, h as usize);
        let area = self.visible_area();
        let status = self.on_frame_render(&mut bitmap, &area);
        bitmap.to_rgb24(self.palette(), &area, buffer);
        status
    }
}
