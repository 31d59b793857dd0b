use nichi_core::prelude::*;

use crate::registry::BoardEntry;
use crate::rom_loader::{RomEntry, RomLoadError, RomRegion, RomSet};

// ---------------------------------------------------------------------------
// Gomoku Narabe Renju ROM definitions
// ---------------------------------------------------------------------------

/// Palette PROMs: 64 colors, one byte each.
pub static GOMOKU_COLOR_PROMS: RomRegion = RomRegion {
    tag: "proms",
    size: 0x40,
    entries: &[
        RomEntry {
            name: "rj_prom.1m",
            size: 0x20,
            offset: 0x00,
            crc32: None,
        },
        RomEntry {
            name: "rj_prom.1l",
            size: 0x20,
            offset: 0x20,
            crc32: None,
        },
    ],
};

/// Character ROM: 256 8×8 tiles, 2bpp.
pub static GOMOKU_CHAR_ROM: RomRegion = RomRegion {
    tag: "gfx1",
    size: 0x1000,
    entries: &[RomEntry {
        name: "rj_6.4r",
        size: 0x1000,
        offset: 0,
        crc32: None,
    }],
};

/// Screen X → board column nibble.
pub static GOMOKU_BG_X: RomRegion = RomRegion {
    tag: "bg_x",
    size: 0x100,
    entries: &[RomEntry {
        name: "rj_prom.9k",
        size: 0x100,
        offset: 0,
        crc32: None,
    }],
};

/// Screen Y → board row nibble.
pub static GOMOKU_BG_Y: RomRegion = RomRegion {
    tag: "bg_y",
    size: 0x100,
    entries: &[RomEntry {
        name: "rj_prom.9l",
        size: 0x100,
        offset: 0,
        crc32: None,
    }],
};

/// Board definition: one feature byte per logical cell.
pub static GOMOKU_BG_D: RomRegion = RomRegion {
    tag: "bg_d",
    size: 0x100,
    entries: &[RomEntry {
        name: "rj_prom.8n",
        size: 0x100,
        offset: 0,
        crc32: None,
    }],
};

const SCREEN_SIZE: usize = 256;
const VIDEO_RAM_SIZE: usize = 0x400;
const BOARD_RAM_SIZE: usize = 0x100;

// Board definition bits
pub const DEF_BOARD: u8 = 0x01;
pub const DEF_FRAME_LINE: u8 = 0x02;
pub const DEF_STONE: u8 = 0x04;
pub const DEF_CURSOR: u8 = 0x08;

// Board RAM cell bits
pub const STATE_BLACK_STONE: u8 = 0x01;
pub const STATE_WHITE_STONE: u8 = 0x02;
pub const STATE_BLACK_CURSOR: u8 = 0x04;
pub const STATE_WHITE_CURSOR: u8 = 0x08;

// Backdrop and overlay pens
pub const PEN_OUTSIDE: u16 = 0x20;
pub const PEN_BOARD: u16 = 0x21;
pub const PEN_FRAME_LINE: u16 = 0x20;
pub const PEN_WHITE: u16 = 0x22;
pub const PEN_BLACK: u16 = 0x2F;

pub static CHAR_LAYOUT: GfxLayout = GfxLayout {
    width: 8,
    height: 8,
    total: 256,
    plane_offsets: &[0, 4],
    x_offsets: &[0, 1, 2, 3, 64, 65, 66, 67],
    y_offsets: &[56, 48, 40, 32, 24, 16, 8, 0],
    char_increment: 128,
};

/// Screen axis → logical board nibble, one table per axis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BoardRemapTables {
    x: [u8; 256],
    y: [u8; 256],
}

impl BoardRemapTables {
    /// Tables from the remap PROMs. Only the low nibble of each entry is
    /// wired to the board definition address.
    pub fn from_proms(x: &[u8; 256], y: &[u8; 256]) -> Self {
        Self {
            x: x.map(|v| v & 0x0F),
            y: y.map(|v| v & 0x0F),
        }
    }

    /// Evenly spaced 16-pixel cells (`coord >> 4`).
    pub fn linear() -> Self {
        let table = std::array::from_fn(|i| (i >> 4) as u8);
        Self { x: table, y: table }
    }

    /// Board definition index of screen pixel (x, y).
    pub fn cell(&self, x: usize, y: usize) -> usize {
        usize::from(self.x[x & 0xFF]) + (usize::from(self.y[y & 0xFF]) << 4)
    }
}

/// Where a board-space pixel lands in the output: the board image is
/// mirrored on both axes and shifted by the monitor alignment.
pub fn screen_mirror(x: usize, y: usize) -> (usize, usize) {
    (
        (255 + 7usize).wrapping_sub(x) & 0xFF,
        (255 - 1usize).wrapping_sub(y) & 0xFF,
    )
}

/// Board RAM cell holding the stone/cursor state under pixel (x, y).
///
/// Cells are 14 pixels wide. Pixels past the last line truncate into cell 0
/// of their axis.
pub fn stone_cell(x: usize, y: usize) -> usize {
    let col = (253 - x as i32) / 14;
    let row = (245 - y as i32) / 14;
    ((col | (row << 4)) & 0xFF) as usize
}

/// Render the static backdrop: outside area, playing surface and frame
/// lines. The frame-line bit wins over the board bit.
pub fn build_background(board_def: &[u8; 256], remap: &BoardRemapTables) -> Bitmap {
    let mut bitmap = Bitmap::new(SCREEN_SIZE, SCREEN_SIZE);
    bitmap.fill(PEN_OUTSIDE);

    for y in 0..SCREEN_SIZE {
        for x in 0..SCREEN_SIZE {
            let def = board_def[remap.cell(x, y)];
            let mut pen = PEN_OUTSIDE;
            if def & DEF_BOARD != 0 {
                pen = PEN_BOARD;
            }
            if def & DEF_FRAME_LINE != 0 {
                pen = PEN_FRAME_LINE;
            }
            let (dx, dy) = screen_mirror(x, y);
            bitmap.set_pix(dx, dy, pen);
        }
    }
    bitmap
}

/// Gomoku Narabe Renju (Nichibutsu, 1981) video board.
///
/// Video: static 256×256 board backdrop from ROM tables, live stone and
/// cursor overlays from board RAM, and a 32×32 text tilemap on top.
/// Direct 64-color weighted PROM palette.
pub struct GomokuVideo {
    video_ram: [u8; VIDEO_RAM_SIZE],
    color_ram: [u8; VIDEO_RAM_SIZE],
    board_ram: [u8; BOARD_RAM_SIZE],

    board_def: [u8; 256],
    remap: BoardRemapTables,
    background: Bitmap,
    char_gfx: GfxElement,
    palette: PaletteTable,
    fg_tilemap: Tilemap,

    // Raw latch levels; both lines are active-low.
    flip_line: bool,
    background_line: bool,
}

impl GomokuVideo {
    pub fn new(
        proms: &[u8; 0x40],
        char_rom: &[u8],
        remap: BoardRemapTables,
        board_def: [u8; 256],
    ) -> Self {
        let palette = PaletteTable::from_weighted_prom(proms);
        let char_gfx = GfxElement::decode(&CHAR_LAYOUT, char_rom, 0, 16);
        let background = build_background(&board_def, &remap);

        let mut fg_tilemap = Tilemap::new(32, 32, 8, 8);
        fg_tilemap.set_transparent_pen(0);

        tracing::debug!(
            board_cells = board_def.iter().filter(|&&d| d & DEF_BOARD != 0).count(),
            "Gomoku backdrop built"
        );

        Self {
            video_ram: [0; VIDEO_RAM_SIZE],
            color_ram: [0; VIDEO_RAM_SIZE],
            board_ram: [0; BOARD_RAM_SIZE],
            board_def,
            remap,
            background,
            char_gfx,
            palette,
            fg_tilemap,
            flip_line: false,
            background_line: false,
        }
    }

    pub fn from_rom_set(rom_set: &RomSet) -> Result<Self, RomLoadError> {
        let proms = GOMOKU_COLOR_PROMS.load_array::<0x40>(rom_set)?;
        let char_rom = GOMOKU_CHAR_ROM.load(rom_set)?;
        let remap_x = GOMOKU_BG_X.load_array::<0x100>(rom_set)?;
        let remap_y = GOMOKU_BG_Y.load_array::<0x100>(rom_set)?;
        let board_def = GOMOKU_BG_D.load_array::<0x100>(rom_set)?;

        Ok(Self::new(
            &proms,
            &char_rom,
            BoardRemapTables::from_proms(&remap_x, &remap_y),
            board_def,
        ))
    }

    /// Flip state as latched. Stored only; rendering ignores it.
    pub fn is_flipped(&self) -> bool {
        !self.flip_line
    }

    pub fn is_background_visible(&self) -> bool {
        !self.background_line
    }

    pub fn background(&self) -> &Bitmap {
        &self.background
    }

    fn region(&self, region: VideoRegion) -> Option<&[u8]> {
        match region {
            VideoRegion::VideoRam => Some(&self.video_ram),
            VideoRegion::ColorRam => Some(&self.color_ram),
            VideoRegion::BoardRam => Some(&self.board_ram),
            VideoRegion::SpriteRam => None,
        }
    }

    /// One overlay pass over every board pixel whose definition has
    /// `feature` set. The black bit is tested first.
    fn draw_overlay(&self, bitmap: &mut Bitmap, clip: &Rect, feature: u8, black: u8, white: u8) {
        let area = clip.intersect(&bitmap.bounds());
        if area.is_empty() {
            return;
        }

        for y in 0..SCREEN_SIZE {
            for x in 0..SCREEN_SIZE {
                if self.board_def[self.remap.cell(x, y)] & feature == 0 {
                    continue;
                }
                let state = self.board_ram[stone_cell(x, y)];
                let pen = if state & black != 0 {
                    PEN_BLACK
                } else if state & white != 0 {
                    PEN_WHITE
                } else {
                    continue;
                };
                let (dx, dy) = screen_mirror(x, y);
                if area.contains(dx as i32, dy as i32) {
                    bitmap.set_pix(dx, dy, pen);
                }
            }
        }
    }
}

impl VideoBoard for GomokuVideo {
    fn display_size(&self) -> (u32, u32) {
        (SCREEN_SIZE as u32, SCREEN_SIZE as u32)
    }

    fn visible_area(&self) -> Rect {
        Rect::new(0, 255, 16, 239)
    }

    fn palette(&self) -> &PaletteTable {
        &self.palette
    }

    fn on_memory_write(&mut self, region: VideoRegion, offset: usize, value: u8) {
        match region {
            VideoRegion::VideoRam => {
                let offset = offset % VIDEO_RAM_SIZE;
                self.video_ram[offset] = value;
                self.fg_tilemap.mark_tile_dirty(offset);
            }
            VideoRegion::ColorRam => {
                let offset = offset % VIDEO_RAM_SIZE;
                self.color_ram[offset] = value;
                self.fg_tilemap.mark_tile_dirty(offset);
            }
            VideoRegion::BoardRam => self.board_ram[offset % BOARD_RAM_SIZE] = value,
            VideoRegion::SpriteRam => {
                tracing::trace!(%region, offset, value, "Gomoku has no such region")
            }
        }
    }

    fn read_memory(&self, region: VideoRegion, offset: usize) -> u8 {
        self.region(region)
            .map_or(0xFF, |mem| mem[offset % mem.len()])
    }

    fn on_line_change(&mut self, line: ControlLine, level: bool) {
        tracing::trace!(%line, level, "Gomoku latch");
        match line {
            ControlLine::FlipScreen => self.flip_line = level,
            ControlLine::BackgroundEnable => self.background_line = level,
        }
    }

    fn on_frame_render(&mut self, bitmap: &mut Bitmap, clip: &Rect) -> FrameStatus {
        if self.is_background_visible() {
            bitmap.copy_from(&self.background, clip);
            self.draw_overlay(bitmap, clip, DEF_STONE, STATE_BLACK_STONE, STATE_WHITE_STONE);
            self.draw_overlay(bitmap, clip, DEF_CURSOR, STATE_BLACK_CURSOR, STATE_WHITE_CURSOR);
        } else {
            bitmap.fill_rect(PEN_OUTSIDE, clip);
        }

        let (video_ram, color_ram) = (&self.video_ram, &self.color_ram);
        self.fg_tilemap.draw(bitmap, clip, &self.char_gfx, |i| {
            let attr = color_ram[i];
            TileInfo::with_flip_bits(u16::from(video_ram[i]), u16::from(attr & 0x0F), attr >> 6)
        });

        FrameStatus::Ok
    }
}

fn create_board(rom_set: &RomSet) -> Result<Box<dyn VideoBoard>, RomLoadError> {
    Ok(Box::new(GomokuVideo::from_rom_set(rom_set)?))
}

inventory::submit! {
    BoardEntry::new(
        "gomoku",
        "gomoku",
        "Gomoku Narabe Renju (Nichibutsu, 1981)",
        create_board
    )
}
