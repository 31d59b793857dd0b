use nichi_core::prelude::*;
use nichi_core::video::palette::{resnet_rgb, swizzled_lookup};
use nichi_core::video::resnet::{AUTOSCALE, ResistorNetwork, compute_resistor_weights};

use crate::registry::BoardEntry;
use crate::rom_loader::{RomEntry, RomLoadError, RomRegion, RomSet};

// ---------------------------------------------------------------------------
// Wiping ROM definitions
// ---------------------------------------------------------------------------

/// Color PROMs: 32-byte palette, then the char and sprite lookup tables.
pub static WIPING_COLOR_PROMS: RomRegion = RomRegion {
    tag: "proms",
    size: PROM_SIZE,
    entries: &[
        RomEntry {
            name: "wip-g13.bin",
            size: 0x20,
            offset: 0x000,
            crc32: None,
        },
        RomEntry {
            name: "wip-f4.bin",
            size: 0x100,
            offset: 0x020,
            crc32: None,
        },
        RomEntry {
            name: "wip-e11.bin",
            size: 0x100,
            offset: 0x120,
            crc32: None,
        },
    ],
};

/// Character ROM: 256 8×8 tiles, 2bpp.
pub static WIPING_CHAR_ROM: RomRegion = RomRegion {
    tag: "gfx1",
    size: 0x1000,
    entries: &[RomEntry {
        name: "wip-d11.bin",
        size: 0x1000,
        offset: 0,
        crc32: None,
    }],
};

/// Sprite ROM: 128 16×16 sprites, 2bpp.
pub static WIPING_SPRITE_ROM: RomRegion = RomRegion {
    tag: "gfx2",
    size: 0x2000,
    entries: &[RomEntry {
        name: "wip-d12.bin",
        size: 0x2000,
        offset: 0,
        crc32: None,
    }],
};

pub const PROM_SIZE: usize = 0x220;

// 36×28 tiles
const SCREEN_WIDTH: u32 = 288;
const SCREEN_HEIGHT: u32 = 224;

const VIDEO_RAM_SIZE: usize = 0x400;
const SPRITE_RAM_SIZE: usize = 0x200;
pub const SPRITE_COUNT: usize = 64;

/// Sprite pens resolving to this color are not drawn.
const SPRITE_TRANSPARENT_COLOR: u16 = 0x1F;

/// Attribute bit redrawing a cell above the sprites.
const ATTR_HIGH_PRIORITY: u8 = 0x80;

// Color output stage: 1K/470/220 ohm on red and green, 470/220 on blue,
// 470 ohm pulldown on every channel.
const RESISTANCES_RG: [u32; 3] = [1000, 470, 220];
const RESISTANCES_B: [u32; 2] = [470, 220];
const PULLDOWN: u32 = 470;

pub static CHAR_LAYOUT: GfxLayout = GfxLayout {
    width: 8,
    height: 8,
    total: 256,
    plane_offsets: &[0, 4],
    x_offsets: &[0, 1, 2, 3, 64, 65, 66, 67],
    y_offsets: &[0, 8, 16, 24, 32, 40, 48, 56],
    char_increment: 128,
};

pub static SPRITE_LAYOUT: GfxLayout = GfxLayout {
    width: 16,
    height: 16,
    total: 128,
    plane_offsets: &[0, 4],
    x_offsets: &[
        0, 1, 2, 3, 64, 65, 66, 67, 128, 129, 130, 131, 192, 193, 194, 195,
    ],
    y_offsets: &[
        0, 8, 16, 24, 32, 40, 48, 56, 256, 264, 272, 280, 288, 296, 304, 312,
    ],
    char_increment: 512,
};

/// Decode the color PROMs into the indirect palette.
///
/// 32 colors come from the resistor networks. Char pens 0-255 select colors
/// 0-15 and sprite pens 256-511 select colors 16-31, both through lookup
/// PROMs whose two low address lines are swapped.
pub fn build_palette(proms: &[u8; PROM_SIZE]) -> PaletteTable {
    let weights = compute_resistor_weights(
        0,
        255,
        AUTOSCALE,
        &[
            ResistorNetwork::new(&RESISTANCES_RG, PULLDOWN, 0),
            ResistorNetwork::new(&RESISTANCES_RG, PULLDOWN, 0),
            ResistorNetwork::new(&RESISTANCES_B, PULLDOWN, 0),
        ],
    );

    let colors = proms[..0x20]
        .iter()
        .map(|&b| resnet_rgb(b, &weights))
        .collect();

    let lut = &proms[0x20..];
    let pens = (0..0x200)
        .map(|i| {
            let entry = u16::from(swizzled_lookup(lut, i) & 0x0F);
            if i < 0x100 { entry } else { entry | 0x10 }
        })
        .collect();

    PaletteTable::indirect(colors, pens)
}

/// Screen cell (column, row) of video RAM offset `offs`.
///
/// Rows 0-1 and 30-31 of the 32×32 memory grid become the two columns on
/// each side of the 32-column playfield.
pub fn tile_position(offs: usize, flip: bool) -> (i32, i32) {
    let mx = (offs % 32) as i32;
    let my = (offs / 32) as i32;

    let (sx, sy) = match my {
        0..=1 => (my + 34, mx - 2),
        30.. => (my - 30, mx - 2),
        _ => (mx + 2, my - 2),
    };

    if flip { (35 - sx, 27 - sy) } else { (sx, sy) }
}

/// One decoded sprite record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpriteObject {
    /// Record number, 0-63. Higher records draw later.
    pub index: usize,
    pub x: i32,
    pub y: i32,
    pub code: u16,
    pub bank: u8,
    pub color: u16,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl SpriteObject {
    /// Decode record `index` from sprite RAM.
    ///
    /// Each record spreads over four 128-byte rows of sprite RAM: code/flip
    /// and color at `o`, bank and X high bit at `o + 0x80`, Y and X at
    /// `o + 0x100`.
    pub fn decode(ram: &[u8], index: usize, flip_screen: bool) -> Self {
        let o = index * 2;
        let byte = |addr: usize| ram[addr % ram.len()];

        let bank = byte(o + 0x80) & 0x01;
        let mut sprite = Self {
            index,
            x: i32::from(byte(o + 0x101)) + (i32::from(byte(o + 0x81) & 0x01) << 8) - 40,
            y: 224 - i32::from(byte(o + 0x100)),
            code: u16::from(byte(o) & 0x3F) + 64 * u16::from(bank),
            bank,
            color: u16::from(byte(o + 1) & 0x3F),
            flip_x: byte(o) & 0x80 != 0,
            flip_y: byte(o) & 0x40 != 0,
        };

        if flip_screen {
            sprite.y = 208 - sprite.y;
            sprite.flip_x = !sprite.flip_x;
            sprite.flip_y = !sprite.flip_y;
        }
        sprite
    }

    /// The last record (the vacuum cleaner) is always drawn above the rest.
    pub fn is_topmost(&self) -> bool {
        self.index == SPRITE_COUNT - 1
    }
}

/// Wiping (Nichibutsu, 1982) video board.
///
/// Video: 36×28 char playfield, 64 16×16 sprites, 2bpp, resistor-network
/// PROM palette with separate char and sprite lookup tables.
pub struct WipingVideo {
    video_ram: [u8; VIDEO_RAM_SIZE],
    color_ram: [u8; VIDEO_RAM_SIZE],
    sprite_ram: [u8; SPRITE_RAM_SIZE],

    char_gfx: GfxElement,
    sprite_gfx: GfxElement,
    palette: PaletteTable,
    /// Transparency mask per sprite color.
    sprite_masks: Vec<u32>,

    flip_screen: bool,
}

impl WipingVideo {
    pub fn new(proms: &[u8; PROM_SIZE], char_rom: &[u8], sprite_rom: &[u8]) -> Self {
        let palette = build_palette(proms);
        let char_gfx = GfxElement::decode(&CHAR_LAYOUT, char_rom, 0, 64);
        let sprite_gfx = GfxElement::decode(&SPRITE_LAYOUT, sprite_rom, 64 * 4, 64);

        let sprite_masks = (0..sprite_gfx.total_colors())
            .map(|color| palette.transpen_mask(&sprite_gfx, color, SPRITE_TRANSPARENT_COLOR))
            .collect();

        tracing::debug!(
            colors = palette.color_count(),
            pens = palette.entries(),
            "Wiping palette built"
        );

        Self {
            video_ram: [0; VIDEO_RAM_SIZE],
            color_ram: [0; VIDEO_RAM_SIZE],
            sprite_ram: [0; SPRITE_RAM_SIZE],
            char_gfx,
            sprite_gfx,
            palette,
            sprite_masks,
            flip_screen: false,
        }
    }

    pub fn from_rom_set(rom_set: &RomSet) -> Result<Self, RomLoadError> {
        let proms = WIPING_COLOR_PROMS.load_array::<PROM_SIZE>(rom_set)?;
        let char_rom = WIPING_CHAR_ROM.load(rom_set)?;
        let sprite_rom = WIPING_SPRITE_ROM.load(rom_set)?;
        Ok(Self::new(&proms, &char_rom, &sprite_rom))
    }

    pub fn is_flipped(&self) -> bool {
        self.flip_screen
    }

    /// Sprite records in draw order.
    pub fn sprites(&self) -> impl Iterator<Item = SpriteObject> + '_ {
        (0..SPRITE_COUNT).map(|i| SpriteObject::decode(&self.sprite_ram, i, self.flip_screen))
    }

    fn region(&self, region: VideoRegion) -> Option<&[u8]> {
        match region {
            VideoRegion::VideoRam => Some(&self.video_ram),
            VideoRegion::ColorRam => Some(&self.color_ram),
            VideoRegion::SpriteRam => Some(&self.sprite_ram),
            VideoRegion::BoardRam => None,
        }
    }

    fn region_mut(&mut self, region: VideoRegion) -> Option<&mut [u8]> {
        match region {
            VideoRegion::VideoRam => Some(&mut self.video_ram),
            VideoRegion::ColorRam => Some(&mut self.color_ram),
            VideoRegion::SpriteRam => Some(&mut self.sprite_ram),
            VideoRegion::BoardRam => None,
        }
    }

    /// Walk video RAM from the top offset down to 1. Offset 0 is never drawn.
    fn draw_chars(&self, bitmap: &mut Bitmap, clip: &Rect, high_priority_only: bool) {
        let flip = self.flip_screen;
        for offs in (1..VIDEO_RAM_SIZE).rev() {
            let attr = self.color_ram[offs];
            if high_priority_only && attr & ATTR_HIGH_PRIORITY == 0 {
                continue;
            }
            let (sx, sy) = tile_position(offs, flip);
            self.char_gfx.opaque(
                bitmap,
                clip,
                u16::from(self.video_ram[offs]),
                u16::from(attr & 0x3F),
                flip,
                flip,
                sx * 8,
                sy * 8,
            );
        }
    }

    fn draw_sprites(&self, bitmap: &mut Bitmap, clip: &Rect) {
        // Ascending order: later records cover earlier ones.
        for sprite in self.sprites() {
            self.sprite_gfx.transmask(
                bitmap,
                clip,
                sprite.code,
                sprite.color,
                sprite.flip_x,
                sprite.flip_y,
                sprite.x,
                sprite.y,
                self.sprite_masks[sprite.color as usize],
            );
        }
    }
}

impl VideoBoard for WipingVideo {
    fn display_size(&self) -> (u32, u32) {
        (SCREEN_WIDTH, SCREEN_HEIGHT)
    }

    fn visible_area(&self) -> Rect {
        Rect::new(0, SCREEN_WIDTH as i32 - 1, 0, SCREEN_HEIGHT as i32 - 1)
    }

    fn palette(&self) -> &PaletteTable {
        &self.palette
    }

    fn on_memory_write(&mut self, region: VideoRegion, offset: usize, value: u8) {
        match self.region_mut(region) {
            Some(mem) => {
                let len = mem.len();
                mem[offset % len] = value;
            }
            None => tracing::trace!(%region, offset, value, "Wiping has no such region"),
        }
    }

    fn read_memory(&self, region: VideoRegion, offset: usize) -> u8 {
        self.region(region)
            .map_or(0xFF, |mem| mem[offset % mem.len()])
    }

    fn on_line_change(&mut self, line: ControlLine, level: bool) {
        match line {
            ControlLine::FlipScreen => self.flip_screen = level,
            ControlLine::BackgroundEnable => {
                tracing::trace!(%line, level, "Wiping has no such line")
            }
        }
    }

    fn on_frame_render(&mut self, bitmap: &mut Bitmap, clip: &Rect) -> FrameStatus {
        self.draw_chars(bitmap, clip, false);
        self.draw_sprites(bitmap, clip);
        self.draw_chars(bitmap, clip, true);
        FrameStatus::Ok
    }
}

fn create_board(rom_set: &RomSet) -> Result<Box<dyn VideoBoard>, RomLoadError> {
    Ok(Box::new(WipingVideo::from_rom_set(rom_set)?))
}

inventory::submit! {
    BoardEntry::new("wiping", "wiping", "Wiping (Nichibutsu, 1982)", create_board)
}
