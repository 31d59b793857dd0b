//! Planar graphics ROM decoding and element drawing.
//!
//! A [`GfxLayout`] describes where the bits of each pixel live inside a
//! graphics ROM, as bit offsets from the start of an element. Bit offsets are
//! MSB-first within a byte (offset 0 is bit 7 of byte 0), and plane 0 supplies
//! the most significant bit of the pixel value.

use super::bitmap::{Bitmap, Rect};

/// Bit-level description of one graphics set.
#[derive(Clone, Copy, Debug)]
pub struct GfxLayout {
    pub width: usize,
    pub height: usize,
    /// Number of elements in the set.
    pub total: usize,
    pub plane_offsets: &'static [u32],
    pub x_offsets: &'static [u32],
    pub y_offsets: &'static [u32],
    /// Distance in bits between consecutive elements.
    pub char_increment: u32,
}

fn read_bit(rom: &[u8], bit: u32) -> u8 {
    let byte = (bit / 8) as usize;
    match rom.get(byte) {
        Some(&b) => u8::from(b & (0x80 >> (bit % 8)) != 0),
        None => 0,
    }
}

/// A decoded graphics set: one pixel value (0..granularity) per pixel, plus
/// the pen range its colors select from.
#[derive(Clone, Debug)]
pub struct GfxElement {
    width: usize,
    height: usize,
    total: usize,
    planes: usize,
    color_base: u16,
    total_colors: u16,
    data: Vec<u8>,
}

impl GfxElement {
    /// Decode every element of `layout` from `rom`. Bits beyond the end of
    /// the ROM read as 0. Color `c` of this set maps to pens
    /// `color_base + c * granularity ..`.
    pub fn decode(layout: &GfxLayout, rom: &[u8], color_base: u16, total_colors: u16) -> Self {
        let planes = layout.plane_offsets.len();
        let mut data = Vec::with_capacity(layout.total * layout.width * layout.height);

        for code in 0..layout.total {
            let base = code as u32 * layout.char_increment;
            for &yo in &layout.y_offsets[..layout.height] {
                for &xo in &layout.x_offsets[..layout.width] {
                    let mut pixel = 0u8;
                    for (plane, &po) in layout.plane_offsets.iter().enumerate() {
                        pixel |= read_bit(rom, base + po + yo + xo) << (planes - 1 - plane);
                    }
                    data.push(pixel);
                }
            }
        }

        Self {
            width: layout.width,
            height: layout.height,
            total: layout.total,
            planes,
            color_base,
            total_colors,
            data,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of elements; codes wrap modulo this.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Number of pens per color (`2^planes`).
    pub fn granularity(&self) -> usize {
        1 << self.planes
    }

    pub fn total_colors(&self) -> u16 {
        self.total_colors
    }

    /// Pixel value of element `code` at (x, y), unflipped.
    pub fn pixel(&self, code: u16, x: usize, y: usize) -> u8 {
        let code = code as usize % self.total;
        self.data[(code * self.height + y) * self.width + x]
    }

    /// Pen selected by pixel value `pixel` under color `color`.
    pub fn pen(&self, color: u16, pixel: u8) -> u16 {
        let color = color % self.total_colors;
        self.color_base + color * self.granularity() as u16 + u16::from(pixel)
    }

    /// Draw every pixel of the element.
    pub fn opaque(
        &self,
        dest: &mut Bitmap,
        clip: &Rect,
        code: u16,
        color: u16,
        flip_x: bool,
        flip_y: bool,
        sx: i32,
        sy: i32,
    ) {
        self.draw(dest, clip, code, color, flip_x, flip_y, sx, sy, |_| true);
    }

    /// Draw every pixel whose value's bit is clear in `mask`.
    pub fn transmask(
        &self,
        dest: &mut Bitmap,
        clip: &Rect,
        code: u16,
        color: u16,
        flip_x: bool,
        flip_y: bool,
        sx: i32,
        sy: i32,
        mask: u32,
    ) {
        self.draw(dest, clip, code, color, flip_x, flip_y, sx, sy, |px| {
            (mask >> px) & 1 == 0
        });
    }

    fn draw(
        &self,
        dest: &mut Bitmap,
        clip: &Rect,
        code: u16,
        color: u16,
        flip_x: bool,
        flip_y: bool,
        sx: i32,
        sy: i32,
        visible: impl Fn(u8) -> bool,
    ) {
        let area = clip.intersect(&dest.bounds());
        if area.is_empty() {
            return;
        }

        for py in 0..self.height {
            let y = sy + py as i32;
            if y < area.min_y || y > area.max_y {
                continue;
            }
            let src_y = if flip_y { self.height - 1 - py } else { py };

            for px in 0..self.width {
                let x = sx + px as i32;
                if x < area.min_x || x > area.max_x {
                    continue;
                }
                let src_x = if flip_x { self.width - 1 - px } else { px };
                let value = self.pixel(code, src_x, src_y);
                if visible(value) {
                    dest.set_pix(x as usize, y as usize, self.pen(color, value));
                }
            }
        }
    }
}
