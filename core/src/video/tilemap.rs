//! Row-scanned tilemap with lazy, per-tile redraw.
//!
//! The tilemap keeps a cached pixmap of the whole layer. Writes to tile or
//! attribute memory only mark the affected tile dirty; the tile is decoded
//! and re-rendered into the cache the next time the layer is drawn.

use super::bitmap::{Bitmap, Rect};
use super::gfx::GfxElement;

/// What a tile cell draws, as decoded from its pattern and attribute bytes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TileInfo {
    pub code: u16,
    pub color: u16,
    pub flip_x: bool,
    pub flip_y: bool,
}

impl TileInfo {
    /// Build from a 2-bit flip selector: bit 0 flips X, bit 1 flips Y.
    pub fn with_flip_bits(code: u16, color: u16, flip_yx: u8) -> Self {
        Self {
            code,
            color,
            flip_x: flip_yx & 0x01 != 0,
            flip_y: flip_yx & 0x02 != 0,
        }
    }
}

pub struct Tilemap {
    cols: usize,
    rows: usize,
    tile_width: usize,
    tile_height: usize,
    dirty: Vec<bool>,
    pixmap: Bitmap,
    /// Per-pixel "drawn when compositing" flags, parallel to `pixmap`.
    opaque: Vec<bool>,
    transparent_pen: Option<u8>,
}

impl Tilemap {
    /// A `cols` x `rows` layer of `tile_width` x `tile_height` tiles. Every
    /// tile starts dirty.
    pub fn new(cols: usize, rows: usize, tile_width: usize, tile_height: usize) -> Self {
        let (w, h) = (cols * tile_width, rows * tile_height);
        Self {
            cols,
            rows,
            tile_width,
            tile_height,
            dirty: vec![true; cols * rows],
            pixmap: Bitmap::new(w, h),
            opaque: vec![true; w * h],
            transparent_pen: None,
        }
    }

    /// Pixel value that is skipped when the layer is composited.
    pub fn set_transparent_pen(&mut self, pen: u8) {
        self.transparent_pen = Some(pen);
        self.mark_all_dirty();
    }

    pub fn tile_count(&self) -> usize {
        self.cols * self.rows
    }

    pub fn mark_tile_dirty(&mut self, index: usize) {
        if let Some(flag) = self.dirty.get_mut(index) {
            *flag = true;
        }
    }

    pub fn mark_all_dirty(&mut self) {
        self.dirty.fill(true);
    }

    pub fn dirty_count(&self) -> usize {
        self.dirty.iter().filter(|&&d| d).count()
    }

    /// Re-render every dirty tile into the cache.
    fn update(&mut self, gfx: &GfxElement, mut tile_info: impl FnMut(usize) -> TileInfo) {
        for index in 0..self.dirty.len() {
            if !self.dirty[index] {
                continue;
            }
            let info = tile_info(index);
            self.render_tile(gfx, index, &info);
            self.dirty[index] = false;
        }
    }

    fn render_tile(&mut self, gfx: &GfxElement, index: usize, info: &TileInfo) {
        let x0 = (index % self.cols) * self.tile_width;
        let y0 = (index / self.cols) * self.tile_height;
        let stride = self.pixmap.width();

        for ty in 0..self.tile_height {
            let src_y = if info.flip_y { self.tile_height - 1 - ty } else { ty };
            for tx in 0..self.tile_width {
                let src_x = if info.flip_x { self.tile_width - 1 - tx } else { tx };
                let value = gfx.pixel(info.code, src_x, src_y);
                let (x, y) = (x0 + tx, y0 + ty);
                self.pixmap.set_pix(x, y, gfx.pen(info.color, value));
                self.opaque[y * stride + x] = self.transparent_pen != Some(value);
            }
        }
    }

    /// Bring the cache up to date and composite it onto `dest` inside `clip`.
    ///
    /// `tile_info` is only called for dirty tiles.
    pub fn draw(
        &mut self,
        dest: &mut Bitmap,
        clip: &Rect,
        gfx: &GfxElement,
        tile_info: impl FnMut(usize) -> TileInfo,
    ) {
        self.update(gfx, tile_info);

        let area = clip
            .intersect(&dest.bounds())
            .intersect(&self.pixmap.bounds());
        if area.is_empty() {
            return;
        }

        let stride = self.pixmap.width();
        for y in area.min_y as usize..=area.max_y as usize {
            for x in area.min_x as usize..=area.max_x as usize {
                if self.opaque[y * stride + x] {
                    dest.set_pix(x, y, self.pixmap.pix(x, y));
                }
            }
        }
    }
}
