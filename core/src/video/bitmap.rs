use super::palette::PaletteTable;

/// Inclusive pixel rectangle used for clipping (`min..=max` on both axes).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub min_x: i32,
    pub max_x: i32,
    pub min_y: i32,
    pub max_y: i32,
}

impl Rect {
    pub const fn new(min_x: i32, max_x: i32, min_y: i32, max_y: i32) -> Self {
        Self {
            min_x,
            max_x,
            min_y,
            max_y,
        }
    }

    pub const fn width(&self) -> i32 {
        self.max_x - self.min_x + 1
    }

    pub const fn height(&self) -> i32 {
        self.max_y - self.min_y + 1
    }

    pub const fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub const fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Overlap of two rectangles (may be empty).
    pub fn intersect(&self, other: &Rect) -> Rect {
        Rect {
            min_x: self.min_x.max(other.min_x),
            max_x: self.max_x.min(other.max_x),
            min_y: self.min_y.max(other.min_y),
            max_y: self.max_y.min(other.max_y),
        }
    }
}

/// Pen-indexed pixel buffer. Each pixel holds a palette pen, resolved to RGB
/// only when the frame is handed to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    pixels: Vec<u16>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// The whole bitmap as a clip rectangle.
    pub fn bounds(&self) -> Rect {
        Rect::new(0, self.width as i32 - 1, 0, self.height as i32 - 1)
    }

    pub fn pix(&self, x: usize, y: usize) -> u16 {
        self.pixels[y * self.width + x]
    }

    pub fn set_pix(&mut self, x: usize, y: usize, pen: u16) {
        self.pixels[y * self.width + x] = pen;
    }

    pub fn pixels(&self) -> &[u16] {
        &self.pixels
    }

    pub fn fill(&mut self, pen: u16) {
        self.pixels.fill(pen);
    }

    /// Fill the part of `clip` that lies inside the bitmap.
    pub fn fill_rect(&mut self, pen: u16, clip: &Rect) {
        let area = clip.intersect(&self.bounds());
        if area.is_empty() {
            return;
        }
        for y in area.min_y..=area.max_y {
            let row = y as usize * self.width;
            self.pixels[row + area.min_x as usize..=row + area.max_x as usize].fill(pen);
        }
    }

    /// Copy `src` pixel-for-pixel at the same coordinates, inside `clip`.
    pub fn copy_from(&mut self, src: &Bitmap, clip: &Rect) {
        let area = clip.intersect(&self.bounds()).intersect(&src.bounds());
        if area.is_empty() {
            return;
        }
        for y in area.min_y..=area.max_y {
            let dst_row = y as usize * self.width;
            let src_row = y as usize * src.width;
            let (x0, x1) = (area.min_x as usize, area.max_x as usize);
            self.pixels[dst_row + x0..=dst_row + x1]
                .copy_from_slice(&src.pixels[src_row + x0..=src_row + x1]);
        }
    }

    /// Convert the pixels inside `area` to RGB24 (row-major, 3 bytes per
    /// pixel, `area.width()` pixels per row).
    pub fn to_rgb24(&self, palette: &PaletteTable, area: &Rect, buffer: &mut [u8]) {
        let out_w = area.width() as usize;
        for (oy, y) in (area.min_y..=area.max_y).enumerate() {
            for (ox, x) in (area.min_x..=area.max_x).enumerate() {
                let rgb = palette.pen_rgb(self.pix(x as usize, y as usize));
                let off = (oy * out_w + ox) * 3;
                buffer[off] = rgb.r;
                buffer[off + 1] = rgb.g;
                buffer[off + 2] = rgb.b;
            }
        }
    }
}
