//! PNG output of rendered frames.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::emulator::Frame;
use crate::error::SnapError;

/// Nearest-neighbor upscale of an RGB24 image by an integer factor.
pub fn scale_rgb24(rgb: &[u8], width: u32, height: u32, scale: u32) -> Vec<u8> {
    if scale == 1 {
        return rgb.to_vec();
    }
    let (w, s) = (width as usize, scale as usize);
    let mut out = Vec::with_capacity(rgb.len() * s * s);
    for row in rgb.chunks_exact(w * 3).take(height as usize) {
        let mut scaled_row = Vec::with_capacity(row.len() * s);
        for pixel in row.chunks_exact(3) {
            for _ in 0..s {
                scaled_row.extend_from_slice(pixel);
            }
        }
        for _ in 0..s {
            out.extend_from_slice(&scaled_row);
        }
    }
    out
}

/// Write `frame` as an 8-bit RGB PNG, scaled by `scale`.
pub fn write_png(path: &Path, frame: &Frame, scale: u32) -> Result<(), SnapError> {
    let (width, height) = (frame.width * scale, frame.height * scale);
    let data = scale_rgb24(&frame.rgb, frame.width, frame.height, scale);

    let file = BufWriter::new(File::create(path)?);
    let mut encoder = png::Encoder::new(file, width, height);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()?;
    Ok(())
}
