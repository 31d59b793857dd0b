//! PROM color decoding and the pen → RGB palette.
//!
//! Two decode strategies are provided. Both read the common 8-bit PROM
//! wiring (red bits 0-2, green bits 3-5, blue bits 6-7):
//!
//! - [`weighted_rgb`]: fixed binary-ish weights `0x21/0x47/0x97`, the
//!   simplest boards' color output stage.
//! - [`resnet_rgb`]: weights computed from the board's resistor networks by
//!   [`compute_resistor_weights`](super::resnet::compute_resistor_weights).
//!
//! A [`PaletteTable`] is either direct (pen N is color N) or indirect (pen N
//! is looked up through a color-lookup PROM first).

use super::gfx::GfxElement;
use super::resnet::ResistorWeights;

/// Fixed output weights of a 3-bit color channel (bit 0, bit 1, bit 2).
pub const WEIGHTED_DAC: [u8; 3] = [0x21, 0x47, 0x97];

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

fn weighted(bit0: u8, bit1: u8, bit2: u8) -> u8 {
    // 0x21 + 0x47 + 0x97 = 0xFF, so the sum never overflows.
    WEIGHTED_DAC[0] * bit0 + WEIGHTED_DAC[1] * bit1 + WEIGHTED_DAC[2] * bit2
}

/// Decode one PROM byte with the fixed `0x21/0x47/0x97` weights.
///
/// Blue has only two bits (6 and 7); they drive the two heavier weights and
/// the lightest weight is never asserted.
pub fn weighted_rgb(byte: u8) -> Rgb {
    let bit = |n: u8| (byte >> n) & 1;
    Rgb {
        r: weighted(bit(0), bit(1), bit(2)),
        g: weighted(bit(3), bit(4), bit(5)),
        b: weighted(0, bit(6), bit(7)),
    }
}

/// Decode one PROM byte through resistor network weights. Networks 0, 1 and
/// 2 of `weights` drive red, green and blue.
pub fn resnet_rgb(byte: u8, weights: &ResistorWeights) -> Rgb {
    Rgb {
        r: weights.combine(0, byte & 0x07),
        g: weights.combine(1, (byte >> 3) & 0x07),
        b: weights.combine(2, (byte >> 6) & 0x03),
    }
}

/// Read entry `index` of a color lookup PROM whose two low address lines are
/// wired in reverse order.
pub fn swizzled_lookup(lut: &[u8], index: usize) -> u8 {
    lut[index ^ 0x03]
}

/// Pen → color mapping built once from PROM data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaletteTable {
    colors: Vec<Rgb>,
    indirection: Option<Vec<u16>>,
}

impl PaletteTable {
    /// Pen N is color N.
    pub fn direct(colors: Vec<Rgb>) -> Self {
        Self {
            colors,
            indirection: None,
        }
    }

    /// Pen N is color `pens[N]`.
    pub fn indirect(colors: Vec<Rgb>, pens: Vec<u16>) -> Self {
        debug_assert!(pens.iter().all(|&c| (c as usize) < colors.len()));
        Self {
            colors,
            indirection: Some(pens),
        }
    }

    /// Direct palette decoded with [`weighted_rgb`], one entry per PROM byte.
    pub fn from_weighted_prom(prom: &[u8]) -> Self {
        Self::direct(prom.iter().map(|&b| weighted_rgb(b)).collect())
    }

    /// Number of addressable pens.
    pub fn entries(&self) -> usize {
        self.indirection
            .as_ref()
            .map_or(self.colors.len(), Vec::len)
    }

    /// Number of distinct colors.
    pub fn color_count(&self) -> usize {
        self.colors.len()
    }

    pub fn color(&self, index: usize) -> Rgb {
        self.colors[index]
    }

    /// Color index a pen resolves to.
    pub fn pen_indirect(&self, pen: u16) -> u16 {
        match &self.indirection {
            Some(pens) => pens[pen as usize],
            None => pen,
        }
    }

    pub fn pen_rgb(&self, pen: u16) -> Rgb {
        self.colors[self.pen_indirect(pen) as usize]
    }

    /// Bit N is set when pixel value N of `color` in `gfx` resolves to the
    /// color index `trans_color`.
    pub fn transpen_mask(&self, gfx: &GfxElement, color: u16, trans_color: u16) -> u32 {
        (0..gfx.granularity())
            .filter(|&px| self.pen_indirect(gfx.pen(color, px as u8)) == trans_color)
            .fold(0, |mask, px| mask | (1 << px))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::video::resnet::{AUTOSCALE, ResistorNetwork, compute_resistor_weights};

    #[test]
    fn weighted_full_byte() {
        assert_eq!(weighted_rgb(0xFF), Rgb::new(255, 255, 222));
    }

    #[test]
    fn weighted_single_bits() {
        assert_eq!(weighted_rgb(0x01), Rgb::new(0x21, 0, 0));
        assert_eq!(weighted_rgb(0x02), Rgb::new(0x47, 0, 0));
        assert_eq!(weighted_rgb(0x04), Rgb::new(0x97, 0, 0));
        assert_eq!(weighted_rgb(0x08), Rgb::new(0, 0x21, 0));
        assert_eq!(weighted_rgb(0x40), Rgb::new(0, 0, 0x47));
        assert_eq!(weighted_rgb(0x80), Rgb::new(0, 0, 0x97));
        assert_eq!(weighted_rgb(0x00), Rgb::default());
    }

    #[test]
    fn resnet_full_byte() {
        let rg = [1000, 470, 220];
        let b = [470, 220];
        let weights = compute_resistor_weights(
            0,
            255,
            AUTOSCALE,
            &[
                ResistorNetwork::new(&rg, 470, 0),
                ResistorNetwork::new(&rg, 470, 0),
                ResistorNetwork::new(&b, 470, 0),
            ],
        );
        assert_eq!(resnet_rgb(0xFF, &weights), Rgb::new(255, 255, 247));
        assert_eq!(resnet_rgb(0x49, &weights), Rgb::new(33, 33, 79));
    }

    #[test]
    fn swizzled_lookup_flips_low_two_address_bits() {
        let lut: Vec<u8> = (0..8).collect();
        assert_eq!(swizzled_lookup(&lut, 0), 3);
        assert_eq!(swizzled_lookup(&lut, 1), 2);
        assert_eq!(swizzled_lookup(&lut, 2), 1);
        assert_eq!(swizzled_lookup(&lut, 3), 0);
        assert_eq!(swizzled_lookup(&lut, 4), 7);
    }

    #[test]
    fn direct_table_pens_are_colors() {
        let pal = PaletteTable::from_weighted_prom(&[0x00, 0x07, 0x38]);
        assert_eq!(pal.entries(), 3);
        assert_eq!(pal.pen_indirect(2), 2);
        assert_eq!(pal.pen_rgb(1), Rgb::new(255, 0, 0));
        assert_eq!(pal.pen_rgb(2), Rgb::new(0, 255, 0));
    }

    #[test]
    fn indirect_table_resolves_through_pens() {
        let pal = PaletteTable::indirect(
            vec![Rgb::new(1, 1, 1), Rgb::new(2, 2, 2)],
            vec![1, 1, 0, 1],
        );
        assert_eq!(pal.entries(), 4);
        assert_eq!(pal.color_count(), 2);
        assert_eq!(pal.pen_rgb(2), Rgb::new(1, 1, 1));
        assert_eq!(pal.pen_rgb(3), Rgb::new(2, 2, 2));
    }
}
