//! Resistor-ladder DAC model for PROM-driven palettes.
//!
//! Arcade boards of this era turn PROM bits into analog RGB by driving each
//! bit through a resistor into a common node that is pulled down (and
//! sometimes up) by a fixed resistor. The voltage at that node is a weighted
//! sum of the asserted bits. This module computes those weights the same way
//! for every caller, so a given resistor set and bit pattern always yields
//! the same 0-255 intensity.

/// Pass as the `scaler` to [`compute_resistor_weights`] to scale the
/// strongest network so that all of its bits together reach `maxval`.
pub const AUTOSCALE: f64 = -1.0;

/// Stand-in conductance for a missing (zero-ohm entry) pullup or pulldown.
const OPEN_CIRCUIT: f64 = 1.0e-12;

/// One output channel: the per-bit resistors (bit 0 first) and the fixed
/// pulldown/pullup resistors on the summing node. A value of 0 means "not
/// fitted".
#[derive(Clone, Copy, Debug)]
pub struct ResistorNetwork<'a> {
    pub resistances: &'a [u32],
    pub pulldown: u32,
    pub pullup: u32,
}

impl<'a> ResistorNetwork<'a> {
    pub const fn new(resistances: &'a [u32], pulldown: u32, pullup: u32) -> Self {
        Self {
            resistances,
            pulldown,
            pullup,
        }
    }
}

/// Per-network bit weights produced by [`compute_resistor_weights`].
#[derive(Clone, Debug, PartialEq)]
pub struct ResistorWeights {
    scale: f64,
    networks: Vec<Vec<f64>>,
}

impl ResistorWeights {
    /// Scale factor that was applied to the raw divider voltages.
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Weights of network `index`, bit 0 first.
    pub fn network(&self, index: usize) -> &[f64] {
        &self.networks[index]
    }

    /// Intensity of network `index` for the given bit pattern.
    pub fn combine(&self, index: usize, bits: u8) -> u8 {
        combine_weights(&self.networks[index], bits)
    }
}

fn conductance(ohms: u32) -> f64 {
    if ohms == 0 {
        OPEN_CIRCUIT
    } else {
        1.0 / f64::from(ohms)
    }
}

/// Raw (unscaled) output of each bit of one network: the node voltage when
/// only that bit is driven high and every other resistor sinks to ground.
fn divider_outputs(network: &ResistorNetwork<'_>, minval: i32, maxval: i32) -> Vec<f64> {
    let min = f64::from(minval);
    let max = f64::from(maxval);

    (0..network.resistances.len())
        .map(|n| {
            let mut to_ground = conductance(network.pulldown);
            let mut to_vcc = conductance(network.pullup);
            for (j, &r) in network.resistances.iter().enumerate() {
                if r == 0 {
                    continue;
                }
                if j == n {
                    to_vcc += 1.0 / f64::from(r);
                } else {
                    to_ground += 1.0 / f64::from(r);
                }
            }

            let r_ground = 1.0 / to_ground;
            let r_vcc = 1.0 / to_vcc;
            let vout = (max - min) * r_ground / (r_vcc + r_ground) + min;
            vout.clamp(min, max)
        })
        .collect()
}

/// Compute bit weights for a set of resistor networks that share one output
/// range.
///
/// With `scaler` set to [`AUTOSCALE`], a single scale factor is chosen so the
/// network with the largest total output reaches exactly `maxval`; weaker
/// networks keep their relative strength. Any other `scaler` is applied as is.
pub fn compute_resistor_weights(
    minval: i32,
    maxval: i32,
    scaler: f64,
    networks: &[ResistorNetwork<'_>],
) -> ResistorWeights {
    let raw: Vec<Vec<f64>> = networks
        .iter()
        .map(|net| divider_outputs(net, minval, maxval))
        .collect();

    let max_out = raw
        .iter()
        .map(|w| w.iter().sum::<f64>())
        .fold(0.0, f64::max);

    let scale = if scaler < 0.0 {
        f64::from(maxval) / max_out
    } else {
        scaler
    };

    ResistorWeights {
        scale,
        networks: raw
            .into_iter()
            .map(|w| w.into_iter().map(|v| v * scale).collect())
            .collect(),
    }
}

/// Sum the weights of the asserted bits (bit 0 = `weights[0]`) and round to
/// the nearest integer, half up.
pub fn combine_weights(weights: &[f64], bits: u8) -> u8 {
    let sum: f64 = weights
        .iter()
        .enumerate()
        .filter(|&(i, _)| (bits >> i) & 1 != 0)
        .map(|(_, w)| w)
        .sum();
    (sum + 0.5).clamp(0.0, 255.0) as u8
}

/// Intensity (0-255) of a single resistor network, auto-scaled on its own,
/// for the given bit pattern.
pub fn resistor_weighted_value(resistances: &[u32], pulldown: u32, bits: u8) -> u8 {
    let weights = compute_resistor_weights(
        0,
        255,
        AUTOSCALE,
        &[ResistorNetwork::new(resistances, pulldown, 0)],
    );
    weights.combine(0, bits)
}
