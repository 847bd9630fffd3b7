// ============================================================================
// ttempsmooth-core/src/weights.rs
// ============================================================================
//
// WEIGHT TABLES: Per-Plane Blend Weights
//
// Built once per plane when the filter is constructed. Two regimes exist:
//
// - Distance-indexed: the weight of a candidate depends only on its temporal
//   distance from the center. The table has one entry per window position.
// - Difference-indexed: the weight also falls off with the measured sample
//   difference to the center. The table holds 256 entries (one per 8-bit
//   difference) for each distance band 1..=maxr.
//
// Both are normalized so that the center weight plus every weight a single
// pixel could possibly collect sums to one.

use serde::Serialize;

use crate::config::MAX_TEMPORAL_RADIUS;

/// Number of quantized difference levels per distance band.
pub const DIFF_LEVELS: usize = 256;

/// How candidate weights are looked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightRegime {
    DistanceIndexed,
    DifferenceIndexed,
}

impl WeightRegime {
    /// The difference-indexed regime is used whenever the threshold leaves
    /// room for a ramp above the floor.
    pub fn select(thresh: u16, mdiff: u16) -> Self {
        if u32::from(thresh) > u32::from(mdiff) + 1 {
            WeightRegime::DifferenceIndexed
        } else {
            WeightRegime::DistanceIndexed
        }
    }
}

/// Normalized blend weights for one plane.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightTable {
    regime: WeightRegime,
    maxr: usize,
    center_weight: f32,
    weights: Vec<f32>,
}

/// Unnormalized weight by temporal distance: full weight below `strength`,
/// then `1 / (d - strength + 2)`.
fn distance_kernel(maxr: usize, strength: u32) -> [f32; MAX_TEMPORAL_RADIUS + 1] {
    let strength = strength as usize;
    let mut dt = [0.0f32; MAX_TEMPORAL_RADIUS + 1];
    for (d, w) in dt.iter_mut().enumerate().take(maxr + 1) {
        *w = if d < strength {
            1.0
        } else {
            1.0 / (d - strength + 2) as f32
        };
    }
    dt
}

/// Difference ramp on the 256 scale: flat below `mdiff`, then a linear
/// descent that reaches zero by `thresh`.
fn difference_ramp(thresh: u16, mdiff: u16) -> [f32; DIFF_LEVELS] {
    let thresh = i32::from(thresh);
    let mdiff = i32::from(mdiff);
    let mut rt = [0.0f32; DIFF_LEVELS];

    let step = 256.0f32 / (thresh - mdiff.min(thresh - 1)) as f32;
    let mut base = 256.0f32;
    for j in 0..thresh.min(DIFF_LEVELS as i32) {
        if mdiff > j {
            rt[j as usize] = 256.0;
        } else {
            if base <= 0.0 {
                break;
            }
            rt[j as usize] = base;
            base -= step;
        }
    }
    rt
}

impl WeightTable {
    /// Builds the table for one plane from already validated parameters.
    pub fn build(maxr: usize, strength: u32, thresh: u16, mdiff: u16) -> Self {
        let regime = WeightRegime::select(thresh, mdiff);
        let dt = distance_kernel(maxr, strength);

        let table = match regime {
            WeightRegime::DifferenceIndexed => {
                let rt = difference_ramp(thresh, mdiff);
                let mut weights = vec![0.0f32; DIFF_LEVELS * maxr];

                let mut sum = dt[0];
                for j in 1..=maxr {
                    sum += dt[j] * 2.0;
                    let band = &mut weights[DIFF_LEVELS * (j - 1)..DIFF_LEVELS * j];
                    for (w, r) in band.iter_mut().zip(rt.iter()) {
                        *w = dt[j] * r / 256.0;
                    }
                }
                for w in weights.iter_mut() {
                    *w /= sum;
                }

                Self {
                    regime,
                    maxr,
                    center_weight: dt[0] / sum,
                    weights,
                }
            }
            WeightRegime::DistanceIndexed => {
                let diameter = maxr * 2 + 1;
                let mut weights = vec![0.0f32; diameter];
                for d in 0..=maxr {
                    weights[maxr - d] = dt[d];
                    weights[maxr + d] = dt[d];
                }

                let mut sum = 0.0f32;
                for w in &weights {
                    sum += w;
                }
                for w in weights.iter_mut() {
                    *w /= sum;
                }

                Self {
                    regime,
                    maxr,
                    center_weight: weights[maxr],
                    weights,
                }
            }
        };

        log::debug!(
            "Built {:?} weight table (maxr={}, strength={}, thresh={}, mdiff={}, cw={:.5})",
            table.regime,
            maxr,
            strength,
            thresh,
            mdiff,
            table.center_weight
        );
        table
    }

    pub fn regime(&self) -> WeightRegime {
        self.regime
    }

    pub fn maxr(&self) -> usize {
        self.maxr
    }

    /// Weight of the center sample.
    pub fn center_weight(&self) -> f32 {
        self.center_weight
    }

    /// Raw table: one entry per window position (distance regime) or
    /// `256 * maxr` entries (difference regime).
    pub fn weights(&self) -> &[f32] {
        &self.weights
    }

    /// Weight of a candidate at `window_index`, `steps` frames away from the
    /// center, whose difference to the center quantizes to `level`.
    #[inline]
    pub fn weight(&self, window_index: usize, steps: usize, level: usize) -> f32 {
        match self.regime {
            WeightRegime::DistanceIndexed => self.weights[window_index],
            WeightRegime::DifferenceIndexed => self.weights[DIFF_LEVELS * (steps - 1) + level],
        }
    }

    /// Total weight a single pixel collects when every candidate in the
    /// window is accepted at difference zero.
    pub fn reachable_sum(&self) -> f32 {
        match self.regime {
            WeightRegime::DistanceIndexed => self.weights.iter().sum(),
            WeightRegime::DifferenceIndexed => {
                let sides: f32 = (0..self.maxr).map(|j| self.weights[DIFF_LEVELS * j]).sum();
                self.center_weight + 2.0 * sides
            }
        }
    }
}
