// ============================================================================
// ttempsmooth-core/src/blend.rs
// ============================================================================
//
// ADAPTIVE BLENDING: Weighted Temporal Average Along Similarity Chains
//
// For every pixel the blender walks outward from the center frame, first
// into the past and then into the future. A candidate joins the average
// only while it stays within the threshold of the center reference sample
// and, after the first step, within the threshold of the previously
// accepted candidate. The first rejection ends the chain on that side.
//
// Integer samples are compared on their native scale with the threshold
// shifted up by `bits - 8`; float samples compare against `thresh / 256`
// with differences clamped to 1.0.

use rayon::prelude::*;

use crate::frame::{Plane, Sample};
use crate::scene::ScanWindowBounds;
use crate::weights::{WeightTable, DIFF_LEVELS};

/// Sample arithmetic needed by the blender.
pub trait Blendable: Sample {
    /// Difference type compared against the threshold.
    type Diff: Copy + PartialOrd + Send + Sync;

    /// Threshold on this sample's scale.
    fn threshold(thresh: u16, shift: u32) -> Self::Diff;

    fn abs_diff(a: Self, b: Self) -> Self::Diff;

    /// Difference quantized to a weight-table level (0..256).
    fn level(diff: Self::Diff, shift: u32) -> usize;

    /// Converts a blended value back to a sample.
    fn finish(value: f32) -> Self;
}

impl Blendable for u8 {
    type Diff = i32;

    #[inline]
    fn threshold(thresh: u16, shift: u32) -> i32 {
        i32::from(thresh) << shift
    }

    #[inline]
    fn abs_diff(a: u8, b: u8) -> i32 {
        (i32::from(a) - i32::from(b)).abs()
    }

    #[inline]
    fn level(diff: i32, shift: u32) -> usize {
        (diff >> shift) as usize
    }

    #[inline]
    fn finish(value: f32) -> u8 {
        (value + 0.5) as u8
    }
}

impl Blendable for u16 {
    type Diff = i32;

    #[inline]
    fn threshold(thresh: u16, shift: u32) -> i32 {
        i32::from(thresh) << shift
    }

    #[inline]
    fn abs_diff(a: u16, b: u16) -> i32 {
        (i32::from(a) - i32::from(b)).abs()
    }

    #[inline]
    fn level(diff: i32, shift: u32) -> usize {
        (diff >> shift) as usize
    }

    #[inline]
    fn finish(value: f32) -> u16 {
        (value + 0.5) as u16
    }
}

impl Blendable for f32 {
    type Diff = f32;

    #[inline]
    fn threshold(thresh: u16, _shift: u32) -> f32 {
        f32::from(thresh) / 256.0
    }

    #[inline]
    fn abs_diff(a: f32, b: f32) -> f32 {
        (a - b).abs().min(1.0)
    }

    #[inline]
    fn level(diff: f32, _shift: u32) -> usize {
        ((diff * 255.0) as usize).min(DIFF_LEVELS - 1)
    }

    #[inline]
    fn finish(value: f32) -> f32 {
        value
    }
}

/// Per-plane parameters of one adaptive blending pass.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveBlend<'a> {
    pub table: &'a WeightTable,
    pub thresh: u16,
    pub shift: u32,
    pub fp: bool,
    pub bounds: ScanWindowBounds,
}

struct Accumulator {
    weights: f32,
    sum: f32,
}

impl AdaptiveBlend<'_> {
    /// Blends one plane. `src` and `reference` hold the window's planes in
    /// window order; `dst` receives the result.
    pub fn blend_plane<T: Blendable>(
        &self,
        src: &[&Plane<T>],
        reference: &[&Plane<T>],
        dst: &mut Plane<T>,
        parallel: bool,
    ) {
        let width = dst.width();
        let stride = dst.stride();
        let thresh = T::threshold(self.thresh, self.shift);

        let process_row = |(y, row): (usize, &mut [T])| {
            let src_rows: Vec<&[T]> = src.iter().map(|p| p.row(y)).collect();
            let ref_rows: Vec<&[T]> = reference.iter().map(|p| p.row(y)).collect();
            for (x, out) in row[..width].iter_mut().enumerate() {
                *out = self.blend_pixel(&src_rows, &ref_rows, x, thresh);
            }
        };

        if parallel {
            dst.data_mut()
                .par_chunks_mut(stride)
                .enumerate()
                .for_each(&process_row);
        } else {
            dst.data_mut()
                .chunks_mut(stride)
                .enumerate()
                .for_each(&process_row);
        }
    }

    #[inline]
    fn blend_pixel<T: Blendable>(
        &self,
        src: &[&[T]],
        reference: &[&[T]],
        x: usize,
        thresh: T::Diff,
    ) -> T {
        let maxr = self.table.maxr();
        let cw = self.table.center_weight();
        let center = src[maxr][x].to_f32();
        let c = reference[maxr][x];

        let mut acc = Accumulator {
            weights: cw,
            sum: center * cw,
        };

        let usable = self.bounds.usable();
        self.follow_chain(src, reference, x, c, thresh, (usable.start..maxr).rev(), &mut acc);
        self.follow_chain(src, reference, x, c, thresh, maxr + 1..usable.end, &mut acc);

        if self.fp {
            T::finish(center * (1.0 - acc.weights) + acc.sum)
        } else {
            T::finish(acc.sum / acc.weights)
        }
    }

    /// Accumulates candidates in `indices` order until the first rejection.
    #[allow(clippy::too_many_arguments)]
    #[inline]
    fn follow_chain<T: Blendable>(
        &self,
        src: &[&[T]],
        reference: &[&[T]],
        x: usize,
        c: T,
        thresh: T::Diff,
        indices: impl Iterator<Item = usize>,
        acc: &mut Accumulator,
    ) {
        let mut previous: Option<T> = None;
        for (step, index) in indices.enumerate() {
            let t = reference[index][x];
            let diff = T::abs_diff(c, t);
            if !(diff < thresh) {
                break;
            }
            if let Some(prev) = previous {
                if !(T::abs_diff(t, prev) < thresh) {
                    break;
                }
            }

            let weight = self.table.weight(index, step + 1, T::level(diff, self.shift));
            acc.weights += weight;
            acc.sum += src[index][x].to_f32() * weight;
            previous = Some(t);
        }
    }
}
