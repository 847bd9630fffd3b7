// ============================================================================
// ttempsmooth-core/src/best_match.rs
// ============================================================================
//
// BEST-MATCH SELECTION: Minimum-Disagreement Sample Picking (8-bit only)
//
// For each pixel, every window position is scored by the sum of its
// absolute differences to all other positions. Scene bounds do not apply:
// the whole window always takes part, so the center is always a candidate
// and sums stay comparable with the ones kept in memory. The center position
// is represented by the reference sample, all others by source samples. The
// lowest sum wins, ties going to the earliest position.
//
// The winner then passes through two more steps, in this order:
// 1. Memory substitution: when the plane has memory, a remembered sample
//    close to the winner whose stored sum is no worse than the winner's sum
//    plus `pnew` is output instead. Otherwise the memory takes the winner.
// 2. Final gate: the result is used only if it lies within `thresh` of the
//    center source sample; otherwise the source sample is kept.

use rayon::prelude::*;

use crate::config::MAX_TEMPORAL_RADIUS;
use crate::frame::Plane;
use crate::memory::MemoryCell;

/// Counters gathered while selecting one plane.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionStats {
    pub pixels: usize,
    /// Pixels whose winning row was not the center.
    pub non_center: usize,
    /// Pixels that output the remembered sample.
    pub memory_hits: usize,
}

impl SelectionStats {
    fn merge(self, other: SelectionStats) -> SelectionStats {
        SelectionStats {
            pixels: self.pixels + other.pixels,
            non_center: self.non_center + other.non_center,
            memory_hits: self.memory_hits + other.memory_hits,
        }
    }
}

/// Per-plane parameters of one best-match pass.
#[derive(Debug, Clone, Copy)]
pub struct BestMatch {
    pub maxr: usize,
    pub thresh: u16,
    pub thupd: u32,
    pub pnew: u32,
}

impl BestMatch {
    /// Selects one plane. `memory` must be the plane's cells when `thupd` is
    /// positive and is ignored otherwise.
    pub fn select_plane(
        &self,
        src: &[&Plane<u8>],
        reference: &[&Plane<u8>],
        dst: &mut Plane<u8>,
        memory: Option<&mut [MemoryCell]>,
        parallel: bool,
    ) -> SelectionStats {
        let width = dst.width();
        let stride = dst.stride();
        let memory = if self.thupd > 0 { memory } else { None };

        let select = |y: usize, row: &mut [u8], cells: Option<&mut [MemoryCell]>| {
            self.select_row(src, reference, y, &mut row[..width], cells)
        };

        match (memory, parallel) {
            (Some(cells), true) => dst
                .data_mut()
                .par_chunks_mut(stride)
                .zip(cells.par_chunks_mut(width))
                .enumerate()
                .map(|(y, (row, cells))| select(y, row, Some(cells)))
                .reduce(SelectionStats::default, SelectionStats::merge),
            (Some(cells), false) => dst
                .data_mut()
                .chunks_mut(stride)
                .zip(cells.chunks_mut(width))
                .enumerate()
                .map(|(y, (row, cells))| select(y, row, Some(cells)))
                .fold(SelectionStats::default(), SelectionStats::merge),
            (None, true) => dst
                .data_mut()
                .par_chunks_mut(stride)
                .enumerate()
                .map(|(y, row)| select(y, row, None))
                .reduce(SelectionStats::default, SelectionStats::merge),
            (None, false) => dst
                .data_mut()
                .chunks_mut(stride)
                .enumerate()
                .map(|(y, row)| select(y, row, None))
                .fold(SelectionStats::default(), SelectionStats::merge),
        }
    }

    fn select_row(
        &self,
        src: &[&Plane<u8>],
        reference: &[&Plane<u8>],
        y: usize,
        row: &mut [u8],
        mut cells: Option<&mut [MemoryCell]>,
    ) -> SelectionStats {
        let maxr = self.maxr;
        let src_rows: Vec<&[u8]> = src.iter().map(|p| p.row(y)).collect();
        let center_ref = reference[maxr].row(y);
        let diameter = maxr * 2 + 1;
        let thresh = i32::from(self.thresh);
        let thupd = self.thupd as i32;
        let pnew = self.pnew as i32;

        let mut stats = SelectionStats {
            pixels: row.len(),
            ..SelectionStats::default()
        };
        let mut samples = [0i32; MAX_TEMPORAL_RADIUS * 2 + 1];

        for (x, out) in row.iter_mut().enumerate() {
            for i in 0..diameter {
                samples[i] = if i == maxr {
                    i32::from(center_ref[x])
                } else {
                    i32::from(src_rows[i][x])
                };
            }

            let mut best_index = maxr;
            let mut best_sum = i32::MAX;
            for i in 0..diameter {
                let sum: i32 = (0..diameter)
                    .filter(|&j| j != i)
                    .map(|j| (samples[i] - samples[j]).abs())
                    .sum();
                if sum < best_sum {
                    best_sum = sum;
                    best_index = i;
                }
            }
            if best_index != maxr {
                stats.non_center += 1;
            }

            let mut best = samples[best_index];

            if let Some(cells) = cells.as_deref_mut() {
                let cell = &mut cells[x];
                if (best - i32::from(cell.value)).abs() < thupd && best_sum + pnew >= cell.min_sum {
                    best = i32::from(cell.value);
                    stats.memory_hits += 1;
                } else {
                    cell.value = best as u8;
                    cell.min_sum = best_sum;
                }
            }

            let current = src_rows[maxr][x];
            *out = if (best - i32::from(current)).abs() < thresh {
                best as u8
            } else {
                current
            };
        }

        stats
    }
}
