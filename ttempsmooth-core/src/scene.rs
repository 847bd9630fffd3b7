//! Scene-change window clamping.
//!
//! Before any pixel is blended, adjacent reference frames in the window are
//! compared on their first plane. A mean absolute difference above the
//! threshold marks a cut, and the usable window stops at the first cut found
//! on either side of the center.

use std::ops::Range;

use crate::frame::{Frame, Plane, PlaneData, Sample};
use crate::source::Window;

/// Exclusive bounds of the usable part of a window.
///
/// A window position `i` may contribute when `from_frame < i < to_frame`.
/// The full window is `(-1, diameter)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanWindowBounds {
    pub from_frame: isize,
    pub to_frame: isize,
}

impl ScanWindowBounds {
    pub fn full(diameter: usize) -> Self {
        Self {
            from_frame: -1,
            to_frame: diameter as isize,
        }
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        let i = index as isize;
        i > self.from_frame && i < self.to_frame
    }

    /// Window positions inside the bounds.
    pub fn usable(&self) -> Range<usize> {
        (self.from_frame + 1) as usize..self.to_frame as usize
    }
}

/// Mean absolute difference of two planes of the same geometry, unscaled.
pub fn mean_abs_difference<T: Sample>(a: &Plane<T>, b: &Plane<T>) -> f64 {
    let mut accum = 0.0f64;
    for y in 0..a.height() {
        for (&pa, &pb) in a.row(y).iter().zip(b.row(y)) {
            accum += f64::from((pb.to_f32() - pa.to_f32()).abs());
        }
    }
    accum / (a.width() * a.height()) as f64
}

/// Normalized difference between the first planes of two frames: the mean
/// absolute difference divided by the peak sample value (1.0 for float).
pub fn frame_difference(a: &Frame, b: &Frame) -> f32 {
    let raw = match (a.plane(0), b.plane(0)) {
        (PlaneData::U8(pa), PlaneData::U8(pb)) => mean_abs_difference(pa, pb),
        (PlaneData::U16(pa), PlaneData::U16(pb)) => mean_abs_difference(pa, pb),
        (PlaneData::F32(pa), PlaneData::F32(pb)) => mean_abs_difference(pa, pb),
        (pa, pb) => {
            debug_assert_eq!(
                pa.sample_type(),
                pb.sample_type(),
                "frame_difference on mismatched sample types"
            );
            // Release builds treat a mismatch as a cut.
            return f32::INFINITY;
        }
    };
    (raw / f64::from(a.format().peak_value())) as f32
}

/// Finds the usable sub-window around the center of a reference window.
#[derive(Debug, Clone, Copy)]
pub struct SceneChangeDetector {
    threshold: f32,
}

impl SceneChangeDetector {
    /// `scthresh` is the percentage threshold; 0 disables detection.
    pub fn new(scthresh: f32) -> Self {
        Self {
            threshold: scthresh / 100.0,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.threshold > 0.0
    }

    fn is_cut(&self, a: &Frame, b: &Frame) -> bool {
        frame_difference(a, b) > self.threshold
    }

    /// Computes the bounds for the window's center frame.
    ///
    /// Scanning backward, a cut between positions `i - 1` and `i` sets
    /// `from_frame = i`; scanning forward, a cut between `i` and `i + 1` sets
    /// `to_frame = i`.
    pub fn detect(&self, reference: &Window) -> ScanWindowBounds {
        let maxr = reference.maxr();
        let diameter = reference.diameter();
        let mut bounds = ScanWindowBounds::full(diameter);

        if !self.is_enabled() {
            return bounds;
        }

        for i in (1..=maxr).rev() {
            if self.is_cut(reference.frame(i - 1), reference.frame(i)) {
                bounds.from_frame = i as isize;
                break;
            }
        }

        for i in maxr..diameter - 1 {
            if self.is_cut(reference.frame(i), reference.frame(i + 1)) {
                bounds.to_frame = i as isize;
                break;
            }
        }

        if bounds != ScanWindowBounds::full(diameter) {
            log::debug!(
                "Scene change clamps window to ({}, {})",
                bounds.from_frame,
                bounds.to_frame
            );
        }
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::FrameFormat;
    use std::sync::Arc;

    fn gray(value: u8) -> Arc<Frame> {
        Arc::new(
            Frame::from_planes(
                FrameFormat::gray8(),
                4,
                4,
                vec![PlaneData::U8(Plane::filled(4, 4, value))],
            )
            .unwrap(),
        )
    }

    #[test]
    fn test_frame_difference_is_normalized() {
        let d = frame_difference(&gray(0), &gray(255));
        assert!((d - 1.0).abs() < 1e-6);
        let d = frame_difference(&gray(10), &gray(61));
        assert!((d - 0.2).abs() < 1e-6);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "mismatched sample types")]
    fn test_mismatched_sample_types_are_rejected() {
        let float = Frame::new(FrameFormat::yuv444ps(), 4, 4);
        frame_difference(&gray(0), &float);
    }

    #[test]
    fn test_disabled_detector_keeps_full_window() {
        let window = Window::from_frames(vec![gray(0), gray(255), gray(0)]).unwrap();
        let bounds = SceneChangeDetector::new(0.0).detect(&window);
        assert_eq!(bounds, ScanWindowBounds::full(3));
    }

    #[test]
    fn test_cut_in_the_past_sets_from_frame() {
        // Cut between positions 1 and 2 of a 7-frame window.
        let frames = vec![gray(200), gray(200), gray(10), gray(10), gray(10), gray(10), gray(10)];
        let window = Window::from_frames(frames).unwrap();
        let bounds = SceneChangeDetector::new(12.0).detect(&window);
        assert_eq!(bounds.from_frame, 2);
        assert_eq!(bounds.to_frame, 7);
        assert_eq!(bounds.usable(), 3..7);
    }

    #[test]
    fn test_cut_next_to_center_excludes_whole_side() {
        let frames = vec![gray(10), gray(10), gray(10), gray(200), gray(200)];
        let window = Window::from_frames(frames).unwrap();
        let bounds = SceneChangeDetector::new(12.0).detect(&window);
        assert_eq!(bounds.from_frame, -1);
        assert_eq!(bounds.to_frame, 2);
        assert!(!bounds.contains(3));
        assert!(bounds.contains(0));
    }

    #[test]
    fn test_nearest_cut_wins() {
        let frames = vec![gray(0), gray(100), gray(200), gray(200), gray(200)];
        let window = Window::from_frames(frames).unwrap();
        let bounds = SceneChangeDetector::new(12.0).detect(&window);
        assert_eq!(bounds.from_frame, 2);
    }
}
