//! Formatting helpers for reports.
//!
//! Shared by the command-line front end when it prints benchmark results and
//! filter summaries.

use std::time::Duration;

use crate::frame::{FrameFormat, SampleType};

/// Formats an elapsed time for humans: milliseconds below one second,
/// seconds below a minute and `MM:SS` beyond.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs < 1.0 {
        format!("{:.1}ms", secs * 1000.0)
    } else if secs < 60.0 {
        format!("{secs:.2}s")
    } else {
        let total = elapsed.as_secs();
        format!("{:02}:{:02}", total / 60, total % 60)
    }
}

/// Formats bytes with appropriate binary units (B, KiB, MiB, GiB).
#[must_use]
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;

    let bytes_f64 = bytes as f64;
    if bytes_f64 >= GIB {
        format!("{:.2} GiB", bytes_f64 / GIB)
    } else if bytes_f64 >= MIB {
        format!("{:.2} MiB", bytes_f64 / MIB)
    } else if bytes_f64 >= KIB {
        format!("{:.2} KiB", bytes_f64 / KIB)
    } else {
        format!("{bytes} B")
    }
}

/// Frames per second, or "n/a" when no time has elapsed.
#[must_use]
pub fn format_rate(frames: usize, elapsed: Duration) -> String {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return "n/a".to_string();
    }
    format!("{:.2} fps", frames as f64 / secs)
}

/// Bytes needed to hold one frame of `format` at `width` x `height`.
#[must_use]
pub fn frame_size_bytes(format: &FrameFormat, width: usize, height: usize) -> u64 {
    let sample_bytes = match format.sample_type {
        SampleType::U8 => 1,
        SampleType::U16 => 2,
        SampleType::F32 => 4,
    };
    (0..format.num_planes)
        .map(|p| {
            let (w, h) = format.plane_dimensions(p, width, height);
            (w * h * sample_bytes) as u64
        })
        .sum()
}
