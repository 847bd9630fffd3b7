// ttempsmooth-core/tests/utils_tests.rs

use std::time::Duration;
use ttempsmooth_core::utils::{format_bytes, format_elapsed, format_rate};

#[test]
fn test_format_bytes() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(1023), "1023 B");
    assert_eq!(format_bytes(1024), "1.00 KiB");
    assert_eq!(format_bytes(1536), "1.50 KiB");
    assert_eq!(format_bytes(1024 * 1024 - 1), "1024.00 KiB"); // Check rounding
    assert_eq!(format_bytes(1024 * 1024), "1.00 MiB");
    assert_eq!(format_bytes(1024 * 1024 * 1024), "1.00 GiB");
}

#[test]
fn test_format_elapsed_boundaries() {
    assert_eq!(format_elapsed(Duration::ZERO), "0.0ms");
    assert_eq!(format_elapsed(Duration::from_secs(1)), "1.00s");
    assert_eq!(format_elapsed(Duration::from_secs(60)), "01:00");
}

#[test]
fn test_format_rate() {
    assert_eq!(format_rate(3, Duration::from_millis(500)), "6.00 fps");
}
