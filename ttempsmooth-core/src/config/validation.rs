//! Parameter validation
//!
//! Every range check happens here, once, before a filter instance exists.
//! Errors name the offending parameter using the classic parameter names
//! (`ythresh`, `umdiff`, ...) so messages match the documented interface.

use super::{MAX_TEMPORAL_RADIUS, SmoothConfig};
use crate::error::{CoreError, CoreResult};

const THRESH_FIELDS: [&str; 3] = ["ythresh", "uthresh", "vthresh"];
const MDIFF_FIELDS: [&str; 3] = ["ymdiff", "umdiff", "vmdiff"];
const THUPD_FIELDS: [&str; 3] = ["ythupd", "uthupd", "vthupd"];
const PNEW_FIELDS: [&str; 3] = ["ypnew", "upnew", "vpnew"];

// Keeps `sum + pnew` and the memory sentinel well inside i32.
const MAX_MEMORY_PARAMETER: u32 = 1 << 16;

impl SmoothConfig {
    /// Checks every parameter against its documented range.
    pub fn validate(&self) -> CoreResult<()> {
        if !(1..=MAX_TEMPORAL_RADIUS).contains(&self.maxr) {
            return Err(CoreError::invalid(
                "maxr",
                format!(
                    "must be between 1..{}, got {}",
                    MAX_TEMPORAL_RADIUS, self.maxr
                ),
            ));
        }

        if !(1..=8).contains(&self.strength) {
            return Err(CoreError::invalid(
                "strength",
                format!("must be between 1..8, got {}", self.strength),
            ));
        }

        if !self.scthresh.is_finite() || !(0.0..=100.0).contains(&self.scthresh) {
            return Err(CoreError::invalid(
                "scthresh",
                format!("must be between 0.0..100.0, got {}", self.scthresh),
            ));
        }

        for (index, plane) in self.planes.iter().enumerate() {
            if !(1..=256).contains(&plane.thresh) {
                return Err(CoreError::invalid(
                    THRESH_FIELDS[index],
                    format!("must be between 1..256, got {}", plane.thresh),
                ));
            }
            if plane.mdiff > 255 {
                return Err(CoreError::invalid(
                    MDIFF_FIELDS[index],
                    format!("must be between 0..255, got {}", plane.mdiff),
                ));
            }
            if plane.thupd > MAX_MEMORY_PARAMETER {
                return Err(CoreError::invalid(
                    THUPD_FIELDS[index],
                    format!("must be at most {}, got {}", MAX_MEMORY_PARAMETER, plane.thupd),
                ));
            }
            if plane.pnew > MAX_MEMORY_PARAMETER {
                return Err(CoreError::invalid(
                    PNEW_FIELDS[index],
                    format!("must be at most {}, got {}", MAX_MEMORY_PARAMETER, plane.pnew),
                ));
            }
        }

        Ok(())
    }
}
