//! Configuration structures and constants for the ttempsmooth-core library.
//!
//! This module provides the filter's parameter set: the temporal radius,
//! per-plane thresholds, scene-change sensitivity and the choice between the
//! adaptive blender and the best-match selector. Defaults mirror the
//! long-standing plugin defaults, so only the parameters a caller wants to
//! change need to be set.

mod builder;
mod utils;
mod validation;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};

pub use builder::SmoothConfigBuilder;
pub use utils::{get_env, get_env_flag};

// Default constants

/// Largest supported temporal radius. A window never exceeds
/// `2 * MAX_TEMPORAL_RADIUS + 1` frames.
pub const MAX_TEMPORAL_RADIUS: usize = 7;

/// Default temporal radius (window of 7 frames).
pub const DEFAULT_MAXR: usize = 3;

/// Default luma and chroma thresholds.
pub const DEFAULT_THRESH: [u16; 3] = [4, 5, 5];

/// Default luma and chroma minimum-difference floors.
pub const DEFAULT_MDIFF: [u16; 3] = [2, 3, 3];

/// Default number of full-weight frames around the center.
pub const DEFAULT_STRENGTH: u32 = 2;

/// Default scene-change threshold in percent of the sample range.
pub const DEFAULT_SCTHRESH: f32 = 12.0;

/// Plane names in processing order, used in parameter and log messages.
pub const PLANE_NAMES: [&str; 3] = ["y", "u", "v"];

/// What the filter does with one plane of the output frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaneMode {
    /// Leave the freshly allocated output plane untouched (zero-filled).
    Skip,
    /// Copy the center source plane unmodified.
    Copy,
    /// Run the configured smoothing algorithm.
    Filter,
}

impl PlaneMode {
    /// Maps the classic numeric plane codes (1 = skip, 2 = copy, 3 = filter).
    pub fn from_code(field: &'static str, code: i64) -> CoreResult<Self> {
        match code {
            1 => Ok(PlaneMode::Skip),
            2 => Ok(PlaneMode::Copy),
            3 => Ok(PlaneMode::Filter),
            other => Err(CoreError::invalid(
                field,
                format!("must be between 1..3, got {}", other),
            )),
        }
    }

    pub fn code(self) -> i64 {
        match self {
            PlaneMode::Skip => 1,
            PlaneMode::Copy => 2,
            PlaneMode::Filter => 3,
        }
    }
}

/// Per-pixel algorithm used for filtered planes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProcessingMode {
    /// Weighted temporal average along similarity chains (pmode 0).
    Adaptive,
    /// Minimum-disagreement sample selection with optional memory (pmode 1).
    /// Only available for 8-bit clips.
    BestMatch,
}

impl ProcessingMode {
    pub fn from_code(code: i64) -> CoreResult<Self> {
        match code {
            0 => Ok(ProcessingMode::Adaptive),
            1 => Ok(ProcessingMode::BestMatch),
            other => Err(CoreError::invalid(
                "pmode",
                format!("must be 0 or 1, got {}", other),
            )),
        }
    }
}

/// Parameters of one plane (Y, U or V).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneSettings {
    /// Difference threshold on the 8-bit scale (1..=256).
    pub thresh: u16,

    /// Differences below this floor get full weight (0..=255).
    pub mdiff: u16,

    /// Best-match memory update threshold, 0 disables the memory.
    pub thupd: u32,

    /// Penalty a fresh candidate must overcome to replace the memory.
    pub pnew: u32,

    pub mode: PlaneMode,
}

impl PlaneSettings {
    fn defaults_for(plane: usize) -> Self {
        Self {
            thresh: DEFAULT_THRESH[plane],
            mdiff: DEFAULT_MDIFF[plane],
            thupd: 0,
            pnew: 0,
            mode: PlaneMode::Filter,
        }
    }
}

impl Default for PlaneSettings {
    fn default() -> Self {
        Self::defaults_for(1)
    }
}

/// Main configuration structure for the temporal smoothing filter.
///
/// All fields have defaults; JSON parameter files may specify any subset.
///
/// # Examples
///
/// ```rust
/// use ttempsmooth_core::config::{SmoothConfig, SmoothConfigBuilder, ProcessingMode};
///
/// let config = SmoothConfigBuilder::new()
///     .maxr(2)
///     .thresh(0, 6)
///     .scthresh(0.0)
///     .pmode(ProcessingMode::Adaptive)
///     .build()
///     .unwrap();
/// assert_eq!(config.diameter(), 5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothConfig {
    /// Temporal radius (1..=7).
    pub maxr: usize,

    /// Number of frames around the center that get full weight (1..=8).
    pub strength: u32,

    /// Scene-change threshold in percent (0 disables detection).
    pub scthresh: f32,

    /// Fidelity-preserving finalization: unused weight mass falls back to
    /// the center sample instead of renormalizing.
    pub fp: bool,

    pub pmode: ProcessingMode,

    /// Process rows of a plane on the rayon thread pool.
    pub parallel: bool,

    /// Y, U and V plane parameters.
    pub planes: [PlaneSettings; 3],
}

impl Default for SmoothConfig {
    fn default() -> Self {
        Self {
            maxr: DEFAULT_MAXR,
            strength: DEFAULT_STRENGTH,
            scthresh: DEFAULT_SCTHRESH,
            fp: true,
            pmode: ProcessingMode::Adaptive,
            parallel: true,
            planes: [
                PlaneSettings::defaults_for(0),
                PlaneSettings::defaults_for(1),
                PlaneSettings::defaults_for(2),
            ],
        }
    }
}

impl SmoothConfig {
    /// Number of frames in the temporal window.
    pub fn diameter(&self) -> usize {
        self.maxr * 2 + 1
    }

    /// Loads a JSON parameter file. Missing fields take their defaults.
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> CoreResult<Self> {
        let text = fs::read_to_string(path.as_ref())?;
        let config: SmoothConfig = serde_json::from_str(&text)?;
        log::debug!("Loaded parameters from {}", path.as_ref().display());
        Ok(config)
    }

    /// Serializes the configuration as pretty-printed JSON.
    pub fn to_json_string(&self) -> CoreResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Applies `TTEMPSMOOTH_*` environment overrides on top of the current
    /// values. Unparseable values are ignored.
    pub fn apply_env_overrides(&mut self) {
        self.maxr = get_env("TTEMPSMOOTH_MAXR", self.maxr);
        self.strength = get_env("TTEMPSMOOTH_STRENGTH", self.strength);
        self.scthresh = get_env("TTEMPSMOOTH_SCTHRESH", self.scthresh);
        self.parallel = get_env_flag("TTEMPSMOOTH_PARALLEL", self.parallel);
    }
}
