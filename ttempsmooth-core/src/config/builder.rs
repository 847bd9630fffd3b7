// ============================================================================
// ttempsmooth-core/src/config/builder.rs
// ============================================================================
//
// CONFIGURATION BUILDER: Builder Pattern for SmoothConfig
//
// This module implements the builder pattern for the SmoothConfig structure,
// providing a fluent API for creating filter configurations. Every setter
// records the raw value; `build` runs the full validation pass so a config
// produced by the builder is always within range.

use super::{PlaneMode, ProcessingMode, SmoothConfig};
use crate::error::CoreResult;

/// Builder for creating SmoothConfig instances.
///
/// Plane-indexed setters take the plane index (0 = Y, 1 = U, 2 = V); indices
/// above 2 are ignored.
///
/// # Examples
///
/// ```rust
/// use ttempsmooth_core::config::{PlaneMode, SmoothConfigBuilder};
///
/// let config = SmoothConfigBuilder::new()
///     .maxr(4)
///     .strength(3)
///     .thresh(0, 8)
///     .mdiff(0, 3)
///     .plane_mode(2, PlaneMode::Copy)
///     .build()
///     .unwrap();
/// assert_eq!(config.planes[2].mode, PlaneMode::Copy);
/// ```
#[derive(Debug, Clone, Default)]
pub struct SmoothConfigBuilder {
    config: SmoothConfig,
}

impl SmoothConfigBuilder {
    /// Creates a new builder holding the default configuration.
    pub fn new() -> Self {
        Self {
            config: SmoothConfig::default(),
        }
    }

    /// Starts from an existing configuration, e.g. one loaded from a file.
    pub fn from_config(config: SmoothConfig) -> Self {
        Self { config }
    }

    pub fn maxr(mut self, maxr: usize) -> Self {
        self.config.maxr = maxr;
        self
    }

    pub fn strength(mut self, strength: u32) -> Self {
        self.config.strength = strength;
        self
    }

    pub fn scthresh(mut self, scthresh: f32) -> Self {
        self.config.scthresh = scthresh;
        self
    }

    /// Selects fidelity-preserving (true) or plain-average (false) output.
    pub fn fp(mut self, fp: bool) -> Self {
        self.config.fp = fp;
        self
    }

    pub fn pmode(mut self, pmode: ProcessingMode) -> Self {
        self.config.pmode = pmode;
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.config.parallel = parallel;
        self
    }

    pub fn thresh(mut self, plane: usize, thresh: u16) -> Self {
        if let Some(p) = self.config.planes.get_mut(plane) {
            p.thresh = thresh;
        }
        self
    }

    pub fn mdiff(mut self, plane: usize, mdiff: u16) -> Self {
        if let Some(p) = self.config.planes.get_mut(plane) {
            p.mdiff = mdiff;
        }
        self
    }

    pub fn thupd(mut self, plane: usize, thupd: u32) -> Self {
        if let Some(p) = self.config.planes.get_mut(plane) {
            p.thupd = thupd;
        }
        self
    }

    pub fn pnew(mut self, plane: usize, pnew: u32) -> Self {
        if let Some(p) = self.config.planes.get_mut(plane) {
            p.pnew = pnew;
        }
        self
    }

    pub fn plane_mode(mut self, plane: usize, mode: PlaneMode) -> Self {
        if let Some(p) = self.config.planes.get_mut(plane) {
            p.mode = mode;
        }
        self
    }

    /// Sets the same threshold, floor and mode on all three planes.
    pub fn all_planes(mut self, thresh: u16, mdiff: u16, mode: PlaneMode) -> Self {
        for p in self.config.planes.iter_mut() {
            p.thresh = thresh;
            p.mdiff = mdiff;
            p.mode = mode;
        }
        self
    }

    /// Validates and returns the configuration.
    pub fn build(self) -> CoreResult<SmoothConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CoreError;

    #[test]
    fn test_builder_sets_plane_fields() {
        let config = SmoothConfigBuilder::new()
            .thresh(1, 20)
            .mdiff(1, 4)
            .thupd(0, 6)
            .pnew(0, 3)
            .build()
            .unwrap();
        assert_eq!(config.planes[1].thresh, 20);
        assert_eq!(config.planes[1].mdiff, 4);
        assert_eq!(config.planes[0].thupd, 6);
        assert_eq!(config.planes[0].pnew, 3);
    }

    #[test]
    fn test_builder_rejects_invalid_radius() {
        let result = SmoothConfigBuilder::new().maxr(8).build();
        match result {
            Err(CoreError::InvalidParameter { field, .. }) => assert_eq!(field, "maxr"),
            other => panic!("expected InvalidParameter, got {:?}", other),
        }
    }

    #[test]
    fn test_out_of_range_plane_index_is_ignored() {
        let config = SmoothConfigBuilder::new().thresh(5, 1).build().unwrap();
        assert_eq!(config, SmoothConfig::default());
    }
}
