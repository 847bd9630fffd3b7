//! Command implementations for the CLI.
//!
//! Each submodule contains the implementation of a specific command. The
//! parameter resolution every command shares lives here.

pub mod bench;
pub mod validate;
pub mod weights;

use log::debug;
use ttempsmooth_core::config::{SmoothConfig, SmoothConfigBuilder};

use crate::cli::ParamArgs;
use crate::error::{CliErrorContext, CliResult};

/// Value for `plane` from a 1 to 3 entry list; missing entries repeat the
/// last one given.
fn per_plane<T: Copy>(values: &[T], plane: usize) -> Option<T> {
    values.get(plane).or_else(|| values.last()).copied()
}

/// Resolves defaults, parameter file, environment and flags into a
/// validated configuration.
pub fn resolve_config(params: &ParamArgs) -> CliResult<SmoothConfig> {
    let mut config = match &params.config {
        Some(path) => SmoothConfig::from_json_file(path)
            .cli_with_context(|| format!("Failed to load parameters from {}", path.display()))?,
        None => SmoothConfig::default(),
    };

    if !params.no_env {
        config.apply_env_overrides();
    }

    let mut builder = SmoothConfigBuilder::from_config(config);
    if let Some(maxr) = params.maxr {
        builder = builder.maxr(maxr);
    }
    if let Some(strength) = params.strength {
        builder = builder.strength(strength);
    }
    if let Some(scthresh) = params.scthresh {
        builder = builder.scthresh(scthresh);
    }
    if params.no_fp {
        builder = builder.fp(false);
    }
    if let Some(pmode) = params.pmode {
        builder = builder.pmode(pmode.into());
    }
    if params.sequential {
        builder = builder.parallel(false);
    }

    for plane in 0..3 {
        if let Some(v) = params.thresh.as_deref().and_then(|v| per_plane(v, plane)) {
            builder = builder.thresh(plane, v);
        }
        if let Some(v) = params.mdiff.as_deref().and_then(|v| per_plane(v, plane)) {
            builder = builder.mdiff(plane, v);
        }
        if let Some(v) = params.thupd.as_deref().and_then(|v| per_plane(v, plane)) {
            builder = builder.thupd(plane, v);
        }
        if let Some(v) = params.pnew.as_deref().and_then(|v| per_plane(v, plane)) {
            builder = builder.pnew(plane, v);
        }
        if let Some(v) = params.planes.as_deref().and_then(|v| per_plane(v, plane)) {
            builder = builder.plane_mode(plane, v.into());
        }
    }

    let config = builder.build()?;
    debug!("Resolved parameters: {:?}", config);
    Ok(config)
}
