//! Environment lookups for `TTEMPSMOOTH_*` overrides.
//!
//! An unset variable or a value that fails to parse leaves the default in
//! place, so a stray variable never aborts filter construction.

use std::str::FromStr;

/// Parses `key` as `T`, falling back to `default`.
pub fn get_env<T: FromStr>(key: &str, default: T) -> T {
    match std::env::var(key) {
        Ok(val) => val.trim().parse().unwrap_or_else(|_| {
            log::warn!("Ignoring {}={:?}: not a valid value", key, val);
            default
        }),
        Err(_) => default,
    }
}

/// Reads a switch: `true`/`yes`/`on`/`1` enable it, `false`/`no`/`off`/`0`
/// disable it, anything else keeps `default`.
pub fn get_env_flag(key: &str, default: bool) -> bool {
    let Ok(val) = std::env::var(key) else {
        return default;
    };
    match val.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => true,
        "false" | "no" | "off" | "0" => false,
        _ => {
            log::warn!("Ignoring {}={:?}: expected a boolean", key, val);
            default
        }
    }
}
