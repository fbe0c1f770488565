//! Runtime parameter resolution
//!
//! The release id to ingest may arrive from an external parameter source
//! (pipeline trigger, environment, CLI flag). That source is modelled as an
//! optional injected dependency: the resolver tolerates a missing source, a
//! source that errors, and an unparseable value, always producing a usable
//! release id. Resolution happens once at startup and is never re-checked
//! mid-run.

use edp_common::Result;
use tracing::{info, warn};

/// Name of the runtime parameter consulted for the release id.
pub const RELEASE_ID_PARAM: &str = "release_id";

/// An external key-value parameter source.
///
/// Implementations may fail on read; the resolver treats any failure as
/// "parameter unavailable".
pub trait ParameterSource {
    /// Look up a parameter by name. `Ok(None)` means the parameter is absent.
    fn get(&self, name: &str) -> Result<Option<String>>;
}

/// Parameter source backed by process environment variables.
///
/// Parameter names are upper-cased and prefixed, so `release_id` reads
/// `EDP_RELEASE_ID`.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvParameterSource;

impl ParameterSource for EnvParameterSource {
    fn get(&self, name: &str) -> Result<Option<String>> {
        let var = format!("EDP_{}", name.to_uppercase());
        Ok(std::env::var(var).ok())
    }
}

/// Parameter source holding a single fixed value, used for CLI overrides.
#[derive(Debug, Clone)]
pub struct StaticParameterSource {
    name: String,
    value: String,
}

impl StaticParameterSource {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl ParameterSource for StaticParameterSource {
    fn get(&self, name: &str) -> Result<Option<String>> {
        if name == self.name {
            Ok(Some(self.value.clone()))
        } else {
            Ok(None)
        }
    }
}

/// Resolve the release id to ingest.
///
/// Prefers the supplied parameter source; falls back to `default` when the
/// source is absent, errors, returns nothing, or returns a value that does
/// not parse as a positive integer. Never fails.
pub fn resolve_release_id(source: Option<&dyn ParameterSource>, default: i64) -> i64 {
    let Some(source) = source else {
        info!(release_id = default, "no parameter source, using default release id");
        return default;
    };

    match source.get(RELEASE_ID_PARAM) {
        Ok(Some(raw)) if !raw.trim().is_empty() => match raw.trim().parse::<i64>() {
            Ok(id) if id > 0 => {
                info!(release_id = id, "release id resolved from parameter source");
                id
            },
            _ => {
                warn!(
                    value = %raw,
                    release_id = default,
                    "unparseable release id parameter, using default"
                );
                default
            },
        },
        Ok(_) => {
            info!(release_id = default, "release id parameter absent, using default");
            default
        },
        Err(e) => {
            warn!(
                error = %e,
                release_id = default,
                "parameter source failed, using default release id"
            );
            default
        },
    }
}
