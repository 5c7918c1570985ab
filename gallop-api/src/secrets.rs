//! Secret lookup.
//!
//! A secret named `NAME` is read from the file at `NAME_FILE` when that
//! variable is set (Docker/Kubernetes secret mounts), otherwise from the
//! `NAME` variable itself.

use std::fs::read_to_string;

use crate::error::{ApiError, ApiResult};

/// Read a secret, preferring `{name}_FILE` over `{name}`.
///
/// Returns `Ok(None)` when neither is set. A `_FILE` variable that points
/// at an unreadable file is an error rather than a silent fallback.
pub fn read_secret(name: &str) -> ApiResult<Option<String>> {
    let file_var = format!("{name}_FILE");
    if let Ok(path) = std::env::var(&file_var) {
        return read_to_string(&path)
            .map(|s| Some(s.trim().to_string()))
            .map_err(|e| {
                tracing::warn!(secret = name, path = %path, "Failed to read secret file");
                ApiError::internal_error(format!("Failed to read {}: {}", file_var, e))
            });
    }
    Ok(std::env::var(name).ok())
}
