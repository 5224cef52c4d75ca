//! Exit codes following sysexits.h conventions.
//!
//! These codes let scripts tell a missing entry apart from a broken
//! backend or a corrupt record.

use passkey_store_core::StoreError;
use thiserror::Error;

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// General error (catch-all).
pub const GENERAL_ERROR: i32 = 1;

/// Invalid relying party id or identifier.
/// Maps to EX_USAGE from sysexits.h.
pub const USAGE_ERROR: i32 = 64;

/// Stored record could not be decoded.
/// Maps to EX_DATAERR from sysexits.h.
pub const DATA_ERROR: i32 = 65;

/// Requested challenge or credential does not exist.
/// Maps to EX_NOINPUT from sysexits.h.
pub const NOT_FOUND: i32 = 66;

/// Backend unreachable or timed out.
/// Maps to EX_UNAVAILABLE from sysexits.h.
pub const BACKEND_UNAVAILABLE: i32 = 69;

/// Invalid configuration.
/// Maps to EX_CONFIG from sysexits.h.
pub const CONFIG_ERROR: i32 = 78;

/// Returned by commands when the requested entry is absent.
#[derive(Debug, Error)]
#[error("{0}")]
pub struct NotFound(pub String);

/// Represents an exit code with optional error context.
pub struct ExitCode {
    pub code: i32,
    pub message: Option<String>,
}

impl ExitCode {
    pub const fn success() -> Self {
        Self {
            code: SUCCESS,
            message: None,
        }
    }

    pub fn from_anyhow(err: &anyhow::Error) -> Self {
        let message = format!("{err:#}");

        let code = if err.downcast_ref::<NotFound>().is_some() {
            NOT_FOUND
        } else if let Some(store_err) = err.downcast_ref::<StoreError>() {
            match store_err {
                StoreError::Backend { .. } => BACKEND_UNAVAILABLE,
                StoreError::Decode { .. } => DATA_ERROR,
                StoreError::InvalidKey(_) => USAGE_ERROR,
                StoreError::Config(_) => CONFIG_ERROR,
                StoreError::Serialization(_) => GENERAL_ERROR,
            }
        } else {
            GENERAL_ERROR
        };

        Self {
            code,
            message: Some(message),
        }
    }
}
