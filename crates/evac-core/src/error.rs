//! Core error type.
//!
//! Sub-crates define their own error enums and wrap `EvError` as one variant
//! via `#[from]`, so configuration failures surface unchanged.

use thiserror::Error;

/// The top-level error type for `evac-core`.
#[derive(Debug, Error)]
pub enum EvError {
    #[error("configuration error: {0}")]
    Config(String),
}

/// Shorthand result type for `evac-core`.
pub type EvResult<T> = Result<T, EvError>;
