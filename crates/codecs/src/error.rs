//! Error types for the codec capability registry

use thiserror::Error;

/// Result type alias for registry operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the capability registry and module loading
#[derive(Debug, Error)]
pub enum Error {
    /// Registry lifecycle misuse, e.g. selecting modules after initialization
    #[error("Illegal registry state: {0}")]
    IllegalState(String),

    /// A module backend failed to load or introspect
    #[error("Module load failed: {0}")]
    ModuleLoad(String),

    /// A module declined to produce a spec for a pair it declared
    #[error("Spec unavailable: {0}")]
    SpecUnavailable(String),

    /// A module's teardown entry point failed
    #[error("Module teardown failed: {0}")]
    Teardown(String),
}
