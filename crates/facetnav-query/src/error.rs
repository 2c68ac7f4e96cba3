//! Query layer error types.

use thiserror::Error;

/// Errors raised when selecting a page profile.
///
/// Query-string decoding itself never fails; malformed values degrade to
/// absent instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProfileError {
    /// No built-in profile has this name.
    #[error("Unknown page kind: {0}")]
    UnknownPage(String),
}
