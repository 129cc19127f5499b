//! Error types for the runtime crate.

use thiserror::Error;

/// Result type for runtime operations.
pub type RuntimeResult<T> = Result<T, RuntimeError>;

/// Errors returned directly to callers of runtime helpers.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// A URL argument was empty.
    #[error("expected a URL")]
    MissingUrl,

    /// A relative URL was given but no base is available to resolve it against.
    #[error("resolving relative URL \"{0}\" requires a base URL")]
    UrlResolutionUnavailable(String),

    /// The URL could not be parsed.
    #[error("invalid URL \"{input}\": {source}")]
    InvalidUrl {
        /// The rejected input.
        input: String,
        /// The parser's reason.
        source: ::url::ParseError,
    },
}
