//! Error types for the repositories data source.

use thiserror::Error;

/// Errors that abort a read of the repositories data source.
///
/// None of these are recovered or retried locally. A failed read returns no
/// partial result.
#[derive(Debug, Error)]
pub enum DataSourceError {
    /// A filter is not a valid regular expression.
    #[error("not able to compile regex '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A page request against the organization listing failed.
    #[error("failed to list repositories for {org} (page {page}): {message}")]
    UpstreamFetch {
        org: String,
        page: u32,
        message: String,
    },

    /// The result could not be written into the host's record shape.
    #[error("not able to add repositories: {0}")]
    ResultAssignment(#[from] serde_json::Error),

    /// Missing or invalid settings for the read.
    #[error("invalid configuration: {0}")]
    Config(String),
}
