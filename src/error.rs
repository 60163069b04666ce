use thiserror::Error;

/// Failure taxonomy for catalog loading and content resolution.
///
/// Content-resolution callers recover `Fetch`, `Parse` and `Io` locally as a
/// boolean "this piece is unavailable"; only catalog-load-time failures are
/// fatal to the process.
#[derive(Debug, Error)]
pub enum Error {
    /// Network or transport failure reaching an upstream resource.
    #[error("fetch failed for {url}: {reason}")]
    Fetch { url: String, reason: String },

    /// Malformed catalog listing or unexpected API response shape.
    #[error("parse error: {0}")]
    Parse(String),

    /// Local cache-file write failure.
    #[error("cache write failed: {0}")]
    Io(#[from] std::io::Error),

    /// Empty query text; surfaced to the user as "not understood".
    #[error("query not understood")]
    NotFound,
}
