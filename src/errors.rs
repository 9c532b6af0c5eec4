//! Upstream error taxonomy.
//!
//! The read API itself is infallible (cache reads with default-fallback
//! query parsing), so errors only flow through the SimpleAQ client and the
//! refresh cycle, where they are logged and absorbed.

#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    #[error("upstream request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("upstream returned HTTP {0}")]
    Status(reqwest::StatusCode),

    #[error("upstream response malformed: {0}")]
    Malformed(String),
}
