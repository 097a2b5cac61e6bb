//! Gateway error types.
//!
//! These represent failures when talking to the generative-AI boundary.
//! Defined in `engvantage-core` so the session controller can classify
//! failures without string matching.

use thiserror::Error;

/// Errors that can occur when interacting with the content gateway.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The API returned a 429 rate limit response.
    #[error("rate limited: {message}")]
    RateLimited { message: String },

    /// Authentication failed (invalid or missing API key).
    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    /// The API returned an error response.
    #[error("API error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),

    /// A speech response carried no audio payload.
    #[error("response contained no audio payload")]
    MissingAudio,
}

impl GatewayError {
    /// Returns `true` if this failure will not go away by itself (the user
    /// has to fix credentials rather than retry).
    pub fn is_permanent(&self) -> bool {
        matches!(self, GatewayError::AuthenticationFailed(_))
    }
}
