//! Remote call failures

/// Why a remote call did not succeed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    /// Still throttled after the allowed attempts
    #[error("rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    /// A 4xx other than 429; never retried
    #[error("request rejected ({status}): {message}")]
    Rejected { status: u16, message: String },

    /// 5xx or network failure after the allowed attempts
    #[error("platform unavailable after {attempts} attempts: {message}")]
    Unavailable { attempts: u32, message: String },

    /// A successful response that cannot be interpreted
    #[error("unexpected response: {message}")]
    InvalidResponse { message: String },

    /// Shutdown was requested while waiting to retry
    #[error("interrupted")]
    Interrupted,
}
