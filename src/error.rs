//! Error type definitions
//!
//! Provides all possible error types in the Postdate service.

/// Result type alias for Postdate
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the Postdate service
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input validation errors at capsule creation
    #[error("validation error: {0}")]
    Validation(String),

    /// Recipient address rejected before any transport attempt
    #[error("invalid recipient address: {0}")]
    InvalidAddress(String),

    /// Mail transport failures (unreachable relay, auth rejection, bounce)
    #[error("transport error: {0}")]
    Transport(String),

    /// Storage failures outside of Redis itself
    #[error("store error: {0}")]
    Store(String),

    /// Serialization/deserialization errors
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Redis-related errors
    #[error("redis error: {0}")]
    Redis(#[from] fred::error::RedisError),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Check whether the error is a failed delivery attempt.
    ///
    /// Delivery failures are recovered by the attempt engine (failure
    /// counter, eventual permanent failure) rather than propagated. Every
    /// other class aborts or skips work at the scheduler level instead.
    pub fn is_delivery_failure(&self) -> bool {
        matches!(self, Error::InvalidAddress(_) | Error::Transport(_))
    }

    /// Check whether the error came from the persistence layer
    pub fn is_store_failure(&self) -> bool {
        matches!(
            self,
            Error::Store(_) | Error::Redis(_) | Error::Serialization(_)
        )
    }
}
