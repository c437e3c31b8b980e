//! Common error types for rsa-chat.

use thiserror::Error;

/// Result type alias using rsa-chat's error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for rsa-chat applications.
#[derive(Debug, Error)]
pub enum Error {
    /// Serialization/deserialization error
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// Cryptographic operation failed
    #[error("crypto error: {0}")]
    Crypto(String),
}

impl Error {
    /// Create a serialization error from any displayable type.
    pub fn serialization(msg: impl std::fmt::Display) -> Self {
        Self::Serialization(msg.to_string())
    }

    /// Create a config error from any displayable type.
    pub fn config(msg: impl std::fmt::Display) -> Self {
        Self::Config(msg.to_string())
    }

    /// Create a crypto error from any displayable type.
    pub fn crypto(msg: impl std::fmt::Display) -> Self {
        Self::Crypto(msg.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors_keep_message() {
        let err = Error::config("first and second peer names must differ");
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "configuration error: first and second peer names must differ"
        );

        let err = Error::crypto("decryption failed");
        assert_eq!(err.to_string(), "crypto error: decryption failed");
    }

    #[test]
    fn test_serialization_constructor() {
        let err = Error::serialization("unexpected end of input");
        assert!(matches!(err, Error::Serialization(_)));
    }
}
