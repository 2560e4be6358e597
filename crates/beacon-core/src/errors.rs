//! Unified error system for Beacon
//!
//! A single error type shared by every Beacon crate. Variants carry a human
//! readable message; callers match on the variant to decide how to react.

use serde::{Deserialize, Serialize};

/// Unified error type for all Beacon operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum BeaconError {
    /// Payload encoding or decoding failed
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Envelope bytes do not follow the wire framing
    #[error("Invalid envelope: {message}")]
    InvalidEnvelope {
        /// Error message describing the framing violation
        message: String,
    },

    /// Transport failed to deliver an envelope
    #[error("Transport error: {message}")]
    Transport {
        /// Error message describing the delivery failure
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration issue
        message: String,
    },

    /// The host runtime refused a lifecycle operation
    #[error("Runtime error: {message}")]
    Runtime {
        /// Error message describing the refused operation
        message: String,
    },

    /// Internal system error
    #[error("Internal error: {message}")]
    Internal {
        /// Error message describing the internal error
        message: String,
    },
}

impl BeaconError {
    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create an invalid envelope error
    pub fn invalid_envelope(message: impl Into<String>) -> Self {
        Self::InvalidEnvelope {
            message: message.into(),
        }
    }

    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a runtime error
    pub fn runtime(message: impl Into<String>) -> Self {
        Self::Runtime {
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Standard Result type for Beacon operations
pub type Result<T> = std::result::Result<T, BeaconError>;

impl From<std::io::Error> for BeaconError {
    fn from(err: std::io::Error) -> Self {
        match err.kind() {
            std::io::ErrorKind::UnexpectedEof | std::io::ErrorKind::InvalidData => {
                Self::invalid_envelope(err.to_string())
            }
            _ => Self::internal(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for BeaconError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

impl From<toml::de::Error> for BeaconError {
    fn from(err: toml::de::Error) -> Self {
        Self::config(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = BeaconError::transport("connection refused");
        assert!(matches!(err, BeaconError::Transport { .. }));
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "short read");
        assert!(matches!(
            BeaconError::from(io_err),
            BeaconError::InvalidEnvelope { .. }
        ));

        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed");
        assert!(matches!(
            BeaconError::from(io_err),
            BeaconError::Internal { .. }
        ));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u32>("not json").unwrap_err();
        assert!(matches!(
            BeaconError::from(json_err),
            BeaconError::Serialization { .. }
        ));
    }
}
