use thiserror::Error;

/// Failure decoding text-encoded key material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    #[error("invalid base64 public key: {0}")]
    InvalidBase64(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    /// Connection, protocol or timeout failure from the key-value backend.
    #[error("backend {op} failed for key {key}: {message}")]
    Backend {
        op: &'static str,
        key: String,
        message: String,
    },

    /// A stored value could not be decoded (not UTF-8, or a malformed credential record).
    #[error("malformed record at {key}: {reason}")]
    Decode { key: String, reason: String },

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("invalid key component: {0}")]
    InvalidKey(String),

    #[error("configuration error: {0}")]
    Config(String),
}

impl StoreError {
    pub(crate) fn backend(op: &'static str, key: &str, message: impl ToString) -> Self {
        Self::Backend {
            op,
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub(crate) fn decode(key: &str, reason: impl ToString) -> Self {
        Self::Decode {
            key: key.to_string(),
            reason: reason.to_string(),
        }
    }

    /// True when the failure came from the backend rather than from stored data.
    pub fn is_backend(&self) -> bool {
        matches!(self, Self::Backend { .. })
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_error_names_operation_and_key() {
        let err = StoreError::backend("get", "challenge:example.com:alice", "connection refused");
        let msg = err.to_string();
        assert!(msg.contains("get"));
        assert!(msg.contains("challenge:example.com:alice"));
        assert!(msg.contains("connection refused"));
        assert!(err.is_backend());
    }

    #[test]
    fn test_decode_error_is_not_backend() {
        let err = StoreError::decode("user:example.com:alice", "expected value");
        assert!(!err.is_backend());
        assert!(err.to_string().starts_with("malformed record at user:example.com:alice"));
    }
}
