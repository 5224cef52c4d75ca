//! Storage key layout.
//!
//! Keys take the form `{prefix}:{rp_id}:{identifier}`. The relying-party id
//! may not contain `:`, so the first delimiter after the prefix always ends
//! it and identifiers are free to contain `:` themselves.

use crate::error::{Result, StoreError};

const DELIMITER: char = ':';

/// Key for the live challenge of a user at a relying party.
pub fn challenge_key(rp_id: &str, identifier: &str) -> Result<String> {
    compose("challenge", rp_id, identifier)
}

/// Key for the credential record of a user at a relying party.
pub fn user_key(rp_id: &str, identifier: &str) -> Result<String> {
    compose("user", rp_id, identifier)
}

fn compose(prefix: &str, rp_id: &str, identifier: &str) -> Result<String> {
    if rp_id.is_empty() {
        return Err(StoreError::InvalidKey("relying party id is empty".into()));
    }
    if rp_id.contains(DELIMITER) {
        return Err(StoreError::InvalidKey(format!(
            "relying party id {rp_id:?} contains '{DELIMITER}'"
        )));
    }
    if identifier.is_empty() {
        return Err(StoreError::InvalidKey("identifier is empty".into()));
    }
    Ok(format!("{prefix}{DELIMITER}{rp_id}{DELIMITER}{identifier}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_layout() {
        assert_eq!(
            challenge_key("example.com", "alice").unwrap(),
            "challenge:example.com:alice"
        );
        assert_eq!(
            user_key("example.com", "alice").unwrap(),
            "user:example.com:alice"
        );
    }

    #[test]
    fn test_identifier_may_contain_delimiter() {
        let a = challenge_key("example.com", "a:b").unwrap();
        let b = challenge_key("example.com:a", "b");
        assert_eq!(a, "challenge:example.com:a:b");
        // The colliding composition is rejected instead of aliasing
        assert!(b.is_err());
    }

    #[test]
    fn test_rejects_empty_components() {
        assert!(matches!(
            challenge_key("", "alice"),
            Err(StoreError::InvalidKey(_))
        ));
        assert!(matches!(
            user_key("example.com", ""),
            Err(StoreError::InvalidKey(_))
        ));
    }
}
