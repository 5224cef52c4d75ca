//! Text-safe encoding of credential public keys.
//!
//! Keys stay binary in memory and are only base64-encoded at the storage
//! boundary.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine};

use crate::error::CodecError;

/// Encode raw public key bytes as padded standard base64.
pub fn encode_public_key(bytes: &[u8]) -> String {
    BASE64.encode(bytes)
}

/// Decode a public key produced by [`encode_public_key`].
pub fn decode_public_key(text: &str) -> Result<Vec<u8>, CodecError> {
    BASE64
        .decode(text)
        .map_err(|e| CodecError::InvalidBase64(e.to_string()))
}
