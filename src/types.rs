//! Type definitions and protocol constants for sealmail.

use thiserror::Error;

/// Size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// Size of the AES-GCM authentication tag in bytes.
pub const TAG_SIZE: usize = 16;

/// Size of a symmetric key in bytes (AES-256).
pub const KEY_SIZE: usize = 32;

/// Minimum RSA modulus size in bits.
pub const RSA_MODULUS_BITS: usize = 2048;

/// Size of an uncompressed SEC1 P-256 point in bytes (0x04 || x || y).
pub const EC_POINT_SIZE: usize = 65;

/// Wire tag for RSA key-wrapping envelopes.
pub const ALGORITHM_RSA: &str = "RSA";

/// Wire tag for ECDH key-agreement envelopes.
pub const ALGORITHM_ECDH: &str = "ECDH";

/// Wire tag for the unencrypted fallback.
pub const ALGORITHM_PLAINTEXT: &str = "PLAINTEXT";

/// Errors that can occur during sealmail operations.
///
/// `KeyUnwrapFailed` and `AuthenticationFailed` intentionally carry no
/// cause: both render as the same generic message so a caller relaying
/// them cannot become a padding or tag oracle.
#[derive(Error, Debug)]
pub enum MailError {
    // Key errors
    /// Key bytes failed structural validation (base64, ASN.1, point format).
    #[error("Malformed key: {0}")]
    MalformedKey(String),

    /// The underlying cryptographic primitive is unavailable or failed.
    #[error("Crypto primitive unavailable: {0}")]
    CryptoUnavailable(String),

    /// A curve other than P-256 was requested.
    #[error("Unsupported curve: {0}")]
    UnsupportedCurve(String),

    /// Unknown or mismatched algorithm tag.
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),

    // Decrypt errors
    /// RSA-OAEP unwrap of the symmetric key failed.
    #[error("decryption failed")]
    KeyUnwrapFailed,

    /// GCM tag verification failed.
    #[error("decryption failed")]
    AuthenticationFailed,

    // Envelope errors
    /// Wire-level envelope rejection, raised before any primitive runs.
    #[error("Invalid envelope: {0}")]
    InvalidEnvelope(String),

    /// Failed to interpret decrypted bytes as text.
    #[error("Encoding failed: {0}")]
    EncodingError(String),

    // Directory errors
    /// No such identity in the key directory.
    #[error("Identity not found: {0}")]
    IdentityNotFound(String),

    /// The identity exists but has not published a key for the algorithm.
    #[error("No key published for identity: {0}")]
    KeyNotPublished(String),

    // Storage errors
    /// Mail not found in the message store.
    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// Storage operation failed.
    #[error("Storage failed: {0}")]
    StorageFailed(String),
}

pub type Result<T> = std::result::Result<T, MailError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrypt_errors_collapse_to_one_message() {
        // Neither variant may reveal which stage of decryption failed.
        assert_eq!(
            MailError::KeyUnwrapFailed.to_string(),
            MailError::AuthenticationFailed.to_string()
        );
        assert_eq!(
            MailError::AuthenticationFailed.to_string(),
            "decryption failed"
        );
    }
}
