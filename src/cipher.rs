//! Authenticated symmetric encryption (AES-256-GCM).
//!
//! The nonce is caller-supplied; uniqueness per key is the sealing
//! envelope's responsibility. Envelopes draw a fresh random 96-bit
//! nonce per encryption, accepting the birthday bound (safe for up to
//! around 2^32 messages per key, far beyond a per-message key's use).

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Nonce};
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{MailError, Result, KEY_SIZE, NONCE_SIZE, TAG_SIZE};

/// A 256-bit symmetric key.
///
/// Ephemeral: generated or derived per message, zeroed on drop, never
/// persisted.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey([u8; KEY_SIZE]);

impl SymmetricKey {
    /// Generates a fresh random key.
    pub fn generate<R: CryptoRngCore>(rng: &mut R) -> Self {
        let mut bytes = [0u8; KEY_SIZE];
        rng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    /// Wraps existing key bytes (e.g. an unwrapped or derived key).
    pub fn from_bytes(bytes: [u8; KEY_SIZE]) -> Self {
        Self(bytes)
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey(<redacted>)")
    }
}

/// Generates a fresh random 12-byte nonce.
pub fn generate_nonce<R: CryptoRngCore>(rng: &mut R) -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    rng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts plaintext, returning ciphertext and a detached 16-byte tag.
pub fn encrypt(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_SIZE],
    plaintext: &[u8],
) -> Result<(Vec<u8>, [u8; TAG_SIZE])> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| MailError::CryptoUnavailable(format!("Cipher init: {}", e)))?;

    // The aead API appends the tag; split it off so the wire can carry
    // it as a separate field.
    let mut sealed = cipher
        .encrypt(Nonce::from_slice(nonce), plaintext)
        .map_err(|_| MailError::CryptoUnavailable("AES-GCM encryption failed".to_string()))?;

    let boundary = sealed.len() - TAG_SIZE;
    let mut tag = [0u8; TAG_SIZE];
    tag.copy_from_slice(&sealed[boundary..]);
    sealed.truncate(boundary);

    Ok((sealed, tag))
}

/// Decrypts ciphertext, verifying the tag before releasing any bytes.
pub fn decrypt(
    key: &SymmetricKey,
    nonce: &[u8; NONCE_SIZE],
    ciphertext: &[u8],
    tag: &[u8; TAG_SIZE],
) -> Result<Vec<u8>> {
    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|e| MailError::CryptoUnavailable(format!("Cipher init: {}", e)))?;

    let mut sealed = Vec::with_capacity(ciphertext.len() + TAG_SIZE);
    sealed.extend_from_slice(ciphertext);
    sealed.extend_from_slice(tag);

    cipher
        .decrypt(Nonce::from_slice(nonce), sealed.as_slice())
        .map_err(|_| MailError::AuthenticationFailed)
}
