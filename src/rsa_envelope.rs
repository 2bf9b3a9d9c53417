//! RSA key-wrapping envelope scheme.
//!
//! Sealing generates a fresh random AES-256 key, encrypts the payload
//! under a fresh nonce, and wraps the key with RSA-OAEP (SHA-256) under
//! the recipient's public key. Opening reverses the transform with the
//! recipient's long-term private key.
//!
//! Any OAEP failure on open collapses to [`MailError::KeyUnwrapFailed`]
//! with no cause attached; distinguishing padding from length failures
//! would hand a padding oracle to whoever can observe the error.

use rand_core::CryptoRngCore;
use rsa::Oaep;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::cipher::{self, SymmetricKey};
use crate::envelope::RsaEnvelope;
use crate::keys::{self, PrivateKeyMaterial, PublicKeyMaterial};
use crate::types::{MailError, Result, KEY_SIZE};

/// Seals a payload for the holder of `recipient_public`.
///
/// The sender's own public key may be attached for display or later
/// verification; it plays no part in decryption.
pub fn seal<R: CryptoRngCore>(
    rng: &mut R,
    plaintext: &[u8],
    recipient_public: &PublicKeyMaterial,
    sender_public: Option<&PublicKeyMaterial>,
) -> Result<RsaEnvelope> {
    let recipient_key = keys::rsa_public_key(recipient_public)?;

    let key = SymmetricKey::generate(rng);
    let nonce = cipher::generate_nonce(rng);
    let (ciphertext, tag) = cipher::encrypt(&key, &nonce, plaintext)?;

    let wrapped_key = recipient_key
        .encrypt(rng, Oaep::new::<Sha256>(), key.as_bytes())
        .map_err(|e| MailError::CryptoUnavailable(format!("OAEP wrap: {}", e)))?;

    Ok(RsaEnvelope {
        ciphertext,
        nonce,
        tag,
        wrapped_key,
        sender_public_key: sender_public.map(|material| material.bytes.clone()),
    })
}

/// Opens an envelope with the recipient's private key.
///
/// Fails with [`MailError::KeyUnwrapFailed`] if the wrapped key does
/// not unwrap, and [`MailError::AuthenticationFailed`] if the GCM tag
/// does not verify. Neither failure is retryable.
pub fn open(envelope: &RsaEnvelope, recipient_private: &PrivateKeyMaterial) -> Result<Vec<u8>> {
    let private_key = keys::rsa_private_key(recipient_private)?;

    let key_bytes = Zeroizing::new(
        private_key
            .decrypt(Oaep::new::<Sha256>(), &envelope.wrapped_key)
            .map_err(|_| MailError::KeyUnwrapFailed)?,
    );
    if key_bytes.len() != KEY_SIZE {
        return Err(MailError::KeyUnwrapFailed);
    }

    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(&key_bytes);
    let key = SymmetricKey::from_bytes(key);

    cipher::decrypt(&key, &envelope.nonce, &envelope.ciphertext, &envelope.tag)
}
