//! ECDH key-agreement envelope scheme.
//!
//! Sealing computes the P-256 shared secret between the sender's
//! private key and the recipient's public key and uses it as the AES
//! key, encrypting under a fresh nonce. The sender's public point rides
//! in the envelope so the receiver can recompute the same secret:
//! ECDH(a, B) == ECDH(b, A) for any valid pairs on the curve.
//!
//! The raw 32-byte shared secret (the point's x-coordinate) is used
//! directly as the AES-256 key. That is the established wire convention
//! this crate matches; a hardened variant would insert an HKDF step
//! here, at the cost of compatibility with existing envelopes.

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::CryptoRngCore;

use crate::cipher::{self, SymmetricKey};
use crate::envelope::EcdhEnvelope;
use crate::keys::{self, PrivateKeyMaterial, PublicKeyMaterial};
use crate::types::{MailError, Result, KEY_SIZE};

/// Seals a payload using the sender's (ephemeral or static) private
/// key and the recipient's public key.
pub fn seal<R: CryptoRngCore>(
    rng: &mut R,
    plaintext: &[u8],
    sender_private: &PrivateKeyMaterial,
    recipient_public: &PublicKeyMaterial,
) -> Result<EcdhEnvelope> {
    let sender_secret = keys::p256_secret_key(sender_private)?;
    let recipient_key = keys::p256_public_key(recipient_public)?;

    let key = shared_key(&sender_secret, &recipient_key);
    let nonce = cipher::generate_nonce(rng);
    let (ciphertext, tag) = cipher::encrypt(&key, &nonce, plaintext)?;

    Ok(EcdhEnvelope {
        ciphertext,
        nonce,
        tag,
        sender_public_key: sender_secret
            .public_key()
            .to_encoded_point(false)
            .as_bytes()
            .to_vec(),
    })
}

/// Opens an envelope by recomputing the shared secret from the
/// receiver's private key and the attached sender point.
pub fn open(envelope: &EcdhEnvelope, receiver_private: &PrivateKeyMaterial) -> Result<Vec<u8>> {
    let receiver_secret = keys::p256_secret_key(receiver_private)?;
    let sender_public = p256::PublicKey::from_sec1_bytes(&envelope.sender_public_key)
        .map_err(|e| MailError::MalformedKey(format!("sender point: {}", e)))?;

    let key = shared_key(&receiver_secret, &sender_public);

    cipher::decrypt(&key, &envelope.nonce, &envelope.ciphertext, &envelope.tag)
}

fn shared_key(secret: &p256::SecretKey, public: &p256::PublicKey) -> SymmetricKey {
    let shared = p256::ecdh::diffie_hellman(secret.to_nonzero_scalar(), public.as_affine());
    let mut key = [0u8; KEY_SIZE];
    key.copy_from_slice(shared.raw_secret_bytes().as_slice());
    SymmetricKey::from_bytes(key)
}
