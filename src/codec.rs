//! Transport encoding for key material.
//!
//! Keys travel as standard base64 text. Decoding validates structure
//! only (base64, ASN.1, point length); it never judges cryptographic
//! strength of the decoded key.

use base64::{engine::general_purpose::STANDARD, Engine};

use crate::keys::{self, KeyAlgorithm, PrivateKeyMaterial, PublicKeyMaterial};
use crate::types::{MailError, Result, EC_POINT_SIZE};

/// Encodes public key material to base64 transport text.
pub fn encode_public_key(material: &PublicKeyMaterial) -> String {
    STANDARD.encode(&material.bytes)
}

/// Encodes private key material to base64 transport text.
pub fn encode_private_key(material: &PrivateKeyMaterial) -> String {
    STANDARD.encode(&material.bytes)
}

/// Decodes and structurally validates a public key.
///
/// RSA keys must parse as SPKI DER; ECDH keys must be a 65-byte
/// uncompressed SEC1 point on P-256.
pub fn decode_public_key(text: &str, algorithm: KeyAlgorithm) -> Result<PublicKeyMaterial> {
    let bytes = decode_base64(text)?;

    let material = PublicKeyMaterial { algorithm, bytes };

    match algorithm {
        KeyAlgorithm::Rsa => {
            keys::rsa_public_key(&material)?;
        }
        KeyAlgorithm::EcdhP256 => {
            if material.bytes.len() != EC_POINT_SIZE {
                return Err(MailError::MalformedKey(format!(
                    "P-256 point must be {} bytes, got {}",
                    EC_POINT_SIZE,
                    material.bytes.len()
                )));
            }
            keys::p256_public_key(&material)?;
        }
    }

    Ok(material)
}

/// Decodes and structurally validates a PKCS#8 private key.
pub fn decode_private_key(text: &str, algorithm: KeyAlgorithm) -> Result<PrivateKeyMaterial> {
    let bytes = decode_base64(text)?;

    let material = PrivateKeyMaterial { algorithm, bytes };

    match algorithm {
        KeyAlgorithm::Rsa => {
            keys::rsa_private_key(&material)?;
        }
        KeyAlgorithm::EcdhP256 => {
            keys::p256_secret_key(&material)?;
        }
    }

    Ok(material)
}

fn decode_base64(text: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(text)
        .map_err(|e| MailError::MalformedKey(format!("Invalid base64: {}", e)))
}
