//! The wire-level mail envelope.
//!
//! An [`Envelope`] is the complete, immutable record produced by one
//! sealing operation: ciphertext plus every piece of metadata needed to
//! reverse it. It is a closed sum over the three algorithms so every
//! consumption site is forced through an exhaustive match; adding an
//! algorithm is a compile-time event, not a runtime string branch.
//!
//! Wire form is a JSON object tagged by `algorithm` (one of `RSA`,
//! `ECDH`, `PLAINTEXT`) with byte fields as padded standard base64:
//! `ciphertextBase64`, `ivBase64`, `authTagBase64`,
//! `encryptedKeyBase64`, `senderPublicKeyBase64`, `ephemPubBase64`.
//! Decoding rejects malformed input (bad base64, wrong field lengths,
//! wrong field set for the tag) before any cryptographic primitive is
//! invoked.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::types::{MailError, Result, NONCE_SIZE, TAG_SIZE};

/// Envelope produced by RSA key wrapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RsaEnvelope {
    /// AES-256-GCM ciphertext of the message body.
    pub ciphertext: Vec<u8>,
    /// Nonce used for the symmetric encryption. Unique per key.
    pub nonce: [u8; NONCE_SIZE],
    /// GCM authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// The symmetric key, RSA-OAEP-encrypted under the recipient's
    /// public key.
    pub wrapped_key: Vec<u8>,
    /// Sender's SPKI public key, if disclosed.
    pub sender_public_key: Option<Vec<u8>>,
}

/// Envelope produced by ECDH key agreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EcdhEnvelope {
    /// AES-256-GCM ciphertext of the message body.
    pub ciphertext: Vec<u8>,
    /// Nonce used for the symmetric encryption. Unique per key.
    pub nonce: [u8; NONCE_SIZE],
    /// GCM authentication tag.
    pub tag: [u8; TAG_SIZE],
    /// Sender's (ephemeral or static) raw P-256 point; the receiver
    /// recomputes the shared secret from it.
    pub sender_public_key: Vec<u8>,
}

/// A sealed (or deliberately unsealed) mail payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Envelope {
    /// Key-wrapping scheme: random key, OAEP-wrapped for the recipient.
    Rsa(RsaEnvelope),
    /// Key-agreement scheme: key derived from an ECDH shared secret.
    Ecdh(EcdhEnvelope),
    /// Demonstration mode: the body travels unencrypted. A decrypting
    /// client must never run cryptographic operations on this variant.
    Plaintext(String),
}

impl Envelope {
    /// The literal algorithm tag carried on the wire.
    pub fn algorithm_tag(&self) -> &'static str {
        match self {
            Envelope::Rsa(_) => crate::types::ALGORITHM_RSA,
            Envelope::Ecdh(_) => crate::types::ALGORITHM_ECDH,
            Envelope::Plaintext(_) => crate::types::ALGORITHM_PLAINTEXT,
        }
    }

    /// Encodes the envelope to its JSON wire form.
    pub fn to_json(&self) -> Result<String> {
        let wire = match self {
            Envelope::Rsa(env) => WireEnvelope::Rsa {
                ciphertext_base64: STANDARD.encode(&env.ciphertext),
                iv_base64: STANDARD.encode(env.nonce),
                auth_tag_base64: STANDARD.encode(env.tag),
                encrypted_key_base64: STANDARD.encode(&env.wrapped_key),
                sender_public_key_base64: env
                    .sender_public_key
                    .as_ref()
                    .map(|key| STANDARD.encode(key)),
            },
            Envelope::Ecdh(env) => WireEnvelope::Ecdh {
                ciphertext_base64: STANDARD.encode(&env.ciphertext),
                iv_base64: STANDARD.encode(env.nonce),
                auth_tag_base64: STANDARD.encode(env.tag),
                ephem_pub_base64: STANDARD.encode(&env.sender_public_key),
            },
            Envelope::Plaintext(body) => WireEnvelope::Plaintext {
                ciphertext: body.clone(),
            },
        };

        serde_json::to_string(&wire)
            .map_err(|e| MailError::InvalidEnvelope(format!("JSON encode: {}", e)))
    }

    /// Decodes and validates the JSON wire form.
    pub fn from_json(text: &str) -> Result<Self> {
        let wire: WireEnvelope = serde_json::from_str(text)
            .map_err(|e| MailError::InvalidEnvelope(format!("JSON decode: {}", e)))?;

        match wire {
            WireEnvelope::Rsa {
                ciphertext_base64,
                iv_base64,
                auth_tag_base64,
                encrypted_key_base64,
                sender_public_key_base64,
            } => {
                let wrapped_key = decode_field("encryptedKeyBase64", &encrypted_key_base64)?;
                if wrapped_key.is_empty() {
                    return Err(MailError::InvalidEnvelope(
                        "encryptedKeyBase64 must not be empty".to_string(),
                    ));
                }
                let sender_public_key = sender_public_key_base64
                    .as_deref()
                    .map(|text| decode_field("senderPublicKeyBase64", text))
                    .transpose()?;

                Ok(Envelope::Rsa(RsaEnvelope {
                    ciphertext: decode_field("ciphertextBase64", &ciphertext_base64)?,
                    nonce: decode_nonce(&iv_base64)?,
                    tag: decode_tag(&auth_tag_base64)?,
                    wrapped_key,
                    sender_public_key,
                }))
            }
            WireEnvelope::Ecdh {
                ciphertext_base64,
                iv_base64,
                auth_tag_base64,
                ephem_pub_base64,
            } => Ok(Envelope::Ecdh(EcdhEnvelope {
                ciphertext: decode_field("ciphertextBase64", &ciphertext_base64)?,
                nonce: decode_nonce(&iv_base64)?,
                tag: decode_tag(&auth_tag_base64)?,
                sender_public_key: decode_field("ephemPubBase64", &ephem_pub_base64)?,
            })),
            WireEnvelope::Plaintext { ciphertext } => Ok(Envelope::Plaintext(ciphertext)),
        }
    }
}

/// Serde-facing wire representation.
#[derive(Serialize, Deserialize)]
#[serde(tag = "algorithm")]
enum WireEnvelope {
    #[serde(rename = "RSA", rename_all = "camelCase")]
    Rsa {
        ciphertext_base64: String,
        iv_base64: String,
        auth_tag_base64: String,
        encrypted_key_base64: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        sender_public_key_base64: Option<String>,
    },
    #[serde(rename = "ECDH", rename_all = "camelCase")]
    Ecdh {
        ciphertext_base64: String,
        iv_base64: String,
        auth_tag_base64: String,
        ephem_pub_base64: String,
    },
    /// The `ciphertext` field holds the raw body text in this mode.
    #[serde(rename = "PLAINTEXT")]
    Plaintext { ciphertext: String },
}

fn decode_field(field: &str, value: &str) -> Result<Vec<u8>> {
    STANDARD
        .decode(value)
        .map_err(|e| MailError::InvalidEnvelope(format!("{}: invalid base64: {}", field, e)))
}

fn decode_nonce(value: &str) -> Result<[u8; NONCE_SIZE]> {
    let bytes = decode_field("ivBase64", value)?;
    bytes.try_into().map_err(|_| {
        MailError::InvalidEnvelope(format!("ivBase64 must decode to {} bytes", NONCE_SIZE))
    })
}

fn decode_tag(value: &str) -> Result<[u8; TAG_SIZE]> {
    let bytes = decode_field("authTagBase64", value)?;
    bytes.try_into().map_err(|_| {
        MailError::InvalidEnvelope(format!("authTagBase64 must decode to {} bytes", TAG_SIZE))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_rsa() -> Envelope {
        Envelope::Rsa(RsaEnvelope {
            ciphertext: vec![1u8; 24],
            nonce: [2u8; NONCE_SIZE],
            tag: [3u8; TAG_SIZE],
            wrapped_key: vec![4u8; 256],
            sender_public_key: None,
        })
    }

    fn sample_ecdh() -> Envelope {
        Envelope::Ecdh(EcdhEnvelope {
            ciphertext: vec![5u8; 24],
            nonce: [6u8; NONCE_SIZE],
            tag: [7u8; TAG_SIZE],
            sender_public_key: vec![8u8; 65],
        })
    }

    #[test]
    fn test_wire_roundtrip_all_variants() {
        for envelope in [
            sample_rsa(),
            sample_ecdh(),
            Envelope::Plaintext("postcard".to_string()),
        ] {
            let json = envelope.to_json().unwrap();
            assert_eq!(Envelope::from_json(&json).unwrap(), envelope);
        }
    }

    #[test]
    fn test_wire_field_names() {
        let json = sample_rsa().to_json().unwrap();
        assert!(json.contains(r#""algorithm":"RSA""#));
        assert!(json.contains("ciphertextBase64"));
        assert!(json.contains("ivBase64"));
        assert!(json.contains("authTagBase64"));
        assert!(json.contains("encryptedKeyBase64"));
        // Undisclosed sender key is omitted, not null.
        assert!(!json.contains("senderPublicKeyBase64"));

        let json = sample_ecdh().to_json().unwrap();
        assert!(json.contains(r#""algorithm":"ECDH""#));
        assert!(json.contains("ephemPubBase64"));
    }

    #[test]
    fn test_unknown_algorithm_rejected() {
        let result = Envelope::from_json(r#"{"algorithm":"3DES","ciphertext":"x"}"#);
        assert!(matches!(result, Err(MailError::InvalidEnvelope(_))));
    }

    #[test]
    fn test_wrong_field_set_rejected() {
        // RSA tag without the wrapped key must fail before any crypto.
        let json = r#"{"algorithm":"RSA","ciphertextBase64":"AA==","ivBase64":"AAAAAAAAAAAAAAAA","authTagBase64":"AAAAAAAAAAAAAAAAAAAAAA=="}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(MailError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_wrong_nonce_length_rejected() {
        let mut envelope = match sample_ecdh() {
            Envelope::Ecdh(env) => env,
            _ => unreachable!(),
        };
        envelope.ciphertext = vec![0u8; 4];
        let json = Envelope::Ecdh(envelope).to_json().unwrap();
        // Swap the 12-byte iv for an 8-byte one.
        let short_iv = base64::engine::general_purpose::STANDARD.encode([0u8; 8]);
        let json = json.replace(
            &format!(
                r#""ivBase64":"{}""#,
                base64::engine::general_purpose::STANDARD.encode([6u8; NONCE_SIZE])
            ),
            &format!(r#""ivBase64":"{}""#, short_iv),
        );
        assert!(matches!(
            Envelope::from_json(&json),
            Err(MailError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_bad_base64_rejected() {
        let json = r#"{"algorithm":"ECDH","ciphertextBase64":"!!","ivBase64":"AAAAAAAAAAAAAAAA","authTagBase64":"AAAAAAAAAAAAAAAAAAAAAA==","ephemPubBase64":"AA=="}"#;
        assert!(matches!(
            Envelope::from_json(json),
            Err(MailError::InvalidEnvelope(_))
        ));
    }

    #[test]
    fn test_plaintext_carries_raw_body() {
        let json = Envelope::Plaintext("hello, unencrypted".to_string())
            .to_json()
            .unwrap();
        assert!(json.contains(r#""ciphertext":"hello, unencrypted""#));
    }
}
