//! Key material model and key-pair generation for sealmail.
//!
//! Two establishment schemes are supported: RSA-OAEP key wrapping
//! (2048-bit modulus, e = 65537, SHA-256 configured at use time) and
//! ECDH key agreement on P-256. Key bytes use the interchange formats
//! of the wire contract: SPKI DER for RSA public keys, an uncompressed
//! SEC1 point for ECDH public keys, and PKCS#8 DER for private keys.
//!
//! Every generation function takes the secure random source as an
//! explicit argument so tests can substitute a seeded CSPRNG.

use std::fmt;
use std::str::FromStr;

use p256::elliptic_curve::sec1::ToEncodedPoint;
use rand_core::CryptoRngCore;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::types::{MailError, Result, RSA_MODULUS_BITS};

/// Algorithm of a piece of key material.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    /// RSA for OAEP key wrapping.
    Rsa,
    /// Elliptic-curve Diffie-Hellman on P-256.
    EcdhP256,
}

impl KeyAlgorithm {
    /// Stable text tag for this algorithm.
    pub fn tag(&self) -> &'static str {
        match self {
            KeyAlgorithm::Rsa => "RSA",
            KeyAlgorithm::EcdhP256 => "ECDH-P256",
        }
    }
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for KeyAlgorithm {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "RSA" => Ok(KeyAlgorithm::Rsa),
            "ECDH-P256" => Ok(KeyAlgorithm::EcdhP256),
            other => Err(MailError::UnsupportedAlgorithm(other.to_string())),
        }
    }
}

/// A named elliptic curve for ECDH key generation.
///
/// Only P-256 is supported; parsing any other WebCrypto curve name
/// fails with [`MailError::UnsupportedCurve`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedCurve {
    /// NIST P-256 (secp256r1).
    P256,
}

impl FromStr for NamedCurve {
    type Err = MailError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "P-256" => Ok(NamedCurve::P256),
            other => Err(MailError::UnsupportedCurve(other.to_string())),
        }
    }
}

/// The shareable half of a key pair.
///
/// `bytes` is SPKI DER for RSA and a 65-byte uncompressed SEC1 point
/// for ECDH P-256.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublicKeyMaterial {
    /// Algorithm this key belongs to.
    pub algorithm: KeyAlgorithm,
    /// Encoded key bytes.
    pub bytes: Vec<u8>,
}

/// The secret half of a key pair, PKCS#8 DER encoded.
///
/// Zeroed on drop. Must never be logged or transmitted.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial {
    /// Algorithm this key belongs to.
    #[zeroize(skip)]
    pub algorithm: KeyAlgorithm,
    /// PKCS#8 DER bytes.
    pub bytes: Vec<u8>,
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PrivateKeyMaterial")
            .field("algorithm", &self.algorithm)
            .field("bytes", &"<redacted>")
            .finish()
    }
}

/// A public/private key pair of a single algorithm.
#[derive(Debug, Clone)]
pub struct KeyPair {
    /// The shareable public half.
    pub public: PublicKeyMaterial,
    /// The secret private half.
    pub private: PrivateKeyMaterial,
}

/// Generates an RSA key pair for OAEP key wrapping.
///
/// 2048-bit modulus, public exponent 65537. The OAEP hash (SHA-256) is
/// configured where the key is used, not here.
pub fn generate_rsa_keypair<R: CryptoRngCore>(rng: &mut R) -> Result<KeyPair> {
    let private = RsaPrivateKey::new(rng, RSA_MODULUS_BITS)
        .map_err(|e| MailError::CryptoUnavailable(format!("RSA key generation: {}", e)))?;
    let public = RsaPublicKey::from(&private);

    let spki = public
        .to_public_key_der()
        .map_err(|e| MailError::CryptoUnavailable(format!("SPKI export: {}", e)))?;
    let pkcs8 = private
        .to_pkcs8_der()
        .map_err(|e| MailError::CryptoUnavailable(format!("PKCS#8 export: {}", e)))?;

    Ok(KeyPair {
        public: PublicKeyMaterial {
            algorithm: KeyAlgorithm::Rsa,
            bytes: spki.as_bytes().to_vec(),
        },
        private: PrivateKeyMaterial {
            algorithm: KeyAlgorithm::Rsa,
            bytes: pkcs8.as_bytes().to_vec(),
        },
    })
}

/// Generates an ECDH key pair on the given curve (P-256 only).
pub fn generate_ecdh_keypair<R: CryptoRngCore>(rng: &mut R, curve: NamedCurve) -> Result<KeyPair> {
    // Single-variant match keeps curve additions compiler-checked here.
    let NamedCurve::P256 = curve;

    let secret = p256::SecretKey::random(rng);
    let public = secret.public_key();

    let pkcs8 = secret
        .to_pkcs8_der()
        .map_err(|e| MailError::CryptoUnavailable(format!("PKCS#8 export: {}", e)))?;

    Ok(KeyPair {
        public: PublicKeyMaterial {
            algorithm: KeyAlgorithm::EcdhP256,
            bytes: public.to_encoded_point(false).as_bytes().to_vec(),
        },
        private: PrivateKeyMaterial {
            algorithm: KeyAlgorithm::EcdhP256,
            bytes: pkcs8.as_bytes().to_vec(),
        },
    })
}

/// Parses RSA public key material into a usable key.
pub(crate) fn rsa_public_key(material: &PublicKeyMaterial) -> Result<RsaPublicKey> {
    if material.algorithm != KeyAlgorithm::Rsa {
        return Err(MailError::UnsupportedAlgorithm(format!(
            "expected RSA key, got {}",
            material.algorithm
        )));
    }
    RsaPublicKey::from_public_key_der(&material.bytes)
        .map_err(|e| MailError::MalformedKey(format!("SPKI parse: {}", e)))
}

/// Parses RSA private key material into a usable key.
pub(crate) fn rsa_private_key(material: &PrivateKeyMaterial) -> Result<RsaPrivateKey> {
    if material.algorithm != KeyAlgorithm::Rsa {
        return Err(MailError::UnsupportedAlgorithm(format!(
            "expected RSA key, got {}",
            material.algorithm
        )));
    }
    RsaPrivateKey::from_pkcs8_der(&material.bytes)
        .map_err(|e| MailError::MalformedKey(format!("PKCS#8 parse: {}", e)))
}

/// Parses ECDH public key material (raw SEC1 point) into a usable key.
pub(crate) fn p256_public_key(material: &PublicKeyMaterial) -> Result<p256::PublicKey> {
    if material.algorithm != KeyAlgorithm::EcdhP256 {
        return Err(MailError::UnsupportedAlgorithm(format!(
            "expected ECDH-P256 key, got {}",
            material.algorithm
        )));
    }
    p256::PublicKey::from_sec1_bytes(&material.bytes)
        .map_err(|e| MailError::MalformedKey(format!("SEC1 point parse: {}", e)))
}

/// Parses ECDH private key material into a usable key.
pub(crate) fn p256_secret_key(material: &PrivateKeyMaterial) -> Result<p256::SecretKey> {
    if material.algorithm != KeyAlgorithm::EcdhP256 {
        return Err(MailError::UnsupportedAlgorithm(format!(
            "expected ECDH-P256 key, got {}",
            material.algorithm
        )));
    }
    p256::SecretKey::from_pkcs8_der(&material.bytes)
        .map_err(|e| MailError::MalformedKey(format!("PKCS#8 parse: {}", e)))
}
