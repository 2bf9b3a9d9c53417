//! sealmail - hybrid-encrypted confidential mail.
//!
//! Two parties exchange mail without a pre-shared symmetric key: a
//! public-key scheme establishes or wraps a fresh per-message AES-256
//! key, and AES-GCM protects the payload. Two establishment schemes are
//! supported, plus an unencrypted demonstration mode:
//!
//! - [`rsa_envelope`] wraps a random key with RSA-OAEP (SHA-256) under
//!   the recipient's 2048-bit public key.
//! - [`ecdh_envelope`] derives the key from a P-256 ECDH agreement
//!   between the sender's (ephemeral or static) private key and the
//!   recipient's public key.
//! - [`Envelope::Plaintext`] carries the body in the clear.
//!
//! Sealing and opening are synchronous pure transforms; only the
//! collaborators ([`MessageStore`], [`KeyDirectory`]) and the
//! [`MailClient`] facade are async. Every key- and nonce-generating
//! operation takes its secure random source as an explicit argument.

mod cipher;
mod client;
mod codec;
mod envelope;
mod keys;
mod models;
mod storage;
mod types;

pub mod ecdh_envelope;
pub mod rsa_envelope;

pub use cipher::*;
pub use client::*;
pub use codec::*;
pub use envelope::*;
pub use keys::*;
pub use models::*;
pub use storage::*;
pub use types::*;
