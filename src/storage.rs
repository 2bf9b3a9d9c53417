//! External collaborator interfaces: the message store and the key
//! directory.
//!
//! The protocol core only ever sees these through the traits below;
//! the in-memory implementations exist for tests, demos, and embedding
//! without a backing service. Both guard their state with a
//! `tokio::sync::RwLock`, so all methods are safe to call concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::SystemTime;

use tokio::sync::RwLock;

use crate::envelope::Envelope;
use crate::keys::{KeyAlgorithm, PublicKeyMaterial};
use crate::models::{MailMetadata, MailSummary, StoredMail};
use crate::types::{MailError, Result};

// ============================================================================
// Message Store
// ============================================================================

/// Trait for persisting and retrieving sealed mail.
#[async_trait::async_trait]
pub trait MessageStore: Send + Sync {
    /// Stores a sealed mail, returning its assigned id.
    async fn store(&self, envelope: Envelope, metadata: MailMetadata) -> Result<String>;

    /// Fetches a mail by id.
    async fn fetch(&self, id: &str) -> Result<StoredMail>;

    /// Lists the recipient's inbox, newest first.
    async fn list_inbox(&self, recipient: &str) -> Result<Vec<MailSummary>>;
}

/// In-memory implementation of [`MessageStore`].
#[derive(Default)]
pub struct InMemoryMessageStore {
    mails: Arc<RwLock<Vec<StoredMail>>>,
}

impl InMemoryMessageStore {
    /// Creates a new in-memory message store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl MessageStore for InMemoryMessageStore {
    async fn store(&self, envelope: Envelope, metadata: MailMetadata) -> Result<String> {
        let id = uuid::Uuid::new_v4().to_string();
        let mut mails = self.mails.write().await;
        mails.push(StoredMail {
            id: id.clone(),
            metadata,
            envelope,
            created_at: SystemTime::now(),
        });
        Ok(id)
    }

    async fn fetch(&self, id: &str) -> Result<StoredMail> {
        let mails = self.mails.read().await;
        mails
            .iter()
            .find(|mail| mail.id == id)
            .cloned()
            .ok_or_else(|| MailError::MessageNotFound(id.to_string()))
    }

    async fn list_inbox(&self, recipient: &str) -> Result<Vec<MailSummary>> {
        let mails = self.mails.read().await;
        // Insertion order is chronological; reversing yields newest first.
        Ok(mails
            .iter()
            .rev()
            .filter(|mail| mail.metadata.to == recipient)
            .map(MailSummary::from_mail)
            .collect())
    }
}

// Collaborators are typically shared between clients the way a server
// shares them between users.
#[async_trait::async_trait]
impl<T: MessageStore + ?Sized> MessageStore for Arc<T> {
    async fn store(&self, envelope: Envelope, metadata: MailMetadata) -> Result<String> {
        self.as_ref().store(envelope, metadata).await
    }

    async fn fetch(&self, id: &str) -> Result<StoredMail> {
        self.as_ref().fetch(id).await
    }

    async fn list_inbox(&self, recipient: &str) -> Result<Vec<MailSummary>> {
        self.as_ref().list_inbox(recipient).await
    }
}

// ============================================================================
// Key Directory
// ============================================================================

/// Trait for resolving identities to their published public keys.
#[async_trait::async_trait]
pub trait KeyDirectory: Send + Sync {
    /// Publishes a public key for an identity, replacing any previous
    /// key of the same algorithm.
    async fn publish(&self, identity: &str, key: PublicKeyMaterial) -> Result<()>;

    /// Resolves an identity's public key for the given algorithm.
    ///
    /// Fails with [`MailError::IdentityNotFound`] for an unknown
    /// identity and [`MailError::KeyNotPublished`] when it is known but
    /// has no key on file for the algorithm.
    async fn public_key(&self, identity: &str, algorithm: KeyAlgorithm)
        -> Result<PublicKeyMaterial>;
}

/// In-memory implementation of [`KeyDirectory`].
///
/// Each identity holds at most one key per algorithm, mirroring the
/// user record's separate RSA and ECDH key slots.
#[derive(Default)]
pub struct InMemoryKeyDirectory {
    entries: Arc<RwLock<HashMap<String, HashMap<KeyAlgorithm, PublicKeyMaterial>>>>,
}

impl InMemoryKeyDirectory {
    /// Creates a new in-memory key directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an identity with no published keys.
    pub async fn register(&self, identity: &str) {
        let mut entries = self.entries.write().await;
        entries.entry(identity.to_string()).or_default();
    }
}

#[async_trait::async_trait]
impl KeyDirectory for InMemoryKeyDirectory {
    async fn publish(&self, identity: &str, key: PublicKeyMaterial) -> Result<()> {
        let mut entries = self.entries.write().await;
        entries
            .entry(identity.to_string())
            .or_default()
            .insert(key.algorithm, key);
        Ok(())
    }

    async fn public_key(
        &self,
        identity: &str,
        algorithm: KeyAlgorithm,
    ) -> Result<PublicKeyMaterial> {
        let entries = self.entries.read().await;
        let keys = entries
            .get(identity)
            .ok_or_else(|| MailError::IdentityNotFound(identity.to_string()))?;
        keys.get(&algorithm)
            .cloned()
            .ok_or_else(|| MailError::KeyNotPublished(identity.to_string()))
    }
}

#[async_trait::async_trait]
impl<T: KeyDirectory + ?Sized> KeyDirectory for Arc<T> {
    async fn publish(&self, identity: &str, key: PublicKeyMaterial) -> Result<()> {
        self.as_ref().publish(identity, key).await
    }

    async fn public_key(
        &self,
        identity: &str,
        algorithm: KeyAlgorithm,
    ) -> Result<PublicKeyMaterial> {
        self.as_ref().public_key(identity, algorithm).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::{generate_ecdh_keypair, NamedCurve};
    use rand::rngs::OsRng;

    fn plaintext_mail(from: &str, to: &str, body: &str) -> (Envelope, MailMetadata) {
        (
            Envelope::Plaintext(body.to_string()),
            MailMetadata::new(from, to, "subject"),
        )
    }

    #[tokio::test]
    async fn test_store_and_fetch() {
        let store = InMemoryMessageStore::new();
        let (envelope, metadata) = plaintext_mail("alice", "bob", "hi");

        let id = store.store(envelope.clone(), metadata).await.unwrap();
        let mail = store.fetch(&id).await.unwrap();
        assert_eq!(mail.envelope, envelope);
        assert_eq!(mail.metadata.from, "alice");
    }

    #[tokio::test]
    async fn test_fetch_unknown_id() {
        let store = InMemoryMessageStore::new();
        let result = store.fetch("missing").await;
        assert!(matches!(result, Err(MailError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn test_inbox_is_newest_first_and_filtered() {
        let store = InMemoryMessageStore::new();

        let (envelope, metadata) = plaintext_mail("alice", "bob", "first");
        store.store(envelope, metadata).await.unwrap();
        let (envelope, metadata) = plaintext_mail("carol", "bob", "second");
        store.store(envelope, metadata).await.unwrap();
        let (envelope, metadata) = plaintext_mail("alice", "dave", "other inbox");
        store.store(envelope, metadata).await.unwrap();

        let inbox = store.list_inbox("bob").await.unwrap();
        assert_eq!(inbox.len(), 2);
        assert_eq!(inbox[0].from, "carol");
        assert_eq!(inbox[1].from, "alice");

        assert!(store.list_inbox("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_directory_lookup_errors() {
        let directory = InMemoryKeyDirectory::new();

        let result = directory.public_key("ghost", KeyAlgorithm::EcdhP256).await;
        assert!(matches!(result, Err(MailError::IdentityNotFound(_))));

        directory.register("bob").await;
        let result = directory.public_key("bob", KeyAlgorithm::EcdhP256).await;
        assert!(matches!(result, Err(MailError::KeyNotPublished(_))));

        let pair = generate_ecdh_keypair(&mut OsRng, NamedCurve::P256).unwrap();
        directory.publish("bob", pair.public.clone()).await.unwrap();
        let resolved = directory
            .public_key("bob", KeyAlgorithm::EcdhP256)
            .await
            .unwrap();
        assert_eq!(resolved, pair.public);

        // Still no RSA key on file.
        let result = directory.public_key("bob", KeyAlgorithm::Rsa).await;
        assert!(matches!(result, Err(MailError::KeyNotPublished(_))));
    }
}
