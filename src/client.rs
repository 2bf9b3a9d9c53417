//! High-level mail client tying the protocol core to its collaborators.
//!
//! A [`MailClient`] owns one identity's key pairs, publishes the public
//! halves to a [`KeyDirectory`], and seals/opens mail against a
//! [`MessageStore`]. Private keys never leave the client; there is no
//! export path.

use rand::rngs::OsRng;
use tracing::debug;

use crate::ecdh_envelope;
use crate::envelope::Envelope;
use crate::keys::{
    generate_ecdh_keypair, generate_rsa_keypair, KeyAlgorithm, KeyPair, NamedCurve,
    PublicKeyMaterial,
};
use crate::models::{Attachment, MailMetadata, MailSummary, OpenedMail, SealedAttachment};
use crate::rsa_envelope;
use crate::storage::{KeyDirectory, MessageStore};
use crate::types::{MailError, Result};

/// A mail client for one identity.
pub struct MailClient<S, D>
where
    S: MessageStore,
    D: KeyDirectory,
{
    /// The identity this client sends and receives as.
    identity: String,
    /// Message store collaborator.
    store: S,
    /// Key directory collaborator.
    directory: D,
    /// Long-term RSA key pair, once enrolled.
    rsa_keys: Option<KeyPair>,
    /// Long-term ECDH key pair, once enrolled.
    ecdh_keys: Option<KeyPair>,
}

impl<S, D> MailClient<S, D>
where
    S: MessageStore,
    D: KeyDirectory,
{
    /// Creates a client with no enrolled keys.
    pub fn new(identity: impl Into<String>, store: S, directory: D) -> Self {
        Self {
            identity: identity.into(),
            store,
            directory,
            rsa_keys: None,
            ecdh_keys: None,
        }
    }

    /// Returns the client's identity.
    pub fn identity(&self) -> &str {
        &self.identity
    }

    /// Generates an RSA key pair and publishes the public half.
    pub async fn enroll_rsa(&mut self) -> Result<()> {
        let pair = generate_rsa_keypair(&mut OsRng)?;
        self.directory
            .publish(&self.identity, pair.public.clone())
            .await?;
        debug!(identity = %self.identity, "published RSA public key");
        self.rsa_keys = Some(pair);
        Ok(())
    }

    /// Generates a P-256 ECDH key pair and publishes the public half.
    pub async fn enroll_ecdh(&mut self) -> Result<()> {
        let pair = generate_ecdh_keypair(&mut OsRng, NamedCurve::P256)?;
        self.directory
            .publish(&self.identity, pair.public.clone())
            .await?;
        debug!(identity = %self.identity, "published ECDH public key");
        self.ecdh_keys = Some(pair);
        Ok(())
    }

    /// The enrolled RSA public key, if any.
    pub fn rsa_public_key(&self) -> Option<&PublicKeyMaterial> {
        self.rsa_keys.as_ref().map(|pair| &pair.public)
    }

    /// The enrolled ECDH public key, if any.
    pub fn ecdh_public_key(&self) -> Option<&PublicKeyMaterial> {
        self.ecdh_keys.as_ref().map(|pair| &pair.public)
    }

    /// Sends mail sealed with RSA key wrapping for `to`.
    pub async fn send_rsa(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<Attachment>,
    ) -> Result<String> {
        let recipient_key = self.directory.public_key(to, KeyAlgorithm::Rsa).await?;
        let sender_public = self.rsa_keys.as_ref().map(|pair| &pair.public);

        let envelope = Envelope::Rsa(rsa_envelope::seal(
            &mut OsRng,
            body.as_bytes(),
            &recipient_key,
            sender_public,
        )?);

        let mut metadata = MailMetadata::new(&self.identity, to, subject);
        if let Some(attachment) = attachment {
            let sealed = rsa_envelope::seal(
                &mut OsRng,
                &attachment.content,
                &recipient_key,
                sender_public,
            )?;
            metadata = metadata.with_attachment(SealedAttachment {
                file_name: attachment.file_name,
                envelope: Envelope::Rsa(sealed),
            });
        }

        let id = self.store.store(envelope, metadata).await?;
        debug!(id = %id, to = %to, algorithm = "RSA", "stored sealed mail");
        Ok(id)
    }

    /// Sends mail sealed with ECDH key agreement for `to`.
    ///
    /// Uses the enrolled static key when present; otherwise a one-shot
    /// ephemeral key pair is generated for this message.
    pub async fn send_ecdh(
        &self,
        to: &str,
        subject: &str,
        body: &str,
        attachment: Option<Attachment>,
    ) -> Result<String> {
        let recipient_key = self.directory.public_key(to, KeyAlgorithm::EcdhP256).await?;

        let ephemeral;
        let sender_private = match &self.ecdh_keys {
            Some(pair) => &pair.private,
            None => {
                ephemeral = generate_ecdh_keypair(&mut OsRng, NamedCurve::P256)?;
                &ephemeral.private
            }
        };

        let envelope = Envelope::Ecdh(ecdh_envelope::seal(
            &mut OsRng,
            body.as_bytes(),
            sender_private,
            &recipient_key,
        )?);

        let mut metadata = MailMetadata::new(&self.identity, to, subject);
        if let Some(attachment) = attachment {
            let sealed = ecdh_envelope::seal(
                &mut OsRng,
                &attachment.content,
                sender_private,
                &recipient_key,
            )?;
            metadata = metadata.with_attachment(SealedAttachment {
                file_name: attachment.file_name,
                envelope: Envelope::Ecdh(sealed),
            });
        }

        let id = self.store.store(envelope, metadata).await?;
        debug!(id = %id, to = %to, algorithm = "ECDH", "stored sealed mail");
        Ok(id)
    }

    /// Sends mail in the unencrypted demonstration mode.
    pub async fn send_plaintext(&self, to: &str, subject: &str, body: &str) -> Result<String> {
        let metadata = MailMetadata::new(&self.identity, to, subject);
        let id = self
            .store
            .store(Envelope::Plaintext(body.to_string()), metadata)
            .await?;
        debug!(id = %id, to = %to, algorithm = "PLAINTEXT", "stored plaintext mail");
        Ok(id)
    }

    /// Lists this identity's inbox, newest first.
    pub async fn inbox(&self) -> Result<Vec<MailSummary>> {
        self.store.list_inbox(&self.identity).await
    }

    /// Fetches a mail by id and opens it with this identity's keys.
    pub async fn read(&self, id: &str) -> Result<OpenedMail> {
        let mail = self.store.fetch(id).await?;

        // Only the recipient reads through this path; answer as if the
        // mail did not exist rather than confirming it does.
        if mail.metadata.to != self.identity {
            return Err(MailError::MessageNotFound(id.to_string()));
        }

        let body_bytes = self.open_envelope(&mail.envelope)?;
        let body = String::from_utf8(body_bytes)
            .map_err(|e| MailError::EncodingError(format!("body is not UTF-8: {}", e)))?;

        let attachment = match mail.metadata.attachment {
            Some(sealed) => Some(Attachment {
                content: self.open_envelope(&sealed.envelope)?,
                file_name: sealed.file_name,
            }),
            None => None,
        };

        debug!(id = %id, algorithm = mail.envelope.algorithm_tag(), "opened mail");

        Ok(OpenedMail {
            from: mail.metadata.from,
            subject: mail.metadata.subject,
            body,
            attachment,
        })
    }

    /// Dispatches an envelope to its matching decrypt path.
    ///
    /// The match is exhaustive: a new algorithm variant fails to
    /// compile until it is handled here.
    fn open_envelope(&self, envelope: &Envelope) -> Result<Vec<u8>> {
        match envelope {
            Envelope::Rsa(env) => {
                let pair = self
                    .rsa_keys
                    .as_ref()
                    .ok_or_else(|| MailError::KeyNotPublished(self.identity.clone()))?;
                rsa_envelope::open(env, &pair.private)
            }
            Envelope::Ecdh(env) => {
                let pair = self
                    .ecdh_keys
                    .as_ref()
                    .ok_or_else(|| MailError::KeyNotPublished(self.identity.clone()))?;
                ecdh_envelope::open(env, &pair.private)
            }
            // Never run crypto on the fallback variant.
            Envelope::Plaintext(body) => Ok(body.clone().into_bytes()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::{InMemoryKeyDirectory, InMemoryMessageStore};
    use std::sync::Arc;

    fn world() -> (Arc<InMemoryMessageStore>, Arc<InMemoryKeyDirectory>) {
        (
            Arc::new(InMemoryMessageStore::new()),
            Arc::new(InMemoryKeyDirectory::new()),
        )
    }

    #[tokio::test]
    async fn test_ecdh_mail_flow() {
        let (store, directory) = world();
        let alice = MailClient::new("alice", store.clone(), directory.clone());
        let mut bob = MailClient::new("bob", store.clone(), directory.clone());
        bob.enroll_ecdh().await.unwrap();

        let id = alice
            .send_ecdh("bob", "lunch", "tacos at noon?", None)
            .await
            .unwrap();

        let inbox = bob.inbox().await.unwrap();
        assert_eq!(inbox.len(), 1);
        assert_eq!(inbox[0].algorithm, "ECDH");

        let opened = bob.read(&id).await.unwrap();
        assert_eq!(opened.from, "alice");
        assert_eq!(opened.body, "tacos at noon?");
    }

    #[tokio::test]
    async fn test_ecdh_attachment_flow() {
        let (store, directory) = world();
        let alice = MailClient::new("alice", store.clone(), directory.clone());
        let mut bob = MailClient::new("bob", store.clone(), directory.clone());
        bob.enroll_ecdh().await.unwrap();

        let attachment = Attachment::new("notes.txt", b"meeting notes".to_vec());
        let id = alice
            .send_ecdh("bob", "notes", "see attached", Some(attachment))
            .await
            .unwrap();

        let opened = bob.read(&id).await.unwrap();
        let attachment = opened.attachment.unwrap();
        assert_eq!(attachment.file_name, "notes.txt");
        assert_eq!(attachment.content, b"meeting notes");
    }

    #[tokio::test]
    async fn test_plaintext_mail_flow() {
        let (store, directory) = world();
        let alice = MailClient::new("alice", store.clone(), directory.clone());
        let bob = MailClient::new("bob", store.clone(), directory.clone());

        let id = alice
            .send_plaintext("bob", "public notice", "nothing secret here")
            .await
            .unwrap();

        // No keys enrolled: the plaintext path must not require any.
        let opened = bob.read(&id).await.unwrap();
        assert_eq!(opened.body, "nothing secret here");
    }

    #[tokio::test]
    async fn test_send_to_unpublished_recipient_fails() {
        let (store, directory) = world();
        let alice = MailClient::new("alice", store.clone(), directory.clone());

        let result = alice.send_ecdh("ghost", "hello?", "anyone there?", None).await;
        assert!(matches!(result, Err(MailError::IdentityNotFound(_))));

        directory.register("bob").await;
        let result = alice.send_ecdh("bob", "hello?", "anyone there?", None).await;
        assert!(matches!(result, Err(MailError::KeyNotPublished(_))));
    }

    #[tokio::test]
    async fn test_non_recipient_cannot_read() {
        let (store, directory) = world();
        let alice = MailClient::new("alice", store.clone(), directory.clone());
        let mut bob = MailClient::new("bob", store.clone(), directory.clone());
        let mut carol = MailClient::new("carol", store.clone(), directory.clone());
        bob.enroll_ecdh().await.unwrap();
        carol.enroll_ecdh().await.unwrap();

        let id = alice.send_ecdh("bob", "private", "for bob only", None).await.unwrap();

        let result = carol.read(&id).await;
        assert!(matches!(result, Err(MailError::MessageNotFound(_))));
    }

    #[tokio::test]
    async fn test_static_sender_key_is_used_when_enrolled() {
        let (store, directory) = world();
        let mut alice = MailClient::new("alice", store.clone(), directory.clone());
        let mut bob = MailClient::new("bob", store.clone(), directory.clone());
        alice.enroll_ecdh().await.unwrap();
        bob.enroll_ecdh().await.unwrap();

        let id = alice.send_ecdh("bob", "hi", "static mode", None).await.unwrap();
        let mail = store.fetch(&id).await.unwrap();
        match mail.envelope {
            Envelope::Ecdh(env) => {
                assert_eq!(
                    env.sender_public_key,
                    alice.ecdh_public_key().unwrap().bytes
                );
            }
            other => panic!("expected ECDH envelope, got {}", other.algorithm_tag()),
        }
        assert_eq!(bob.read(&id).await.unwrap().body, "static mode");
    }
}
