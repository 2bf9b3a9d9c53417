//! Data models for stored and opened mail.

use std::time::SystemTime;

use crate::envelope::Envelope;

/// A plaintext attachment, before sealing or after opening.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Original file name.
    pub file_name: String,
    /// Raw file content.
    pub content: Vec<u8>,
}

impl Attachment {
    /// Creates a new attachment.
    pub fn new(file_name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content,
        }
    }
}

/// An attachment sealed as its own self-contained envelope.
///
/// Attachments get their own key and nonce rather than reusing the
/// body's, so each envelope stands alone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SealedAttachment {
    /// Original file name, stored in the clear.
    pub file_name: String,
    /// The sealed content.
    pub envelope: Envelope,
}

/// Addressing and subject metadata for a mail, plus its optional
/// sealed attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailMetadata {
    /// Sender identity.
    pub from: String,
    /// Recipient identity.
    pub to: String,
    /// Subject line (stored in the clear).
    pub subject: String,
    /// Sealed attachment, if any.
    pub attachment: Option<SealedAttachment>,
}

impl MailMetadata {
    /// Creates metadata without an attachment.
    pub fn new(from: impl Into<String>, to: impl Into<String>, subject: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            attachment: None,
        }
    }

    /// Attaches a sealed attachment.
    pub fn with_attachment(mut self, attachment: SealedAttachment) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// A mail as held by the message store: immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredMail {
    /// Store-assigned identifier.
    pub id: String,
    /// Addressing metadata and attachment.
    pub metadata: MailMetadata,
    /// The sealed body.
    pub envelope: Envelope,
    /// When the store accepted the mail.
    pub created_at: SystemTime,
}

/// Inbox listing entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MailSummary {
    /// Store-assigned identifier.
    pub id: String,
    /// Sender identity.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Wire algorithm tag of the body envelope.
    pub algorithm: &'static str,
    /// Whether an attachment is present.
    pub has_attachment: bool,
    /// When the store accepted the mail.
    pub created_at: SystemTime,
}

impl MailSummary {
    /// Builds a summary from a stored mail.
    pub fn from_mail(mail: &StoredMail) -> Self {
        Self {
            id: mail.id.clone(),
            from: mail.metadata.from.clone(),
            subject: mail.metadata.subject.clone(),
            algorithm: mail.envelope.algorithm_tag(),
            has_attachment: mail.metadata.attachment.is_some(),
            created_at: mail.created_at,
        }
    }
}

/// A mail after the receiving client has opened it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpenedMail {
    /// Sender identity.
    pub from: String,
    /// Subject line.
    pub subject: String,
    /// Decrypted body text.
    pub body: String,
    /// Decrypted attachment, if any.
    pub attachment: Option<Attachment>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_reflects_mail() {
        let mail = StoredMail {
            id: "m-1".to_string(),
            metadata: MailMetadata::new("alice", "bob", "greetings"),
            envelope: Envelope::Plaintext("hi".to_string()),
            created_at: SystemTime::now(),
        };

        let summary = MailSummary::from_mail(&mail);
        assert_eq!(summary.id, "m-1");
        assert_eq!(summary.from, "alice");
        assert_eq!(summary.algorithm, "PLAINTEXT");
        assert!(!summary.has_attachment);
    }
}
