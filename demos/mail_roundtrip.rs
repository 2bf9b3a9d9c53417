//! Walk the full mail round trip in all three modes.
//!
//! Run with: cargo run --example mail_roundtrip

use std::sync::Arc;

use sealmail::{Attachment, InMemoryKeyDirectory, InMemoryMessageStore, MailClient};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let store = Arc::new(InMemoryMessageStore::new());
    let directory = Arc::new(InMemoryKeyDirectory::new());

    let mut alice = MailClient::new("alice", store.clone(), directory.clone());
    let mut bob = MailClient::new("bob", store.clone(), directory.clone());

    println!("Enrolling keys (RSA generation takes a moment)...");
    alice.enroll_ecdh().await?;
    bob.enroll_ecdh().await?;
    bob.enroll_rsa().await?;

    alice
        .send_plaintext("bob", "plaintext demo", "This one travels in the clear.")
        .await?;
    alice
        .send_rsa("bob", "rsa demo", "This one is sealed with RSA key wrapping.", None)
        .await?;
    alice
        .send_ecdh(
            "bob",
            "ecdh demo",
            "This one is sealed with ECDH key agreement.",
            Some(Attachment::new("hello.txt", b"attachment bytes".to_vec())),
        )
        .await?;

    println!("\nBob's inbox (newest first):");
    for summary in bob.inbox().await? {
        println!(
            "  [{}] {:9} from={} subject={:?} attachment={}",
            summary.id,
            summary.algorithm,
            summary.from,
            summary.subject,
            summary.has_attachment
        );

        let opened = bob.read(&summary.id).await?;
        println!("        body: {:?}", opened.body);
        if let Some(attachment) = opened.attachment {
            println!(
                "        attachment {:?}: {} bytes",
                attachment.file_name,
                attachment.content.len()
            );
        }
    }

    Ok(())
}
