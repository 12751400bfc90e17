//! Collaborators on the transaction-creation path.
//!
//! Request handlers resolve who is sending and then hand a finished
//! attachment to whatever creates, signs and relays the transaction. Both
//! steps live outside this crate; these traits are the seams.

use serde::Serialize;
use thiserror::Error;

use super::account::{Account, AccountError};
use crate::transaction::attachment::Attachment;
use crate::transaction::id;
use crate::transaction::phasing::TwoPhased;

/// Errors from the collaborators.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error(transparent)]
    Account(#[from] AccountError),

    /// The pipeline is not accepting transactions.
    #[error("transaction pipeline unavailable: {0}")]
    Unavailable(String),

    #[error("transaction rejected: {0}")]
    Rejected(String),
}

/// Receipt for a transaction accepted by the pipeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedTransaction {
    #[serde(with = "id::decimal")]
    pub transaction: u64,
    #[serde(with = "id::decimal")]
    pub sender: u64,
    pub attachment: Attachment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phasing: Option<TwoPhased>,
    /// Byte length of the attachment, as the fee calculation sees it.
    pub attachment_size: usize,
}

/// Resolves the sending account from request credentials.
pub trait SenderResolver: Send + Sync {
    fn resolve_sender(&self, public_key: &str) -> Result<Account, SubmissionError>;
}

/// Creates a transaction around an attachment and broadcasts it.
pub trait TransactionSubmitter: Send + Sync {
    fn create_and_broadcast(
        &self,
        sender: &Account,
        attachment: Attachment,
        phasing: Option<TwoPhased>,
    ) -> Result<SubmittedTransaction, SubmissionError>;
}

/// Resolves senders from a hex-encoded 32-byte public key.
#[derive(Debug, Clone, Copy, Default)]
pub struct PublicKeyResolver;

impl SenderResolver for PublicKeyResolver {
    fn resolve_sender(&self, public_key: &str) -> Result<Account, SubmissionError> {
        Ok(Account::from_public_key_hex(public_key)?)
    }
}
