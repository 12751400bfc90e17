//! Vote casting for pending (phased) transactions.
//!
//! [`VoteCastingHandler::handle`] runs one request through, in order:
//!
//! 1. [`PhasedTransactionGate`] over the supplied ids at the current height;
//! 2. sender resolution;
//! 3. construction of the [`PendingPaymentVoteCasting`] attachment;
//! 4. hand-off to the transaction pipeline.
//!
//! Nothing is validated beyond the gate. Fees, balances and signatures are
//! the pipeline's business.

use std::sync::Arc;

use serde::Deserialize;

use super::attachment::{Attachment, PendingPaymentVoteCasting};
use super::phasing::{PhasedTransactionGate, VoteCastingError};
use crate::ledger::{ChainView, SenderResolver, SubmittedTransaction, TransactionSubmitter};

/// A vote-casting request as it arrives from a client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCastingRequest {
    /// Hex-encoded public key of the voter.
    pub public_key: String,
    /// Ids of the transactions being voted for, as sent by the client.
    #[serde(default)]
    pub pending_transaction: Vec<String>,
}

/// Builds and submits vote-casting transactions.
pub struct VoteCastingHandler {
    gate: PhasedTransactionGate,
    chain: Arc<dyn ChainView>,
    resolver: Arc<dyn SenderResolver>,
    submitter: Arc<dyn TransactionSubmitter>,
}

impl std::fmt::Debug for VoteCastingHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoteCastingHandler")
            .field("gate", &self.gate)
            .finish_non_exhaustive()
    }
}

impl VoteCastingHandler {
    pub fn new(
        gate: PhasedTransactionGate,
        chain: Arc<dyn ChainView>,
        resolver: Arc<dyn SenderResolver>,
        submitter: Arc<dyn TransactionSubmitter>,
    ) -> Self {
        Self {
            gate,
            chain,
            resolver,
            submitter,
        }
    }

    pub fn gate(&self) -> &PhasedTransactionGate {
        &self.gate
    }

    /// Validates and submits one vote-casting request.
    pub fn handle(
        &self,
        request: &VoteCastingRequest,
    ) -> Result<SubmittedTransaction, VoteCastingError> {
        let ids = self
            .gate
            .validate(&request.pending_transaction, self.chain.as_ref())
            .map_err(|e| {
                tracing::debug!(error = %e, "vote casting rejected by gate");
                e
            })?;

        let sender = self
            .resolver
            .resolve_sender(&request.public_key)
            .map_err(|e| VoteCastingError::Sender(e.to_string()))?;

        let attachment: Attachment = PendingPaymentVoteCasting::new(ids)
            .map_err(|e| {
                tracing::warn!(error = %e, "vote casting attachment could not be encoded");
                e
            })?
            .into();

        let receipt = self
            .submitter
            .create_and_broadcast(&sender, attachment, None)
            .map_err(|e| VoteCastingError::Submission(e.to_string()))?;

        tracing::info!(
            transaction = receipt.transaction,
            sender = sender.id(),
            votes = request.pending_transaction.len(),
            "vote casting submitted"
        );
        Ok(receipt)
    }
}
