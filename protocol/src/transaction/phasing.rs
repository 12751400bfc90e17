//! Phased (pending) transactions and the vote-casting eligibility gate.
//!
//! A phased transaction carries a [`TwoPhased`] appendix and stays open for
//! votes until its `max_height`. Before a vote-casting attachment may
//! reference such transactions, every reference has to pass
//! [`PhasedTransactionGate::validate`]. The gate is all-or-nothing: one bad
//! id rejects the whole batch, and nothing is recorded either way.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::parse_unsigned_id;
use crate::config::MAX_VOTES_PER_VOTING_TRANSACTION;
use crate::ledger::{ChainView, LedgerTransaction};

// ---------------------------------------------------------------------------
// TwoPhased
// ---------------------------------------------------------------------------

/// Phasing appendix of a pending transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TwoPhased {
    /// Last chain height at which votes are still accepted (inclusive).
    pub max_height: u32,
}

impl TwoPhased {
    pub fn new(max_height: u32) -> Self {
        Self { max_height }
    }

    /// Whether votes are still accepted at `height`.
    pub fn is_open_at(&self, height: u32) -> bool {
        self.max_height >= height
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a pending-transaction reference was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IncorrectReason {
    #[error("{count} pending transactions exceed the limit of {max}")]
    TooMany { count: usize, max: usize },

    #[error("{value:?} is not a transaction id")]
    Unparsable { value: String },

    #[error("transaction {id} not found")]
    UnknownTransaction { id: u64 },

    #[error("transaction {id} is not phased")]
    NotPhased { id: u64 },

    #[error("voting for transaction {id} closed at height {max_height}, chain is at {height}")]
    VotingClosed { id: u64, max_height: u32, height: u32 },
}

/// Errors surfaced by vote casting.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteCastingError {
    /// No pending transaction ids were supplied.
    #[error("missing pending transaction")]
    MissingPendingTransaction,

    /// The batch, or one of its entries, is not eligible.
    #[error("incorrect pending transaction: {0}")]
    IncorrectPendingTransaction(IncorrectReason),

    /// The sender account could not be resolved.
    #[error("sender could not be resolved: {0}")]
    Sender(String),

    /// The vote-casting attachment could not be built.
    #[error("attachment rejected: {0}")]
    Attachment(#[from] super::attachment::AttachmentError),

    /// The transaction pipeline refused the vote.
    #[error("submission failed: {0}")]
    Submission(String),
}

impl VoteCastingError {
    /// Stable numeric code reported to API clients.
    pub fn error_code(&self) -> i32 {
        match self {
            Self::MissingPendingTransaction => 3,
            Self::IncorrectPendingTransaction(_) => 4,
            Self::Sender(_) => 5,
            Self::Attachment(_) => 6,
            Self::Submission(_) => 7,
        }
    }
}

impl From<IncorrectReason> for VoteCastingError {
    fn from(reason: IncorrectReason) -> Self {
        Self::IncorrectPendingTransaction(reason)
    }
}

// ---------------------------------------------------------------------------
// Gate
// ---------------------------------------------------------------------------

/// Submission-time eligibility check for vote casting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhasedTransactionGate {
    max_votes: u8,
}

impl Default for PhasedTransactionGate {
    fn default() -> Self {
        Self::new(MAX_VOTES_PER_VOTING_TRANSACTION)
    }
}

impl PhasedTransactionGate {
    pub fn new(max_votes: u8) -> Self {
        Self { max_votes }
    }

    pub fn max_votes(&self) -> u8 {
        self.max_votes
    }

    /// Validates `values` against the chain's current height.
    pub fn validate<C>(&self, values: &[String], chain: &C) -> Result<Vec<u64>, VoteCastingError>
    where
        C: ChainView + ?Sized,
    {
        self.validate_at(values, chain.height(), |id| chain.transaction_by_id(id))
    }

    /// Validates `values` at `height`, looking transactions up with `lookup`.
    ///
    /// Checks, short-circuiting on the first failure:
    ///
    /// 1. the batch is not empty;
    /// 2. the batch does not exceed `max_votes`;
    /// 3. then for each entry in order: it parses as an unsigned id, the
    ///    transaction exists, it is phased, and `max_height >= height`.
    ///
    /// On success the parsed ids are returned in input order.
    pub fn validate_at<F, T>(
        &self,
        values: &[String],
        height: u32,
        lookup: F,
    ) -> Result<Vec<u64>, VoteCastingError>
    where
        F: Fn(u64) -> Option<T>,
        T: std::ops::Deref<Target = LedgerTransaction>,
    {
        if values.is_empty() {
            return Err(VoteCastingError::MissingPendingTransaction);
        }

        let max = self.max_votes as usize;
        if values.len() > max {
            return Err(IncorrectReason::TooMany {
                count: values.len(),
                max,
            }
            .into());
        }

        let mut ids = Vec::with_capacity(values.len());
        for value in values {
            let id = parse_unsigned_id(value).map_err(|_| IncorrectReason::Unparsable {
                value: value.clone(),
            })?;

            let transaction = lookup(id).ok_or(IncorrectReason::UnknownTransaction { id })?;

            let phasing = transaction
                .two_phased()
                .ok_or(IncorrectReason::NotPhased { id })?;

            if !phasing.is_open_at(height) {
                return Err(IncorrectReason::VotingClosed {
                    id,
                    max_height: phasing.max_height,
                    height,
                }
                .into());
            }

            ids.push(id);
        }

        tracing::debug!(count = ids.len(), height, "pending transactions eligible for voting");
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::MemoryChain;
    use crate::transaction::attachment::{ArbitraryMessage, Attachment};

    fn message() -> Attachment {
        ArbitraryMessage::new(b"pay".to_vec()).unwrap().into()
    }

    fn chain_at(height: u32) -> MemoryChain {
        let chain = MemoryChain::new();
        chain.set_height(height);
        chain
    }

    fn add_phased(chain: &MemoryChain, id: u64, max_height: u32) {
        chain.insert(LedgerTransaction::new(id, 1, 0, message()).with_phasing(TwoPhased::new(max_height)));
    }

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn empty_batch_is_missing() {
        let gate = PhasedTransactionGate::new(10);
        let chain = chain_at(1);
        assert_eq!(
            gate.validate(&[], &chain),
            Err(VoteCastingError::MissingPendingTransaction)
        );
    }

    #[test]
    fn oversized_batch_is_incorrect() {
        let gate = PhasedTransactionGate::new(2);
        let chain = chain_at(1);
        for id in 1..=3 {
            add_phased(&chain, id, 10);
        }
        assert_eq!(
            gate.validate(&strings(&["1", "2", "3"]), &chain),
            Err(VoteCastingError::IncorrectPendingTransaction(
                IncorrectReason::TooMany { count: 3, max: 2 }
            ))
        );
    }

    #[test]
    fn unparsable_id_is_incorrect() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(1);
        let err = gate.validate(&strings(&["nope"]), &chain).unwrap_err();
        assert_eq!(err.error_code(), 4);
        assert!(matches!(
            err,
            VoteCastingError::IncorrectPendingTransaction(IncorrectReason::Unparsable { .. })
        ));
    }

    #[test]
    fn unknown_transaction_is_incorrect() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(1);
        assert_eq!(
            gate.validate(&strings(&["77"]), &chain),
            Err(IncorrectReason::UnknownTransaction { id: 77 }.into())
        );
    }

    #[test]
    fn unphased_transaction_is_incorrect() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(1);
        chain.insert(LedgerTransaction::new(5, 1, 0, message()));
        assert_eq!(
            gate.validate(&strings(&["5"]), &chain),
            Err(IncorrectReason::NotPhased { id: 5 }.into())
        );
    }

    #[test]
    fn window_boundary_is_inclusive() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(500);
        add_phased(&chain, 1, 500);
        add_phased(&chain, 2, 499);

        assert_eq!(gate.validate(&strings(&["1"]), &chain), Ok(vec![1]));
        assert_eq!(
            gate.validate(&strings(&["2"]), &chain),
            Err(IncorrectReason::VotingClosed {
                id: 2,
                max_height: 499,
                height: 500
            }
            .into())
        );
    }

    #[test]
    fn one_bad_entry_rejects_the_batch() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(10);
        add_phased(&chain, 1, 20);
        assert!(gate.validate(&strings(&["1", "2"]), &chain).is_err());
    }

    #[test]
    fn preserves_input_order() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(10);
        add_phased(&chain, 30, 20);
        add_phased(&chain, 10, 20);
        add_phased(&chain, 20, 20);
        assert_eq!(
            gate.validate(&strings(&["20", "0x1e", "10"]), &chain),
            Ok(vec![20, 30, 10])
        );
    }

    #[test]
    fn validate_at_uses_supplied_height() {
        let gate = PhasedTransactionGate::default();
        let chain = chain_at(0);
        add_phased(&chain, 1, 100);
        let lookup = |id| chain.transaction_by_id(id);
        assert!(gate.validate_at(&strings(&["1"]), 100, lookup).is_ok());
        assert!(gate.validate_at(&strings(&["1"]), 101, lookup).is_err());
    }
}
