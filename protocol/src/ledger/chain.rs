//! Read-side view of the chain and an in-memory transaction index.
//!
//! The real blockchain lives outside this crate. Everything here consumes it
//! through [`ChainView`]: "give me transaction `id`" and "what is the current
//! height". [`MemoryChain`] is the in-memory stand-in used by the node and
//! by tests.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

use crate::transaction::attachment::Attachment;
use crate::transaction::id::id_to_string;
use crate::transaction::phasing::TwoPhased;

// ---------------------------------------------------------------------------
// LedgerTransaction
// ---------------------------------------------------------------------------

/// A transaction as the ledger index knows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerTransaction {
    /// Transaction id; also the asset id of an issuance.
    pub id: u64,
    /// Account id of the sender.
    pub sender_id: u64,
    /// Height of the block that included the transaction.
    pub height: u32,
    /// Type-specific payload.
    pub attachment: Attachment,
    /// Present when the transaction is phased.
    pub two_phased: Option<TwoPhased>,
}

impl LedgerTransaction {
    pub fn new(id: u64, sender_id: u64, height: u32, attachment: Attachment) -> Self {
        Self {
            id,
            sender_id,
            height,
            attachment,
            two_phased: None,
        }
    }

    /// Marks the transaction as phased.
    pub fn with_phasing(mut self, two_phased: TwoPhased) -> Self {
        self.two_phased = Some(two_phased);
        self
    }

    /// The phasing appendix, if this is a pending transaction.
    pub fn two_phased(&self) -> Option<&TwoPhased> {
        self.two_phased.as_ref()
    }

    /// Derives a transaction id: the first 8 bytes (little-endian) of
    /// `SHA-256(type, subtype, sender, nonce, max_height, attachment bytes)`.
    ///
    /// `max_height` is `u32::MAX` in the preimage when the transaction is
    /// not phased.
    pub fn derive_id(
        sender_id: u64,
        nonce: u64,
        two_phased: Option<&TwoPhased>,
        attachment: &Attachment,
    ) -> u64 {
        let (type_byte, subtype) = attachment.transaction_type().tag();
        let max_height = two_phased.map(|p| p.max_height).unwrap_or(u32::MAX);

        let mut hasher = Sha256::new();
        hasher.update([type_byte, subtype]);
        hasher.update(sender_id.to_le_bytes());
        hasher.update(nonce.to_le_bytes());
        hasher.update(max_height.to_le_bytes());
        hasher.update(attachment.to_bytes());
        let digest = hasher.finalize();

        let mut id = [0u8; 8];
        id.copy_from_slice(&digest[..8]);
        u64::from_le_bytes(id)
    }

    /// JSON view for API clients.
    pub fn to_json(&self) -> Value {
        let (type_byte, subtype) = self.attachment.transaction_type().tag();
        json!({
            "transaction": id_to_string(self.id),
            "sender": id_to_string(self.sender_id),
            "height": self.height,
            "type": type_byte,
            "subtype": subtype,
            "attachment": self.attachment.to_json(),
            "phasing": self.two_phased,
        })
    }
}

// ---------------------------------------------------------------------------
// ChainView
// ---------------------------------------------------------------------------

/// Lookups the ledger offers to request-serving code.
pub trait ChainView: Send + Sync {
    /// Returns the transaction with `id`, if the ledger has it.
    fn transaction_by_id(&self, id: u64) -> Option<Arc<LedgerTransaction>>;

    /// Height of the latest block.
    fn height(&self) -> u32;
}

// ---------------------------------------------------------------------------
// MemoryChain
// ---------------------------------------------------------------------------

/// Concurrent in-memory transaction index plus the chain height.
#[derive(Debug, Default)]
pub struct MemoryChain {
    transactions: DashMap<u64, Arc<LedgerTransaction>>,
    height: AtomicU32,
}

impl MemoryChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes a transaction, replacing any previous one with the same id.
    pub fn insert(&self, transaction: LedgerTransaction) -> Arc<LedgerTransaction> {
        let transaction = Arc::new(transaction);
        self.transactions
            .insert(transaction.id, Arc::clone(&transaction));
        transaction
    }

    pub fn set_height(&self, height: u32) {
        self.height.store(height, Ordering::Release);
    }

    /// Moves the chain one block forward and returns the new height.
    pub fn advance_height(&self) -> u32 {
        self.height.fetch_add(1, Ordering::AcqRel) + 1
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    /// Drops every transaction and resets the height to zero.
    pub fn clear(&self) {
        self.transactions.clear();
        self.height.store(0, Ordering::Release);
    }
}

impl ChainView for MemoryChain {
    fn transaction_by_id(&self, id: u64) -> Option<Arc<LedgerTransaction>> {
        self.transactions.get(&id).map(|entry| Arc::clone(entry.value()))
    }

    fn height(&self) -> u32 {
        self.height.load(Ordering::Acquire)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
