//! # Ledger Worker
//!
//! The node's stand-in for a block producer. API handlers submit through
//! [`ChannelSubmitter`], which assigns the transaction id and queues the
//! transaction on a bounded channel. [`LedgerWorker`] is the only consumer:
//! every block interval it drains the queue, applies each transaction
//! through its [`LedgerApplier`] (the sole owner of the asset registry
//! writer), indexes the accepted ones in the [`MemoryChain`], and advances
//! the height.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use tessera_protocol::ledger::{
    Account, ChainView, LedgerApplier, LedgerTransaction, MemoryChain, SubmissionError,
    SubmittedTransaction, TransactionSubmitter,
};
use tessera_protocol::transaction::{Attachment, TwoPhased};

use crate::metrics::SharedMetrics;

/// Capacity of the submission queue between the API and the worker.
pub const SUBMISSION_QUEUE_CAPACITY: usize = 1_024;

/// Creates a connected submitter and worker pair.
pub fn channel(
    chain: Arc<MemoryChain>,
    applier: LedgerApplier,
    metrics: SharedMetrics,
) -> (ChannelSubmitter, LedgerWorker) {
    let (tx, rx) = mpsc::channel(SUBMISSION_QUEUE_CAPACITY);
    let submitter = ChannelSubmitter {
        queue: tx,
        nonce: AtomicU64::new(0),
        metrics: metrics.clone(),
    };
    let worker = LedgerWorker {
        chain,
        applier,
        inbox: rx,
        metrics,
    };
    (submitter, worker)
}

// ---------------------------------------------------------------------------
// ChannelSubmitter
// ---------------------------------------------------------------------------

/// Queues created transactions for the ledger worker.
pub struct ChannelSubmitter {
    queue: mpsc::Sender<LedgerTransaction>,
    nonce: AtomicU64,
    metrics: SharedMetrics,
}

impl TransactionSubmitter for ChannelSubmitter {
    fn create_and_broadcast(
        &self,
        sender: &Account,
        attachment: Attachment,
        phasing: Option<TwoPhased>,
    ) -> Result<SubmittedTransaction, SubmissionError> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let id = LedgerTransaction::derive_id(sender.id(), nonce, phasing.as_ref(), &attachment);

        // Height is assigned when the transaction is forged into a block.
        let mut transaction = LedgerTransaction::new(id, sender.id(), 0, attachment.clone());
        if let Some(p) = phasing {
            transaction = transaction.with_phasing(p);
        }

        self.queue.try_send(transaction).map_err(|e| match e {
            mpsc::error::TrySendError::Full(_) => {
                SubmissionError::Unavailable("submission queue is full".into())
            }
            mpsc::error::TrySendError::Closed(_) => {
                SubmissionError::Unavailable("ledger worker has stopped".into())
            }
        })?;

        self.metrics.transactions_submitted_total.inc();
        tracing::debug!(
            transaction = id,
            sender = sender.id(),
            tx_type = %attachment.transaction_type(),
            "transaction queued"
        );

        Ok(SubmittedTransaction {
            transaction: id,
            sender: sender.id(),
            attachment_size: attachment.size(),
            attachment,
            phasing,
        })
    }
}

// ---------------------------------------------------------------------------
// LedgerWorker
// ---------------------------------------------------------------------------

/// Outcome of one forged block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForgedBlock {
    pub height: u32,
    pub applied: usize,
    pub rejected: usize,
}

/// Single writer over the chain index and the asset registry.
pub struct LedgerWorker {
    chain: Arc<MemoryChain>,
    applier: LedgerApplier,
    inbox: mpsc::Receiver<LedgerTransaction>,
    metrics: SharedMetrics,
}

impl LedgerWorker {
    /// Forges one block out of everything queued so far.
    pub fn forge_block(&mut self) -> ForgedBlock {
        let height = self.chain.height().saturating_add(1);
        let mut applied = 0;
        let mut rejected = 0;

        while let Ok(mut transaction) = self.inbox.try_recv() {
            transaction.height = height;
            match self.applier.apply(&transaction) {
                Ok(()) => {
                    self.chain.insert(transaction);
                    applied += 1;
                    self.metrics
                        .transactions_applied_total
                        .with_label_values(&["applied"])
                        .inc();
                }
                Err(e) => {
                    rejected += 1;
                    self.metrics
                        .transactions_applied_total
                        .with_label_values(&["rejected"])
                        .inc();
                    tracing::warn!(
                        transaction = transaction.id,
                        sender = transaction.sender_id,
                        error = %e,
                        height,
                        "transaction dropped from block"
                    );
                }
            }
        }

        self.chain.set_height(height);
        self.metrics.blocks_forged_total.inc();
        self.metrics.block_height.set(i64::from(height));
        self.metrics
            .registered_assets
            .set(self.applier.assets().len() as i64);

        if applied + rejected > 0 {
            tracing::info!(height, applied, rejected, "block forged");
        } else {
            tracing::debug!(height, "empty block forged");
        }

        ForgedBlock {
            height,
            applied,
            rejected,
        }
    }

    /// Forges a block every `interval` until the task is aborted.
    pub async fn run(mut self, interval: Duration) {
        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.forge_block();
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::NodeMetrics;
    use tessera_protocol::asset::AssetRegistry;
    use tessera_protocol::transaction::{ArbitraryMessage, AssetIssuance};

    fn setup() -> (Arc<MemoryChain>, AssetRegistry, ChannelSubmitter, LedgerWorker) {
        let chain = Arc::new(MemoryChain::new());
        let (registry, writer) = AssetRegistry::new();
        let metrics = Arc::new(NodeMetrics::new().unwrap());
        let (submitter, worker) = channel(Arc::clone(&chain), LedgerApplier::new(writer), metrics);
        (chain, registry, submitter, worker)
    }

    fn issuance(name: &str) -> Attachment {
        AssetIssuance::new(name, None, 100).unwrap().into()
    }

    #[test]
    fn queued_transactions_land_in_next_block() {
        let (chain, registry, submitter, mut worker) = setup();
        let alice = Account::from_public_key([1u8; 32]);

        let receipt = submitter
            .create_and_broadcast(&alice, issuance("Gold"), None)
            .unwrap();
        assert!(chain.transaction_by_id(receipt.transaction).is_none());

        let block = worker.forge_block();
        assert_eq!(block, ForgedBlock { height: 1, applied: 1, rejected: 0 });
        assert_eq!(chain.height(), 1);

        let stored = chain.transaction_by_id(receipt.transaction).unwrap();
        assert_eq!(stored.height, 1);
        assert_eq!(registry.get_asset(receipt.transaction).unwrap().name(), "Gold");
    }

    #[test]
    fn identical_submissions_get_distinct_ids() {
        let (_chain, _registry, submitter, _worker) = setup();
        let alice = Account::from_public_key([1u8; 32]);
        let message: Attachment = ArbitraryMessage::new(b"hi".to_vec()).unwrap().into();
        let a = submitter
            .create_and_broadcast(&alice, message.clone(), None)
            .unwrap();
        let b = submitter.create_and_broadcast(&alice, message, None).unwrap();
        assert_ne!(a.transaction, b.transaction);
    }

    #[test]
    fn rejected_issuance_is_not_indexed() {
        let (chain, registry, submitter, mut worker) = setup();
        let alice = Account::from_public_key([1u8; 32]);
        submitter
            .create_and_broadcast(&alice, issuance("Gold"), None)
            .unwrap();
        let dup = submitter
            .create_and_broadcast(&alice, issuance("GOLD"), None)
            .unwrap();

        let block = worker.forge_block();
        assert_eq!(block.applied, 1);
        assert_eq!(block.rejected, 1);
        assert!(chain.transaction_by_id(dup.transaction).is_none());
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn phasing_is_kept_on_the_indexed_transaction() {
        let (chain, _registry, submitter, mut worker) = setup();
        let alice = Account::from_public_key([1u8; 32]);
        let message: Attachment = ArbitraryMessage::new(b"escrow".to_vec()).unwrap().into();
        let receipt = submitter
            .create_and_broadcast(&alice, message, Some(TwoPhased::new(50)))
            .unwrap();
        worker.forge_block();
        let stored = chain.transaction_by_id(receipt.transaction).unwrap();
        assert_eq!(stored.two_phased(), Some(&TwoPhased::new(50)));
    }

    #[test]
    fn stopped_worker_makes_pipeline_unavailable() {
        let (_chain, _registry, submitter, worker) = setup();
        drop(worker);
        let alice = Account::from_public_key([1u8; 32]);
        assert!(matches!(
            submitter.create_and_broadcast(&alice, issuance("Gold"), None),
            Err(SubmissionError::Unavailable(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn run_forges_on_interval() {
        let (chain, _registry, _submitter, worker) = setup();
        let handle = tokio::spawn(worker.run(Duration::from_millis(100)));
        tokio::time::sleep(Duration::from_millis(350)).await;
        handle.abort();
        assert_eq!(chain.height(), 3);
    }
}
