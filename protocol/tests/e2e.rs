//! End-to-end integration tests for the Tessera protocol crate.
//!
//! These wire the public pieces together the way a node does: a
//! [`MemoryChain`] as the ledger index, a [`LedgerApplier`] owning the asset
//! registry writer, and a [`VoteCastingHandler`] submitting through a
//! pipeline that indexes transactions straight into the chain.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use tessera_protocol::asset::AssetRegistry;
use tessera_protocol::ledger::{
    Account, ChainView, LedgerApplier, LedgerTransaction, MemoryChain, PublicKeyResolver,
    SubmissionError, SubmittedTransaction, TransactionSubmitter,
};
use tessera_protocol::transaction::{
    ArbitraryMessage, AssetIssuance, Attachment, IncorrectReason, PhasedTransactionGate,
    TransactionType, TwoPhased, VoteCastingError, VoteCastingHandler, VoteCastingRequest,
};

// ---------------------------------------------------------------------------
// Test Helpers
// ---------------------------------------------------------------------------

/// Pipeline that includes every transaction in the next block immediately.
struct InstantPipeline {
    chain: Arc<MemoryChain>,
    applier: Mutex<LedgerApplier>,
    nonce: AtomicU64,
}

impl InstantPipeline {
    fn new(chain: Arc<MemoryChain>) -> (Arc<Self>, AssetRegistry) {
        let (registry, writer) = AssetRegistry::new();
        let pipeline = Arc::new(Self {
            chain,
            applier: Mutex::new(LedgerApplier::new(writer)),
            nonce: AtomicU64::new(0),
        });
        (pipeline, registry)
    }
}

impl TransactionSubmitter for InstantPipeline {
    fn create_and_broadcast(
        &self,
        sender: &Account,
        attachment: Attachment,
        phasing: Option<TwoPhased>,
    ) -> Result<SubmittedTransaction, SubmissionError> {
        let nonce = self.nonce.fetch_add(1, Ordering::Relaxed);
        let id = LedgerTransaction::derive_id(sender.id(), nonce, phasing.as_ref(), &attachment);
        let height = self.chain.advance_height();

        let mut tx = LedgerTransaction::new(id, sender.id(), height, attachment.clone());
        if let Some(p) = phasing {
            tx = tx.with_phasing(p);
        }
        self.applier
            .lock()
            .unwrap()
            .apply(&tx)
            .map_err(|e| SubmissionError::Rejected(e.to_string()))?;
        self.chain.insert(tx);

        Ok(SubmittedTransaction {
            transaction: id,
            sender: sender.id(),
            attachment_size: attachment.size(),
            attachment,
            phasing,
        })
    }
}

fn voter_key() -> String {
    hex::encode([0x42u8; 32])
}

fn handler(chain: &Arc<MemoryChain>, pipeline: &Arc<InstantPipeline>) -> VoteCastingHandler {
    VoteCastingHandler::new(
        PhasedTransactionGate::default(),
        Arc::clone(chain) as Arc<dyn ChainView>,
        Arc::new(PublicKeyResolver),
        Arc::clone(pipeline) as Arc<dyn TransactionSubmitter>,
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[test]
fn vote_on_phased_transactions_at_window_edge() {
    let chain = Arc::new(MemoryChain::new());
    for id in [100u64, 200] {
        let payload: Attachment = ArbitraryMessage::new(b"escrow".to_vec()).unwrap().into();
        chain.insert(LedgerTransaction::new(id, 1, 1, payload).with_phasing(TwoPhased::new(500)));
    }
    chain.set_height(500);

    let (pipeline, _registry) = InstantPipeline::new(Arc::clone(&chain));
    let handler = handler(&chain, &pipeline);

    let receipt = handler
        .handle(&VoteCastingRequest {
            public_key: voter_key(),
            pending_transaction: vec!["100".into(), "200".into()],
        })
        .expect("vote accepted");

    match &receipt.attachment {
        Attachment::PendingPaymentVoteCasting(votes) => {
            assert_eq!(votes.pending_transaction_ids(), &[100, 200]);
        }
        other => panic!("unexpected attachment {other:?}"),
    }

    let stored = chain.transaction_by_id(receipt.transaction).expect("indexed");
    assert_eq!(
        stored.attachment.transaction_type(),
        TransactionType::VoteCasting
    );

    // The vote itself moved the chain past the window.
    assert_eq!(chain.height(), 501);
    let err = handler
        .handle(&VoteCastingRequest {
            public_key: voter_key(),
            pending_transaction: vec!["100".into()],
        })
        .unwrap_err();
    assert_eq!(
        err,
        VoteCastingError::IncorrectPendingTransaction(IncorrectReason::VotingClosed {
            id: 100,
            max_height: 500,
            height: 501,
        })
    );
}

#[test]
fn issuance_registers_asset_visible_by_name() {
    let chain = Arc::new(MemoryChain::new());
    let (pipeline, registry) = InstantPipeline::new(Arc::clone(&chain));
    let issuer = Account::from_public_key([7u8; 32]);

    let receipt = pipeline
        .create_and_broadcast(
            &issuer,
            AssetIssuance::new("Gold", Some("shiny"), 21_000_000)
                .unwrap()
                .into(),
            None,
        )
        .unwrap();

    let asset = registry.get_asset_by_name("GOLD").expect("registered");
    assert_eq!(asset.asset_id(), receipt.transaction);
    assert_eq!(asset.account_id(), issuer.id());
    assert_eq!(asset.quantity(), 21_000_000);

    // Same name again, different case: the registry keeps the first.
    let err = pipeline
        .create_and_broadcast(
            &issuer,
            AssetIssuance::new("gold", None, 1).unwrap().into(),
            None,
        )
        .unwrap_err();
    assert!(matches!(err, SubmissionError::Rejected(_)));
    assert_eq!(registry.len(), 1);
}

#[test]
fn phased_submission_becomes_votable() {
    let chain = Arc::new(MemoryChain::new());
    let (pipeline, _registry) = InstantPipeline::new(Arc::clone(&chain));
    let handler = handler(&chain, &pipeline);
    let sender = Account::from_public_key([1u8; 32]);

    let pending = pipeline
        .create_and_broadcast(
            &sender,
            ArbitraryMessage::new(b"release funds".to_vec()).unwrap().into(),
            Some(TwoPhased::new(10)),
        )
        .unwrap();

    let receipt = handler
        .handle(&VoteCastingRequest {
            public_key: voter_key(),
            pending_transaction: vec![format!("{:#x}", pending.transaction)],
        })
        .expect("vote accepted");
    assert_eq!(receipt.attachment_size, 9);
}

#[test]
fn stored_bytes_decode_back_to_attachment() {
    let chain = Arc::new(MemoryChain::new());
    let (pipeline, _registry) = InstantPipeline::new(Arc::clone(&chain));
    let sender = Account::from_public_key([2u8; 32]);

    let receipt = pipeline
        .create_and_broadcast(
            &sender,
            AssetIssuance::new("Silver", None, 5).unwrap().into(),
            None,
        )
        .unwrap();
    let stored = chain.transaction_by_id(receipt.transaction).unwrap();
    let (type_byte, subtype) = stored.attachment.transaction_type().tag();
    let decoded =
        Attachment::from_tagged_bytes(type_byte, subtype, &stored.attachment.to_bytes()).unwrap();
    assert_eq!(decoded, stored.attachment);
}
