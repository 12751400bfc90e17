//! # Ledger Module
//!
//! The slice of the ledger this crate talks to. The blockchain itself,
//! balances and signatures are someone else's problem; here we keep the
//! interfaces request handlers consume and the in-memory pieces the node
//! runs on.
//!
//! ```text
//! chain.rs   : ChainView trait, LedgerTransaction, in-memory MemoryChain
//! account.rs : Account ids derived from public keys
//! pipeline.rs: SenderResolver / TransactionSubmitter seams
//! apply.rs   : LedgerApplier: single-writer application into the asset registry
//! ```

pub mod account;
pub mod apply;
pub mod chain;
pub mod pipeline;

pub use account::{Account, AccountError};
pub use apply::{ApplyError, LedgerApplier};
pub use chain::{ChainView, LedgerTransaction, MemoryChain};
pub use pipeline::{
    PublicKeyResolver, SenderResolver, SubmissionError, SubmittedTransaction,
    TransactionSubmitter,
};
