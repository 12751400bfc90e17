//! # Tessera Protocol
//!
//! Core library of the Tessera ledger: typed transaction attachments with a
//! fixed binary layout, the colored-coin asset registry, and casting votes
//! on phased (pending) transactions.
//!
//! ## Modules
//!
//! - **transaction**: Transaction types, attachment codecs, phasing and vote casting.
//! - **asset**: Catalog of issued assets, looked up by id or name.
//! - **ledger**: Chain view, accounts, submission seams and ledger application.
//! - **config**: Protocol constants and limits.
//!
//! The blockchain itself (blocks, signatures, fees, balances) is consumed
//! through the traits in [`ledger`] and is not implemented here.

pub mod asset;
pub mod config;
pub mod ledger;
pub mod transaction;
