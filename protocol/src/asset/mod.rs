//! # Asset Module
//!
//! Colored coins: user-issued assets tracked on top of the base ledger.
//! Issuance, transfer and order payloads live in
//! [`crate::transaction::attachment`]; this module keeps the catalog of
//! assets that issuances have created.
//!
//! ```text
//! registry.rs: id/name indexed catalog with a single-writer handle
//! ```

pub mod registry;

pub use registry::{Asset, AssetRegistry, AssetRegistryWriter, RegistryError};
