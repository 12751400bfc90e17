//! # Asset Registry
//!
//! Catalog of issued colored-coin assets, indexed by asset id and by
//! lower-cased name.
//!
//! The registry is split into two handles. [`AssetRegistry`] is the
//! read side: cheap to clone, shared by every API handler, never blocks on
//! a writer. [`AssetRegistryWriter`] is the only way to mutate; exactly one
//! exists per registry and it cannot be cloned, so whoever owns it (the
//! ledger-application path) is the single writer.
//!
//! An [`Asset`] is fully built before it is published, and the registry
//! hands out `Arc<Asset>`, so readers never see a half-constructed entry.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use thiserror::Error;

use crate::transaction::id;

// ---------------------------------------------------------------------------
// Asset
// ---------------------------------------------------------------------------

/// An issued asset. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    #[serde(rename = "asset", with = "id::decimal")]
    asset_id: u64,
    #[serde(rename = "account", with = "id::decimal")]
    account_id: u64,
    name: String,
    description: String,
    quantity: i32,
}

impl Asset {
    pub fn asset_id(&self) -> u64 {
        self.asset_id
    }

    /// Account that issued the asset.
    pub fn account_id(&self) -> u64 {
        self.account_id
    }

    /// Name as issued, case preserved.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Reasons an issuance cannot be registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("asset {0} is already registered")]
    DuplicateAssetId(u64),

    #[error("asset name {0:?} is already taken")]
    DuplicateAssetName(String),
}

// ---------------------------------------------------------------------------
// Shared state
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Entry {
    seq: u64,
    asset: Arc<Asset>,
}

#[derive(Debug, Default)]
struct Indices {
    by_id: DashMap<u64, Entry>,
    by_name: DashMap<String, Arc<Asset>>,
    next_seq: AtomicU64,
}

fn name_key(name: &str) -> String {
    name.to_lowercase()
}

// ---------------------------------------------------------------------------
// AssetRegistry (read side)
// ---------------------------------------------------------------------------

/// Read handle over the asset catalog.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    inner: Arc<Indices>,
}

impl AssetRegistry {
    /// Creates an empty registry and its single writer.
    #[allow(clippy::new_ret_no_self)]
    pub fn new() -> (AssetRegistry, AssetRegistryWriter) {
        let inner = Arc::new(Indices::default());
        (
            AssetRegistry {
                inner: Arc::clone(&inner),
            },
            AssetRegistryWriter { inner },
        )
    }

    /// Looks an asset up by id.
    pub fn get_asset(&self, asset_id: u64) -> Option<Arc<Asset>> {
        self.inner
            .by_id
            .get(&asset_id)
            .map(|entry| Arc::clone(&entry.asset))
    }

    /// Looks an asset up by name, ignoring case.
    pub fn get_asset_by_name(&self, name: &str) -> Option<Arc<Asset>> {
        self.inner
            .by_name
            .get(&name_key(name))
            .map(|asset| Arc::clone(asset.value()))
    }

    /// Snapshot of every registered asset in registration order.
    pub fn get_all_assets(&self) -> Vec<Arc<Asset>> {
        let mut entries: Vec<(u64, Arc<Asset>)> = self
            .inner
            .by_id
            .iter()
            .map(|entry| (entry.seq, Arc::clone(&entry.asset)))
            .collect();
        entries.sort_by_key(|(seq, _)| *seq);
        entries.into_iter().map(|(_, asset)| asset).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.by_id.is_empty()
    }
}

// ---------------------------------------------------------------------------
// AssetRegistryWriter (write side)
// ---------------------------------------------------------------------------

/// Exclusive mutation handle. Owned by the ledger-application path.
#[derive(Debug)]
pub struct AssetRegistryWriter {
    inner: Arc<Indices>,
}

impl AssetRegistryWriter {
    /// Registers the asset created by an applied issuance.
    ///
    /// A second registration under the same id, or under a name that matches
    /// an existing one ignoring case, is rejected and leaves the registry
    /// unchanged.
    pub fn add_asset(
        &mut self,
        asset_id: u64,
        account_id: u64,
        name: &str,
        description: &str,
        quantity: i32,
    ) -> Result<Arc<Asset>, RegistryError> {
        let key = name_key(name);
        if self.inner.by_id.contains_key(&asset_id) {
            return Err(RegistryError::DuplicateAssetId(asset_id));
        }
        if self.inner.by_name.contains_key(&key) {
            return Err(RegistryError::DuplicateAssetName(name.to_string()));
        }

        let asset = Arc::new(Asset {
            asset_id,
            account_id,
            name: name.to_string(),
            description: description.to_string(),
            quantity,
        });
        let seq = self.inner.next_seq.fetch_add(1, Ordering::Relaxed);

        self.inner.by_id.insert(
            asset_id,
            Entry {
                seq,
                asset: Arc::clone(&asset),
            },
        );
        self.inner.by_name.insert(key, Arc::clone(&asset));

        tracing::info!(asset_id, account_id, name, quantity, "asset registered");
        Ok(asset)
    }

    /// Removes every asset. Only for full ledger resets (rescan, reorg
    /// recovery).
    ///
    /// The two indices are cleared one after the other. Name lookups go
    /// first, so a reader racing the clear can still find an asset by id
    /// for a moment but never by name alone.
    pub fn clear(&mut self) {
        self.inner.by_name.clear();
        self.inner.by_id.clear();
        tracing::info!("asset registry cleared");
    }

    /// A read handle over the same catalog.
    pub fn reader(&self) -> AssetRegistry {
        AssetRegistry {
            inner: Arc::clone(&self.inner),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
