//! Ledger-side effects of applied transactions that this crate owns.
//!
//! The ledger state machine applies transactions one at a time, in block
//! order, on a single path. When it does, [`LedgerApplier::apply`] updates
//! the state kept here. Today that is the asset registry: an applied
//! issuance registers an asset whose id is the issuing transaction's id.

use thiserror::Error;

use super::chain::LedgerTransaction;
use crate::asset::{AssetRegistry, AssetRegistryWriter, RegistryError};
use crate::transaction::attachment::Attachment;

/// Failure to apply a transaction's effects.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApplyError {
    #[error("transaction {transaction}: {source}")]
    Registry {
        transaction: u64,
        #[source]
        source: RegistryError,
    },
}

/// Owns the asset registry's writer.
#[derive(Debug)]
pub struct LedgerApplier {
    assets: AssetRegistryWriter,
}

impl LedgerApplier {
    pub fn new(assets: AssetRegistryWriter) -> Self {
        Self { assets }
    }

    /// Read handle over the registry this applier writes.
    pub fn assets(&self) -> AssetRegistry {
        self.assets.reader()
    }

    /// Applies `transaction`. Attachments without registry effects are
    /// accepted as no-ops.
    pub fn apply(&mut self, transaction: &LedgerTransaction) -> Result<(), ApplyError> {
        match &transaction.attachment {
            Attachment::AssetIssuance(issuance) => {
                self.assets
                    .add_asset(
                        transaction.id,
                        transaction.sender_id,
                        issuance.name(),
                        issuance.description(),
                        issuance.quantity(),
                    )
                    .map_err(|source| ApplyError::Registry {
                        transaction: transaction.id,
                        source,
                    })?;
            }
            other => {
                tracing::trace!(
                    transaction = transaction.id,
                    tx_type = %other.transaction_type(),
                    "no registry effect"
                );
            }
        }
        Ok(())
    }

    /// Wipes derived state ahead of a full rescan.
    pub fn reset(&mut self) {
        self.assets.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::attachment::{AssetIssuance, AssetTransfer};

    fn applier() -> (AssetRegistry, LedgerApplier) {
        let (registry, writer) = AssetRegistry::new();
        (registry, LedgerApplier::new(writer))
    }

    #[test]
    fn issuance_registers_asset_under_transaction_id() {
        let (registry, mut applier) = applier();
        let issuance = AssetIssuance::new("Gold", None, 1_000).unwrap();
        applier
            .apply(&LedgerTransaction::new(42, 7, 1, issuance.into()))
            .unwrap();

        let asset = registry.get_asset(42).expect("registered");
        assert_eq!(asset.account_id(), 7);
        assert_eq!(asset.name(), "Gold");
        assert_eq!(asset.description(), "");
        assert_eq!(asset.quantity(), 1_000);
    }

    #[test]
    fn other_attachments_are_noops() {
        let (registry, mut applier) = applier();
        applier
            .apply(&LedgerTransaction::new(1, 7, 1, AssetTransfer::new(Some(42), 5).into()))
            .unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn duplicate_issuance_surfaces_registry_error() {
        let (_registry, mut applier) = applier();
        let issuance: Attachment = AssetIssuance::new("Gold", None, 1).unwrap().into();
        applier
            .apply(&LedgerTransaction::new(1, 7, 1, issuance.clone()))
            .unwrap();
        assert_eq!(
            applier.apply(&LedgerTransaction::new(2, 8, 1, issuance)),
            Err(ApplyError::Registry {
                transaction: 2,
                source: RegistryError::DuplicateAssetName("Gold".into()),
            })
        );
    }

    #[test]
    fn reset_clears_registry() {
        let (registry, mut applier) = applier();
        let issuance = AssetIssuance::new("Gold", None, 1).unwrap();
        applier
            .apply(&LedgerTransaction::new(1, 7, 1, issuance.into()))
            .unwrap();
        applier.reset();
        assert!(applier.assets().is_empty());
        assert!(registry.get_asset(1).is_none());
    }
}
