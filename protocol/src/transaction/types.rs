//! Core type definitions for Tessera transactions.
//!
//! A transaction type is a `(type, subtype)` byte pair. The pair travels in
//! the transaction envelope and tells every node which attachment layout
//! follows and which validation rules apply.

use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Type bytes
// ---------------------------------------------------------------------------

/// Type byte for messaging transactions.
pub const TYPE_MESSAGING: u8 = 1;
/// Type byte for colored-coin transactions.
pub const TYPE_COLORED_COINS: u8 = 2;
/// Type byte for pending (phased) payment transactions.
pub const TYPE_PENDING_PAYMENTS: u8 = 3;

// ---------------------------------------------------------------------------
// TransactionType
// ---------------------------------------------------------------------------

/// Discriminant for the operation a transaction's attachment represents.
///
/// The `(type, subtype)` values returned by [`TransactionType::tag`] are part
/// of the wire format and must never change. New variants get new tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionType {
    /// Free-form binary message.
    ArbitraryMessage,
    /// Binds an alias to a URI.
    AliasAssignment,
    /// Issues a new colored-coin asset.
    AssetIssuance,
    /// Moves asset units to another account.
    AssetTransfer,
    /// Offers asset units for sale.
    AskOrderPlacement,
    /// Bids for asset units.
    BidOrderPlacement,
    /// Withdraws a resting ask order.
    AskOrderCancellation,
    /// Withdraws a resting bid order.
    BidOrderCancellation,
    /// Casts votes for pending (phased) transactions.
    VoteCasting,
}

impl TransactionType {
    /// Every transaction type, in tag order.
    pub const ALL: [TransactionType; 9] = [
        Self::ArbitraryMessage,
        Self::AliasAssignment,
        Self::AssetIssuance,
        Self::AssetTransfer,
        Self::AskOrderPlacement,
        Self::BidOrderPlacement,
        Self::AskOrderCancellation,
        Self::BidOrderCancellation,
        Self::VoteCasting,
    ];

    /// Returns the `(type, subtype)` wire tag.
    pub fn tag(&self) -> (u8, u8) {
        match self {
            Self::ArbitraryMessage => (TYPE_MESSAGING, 0),
            Self::AliasAssignment => (TYPE_MESSAGING, 1),
            Self::AssetIssuance => (TYPE_COLORED_COINS, 0),
            Self::AssetTransfer => (TYPE_COLORED_COINS, 1),
            Self::AskOrderPlacement => (TYPE_COLORED_COINS, 2),
            Self::BidOrderPlacement => (TYPE_COLORED_COINS, 3),
            Self::AskOrderCancellation => (TYPE_COLORED_COINS, 4),
            Self::BidOrderCancellation => (TYPE_COLORED_COINS, 5),
            Self::VoteCasting => (TYPE_PENDING_PAYMENTS, 0),
        }
    }

    /// Resolves a wire tag. Returns `None` for tags no variant owns.
    pub fn from_tag(type_byte: u8, subtype: u8) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.tag() == (type_byte, subtype))
    }

    /// Human-readable family name of the type byte.
    pub fn family(&self) -> &'static str {
        match self.tag().0 {
            TYPE_MESSAGING => "Messaging",
            TYPE_COLORED_COINS => "ColoredCoins",
            _ => "PendingPayments",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::ArbitraryMessage => "ArbitraryMessage",
            Self::AliasAssignment => "AliasAssignment",
            Self::AssetIssuance => "AssetIssuance",
            Self::AssetTransfer => "AssetTransfer",
            Self::AskOrderPlacement => "AskOrderPlacement",
            Self::BidOrderPlacement => "BidOrderPlacement",
            Self::AskOrderCancellation => "AskOrderCancellation",
            Self::BidOrderCancellation => "BidOrderCancellation",
            Self::VoteCasting => "VoteCasting",
        };
        write!(f, "{}.{}", self.family(), name)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
