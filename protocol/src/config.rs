//! # Protocol Configuration & Constants
//!
//! Every magic number in Tessera lives here. Wire widths in particular are
//! part of the hashing and signing contract: transaction ids are computed
//! over bytes laid out with exactly these prefix sizes, so changing one is a
//! hard fork, not a refactor.

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// The full protocol version string.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Attachment Wire Widths
// ---------------------------------------------------------------------------

/// Largest alias (in UTF-8 bytes) expressible behind the u8 length prefix.
pub const MAX_ALIAS_BYTES: usize = u8::MAX as usize;

/// Largest alias URI (in UTF-8 bytes) expressible behind the u16 prefix.
pub const MAX_ALIAS_URI_BYTES: usize = u16::MAX as usize;

/// Largest asset name (in UTF-8 bytes) expressible behind the u8 prefix.
pub const MAX_ASSET_NAME_BYTES: usize = u8::MAX as usize;

/// Largest asset description (in UTF-8 bytes) behind the u16 prefix.
pub const MAX_ASSET_DESCRIPTION_BYTES: usize = u16::MAX as usize;

/// Largest arbitrary message behind the u32 prefix.
pub const MAX_ARBITRARY_MESSAGE_BYTES: usize = u32::MAX as usize;

/// Largest number of pending transaction ids behind the u8 count prefix.
pub const MAX_VOTE_COUNT_PREFIX: usize = u8::MAX as usize;

// ---------------------------------------------------------------------------
// Phased Transactions
// ---------------------------------------------------------------------------

/// Default cap on pending-transaction references per vote-casting
/// attachment. Nodes may override it (up to [`MAX_VOTE_COUNT_PREFIX`]).
pub const MAX_VOTES_PER_VOTING_TRANSACTION: u8 = 10;

// ---------------------------------------------------------------------------
// Node Defaults
// ---------------------------------------------------------------------------

/// Default RPC API port.
pub const DEFAULT_RPC_PORT: u16 = 7874;

/// Default metrics (Prometheus) port.
pub const DEFAULT_METRICS_PORT: u16 = 7875;

/// Target interval between forged blocks, in milliseconds.
pub const BLOCK_TIME_MS: u64 = 2_000;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_cap_fits_count_prefix() {
        assert!(MAX_VOTES_PER_VOTING_TRANSACTION as usize <= MAX_VOTE_COUNT_PREFIX);
        assert!(MAX_VOTES_PER_VOTING_TRANSACTION > 0);
    }

    #[test]
    fn test_prefix_widths() {
        assert_eq!(MAX_ALIAS_BYTES, 255);
        assert_eq!(MAX_ASSET_NAME_BYTES, 255);
        assert_eq!(MAX_ALIAS_URI_BYTES, 65_535);
        assert_eq!(MAX_ASSET_DESCRIPTION_BYTES, 65_535);
    }

    #[test]
    fn test_block_time_is_positive() {
        assert!(BLOCK_TIME_MS > 0);
    }
}
