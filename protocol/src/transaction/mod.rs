//! # Transaction Module
//!
//! Transaction typing, attachment payloads and the vote-casting path.
//!
//! ## Architecture
//!
//! ```text
//! types.rs     : (type, subtype) pairs for every supported transaction
//! attachment.rs: Attachment variants: byte layout, JSON form, decoding
//! id.rs        : unsigned 64-bit ids and their decimal/hex text form
//! wire.rs      : little-endian length-prefixed field helpers
//! phasing.rs   : TwoPhased appendix and the pending-transaction gate
//! voting.rs    : VoteCastingHandler: gate, sender, attachment, submit
//! ```
//!
//! ## Conventions
//!
//! - Every multi-byte integer on the wire is little-endian.
//! - Text fields are UTF-8 behind a length prefix that counts bytes, not
//!   characters.
//! - Ids in JSON are decimal strings.

pub mod attachment;
pub mod id;
pub mod phasing;
pub mod types;
pub mod voting;
pub(crate) mod wire;

pub use attachment::{
    AliasAssignment, ArbitraryMessage, AssetIssuance, AssetTransfer, Attachment, AttachmentError,
    OrderCancellation, OrderTerms, PendingPaymentVoteCasting,
};
pub use id::{id_to_string, parse_unsigned_id, IdParseError};
pub use phasing::{IncorrectReason, PhasedTransactionGate, TwoPhased, VoteCastingError};
pub use types::TransactionType;
pub use voting::{VoteCastingHandler, VoteCastingRequest};
