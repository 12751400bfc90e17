//! Transaction attachments: the type-specific payload of a transaction.
//!
//! Each variant hard-codes its byte layout. Transaction ids and signatures
//! are computed over these exact bytes, so field order, endianness and
//! prefix widths are consensus rules:
//!
//! | Variant                     | Layout (little-endian)                              |
//! |-----------------------------|-----------------------------------------------------|
//! | `ArbitraryMessage`          | u32 len, bytes                                      |
//! | `AliasAssignment`           | u8 len, alias, u16 len, uri                         |
//! | `AssetIssuance`             | u8 len, name, u16 len, description, i32 quantity    |
//! | `AssetTransfer`             | u64 asset, i32 quantity                             |
//! | `Ask/BidOrderPlacement`     | u64 asset, i32 quantity, i64 price                  |
//! | `Ask/BidOrderCancellation`  | u64 order                                           |
//! | `PendingPaymentVoteCasting` | u8 count, count x u64 transaction id                |
//!
//! Text is always valid UTF-8 (it is a `&str`), so the only way encoding can
//! fail is a field longer than its prefix can express. Constructors reject
//! that up front with [`AttachmentError::FieldTooLong`]; once an attachment
//! exists, [`Attachment::to_bytes`] is infallible and its length always
//! equals [`Attachment::size`].
//!
//! Ids that may be logically absent (`None`) encode as zero.

use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use thiserror::Error;

use super::id::id_to_string;
use super::types::TransactionType;
use super::wire::{put_u16_prefixed, put_u32_prefixed, put_u8_prefixed, WireReader};
use crate::config::{
    MAX_ALIAS_BYTES, MAX_ALIAS_URI_BYTES, MAX_ARBITRARY_MESSAGE_BYTES,
    MAX_ASSET_DESCRIPTION_BYTES, MAX_ASSET_NAME_BYTES, MAX_VOTE_COUNT_PREFIX,
};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while constructing or decoding an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttachmentError {
    /// A field does not fit behind its length prefix.
    #[error("{field} is {len} bytes, wire limit is {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    /// The input ended before the layout was complete.
    #[error("attachment truncated: needed {needed} bytes, {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// Bytes were left over after the layout was complete.
    #[error("{0} trailing bytes after attachment")]
    TrailingBytes(usize),

    /// A text field did not decode as UTF-8.
    #[error("{field} is not valid UTF-8")]
    InvalidUtf8 { field: &'static str },

    /// No attachment layout is registered for the tag.
    #[error("unknown transaction type {type_byte}/{subtype}")]
    UnknownTransactionType { type_byte: u8, subtype: u8 },
}

fn check_len(field: &'static str, len: usize, max: usize) -> Result<(), AttachmentError> {
    if len > max {
        tracing::debug!(field, len, max, "attachment field exceeds wire limit");
        return Err(AttachmentError::FieldTooLong { field, len, max });
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Layout
// ---------------------------------------------------------------------------

/// The per-variant layout contract.
pub(crate) trait Layout: Sized {
    /// Exact number of bytes [`Layout::write_to`] appends.
    fn size(&self) -> usize;
    fn write_to(&self, buf: &mut Vec<u8>);
    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError>;
    fn to_json(&self) -> Value;
}

// ---------------------------------------------------------------------------
// ArbitraryMessage
// ---------------------------------------------------------------------------

/// An opaque binary message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArbitraryMessage {
    message: Vec<u8>,
}

impl ArbitraryMessage {
    pub fn new(message: impl Into<Vec<u8>>) -> Result<Self, AttachmentError> {
        let message = message.into();
        check_len("message", message.len(), MAX_ARBITRARY_MESSAGE_BYTES)?;
        Ok(Self { message })
    }

    pub fn message(&self) -> &[u8] {
        &self.message
    }
}

impl Layout for ArbitraryMessage {
    fn size(&self) -> usize {
        4 + self.message.len()
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        put_u32_prefixed(buf, &self.message);
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        let len = reader.u32()? as usize;
        Ok(Self {
            message: reader.bytes(len)?,
        })
    }

    fn to_json(&self) -> Value {
        json!({ "message": hex::encode(&self.message) })
    }
}

// ---------------------------------------------------------------------------
// AliasAssignment
// ---------------------------------------------------------------------------

/// Binds an alias to a URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasAssignment {
    alias: String,
    uri: String,
}

impl AliasAssignment {
    pub fn new(alias: &str, uri: &str) -> Result<Self, AttachmentError> {
        check_len("alias", alias.len(), MAX_ALIAS_BYTES)?;
        check_len("uri", uri.len(), MAX_ALIAS_URI_BYTES)?;
        Ok(Self {
            alias: alias.to_string(),
            uri: uri.to_string(),
        })
    }

    pub fn alias(&self) -> &str {
        &self.alias
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }
}

impl Layout for AliasAssignment {
    fn size(&self) -> usize {
        1 + self.alias.len() + 2 + self.uri.len()
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        put_u8_prefixed(buf, self.alias.as_bytes());
        put_u16_prefixed(buf, self.uri.as_bytes());
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        let alias_len = reader.u8()? as usize;
        let alias = reader.text(alias_len, "alias")?;
        let uri_len = reader.u16()? as usize;
        let uri = reader.text(uri_len, "uri")?;
        Ok(Self { alias, uri })
    }

    fn to_json(&self) -> Value {
        json!({ "alias": self.alias, "uri": self.uri })
    }
}

// ---------------------------------------------------------------------------
// AssetIssuance
// ---------------------------------------------------------------------------

/// Issues a new colored-coin asset. The issuing transaction's id becomes the
/// asset id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetIssuance {
    name: String,
    description: String,
    quantity: i32,
}

impl AssetIssuance {
    /// A missing description is stored, encoded and rendered as `""`.
    pub fn new(name: &str, description: Option<&str>, quantity: i32) -> Result<Self, AttachmentError> {
        let description = description.unwrap_or("");
        check_len("name", name.len(), MAX_ASSET_NAME_BYTES)?;
        check_len("description", description.len(), MAX_ASSET_DESCRIPTION_BYTES)?;
        Ok(Self {
            name: name.to_string(),
            description: description.to_string(),
            quantity,
        })
    }

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

impl Layout for AssetIssuance {
    fn size(&self) -> usize {
        1 + self.name.len() + 2 + self.description.len() + 4
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        put_u8_prefixed(buf, self.name.as_bytes());
        put_u16_prefixed(buf, self.description.as_bytes());
        buf.extend_from_slice(&self.quantity.to_le_bytes());
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        let name_len = reader.u8()? as usize;
        let name = reader.text(name_len, "name")?;
        let description_len = reader.u16()? as usize;
        let description = reader.text(description_len, "description")?;
        let quantity = reader.i32()?;
        Ok(Self {
            name,
            description,
            quantity,
        })
    }

    fn to_json(&self) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "quantity": self.quantity,
        })
    }
}

// ---------------------------------------------------------------------------
// AssetTransfer
// ---------------------------------------------------------------------------

/// Moves units of an asset. The recipient lives in the envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssetTransfer {
    asset: u64,
    quantity: i32,
}

impl AssetTransfer {
    pub fn new(asset: Option<u64>, quantity: i32) -> Self {
        Self {
            asset: asset.unwrap_or(0),
            quantity,
        }
    }

    pub fn asset(&self) -> u64 {
        self.asset
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }
}

impl Layout for AssetTransfer {
    fn size(&self) -> usize {
        8 + 4
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.asset.to_le_bytes());
        buf.extend_from_slice(&self.quantity.to_le_bytes());
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        Ok(Self {
            asset: reader.u64()?,
            quantity: reader.i32()?,
        })
    }

    fn to_json(&self) -> Value {
        json!({ "asset": id_to_string(self.asset), "quantity": self.quantity })
    }
}

// ---------------------------------------------------------------------------
// Orders
// ---------------------------------------------------------------------------

/// Asset, quantity and limit price shared by ask and bid placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderTerms {
    asset: u64,
    quantity: i32,
    price: i64,
}

impl OrderTerms {
    pub fn new(asset: Option<u64>, quantity: i32, price: i64) -> Self {
        Self {
            asset: asset.unwrap_or(0),
            quantity,
            price,
        }
    }

    pub fn asset(&self) -> u64 {
        self.asset
    }

    pub fn quantity(&self) -> i32 {
        self.quantity
    }

    pub fn price(&self) -> i64 {
        self.price
    }
}

impl Layout for OrderTerms {
    fn size(&self) -> usize {
        8 + 4 + 8
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.asset.to_le_bytes());
        buf.extend_from_slice(&self.quantity.to_le_bytes());
        buf.extend_from_slice(&self.price.to_le_bytes());
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        Ok(Self {
            asset: reader.u64()?,
            quantity: reader.i32()?,
            price: reader.i64()?,
        })
    }

    fn to_json(&self) -> Value {
        json!({
            "asset": id_to_string(self.asset),
            "quantity": self.quantity,
            "price": self.price,
        })
    }
}

/// Reference to the order being withdrawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderCancellation {
    order: u64,
}

impl OrderCancellation {
    pub fn new(order: Option<u64>) -> Self {
        Self {
            order: order.unwrap_or(0),
        }
    }

    pub fn order(&self) -> u64 {
        self.order
    }
}

impl Layout for OrderCancellation {
    fn size(&self) -> usize {
        8
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.extend_from_slice(&self.order.to_le_bytes());
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        Ok(Self {
            order: reader.u64()?,
        })
    }

    fn to_json(&self) -> Value {
        json!({ "order": id_to_string(self.order) })
    }
}

// ---------------------------------------------------------------------------
// PendingPaymentVoteCasting
// ---------------------------------------------------------------------------

/// Votes for one or more pending (phased) transactions, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingPaymentVoteCasting {
    pending_transaction_ids: Vec<u64>,
}

impl PendingPaymentVoteCasting {
    pub fn new(pending_transaction_ids: Vec<u64>) -> Result<Self, AttachmentError> {
        check_len(
            "pendingTransactionIds",
            pending_transaction_ids.len(),
            MAX_VOTE_COUNT_PREFIX,
        )?;
        Ok(Self {
            pending_transaction_ids,
        })
    }

    pub fn pending_transaction_ids(&self) -> &[u64] {
        &self.pending_transaction_ids
    }
}

impl Layout for PendingPaymentVoteCasting {
    fn size(&self) -> usize {
        1 + 8 * self.pending_transaction_ids.len()
    }

    fn write_to(&self, buf: &mut Vec<u8>) {
        buf.push(self.pending_transaction_ids.len() as u8);
        for id in &self.pending_transaction_ids {
            buf.extend_from_slice(&id.to_le_bytes());
        }
    }

    fn read_from(reader: &mut WireReader<'_>) -> Result<Self, AttachmentError> {
        let count = reader.u8()? as usize;
        let pending_transaction_ids = (0..count)
            .map(|_| reader.u64())
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            pending_transaction_ids,
        })
    }

    fn to_json(&self) -> Value {
        let ids: Vec<String> = self
            .pending_transaction_ids
            .iter()
            .map(|id| id_to_string(*id))
            .collect();
        json!({ "pendingTransactionIds": ids })
    }
}

// ---------------------------------------------------------------------------
// Attachment
// ---------------------------------------------------------------------------

/// The closed set of transaction payloads.
///
/// Ask and bid variants share a body type; the variant alone decides the
/// transaction type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attachment {
    ArbitraryMessage(ArbitraryMessage),
    AliasAssignment(AliasAssignment),
    AssetIssuance(AssetIssuance),
    AssetTransfer(AssetTransfer),
    AskOrderPlacement(OrderTerms),
    BidOrderPlacement(OrderTerms),
    AskOrderCancellation(OrderCancellation),
    BidOrderCancellation(OrderCancellation),
    PendingPaymentVoteCasting(PendingPaymentVoteCasting),
}

/// Dispatches a [`Layout`] method over every variant.
macro_rules! with_layout {
    ($self:expr, $body:ident => $e:expr) => {
        match $self {
            Attachment::ArbitraryMessage($body) => $e,
            Attachment::AliasAssignment($body) => $e,
            Attachment::AssetIssuance($body) => $e,
            Attachment::AssetTransfer($body) => $e,
            Attachment::AskOrderPlacement($body) | Attachment::BidOrderPlacement($body) => $e,
            Attachment::AskOrderCancellation($body) | Attachment::BidOrderCancellation($body) => $e,
            Attachment::PendingPaymentVoteCasting($body) => $e,
        }
    };
}

impl Attachment {
    /// The transaction type this attachment belongs to.
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            Self::ArbitraryMessage(_) => TransactionType::ArbitraryMessage,
            Self::AliasAssignment(_) => TransactionType::AliasAssignment,
            Self::AssetIssuance(_) => TransactionType::AssetIssuance,
            Self::AssetTransfer(_) => TransactionType::AssetTransfer,
            Self::AskOrderPlacement(_) => TransactionType::AskOrderPlacement,
            Self::BidOrderPlacement(_) => TransactionType::BidOrderPlacement,
            Self::AskOrderCancellation(_) => TransactionType::AskOrderCancellation,
            Self::BidOrderCancellation(_) => TransactionType::BidOrderCancellation,
            Self::PendingPaymentVoteCasting(_) => TransactionType::VoteCasting,
        }
    }

    /// Exact length of [`Attachment::to_bytes`]. Fee calculation and buffer
    /// pre-allocation rely on this.
    pub fn size(&self) -> usize {
        with_layout!(self, body => body.size())
    }

    /// Canonical wire bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.size());
        with_layout!(self, body => body.write_to(&mut buf));
        debug_assert_eq!(buf.len(), self.size());
        buf
    }

    /// Client-facing JSON projection. Field names are part of the API.
    pub fn to_json(&self) -> Value {
        with_layout!(self, body => body.to_json())
    }

    /// Decodes the attachment of a transaction of type `tx_type`. The whole
    /// input must be consumed.
    pub fn from_bytes(tx_type: TransactionType, bytes: &[u8]) -> Result<Self, AttachmentError> {
        let mut reader = WireReader::new(bytes);
        let attachment = match tx_type {
            TransactionType::ArbitraryMessage => {
                Self::ArbitraryMessage(ArbitraryMessage::read_from(&mut reader)?)
            }
            TransactionType::AliasAssignment => {
                Self::AliasAssignment(AliasAssignment::read_from(&mut reader)?)
            }
            TransactionType::AssetIssuance => {
                Self::AssetIssuance(AssetIssuance::read_from(&mut reader)?)
            }
            TransactionType::AssetTransfer => {
                Self::AssetTransfer(AssetTransfer::read_from(&mut reader)?)
            }
            TransactionType::AskOrderPlacement => {
                Self::AskOrderPlacement(OrderTerms::read_from(&mut reader)?)
            }
            TransactionType::BidOrderPlacement => {
                Self::BidOrderPlacement(OrderTerms::read_from(&mut reader)?)
            }
            TransactionType::AskOrderCancellation => {
                Self::AskOrderCancellation(OrderCancellation::read_from(&mut reader)?)
            }
            TransactionType::BidOrderCancellation => {
                Self::BidOrderCancellation(OrderCancellation::read_from(&mut reader)?)
            }
            TransactionType::VoteCasting => {
                Self::PendingPaymentVoteCasting(PendingPaymentVoteCasting::read_from(&mut reader)?)
            }
        };
        reader.finish()?;
        Ok(attachment)
    }

    /// Decodes by raw `(type, subtype)` tag.
    pub fn from_tagged_bytes(type_byte: u8, subtype: u8, bytes: &[u8]) -> Result<Self, AttachmentError> {
        let tx_type = TransactionType::from_tag(type_byte, subtype)
            .ok_or(AttachmentError::UnknownTransactionType { type_byte, subtype })?;
        Self::from_bytes(tx_type, bytes)
    }
}

impl Serialize for Attachment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.to_json().serialize(serializer)
    }
}

impl From<ArbitraryMessage> for Attachment {
    fn from(body: ArbitraryMessage) -> Self {
        Self::ArbitraryMessage(body)
    }
}

impl From<AliasAssignment> for Attachment {
    fn from(body: AliasAssignment) -> Self {
        Self::AliasAssignment(body)
    }
}

impl From<AssetIssuance> for Attachment {
    fn from(body: AssetIssuance) -> Self {
        Self::AssetIssuance(body)
    }
}

impl From<AssetTransfer> for Attachment {
    fn from(body: AssetTransfer) -> Self {
        Self::AssetTransfer(body)
    }
}

impl From<PendingPaymentVoteCasting> for Attachment {
    fn from(body: PendingPaymentVoteCasting) -> Self {
        Self::PendingPaymentVoteCasting(body)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
