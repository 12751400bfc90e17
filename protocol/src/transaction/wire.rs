//! Little-endian primitives for attachment layouts.
//!
//! Writers append fixed-width little-endian integers and length-prefixed
//! byte strings to a `Vec<u8>`, the same way the envelope's signable bytes
//! are assembled. [`WireReader`] is the bounds-checked inverse: it never
//! panics on short or hostile input.

use super::attachment::AttachmentError;

/// Appends `bytes` behind a u8 length prefix. The caller guarantees the
/// length fits; constructors enforce this before a value is ever encoded.
pub(crate) fn put_u8_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= u8::MAX as usize);
    buf.push(bytes.len() as u8);
    buf.extend_from_slice(bytes);
}

/// Appends `bytes` behind a little-endian u16 length prefix.
pub(crate) fn put_u16_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= u16::MAX as usize);
    buf.extend_from_slice(&(bytes.len() as u16).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Appends `bytes` behind a little-endian u32 length prefix.
pub(crate) fn put_u32_prefixed(buf: &mut Vec<u8>, bytes: &[u8]) {
    debug_assert!(bytes.len() <= u32::MAX as usize);
    buf.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    buf.extend_from_slice(bytes);
}

/// Cursor over an attachment's bytes.
#[derive(Debug)]
pub(crate) struct WireReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> WireReader<'a> {
    pub(crate) fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.pos
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], AttachmentError> {
        if self.remaining() < n {
            return Err(AttachmentError::Truncated {
                needed: n,
                remaining: self.remaining(),
            });
        }
        let slice = &self.bytes[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> Result<[u8; N], AttachmentError> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N)?);
        Ok(out)
    }

    pub(crate) fn u8(&mut self) -> Result<u8, AttachmentError> {
        Ok(self.take_array::<1>()?[0])
    }

    pub(crate) fn u16(&mut self) -> Result<u16, AttachmentError> {
        Ok(u16::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn u32(&mut self) -> Result<u32, AttachmentError> {
        Ok(u32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn u64(&mut self) -> Result<u64, AttachmentError> {
        Ok(u64::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn i32(&mut self) -> Result<i32, AttachmentError> {
        Ok(i32::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn i64(&mut self) -> Result<i64, AttachmentError> {
        Ok(i64::from_le_bytes(self.take_array()?))
    }

    pub(crate) fn bytes(&mut self, n: usize) -> Result<Vec<u8>, AttachmentError> {
        Ok(self.take(n)?.to_vec())
    }

    /// Reads `n` bytes and requires them to be UTF-8.
    pub(crate) fn text(&mut self, n: usize, field: &'static str) -> Result<String, AttachmentError> {
        let raw = self.take(n)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|_| AttachmentError::InvalidUtf8 { field })
    }

    /// Fails if any input is left unread.
    pub(crate) fn finish(self) -> Result<(), AttachmentError> {
        match self.remaining() {
            0 => Ok(()),
            n => Err(AttachmentError::TrailingBytes(n)),
        }
    }
}
