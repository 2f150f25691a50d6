//! TLV headers: tag + length, decoded and encoded together (C1).

use crate::error::{Error, ErrorKind};
use crate::length;
use crate::tag::Tag;

/// The tag + length portion of one TLV production.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Header {
    /// Tag octet.
    pub tag: Tag,
    /// Decoded payload length in octets.
    pub payload_length: u32,
    /// Octets occupied by this header (tag + length octets): 2 for the
    /// short form, `2 + n` for long form with `n` length octets.
    pub header_length: usize,
}

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Header {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let tag = <Tag as arbitrary::Arbitrary>::arbitrary(u)?;
        let payload_length: u32 = u.arbitrary()?;
        // `header_length` isn't free-standing: it's however many octets
        // `length::encode` would spend on `payload_length`, plus the tag
        // octet, so a fuzz target that re-encodes this header round-trips.
        let header_length = 1 + crate::length::encode(payload_length).len();
        Ok(Header { tag, payload_length, header_length })
    }
}

impl Header {
    /// Decode a header at `buf[offset]`.
    pub fn decode(buf: &[u8], offset: usize) -> Result<Header, Error> {
        let tag_byte = *buf
            .get(offset)
            .ok_or_else(|| ErrorKind::Incomplete.at(offset))?;
        let tag = Tag::from_octet(tag_byte, offset)?;

        let (payload_length, header_length) = length::decode(buf, offset + 1)?;

        Ok(Header {
            tag,
            payload_length,
            header_length,
        })
    }

    /// Total length of tag + length + value for this header.
    pub fn full_length(&self) -> u64 {
        self.header_length as u64 + self.payload_length as u64
    }
}

/// Encode a tag + length prefix (without the payload) for `tag` wrapping a
/// payload of `payload_len` octets (C3 — DER emitter).
pub fn encode_prefix(tag: Tag, payload_len: u32) -> Vec<u8> {
    let mut out = Vec::with_capacity(6);
    out.push(tag.octet());
    out.extend(length::encode(payload_len));
    out
}

/// Wrap `payload` with `tag`, producing a complete TLV.
pub fn wrap(tag: Tag, payload: &[u8]) -> Vec<u8> {
    let mut out = encode_prefix(tag, payload.len() as u32);
    out.extend_from_slice(payload);
    out
}
