//! DER builder (C7): compose TLV sequences byte-by-byte or value-by-value,
//! mirroring the reader's tag/length conventions so a tree built here reads
//! back identically through [`crate::reader::TlvReader`].

use time::OffsetDateTime;

use crate::datetime;
use crate::error::{Error, ErrorKind};
use crate::header;
use crate::oid;
use crate::reader::predict_children;
use crate::tag::{universal, Class, Tag};

/// The tag this crate wraps a builder's children in when none is given
/// explicitly: a constructed, universal `SEQUENCE`.
pub const DEFAULT_OUTER_TAG: Tag = Tag::new(Class::Universal, true, universal::SEQUENCE);

fn universal_primitive(number: u8) -> Tag {
    Tag::new(Class::Universal, false, number)
}

/// Accumulates encoded children; `get_encoded`/`encode` wrap them in an
/// outer tag to produce the final TLV.
#[derive(Clone, Debug, Default)]
pub struct Builder {
    children: Vec<u8>,
}

impl Builder {
    /// An empty builder.
    pub fn new() -> Self {
        Builder { children: Vec::new() }
    }

    fn push_tlv(&mut self, tag: Tag, payload: &[u8]) -> &mut Self {
        self.children.extend(header::wrap(tag, payload));
        self
    }

    pub fn add_boolean(&mut self, value: bool) -> &mut Self {
        self.push_tlv(universal_primitive(universal::BOOLEAN), &[if value { 0xFF } else { 0x00 }])
    }

    /// `bytes` is the two's-complement big-endian INTEGER payload, including
    /// any leading `0x00` needed to keep a high-bit value non-negative.
    pub fn add_integer(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_tlv(universal_primitive(universal::INTEGER), bytes)
    }

    pub fn add_enumerated(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_tlv(universal_primitive(universal::ENUMERATED), bytes)
    }

    pub fn add_null(&mut self) -> &mut Self {
        self.push_tlv(universal_primitive(universal::NULL), &[])
    }

    pub fn add_octet_string(&mut self, bytes: &[u8]) -> &mut Self {
        self.push_tlv(universal_primitive(universal::OCTET_STRING), bytes)
    }

    /// `unused_bits` must be in `0..=7`.
    pub fn add_bit_string(&mut self, bits: &[u8], unused_bits: u8) -> Result<&mut Self, Error> {
        if unused_bits > 7 {
            return Err(ErrorKind::InvalidData.into());
        }
        let mut payload = Vec::with_capacity(1 + bits.len());
        payload.push(unused_bits);
        payload.extend_from_slice(bits);
        Ok(self.push_tlv(universal_primitive(universal::BIT_STRING), &payload))
    }

    pub fn add_oid(&mut self, dotted: &str) -> Result<&mut Self, Error> {
        let payload = oid::encode(dotted)?;
        Ok(self.push_tlv(universal_primitive(universal::OBJECT_IDENTIFIER), &payload))
    }

    pub fn add_utf8_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::UTF8_STRING), s.as_bytes())
    }

    pub fn add_printable_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::PRINTABLE_STRING), s.as_bytes())
    }

    pub fn add_ia5_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::IA5_STRING), s.as_bytes())
    }

    pub fn add_numeric_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::NUMERIC_STRING), s.as_bytes())
    }

    pub fn add_visible_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::VISIBLE_STRING), s.as_bytes())
    }

    /// `TeletexString`: treated byte-for-byte like IA5, matching this
    /// crate's policy of checking structure, not per-type alphabets.
    pub fn add_teletex_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::TELETEX_STRING), s.as_bytes())
    }

    pub fn add_videotex_string(&mut self, s: &str) -> &mut Self {
        self.push_tlv(universal_primitive(universal::VIDEOTEX_STRING), s.as_bytes())
    }

    /// `UniversalString`: UCS-4, big-endian, one 4-octet group per code point.
    pub fn add_universal_string(&mut self, s: &str) -> &mut Self {
        let mut payload = Vec::with_capacity(s.chars().count() * 4);
        for c in s.chars() {
            payload.extend_from_slice(&(c as u32).to_be_bytes());
        }
        self.push_tlv(universal_primitive(universal::UNIVERSAL_STRING), &payload)
    }

    /// `BMPString`: UCS-2, big-endian. Errors if `s` contains a code point
    /// outside the basic multilingual plane.
    pub fn add_bmp_string(&mut self, s: &str) -> Result<&mut Self, Error> {
        let mut payload = Vec::with_capacity(s.chars().count() * 2);
        for c in s.chars() {
            let code = c as u32;
            if code > 0xFFFF {
                return Err(ErrorKind::InvalidData.into());
            }
            payload.extend_from_slice(&(code as u16).to_be_bytes());
        }
        Ok(self.push_tlv(universal_primitive(universal::BMP_STRING), &payload))
    }

    pub fn add_utc_time(&mut self, dt: OffsetDateTime, precise: bool) -> Result<&mut Self, Error> {
        let payload = datetime::encode_payload(dt, precise, false)?;
        Ok(self.push_tlv(universal_primitive(universal::UTC_TIME), &payload))
    }

    pub fn add_generalized_time(&mut self, dt: OffsetDateTime, precise: bool) -> Result<&mut Self, Error> {
        let payload = datetime::encode_payload(dt, precise, true)?;
        Ok(self.push_tlv(universal_primitive(universal::GENERALIZED_TIME), &payload))
    }

    /// Picks `UTCTime` or `GeneralizedTime` per the RFC 5280 year-2050 rule.
    pub fn add_rfc_datetime(&mut self, dt: OffsetDateTime, precise: bool) -> Result<&mut Self, Error> {
        let tag_number = datetime::rfc5280_tag_for_year(dt.year());
        let generalized = tag_number == universal::GENERALIZED_TIME;
        let payload = datetime::encode_payload(dt, precise, generalized)?;
        Ok(self.push_tlv(universal_primitive(tag_number), &payload))
    }

    /// `payload` must be a back-to-back concatenation of complete TLVs
    /// (typically built with a nested [`Builder`] and its `children`, via
    /// [`Builder::add_sequence_with`]).
    pub fn add_sequence(&mut self, payload: &[u8]) -> Result<&mut Self, Error> {
        if predict_children(payload, 0, payload.len()).is_none() {
            return Err(ErrorKind::InvalidData.into());
        }
        Ok(self.push_tlv(Tag::new(Class::Universal, true, universal::SEQUENCE), payload))
    }

    /// As [`Builder::add_sequence`], for `SET`.
    pub fn add_set(&mut self, payload: &[u8]) -> Result<&mut Self, Error> {
        if predict_children(payload, 0, payload.len()).is_none() {
            return Err(ErrorKind::InvalidData.into());
        }
        Ok(self.push_tlv(Tag::new(Class::Universal, true, universal::SET), payload))
    }

    /// Build a `SEQUENCE` from a nested builder instead of raw bytes.
    pub fn add_sequence_with(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        let mut inner = Builder::new();
        build(&mut inner);
        self.push_tlv(Tag::new(Class::Universal, true, universal::SEQUENCE), &inner.children)
    }

    /// As [`Builder::add_sequence_with`], for `SET`.
    pub fn add_set_with(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        let mut inner = Builder::new();
        build(&mut inner);
        self.push_tlv(Tag::new(Class::Universal, true, universal::SET), &inner.children)
    }

    /// Build an `OCTET STRING` whose payload is itself a nested builder's
    /// output — the pattern the reader's opportunistic descent is designed
    /// to recover.
    pub fn add_octet_string_with(&mut self, build: impl FnOnce(&mut Builder)) -> &mut Self {
        let mut inner = Builder::new();
        build(&mut inner);
        self.push_tlv(universal_primitive(universal::OCTET_STRING), &inner.children)
    }

    /// As [`Builder::add_octet_string_with`], for `BIT STRING`.
    pub fn add_bit_string_with(&mut self, unused_bits: u8, build: impl FnOnce(&mut Builder)) -> Result<&mut Self, Error> {
        if unused_bits > 7 {
            return Err(ErrorKind::InvalidData.into());
        }
        let mut inner = Builder::new();
        build(&mut inner);
        let mut payload = Vec::with_capacity(1 + inner.children.len());
        payload.push(unused_bits);
        payload.extend(inner.children);
        Ok(self.push_tlv(universal_primitive(universal::BIT_STRING), &payload))
    }

    /// `[IMPLICIT tag_number]`: replace the tag of an underlying value with
    /// a context-specific one, leaving its length and payload untouched.
    ///
    /// When `must_encode` is true, `bytes` is the *payload* of the value
    /// being tagged and is freshly wrapped as `0x80 | tag_number` (a
    /// primitive context-specific TLV). When false, `bytes` is already a
    /// complete TLV (tag + length + payload) — typically the output of
    /// another `add_*` call on a scratch builder — and only its leading tag
    /// octet is rewritten in place, preserving whether the original was
    /// constructed.
    pub fn add_implicit(&mut self, tag_number: u8, bytes: &[u8], must_encode: bool) -> Result<&mut Self, Error> {
        if must_encode {
            return Ok(self.push_tlv(Tag::new(Class::ContextSpecific, false, tag_number), bytes));
        }

        let original_tag = *bytes.first().ok_or_else(|| Error::from(ErrorKind::InvalidData))?;
        let constructed = original_tag & 0x20 != 0;
        let mut tlv = bytes.to_vec();
        tlv[0] = Tag::new(Class::ContextSpecific, constructed, tag_number).octet();
        self.children.extend(tlv);
        Ok(self)
    }

    /// `[EXPLICIT tag_number]`: wrap the single already-encoded TLV in
    /// `inner_tlv` inside a constructed context-specific tag.
    pub fn add_explicit(&mut self, tag_number: u8, inner_tlv: &[u8]) -> Result<&mut Self, Error> {
        if predict_children(inner_tlv, 0, inner_tlv.len()).map(|spans| spans.len()) != Some(1) {
            return Err(ErrorKind::InvalidData.into());
        }
        Ok(self.push_tlv(Tag::new(Class::ContextSpecific, true, tag_number), inner_tlv))
    }

    /// Append an already-encoded TLV verbatim, with no further wrapping,
    /// after validating that `bytes` is exactly one well-formed TLV.
    pub fn add_raw(&mut self, bytes: &[u8]) -> Result<&mut Self, Error> {
        if predict_children(bytes, 0, bytes.len()).map(|spans| spans.len()) != Some(1) {
            return Err(ErrorKind::InvalidData.into());
        }
        self.children.extend_from_slice(bytes);
        Ok(self)
    }

    /// Wrap `bytes` in `outer_tag` and append the result, without otherwise
    /// validating `bytes`.
    pub fn add_raw_wrapped(&mut self, bytes: &[u8], outer_tag: Tag) -> &mut Self {
        self.push_tlv(outer_tag, bytes)
    }

    /// Wrap the accumulated children in `outer_tag` without consuming the
    /// builder; further `add_*` calls still see the unwrapped children.
    pub fn get_encoded(&self, outer_tag: Tag) -> Vec<u8> {
        header::wrap(outer_tag, &self.children)
    }

    /// Wrap the accumulated children in `outer_tag`, then replace the
    /// builder's contents with that wrapped TLV: a later `add_*` call
    /// appends alongside the finished value rather than inside it.
    pub fn encode(&mut self, outer_tag: Tag) -> Vec<u8> {
        let wrapped = header::wrap(outer_tag, &self.children);
        self.children = wrapped.clone();
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_of_two_integers_round_trips() {
        // S1
        let mut b = Builder::new();
        b.add_integer(&[0x05]).add_integer(&[0x03]);
        let encoded = b.get_encoded(DEFAULT_OUTER_TAG);
        assert_eq!(encoded, [0x30, 0x06, 0x02, 0x01, 0x05, 0x02, 0x01, 0x03]);
    }

    #[test]
    fn nested_sequence_builder_round_trips() {
        // S5: SEQUENCE { SEQUENCE { INTEGER 1, UTF8String "hi" } }
        let mut outer = Builder::new();
        outer.add_sequence_with(|inner| {
            inner.add_integer(&[0x01]).add_utf8_string("hi");
        });
        let encoded = outer.get_encoded(DEFAULT_OUTER_TAG);
        assert_eq!(
            encoded,
            [0x30, 0x09, 0x30, 0x07, 0x02, 0x01, 0x01, 0x0C, 0x02, 0x68, 0x69]
        );
    }

    #[test]
    fn add_sequence_rejects_payload_that_isnt_back_to_back_tlvs() {
        let mut b = Builder::new();
        assert!(b.add_sequence(&[0x02, 0x01]).is_err());
    }

    #[test]
    fn get_encoded_does_not_consume_the_builder() {
        let mut b = Builder::new();
        b.add_boolean(true);
        let first = b.get_encoded(DEFAULT_OUTER_TAG);
        let second = b.get_encoded(DEFAULT_OUTER_TAG);
        assert_eq!(first, second);
    }

    #[test]
    fn encode_replaces_builder_contents_with_the_wrapped_tlv() {
        let mut b = Builder::new();
        b.add_boolean(true);
        let once = b.encode(DEFAULT_OUTER_TAG);
        let twice = b.encode(DEFAULT_OUTER_TAG);
        assert_eq!(twice, header::wrap(DEFAULT_OUTER_TAG, &once));
    }

    #[test]
    fn implicit_tag_wraps_a_fresh_payload_when_must_encode() {
        let mut b = Builder::new();
        b.add_implicit(0, &[0x05], true).unwrap();
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x03, 0x80, 0x01, 0x05]);
    }

    #[test]
    fn implicit_tag_rewrites_only_the_leading_octet_of_an_existing_tlv() {
        let mut b = Builder::new();
        let inner = header::wrap(universal_primitive(universal::INTEGER), &[0x05]);
        b.add_implicit(0, &inner, false).unwrap();
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x03, 0x80, 0x01, 0x05]);
    }

    #[test]
    fn implicit_tag_preserves_the_constructed_bit_of_an_existing_tlv() {
        let mut b = Builder::new();
        let inner = header::wrap(Tag::new(Class::Universal, true, universal::SEQUENCE), &[0x02, 0x01, 0x05]);
        b.add_implicit(0, &inner, false).unwrap();
        let encoded = b.get_encoded(DEFAULT_OUTER_TAG);
        assert_eq!(encoded[2], 0xA0);
    }

    #[test]
    fn explicit_tag_wraps_a_single_inner_tlv() {
        let mut b = Builder::new();
        let inner = header::wrap(universal_primitive(universal::INTEGER), &[0x05]);
        b.add_explicit(0, &inner).unwrap();
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x05, 0xA0, 0x03, 0x02, 0x01, 0x05]);
    }

    #[test]
    fn bmp_string_encodes_ucs2_big_endian() {
        let mut b = Builder::new();
        b.add_bmp_string("hi").unwrap();
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x06, 0x1E, 0x04, 0x00, 0x68, 0x00, 0x69]);
    }

    #[test]
    fn bmp_string_rejects_code_points_outside_the_bmp() {
        let mut b = Builder::new();
        assert!(b.add_bmp_string("\u{1F600}").is_err());
    }

    #[test]
    fn universal_string_encodes_ucs4_big_endian() {
        let mut b = Builder::new();
        b.add_universal_string("A");
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x06, 0x1C, 0x04, 0x00, 0x00, 0x00, 0x41]);
    }

    #[test]
    fn explicit_tag_rejects_more_than_one_inner_value() {
        let mut b = Builder::new();
        let inner_a = header::wrap(universal_primitive(universal::INTEGER), &[0x05]);
        let inner_b = header::wrap(universal_primitive(universal::INTEGER), &[0x06]);
        let mut both = inner_a;
        both.extend(inner_b);
        assert!(b.add_explicit(0, &both).is_err());
    }

    #[test]
    fn add_raw_appends_a_validated_tlv_verbatim() {
        let mut b = Builder::new();
        let inner = header::wrap(universal_primitive(universal::INTEGER), &[0x2A]);
        b.add_raw(&inner).unwrap();
        assert_eq!(b.get_encoded(DEFAULT_OUTER_TAG), [0x30, 0x03, 0x02, 0x01, 0x2A]);
    }

    #[test]
    fn add_raw_rejects_malformed_or_trailing_bytes() {
        let mut b = Builder::new();
        assert!(b.add_raw(&[0x02, 0x05]).is_err());

        let mut two = header::wrap(universal_primitive(universal::INTEGER), &[0x01]);
        two.extend(header::wrap(universal_primitive(universal::INTEGER), &[0x02]));
        assert!(b.add_raw(&two).is_err());
    }
}
