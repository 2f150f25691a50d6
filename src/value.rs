//! Typed universal-tag values (C6): a tagged-variant enum over a node's raw
//! payload, plus free functions for formatting it for humans.
//!
//! Deliberately not a class hierarchy: every universal type the reader can
//! hand back is one variant of [`ValueKind`], so a `match` over it is
//! exhaustiveness-checked by the compiler rather than relying on downcasts.

use core::fmt::Write as _;

use base64ct::{Base64, Encoding as _};
use time::OffsetDateTime;

use crate::datetime;
use crate::error::{Error, ErrorKind};
use crate::oid;
use crate::tag::{universal, Class, Tag};

/// Output format for [`TypedValue::format`].
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Encoding {
    Base64,
    Hex,
}

/// The parsed shape of a value, without its raw bytes (kept separately on
/// [`TypedValue`] so `raw_bytes`/`format` work uniformly across variants).
#[derive(Clone, Debug, PartialEq)]
pub enum ValueKind<'a> {
    Boolean(bool),
    Integer,
    BitString { unused_bits: u8, bits: &'a [u8] },
    OctetString,
    Null,
    ObjectIdentifier(String),
    Enumerated,
    CharacterString(&'a str),
    UtcTime(OffsetDateTime),
    GeneralizedTime(OffsetDateTime),
    /// Anything outside the set this crate gives dedicated treatment to:
    /// non-universal tags, and universal tags it doesn't special-case.
    Other,
}

/// A decoded value: its tag, raw payload, and parsed [`ValueKind`].
#[derive(Clone, Debug, PartialEq)]
pub struct TypedValue<'a> {
    tag: Tag,
    payload: &'a [u8],
    kind: ValueKind<'a>,
}

impl<'a> TypedValue<'a> {
    /// The value's tag.
    pub fn tag(&self) -> Tag {
        self.tag
    }

    /// [`Tag::name`] of the value's tag.
    pub fn tag_name(&self) -> String {
        self.tag.name()
    }

    /// The raw, undecoded payload bytes.
    pub fn raw_bytes(&self) -> &'a [u8] {
        self.payload
    }

    /// The parsed variant.
    pub fn kind(&self) -> &ValueKind<'a> {
        &self.kind
    }

    /// Whether this tag is one the reader opportunistically descends into
    /// (`OCTET STRING` / `BIT STRING`).
    pub fn is_container(&self) -> bool {
        self.tag.class() == Class::Universal
            && matches!(self.tag.number(), universal::OCTET_STRING | universal::BIT_STRING)
    }

    /// A human-readable rendering tailored to the variant.
    pub fn display(&self) -> String {
        match &self.kind {
            ValueKind::Boolean(b) => b.to_string(),
            ValueKind::Integer | ValueKind::Enumerated => hex_string(self.payload),
            ValueKind::BitString { unused_bits, bits } => {
                format!("{} unused bit(s), {} octet(s): {}", unused_bits, bits.len(), hex_string(bits))
            }
            ValueKind::OctetString => format!("{} octet(s): {}", self.payload.len(), hex_string(self.payload)),
            ValueKind::Null => "NULL".to_string(),
            ValueKind::ObjectIdentifier(dotted) => match oid::friendly_name(dotted) {
                Some(name) => format!("{dotted} ({name})"),
                None => dotted.clone(),
            },
            ValueKind::CharacterString(s) => s.to_string(),
            ValueKind::UtcTime(dt) | ValueKind::GeneralizedTime(dt) => dt.to_string(),
            ValueKind::Other => format!("{} octet(s): {}", self.payload.len(), hex_string(self.payload)),
        }
    }

    /// Render the raw payload in `encoding`.
    pub fn format(&self, encoding: Encoding) -> String {
        match encoding {
            Encoding::Base64 => Base64::encode_string(self.payload),
            Encoding::Hex => hex_string(self.payload),
        }
    }
}

fn hex_string(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(out, "{b:02x}").unwrap();
    }
    out
}

/// Decode `payload` (the payload octets of a TLV, no tag/length) into its
/// typed value under `tag`.
pub fn decode<'a>(tag: Tag, payload: &'a [u8]) -> Result<TypedValue<'a>, Error> {
    let kind = if tag.class() != Class::Universal {
        ValueKind::Other
    } else {
        match tag.number() {
            universal::BOOLEAN => {
                let b = *payload.first().ok_or_else(|| Error::from(ErrorKind::InvalidData))?;
                ValueKind::Boolean(b != 0)
            }
            universal::INTEGER => ValueKind::Integer,
            universal::ENUMERATED => ValueKind::Enumerated,
            universal::NULL => {
                if !payload.is_empty() {
                    return Err(ErrorKind::InvalidData.into());
                }
                ValueKind::Null
            }
            universal::OBJECT_IDENTIFIER => ValueKind::ObjectIdentifier(oid::decode(payload)?),
            universal::OCTET_STRING => ValueKind::OctetString,
            universal::BIT_STRING => {
                let unused_bits = *payload.first().ok_or_else(|| Error::from(ErrorKind::InvalidData))?;
                if unused_bits > 7 {
                    return Err(ErrorKind::InvalidData.into());
                }
                ValueKind::BitString { unused_bits, bits: &payload[1..] }
            }
            universal::UTF8_STRING
            | universal::PRINTABLE_STRING
            | universal::IA5_STRING
            | universal::NUMERIC_STRING
            | universal::VISIBLE_STRING => {
                let s = core::str::from_utf8(payload).map_err(|_| Error::from(ErrorKind::InvalidData))?;
                ValueKind::CharacterString(s)
            }
            universal::UTC_TIME => {
                let (dt, _) = datetime::decode_payload(payload)?;
                ValueKind::UtcTime(dt)
            }
            universal::GENERALIZED_TIME => {
                let (dt, _) = datetime::decode_payload(payload)?;
                ValueKind::GeneralizedTime(dt)
            }
            _ => ValueKind::Other,
        }
    };

    Ok(TypedValue { tag, payload, kind })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tag::Tag;
    use time::macros::datetime;

    fn universal_tag(number: u8) -> Tag {
        Tag::new(Class::Universal, false, number)
    }

    #[test]
    fn boolean_displays_as_true_or_false() {
        let v = decode(universal_tag(universal::BOOLEAN), &[0xFF]).unwrap();
        assert_eq!(v.display(), "true");
    }

    #[test]
    fn object_identifier_looks_up_friendly_name() {
        let bytes = oid::encode("1.2.840.113549.1.1.11").unwrap();
        let v = decode(universal_tag(universal::OBJECT_IDENTIFIER), &bytes).unwrap();
        assert!(v.display().contains("1.2.840.113549.1.1.11"));
    }

    #[test]
    fn octet_string_reports_as_a_container() {
        let v = decode(universal_tag(universal::OCTET_STRING), &[1, 2, 3]).unwrap();
        assert!(v.is_container());
    }

    #[test]
    fn integer_is_not_a_container() {
        let v = decode(universal_tag(universal::INTEGER), &[1]).unwrap();
        assert!(!v.is_container());
    }

    #[test]
    fn format_base64_and_hex_agree_on_length() {
        let v = decode(universal_tag(universal::OCTET_STRING), &[0xDE, 0xAD, 0xBE, 0xEF]).unwrap();
        assert_eq!(v.format(Encoding::Hex), "deadbeef");
        assert_eq!(v.format(Encoding::Base64), "3q2+7w==");
    }

    #[test]
    fn bit_string_splits_unused_bits_octet_from_payload() {
        let v = decode(universal_tag(universal::BIT_STRING), &[0x03, 0b1010_0000]).unwrap();
        match v.kind() {
            ValueKind::BitString { unused_bits, bits } => {
                assert_eq!(*unused_bits, 3);
                assert_eq!(*bits, [0b1010_0000]);
            }
            other => panic!("unexpected kind: {other:?}"),
        }
    }

    #[test]
    fn generalized_time_round_trips_through_display() {
        let dt = datetime!(2030-01-01 00:00:00 UTC);
        let payload = datetime::encode_payload(dt, false, true).unwrap();
        let v = decode(universal_tag(universal::GENERALIZED_TIME), &payload).unwrap();
        assert!(matches!(v.kind(), ValueKind::GeneralizedTime(_)));
    }
}
