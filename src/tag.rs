//! Tag octet classification.

use crate::error::{Error, ErrorKind};
use core::fmt;

/// Bits 7-6 of the tag octet.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[cfg_attr(feature = "arbitrary", derive(arbitrary::Arbitrary))]
pub enum Class {
    /// `00` — tags defined by X.680 with meaning across all ASN.1 modules.
    Universal,
    /// `01` — meaning defined by the enclosing application.
    Application,
    /// `10` — meaning defined by the enclosing constructed type.
    ContextSpecific,
    /// `11` — meaning defined by an enterprise/vendor.
    Private,
}

impl Class {
    fn from_bits(byte: u8) -> Class {
        match byte & 0xc0 {
            0x00 => Class::Universal,
            0x40 => Class::Application,
            0x80 => Class::ContextSpecific,
            0xc0 => Class::Private,
            _ => unreachable!(),
        }
    }

    fn bits(self) -> u8 {
        match self {
            Class::Universal => 0x00,
            Class::Application => 0x40,
            Class::ContextSpecific => 0x80,
            Class::Private => 0xc0,
        }
    }
}

/// Universal tag numbers used directly by this crate (tag numbers 0-30 are
/// within the single-octet tag form; multi-byte high-tag-number forms are
/// not supported).
pub mod universal {
    /// `BOOLEAN`
    pub const BOOLEAN: u8 = 0x01;
    /// `INTEGER`
    pub const INTEGER: u8 = 0x02;
    /// `BIT STRING`
    pub const BIT_STRING: u8 = 0x03;
    /// `OCTET STRING`
    pub const OCTET_STRING: u8 = 0x04;
    /// `NULL`
    pub const NULL: u8 = 0x05;
    /// `OBJECT IDENTIFIER`
    pub const OBJECT_IDENTIFIER: u8 = 0x06;
    /// `OBJECT DESCRIPTOR`
    pub const OBJECT_DESCRIPTOR: u8 = 0x07;
    /// `REAL`
    pub const REAL: u8 = 0x09;
    /// `ENUMERATED`
    pub const ENUMERATED: u8 = 0x0a;
    /// `UTF8String`
    pub const UTF8_STRING: u8 = 0x0c;
    /// `RELATIVE-OID`
    pub const RELATIVE_OID: u8 = 0x0d;
    /// `SEQUENCE` (always constructed)
    pub const SEQUENCE: u8 = 0x10;
    /// `SET` (always constructed)
    pub const SET: u8 = 0x11;
    /// `NumericString`
    pub const NUMERIC_STRING: u8 = 0x12;
    /// `PrintableString`
    pub const PRINTABLE_STRING: u8 = 0x13;
    /// `TeletexString`
    pub const TELETEX_STRING: u8 = 0x14;
    /// `VideotexString`
    pub const VIDEOTEX_STRING: u8 = 0x15;
    /// `IA5String`
    pub const IA5_STRING: u8 = 0x16;
    /// `UTCTime`
    pub const UTC_TIME: u8 = 0x17;
    /// `GeneralizedTime`
    pub const GENERALIZED_TIME: u8 = 0x18;
    /// `VisibleString`
    pub const VISIBLE_STRING: u8 = 0x1a;
    /// `UniversalString`
    pub const UNIVERSAL_STRING: u8 = 0x1c;
    /// `BMPString`
    pub const BMP_STRING: u8 = 0x1e;
}

fn universal_name(number: u8) -> Option<&'static str> {
    use universal::*;
    Some(match number {
        BOOLEAN => "BOOLEAN",
        INTEGER => "INTEGER",
        BIT_STRING => "BIT_STRING",
        OCTET_STRING => "OCTET_STRING",
        NULL => "NULL",
        OBJECT_IDENTIFIER => "OBJECT_IDENTIFIER",
        OBJECT_DESCRIPTOR => "OBJECT_DESCRIPTOR",
        REAL => "REAL",
        ENUMERATED => "ENUMERATED",
        UTF8_STRING => "UTF8_STRING",
        RELATIVE_OID => "RELATIVE_OID",
        SEQUENCE => "SEQUENCE",
        SET => "SET",
        NUMERIC_STRING => "NUMERIC_STRING",
        PRINTABLE_STRING => "PRINTABLE_STRING",
        TELETEX_STRING => "TELETEX_STRING",
        VIDEOTEX_STRING => "VIDEOTEX_STRING",
        IA5_STRING => "IA5_STRING",
        UTC_TIME => "UTC_TIME",
        GENERALIZED_TIME => "GENERALIZED_TIME",
        VISIBLE_STRING => "VISIBLE_STRING",
        UNIVERSAL_STRING => "UNIVERSAL_STRING",
        BMP_STRING => "BMP_STRING",
        _ => return None,
    })
}

/// A decoded tag octet.
///
/// Tag number 31 (the high-tag-number escape) and multi-byte tags are not
/// supported — only the single-octet tag form.
#[derive(Copy, Clone, Eq, PartialEq)]
pub struct Tag(u8);

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for Tag {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        // `0x00` is the one reserved tag octet `from_octet` rejects.
        Ok(Tag(u.int_in_range(1u8..=255u8)?))
    }
}

impl Tag {
    /// Wrap a raw tag octet, rejecting the reserved `0x00` tag.
    pub fn from_octet(byte: u8, position: crate::error::Position) -> Result<Tag, Error> {
        if byte == 0 {
            return Err(ErrorKind::InvalidTag { actual: byte }.at(position));
        }
        Ok(Tag(byte))
    }

    /// Build a tag from class, constructed bit and tag number (0..=30).
    pub const fn new(class: Class, constructed: bool, number: u8) -> Tag {
        let mut byte = class.bits() | (number & 0x1f);
        if constructed {
            byte |= 0x20;
        }
        Tag(byte)
    }

    /// The raw tag octet.
    pub const fn octet(self) -> u8 {
        self.0
    }

    /// Tag class (bits 7-6).
    pub fn class(self) -> Class {
        Class::from_bits(self.0)
    }

    /// Tag number (bits 4-0).
    pub const fn number(self) -> u8 {
        self.0 & 0x1f
    }

    /// Whether bit 5 (the constructed bit) is set in the raw octet.
    ///
    /// This is the *structural* bit only; it does not account for SEQUENCE
    /// and SET (whose bit is already set) nor for opportunistic descent,
    /// which the reader layers on top.
    pub const fn constructed_bit(self) -> bool {
        self.0 & 0x20 != 0
    }

    /// A human-readable label for this tag.
    pub fn name(self) -> String {
        match self.class() {
            Class::Universal => match universal_name(self.number()) {
                Some(name) => name.to_string(),
                None if self.constructed_bit() => format!("CONSTRUCTED ({})", self.number()),
                None => format!("UNIVERSAL ({})", self.number()),
            },
            Class::Application => format!("APPLICATION ({})", self.number()),
            Class::ContextSpecific => format!("CONTEXT_SPECIFIC [{}]", self.number()),
            Class::Private => format!("PRIVATE ({})", self.number()),
        }
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Tag(0x{:02x}, {})", self.0, self.name())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl From<Tag> for u8 {
    fn from(tag: Tag) -> u8 {
        tag.0
    }
}
