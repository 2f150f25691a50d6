//! End-to-end scenarios exercising the reader, builder, and typed wrappers
//! together against concrete golden byte sequences.

use der_tlv::builder::{Builder, DEFAULT_OUTER_TAG};
use der_tlv::reader::TlvReader;
use der_tlv::tag::{universal, Class, Tag};
use der_tlv::{datetime, oid, value};

#[test]
fn sequence_of_two_integers() {
    let bytes = hex_literal::hex!("30 06 02 01 05 02 01 03");
    let mut reader = TlvReader::new(&bytes).unwrap();
    assert!(reader.node().is_constructed);

    assert!(reader.move_next().unwrap());
    assert_eq!(reader.payload(), [0x05]);

    assert!(reader.move_next_same_level().unwrap());
    assert_eq!(reader.payload(), [0x03]);
    assert!(!reader.move_next_same_level().unwrap());
}

#[test]
fn rsa_sha256_oid_encodes_to_golden_bytes() {
    let bytes = oid::encode("1.2.840.113549.1.1.11").unwrap();
    assert_eq!(bytes, hex_literal::hex!("2A 86 48 86 F7 0D 01 01 0B"));
    assert_eq!(oid::decode(&bytes).unwrap(), "1.2.840.113549.1.1.11");
}

#[test]
fn utc_time_golden_encoding() {
    let dt = time::macros::datetime!(2024-01-02 03:04:05 UTC);
    let payload = datetime::encode_payload(dt, false, false).unwrap();
    assert_eq!(payload, b"240102030405Z");
}

#[test]
fn generalized_time_golden_encoding() {
    let dt = time::macros::datetime!(2050-06-15 12:00:00.250 UTC);
    let payload = datetime::encode_payload(dt, true, true).unwrap();
    assert_eq!(payload, b"20500615120000.250Z");
}

#[test]
fn builder_round_trip_of_nested_sequence() {
    let mut outer = Builder::new();
    outer.add_sequence_with(|inner| {
        inner.add_integer(&[0x01]).add_utf8_string("hi");
    });
    let encoded = outer.get_encoded(DEFAULT_OUTER_TAG);
    assert_eq!(encoded, hex_literal::hex!("30 09 30 07 02 01 01 0C 02 68 69"));

    let mut reader = TlvReader::new(&encoded).unwrap();
    assert!(reader.move_next().unwrap()); // into inner SEQUENCE
    assert!(reader.move_next().unwrap()); // into INTEGER 1
    assert_eq!(reader.payload(), [0x01]);
    assert!(reader.move_next_same_level().unwrap()); // UTF8String "hi"
    assert_eq!(reader.payload(), b"hi");
}

#[test]
fn octet_string_wrapping_integer_is_opportunistically_constructed() {
    let bytes = hex_literal::hex!("04 04 02 02 00 FF");
    let mut reader = TlvReader::new(&bytes).unwrap();
    assert!(reader.node().is_constructed);

    assert!(reader.move_next().unwrap());
    assert_eq!(reader.node().tag.octet(), universal::INTEGER);
    assert_eq!(reader.payload(), [0x00, 0xFF]);
}

#[test]
fn builder_output_decodes_back_into_typed_values() {
    let mut b = Builder::new();
    b.add_boolean(true)
        .add_oid("1.2.840.113549.1.1.11")
        .unwrap()
        .add_octet_string(b"opaque");
    let encoded = b.get_encoded(DEFAULT_OUTER_TAG);

    let mut reader = TlvReader::new(&encoded).unwrap();
    assert!(reader.move_next().unwrap());
    let boolean = value::decode(reader.node().tag, reader.payload()).unwrap();
    assert_eq!(boolean.display(), "true");

    assert!(reader.move_next_same_level().unwrap());
    let oid_value = value::decode(reader.node().tag, reader.payload()).unwrap();
    assert!(oid_value.display().contains("1.2.840.113549.1.1.11"));

    assert!(reader.move_next_same_level().unwrap());
    let octets = value::decode(reader.node().tag, reader.payload()).unwrap();
    assert!(octets.is_container());
}

#[test]
fn explicit_and_implicit_tagging_round_trip_through_the_reader() {
    let mut b = Builder::new();
    b.add_implicit(0, &[0x05], true).unwrap();
    let inner = der_tlv::header::wrap(Tag::new(Class::Universal, false, universal::INTEGER), &[0x07]);
    b.add_explicit(1, &inner).unwrap();
    let encoded = b.get_encoded(DEFAULT_OUTER_TAG);

    let mut reader = TlvReader::new(&encoded).unwrap();
    assert!(reader.move_next().unwrap());
    assert_eq!(reader.node().tag.octet(), 0x80);
    assert_eq!(reader.payload(), [0x05]);

    assert!(reader.move_next_same_level().unwrap());
    assert_eq!(reader.node().tag.octet(), 0xA1);
    assert!(reader.node().is_constructed);
    assert!(reader.move_next().unwrap());
    assert_eq!(reader.payload(), [0x07]);
}
