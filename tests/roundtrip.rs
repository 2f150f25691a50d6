//! Property-based round-trip checks for the lower-level codecs.

use der_tlv::{datetime, length, oid};
use proptest::prelude::*;
use time::{Date, Month, OffsetDateTime, PrimitiveDateTime, Time};

proptest! {
    #[test]
    fn length_codec_round_trips(len in 0u32..=0xFFFF_FFFF) {
        let encoded = length::encode(len);
        let (decoded, consumed) = length::decode(&encoded, 0).unwrap();
        prop_assert_eq!(decoded, len);
        prop_assert_eq!(consumed, encoded.len() + 1);
    }

    #[test]
    fn oid_arc_sequences_round_trip(
        first in 0u64..=1,
        second in 0u64..=39,
        rest in prop::collection::vec(0u64..=0xFFFF_FFFF, 1..6),
    ) {
        let mut arcs = vec![first.to_string(), second.to_string()];
        arcs.extend(rest.iter().map(u64::to_string));
        let dotted = arcs.join(".");

        let encoded = oid::encode(&dotted).unwrap();
        let decoded = oid::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, dotted);
    }

    #[test]
    fn oid_joint_iso_itu_round_trips_even_with_a_large_second_arc(
        // arc[1] is unconstrained when arc[0] == 2, including values that
        // push the fused first subidentifier (`40*2 + arc[1]`) past 255 and
        // into a multi-byte base-128 encoding.
        second in 0u64..=10_000,
        rest in prop::collection::vec(0u64..=0xFFFF_FFFF, 1..6),
    ) {
        let mut arcs = vec!["2".to_string(), second.to_string()];
        arcs.extend(rest.iter().map(u64::to_string));
        let dotted = arcs.join(".");

        let encoded = oid::encode(&dotted).unwrap();
        let decoded = oid::decode(&encoded).unwrap();
        prop_assert_eq!(decoded, dotted);
    }

    #[test]
    fn utc_time_round_trips_to_the_millisecond(
        year in 1950i32..2049,
        month in 1u8..=12,
        day in 1u8..=28,
        hour in 0u8..24,
        minute in 0u8..60,
        second in 0u8..60,
        millis in 0u16..1000,
    ) {
        let date = Date::from_calendar_date(year, Month::try_from(month).unwrap(), day).unwrap();
        let clock = Time::from_hms_milli(hour, minute, second, millis).unwrap();
        let dt: OffsetDateTime = PrimitiveDateTime::new(date, clock).assume_utc();

        let payload = datetime::encode_payload(dt, true, false).unwrap();
        let (decoded, generalized) = datetime::decode_payload(&payload).unwrap();

        prop_assert!(!generalized);
        prop_assert_eq!(decoded.unix_timestamp(), dt.unix_timestamp());
        prop_assert_eq!(decoded.millisecond(), millis);
    }
}
