//! OBJECT IDENTIFIER codec (C4): dotted-decimal string <-> base-128 arc
//! sequence, with the first two arcs fused into one subidentifier per X.690
//! §8.19.

use crate::error::{Error, ErrorKind};

/// Largest dotted-decimal OID string this crate will attempt to parse.
pub const MAX_STRING_LEN: usize = 8192;

/// Parse and validate a dotted-decimal OID string into its arcs.
///
/// Requires at least 3 arcs, `arc[0] ∈ {0,1,2}`, and `arc[1] ≤ 39` when
/// `arc[0] ∈ {0,1}`. The empty string is a special case handled by callers
/// before this is reached.
fn parse_arcs(s: &str) -> Result<Vec<u64>, Error> {
    if s.len() > MAX_STRING_LEN {
        return Err(ErrorKind::Overflow.into());
    }

    let arcs: Vec<u64> = s
        .split('.')
        .map(|part| part.parse::<u64>().map_err(|_| Error::from(ErrorKind::InvalidData)))
        .collect::<Result<_, _>>()?;

    if arcs.len() < 3 {
        return Err(ErrorKind::InvalidData.into());
    }

    match arcs[0] {
        0 | 1 if arcs[1] > 39 => return Err(ErrorKind::InvalidData.into()),
        0 | 1 | 2 => {}
        _ => return Err(ErrorKind::InvalidData.into()),
    }

    Ok(arcs)
}

/// Validate a dotted-decimal OID string without encoding it.
pub fn validate(s: &str) -> Result<(), Error> {
    if s.is_empty() {
        return Ok(());
    }
    parse_arcs(s).map(|_| ())
}

fn encode_base128(value: u64) -> Vec<u8> {
    if value == 0 {
        return vec![0];
    }

    let mut groups = Vec::new();
    let mut v = value;
    while v > 0 {
        groups.push((v & 0x7f) as u8);
        v >>= 7;
    }

    let last = groups.len() - 1;
    groups
        .into_iter()
        .rev()
        .enumerate()
        .map(|(i, b)| if i == last { b } else { b | 0x80 })
        .collect()
}

/// Encode a dotted-decimal OID string into its base-128 arc byte sequence
/// (the OBJECT IDENTIFIER payload, not including the tag/length header).
///
/// The first two arcs are fused into one subidentifier, `40 * arc[0] +
/// arc[1]`, per X.690 §8.19.4; like every other subidentifier, that value is
/// itself base-128 encoded, so it is not limited to a single octet (`arc[1]`
/// is unconstrained when `arc[0] == 2`, and the fused value can exceed 255).
///
/// The empty string encodes to an empty byte sequence.
pub fn encode(s: &str) -> Result<Vec<u8>, Error> {
    if s.is_empty() {
        return Ok(Vec::new());
    }

    let arcs = parse_arcs(s)?;
    let mut out = encode_base128(40 * arcs[0] + arcs[1]);
    for &arc in &arcs[2..] {
        out.extend(encode_base128(arc));
    }
    Ok(out)
}

/// Decode an OBJECT IDENTIFIER payload into its dotted-decimal string.
///
/// The leading subidentifier is decoded like any other (accumulate-shift-or,
/// terminating at the first octet with the high bit clear) before being
/// split back into its two fused arcs — the inverse of `encode`'s fusing
/// step, banded rather than a plain `/40`/`%40` so it stays correct once
/// `arc[1] >= 40` under `arc[0] == 2`.
///
/// The empty byte sequence decodes to the empty string.
pub fn decode(bytes: &[u8]) -> Result<String, Error> {
    if bytes.is_empty() {
        return Ok(String::new());
    }

    let mut out = String::new();
    let mut value: u64 = 0;
    let mut in_progress = false;
    let mut first = true;

    for &byte in bytes {
        in_progress = true;
        value = value
            .checked_shl(7)
            .and_then(|v| v.checked_add((byte & 0x7f) as u64))
            .ok_or(ErrorKind::Overflow)?;

        if byte & 0x80 == 0 {
            if first {
                // Inverse of `40 * arc[0] + arc[1]`: arcs 0 and 1 each claim
                // a 40-wide band of the fused value, and arc 0 == 2 claims
                // everything at or above 80 (its arc[1] is unconstrained, so
                // a plain `/40`, `%40` split would misattribute any fused
                // value >= 80 to the wrong pair once arc[1] reaches 40).
                let (arc0, arc1) = match value {
                    v if v < 40 => (0, v),
                    v if v < 80 => (1, v - 40),
                    v => (2, v - 80),
                };
                out.push_str(&arc0.to_string());
                out.push('.');
                out.push_str(&arc1.to_string());
                first = false;
            } else {
                out.push('.');
                out.push_str(&value.to_string());
            }
            value = 0;
            in_progress = false;
        }
    }

    if in_progress {
        return Err(ErrorKind::InvalidData.into());
    }

    Ok(out)
}

/// Look up a friendly name for `dotted` in the well-known PKIX/PKCS OID
/// database, if one is registered there.
pub fn friendly_name(dotted: &str) -> Option<&'static str> {
    let oid = const_oid::ObjectIdentifier::new(dotted).ok()?;
    const_oid::db::DB.by_oid(&oid)
}

/// A dotted-decimal OID string guaranteed to satisfy `parse_arcs`'s
/// constraints, for fuzz targets that want to drive [`encode`]/[`decode`]
/// without wasting most of their input space on strings `validate` would
/// immediately reject.
#[cfg(feature = "arbitrary")]
#[derive(Clone, Debug)]
pub struct ArbitraryOid(pub String);

#[cfg(feature = "arbitrary")]
impl<'a> arbitrary::Arbitrary<'a> for ArbitraryOid {
    fn arbitrary(u: &mut arbitrary::Unstructured<'a>) -> arbitrary::Result<Self> {
        let arc0 = u.int_in_range(0u64..=2)?;
        let arc1 = if arc0 == 2 { u.int_in_range(0u64..=u32::MAX as u64)? } else { u.int_in_range(0u64..=39)? };

        let extra: usize = u.int_in_range(1..=5)?;
        let mut arcs = vec![arc0.to_string(), arc1.to_string()];
        for _ in 0..extra {
            let arc: u64 = u.int_in_range(0u64..=u32::MAX as u64)?;
            arcs.push(arc.to_string());
        }

        Ok(ArbitraryOid(arcs.join(".")))
    }
}
