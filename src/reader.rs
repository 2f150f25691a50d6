//! Streaming TLV tree reader (C2): a stateful cursor over a byte buffer that
//! can walk a DER tree depth-first, jump to previously visited offsets, and
//! opportunistically detect nested structure hidden inside primitive
//! containers such as OCTET STRING.

use std::collections::HashMap;

use crate::error::{Error, ErrorKind};
use crate::header::Header;
use crate::tag::{universal, Class, Tag};

/// Universal tags that are never considered for opportunistic descent, even
/// when their payload happens to parse as a well-formed TLV.
const RESTRICTED: &[u8] = &[
    universal::BOOLEAN,
    universal::INTEGER,
    universal::NULL,
    universal::OBJECT_IDENTIFIER,
    universal::REAL,
    universal::ENUMERATED,
    universal::RELATIVE_OID,
    universal::UTF8_STRING,
    universal::NUMERIC_STRING,
    universal::PRINTABLE_STRING,
    universal::TELETEX_STRING,
    universal::VIDEOTEX_STRING,
    universal::IA5_STRING,
    universal::VISIBLE_STRING,
    universal::UNIVERSAL_STRING,
    universal::BMP_STRING,
    universal::UTC_TIME,
    universal::GENERALIZED_TIME,
];

fn is_restricted(tag_number: u8) -> bool {
    RESTRICTED.contains(&tag_number)
}

/// Byte boundaries `[start, end)` of the sibling chain a node belongs to.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Level {
    /// First offset of the level.
    pub start: usize,
    /// One past the last offset of the level.
    pub end: usize,
}

/// The reader's view of the node currently under the cursor.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Node {
    /// Tag octet.
    pub tag: Tag,
    /// Human-readable label for `tag`.
    pub tag_name: String,
    /// Octets from the tag octet to the first payload octet.
    pub header_length: usize,
    /// Offset of the first payload octet.
    pub payload_offset: usize,
    /// Payload length in octets.
    pub payload_length: usize,
    /// `header_length + payload_length`.
    pub full_length: usize,
    /// Whether this node is treated as constructed — structurally, or via
    /// opportunistic descent.
    pub is_constructed: bool,
    /// Offset of this node within the backing buffer.
    pub offset: usize,
    /// Offset of the next node in tree-walk order, `0` at EOF.
    pub next_offset: usize,
    /// Offset of the next sibling at this level, `0` at end-of-level.
    pub next_sibling_offset: usize,
}

/// Attempt to parse `buf[start..start+len]` as a back-to-back concatenation
/// of well-formed TLVs summing to exactly `len` octets.
///
/// Returns `None` if any candidate header is malformed, overruns `len`, or
/// the spans don't sum to exactly `len`. Used both by the reader's
/// opportunistic-descent probe and by the builder's `add_sequence`/`add_set`
/// payload validation.
pub(crate) fn predict_children(buf: &[u8], start: usize, len: usize) -> Option<Vec<(usize, usize)>> {
    let end = start + len;
    let mut pos = start;
    let mut spans = Vec::new();

    while pos < end {
        let header = Header::decode(buf, pos).ok()?;
        let full = header.header_length + header.payload_length as usize;
        if full == 0 || pos + full > end {
            return None;
        }
        spans.push((pos, full));
        pos += full;
    }

    if pos == end {
        Some(spans)
    } else {
        None
    }
}

/// A streaming, non-copying cursor over a DER-encoded buffer.
pub struct TlvReader<'r> {
    buf: &'r [u8],
    node: Node,
    offset_map: HashMap<usize, Level>,
    /// Maps a level's `start` offset to the level of the node whose payload
    /// it is (i.e. the enclosing level one step further out). The root level
    /// has no entry here — nothing ever needs to climb past it, since every
    /// `next_offset` this reader produces is already `< buf.len()`, which is
    /// the root level's `end`.
    level_parent: HashMap<usize, Level>,
}

impl<'r> TlvReader<'r> {
    /// Position a new reader at offset 0 of `buf`.
    pub fn new(buf: &'r [u8]) -> Result<Self, Error> {
        if buf.len() < 2 {
            return Err(ErrorKind::Incomplete.at(0));
        }

        let header = Header::decode(buf, 0)?;
        let full_length = header.header_length + header.payload_length as usize;

        if full_length > buf.len() {
            return Err(ErrorKind::Incomplete.at(0));
        }

        let buf = &buf[..full_length];
        let mut offset_map = HashMap::new();
        let mut level_parent = HashMap::new();
        let level = Level { start: 0, end: buf.len() };
        let node = decode_node(buf, 0, level, &mut offset_map, &mut level_parent)?;

        Ok(TlvReader { buf, node, offset_map, level_parent })
    }

    /// The node currently under the cursor.
    pub fn node(&self) -> &Node {
        &self.node
    }

    /// The backing buffer (possibly truncated to the root's `full_length`).
    pub fn buffer(&self) -> &'r [u8] {
        self.buf
    }

    /// The raw tag octet of the current node.
    pub fn tag_raw(&self) -> &'r [u8] {
        &self.buf[self.node.offset..self.node.offset + 1]
    }

    /// The header (tag + length octets) of the current node.
    pub fn header(&self) -> &'r [u8] {
        &self.buf[self.node.offset..self.node.payload_offset]
    }

    /// The payload octets of the current node.
    pub fn payload(&self) -> &'r [u8] {
        &self.buf[self.node.payload_offset..self.node.payload_offset + self.node.payload_length]
    }

    /// The complete TLV bytes of the current node.
    pub fn tlv(&self) -> &'r [u8] {
        &self.buf[self.node.offset..self.node.offset + self.node.full_length]
    }

    /// Advance in tree-walk order: descend into the current node's payload
    /// if constructed, otherwise step past it — popping back out through
    /// however many enclosing levels have also run out of siblings at this
    /// offset. Returns `Ok(false)` iff `next_offset == 0` (EOF).
    pub fn move_next(&mut self) -> Result<bool, Error> {
        if self.node.next_offset == 0 {
            return Ok(false);
        }

        let level = if self.node.is_constructed {
            *self
                .offset_map
                .get(&self.node.next_offset)
                .ok_or_else(|| ErrorKind::UnknownOffset.at(self.node.next_offset))?
        } else {
            // `next_offset` may be a sibling still within the current node's
            // own level, or — once that level is exhausted — a node that
            // belongs to an enclosing level instead (stepping out of a
            // nested single-child container). Climb the level's ancestry
            // until we find the one that actually contains `next_offset`.
            let mut candidate = *self
                .offset_map
                .get(&self.node.offset)
                .ok_or_else(|| ErrorKind::UnknownOffset.at(self.node.offset))?;
            while self.node.next_offset >= candidate.end {
                candidate = *self
                    .level_parent
                    .get(&candidate.start)
                    .ok_or_else(|| ErrorKind::UnknownOffset.at(self.node.next_offset))?;
            }
            candidate
        };

        self.node = decode_node(self.buf, self.node.next_offset, level, &mut self.offset_map, &mut self.level_parent)?;
        Ok(true)
    }

    /// Advance to the next sibling at the current level. Returns `Ok(false)`
    /// at end-of-level.
    pub fn move_next_same_level(&mut self) -> Result<bool, Error> {
        if self.node.next_sibling_offset == 0 {
            return Ok(false);
        }

        let level = *self
            .offset_map
            .get(&self.node.offset)
            .ok_or_else(|| ErrorKind::UnknownOffset.at(self.node.offset))?;

        self.node = decode_node(self.buf, self.node.next_sibling_offset, level, &mut self.offset_map, &mut self.level_parent)?;
        Ok(true)
    }

    /// Jump to `offset`, which must already be present in the offset map
    /// (i.e. previously visited, or eagerly registered by opportunistic
    /// descent).
    pub fn move_to(&mut self, offset: usize) -> Result<(), Error> {
        let level = *self
            .offset_map
            .get(&offset)
            .ok_or_else(|| ErrorKind::UnknownOffset.at(offset))?;

        self.node = decode_node(self.buf, offset, level, &mut self.offset_map, &mut self.level_parent)?;
        Ok(())
    }

    /// Seek back to offset 0.
    pub fn reset(&mut self) -> Result<(), Error> {
        self.move_to(0)
    }

    /// Exhaustively walk the tree, returning the total node count. Idempotent;
    /// leaves the cursor at offset 0.
    pub fn build_offset_map(&mut self) -> Result<usize, Error> {
        self.reset()?;
        let mut count = 1;
        while self.move_next()? {
            count += 1;
        }
        self.reset()?;
        Ok(count)
    }

    /// Fail with [`ErrorKind::InvalidTag`] unless the current tag is one of
    /// `expected`.
    pub fn expect_tag(&self, expected: &[u8]) -> Result<(), Error> {
        let actual = self.node.tag.octet();
        if expected.contains(&actual) {
            Ok(())
        } else {
            Err(ErrorKind::InvalidTag { actual }.at(self.node.offset))
        }
    }
}

/// Decode the node at `offset`, which belongs to `level`, recording its
/// offset-map entry (and, if constructed, its children's, along with the
/// child level's parent) as a side effect.
fn decode_node(
    buf: &[u8],
    offset: usize,
    level: Level,
    offset_map: &mut HashMap<usize, Level>,
    level_parent: &mut HashMap<usize, Level>,
) -> Result<Node, Error> {
    offset_map.insert(offset, level);

    let header = Header::decode(buf, offset)?;
    let tag = header.tag;
    let header_length = header.header_length;
    let payload_length = header.payload_length as usize;
    let payload_offset = offset + header_length;
    let full_length = header_length + payload_length;

    if offset + full_length > buf.len() {
        return Err(ErrorKind::Incomplete.at(offset));
    }

    let structurally_constructed = tag.constructed_bit()
        || (tag.class() == Class::Universal
            && (tag.number() == universal::SEQUENCE || tag.number() == universal::SET));

    let is_bit_string = tag.class() == Class::Universal && tag.number() == universal::BIT_STRING;

    let (child_start, child_len) = if is_bit_string && payload_length >= 1 {
        (payload_offset + 1, payload_length - 1)
    } else {
        (payload_offset, payload_length)
    };

    let mut is_constructed = structurally_constructed;

    if !structurally_constructed
        && payload_length > 0
        && tag.class() == Class::Universal
        && !is_restricted(tag.number())
    {
        if let Some(spans) = predict_children(buf, child_start, child_len) {
            if spans.len() == 1 {
                is_constructed = true;
            }
        }
    }

    if is_constructed {
        let child_level = Level { start: child_start, end: child_start + child_len };
        offset_map.insert(child_start, child_level);
        level_parent.insert(child_start, level);
    }

    let next_offset = if is_constructed {
        child_start
    } else if offset + full_length < buf.len() {
        offset + full_length
    } else {
        0
    };

    let next_sibling_offset = if offset + full_length < level.end {
        offset + full_length
    } else {
        0
    };

    Ok(Node {
        tag_name: tag.name(),
        tag,
        header_length,
        payload_offset,
        payload_length,
        full_length,
        is_constructed,
        offset,
        next_offset,
        next_sibling_offset,
    })
}
