//! Pure Rust implementation of the Distinguished Encoding Rules (DER) for
//! Abstract Syntax Notation One (ASN.1) as described in ITU X.690.
//!
//! This crate is built around two complementary halves:
//!
//! - [`reader::TlvReader`]: a non-copying, streaming cursor over an
//!   already-encoded buffer. It walks tag-length-value (TLV) productions
//!   depth-first, can jump back to any previously visited offset, and
//!   opportunistically detects nested structure hidden inside primitive
//!   containers such as `OCTET STRING` and `BIT STRING`.
//! - [`builder::Builder`]: composes a tree of TLV productions from scratch,
//!   value by value or from raw, already-encoded bytes.
//!
//! [`oid`] and [`datetime`] give typed treatment to two universal types
//! whose wire layout has enough sharp edges to deserve dedicated modules:
//! `OBJECT IDENTIFIER`'s base-128 arc encoding, and the UTCTime/
//! GeneralizedTime family's century pivot and zone-offset quirks.
//!
//! [`value`] wraps a reader node's raw payload in a tagged-variant enum for
//! callers that want typed access without hand-rolling a `match` over tag
//! numbers.

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(rust_2018_idioms)]

pub mod builder;
pub mod datetime;
pub mod error;
pub mod header;
pub mod length;
pub mod oid;
pub mod reader;
pub mod tag;
pub mod value;

pub use crate::builder::Builder;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::header::Header;
pub use crate::reader::TlvReader;
pub use crate::tag::{Class, Tag};
pub use crate::value::{Encoding, TypedValue, ValueKind};
