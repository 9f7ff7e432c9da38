//! Runtime classification of `lopdf` values.
//!
//! The document graph itself is `lopdf`'s: [`lopdf::Object`] is the tagged
//! value, [`lopdf::Dictionary`] and [`lopdf::Stream`] the two container
//! shapes. This module only adds the vocabulary the validator needs to talk
//! about them.

use lopdf::{Object, Stream, StringFormat};
use std::fmt;

/// Filter name of the JPEG 2000 codec.
pub const JPX_DECODE: &str = "JPXDecode";

/// Filter name of the CCITT group 3/4 fax codec.
pub const CCITT_FAX_DECODE: &str = "CCITTFaxDecode";

// ── Kind ─────────────────────────────────────────────────────────────────────

/// The runtime variant of a value, as seen by the validator.
///
/// Literal and hexadecimal strings are distinct kinds because some entries
/// (e.g. a reference dictionary's `Page`) accept both while others care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Null,
    Boolean,
    Integer,
    Real,
    Name,
    LiteralString,
    HexString,
    Array,
    Dictionary,
    Stream,
    Reference,
}

impl Kind {
    /// Classify a value without dereferencing it.
    pub fn of(object: &Object) -> Self {
        match object {
            Object::Null => Kind::Null,
            Object::Boolean(_) => Kind::Boolean,
            Object::Integer(_) => Kind::Integer,
            Object::Real(_) => Kind::Real,
            Object::Name(_) => Kind::Name,
            Object::String(_, StringFormat::Literal) => Kind::LiteralString,
            Object::String(_, StringFormat::Hexadecimal) => Kind::HexString,
            Object::Array(_) => Kind::Array,
            Object::Dictionary(_) => Kind::Dictionary,
            Object::Stream(_) => Kind::Stream,
            Object::Reference(_) => Kind::Reference,
        }
    }

    /// Both string encodings.
    pub fn is_string(self) -> bool {
        matches!(self, Kind::LiteralString | Kind::HexString)
    }

    /// Integers and reals.
    pub fn is_number(self) -> bool {
        matches!(self, Kind::Integer | Kind::Real)
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Null => "null",
            Kind::Boolean => "boolean",
            Kind::Integer => "integer",
            Kind::Real => "real",
            Kind::Name => "name",
            Kind::LiteralString => "literal string",
            Kind::HexString => "hex string",
            Kind::Array => "array",
            Kind::Dictionary => "dictionary",
            Kind::Stream => "stream",
            Kind::Reference => "indirect reference",
        };
        f.write_str(s)
    }
}

// ── Accessors ────────────────────────────────────────────────────────────────

/// The decoded text of a name value, if `object` is a name.
pub fn name_of(object: &Object) -> Option<String> {
    match object {
        Object::Name(bytes) => Some(String::from_utf8_lossy(bytes).into_owned()),
        _ => None,
    }
}

/// Integer or real value widened to `f64`.
pub fn number_of(object: &Object) -> Option<f64> {
    match object {
        Object::Integer(i) => Some(*i as f64),
        Object::Real(r) => Some(f64::from(*r)),
        _ => None,
    }
}

/// Returns `true` when the stream header declares exactly one filter and it
/// is named `filter`.
///
/// `Filter` may be a single name or an array; a one-element array counts as a
/// sole filter. Filters are never invoked here.
pub fn sole_filter_is(stream: &Stream, filter: &str) -> bool {
    match stream.dict.get(b"Filter") {
        Ok(Object::Name(name)) => name.as_slice() == filter.as_bytes(),
        Ok(Object::Array(filters)) => {
            filters.len() == 1
                && matches!(&filters[0], Object::Name(name) if name.as_slice() == filter.as_bytes())
        }
        _ => false,
    }
}
