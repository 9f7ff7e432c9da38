//! Routing an external object to its shape validator.
//!
//! This is the only place shape families are registered: a new family is a
//! new [`XObjectShape`] variant plus one arm in [`Validator::validate_xobject_stream`].

use crate::deref::Walk;
use crate::entry::{Check, EntryRule, Expect};
use crate::object::{name_of, Kind};
use crate::shapes::ImageRole;
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Dictionary, Object, Stream};
use tracing::{debug, warn};

const CONTAINER: &str = "xObjectStream";

const TYPE: EntryRule = EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["XObject"]));

/// Absence is decided by the dispatcher, not the rule: an untagged container
/// is a shape of its own.
const SUBTYPE: EntryRule = EntryRule::optional("Subtype", Expect::Name);

// ── Shapes ────────────────────────────────────────────────────────────────────

/// What the caller expects an external object to be.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExpectedKind {
    #[default]
    Any,
    Form,
    Image,
}

/// The classification of an external object by its `Subtype`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum XObjectShape {
    Form,
    Image,
    /// `PS`: embedded PostScript, deprecated by the format.
    PostScript,
    /// A `Subtype` name the format does not define.
    Unknown(String),
    /// No `Subtype` entry at all.
    Untagged,
}

impl XObjectShape {
    pub fn classify(subtype: Option<&str>) -> Self {
        match subtype {
            Some("Form") => XObjectShape::Form,
            Some("Image") => XObjectShape::Image,
            Some("PS") => XObjectShape::PostScript,
            Some(other) => XObjectShape::Unknown(other.to_string()),
            None => XObjectShape::Untagged,
        }
    }
}

/// Relaxed-mode inference for a container whose `Subtype` is missing or
/// unrecognised.
///
/// A specific `hint` wins. Otherwise a `BBox` entry means a form and anything
/// else is taken for an image, which covers page thumbnails written without a
/// tag by older producers.
pub fn infer_untagged_shape(dict: &Dictionary, hint: ExpectedKind) -> XObjectShape {
    match hint {
        ExpectedKind::Form => XObjectShape::Form,
        ExpectedKind::Image => XObjectShape::Image,
        ExpectedKind::Any if dict.has(b"BBox") => XObjectShape::Form,
        ExpectedKind::Any => XObjectShape::Image,
    }
}

// ── Dispatch ──────────────────────────────────────────────────────────────────

impl<'a> Validator<'a> {
    /// Resolve an entry that must hold an external object and validate it.
    ///
    /// A null or dangling value is skipped unless `required` is set.
    pub(crate) fn validate_xobject_entry(
        &self,
        walk: &mut Walk,
        raw: &'a Object,
        container: &'static str,
        key: &str,
        hint: ExpectedKind,
        required: bool,
    ) -> ValidationResult<()> {
        let Some(value) = self.resolve(raw, container, key, required)? else {
            return Ok(());
        };

        let Object::Stream(stream) = value else {
            return Err(ValidationError::TypeMismatch {
                container,
                key: key.to_string(),
                expected: "stream",
                found: Kind::of(value),
            });
        };

        self.descend(walk, raw, container, key, |walk| {
            self.validate_xobject_stream(walk, stream, hint)
        })
    }

    /// Classify an external object stream and hand it to its shape validator.
    pub(crate) fn validate_xobject_stream(
        &self,
        walk: &mut Walk,
        stream: &'a Stream,
        hint: ExpectedKind,
    ) -> ValidationResult<()> {
        let scope = self.stream_scope(stream);

        self.check_entry(&scope, CONTAINER, &TYPE)?;
        let subtype = self
            .check_entry(&scope, CONTAINER, &SUBTYPE)?
            .and_then(|entry| name_of(entry.value));

        let declared = XObjectShape::classify(subtype.as_deref());
        let untagged = matches!(declared, XObjectShape::Untagged | XObjectShape::Unknown(_));
        let shape = if untagged && self.policy.is_relaxed() {
            let inferred = infer_untagged_shape(&stream.dict, hint);
            warn!(?declared, ?inferred, "external object without a usable Subtype");
            inferred
        } else {
            check_hint(&declared, hint)?;
            declared
        };

        debug!(?shape, "dispatching external object");

        match shape {
            XObjectShape::Form => self.validate_form(walk, stream),
            XObjectShape::Image => self.validate_image(walk, stream, ImageRole::Primary),
            XObjectShape::PostScript => Err(ValidationError::UnsupportedConstruct {
                container: CONTAINER,
                construct: "PostScript XObject",
            }),
            XObjectShape::Unknown(subtype) => Err(ValidationError::UnknownSubtype {
                container: CONTAINER,
                subtype,
            }),
            XObjectShape::Untagged => Err(ValidationError::MissingRequiredEntry {
                container: CONTAINER,
                key: SUBTYPE.key.to_string(),
            }),
        }
    }
}

/// A tagged form or image must agree with a specific hint.
fn check_hint(shape: &XObjectShape, hint: ExpectedKind) -> ValidationResult<()> {
    let contradicts = matches!(
        (shape, hint),
        (XObjectShape::Form, ExpectedKind::Image) | (XObjectShape::Image, ExpectedKind::Form)
    );
    if contradicts {
        return Err(ValidationError::ConstraintViolation {
            container: CONTAINER,
            key: SUBTYPE.key.to_string(),
            reason: "subtype contradicts the expected kind",
        });
    }
    Ok(())
}
