//! # xobject-validator
//!
//! A Rust library for validating the external objects (XObjects) of a PDF
//! document against the format's structural grammar.
//!
//! ## What this crate does
//!
//! 1. **Classify**: routes an external object to its shape by `Subtype`
//!    (`Form`, `Image`; `PS` is rejected), with a Relaxed-mode heuristic for
//!    containers that omit the tag.
//! 2. **Validate entries**: checks every entry of the shape's rule table for
//!    presence, runtime type, value constraints and format-version legality.
//! 3. **Recurse**: soft masks, stencil masks, alternates, OPI dictionaries and
//!    form resources are validated by the same routines, with cycle and depth
//!    guards for self-referential input.
//!
//! Validation is fail-fast: the first violation is returned as a
//! [`ValidationError`]; success means the whole subtree conforms.
//!
//! ## Quick example
//!
//! ```no_run
//! use xobject_validator::{DocumentAnalyzer, ValidatorConfig, ValidationMode};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = ValidatorConfig {
//!     mode: ValidationMode::Strict,
//!     ..Default::default()
//! };
//! let analyzer = DocumentAnalyzer::with_config("brochure.pdf", config)?;
//!
//! match analyzer.validate_page_resources() {
//!     Ok(()) => println!("all external objects conform"),
//!     Err(e) => println!("invalid: {e}"),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! Lower-level callers that already hold a [`CrossReference`] implementation
//! use [`Validator`] directly.

use lopdf::ObjectId;
use thiserror::Error;

mod analyzer;
mod date;
mod deref;
mod dispatch;
mod entry;
mod object;
mod policy;
mod shapes;
mod validator;
mod xref;

pub use analyzer::DocumentAnalyzer;
pub use date::parse_pdf_date;
pub use dispatch::{infer_untagged_shape, ExpectedKind, XObjectShape};
pub use object::{sole_filter_is, Kind};
pub use policy::{Applicability, ValidationMode, Version, VersionPolicy};
pub use validator::Validator;
pub use xref::{CancelToken, CrossReference, DocumentContext};

/// Recursion depth used when [`ValidatorConfig::max_depth`] is left at its default.
pub const DEFAULT_MAX_DEPTH: usize = 64;

// ── Configuration ────────────────────────────────────────────────────────────

/// Runtime configuration for [`DocumentAnalyzer`].
#[derive(Debug, Clone)]
pub struct ValidatorConfig {
    /// Conformance mode. The default, [`ValidationMode::Relaxed`], accepts
    /// entries newer than the declared version and untagged containers.
    pub mode: ValidationMode,

    /// Maximum nesting of containers (mask in mask, form in form, ...)
    /// before the walk fails with [`ValidationError::RecursionLimitExceeded`].
    pub max_depth: usize,

    /// Validate against this revision instead of the one in the file header.
    pub version_override: Option<Version>,

    /// Checked before every dereference; once cancelled the walk fails with
    /// [`ValidationError::Cancelled`].
    pub cancel: Option<CancelToken>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            mode: ValidationMode::default(),
            max_depth: DEFAULT_MAX_DEPTH,
            version_override: None,
            cancel: None,
        }
    }
}

// ── Error types ──────────────────────────────────────────────────────────────

/// The closed set of ways an object can fail validation.
///
/// `container` is the display name of the dictionary being checked
/// (e.g. `"imageStream"`), `key` the entry at fault.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("{container}: missing required entry \"{key}\"")]
    MissingRequiredEntry { container: &'static str, key: String },

    #[error("{container}: entry \"{key}\" is {found}, expected {expected}")]
    TypeMismatch {
        container: &'static str,
        key: String,
        expected: &'static str,
        found: Kind,
    },

    /// The value has the right type but fails the entry's constraint.
    #[error("{container}: entry \"{key}\": {reason}")]
    ConstraintViolation {
        container: &'static str,
        key: String,
        reason: &'static str,
    },

    #[error("{container}: entry \"{key}\" requires PDF {since}, document declares {document}")]
    VersionViolation {
        container: &'static str,
        key: String,
        since: Version,
        document: Version,
    },

    #[error("{container}: entries \"{first}\" and \"{second}\" are mutually exclusive")]
    ConflictingEntries {
        container: &'static str,
        first: String,
        second: String,
    },

    #[error("{container}: entry \"{key}\" is required when \"{required_by}\" is present")]
    MissingDependentEntry {
        container: &'static str,
        key: String,
        required_by: String,
    },

    #[error("{container}: unknown Subtype \"{subtype}\"")]
    UnknownSubtype {
        container: &'static str,
        subtype: String,
    },

    /// A shape the format deprecates outright, such as PostScript XObjects.
    #[error("{container}: {construct} is not supported")]
    UnsupportedConstruct {
        container: &'static str,
        construct: &'static str,
    },

    #[error("{container}: entry \"{key}\" points to missing object {} {}", .object.0, .object.1)]
    BrokenReference {
        container: &'static str,
        key: String,
        object: ObjectId,
    },

    /// A reference cycle (`object` is the repeated object) or a nesting depth
    /// beyond the configured limit.
    #[error("{container}: entry \"{key}\" exceeds the recursion limit at depth {depth}")]
    RecursionLimitExceeded {
        container: &'static str,
        key: String,
        object: Option<ObjectId>,
        depth: usize,
    },

    /// The container itself is malformed, e.g. the wrong number of entries.
    #[error("{container}: malformed at \"{key}\": {reason}")]
    SchemaViolation {
        container: &'static str,
        key: String,
        reason: &'static str,
    },

    #[error("validation cancelled")]
    Cancelled,
}

/// Every error that the document-level API can produce.
#[derive(Error, Debug)]
pub enum Error {
    /// A filesystem I/O error occurred while loading a document.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The underlying lopdf parser returned an error.
    #[error("PDF parse error: {0}")]
    ParseError(#[from] lopdf::Error),

    /// The file header declares a revision this crate does not know.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// The document graph lacks a structure the walk needs (e.g. a page
    /// object that is not a dictionary).
    #[error("Invalid PDF: {0}")]
    InvalidPdf(String),

    /// An external object failed validation.
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Result of a single validation step.
pub type ValidationResult<T> = std::result::Result<T, ValidationError>;
