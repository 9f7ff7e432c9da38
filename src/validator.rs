use crate::deref::Walk;
use crate::dispatch::ExpectedKind;
use crate::{
    CancelToken, CrossReference, Kind, ValidationError, ValidationResult, VersionPolicy,
    DEFAULT_MAX_DEPTH,
};
use lopdf::Object;

const TOP_LEVEL: &str = "caller";

// ── Validator ─────────────────────────────────────────────────────────────────

/// Schema-driven validator for external objects.
///
/// Holds a shared borrow of the document's [`CrossReference`] and nothing
/// else; every walk keeps its own recursion state, so validating the same
/// object twice gives the same answer and leaves the document untouched.
///
/// ```no_run
/// use lopdf::{Document, Object};
/// use xobject_validator::{DocumentContext, ExpectedKind, ValidationMode, Validator};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let doc = Document::load("brochure.pdf")?;
/// let ctx = DocumentContext::new(&doc, ValidationMode::Strict)?;
/// let image = Object::Reference((12, 0));
///
/// Validator::new(&ctx).validate_external_object(&image, ExpectedKind::Image)?;
/// # Ok(())
/// # }
/// ```
pub struct Validator<'a> {
    pub(crate) xref: &'a dyn CrossReference,
    pub(crate) policy: VersionPolicy,
    pub(crate) max_depth: usize,
    pub(crate) cancel: Option<&'a CancelToken>,
}

impl<'a> Validator<'a> {
    pub fn new(xref: &'a dyn CrossReference) -> Self {
        Self {
            xref,
            policy: VersionPolicy::new(xref.document_version(), xref.validation_mode()),
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: None,
        }
    }

    /// Limit how deeply containers may nest.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Consult `token` before every dereference.
    pub fn with_cancel(mut self, token: &'a CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    // ── Entry points ──────────────────────────────────────────────────────────

    /// Validate one external object, given directly or by indirect reference.
    ///
    /// `hint` states what the caller expects to find; [`ExpectedKind::Any`]
    /// lets the `Subtype` decide.
    pub fn validate_external_object(
        &self,
        object: &'a Object,
        hint: ExpectedKind,
    ) -> ValidationResult<()> {
        let mut walk = Walk::default();
        self.validate_xobject_entry(&mut walk, object, TOP_LEVEL, "XObject", hint, true)
    }

    /// Validate a resource dictionary and every external object it lists.
    pub fn validate_resource_dictionary(&self, object: &'a Object) -> ValidationResult<()> {
        let mut walk = Walk::default();

        let resources = match self.resolve_value(object, TOP_LEVEL, "Resources")? {
            Object::Dictionary(dict) => dict,
            other => {
                return Err(ValidationError::TypeMismatch {
                    container: TOP_LEVEL,
                    key: "Resources".to_string(),
                    expected: "dictionary",
                    found: Kind::of(other),
                })
            }
        };

        self.descend(&mut walk, object, TOP_LEVEL, "Resources", |walk| {
            self.walk_resource_dict(walk, resources)
        })
    }
}
