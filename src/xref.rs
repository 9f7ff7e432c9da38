use crate::{Error, Result, ValidationMode, Version};
use lopdf::{Document, Object, ObjectId};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

// ── CrossReference ────────────────────────────────────────────────────────────

/// Read-only view of a parsed document, as the validator consumes it.
///
/// Implementations own nothing the validator mutates; a validator only ever
/// holds a shared borrow.
pub trait CrossReference {
    /// Look up an indirect object. `None` means the table has no such entry.
    fn dereference(&self, id: ObjectId) -> Option<&Object>;

    /// The document's declared format revision.
    fn document_version(&self) -> Version;

    /// The conformance mode of this run.
    fn validation_mode(&self) -> ValidationMode;
}

// ── DocumentContext ───────────────────────────────────────────────────────────

/// [`CrossReference`] over a loaded [`lopdf::Document`].
#[derive(Debug, Clone, Copy)]
pub struct DocumentContext<'a> {
    document: &'a Document,
    version: Version,
    mode: ValidationMode,
}

impl<'a> DocumentContext<'a> {
    /// Borrow `document`, taking its revision from the file header.
    ///
    /// Returns [`Error::UnsupportedVersion`] when the header names a revision
    /// this crate does not know; use [`DocumentContext::with_version`] to
    /// validate such a file against an explicit revision.
    pub fn new(document: &'a Document, mode: ValidationMode) -> Result<Self> {
        let version = document
            .version
            .parse::<Version>()
            .map_err(Error::UnsupportedVersion)?;
        Ok(Self::with_version(document, version, mode))
    }

    /// Borrow `document`, validating it as revision `version`.
    pub fn with_version(document: &'a Document, version: Version, mode: ValidationMode) -> Self {
        Self {
            document,
            version,
            mode,
        }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }
}

impl CrossReference for DocumentContext<'_> {
    fn dereference(&self, id: ObjectId) -> Option<&Object> {
        self.document.objects.get(&id)
    }

    fn document_version(&self) -> Version {
        self.version
    }

    fn validation_mode(&self) -> ValidationMode {
        self.mode
    }
}

// ── CancelToken ───────────────────────────────────────────────────────────────

/// Cooperative cancellation flag shared between a caller and a running walk.
///
/// The walk checks the flag before every dereference and fails with
/// [`crate::ValidationError::Cancelled`] once it is set.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
