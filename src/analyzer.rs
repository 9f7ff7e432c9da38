use crate::dispatch::ExpectedKind;
use crate::validator::Validator;
use crate::xref::DocumentContext;
use crate::{Error, Result, ValidatorConfig};
use lopdf::{Dictionary, Document, Object, ObjectId};
use std::path::Path;
use tracing::debug;

/// Longest `Parent` chain followed when looking for inherited page attributes.
const MAX_PAGE_TREE_DEPTH: usize = 256;

// ── DocumentAnalyzer ──────────────────────────────────────────────────────────

/// Entry point for validating the external objects of a whole document.
///
/// # Creating an analyzer
///
/// ```no_run
/// use xobject_validator::{DocumentAnalyzer, ValidatorConfig, ValidationMode, Version};
///
/// // From a file path
/// let a = DocumentAnalyzer::from_path("brochure.pdf").unwrap();
///
/// // From an in-memory buffer
/// let bytes = std::fs::read("brochure.pdf").unwrap();
/// let a = DocumentAnalyzer::from_bytes(&bytes).unwrap();
///
/// // With custom configuration
/// let cfg = ValidatorConfig {
///     mode: ValidationMode::Strict,
///     version_override: Some(Version::V1_4),
///     ..Default::default()
/// };
/// let a = DocumentAnalyzer::with_config("brochure.pdf", cfg).unwrap();
/// ```
pub struct DocumentAnalyzer {
    document: Document,
    config: ValidatorConfig,
}

impl DocumentAnalyzer {
    // ── Constructors ──────────────────────────────────────────────────────────

    /// Load a PDF from the file system.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::with_config(path, ValidatorConfig::default())
    }

    /// Load a PDF from an in-memory byte slice.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Ok(Self {
            document: Document::load_mem(data)?,
            config: ValidatorConfig::default(),
        })
    }

    /// Load a PDF from the file system with a custom [`ValidatorConfig`].
    pub fn with_config<P: AsRef<Path>>(path: P, config: ValidatorConfig) -> Result<Self> {
        Ok(Self {
            document: Document::load(path)?,
            config,
        })
    }

    /// Wrap a document that is already in memory.
    pub fn from_document(document: Document, config: ValidatorConfig) -> Self {
        Self { document, config }
    }

    // ── Validation ────────────────────────────────────────────────────────────

    /// Validate the resource dictionary of every page, including every
    /// external object reachable from it.
    ///
    /// A page without its own `Resources` uses the nearest ancestor's; a page
    /// that inherits none is skipped.
    pub fn validate_page_resources(&self) -> Result<()> {
        let ctx = self.context()?;
        let validator = self.validator(&ctx);

        for (number, page_id) in self.document.get_pages() {
            match self.inherited_page_entry(page_id, b"Resources")? {
                Some(resources) => {
                    debug!(page = number, "validating page resources");
                    validator.validate_resource_dictionary(resources)?;
                }
                None => debug!(page = number, "page has no resources"),
            }
        }

        Ok(())
    }

    /// Validate the thumbnail image of every page that has one.
    pub fn validate_page_thumbnails(&self) -> Result<()> {
        let ctx = self.context()?;
        let validator = self.validator(&ctx);

        for (number, page_id) in self.document.get_pages() {
            let page = self.page_dict(page_id)?;
            if let Ok(thumb) = page.get(b"Thumb") {
                debug!(page = number, "validating page thumbnail");
                validator.validate_external_object(thumb, ExpectedKind::Image)?;
            }
        }

        Ok(())
    }

    /// Validate the indirect object `id` as an external object.
    pub fn validate_object(&self, id: ObjectId, hint: ExpectedKind) -> Result<()> {
        let reference = Object::Reference(id);
        let ctx = self.context()?;
        self.validator(&ctx)
            .validate_external_object(&reference, hint)?;
        Ok(())
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    /// Returns a reference to the underlying [`lopdf::Document`].
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Returns a reference to the active [`ValidatorConfig`].
    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    // ── Private ───────────────────────────────────────────────────────────────

    fn context(&self) -> Result<DocumentContext<'_>> {
        match self.config.version_override {
            Some(version) => Ok(DocumentContext::with_version(
                &self.document,
                version,
                self.config.mode,
            )),
            None => DocumentContext::new(&self.document, self.config.mode),
        }
    }

    fn validator<'s>(&'s self, ctx: &'s DocumentContext<'s>) -> Validator<'s> {
        let validator = Validator::new(ctx).with_max_depth(self.config.max_depth);
        match &self.config.cancel {
            Some(token) => validator.with_cancel(token),
            None => validator,
        }
    }

    fn page_dict(&self, id: ObjectId) -> Result<&Dictionary> {
        match self.document.objects.get(&id) {
            Some(Object::Dictionary(dict)) => Ok(dict),
            _ => Err(Error::InvalidPdf(format!(
                "page tree node {} {} is not a dictionary",
                id.0, id.1
            ))),
        }
    }

    /// Look `key` up on the page, then on each `Parent` in turn.
    fn inherited_page_entry(&self, page_id: ObjectId, key: &[u8]) -> Result<Option<&Object>> {
        let mut node = self.page_dict(page_id)?;
        let mut visited = vec![page_id];

        loop {
            if let Ok(value) = node.get(key) {
                return Ok(Some(value));
            }

            let Ok(Object::Reference(parent)) = node.get(b"Parent") else {
                return Ok(None);
            };
            if visited.contains(parent) || visited.len() >= MAX_PAGE_TREE_DEPTH {
                return Err(Error::InvalidPdf(format!(
                    "page tree loops through {} {}",
                    parent.0, parent.1
                )));
            }
            visited.push(*parent);
            node = self.page_dict(*parent)?;
        }
    }
}
