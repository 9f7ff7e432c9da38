use crate::deref::Walk;
use crate::entry::{strict_only, Check, Entry, EntryRule, Expect, Scope};
use crate::object::{Kind, CCITT_FAX_DECODE, JPX_DECODE};
use crate::policy::Version;
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Dictionary, Object, Stream};
use tracing::debug;

use super::common::{LEGACY_NAME, METADATA, OPI, OPTIONAL_CONTENT, STRUCT_PARENT};

// ── Rules ─────────────────────────────────────────────────────────────────────

static GEOMETRY: &[EntryRule] = &[
    EntryRule::required("Width", Expect::Integer),
    EntryRule::required("Height", Expect::Integer),
];

const IMAGE_MASK: EntryRule = EntryRule::optional("ImageMask", Expect::Boolean);

/// JPEG 2000 data carries its own colour space; so, in Relaxed mode, may fax data.
const COLOR_SPACE: EntryRule =
    EntryRule::required_if("ColorSpace", Expect::ColorSpace, color_space_required);

const BITS_PER_COMPONENT: EntryRule =
    EntryRule::required_if("BitsPerComponent", Expect::Integer, not_jpx);

/// Stencil masks are one bit deep.
const STENCIL_BITS_PER_COMPONENT: EntryRule =
    EntryRule::optional("BitsPerComponent", Expect::Integer).check(Check::IntEq(1));

static RENDERING: &[EntryRule] = &[
    EntryRule::optional("Intent", Expect::Name)
        .since(Version::V1_1)
        .check(Check::NameIn(&[
            "AbsoluteColorimetric",
            "RelativeColorimetric",
            "Saturation",
            "Perceptual",
        ])),
    EntryRule::optional("Decode", Expect::NumberArray),
    EntryRule::optional("Interpolate", Expect::Boolean),
];

/// Explicit mask (an image) or colour key mask (an array of ranges).
const MASK: EntryRule = EntryRule::optional(
    "Mask",
    Expect::AnyOf {
        label: "image stream or colour key array",
        kinds: &[Kind::Stream, Kind::Array],
    },
)
.since(Version::V1_3);

const ALTERNATES: EntryRule = EntryRule::optional("Alternates", Expect::Array).since(Version::V1_3);

const SOFT_MASK: EntryRule = EntryRule::optional("SMask", Expect::Stream).since(Version::V1_4);

static SOFT_MASK_ONLY: &[EntryRule] =
    &[EntryRule::optional("Matte", Expect::NumberArray).since(Version::V1_4)];

static IDENTIFICATION: &[EntryRule] = &[
    EntryRule::optional("SMaskInData", Expect::Integer).check(Check::IntRange(0, 2)),
    LEGACY_NAME,
    STRUCT_PARENT,
    EntryRule::optional("ID", Expect::String).since(Version::V1_3),
];

/// Tags an explicit mask must carry, in every mode.
static MASK_TAGS: &[EntryRule] = &[
    EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["XObject"])),
    EntryRule::required("Subtype", Expect::Name).check(Check::NameIn(&["Image"])),
];

static SOFT_MASK_TAGS: &[EntryRule] = &[
    EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["XObject"])),
    EntryRule::required_if("Subtype", Expect::Name, strict_only).check(Check::NameIn(&["Image"])),
];

static ALTERNATE_IMAGE: &[EntryRule] = &[EntryRule::optional("DefaultForPrinting", Expect::Boolean)];

const ALTERNATE_IMAGE_STREAM: EntryRule = EntryRule::required("Image", Expect::Stream);

fn color_space_required(scope: &Scope<'_>) -> bool {
    !scope.sole_filter_is(JPX_DECODE)
        && !(scope.is_relaxed() && scope.sole_filter_is(CCITT_FAX_DECODE))
}

fn not_jpx(scope: &Scope<'_>) -> bool {
    !scope.sole_filter_is(JPX_DECODE)
}

// ── Roles ─────────────────────────────────────────────────────────────────────

/// Where an image occurs; nested roles restrict what the image may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ImageRole {
    /// A top-level image external object.
    Primary,
    /// An element of another image's `Alternates`.
    Alternate,
    /// Another image's `SMask`.
    SoftMask,
    /// Another image's explicit `Mask`.
    ExplicitMask,
}

impl ImageRole {
    fn container(self) -> &'static str {
        match self {
            ImageRole::Primary => "imageStream",
            ImageRole::Alternate => "alternateImageStream",
            ImageRole::SoftMask => "softMaskStream",
            ImageRole::ExplicitMask => "maskImageStream",
        }
    }
}

// ── Validation ────────────────────────────────────────────────────────────────

impl<'a> Validator<'a> {
    pub(crate) fn validate_image(
        &self,
        walk: &mut Walk,
        stream: &'a Stream,
        role: ImageRole,
    ) -> ValidationResult<()> {
        let container = role.container();
        let scope = self.stream_scope(stream);

        // Alternates are identified by their position; the dispatcher tags top-level images.
        match role {
            ImageRole::ExplicitMask => self.check_table(&scope, container, MASK_TAGS)?,
            ImageRole::SoftMask => self.check_table(&scope, container, SOFT_MASK_TAGS)?,
            ImageRole::Primary | ImageRole::Alternate => {}
        }

        self.check_table(&scope, container, GEOMETRY)?;

        let image_mask = matches!(
            self.check_entry(&scope, container, &IMAGE_MASK)?,
            Some(Entry { value: Object::Boolean(true), .. })
        );
        if image_mask && role == ImageRole::ExplicitMask {
            return Err(ValidationError::ConstraintViolation {
                container,
                key: IMAGE_MASK.key.to_string(),
                reason: "an explicit mask must not itself be an image mask",
            });
        }

        if !image_mask {
            self.check_entry(&scope, container, &COLOR_SPACE)?;
        }

        let bits = if image_mask {
            &STENCIL_BITS_PER_COMPONENT
        } else {
            &BITS_PER_COMPONENT
        };
        self.check_entry(&scope, container, bits)?;

        self.check_table(&scope, container, RENDERING)?;

        if let Some(mask) = self.check_entry(&scope, container, &MASK)? {
            if image_mask {
                return Err(ValidationError::ConstraintViolation {
                    container,
                    key: MASK.key.to_string(),
                    reason: "an image mask cannot be masked",
                });
            }
            self.validate_mask(walk, container, mask, role)?;
        }

        if let Some(alternates) = self.check_entry(&scope, container, &ALTERNATES)? {
            self.validate_alternates(walk, container, alternates, role)?;
        }

        if let Some(Entry {
            raw,
            value: Object::Stream(soft_mask),
        }) = self.check_entry(&scope, container, &SOFT_MASK)?
        {
            self.descend(walk, raw, container, SOFT_MASK.key, |walk| {
                self.validate_image(walk, soft_mask, ImageRole::SoftMask)
            })?;
        }

        if role == ImageRole::SoftMask {
            self.check_table(&scope, container, SOFT_MASK_ONLY)?;
        }

        self.check_table(&scope, container, IDENTIFICATION)?;

        if let Some(Entry {
            raw,
            value: Object::Dictionary(opi),
        }) = self.check_entry(&scope, container, &OPI)?
        {
            self.descend(walk, raw, container, OPI.key, |walk| {
                self.validate_opi_version_dict(walk, opi)
            })?;
        }

        if let Some(metadata) = self.check_entry(&scope, container, &METADATA)? {
            self.check_metadata(metadata)?;
        }

        if let Some(oc) = self.check_entry(&scope, container, &OPTIONAL_CONTENT)? {
            self.check_optional_content(oc)?;
        }

        Ok(())
    }

    /// `Mask`: a nested image is validated; a colour key array is not descended.
    fn validate_mask(
        &self,
        walk: &mut Walk,
        container: &'static str,
        mask: Entry<'a>,
        owner: ImageRole,
    ) -> ValidationResult<()> {
        match mask.value {
            Object::Stream(image) => self.descend(walk, mask.raw, container, MASK.key, |walk| {
                if owner == ImageRole::ExplicitMask {
                    return Err(ValidationError::ConstraintViolation {
                        container,
                        key: MASK.key.to_string(),
                        reason: "a mask image cannot carry a mask of its own",
                    });
                }
                self.validate_image(walk, image, ImageRole::ExplicitMask)
            }),
            Object::Array(_) => Ok(()),
            other => Err(ValidationError::TypeMismatch {
                container,
                key: MASK.key.to_string(),
                expected: MASK.expect.describe(),
                found: Kind::of(other),
            }),
        }
    }

    /// `Alternates`: one level only. Nested images may list no alternates.
    fn validate_alternates(
        &self,
        walk: &mut Walk,
        container: &'static str,
        alternates: Entry<'a>,
        owner: ImageRole,
    ) -> ValidationResult<()> {
        let Object::Array(items) = alternates.value else {
            return Ok(());
        };

        if owner != ImageRole::Primary {
            if items.is_empty() {
                return Ok(());
            }
            return Err(ValidationError::ConstraintViolation {
                container,
                key: ALTERNATES.key.to_string(),
                reason: "alternate images and masks cannot have alternates",
            });
        }

        debug!(count = items.len(), "validating alternate images");

        self.descend(walk, alternates.raw, container, ALTERNATES.key, |walk| {
            for item in items {
                let Some(value) = self.resolve(item, container, ALTERNATES.key, false)? else {
                    continue;
                };
                match value {
                    Object::Stream(image) => {
                        self.descend(walk, item, container, ALTERNATES.key, |walk| {
                            self.validate_image(walk, image, ImageRole::Alternate)
                        })?
                    }
                    Object::Dictionary(dict) => {
                        self.descend(walk, item, container, ALTERNATES.key, |walk| {
                            self.validate_alternate_image_dict(walk, dict)
                        })?
                    }
                    other => {
                        return Err(ValidationError::TypeMismatch {
                            container,
                            key: ALTERNATES.key.to_string(),
                            expected: "image stream or alternate image dictionary",
                            found: Kind::of(other),
                        })
                    }
                }
            }
            Ok(())
        })
    }

    /// Alternate image dictionary: `Image`, `DefaultForPrinting`, `OC`.
    fn validate_alternate_image_dict(
        &self,
        walk: &mut Walk,
        dict: &'a Dictionary,
    ) -> ValidationResult<()> {
        const CONTAINER: &str = "alternateImageDict";
        let scope = self.scope(dict);

        self.check_table(&scope, CONTAINER, ALTERNATE_IMAGE)?;

        if let Some(Entry {
            raw,
            value: Object::Stream(image),
        }) = self.check_entry(&scope, CONTAINER, &ALTERNATE_IMAGE_STREAM)?
        {
            self.descend(walk, raw, CONTAINER, ALTERNATE_IMAGE_STREAM.key, |walk| {
                self.validate_image(walk, image, ImageRole::Alternate)
            })?;
        }

        if let Some(oc) = self.check_entry(&scope, CONTAINER, &OPTIONAL_CONTENT)? {
            self.check_optional_content(oc)?;
        }

        Ok(())
    }
}
