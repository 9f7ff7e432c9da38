//! Entries shared by images and forms, and the shapes this family delegates
//! to (colour spaces, metadata streams, optional content, page-piece data).
//! Delegated shapes are checked for their identifying entries only.

use crate::deref::Walk;
use crate::entry::{at_earliest_version, strict_only, Check, Entry, EntryRule, Expect};
use crate::object::{name_of, Kind};
use crate::policy::Version;
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Dictionary, Object};

pub(super) const OPI: EntryRule = EntryRule::optional("OPI", Expect::Dictionary).since(Version::V1_2);

pub(super) const METADATA: EntryRule =
    EntryRule::optional("Metadata", Expect::Stream).since(Version::V1_4);

pub(super) const OPTIONAL_CONTENT: EntryRule =
    EntryRule::optional("OC", Expect::Dictionary).since(Version::V1_5);

/// Superseded by the resource name; only required in the earliest revision.
pub(super) const LEGACY_NAME: EntryRule =
    EntryRule::required_if("Name", Expect::Name, at_earliest_version);

pub(super) const STRUCT_PARENT: EntryRule =
    EntryRule::optional("StructParent", Expect::Integer).since(Version::V1_3);

static METADATA_TAGS: &[EntryRule] = &[
    EntryRule::required_if("Type", Expect::Name, strict_only).check(Check::NameIn(&["Metadata"])),
    EntryRule::required_if("Subtype", Expect::Name, strict_only).check(Check::NameIn(&["XML"])),
];

static OPTIONAL_CONTENT_TAGS: &[EntryRule] = &[EntryRule::required_if(
    "Type",
    Expect::Name,
    strict_only,
)
.check(Check::NameIn(&["OCG", "OCMD"]))];

static PAGE_PIECE_DATA: &[EntryRule] = &[EntryRule::required("LastModified", Expect::Date)];

/// Colour space families that may appear as the first element of an array.
const COLOR_SPACE_FAMILIES: &[&str] = &[
    "CalGray",
    "CalRGB",
    "Lab",
    "ICCBased",
    "Indexed",
    "Separation",
    "DeviceN",
    "DeviceGray",
    "DeviceRGB",
    "DeviceCMYK",
];

const DEVICE_COLOR_SPACES: &[&str] = &["DeviceGray", "DeviceRGB", "DeviceCMYK"];

impl<'a> Validator<'a> {
    /// Colour space entry of an external object. Pattern spaces never qualify.
    pub(crate) fn check_color_space(
        &self,
        container: &'static str,
        key: &str,
        value: &'a Object,
    ) -> ValidationResult<()> {
        let violation = |reason| ValidationError::ConstraintViolation {
            container,
            key: key.to_string(),
            reason,
        };

        match value {
            Object::Name(_) => {
                let name = name_of(value).unwrap_or_default();
                if DEVICE_COLOR_SPACES.contains(&name.as_str()) {
                    Ok(())
                } else if name == "Pattern" {
                    Err(violation("pattern colour spaces are not allowed here"))
                } else {
                    Err(violation("unknown colour space"))
                }
            }
            Object::Array(items) => {
                let Some(first) = items.first() else {
                    return Err(violation("colour space array is empty"));
                };
                let first = self.resolve_value(first, container, key)?;
                let family = name_of(first).ok_or_else(|| ValidationError::TypeMismatch {
                    container,
                    key: key.to_string(),
                    expected: "colour space family name",
                    found: Kind::of(first),
                })?;
                if family == "Pattern" {
                    Err(violation("pattern colour spaces are not allowed here"))
                } else if COLOR_SPACE_FAMILIES.contains(&family.as_str()) {
                    Ok(())
                } else {
                    Err(violation("unknown colour space"))
                }
            }
            other => Err(ValidationError::TypeMismatch {
                container,
                key: key.to_string(),
                expected: "colour space",
                found: Kind::of(other),
            }),
        }
    }

    /// `Metadata` stream.
    pub(super) fn check_metadata(&self, entry: Entry<'a>) -> ValidationResult<()> {
        if let Object::Stream(stream) = entry.value {
            let scope = self.stream_scope(stream);
            self.check_table(&scope, "metadataStream", METADATA_TAGS)?;
        }
        Ok(())
    }

    /// `OC`: an optional content group or membership dictionary.
    pub(super) fn check_optional_content(&self, entry: Entry<'a>) -> ValidationResult<()> {
        if let Object::Dictionary(dict) = entry.value {
            let scope = self.scope(dict);
            self.check_table(&scope, "optionalContent", OPTIONAL_CONTENT_TAGS)?;
        }
        Ok(())
    }

    /// `PieceInfo`: every value is a data dictionary with its own
    /// modification date.
    pub(super) fn validate_piece_info(
        &self,
        walk: &mut Walk,
        entry: Entry<'a>,
    ) -> ValidationResult<()> {
        let Object::Dictionary(pieces) = entry.value else {
            return Ok(());
        };

        self.descend(walk, entry.raw, "pieceInfo", "PieceInfo", |_| {
            for (name, value) in pieces.iter() {
                let key = String::from_utf8_lossy(name);
                let data = self.piece_data(value, &key)?;
                let scope = self.scope(data);
                self.check_table(&scope, "pageDataDict", PAGE_PIECE_DATA)?;
            }
            Ok(())
        })
    }

    fn piece_data(&self, value: &'a Object, key: &str) -> ValidationResult<&'a Dictionary> {
        match self.resolve_value(value, "pieceInfo", key)? {
            Object::Dictionary(dict) => Ok(dict),
            other => Err(ValidationError::TypeMismatch {
                container: "pieceInfo",
                key: key.to_string(),
                expected: "dictionary",
                found: Kind::of(other),
            }),
        }
    }
}
