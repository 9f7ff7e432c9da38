//! Open Prepress Interface dictionaries: a proxy for a high-resolution image
//! placed by an external prepress system.

use crate::deref::Walk;
use crate::entry::{Check, EntryRule, Expect};
use crate::object::Kind;
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Dictionary, Object};
use tracing::debug;

const CONTAINER: &str = "opiVersionDict";

/// `full_color`, `registration`, or an array of colorants.
const INKS: EntryRule = EntryRule::optional(
    "Inks",
    Expect::AnyOf {
        label: "colorant name or array",
        kinds: &[Kind::Name, Kind::Array],
    },
)
.check(Check::NameIn(&["full_color", "registration"]));

static OPI_1_3: &[EntryRule] = &[
    EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["OPI"])),
    EntryRule::required("Version", Expect::Number).check(Check::NumEq(1.3)),
    EntryRule::required("F", Expect::FileSpec),
    EntryRule::optional("ID", Expect::String),
    EntryRule::optional("Comments", Expect::String),
    EntryRule::required("Size", Expect::IntegerArray).check(Check::Len(2)),
    EntryRule::required("CropRect", Expect::Rectangle),
    EntryRule::optional("CropFixed", Expect::Rectangle),
    EntryRule::required("Position", Expect::NumberArray).check(Check::Len(8)),
    EntryRule::optional("Resolution", Expect::NumberArray).check(Check::Len(2)),
    EntryRule::optional("ColorType", Expect::Name)
        .check(Check::NameIn(&["Process", "Spot", "Separation"])),
    EntryRule::optional("Color", Expect::Array).check(Check::Len(5)),
    EntryRule::optional("Tint", Expect::Number),
    EntryRule::optional("Overprint", Expect::Boolean),
    EntryRule::optional("ImageType", Expect::IntegerArray).check(Check::Len(2)),
    EntryRule::optional("GrayMap", Expect::IntegerArray),
    EntryRule::optional("Transparency", Expect::Boolean),
    EntryRule::optional("Tags", Expect::Array),
    INKS,
];

static OPI_2_0: &[EntryRule] = &[
    EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["OPI"])),
    EntryRule::required("Version", Expect::Number).check(Check::NumEq(2.0)),
    EntryRule::required("F", Expect::FileSpec),
    EntryRule::optional("MainImage", Expect::String),
    EntryRule::optional("Tags", Expect::Array),
    EntryRule::optional("Size", Expect::NumberArray).check(Check::Len(2)),
    EntryRule::optional("CropRect", Expect::Rectangle),
    EntryRule::optional("Overprint", Expect::Boolean),
    INKS,
    EntryRule::optional("IncludedImageDimensions", Expect::IntegerArray).check(Check::Len(2)),
    EntryRule::optional("IncludedImageQuality", Expect::Integer).check(Check::IntRange(1, 3)),
];

impl<'a> Validator<'a> {
    /// The `OPI` entry: exactly one entry, keyed by the OPI revision, whose
    /// value is the dictionary for that revision.
    pub(crate) fn validate_opi_version_dict(
        &self,
        walk: &mut Walk,
        versions: &'a Dictionary,
    ) -> ValidationResult<()> {
        let mut entries = versions.iter();
        let (Some((version, raw)), None) = (entries.next(), entries.next()) else {
            return Err(ValidationError::SchemaViolation {
                container: CONTAINER,
                key: "OPI".to_string(),
                reason: "must have exactly one entry keyed 1.3 or 2.0",
            });
        };

        let key = String::from_utf8_lossy(version).into_owned();
        let (container, rules) = match key.as_str() {
            "1.3" => ("opiDictV13", OPI_1_3),
            "2.0" => ("opiDictV20", OPI_2_0),
            _ => {
                return Err(ValidationError::SchemaViolation {
                    container: CONTAINER,
                    key,
                    reason: "unknown OPI version",
                })
            }
        };

        let dict = match self.resolve_value(raw, CONTAINER, &key)? {
            Object::Dictionary(dict) => dict,
            other => {
                return Err(ValidationError::TypeMismatch {
                    container: CONTAINER,
                    key,
                    expected: "dictionary",
                    found: Kind::of(other),
                })
            }
        };

        debug!(version = %key, "validating OPI dictionary");

        self.descend(walk, raw, CONTAINER, &key, |_| {
            let scope = self.scope(dict);
            self.check_table(&scope, container, rules)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DocumentContext, ValidationMode};
    use lopdf::{Document, StringFormat};

    fn ints(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|v| Object::Integer(*v)).collect())
    }

    fn opi_13() -> Dictionary {
        let mut dict = Dictionary::new();
        dict.set("Type", Object::Name(b"OPI".to_vec()));
        dict.set("Version", Object::Real(1.3));
        dict.set(
            "F",
            Object::String(b"hires/cover.tif".to_vec(), StringFormat::Literal),
        );
        dict.set("Size", ints(&[2400, 3000]));
        dict.set("CropRect", ints(&[0, 0, 2400, 3000]));
        dict.set("Position", ints(&[0, 0, 0, 300, 240, 300, 240, 0]));
        dict
    }

    fn validate(versions: Dictionary) -> ValidationResult<()> {
        let doc = Document::with_version("1.7");
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);
        validator.validate_opi_version_dict(&mut Walk::default(), &versions)
    }

    #[test]
    fn accepts_a_single_known_version() {
        let mut versions = Dictionary::new();
        versions.set("1.3", Object::Dictionary(opi_13()));
        assert_eq!(validate(versions), Ok(()));
    }

    #[test]
    fn rejects_more_than_one_entry() {
        let mut versions = Dictionary::new();
        versions.set("1.3", Object::Dictionary(opi_13()));
        versions.set("2.0", Object::Dictionary(Dictionary::new()));
        assert!(matches!(
            validate(versions),
            Err(ValidationError::SchemaViolation { .. })
        ));
        assert!(matches!(
            validate(Dictionary::new()),
            Err(ValidationError::SchemaViolation { .. })
        ));
    }

    #[test]
    fn rejects_unknown_version_key() {
        let mut versions = Dictionary::new();
        versions.set("1.4", Object::Dictionary(opi_13()));
        assert!(matches!(
            validate(versions),
            Err(ValidationError::SchemaViolation { key, .. }) if key == "1.4"
        ));
    }

    #[test]
    fn version_number_must_match_key() {
        let mut versions = Dictionary::new();
        versions.set("2.0", Object::Dictionary(opi_13()));
        assert!(matches!(
            validate(versions),
            Err(ValidationError::ConstraintViolation { key, .. }) if key == "Version"
        ));
    }

    #[test]
    fn inks_is_a_colorant_name_or_array() {
        for (inks, ok) in [
            (Object::Name(b"registration".to_vec()), true),
            (Object::Array(vec![Object::Name(b"Cyan".to_vec())]), true),
            (Object::Name(b"spot".to_vec()), false),
            (Object::Integer(4), false),
        ] {
            let mut dict = opi_13();
            dict.set("Inks", inks);
            let mut versions = Dictionary::new();
            versions.set("1.3", Object::Dictionary(dict));
            assert_eq!(validate(versions).is_ok(), ok);
        }
    }

    #[test]
    fn missing_position_is_reported() {
        let mut dict = opi_13();
        dict.remove(b"Position");
        let mut versions = Dictionary::new();
        versions.set("1.3", Object::Dictionary(dict));
        assert_eq!(
            validate(versions),
            Err(ValidationError::MissingRequiredEntry {
                container: "opiDictV13",
                key: "Position".into()
            })
        );
    }
}
