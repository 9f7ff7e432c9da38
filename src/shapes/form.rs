use crate::deref::Walk;
use crate::entry::{Check, Entry, EntryRule, Expect};
use crate::policy::Version;
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Object, Stream};

use super::common::{LEGACY_NAME, METADATA, OPI, OPTIONAL_CONTENT, STRUCT_PARENT};

const CONTAINER: &str = "formStream";

static GEOMETRY: &[EntryRule] = &[
    EntryRule::optional("FormType", Expect::Integer).check(Check::IntEq(1)),
    EntryRule::required("BBox", Expect::Rectangle),
    EntryRule::optional("Matrix", Expect::NumberArray).check(Check::Len(6)),
];

const RESOURCES: EntryRule =
    EntryRule::optional("Resources", Expect::Dictionary).since(Version::V1_2);

const GROUP: EntryRule = EntryRule::optional("Group", Expect::Dictionary).since(Version::V1_4);

const REFERENCE: EntryRule = EntryRule::optional("Ref", Expect::Dictionary).since(Version::V1_4);

const PIECE_INFO: EntryRule =
    EntryRule::optional("PieceInfo", Expect::Dictionary).since(Version::V1_3);

const LAST_MODIFIED: EntryRule =
    EntryRule::optional("LastModified", Expect::Date).since(Version::V1_3);

const STRUCT_PARENTS: EntryRule =
    EntryRule::optional("StructParents", Expect::Integer).since(Version::V1_3);

impl<'a> Validator<'a> {
    /// Form external object: a self-contained content stream with its own
    /// bounding box and, optionally, its own resources.
    pub(crate) fn validate_form(&self, walk: &mut Walk, stream: &'a Stream) -> ValidationResult<()> {
        let scope = self.stream_scope(stream);

        self.check_table(&scope, CONTAINER, GEOMETRY)?;

        if let Some(Entry {
            raw,
            value: Object::Dictionary(resources),
        }) = self.check_entry(&scope, CONTAINER, &RESOURCES)?
        {
            self.descend(walk, raw, CONTAINER, RESOURCES.key, |walk| {
                self.walk_resource_dict(walk, resources)
            })?;
        }

        if let Some(Entry {
            raw,
            value: Object::Dictionary(group),
        }) = self.check_entry(&scope, CONTAINER, &GROUP)?
        {
            self.descend(walk, raw, CONTAINER, GROUP.key, |_| {
                self.validate_group_attributes(group)
            })?;
        }

        if let Some(Entry {
            raw,
            value: Object::Dictionary(reference),
        }) = self.check_entry(&scope, CONTAINER, &REFERENCE)?
        {
            self.descend(walk, raw, CONTAINER, REFERENCE.key, |_| {
                self.validate_reference_dict(reference)
            })?;
        }

        if let Some(metadata) = self.check_entry(&scope, CONTAINER, &METADATA)? {
            self.check_metadata(metadata)?;
        }

        let piece_info = self.check_entry(&scope, CONTAINER, &PIECE_INFO)?;
        let last_modified = self.check_entry(&scope, CONTAINER, &LAST_MODIFIED)?;
        if let Some(piece_info) = piece_info {
            if last_modified.is_none() {
                return Err(ValidationError::MissingDependentEntry {
                    container: CONTAINER,
                    key: LAST_MODIFIED.key.to_string(),
                    required_by: PIECE_INFO.key.to_string(),
                });
            }
            self.validate_piece_info(walk, piece_info)?;
        }

        let struct_parent = self.check_entry(&scope, CONTAINER, &STRUCT_PARENT)?;
        let struct_parents = self.check_entry(&scope, CONTAINER, &STRUCT_PARENTS)?;
        if struct_parent.is_some() && struct_parents.is_some() {
            return Err(ValidationError::ConflictingEntries {
                container: CONTAINER,
                first: STRUCT_PARENT.key.to_string(),
                second: STRUCT_PARENTS.key.to_string(),
            });
        }

        if let Some(Entry {
            raw,
            value: Object::Dictionary(opi),
        }) = self.check_entry(&scope, CONTAINER, &OPI)?
        {
            self.descend(walk, raw, CONTAINER, OPI.key, |walk| {
                self.validate_opi_version_dict(walk, opi)
            })?;
        }

        if let Some(oc) = self.check_entry(&scope, CONTAINER, &OPTIONAL_CONTENT)? {
            self.check_optional_content(oc)?;
        }

        self.check_entry(&scope, CONTAINER, &LEGACY_NAME)?;

        Ok(())
    }
}
