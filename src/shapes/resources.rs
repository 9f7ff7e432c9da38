use crate::deref::Walk;
use crate::dispatch::ExpectedKind;
use crate::entry::{Entry, EntryRule, Expect};
use crate::policy::Version;
use crate::{Validator, ValidationResult};
use lopdf::{Dictionary, Object};
use tracing::debug;

const CONTAINER: &str = "resourceDict";
const XOBJECT_CONTAINER: &str = "xObjectResourceDict";

/// Resource categories other than `XObject` are only checked for shape.
static CATEGORIES: &[EntryRule] = &[
    EntryRule::optional("ExtGState", Expect::Dictionary),
    EntryRule::optional("ColorSpace", Expect::Dictionary),
    EntryRule::optional("Pattern", Expect::Dictionary).since(Version::V1_2),
    EntryRule::optional("Shading", Expect::Dictionary).since(Version::V1_3),
    EntryRule::optional("Font", Expect::Dictionary),
    EntryRule::optional("ProcSet", Expect::NameArray),
    EntryRule::optional("Properties", Expect::Dictionary).since(Version::V1_2),
];

const XOBJECT: EntryRule = EntryRule::optional("XObject", Expect::Dictionary);

impl<'a> Validator<'a> {
    /// Validate a resource dictionary and every external object it names.
    pub(crate) fn walk_resource_dict(
        &self,
        walk: &mut Walk,
        resources: &'a Dictionary,
    ) -> ValidationResult<()> {
        let scope = self.scope(resources);
        self.check_table(&scope, CONTAINER, CATEGORIES)?;

        let Some(Entry {
            raw,
            value: Object::Dictionary(xobjects),
        }) = self.check_entry(&scope, CONTAINER, &XOBJECT)?
        else {
            return Ok(());
        };

        debug!(count = xobjects.len(), "walking external object resources");

        self.descend(walk, raw, CONTAINER, XOBJECT.key, |walk| {
            for (name, value) in xobjects.iter() {
                let key = String::from_utf8_lossy(name);
                self.validate_xobject_entry(
                    walk,
                    value,
                    XOBJECT_CONTAINER,
                    &key,
                    ExpectedKind::Any,
                    false,
                )?;
            }
            Ok(())
        })
    }
}
