use crate::entry::{Check, EntryRule, Expect};
use crate::{Validator, ValidationResult};
use lopdf::Dictionary;

/// Transparency group attributes of a form.
static GROUP_ATTRIBUTES: &[EntryRule] = &[
    EntryRule::optional("Type", Expect::Name).check(Check::NameIn(&["Group"])),
    EntryRule::required("S", Expect::Name).check(Check::NameIn(&["Transparency"])),
    EntryRule::optional("CS", Expect::ColorSpace),
    EntryRule::optional("I", Expect::Boolean),
    EntryRule::optional("K", Expect::Boolean),
];

impl<'a> Validator<'a> {
    pub(crate) fn validate_group_attributes(&self, group: &'a Dictionary) -> ValidationResult<()> {
        let scope = self.scope(group);
        self.check_table(&scope, "groupAttributes", GROUP_ATTRIBUTES)
    }
}
