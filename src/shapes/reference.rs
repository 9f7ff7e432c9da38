use crate::entry::{Check, EntryRule, Expect};
use crate::object::Kind;
use crate::{Validator, ValidationResult};
use lopdf::Dictionary;

/// Reference dictionary: imports a page of another document.
static REFERENCE_DICT: &[EntryRule] = &[
    EntryRule::required("F", Expect::FileSpec),
    // Page index, or a named destination.
    EntryRule::required(
        "Page",
        Expect::AnyOf {
            label: "page number or page label",
            kinds: &[Kind::Integer, Kind::LiteralString, Kind::HexString],
        },
    ),
    EntryRule::optional("ID", Expect::StringArray).check(Check::Len(2)),
];

impl<'a> Validator<'a> {
    pub(crate) fn validate_reference_dict(&self, reference: &'a Dictionary) -> ValidationResult<()> {
        let scope = self.scope(reference);
        self.check_table(&scope, "referenceDict", REFERENCE_DICT)
    }
}
