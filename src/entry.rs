//! Entry rules and the generic primitives that check them.
//!
//! A shape's schema is a list of [`EntryRule`]s: pure data saying which key,
//! which value kind, how required, since which revision, and which value
//! constraint. [`Validator::check_entry`] interprets one rule against one
//! dictionary; shape validators only add what a table cannot say (descent
//! into nested containers, cross-field rules).

use crate::date::parse_pdf_date;
use crate::object::{number_of, sole_filter_is, Kind};
use crate::policy::{Applicability, Version, VersionPolicy};
use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Dictionary, Object, Stream};
use tracing::trace;

// ── Rule data ─────────────────────────────────────────────────────────────────

/// What an entry's requiredness depends on.
#[derive(Clone, Copy)]
pub(crate) enum Requiredness {
    Required,
    Optional,
    /// Required when the predicate holds for the surrounding container.
    RequiredIf(fn(&Scope<'_>) -> bool),
}

/// The runtime shape an entry value must have.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Expect {
    Boolean,
    Integer,
    /// Integer or real.
    Number,
    Name,
    /// Literal or hexadecimal string.
    String,
    Array,
    Dictionary,
    Stream,
    /// Array of exactly four numbers.
    Rectangle,
    /// String in PDF date syntax.
    Date,
    NumberArray,
    IntegerArray,
    StringArray,
    NameArray,
    /// File specification string or dictionary.
    FileSpec,
    /// Device colour space name or colour space family array, never `Pattern`.
    ColorSpace,
    /// Any one of `kinds`; `label` names the set in diagnostics.
    AnyOf {
        label: &'static str,
        kinds: &'static [Kind],
    },
}

impl Expect {
    pub(crate) fn describe(&self) -> &'static str {
        match self {
            Expect::Boolean => "boolean",
            Expect::Integer => "integer",
            Expect::Number => "number",
            Expect::Name => "name",
            Expect::String => "string",
            Expect::Array => "array",
            Expect::Dictionary => "dictionary",
            Expect::Stream => "stream",
            Expect::Rectangle => "rectangle",
            Expect::Date => "date string",
            Expect::NumberArray => "array of numbers",
            Expect::IntegerArray => "array of integers",
            Expect::StringArray => "array of strings",
            Expect::NameArray => "array of names",
            Expect::FileSpec => "file specification",
            Expect::ColorSpace => "colour space",
            Expect::AnyOf { label, .. } => *label,
        }
    }

    /// Element kind for the homogeneous array variants.
    fn element(&self) -> Option<Expect> {
        match self {
            Expect::NumberArray => Some(Expect::Number),
            Expect::IntegerArray => Some(Expect::Integer),
            Expect::StringArray => Some(Expect::String),
            Expect::NameArray => Some(Expect::Name),
            _ => None,
        }
    }
}

/// Constraint on an entry value, checked after its kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Check {
    /// Array with exactly this many elements.
    Len(usize),
    IntEq(i64),
    /// Integer within the inclusive range.
    IntRange(i64, i64),
    /// Number equal to this value.
    NumEq(f64),
    /// Name drawn from this vocabulary. Values that are not names pass.
    NameIn(&'static [&'static str]),
}

impl Check {
    pub(crate) fn holds(&self, value: &Object) -> bool {
        match (self, value) {
            (Check::Len(n), Object::Array(items)) => items.len() == *n,
            (Check::IntEq(expected), Object::Integer(i)) => i == expected,
            (Check::IntRange(lo, hi), Object::Integer(i)) => (*lo..=*hi).contains(i),
            (Check::NumEq(expected), value) => {
                number_of(value).map_or(true, |n| (n - expected).abs() < 1e-4)
            }
            (Check::NameIn(names), Object::Name(name)) => {
                names.iter().any(|candidate| candidate.as_bytes() == name.as_slice())
            }
            _ => true,
        }
    }

    fn reason(&self) -> &'static str {
        match self {
            Check::Len(_) => "array has the wrong number of elements",
            Check::IntEq(_) => "integer has an illegal value",
            Check::IntRange(..) => "integer is out of range",
            Check::NumEq(_) => "number has an illegal value",
            Check::NameIn(_) => "name is not in the allowed vocabulary",
        }
    }
}

/// One expected key of a container kind.
#[derive(Clone, Copy)]
pub(crate) struct EntryRule {
    pub(crate) key: &'static str,
    pub(crate) expect: Expect,
    pub(crate) requiredness: Requiredness,
    pub(crate) since: Version,
    pub(crate) check: Option<Check>,
}

impl EntryRule {
    pub(crate) const fn required(key: &'static str, expect: Expect) -> Self {
        Self {
            key,
            expect,
            requiredness: Requiredness::Required,
            since: Version::V1_0,
            check: None,
        }
    }

    pub(crate) const fn optional(key: &'static str, expect: Expect) -> Self {
        Self {
            requiredness: Requiredness::Optional,
            ..Self::required(key, expect)
        }
    }

    pub(crate) const fn required_if(
        key: &'static str,
        expect: Expect,
        predicate: fn(&Scope<'_>) -> bool,
    ) -> Self {
        Self {
            requiredness: Requiredness::RequiredIf(predicate),
            ..Self::required(key, expect)
        }
    }

    pub(crate) const fn since(self, since: Version) -> Self {
        Self { since, ..self }
    }

    pub(crate) const fn check(self, check: Check) -> Self {
        Self {
            check: Some(check),
            ..self
        }
    }
}

// ── Scope ─────────────────────────────────────────────────────────────────────

/// The container a rule is evaluated against.
pub(crate) struct Scope<'s> {
    pub(crate) dict: &'s Dictionary,
    pub(crate) stream: Option<&'s Stream>,
    pub(crate) policy: VersionPolicy,
}

impl Scope<'_> {
    pub(crate) fn sole_filter_is(&self, filter: &str) -> bool {
        self.stream.map_or(false, |s| sole_filter_is(s, filter))
    }

    pub(crate) fn is_relaxed(&self) -> bool {
        self.policy.is_relaxed()
    }
}

/// Required in Strict mode only.
pub(crate) fn strict_only(scope: &Scope<'_>) -> bool {
    !scope.is_relaxed()
}

/// Required only in documents of the earliest revision.
pub(crate) fn at_earliest_version(scope: &Scope<'_>) -> bool {
    scope.policy.version == Version::EARLIEST
}

/// A present entry: the value as stored, and the value it resolves to.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Entry<'a> {
    pub(crate) raw: &'a Object,
    pub(crate) value: &'a Object,
}

// ── Primitives ────────────────────────────────────────────────────────────────

impl<'a> Validator<'a> {
    pub(crate) fn scope(&self, dict: &'a Dictionary) -> Scope<'a> {
        Scope {
            dict,
            stream: None,
            policy: self.policy,
        }
    }

    pub(crate) fn stream_scope(&self, stream: &'a Stream) -> Scope<'a> {
        Scope {
            dict: &stream.dict,
            stream: Some(stream),
            policy: self.policy,
        }
    }

    /// Check one entry against its rule.
    ///
    /// Returns `Ok(None)` when the entry is absent and not required, or the
    /// resolved entry when it is present and satisfies the rule.
    pub(crate) fn check_entry(
        &self,
        scope: &Scope<'a>,
        container: &'static str,
        rule: &EntryRule,
    ) -> ValidationResult<Option<Entry<'a>>> {
        let applicable = self.policy.applicability(rule.since) == Applicability::Enforce;
        let required = applicable
            && match rule.requiredness {
                Requiredness::Required => true,
                Requiredness::Optional => false,
                Requiredness::RequiredIf(predicate) => predicate(scope),
            };

        let missing = || {
            if required {
                Err(ValidationError::MissingRequiredEntry {
                    container,
                    key: rule.key.to_string(),
                })
            } else {
                Ok(None)
            }
        };

        let Ok(raw) = scope.dict.get(rule.key.as_bytes()) else {
            return missing();
        };
        let Some(value) = self.resolve(raw, container, rule.key, required)? else {
            return missing();
        };

        trace!(container, key = rule.key, kind = %Kind::of(value), "checking entry");

        self.check_kind(container, rule.key, rule.expect, value)?;

        if let Some(check) = rule.check {
            if !check.holds(value) {
                return Err(ValidationError::ConstraintViolation {
                    container,
                    key: rule.key.to_string(),
                    reason: check.reason(),
                });
            }
        }

        self.policy.check_present(container, rule.key, rule.since)?;

        Ok(Some(Entry { raw, value }))
    }

    /// Check every rule of a table, in order.
    pub(crate) fn check_table(
        &self,
        scope: &Scope<'a>,
        container: &'static str,
        rules: &[EntryRule],
    ) -> ValidationResult<()> {
        for rule in rules {
            self.check_entry(scope, container, rule)?;
        }
        Ok(())
    }

    /// Verify that a resolved value has the expected runtime shape.
    pub(crate) fn check_kind(
        &self,
        container: &'static str,
        key: &str,
        expect: Expect,
        value: &'a Object,
    ) -> ValidationResult<()> {
        let kind = Kind::of(value);
        let mismatch = || ValidationError::TypeMismatch {
            container,
            key: key.to_string(),
            expected: expect.describe(),
            found: kind,
        };

        let matches = match expect {
            Expect::Boolean => kind == Kind::Boolean,
            Expect::Integer => kind == Kind::Integer,
            Expect::Number => kind.is_number(),
            Expect::Name => kind == Kind::Name,
            Expect::String => kind.is_string(),
            Expect::Array => kind == Kind::Array,
            Expect::Dictionary => kind == Kind::Dictionary,
            Expect::Stream => kind == Kind::Stream,
            Expect::FileSpec => kind.is_string() || kind == Kind::Dictionary,
            Expect::AnyOf { kinds, .. } => kinds.contains(&kind),
            Expect::Date => {
                let Object::String(bytes, _) = value else {
                    return Err(mismatch());
                };
                if parse_pdf_date(bytes, self.policy.is_relaxed()).is_none() {
                    return Err(ValidationError::ConstraintViolation {
                        container,
                        key: key.to_string(),
                        reason: "not a valid date",
                    });
                }
                true
            }
            Expect::Rectangle => {
                let Object::Array(items) = value else {
                    return Err(mismatch());
                };
                if items.len() != 4 {
                    return Err(ValidationError::ConstraintViolation {
                        container,
                        key: key.to_string(),
                        reason: "rectangle needs exactly four numbers",
                    });
                }
                self.check_elements(container, key, Expect::Number, items)?;
                true
            }
            Expect::NumberArray | Expect::IntegerArray | Expect::StringArray | Expect::NameArray => {
                let Object::Array(items) = value else {
                    return Err(mismatch());
                };
                if let Some(element) = expect.element() {
                    self.check_elements(container, key, element, items)?;
                }
                true
            }
            Expect::ColorSpace => {
                self.check_color_space(container, key, value)?;
                true
            }
        };

        if matches {
            Ok(())
        } else {
            Err(mismatch())
        }
    }

    fn check_elements(
        &self,
        container: &'static str,
        key: &str,
        element: Expect,
        items: &'a [Object],
    ) -> ValidationResult<()> {
        for item in items {
            let value = self.resolve_value(item, container, key)?;
            self.check_kind(container, key, element, value)?;
        }
        Ok(())
    }
}
