use crate::{Validator, ValidationError, ValidationResult};
use lopdf::{Object, ObjectId};
use tracing::debug;

/// Longest chain of references-to-references followed for a single value.
const MAX_REFERENCE_HOPS: usize = 32;

// ── Walk ──────────────────────────────────────────────────────────────────────

/// Recursion bookkeeping for one validation walk.
///
/// `chain` holds the indirect objects currently being validated on the active
/// call path; entering one of them again is a cycle. Independent branches may
/// each clone a `Walk` and proceed separately.
#[derive(Debug, Clone, Default)]
pub(crate) struct Walk {
    chain: Vec<ObjectId>,
    depth: usize,
}

// ── Dereferencing ─────────────────────────────────────────────────────────────

impl<'a> Validator<'a> {
    /// Fail with [`ValidationError::Cancelled`] once the caller cancelled.
    pub(crate) fn checkpoint(&self) -> ValidationResult<()> {
        match self.cancel {
            Some(token) if token.is_cancelled() => Err(ValidationError::Cancelled),
            _ => Ok(()),
        }
    }

    /// Follow `value` through any indirect references to a concrete object.
    ///
    /// A reference to a missing or null object is a
    /// [`ValidationError::BrokenReference`]. A direct `null` is returned as is.
    pub(crate) fn resolve_value(
        &self,
        value: &'a Object,
        container: &'static str,
        key: &str,
    ) -> ValidationResult<&'a Object> {
        let xref = self.xref;
        let mut current = value;
        let mut hops: Vec<ObjectId> = Vec::new();

        while let Object::Reference(id) = current {
            self.checkpoint()?;

            if hops.contains(id) || hops.len() >= MAX_REFERENCE_HOPS {
                return Err(ValidationError::RecursionLimitExceeded {
                    container,
                    key: key.to_string(),
                    object: Some(*id),
                    depth: hops.len(),
                });
            }
            hops.push(*id);

            current = match xref.dereference(*id) {
                Some(Object::Null) | None => {
                    return Err(ValidationError::BrokenReference {
                        container,
                        key: key.to_string(),
                        object: *id,
                    })
                }
                Some(target) => target,
            };
        }

        Ok(current)
    }

    /// Resolve an entry value, treating null and dangling references as
    /// absent unless `required` is set.
    ///
    /// Returns `Ok(None)` for an absent value; the caller decides whether that
    /// is a missing required entry.
    pub(crate) fn resolve(
        &self,
        value: &'a Object,
        container: &'static str,
        key: &str,
        required: bool,
    ) -> ValidationResult<Option<&'a Object>> {
        match self.resolve_value(value, container, key) {
            Ok(Object::Null) => Ok(None),
            Ok(resolved) => Ok(Some(resolved)),
            Err(ValidationError::BrokenReference { .. }) if !required => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run `f` one level deeper into the graph.
    ///
    /// `raw` is the entry value as stored (before dereferencing); when it is an
    /// indirect reference its object joins the active chain for the duration
    /// of `f`. Re-entering an object already on the chain, or nesting beyond
    /// the configured depth, fails with
    /// [`ValidationError::RecursionLimitExceeded`].
    pub(crate) fn descend<R>(
        &self,
        walk: &mut Walk,
        raw: &Object,
        container: &'static str,
        key: &str,
        f: impl FnOnce(&mut Walk) -> ValidationResult<R>,
    ) -> ValidationResult<R> {
        let id = match raw {
            Object::Reference(id) => Some(*id),
            _ => None,
        };

        let revisits = id.map_or(false, |id| walk.chain.contains(&id));
        if revisits || walk.depth >= self.max_depth {
            return Err(ValidationError::RecursionLimitExceeded {
                container,
                key: key.to_string(),
                object: id,
                depth: walk.depth,
            });
        }

        debug!(container, key, depth = walk.depth, "descending");

        if let Some(id) = id {
            walk.chain.push(id);
        }
        walk.depth += 1;

        let result = f(walk);

        walk.depth -= 1;
        if id.is_some() {
            walk.chain.pop();
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CancelToken, DocumentContext, ValidationMode};
    use lopdf::Document;

    fn doc_with(objects: Vec<(ObjectId, Object)>) -> Document {
        let mut doc = Document::with_version("1.7");
        for (id, object) in objects {
            doc.objects.insert(id, object);
        }
        doc
    }

    #[test]
    fn direct_values_resolve_to_themselves() {
        let doc = doc_with(vec![]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);

        let value = Object::Integer(7);
        let resolved = validator.resolve_value(&value, "test", "Key").unwrap();
        assert!(matches!(resolved, Object::Integer(7)));
    }

    #[test]
    fn follows_reference_chains() {
        let doc = doc_with(vec![
            ((1, 0), Object::Reference((2, 0))),
            ((2, 0), Object::Boolean(true)),
        ]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);

        let value = Object::Reference((1, 0));
        let resolved = validator.resolve_value(&value, "test", "Key").unwrap();
        assert!(matches!(resolved, Object::Boolean(true)));
    }

    #[test]
    fn dangling_reference_is_absent_unless_required() {
        let doc = doc_with(vec![((3, 0), Object::Null)]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);

        for target in [(3, 0), (9, 0)] {
            let value = Object::Reference(target);
            assert!(matches!(validator.resolve(&value, "test", "Key", false), Ok(None)));
            assert!(matches!(
                validator.resolve(&value, "test", "Key", true),
                Err(ValidationError::BrokenReference { object, .. }) if object == target
            ));
        }
    }

    #[test]
    fn reference_loop_is_detected() {
        let doc = doc_with(vec![
            ((1, 0), Object::Reference((2, 0))),
            ((2, 0), Object::Reference((1, 0))),
        ]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);

        let value = Object::Reference((1, 0));
        let err = validator.resolve_value(&value, "test", "Key").unwrap_err();
        assert!(matches!(err, ValidationError::RecursionLimitExceeded { .. }));
    }

    #[test]
    fn descend_rejects_objects_already_on_the_chain() {
        let doc = doc_with(vec![]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx);
        let mut walk = Walk::default();
        let outer = Object::Reference((5, 0));

        let err = validator
            .descend(&mut walk, &outer, "test", "Outer", |walk| {
                validator.descend(walk, &outer, "test", "Inner", |_| Ok(()))
            })
            .unwrap_err();

        assert!(matches!(
            err,
            ValidationError::RecursionLimitExceeded { object: Some((5, 0)), depth: 1, .. }
        ));
        assert_eq!(walk.depth, 0);
        assert!(walk.chain.is_empty());
    }

    #[test]
    fn descend_enforces_depth_limit() {
        let doc = doc_with(vec![]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let validator = Validator::new(&ctx).with_max_depth(2);
        let mut walk = Walk::default();
        let inline = Object::Dictionary(lopdf::Dictionary::new());

        let result = validator.descend(&mut walk, &inline, "test", "A", |walk| {
            validator.descend(walk, &inline, "test", "B", |walk| {
                validator.descend(walk, &inline, "test", "C", |_| Ok(()))
            })
        });

        assert!(matches!(
            result,
            Err(ValidationError::RecursionLimitExceeded { object: None, depth: 2, .. })
        ));
    }

    #[test]
    fn cancelled_walk_stops_before_dereferencing() {
        let doc = doc_with(vec![((1, 0), Object::Integer(1))]);
        let ctx = DocumentContext::new(&doc, ValidationMode::Strict).unwrap();
        let token = CancelToken::new();
        let validator = Validator::new(&ctx).with_cancel(&token);

        let value = Object::Reference((1, 0));
        assert!(validator.resolve_value(&value, "test", "Key").is_ok());

        token.cancel();
        assert!(matches!(
            validator.resolve_value(&value, "test", "Key"),
            Err(ValidationError::Cancelled)
        ));
    }
}
