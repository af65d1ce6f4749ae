use crate::{error::FormError, lifecycle::Op};
use std::{any::Any, collections::BTreeMap, fmt};

///
/// NeedScope
/// Which operations a declared need applies to.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NeedScope {
    Both,
    CreateOnly,
    UpdateOnly,
}

impl NeedScope {
    #[must_use]
    pub const fn covers(self, op: Op) -> bool {
        match (self, op) {
            (Self::Both, _) | (Self::CreateOnly, Op::Create) | (Self::UpdateOnly, Op::Update) => {
                true
            }
            _ => false,
        }
    }
}

///
/// NeedModel
/// One declared external dependency of a form type (e.g. the acting
/// user). Declared statically; supplied by the caller per submission.
///

#[derive(Clone, Copy, Debug)]
pub struct NeedModel {
    pub name: &'static str,
    pub scope: NeedScope,
    pub required: bool,
}

///
/// Needs
///
/// Caller-supplied named context values for one submission. Values are
/// read back typed and optional; presence of required, in-scope needs is
/// checked once at entry, so callback code never has to defend against a
/// missing required value. A need scoped to the other operation is simply
/// not read and may be absent without error.
///

#[derive(Default)]
pub struct Needs {
    values: BTreeMap<&'static str, Box<dyn Any + Send + Sync>>,
}

impl Needs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with<V: Any + Send + Sync>(mut self, name: &'static str, value: V) -> Self {
        self.supply(name, value);
        self
    }

    pub fn supply<V: Any + Send + Sync>(&mut self, name: &'static str, value: V) {
        self.values.insert(name, Box::new(value));
    }

    /// Typed read; `None` when the need is absent or of another type.
    #[must_use]
    pub fn get<V: Any>(&self, name: &str) -> Option<&V> {
        self.values.get(name)?.downcast_ref()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Entry check: every required need whose scope covers the running
    /// operation must have been supplied.
    pub(crate) fn check(&self, op: Op, declared: &[NeedModel]) -> Result<(), FormError> {
        for need in declared {
            if need.required && need.scope.covers(op) && !self.contains(need.name) {
                return Err(FormError::MissingNeed { name: need.name });
            }
        }

        Ok(())
    }
}

impl fmt::Debug for Needs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACTING_USER: NeedModel = NeedModel {
        name: "acting_user",
        scope: NeedScope::Both,
        required: true,
    };

    const AUDIT_NOTE: NeedModel = NeedModel {
        name: "audit_note",
        scope: NeedScope::UpdateOnly,
        required: true,
    };

    #[test]
    fn scope_coverage() {
        assert!(NeedScope::Both.covers(Op::Create));
        assert!(NeedScope::Both.covers(Op::Update));
        assert!(NeedScope::CreateOnly.covers(Op::Create));
        assert!(!NeedScope::CreateOnly.covers(Op::Update));
        assert!(NeedScope::UpdateOnly.covers(Op::Update));
        assert!(!NeedScope::UpdateOnly.covers(Op::Create));
    }

    #[test]
    fn typed_reads_are_optional() {
        let needs = Needs::new().with("acting_user", 7u64);
        assert_eq!(needs.get::<u64>("acting_user"), Some(&7));
        assert_eq!(needs.get::<String>("acting_user"), None);
        assert_eq!(needs.get::<u64>("other"), None);
    }

    #[test]
    fn check_enforces_required_in_scope_needs() {
        let declared = [ACTING_USER, AUDIT_NOTE];

        let empty = Needs::new();
        assert!(matches!(
            empty.check(Op::Create, &declared),
            Err(FormError::MissingNeed {
                name: "acting_user"
            })
        ));

        // The update-only need may be absent on create.
        let create_ready = Needs::new().with("acting_user", 1u64);
        assert!(create_ready.check(Op::Create, &declared).is_ok());

        // But not on update.
        assert!(matches!(
            create_ready.check(Op::Update, &declared),
            Err(FormError::MissingNeed { name: "audit_note" })
        ));
    }
}
