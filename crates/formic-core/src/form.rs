use crate::{
    error::FormError,
    field::{Field, FieldView},
    lifecycle::{FormState, FormType, Op},
    model::allow::AllowList,
    needs::Needs,
    obs::{self, MetricsEvent},
    pipeline::{Acceptance, Confirmation, Pipeline, Required, RuleRun, Validator},
    params::ParamMap,
    store::{Attributes, Record, RecordStore, StoreFailure},
    value::Value,
};
use std::{any::Any, collections::BTreeMap, marker::PhantomData};

///
/// Submission
/// Outcome of a non-fatal create/update call: the driven form, plus the
/// saved record when every stage passed. `record == None` covers both
/// validation failures and field-mapped store constraints — callers
/// re-render the form either way, through the same code path.
///

pub struct Submission<T: FormType> {
    pub form: Form<T>,
    pub record: Option<Record>,
}

impl<T: FormType> std::fmt::Debug for Submission<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission")
            .field("form", &self.form)
            .field("record", &self.record)
            .finish()
    }
}

impl<T: FormType> Submission<T> {
    #[must_use]
    pub const fn saved(&self) -> bool {
        self.record.is_some()
    }
}

///
/// Form
///
/// Orchestrates one submission: allow-list binding, the prepare callback,
/// the validation pipeline, and the save callbacks around the store call.
/// Single-owner, single-call; construct, drive one `create` or `update`,
/// discard. The static model and allow-list are shared; everything here
/// is per-submission state.
///

pub struct Form<T: FormType> {
    fields: BTreeMap<&'static str, Field>,
    needs: Needs,
    pipeline: Pipeline,
    state: FormState,
    op: Op,
    submitted: bool,
    _marker: PhantomData<T>,
}

impl<T: FormType> std::fmt::Debug for Form<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Form")
            .field("fields", &self.fields)
            .field("needs", &self.needs)
            .field("pipeline", &self.pipeline)
            .field("state", &self.state)
            .field("op", &self.op)
            .field("submitted", &self.submitted)
            .finish()
    }
}

impl<T: FormType> Form<T> {
    // ======================================================================
    // Entry points
    // ======================================================================

    /// Drive a full create: bind, prepare, validate, insert.
    pub fn create(
        store: &mut dyn RecordStore,
        params: &ParamMap,
        needs: Needs,
    ) -> Result<Submission<T>, FormError> {
        Self::submit(Op::Create, store, None, params, needs)
    }

    /// Drive a full update against an existing record. Field values are
    /// seeded from the record first, then overwritten by any allowed
    /// param present in the map; an omitted param leaves the existing
    /// value untouched.
    pub fn update(
        store: &mut dyn RecordStore,
        existing: &Record,
        params: &ParamMap,
        needs: Needs,
    ) -> Result<Submission<T>, FormError> {
        Self::submit(Op::Update, store, Some(existing), params, needs)
    }

    fn submit(
        op: Op,
        store: &mut dyn RecordStore,
        existing: Option<&Record>,
        params: &ParamMap,
        needs: Needs,
    ) -> Result<Submission<T>, FormError> {
        needs.check(op, T::NEEDS)?;

        obs::record(MetricsEvent::SubmitStart {
            op,
            form_path: T::MODEL.path,
        });

        let mut form = Self::new(op, needs);
        if let Some(record) = existing {
            form.seed_from(record);
        }
        form.bind(params);

        form.pipeline.open();
        T::prepare(&mut form);
        form.pipeline.close();
        form.state = FormState::Prepared;

        // A misregistered validator is a dropped check; abort fatally
        // rather than validate with a hole in the pipeline.
        form.config_check()?;

        form.finish_validation();
        if form.state == FormState::Invalid {
            obs::record(MetricsEvent::SubmitFinish {
                op,
                form_path: T::MODEL.path,
                valid: false,
            });
            return Ok(Submission { form, record: None });
        }

        form.state = FormState::Saving;
        T::before_save(&mut form);
        // The registration window stays closed through the save
        // callbacks; a rule declared here would never run, so it aborts
        // before anything reaches the store.
        form.config_check()?;

        let attributes = form.persisted_attributes();
        let result = match existing {
            Some(record) => store.update_by_identity(&record.id, attributes),
            None => store.insert(attributes),
        };

        match result {
            Ok(record) => {
                form.state = FormState::Saved;
                T::after_save(&mut form, &record);
                form.state = FormState::AfterSaved;
                // The record is already persisted at this point, but a
                // misconfigured after_save still surfaces fatally instead
                // of being swallowed by a successful return.
                form.config_check()?;

                obs::record(MetricsEvent::SubmitFinish {
                    op,
                    form_path: T::MODEL.path,
                    valid: true,
                });

                Ok(Submission {
                    form,
                    record: Some(record),
                })
            }

            Err(StoreFailure::Constraint { field, message }) => {
                obs::record(MetricsEvent::StoreConstraint {
                    form_path: T::MODEL.path,
                });

                let Some(target) = form.fields.get_mut(field.as_str()) else {
                    // A hint naming no declared field is an unmapped
                    // failure; it takes the fatal channel.
                    return Err(FormError::UnknownConstraintField { field });
                };
                target.add_error(message);
                form.state = FormState::Invalid;

                obs::record(MetricsEvent::SubmitFinish {
                    op,
                    form_path: T::MODEL.path,
                    valid: false,
                });

                Ok(Submission { form, record: None })
            }

            Err(StoreFailure::Fatal { message }) => Err(FormError::Store { message }),
        }
    }

    // ======================================================================
    // Construction internals
    // ======================================================================

    fn new(op: Op, needs: Needs) -> Self {
        Self {
            fields: AllowList::of(T::MODEL).empty_fields(),
            needs,
            pipeline: Pipeline::new(),
            state: FormState::Constructed,
            op,
            submitted: false,
            _marker: PhantomData,
        }
    }

    /// Seed persisted fields from an existing record's attributes.
    fn seed_from(&mut self, record: &Record) {
        for field in self.fields.values_mut() {
            if !field.model().persisted {
                continue;
            }
            if let Some(value) = record.get(field.param_key()) {
                field.set_value(value.clone());
            }
        }
    }

    fn bind(&mut self, params: &ParamMap) {
        AllowList::of(T::MODEL).bind(&mut self.fields, params);

        for field in self.fields.values() {
            if field.was_assigned() && field.has_errors() {
                obs::record(MetricsEvent::CoercionFailure {
                    form_path: T::MODEL.path,
                });
            }
        }
    }

    /// Automatic requiredness, then the aggregate flag and the terminal
    /// Validated/Invalid transition.
    fn finish_validation(&mut self) {
        self.pipeline.apply_auto_required(&mut self.fields);
        self.submitted = true;
        self.state = if self.has_errors() {
            FormState::Invalid
        } else {
            FormState::Validated
        };
    }

    /// First config error, if any, escalated to the fatal channel.
    fn config_check(&self) -> Result<(), FormError> {
        match self.pipeline.config_errors().first() {
            Some(message) => Err(FormError::InvalidConfig(message.clone())),
            None => Ok(()),
        }
    }

    fn persisted_attributes(&self) -> Attributes {
        self.fields
            .values()
            .filter(|f| f.model().persisted)
            .filter_map(|f| f.value().map(|v| (f.param_key(), v.clone())))
            .collect()
    }

    // ======================================================================
    // Read API (callbacks and the markup layer)
    // ======================================================================

    #[must_use]
    pub const fn op(&self) -> Op {
        self.op
    }

    #[must_use]
    pub const fn state(&self) -> FormState {
        self.state
    }

    /// False until validation has run; distinguishes "freshly constructed"
    /// from "validated and clean".
    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.fields.values().any(Field::has_errors)
    }

    /// Read-only view of one field for rendering.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<FieldView<'_>> {
        self.fields.get(name).map(Field::view)
    }

    /// Read-only views of every field, in name order.
    pub fn fields(&self) -> impl Iterator<Item = FieldView<'_>> {
        self.fields.values().map(Field::view)
    }

    #[must_use]
    pub fn value(&self, name: &str) -> Option<&Value> {
        self.fields.get(name).and_then(Field::value)
    }

    /// Typed context read; absent for out-of-scope or optional needs.
    #[must_use]
    pub fn need<V: Any>(&self, name: &str) -> Option<&V> {
        self.needs.get(name)
    }

    /// Ordered trace of every validator invocation this submission ran,
    /// including the automatic requiredness pass, for diagnostics.
    #[must_use]
    pub fn rule_runs(&self) -> &[RuleRun] {
        self.pipeline.runs()
    }

    // ======================================================================
    // Callback-time writes
    // ======================================================================

    /// Programmatic value assignment, for derived values in `prepare` or
    /// adjustments in `before_save`. This path does not consult the
    /// allow-list: it is not parameter input.
    pub fn set_value(&mut self, name: &str, value: Value) {
        if let Some(field) = self.fields.get_mut(name) {
            field.set_value(value);
        } else {
            self.pipeline
                .config_error(format!("set_value on unknown field '{name}'"));
        }
    }

    pub fn clear_value(&mut self, name: &str) {
        if let Some(field) = self.fields.get_mut(name) {
            field.clear_value();
        } else {
            self.pipeline
                .config_error(format!("clear_value on unknown field '{name}'"));
        }
    }

    // ======================================================================
    // Validator registration (prepare only)
    // ======================================================================

    /// Register and immediately evaluate a rule against a field's current
    /// value. Failures append to that field's errors; later rules and
    /// other fields still run.
    pub fn validate(&mut self, name: &str, rule: &dyn Validator) {
        let Some(field) = self.fields.get_mut(name) else {
            self.pipeline.config_error(format!(
                "validator '{}' targets unknown field '{name}'",
                rule.name()
            ));
            return;
        };

        self.pipeline.apply(field, rule);
    }

    /// Built-in: present and, for text, non-blank. Counts toward the
    /// automatic pass's by-field de-duplication.
    pub fn validate_required(&mut self, name: &str) {
        self.validate(name, &Required);
    }

    /// Built-in: equality with another field's current value.
    pub fn validate_confirmation_of(&mut self, name: &str, other: &'static str) {
        if !T::MODEL.contains(other) {
            self.pipeline.config_error(format!(
                "confirmation_of targets unknown field '{other}'"
            ));
            return;
        }

        let rule = Confirmation {
            other_name: other,
            other_value: self.fields.get(other).and_then(|f| f.value().cloned()),
        };
        self.validate(name, &rule);
    }

    /// Built-in: the affirmative boolean token.
    pub fn validate_acceptance_of(&mut self, name: &str) {
        self.validate(name, &Acceptance);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        model::{
            field::{FieldKind, FieldModel},
            form::FormModel,
        },
        pipeline::REQUIRED_MESSAGE,
        store::MemStore,
    };

    static PERSON_MODEL: FormModel = FormModel {
        path: "tests::PersonForm",
        form_name: "PersonForm",
        fields: &[
            FieldModel {
                name: "name",
                kind: FieldKind::Text,
                nullable: false,
                persisted: true,
                assignable: true,
            },
            FieldModel {
                name: "age",
                kind: FieldKind::Uint,
                nullable: true,
                persisted: true,
                assignable: true,
            },
        ],
    };

    struct PersonForm;

    impl FormType for PersonForm {
        const MODEL: &'static FormModel = &PERSON_MODEL;
    }

    fn params(pairs: &[(&str, &str)]) -> ParamMap {
        pairs.iter().copied().collect()
    }

    #[test]
    fn create_persists_valid_input() {
        let mut store = MemStore::new();
        let submission = Form::<PersonForm>::create(
            &mut store,
            &params(&[("name", "Sam"), ("age", "21")]),
            Needs::new(),
        )
        .unwrap();

        assert!(submission.saved());
        let record = submission.record.unwrap();
        assert_eq!(record.get("name"), Some(&Value::Text("Sam".into())));
        assert_eq!(record.get("age"), Some(&Value::Uint(21)));
        assert_eq!(submission.form.state(), FormState::AfterSaved);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn blank_required_field_blocks_the_save() {
        let mut store = MemStore::new();
        let submission =
            Form::<PersonForm>::create(&mut store, &params(&[("name", "")]), Needs::new())
                .unwrap();

        assert!(!submission.saved());
        assert_eq!(submission.form.state(), FormState::Invalid);
        let name = submission.form.field("name").unwrap();
        assert_eq!(name.error_messages(), [REQUIRED_MESSAGE]);
        assert!(!submission.form.field("age").unwrap().has_errors());
        assert!(store.is_empty());
    }

    #[test]
    fn update_preserves_omitted_allowed_params() {
        let mut store = MemStore::new();
        let created = Form::<PersonForm>::create(
            &mut store,
            &params(&[("name", "Sam"), ("age", "21")]),
            Needs::new(),
        )
        .unwrap()
        .record
        .unwrap();

        let updated = Form::<PersonForm>::update(
            &mut store,
            &created,
            &params(&[("name", "Samuel")]),
            Needs::new(),
        )
        .unwrap()
        .record
        .unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(updated.get("name"), Some(&Value::Text("Samuel".into())));
        // Omitted allowed param left untouched, not cleared.
        assert_eq!(updated.get("age"), Some(&Value::Uint(21)));
    }

    #[test]
    fn constraint_failure_lands_on_the_hinted_field() {
        let mut store = MemStore::new().unique_on("name");
        Form::<PersonForm>::create(&mut store, &params(&[("name", "Sam")]), Needs::new())
            .unwrap();

        let submission =
            Form::<PersonForm>::create(&mut store, &params(&[("name", "Sam")]), Needs::new())
                .unwrap();

        assert!(!submission.saved());
        let name = submission.form.field("name").unwrap();
        assert_eq!(name.error_messages(), ["has already been taken"]);
        assert_eq!(submission.form.state(), FormState::Invalid);
    }

    #[test]
    fn fatal_store_failure_propagates() {
        struct DownStore;
        impl RecordStore for DownStore {
            fn insert(&mut self, _: Attributes) -> Result<Record, StoreFailure> {
                Err(StoreFailure::Fatal {
                    message: "connection lost".to_string(),
                })
            }
            fn update_by_identity(
                &mut self,
                _: &crate::store::RecordId,
                _: Attributes,
            ) -> Result<Record, StoreFailure> {
                unimplemented!("not exercised")
            }
        }

        let err = Form::<PersonForm>::create(
            &mut DownStore,
            &params(&[("name", "Sam")]),
            Needs::new(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            FormError::Store {
                message: "connection lost".to_string()
            }
        );
    }

    #[test]
    fn unknown_constraint_hint_is_fatal() {
        struct BadHintStore;
        impl RecordStore for BadHintStore {
            fn insert(&mut self, _: Attributes) -> Result<Record, StoreFailure> {
                Err(StoreFailure::Constraint {
                    field: "no_such_field".to_string(),
                    message: "boom".to_string(),
                })
            }
            fn update_by_identity(
                &mut self,
                _: &crate::store::RecordId,
                _: Attributes,
            ) -> Result<Record, StoreFailure> {
                unimplemented!("not exercised")
            }
        }

        let err = Form::<PersonForm>::create(
            &mut BadHintStore,
            &params(&[("name", "Sam")]),
            Needs::new(),
        )
        .unwrap_err();

        assert_eq!(
            err,
            FormError::UnknownConstraintField {
                field: "no_such_field".to_string()
            }
        );
    }

    #[test]
    fn prepare_misconfiguration_is_fatal() {
        struct BadForm;
        impl FormType for BadForm {
            const MODEL: &'static FormModel = &PERSON_MODEL;

            fn prepare(form: &mut Form<Self>) {
                form.validate_required("no_such_field");
            }
        }

        let err =
            Form::<BadForm>::create(&mut MemStore::new(), &params(&[("name", "x")]), Needs::new())
                .unwrap_err();

        assert!(matches!(err, FormError::InvalidConfig(_)));
    }

    #[test]
    fn late_registration_in_before_save_is_fatal() {
        struct LateForm;
        impl FormType for LateForm {
            const MODEL: &'static FormModel = &PERSON_MODEL;

            fn before_save(form: &mut Form<Self>) {
                form.validate_required("name");
            }
        }

        let mut store = MemStore::new();
        let err = Form::<LateForm>::create(&mut store, &params(&[("name", "Sam")]), Needs::new())
            .unwrap_err();

        assert!(matches!(err, FormError::InvalidConfig(_)));
        // Aborted before the store was touched.
        assert!(store.is_empty());
    }

    #[test]
    fn unknown_field_write_in_after_save_is_fatal() {
        struct SloppyForm;
        impl FormType for SloppyForm {
            const MODEL: &'static FormModel = &PERSON_MODEL;

            fn after_save(form: &mut Form<Self>, _record: &Record) {
                form.set_value("no_such_field", Value::Bool(true));
            }
        }

        let err = Form::<SloppyForm>::create(
            &mut MemStore::new(),
            &params(&[("name", "Sam")]),
            Needs::new(),
        )
        .unwrap_err();

        assert!(matches!(err, FormError::InvalidConfig(_)));
    }

    #[test]
    fn invalid_update_param_clears_the_seeded_value() {
        let mut store = MemStore::new();
        let created = Form::<PersonForm>::create(
            &mut store,
            &params(&[("name", "Sam"), ("age", "21")]),
            Needs::new(),
        )
        .unwrap()
        .record
        .unwrap();

        let submission = Form::<PersonForm>::update(
            &mut store,
            &created,
            &params(&[("age", "twenty")]),
            Needs::new(),
        )
        .unwrap();

        assert!(!submission.saved());
        let age = submission.form.field("age").unwrap();
        // The rejected raw text is kept for re-rendering; the value
        // seeded from the existing record is gone, not shown beside it.
        assert_eq!(age.value(), None);
        assert_eq!(age.param_raw(), Some("twenty"));
        assert!(age.has_errors());
        // The stored record is untouched.
        assert_eq!(store.get(&created.id).unwrap().get("age"), Some(&Value::Uint(21)));
    }

    #[test]
    fn rule_runs_trace_preserves_declaration_order() {
        struct TracedForm;
        impl FormType for TracedForm {
            const MODEL: &'static FormModel = &PERSON_MODEL;

            fn prepare(form: &mut Form<Self>) {
                form.validate_required("name");
                form.validate_required("age");
            }
        }

        let submission = Form::<TracedForm>::create(
            &mut MemStore::new(),
            &params(&[("name", "Sam")]),
            Needs::new(),
        )
        .unwrap();

        let runs = submission.form.rule_runs();
        assert_eq!(runs.len(), 2);
        assert_eq!((runs[0].field, runs[0].failed), ("name", false));
        assert_eq!((runs[1].field, runs[1].failed), ("age", true));
    }

    #[test]
    fn needs_are_readable_from_callbacks() {
        static SEEN: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

        struct AuditedForm;
        impl FormType for AuditedForm {
            const MODEL: &'static FormModel = &PERSON_MODEL;
            const NEEDS: &'static [crate::needs::NeedModel] = &[crate::needs::NeedModel {
                name: "acting_user",
                scope: crate::needs::NeedScope::Both,
                required: true,
            }];

            fn prepare(form: &mut Form<Self>) {
                if let Some(user) = form.need::<u64>("acting_user") {
                    SEEN.store(*user, std::sync::atomic::Ordering::SeqCst);
                }
            }
        }

        let missing = Form::<AuditedForm>::create(
            &mut MemStore::new(),
            &params(&[("name", "Sam")]),
            Needs::new(),
        );
        assert!(matches!(
            missing,
            Err(FormError::MissingNeed {
                name: "acting_user"
            })
        ));

        let submission = Form::<AuditedForm>::create(
            &mut MemStore::new(),
            &params(&[("name", "Sam")]),
            Needs::new().with("acting_user", 42u64),
        )
        .unwrap();

        assert!(submission.saved());
        assert_eq!(SEEN.load(std::sync::atomic::Ordering::SeqCst), 42);
    }
}
