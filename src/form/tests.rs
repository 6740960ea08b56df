use super::controller::{FormState, transition_submit_state};
use super::*;
use futures::executor::block_on;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Clone, Debug, Eq, PartialEq, signin_card_derive::FormModel)]
struct ProfileForm {
    email: String,
    password: String,
    confirm_password: String,
}

fn base_form() -> ProfileForm {
    ProfileForm {
        email: "user@example.com".into(),
        password: "secret".into(),
        confirm_password: "secret".into(),
    }
}

fn required(_model: &ProfileForm, value: &String) -> Result<(), RuleViolation> {
    if value.is_empty() {
        Err(RuleViolation::new(RuleKind::InvalidFormat, "required"))
    } else {
        Ok(())
    }
}

fn profile_schema() -> Schema<ProfileForm> {
    let fields = ProfileForm::fields();
    Schema::new()
        .rule(fields.email(), required)
        .rule(fields.email(), email("bad email"))
        .rule(fields.password(), min_length(6, "too short"))
        .rule(
            fields.confirm_password(),
            |model: &ProfileForm, value: &String| {
                if value != &model.password {
                    Err(RuleViolation::new(
                        RuleKind::InvalidFormat,
                        "password mismatch",
                    ))
                } else {
                    Ok(())
                }
            },
        )
}

fn controller_with(mode: ValidationMode) -> FormController<ProfileForm> {
    FormController::new(
        base_form(),
        profile_schema(),
        FormOptions {
            validate_mode: mode,
            ..FormOptions::default()
        },
    )
}

#[test]
fn derive_macro_generates_field_lenses_and_keys() {
    let fields = ProfileForm::fields();
    assert_eq!(fields.email().key().as_str(), "email");
    assert_eq!(fields.confirm_password().key().as_str(), "confirm_password");
    assert_eq!(
        ProfileForm::field_keys(),
        &[
            FieldKey::new("email"),
            FieldKey::new("password"),
            FieldKey::new("confirm_password"),
        ]
    );

    let mut model = base_form();
    fields.password().set(&mut model, "changed".into());
    assert_eq!(fields.password().get(&model), "changed");
}

#[test]
fn field_lens_updates_model_and_dirty_state() {
    let controller = controller_with(ValidationMode::OnSubmit);
    let fields = ProfileForm::fields();

    controller
        .set(fields.email(), "changed@example.com".into())
        .expect("set must succeed");
    let snapshot = controller.snapshot().expect("snapshot must succeed");
    assert!(snapshot.is_dirty);
    assert_eq!(snapshot.model.email, "changed@example.com");
    assert!(snapshot.field_meta[&fields.email().key()].dirty);
    assert!(!snapshot.field_meta[&fields.password().key()].dirty);

    controller
        .set(fields.email(), "user@example.com".into())
        .expect("restore initial value");
    assert!(!controller.snapshot().expect("snapshot").is_dirty);
}

#[test]
fn first_failing_rule_of_a_field_wins() {
    let schema = profile_schema();
    let fields = ProfileForm::fields();
    let mut model = base_form();

    model.email.clear();
    let errors = schema.validate(&model);
    assert_eq!(errors[&fields.email().key()].message(), "required");

    model.email = "nope".into();
    let errors = schema.validate(&model);
    assert_eq!(errors[&fields.email().key()].message(), "bad email");
    assert_eq!(
        schema
            .validate_field(&model, fields.email().key())
            .map(|error| error.kind),
        Some(RuleKind::InvalidFormat)
    );
    assert_eq!(
        schema.keys().collect::<Vec<_>>(),
        vec![
            fields.email().key(),
            fields.password().key(),
            fields.confirm_password().key(),
        ]
    );
}

#[test]
fn validation_mode_controls_when_errors_surface() {
    let fields = ProfileForm::fields();

    let on_change = controller_with(ValidationMode::OnChange);
    on_change
        .set(fields.email(), "".into())
        .expect("set invalid email");
    assert_eq!(
        on_change
            .field_error(fields.email())
            .expect("field error")
            .map(|error| error.message),
        Some("required".into())
    );

    let on_submit = controller_with(ValidationMode::OnSubmit);
    on_submit
        .set(fields.email(), "".into())
        .expect("set invalid email");
    assert!(on_submit.errors().expect("errors").is_empty());
    assert!(!on_submit.is_valid().expect("validity"));

    let on_blur = controller_with(ValidationMode::OnBlur);
    on_blur
        .set(fields.email(), "".into())
        .expect("set invalid email");
    assert!(on_blur.errors().expect("errors").is_empty());
    on_blur.touch(fields.email()).expect("touch email");
    assert_eq!(on_blur.errors().expect("errors").len(), 1);
    assert!(
        on_blur
            .field_meta(fields.email())
            .expect("meta")
            .is_some_and(|meta| meta.touched && meta.validated)
    );
}

#[test]
fn cross_field_rules_read_the_whole_model() {
    let fields = ProfileForm::fields();
    let controller = controller_with(ValidationMode::OnChange);

    controller
        .set(fields.confirm_password(), "different".into())
        .expect("set confirmation");
    let errors = controller.errors().expect("errors");
    assert_eq!(
        errors[&fields.confirm_password().key()].message(),
        "password mismatch"
    );
}

#[test]
fn submit_state_transitions_are_enforced() {
    let fields = ProfileForm::fields();
    let controller = controller_with(ValidationMode::OnSubmit);
    let submit_count = Arc::new(AtomicUsize::new(0));

    controller
        .set(fields.email(), "".into())
        .expect("set invalid email");
    let outcome = {
        let submit_count = submit_count.clone();
        block_on(controller.submit_with(move |_model| async move {
            submit_count.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        }))
        .expect("invalid submit is not an error")
    };
    assert!(matches!(outcome, SubmitOutcome::Invalid(ref errors) if errors.len() == 1));
    assert_eq!(submit_count.load(Ordering::SeqCst), 0);
    assert_eq!(
        controller.submit_state().expect("state"),
        SubmitState::Idle
    );

    controller
        .set(fields.email(), "valid@example.com".into())
        .expect("set valid email");
    let outcome = {
        let submit_count = submit_count.clone();
        block_on(controller.submit_with(move |model: ProfileForm| async move {
            assert_eq!(model.email, "valid@example.com");
            submit_count.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        }))
        .expect("submit should succeed")
    };
    assert_eq!(outcome, SubmitOutcome::Succeeded);
    assert_eq!(submit_count.load(Ordering::SeqCst), 1);
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Succeeded);
    assert_eq!(snapshot.submit_count, 2);
}

#[test]
fn failed_action_records_form_error() {
    let controller = controller_with(ValidationMode::OnSubmit);
    let outcome = block_on(
        controller.submit_with(|_model| async { Err::<(), _>("service unavailable".to_string()) }),
    )
    .expect("submit");

    assert_eq!(
        outcome,
        SubmitOutcome::Failed("service unavailable".to_string())
    );
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.submit_state, SubmitState::Failed);
    assert_eq!(snapshot.form_error.as_deref(), Some("service unavailable"));
}

#[test]
fn transition_table_matches_submission_lifecycle() {
    let mut state = FormState {
        id: FormId::next(),
        initial_model: base_form(),
        model: base_form(),
        submit_state: SubmitState::Idle,
        submit_count: 0,
        field_meta: BTreeMap::new(),
        errors: FormErrors::new(),
        form_error: None,
        ticket: SubmissionTicket::default(),
        in_flight: None,
    };

    for (from, to, allowed) in [
        (SubmitState::Idle, SubmitState::Submitting, true),
        (SubmitState::Failed, SubmitState::Submitting, true),
        (SubmitState::Submitting, SubmitState::Succeeded, true),
        (SubmitState::Submitting, SubmitState::Failed, true),
        (SubmitState::Succeeded, SubmitState::Idle, true),
        (SubmitState::Submitting, SubmitState::Idle, true),
        (SubmitState::Succeeded, SubmitState::Submitting, false),
        (SubmitState::Idle, SubmitState::Succeeded, false),
        (SubmitState::Idle, SubmitState::Failed, false),
        (SubmitState::Failed, SubmitState::Succeeded, false),
    ] {
        state.submit_state = from;
        let result = transition_submit_state(&mut state, to);
        assert_eq!(result.is_ok(), allowed, "{from:?} -> {to:?}");
        let expected = if allowed { to } else { from };
        assert_eq!(state.submit_state, expected);
    }
}

#[test]
fn reset_field_restores_initial_value_and_meta() {
    let fields = ProfileForm::fields();
    let controller = controller_with(ValidationMode::OnChange);

    controller
        .set(fields.email(), "".into())
        .expect("set invalid value");
    controller.touch(fields.email()).expect("touch");
    controller.reset_field(fields.email()).expect("reset field");

    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.model.email, "user@example.com");
    assert_eq!(
        snapshot.field_meta[&fields.email().key()],
        FieldMeta::default()
    );
    assert!(snapshot.errors.is_empty());
    assert!(snapshot.is_valid);
}

#[test]
fn first_error_follows_declaration_order() {
    let fields = ProfileForm::fields();
    let controller = controller_with(ValidationMode::OnSubmit);
    controller
        .set(fields.password(), "abc".into())
        .expect("short password");
    controller
        .set(fields.email(), "".into())
        .expect("empty email");

    let _ = block_on(controller.submit_with(|_model| async { Ok::<(), String>(()) }))
        .expect("submit");
    let snapshot = controller.snapshot().expect("snapshot");
    assert_eq!(snapshot.first_error, Some(fields.email().key()));
    assert_eq!(snapshot.error_message(fields.password().key()), Some("too short"));
}

#[test]
fn forms_get_distinct_ids() {
    let first = controller_with(ValidationMode::OnSubmit);
    let second = controller_with(ValidationMode::OnSubmit);
    assert_ne!(
        first.form_id().expect("first id"),
        second.form_id().expect("second id")
    );
    assert_eq!(
        first.form_id().expect("id"),
        first.clone().form_id().expect("clone id")
    );
}

#[test]
fn editing_a_source_field_refreshes_dependent_errors() {
    let fields = ProfileForm::fields();
    let controller = controller_with(ValidationMode::OnChange);

    controller
        .set(fields.confirm_password(), "new-pass".into())
        .expect("set confirmation");
    assert_eq!(
        controller
            .field_error(fields.confirm_password())
            .expect("confirm error")
            .map(|error| error.message),
        Some("password mismatch".into())
    );

    controller
        .set(fields.password(), "new-pass".into())
        .expect("set password");
    assert_eq!(
        controller
            .field_error(fields.confirm_password())
            .expect("confirm error"),
        None
    );
    assert!(controller.is_valid().expect("validity"));
}
