use crate::form::FormModel as _;
use futures::executor::block_on;

#[derive(Clone, Debug, crate::form::FormModel)]
struct ApiSmokeForm {
    title: String,
    body: String,
}

fn validate_smoke_title(
    _model: &ApiSmokeForm,
    value: &String,
) -> Result<(), crate::form::RuleViolation> {
    if value.trim().is_empty() {
        Err(crate::form::RuleViolation::new(
            crate::form::RuleKind::InvalidFormat,
            "required",
        ))
    } else {
        Ok(())
    }
}

struct AcceptAll;

impl crate::sign_in::AuthGateway for AcceptAll {
    type Session = ();
    type Fut<'a> = crate::sign_in::BoxedSignInFuture<'a, ()>;

    fn sign_in<'a>(&'a self, _email: &'a str, _password: &'a str) -> Self::Fut<'a> {
        Box::pin(async { Ok(()) })
    }
}

#[test]
fn prelude_exports_sign_in_surface() {
    use crate::prelude::*;

    let form = SignInForm::new(AcceptAll);
    form.set_field(SignInField::Email, "user@example.com")
        .expect("set email");
    form.set_field(SignInField::Password, "secret")
        .expect("set password");
    let snapshot: SignInSnapshot = form.snapshot().expect("snapshot");
    assert!(snapshot.is_valid);
    assert_eq!(snapshot.submit_state, SubmitState::Idle);
    assert_eq!(
        block_on(form.submit()).expect("submit"),
        SubmitOutcome::Succeeded
    );
    let _ = FormOptions::default();
    let _ = ValidationMode::OnSubmit;
    let _ = SignInMessages::default();
}

#[test]
fn form_public_api_smoke_compiles() {
    let fields = ApiSmokeForm::fields();
    let schema = crate::form::Schema::new()
        .rule(fields.title(), validate_smoke_title)
        .rule(fields.body(), crate::form::min_length(3, "too short"));
    let controller = crate::form::FormController::new(
        ApiSmokeForm {
            title: "draft".into(),
            body: "hello".into(),
        },
        schema,
        crate::form::FormOptions::default(),
    );

    controller
        .set(fields.title(), "".into())
        .expect("set value");
    controller.touch(fields.title()).expect("touch field");
    let _ = controller.field_error(fields.title()).expect("field error");
    let _ = controller.field_meta(fields.body()).expect("field meta");
    let _ = controller.form_id().expect("form id");
    let _ = controller.values().expect("values");
    let outcome = block_on(controller.submit_with(|_model| async { Ok::<(), String>(()) }))
        .expect("submit");
    assert!(matches!(outcome, crate::form::SubmitOutcome::Invalid(_)));
    controller.reset_field(fields.title()).expect("reset field");
    controller.reset().expect("reset");
}
