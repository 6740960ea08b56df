//! The email/password sign-in form.
//!
//! [`SignInForm`] wires the sign-in schema to a [`FormController`] and an
//! [`AuthGateway`]. Renderers read [`SignInForm::snapshot`] and forward input
//! events to [`SignInForm::set_field`], [`SignInForm::touch`],
//! [`SignInForm::submit`] and [`SignInForm::reset`].

mod gateway;
mod schema;


use std::borrow::Cow;
use std::sync::Arc;

use crate::form::{
    FieldKey, FieldLens, FormController, FormErrors, FormModel as _, FormOptions, FormResult,
    FormSnapshot, SubmitOutcome, SubmitState,
};

pub use gateway::{AuthError, AuthGateway, BoxedSignInFuture, NoNavigation, Navigator};
pub use schema::{MIN_PASSWORD_LENGTH, SignInMessages, sign_in_schema, validate};

#[derive(Clone, Debug, Default, Eq, PartialEq, crate::form::FormModel)]
pub struct SignInValues {
    pub email: String,
    pub password: String,
}

impl SignInValues {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }

    /// Builds values from `(name, value)` pairs. Unknown names are ignored and
    /// missing fields stay empty.
    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let mut values = Self::default();
        for (name, value) in pairs {
            match SignInField::from_name(name) {
                Some(SignInField::Email) => values.email = value.to_string(),
                Some(SignInField::Password) => values.password = value.to_string(),
                None => {}
            }
        }
        values
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum SignInField {
    Email,
    Password,
}

impl SignInField {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "email" => Some(Self::Email),
            "password" => Some(Self::Password),
            _ => None,
        }
    }

    pub fn key(self) -> FieldKey {
        let fields = SignInValues::fields();
        match self {
            Self::Email => fields.email().key(),
            Self::Password => fields.password().key(),
        }
    }
}

pub type SignInSnapshot = FormSnapshot<SignInValues>;

pub struct SignInForm<G, N = NoNavigation> {
    controller: FormController<SignInValues>,
    gateway: Arc<G>,
    navigator: Arc<N>,
    messages: Arc<SignInMessages>,
}

impl<G, N> Clone for SignInForm<G, N> {
    fn clone(&self) -> Self {
        Self {
            controller: self.controller.clone(),
            gateway: self.gateway.clone(),
            navigator: self.navigator.clone(),
            messages: self.messages.clone(),
        }
    }
}

impl<G> SignInForm<G>
where
    G: AuthGateway,
{
    pub fn new(gateway: G) -> Self {
        Self::with_navigator(gateway, NoNavigation)
    }
}

impl<G, N> SignInForm<G, N>
where
    G: AuthGateway,
    N: Navigator,
{
    pub fn with_navigator(gateway: G, navigator: N) -> Self {
        Self::with_config(
            gateway,
            navigator,
            FormOptions::default(),
            SignInMessages::default(),
        )
    }

    pub fn with_config(
        gateway: G,
        navigator: N,
        options: FormOptions,
        messages: SignInMessages,
    ) -> Self {
        let controller =
            FormController::new(SignInValues::default(), sign_in_schema(&messages), options);
        Self {
            controller,
            gateway: Arc::new(gateway),
            navigator: Arc::new(navigator),
            messages: Arc::new(messages),
        }
    }

    pub fn controller(&self) -> &FormController<SignInValues> {
        &self.controller
    }

    pub fn messages(&self) -> &SignInMessages {
        &self.messages
    }

    /// Ignored while a submission is in flight.
    pub fn set_field(&self, field: SignInField, value: impl Into<String>) -> FormResult<()> {
        let fields = SignInValues::fields();
        let value = value.into();
        match field {
            SignInField::Email => self.controller.set(fields.email(), value),
            SignInField::Password => self.controller.set(fields.password(), value),
        }
    }

    pub fn touch(&self, field: SignInField) -> FormResult<()> {
        let fields = SignInValues::fields();
        match field {
            SignInField::Email => self.controller.touch(fields.email()),
            SignInField::Password => self.controller.touch(fields.password()),
        }
    }

    /// Validates and, if the values are clean, calls the gateway once.
    ///
    /// Invalid values leave the submission state untouched and come back as
    /// [`SubmitOutcome::Invalid`]. On success the navigator is signalled.
    pub async fn submit(&self) -> FormResult<SubmitOutcome<AuthError>> {
        let auth = self.gateway.clone();
        let timeout = self.controller.options().submit_timeout;
        let timed_out = self.messages.timed_out.clone();

        let outcome = self
            .controller
            .submit_with(move |values: SignInValues| async move {
                let attempt = auth.sign_in(&values.email, &values.password);
                let result = match timeout {
                    Some(limit) => gateway::with_timeout(attempt, limit)
                        .await
                        .unwrap_or_else(|| Err(AuthError::new(timed_out))),
                    None => attempt.await,
                };
                result.map(|_session| ())
            })
            .await?;

        if matches!(outcome, SubmitOutcome::Succeeded) {
            self.navigator.signed_in();
        }
        Ok(outcome)
    }

    pub fn reset(&self) -> FormResult<()> {
        self.controller.reset()
    }

    pub fn values(&self) -> FormResult<SignInValues> {
        self.controller.values()
    }

    pub fn errors(&self) -> FormResult<FormErrors> {
        self.controller.errors()
    }

    pub fn field_error(&self, field: SignInField) -> FormResult<Option<String>> {
        Ok(self
            .controller
            .errors()?
            .remove(&field.key())
            .map(|error| error.message.into_owned()))
    }

    pub fn submission_state(&self) -> FormResult<SubmitState> {
        self.controller.submit_state()
    }

    pub fn form_error(&self) -> FormResult<Option<String>> {
        self.controller.form_error()
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(self.submission_state()?.is_submitting())
    }

    pub fn submit_label(&self) -> FormResult<Cow<'static, str>> {
        Ok(if self.is_submitting()? {
            self.messages.submitting_label.clone()
        } else {
            self.messages.submit_label.clone()
        })
    }

    pub fn snapshot(&self) -> FormResult<SignInSnapshot> {
        self.controller.snapshot()
    }
}
