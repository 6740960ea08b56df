use std::borrow::Cow;
use std::sync::LazyLock;

use crate::form::{FormErrors, FormModel as _, Schema, email, min_length};

use super::SignInValues;

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// User-facing strings of the sign-in form. `Default` is English.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SignInMessages {
    pub invalid_email: Cow<'static, str>,
    pub password_too_short: Cow<'static, str>,
    pub timed_out: Cow<'static, str>,
    pub submit_label: Cow<'static, str>,
    pub submitting_label: Cow<'static, str>,
}

impl Default for SignInMessages {
    fn default() -> Self {
        Self {
            invalid_email: "Please enter a valid email address".into(),
            password_too_short: "Password must be at least 6 characters".into(),
            timed_out: "Sign-in timed out, please try again".into(),
            submit_label: "Login".into(),
            submitting_label: "Signing in...".into(),
        }
    }
}

#[cfg(feature = "i18n")]
impl SignInMessages {
    pub fn localized(i18n: &crate::I18nManager) -> Self {
        let min = MIN_PASSWORD_LENGTH.to_string();
        Self {
            invalid_email: i18n.t("sign_in.email.invalid").into(),
            password_too_short: i18n
                .t_with("sign_in.password.too_short", &[("min", min.as_str())])
                .into(),
            timed_out: i18n.t("sign_in.submit.timed_out").into(),
            submit_label: i18n.t("sign_in.submit.label").into(),
            submitting_label: i18n.t("sign_in.submit.pending").into(),
        }
    }
}

pub fn sign_in_schema(messages: &SignInMessages) -> Schema<SignInValues> {
    let fields = SignInValues::fields();
    Schema::new()
        .rule(fields.email(), email(messages.invalid_email.clone()))
        .rule(
            fields.password(),
            min_length(MIN_PASSWORD_LENGTH, messages.password_too_short.clone()),
        )
}

static DEFAULT_SCHEMA: LazyLock<Schema<SignInValues>> =
    LazyLock::new(|| sign_in_schema(&SignInMessages::default()));

/// Validates with the default English messages.
pub fn validate(values: &SignInValues) -> FormErrors {
    DEFAULT_SCHEMA.validate(values)
}
