use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::schema::{FieldLens, FieldRule, RuleKind, RuleViolation};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9_'+\-.]*[A-Za-z0-9_+\-]@(?:[A-Za-z0-9][A-Za-z0-9\-]*\.)+[A-Za-z]{2,}$")
        .expect("valid regex literal")
});

/// Accepts `local@domain.tld`. The local part may not start with a dot and no
/// part of the address may contain `..`.
pub fn is_email(value: &str) -> bool {
    if value.starts_with('.') || value.contains("..") {
        return false;
    }
    EMAIL_PATTERN.is_match(value)
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Email {
    message: Cow<'static, str>,
}

pub fn email(message: impl Into<Cow<'static, str>>) -> Email {
    Email {
        message: message.into(),
    }
}

impl<T, L> FieldRule<T, L> for Email
where
    L: FieldLens<T>,
    L::Value: AsRef<str>,
{
    fn check(&self, _model: &T, value: &L::Value) -> Result<(), RuleViolation> {
        if is_email(value.as_ref()) {
            Ok(())
        } else {
            Err(RuleViolation::new(
                RuleKind::InvalidFormat,
                self.message.clone(),
            ))
        }
    }
}

/// Minimum length in characters, not bytes.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct MinLength {
    min: usize,
    message: Cow<'static, str>,
}

pub fn min_length(min: usize, message: impl Into<Cow<'static, str>>) -> MinLength {
    MinLength {
        min,
        message: message.into(),
    }
}

impl<T, L> FieldRule<T, L> for MinLength
where
    L: FieldLens<T>,
    L::Value: AsRef<str>,
{
    fn check(&self, _model: &T, value: &L::Value) -> Result<(), RuleViolation> {
        if value.as_ref().chars().count() >= self.min {
            Ok(())
        } else {
            Err(RuleViolation::new(
                RuleKind::TooShort { min: self.min },
                self.message.clone(),
            ))
        }
    }
}
