use std::borrow::Cow;
use std::collections::BTreeMap;
use std::sync::Arc;

use super::controller::FieldKey;

/// Typed accessor for one field of a form model.
///
/// Lenses are zero-sized and usually generated by `#[derive(FormModel)]`.
pub trait FieldLens<T>: Copy + Send + Sync + 'static {
    type Value: Clone + PartialEq + Send + Sync + 'static;

    fn key(self) -> FieldKey;
    fn get<'a>(self, model: &'a T) -> &'a Self::Value;
    fn set(self, model: &mut T, value: Self::Value);
}

pub trait FormModel: Clone + Send + Sync + 'static {
    type Fields;

    fn fields() -> Self::Fields;

    /// Declared fields in source order.
    fn field_keys() -> &'static [FieldKey];
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RuleKind {
    InvalidFormat,
    TooShort { min: usize },
}

/// A failed rule before it is attached to a field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RuleViolation {
    pub kind: RuleKind,
    pub message: Cow<'static, str>,
}

impl RuleViolation {
    pub fn new(kind: RuleKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: FieldKey,
    pub kind: RuleKind,
    pub message: Cow<'static, str>,
}

impl ValidationError {
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors keyed by field. A field missing from the map is valid.
pub type FormErrors = BTreeMap<FieldKey, ValidationError>;

pub trait FieldRule<T, L>: Send + Sync
where
    L: FieldLens<T>,
{
    fn check(&self, model: &T, value: &L::Value) -> Result<(), RuleViolation>;
}

impl<T, L, F> FieldRule<T, L> for F
where
    L: FieldLens<T>,
    F: for<'a> Fn(&'a T, &'a L::Value) -> Result<(), RuleViolation> + Send + Sync,
{
    fn check(&self, model: &T, value: &L::Value) -> Result<(), RuleViolation> {
        (self)(model, value)
    }
}

type RuleFn<T> = Arc<dyn Fn(&T) -> Result<(), RuleViolation> + Send + Sync>;

/// Declarative per-field rules for a form model.
///
/// Fields are validated in the order their first rule was added. Within a
/// field, the first failing rule wins.
pub struct Schema<T> {
    fields: Vec<(FieldKey, Vec<RuleFn<T>>)>,
}

impl<T> Clone for Schema<T> {
    fn clone(&self) -> Self {
        Self {
            fields: self.fields.clone(),
        }
    }
}

impl<T> Default for Schema<T> {
    fn default() -> Self {
        Self { fields: Vec::new() }
    }
}

impl<T> Schema<T>
where
    T: 'static,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule<L, R>(mut self, lens: L, rule: R) -> Self
    where
        L: FieldLens<T>,
        R: FieldRule<T, L> + 'static,
    {
        let key = lens.key();
        let wrapped: RuleFn<T> = Arc::new(move |model: &T| rule.check(model, lens.get(model)));
        match self.fields.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, rules)) => rules.push(wrapped),
            None => self.fields.push((key, vec![wrapped])),
        }
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = FieldKey> + '_ {
        self.fields.iter().map(|(key, _)| *key)
    }

    pub fn validate(&self, model: &T) -> FormErrors {
        self.fields
            .iter()
            .filter_map(|(key, rules)| first_violation(*key, rules, model))
            .map(|error| (error.field, error))
            .collect()
    }

    pub fn validate_field(&self, model: &T, key: FieldKey) -> Option<ValidationError> {
        self.fields
            .iter()
            .find(|(existing, _)| *existing == key)
            .and_then(|(key, rules)| first_violation(*key, rules, model))
    }
}

fn first_violation<T>(key: FieldKey, rules: &[RuleFn<T>], model: &T) -> Option<ValidationError> {
    rules.iter().find_map(|rule| {
        rule(model).err().map(|violation| ValidationError {
            field: key,
            kind: violation.kind,
            message: violation.message,
        })
    })
}
