mod controller;
mod rules;
mod schema;
mod submit;

#[cfg(test)]
mod tests;

pub use controller::{
    FieldKey, FieldMeta, FormController, FormError, FormId, FormOptions, FormResult, FormSnapshot,
    SubmitState, ValidationMode,
};
pub use rules::{Email, MinLength, email, is_email, min_length};
pub use schema::{
    FieldLens, FieldRule, FormErrors, FormModel, RuleKind, RuleViolation, Schema,
    ValidationError,
};
pub use signin_card_derive::FormModel;
pub use submit::{SubmissionTicket, SubmitOutcome};
