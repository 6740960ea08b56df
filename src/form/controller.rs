use std::collections::BTreeMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use super::schema::{FieldLens, FormErrors, FormModel, Schema, ValidationError};
use super::submit::SubmissionTicket;

static FORM_ID_ALLOCATOR: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FormId(pub u64);

impl FormId {
    pub fn next() -> Self {
        Self(FORM_ID_ALLOCATOR.fetch_add(1, Ordering::SeqCst))
    }
}

impl Display for FormId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "form-{}", self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct FieldKey(&'static str);

impl FieldKey {
    pub const fn new(value: &'static str) -> Self {
        Self(value)
    }

    pub const fn as_str(self) -> &'static str {
        self.0
    }
}

impl Display for FieldKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0)
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SubmitState {
    Idle,
    Submitting,
    Succeeded,
    Failed,
}

impl SubmitState {
    pub fn is_submitting(self) -> bool {
        self == SubmitState::Submitting
    }
}

/// When a field's errors start being surfaced. After the first submit every
/// field is surfaced regardless of mode.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ValidationMode {
    OnChange,
    OnBlur,
    OnSubmit,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct FormOptions {
    pub validate_mode: ValidationMode,
    pub submit_timeout: Option<Duration>,
}

impl Default for FormOptions {
    fn default() -> Self {
        Self {
            validate_mode: ValidationMode::OnSubmit,
            submit_timeout: None,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct FieldMeta {
    pub dirty: bool,
    pub touched: bool,
    pub validated: bool,
}

#[derive(Clone, Debug)]
pub struct FormSnapshot<T> {
    pub model: T,
    pub submit_state: SubmitState,
    pub submit_count: u32,
    pub is_dirty: bool,
    pub is_valid: bool,
    pub errors: FormErrors,
    pub first_error: Option<FieldKey>,
    pub form_error: Option<String>,
    pub field_meta: BTreeMap<FieldKey, FieldMeta>,
}

impl<T> FormSnapshot<T> {
    pub fn is_submitting(&self) -> bool {
        self.submit_state.is_submitting()
    }

    pub fn error_message(&self, key: FieldKey) -> Option<&str> {
        self.errors.get(&key).map(ValidationError::message)
    }
}

#[derive(Debug, Clone, Eq, PartialEq, thiserror::Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid submit state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: SubmitState, to: SubmitState },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
}

pub type FormResult<T> = Result<T, FormError>;

pub(super) struct FormState<T> {
    pub(super) id: FormId,
    pub(super) initial_model: T,
    pub(super) model: T,
    pub(super) submit_state: SubmitState,
    pub(super) submit_count: u32,
    pub(super) field_meta: BTreeMap<FieldKey, FieldMeta>,
    /// Full schema result for `model`, surfaced or not.
    pub(super) errors: FormErrors,
    pub(super) form_error: Option<String>,
    pub(super) ticket: SubmissionTicket,
    /// Set while an action is running. Survives `reset`; only the submission
    /// that set it clears it.
    pub(super) in_flight: Option<SubmissionTicket>,
}

impl<T> FormState<T> {
    pub(super) fn ensure_meta(&mut self, key: FieldKey) -> &mut FieldMeta {
        self.field_meta.entry(key).or_default()
    }

    fn is_surfaced(&self, key: FieldKey) -> bool {
        self.submit_count > 0 || self.field_meta.get(&key).is_some_and(|meta| meta.validated)
    }

    pub(super) fn surfaced_errors(&self) -> FormErrors {
        self.errors
            .iter()
            .filter(|(key, _)| self.is_surfaced(**key))
            .map(|(key, error)| (*key, error.clone()))
            .collect()
    }
}

/// Shared handle to one form session.
///
/// Clones share state, so a renderer can keep reading snapshots while another
/// clone awaits a submission.
pub struct FormController<T>
where
    T: FormModel,
{
    pub(super) options: FormOptions,
    pub(super) schema: Arc<Schema<T>>,
    pub(super) state: Arc<RwLock<FormState<T>>>,
}

impl<T> Clone for FormController<T>
where
    T: FormModel,
{
    fn clone(&self) -> Self {
        Self {
            options: self.options,
            schema: self.schema.clone(),
            state: self.state.clone(),
        }
    }
}

impl<T> FormController<T>
where
    T: FormModel,
{
    pub fn new(initial: T, schema: Schema<T>, options: FormOptions) -> Self {
        let errors = schema.validate(&initial);
        let field_meta = T::field_keys()
            .iter()
            .map(|key| (*key, FieldMeta::default()))
            .collect();
        Self {
            options,
            schema: Arc::new(schema),
            state: Arc::new(RwLock::new(FormState {
                id: FormId::next(),
                initial_model: initial.clone(),
                model: initial,
                submit_state: SubmitState::Idle,
                submit_count: 0,
                field_meta,
                errors,
                form_error: None,
                ticket: SubmissionTicket::default(),
                in_flight: None,
            })),
        }
    }

    pub fn options(&self) -> FormOptions {
        self.options
    }

    pub fn schema(&self) -> &Schema<T> {
        &self.schema
    }

    pub fn form_id(&self) -> FormResult<FormId> {
        Ok(read_lock(&self.state, "reading form id")?.id)
    }

    /// Writes one field and re-derives the form's errors. Edits are dropped
    /// while a submission is in flight.
    pub fn set<L>(&self, lens: L, value: L::Value) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "writing form model")?;
        if state.submit_state == SubmitState::Submitting {
            tracing::debug!(form = %state.id, field = %key, "ignoring edit while submitting");
            return Ok(());
        }

        lens.set(&mut state.model, value);
        let is_dirty = lens.get(&state.model) != lens.get(&state.initial_model);
        let validate_on_change = self.options.validate_mode == ValidationMode::OnChange;
        let meta = state.ensure_meta(key);
        meta.dirty = is_dirty;
        meta.validated |= validate_on_change;

        self.refresh_errors(&mut state);
        if state.submit_state == SubmitState::Succeeded {
            transition_submit_state(&mut state, SubmitState::Idle)?;
        }
        Ok(())
    }

    pub fn touch<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let validate_on_blur = self.options.validate_mode == ValidationMode::OnBlur;
        let mut state = write_lock(&self.state, "touching field")?;
        let meta = state.ensure_meta(lens.key());
        meta.touched = true;
        meta.validated |= validate_on_blur;
        Ok(())
    }

    /// Restores the initial model and hides every error. Any submission still
    /// in flight is superseded: its result will be discarded, and new submits
    /// are refused until it resolves.
    pub fn reset(&self) -> FormResult<()> {
        let mut state = write_lock(&self.state, "resetting form")?;
        state.model = state.initial_model.clone();
        state.errors = self.schema.validate(&state.model);
        state.submit_state = SubmitState::Idle;
        state.submit_count = 0;
        state.form_error = None;
        state.ticket = state.ticket.next();
        for meta in state.field_meta.values_mut() {
            *meta = FieldMeta::default();
        }
        tracing::debug!(form = %state.id, "form reset");
        Ok(())
    }

    pub fn reset_field<L>(&self, lens: L) -> FormResult<()>
    where
        L: FieldLens<T>,
    {
        let key = lens.key();
        let mut state = write_lock(&self.state, "resetting field")?;
        if state.submit_state == SubmitState::Submitting {
            tracing::debug!(form = %state.id, field = %key, "ignoring field reset while submitting");
            return Ok(());
        }
        let initial_value = lens.get(&state.initial_model).clone();
        lens.set(&mut state.model, initial_value);
        *state.ensure_meta(key) = FieldMeta::default();
        self.refresh_errors(&mut state);
        Ok(())
    }

    pub fn values(&self) -> FormResult<T> {
        Ok(read_lock(&self.state, "reading form values")?.model.clone())
    }

    /// Errors currently surfaced to the user.
    pub fn errors(&self) -> FormResult<FormErrors> {
        Ok(read_lock(&self.state, "reading surfaced errors")?.surfaced_errors())
    }

    pub fn field_error<L>(&self, lens: L) -> FormResult<Option<ValidationError>>
    where
        L: FieldLens<T>,
    {
        Ok(read_lock(&self.state, "reading field error")?
            .surfaced_errors()
            .remove(&lens.key()))
    }

    pub fn field_meta<L>(&self, lens: L) -> FormResult<Option<FieldMeta>>
    where
        L: FieldLens<T>,
    {
        Ok(read_lock(&self.state, "reading field meta")?
            .field_meta
            .get(&lens.key())
            .copied())
    }

    pub fn submit_state(&self) -> FormResult<SubmitState> {
        Ok(read_lock(&self.state, "reading submit state")?.submit_state)
    }

    pub fn form_error(&self) -> FormResult<Option<String>> {
        Ok(read_lock(&self.state, "reading form error")?.form_error.clone())
    }

    /// Whether the schema accepts the current values, surfaced or not.
    pub fn is_valid(&self) -> FormResult<bool> {
        Ok(read_lock(&self.state, "reading validity")?.errors.is_empty())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot<T>> {
        let state = read_lock(&self.state, "creating form snapshot")?;
        let errors = state.surfaced_errors();
        let first_error = T::field_keys()
            .iter()
            .copied()
            .find(|key| errors.contains_key(key))
            .or_else(|| errors.keys().next().copied());
        Ok(FormSnapshot {
            model: state.model.clone(),
            submit_state: state.submit_state,
            submit_count: state.submit_count,
            is_dirty: state.field_meta.values().any(|meta| meta.dirty),
            is_valid: state.errors.is_empty(),
            errors,
            first_error,
            form_error: state.form_error.clone(),
            field_meta: state.field_meta.clone(),
        })
    }

    fn refresh_errors(&self, state: &mut FormState<T>) {
        state.errors = self.schema.validate(&state.model);
    }
}

pub(super) fn transition_submit_state<T>(
    state: &mut FormState<T>,
    next: SubmitState,
) -> FormResult<()> {
    let current = state.submit_state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (SubmitState::Idle, SubmitState::Submitting)
            | (SubmitState::Failed, SubmitState::Submitting)
            | (SubmitState::Submitting, SubmitState::Succeeded)
            | (SubmitState::Submitting, SubmitState::Failed)
            | (_, SubmitState::Idle)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    state.submit_state = next;
    Ok(())
}

pub(super) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(super) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
