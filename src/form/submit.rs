use std::fmt::Display;
use std::future::Future;

use super::controller::{
    FormController, FormError, FormResult, SubmitState, transition_submit_state, write_lock,
};
use super::schema::{FormErrors, FormModel};

/// Identifies one submission attempt. Resolutions carrying a stale ticket are
/// discarded.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub struct SubmissionTicket(pub u64);

impl SubmissionTicket {
    pub(super) fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SubmitOutcome<E> {
    /// The schema rejected the values; nothing was submitted.
    Invalid(FormErrors),
    Succeeded,
    Failed(E),
    /// The form was reset while the action was pending.
    Superseded,
}

enum SubmitStart<T> {
    Invalid(FormErrors),
    Started(SubmissionTicket, T),
}

impl<T> FormController<T>
where
    T: FormModel,
{
    /// Validates the whole form and, when it is clean, hands a copy of the
    /// values to `action`.
    ///
    /// No lock is held while `action` runs. A second call made before it
    /// resolves fails with [`FormError::AlreadySubmitting`], even after a
    /// `reset`. Dropping the returned future before it resolves puts the form
    /// back to `Idle`.
    pub async fn submit_with<F, Fut, E>(&self, action: F) -> FormResult<SubmitOutcome<E>>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        let (ticket, model) = match self.begin_submit()? {
            SubmitStart::Invalid(errors) => return Ok(SubmitOutcome::Invalid(errors)),
            SubmitStart::Started(ticket, model) => (ticket, model),
        };
        let in_flight = InFlight {
            controller: self,
            ticket,
            settled: false,
        };
        let result = action(model).await;
        in_flight.finish(result)
    }

    fn begin_submit(&self) -> FormResult<SubmitStart<T>> {
        let mut state = write_lock(&self.state, "preparing submit")?;
        if state.in_flight.is_some() {
            return Err(FormError::AlreadySubmitting);
        }
        match state.submit_state {
            SubmitState::Submitting => return Err(FormError::AlreadySubmitting),
            SubmitState::Succeeded => {
                return Err(FormError::InvalidStateTransition {
                    from: SubmitState::Succeeded,
                    to: SubmitState::Submitting,
                });
            }
            SubmitState::Idle | SubmitState::Failed => {}
        }
        state.submit_count = state.submit_count.saturating_add(1);
        state.errors = self.schema.validate(&state.model);
        if !state.errors.is_empty() {
            tracing::debug!(
                form = %state.id,
                invalid_fields = state.errors.len(),
                "submit blocked by validation"
            );
            return Ok(SubmitStart::Invalid(state.errors.clone()));
        }

        transition_submit_state(&mut state, SubmitState::Submitting)?;
        state.form_error = None;
        state.ticket = state.ticket.next();
        state.in_flight = Some(state.ticket);
        tracing::info!(form = %state.id, ticket = state.ticket.0, "submitting form");
        Ok(SubmitStart::Started(state.ticket, state.model.clone()))
    }

    fn finish_submit<E>(
        &self,
        ticket: SubmissionTicket,
        result: Result<(), E>,
    ) -> FormResult<SubmitOutcome<E>>
    where
        E: Display,
    {
        let mut state = write_lock(&self.state, "completing submit")?;
        if state.in_flight == Some(ticket) {
            state.in_flight = None;
        }
        if state.ticket != ticket || state.submit_state != SubmitState::Submitting {
            tracing::debug!(
                form = %state.id,
                ticket = ticket.0,
                "discarding result of superseded submission"
            );
            return Ok(SubmitOutcome::Superseded);
        }

        match result {
            Ok(()) => {
                transition_submit_state(&mut state, SubmitState::Succeeded)?;
                tracing::info!(form = %state.id, ticket = ticket.0, "submission succeeded");
                Ok(SubmitOutcome::Succeeded)
            }
            Err(error) => {
                transition_submit_state(&mut state, SubmitState::Failed)?;
                let message = error.to_string();
                tracing::warn!(form = %state.id, ticket = ticket.0, error = %message, "submission failed");
                state.form_error = Some(message);
                Ok(SubmitOutcome::Failed(error))
            }
        }
    }

    fn abandon_submit(&self, ticket: SubmissionTicket) {
        let Ok(mut state) = write_lock(&self.state, "abandoning submit") else {
            return;
        };
        if state.in_flight == Some(ticket) {
            state.in_flight = None;
        }
        if state.ticket == ticket
            && state.submit_state == SubmitState::Submitting
            && transition_submit_state(&mut state, SubmitState::Idle).is_ok()
        {
            tracing::debug!(form = %state.id, ticket = ticket.0, "submission dropped before resolving");
        }
    }
}

/// Releases the in-flight marker if the submit future is dropped mid-action.
struct InFlight<'a, T>
where
    T: FormModel,
{
    controller: &'a FormController<T>,
    ticket: SubmissionTicket,
    settled: bool,
}

impl<T> InFlight<'_, T>
where
    T: FormModel,
{
    fn finish<E>(mut self, result: Result<(), E>) -> FormResult<SubmitOutcome<E>>
    where
        E: Display,
    {
        self.settled = true;
        self.controller.finish_submit(self.ticket, result)
    }
}

impl<T> Drop for InFlight<'_, T>
where
    T: FormModel,
{
    fn drop(&mut self) {
        if !self.settled {
            self.controller.abandon_submit(self.ticket);
        }
    }
}
