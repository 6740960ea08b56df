use std::future::Future;
use std::pin::{Pin, pin};
use std::time::Duration;

use futures::future::{Either, select};
use futures_timer::Delay;

/// Failure reported by an [`AuthGateway`]. The message is shown to the user
/// as-is.
#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct AuthError {
    message: String,
}

impl AuthError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

pub type BoxedSignInFuture<'a, S> = Pin<Box<dyn Future<Output = Result<S, AuthError>> + Send + 'a>>;

/// The service that actually checks credentials.
///
/// The form calls [`AuthGateway::sign_in`] at most once per accepted submit and
/// drops the returned session after reporting success.
pub trait AuthGateway: Send + Sync + 'static {
    type Session: Send;
    type Fut<'a>: Future<Output = Result<Self::Session, AuthError>> + Send + 'a
    where
        Self: 'a;

    fn sign_in<'a>(&'a self, email: &'a str, password: &'a str) -> Self::Fut<'a>;
}

/// Receives the signal to leave the sign-in screen.
pub trait Navigator: Send + Sync + 'static {
    fn signed_in(&self);
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NoNavigation;

impl Navigator for NoNavigation {
    fn signed_in(&self) {}
}

/// Resolves to `None` when `limit` elapses first.
pub(crate) async fn with_timeout<F>(future: F, limit: Duration) -> Option<F::Output>
where
    F: Future,
{
    let future = pin!(future);
    match select(future, Delay::new(limit)).await {
        Either::Left((output, _)) => Some(output),
        Either::Right(((), _)) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::executor::block_on;
    use futures::future::{pending, ready};

    #[test]
    fn timeout_passes_through_ready_output() {
        let output = block_on(with_timeout(ready(7), Duration::from_secs(5)));
        assert_eq!(output, Some(7));
    }

    #[test]
    fn timeout_elapses_for_pending_future() {
        let output = block_on(with_timeout(pending::<()>(), Duration::from_millis(10)));
        assert_eq!(output, None);
    }

    #[test]
    fn auth_error_displays_message_verbatim() {
        let error = AuthError::new("invalid credentials");
        assert_eq!(error.to_string(), "invalid credentials");
        assert_eq!(error.message(), "invalid credentials");
    }
}
