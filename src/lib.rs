pub mod form;
#[cfg(feature = "i18n")]
mod i18n;
pub mod prelude;
pub mod sign_in;

#[cfg(test)]
mod test_public_api;

#[cfg(feature = "i18n")]
pub use crate::i18n::{I18nManager, Locale};
pub use crate::sign_in::{
    AuthError, AuthGateway, Navigator, SignInField, SignInForm, SignInMessages, SignInValues,
};
