pub use crate::form::{
    FieldKey, FieldLens, FormController, FormError, FormErrors, FormModel, FormOptions,
    FormResult, FormSnapshot, Schema, SubmitOutcome, SubmitState, ValidationError,
    ValidationMode,
};
pub use crate::sign_in::{
    AuthError, AuthGateway, BoxedSignInFuture, NoNavigation, Navigator, SignInField, SignInForm,
    SignInMessages, SignInSnapshot, SignInValues,
};

#[cfg(feature = "i18n")]
pub use crate::{I18nManager, Locale};
