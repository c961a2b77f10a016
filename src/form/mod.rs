mod controller;
mod extract;
mod registry;
mod transport;
mod value;

#[cfg(test)]
mod tests;

pub use controller::{
    FormBuilder, FormController, FormError, FormLink, FormOptions, FormResult, FormSnapshot,
    FormState, SubmitOutcome,
};
pub(crate) use controller::{read_lock, write_lock};
pub use extract::{FormDataError, FromFormData, FromFormValue};
pub use formsync_derive::FromFormData;
pub use registry::{FieldEntry, FormRegistry, Validatable};
#[cfg(feature = "http")]
pub use transport::HttpTransport;
pub use transport::{
    BoxedDispatchFuture, CAPTCHA_TOKEN_KEY, Captcha, HandlerTransport, HttpTarget, SubmitPayload,
    Transport, TransportError, TransportResponse,
};
pub use value::{EmailAddress, FileMeta, FormData, FormValue, PersonName};
