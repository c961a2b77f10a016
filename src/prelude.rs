pub use crate::components::{PaginationItem, pagination_items};
pub use crate::field::{
    CheckboxField, ConfigError, Field, FieldConfig, FieldKind, FieldSnapshot, FieldStatus,
    FileField, FileKind, RatingField, RatingKind, TagField, TagKind, TextField,
};
pub use crate::form::{
    Captcha, FormController, FormData, FormError, FormOptions, FormResult, FormState, FormValue,
    FromFormData, HandlerTransport, SubmitOutcome, Transport, TransportError, TransportResponse,
};
#[cfg(feature = "http")]
pub use crate::form::HttpTransport;
pub use crate::pipeline::{
    DatePipeline, EmailPipeline, NamePipeline, NumberPipeline, Pipeline, SocialPlatform,
    TextPipeline, UrlPipeline, ValidationRule,
};
