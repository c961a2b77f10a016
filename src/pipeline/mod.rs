//! Per-input transforms layered onto a text field.
//!
//! A pipeline turns keystrokes into a display value (`update`), canonicalizes
//! it after a successful blur (`format`), converts it into the value the form
//! receives (`parse`), and supplies the ordered rules a non-empty value must
//! pass.

mod date;
mod email;
mod link;
mod name;
mod number;
mod social;
mod text;

use std::fmt::{Debug, Formatter};
use std::sync::Arc;

use crate::form::FormValue;

pub use date::{DatePipeline, parse_date};
pub use email::{EmailPipeline, is_email, parse_email};
pub use link::{UrlPipeline, normalize_url};
pub use name::{NamePipeline, parse_name};
pub use number::{NumberPipeline, group_thousands};
pub use social::{SocialPlatform, is_youtube_channel, is_youtube_video};
pub use text::TextPipeline;

type AssertFn<V> = Arc<dyn Fn(&V) -> bool + Send + Sync>;

/// One validation step. A rule without its own message reports the field's
/// generic invalid message.
pub struct Rule<V: ?Sized> {
    assert: AssertFn<V>,
    error: Option<String>,
}

pub type ValidationRule = Rule<str>;

impl<V: ?Sized> Rule<V> {
    pub fn new(assert: impl Fn(&V) -> bool + Send + Sync + 'static) -> Self {
        Self {
            assert: Arc::new(assert),
            error: None,
        }
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    pub fn check(&self, value: &V) -> bool {
        (self.assert)(value)
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }
}

impl<V: ?Sized> Clone for Rule<V> {
    fn clone(&self) -> Self {
        Self {
            assert: self.assert.clone(),
            error: self.error.clone(),
        }
    }
}

impl<V: ?Sized> Debug for Rule<V> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("error", &self.error).finish()
    }
}

pub trait Pipeline: Send + Sync + 'static {
    /// Runs on every keystroke with the raw input and the current display value.
    fn update(&self, raw: &str, _previous: &str) -> String {
        raw.to_string()
    }

    /// Runs after a blur that validated.
    fn format(&self, display: &str) -> String {
        display.to_string()
    }

    /// Runs whenever the value is registered with the form.
    fn parse(&self, display: &str) -> FormValue {
        FormValue::text(display)
    }

    fn rules(&self) -> &[ValidationRule] {
        &[]
    }
}

/// The first failing rule, in order.
pub fn first_failure<'a, V: ?Sized>(rules: &'a [Rule<V>], value: &V) -> Option<&'a Rule<V>> {
    rules.iter().find(|rule| !rule.check(value))
}
