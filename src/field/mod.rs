//! Field controllers: per-input state machines that validate their own value
//! and keep the owning form's registry entry current.

mod checkbox;
mod config;
mod controller;
mod files;
mod rating;
mod tags;
mod text;

#[cfg(test)]
mod tests;

use std::fmt::Debug;

use crate::form::FormValue;
use crate::pipeline::{Rule, first_failure};

pub use checkbox::{CheckboxField, CheckboxKind};
pub use config::{
    ConfigError, DEFAULT_INVALID_MESSAGE, DEFAULT_REQUIRED_MESSAGE, FieldConfig, slugify,
};
pub use controller::{Field, FieldSnapshot};
pub use files::{FileField, FileKind};
pub use rating::{RatingField, RatingKind};
pub use tags::{TagField, TagKind};
pub use text::{TextField, TextKind};

/// Where a field is in its validate/reveal cycle.
///
/// | from | event | to |
/// |---|---|---|
/// | any | mount, clear | `Pristine` |
/// | any | blur, valid | `ValidShown` |
/// | any | blur, invalid | `InvalidShown` |
/// | `ValidShown` | form validation, valid | `ValidShown` |
/// | other | form validation, valid | `Valid` |
/// | any | form validation, invalid | `InvalidShown` |
/// | `InvalidShown` | focus | `InvalidHidden` |
/// | `InvalidHidden`, `InvalidShown` | change, valid | `Valid` |
/// | `InvalidHidden`, `InvalidShown` | change, invalid | unchanged |
/// | `Pristine`, `Valid`, `ValidShown` | change | unchanged |
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub enum FieldStatus {
    #[default]
    Pristine,
    Valid,
    ValidShown,
    InvalidHidden,
    InvalidShown,
}

impl FieldStatus {
    pub fn is_valid(self) -> bool {
        !self.is_invalid()
    }

    pub fn is_invalid(self) -> bool {
        matches!(self, Self::InvalidHidden | Self::InvalidShown)
    }

    pub fn shows_error(self) -> bool {
        self == Self::InvalidShown
    }

    pub fn shows_success(self) -> bool {
        self == Self::ValidShown
    }

    pub(crate) fn on_focus(self) -> Self {
        match self {
            Self::InvalidShown => Self::InvalidHidden,
            other => other,
        }
    }
}

/// What triggered a validation run.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Trigger {
    /// A keystroke while the field is already invalid.
    Change,
    /// The user left the field.
    Blur,
    /// The form, usually at submit time.
    Form,
}

impl Trigger {
    pub(crate) fn settle(self, current: FieldStatus, valid: bool) -> FieldStatus {
        match (self, valid) {
            (Self::Blur, true) => FieldStatus::ValidShown,
            (Self::Form, true) if current == FieldStatus::ValidShown => current,
            (Self::Change | Self::Form, true) => FieldStatus::Valid,
            (Self::Change, false) if current.is_invalid() => current,
            (_, false) => FieldStatus::InvalidShown,
        }
    }
}

/// The value-specific half of a field controller.
///
/// `Checked` is the view rules run against; text fields check `str` while
/// holding a `String`.
pub trait FieldKind: Send + Sync + 'static {
    type Value: Clone + Debug + PartialEq + Send + Sync + 'static;
    type Checked: ?Sized;

    /// The starting value, from the configured default when there is one.
    fn initial(&self, default: Option<&str>) -> Self::Value;

    /// Empty values skip the rules: required fields report the required
    /// message, optional fields pass.
    fn is_empty(&self, value: &Self::Value) -> bool;

    fn checked<'a>(&self, value: &'a Self::Value) -> &'a Self::Checked;

    fn rules(&self) -> &[Rule<Self::Checked>];

    /// Applied to the live value after a blur that validated.
    fn format(&self, value: &Self::Value) -> Self::Value {
        value.clone()
    }

    /// The value registered with the form.
    fn to_form_value(&self, value: &Self::Value) -> FormValue;

    fn check_config(&self, _name: &str) -> Result<(), ConfigError> {
        Ok(())
    }
}

/// Runs the required check, then the rules in order. `Err` carries the
/// message to show.
pub(crate) fn evaluate<K: FieldKind>(
    kind: &K,
    config: &FieldConfig,
    value: &K::Value,
) -> Result<(), String> {
    if kind.is_empty(value) {
        return if config.required {
            Err(config.required_text().to_string())
        } else {
            Ok(())
        };
    }
    match first_failure(kind.rules(), kind.checked(value)) {
        Some(rule) => Err(rule.error().unwrap_or(config.invalid_text()).to_string()),
        None => Ok(()),
    }
}
