use super::{ConfigError, Field, FieldConfig, FieldKind};
use crate::form::{FormLink, FormResult, FormValue};
use crate::pipeline::Rule;

/// A single checkbox. Required means it must be checked.
#[derive(Clone, Debug, Default)]
pub struct CheckboxKind {
    rules: Vec<Rule<bool>>,
}

impl CheckboxKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rule(mut self, rule: Rule<bool>) -> Self {
        self.rules.push(rule);
        self
    }
}

impl FieldKind for CheckboxKind {
    type Value = bool;
    type Checked = bool;

    /// `"true"`, `"on"` and `"checked"` start the box checked.
    fn initial(&self, default: Option<&str>) -> bool {
        default.is_some_and(|value| {
            matches!(
                value.trim().to_ascii_lowercase().as_str(),
                "true" | "on" | "checked"
            )
        })
    }

    fn is_empty(&self, value: &bool) -> bool {
        !*value
    }

    fn checked<'a>(&self, value: &'a bool) -> &'a bool {
        value
    }

    fn rules(&self) -> &[Rule<bool>] {
        &self.rules
    }

    fn to_form_value(&self, value: &bool) -> FormValue {
        FormValue::Bool(*value)
    }
}

pub type CheckboxField = Field<CheckboxKind>;

impl Field<CheckboxKind> {
    pub fn new(config: FieldConfig, form: FormLink) -> Result<Self, ConfigError> {
        Self::with_kind(config, CheckboxKind::new(), form)
    }

    pub fn set_checked(&self, checked: bool) -> FormResult<bool> {
        self.commit(checked)
    }

    pub fn toggle(&self) -> FormResult<bool> {
        let checked = self.value()?;
        self.commit(!checked)
    }
}
