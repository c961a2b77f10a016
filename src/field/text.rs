use super::{ConfigError, Field, FieldConfig, FieldKind};
use crate::form::{FormLink, FormResult, FormValue};
use crate::pipeline::{Pipeline, ValidationRule};

/// A text input driven by a [`Pipeline`].
#[derive(Clone, Debug)]
pub struct TextKind<P> {
    pipeline: P,
}

impl<P: Pipeline> TextKind<P> {
    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }
}

impl<P: Pipeline> FieldKind for TextKind<P> {
    type Value = String;
    type Checked = str;

    fn initial(&self, default: Option<&str>) -> String {
        default.unwrap_or_default().to_string()
    }

    fn is_empty(&self, value: &String) -> bool {
        value.trim().is_empty()
    }

    fn checked<'a>(&self, value: &'a String) -> &'a str {
        value.as_str()
    }

    fn rules(&self) -> &[ValidationRule] {
        self.pipeline.rules()
    }

    fn format(&self, value: &String) -> String {
        self.pipeline.format(value)
    }

    fn to_form_value(&self, value: &String) -> FormValue {
        self.pipeline.parse(value)
    }
}

pub type TextField<P> = Field<TextKind<P>>;

impl<P: Pipeline> Field<TextKind<P>> {
    pub fn new(config: FieldConfig, pipeline: P, form: FormLink) -> Result<Self, ConfigError> {
        Self::with_kind(config, TextKind { pipeline }, form)
    }

    /// Feeds a keystroke through the pipeline's updater.
    pub fn on_change(&self, raw: &str) -> FormResult<()> {
        let previous = self.value()?;
        let next = self.kind().pipeline.update(raw, &previous);
        self.change(next)
    }
}
