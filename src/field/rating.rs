use super::{ConfigError, Field, FieldConfig, FieldKind};
use crate::form::{FormLink, FormResult, FormValue};
use crate::pipeline::Rule;

/// A star rating. Zero means "not rated", so required means at least one
/// step was chosen.
#[derive(Clone, Debug)]
pub struct RatingKind {
    max: u8,
    half_steps: bool,
    rules: Vec<Rule<f64>>,
}

impl Default for RatingKind {
    fn default() -> Self {
        Self {
            max: 5,
            half_steps: false,
            rules: Vec::new(),
        }
    }
}

impl RatingKind {
    pub fn new(max: u8) -> Self {
        Self {
            max,
            ..Self::default()
        }
    }

    pub fn half_steps(mut self, value: bool) -> Self {
        self.half_steps = value;
        self
    }

    pub fn rule(mut self, rule: Rule<f64>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn max(&self) -> u8 {
        self.max
    }

    /// Clamps into `0..=max` and snaps to the nearest whole or half star.
    pub fn snap(&self, value: f64) -> f64 {
        if !value.is_finite() {
            return 0.0;
        }
        let clamped = value.clamp(0.0, f64::from(self.max));
        if self.half_steps {
            (clamped * 2.0).round() / 2.0
        } else {
            clamped.round()
        }
    }
}

impl FieldKind for RatingKind {
    type Value = f64;
    type Checked = f64;

    fn initial(&self, default: Option<&str>) -> f64 {
        default
            .and_then(|value| value.trim().parse::<f64>().ok())
            .map(|value| self.snap(value))
            .unwrap_or(0.0)
    }

    fn is_empty(&self, value: &f64) -> bool {
        *value <= 0.0
    }

    fn checked<'a>(&self, value: &'a f64) -> &'a f64 {
        value
    }

    fn rules(&self) -> &[Rule<f64>] {
        &self.rules
    }

    fn to_form_value(&self, value: &f64) -> FormValue {
        FormValue::Number(*value)
    }

    fn check_config(&self, name: &str) -> Result<(), ConfigError> {
        if self.max == 0 {
            return Err(ConfigError::InvalidBound {
                field: name.to_string(),
                reason: "a rating needs at least one star".into(),
            });
        }
        Ok(())
    }
}

pub type RatingField = Field<RatingKind>;

impl Field<RatingKind> {
    pub fn new(config: FieldConfig, kind: RatingKind, form: FormLink) -> Result<Self, ConfigError> {
        Self::with_kind(config, kind, form)
    }

    /// Returns whether the snapped rating validated.
    pub fn set_rating(&self, value: f64) -> FormResult<bool> {
        let snapped = self.kind().snap(value);
        self.commit(snapped)
    }
}
