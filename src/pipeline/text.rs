use regex::Regex;

use super::{Pipeline, ValidationRule};
use crate::field::ConfigError;

#[derive(Clone, Debug, Default)]
pub struct TextPipeline {
    max_length: Option<usize>,
    trim: bool,
    rules: Vec<ValidationRule>,
}

impl TextPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_length(mut self, value: usize) -> Self {
        self.rules.push(
            ValidationRule::new(move |text: &str| text.chars().count() >= value)
                .with_error(format!("Must be at least {value} characters")),
        );
        self
    }

    /// Also truncates keystrokes past the limit.
    pub fn max_length(mut self, value: usize) -> Self {
        self.max_length = Some(value);
        self.rules.push(
            ValidationRule::new(move |text: &str| text.chars().count() <= value)
                .with_error(format!("Must be at most {value} characters")),
        );
        self
    }

    pub fn pattern(mut self, pattern: &str, error: impl Into<String>) -> Result<Self, ConfigError> {
        let regex = Regex::new(pattern).map_err(|source| ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: source.to_string(),
        })?;
        self.rules.push(
            ValidationRule::new(move |text: &str| regex.is_match(text)).with_error(error),
        );
        Ok(self)
    }

    pub fn trim(mut self, value: bool) -> Self {
        self.trim = value;
        self
    }

    pub fn rule(mut self, rule: ValidationRule) -> Self {
        self.rules.push(rule);
        self
    }
}

impl Pipeline for TextPipeline {
    fn update(&self, raw: &str, _previous: &str) -> String {
        match self.max_length {
            Some(limit) => raw.chars().take(limit).collect(),
            None => raw.to_string(),
        }
    }

    fn format(&self, display: &str) -> String {
        if self.trim {
            display.trim().to_string()
        } else {
            display.to_string()
        }
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}
