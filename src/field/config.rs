use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_REQUIRED_MESSAGE: &str = "This field is required";
pub const DEFAULT_INVALID_MESSAGE: &str = "Please enter a valid value";

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum ConfigError {
    #[error("field needs a name, an id or a label")]
    MissingIdentity,
    #[error("invalid pattern `{pattern}`: {reason}")]
    InvalidPattern { pattern: String, reason: String },
    #[error("invalid bound for `{field}`: {reason}")]
    InvalidBound { field: String, reason: String },
}

/// Host-facing configuration shared by every field controller.
#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FieldConfig {
    pub name: Option<String>,
    pub id: Option<String>,
    pub label: Option<String>,
    pub required: bool,
    pub default_value: Option<String>,
    pub required_message: Option<String>,
    pub invalid_message: Option<String>,
    pub success_message: Option<String>,
}

impl FieldConfig {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn label(mut self, value: impl Into<String>) -> Self {
        self.label = Some(value.into());
        self
    }

    pub fn required(mut self, value: bool) -> Self {
        self.required = value;
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    pub fn required_message(mut self, value: impl Into<String>) -> Self {
        self.required_message = Some(value.into());
        self
    }

    pub fn invalid_message(mut self, value: impl Into<String>) -> Self {
        self.invalid_message = Some(value.into());
        self
    }

    pub fn success_message(mut self, value: impl Into<String>) -> Self {
        self.success_message = Some(value.into());
        self
    }

    /// The key the field registers under: `name`, else `id`, else the label
    /// slugified.
    pub fn resolve_name(&self) -> Result<String, ConfigError> {
        let explicit = [self.name.as_deref(), self.id.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .find(|value| !value.is_empty());
        if let Some(name) = explicit {
            return Ok(name.to_string());
        }
        self.label
            .as_deref()
            .map(slugify)
            .filter(|slug| !slug.is_empty())
            .ok_or(ConfigError::MissingIdentity)
    }

    pub fn required_text(&self) -> &str {
        self.required_message
            .as_deref()
            .unwrap_or(DEFAULT_REQUIRED_MESSAGE)
    }

    pub fn invalid_text(&self) -> &str {
        self.invalid_message
            .as_deref()
            .unwrap_or(DEFAULT_INVALID_MESSAGE)
    }
}

/// `"Your E-mail Address"` becomes `"your-e-mail-address"`.
pub fn slugify(label: &str) -> String {
    label
        .split(|ch: char| !ch.is_alphanumeric())
        .filter(|word| !word.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}
