use url::Url;

use super::social::SocialPlatform;
use super::{Pipeline, ValidationRule};
use crate::form::FormValue;

/// Parses user-entered web addresses, assuming `https://` when no scheme is
/// typed. Only http(s) URLs with a dotted host are accepted.
pub fn normalize_url(input: &str) -> Option<Url> {
    let trimmed = input.trim();
    if trimmed.is_empty() || trimmed.chars().any(char::is_whitespace) {
        return None;
    }
    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    };
    let url = Url::parse(&candidate).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    let host = url.host_str()?;
    let labels_ok = host
        .split('.')
        .all(|label| !label.is_empty() && !label.starts_with('-') && !label.ends_with('-'));
    (host.contains('.') && labels_ok).then_some(url)
}

#[derive(Clone, Debug)]
pub struct UrlPipeline {
    platform: Option<SocialPlatform>,
    rules: Vec<ValidationRule>,
}

impl Default for UrlPipeline {
    fn default() -> Self {
        Self {
            platform: None,
            rules: vec![valid_url_rule()],
        }
    }
}

impl UrlPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generic URL validity, then the platform's own checks in order.
    pub fn for_platform(platform: SocialPlatform) -> Self {
        let mut rules = vec![valid_url_rule()];
        rules.extend(platform.rules());
        Self {
            platform: Some(platform),
            rules,
        }
    }

    pub fn platform(&self) -> Option<SocialPlatform> {
        self.platform
    }
}

fn valid_url_rule() -> ValidationRule {
    ValidationRule::new(|value: &str| normalize_url(value).is_some())
        .with_error("Please enter a valid URL")
}

impl Pipeline for UrlPipeline {
    fn update(&self, raw: &str, _previous: &str) -> String {
        raw.chars().filter(|ch| !ch.is_whitespace()).collect()
    }

    fn format(&self, display: &str) -> String {
        normalize_url(display)
            .map(String::from)
            .unwrap_or_else(|| display.to_string())
    }

    fn parse(&self, display: &str) -> FormValue {
        match normalize_url(display) {
            Some(url) => FormValue::Text(url.into()),
            None => FormValue::text(display),
        }
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}
