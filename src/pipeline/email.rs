use std::sync::LazyLock;

use regex::Regex;

use super::{Pipeline, ValidationRule};
use crate::form::{EmailAddress, FormValue};

static EMAIL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^[A-Za-z0-9!#$%&'*+/=?^_`{|}~.-]+@[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*\.[A-Za-z]{2,}$",
    )
    .expect("email pattern is valid")
});

pub fn is_email(value: &str) -> bool {
    let value = value.trim();
    if !EMAIL_PATTERN.is_match(value) {
        return false;
    }
    let Some((local, _)) = value.rsplit_once('@') else {
        return false;
    };
    local.len() <= 64 && !local.starts_with('.') && !local.ends_with('.') && !local.contains("..")
}

/// Lowercases and splits an address. `None` for anything that is not one.
pub fn parse_email(value: &str) -> Option<EmailAddress> {
    let normalized = value.trim().to_lowercase();
    if !is_email(&normalized) {
        return None;
    }
    let (local, domain) = normalized.rsplit_once('@')?;
    Some(EmailAddress {
        local: local.to_string(),
        domain: domain.to_string(),
        full: normalized.clone(),
    })
}

#[derive(Clone, Debug)]
pub struct EmailPipeline {
    rules: Vec<ValidationRule>,
}

impl Default for EmailPipeline {
    fn default() -> Self {
        Self {
            rules: vec![
                ValidationRule::new(is_email).with_error("Please enter a valid email address"),
            ],
        }
    }
}

impl EmailPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept addresses at one of these domains.
    pub fn allowed_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let domains: Vec<String> = domains
            .into_iter()
            .map(|domain| domain.into().to_lowercase())
            .collect();
        let message = format!("Please use an address at {}", domains.join(", "));
        self.rules.push(
            ValidationRule::new(move |value: &str| {
                parse_email(value).is_some_and(|email| domains.contains(&email.domain))
            })
            .with_error(message),
        );
        self
    }
}

impl Pipeline for EmailPipeline {
    fn update(&self, raw: &str, _previous: &str) -> String {
        raw.chars().filter(|ch| !ch.is_whitespace()).collect()
    }

    fn format(&self, display: &str) -> String {
        display.trim().to_lowercase()
    }

    /// Falls back to the raw text when the address does not parse.
    fn parse(&self, display: &str) -> FormValue {
        match parse_email(display) {
            Some(email) => FormValue::Email(email),
            None => FormValue::text(display),
        }
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}
