use std::fmt::Write;

use chrono::{Datelike, Local, NaiveDate};

use super::{Pipeline, ValidationRule};
use crate::form::FormValue;

const INPUT_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%m/%d/%Y",
    "%m/%d/%y",
    "%m-%d-%Y",
    "%m.%d.%Y",
    "%B %d, %Y",
    "%b %d, %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%d %B %Y",
    "%d %b %Y",
];

const MAX_DATE_INPUT: usize = 32;

/// Reads a date typed in ISO, US numeric or month-name form.
///
/// Four digit years are tried before two digit ones, so `1/2/2024` is never
/// read as year 20.
pub fn parse_date(input: &str) -> Option<NaiveDate> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    INPUT_FORMATS
        .iter()
        .filter_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .find(|date| (1000..=9999).contains(&date.year()))
}

#[derive(Clone, Debug)]
pub struct DatePipeline {
    display_format: String,
    rules: Vec<ValidationRule>,
}

impl Default for DatePipeline {
    fn default() -> Self {
        Self {
            display_format: "%m/%d/%Y".into(),
            rules: vec![
                ValidationRule::new(|value: &str| parse_date(value).is_some())
                    .with_error("Please enter a valid date"),
            ],
        }
    }
}

impl DatePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// A chrono format string used when the value is formatted on blur.
    pub fn display_format(mut self, format: impl Into<String>) -> Self {
        self.display_format = format.into();
        self
    }

    pub fn min(mut self, bound: NaiveDate) -> Self {
        self.rules.push(
            ValidationRule::new(move |value: &str| parse_date(value).is_some_and(|date| date >= bound))
                .with_error(format!("Date must be on or after {}", bound.format("%m/%d/%Y"))),
        );
        self
    }

    pub fn max(mut self, bound: NaiveDate) -> Self {
        self.rules.push(
            ValidationRule::new(move |value: &str| parse_date(value).is_some_and(|date| date <= bound))
                .with_error(format!("Date must be on or before {}", bound.format("%m/%d/%Y"))),
        );
        self
    }

    pub fn no_future(mut self) -> Self {
        self.rules.push(
            ValidationRule::new(|value: &str| {
                parse_date(value).is_some_and(|date| date <= Local::now().date_naive())
            })
            .with_error("Date cannot be in the future"),
        );
        self
    }
}

impl Pipeline for DatePipeline {
    fn update(&self, raw: &str, _previous: &str) -> String {
        raw.chars()
            .filter(|ch| ch.is_alphanumeric() || matches!(ch, '/' | '-' | '.' | ',' | ' '))
            .take(MAX_DATE_INPUT)
            .collect()
    }

    fn format(&self, display: &str) -> String {
        let Some(date) = parse_date(display) else {
            return display.to_string();
        };
        // An unusable display pattern leaves the text as typed.
        let mut formatted = String::new();
        match write!(formatted, "{}", date.format(&self.display_format)) {
            Ok(()) => formatted,
            Err(_) => display.to_string(),
        }
    }

    fn parse(&self, display: &str) -> FormValue {
        if display.trim().is_empty() {
            return FormValue::text("");
        }
        match parse_date(display) {
            Some(date) => FormValue::Date(date),
            None => FormValue::text(display),
        }
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}
