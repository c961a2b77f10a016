use std::str::FromStr;

use rust_decimal::Decimal;

use super::{Pipeline, ValidationRule};
use crate::form::FormValue;

/// Number and dollar inputs.
///
/// Only digits and one decimal point survive a keystroke. `max_decimals`
/// truncates while typing, `decimals` truncates when the value is formatted.
/// Truncation never rounds.
#[derive(Clone, Debug)]
pub struct NumberPipeline {
    decimals: Option<u32>,
    max_decimals: Option<u32>,
    grouping: bool,
    rules: Vec<ValidationRule>,
}

impl Default for NumberPipeline {
    fn default() -> Self {
        Self {
            decimals: None,
            max_decimals: None,
            grouping: true,
            rules: vec![
                ValidationRule::new(|display: &str| !numeric_text(display).is_empty())
                    .with_error("Please enter a valid number"),
            ],
        }
    }
}

impl NumberPipeline {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn dollar() -> Self {
        Self::default().decimals(2).max_decimals(2)
    }

    pub fn decimals(mut self, value: u32) -> Self {
        self.decimals = Some(value);
        self
    }

    pub fn max_decimals(mut self, value: u32) -> Self {
        self.max_decimals = Some(value);
        self
    }

    pub fn grouping(mut self, value: bool) -> Self {
        self.grouping = value;
        self
    }

    pub fn min(mut self, bound: Decimal) -> Self {
        self.rules.push(
            ValidationRule::new(move |display: &str| {
                decimal_of(display).is_some_and(|value| value >= bound)
            })
            .with_error(format!("Must be at least {bound}")),
        );
        self
    }

    pub fn max(mut self, bound: Decimal) -> Self {
        self.rules.push(
            ValidationRule::new(move |display: &str| {
                decimal_of(display).is_some_and(|value| value <= bound)
            })
            .with_error(format!("Must be at most {bound}")),
        );
        self
    }

    fn assemble(&self, integer: &str, fraction: Option<&str>) -> String {
        let integer = if self.grouping {
            group_thousands(integer)
        } else {
            integer.to_string()
        };
        match fraction {
            Some(fraction) => format!("{integer}.{fraction}"),
            None => integer,
        }
    }
}

impl Pipeline for NumberPipeline {
    fn update(&self, raw: &str, previous: &str) -> String {
        if raw.matches('.').count() > 1 {
            return previous.to_string();
        }
        let Some((integer, fraction)) = split_number(raw) else {
            return String::new();
        };
        let fraction = fraction.and_then(|fraction| truncate(fraction, self.max_decimals));
        self.assemble(&integer, fraction.as_deref())
    }

    fn format(&self, display: &str) -> String {
        let Some((integer, fraction)) = split_number(display) else {
            return String::new();
        };
        let fraction = fraction
            .and_then(|fraction| truncate(fraction, self.decimals))
            .filter(|fraction| !fraction.is_empty());
        self.assemble(&integer, fraction.as_deref())
    }

    fn parse(&self, display: &str) -> FormValue {
        FormValue::Text(numeric_text(display))
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}

/// Inserts `,` every three digits from the right.
pub fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (index, ch) in digits.chars().enumerate() {
        if index > 0 && (len - index) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// Digits-only form of a display value: separators stripped, a trailing
/// decimal point dropped, empty when nothing numeric is left.
fn numeric_text(display: &str) -> String {
    if display.matches('.').count() > 1 || !display.chars().any(|ch| ch.is_ascii_digit()) {
        return String::new();
    }
    match split_number(display) {
        Some((integer, Some(fraction))) if !fraction.is_empty() => format!("{integer}.{fraction}"),
        Some((integer, _)) => integer,
        None => String::new(),
    }
}

fn decimal_of(display: &str) -> Option<Decimal> {
    Decimal::from_str(&numeric_text(display)).ok()
}

/// Splits the digits of `input` around its first decimal point. Leading
/// zeros collapse to one. `None` when no digit and no point is present.
fn split_number(input: &str) -> Option<(String, Option<String>)> {
    let kept: String = input
        .chars()
        .filter(|ch| ch.is_ascii_digit() || *ch == '.')
        .collect();
    if kept.is_empty() || (!kept.chars().any(|ch| ch.is_ascii_digit()) && kept != ".") {
        return None;
    }

    let (integer, fraction) = match kept.split_once('.') {
        Some((integer, fraction)) => (integer, Some(fraction.replace('.', ""))),
        None => (kept.as_str(), None),
    };
    let trimmed = integer.trim_start_matches('0');
    let integer = if trimmed.is_empty() && (!integer.is_empty() || fraction.is_some()) {
        "0".to_string()
    } else {
        trimmed.to_string()
    };
    Some((integer, fraction))
}

fn truncate(fraction: String, places: Option<u32>) -> Option<String> {
    match places {
        Some(0) => None,
        Some(places) => Some(fraction.chars().take(places as usize).collect()),
        None => Some(fraction),
    }
}
