use std::sync::LazyLock;

use regex::Regex;

use super::email::is_email;
use super::{Pipeline, ValidationRule};
use crate::form::{FormValue, PersonName};

static NAME_CHARACTERS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^[\p{L}\p{M}\s.,'’"“”()\-]+$"#).expect("name pattern is valid")
});
static NICKNAME: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"["“]([^"“”]+)["”]|\(([^)]+)\)"#).expect("nickname pattern is valid")
});

const TITLES: &[&str] = &[
    "mr", "mrs", "ms", "miss", "mx", "dr", "prof", "rev", "sir", "dame", "hon", "capt", "lt",
    "col", "gen", "sgt", "fr",
];
const SUFFIXES: &[&str] = &[
    "jr", "sr", "ii", "iii", "iv", "phd", "md", "esq", "dds", "cpa", "mba",
];
const PARTICLES: &[&str] = &[
    "van", "von", "de", "da", "del", "della", "di", "du", "la", "le", "st", "bin", "ibn", "dos",
    "das", "ter",
];

fn bare(token: &str) -> String {
    token.trim_matches('.').replace('.', "").to_lowercase()
}

fn is_title(token: &str) -> bool {
    TITLES.contains(&bare(token).as_str())
}

fn is_suffix(token: &str) -> bool {
    SUFFIXES.contains(&bare(token).as_str())
}

fn is_particle(token: &str) -> bool {
    PARTICLES.contains(&bare(token).as_str())
}

fn collapse_whitespace(input: &str) -> String {
    input.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a personal name into its parts.
///
/// Understands leading titles, trailing suffixes, a nickname in quotes or
/// parentheses, `Last, First` order, and surname particles such as `van`.
/// `None` when no given or family name is left after that.
pub fn parse_name(input: &str) -> Option<PersonName> {
    let full = collapse_whitespace(input);
    if full.is_empty() {
        return None;
    }

    let mut nick = String::new();
    let mut rest = full.clone();
    if let Some(captures) = NICKNAME.captures(&full) {
        if let Some(found) = captures.get(1).or_else(|| captures.get(2)) {
            nick = found.as_str().trim().to_string();
        }
        if let Some(whole) = captures.get(0) {
            rest.replace_range(whole.range(), " ");
        }
    }

    let mut parts: Vec<String> = rest
        .split(',')
        .map(collapse_whitespace)
        .filter(|part| !part.is_empty())
        .collect();
    if parts.is_empty() || parts.len() > 3 {
        return None;
    }

    let mut suffixes = Vec::new();
    while parts.len() > 1 && parts.last().is_some_and(|part| is_suffix(part)) {
        if let Some(part) = parts.pop() {
            suffixes.insert(0, part);
        }
    }
    let ordered = match parts.as_slice() {
        [single] => single.clone(),
        [last, first] => format!("{first} {last}"),
        _ => return None,
    };

    let mut tokens: Vec<&str> = ordered.split_whitespace().collect();
    let mut titles = Vec::new();
    while tokens.first().is_some_and(|token| is_title(token)) {
        titles.push(tokens.remove(0));
    }
    while tokens.len() > 1 && tokens.last().is_some_and(|token| is_suffix(token)) {
        if let Some(token) = tokens.pop() {
            suffixes.insert(0, token.to_string());
        }
    }
    if tokens.is_empty() {
        return None;
    }

    let first = tokens[0].to_string();
    let (middle, last) = if tokens.len() == 1 {
        (String::new(), String::new())
    } else {
        let mut start = tokens.len() - 1;
        while start > 1 && is_particle(tokens[start - 1]) {
            start -= 1;
        }
        (tokens[1..start].join(" "), tokens[start..].join(" "))
    };

    Some(PersonName {
        title: titles.join(" "),
        first,
        middle,
        last,
        nick,
        suffix: suffixes.join(", "),
        full,
    })
}

#[derive(Clone, Debug)]
pub struct NamePipeline {
    rules: Vec<ValidationRule>,
}

impl Default for NamePipeline {
    fn default() -> Self {
        Self {
            rules: vec![
                ValidationRule::new(|value: &str| !is_email(value))
                    .with_error("Please enter a name, not an email address"),
                ValidationRule::new(|value: &str| NAME_CHARACTERS.is_match(value.trim()))
                    .with_error("Names can only contain letters, spaces, and - ' . ,"),
                ValidationRule::new(|value: &str| value.chars().any(char::is_alphabetic))
                    .with_error("Please enter a name"),
            ],
        }
    }
}

impl NamePipeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requires both a given and a family name.
    pub fn require_full_name(mut self) -> Self {
        self.rules.push(
            ValidationRule::new(|value: &str| {
                parse_name(value).is_some_and(|name| !name.first.is_empty() && !name.last.is_empty())
            })
            .with_error("Please enter your first and last name"),
        );
        self
    }
}

impl Pipeline for NamePipeline {
    fn format(&self, display: &str) -> String {
        collapse_whitespace(display)
    }

    /// Falls back to the raw text when no name can be picked out of it.
    fn parse(&self, display: &str) -> FormValue {
        match parse_name(display) {
            Some(name) => FormValue::Name(name),
            None => FormValue::text(display),
        }
    }

    fn rules(&self) -> &[ValidationRule] {
        &self.rules
    }
}
