use std::collections::BTreeSet;

use chrono::NaiveDate;
use thiserror::Error;

use super::value::{EmailAddress, FileMeta, FormData, FormValue, PersonName};

#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum FormDataError {
    #[error("field `{field}` is missing")]
    Missing { field: String },
    #[error("field `{field}` holds {found}, expected {expected}")]
    Mismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// Builds a typed value out of collected form data. Usually derived.
pub trait FromFormData: Sized {
    fn from_form_data(data: &FormData) -> Result<Self, FormDataError>;
}

/// Converts one registered value into a concrete type.
pub trait FromFormValue: Sized {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError>;
}

fn present<'a>(field: &str, value: Option<&'a FormValue>) -> Result<&'a FormValue, FormDataError> {
    value.ok_or_else(|| FormDataError::Missing {
        field: field.to_string(),
    })
}

fn mismatch(field: &str, expected: &'static str, found: &FormValue) -> FormDataError {
    FormDataError::Mismatch {
        field: field.to_string(),
        expected,
        found: found.kind(),
    }
}

impl FromFormValue for FormValue {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        present(field, value).cloned()
    }
}

/// Structured values fall back to their `full` text, so a name or email
/// that could not be parsed still reads as a string.
impl FromFormValue for String {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Text(text) => Ok(text.clone()),
            FormValue::Name(name) => Ok(name.full.clone()),
            FormValue::Email(email) => Ok(email.full.clone()),
            FormValue::Date(date) => Ok(date.format("%Y-%m-%d").to_string()),
            other => Err(mismatch(field, "text", other)),
        }
    }
}

impl FromFormValue for bool {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Bool(flag) => Ok(*flag),
            other => Err(mismatch(field, "bool", other)),
        }
    }
}

impl FromFormValue for f64 {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Number(number) => Ok(*number),
            FormValue::Text(text) => text
                .parse::<f64>()
                .map_err(|_| mismatch(field, "number", &FormValue::Text(text.clone()))),
            other => Err(mismatch(field, "number", other)),
        }
    }
}

impl FromFormValue for NaiveDate {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Date(date) => Ok(*date),
            other => Err(mismatch(field, "date", other)),
        }
    }
}

impl FromFormValue for BTreeSet<String> {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Tags(tags) => Ok(tags.clone()),
            other => Err(mismatch(field, "tags", other)),
        }
    }
}

impl FromFormValue for Vec<FileMeta> {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Files(files) => Ok(files.clone()),
            other => Err(mismatch(field, "files", other)),
        }
    }
}

impl FromFormValue for PersonName {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Name(name) => Ok(name.clone()),
            other => Err(mismatch(field, "name", other)),
        }
    }
}

impl FromFormValue for EmailAddress {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match present(field, value)? {
            FormValue::Email(email) => Ok(email.clone()),
            other => Err(mismatch(field, "email", other)),
        }
    }
}

/// Missing fields and empty text read as `None`.
impl<T: FromFormValue> FromFormValue for Option<T> {
    fn from_form_value(field: &str, value: Option<&FormValue>) -> Result<Self, FormDataError> {
        match value {
            None => Ok(None),
            Some(FormValue::Text(text)) if text.is_empty() => Ok(None),
            Some(value) => T::from_form_value(field, Some(value)).map(Some),
        }
    }
}
