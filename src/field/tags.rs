use std::collections::BTreeSet;

use super::{ConfigError, Field, FieldConfig, FieldKind};
use crate::form::{FormLink, FormResult, FormValue};
use crate::pipeline::Rule;

type TagSet = BTreeSet<String>;

/// A free-form tag list. Tags are trimmed and deduplicated.
#[derive(Clone, Debug, Default)]
pub struct TagKind {
    lowercase: bool,
    max_tags: Option<usize>,
    rules: Vec<Rule<TagSet>>,
}

impl TagKind {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lowercase(mut self, value: bool) -> Self {
        self.lowercase = value;
        self
    }

    /// Further tags are refused once the list is full.
    pub fn max_tags(mut self, value: usize) -> Self {
        self.max_tags = Some(value);
        self
    }

    pub fn rule(mut self, rule: Rule<TagSet>) -> Self {
        self.rules.push(rule);
        self
    }

    /// The stored form of a typed tag, or `None` when nothing is left.
    pub fn normalize(&self, tag: &str) -> Option<String> {
        let tag = tag.split_whitespace().collect::<Vec<_>>().join(" ");
        if tag.is_empty() {
            return None;
        }
        Some(if self.lowercase { tag.to_lowercase() } else { tag })
    }
}

impl FieldKind for TagKind {
    type Value = TagSet;
    type Checked = TagSet;

    /// A comma separated default such as `"rust, wasm"`.
    fn initial(&self, default: Option<&str>) -> TagSet {
        default
            .unwrap_or_default()
            .split(',')
            .filter_map(|tag| self.normalize(tag))
            .take(self.max_tags.unwrap_or(usize::MAX))
            .collect()
    }

    fn is_empty(&self, value: &TagSet) -> bool {
        value.is_empty()
    }

    fn checked<'a>(&self, value: &'a TagSet) -> &'a TagSet {
        value
    }

    fn rules(&self) -> &[Rule<TagSet>] {
        &self.rules
    }

    fn to_form_value(&self, value: &TagSet) -> FormValue {
        FormValue::Tags(value.clone())
    }

    fn check_config(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_tags == Some(0) {
            return Err(ConfigError::InvalidBound {
                field: name.to_string(),
                reason: "max_tags must allow at least one tag".into(),
            });
        }
        Ok(())
    }
}

pub type TagField = Field<TagKind>;

impl Field<TagKind> {
    pub fn new(config: FieldConfig, kind: TagKind, form: FormLink) -> Result<Self, ConfigError> {
        Self::with_kind(config, kind, form)
    }

    /// `false` when the tag was blank, already present, or the list is full.
    pub fn add_tag(&self, tag: &str) -> FormResult<bool> {
        let Some(tag) = self.kind().normalize(tag) else {
            return Ok(false);
        };
        let mut tags = self.value()?;
        if tags.contains(&tag) || self.kind().max_tags.is_some_and(|max| tags.len() >= max) {
            return Ok(false);
        }
        tags.insert(tag);
        self.commit(tags)?;
        Ok(true)
    }

    pub fn remove_tag(&self, tag: &str) -> FormResult<bool> {
        let Some(tag) = self.kind().normalize(tag) else {
            return Ok(false);
        };
        let mut tags = self.value()?;
        if !tags.remove(&tag) {
            return Ok(false);
        }
        self.commit(tags)?;
        Ok(true)
    }
}
