use super::{ConfigError, Field, FieldConfig, FieldKind};
use crate::form::{FileMeta, FormLink, FormResult, FormValue};
use crate::pipeline::Rule;

/// A file picker. Only metadata passes through the form; the bytes stay
/// with the host.
#[derive(Clone, Debug, Default)]
pub struct FileKind {
    accept: Vec<String>,
    max_size: Option<u64>,
    max_files: Option<usize>,
    rules: Vec<Rule<Vec<FileMeta>>>,
}

impl FileKind {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mime types (`image/png`, `image/*`) or extensions (`.pdf`).
    pub fn accept<I, S>(mut self, entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let accept: Vec<String> = entries
            .into_iter()
            .map(|entry| entry.into().trim().to_ascii_lowercase())
            .filter(|entry| !entry.is_empty())
            .collect();
        self.accept = accept.clone();
        self.rules.push(
            Rule::new(move |files: &Vec<FileMeta>| {
                files.iter().all(|file| accepts(&accept, file))
            })
            .with_error("This file type is not allowed"),
        );
        self
    }

    /// Per-file limit in bytes.
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.max_size = Some(bytes);
        self.rules.push(
            Rule::new(move |files: &Vec<FileMeta>| files.iter().all(|file| file.size <= bytes))
                .with_error(format!("Files must be {} or smaller", human_size(bytes))),
        );
        self
    }

    pub fn max_files(mut self, count: usize) -> Self {
        self.max_files = Some(count);
        self.rules.push(
            Rule::new(move |files: &Vec<FileMeta>| files.len() <= count)
                .with_error(format!("Choose at most {count} files")),
        );
        self
    }

    pub fn rule(mut self, rule: Rule<Vec<FileMeta>>) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn accepts(&self, file: &FileMeta) -> bool {
        self.accept.is_empty() || accepts(&self.accept, file)
    }
}

fn accepts(accept: &[String], file: &FileMeta) -> bool {
    let mime = file.mime.to_ascii_lowercase();
    let extension = file.extension();
    accept.iter().any(|entry| {
        if let Some(wanted) = entry.strip_prefix('.') {
            extension.as_deref() == Some(wanted)
        } else if let Some(family) = entry.strip_suffix("/*") {
            mime.split_once('/').is_some_and(|(kind, _)| kind == family)
        } else {
            mime == *entry
        }
    })
}

fn human_size(bytes: u64) -> String {
    const UNITS: [(&str, u64); 3] = [("GB", 1 << 30), ("MB", 1 << 20), ("KB", 1 << 10)];
    UNITS
        .iter()
        .find(|(_, size)| bytes >= *size && bytes % size == 0)
        .map(|(unit, size)| format!("{} {unit}", bytes / size))
        .unwrap_or_else(|| format!("{bytes} bytes"))
}

impl FieldKind for FileKind {
    type Value = Vec<FileMeta>;
    type Checked = Vec<FileMeta>;

    fn initial(&self, _default: Option<&str>) -> Vec<FileMeta> {
        Vec::new()
    }

    fn is_empty(&self, value: &Vec<FileMeta>) -> bool {
        value.is_empty()
    }

    fn checked<'a>(&self, value: &'a Vec<FileMeta>) -> &'a Vec<FileMeta> {
        value
    }

    fn rules(&self) -> &[Rule<Vec<FileMeta>>] {
        &self.rules
    }

    fn to_form_value(&self, value: &Vec<FileMeta>) -> FormValue {
        FormValue::Files(value.clone())
    }

    fn check_config(&self, name: &str) -> Result<(), ConfigError> {
        if self.max_files == Some(0) || self.max_size == Some(0) {
            return Err(ConfigError::InvalidBound {
                field: name.to_string(),
                reason: "file limits must be greater than zero".into(),
            });
        }
        Ok(())
    }
}

pub type FileField = Field<FileKind>;

impl Field<FileKind> {
    pub fn new(config: FieldConfig, kind: FileKind, form: FormLink) -> Result<Self, ConfigError> {
        Self::with_kind(config, kind, form)
    }

    /// Adds the file and validates. A rejected file stays listed so its
    /// error can be shown next to it.
    pub fn add_file(&self, file: FileMeta) -> FormResult<bool> {
        let mut files = self.value()?;
        files.push(file);
        self.commit(files)
    }

    pub fn remove_file(&self, name: &str) -> FormResult<bool> {
        let mut files = self.value()?;
        let before = files.len();
        files.retain(|file| file.name != name);
        if files.len() == before {
            return Ok(false);
        }
        self.commit(files)?;
        Ok(true)
    }

    /// Upload progress in percent, capped at 100. `None` hides the bar.
    pub fn set_progress(&self, percent: Option<u8>) -> FormResult<()> {
        self.update_progress(percent)
    }
}
