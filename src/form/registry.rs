use std::collections::BTreeMap;
use std::sync::Arc;

use super::controller::FormResult;
use super::value::{FormData, FormValue};

/// The contract a field implements to take part in a form.
///
/// `validate` recomputes validity against the field's live value, reveals the
/// outcome on the field, and returns it. `clear` restores the field's default
/// value and validity; it must be safe on a field that was never touched.
pub trait Validatable: Send + Sync {
    fn name(&self) -> &str;
    fn validate(&self) -> FormResult<bool>;
    fn clear(&self) -> FormResult<()>;
}

#[derive(Clone)]
pub struct FieldEntry {
    pub data: FormValue,
    pub field: Arc<dyn Validatable>,
}

impl std::fmt::Debug for FieldEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldEntry")
            .field("name", &self.field.name())
            .field("data", &self.data)
            .finish()
    }
}

/// Field name to entry. Registration upserts; nothing is ever removed.
#[derive(Clone, Debug, Default)]
pub struct FormRegistry {
    entries: BTreeMap<String, FieldEntry>,
}

impl FormRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` when the name was already registered.
    pub fn upsert(&mut self, name: impl Into<String>, entry: FieldEntry) -> bool {
        self.entries.insert(name.into(), entry).is_some()
    }

    pub fn get(&self, name: &str) -> Option<&FieldEntry> {
        self.entries.get(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn fields(&self) -> Vec<Arc<dyn Validatable>> {
        self.entries
            .values()
            .map(|entry| entry.field.clone())
            .collect()
    }

    pub fn collect(&self) -> FormData {
        self.entries
            .iter()
            .map(|(name, entry)| (name.clone(), entry.data.clone()))
            .collect()
    }
}
