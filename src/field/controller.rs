use std::sync::{Arc, RwLock, Weak};

use tracing::debug;

use super::{ConfigError, FieldConfig, FieldKind, FieldStatus, Trigger, evaluate};
use crate::form::{FormLink, FormResult, FormValue, Validatable, read_lock, write_lock};

struct FieldState<V> {
    value: V,
    status: FieldStatus,
    error: Option<String>,
    progress: Option<u8>,
    mounted: bool,
}

/// What a renderer needs to draw a field.
#[derive(Clone, Debug, PartialEq)]
pub struct FieldSnapshot<V> {
    pub name: String,
    pub value: V,
    pub status: FieldStatus,
    /// Set only while the error is revealed.
    pub error: Option<String>,
    /// Set only after a blur that validated.
    pub success: Option<String>,
    pub progress: Option<u8>,
}

struct FieldInner<K: FieldKind> {
    name: String,
    config: FieldConfig,
    kind: K,
    form: FormLink,
    initial: K::Value,
    state: RwLock<FieldState<K::Value>>,
    this: Weak<FieldInner<K>>,
}

/// A field controller. Cheap to clone; clones drive the same field.
pub struct Field<K: FieldKind> {
    inner: Arc<FieldInner<K>>,
}

impl<K: FieldKind> Clone for Field<K> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<K: FieldKind> Field<K> {
    /// Resolves the field's name and checks the kind's settings. Nothing is
    /// registered until `mount`.
    pub fn with_kind(config: FieldConfig, kind: K, form: FormLink) -> Result<Self, ConfigError> {
        let name = config.resolve_name()?;
        kind.check_config(&name)?;
        let initial = kind.initial(config.default_value.as_deref());

        let inner = Arc::new_cyclic(|this| FieldInner {
            name,
            config,
            kind,
            form,
            state: RwLock::new(FieldState {
                value: initial.clone(),
                status: FieldStatus::Pristine,
                error: None,
                progress: None,
                mounted: false,
            }),
            initial,
            this: this.clone(),
        });
        Ok(Self { inner })
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn config(&self) -> &FieldConfig {
        &self.inner.config
    }

    pub fn kind(&self) -> &K {
        &self.inner.kind
    }

    /// Registers the initial value with the form. Later calls do nothing.
    pub fn mount(&self) -> FormResult<()> {
        let data = {
            let mut state = write_lock(&self.inner.state, "mounting field")?;
            if state.mounted {
                return Ok(());
            }
            state.mounted = true;
            self.inner.kind.to_form_value(&state.value)
        };
        self.inner.sync(data)
    }

    pub fn value(&self) -> FormResult<K::Value> {
        Ok(read_lock(&self.inner.state, "reading field value")?.value.clone())
    }

    pub fn status(&self) -> FormResult<FieldStatus> {
        Ok(read_lock(&self.inner.state, "reading field status")?.status)
    }

    pub fn snapshot(&self) -> FormResult<FieldSnapshot<K::Value>> {
        let state = read_lock(&self.inner.state, "creating field snapshot")?;
        let success = if state.status.shows_success() {
            self.inner.config.success_message.clone()
        } else {
            None
        };
        Ok(FieldSnapshot {
            name: self.inner.name.clone(),
            value: state.value.clone(),
            status: state.status,
            error: state
                .error
                .clone()
                .filter(|_| state.status.shows_error()),
            success,
            progress: state.progress,
        })
    }

    /// Hides a revealed error while the user edits.
    pub fn on_focus(&self) -> FormResult<()> {
        let mut state = write_lock(&self.inner.state, "focusing field")?;
        state.status = state.status.on_focus();
        Ok(())
    }

    /// Validates the live value, or `value_override` when given. On success
    /// the parsed value is registered with the form; on failure the form keeps
    /// the last value that validated.
    pub fn validate(&self, value_override: Option<K::Value>) -> FormResult<bool> {
        self.inner.run(value_override, Trigger::Form)
    }

    pub fn on_blur(&self) -> FormResult<bool> {
        self.inner.run(None, Trigger::Blur)
    }

    /// Back to the default value and `Pristine`. The default is registered
    /// again so the form never holds a cleared field's old value.
    pub fn clear(&self) -> FormResult<()> {
        self.inner.reset()
    }

    /// Replaces the live value. Validation only runs when the field is
    /// already invalid, so a corrected value clears its error immediately.
    pub(crate) fn change(&self, next: K::Value) -> FormResult<()> {
        let revalidate = {
            let mut state = write_lock(&self.inner.state, "updating field value")?;
            state.value = next;
            state.status.is_invalid()
        };
        if revalidate {
            self.inner.run(None, Trigger::Change)?;
        }
        Ok(())
    }

    /// A discrete edit such as a toggle or an added tag: change then blur.
    pub(crate) fn commit(&self, next: K::Value) -> FormResult<bool> {
        self.change(next)?;
        self.on_blur()
    }

    pub(crate) fn update_progress(&self, progress: Option<u8>) -> FormResult<()> {
        let mut state = write_lock(&self.inner.state, "updating field progress")?;
        state.progress = progress.map(|value| value.min(100));
        Ok(())
    }
}

impl<K: FieldKind> FieldInner<K> {
    fn run(&self, value_override: Option<K::Value>, trigger: Trigger) -> FormResult<bool> {
        let (outcome, mounted) = {
            let mut state = write_lock(&self.state, "validating field")?;
            let live = value_override.is_none();
            let candidate = value_override.unwrap_or_else(|| state.value.clone());
            let verdict = evaluate(&self.kind, &self.config, &candidate);
            state.status = trigger.settle(state.status, verdict.is_ok());
            let outcome = match verdict {
                Ok(()) => {
                    let candidate = if live && trigger == Trigger::Blur {
                        let formatted = self.kind.format(&candidate);
                        state.value = formatted.clone();
                        formatted
                    } else {
                        candidate
                    };
                    state.error = None;
                    Some(self.kind.to_form_value(&candidate))
                }
                Err(message) => {
                    state.error = Some(message);
                    None
                }
            };
            (outcome, state.mounted)
        };

        debug!(field = %self.name, ?trigger, valid = outcome.is_some(), "field validated");
        match outcome {
            // Only a mounted field owns an entry in the form.
            Some(data) if mounted => {
                self.sync(data)?;
                Ok(true)
            }
            Some(_) => Ok(true),
            None => Ok(false),
        }
    }

    fn reset(&self) -> FormResult<()> {
        let mounted = {
            let mut state = write_lock(&self.state, "clearing field")?;
            state.value = self.initial.clone();
            state.status = FieldStatus::Pristine;
            state.error = None;
            state.progress = None;
            state.mounted
        };
        if mounted {
            self.sync(self.kind.to_form_value(&self.initial))?;
        }
        Ok(())
    }

    /// Upserts this field's entry in the form. A field whose form is gone
    /// keeps working on its own.
    fn sync(&self, data: FormValue) -> FormResult<()> {
        let Some(form) = self.form.upgrade() else {
            debug!(field = %self.name, "field has no form; value not registered");
            return Ok(());
        };
        let Some(field) = self.this.upgrade() else {
            return Ok(());
        };
        form.register(&self.name, data, field)
    }
}

impl<K: FieldKind> Validatable for FieldInner<K> {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self) -> FormResult<bool> {
        self.run(None, Trigger::Form)
    }

    fn clear(&self) -> FormResult<()> {
        self.reset()
    }
}
