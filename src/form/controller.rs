use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};
use std::time::Duration;

use futures::future::{self, Either};
use futures_timer::Delay;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use super::registry::{FieldEntry, FormRegistry, Validatable};
use super::transport::{
    Captcha, SubmitPayload, Transport, TransportError, TransportResponse,
};
use super::value::{FormData, FormValue};

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum FormState {
    Ready,
    Submitting,
    Submitted,
    Error,
}

#[derive(Clone, Debug, Default, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct FormOptions {
    /// Clear every registered field after a successful submission.
    pub clear_on_submit: bool,
    /// Abandon the transport after this many milliseconds.
    pub submit_timeout_ms: Option<u64>,
}

impl FormOptions {
    pub fn clear_on_submit(mut self, value: bool) -> Self {
        self.clear_on_submit = value;
        self
    }

    pub fn submit_timeout_ms(mut self, value: u64) -> Self {
        self.submit_timeout_ms = Some(value);
        self
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum FormError {
    #[error("form state lock poisoned while {0}")]
    StatePoisoned(&'static str),
    #[error("invalid form state transition: {from:?} -> {to:?}")]
    InvalidStateTransition { from: FormState, to: FormState },
    #[error("form submit is already in progress")]
    AlreadySubmitting,
    #[error("no submit is waiting for a captcha token")]
    NoPendingSubmit,
    #[error("no field named `{0}` is registered")]
    UnknownField(String),
}

pub type FormResult<T> = Result<T, FormError>;

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    /// At least one field failed validation; nothing was sent.
    Invalid,
    /// The CAPTCHA challenge was started; `submit_with_token` finishes the submit.
    AwaitingCaptcha,
    /// Neither an HTTP target nor a handler is configured.
    NotDispatched,
    Submitted(TransportResponse),
    Failed(TransportError),
}

#[derive(Clone, Debug)]
pub struct FormSnapshot {
    pub state: FormState,
    pub submit_count: u32,
    pub awaiting_captcha: bool,
    pub data: FormData,
}

type ResponseCallback = Arc<dyn Fn(&TransportResponse) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&TransportError) + Send + Sync>;

pub(super) struct FormRuntime {
    pub(super) state: FormState,
    pub(super) submit_count: u32,
    pub(super) awaiting_captcha: bool,
}

struct FormShared {
    options: FormOptions,
    runtime: RwLock<FormRuntime>,
    registry: RwLock<FormRegistry>,
    http: Option<Arc<dyn Transport>>,
    handler: Option<Arc<dyn Transport>>,
    captcha: Option<Arc<dyn Captcha>>,
    on_success: Option<ResponseCallback>,
    on_error: Option<ErrorCallback>,
}

pub struct FormBuilder {
    options: FormOptions,
    http: Option<Arc<dyn Transport>>,
    handler: Option<Arc<dyn Transport>>,
    captcha: Option<Arc<dyn Captcha>>,
    on_success: Option<ResponseCallback>,
    on_error: Option<ErrorCallback>,
}

impl FormBuilder {
    /// Declarative transport. Takes precedence over `handler` when both are set.
    pub fn http(mut self, transport: impl Transport + 'static) -> Self {
        self.http = Some(Arc::new(transport));
        self
    }

    pub fn handler(mut self, transport: impl Transport + 'static) -> Self {
        self.handler = Some(Arc::new(transport));
        self
    }

    pub fn captcha(mut self, captcha: impl Captcha + 'static) -> Self {
        self.captcha = Some(Arc::new(captcha));
        self
    }

    pub fn on_success(
        mut self,
        callback: impl Fn(&TransportResponse) + Send + Sync + 'static,
    ) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&TransportError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> FormController {
        FormController {
            shared: Arc::new(FormShared {
                options: self.options,
                runtime: RwLock::new(FormRuntime {
                    state: FormState::Ready,
                    submit_count: 0,
                    awaiting_captcha: false,
                }),
                registry: RwLock::new(FormRegistry::new()),
                http: self.http,
                handler: self.handler,
                captcha: self.captcha,
                on_success: self.on_success,
                on_error: self.on_error,
            }),
        }
    }
}

/// The form aggregator: a registry of fields plus the submit state machine.
///
/// Cheap to clone; every clone drives the same form.
#[derive(Clone)]
pub struct FormController {
    shared: Arc<FormShared>,
}

/// Non-owning handle a field keeps to reach its form.
#[derive(Clone, Default)]
pub struct FormLink {
    shared: Weak<FormShared>,
}

impl FormLink {
    pub fn detached() -> Self {
        Self::default()
    }

    pub fn upgrade(&self) -> Option<FormController> {
        self.shared.upgrade().map(|shared| FormController { shared })
    }
}

impl FormController {
    pub fn new(options: FormOptions) -> Self {
        Self::builder(options).build()
    }

    pub fn builder(options: FormOptions) -> FormBuilder {
        FormBuilder {
            options,
            http: None,
            handler: None,
            captcha: None,
            on_success: None,
            on_error: None,
        }
    }

    pub fn link(&self) -> FormLink {
        FormLink {
            shared: Arc::downgrade(&self.shared),
        }
    }

    pub fn options(&self) -> &FormOptions {
        &self.shared.options
    }

    /// Upserts a field's entry. A form showing `Submitted` or `Error` drops
    /// back to `Ready`, since the user is interacting again.
    pub fn register(
        &self,
        name: &str,
        data: FormValue,
        field: Arc<dyn Validatable>,
    ) -> FormResult<()> {
        let replaced = write_lock(&self.shared.registry, "registering field")?
            .upsert(name, FieldEntry { data, field });

        let mut runtime = write_lock(&self.shared.runtime, "resetting state on registration")?;
        if matches!(runtime.state, FormState::Submitted | FormState::Error) {
            transition_form_state(&mut runtime, FormState::Ready)?;
        }
        debug!(field = name, replaced, "field registered");
        Ok(())
    }

    pub fn state(&self) -> FormResult<FormState> {
        Ok(read_lock(&self.shared.runtime, "reading form state")?.state)
    }

    pub fn is_submitting(&self) -> FormResult<bool> {
        Ok(self.state()? == FormState::Submitting)
    }

    pub fn data(&self) -> FormResult<FormData> {
        Ok(read_lock(&self.shared.registry, "collecting form data")?.collect())
    }

    pub fn value(&self, name: &str) -> FormResult<FormValue> {
        read_lock(&self.shared.registry, "reading field value")?
            .get(name)
            .map(|entry| entry.data.clone())
            .ok_or_else(|| FormError::UnknownField(name.to_string()))
    }

    pub fn field_names(&self) -> FormResult<Vec<String>> {
        Ok(read_lock(&self.shared.registry, "listing fields")?.names())
    }

    pub fn snapshot(&self) -> FormResult<FormSnapshot> {
        let data = self.data()?;
        let runtime = read_lock(&self.shared.runtime, "creating form snapshot")?;
        Ok(FormSnapshot {
            state: runtime.state,
            submit_count: runtime.submit_count,
            awaiting_captcha: runtime.awaiting_captcha,
            data,
        })
    }

    /// Runs every field's validation. All fields run, so each invalid one
    /// reveals its error in the same pass.
    pub fn validate_all(&self) -> FormResult<bool> {
        let fields = read_lock(&self.shared.registry, "reading fields for validation")?.fields();
        let mut valid = true;
        for field in fields {
            valid &= field.validate()?;
        }
        Ok(valid)
    }

    pub fn clear_all(&self) -> FormResult<()> {
        let fields = read_lock(&self.shared.registry, "reading fields for clearing")?.fields();
        for field in fields {
            field.clear()?;
        }
        Ok(())
    }

    pub async fn submit(&self) -> FormResult<SubmitOutcome> {
        if self.is_submitting()? {
            return Err(FormError::AlreadySubmitting);
        }

        let valid = self.validate_all()?;
        {
            let mut runtime = write_lock(&self.shared.runtime, "starting submit")?;
            if runtime.state == FormState::Submitting {
                return Err(FormError::AlreadySubmitting);
            }
            runtime.submit_count = runtime.submit_count.saturating_add(1);
            if !valid {
                transition_form_state(&mut runtime, FormState::Ready)?;
                debug!("submit blocked by invalid fields");
                return Ok(SubmitOutcome::Invalid);
            }
            transition_form_state(&mut runtime, FormState::Submitting)?;
            runtime.awaiting_captcha = self.shared.captcha.is_some();
        }

        if let Some(captcha) = self.shared.captcha.clone() {
            debug!("submit waiting for captcha token");
            captcha.execute();
            return Ok(SubmitOutcome::AwaitingCaptcha);
        }
        self.dispatch(None).await
    }

    /// Finishes a submit that was deferred on the CAPTCHA challenge.
    pub async fn submit_with_token(&self, token: impl Into<String>) -> FormResult<SubmitOutcome> {
        {
            let mut runtime = write_lock(&self.shared.runtime, "accepting captcha token")?;
            if runtime.state != FormState::Submitting || !runtime.awaiting_captcha {
                return Err(FormError::NoPendingSubmit);
            }
            runtime.awaiting_captcha = false;
        }
        self.dispatch(Some(token.into())).await
    }

    async fn dispatch(&self, captcha_token: Option<String>) -> FormResult<SubmitOutcome> {
        let payload = SubmitPayload {
            data: self.data()?,
            captcha_token,
        };
        let transport = self
            .shared
            .http
            .clone()
            .or_else(|| self.shared.handler.clone());
        let Some(transport) = transport else {
            warn!("form has neither an HTTP target nor a submit handler; nothing was sent");
            let mut runtime = write_lock(&self.shared.runtime, "abandoning submit")?;
            transition_form_state(&mut runtime, FormState::Ready)?;
            return Ok(SubmitOutcome::NotDispatched);
        };

        let result = match self.shared.options.submit_timeout_ms {
            Some(timeout_ms) => {
                let send = transport.dispatch(&payload);
                let timeout = Box::pin(Delay::new(Duration::from_millis(timeout_ms)));
                match future::select(send, timeout).await {
                    Either::Left((result, _)) => result,
                    Either::Right(_) => Err(TransportError::Timeout(timeout_ms)),
                }
            }
            None => transport.dispatch(&payload).await,
        };

        match result {
            Ok(response) => self.on_success(response),
            Err(error) => self.on_error(error),
        }
    }

    /// Marks the in-flight submit as delivered.
    pub fn on_success(&self, response: TransportResponse) -> FormResult<SubmitOutcome> {
        if self.state()? != FormState::Submitting {
            return Err(FormError::InvalidStateTransition {
                from: self.state()?,
                to: FormState::Submitted,
            });
        }
        if self.shared.options.clear_on_submit {
            self.clear_all()?;
        }
        {
            let mut runtime = write_lock(&self.shared.runtime, "completing submit")?;
            transition_form_state(&mut runtime, FormState::Submitted)?;
        }
        debug!(status = response.status, "form submitted");
        if let Some(callback) = self.shared.on_success.as_ref() {
            callback(&response);
        }
        Ok(SubmitOutcome::Submitted(response))
    }

    /// Marks the in-flight submit as failed. Field values are kept.
    pub fn on_error(&self, error: TransportError) -> FormResult<SubmitOutcome> {
        {
            let mut runtime = write_lock(&self.shared.runtime, "failing submit")?;
            runtime.awaiting_captcha = false;
            transition_form_state(&mut runtime, FormState::Error)?;
        }
        warn!(%error, "form submission failed");
        if let Some(callback) = self.shared.on_error.as_ref() {
            callback(&error);
        }
        Ok(SubmitOutcome::Failed(error))
    }
}

pub(super) fn transition_form_state(runtime: &mut FormRuntime, next: FormState) -> FormResult<()> {
    let current = runtime.state;
    if current == next {
        return Ok(());
    }

    let allowed = matches!(
        (current, next),
        (FormState::Ready, FormState::Submitting)
            | (FormState::Submitting, FormState::Submitted)
            | (FormState::Submitting, FormState::Error)
            | (FormState::Submitting, FormState::Ready)
            | (FormState::Submitted, FormState::Ready)
            | (FormState::Error, FormState::Ready)
            | (FormState::Submitted, FormState::Submitting)
            | (FormState::Error, FormState::Submitting)
    );
    if !allowed {
        return Err(FormError::InvalidStateTransition {
            from: current,
            to: next,
        });
    }
    runtime.state = next;
    Ok(())
}

pub(crate) fn read_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockReadGuard<'a, T>> {
    lock.read().map_err(|_| FormError::StatePoisoned(context))
}

pub(crate) fn write_lock<'a, T>(
    lock: &'a RwLock<T>,
    context: &'static str,
) -> FormResult<RwLockWriteGuard<'a, T>> {
    lock.write().map_err(|_| FormError::StatePoisoned(context))
}
