use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::value::FormData;

/// Key under which a CAPTCHA token travels in the submission body.
pub const CAPTCHA_TOKEN_KEY: &str = "captchaToken";

/// What a transport receives: every field's parsed value, plus the CAPTCHA
/// token when the submit went through the challenge.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SubmitPayload {
    #[serde(flatten)]
    pub data: FormData,
    #[serde(rename = "captchaToken", skip_serializing_if = "Option::is_none")]
    pub captcha_token: Option<String>,
}

impl SubmitPayload {
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct TransportResponse {
    pub status: u16,
    pub body: serde_json::Value,
}

impl TransportResponse {
    pub fn ok() -> Self {
        Self {
            status: 200,
            body: serde_json::Value::Null,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq)]
pub enum TransportError {
    #[error("server answered with status {status}")]
    Status { status: u16, body: serde_json::Value },
    #[error("request failed: {0}")]
    Request(String),
    #[error("submit handler failed: {0}")]
    Handler(String),
    #[error("submission timed out after {0} ms")]
    Timeout(u64),
    #[error("unsupported HTTP method `{0}`")]
    InvalidMethod(String),
}

pub type BoxedDispatchFuture<'a> =
    Pin<Box<dyn Future<Output = Result<TransportResponse, TransportError>> + Send + 'a>>;

pub trait Transport: Send + Sync {
    fn dispatch<'a>(&'a self, payload: &'a SubmitPayload) -> BoxedDispatchFuture<'a>;
}

impl<F> Transport for F
where
    F: for<'a> Fn(&'a SubmitPayload) -> BoxedDispatchFuture<'a> + Send + Sync,
{
    fn dispatch<'a>(&'a self, payload: &'a SubmitPayload) -> BoxedDispatchFuture<'a> {
        (self)(payload)
    }
}

type SubmitHandlerFn =
    Arc<dyn Fn(&SubmitPayload) -> Result<serde_json::Value, String> + Send + Sync>;

/// Imperative transport: hands the payload to a caller-supplied function.
#[derive(Clone)]
pub struct HandlerTransport {
    handler: SubmitHandlerFn,
}

impl HandlerTransport {
    pub fn new(
        handler: impl Fn(&SubmitPayload) -> Result<serde_json::Value, String> + Send + Sync + 'static,
    ) -> Self {
        Self {
            handler: Arc::new(handler),
        }
    }
}

impl Transport for HandlerTransport {
    fn dispatch<'a>(&'a self, payload: &'a SubmitPayload) -> BoxedDispatchFuture<'a> {
        let result = (self.handler)(payload);
        Box::pin(async move {
            result
                .map(|body| TransportResponse { status: 200, body })
                .map_err(TransportError::Handler)
        })
    }
}

/// Declarative transport target, as found in form configuration.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
pub struct HttpTarget {
    pub method: String,
    pub action: String,
}

/// Sends the payload as a JSON body. Non-2xx answers are failures.
#[cfg(feature = "http")]
#[derive(Clone, Debug)]
pub struct HttpTransport {
    method: reqwest::Method,
    action: String,
    client: reqwest::Client,
}

#[cfg(feature = "http")]
impl HttpTransport {
    pub fn new(method: &str, action: impl Into<String>) -> Result<Self, TransportError> {
        let method = reqwest::Method::from_bytes(method.to_ascii_uppercase().as_bytes())
            .map_err(|_| TransportError::InvalidMethod(method.to_string()))?;
        Ok(Self {
            method,
            action: action.into(),
            client: reqwest::Client::new(),
        })
    }

    pub fn from_target(target: &HttpTarget) -> Result<Self, TransportError> {
        Self::new(&target.method, target.action.clone())
    }

    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn action(&self) -> &str {
        &self.action
    }

    pub fn method(&self) -> &reqwest::Method {
        &self.method
    }
}

#[cfg(feature = "http")]
impl Transport for HttpTransport {
    fn dispatch<'a>(&'a self, payload: &'a SubmitPayload) -> BoxedDispatchFuture<'a> {
        Box::pin(async move {
            let response = self
                .client
                .request(self.method.clone(), &self.action)
                .json(payload)
                .send()
                .await
                .map_err(|error| TransportError::Request(error.to_string()))?;
            let status = response.status().as_u16();
            let body = response
                .json::<serde_json::Value>()
                .await
                .unwrap_or(serde_json::Value::Null);
            if !(200..300).contains(&status) {
                return Err(TransportError::Status { status, body });
            }
            Ok(TransportResponse { status, body })
        })
    }
}

/// Starts a CAPTCHA challenge. The host resumes the submit by calling
/// `FormController::submit_with_token` from its verify callback.
pub trait Captcha: Send + Sync {
    fn execute(&self);
}

impl<F> Captcha for F
where
    F: Fn() + Send + Sync,
{
    fn execute(&self) {
        (self)()
    }
}
