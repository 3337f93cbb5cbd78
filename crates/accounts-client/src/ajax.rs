//! AJAX requests and response checks
//!
//! [`AjaxRequest`] validates its options into a [`PreparedRequest`], which an
//! [`AjaxTransport`] sends. Responses are checked against the JSON envelope
//! the pages use: `{"success": true, "error": "...", "redirect": "..."}`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::alert::{AlertIcon, AlertSink, ErrorMessage};
use crate::error::{ClientError, ClientResult};

/// Content type used when a payload is sent without one
pub const DEFAULT_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

// ============================================================================
// Method
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AjaxMethod {
    Get,
    Head,
    Post,
    Patch,
    Put,
    Delete,
}

impl AjaxMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Patch => "PATCH",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// `None` means GET
    pub fn parse(s: Option<&str>) -> ClientResult<Self> {
        s.map_or(Ok(Self::Get), str::parse)
    }

    /// GET and HEAD carry no body
    pub fn accepts_payload(self) -> bool {
        !matches!(self, Self::Get | Self::Head)
    }
}

impl fmt::Display for AjaxMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AjaxMethod {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "HEAD" => Ok(Self::Head),
            "POST" => Ok(Self::Post),
            "PATCH" => Ok(Self::Patch),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(ClientError::InvalidString(s.to_string())),
        }
    }
}

// ============================================================================
// Request
// ============================================================================

/// Options of an AJAX request
#[derive(Debug, Clone, Default)]
pub struct AjaxRequest {
    pub method: Option<AjaxMethod>,
    pub url: String,
    pub payload: Option<Value>,
    pub content_type: Option<String>,
}

/// A request ready to send
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRequest {
    pub method: AjaxMethod,
    pub url: String,
    pub body: Option<String>,
    /// Set only when there is a body
    pub content_type: Option<String>,
}

impl AjaxRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Some(AjaxMethod::Get),
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn post(url: impl Into<String>, payload: Value) -> Self {
        Self {
            method: Some(AjaxMethod::Post),
            url: url.into(),
            payload: Some(payload),
            ..Self::default()
        }
    }

    /// Check the options and encode the payload
    pub fn prepare(&self) -> ClientResult<PreparedRequest> {
        let method = self.method.ok_or(ClientError::NotSpecified("Method"))?;
        let payload = self.payload.as_ref().filter(|p| !p.is_null());
        if payload.is_some() && !method.accepts_payload() {
            return Err(ClientError::PayloadUnacceptable(method));
        }
        if self.url.is_empty() {
            return Err(ClientError::NotSpecified("URL"));
        }

        let body = payload.map(|p| match p {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        });
        let content_type = body.as_ref().map(|_| {
            self.content_type
                .clone()
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string())
        });

        Ok(PreparedRequest {
            method,
            url: self.url.clone(),
            body,
            content_type,
        })
    }
}

// ============================================================================
// Response
// ============================================================================

/// Raw answer of the server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AjaxResponse {
    pub status: u16,
    pub text: String,
}

impl AjaxResponse {
    pub fn new(status: u16, text: impl Into<String>) -> Self {
        Self {
            status,
            text: text.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body parsed as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(&self.text).ok()
    }

    /// JSON body, or the text as a JSON string
    pub fn data(&self) -> Value {
        self.json().unwrap_or_else(|| Value::String(self.text.clone()))
    }
}

/// Options for [`validate_ajax_response`] and [`handle_ajax_error`]
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    /// Accept objects without a `success` key
    pub no_success_key: bool,
    pub no_alert: bool,
    pub error_prefix: Option<String>,
}

impl ValidateOptions {
    fn report(&self, message: impl Into<String>, icon: AlertIcon, alerts: &dyn AlertSink) -> String {
        ErrorMessage::new(message)
            .icon(icon)
            .no_alert(self.no_alert)
            .prefix(self.error_prefix.clone())
            .emit(alerts)
    }
}

/// Check a response envelope.
///
/// Failures are reported through `alerts` (unless `no_alert`) and returned as
/// [`ClientError::InvalidResponse`]. On success the `redirect` target, if
/// any, is returned for the caller to follow.
pub fn validate_ajax_response(
    data: &Value,
    options: &ValidateOptions,
    alerts: &dyn AlertSink,
) -> ClientResult<Option<String>> {
    let Some(object) = data.as_object() else {
        let message = options.report("Unexpected response from server.", AlertIcon::Warning, alerts);
        return Err(ClientError::InvalidResponse(message));
    };

    if let Some(error) = object.get("error").filter(|e| is_truthy(e)) {
        let text = match error {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        };
        let message = options.report(text, AlertIcon::Error, alerts);
        return Err(ClientError::InvalidResponse(message));
    }

    if !options.no_success_key && !object.get("success").is_some_and(is_truthy) {
        let message = options.report("No response from server.", AlertIcon::Warning, alerts);
        return Err(ClientError::InvalidResponse(message));
    }

    Ok(object
        .get("redirect")
        .and_then(Value::as_str)
        .filter(|r| !r.is_empty())
        .map(String::from))
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Message for a failed request.
///
/// A non-empty JSON `error` string wins, then the response text, then the
/// status code.
pub fn ajax_error_message(data: Option<&Value>, text: &str, status: Option<u16>) -> String {
    if let Some(error) = data
        .and_then(|d| d.get("error"))
        .and_then(Value::as_str)
        .filter(|e| !e.is_empty())
    {
        return error.to_string();
    }
    if !text.is_empty() {
        return text.to_string();
    }
    match status {
        Some(code) => format!("Code {code} error."),
        None => "Unknown error.".to_string(),
    }
}

/// Report a failed response and return the message shown
pub fn handle_ajax_error(
    response: &AjaxResponse,
    options: &ValidateOptions,
    alerts: &dyn AlertSink,
) -> String {
    let message = ajax_error_message(response.json().as_ref(), &response.text, Some(response.status));
    options.report(message, AlertIcon::Error, alerts)
}

// ============================================================================
// Transport
// ============================================================================

/// Sends prepared requests
#[async_trait]
pub trait AjaxTransport: Send + Sync {
    /// Any HTTP answer is `Ok`; only failures to get one are errors
    async fn send(&self, request: &PreparedRequest) -> ClientResult<AjaxResponse>;
}

/// [`AjaxTransport`] over `reqwest`, keeping cookies between requests
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AjaxTransport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &PreparedRequest) -> ClientResult<AjaxResponse> {
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        let mut builder = self
            .client
            .request(method, &request.url)
            .header(reqwest::header::ACCEPT, "application/json");
        if let Some(body) = &request.body {
            if let Some(content_type) = &request.content_type {
                builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
            }
            builder = builder.body(body.clone());
        }

        let response = builder
            .send()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ClientError::Transport(e.to_string()))?;
        debug!(status, "AJAX response received");

        Ok(AjaxResponse { status, text })
    }
}
