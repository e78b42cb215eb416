use std::time::Duration;

use reqwest::{Client, Method};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;

use crate::{
    config::ApiConfig,
    error::{AppError, FieldError, Result},
};

/// Extra per-request knobs. Only query parameters are needed today.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }
}

/// Thin wrapper around `reqwest::Client` that speaks the backend's JSON
/// conventions and turns every failure into an `AppError`.
///
/// There are no retries here; callers decide what to do with a failure.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    base_url: String,
    token: Option<String>,
    timeout: Duration,
}

impl HttpClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.timeout_secs);
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: config.token.clone().filter(|t| !t.is_empty()),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
    ) -> Result<T> {
        self.send::<(), T>(Method::GET, path, None, options).await
    }

    pub async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        options: Option<&RequestOptions>,
    ) -> Result<T> {
        self.send(Method::POST, path, body, options).await
    }

    pub async fn put<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        path: &str,
        body: Option<&B>,
        options: Option<&RequestOptions>,
    ) -> Result<T> {
        self.send(Method::PUT, path, body, options).await
    }

    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        options: Option<&RequestOptions>,
    ) -> Result<T> {
        self.send::<(), T>(Method::DELETE, path, None, options).await
    }

    async fn send<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        options: Option<&RequestOptions>,
    ) -> Result<T> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(options) = options {
            if !options.query.is_empty() {
                request = request.query(&options.query);
            }
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| self.transport_error(e))?;
        let status = response.status();
        let text = response.text().await.map_err(|e| self.transport_error(e))?;

        if !status.is_success() {
            let err = error_from_response(status.as_u16(), &text);
            tracing::warn!("{} {} failed with {}: {}", method, url, status.as_u16(), err);
            return Err(err);
        }

        // 204s and empty bodies decode as JSON null so `()` / `IgnoredAny` work.
        let text = if text.trim().is_empty() { "null" } else { text.as_str() };
        serde_json::from_str(text).map_err(|e| AppError::Decode(e.to_string()))
    }

    fn transport_error(&self, err: reqwest::Error) -> AppError {
        tracing::warn!("Transport error: {}", err);
        transport_message(err.is_timeout(), self.timeout)
    }
}

fn transport_message(timed_out: bool, timeout: Duration) -> AppError {
    let message = if timed_out {
        format!(
            "The server did not respond within {} seconds. Please try again.",
            timeout.as_secs()
        )
    } else {
        "Unable to reach the server. Please check your connection and try again.".to_string()
    };
    AppError::Transport { message }
}

#[derive(Deserialize)]
struct NestedEnvelope {
    error: NestedError,
}

#[derive(Deserialize)]
struct NestedError {
    message: String,
    #[serde(default)]
    details: Option<ErrorDetails>,
}

#[derive(Deserialize)]
struct ErrorDetails {
    #[serde(default)]
    validation: Vec<FieldError>,
}

#[derive(Deserialize)]
struct StringEnvelope {
    error: String,
}

#[derive(Deserialize)]
struct FlatEnvelope {
    message: String,
}

/// Turns a non-2xx response into an `AppError`.
///
/// Envelope shapes are tried most specific first: `{error: {message, details}}`,
/// then `{error: "..."}`, then `{message}`, then a generic status message.
pub fn error_from_response(status: u16, body: &str) -> AppError {
    let data: Option<Value> = serde_json::from_str(body).ok();

    let (message, fields) = match data.as_ref() {
        Some(value) => parse_envelope(value),
        None => (None, Vec::new()),
    };
    let message = message.unwrap_or_else(|| format!("Request failed with status code {}", status));

    match status {
        400..=499 if !fields.is_empty() => AppError::Validation {
            status,
            message,
            fields,
            data,
        },
        400..=499 => AppError::Rejected { status, message, data },
        _ => AppError::Server { status, message, data },
    }
}

fn parse_envelope(value: &Value) -> (Option<String>, Vec<FieldError>) {
    if let Ok(nested) = NestedEnvelope::deserialize(value) {
        let fields = nested.error.details.map(|d| d.validation).unwrap_or_default();
        return (Some(nested.error.message), fields);
    }
    if let Ok(flat) = StringEnvelope::deserialize(value) {
        return (Some(flat.error), Vec::new());
    }
    if let Ok(flat) = FlatEnvelope::deserialize(value) {
        return (Some(flat.message), Vec::new());
    }
    (None, Vec::new())
}
