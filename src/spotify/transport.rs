use async_trait::async_trait;
use reqwest::{Client, Method, StatusCode, header::RETRY_AFTER};
use serde_json::Value;

use crate::{Error, Res};

/// Seconds to wait on a 429 without a usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 5;

/// One outbound HTTP request.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub query: Vec<(String, String)>,
    pub bearer: Option<String>,
    pub json: Option<Value>,
    pub form: Option<Vec<(String, String)>>,
}

impl ApiRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            query: Vec::new(),
            bearer: None,
            json: None,
            form: None,
        }
    }

    pub fn query(mut self, query: &[(String, String)]) -> Self {
        self.query.extend_from_slice(query);
        self
    }

    pub fn bearer(mut self, token: impl Into<String>) -> Self {
        self.bearer = Some(token.into());
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.json = Some(body);
        self
    }

    pub fn form(mut self, fields: Vec<(String, String)>) -> Self {
        self.form = Some(fields);
        self
    }

    /// Value of a query parameter, if present.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }
}

/// Status, rate-limit hint and decoded body of a response.
///
/// Non-2xx responses are returned as values, not errors; classifying them
/// is [`ApiResponse::into_result`]'s job.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub retry_after: Option<u64>,
    pub body: Value,
}

impl ApiResponse {
    pub fn ok(body: Value) -> Self {
        Self {
            status: 200,
            retry_after: None,
            body,
        }
    }

    pub fn with_status(status: u16, body: Value) -> Self {
        Self {
            status,
            retry_after: None,
            body,
        }
    }

    pub fn rate_limited(retry_after: Option<u64>) -> Self {
        Self {
            status: 429,
            retry_after,
            body: Value::Null,
        }
    }

    /// Maps the response to the body or to a classified error.
    pub fn into_result(self) -> Res<Value> {
        match self.status {
            200..=299 => Ok(self.body),
            429 => Err(Error::RateLimited {
                retry_after: self.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            }),
            status => Err(Error::Api {
                status,
                message: error_message(&self.body),
            }),
        }
    }
}

/// Spotify puts the message in `error.message` for API errors and in
/// `error_description` for token endpoint errors.
fn error_message(body: &Value) -> String {
    body["error"]["message"]
        .as_str()
        .or_else(|| body["error_description"].as_str())
        .or_else(|| body["error"].as_str())
        .or_else(|| body.as_str())
        .map(str::to_string)
        .unwrap_or_else(|| body.to_string())
}

/// Executes a single HTTP request. Implementations never retry.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: ApiRequest) -> Res<ApiResponse>;
}

/// Production transport backed by a shared `reqwest` client.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: ApiRequest) -> Res<ApiResponse> {
        let mut builder = self
            .client
            .request(request.method, &request.url)
            .query(&request.query);

        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(fields) = &request.form {
            builder = builder.form(fields);
        } else if let Some(body) = &request.json {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
            response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.trim().parse::<u64>().ok())
        } else {
            None
        };

        let text = response.text().await?;
        let body = if text.trim().is_empty() {
            Value::Null
        } else {
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(ApiResponse {
            status: status.as_u16(),
            retry_after,
            body,
        })
    }
}
