//! Circuit service REST client.
//!
//! Endpoints, relative to the configured base URL:
//! - `GET circuits`: list template records
//! - `GET circuits/{name}`: one template record
//! - `GET circuits/{name}/compiled?arguments=<json>&output_format=<fmt>`:
//!   materialize a template
//! - `GET circuit-families`: list family records
//!
//! List endpoints may answer with a bare array or with the array wrapped in
//! an object (`{"circuits": [...]}`).

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Url, header};
use serde_json::Value;
use tracing::debug;

use circlib_catalog::Arguments;

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

/// User-Agent sent with requests.
const USER_AGENT: &str = concat!("circlib/", env!("CARGO_PKG_VERSION"));

/// Circuit service API client.
pub struct CircuitClient {
    /// HTTP client.
    client: Client,
    /// Base URL every endpoint is joined onto.
    base: Url,
    /// Whether requests carry a bearer token.
    authenticated: bool,
}

impl fmt::Debug for CircuitClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CircuitClient")
            .field("base", &self.base.as_str())
            .field("token", &self.authenticated.then_some("[REDACTED]"))
            .finish()
    }
}

impl CircuitClient {
    /// Build a client from configuration.
    pub fn new(config: &ClientConfig) -> ClientResult<Self> {
        let base = config.endpoint_url()?;

        let mut headers = header::HeaderMap::new();
        if let Some(token) = &config.token {
            headers.insert(
                header::AUTHORIZATION,
                header::HeaderValue::from_str(&format!("Bearer {token}"))
                    .map_err(|_| ClientError::InvalidToken)?,
            );
        }
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static("application/json"),
        );

        let client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base,
            authenticated: config.token.is_some(),
        })
    }

    /// Base URL.
    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// List template records.
    pub async fn list_circuits(&self) -> ClientResult<Vec<Value>> {
        let url = self.endpoint(&["circuits"])?;
        let body = self.get_json(url, &[]).await?;
        unwrap_list(body, &["circuits", "templates"])
    }

    /// Fetch one template record.
    pub async fn get_circuit(&self, name: &str) -> ClientResult<Value> {
        let url = self.endpoint(&["circuits", name])?;
        self.get_json(url, &[]).await
    }

    /// Materialize a template with the given arguments.
    pub async fn compile_circuit(
        &self,
        name: &str,
        output_format: &str,
        arguments: &Arguments,
    ) -> ClientResult<Value> {
        let url = self.endpoint(&["circuits", name, "compiled"])?;
        let query = [
            ("arguments", serde_json::to_string(arguments)?),
            ("output_format", output_format.to_string()),
        ];
        self.get_json(url, &query).await
    }

    /// List family records.
    pub async fn list_families(&self) -> ClientResult<Vec<Value>> {
        let url = self.endpoint(&["circuit-families"])?;
        let body = self.get_json(url, &[]).await?;
        unwrap_list(body, &["families", "groups"])
    }

    /// Join path segments onto the base URL, percent-encoding each one.
    pub(crate) fn endpoint(&self, segments: &[&str]) -> ClientResult<Url> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::InvalidEndpoint(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json(&self, url: Url, query: &[(&str, String)]) -> ClientResult<Value> {
        debug!("GET {}", url);
        let response = self.client.get(url).query(query).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "no body".to_string());
            return Err(ClientError::Api {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        Ok(response.json().await?)
    }
}

/// Accept a bare array or an object wrapping one under any of `keys`.
fn unwrap_list(body: Value, keys: &[&str]) -> ClientResult<Vec<Value>> {
    match body {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => keys
            .iter()
            .find_map(|k| match map.remove(*k) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| {
                ClientError::UnexpectedResponse(format!(
                    "expected a list under one of {}",
                    keys.join(", ")
                ))
            }),
        other => Err(ClientError::UnexpectedResponse(format!(
            "expected a list, found {other}"
        ))),
    }
}

/// Message from an error body: `{"error": {"message"}}`, `{"message"}`, or
/// the raw text.
fn error_message(body: &str) -> String {
    let parsed: Option<Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("message"))
                .or_else(|| v.get("error"))
                .and_then(Value::as_str)
        })
        .map_or_else(|| body.trim().to_string(), str::to_string)
}
