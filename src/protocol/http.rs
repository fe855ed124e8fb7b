// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! HTTP fetch primitive for webhook targets.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_LENGTH, CONTENT_TYPE};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder};
use serde_json::Value;

use crate::error::FetchError;
use crate::protocol::{FetchData, HttpMethod};

const APPLICATION_JSON: &str = "application/json";

/// HTTP client for calling webhook targets.
///
/// Every call is one independent request: GET payloads are encoded in the
/// query string, POST and PUT payloads are sent as a JSON body. Both always
/// carry `Content-Type` and `Accept` set to `application/json`. URLs with an
/// `https` scheme go over TLS.
///
/// Redirects are not followed, so any status of 300 or above is reported as
/// [`FetchError::Status`].
///
/// # Examples
///
/// ```no_run
/// use webhook_bridge::protocol::{FetchData, HttpClient, HttpMethod};
///
/// # async fn example() -> webhook_bridge::Result<()> {
/// let client = HttpClient::new()?;
/// let body = client
///     .fetch("http://192.168.1.155/light/0?turn=on", HttpMethod::Get, &FetchData::new())
///     .await?;
/// println!("{body}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    timeout: Duration,
}

impl HttpClient {
    /// Default request timeout.
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5000);

    /// Creates a client with the default timeout.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be created.
    pub fn new() -> Result<Self, FetchError> {
        HttpClientBuilder::new().build()
    }

    /// Returns a builder for a client with custom settings.
    #[must_use]
    pub fn builder() -> HttpClientBuilder {
        HttpClientBuilder::new()
    }

    /// Returns the timeout applied by [`fetch`](Self::fetch).
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sends one request using the client's timeout and returns the parsed
    /// JSON response.
    ///
    /// # Errors
    ///
    /// See [`fetch_with_timeout`](Self::fetch_with_timeout).
    pub async fn fetch(
        &self,
        url: &str,
        method: HttpMethod,
        data: &FetchData,
    ) -> Result<Value, FetchError> {
        self.fetch_with_timeout(url, method, data, self.timeout)
            .await
    }

    /// Sends one request and returns the parsed JSON response.
    ///
    /// The whole exchange, body included, must finish within `timeout`;
    /// otherwise the request is dropped mid-flight.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Timeout`] if no complete response arrived in time
    /// - [`FetchError::Status`] if the status code is 300 or above
    /// - [`FetchError::Parse`] if the body is not valid JSON
    /// - [`FetchError::Request`] on connection-level failures
    pub async fn fetch_with_timeout(
        &self,
        url: &str,
        method: HttpMethod,
        data: &FetchData,
        timeout: Duration,
    ) -> Result<Value, FetchError> {
        if let Ok(result) = tokio::time::timeout(timeout, self.exchange(url, method, data)).await {
            result
        } else {
            tracing::debug!(url = %url, ?timeout, "Webhook request timed out");
            Err(FetchError::Timeout { timeout })
        }
    }

    async fn exchange(
        &self,
        url: &str,
        method: HttpMethod,
        data: &FetchData,
    ) -> Result<Value, FetchError> {
        tracing::debug!(url = %url, method = %method, "Sending webhook request");

        let response = self.build_request(url, method, data).send().await?;

        let status = response.status().as_u16();
        if status >= 300 {
            // Dropping the response discards the body and closes the connection.
            tracing::debug!(status, "Webhook target returned a failure status");
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;

        tracing::debug!(body = %body, "Received webhook response");

        Ok(serde_json::from_str(&body)?)
    }

    fn build_request(&self, url: &str, method: HttpMethod, data: &FetchData) -> RequestBuilder {
        let request = if method.has_body() {
            let body = Value::Object(data.clone()).to_string();
            self.client
                .request(method.into(), url)
                .header(CONTENT_LENGTH, body.len())
                .body(body)
        } else {
            self.client.request(method.into(), append_query(url, data))
        };

        request
            .header(CONTENT_TYPE, APPLICATION_JSON)
            .header(ACCEPT, APPLICATION_JSON)
    }
}

/// Sends one request with a fresh client.
///
/// Convenience for one-off calls; long-lived callers should keep an
/// [`HttpClient`] around so connections are pooled.
///
/// # Errors
///
/// See [`HttpClient::fetch_with_timeout`].
pub async fn fetch(
    url: &str,
    method: HttpMethod,
    data: &FetchData,
    timeout: Duration,
) -> Result<Value, FetchError> {
    HttpClient::new()?
        .fetch_with_timeout(url, method, data, timeout)
        .await
}

/// Appends `data` to `url` as query parameters.
///
/// Uses `&` when the URL already has a query, `?` otherwise.
fn append_query(url: &str, data: &FetchData) -> String {
    if data.is_empty() {
        return url.to_string();
    }

    let query = data
        .iter()
        .map(|(key, value)| {
            format!(
                "{}={}",
                urlencoding::encode(key),
                urlencoding::encode(&query_value(value))
            )
        })
        .collect::<Vec<_>>()
        .join("&");

    let separator = if url.contains('?') { '&' } else { '?' };
    format!("{url}{separator}{query}")
}

/// Converts a JSON value to its query-string form.
fn query_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => value.to_string(),
    }
}

/// Builder for creating an HTTP client with custom configuration.
#[derive(Debug, Default)]
pub struct HttpClientBuilder {
    timeout: Option<Duration>,
}

impl HttpClientBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the HTTP client.
    ///
    /// # Errors
    ///
    /// Returns error if the underlying HTTP client cannot be created.
    pub fn build(self) -> Result<HttpClient, FetchError> {
        let client = Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(FetchError::from)?;

        Ok(HttpClient {
            client,
            timeout: self.timeout.unwrap_or(HttpClient::DEFAULT_TIMEOUT),
        })
    }
}
