// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Outbound HTTP transport for webhook targets.
//!
//! [`HttpClient`] issues a single request per call, with JSON headers, a
//! per-request timeout and a classified [`FetchError`](crate::error::FetchError)
//! for every failure mode. There is no retry and no connection sharing
//! policy beyond what `reqwest` pools internally.

mod http;

use std::fmt;
use std::str::FromStr;

pub use http::{HttpClient, HttpClientBuilder, fetch};

/// Flat key/value payload sent with a request.
///
/// For GET it becomes the query string, for POST and PUT the JSON body.
pub type FetchData = serde_json::Map<String, serde_json::Value>;

/// HTTP method of a webhook request.
///
/// `Put` carries its payload exactly like `Post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Payload in the query string.
    #[default]
    Get,
    /// Payload as a JSON body.
    Post,
    /// Payload as a JSON body.
    Put,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
        }
    }

    /// Returns true if the payload travels in the request body.
    #[must_use]
    pub const fn has_body(&self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

impl From<HttpMethod> for reqwest::Method {
    fn from(method: HttpMethod) -> Self {
        match method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
        }
    }
}
