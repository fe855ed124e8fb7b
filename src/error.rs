// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the webhook bridge.
//!
//! This module provides the error hierarchy used across the crate: value
//! validation, webhook requests, configuration loading, and host
//! interaction.

use std::time::Duration;

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurred during value validation.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// A webhook request failed.
    #[error("webhook error: {0}")]
    Fetch(#[from] FetchError),

    /// The platform configuration could not be loaded.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The host rejected an operation.
    #[error("host error: {0}")]
    Host(#[from] HostError),

    /// The host is older than the minimum version this plugin supports.
    #[error(
        "This plugin requires host version >= \"{required}\" (found \"{actual}\"). Please update the host to the latest version."
    )]
    IncompatibleHost {
        /// The minimum supported version.
        required: String,
        /// The version reported by the host.
        actual: String,
    },

    /// No registered device carries this name.
    #[error("device not found: {0}")]
    DeviceNotFound(String),

    /// The device does not handle this command.
    #[error("device {device} does not support command {command}")]
    UnsupportedCommand {
        /// The device name.
        device: String,
        /// The command name.
        command: String,
    },
}

/// Errors related to value validation and constraints.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A numeric value is outside the allowed range.
    #[error("value {actual} is out of range [{min}, {max}]")]
    OutOfRange {
        /// Minimum allowed value.
        min: u32,
        /// Maximum allowed value.
        max: u32,
        /// The actual value that was provided.
        actual: u32,
    },
}

/// Classified failure of a single webhook request.
///
/// Exactly one of these is produced per failed call.
#[derive(Debug, Error)]
pub enum FetchError {
    /// No complete response arrived within the configured window.
    #[error("Request timed out after {:.1} seconds", .timeout.as_secs_f64())]
    Timeout {
        /// The configured timeout.
        timeout: Duration,
    },

    /// The server answered with a status code of 300 or above.
    #[error("Request failed with status code: {0}")]
    Status(u16),

    /// The response body is not valid JSON.
    #[error("Failed to parse response JSON: {0}")]
    Parse(#[from] serde_json::Error),

    /// Connection-level failure (refused, reset, DNS, invalid URL).
    ///
    /// `message` carries the innermost cause so that host log lines name
    /// the actual failure instead of reqwest's generic summary.
    #[error("Request failed: {message}")]
    Request {
        /// The reqwest summary followed by its root cause.
        message: String,
        /// The underlying client error.
        #[source]
        source: reqwest::Error,
    },
}

impl From<reqwest::Error> for FetchError {
    fn from(source: reqwest::Error) -> Self {
        let message = describe_with_cause(&source);
        Self::Request { message, source }
    }
}

/// Formats an error followed by the innermost error of its source chain.
fn describe_with_cause(err: &dyn std::error::Error) -> String {
    let summary = err.to_string();
    let mut innermost = None;
    let mut cause = err.source();
    while let Some(inner) = cause {
        innermost = Some(inner);
        cause = inner.source();
    }

    match innermost.map(ToString::to_string) {
        Some(root) if !root.is_empty() && !summary.contains(&root) => format!("{summary}: {root}"),
        _ => summary,
    }
}

/// Errors raised while loading the platform configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration is not valid JSON or does not match the schema.
    #[error("invalid configuration JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but is semantically invalid.
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Errors reported by a [`Host`](crate::host::Host) implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HostError {
    /// A device with this name is already registered.
    #[error("device {0} is already registered")]
    DuplicateDevice(String),

    /// The device is not registered with the host.
    #[error("unknown device: {0}")]
    UnknownDevice(String),

    /// The host refused the operation for a reason of its own, such as a
    /// bridge that has no room for another device.
    ///
    /// The platform treats it as fatal and returns it from the lifecycle
    /// call that triggered it. [`MemoryHost`](crate::host::MemoryHost)
    /// never produces it.
    #[error("operation rejected: {0}")]
    Rejected(String),
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;
