// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `webhook_bridge` - expose HTTP webhooks as smart-home devices.
//!
//! This library is a bridge plugin: it registers virtual switches, outlets
//! and lights with a home-automation host and turns every command the host
//! routes to them into an HTTP request against a third-party device.
//!
//! # Features
//!
//! - **Webhooks**: one URL per device, fired on `on`
//! - **Outlets**: separate on and off URLs
//! - **Lights**: on, off, brightness, color temperature and color URLs
//! - **URL templates**: method tags and `${TOKEN}` placeholders with unit
//!   conversions (level to percent, mireds to Kelvin, hue to degrees,
//!   chromaticity to `0..1`, hue/saturation to RGB)
//!
//! Requests are fire-and-forget: a command returns as soon as its request
//! is spawned, and the outcome is reported through the host log.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use webhook_bridge::host::MemoryHost;
//! use webhook_bridge::{Command, CommandRequest, PlatformConfig, WebhooksPlatform};
//!
//! #[tokio::main]
//! async fn main() -> webhook_bridge::Result<()> {
//!     let config = PlatformConfig::from_json(r#"{
//!         "name": "Webhooks",
//!         "webhooks": {
//!             "Doorbell": { "method": "POST", "httpUrl": "http://hub.local/ring" }
//!         },
//!         "lights": {
//!             "Desk": {
//!                 "onUrl": "http://desk.local/on?b=${level100}",
//!                 "offUrl": "http://desk.local/off",
//!                 "colorTempUrl": "PUT#http://desk.local/ct?k=${KELVIN}"
//!             }
//!         }
//!     }"#)?;
//!
//!     let host = Arc::new(MemoryHost::new("3.4.0"));
//!     let platform = WebhooksPlatform::new(Arc::clone(&host), config)?;
//!     platform.on_start(None).await?;
//!
//!     platform.execute_command("Doorbell", Command::On, CommandRequest::default())?;
//!     platform.execute_command(
//!         "Desk",
//!         Command::MoveToColorTemperature,
//!         CommandRequest { color_temperature_mireds: Some(300), ..CommandRequest::default() },
//!     )?;
//!     Ok(())
//! }
//! ```
//!
//! ## One-off requests
//!
//! ```no_run
//! use std::time::Duration;
//! use webhook_bridge::protocol::{FetchData, HttpMethod, fetch};
//!
//! # async fn example() -> webhook_bridge::Result<()> {
//! let mut data = FetchData::new();
//! data.insert("turn".to_string(), "on".into());
//! let body = fetch("http://plug.local/relay/0", HttpMethod::Get, &data, Duration::from_secs(2)).await?;
//! println!("{body}");
//! # Ok(())
//! # }
//! ```

mod capabilities;
pub mod error;
pub mod host;
pub mod platform;
pub mod protocol;
pub mod template;
pub mod types;

pub use capabilities::Capabilities;
pub use error::{ConfigError, Error, FetchError, HostError, Result, ValueError};
pub use host::{Host, LogLevel, MemoryHost};
pub use platform::{
    Command, CommandContext, CommandRequest, DeviceKind, PlatformConfig, REQUIRED_HOST_VERSION,
    WebhooksPlatform,
};
pub use protocol::{FetchData, HttpClient, HttpMethod};
pub use template::{ResolvedRequest, UrlResolver, parse_legacy_url};
pub use types::{Chromaticity, ColorTemperature, Hue, Level, MiredRange, RgbColor, Saturation};
