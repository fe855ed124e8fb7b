// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! The webhook platform.
//!
//! [`WebhooksPlatform`] is what the host adapter talks to. It registers one
//! bridged device per configured webhook, outlet and light, and turns every
//! command the host routes back into an HTTP request.
//!
//! # Lifecycle
//!
//! ```text
//! new ──► on_start ──► on_configure ──► execute_command / on_action ... ──► on_shutdown
//! ```
//!
//! # Serial numbers
//!
//! Devices are registered in configuration order. Each kind has its own
//! counter (`webhook1`, `outlet1`, `light1`, ...), advanced only when a
//! device is actually registered.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use webhook_bridge::host::MemoryHost;
//! use webhook_bridge::platform::{Command, CommandRequest, PlatformConfig, WebhooksPlatform};
//!
//! # async fn example() -> webhook_bridge::Result<()> {
//! let config = PlatformConfig::from_json(r#"{
//!     "name": "Webhooks",
//!     "lights": {
//!         "Desk": {
//!             "onUrl": "http://desk/on",
//!             "offUrl": "http://desk/off",
//!             "brightnessUrl": "http://desk/dim?pct=${LEVEL100}"
//!         }
//!     }
//! }"#)?;
//!
//! let host = Arc::new(MemoryHost::new("3.4.0"));
//! let platform = WebhooksPlatform::new(Arc::clone(&host), config)?;
//! platform.on_start(Some("startup")).await?;
//!
//! let request = CommandRequest { level: Some(127), ..CommandRequest::default() };
//! platform.execute_command("Desk", Command::MoveToLevel, request)?;
//! # Ok(())
//! # }
//! ```

mod command;
mod config;

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::RwLock;
use serde_json::{Value, json};

pub use command::{Command, CommandContext, CommandRequest, DeviceKind};
pub use config::{LightConfig, OutletConfig, PlatformConfig, WebhookConfig, WebhookDeviceType};

use crate::Capabilities;
use crate::error::{Error, HostError, Result};
use crate::host::{Cluster, DeviceDescriptor, DeviceType, Host, LogLevel, attribute};
use crate::protocol::HttpClient;
use crate::template::{ResolvedRequest, UrlResolver, dispatch, parse_legacy_url};

/// Oldest host version this platform runs on.
pub const REQUIRED_HOST_VERSION: &str = "3.4.0";

const WEBHOOK_PRODUCT: &str = "Webhook";
const OUTLET_PRODUCT: &str = "Webhook Outlet";
const LIGHT_PRODUCT: &str = "Webhook Light";

#[derive(Debug, Clone)]
struct RegisteredDevice {
    kind: DeviceKind,
    commands: Vec<Command>,
}

/// Bridge platform exposing webhooks as devices.
#[derive(Debug)]
pub struct WebhooksPlatform<H> {
    host: Arc<H>,
    config: PlatformConfig,
    client: HttpClient,
    resolver: UrlResolver<H>,
    devices: RwLock<HashMap<String, RegisteredDevice>>,
}

impl<H: Host> WebhooksPlatform<H> {
    /// Creates the platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::IncompatibleHost` if the host is older than
    /// [`REQUIRED_HOST_VERSION`], or `Error::Fetch` if the HTTP client
    /// cannot be created.
    pub fn new(host: Arc<H>, config: PlatformConfig) -> Result<Self> {
        if !version_at_least(host.version(), REQUIRED_HOST_VERSION) {
            return Err(Error::IncompatibleHost {
                required: REQUIRED_HOST_VERSION.to_string(),
                actual: host.version().to_string(),
            });
        }

        host.log(
            LogLevel::Info,
            &format!("Initializing platform: {}", config.name),
        );

        let client = HttpClient::new()?;
        let resolver = UrlResolver::new(Arc::clone(&host), client.clone());

        host.log(
            LogLevel::Info,
            &format!("Finished initializing platform: {}", config.name),
        );

        Ok(Self {
            host,
            config,
            client,
            resolver,
            devices: RwLock::new(HashMap::new()),
        })
    }

    /// Overrides the delay before light templates read device attributes.
    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.resolver = self.resolver.with_settle_delay(settle_delay);
        self
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &PlatformConfig {
        &self.config
    }

    /// Returns the host.
    #[must_use]
    pub fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Returns the names of the devices registered by this platform.
    #[must_use]
    pub fn device_names(&self) -> Vec<String> {
        let mut names: Vec<_> = self.devices.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// Registers every configured, enabled and listed device.
    ///
    /// # Errors
    ///
    /// Returns `Error::Host` if the host rejects a registration for any
    /// reason other than a duplicate name.
    pub async fn on_start(&self, reason: Option<&str>) -> Result<()> {
        self.host.log(
            LogLevel::Info,
            &format!("onStart called with reason: {}", reason.unwrap_or("none")),
        );

        self.register_webhooks().await?;
        self.register_outlets().await?;
        self.register_lights().await?;
        Ok(())
    }

    /// Resets webhook devices to off.
    ///
    /// Webhooks are momentary, so a persisted `on` state would be stale.
    ///
    /// # Errors
    ///
    /// Returns `Error::Host` if an attribute write fails.
    pub async fn on_configure(&self) -> Result<()> {
        self.host.log(LogLevel::Info, "onConfigure called");

        let webhooks: Vec<String> = self
            .config
            .webhooks
            .iter()
            .map(|(name, _)| name.clone())
            .filter(|name| self.is_registered(name, DeviceKind::Webhook))
            .collect();

        for name in webhooks {
            self.host
                .log(LogLevel::Info, &format!("Configuring device: {name}"));
            self.host
                .write_attribute(&name, Cluster::OnOff, attribute::ON_OFF, json!(false))
                .await?;
        }
        Ok(())
    }

    /// Handles an action from the configuration UI.
    ///
    /// Only `test` does anything: it fires every webhook whose name appears
    /// in `id`. Webhooks come from `form_data` when it carries a non-empty
    /// `webhooks` object (unsaved edits), otherwise from the loaded
    /// configuration. Requests run detached; outcomes are logged as
    /// `Webhook test {name} successful!` or `Webhook test {name} failed: ...`.
    pub fn on_action(
        &self,
        action: &str,
        value: Option<&str>,
        id: Option<&str>,
        form_data: Option<&Value>,
    ) {
        self.host.log(
            LogLevel::Info,
            &format!(
                "onAction called with action: {action} and value: {} and id: {}",
                value.unwrap_or("none"),
                id.unwrap_or("none")
            ),
        );
        self.host.log(
            LogLevel::Debug,
            &format!(
                "onAction called with formData: {}",
                form_data.map_or_else(|| "none".to_string(), Value::to_string)
            ),
        );

        if action != "test" {
            return;
        }
        let Some(id) = id else {
            return;
        };
        let id = id.strip_prefix("root_webhooks_").unwrap_or(id);
        let id = id.strip_suffix("_test").unwrap_or(id);

        let edited = form_data
            .and_then(|data| data.get("webhooks"))
            .and_then(Value::as_object)
            .filter(|webhooks| !webhooks.is_empty());

        if let Some(webhooks) = edited {
            for (name, webhook) in webhooks {
                if !id.contains(name.as_str()) {
                    continue;
                }
                match serde_json::from_value::<WebhookConfig>(webhook.clone()) {
                    Ok(webhook) => self.test_webhook(name, &webhook, "Testing new webhook"),
                    Err(err) => self.host.log(
                        LogLevel::Error,
                        &format!("Webhook test {name} failed: invalid webhook: {err}"),
                    ),
                }
            }
            return;
        }

        for (name, webhook) in &self.config.webhooks {
            if id.contains(name.as_str()) {
                self.test_webhook(name, webhook, "Testing webhook");
            }
        }
    }

    /// Stops the platform.
    ///
    /// # Errors
    ///
    /// Returns `Error::Host` if unregistering fails.
    pub async fn on_shutdown(&self, reason: Option<&str>) -> Result<()> {
        self.host.log(
            LogLevel::Info,
            &format!("onShutdown called with reason: {}", reason.unwrap_or("none")),
        );

        if self.config.unregister_on_shutdown {
            self.host.unregister_all_devices().await?;
        }
        self.devices.write().clear();
        Ok(())
    }

    /// Executes a command routed by the host.
    ///
    /// Returns once the request is spawned; the HTTP outcome only shows up
    /// in the host log. Must be called within a tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns `Error::DeviceNotFound` if no device of this platform has the
    /// name, or `Error::UnsupportedCommand` if the device does not accept
    /// the command.
    pub fn execute_command(
        &self,
        device: &str,
        command: Command,
        request: CommandRequest,
    ) -> Result<()> {
        let registered = self
            .devices
            .read()
            .get(device)
            .cloned()
            .ok_or_else(|| Error::DeviceNotFound(device.to_string()))?;

        if !registered.commands.contains(&command) {
            return Err(Error::UnsupportedCommand {
                device: device.to_string(),
                command: command.to_string(),
            });
        }

        let context = CommandContext::new(registered.kind, device, command, request);
        match registered.kind {
            DeviceKind::Webhook => self.execute_webhook(&context),
            DeviceKind::Outlet => self.execute_outlet(&context),
            DeviceKind::Light => self.execute_light(context),
        }
    }

    fn execute_webhook(&self, context: &CommandContext) -> Result<()> {
        let webhook = self
            .config
            .webhook(&context.device_name)
            .ok_or_else(|| Error::DeviceNotFound(context.device_name.clone()))?;

        self.host.log(
            LogLevel::Info,
            &format!("Webhook {} triggered.", context.device_name),
        );
        self.send(
            context.label(),
            ResolvedRequest {
                method: webhook.method,
                url: webhook.http_url.clone(),
            },
        );
        Ok(())
    }

    fn execute_outlet(&self, context: &CommandContext) -> Result<()> {
        let outlet = self
            .config
            .outlet(&context.device_name)
            .ok_or_else(|| Error::DeviceNotFound(context.device_name.clone()))?;
        let template = if context.command == Command::Off {
            &outlet.off_url
        } else {
            &outlet.on_url
        };

        self.host.log(
            LogLevel::Info,
            &format!(
                "Webhook outlet {} {} triggered.",
                context.device_name, context.command
            ),
        );
        if self.is_blank(context, template) {
            return Ok(());
        }
        self.send(context.label(), parse_legacy_url(template, &context.request));
        Ok(())
    }

    fn execute_light(&self, context: CommandContext) -> Result<()> {
        let light = self
            .config
            .light(&context.device_name)
            .ok_or_else(|| Error::DeviceNotFound(context.device_name.clone()))?;
        let template = match context.command {
            Command::On => &light.on_url,
            Command::Off => &light.off_url,
            Command::MoveToLevel | Command::MoveToLevelWithOnOff => &light.brightness_url,
            Command::MoveToColorTemperature => &light.color_temp_url,
            Command::MoveToHue
            | Command::MoveToSaturation
            | Command::MoveToHueAndSaturation
            | Command::MoveToColor => &light.rgb_url,
        };

        self.host.log(
            LogLevel::Info,
            &format!(
                "Webhook light {} {} triggered.",
                context.device_name, context.command
            ),
        );
        if self.is_blank(&context, template) {
            return Ok(());
        }

        let resolver = self.resolver.clone();
        let template = template.clone();
        tokio::spawn(async move {
            resolver.resolve(&context, &template).await;
        });
        Ok(())
    }

    fn is_blank(&self, context: &CommandContext, template: &str) -> bool {
        let blank = template.trim().is_empty();
        if blank {
            self.host.log(
                LogLevel::Debug,
                &format!("{} has no URL configured, ignoring.", context.label()),
            );
        }
        blank
    }

    fn send(&self, label: String, request: ResolvedRequest) {
        self.host.log(
            LogLevel::Debug,
            &format!("Fetching {} with {}...", request.url, request.method),
        );
        dispatch(Arc::clone(&self.host), self.client.clone(), label, request);
    }

    fn test_webhook(&self, name: &str, webhook: &WebhookConfig, intro: &str) {
        self.host.log(
            LogLevel::Info,
            &format!(
                "{intro} {name} method {} url {}",
                webhook.method, webhook.http_url
            ),
        );
        dispatch(
            Arc::clone(&self.host),
            self.client.clone(),
            format!("Webhook test {name}"),
            ResolvedRequest {
                method: webhook.method,
                url: webhook.http_url.clone(),
            },
        );
    }

    async fn register_webhooks(&self) -> Result<()> {
        let device_type = match self.config.device_type {
            WebhookDeviceType::Outlet => DeviceType::OnOffOutlet,
            WebhookDeviceType::Switch => DeviceType::OnOffSwitch,
            WebhookDeviceType::Light => DeviceType::OnOffLight,
        };

        let mut index = 1;
        for (name, webhook) in &self.config.webhooks {
            self.host.log(
                LogLevel::Debug,
                &format!(
                    "Loading webhook {index} {name} with method {} and url {}",
                    webhook.method, webhook.http_url
                ),
            );
            if !webhook.enabled {
                self.host.log(
                    LogLevel::Info,
                    &format!("Skipping disabled webhook: {name}"),
                );
                continue;
            }
            let serial = format!("webhook{index}");
            if !self.validate_device(&serial, name) {
                continue;
            }

            self.host.log(
                LogLevel::Info,
                &format!(
                    "Registering device: {name} with method {} and url {}",
                    webhook.method, webhook.http_url
                ),
            );
            let descriptor = DeviceDescriptor {
                name: name.clone(),
                serial_number: serial,
                product_name: WEBHOOK_PRODUCT.to_string(),
                device_type,
                capabilities: Capabilities::on_off(),
                commands: vec![Command::On],
                color_temperature_range: None,
            };
            if self.register(descriptor, DeviceKind::Webhook).await? {
                index += 1;
            }
        }
        Ok(())
    }

    async fn register_outlets(&self) -> Result<()> {
        let mut index = 1;
        for (name, _) in &self.config.outlets {
            self.host.log(
                LogLevel::Debug,
                &format!("Loading outlet {index} {name}..."),
            );
            let serial = format!("outlet{index}");
            if !self.validate_device(&serial, name) {
                continue;
            }

            self.host
                .log(LogLevel::Info, &format!("Registering outlet: {name}..."));
            let capabilities = Capabilities::on_off();
            let descriptor = DeviceDescriptor {
                name: name.clone(),
                serial_number: serial,
                product_name: OUTLET_PRODUCT.to_string(),
                device_type: DeviceType::OnOffOutlet,
                commands: capabilities.commands(),
                capabilities,
                color_temperature_range: None,
            };
            if self.register(descriptor, DeviceKind::Outlet).await? {
                index += 1;
            }
        }
        Ok(())
    }

    async fn register_lights(&self) -> Result<()> {
        let mut index = 1;
        for (name, light) in &self.config.lights {
            self.host.log(
                LogLevel::Debug,
                &format!("Loading light {index} {name}..."),
            );
            let serial = format!("light{index}");
            if !self.validate_device(&serial, name) {
                continue;
            }

            self.host
                .log(LogLevel::Info, &format!("Registering light: {name}..."));
            let capabilities = Capabilities::from_light(light);
            let descriptor = DeviceDescriptor {
                name: name.clone(),
                serial_number: serial,
                product_name: LIGHT_PRODUCT.to_string(),
                device_type: DeviceType::for_light(&capabilities),
                commands: capabilities.commands(),
                color_temperature_range: capabilities
                    .color_temperature
                    .then(|| light.mired_range()),
                capabilities,
            };
            if self.register(descriptor, DeviceKind::Light).await? {
                index += 1;
            }
        }
        Ok(())
    }

    /// Registers a device with the host and remembers it.
    ///
    /// Returns `false` if the name was already taken.
    async fn register(&self, descriptor: DeviceDescriptor, kind: DeviceKind) -> Result<bool> {
        if self.devices.read().contains_key(&descriptor.name) {
            self.warn_duplicate(&descriptor.name);
            return Ok(false);
        }

        let name = descriptor.name.clone();
        let commands = descriptor.commands.clone();
        match self.host.register_device(descriptor).await {
            Ok(()) => {
                self.devices
                    .write()
                    .insert(name, RegisteredDevice { kind, commands });
                Ok(true)
            }
            Err(HostError::DuplicateDevice(name)) => {
                self.warn_duplicate(&name);
                Ok(false)
            }
            Err(err) => Err(err.into()),
        }
    }

    fn warn_duplicate(&self, name: &str) {
        self.host.log(
            LogLevel::Warn,
            &format!("Device {name} is already registered, skipping."),
        );
    }

    /// Applies the white and black lists to a device.
    fn validate_device(&self, serial: &str, name: &str) -> bool {
        let listed = |list: &[String]| list.iter().any(|entry| entry == serial || entry == name);

        if !self.config.white_list.is_empty() && !listed(&self.config.white_list) {
            self.host.log(
                LogLevel::Info,
                &format!("Skipping device {name} ({serial}): not in the white list"),
            );
            return false;
        }
        if listed(&self.config.black_list) {
            self.host.log(
                LogLevel::Info,
                &format!("Skipping device {name} ({serial}): in the black list"),
            );
            return false;
        }
        true
    }

    fn is_registered(&self, name: &str, kind: DeviceKind) -> bool {
        self.devices
            .read()
            .get(name)
            .is_some_and(|device| device.kind == kind)
    }
}

/// Compares dotted numeric versions, ignoring pre-release and build
/// suffixes. Missing components count as zero.
fn version_at_least(actual: &str, required: &str) -> bool {
    let parse = |version: &str| -> Vec<u64> {
        version
            .split(['-', '+'])
            .next()
            .unwrap_or_default()
            .split('.')
            .map(|part| part.trim().parse().unwrap_or(0))
            .collect()
    };
    let actual = parse(actual);
    let required = parse(required);

    let len = actual.len().max(required.len());
    (0..len)
        .map(|i| {
            let a = actual.get(i).copied().unwrap_or(0);
            let r = required.get(i).copied().unwrap_or(0);
            a.cmp(&r)
        })
        .find(|ordering| *ordering != Ordering::Equal)
        .is_none_or(|ordering| ordering == Ordering::Greater)
}
