// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory host implementation.

use std::collections::HashMap;

use parking_lot::{Mutex, RwLock};
use serde_json::{Value, json};

use super::{Cluster, DeviceDescriptor, Host, LogLevel, attribute};
use crate::error::HostError;

type AttributeKey = (String, Cluster, String);

/// One message reported through [`Host::log`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogRecord {
    /// Severity.
    pub level: LogLevel,
    /// Message text.
    pub message: String,
}

/// Host that keeps devices, attributes and log lines in memory.
///
/// Registration seeds the attributes of every cluster the device carries.
/// Log lines are recorded and forwarded to `tracing`.
///
/// # Examples
///
/// ```
/// use webhook_bridge::host::{Cluster, Host, LogLevel, MemoryHost};
///
/// let host = MemoryHost::new("3.4.0");
/// host.log(LogLevel::Info, "hello");
/// assert!(host.contains_log(LogLevel::Info, "hello"));
/// assert_eq!(host.read_attribute("Lamp", Cluster::OnOff, "onOff"), None);
/// ```
#[derive(Debug)]
pub struct MemoryHost {
    version: String,
    devices: RwLock<Vec<DeviceDescriptor>>,
    attributes: RwLock<HashMap<AttributeKey, Value>>,
    logs: Mutex<Vec<LogRecord>>,
}

impl MemoryHost {
    /// Creates an empty host reporting `version`.
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            devices: RwLock::new(Vec::new()),
            attributes: RwLock::new(HashMap::new()),
            logs: Mutex::new(Vec::new()),
        }
    }

    /// Returns the registered devices in registration order.
    #[must_use]
    pub fn devices(&self) -> Vec<DeviceDescriptor> {
        self.devices.read().clone()
    }

    /// Returns a registered device by name.
    #[must_use]
    pub fn device(&self, name: &str) -> Option<DeviceDescriptor> {
        self.devices.read().iter().find(|d| d.name == name).cloned()
    }

    /// Sets an attribute directly, as the host's own cluster logic would.
    pub fn set_attribute(&self, device: &str, cluster: Cluster, attribute: &str, value: Value) {
        self.attributes
            .write()
            .insert((device.to_string(), cluster, attribute.to_string()), value);
    }

    /// Returns every recorded log line.
    #[must_use]
    pub fn logs(&self) -> Vec<LogRecord> {
        self.logs.lock().clone()
    }

    /// Returns true if a line at `level` contains `needle`.
    #[must_use]
    pub fn contains_log(&self, level: LogLevel, needle: &str) -> bool {
        self.logs
            .lock()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }

    /// Forgets all recorded log lines.
    pub fn clear_logs(&self) {
        self.logs.lock().clear();
    }

    fn seed_attributes(&self, device: &DeviceDescriptor) {
        let mut attributes = self.attributes.write();
        let mut seed = |cluster: Cluster, name: &str, value: Value| {
            attributes.insert((device.name.clone(), cluster, name.to_string()), value);
        };

        if device.capabilities.on_off {
            seed(Cluster::OnOff, attribute::ON_OFF, json!(false));
        }
        if device.capabilities.level {
            seed(Cluster::LevelControl, attribute::CURRENT_LEVEL, json!(254));
        }
        if device.capabilities.color_temperature {
            let range = device.color_temperature_range.unwrap_or_default();
            seed(Cluster::ColorControl, attribute::COLOR_TEMPERATURE_MIREDS, json!(range.min));
            seed(Cluster::ColorControl, attribute::COLOR_TEMP_PHYSICAL_MIN_MIREDS, json!(range.min));
            seed(Cluster::ColorControl, attribute::COLOR_TEMP_PHYSICAL_MAX_MIREDS, json!(range.max));
        }
        if device.capabilities.color {
            seed(Cluster::ColorControl, attribute::CURRENT_HUE, json!(0));
            seed(Cluster::ColorControl, attribute::CURRENT_SATURATION, json!(0));
            seed(Cluster::ColorControl, attribute::CURRENT_X, json!(0));
            seed(Cluster::ColorControl, attribute::CURRENT_Y, json!(0));
        }
    }
}

impl Host for MemoryHost {
    fn version(&self) -> &str {
        &self.version
    }

    async fn register_device(&self, device: DeviceDescriptor) -> Result<(), HostError> {
        // Held across the check and the push so concurrent registrations of
        // one name cannot both pass the check.
        let mut devices = self.devices.write();
        if devices.iter().any(|d| d.name == device.name) {
            return Err(HostError::DuplicateDevice(device.name));
        }

        tracing::debug!(
            device = %device.name,
            serial = %device.serial_number,
            device_type = ?device.device_type,
            "Registering device"
        );

        self.seed_attributes(&device);
        devices.push(device);
        Ok(())
    }

    async fn unregister_all_devices(&self) -> Result<(), HostError> {
        self.devices.write().clear();
        self.attributes.write().clear();
        Ok(())
    }

    fn read_attribute(&self, device: &str, cluster: Cluster, attribute: &str) -> Option<Value> {
        self.attributes
            .read()
            .get(&(device.to_string(), cluster, attribute.to_string()))
            .cloned()
    }

    async fn write_attribute(
        &self,
        device: &str,
        cluster: Cluster,
        attribute: &str,
        value: Value,
    ) -> Result<(), HostError> {
        if !self.devices.read().iter().any(|d| d.name == device) {
            return Err(HostError::UnknownDevice(device.to_string()));
        }
        self.set_attribute(device, cluster, attribute, value);
        Ok(())
    }

    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!("{message}"),
            LogLevel::Info => tracing::info!("{message}"),
            LogLevel::Notice => tracing::info!(notice = true, "{message}"),
            LogLevel::Warn => tracing::warn!("{message}"),
            LogLevel::Error => tracing::error!("{message}"),
        }

        self.logs.lock().push(LogRecord {
            level,
            message: message.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Capabilities;
    use crate::host::DeviceType;
    use crate::types::MiredRange;

    fn descriptor(name: &str, capabilities: Capabilities) -> DeviceDescriptor {
        DeviceDescriptor {
            name: name.to_string(),
            serial_number: "light1".to_string(),
            product_name: "Webhook Light".to_string(),
            device_type: DeviceType::for_light(&capabilities),
            commands: capabilities.commands(),
            capabilities,
            color_temperature_range: Some(MiredRange::new(153, 454)),
        }
    }

    #[tokio::test]
    async fn register_seeds_cluster_attributes() {
        let host = MemoryHost::new("3.4.0");
        host.register_device(descriptor("Lamp", Capabilities::extended_color()))
            .await
            .unwrap();

        assert_eq!(
            host.read_attribute("Lamp", Cluster::OnOff, attribute::ON_OFF),
            Some(json!(false))
        );
        assert_eq!(
            host.read_attribute("Lamp", Cluster::ColorControl, attribute::COLOR_TEMP_PHYSICAL_MAX_MIREDS),
            Some(json!(454))
        );
        assert!(
            host.read_attribute("Lamp", Cluster::ColorControl, attribute::CURRENT_HUE)
                .is_some()
        );
    }

    #[tokio::test]
    async fn on_off_device_has_no_level() {
        let host = MemoryHost::new("3.4.0");
        host.register_device(descriptor("Plug", Capabilities::on_off()))
            .await
            .unwrap();

        assert_eq!(
            host.read_attribute("Plug", Cluster::LevelControl, attribute::CURRENT_LEVEL),
            None
        );
    }

    #[tokio::test]
    async fn duplicate_registration_is_rejected() {
        let host = MemoryHost::new("3.4.0");
        host.register_device(descriptor("Lamp", Capabilities::on_off()))
            .await
            .unwrap();
        let err = host
            .register_device(descriptor("Lamp", Capabilities::on_off()))
            .await
            .unwrap_err();
        assert_eq!(err, HostError::DuplicateDevice("Lamp".to_string()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_registrations_of_one_name_admit_one() {
        let host = std::sync::Arc::new(MemoryHost::new("3.4.0"));

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let host = std::sync::Arc::clone(&host);
                tokio::spawn(async move {
                    host.register_device(descriptor("Lamp", Capabilities::on_off()))
                        .await
                })
            })
            .collect();

        let mut accepted = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(err) => assert_eq!(err, HostError::DuplicateDevice("Lamp".to_string())),
            }
        }

        assert_eq!(accepted, 1);
        assert_eq!(host.devices().len(), 1);
    }

    #[tokio::test]
    async fn write_requires_registered_device() {
        let host = MemoryHost::new("3.4.0");
        let err = host
            .write_attribute("Ghost", Cluster::OnOff, attribute::ON_OFF, json!(true))
            .await
            .unwrap_err();
        assert_eq!(err, HostError::UnknownDevice("Ghost".to_string()));
    }

    #[tokio::test]
    async fn unregister_clears_everything() {
        let host = MemoryHost::new("3.4.0");
        host.register_device(descriptor("Lamp", Capabilities::dimmable()))
            .await
            .unwrap();
        host.unregister_all_devices().await.unwrap();

        assert!(host.devices().is_empty());
        assert_eq!(
            host.read_attribute("Lamp", Cluster::LevelControl, attribute::CURRENT_LEVEL),
            None
        );
    }

    #[test]
    fn log_lines_are_recorded() {
        let host = MemoryHost::new("3.4.0");
        host.log(LogLevel::Error, "Webhook Lamp failed: boom");

        assert!(host.contains_log(LogLevel::Error, "failed"));
        assert!(!host.contains_log(LogLevel::Notice, "failed"));
        assert_eq!(host.logs().len(), 1);

        host.clear_logs();
        assert!(host.logs().is_empty());
    }
}
