// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Interface to the bridge host.
//!
//! The host owns the device registry, attribute storage and the user-facing
//! log. The platform only talks to it through the narrow [`Host`] trait:
//! register devices, read and write named attributes, and report messages.
//!
//! [`MemoryHost`] is an in-process implementation that keeps everything in
//! memory. It is what the tests run against and is handy for embedding the
//! platform without a real bridge.

mod memory;

use std::fmt;

use serde_json::Value;

pub use memory::{LogRecord, MemoryHost};

use crate::Capabilities;
use crate::error::HostError;
use crate::platform::Command;
use crate::types::MiredRange;

/// Attribute names used by the platform, keyed by cluster.
pub mod attribute {
    /// `onOff.onOff`
    pub const ON_OFF: &str = "onOff";
    /// `levelControl.currentLevel`
    pub const CURRENT_LEVEL: &str = "currentLevel";
    /// `colorControl.colorTemperatureMireds`
    pub const COLOR_TEMPERATURE_MIREDS: &str = "colorTemperatureMireds";
    /// `colorControl.colorTempPhysicalMinMireds`
    pub const COLOR_TEMP_PHYSICAL_MIN_MIREDS: &str = "colorTempPhysicalMinMireds";
    /// `colorControl.colorTempPhysicalMaxMireds`
    pub const COLOR_TEMP_PHYSICAL_MAX_MIREDS: &str = "colorTempPhysicalMaxMireds";
    /// `colorControl.currentHue`
    pub const CURRENT_HUE: &str = "currentHue";
    /// `colorControl.currentSaturation`
    pub const CURRENT_SATURATION: &str = "currentSaturation";
    /// `colorControl.currentX`
    pub const CURRENT_X: &str = "currentX";
    /// `colorControl.currentY`
    pub const CURRENT_Y: &str = "currentY";
}

/// Severity of a message reported to the host log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Diagnostic detail.
    Debug,
    /// Normal operation.
    Info,
    /// Noteworthy outcome, such as a successful webhook call.
    Notice,
    /// Something was skipped or ignored.
    Warn,
    /// An operation failed.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Notice => "notice",
            Self::Warn => "warn",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Attribute group on a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cluster {
    /// On/off state.
    OnOff,
    /// Brightness.
    LevelControl,
    /// Color temperature, hue/saturation and XY color.
    ColorControl,
}

impl Cluster {
    /// Returns the cluster name as the host spells it.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OnOff => "onOff",
            Self::LevelControl => "levelControl",
            Self::ColorControl => "colorControl",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Device type a bridged endpoint is exposed as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceType {
    /// On/off switch.
    OnOffSwitch,
    /// On/off plug-in unit.
    OnOffOutlet,
    /// Light with on/off only.
    OnOffLight,
    /// Light with brightness.
    DimmableLight,
    /// Light with brightness and color temperature.
    ColorTemperatureLight,
    /// Light with brightness, color temperature and color.
    ExtendedColorLight,
}

impl DeviceType {
    /// Picks the light device type matching a capability set.
    #[must_use]
    pub fn for_light(capabilities: &Capabilities) -> Self {
        if capabilities.color {
            Self::ExtendedColorLight
        } else if capabilities.color_temperature {
            Self::ColorTemperatureLight
        } else if capabilities.level {
            Self::DimmableLight
        } else {
            Self::OnOffLight
        }
    }
}

/// Everything the host needs to expose a bridged device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceDescriptor {
    /// Display name, also the key commands are routed by.
    pub name: String,
    /// Serial number (`webhook1`, `outlet1`, `light1`, ...).
    pub serial_number: String,
    /// Product name shown by the host.
    pub product_name: String,
    /// Exposed device type.
    pub device_type: DeviceType,
    /// Clusters the device carries.
    pub capabilities: Capabilities,
    /// Commands the host should route to the platform.
    pub commands: Vec<Command>,
    /// Physical color temperature range, for lights that support it.
    pub color_temperature_range: Option<MiredRange>,
}

/// Capability interface provided by the bridge host.
///
/// Implementations must be shareable across tasks: webhook requests run on
/// detached tasks that keep an `Arc` of the host.
pub trait Host: Send + Sync + 'static {
    /// Returns the host version, compared against the plugin's minimum.
    fn version(&self) -> &str;

    /// Registers a bridged device.
    fn register_device(
        &self,
        device: DeviceDescriptor,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Removes every device this plugin registered.
    fn unregister_all_devices(&self) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Reads the current value of an attribute, if the device has it.
    fn read_attribute(&self, device: &str, cluster: Cluster, attribute: &str) -> Option<Value>;

    /// Writes an attribute on a device.
    fn write_attribute(
        &self,
        device: &str,
        cluster: Cluster,
        attribute: &str,
        value: Value,
    ) -> impl Future<Output = Result<(), HostError>> + Send;

    /// Reports a message to the host log.
    fn log(&self, level: LogLevel, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn light_device_type_follows_capabilities() {
        assert_eq!(
            DeviceType::for_light(&Capabilities::on_off()),
            DeviceType::OnOffLight
        );
        assert_eq!(
            DeviceType::for_light(&Capabilities::dimmable()),
            DeviceType::DimmableLight
        );
        let ct_only = Capabilities {
            color: false,
            ..Capabilities::extended_color()
        };
        assert_eq!(
            DeviceType::for_light(&ct_only),
            DeviceType::ColorTemperatureLight
        );
        assert_eq!(
            DeviceType::for_light(&Capabilities::extended_color()),
            DeviceType::ExtendedColorLight
        );
    }

    #[test]
    fn names_match_host_spelling() {
        assert_eq!(Cluster::LevelControl.to_string(), "levelControl");
        assert_eq!(LogLevel::Notice.to_string(), "notice");
    }
}
