// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Platform configuration.
//!
//! The configuration is the JSON document the host stores for the plugin.
//! Keys are camelCase. The `webhooks`, `outlets` and `lights` maps keep
//! their document order, since that order decides serial numbers.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{self, Deserializer, MapAccess};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ConfigError;
use crate::protocol::HttpMethod;
use crate::types::{ColorTemperature, MiredRange};

/// Device type used for plain webhook devices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WebhookDeviceType {
    /// Exposed as an on/off plug-in unit.
    Outlet,
    /// Exposed as an on/off switch.
    #[default]
    Switch,
    /// Exposed as an on/off light.
    Light,
}

/// A single-URL webhook, exposed as a momentary button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebhookConfig {
    /// HTTP method.
    #[serde(default)]
    pub method: HttpMethod,
    /// Target URL.
    #[serde(default)]
    pub http_url: String,
    /// Disabled webhooks are not registered.
    #[serde(default = "enabled_by_default")]
    pub enabled: bool,
    /// Set by the configuration UI's test button.
    #[serde(default)]
    pub test: bool,
}

/// An outlet with separate on and off URLs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutletConfig {
    /// URL template for `on`.
    #[serde(default)]
    pub on_url: String,
    /// URL template for `off`.
    #[serde(default)]
    pub off_url: String,
}

/// A light with up to five URL templates.
///
/// An empty template disables the matching capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LightConfig {
    /// URL template for `on`.
    #[serde(default)]
    pub on_url: String,
    /// URL template for `off`.
    #[serde(default)]
    pub off_url: String,
    /// URL template for level commands.
    #[serde(default)]
    pub brightness_url: String,
    /// URL template for color temperature commands.
    #[serde(default)]
    pub color_temp_url: String,
    /// URL template for hue, saturation and XY commands.
    #[serde(default)]
    pub rgb_url: String,
    /// Coolest supported color temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_mireds: Option<u16>,
    /// Warmest supported color temperature.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_mireds: Option<u16>,
}

impl LightConfig {
    /// Returns the configured color temperature range, falling back to
    /// [`MiredRange::default`] for missing bounds.
    #[must_use]
    pub fn mired_range(&self) -> MiredRange {
        MiredRange::new(
            self.min_mireds.unwrap_or(MiredRange::DEFAULT_MIN),
            self.max_mireds.unwrap_or(MiredRange::DEFAULT_MAX),
        )
    }
}

/// Complete plugin configuration.
///
/// # Examples
///
/// ```
/// use webhook_bridge::platform::PlatformConfig;
///
/// let config = PlatformConfig::from_json(r#"{
///     "name": "Webhooks",
///     "webhooks": {
///         "Doorbell": { "method": "POST", "httpUrl": "http://hub/ring" }
///     },
///     "lights": {
///         "Desk": { "onUrl": "http://desk/on", "offUrl": "http://desk/off" }
///     }
/// }"#).unwrap();
///
/// assert_eq!(config.webhooks[0].0, "Doorbell");
/// assert!(config.webhooks[0].1.enabled);
/// assert_eq!(config.lights.len(), 1);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlatformConfig {
    /// Platform name.
    pub name: String,
    /// Plugin version, reported as the device software version.
    pub version: String,
    /// If non-empty, only devices listed here (by name or serial) are registered.
    pub white_list: Vec<String>,
    /// Devices listed here (by name or serial) are never registered.
    pub black_list: Vec<String>,
    /// Device type for plain webhooks.
    pub device_type: WebhookDeviceType,
    /// Webhooks by name, in document order.
    #[serde(deserialize_with = "ordered_map")]
    pub webhooks: Vec<(String, WebhookConfig)>,
    /// Outlets by name, in document order.
    #[serde(deserialize_with = "ordered_map")]
    pub outlets: Vec<(String, OutletConfig)>,
    /// Lights by name, in document order.
    #[serde(deserialize_with = "ordered_map")]
    pub lights: Vec<(String, LightConfig)>,
    /// Verbose device logging.
    pub debug: bool,
    /// Remove all devices from the host on shutdown.
    pub unregister_on_shutdown: bool,
}

impl PlatformConfig {
    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Json` if the document does not match the
    /// schema, or `ConfigError::Invalid` if a value is out of range.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Converts and validates an already parsed configuration.
    ///
    /// # Errors
    ///
    /// Same as [`from_json`](Self::from_json).
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_value(value)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the webhook with this name.
    #[must_use]
    pub fn webhook(&self, name: &str) -> Option<&WebhookConfig> {
        find(&self.webhooks, name)
    }

    /// Returns the outlet with this name.
    #[must_use]
    pub fn outlet(&self, name: &str) -> Option<&OutletConfig> {
        find(&self.outlets, name)
    }

    /// Returns the light with this name.
    #[must_use]
    pub fn light(&self, name: &str) -> Option<&LightConfig> {
        find(&self.lights, name)
    }

    /// Checks values serde cannot check on its own.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the offending light if a
    /// mireds bound is zero or above 65279.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (name, light) in &self.lights {
            for (key, bound) in [("minMireds", light.min_mireds), ("maxMireds", light.max_mireds)] {
                if let Some(bound) = bound
                    && let Err(err) = ColorTemperature::new(u32::from(bound))
                {
                    return Err(ConfigError::Invalid(format!("light {name}: {key} {err}")));
                }
            }
        }
        Ok(())
    }
}

fn enabled_by_default() -> bool {
    true
}

fn find<'a, T>(entries: &'a [(String, T)], name: &str) -> Option<&'a T> {
    entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
}

/// Deserializes a JSON object into its entries, keeping document order.
///
/// `null` is read as an empty map.
fn ordered_map<'de, D, T>(deserializer: D) -> Result<Vec<(String, T)>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    struct EntriesVisitor<T>(PhantomData<T>);

    impl<'de, T: Deserialize<'de>> de::Visitor<'de> for EntriesVisitor<T> {
        type Value = Vec<(String, T)>;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a map of named entries")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
            let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
            while let Some((name, value)) = map.next_entry::<String, T>()? {
                // A repeated name keeps its first position and takes the last value.
                match entries.iter_mut().find(|(existing, _)| *existing == name) {
                    Some((_, slot)) => *slot = value,
                    None => entries.push((name, value)),
                }
            }
            Ok(entries)
        }
    }

    deserializer.deserialize_any(EntriesVisitor(PhantomData))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn defaults() {
        let config = PlatformConfig::from_json("{}").unwrap();
        assert_eq!(config.device_type, WebhookDeviceType::Switch);
        assert!(config.webhooks.is_empty());
        assert!(!config.unregister_on_shutdown);
    }

    #[test]
    fn maps_keep_document_order() {
        let config = PlatformConfig::from_json(
            r#"{"outlets": {
                "Zeta": {"onUrl": "http://z/on", "offUrl": "http://z/off"},
                "Alpha": {"onUrl": "http://a/on", "offUrl": "http://a/off"},
                "Mid": {"onUrl": "http://m/on", "offUrl": "http://m/off"}
            }}"#,
        )
        .unwrap();

        let names: Vec<_> = config.outlets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Zeta", "Alpha", "Mid"]);
        assert_eq!(config.outlet("Alpha").unwrap().on_url, "http://a/on");
    }

    #[test]
    fn from_value_keeps_order_too() {
        let config = PlatformConfig::from_value(json!({
            "webhooks": {
                "B": {"method": "GET", "httpUrl": "http://b"},
                "A": {"method": "PUT", "httpUrl": "http://a", "enabled": false}
            }
        }))
        .unwrap();

        assert_eq!(config.webhooks[0].0, "B");
        let a = config.webhook("A").unwrap();
        assert_eq!(a.method, HttpMethod::Put);
        assert!(!a.enabled);
    }

    #[test]
    fn repeated_name_keeps_last_value_at_first_position() {
        let config = PlatformConfig::from_json(
            r#"{"outlets": {
                "Fan": {"onUrl": "http://first/on", "offUrl": "http://first/off"},
                "Heater": {"onUrl": "http://h/on", "offUrl": "http://h/off"},
                "Fan": {"onUrl": "http://second/on", "offUrl": "http://second/off"}
            }}"#,
        )
        .unwrap();

        let names: Vec<_> = config.outlets.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, ["Fan", "Heater"]);
        assert_eq!(config.outlet("Fan").unwrap().on_url, "http://second/on");
        assert_eq!(config.outlet("Fan").unwrap().off_url, "http://second/off");
    }

    #[test]
    fn null_map_is_empty() {
        let config = PlatformConfig::from_json(r#"{"lights": null}"#).unwrap();
        assert!(config.lights.is_empty());
    }

    #[test]
    fn light_mired_range_defaults() {
        let light = LightConfig {
            min_mireds: Some(200),
            ..LightConfig::default()
        };
        assert_eq!(light.mired_range(), MiredRange::new(200, 500));
        assert_eq!(LightConfig::default().mired_range(), MiredRange::default());
    }

    #[test]
    fn invalid_mireds_are_rejected() {
        let err = PlatformConfig::from_json(r#"{"lights": {"Desk": {"minMireds": 0}}}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref msg) if msg.contains("Desk")));
    }

    #[test]
    fn unknown_method_is_a_json_error() {
        let err = PlatformConfig::from_json(
            r#"{"webhooks": {"A": {"method": "DELETE", "httpUrl": "http://a"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
    }
}
