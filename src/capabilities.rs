// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Device capabilities.
//!
//! A capability set tells the host which clusters a bridged device exposes
//! and therefore which commands it will route to the platform. For lights
//! the set is derived from which URL templates are configured: a light
//! without a brightness URL is a plain on/off light, and so on.

use crate::platform::{Command, LightConfig};

/// Capabilities of a bridged device.
///
/// # Examples
///
/// ```
/// use webhook_bridge::Capabilities;
///
/// let outlet = Capabilities::on_off();
/// assert!(!outlet.level);
///
/// let bulb = Capabilities::extended_color();
/// assert!(bulb.level && bulb.color_temperature && bulb.color);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
// Each boolean is an independent cluster flag.
#[allow(clippy::struct_excessive_bools)]
pub struct Capabilities {
    /// Supports on/off.
    pub on_off: bool,

    /// Supports brightness control.
    pub level: bool,

    /// Supports color temperature control.
    pub color_temperature: bool,

    /// Supports hue/saturation and XY color control.
    pub color: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self::on_off()
    }
}

impl Capabilities {
    /// On/off only (switches, outlets, webhook buttons).
    #[must_use]
    pub const fn on_off() -> Self {
        Self {
            on_off: true,
            level: false,
            color_temperature: false,
            color: false,
        }
    }

    /// On/off with brightness.
    #[must_use]
    pub const fn dimmable() -> Self {
        Self {
            on_off: true,
            level: true,
            color_temperature: false,
            color: false,
        }
    }

    /// On/off, brightness, color temperature and full color.
    #[must_use]
    pub const fn extended_color() -> Self {
        Self {
            on_off: true,
            level: true,
            color_temperature: true,
            color: true,
        }
    }

    /// Derives the capabilities of a light from its configured templates.
    ///
    /// Color temperature and color both imply brightness, since color
    /// lights always carry a level cluster.
    #[must_use]
    pub fn from_light(config: &LightConfig) -> Self {
        let color_temperature = !config.color_temp_url.trim().is_empty();
        let color = !config.rgb_url.trim().is_empty();
        let level = !config.brightness_url.trim().is_empty() || color_temperature || color;
        Self {
            on_off: true,
            level,
            color_temperature,
            color,
        }
    }

    /// Returns the commands a device with these capabilities accepts.
    #[must_use]
    pub fn commands(&self) -> Vec<Command> {
        let mut commands = Vec::new();
        if self.on_off {
            commands.extend([Command::On, Command::Off]);
        }
        if self.level {
            commands.extend([Command::MoveToLevel, Command::MoveToLevelWithOnOff]);
        }
        if self.color_temperature {
            commands.push(Command::MoveToColorTemperature);
        }
        if self.color {
            commands.extend([
                Command::MoveToHue,
                Command::MoveToSaturation,
                Command::MoveToHueAndSaturation,
                Command::MoveToColor,
            ]);
        }
        commands
    }

    /// Returns true if the device accepts this command.
    #[must_use]
    pub fn supports(&self, command: Command) -> bool {
        self.commands().contains(&command)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn light(brightness: &str, color_temp: &str, rgb: &str) -> LightConfig {
        LightConfig {
            on_url: "http://lamp/on".to_string(),
            off_url: "http://lamp/off".to_string(),
            brightness_url: brightness.to_string(),
            color_temp_url: color_temp.to_string(),
            rgb_url: rgb.to_string(),
            ..LightConfig::default()
        }
    }

    #[test]
    fn default_is_on_off() {
        let caps = Capabilities::default();
        assert!(caps.on_off);
        assert!(!caps.level);
        assert_eq!(caps.commands(), vec![Command::On, Command::Off]);
    }

    #[test]
    fn light_without_extras_is_on_off() {
        assert_eq!(Capabilities::from_light(&light("", "", "")), Capabilities::on_off());
    }

    #[test]
    fn light_with_brightness_is_dimmable() {
        let caps = Capabilities::from_light(&light("http://lamp/${LEVEL}", "", ""));
        assert_eq!(caps, Capabilities::dimmable());
        assert!(caps.supports(Command::MoveToLevelWithOnOff));
        assert!(!caps.supports(Command::MoveToColorTemperature));
    }

    #[test]
    fn color_implies_level() {
        let caps = Capabilities::from_light(&light("", "", "http://lamp/${HUE}"));
        assert!(caps.level);
        assert!(caps.color);
        assert!(!caps.color_temperature);
        assert!(caps.supports(Command::MoveToColor));
    }

    #[test]
    fn full_light_is_extended_color() {
        let caps = Capabilities::from_light(&light("b", "ct", "rgb"));
        assert_eq!(caps, Capabilities::extended_color());
        assert_eq!(caps.commands().len(), 9);
    }
}
