// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Commands routed from the host to bridged devices.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A command the host can route to a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Turn on.
    On,
    /// Turn off.
    Off,
    /// Set brightness.
    MoveToLevel,
    /// Set brightness, turning on or off as needed.
    MoveToLevelWithOnOff,
    /// Set color temperature.
    MoveToColorTemperature,
    /// Set hue.
    MoveToHue,
    /// Set saturation.
    MoveToSaturation,
    /// Set hue and saturation.
    MoveToHueAndSaturation,
    /// Set XY color.
    MoveToColor,
}

impl Command {
    /// All commands, in cluster order.
    pub const ALL: [Self; 9] = [
        Self::On,
        Self::Off,
        Self::MoveToLevel,
        Self::MoveToLevelWithOnOff,
        Self::MoveToColorTemperature,
        Self::MoveToHue,
        Self::MoveToSaturation,
        Self::MoveToHueAndSaturation,
        Self::MoveToColor,
    ];

    /// Returns the command name as the host spells it.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::On => "on",
            Self::Off => "off",
            Self::MoveToLevel => "moveToLevel",
            Self::MoveToLevelWithOnOff => "moveToLevelWithOnOff",
            Self::MoveToColorTemperature => "moveToColorTemperature",
            Self::MoveToHue => "moveToHue",
            Self::MoveToSaturation => "moveToSaturation",
            Self::MoveToHueAndSaturation => "moveToHueAndSaturation",
            Self::MoveToColor => "moveToColor",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == s)
            .ok_or_else(|| format!("unknown command: {s}"))
    }
}

/// Parameters carried by a command.
///
/// Values are kept raw; range checks happen when a template consumes them,
/// so an invalid value just leaves its token in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandRequest {
    /// Brightness (0-254).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    /// Color temperature in mireds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_temperature_mireds: Option<u32>,
    /// Raw x chromaticity (0-65279).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_x: Option<u32>,
    /// Raw y chromaticity (0-65279).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color_y: Option<u32>,
    /// Hue (0-254).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<u32>,
    /// Saturation (0-254).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub saturation: Option<u32>,
}

/// Kind of bridged device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DeviceKind {
    /// Single-URL button.
    Webhook,
    /// On/off URL pair.
    Outlet,
    /// Light with up to five templates.
    Light,
}

impl fmt::Display for DeviceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Webhook => "webhook",
            Self::Outlet => "outlet",
            Self::Light => "light",
        })
    }
}

/// One command invocation on one device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandContext {
    /// Device kind.
    pub kind: DeviceKind,
    /// Device name.
    pub device_name: String,
    /// Command being executed.
    pub command: Command,
    /// Command parameters.
    pub request: CommandRequest,
}

impl CommandContext {
    /// Creates a context.
    #[must_use]
    pub fn new(
        kind: DeviceKind,
        device_name: impl Into<String>,
        command: Command,
        request: CommandRequest,
    ) -> Self {
        Self {
            kind,
            device_name: device_name.into(),
            command,
            request,
        }
    }

    /// Returns the prefix used for this invocation's log lines, such as
    /// `Webhook light Desk moveToLevel`.
    #[must_use]
    pub fn label(&self) -> String {
        match self.kind {
            DeviceKind::Webhook => format!("Webhook {}", self.device_name),
            DeviceKind::Outlet | DeviceKind::Light => {
                format!("Webhook {} {} {}", self.kind, self.device_name, self.command)
            }
        }
    }
}
