// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! RGB color type with HSL conversion.
//!
//! Lights report color as hue and saturation. Webhook targets that want
//! RGB channels get them through an HSL conversion at a fixed lightness of
//! 50 %, which maps full saturation to the pure spectral color.

use std::fmt;

use super::{Hue, Saturation};

/// RGB color with 8-bit channels (0-255).
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::{Hue, RgbColor, Saturation};
///
/// let red = RgbColor::from_hue_saturation(Hue::new(0).unwrap(), Saturation::new(254).unwrap());
/// assert_eq!((red.red(), red.green(), red.blue()), (255, 0, 0));
/// assert_eq!(red.to_string(), "#FF0000");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RgbColor {
    red: u8,
    green: u8,
    blue: u8,
}

impl RgbColor {
    /// Lightness used when converting hue/saturation to RGB.
    pub const LIGHTNESS: f64 = 50.0;

    /// Creates a new RGB color.
    #[must_use]
    pub const fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    /// Converts an HSL color to RGB.
    ///
    /// # Arguments
    ///
    /// * `hue` - Hue in degrees (0-360)
    /// * `saturation` - Saturation in percent (0-100)
    /// * `lightness` - Lightness in percent (0-100)
    #[must_use]
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Self {
        let (r, g, b) = hsl_to_rgb(hue, saturation, lightness);
        Self::new(r, g, b)
    }

    /// Converts a light's hue and saturation to RGB at 50 % lightness.
    ///
    /// The raw values are first scaled to rounded degrees and percent.
    #[must_use]
    pub fn from_hue_saturation(hue: Hue, saturation: Saturation) -> Self {
        Self::from_hsl(
            f64::from(hue.degrees()),
            f64::from(saturation.percent()),
            Self::LIGHTNESS,
        )
    }

    /// Returns the red component.
    #[must_use]
    pub const fn red(&self) -> u8 {
        self.red
    }

    /// Returns the green component.
    #[must_use]
    pub const fn green(&self) -> u8 {
        self.green
    }

    /// Returns the blue component.
    #[must_use]
    pub const fn blue(&self) -> u8 {
        self.blue
    }

    /// Returns the color as a hex string without the hash prefix.
    #[must_use]
    pub fn to_hex(&self) -> String {
        format!("{:02X}{:02X}{:02X}", self.red, self.green, self.blue)
    }
}

impl fmt::Display for RgbColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.to_hex())
    }
}

impl From<(u8, u8, u8)> for RgbColor {
    fn from((red, green, blue): (u8, u8, u8)) -> Self {
        Self::new(red, green, blue)
    }
}

/// Converts HSL values to RGB.
///
/// Takes (hue: 0-360, saturation: 0-100, lightness: 0-100)
/// Returns (red: 0-255, green: 0-255, blue: 0-255)
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::many_single_char_names
)]
fn hsl_to_rgb(h: f64, s: f64, l: f64) -> (u8, u8, u8) {
    let h = (h / 360.0).clamp(0.0, 1.0);
    let s = (s / 100.0).clamp(0.0, 1.0);
    let l = (l / 100.0).clamp(0.0, 1.0);

    let to_byte = |channel: f64| (channel * 255.0).round() as u8;

    if s <= 0.0 {
        let gray = to_byte(l);
        return (gray, gray, gray);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    (
        to_byte(hue_to_channel(p, q, h + 1.0 / 3.0)),
        to_byte(hue_to_channel(p, q, h)),
        to_byte(hue_to_channel(p, q, h - 1.0 / 3.0)),
    )
}

fn hue_to_channel(p: f64, q: f64, t: f64) -> f64 {
    let t = if t < 0.0 {
        t + 1.0
    } else if t > 1.0 {
        t - 1.0
    } else {
        t
    };

    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 1.0 / 2.0 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}
