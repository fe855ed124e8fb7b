// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Color types for light control.
//!
//! This module provides the raw color values carried by lighting commands
//! and attributes, together with the unit conversions webhook targets
//! expect: mireds to Kelvin, 0-254 hue to degrees, 0-254 saturation to
//! percent, and 16-bit chromaticity to a normalized coordinate.

use std::fmt;

use crate::error::ValueError;

/// Largest raw value accepted for mireds and chromaticity coordinates.
const MAX_RAW_16: u16 = 65279;

/// Largest raw value accepted for hue and saturation.
const MAX_RAW_8: u8 = 254;

/// Color temperature in mireds.
///
/// Lower values are cooler (bluer), higher values warmer. Zero is rejected
/// so the Kelvin conversion is always defined.
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::ColorTemperature;
///
/// let ct = ColorTemperature::new(300).unwrap();
/// assert_eq!(ct.mireds(), 300);
/// assert_eq!(ct.kelvin(), 3333);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ColorTemperature(u16);

impl ColorTemperature {
    /// Minimum mireds value.
    pub const MIN: u16 = 1;

    /// Maximum mireds value.
    pub const MAX: u16 = MAX_RAW_16;

    /// Creates a color temperature value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value is outside [1, 65279].
    pub fn new(mireds: u32) -> Result<Self, ValueError> {
        u16::try_from(mireds)
            .ok()
            .filter(|m| (Self::MIN..=Self::MAX).contains(m))
            .map(Self)
            .ok_or(ValueError::OutOfRange {
                min: u32::from(Self::MIN),
                max: u32::from(Self::MAX),
                actual: mireds,
            })
    }

    /// Returns the value in mireds.
    #[must_use]
    pub const fn mireds(&self) -> u16 {
        self.0
    }

    /// Returns the rounded color temperature in Kelvin.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn kelvin(&self) -> u32 {
        (1_000_000.0 / f64::from(self.0)).round() as u32
    }

    /// Returns true if the value lies within `[min, max]` mireds.
    #[must_use]
    pub fn is_within(&self, min: u16, max: u16) -> bool {
        (min..=max).contains(&self.0)
    }
}

impl fmt::Display for ColorTemperature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}K", self.kelvin())
    }
}

/// Physical color temperature range of a light, in mireds.
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::{ColorTemperature, MiredRange};
///
/// let range = MiredRange::default();
/// assert_eq!((range.min, range.max), (147, 500));
/// assert!(range.contains(ColorTemperature::new(300).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MiredRange {
    /// Coolest supported value.
    pub min: u16,
    /// Warmest supported value.
    pub max: u16,
}

impl MiredRange {
    /// Default coolest value (~6800K).
    pub const DEFAULT_MIN: u16 = 147;

    /// Default warmest value (2000K).
    pub const DEFAULT_MAX: u16 = 500;

    /// Creates a range, swapping the bounds if given in reverse.
    #[must_use]
    pub fn new(min: u16, max: u16) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Returns true if the color temperature lies within the range.
    #[must_use]
    pub fn contains(&self, ct: ColorTemperature) -> bool {
        ct.is_within(self.min, self.max)
    }
}

impl Default for MiredRange {
    fn default() -> Self {
        Self {
            min: Self::DEFAULT_MIN,
            max: Self::DEFAULT_MAX,
        }
    }
}

/// Hue on the 0-254 scale.
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::Hue;
///
/// assert_eq!(Hue::new(180).unwrap().degrees(), 255);
/// assert_eq!(Hue::new(254).unwrap().degrees(), 360);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Hue(u8);

impl Hue {
    /// Creates a hue from its raw value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 254.
    pub fn new(value: u32) -> Result<Self, ValueError> {
        raw_8(value).map(Self)
    }

    /// Returns the raw hue.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the hue in rounded degrees (0-360).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn degrees(&self) -> u16 {
        (f64::from(self.0) * 360.0 / f64::from(MAX_RAW_8)).round() as u16
    }
}

/// Saturation on the 0-254 scale.
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::Saturation;
///
/// assert_eq!(Saturation::new(50).unwrap().percent(), 20);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Saturation(u8);

impl Saturation {
    /// Creates a saturation from its raw value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 254.
    pub fn new(value: u32) -> Result<Self, ValueError> {
        raw_8(value).map(Self)
    }

    /// Returns the raw saturation.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the saturation as a rounded percentage (0-100).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (f64::from(self.0) * 100.0 / f64::from(MAX_RAW_8)).round() as u8
    }
}

/// One CIE 1931 chromaticity coordinate (x or y) in 16-bit raw form.
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::Chromaticity;
///
/// let x = Chromaticity::new(24939).unwrap();
/// assert_eq!(x.to_string(), "0.3805");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chromaticity(u16);

impl Chromaticity {
    /// Creates a coordinate from its raw value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 65279.
    pub fn new(value: u32) -> Result<Self, ValueError> {
        u16::try_from(value)
            .ok()
            .filter(|v| *v <= MAX_RAW_16)
            .map(Self)
            .ok_or(ValueError::OutOfRange {
                min: 0,
                max: u32::from(MAX_RAW_16),
                actual: value,
            })
    }

    /// Returns the raw coordinate.
    #[must_use]
    pub const fn value(&self) -> u16 {
        self.0
    }

    /// Returns `raw / 65536` rounded to four decimals.
    #[must_use]
    pub fn normalized(&self) -> f64 {
        (f64::from(self.0) / 65536.0 * 10_000.0).round() / 10_000.0
    }
}

impl fmt::Display for Chromaticity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.normalized())
    }
}

fn raw_8(value: u32) -> Result<u8, ValueError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= MAX_RAW_8)
        .ok_or(ValueError::OutOfRange {
            min: 0,
            max: u32::from(MAX_RAW_8),
            actual: value,
        })
}
