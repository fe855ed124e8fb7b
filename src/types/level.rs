// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Brightness level in the lighting unit system (0-254).

use std::fmt;

use crate::error::ValueError;

/// Brightness level in its native 0-254 range.
///
/// Lighting clusters express brightness on a 0-254 scale. Webhook targets
/// usually want a percentage, available through [`Level::percent`].
///
/// # Examples
///
/// ```
/// use webhook_bridge::types::Level;
///
/// let level = Level::new(128).unwrap();
/// assert_eq!(level.value(), 128);
/// assert_eq!(level.percent(), 50);
///
/// assert!(Level::new(255).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level(u8);

impl Level {
    /// Maximum raw level.
    pub const MAX_VALUE: u8 = 254;

    /// Full brightness.
    pub const MAX: Self = Self(Self::MAX_VALUE);

    /// Creates a level from a raw value.
    ///
    /// # Errors
    ///
    /// Returns `ValueError::OutOfRange` if value exceeds 254.
    pub fn new(value: u32) -> Result<Self, ValueError> {
        u8::try_from(value)
            .ok()
            .filter(|v| *v <= Self::MAX_VALUE)
            .map(Self)
            .ok_or(ValueError::OutOfRange {
                min: 0,
                max: u32::from(Self::MAX_VALUE),
                actual: value,
            })
    }

    /// Returns the raw level.
    #[must_use]
    pub const fn value(&self) -> u8 {
        self.0
    }

    /// Returns the level as a rounded percentage (0-100).
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (f64::from(self.0) / f64::from(Self::MAX_VALUE) * 100.0).round() as u8
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_valid_range() {
        assert!(Level::new(0).is_ok());
        assert!(Level::new(254).is_ok());
        assert!(Level::new(255).is_err());
        assert!(Level::new(70_000).is_err());
    }

    #[test]
    fn level_percent_rounding() {
        assert_eq!(Level::new(1).unwrap().percent(), 0);
        assert_eq!(Level::new(2).unwrap().percent(), 1);
        assert_eq!(Level::new(128).unwrap().percent(), 50);
        assert_eq!(Level::new(254).unwrap().percent(), 100);
    }

    #[test]
    fn level_out_of_range_error() {
        let err = Level::new(300).unwrap_err();
        assert_eq!(
            err,
            ValueError::OutOfRange {
                min: 0,
                max: 254,
                actual: 300
            }
        );
    }
}
