// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Value types for lighting commands and attributes.
//!
//! Each type checks its range at construction time. A value that fails the
//! check is simply not substituted into a URL template, so these
//! constructors double as the validity gate of the resolver.
//!
//! # Types
//!
//! - [`Level`] - Brightness (0-254), with percentage conversion
//! - [`ColorTemperature`] - Mireds (1-65279), with Kelvin conversion
//! - [`MiredRange`] - Physical color temperature bounds of a light
//! - [`Hue`] - Hue (0-254), with degree conversion
//! - [`Saturation`] - Saturation (0-254), with percentage conversion
//! - [`Chromaticity`] - CIE x/y coordinate (0-65279), normalized to 0-1
//! - [`RgbColor`] - RGB channels derived from hue and saturation

mod color;
mod level;
mod rgb_color;

pub use color::{Chromaticity, ColorTemperature, Hue, MiredRange, Saturation};
pub use level::Level;
pub use rgb_color::RgbColor;
