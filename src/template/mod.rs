// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! URL templates for webhook targets.
//!
//! A template is a URL that may start with a method tag and may contain
//! `${TOKEN}` placeholders:
//!
//! - `GET#`, `POST#`, `PUT#` (or the older `GET#:`, `POST#:`, `PUT#:`)
//!   select the HTTP method; without a tag the method is GET.
//! - Uppercase tokens such as `${LEVEL}` or `${KELVIN}` are filled from the
//!   command being executed.
//! - Lowercase tokens such as `${level}` or `${red}` are filled from the
//!   device's current attributes, read after a short settle delay.
//!
//! A token whose source value is missing or out of range stays in the URL
//! literally.
//!
//! [`UrlResolver`] handles the full grammar and dispatches the request.
//! [`parse_legacy_url`] is the reduced outlet dialect with only
//! `${BRIGHTNESS}` and `${BRIGHTNESS100}`.

mod legacy;
mod resolver;

use std::fmt;

pub use legacy::parse_legacy_url;
pub use resolver::{UrlResolver, dispatch};

use crate::protocol::HttpMethod;

/// Placeholder tokens.
pub mod token {
    /// Raw level from the command (0-254).
    pub const LEVEL: &str = "${LEVEL}";
    /// Level from the command as a percentage.
    pub const LEVEL100: &str = "${LEVEL100}";
    /// Color temperature from the command in Kelvin.
    pub const KELVIN: &str = "${KELVIN}";
    /// Color temperature from the command in mireds.
    pub const MIRED: &str = "${MIRED}";
    /// Normalized x coordinate from the command.
    pub const COLORX: &str = "${COLORX}";
    /// Normalized y coordinate from the command.
    pub const COLORY: &str = "${COLORY}";
    /// Hue from the command in degrees.
    pub const HUE: &str = "${HUE}";
    /// Saturation from the command in percent.
    pub const SATURATION: &str = "${SATURATION}";

    /// Current raw level.
    pub const ATTR_LEVEL: &str = "${level}";
    /// Current level as a percentage.
    pub const ATTR_LEVEL100: &str = "${level100}";
    /// Current color temperature in mireds.
    pub const ATTR_MIRED: &str = "${mired}";
    /// Current color temperature in Kelvin.
    pub const ATTR_KELVIN: &str = "${kelvin}";
    /// Current hue in degrees.
    pub const ATTR_HUE: &str = "${hue}";
    /// Current saturation in percent.
    pub const ATTR_SATURATION: &str = "${saturation}";
    /// Red channel of the current hue/saturation.
    pub const ATTR_RED: &str = "${red}";
    /// Green channel of the current hue/saturation.
    pub const ATTR_GREEN: &str = "${green}";
    /// Blue channel of the current hue/saturation.
    pub const ATTR_BLUE: &str = "${blue}";
    /// Current normalized x coordinate.
    pub const ATTR_COLORX: &str = "${colorX}";
    /// Current normalized y coordinate.
    pub const ATTR_COLORY: &str = "${colorY}";

    /// Raw level, outlet dialect.
    pub const BRIGHTNESS: &str = "${BRIGHTNESS}";
    /// Level percentage, outlet dialect.
    pub const BRIGHTNESS100: &str = "${BRIGHTNESS100}";

    /// Tokens that need a fresh attribute read.
    pub const ATTRIBUTE_SCOPED: [&str; 11] = [
        ATTR_LEVEL,
        ATTR_LEVEL100,
        ATTR_MIRED,
        ATTR_KELVIN,
        ATTR_HUE,
        ATTR_SATURATION,
        ATTR_RED,
        ATTR_GREEN,
        ATTR_BLUE,
        ATTR_COLORX,
        ATTR_COLORY,
    ];
}

/// Method and concrete URL produced from a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedRequest {
    /// HTTP method selected by the tag.
    pub method: HttpMethod,
    /// URL with every resolvable token substituted.
    pub url: String,
}

impl fmt::Display for ResolvedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

// Colon forms first so `GET#:` does not leave a stray colon behind.
const METHOD_TAGS: [(&str, HttpMethod); 6] = [
    ("GET#:", HttpMethod::Get),
    ("POST#:", HttpMethod::Post),
    ("PUT#:", HttpMethod::Put),
    ("GET#", HttpMethod::Get),
    ("POST#", HttpMethod::Post),
    ("PUT#", HttpMethod::Put),
];

/// Splits a leading method tag off a template.
///
/// # Examples
///
/// ```
/// use webhook_bridge::protocol::HttpMethod;
/// use webhook_bridge::template::strip_method_tag;
///
/// assert_eq!(strip_method_tag("POST#http://a/b"), (HttpMethod::Post, "http://a/b"));
/// assert_eq!(strip_method_tag("PUT#:http://a/b"), (HttpMethod::Put, "http://a/b"));
/// assert_eq!(strip_method_tag("http://a/b"), (HttpMethod::Get, "http://a/b"));
/// ```
#[must_use]
pub fn strip_method_tag(template: &str) -> (HttpMethod, &str) {
    METHOD_TAGS
        .iter()
        .find_map(|(tag, method)| template.strip_prefix(tag).map(|rest| (*method, rest)))
        .unwrap_or((HttpMethod::Get, template))
}

/// Returns true if the template reads any current device attribute.
#[must_use]
pub fn has_attribute_tokens(template: &str) -> bool {
    token::ATTRIBUTE_SCOPED.iter().any(|t| template.contains(t))
}

/// Replaces every occurrence of `token` in `url`.
pub(crate) fn substitute(url: &mut String, token: &str, value: impl fmt::Display) {
    if url.contains(token) {
        *url = url.replace(token, &value.to_string());
    }
}
