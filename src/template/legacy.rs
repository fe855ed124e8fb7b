// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

use super::{ResolvedRequest, strip_method_tag, substitute, token};
use crate::platform::CommandRequest;
use crate::types::Level;

/// Resolves an outlet template.
///
/// Only the method tag, `${BRIGHTNESS}` and `${BRIGHTNESS100}` are
/// understood. No attributes are read and nothing is sent; the caller
/// dispatches the result.
///
/// # Examples
///
/// ```
/// use webhook_bridge::platform::CommandRequest;
/// use webhook_bridge::protocol::HttpMethod;
/// use webhook_bridge::template::parse_legacy_url;
///
/// let request = CommandRequest { level: Some(127), ..CommandRequest::default() };
/// let resolved = parse_legacy_url("POST#http://plug/set?b=${BRIGHTNESS100}", &request);
/// assert_eq!(resolved.method, HttpMethod::Post);
/// assert_eq!(resolved.url, "http://plug/set?b=50");
/// ```
#[must_use]
pub fn parse_legacy_url(template: &str, request: &CommandRequest) -> ResolvedRequest {
    let (method, rest) = strip_method_tag(template);
    let mut url = rest.to_string();

    if let Some(level) = request.level.and_then(|l| Level::new(l).ok()) {
        substitute(&mut url, token::BRIGHTNESS, level.value());
        substitute(&mut url, token::BRIGHTNESS100, level.percent());
    }

    ResolvedRequest { method, url }
}
