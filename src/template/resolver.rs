// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Full template resolver with attribute reads and dispatch.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use super::{ResolvedRequest, has_attribute_tokens, strip_method_tag, substitute, token};
use crate::host::{Cluster, Host, LogLevel, attribute};
use crate::platform::{CommandContext, CommandRequest};
use crate::protocol::{FetchData, HttpClient};
use crate::types::{Chromaticity, ColorTemperature, Hue, Level, RgbColor, Saturation};

/// Resolves URL templates against a command and the device's state, then
/// sends the request on a detached task.
///
/// # Examples
///
/// ```no_run
/// use std::sync::Arc;
/// use webhook_bridge::host::MemoryHost;
/// use webhook_bridge::platform::{Command, CommandContext, CommandRequest, DeviceKind};
/// use webhook_bridge::protocol::HttpClient;
/// use webhook_bridge::template::UrlResolver;
///
/// # async fn example() -> webhook_bridge::Result<()> {
/// let resolver = UrlResolver::new(Arc::new(MemoryHost::new("3.4.0")), HttpClient::new()?);
/// let context = CommandContext::new(
///     DeviceKind::Light,
///     "Desk",
///     Command::MoveToLevel,
///     CommandRequest { level: Some(128), ..CommandRequest::default() },
/// );
/// let resolved = resolver.resolve(&context, "http://lamp/set?b=${LEVEL100}").await;
/// assert_eq!(resolved.url, "http://lamp/set?b=50");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct UrlResolver<H> {
    host: Arc<H>,
    client: HttpClient,
    settle_delay: Duration,
}

impl<H> Clone for UrlResolver<H> {
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
            client: self.client.clone(),
            settle_delay: self.settle_delay,
        }
    }
}

impl<H: Host> UrlResolver<H> {
    /// Wait before reading attributes, so the host can apply the command.
    pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

    /// Creates a resolver with the default settle delay.
    #[must_use]
    pub fn new(host: Arc<H>, client: HttpClient) -> Self {
        Self {
            host,
            client,
            settle_delay: Self::DEFAULT_SETTLE_DELAY,
        }
    }

    /// Overrides the settle delay.
    #[must_use]
    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Returns the settle delay.
    #[must_use]
    pub fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    /// Resolves `template` and sends the request.
    ///
    /// Returns as soon as the request is spawned; the outcome is reported
    /// through [`Host::log`] only.
    pub async fn resolve(&self, context: &CommandContext, template: &str) -> ResolvedRequest {
        let resolved = self.render(context, template).await;

        self.host.log(
            LogLevel::Debug,
            &format!("Fetching {} with {}...", resolved.url, resolved.method),
        );
        dispatch(
            Arc::clone(&self.host),
            self.client.clone(),
            context.label(),
            resolved.clone(),
        );

        resolved
    }

    /// Resolves `template` without sending anything.
    ///
    /// Waits the settle delay first when the template reads attributes.
    pub async fn render(&self, context: &CommandContext, template: &str) -> ResolvedRequest {
        let (method, rest) = strip_method_tag(template);
        let mut url = rest.to_string();

        apply_request_tokens(&mut url, &context.request);

        if has_attribute_tokens(template) {
            tokio::time::sleep(self.settle_delay).await;
            self.apply_attribute_tokens(&mut url, &context.device_name);
        }

        ResolvedRequest { method, url }
    }

    fn apply_attribute_tokens(&self, url: &mut String, device: &str) {
        if contains_any(url, &[token::ATTR_LEVEL, token::ATTR_LEVEL100]) {
            let level = self
                .read_u32(device, Cluster::LevelControl, attribute::CURRENT_LEVEL)
                .and_then(|v| Level::new(v).ok());
            if let Some(level) = level {
                substitute(url, token::ATTR_LEVEL, level.value());
                substitute(url, token::ATTR_LEVEL100, level.percent());
            }
        }

        if contains_any(url, &[token::ATTR_MIRED, token::ATTR_KELVIN])
            && let Some(ct) = self.read_color_temperature(device)
        {
            substitute(url, token::ATTR_MIRED, ct.mireds());
            substitute(url, token::ATTR_KELVIN, ct.kelvin());
        }

        if contains_any(
            url,
            &[
                token::ATTR_HUE,
                token::ATTR_SATURATION,
                token::ATTR_RED,
                token::ATTR_GREEN,
                token::ATTR_BLUE,
                token::ATTR_COLORX,
                token::ATTR_COLORY,
            ],
        ) {
            self.apply_color_tokens(url, device);
        }
    }

    fn apply_color_tokens(&self, url: &mut String, device: &str) {
        let hue = self
            .read_u32(device, Cluster::ColorControl, attribute::CURRENT_HUE)
            .and_then(|v| Hue::new(v).ok());
        let saturation = self
            .read_u32(device, Cluster::ColorControl, attribute::CURRENT_SATURATION)
            .and_then(|v| Saturation::new(v).ok());

        if let Some(hue) = hue {
            substitute(url, token::ATTR_HUE, hue.degrees());
        }
        if let Some(saturation) = saturation {
            substitute(url, token::ATTR_SATURATION, saturation.percent());
        }
        if let (Some(hue), Some(saturation)) = (hue, saturation) {
            let rgb = RgbColor::from_hue_saturation(hue, saturation);
            substitute(url, token::ATTR_RED, rgb.red());
            substitute(url, token::ATTR_GREEN, rgb.green());
            substitute(url, token::ATTR_BLUE, rgb.blue());
        }

        let x = self
            .read_u32(device, Cluster::ColorControl, attribute::CURRENT_X)
            .and_then(|v| Chromaticity::new(v).ok());
        let y = self
            .read_u32(device, Cluster::ColorControl, attribute::CURRENT_Y)
            .and_then(|v| Chromaticity::new(v).ok());
        if let Some(x) = x {
            substitute(url, token::ATTR_COLORX, x);
        }
        if let Some(y) = y {
            substitute(url, token::ATTR_COLORY, y);
        }
    }

    /// Reads the current color temperature, bounded by the physical range
    /// when the device reports one.
    fn read_color_temperature(&self, device: &str) -> Option<ColorTemperature> {
        let bound = |name: &str, default: u16| {
            self.read_u32(device, Cluster::ColorControl, name)
                .and_then(|v| u16::try_from(v).ok())
                .unwrap_or(default)
        };
        let min = bound(
            attribute::COLOR_TEMP_PHYSICAL_MIN_MIREDS,
            ColorTemperature::MIN,
        );
        let max = bound(
            attribute::COLOR_TEMP_PHYSICAL_MAX_MIREDS,
            ColorTemperature::MAX,
        );

        self.read_u32(device, Cluster::ColorControl, attribute::COLOR_TEMPERATURE_MIREDS)
            .and_then(|v| ColorTemperature::new(v).ok())
            .filter(|ct| ct.is_within(min, max))
    }

    fn read_u32(&self, device: &str, cluster: Cluster, name: &str) -> Option<u32> {
        self.host
            .read_attribute(device, cluster, name)?
            .as_u64()
            .and_then(|v| u32::try_from(v).ok())
    }
}

/// Sends a resolved request on a detached task and logs the outcome.
///
/// Success is logged at notice level as `{label} successful!`, followed by
/// the response body at debug level. Failure is logged at error level as
/// `{label} failed: {error}`.
pub fn dispatch<H: Host>(
    host: Arc<H>,
    client: HttpClient,
    label: String,
    request: ResolvedRequest,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        match client
            .fetch(&request.url, request.method, &FetchData::new())
            .await
        {
            Ok(body) => {
                host.log(LogLevel::Notice, &format!("{label} successful!"));
                host.log(LogLevel::Debug, &format!("{label} response: {body}"));
            }
            Err(err) => {
                host.log(LogLevel::Error, &format!("{label} failed: {err}"));
            }
        }
    })
}

fn apply_request_tokens(url: &mut String, request: &CommandRequest) {
    if let Some(level) = request.level.and_then(|v| Level::new(v).ok()) {
        substitute(url, token::LEVEL, level.value());
        substitute(url, token::LEVEL100, level.percent());
    }
    if let Some(ct) = request
        .color_temperature_mireds
        .and_then(|v| ColorTemperature::new(v).ok())
    {
        substitute(url, token::KELVIN, ct.kelvin());
        substitute(url, token::MIRED, ct.mireds());
    }
    if let Some(x) = request.color_x.and_then(|v| Chromaticity::new(v).ok()) {
        substitute(url, token::COLORX, x);
    }
    if let Some(y) = request.color_y.and_then(|v| Chromaticity::new(v).ok()) {
        substitute(url, token::COLORY, y);
    }
    if let Some(hue) = request.hue.and_then(|v| Hue::new(v).ok()) {
        substitute(url, token::HUE, hue.degrees());
    }
    if let Some(saturation) = request.saturation.and_then(|v| Saturation::new(v).ok()) {
        substitute(url, token::SATURATION, saturation.percent());
    }
}

fn contains_any(url: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|t| url.contains(t))
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::host::MemoryHost;
    use crate::platform::{Command, DeviceKind};

    fn resolver(host: &Arc<MemoryHost>) -> UrlResolver<MemoryHost> {
        UrlResolver::new(Arc::clone(host), HttpClient::new().unwrap())
            .with_settle_delay(Duration::from_millis(1))
    }

    fn context(request: CommandRequest) -> CommandContext {
        CommandContext::new(DeviceKind::Light, "Lamp", Command::MoveToLevel, request)
    }

    #[test]
    fn request_tokens_are_converted() {
        let mut url = "${LEVEL}/${LEVEL100}/${KELVIN}/${MIRED}/${HUE}/${SATURATION}".to_string();
        apply_request_tokens(
            &mut url,
            &CommandRequest {
                level: Some(128),
                color_temperature_mireds: Some(300),
                hue: Some(180),
                saturation: Some(50),
                ..CommandRequest::default()
            },
        );
        assert_eq!(url, "128/50/3333/300/255/20");
    }

    #[test]
    fn invalid_request_values_leave_tokens() {
        let mut url = "${LEVEL}/${KELVIN}/${COLORX}/${HUE}".to_string();
        apply_request_tokens(
            &mut url,
            &CommandRequest {
                level: Some(255),
                color_temperature_mireds: Some(0),
                color_x: Some(70_000),
                hue: Some(300),
                ..CommandRequest::default()
            },
        );
        assert_eq!(url, "${LEVEL}/${KELVIN}/${COLORX}/${HUE}");
    }

    #[tokio::test]
    async fn render_reads_attributes_after_settle() {
        let host = Arc::new(MemoryHost::new("3.4.0"));
        host.set_attribute("Lamp", Cluster::LevelControl, attribute::CURRENT_LEVEL, json!(254));
        host.set_attribute("Lamp", Cluster::ColorControl, attribute::CURRENT_HUE, json!(0));
        host.set_attribute(
            "Lamp",
            Cluster::ColorControl,
            attribute::CURRENT_SATURATION,
            json!(254),
        );

        let resolved = resolver(&host)
            .render(
                &context(CommandRequest::default()),
                "POST#http://lamp?l=${level100}&c=${red},${green},${blue}",
            )
            .await;

        assert_eq!(resolved.method, crate::protocol::HttpMethod::Post);
        assert_eq!(resolved.url, "http://lamp?l=100&c=255,0,0");
    }

    #[tokio::test]
    async fn color_temperature_outside_physical_range_is_left() {
        let host = Arc::new(MemoryHost::new("3.4.0"));
        host.set_attribute(
            "Lamp",
            Cluster::ColorControl,
            attribute::COLOR_TEMPERATURE_MIREDS,
            json!(600),
        );
        host.set_attribute(
            "Lamp",
            Cluster::ColorControl,
            attribute::COLOR_TEMP_PHYSICAL_MAX_MIREDS,
            json!(500),
        );

        let resolved = resolver(&host)
            .render(&context(CommandRequest::default()), "http://lamp?k=${kelvin}")
            .await;
        assert_eq!(resolved.url, "http://lamp?k=${kelvin}");
    }

    #[tokio::test]
    async fn missing_attributes_leave_tokens() {
        let host = Arc::new(MemoryHost::new("3.4.0"));
        let resolved = resolver(&host)
            .render(
                &context(CommandRequest::default()),
                "http://lamp?x=${colorX}&y=${colorY}&r=${red}",
            )
            .await;
        assert_eq!(resolved.url, "http://lamp?x=${colorX}&y=${colorY}&r=${red}");
    }
}
