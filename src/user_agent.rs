use std::borrow::Cow;

use aho_corasick::AhoCorasick;

use super::db;
use super::error::{Error, Result};
use super::parser::{compile_regex, CompiledParser};
use super::parser_data::*;
use super::types::*;

/// Tokens naming an Apple handheld. Their presence switches on the iOS
/// browser relabeling and pins the engine to WebKit.
const APPLE_DEVICE_TOKENS: [&str; 3] = ["iPhone", "iPad", "iPod"];

/// Classifies a raw User-Agent string with the pattern rule lists, plus the
/// declared platform and touch-point count for the iPadOS masquerade.
pub(crate) struct UserAgentResolver {
    browser_parser: CompiledParser<BrowserData>,
    ios_browser_parser: CompiledParser<BrowserData>,
    os_parser: CompiledParser<OsData>,
    engine_parser: CompiledParser<EngineData>,
    device_parser: CompiledParser<DeviceData>,
    apple_devices: AhoCorasick,
}

impl UserAgentResolver {
    pub fn build(
        browsers: Vec<db::BrowserEntry>,
        ios_browsers: Vec<db::BrowserEntry>,
        oss: Vec<db::OsEntry>,
        engines: Vec<db::EngineEntry>,
        devices: Vec<db::DeviceEntry>,
    ) -> Result<Self> {
        let browser_parser = build_browser_parser(browsers)?;
        let ios_browser_parser = build_browser_parser(ios_browsers)?;

        let os_parser = CompiledParser::build(
            oss.into_iter()
                .map(|o| -> Result<_> {
                    let version = match o.version {
                        Some(v) => Some(OsVersionData {
                            regex: compile_regex(&v.regex)?,
                            separator: v.separator.filter(|s| !s.is_empty()),
                            aliases: v.aliases,
                        }),
                        None => None,
                    };
                    // No regex: the empty pattern matches anything and the
                    // conditions decide.
                    Ok((
                        o.regex.unwrap_or_default(),
                        OsData {
                            name: o.name,
                            version,
                            conditions: Conditions::compile(o.conditions)?,
                        },
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        )?;

        let engine_parser = CompiledParser::build(
            engines
                .into_iter()
                .map(|e| -> Result<_> {
                    Ok((
                        e.regex,
                        EngineData {
                            name: e.name,
                            conditions: Conditions::compile(e.conditions)?,
                        },
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        )?;

        let device_parser = CompiledParser::build(
            devices
                .into_iter()
                .map(|d| -> Result<_> {
                    let kind = DeviceType::from_str(&d.device)
                        .ok_or_else(|| Error::UnknownDeviceType(d.device.clone()))?;
                    Ok((
                        d.regex.unwrap_or_default(),
                        DeviceData {
                            kind,
                            conditions: Conditions::compile(d.conditions)?,
                        },
                    ))
                })
                .collect::<Result<Vec<_>>>()?,
        )?;

        tracing::debug!(
            browsers = browser_parser.len(),
            ios_browsers = ios_browser_parser.len(),
            oss = os_parser.len(),
            engines = engine_parser.len(),
            devices = device_parser.len(),
            "built user agent rules"
        );

        Ok(Self {
            browser_parser,
            ios_browser_parser,
            os_parser,
            engine_parser,
            device_parser,
            apple_devices: AhoCorasick::new(APPLE_DEVICE_TOKENS)?,
        })
    }

    /// Classify `ua`. Never fails: whatever no rule recognises is `Unknown`,
    /// and the device falls back to desktop.
    pub fn resolve<'a>(
        &'a self,
        ua: &'a str,
        platform: &'a str,
        max_touch_points: u32,
    ) -> ClassificationResult<'a> {
        let ctx = MatchContext {
            user_agent: ua,
            platform,
            max_touch_points,
            apple_device: self.apple_devices.is_match(ua),
        };

        ClassificationResult {
            browser: self.detect_browser(&ctx),
            os: self.detect_os(&ctx),
            device_type: self.detect_device(&ctx),
            engine: self.detect_engine(&ctx),
            user_agent: Cow::Borrowed(ua),
            platform: Cow::Borrowed(platform),
            source: Source::UserAgent,
        }
    }

    fn detect_browser<'a>(&'a self, ctx: &MatchContext<'a>) -> NameVersion<'a> {
        let mut browser = match self.browser_parser.match_first(ctx.user_agent) {
            Some(m) => NameVersion {
                name: Cow::Borrowed(m.data.name.as_str()),
                version: m.group(1).map(Cow::Borrowed),
            },
            None => NameVersion::unknown(),
        };

        // On iOS every browser is WebKit underneath and most would otherwise
        // come out as Safari; the app token names the real one.
        if ctx.apple_device {
            if let Some(m) = self.ios_browser_parser.match_first(ctx.user_agent) {
                browser.name = Cow::Borrowed(m.data.name.as_str());
            }
        }

        browser
    }

    fn detect_os<'a>(&'a self, ctx: &MatchContext<'a>) -> NameVersion<'a> {
        let Some(m) = self
            .os_parser
            .match_first_where(ctx.user_agent, |d| d.conditions.allows(ctx))
        else {
            return NameVersion::unknown();
        };

        NameVersion {
            name: Cow::Borrowed(m.data.name.as_str()),
            version: m
                .data
                .version
                .as_ref()
                .and_then(|v| os_version(v, ctx.user_agent)),
        }
    }

    fn detect_engine<'a>(&'a self, ctx: &MatchContext<'a>) -> Cow<'a, str> {
        self.engine_parser
            .match_first_where(ctx.user_agent, |d| d.conditions.allows(ctx))
            .map(|m| Cow::Borrowed(m.data.name.as_str()))
            .unwrap_or(Cow::Borrowed(UNKNOWN))
    }

    fn detect_device(&self, ctx: &MatchContext<'_>) -> DeviceType {
        self.device_parser
            .match_first_where(ctx.user_agent, |d| d.conditions.allows(ctx))
            .map(|m| m.data.kind)
            .unwrap_or(DeviceType::Desktop)
    }
}

fn build_browser_parser(entries: Vec<db::BrowserEntry>) -> Result<CompiledParser<BrowserData>> {
    CompiledParser::build(
        entries
            .into_iter()
            .map(|b| (b.regex, BrowserData { name: b.name })),
    )
}

/// Extract and normalise an OS version: known tokens map to their alias,
/// anything else is returned verbatim with the separator turned into dots.
fn os_version<'a>(version: &'a OsVersionData, ua: &'a str) -> Option<Cow<'a, str>> {
    let captures = version.regex.captures(ua).ok().flatten()?;
    let raw = captures.get(1)?.as_str();

    if let Some(alias) = version.aliases.get(raw) {
        return Some(Cow::Borrowed(alias.as_str()));
    }

    match &version.separator {
        Some(sep) if raw.contains(sep.as_str()) => Some(Cow::Owned(raw.replace(sep.as_str(), "."))),
        _ => Some(Cow::Borrowed(raw)),
    }
}
