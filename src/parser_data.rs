use super::db;
use super::error::Result;
use super::parser::{compile_regex, is_match};
use super::types::DeviceType;
use indexmap::IndexMap;

// ---------------------------------------------------------------------------
// Internal data structs carried inside CompiledParser<T>
// ---------------------------------------------------------------------------

pub(crate) struct BrowserData {
    pub name: String,
}

pub(crate) struct OsData {
    pub name: String,
    pub version: Option<OsVersionData>,
    pub conditions: Conditions,
}

pub(crate) struct OsVersionData {
    pub regex: fancy_regex::Regex,
    pub separator: Option<String>,
    pub aliases: IndexMap<String, String>,
}

pub(crate) struct EngineData {
    pub name: String,
    pub conditions: Conditions,
}

pub(crate) struct DeviceData {
    pub kind: DeviceType,
    pub conditions: Conditions,
}

// ---------------------------------------------------------------------------
// Match context and rule conditions
// ---------------------------------------------------------------------------

/// Per-call signals a rule condition may look at besides its own pattern.
pub(crate) struct MatchContext<'a> {
    pub user_agent: &'a str,
    pub platform: &'a str,
    pub max_touch_points: u32,
    /// The UA names an iPhone, iPad or iPod.
    pub apple_device: bool,
}

impl MatchContext<'_> {
    /// A touch-capable client declaring `platform`, i.e. iPadOS posing as a Mac.
    pub fn touch_masquerade(&self, platform: &str) -> bool {
        self.platform == platform && self.max_touch_points > 1
    }
}

pub(crate) struct Conditions {
    require: Option<fancy_regex::Regex>,
    exclude: Option<fancy_regex::Regex>,
    apple_device: Option<bool>,
    touch_platform: Option<String>,
}

impl Conditions {
    pub fn compile(entry: db::ConditionsEntry) -> Result<Self> {
        Ok(Self {
            require: entry.require.as_deref().map(compile_regex).transpose()?,
            exclude: entry.exclude.as_deref().map(compile_regex).transpose()?,
            apple_device: entry.apple_device,
            touch_platform: entry.touch_platform,
        })
    }

    pub fn allows(&self, ctx: &MatchContext<'_>) -> bool {
        if let Some(required) = self.apple_device {
            if required != ctx.apple_device {
                return false;
            }
        }
        if let Some(platform) = &self.touch_platform {
            if !ctx.touch_masquerade(platform) {
                return false;
            }
        }
        if let Some(re) = &self.require {
            if !is_match(re, ctx.user_agent) {
                return false;
            }
        }
        if let Some(re) = &self.exclude {
            if is_match(re, ctx.user_agent) {
                return false;
            }
        }
        true
    }
}
