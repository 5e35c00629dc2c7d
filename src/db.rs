use std::collections::HashMap;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Result;

pub(crate) const BROWSERS_FILE: &str = "browsers.yml";
pub(crate) const IOS_BROWSERS_FILE: &str = "ios_browsers.yml";
pub(crate) const OSS_FILE: &str = "oss.yml";
pub(crate) const ENGINES_FILE: &str = "engines.yml";
pub(crate) const DEVICES_FILE: &str = "devices.yml";
pub(crate) const BRANDS_FILE: &str = "brands.yml";
pub(crate) const PLATFORMS_FILE: &str = "platforms.yml";

/// Rule files compiled into the crate.
const BUILTIN_RULES: &[(&str, &str)] = &[
    (BROWSERS_FILE, include_str!("../rules/browsers.yml")),
    (IOS_BROWSERS_FILE, include_str!("../rules/ios_browsers.yml")),
    (OSS_FILE, include_str!("../rules/oss.yml")),
    (ENGINES_FILE, include_str!("../rules/engines.yml")),
    (DEVICES_FILE, include_str!("../rules/devices.yml")),
    (BRANDS_FILE, include_str!("../rules/brands.yml")),
    (PLATFORMS_FILE, include_str!("../rules/platforms.yml")),
];

// ---------------------------------------------------------------------------
// Conditions shared by OS, engine and device rules
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub(crate) struct ConditionsEntry {
    /// Second pattern that must also match.
    #[serde(default)]
    pub require: Option<String>,
    /// Pattern that must not match.
    #[serde(default)]
    pub exclude: Option<String>,
    /// Whether the UA must (true) or must not (false) name an iPhone/iPad/iPod.
    #[serde(default)]
    pub apple_device: Option<bool>,
    /// Declared platform label that, together with touch support, matches.
    #[serde(default)]
    pub touch_platform: Option<String>,
}

// ---------------------------------------------------------------------------
// Browsers  (rules/browsers.yml, rules/ios_browsers.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct BrowserEntry {
    pub regex: String,
    pub name: String,
}

// ---------------------------------------------------------------------------
// Operating Systems  (rules/oss.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct OsEntry {
    /// Missing regex: the rule is decided by its conditions alone.
    #[serde(default)]
    pub regex: Option<String>,
    pub name: String,
    #[serde(default)]
    pub version: Option<OsVersionEntry>,
    #[serde(flatten)]
    pub conditions: ConditionsEntry,
}

#[derive(Debug, Deserialize)]
pub(crate) struct OsVersionEntry {
    pub regex: String,
    /// Separator replaced by `.` in the captured version (`17_0` → `17.0`).
    #[serde(default)]
    pub separator: Option<String>,
    /// Raw version token → display version (`10.0` → `10/11`).
    #[serde(default)]
    pub aliases: IndexMap<String, String>,
}

// ---------------------------------------------------------------------------
// Engines  (rules/engines.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct EngineEntry {
    pub regex: String,
    pub name: String,
    #[serde(flatten)]
    pub conditions: ConditionsEntry,
}

// ---------------------------------------------------------------------------
// Device types  (rules/devices.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct DeviceEntry {
    #[serde(default)]
    pub regex: Option<String>,
    pub device: String,
    #[serde(flatten)]
    pub conditions: ConditionsEntry,
}

// ---------------------------------------------------------------------------
// Client hints  (rules/brands.yml, rules/platforms.yml)
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct BrandsEntry {
    /// Brand labels preferred over everything else, in order.
    pub preferred: Vec<String>,
    /// Matches the deliberately meaningless "Not A;Brand" entries.
    pub placeholder: String,
    /// Brand label → canonical browser name, first match wins.
    pub names: Vec<BrowserEntry>,
    /// Canonical browser name → engine.
    #[serde(default)]
    pub engines: HashMap<String, String>,
    pub default_engine: String,
    /// OS names that imply a handheld device.
    pub mobile_os: String,
}

/// Lowercase platform label → canonical OS name.
pub(crate) type PlatformMap = HashMap<String, String>;

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// All rule files, deserialized but not yet compiled.
pub(crate) struct RuleFiles {
    pub browsers: Vec<BrowserEntry>,
    pub ios_browsers: Vec<BrowserEntry>,
    pub oss: Vec<OsEntry>,
    pub engines: Vec<EngineEntry>,
    pub devices: Vec<DeviceEntry>,
    pub brands: BrandsEntry,
    pub platforms: PlatformMap,
}

impl RuleFiles {
    pub fn builtin() -> Result<Self> {
        Self::load(|file| {
            BUILTIN_RULES
                .iter()
                .find(|(name, _)| *name == file)
                .map(|(_, content)| content.to_string())
                .ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::NotFound, file.to_string()).into()
                })
        })
    }

    pub fn from_dir(dir: &Path) -> Result<Self> {
        tracing::debug!(dir = %dir.display(), "loading rule files");
        Self::load(|file| Ok(std::fs::read_to_string(dir.join(file))?))
    }

    fn load(read: impl Fn(&str) -> Result<String>) -> Result<Self> {
        Ok(Self {
            browsers: parse_yaml(&read(BROWSERS_FILE)?)?,
            ios_browsers: parse_yaml(&read(IOS_BROWSERS_FILE)?)?,
            oss: parse_yaml(&read(OSS_FILE)?)?,
            engines: parse_yaml(&read(ENGINES_FILE)?)?,
            devices: parse_yaml(&read(DEVICES_FILE)?)?,
            brands: parse_yaml(&read(BRANDS_FILE)?)?,
            platforms: parse_yaml(&read(PLATFORMS_FILE)?)?,
        })
    }
}

fn parse_yaml<T: serde::de::DeserializeOwned>(content: &str) -> Result<T> {
    Ok(serde_yaml::from_str(content)?)
}
