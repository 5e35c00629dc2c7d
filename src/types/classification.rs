use std::borrow::Cow;
use std::fmt;

use serde::Serialize;

use super::DeviceType;

/// Placeholder used for every name that no rule could determine.
pub const UNKNOWN: &str = "Unknown";

/// A classified attribute with an optional precise version.
///
/// `version` is `None` when only the name is knowable, which is always the
/// case for operating systems reported through client hints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NameVersion<'a> {
    pub name: Cow<'a, str>,
    pub version: Option<Cow<'a, str>>,
}

impl<'a> NameVersion<'a> {
    pub fn unknown() -> Self {
        Self {
            name: Cow::Borrowed(UNKNOWN),
            version: None,
        }
    }

    pub fn is_unknown(&self) -> bool {
        self.name == UNKNOWN
    }

    pub fn into_owned(self) -> NameVersion<'static> {
        NameVersion {
            name: Cow::Owned(self.name.into_owned()),
            version: self.version.map(|v| Cow::Owned(v.into_owned())),
        }
    }
}

/// Which resolution path produced a [`ClassificationResult`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Source {
    /// Structured client-hints data (`navigator.userAgentData`, `Sec-CH-UA*`).
    ClientHints,
    /// Pattern matching over the raw User-Agent string.
    UserAgent,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ClientHints => "client hints",
            Self::UserAgent => "user agent",
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of one classification call.
///
/// Borrows from the classifier's rule data and from the inputs it was given,
/// so most fields are produced without allocating. Use
/// [`ClassificationResult::into_owned`] to keep it around longer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationResult<'a> {
    pub browser: NameVersion<'a>,
    pub os: NameVersion<'a>,
    pub device_type: DeviceType,
    pub engine: Cow<'a, str>,
    /// The identification string the result describes.
    pub user_agent: Cow<'a, str>,
    /// The declared platform label (`navigator.platform`, or the client-hints
    /// platform when structured data was used).
    pub platform: Cow<'a, str>,
    pub source: Source,
}

impl<'a> ClassificationResult<'a> {
    pub fn into_owned(self) -> ClassificationResult<'static> {
        ClassificationResult {
            browser: self.browser.into_owned(),
            os: self.os.into_owned(),
            device_type: self.device_type,
            engine: Cow::Owned(self.engine.into_owned()),
            user_agent: Cow::Owned(self.user_agent.into_owned()),
            platform: Cow::Owned(self.platform.into_owned()),
            source: self.source,
        }
    }
}
