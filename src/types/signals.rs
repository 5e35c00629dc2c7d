use serde::Deserialize;

use super::ClientHintsData;

/// Everything the host runtime knows about the client, collected at the call
/// boundary (`navigator.userAgent`, `navigator.userAgentData`,
/// `navigator.platform`, `navigator.maxTouchPoints`, `navigator.brave`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RuntimeSignals {
    pub user_agent: String,
    pub client_hints: Option<ClientHintsData>,
    pub platform: String,
    pub max_touch_points: Option<u32>,
    /// Brave exposes a detection API but otherwise looks exactly like Chrome.
    pub brave: bool,
}

impl RuntimeSignals {
    pub fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            ..Default::default()
        }
    }

    pub fn with_client_hints(mut self, hints: ClientHintsData) -> Self {
        self.client_hints = Some(hints);
        self
    }

    pub fn with_platform(mut self, platform: impl Into<String>) -> Self {
        self.platform = platform.into();
        self
    }

    pub fn with_max_touch_points(mut self, points: u32) -> Self {
        self.max_touch_points = Some(points);
        self
    }

    pub fn with_brave(mut self, brave: bool) -> Self {
        self.brave = brave;
        self
    }

    pub(crate) fn touch_points(&self) -> u32 {
        self.max_touch_points.unwrap_or(0)
    }
}
