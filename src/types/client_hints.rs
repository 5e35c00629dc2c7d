use serde::{Deserialize, Serialize};

use crate::headers;

/// One vendor identity claim from a client-hints brand list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHintsBrand {
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub version: String,
}

impl ClientHintsBrand {
    pub fn new(brand: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            brand: brand.into(),
            version: version.into(),
        }
    }
}

/// Low-entropy structured client hints, shaped like `navigator.userAgentData`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientHintsData {
    /// Brand list in the order the client reported it, placeholders included.
    #[serde(default)]
    pub brands: Vec<ClientHintsBrand>,
    #[serde(default)]
    pub mobile: bool,
    #[serde(default)]
    pub platform: String,
}

impl ClientHintsData {
    /// Build client hints from the `Sec-CH-UA`, `Sec-CH-UA-Mobile` and
    /// `Sec-CH-UA-Platform` request headers.
    ///
    /// Returns `None` when the brand list is missing, empty or malformed.
    pub fn from_headers(
        sec_ch_ua: &str,
        sec_ch_ua_mobile: Option<&str>,
        sec_ch_ua_platform: Option<&str>,
    ) -> Option<Self> {
        let brands = headers::parse_brand_list(sec_ch_ua)?;
        if brands.is_empty() {
            return None;
        }
        Some(Self {
            brands,
            mobile: sec_ch_ua_mobile.is_some_and(headers::parse_boolean),
            platform: sec_ch_ua_platform
                .map(headers::unquote)
                .unwrap_or_default(),
        })
    }
}
