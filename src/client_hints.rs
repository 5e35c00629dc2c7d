use std::borrow::Cow;
use std::collections::HashMap;

use super::db;
use super::error::Result;
use super::parser::{compile_regex, is_match, CompiledParser};
use super::parser_data::BrowserData;
use super::types::*;

/// Classifies structured client-hints data: picks the real brand out of the
/// brand list, normalises it, and maps the platform label.
pub(crate) struct ClientHintsResolver {
    preferred: Vec<String>,
    placeholder: fancy_regex::Regex,
    brand_parser: CompiledParser<BrowserData>,
    engines: HashMap<String, String>,
    default_engine: String,
    mobile_os: fancy_regex::Regex,
    platforms: db::PlatformMap,
}

impl ClientHintsResolver {
    pub fn build(brands: db::BrandsEntry, platforms: db::PlatformMap) -> Result<Self> {
        let brand_parser = CompiledParser::build(
            brands
                .names
                .into_iter()
                .map(|b| (b.regex, BrowserData { name: b.name })),
        )?;

        // Lookups are case-insensitive.
        let platforms = platforms
            .into_iter()
            .map(|(label, name)| (label.to_lowercase(), name))
            .collect();

        Ok(Self {
            preferred: brands.preferred,
            placeholder: compile_regex(&brands.placeholder)?,
            brand_parser,
            engines: brands.engines,
            default_engine: brands.default_engine,
            mobile_os: compile_regex(&brands.mobile_os)?,
            platforms,
        })
    }

    /// Canonical browser name for a vendor brand label.
    pub fn normalize_brand<'a>(&'a self, label: &'a str) -> Cow<'a, str> {
        match self.brand_parser.match_first(label) {
            Some(m) => Cow::Borrowed(m.data.name.as_str()),
            None if label.is_empty() => Cow::Borrowed(UNKNOWN),
            None => Cow::Borrowed(label),
        }
    }

    /// The brand entry naming the actual browser.
    ///
    /// A preferred brand wins in preference order; otherwise the first entry
    /// that is not a placeholder; otherwise whatever comes first.
    pub fn select_brand<'b>(&self, brands: &'b [ClientHintsBrand]) -> Option<&'b ClientHintsBrand> {
        for preferred in &self.preferred {
            if let Some(hit) = brands
                .iter()
                .find(|b| b.brand.eq_ignore_ascii_case(preferred))
            {
                return Some(hit);
            }
        }

        brands
            .iter()
            .find(|b| !is_match(&self.placeholder, &b.brand))
            .or_else(|| brands.first())
    }

    /// Canonical OS for a client-hints platform label. Never carries a version.
    pub fn map_platform<'a>(&'a self, label: &'a str) -> NameVersion<'a> {
        let name = match self.platforms.get(&label.to_lowercase()) {
            Some(name) => Cow::Borrowed(name.as_str()),
            None if label.is_empty() => Cow::Borrowed(UNKNOWN),
            None => Cow::Borrowed(label),
        };
        NameVersion {
            name,
            version: None,
        }
    }

    /// Classify from structured data, or `None` if the client offered none.
    ///
    /// Client hints cannot tell tablets from phones, so this path only ever
    /// reports mobile or desktop.
    pub fn resolve<'a>(
        &'a self,
        data: Option<&'a ClientHintsData>,
        user_agent: &'a str,
    ) -> Option<ClassificationResult<'a>> {
        let data = data?;

        let brand = self.select_brand(&data.brands);
        let browser = NameVersion {
            name: self.normalize_brand(brand.map_or("", |b| b.brand.as_str())),
            version: brand
                .map(|b| b.version.as_str())
                .filter(|v| !v.is_empty())
                .map(Cow::Borrowed),
        };

        let os = self.map_platform(&data.platform);
        let device_type = if data.mobile || is_match(&self.mobile_os, &os.name) {
            DeviceType::Mobile
        } else {
            DeviceType::Desktop
        };

        let engine = self
            .engines
            .get(browser.name.as_ref())
            .unwrap_or(&self.default_engine);

        Some(ClassificationResult {
            browser,
            os,
            device_type,
            engine: Cow::Borrowed(engine.as_str()),
            user_agent: Cow::Borrowed(user_agent),
            platform: Cow::Borrowed(data.platform.as_str()),
            source: Source::ClientHints,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolver() -> ClientHintsResolver {
        let rules = db::RuleFiles::builtin().unwrap();
        ClientHintsResolver::build(rules.brands, rules.platforms).unwrap()
    }

    fn brands(list: &[(&str, &str)]) -> Vec<ClientHintsBrand> {
        list.iter()
            .map(|(b, v)| ClientHintsBrand::new(*b, *v))
            .collect()
    }

    #[test]
    fn normalize_brand_labels() {
        let r = resolver();
        for (label, expected) in [
            ("Microsoft Edge", "Edge"),
            ("Opera GX", "Opera"),
            ("Google Chrome", "Chrome"),
            ("Chromium", "Chrome"),
            ("HeadlessChrome", "Chrome"),
            ("Edge Chromium", "Edge"),
            ("Yandex", "Yandex"),
            ("", "Unknown"),
        ] {
            assert_eq!(r.normalize_brand(label), expected, "{label:?}");
        }
    }

    #[test]
    fn preferred_brand_wins_regardless_of_position() {
        let r = resolver();
        let list = brands(&[
            ("Not)A;Brand", "99"),
            ("Chromium", "127"),
            ("Microsoft Edge", "127"),
        ]);
        assert_eq!(r.select_brand(&list).unwrap().brand, "Microsoft Edge");

        let list = brands(&[("chromium", "127"), ("GOOGLE CHROME", "127")]);
        assert_eq!(r.select_brand(&list).unwrap().brand, "GOOGLE CHROME");
    }

    #[test]
    fn skips_placeholder_brands() {
        let r = resolver();
        let list = brands(&[("Not A;Brand", "8"), ("Yandex", "24")]);
        assert_eq!(r.select_brand(&list).unwrap().brand, "Yandex");
    }

    #[test]
    fn all_placeholders_falls_back_to_first() {
        let r = resolver();
        let list = brands(&[("Not=A?Brand", "8"), ("Not.A/Brand", "24")]);
        assert_eq!(r.select_brand(&list).unwrap().brand, "Not=A?Brand");
        assert!(r.select_brand(&[]).is_none());
    }

    #[test]
    fn map_platform_labels() {
        let r = resolver();
        for (label, expected) in [
            ("Windows", "Windows"),
            ("macOS", "macOS"),
            ("ANDROID", "Android"),
            ("iOS", "iOS"),
            ("Chrome OS", "Chrome OS"),
            ("ChromeOS", "Chrome OS"),
            ("Linux", "Linux"),
            ("Fuchsia", "Fuchsia"),
            ("", "Unknown"),
        ] {
            let os = r.map_platform(label);
            assert_eq!(os.name, expected, "{label:?}");
            assert_eq!(os.version, None);
        }
    }

    #[test]
    fn resolve_absent_data() {
        assert!(resolver().resolve(None, "Mozilla/5.0").is_none());
    }

    #[test]
    fn resolve_desktop_edge() {
        let data = ClientHintsData {
            brands: brands(&[
                ("Not)A;Brand", "99"),
                ("Microsoft Edge", "127"),
                ("Chromium", "127"),
            ]),
            mobile: false,
            platform: "Windows".into(),
        };
        let r = resolver();
        let result = r.resolve(Some(&data), "Mozilla/5.0").unwrap();
        assert_eq!(result.browser.name, "Edge");
        assert_eq!(result.browser.version.as_deref(), Some("127"));
        assert_eq!(result.os.name, "Windows");
        assert_eq!(result.device_type, DeviceType::Desktop);
        assert_eq!(result.engine, "Blink");
        assert_eq!(result.platform, "Windows");
        assert_eq!(result.user_agent, "Mozilla/5.0");
        assert_eq!(result.source, Source::ClientHints);
    }

    #[test]
    fn mobile_os_implies_mobile_without_flag() {
        let r = resolver();
        let data = ClientHintsData {
            brands: brands(&[("Google Chrome", "120")]),
            mobile: false,
            platform: "Android".into(),
        };
        let result = r.resolve(Some(&data), "").unwrap();
        assert_eq!(result.device_type, DeviceType::Mobile);

        let data = ClientHintsData {
            brands: brands(&[("Google Chrome", "120")]),
            mobile: true,
            platform: "Linux".into(),
        };
        let result = r.resolve(Some(&data), "").unwrap();
        assert_eq!(result.device_type, DeviceType::Mobile);
    }

    #[test]
    fn engine_follows_browser_family() {
        let r = resolver();
        for (brand, engine) in [("Firefox", "Gecko"), ("Safari", "WebKit"), ("Yandex", "Blink")] {
            let data = ClientHintsData {
                brands: brands(&[(brand, "1")]),
                mobile: false,
                platform: "macOS".into(),
            };
            assert_eq!(r.resolve(Some(&data), "").unwrap().engine, engine);
        }
    }

    #[test]
    fn empty_brand_list() {
        let data = ClientHintsData {
            brands: vec![],
            mobile: false,
            platform: String::new(),
        };
        let r = resolver();
        let result = r.resolve(Some(&data), "").unwrap();
        assert!(result.browser.is_unknown());
        assert_eq!(result.browser.version, None);
        assert!(result.os.is_unknown());
        assert_eq!(result.device_type, DeviceType::Desktop);
    }
}
