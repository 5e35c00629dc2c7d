use std::borrow::Cow;
use std::path::Path;

use rayon::prelude::*;

use super::client_hints::ClientHintsResolver;
use super::db::RuleFiles;
use super::error::Result;
use super::types::*;
use super::user_agent::UserAgentResolver;

const CHROME: &str = "Chrome";
const BRAVE: &str = "Brave";

/// Client classifier: reconciles structured client hints, User-Agent string
/// heuristics and the Brave vendor override into one [`ClassificationResult`].
///
/// Holds only compiled, immutable rules, so a single instance can be shared
/// across threads and every call is a pure function of its arguments.
pub struct Classifier {
    user_agent: UserAgentResolver,
    client_hints: ClientHintsResolver,
}

impl Classifier {
    /// Build a classifier from the rule files bundled with the crate.
    pub fn new() -> Result<Self> {
        Self::from_rules(RuleFiles::builtin()?)
    }

    /// Load the rule files from `dir` and build the classifier.
    ///
    /// `dir` must contain `browsers.yml`, `ios_browsers.yml`, `oss.yml`,
    /// `engines.yml`, `devices.yml`, `brands.yml` and `platforms.yml`, using
    /// the same schema as the bundled `rules/` directory.
    pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
        Self::from_rules(RuleFiles::from_dir(dir.as_ref())?)
    }

    fn from_rules(rules: RuleFiles) -> Result<Self> {
        let RuleFiles {
            browsers,
            ios_browsers,
            oss,
            engines,
            devices,
            brands,
            platforms,
        } = rules;

        let (user_agent, client_hints) = rayon::join(
            || UserAgentResolver::build(browsers, ios_browsers, oss, engines, devices),
            || ClientHintsResolver::build(brands, platforms),
        );

        Ok(Self {
            user_agent: user_agent?,
            client_hints: client_hints?,
        })
    }

    /// Classify the client described by `signals`.
    ///
    /// A non-empty `user_agent` forces the string heuristics on that exact
    /// text and ignores the client hints in `signals`. Otherwise client hints
    /// are preferred when present, falling back to `signals.user_agent`.
    /// Either way the Brave override is applied last.
    pub fn classify<'a>(
        &'a self,
        user_agent: Option<&'a str>,
        signals: &'a RuntimeSignals,
    ) -> ClassificationResult<'a> {
        let mut result = match user_agent.filter(|ua| !ua.is_empty()) {
            Some(ua) => self.resolve_user_agent(ua, &signals.platform, signals.touch_points()),
            None => {
                let ua = signals.user_agent.trim();
                self.client_hints
                    .resolve(signals.client_hints.as_ref(), ua)
                    .unwrap_or_else(|| {
                        self.resolve_user_agent(ua, &signals.platform, signals.touch_points())
                    })
            }
        };

        let relabeled = apply_vendor_override(&mut result, signals.brave);
        tracing::trace!(
            source = %result.source,
            browser = %result.browser.name,
            relabeled,
            "classified client"
        );
        result
    }

    /// Classify a bare User-Agent string, with no other runtime signals.
    pub fn classify_user_agent<'a>(&'a self, user_agent: &'a str) -> ClassificationResult<'a> {
        self.resolve_user_agent(user_agent, "", 0)
    }

    /// Classify many User-Agent strings in parallel against the same runtime
    /// signals. Output order matches input order.
    pub fn classify_batch<'a, S>(
        &'a self,
        user_agents: &'a [S],
        signals: &'a RuntimeSignals,
    ) -> Vec<ClassificationResult<'a>>
    where
        S: AsRef<str> + Sync,
    {
        user_agents
            .par_iter()
            .map(|ua| {
                let mut result =
                    self.resolve_user_agent(ua.as_ref(), &signals.platform, signals.touch_points());
                apply_vendor_override(&mut result, signals.brave);
                result
            })
            .collect()
    }

    /// Classify from client hints alone; `None` when `data` is `None`.
    pub fn resolve_client_hints<'a>(
        &'a self,
        data: Option<&'a ClientHintsData>,
        user_agent: &'a str,
    ) -> Option<ClassificationResult<'a>> {
        self.client_hints.resolve(data, user_agent)
    }

    /// Classify from the User-Agent string heuristics alone.
    pub fn resolve_user_agent<'a>(
        &'a self,
        user_agent: &'a str,
        platform: &'a str,
        max_touch_points: u32,
    ) -> ClassificationResult<'a> {
        self.user_agent.resolve(user_agent, platform, max_touch_points)
    }

    pub fn normalize_brand<'a>(&'a self, label: &'a str) -> Cow<'a, str> {
        self.client_hints.normalize_brand(label)
    }

    pub fn select_brand<'b>(&self, brands: &'b [ClientHintsBrand]) -> Option<&'b ClientHintsBrand> {
        self.client_hints.select_brand(brands)
    }

    pub fn map_platform<'a>(&'a self, label: &'a str) -> NameVersion<'a> {
        self.client_hints.map_platform(label)
    }
}

/// Brave reports itself exactly like Chrome; only its detection API tells
/// them apart. Returns whether the name was changed.
fn apply_vendor_override(result: &mut ClassificationResult<'_>, brave: bool) -> bool {
    if brave && result.browser.name == CHROME {
        result.browser.name = Cow::Borrowed(BRAVE);
        return true;
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOWS_CHROME: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.6668.59 Safari/537.36";
    const MAC_FIREFOX: &str =
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 14.1; rv:121.0) Gecko/20100101 Firefox/121.0";

    fn edge_hints() -> ClientHintsData {
        ClientHintsData {
            brands: vec![
                ClientHintsBrand::new("Chromium", "129"),
                ClientHintsBrand::new("Not=A?Brand", "8"),
                ClientHintsBrand::new("Microsoft Edge", "129"),
            ],
            mobile: false,
            platform: "Windows".into(),
        }
    }

    #[test]
    fn client_hints_take_precedence() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(MAC_FIREFOX).with_client_hints(edge_hints());
        let result = classifier.classify(None, &signals);
        assert_eq!(result.source, Source::ClientHints);
        assert_eq!(result.browser.name, "Edge");
        assert_eq!(result.user_agent, MAC_FIREFOX);
    }

    #[test]
    fn falls_back_to_user_agent() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(format!("  {MAC_FIREFOX} "));
        let result = classifier.classify(None, &signals);
        assert_eq!(result.source, Source::UserAgent);
        assert_eq!(result.browser.name, "Firefox");
        assert_eq!(result.os.name, "macOS");
        assert_eq!(result.os.version.as_deref(), Some("14.1"));
        assert_eq!(result.user_agent, MAC_FIREFOX);
    }

    #[test]
    fn explicit_user_agent_bypasses_client_hints() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(MAC_FIREFOX).with_client_hints(edge_hints());
        let result = classifier.classify(Some(WINDOWS_CHROME), &signals);
        assert_eq!(result.source, Source::UserAgent);
        assert_eq!(result.browser.name, "Chrome");
        assert_eq!(result.user_agent, WINDOWS_CHROME);
    }

    #[test]
    fn empty_override_counts_as_absent() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(MAC_FIREFOX).with_client_hints(edge_hints());
        let result = classifier.classify(Some(""), &signals);
        assert_eq!(result.source, Source::ClientHints);
    }

    #[test]
    fn whitespace_override_is_kept() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(MAC_FIREFOX).with_client_hints(edge_hints());
        let result = classifier.classify(Some("   "), &signals);
        assert_eq!(result.source, Source::UserAgent);
        assert!(result.browser.is_unknown());
        assert_eq!(result.user_agent, "   ");
    }

    #[test]
    fn brave_relabels_chrome_on_both_paths() {
        let classifier = Classifier::new().unwrap();

        let signals = RuntimeSignals::new(WINDOWS_CHROME).with_brave(true);
        assert_eq!(classifier.classify(None, &signals).browser.name, "Brave");

        let hints = ClientHintsData {
            brands: vec![
                ClientHintsBrand::new("Brave", "129"),
                ClientHintsBrand::new("Chromium", "129"),
            ],
            mobile: false,
            platform: "Linux".into(),
        };
        let signals = RuntimeSignals::default()
            .with_client_hints(hints)
            .with_brave(true);
        let result = classifier.classify(None, &signals);
        assert_eq!(result.source, Source::ClientHints);
        assert_eq!(result.browser.name, "Brave");
    }

    #[test]
    fn brave_flag_leaves_other_browsers_alone() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(MAC_FIREFOX).with_brave(true);
        assert_eq!(classifier.classify(None, &signals).browser.name, "Firefox");

        let signals = RuntimeSignals::default()
            .with_client_hints(edge_hints())
            .with_brave(true);
        assert_eq!(classifier.classify(None, &signals).browser.name, "Edge");
    }

    #[test]
    fn no_brave_flag_keeps_chrome() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(WINDOWS_CHROME);
        assert_eq!(classifier.classify(None, &signals).browser.name, "Chrome");
    }

    #[test]
    fn batch_preserves_order() {
        let classifier = Classifier::new().unwrap();
        let uas = [WINDOWS_CHROME, MAC_FIREFOX, "", WINDOWS_CHROME];
        let signals = RuntimeSignals::default().with_brave(true);
        let names: Vec<_> = classifier
            .classify_batch(&uas, &signals)
            .into_iter()
            .map(|r| r.browser.name.into_owned())
            .collect();
        assert_eq!(names, ["Brave", "Firefox", "Unknown", "Brave"]);
    }

    #[test]
    fn repeated_calls_are_identical() {
        let classifier = Classifier::new().unwrap();
        let signals = RuntimeSignals::new(WINDOWS_CHROME)
            .with_platform("Win32")
            .with_max_touch_points(0);
        let first = classifier.classify(None, &signals).into_owned();
        let second = classifier.classify(None, &signals).into_owned();
        assert_eq!(first, second);
    }
}
