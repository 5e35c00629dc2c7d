use aho_corasick::AhoCorasick;
use rayon::prelude::*;

use crate::error::Result;
use crate::literal::extract_literals;

/// Literal prefixes shorter than this are not worth prefiltering on.
const MIN_LITERAL_LEN: usize = 3;

pub(crate) fn compile_regex(pattern: &str) -> Result<fancy_regex::Regex> {
    Ok(fancy_regex::Regex::new(pattern)?)
}

/// Test `regex` against `haystack`, treating evaluation errors (backtrack
/// limit exceeded) as "no match".
pub(crate) fn is_match(regex: &fancy_regex::Regex, haystack: &str) -> bool {
    regex.is_match(haystack).unwrap_or(false)
}

// ---------------------------------------------------------------------------
// Shared result types
// ---------------------------------------------------------------------------

/// A compiled entry: one fancy_regex rule plus its associated data.
pub(crate) struct CompiledEntry<T> {
    pub regex: fancy_regex::Regex,
    pub data: T,
}

/// Result of a successful match.
pub(crate) struct MatchResult<'a, T> {
    pub data: &'a T,
    pub captures: fancy_regex::Captures<'a>,
}

impl<'a, T> MatchResult<'a, T> {
    /// Text of capture group `i`, if it participated in the match and is not
    /// empty.
    pub fn group(&self, i: usize) -> Option<&'a str> {
        self.captures
            .get(i)
            .map(|m| m.as_str())
            .filter(|s| !s.is_empty())
    }
}

// ---------------------------------------------------------------------------
// CompiledParser — ordered, first-match-wins rule list
// ---------------------------------------------------------------------------

/// Ordered rule list with an Aho-Corasick literal prefilter.
///
/// Every entry's required literal prefixes go into one case-insensitive
/// automaton; a single pass over the input tells which entries can possibly
/// match. Entries without usable literals are always evaluated. Candidates are
/// then tried in their original order, so precedence is exactly file order.
pub(crate) struct CompiledParser<T> {
    prefilter: AhoCorasick,
    /// Maps Aho-Corasick pattern id → entry index.
    literal_to_entry: Vec<usize>,
    /// Entries that must be tried on every input.
    always: Vec<usize>,
    entries: Vec<CompiledEntry<T>>,
}

impl<T> CompiledParser<T> {
    /// Build a CompiledParser from an iterator of (regex_pattern, data) pairs.
    pub fn build(items: impl IntoIterator<Item = (String, T)>) -> Result<Self>
    where
        T: Send + Sync,
    {
        let items: Vec<(String, T)> = items.into_iter().collect();

        // Compile regexes and extract literals in parallel; order is kept.
        let compiled: Vec<(fancy_regex::Regex, Vec<String>)> = items
            .par_iter()
            .map(|(pattern, _)| {
                Ok((
                    compile_regex(pattern)?,
                    extract_literals(pattern, MIN_LITERAL_LEN),
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut literals: Vec<String> = Vec::new();
        let mut literal_to_entry: Vec<usize> = Vec::new();
        let mut always: Vec<usize> = Vec::new();
        let mut entries: Vec<CompiledEntry<T>> = Vec::with_capacity(items.len());

        for (idx, ((regex, lits), (_, data))) in compiled.into_iter().zip(items).enumerate() {
            if lits.is_empty() {
                always.push(idx);
            }
            for lit in lits {
                literals.push(lit);
                literal_to_entry.push(idx);
            }
            entries.push(CompiledEntry { regex, data });
        }

        let prefilter = AhoCorasick::builder()
            .ascii_case_insensitive(true)
            .build(&literals)?;

        tracing::debug!(
            entries = entries.len(),
            literals = literals.len(),
            always = always.len(),
            "compiled rule list"
        );

        Ok(Self {
            prefilter,
            literal_to_entry,
            always,
            entries,
        })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    fn candidates(&self, haystack: &str) -> Vec<bool> {
        let mut candidates = vec![false; self.entries.len()];
        for &idx in &self.always {
            candidates[idx] = true;
        }
        for m in self.prefilter.find_overlapping_iter(haystack) {
            candidates[self.literal_to_entry[m.pattern().as_usize()]] = true;
        }
        candidates
    }

    /// Find the first matching entry (preserving original order).
    pub fn match_first<'a>(&'a self, haystack: &'a str) -> Option<MatchResult<'a, T>> {
        self.match_first_where(haystack, |_| true)
    }

    /// Find the first entry whose regex matches and whose data passes
    /// `accept`. `accept` is checked before the regex runs.
    pub fn match_first_where<'a>(
        &'a self,
        haystack: &'a str,
        accept: impl Fn(&T) -> bool,
    ) -> Option<MatchResult<'a, T>> {
        let candidates = self.candidates(haystack);
        self.entries
            .iter()
            .zip(candidates)
            .filter(|(_, candidate)| *candidate)
            .find_map(|(entry, _)| {
                if !accept(&entry.data) {
                    return None;
                }
                match entry.regex.captures(haystack) {
                    Ok(Some(captures)) => Some(MatchResult {
                        data: &entry.data,
                        captures,
                    }),
                    _ => None,
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parser(rules: &[(&str, &'static str)]) -> CompiledParser<&'static str> {
        CompiledParser::build(rules.iter().map(|(re, name)| (re.to_string(), *name))).unwrap()
    }

    #[test]
    fn first_match_wins_in_file_order() {
        let p = parser(&[(r"Edg/([\d.]+)", "edge"), (r"Chrome/([\d.]+)", "chrome")]);
        let ua = "Chrome/120.0 Safari/537.36 Edg/120.1";
        let m = p.match_first(ua).unwrap();
        assert_eq!(*m.data, "edge");
        assert_eq!(m.group(1), Some("120.1"));
    }

    #[test]
    fn prefilter_is_case_insensitive_superset() {
        let p = parser(&[("(?i)android", "android")]);
        assert!(p.match_first("Linux; ANDROID 9").is_some());
        let p = parser(&[("Android", "android")]);
        assert!(p.match_first("linux; android 9").is_none());
    }

    #[test]
    fn entries_without_literals_always_run() {
        let p = parser(&[("", "anything"), ("Chrome", "chrome")]);
        assert_eq!(*p.match_first("Chrome").unwrap().data, "anything");
        assert_eq!(*p.match_first("").unwrap().data, "anything");
    }

    #[test]
    fn accept_filters_before_matching() {
        let p = parser(&[("Chrome", "first"), ("Chrome", "second")]);
        let m = p.match_first_where("Chrome", |d| *d != "first").unwrap();
        assert_eq!(*m.data, "second");
    }

    #[test]
    fn empty_group_is_none() {
        let p = parser(&[(r"Version/([\d.]*)", "v")]);
        assert_eq!(p.match_first("Version/").unwrap().group(1), None);
    }

    #[test]
    fn invalid_pattern_is_an_error() {
        let rules = vec![("(unclosed".to_string(), ())];
        assert!(CompiledParser::build(rules).is_err());
    }
}
