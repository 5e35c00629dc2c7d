use regex_syntax::{hir::literal::Extractor, parse};

/// Extract the literal prefixes every match of `pattern` must start with, for
/// use as Aho-Corasick prefilter candidates. Literals are ASCII-lowercased so
/// they can be searched case-insensitively.
///
/// Returns an empty vec when the prefixes are unknown (infinite set, parse
/// failure) or when any of them is shorter than `min_len`: such an entry must
/// be tried on every input. Dropping only the short alternatives would make
/// the prefilter miss real matches.
pub(crate) fn extract_literals(pattern: &str, min_len: usize) -> Vec<String> {
    let hir = match parse(pattern) {
        Ok(h) => h,
        Err(_) => return Vec::new(),
    };

    let mut extractor = Extractor::new();
    extractor.kind(regex_syntax::hir::literal::ExtractKind::Prefix);

    let seq = extractor.extract(&hir);
    let Some(lits) = seq.literals() else {
        return Vec::new();
    };

    let mut literals = Vec::with_capacity(lits.len());
    for lit in lits {
        let Ok(s) = std::str::from_utf8(lit.as_bytes()) else {
            return Vec::new();
        };
        if s.len() < min_len {
            return Vec::new();
        }
        literals.push(s.to_ascii_lowercase());
    }

    literals.sort();
    literals.dedup();
    literals
}
