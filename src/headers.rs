//! Minimal structured-field parsing for the `Sec-CH-UA*` request headers.

use std::iter::Peekable;
use std::str::Chars;

use crate::types::ClientHintsBrand;

/// Parse a `Sec-CH-UA` brand list such as
/// `"Chromium";v="140", "Not=A?Brand";v="24"`.
///
/// Returns `None` if the header does not follow the list syntax.
pub(crate) fn parse_brand_list(header: &str) -> Option<Vec<ClientHintsBrand>> {
    let mut chars = header.trim().chars().peekable();
    let mut brands = Vec::new();
    if chars.peek().is_none() {
        return Some(brands);
    }

    loop {
        skip_whitespace(&mut chars);
        let brand = parse_string(&mut chars)?;
        let mut version = String::new();

        while chars.peek() == Some(&';') {
            chars.next();
            skip_whitespace(&mut chars);
            let key = parse_token(&mut chars)?;
            let value = if chars.peek() == Some(&'=') {
                chars.next();
                parse_bare_item(&mut chars)?
            } else {
                String::new()
            };
            if key == "v" {
                version = value;
            }
        }

        brands.push(ClientHintsBrand { brand, version });

        skip_whitespace(&mut chars);
        match chars.next() {
            None => return Some(brands),
            Some(',') => continue,
            Some(_) => return None,
        }
    }
}

/// `?1` is true, anything else (including `?0`) is false.
pub(crate) fn parse_boolean(value: &str) -> bool {
    value.trim() == "?1"
}

pub(crate) fn unquote(value: &str) -> String {
    let value = value.trim();
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
        .to_string()
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.peek().is_some_and(|c| *c == ' ' || *c == '\t') {
        chars.next();
    }
}

fn parse_string(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    if chars.next()? != '"' {
        return None;
    }
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => match chars.next()? {
                c @ ('"' | '\\') => out.push(c),
                _ => return None,
            },
            '"' => return Some(out),
            c => out.push(c),
        }
    }
}

fn parse_token(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    let mut out = String::new();
    while let Some(&c) = chars.peek() {
        if c.is_ascii_alphanumeric() || "!#$%&'*+-.^_`|~:/".contains(c) {
            out.push(c);
            chars.next();
        } else {
            break;
        }
    }
    (!out.is_empty()).then_some(out)
}

fn parse_bare_item(chars: &mut Peekable<Chars<'_>>) -> Option<String> {
    if chars.peek() == Some(&'"') {
        parse_string(chars)
    } else {
        parse_token(chars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chrome_brand_list() {
        let brands = parse_brand_list(
            r#""Google Chrome";v="129", "Not=A?Brand";v="8", "Chromium";v="129""#,
        )
        .unwrap();
        assert_eq!(
            brands,
            vec![
                ClientHintsBrand::new("Google Chrome", "129"),
                ClientHintsBrand::new("Not=A?Brand", "8"),
                ClientHintsBrand::new("Chromium", "129"),
            ]
        );
    }

    #[test]
    fn comma_and_escape_inside_quotes() {
        let brands = parse_brand_list(r#""Not,A/Brand";v="99", "Odd \"Quoted\"";v="1""#).unwrap();
        assert_eq!(brands[0].brand, "Not,A/Brand");
        assert_eq!(brands[1].brand, r#"Odd "Quoted""#);
    }

    #[test]
    fn missing_version_param() {
        let brands = parse_brand_list(r#""Chromium""#).unwrap();
        assert_eq!(brands, vec![ClientHintsBrand::new("Chromium", "")]);
    }

    #[test]
    fn malformed_lists() {
        for header in [r#"Chromium;v="1""#, r#""Chromium";v="1","#, r#""Chromium" x"#, r#""open"#] {
            assert!(parse_brand_list(header).is_none(), "{header}");
        }
    }

    #[test]
    fn empty_list() {
        assert_eq!(parse_brand_list("  "), Some(vec![]));
    }

    #[test]
    fn booleans_and_quotes() {
        assert!(parse_boolean("?1"));
        assert!(!parse_boolean("?0"));
        assert!(!parse_boolean(""));
        assert_eq!(unquote(r#""Windows""#), "Windows");
        assert_eq!(unquote("Linux"), "Linux");
    }
}
