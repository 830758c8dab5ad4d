//! Encoding of list-valued dataset cells (`emails`, `sni_codes`).
//!
//! Cells are written as JSON arrays of strings. Reading is lenient: older
//! datasets hold single-quoted list literals (`['a', 'b']`), sometimes quoted
//! twice, and those decode to the same typed list. Anything that cannot be
//! parsed decodes to an empty list.

use std::iter::Peekable;
use std::str::Chars;

use serde_json::Value;

/// How many layers of "a list serialized inside a string" are unwrapped.
const MAX_UNWRAP: usize = 3;

/// Encodes a list as a JSON array cell.
#[must_use]
pub fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".to_owned())
}

/// Decodes a list cell, treating empty or unparsable cells as empty lists.
#[must_use]
pub fn decode_list(cell: &str) -> Vec<String> {
    let mut current = cell.trim().to_owned();
    for _ in 0..MAX_UNWRAP {
        if current.is_empty() {
            return Vec::new();
        }
        let Some(items) = parse_list(&current) else {
            return Vec::new();
        };
        if let [only] = items.as_slice() {
            let inner = only.trim();
            if inner.starts_with('[') && inner.ends_with(']') {
                current = inner.to_owned();
                continue;
            }
        }
        return items;
    }
    Vec::new()
}

fn parse_list(cell: &str) -> Option<Vec<String>> {
    match serde_json::from_str::<Value>(cell) {
        Ok(Value::Array(values)) => Some(values.into_iter().filter_map(scalar_text).collect()),
        Ok(value) => scalar_text(value).map(|s| vec![s]),
        Err(_) => parse_quoted_literal(cell),
    }
}

fn scalar_text(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parses `['a', "b"]` or a lone quoted scalar `'a'`.
fn parse_quoted_literal(cell: &str) -> Option<Vec<String>> {
    let cell = cell.trim();
    if let Some(body) = cell.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
        let mut chars = body.chars().peekable();
        let mut items = Vec::new();
        loop {
            skip_whitespace(&mut chars);
            match chars.next() {
                None => break,
                Some(quote @ ('\'' | '"')) => items.push(read_quoted(&mut chars, quote)?),
                Some(_) => return None,
            }
            skip_whitespace(&mut chars);
            match chars.next() {
                None => break,
                Some(',') => {}
                Some(_) => return None,
            }
        }
        return Some(items);
    }

    let mut chars = cell.chars().peekable();
    let quote = chars.next().filter(|c| matches!(c, '\'' | '"'))?;
    let value = read_quoted(&mut chars, quote)?;
    chars.next().is_none().then(|| vec![value])
}

fn skip_whitespace(chars: &mut Peekable<Chars<'_>>) {
    while chars.next_if(|c| c.is_whitespace()).is_some() {}
}

fn read_quoted(chars: &mut Peekable<Chars<'_>>, quote: char) -> Option<String> {
    let mut out = String::new();
    loop {
        match chars.next()? {
            '\\' => match chars.next()? {
                'n' => out.push('\n'),
                't' => out.push('\t'),
                other => out.push(other),
            },
            c if c == quote => return Some(out),
            c => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn encodes_as_json_array() {
        let cell = encode_list(&strings(&["info@acme.se", "a, \"b\""]));
        assert_eq!(cell, r#"["info@acme.se","a, \"b\""]"#);
        assert_eq!(encode_list(&[]), "[]");
    }

    #[test]
    fn decodes_json_array_with_embedded_delimiters() {
        let items = strings(&["x, y", "it's", "[z]"]);
        assert_eq!(decode_list(&encode_list(&items)), items);
    }

    #[test]
    fn decodes_single_quoted_literal() {
        assert_eq!(
            decode_list("['24100 Framställning av järn', '46900 Partihandel']"),
            strings(&["24100 Framställning av järn", "46900 Partihandel"])
        );
    }

    #[test]
    fn decodes_escaped_quotes_in_literal() {
        assert_eq!(decode_list(r"['O\'Brien AB']"), strings(&["O'Brien AB"]));
    }

    #[test]
    fn unwraps_double_encoded_list() {
        assert_eq!(
            decode_list(r#""['sales@firma.se', 'info@firma.se']""#),
            strings(&["sales@firma.se", "info@firma.se"])
        );
    }

    #[test]
    fn empty_and_garbage_cells_decode_to_empty() {
        assert!(decode_list("").is_empty());
        assert!(decode_list("   ").is_empty());
        assert!(decode_list("nan").is_empty());
        assert!(decode_list("[unquoted, items]").is_empty());
        assert!(decode_list("['unterminated").is_empty());
        assert!(decode_list("[]").is_empty());
    }

    #[test]
    fn quoted_scalar_becomes_single_item() {
        assert_eq!(decode_list("'info@acme.se'"), strings(&["info@acme.se"]));
        assert_eq!(decode_list("\"info@acme.se\""), strings(&["info@acme.se"]));
    }

    #[test]
    fn tolerates_trailing_comma() {
        assert_eq!(decode_list("['a', ]"), strings(&["a"]));
    }
}
