//! Query-string parsing.
//!
//! Flat `key=value` pairs only. No arrays, no nesting, and no percent-decoding:
//! `search=a%40b` yields the literal value `a%40b`.

use std::collections::HashMap;

/// Parses a raw query string (without the leading `?`) into a flat map.
///
/// - pairs are separated by `&`, empty pieces are skipped
/// - each pair splits on the **first** `=`; a piece without `=` maps to `""`
/// - a repeated key keeps the **last** value
///
/// ```rust
/// let q = tabula::query::parse("search=ann&search=bob");
/// assert_eq!(q.get("search").map(String::as_str), Some("bob"));
/// ```
pub fn parse(raw: &str) -> HashMap<String, String> {
    raw.split('&')
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once('=') {
            Some((key, value)) => (key.to_owned(), value.to_owned()),
            None => (piece.to_owned(), String::new()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_empty_map() {
        assert!(parse("").is_empty());
        assert!(parse("&&").is_empty());
    }

    #[test]
    fn splits_pairs() {
        let q = parse("search=ana&page=2");
        assert_eq!(q.len(), 2);
        assert_eq!(q["search"], "ana");
        assert_eq!(q["page"], "2");
    }

    #[test]
    fn last_write_wins() {
        let q = parse("search=ann&search=bob");
        assert_eq!(q.len(), 1);
        assert_eq!(q["search"], "bob");
    }

    #[test]
    fn splits_on_first_equals_only() {
        let q = parse("expr=a=b");
        assert_eq!(q["expr"], "a=b");
    }

    #[test]
    fn bare_key_maps_to_empty_value() {
        let q = parse("flag&x=1");
        assert_eq!(q["flag"], "");
        assert_eq!(q["x"], "1");
    }

    #[test]
    fn values_are_not_percent_decoded() {
        let q = parse("search=ana%40x.com");
        assert_eq!(q["search"], "ana%40x.com");
    }
}
