use serde::{Deserialize, Serialize};

use crate::models::Snippet;

pub const DEFAULT_SKIP: u64 = 0;
pub const DEFAULT_LIMIT: u32 = 20;
pub const MAX_LIMIT: u32 = 100;

/// Effective window for a list call. Always in range once built.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    pub skip: u64,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            skip: DEFAULT_SKIP,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Pagination {
    /// Clamp raw values: `skip >= 0`, `1 <= limit <= 100`.
    pub fn clamp(skip: Option<i64>, limit: Option<i64>) -> Self {
        let skip = skip.map_or(DEFAULT_SKIP, |s| s.max(0) as u64);
        let limit = limit.map_or(DEFAULT_LIMIT, |l| l.clamp(1, MAX_LIMIT as i64) as u32);
        Self { skip, limit }
    }

    /// Build from query-string values. Garbage falls back to the defaults.
    pub fn from_query(skip: Option<&str>, limit: Option<&str>) -> Self {
        Self::clamp(skip.and_then(parse_leading_int), limit.and_then(parse_leading_int))
    }
}

/// Parse the leading integer of `s`, e.g. `"12abc"` gives 12. Values beyond
/// `i64` saturate.
fn parse_leading_int(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }

    let value = digits[..end].bytes().fold(0i64, |acc, b| {
        acc.saturating_mul(10).saturating_add(i64::from(b - b'0'))
    });
    Some(if negative { -value } else { value })
}

/// One page of snippets plus the size of the whole collection.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct SnippetPage {
    pub total: u64,
    pub skip: u64,
    pub limit: u32,
    pub items: Vec<Snippet>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_when_absent() {
        assert_eq!(Pagination::clamp(None, None), Pagination::default());
        assert_eq!(Pagination::from_query(None, None).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn clamps_out_of_range_values() {
        let cases = [
            (Some(-5), Some(0), 0, 1),
            (Some(0), Some(-10), 0, 1),
            (Some(7), Some(101), 7, MAX_LIMIT),
            (Some(i64::MIN), Some(i64::MAX), 0, MAX_LIMIT),
            (Some(3), Some(50), 3, 50),
        ];
        for (skip, limit, want_skip, want_limit) in cases {
            let page = Pagination::clamp(skip, limit);
            assert_eq!(page.skip, want_skip, "skip for {skip:?}");
            assert_eq!(page.limit, want_limit, "limit for {limit:?}");
        }
    }

    #[test]
    fn query_values_parse_leniently() {
        assert_eq!(
            Pagination::from_query(Some("12abc"), Some("5")),
            Pagination { skip: 12, limit: 5 }
        );
        assert_eq!(
            Pagination::from_query(Some("abc"), Some("")),
            Pagination::default()
        );
        assert_eq!(
            Pagination::from_query(Some("-3"), Some("+250")),
            Pagination { skip: 0, limit: MAX_LIMIT }
        );
        assert_eq!(
            Pagination::from_query(Some("99999999999999999999999"), None).skip,
            i64::MAX as u64
        );
    }
}
