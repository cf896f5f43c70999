//! Hop count parsing and admission control.

use axum::{extract::Query, http::Uri};

/// Highest hop count a request may ask for.
pub const HOP_CEILING: u32 = 1000;

/// Body returned when a request asks for more than [`HOP_CEILING`] hops.
pub const REJECTION_BODY: &str = "Hops setting too high, supporting a max of 1000.";

/// Body returned by the terminal hop.
pub const DONE_BODY: &str = "Done";

/// What a request asked for, after admission control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HopRequest {
    /// Count above the ceiling; answered without forwarding.
    Rejected,
    /// Nothing left to forward.
    Terminal,
    /// Forward once more; the value is the count sent to the next host.
    Forward(u32),
}

impl HopRequest {
    /// Classify a request from its URI.
    pub fn from_uri(uri: &Uri) -> Self {
        Self::from_count(parse_hops(uri))
    }

    pub fn from_count(hops: u64) -> Self {
        if hops > u64::from(HOP_CEILING) {
            HopRequest::Rejected
        } else if hops == 0 {
            HopRequest::Terminal
        } else {
            // Bounded by the ceiling above.
            HopRequest::Forward((hops - 1) as u32)
        }
    }
}

/// Extract `hops` from the URI's query string.
///
/// The query is form-decoded first (`%32` is `2`, `+` is a space). Missing,
/// empty, negative or otherwise non-numeric values count as zero, as does a
/// query that fails to decode. The first `hops` pair wins.
pub fn parse_hops(uri: &Uri) -> u64 {
    let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(uri) else {
        return 0;
    };

    pairs
        .iter()
        .find(|(key, _)| key == "hops")
        .and_then(|(_, value)| parse_count(value))
        .unwrap_or(0)
}

/// Digits with an optional leading sign, nothing else. Negative values coerce
/// to zero and values too large for `u64` saturate so they still trip the
/// ceiling.
fn parse_count(value: &str) -> Option<u64> {
    let (negative, digits) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    if negative {
        return Some(0);
    }

    Some(digits.parse::<u64>().unwrap_or(u64::MAX))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hops(path_and_query: &str) -> u64 {
        parse_hops(&path_and_query.parse::<Uri>().unwrap())
    }

    #[test]
    fn test_missing_or_malformed_is_zero() {
        assert_eq!(hops("/"), 0);
        assert_eq!(hops("/?"), 0);
        assert_eq!(hops("/?hops"), 0);
        assert_eq!(hops("/?hops="), 0);
        assert_eq!(hops("/?hops=abc"), 0);
        assert_eq!(hops("/?hops=1.5"), 0);
        assert_eq!(hops("/?hops=-3"), 0);
        assert_eq!(hops("/?other=4"), 0);
    }

    #[test]
    fn test_parses_value() {
        assert_eq!(hops("/?hops=7"), 7);
        assert_eq!(hops("/?a=b&hops=12&c"), 12);
        assert_eq!(hops("/?hops=4&hops=9"), 4);
        assert_eq!(hops("/?hops=99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_value_is_form_decoded() {
        assert_eq!(hops("/?hops=%32"), 2);
        assert_eq!(hops("/?%68ops=3"), 3);
        // `+` decodes to a space, which is not a digit.
        assert_eq!(hops("/?hops=+3"), 0);
        // An encoded plus is an explicit sign.
        assert_eq!(hops("/?hops=%2B3"), 3);
    }

    #[test]
    fn test_classification() {
        assert_eq!(HopRequest::from_count(0), HopRequest::Terminal);
        assert_eq!(HopRequest::from_count(1), HopRequest::Forward(0));
        assert_eq!(HopRequest::from_count(1000), HopRequest::Forward(999));
        assert_eq!(HopRequest::from_count(1001), HopRequest::Rejected);
        assert_eq!(HopRequest::from_count(5000), HopRequest::Rejected);
        assert_eq!(HopRequest::from_count(u64::MAX), HopRequest::Rejected);
    }

    #[test]
    fn test_from_uri() {
        let uri = |s: &str| s.parse::<Uri>().unwrap();
        assert_eq!(HopRequest::from_uri(&uri("/?hops=2")), HopRequest::Forward(1));
        assert_eq!(HopRequest::from_uri(&uri("/?hops=x")), HopRequest::Terminal);
        assert_eq!(HopRequest::from_uri(&uri("/")), HopRequest::Terminal);
        assert_eq!(HopRequest::from_uri(&uri("/?hops=%31%30%30%31")), HopRequest::Rejected);
    }
}
