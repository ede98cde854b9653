//! Header translation between the caller hop and the upstream hop.
//!
//! # Responsibilities
//! - Drop headers the outbound transport must recompute (host, content-length)
//! - Drop upstream framing headers before relaying a response downstream
//!
//! # Design Decisions
//! - Exclusion lists, not allow-lists: everything else passes through verbatim
//! - Multi-valued headers keep every value in order
//! - Hop-by-hop headers outside these lists (keep-alive, upgrade, te, ...) are
//!   forwarded as-is

use axum::http::header::{self, HeaderMap, HeaderName};

/// Stripped from caller headers before the upstream request is built.
pub const INBOUND_EXCLUDED: &[HeaderName] = &[header::HOST, header::CONTENT_LENGTH];

/// Stripped from upstream response headers before they reach the caller.
pub const OUTBOUND_EXCLUDED: &[HeaderName] = &[
    header::CONTENT_ENCODING,
    header::CONTENT_LENGTH,
    header::TRANSFER_ENCODING,
    header::CONNECTION,
];

/// Headers forwarded upstream: the caller's set minus [`INBOUND_EXCLUDED`].
pub fn filter_inbound(headers: &HeaderMap) -> HeaderMap {
    filter(headers, INBOUND_EXCLUDED)
}

/// Headers relayed to the caller: the upstream set minus [`OUTBOUND_EXCLUDED`].
pub fn filter_outbound(headers: &HeaderMap) -> HeaderMap {
    filter(headers, OUTBOUND_EXCLUDED)
}

// `HeaderName` is always stored lowercase, so equality is already
// case-insensitive with respect to the wire form.
fn filter(headers: &HeaderMap, excluded: &[HeaderName]) -> HeaderMap {
    let mut out = HeaderMap::with_capacity(headers.len());
    for (name, value) in headers {
        if !excluded.contains(name) {
            out.append(name.clone(), value.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn map(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for (k, v) in pairs {
            headers.append(
                HeaderName::from_bytes(k.as_bytes()).unwrap(),
                HeaderValue::from_str(v).unwrap(),
            );
        }
        headers
    }

    #[test]
    fn inbound_drops_host_and_length_in_any_case() {
        let headers = map(&[
            ("Host", "proxy.local"),
            ("CONTENT-LENGTH", "12"),
            ("Authorization", "Bearer abc"),
            ("Content-Type", "application/json"),
        ]);

        let out = filter_inbound(&headers);
        assert!(out.get("host").is_none());
        assert!(out.get("content-length").is_none());
        assert_eq!(out.get("authorization").unwrap(), "Bearer abc");
        assert_eq!(out.get("content-type").unwrap(), "application/json");
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn inbound_keeps_hop_by_hop_outside_the_list() {
        let headers = map(&[("connection", "keep-alive"), ("transfer-encoding", "chunked")]);
        let out = filter_inbound(&headers);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn outbound_drops_framing_headers() {
        let headers = map(&[
            ("Content-Encoding", "gzip"),
            ("Content-Length", "2"),
            ("Transfer-Encoding", "chunked"),
            ("Connection", "close"),
            ("Content-Type", "text/plain"),
            ("X-Trace", "1"),
        ]);

        let out = filter_outbound(&headers);
        for name in OUTBOUND_EXCLUDED {
            assert!(out.get(name).is_none(), "{name} should be stripped");
        }
        assert_eq!(out.get("content-type").unwrap(), "text/plain");
        assert_eq!(out.get("x-trace").unwrap(), "1");
    }

    #[test]
    fn multi_valued_headers_survive_in_order() {
        let headers = map(&[("set-cookie", "a=1"), ("set-cookie", "b=2"), ("connection", "close")]);
        let out = filter_outbound(&headers);
        let cookies: Vec<_> = out.get_all("set-cookie").iter().collect();
        assert_eq!(cookies, vec!["a=1", "b=2"]);
    }

    #[test]
    fn empty_map_is_empty() {
        assert!(filter_inbound(&HeaderMap::new()).is_empty());
        assert!(filter_outbound(&HeaderMap::new()).is_empty());
    }
}
