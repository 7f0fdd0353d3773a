//! HTTP Host header extraction
//!
//! This module extracts the value of the `Host` header from a TCP payload
//! view. It is deliberately not an HTTP parser: the scan is a literal
//! byte-sequence search over a length-bounded slice, which is all the
//! blocking decision needs and keeps the hot path allocation-free.
//!
//! The search never reads past the view it is given, even when the backing
//! receive buffer extends further. A `Host` header split across TCP
//! segments is never found; later segments simply report absent, with no
//! state carried between calls.

use tracing::trace;

/// Literal preceding the hostname in an HTTP/1.x request
///
/// Matching is byte-exact; header-name casing other than `Host` is not
/// recognized, mirroring the exact-match blocklist semantics.
const HOST_PREFIX: &[u8] = b"Host: ";

/// Extract the Host header value from a payload view
///
/// Returns the byte run following the first `"Host: "` occurrence, up to
/// (excluding) the first `\r` or `\n`, or to the end of the view if no
/// terminator occurs before it (a tolerated edge case, not an error).
///
/// Returns `None` when the literal is absent, the value is empty, or the
/// value is not ASCII (hostnames are ASCII by construction; anything else
/// fails open).
///
/// # Example
///
/// ```
/// use hostblock::sniff::extract_host;
///
/// let payload = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
/// assert_eq!(extract_host(payload), Some("example.com"));
///
/// let payload = b"GET / HTTP/1.1\r\n\r\n";
/// assert_eq!(extract_host(payload), None);
/// ```
#[must_use]
pub fn extract_host(payload: &[u8]) -> Option<&str> {
    let start = find_subsequence(payload, HOST_PREFIX)? + HOST_PREFIX.len();
    let value = &payload[start..];

    let end = value
        .iter()
        .position(|&b| b == b'\r' || b == b'\n')
        .unwrap_or(value.len());
    let value = &value[..end];

    if value.is_empty() {
        trace!("Empty Host header value");
        return None;
    }
    if !value.is_ascii() {
        trace!("Non-ASCII Host header value");
        return None;
    }

    // ASCII was checked above, so this conversion cannot fail.
    std::str::from_utf8(value).ok()
}

/// Find the first occurrence of `needle` within `haystack`
fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_host_basic() {
        let payload = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert_eq!(extract_host(payload), Some("example.com"));
    }

    #[test]
    fn test_extract_host_among_other_headers() {
        let payload =
            b"GET / HTTP/1.1\r\nUser-Agent: curl/8.0\r\nHost: example.com\r\nAccept: */*\r\n\r\n";
        assert_eq!(extract_host(payload), Some("example.com"));
    }

    #[test]
    fn test_extract_host_absent() {
        let payload = b"GET / HTTP/1.1\r\nContent-Type: text/html\r\n\r\n";
        assert_eq!(extract_host(payload), None);
    }

    #[test]
    fn test_extract_host_empty_payload() {
        assert_eq!(extract_host(b""), None);
    }

    #[test]
    fn test_extract_host_at_view_end_without_terminator() {
        // Segment ends mid-header; the run extends to the view end.
        let payload = b"GET / HTTP/1.1\r\nHost: example.com";
        assert_eq!(extract_host(payload), Some("example.com"));
    }

    #[test]
    fn test_extract_host_newline_only_terminator() {
        let payload = b"GET / HTTP/1.1\nHost: example.com\nAccept: */*\n";
        assert_eq!(extract_host(payload), Some("example.com"));
    }

    #[test]
    fn test_extract_host_empty_value() {
        let payload = b"GET / HTTP/1.1\r\nHost: \r\n\r\n";
        assert_eq!(extract_host(payload), None);
    }

    #[test]
    fn test_extract_host_is_case_sensitive() {
        // Lowercase header names are not recognized by the literal match.
        let payload = b"GET / HTTP/1.1\r\nhost: example.com\r\n\r\n";
        assert_eq!(extract_host(payload), None);
    }

    #[test]
    fn test_extract_host_non_ascii_value() {
        let payload = b"GET / HTTP/1.1\r\nHost: \xc3\xa9xample.com\r\n\r\n";
        assert_eq!(extract_host(payload), None);
    }

    #[test]
    fn test_extract_host_respects_view_bound() {
        // The literal sits past the end of the view into the backing
        // buffer; a bounded scan must not see it.
        let buffer = b"GET / HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let view = &buffer[..10];
        assert_eq!(extract_host(view), None);
    }

    #[test]
    fn test_extract_host_prefix_only() {
        // Literal present but the view ends immediately after it.
        let payload = b"GET / HTTP/1.1\r\nHost: ";
        assert_eq!(extract_host(payload), None);
    }

    #[test]
    fn test_extract_host_first_occurrence_wins() {
        let payload = b"Host: first.com\r\nHost: second.com\r\n";
        assert_eq!(extract_host(payload), Some("first.com"));
    }

    #[test]
    fn test_extract_host_keeps_port_suffix() {
        // The run ends only at CR/LF; a port stays part of the value and
        // is matched (or not) against the blocklist verbatim.
        let payload = b"GET / HTTP/1.1\r\nHost: example.com:8080\r\n\r\n";
        assert_eq!(extract_host(payload), Some("example.com:8080"));
    }
}
