//! Canonical request construction.
//!
//! The canonical form is a deterministic string encoding of the request:
//! method, URI-encoded path, sorted-and-encoded query string, a fixed
//! ordered subset of headers (lower-cased names, trimmed values), and the
//! payload hash. Both signer and verifier must produce the same bytes
//! here or nothing downstream agrees.

use wicket_core::GatewayRequest;

/// Placeholder payload hash for requests whose body is not signed.
const UNSIGNED_PAYLOAD: &str = "UNSIGNED-PAYLOAD";

/// The fixed, ordered set of headers that participate in signing.
const SIGNED_HEADER_NAMES: [&str; 3] = ["host", "x-amz-content-sha256", "x-amz-date"];

/// Percent-encode a string with the signature scheme's unreserved set.
///
/// Unreserved characters (`A-Z a-z 0-9 - _ . ~`) pass through; everything
/// else becomes uppercase `%XX`. When `encode_slash` is false, `/` also
/// passes through (used for the path component).
#[must_use]
pub fn uri_encode(input: &str, encode_slash: bool) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char);
            }
            b'/' if !encode_slash => out.push('/'),
            _ => {
                out.push('%');
                out.push_str(&format!("{byte:02X}"));
            }
        }
    }
    out
}

/// Decode percent sequences in a query component.
///
/// Malformed sequences are kept as literal text rather than rejected; the
/// re-encoding step normalizes them and a signature mismatch surfaces the
/// disagreement.
fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if b == b'%'
            && let (Some(hi), Some(lo)) = (bytes.get(i.wrapping_add(1)), bytes.get(i.wrapping_add(2)))
            && let (Some(hi), Some(lo)) = (
                (*hi as char).to_digit(16),
                (*lo as char).to_digit(16),
            )
        {
            #[allow(clippy::cast_possible_truncation)]
            out.push((hi.wrapping_mul(16).wrapping_add(lo)) as u8);
            i = i.wrapping_add(3);
        } else {
            out.push(b);
            i = i.wrapping_add(1);
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Canonicalize a raw query string: decode, sort by key then value,
/// re-encode strictly, join with `&`.
#[must_use]
pub fn canonical_query_string(raw_query: &str) -> String {
    if raw_query.is_empty() {
        return String::new();
    }

    let mut pairs: Vec<(String, String)> = raw_query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (percent_decode(key), percent_decode(value))
        })
        .collect();
    pairs.sort();

    let encoded: Vec<String> = pairs
        .iter()
        .map(|(key, value)| format!("{}={}", uri_encode(key, true), uri_encode(value, true)))
        .collect();
    encoded.join("&")
}

/// Build the canonical request string and the signed-headers list.
///
/// Headers participate only from the fixed set, in fixed order, with
/// lower-cased names and trimmed values. The payload hash comes from the
/// content-hash header when present, otherwise the unsigned-payload
/// placeholder.
#[must_use]
pub fn canonical_request(req: &GatewayRequest) -> (String, String) {
    let mut canonical_headers = String::new();
    let mut signed_names = Vec::new();
    for name in SIGNED_HEADER_NAMES {
        if let Some(value) = req.header(name) {
            canonical_headers.push_str(name);
            canonical_headers.push(':');
            canonical_headers.push_str(value.trim());
            canonical_headers.push('\n');
            signed_names.push(name);
        }
    }
    let signed_headers = signed_names.join(";");

    let payload_hash = req
        .header("x-amz-content-sha256")
        .map_or(UNSIGNED_PAYLOAD, str::trim);

    let canonical = format!(
        "{}\n{}\n{}\n{}\n{}\n{}",
        req.method(),
        uri_encode(req.path(), false),
        canonical_query_string(req.raw_query()),
        canonical_headers,
        signed_headers,
        payload_hash,
    );
    (canonical, signed_headers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::{IpAddr, Ipv4Addr};

    fn peer() -> IpAddr {
        IpAddr::V4(Ipv4Addr::new(198, 51, 100, 9))
    }

    #[test]
    fn test_uri_encode_unreserved_passthrough() {
        assert_eq!(uri_encode("AZaz09-_.~", true), "AZaz09-_.~");
    }

    #[test]
    fn test_uri_encode_space_and_unicode() {
        assert_eq!(uri_encode("a b", true), "a%20b");
        assert_eq!(uri_encode("é", true), "%C3%A9");
    }

    #[test]
    fn test_uri_encode_slash_modes() {
        assert_eq!(uri_encode("a/b", false), "a/b");
        assert_eq!(uri_encode("a/b", true), "a%2Fb");
    }

    #[test]
    fn test_query_sorted_by_key_then_value() {
        assert_eq!(
            canonical_query_string("b=2&a=1&a=0"),
            "a=0&a=1&b=2"
        );
    }

    #[test]
    fn test_query_valueless_key() {
        assert_eq!(canonical_query_string("flag&a=1"), "a=1&flag=");
    }

    #[test]
    fn test_query_decode_then_strict_reencode() {
        // %7E is '~', which the strict form leaves bare; '+' stays literal
        assert_eq!(canonical_query_string("k=%7Ev"), "k=~v");
        assert_eq!(canonical_query_string("k=a+b"), "k=a%2Bb");
    }

    #[test]
    fn test_canonical_request_shape() {
        let req = GatewayRequest::new("GET", "/bucket/key.txt", peer())
            .with_header("Host", "files.example.com")
            .with_header("x-amz-date", "20260807T120000Z");
        let (canonical, signed) = canonical_request(&req);

        assert_eq!(signed, "host;x-amz-date");
        let lines: Vec<&str> = canonical.split('\n').collect();
        assert_eq!(lines[0], "GET");
        assert_eq!(lines[1], "/bucket/key.txt");
        assert_eq!(lines[2], "");
        assert_eq!(lines[3], "host:files.example.com");
        assert_eq!(lines[4], "x-amz-date:20260807T120000Z");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "host;x-amz-date");
        assert_eq!(lines[7], "UNSIGNED-PAYLOAD");
    }

    #[test]
    fn test_canonical_request_content_hash_header() {
        let empty_body = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";
        let req = GatewayRequest::new("PUT", "/k", peer())
            .with_header("host", "files.example.com")
            .with_header("x-amz-content-sha256", empty_body)
            .with_header("x-amz-date", "20260807T120000Z");
        let (canonical, signed) = canonical_request(&req);
        assert_eq!(signed, "host;x-amz-content-sha256;x-amz-date");
        assert!(canonical.ends_with(empty_body));
    }

    #[test]
    fn test_header_values_trimmed() {
        let req = GatewayRequest::new("GET", "/", peer())
            .with_header("host", "  files.example.com  ");
        let (canonical, _) = canonical_request(&req);
        assert!(canonical.contains("host:files.example.com\n"));
    }
}
