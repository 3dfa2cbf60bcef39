//! The gateway-facing view of an inbound HTTP request.
//!
//! The gateway does not own routing or a server stack; the embedding
//! server maps whatever framework it uses into a [`GatewayRequest`] and
//! hands it to the decision functions. Only the parts of a request the
//! trust mechanisms consume are represented: method, decoded path, raw
//! query string, headers, and the immediate peer address.

use std::net::IpAddr;

/// An inbound request as seen by the authorization gateway.
#[derive(Debug, Clone)]
pub struct GatewayRequest {
    method: String,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    peer_addr: IpAddr,
}

impl GatewayRequest {
    /// Create a request view with no query string or headers.
    #[must_use]
    pub fn new(method: impl Into<String>, path: impl Into<String>, peer_addr: IpAddr) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query: String::new(),
            headers: Vec::new(),
            peer_addr,
        }
    }

    /// Set the raw query string (without the leading `?`).
    #[must_use]
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.query = query.into();
        self
    }

    /// Append a header. Repeated names are kept as repeated headers.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// HTTP method, as received.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Decoded request path, with leading slash.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw query string without the leading `?` (empty if absent).
    #[must_use]
    pub fn raw_query(&self) -> &str {
        &self.query
    }

    /// Immediate peer address of the connection.
    #[must_use]
    pub fn peer_addr(&self) -> IpAddr {
        self.peer_addr
    }

    /// First value of a header, matched case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// All values of a header, matched case-insensitively, in order.
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }

    /// Number of times a header name appears.
    #[must_use]
    pub fn header_count(&self, name: &str) -> usize {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .count()
    }

    /// First value of a query parameter, percent-decoded.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<String> {
        url::form_urlencoded::parse(self.query.as_bytes())
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.into_owned())
    }
}
