use axum::http::HeaderMap;
use std::net::SocketAddr;

pub const UNKNOWN: &str = "unknown";

/// Best-effort client identifiers attached to every view log row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientInfo {
    pub ip_address: String,
    pub user_agent: String,
}

/// Resolve the client address and user agent for a log write.
///
/// The fallback order is a contract downstream analytics depend on:
/// explicit payload value, then proxy headers (`x-forwarded-for` first
/// entry, then `x-real-ip`), then the direct connection address, then
/// the literal "unknown". The first present, non-empty value wins.
pub fn resolve_client_info(
    explicit_ip: Option<&str>,
    explicit_user_agent: Option<&str>,
    headers: &HeaderMap,
    remote_addr: Option<SocketAddr>,
) -> ClientInfo {
    let ip_address = non_empty(explicit_ip)
        .or_else(|| forwarded_for(headers))
        .or_else(|| header_value(headers, "x-real-ip"))
        .or_else(|| remote_addr.map(|a| a.ip().to_string()))
        .unwrap_or_else(|| UNKNOWN.to_string());

    let user_agent = non_empty(explicit_user_agent)
        .or_else(|| header_value(headers, "user-agent"))
        .unwrap_or_else(|| UNKNOWN.to_string());

    ClientInfo {
        ip_address,
        user_agent,
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.split(',').next())
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn addr() -> SocketAddr {
        "10.0.0.9:4321".parse().unwrap()
    }

    #[test]
    fn explicit_payload_wins() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("1.2.3.4"));
        headers.insert("user-agent", HeaderValue::from_static("curl/8.0"));
        let info = resolve_client_info(
            Some("203.0.113.7"),
            Some("custom-agent"),
            &headers,
            Some(addr()),
        );
        assert_eq!(info.ip_address, "203.0.113.7");
        assert_eq!(info.user_agent, "custom-agent");
    }

    #[test]
    fn forwarded_header_beats_connection_addr() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("1.2.3.4, 5.6.7.8"),
        );
        let info = resolve_client_info(None, None, &headers, Some(addr()));
        assert_eq!(info.ip_address, "1.2.3.4");
    }

    #[test]
    fn real_ip_used_when_no_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("9.9.9.9"));
        let info = resolve_client_info(None, None, &headers, Some(addr()));
        assert_eq!(info.ip_address, "9.9.9.9");
    }

    #[test]
    fn connection_addr_used_when_no_headers() {
        let headers = HeaderMap::new();
        let info = resolve_client_info(None, None, &headers, Some(addr()));
        assert_eq!(info.ip_address, "10.0.0.9");
        assert_eq!(info.user_agent, UNKNOWN);
    }

    #[test]
    fn unknown_when_nothing_available() {
        let headers = HeaderMap::new();
        let info = resolve_client_info(None, None, &headers, None);
        assert_eq!(info.ip_address, UNKNOWN);
        assert_eq!(info.user_agent, UNKNOWN);
    }

    #[test]
    fn empty_values_are_skipped() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("  "));
        let info = resolve_client_info(Some(""), None, &headers, Some(addr()));
        assert_eq!(info.ip_address, "10.0.0.9");
    }
}
