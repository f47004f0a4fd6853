//! Reading the presented API key

use axum::http::HeaderMap;

pub const API_KEY_HEADER: &str = "x-api-key";

/// Raw value of the `x-api-key` header, trimmed. Empty when absent or unreadable.
pub fn presented_api_key(headers: &HeaderMap) -> String {
    headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.trim().to_string())
        .unwrap_or_default()
}

/// First `x-forwarded-for` hop, or `"unknown"`
pub fn caller_address(headers: &HeaderMap) -> String {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .unwrap_or("unknown")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presented_api_key() {
        let mut headers = HeaderMap::new();
        assert_eq!(presented_api_key(&headers), "");

        headers.insert(API_KEY_HEADER, "  dk_dev_abc  ".parse().unwrap());
        assert_eq!(presented_api_key(&headers), "dk_dev_abc");
    }

    #[test]
    fn test_caller_address() {
        let mut headers = HeaderMap::new();
        assert_eq!(caller_address(&headers), "unknown");

        headers.insert("x-forwarded-for", " 203.0.113.7 , 10.0.0.1".parse().unwrap());
        assert_eq!(caller_address(&headers), "203.0.113.7");
    }
}
