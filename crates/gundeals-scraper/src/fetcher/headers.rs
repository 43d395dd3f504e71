//! Browser header set sent with every upstream request.
//!
//! The deals site scores requests on how closely they resemble a desktop
//! Chrome navigation. Requests missing the client-hint (`Sec-*`) headers or
//! the search-engine `Referer` are rejected with 403 far more often, so this
//! set is part of the contract with the site and changes here should be
//! checked against live traffic.

use reqwest::header::{
    HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, CACHE_CONTROL, CONNECTION,
    REFERER, UPGRADE_INSECURE_REQUESTS,
};

const BROWSER_HEADERS: [(&str, &str); 7] = [
    (
        "sec-ch-ua",
        "\"Chromium\";v=\"122\", \"Not(A:Brand\";v=\"24\", \"Google Chrome\";v=\"122\"",
    ),
    ("sec-ch-ua-mobile", "?0"),
    ("sec-ch-ua-platform", "\"Windows\""),
    ("sec-fetch-dest", "document"),
    ("sec-fetch-mode", "navigate"),
    ("sec-fetch-site", "none"),
    ("sec-fetch-user", "?1"),
];

/// Builds the fixed desktop-browser header set.
///
/// `User-Agent` is not included; it is configured on the HTTP client so a
/// single value applies to every fetcher built from the same factory.
#[must_use]
pub fn browser_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(
        ACCEPT,
        HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
        ),
    );
    headers.insert(REFERER, HeaderValue::from_static("https://www.google.com/"));
    headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.9"));
    for (name, value) in BROWSER_HEADERS {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers.insert(UPGRADE_INSECURE_REQUESTS, HeaderValue::from_static("1"));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("max-age=0"));
    headers.insert(CONNECTION, HeaderValue::from_static("keep-alive"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn includes_client_hints_and_referer() {
        let headers = browser_headers();
        assert_eq!(headers["referer"], "https://www.google.com/");
        assert_eq!(headers["sec-ch-ua-mobile"], "?0");
        assert_eq!(headers["sec-fetch-mode"], "navigate");
        assert_eq!(headers["connection"], "keep-alive");
        assert!(headers["accept"].to_str().unwrap().starts_with("text/html"));
    }

    #[test]
    fn leaves_user_agent_to_the_client() {
        assert!(!browser_headers().contains_key(reqwest::header::USER_AGENT));
    }
}
