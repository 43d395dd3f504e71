use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Url;

use crate::error::FetchError;

/// One page fetch: a validated absolute http(s) URL plus optional header
/// overrides, and the marker recording whether the 403 retry was spent.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    url: Url,
    headers: HeaderMap,
    retried: bool,
}

impl FetchRequest {
    /// Parses and validates `url`.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] if `url` is not an absolute URL with
    /// an `http` or `https` scheme and a host.
    pub fn new(url: &str) -> Result<Self, FetchError> {
        let parsed = Url::parse(url).map_err(|e| FetchError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;
        Self::from_url(parsed)
    }

    /// Validates an already parsed URL.
    ///
    /// # Errors
    ///
    /// Returns [`FetchError::InvalidUrl`] for non-http(s) schemes or URLs
    /// without a host.
    pub fn from_url(url: Url) -> Result<Self, FetchError> {
        if !matches!(url.scheme(), "http" | "https") {
            return Err(FetchError::InvalidUrl {
                reason: format!("unsupported scheme \"{}\"", url.scheme()),
                url: url.into(),
            });
        }
        if url.host_str().is_none() {
            return Err(FetchError::InvalidUrl {
                url: url.into(),
                reason: "missing host".to_owned(),
            });
        }
        Ok(Self {
            url,
            headers: HeaderMap::new(),
            retried: false,
        })
    }

    /// Adds a header that replaces the base browser header of the same name
    /// for this request only.
    #[must_use]
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    #[must_use]
    pub fn retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }
}

/// A successfully fetched page.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub status: u16,
    /// Final URL after redirects.
    pub url: Url,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_absolute_https_url() {
        let request = FetchRequest::new("https://gun.deals/today").unwrap();
        assert_eq!(request.url().as_str(), "https://gun.deals/today");
        assert!(!request.retried());
        assert!(request.headers().is_empty());
    }

    #[test]
    fn rejects_relative_url() {
        let err = FetchRequest::new("/today").unwrap_err();
        assert!(
            matches!(err, FetchError::InvalidUrl { .. }),
            "expected InvalidUrl, got: {err:?}"
        );
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = FetchRequest::new("ftp://gun.deals/today").unwrap_err();
        assert!(matches!(err, FetchError::InvalidUrl { ref reason, .. } if reason.contains("ftp")));
    }

    #[test]
    fn header_override_is_kept_per_request() {
        let request = FetchRequest::new("https://gun.deals/")
            .unwrap()
            .with_header(
                reqwest::header::REFERER,
                HeaderValue::from_static("https://duckduckgo.com/"),
            );
        assert_eq!(request.headers()["referer"], "https://duckduckgo.com/");
    }

    #[test]
    fn mark_retried_sets_marker_on_this_request_only() {
        let original = FetchRequest::new("https://gun.deals/").unwrap();
        let mut copy = original.clone();
        copy.mark_retried();
        assert!(copy.retried());
        assert!(!original.retried());
    }
}
