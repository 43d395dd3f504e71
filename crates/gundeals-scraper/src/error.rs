use thiserror::Error;

/// Failure to obtain a page from the upstream site.
///
/// A `FetchError` always aborts the pipeline for the request that produced
/// it; there are no partial results.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid fetch URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    #[error("HTTP error fetching {url}: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("blocked by {url} (HTTP 403) after one retry")]
    Blocked { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },
}

impl FetchError {
    /// Upstream HTTP status carried by this error, if the request got as far
    /// as a response.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            FetchError::Blocked { .. } => Some(403),
            FetchError::UnexpectedStatus { status, .. } => Some(*status),
            FetchError::Http { source, .. } => source.status().map(|s| s.as_u16()),
            FetchError::InvalidUrl { .. } | FetchError::Timeout { .. } => None,
        }
    }
}

/// A rule set that cannot be compiled.
#[derive(Debug, Error)]
pub enum RuleError {
    #[error("rule set {rule_set}: invalid selector \"{selector}\": {reason}")]
    InvalidSelector {
        rule_set: &'static str,
        selector: &'static str,
        reason: String,
    },

    #[error("rule set {rule_set}: field {field} derives from \"{details}\", which is not an earlier details rule")]
    UnknownDetailsField {
        rule_set: &'static str,
        field: &'static str,
        details: &'static str,
    },
}

/// Startup failure while wiring the pipeline together.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),

    #[error(transparent)]
    Rules(#[from] RuleError),
}
