//! HTTP fetcher for deals-site pages.
//!
//! A [`FetcherFactory`] holds the immutable base configuration and the shared
//! connection pool. Each handler invocation asks it for its own [`Fetcher`],
//! so per-request state (the courtesy-delay clock and the retry marker on
//! [`FetchRequest`]) is never visible to concurrent requests.
//!
//! Fetchers have a crawl depth of one: they return the page they were asked
//! for and never follow links found in it.

mod headers;
mod request;

use std::sync::Arc;
use std::time::Duration;

use gundeals_core::AppConfig;
use rand::Rng;
use reqwest::{header::HeaderMap, Client, StatusCode};
use tokio::time::Instant;

use crate::error::{BuildError, FetchError};

pub use headers::browser_headers;
pub use request::{FetchRequest, FetchResponse};

const MAX_REDIRECTS: usize = 5;

/// Shared base configuration every [`Fetcher`] is seeded from.
#[derive(Debug, Clone)]
pub struct FetcherConfig {
    pub user_agent: String,
    pub headers: HeaderMap,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    /// Fixed part of the pause between two requests from one fetcher.
    pub min_delay: Duration,
    /// Upper bound of the random part added on top of `min_delay`.
    pub random_delay: Duration,
}

impl FetcherConfig {
    #[must_use]
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            user_agent: config.user_agent.clone(),
            headers: browser_headers(),
            request_timeout: Duration::from_secs(config.request_timeout_secs),
            connect_timeout: Duration::from_secs(config.connect_timeout_secs),
            min_delay: Duration::from_millis(config.min_request_delay_ms),
            random_delay: Duration::from_millis(config.random_delay_ms),
        }
    }

    fn courtesy_delay(&self) -> Duration {
        let jitter_ms = u64::try_from(self.random_delay.as_millis()).unwrap_or(u64::MAX);
        let jitter = if jitter_ms == 0 {
            0
        } else {
            rand::rng().random_range(0..=jitter_ms)
        };
        self.min_delay + Duration::from_millis(jitter)
    }
}

/// Produces independent [`Fetcher`]s that share one connection pool.
#[derive(Debug, Clone)]
pub struct FetcherFactory {
    client: Client,
    config: Arc<FetcherConfig>,
}

impl FetcherFactory {
    /// Builds the shared `reqwest::Client` from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`BuildError::Client`] if the client cannot be constructed
    /// (e.g., an invalid user agent or TLS backend failure).
    pub fn new(config: FetcherConfig) -> Result<Self, BuildError> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()?;
        Ok(Self {
            client,
            config: Arc::new(config),
        })
    }

    /// Returns a fresh fetcher with its own delay clock.
    #[must_use]
    pub fn fetcher(&self) -> Fetcher {
        Fetcher {
            client: self.client.clone(),
            config: Arc::clone(&self.config),
            last_request: None,
        }
    }
}

/// Issues GET requests with the browser header set and the single
/// retry-on-403 policy.
pub struct Fetcher {
    client: Client,
    config: Arc<FetcherConfig>,
    last_request: Option<Instant>,
}

impl Fetcher {
    /// Fetches `request.url`.
    ///
    /// A 403 is retried exactly once, after the courtesy delay; a second 403
    /// ends in [`FetchError::Blocked`]. Redirects are followed by the client
    /// and any other status outside 2xx/3xx is returned as
    /// [`FetchError::UnexpectedStatus`] without retrying.
    ///
    /// Every failure is logged at warn level before being returned.
    ///
    /// # Errors
    ///
    /// - [`FetchError::Blocked`] — 403 on the original request and on the retry.
    /// - [`FetchError::UnexpectedStatus`] — any other non-success status.
    /// - [`FetchError::Timeout`] — the request deadline elapsed.
    /// - [`FetchError::Http`] — connection, TLS or body read failure.
    pub async fn fetch(&mut self, mut request: FetchRequest) -> Result<FetchResponse, FetchError> {
        loop {
            self.wait_turn().await;

            let status = match self.attempt(&request).await {
                Ok(Attempt::Done(response)) => return Ok(response),
                Ok(Attempt::Status(status)) => status,
                Err(err) => {
                    tracing::warn!(url = %request.url(), error = %err, "page fetch failed");
                    return Err(err);
                }
            };

            if status == StatusCode::FORBIDDEN && !request.retried() {
                tracing::warn!(url = %request.url(), status = status.as_u16(), "403 received, retrying once");
                request.mark_retried();
                continue;
            }

            let err = if status == StatusCode::FORBIDDEN {
                FetchError::Blocked {
                    url: request.url().to_string(),
                }
            } else {
                FetchError::UnexpectedStatus {
                    status: status.as_u16(),
                    url: request.url().to_string(),
                }
            };
            tracing::warn!(
                url = %request.url(),
                status = status.as_u16(),
                error = %err,
                "page fetch failed"
            );
            return Err(err);
        }
    }

    async fn attempt(&self, request: &FetchRequest) -> Result<Attempt, FetchError> {
        let url = request.url().clone();
        let response = self
            .client
            .get(url.clone())
            .headers(self.config.headers.clone())
            .headers(request.headers().clone())
            .send()
            .await
            .map_err(|e| self.transport_error(url.as_str(), e))?;

        let status = response.status();
        if !(status.is_success() || status.is_redirection()) {
            return Ok(Attempt::Status(status));
        }

        let final_url = response.url().clone();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(url.as_str(), e))?;

        Ok(Attempt::Done(FetchResponse {
            status: status.as_u16(),
            url: final_url,
            body,
        }))
    }

    fn transport_error(&self, url: &str, source: reqwest::Error) -> FetchError {
        if source.is_timeout() {
            FetchError::Timeout {
                url: url.to_owned(),
                timeout_secs: self.config.request_timeout.as_secs(),
            }
        } else {
            FetchError::Http {
                url: url.to_owned(),
                source,
            }
        }
    }

    /// Sleeps until the courtesy delay since this fetcher's previous request
    /// has elapsed. The first request is never delayed.
    async fn wait_turn(&mut self) {
        if let Some(last) = self.last_request {
            let delay = self.config.courtesy_delay();
            let elapsed = last.elapsed();
            if delay > elapsed {
                tokio::time::sleep(delay - elapsed).await;
            }
        }
        self.last_request = Some(Instant::now());
    }
}

enum Attempt {
    Done(FetchResponse),
    Status(StatusCode),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(min_ms: u64, random_ms: u64) -> FetcherConfig {
        FetcherConfig {
            user_agent: "gundeals-test/0.1".to_owned(),
            headers: browser_headers(),
            request_timeout: Duration::from_secs(5),
            connect_timeout: Duration::from_secs(5),
            min_delay: Duration::from_millis(min_ms),
            random_delay: Duration::from_millis(random_ms),
        }
    }

    #[test]
    fn courtesy_delay_without_jitter_is_the_minimum() {
        assert_eq!(config(250, 0).courtesy_delay(), Duration::from_millis(250));
    }

    #[test]
    fn courtesy_delay_stays_within_bounds() {
        let cfg = config(100, 50);
        for _ in 0..100 {
            let delay = cfg.courtesy_delay();
            assert!(delay >= Duration::from_millis(100), "delay too short: {delay:?}");
            assert!(delay <= Duration::from_millis(150), "delay too long: {delay:?}");
        }
    }

    #[test]
    fn from_app_config_copies_timeouts_and_delays() {
        let app = AppConfig {
            env: gundeals_core::Environment::Test,
            log_level: "debug".to_owned(),
            site_url: reqwest::Url::parse("https://gun.deals").unwrap(),
            link_domain: "localhost:8080".to_owned(),
            request_timeout_secs: 12,
            connect_timeout_secs: 3,
            user_agent: "ua".to_owned(),
            min_request_delay_ms: 10,
            random_delay_ms: 20,
        };
        let cfg = FetcherConfig::from_app_config(&app);
        assert_eq!(cfg.request_timeout, Duration::from_secs(12));
        assert_eq!(cfg.connect_timeout, Duration::from_secs(3));
        assert_eq!(cfg.min_delay, Duration::from_millis(10));
        assert_eq!(cfg.random_delay, Duration::from_millis(20));
        assert_eq!(cfg.user_agent, "ua");
        assert!(cfg.headers.contains_key("sec-ch-ua"));
    }

    #[tokio::test(start_paused = true)]
    async fn first_request_is_not_delayed_but_second_is() {
        let factory = FetcherFactory::new(config(1_000, 0)).unwrap();
        let mut fetcher = factory.fetcher();

        let start = Instant::now();
        fetcher.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);

        fetcher.wait_turn().await;
        assert!(start.elapsed() >= Duration::from_millis(1_000));
    }

    #[tokio::test(start_paused = true)]
    async fn fetchers_from_one_factory_keep_separate_clocks() {
        let factory = FetcherFactory::new(config(1_000, 0)).unwrap();
        let mut first = factory.fetcher();
        let mut second = factory.fetcher();

        first.wait_turn().await;
        let start = Instant::now();
        second.wait_turn().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }
}
