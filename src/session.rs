// src/session.rs
use crate::types::{Config, SubScoutError};
use governor::{Jitter, Quota};
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;
use std::collections::HashMap;
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

/// Browser profiles rotated per session; scraped sources answer these
/// more reliably than a tool UA.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/119.0.0.0 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0",
];

#[derive(Clone)]
pub struct Session {
    pub client: Client,
    rate_limiters: Arc<HashMap<String, Arc<governor::DefaultDirectRateLimiter>>>,
}

impl Session {
    pub fn new(config: &Config) -> Result<Self, SubScoutError> {
        let user_agent = config.user_agent.clone().unwrap_or_else(|| {
            use rand::seq::SliceRandom;
            USER_AGENTS
                .choose(&mut rand::thread_rng())
                .unwrap_or(&USER_AGENTS[0])
                .to_string()
        });

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,application/json;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.8"));

        let mut client_builder = Client::builder()
            .timeout(config.timeout)
            .user_agent(user_agent)
            .default_headers(headers)
            .gzip(true)
            .deflate(true)
            .connect_timeout(Duration::from_secs(10))
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(10);

        if let Some(proxy_url) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy_url)
                .map_err(|e| SubScoutError::ConfigError(format!("Invalid proxy URL: {}", e)))?;
            client_builder = client_builder.proxy(proxy);
        }

        let client = client_builder.build().map_err(|e| {
            SubScoutError::ConfigError(format!("Failed to build HTTP client: {}", e))
        })?;

        let mut rate_limiters = HashMap::new();
        for (source, rate_limit) in &config.rate_limits {
            if let Some(limit) = rate_limit.and_then(NonZeroU32::new) {
                let quota = Quota::per_second(limit)
                    .allow_burst(NonZeroU32::new(1).expect("non-zero burst"));
                rate_limiters.insert(
                    source.clone(),
                    Arc::new(governor::RateLimiter::direct(quota)),
                );
            }
        }

        Ok(Session {
            client,
            rate_limiters: Arc::new(rate_limiters),
        })
    }

    /// Block until the per-source quota admits another request. Sources
    /// without a configured quota pass through immediately.
    pub async fn wait_for_rate_limit(&self, source: &str) {
        if let Some(limiter) = self.rate_limiters.get(source) {
            limiter
                .until_ready_with_jitter(Jitter::up_to(Duration::from_millis(100)))
                .await;
        }
    }

    /// Fetch a URL and return the response body. Every transport-level
    /// failure and every non-2xx status collapses to `None`; callers
    /// treat absence uniformly regardless of cause.
    pub async fn get_text(&self, url: &str) -> Option<String> {
        let response = match self.client.get(url).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("GET {} failed: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("GET {} returned status {}", url, response.status());
            return None;
        }
        response.text().await.ok()
    }

    /// POST a form and return the response body, with the same uniform
    /// absence semantics as `get_text`.
    pub async fn post_form_text(&self, url: &str, form: &[(&str, &str)]) -> Option<String> {
        let response = match self.client.post(url).form(form).send().await {
            Ok(response) => response,
            Err(e) => {
                debug!("POST {} failed: {}", url, e);
                return None;
            }
        };
        if !response.status().is_success() {
            debug!("POST {} returned status {}", url, response.status());
            return None;
        }
        response.text().await.ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_session() -> Session {
        Session::new(&Config::default()).expect("session")
    }

    #[tokio::test]
    async fn test_get_text_returns_body_on_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/ok")
            .with_status(200)
            .with_body("hello")
            .create_async()
            .await;

        let body = test_session().get_text(&format!("{}/ok", server.url())).await;
        mock.assert_async().await;
        assert_eq!(body.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_get_text_absent_on_error_status() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/denied")
            .with_status(503)
            .with_body("slow down")
            .create_async()
            .await;

        let body = test_session()
            .get_text(&format!("{}/denied", server.url()))
            .await;
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_get_text_absent_on_connect_failure() {
        // Reserved port with nothing listening.
        let body = test_session().get_text("http://127.0.0.1:1/none").await;
        assert!(body.is_none());
    }
}
