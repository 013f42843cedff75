//! HTTP client for storefront crawling
//!
//! One reused `reqwest` client plus an optional request-rate limit. Requests
//! are issued one at a time by the crawler; nothing here retries.

use std::num::NonZeroU32;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use governor::{
    Quota, RateLimiter,
    clock::DefaultClock,
    state::{InMemoryState, direct::NotKeyed},
};
use reqwest::{
    Client, Response,
    header::{HeaderMap, HeaderValue, USER_AGENT},
};

use crate::domain::PageFetcher;
use crate::infrastructure::config::HttpClientConfig;
use crate::infrastructure::parsing_error::{ParsingError, ParsingResult};

pub struct HttpClient {
    client: Client,
    rate_limiter: Option<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
    config: HttpClientConfig,
}

impl HttpClient {
    /// Create a new HTTP client with the given configuration
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent).context("Invalid user agent")?,
        );

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .default_headers(headers)
            .gzip(true)
            .redirect(if config.follow_redirects {
                reqwest::redirect::Policy::limited(10)
            } else {
                reqwest::redirect::Policy::none()
            })
            .build()
            .context("Failed to create HTTP client")?;

        let rate_limiter = NonZeroU32::new(config.max_requests_per_second)
            .map(|rps| RateLimiter::direct(Quota::per_second(rps)));

        Ok(Self {
            client,
            rate_limiter,
            config,
        })
    }

    /// GET a URL, failing on transport errors and non-2xx statuses
    async fn get(&self, url: &str) -> ParsingResult<Response> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        tracing::info!("Fetching URL: {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| network_failure(url, &e))?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("HTTP error {} for {}", status, url);
            return Err(ParsingError::HttpRequestFailed {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        tracing::debug!("Successfully fetched: {} ({})", url, status);
        Ok(response)
    }

    /// Get the configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    pub fn is_rate_limited(&self) -> bool {
        self.rate_limiter.is_some()
    }
}

#[async_trait]
impl PageFetcher for HttpClient {
    async fn fetch_text(&self, url: &str) -> ParsingResult<String> {
        let response = self.get(url).await?;
        response.text().await.map_err(|e| network_failure(url, &e))
    }

    async fn fetch_bytes(&self, url: &str) -> ParsingResult<Vec<u8>> {
        let response = self.get(url).await?;
        let bytes = response.bytes().await.map_err(|e| network_failure(url, &e))?;
        Ok(bytes.to_vec())
    }
}

fn network_failure(url: &str, err: &reqwest::Error) -> ParsingError {
    ParsingError::NetworkFailure {
        url: url.to_string(),
        message: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Answer every connection with a fixed raw HTTP response
    async fn serve_fixed(response: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut request = [0u8; 2048];
                let _ = socket.read(&mut request).await;
                let _ = socket.write_all(response.as_bytes()).await;
                let _ = socket.shutdown().await;
            }
        });

        format!("http://{addr}/collections/past?page=9")
    }

    fn unlimited_client() -> HttpClient {
        HttpClient::new(HttpClientConfig {
            timeout_seconds: 5,
            max_requests_per_second: 0,
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_http_client_creation() {
        let client = HttpClient::new(HttpClientConfig::default()).unwrap();
        assert!(client.is_rate_limited());
    }

    #[test]
    fn zero_rate_disables_limiting() {
        let config = HttpClientConfig {
            max_requests_per_second: 0,
            ..Default::default()
        };
        let client = HttpClient::new(config).unwrap();
        assert!(!client.is_rate_limited());
        assert_eq!(client.config().max_requests_per_second, 0);
    }

    #[test]
    fn invalid_user_agent_is_rejected() {
        let config = HttpClientConfig {
            user_agent: "bad\nagent".to_string(),
            ..Default::default()
        };
        assert!(HttpClient::new(config).is_err());
    }

    #[tokio::test]
    async fn unreachable_host_is_a_network_failure() {
        let config = HttpClientConfig {
            timeout_seconds: 2,
            max_requests_per_second: 0,
            ..Default::default()
        };
        let client = HttpClient::new(config).unwrap();
        let err = client.fetch_text("http://127.0.0.1:9/listing").await.unwrap_err();
        assert!(matches!(err, ParsingError::NetworkFailure { .. }));
        assert!(!err.ends_pagination());
    }

    #[tokio::test]
    async fn not_found_status_ends_pagination() {
        let url = serve_fixed(
            "HTTP/1.1 404 Not Found\r\nContent-Length: 9\r\nConnection: close\r\n\r\nnot found",
        )
        .await;
        let client = unlimited_client();

        let err = client.fetch_text(&url).await.unwrap_err();
        assert_eq!(
            err,
            ParsingError::HttpRequestFailed {
                status: 404,
                url: url.clone()
            }
        );
        assert!(err.ends_pagination());

        let err = client.fetch_bytes(&url).await.unwrap_err();
        assert!(matches!(err, ParsingError::HttpRequestFailed { status: 404, .. }));
    }

    #[tokio::test]
    async fn success_status_returns_body() {
        let url = serve_fixed(
            "HTTP/1.1 200 OK\r\nContent-Type: text/html\r\nContent-Length: 9\r\nConnection: close\r\n\r\n<p>ok</p>",
        )
        .await;
        let client = unlimited_client();

        assert_eq!(client.fetch_text(&url).await.unwrap(), "<p>ok</p>");
        assert_eq!(client.fetch_bytes(&url).await.unwrap(), b"<p>ok</p>");
    }
}
