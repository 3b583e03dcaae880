//! HTTP client setup for image transfers.
//!
//! The image host rejects requests without a `Referer` pointing at the app
//! API, so the default configuration carries one. Requests are traced with
//! `reqwest-tracing` and transient failures are retried with exponential
//! backoff before the download executor sees them.
//!
//! ```rust
//! use pixie::http::{create_http_client, HttpClientConfig};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = create_http_client(HttpClientConfig::default())?;
//! # Ok(())
//! # }
//! ```

use reqwest::header::{HeaderMap, HeaderValue, IntoHeaderName, REFERER};
use reqwest::Proxy;
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use reqwest_tracing::TracingMiddleware;

/// Referer expected by the image host.
pub const IMAGE_REFERER: &str = "https://app-api.pixiv.net/";

/// Configuration for HTTP client setup.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Number of retries for transient request failures.
    pub retries: u32,
    /// Optional proxy configuration.
    pub proxy: Option<Proxy>,
    /// Default headers sent with every request.
    pub headers: Option<HeaderMap>,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        let mut headers = HeaderMap::new();
        headers.insert(REFERER, HeaderValue::from_static(IMAGE_REFERER));

        Self {
            retries: 3,
            proxy: None,
            headers: Some(headers),
        }
    }
}

impl HttpClientConfig {
    /// Add one default header, keeping the existing ones.
    pub fn header<K: IntoHeaderName>(mut self, name: K, value: HeaderValue) -> Self {
        self.headers
            .get_or_insert_with(HeaderMap::new)
            .insert(name, value);
        self
    }
}

/// Creates an HTTP client with tracing and retry middleware.
pub fn create_http_client(
    config: HttpClientConfig,
) -> Result<ClientWithMiddleware, reqwest::Error> {
    let retry_policy = ExponentialBackoff::builder().build_with_max_retries(config.retries);

    let mut inner_client_builder = reqwest::Client::builder();

    if let Some(proxy) = config.proxy {
        inner_client_builder = inner_client_builder.proxy(proxy);
    }

    if let Some(headers) = config.headers {
        inner_client_builder = inner_client_builder.default_headers(headers);
    }

    let inner_client = inner_client_builder.build()?;

    let client = ClientBuilder::new(inner_client)
        .with(TracingMiddleware::default())
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

    Ok(client)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::USER_AGENT;

    #[test]
    fn test_default_config_sends_referer() {
        let config = HttpClientConfig::default();
        assert_eq!(config.retries, 3);
        assert!(config.proxy.is_none());
        assert_eq!(
            config.headers.as_ref().and_then(|h| h.get(REFERER)),
            Some(&HeaderValue::from_static(IMAGE_REFERER))
        );
    }

    #[test]
    fn test_header_keeps_referer() {
        let config =
            HttpClientConfig::default().header(USER_AGENT, HeaderValue::from_static("pixie-test"));
        let headers = config.headers.unwrap();
        assert!(headers.contains_key(REFERER));
        assert!(headers.contains_key(USER_AGENT));
    }

    #[test]
    fn test_create_http_client_default() {
        assert!(create_http_client(HttpClientConfig::default()).is_ok());
    }
}
