//! HTTP transport over reqwest
//!
//! Holds the session cookie set by login, the fixed request timeout, and the
//! blanket retry policy for connection-level failures. Responses are returned
//! as-is; interpreting them is the envelope decoder's job.

use crate::config::ClientConfig;
use crate::domain::ports::{ApiRequest, Method, RawResponse, Transport, TransportError};
use crate::error::{Error, Result};
use async_trait::async_trait;
use backoff::ExponentialBackoffBuilder;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Client, Url};
use std::time::Duration;
use tracing::{debug, warn};

/// Transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    retry_count: u32,
}

impl HttpTransport {
    /// Build a transport from client configuration
    pub fn new(config: &ClientConfig) -> Result<Self> {
        config.validate()?;

        let mut base_url = Url::parse(&config.url)
            .map_err(|e| Error::Configuration(format!("invalid url {}: {}", config.url, e)))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(config.timeout_secs))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .cookie_store(true)
            .build()
            .map_err(|e| Error::Configuration(format!("cannot build http client: {}", e)))?;

        debug!("Successfully initialized http transport for {}", base_url);

        Ok(Self {
            client,
            base_url,
            retry_count: config.retry_count,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn request_builder(&self, url: &Url, request: &ApiRequest) -> std::result::Result<reqwest::RequestBuilder, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, url.clone());
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header {}: {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header value {}: {}", value, e)))?;
            builder = builder.header(name, value);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }
        Ok(builder)
    }

    async fn send_once(&self, url: &Url, request: &ApiRequest) -> std::result::Result<RawResponse, TransportError> {
        let response = self.request_builder(url, request)?.send().await?;

        let status = response.status();
        let url = response.url().to_string();
        let body = response.bytes().await?;

        Ok(RawResponse {
            url,
            status: status.as_u16(),
            status_text: status.to_string(),
            body: body.to_vec(),
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> std::result::Result<RawResponse, TransportError> {
        let url = self
            .base_url
            .join(&request.path)
            .map_err(|e| TransportError::InvalidRequest(format!("{}: {}", request.path, e)))?;

        debug!("{} {}", request.method, url);

        let policy = ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(100))
            .with_max_interval(Duration::from_secs(2))
            .with_max_elapsed_time(None)
            .build();

        let retry_count = self.retry_count;
        let mut attempt = 0u32;
        let url = &url;
        let request = &request;

        backoff::future::retry(policy, || {
            attempt += 1;
            let current = attempt;
            async move {
                match self.send_once(url, request).await {
                    Ok(response) => Ok(response),
                    Err(TransportError::Http(e))
                        if (e.is_connect() || e.is_timeout()) && current <= retry_count =>
                    {
                        warn!("{} {} failed (attempt {}): {}", request.method, url, current, e);
                        Err(backoff::Error::transient(TransportError::Http(e)))
                    }
                    Err(e) => Err(backoff::Error::permanent(e)),
                }
            }
        })
        .await
    }
}
