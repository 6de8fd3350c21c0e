use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use reqwest::{Client, Url};
use tracing::{info, warn};

use crate::classify::{ErrorKind, ResponseError};
use crate::config::HttpConfig;
use crate::method::HttpMethod;

pub const DEFAULT_URL: &str = "https://api.github.com";

/// Raw outcome of a request, before classification.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub duration_ms: u64,
}

/// Owns the pooled HTTP client. Cloning shares the pool.
#[derive(Debug, Clone)]
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(config: &HttpConfig) -> Result<Self, reqwest::Error> {
        let redirect = if config.follow_redirects {
            Policy::limited(config.max_redirects as usize)
        } else {
            Policy::none()
        };
        let mut builder = Client::builder()
            .redirect(redirect)
            .user_agent(config.user_agent.clone());
        if config.timeout > 0 {
            builder = builder.timeout(Duration::from_secs(config.timeout));
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn fetch(&self, method: HttpMethod, url: &str) -> Result<Fetched, ResponseError> {
        let url = url.trim();
        if !is_valid_url(url) {
            warn!(url, "rejected invalid URL");
            return Err(ResponseError::new(ErrorKind::InvalidUrl, ""));
        }

        info!(%method, url, "sending request");
        let start = Instant::now();

        let response = self
            .client
            .request(method.into(), url)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %e, "request failed");
                ResponseError::new(ErrorKind::RequestFailed, format_request_error(e))
            })?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_string();

        let body = response.bytes().await.map_err(|e| {
            warn!(error = %e, "failed to read body");
            ResponseError::new(ErrorKind::BodyReadFailed, e.to_string())
        })?;

        let duration_ms = start.elapsed().as_millis() as u64;
        info!(status, content_type = %content_type, bytes = body.len(), duration_ms, "response received");

        Ok(Fetched {
            status,
            content_type,
            body: body.to_vec(),
            duration_ms,
        })
    }
}

/// An absolute URL with both a scheme and a non-empty host.
pub fn is_valid_url(input: &str) -> bool {
    match Url::parse(input) {
        Ok(url) => !url.scheme().is_empty() && url.host_str().is_some_and(|h| !h.is_empty()),
        Err(_) => false,
    }
}

fn format_request_error(err: reqwest::Error) -> String {
    if err.is_timeout() {
        return "Request timed out".to_string();
    }
    if err.is_connect() {
        if let Some(url) = err.url() {
            if let Some(host) = url.host_str() {
                return format!("Connection failed: {}", host);
            }
        }
        return "Connection failed".to_string();
    }
    if err.is_builder() {
        return format!("Invalid request: {}", err);
    }
    if err.is_redirect() {
        return "Too many redirects".to_string();
    }
    format!("Request failed: {}", err)
}
