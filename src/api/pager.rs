//! Throttled, rate-limit aware fetching
//!
//! Every request the audit makes goes through [`ThrottledPager`]. Requests are
//! issued one at a time:
//! - HTTP 429 suspends for the `Retry-After` period and reissues the same URL
//! - every other completed response is followed by the fixed request delay
//! - collections are walked by following `Link: rel="next"` until it is absent

use crate::api::link::{next_link, retry_after_secs};
use crate::config::PagerConfig;
use crate::{AuditError, Result};
use reqwest::header::{HeaderMap, LINK, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;
use url::Url;

/// Upper bound on a single server-requested backoff (seconds)
const MAX_BACKOFF_SECS: f64 = 3600.0;

/// Where the items of a collection live inside one response payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// The payload itself is the item array
    Array,
    /// The item array sits under the named field of an object
    Field(&'static str),
}

impl Extract {
    /// Takes the item array out of a payload, or `None` if it is missing
    pub fn items(&self, payload: Value) -> Option<Vec<Value>> {
        match (self, payload) {
            (Self::Array, Value::Array(items)) => Some(items),
            (Self::Field(name), Value::Object(mut map)) => match map.remove(*name) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            },
            _ => None,
        }
    }
}

/// Serial HTTP fetcher with rate-limit backoff and a courtesy delay
#[derive(Debug, Clone)]
pub struct ThrottledPager {
    client: Client,
    access_token: Option<String>,
    config: PagerConfig,
}

impl ThrottledPager {
    pub fn new(client: Client, access_token: Option<String>, config: PagerConfig) -> Self {
        Self {
            client,
            access_token,
            config,
        }
    }

    pub fn config(&self) -> &PagerConfig {
        &self.config
    }

    /// Sleeps for the fixed inter-request delay
    pub async fn pause(&self) {
        let delay = self.config.request_delay();
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    /// Walks a paginated collection and returns every item in arrival order
    ///
    /// Any non-429 response is decoded the same way. An error status whose
    /// body holds no item array (e.g. `{"errors": [...]}`) contributes nothing.
    ///
    /// # Errors
    ///
    /// * `AuditError::Transport` - the request could not be completed
    /// * `AuditError::Decode` - a body was not JSON or an item did not match `T`
    /// * `AuditError::PageLimitExceeded` - more than `max-pages` pages were offered
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        seed: Url,
        extract: Extract,
    ) -> Result<Vec<T>> {
        let mut items: Vec<T> = Vec::new();
        let mut pages: u32 = 0;
        let mut current = Some(seed.clone());

        while let Some(url) = current.take() {
            if pages >= self.config.max_pages {
                return Err(AuditError::PageLimitExceeded {
                    url: seed.to_string(),
                    max_pages: self.config.max_pages,
                });
            }

            let response = self.send(&url).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                self.back_off(&url, response.headers()).await;
                current = Some(url);
                continue;
            }

            if !status.is_success() {
                tracing::warn!("{} returned HTTP {}, keeping only items in its body", url, status);
            }

            let next = response
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(|header| next_link(header, &url));

            let payload = decode_body(response, &url).await?;
            pages += 1;

            match extract.items(payload) {
                Some(page_items) => {
                    let decoded: Vec<T> = serde_json::from_value(Value::Array(page_items))
                        .map_err(|source| AuditError::Decode {
                            url: url.to_string(),
                            source,
                        })?;
                    items.extend(decoded);
                }
                None => {
                    tracing::warn!("No {:?} items in response from {}", extract, url);
                }
            }

            tracing::debug!(
                "Fetched page {} of {} ({} items so far)",
                pages,
                seed.path(),
                items.len()
            );

            self.pause().await;
            current = next;
        }

        Ok(items)
    }

    /// Fetches a single JSON resource
    ///
    /// Rate limiting is handled as in [`fetch_all`](Self::fetch_all) but only
    /// `page-body-attempts` attempts are made. A non-success response, or
    /// running out of attempts, yields `Ok(None)`.
    pub async fn fetch_one<T: DeserializeOwned>(&self, url: Url) -> Result<Option<T>> {
        for attempt in 1..=self.config.page_body_attempts {
            let response = self.send(&url).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                tracing::debug!(
                    "Attempt {}/{} for {} was rate limited",
                    attempt,
                    self.config.page_body_attempts,
                    url
                );
                self.back_off(&url, response.headers()).await;
                continue;
            }

            if !status.is_success() {
                tracing::debug!("{} returned HTTP {}, treating as unavailable", url, status);
                return Ok(None);
            }

            let payload = decode_body(response, &url).await?;
            return serde_json::from_value(payload)
                .map(Some)
                .map_err(|source| AuditError::Decode {
                    url: url.to_string(),
                    source,
                });
        }

        tracing::warn!(
            "Giving up on {} after {} rate-limited attempts",
            url,
            self.config.page_body_attempts
        );
        Ok(None)
    }

    /// Issues one GET with credentials attached
    async fn send(&self, url: &Url) -> Result<Response> {
        let mut request = self.client.get(url.clone());
        if let Some(token) = &self.access_token {
            request = request.bearer_auth(token);
        }

        request.send().await.map_err(|source| AuditError::Transport {
            url: url.to_string(),
            source,
        })
    }

    /// Suspends for the period a 429 response asks for
    async fn back_off(&self, url: &Url, headers: &HeaderMap) {
        let delay = self.backoff_delay(headers);
        tracing::warn!(
            "Rate limit hit on {}, waiting {:.1}s",
            url.path(),
            delay.as_secs_f64()
        );
        tokio::time::sleep(delay).await;
    }

    fn backoff_delay(&self, headers: &HeaderMap) -> Duration {
        let header = headers.get(RETRY_AFTER).and_then(|v| v.to_str().ok());
        let secs = retry_after_secs(header, self.config.retry_after_default).min(MAX_BACKOFF_SECS);
        self.config.retry_after_unit().mul_f64(secs)
    }
}

/// Reads a response body and parses it as JSON
async fn decode_body(response: Response, url: &Url) -> Result<Value> {
    let bytes = response
        .bytes()
        .await
        .map_err(|source| AuditError::Transport {
            url: url.to_string(),
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| AuditError::Decode {
        url: url.to_string(),
        source,
    })
}
