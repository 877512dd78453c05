use std::future::Future;
use std::time::Duration;

use reqwest::{header::HeaderMap, Client, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::config::RetryPolicy;
use super::FetchError;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Rows requested per page
pub const PER_PAGE: u32 = 100;

/// Upper bound on pages for providers that never report a page count
pub const MAX_PAGES: u32 = 50;

/// HTTP client for one stats provider, with rate-limit aware retries
#[derive(Debug, Clone)]
pub struct ProviderClient {
    client: Client,
    base: String,
    retry: RetryPolicy,
}

impl ProviderClient {
    pub fn new(base: &str, headers: HeaderMap, retry: RetryPolicy) -> Result<Self, FetchError> {
        let client = Client::builder()
            .default_headers(headers)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base: base.trim_end_matches('/').to_string(),
            retry,
        })
    }

    pub fn retry(&self) -> &RetryPolicy {
        &self.retry
    }

    /// GET `path` and decode the JSON body.
    ///
    /// 429 and 5xx responses are retried up to `max_retries` times, waiting
    /// `n * backoff` before the n-th retry. Other non-success statuses fail
    /// straight away.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        let url = format!("{}{}", self.base, path);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let response = self.client.get(&url).query(query).send().await?;
            let status = response.status();

            if status.is_success() {
                let body = response.text().await?;
                return serde_json::from_str(&body).map_err(|source| FetchError::Decode { url, source });
            }

            if status != StatusCode::TOO_MANY_REQUESTS && !status.is_server_error() {
                let body = response.text().await.unwrap_or_default();
                return Err(FetchError::Status { status, url, body });
            }

            if attempt > self.retry.max_retries {
                return Err(FetchError::RetriesExhausted {
                    url,
                    attempts: attempt,
                    status,
                });
            }

            let wait = self.retry.delay_for(attempt);
            warn!(
                "{} returned {} (attempt {}/{}), retrying in {:?}",
                url,
                status,
                attempt,
                self.retry.max_retries + 1,
                wait
            );
            tokio::time::sleep(wait).await;
        }
    }
}

/// One page of provider rows
#[derive(Debug)]
pub struct Page<T> {
    pub rows: Vec<T>,
    /// Provider-reported page count, if it has one
    pub total_pages: Option<u32>,
}

/// Walk pages starting at 1 until the provider says there are no more.
///
/// Stops at the reported page count, or at the first empty page when there
/// is none, and never goes past `MAX_PAGES`.
pub async fn collect_pages<T, F, Fut>(page_delay: Duration, mut fetch_page: F) -> Result<Vec<T>, FetchError>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<Page<T>, FetchError>>,
{
    let mut out = Vec::new();
    let mut page = 1;

    loop {
        let Page { rows, total_pages } = fetch_page(page).await?;
        debug!("page {}: {} rows", page, rows.len());

        let exhausted = match total_pages {
            Some(total) => page >= total,
            None => rows.is_empty(),
        };
        out.extend(rows);

        if exhausted {
            break;
        }
        if page >= MAX_PAGES {
            warn!("stopping after {} pages without reaching the end", MAX_PAGES);
            break;
        }

        page += 1;
        tokio::time::sleep(page_delay).await;
    }

    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stops_at_reported_page_count() {
        let mut calls = Vec::new();
        let rows = collect_pages(Duration::ZERO, |page| {
            calls.push(page);
            async move {
                Ok(Page {
                    rows: vec![page; 2],
                    total_pages: Some(3),
                })
            }
        })
        .await
        .unwrap();

        assert_eq!(calls, vec![1, 2, 3]);
        assert_eq!(rows, vec![1, 1, 2, 2, 3, 3]);
    }

    #[tokio::test]
    async fn stops_at_first_empty_page_without_count() {
        let rows = collect_pages(Duration::ZERO, |page| async move {
            let rows = if page < 3 { vec![page] } else { Vec::new() };
            Ok(Page { rows, total_pages: None })
        })
        .await
        .unwrap();

        assert_eq!(rows, vec![1, 2]);
    }

    #[tokio::test]
    async fn never_exceeds_page_cap() {
        let mut last = 0;
        let rows = collect_pages(Duration::ZERO, |page| {
            last = page;
            async move { Ok(Page { rows: vec![page], total_pages: None }) }
        })
        .await
        .unwrap();

        assert_eq!(last, MAX_PAGES);
        assert_eq!(rows.len(), MAX_PAGES as usize);
    }

    #[tokio::test]
    async fn page_errors_propagate() {
        let result: Result<Vec<u32>, _> = collect_pages(Duration::ZERO, |_| async {
            Err(FetchError::PlayerNotFound { name: "x".to_string() })
        })
        .await;

        assert!(matches!(result, Err(FetchError::PlayerNotFound { .. })));
    }
}
