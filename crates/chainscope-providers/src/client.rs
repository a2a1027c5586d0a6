// SPDX-FileCopyrightText: 2026 Chainscope Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Shared JSON-over-HTTP client and failure classification.
//!
//! Every adapter goes through [`JsonClient`], so the mapping from HTTP status
//! and transport errors to [`ProviderError`] is identical across providers:
//!
//! | Response | Error |
//! |---|---|
//! | 429 | `RateLimited` (with `Retry-After` seconds when present) |
//! | 400, 401, 403, 404, 422 | `BadRequest` |
//! | 408, 504, client timeout | `Timeout` |
//! | other non-2xx, connect failure, unparsable body | `Unavailable` |

use std::time::Duration;

use chainscope_core::{ChainscopeError, ProviderError, QueryRequest};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, RETRY_AFTER};
use reqwest::{RequestBuilder, StatusCode, Url};
use secrecy::SecretString;
use serde_json::Value;
use tracing::debug;

/// Longest error body excerpt kept in error messages.
const BODY_EXCERPT: usize = 200;

/// HTTP client bound to one provider.
#[derive(Debug, Clone)]
pub struct JsonClient {
    client: reqwest::Client,
    provider: &'static str,
}

impl JsonClient {
    /// Builds a client with a per-request `timeout` and default `headers`.
    pub fn new(
        provider: &'static str,
        timeout: Duration,
        headers: HeaderMap,
    ) -> Result<Self, ChainscopeError> {
        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .user_agent(concat!("chainscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                ChainscopeError::Internal(format!("failed to build HTTP client for {provider}: {e}"))
            })?;
        Ok(Self { client, provider })
    }

    pub async fn get(&self, url: Url) -> Result<Value, ProviderError> {
        debug!(provider = self.provider, url = %redact(&url), "GET");
        self.send(self.client.get(url)).await
    }

    pub async fn post(&self, url: Url, body: &Value) -> Result<Value, ProviderError> {
        debug!(provider = self.provider, url = %redact(&url), "POST");
        self.send(self.client.post(url).json(body)).await
    }

    async fn send(&self, request: RequestBuilder) -> Result<Value, ProviderError> {
        let response = request.send().await.map_err(map_transport_error)?;
        let status = response.status();
        if status.is_success() {
            return response.json::<Value>().await.map_err(|e| {
                if e.is_timeout() {
                    ProviderError::timeout(format!("reading {} response: {e}", self.provider))
                } else {
                    ProviderError::unavailable(format!("unparsable {} response: {e}", self.provider))
                }
            });
        }

        let retry_after = parse_retry_after(response.headers());
        let body = response.text().await.unwrap_or_default();
        Err(map_status(status, retry_after, &body))
    }
}

/// Configured API key, treating blank values as absent.
pub fn api_key(raw: Option<&str>) -> Option<SecretString> {
    raw.map(str::trim)
        .filter(|k| !k.is_empty())
        .map(|k| SecretString::from(k.to_string()))
}

/// Header map with one header, for API keys passed as headers.
pub fn header(name: &'static str, value: &str) -> Result<HeaderMap, ChainscopeError> {
    let mut headers = HeaderMap::new();
    let mut value = HeaderValue::from_str(value)
        .map_err(|e| ChainscopeError::Config(format!("invalid {name} header value: {e}")))?;
    value.set_sensitive(true);
    headers.insert(HeaderName::from_static(name), value);
    Ok(headers)
}

/// Joins `base` and the fixed `path`, appends each of `segments` as one
/// percent-encoded path segment, then adds query parameters.
///
/// Segments carry caller-supplied values, so a `/`, `?` or `#` inside one
/// stays inside that segment. Blank, `.` and `..` segments are rejected.
pub fn endpoint(
    base: &str,
    path: &str,
    segments: &[&str],
    params: &[(&str, String)],
) -> Result<Url, ProviderError> {
    if let Some(bad) = segments
        .iter()
        .find(|s| matches!(s.trim(), "" | "." | ".."))
    {
        return Err(ProviderError::bad_request(format!(
            "invalid path value {bad:?}"
        )));
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    let raw = if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    };
    let mut url =
        Url::parse(&raw).map_err(|e| ProviderError::bad_request(format!("invalid url {raw}: {e}")))?;
    if !segments.is_empty() {
        url.path_segments_mut()
            .map_err(|()| ProviderError::bad_request(format!("invalid base url {raw}")))?
            .pop_if_empty()
            .extend(segments);
    }
    if !params.is_empty() {
        url.query_pairs_mut().extend_pairs(params);
    }
    Ok(url)
}

/// Classifies a non-success HTTP status.
pub fn map_status(status: StatusCode, retry_after: Option<Duration>, body: &str) -> ProviderError {
    let message = format!("HTTP {status}: {}", excerpt(body));
    match status.as_u16() {
        429 => ProviderError::rate_limited(message, retry_after),
        400 | 401 | 403 | 404 | 422 => ProviderError::bad_request(message),
        408 | 504 => ProviderError::timeout(message),
        _ => ProviderError::unavailable(message),
    }
}

pub fn map_transport_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::timeout(err.to_string())
    } else {
        ProviderError::unavailable(err.to_string())
    }
}

/// `Retry-After` in delta-seconds form. HTTP-date values are ignored.
pub fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)?
        .to_str()
        .ok()?
        .trim()
        .parse::<u64>()
        .ok()
        .map(Duration::from_secs)
}

/// A string parameter that must be present and non-empty.
pub fn required_str<'q>(query: &'q QueryRequest, name: &str) -> Result<&'q str, ProviderError> {
    match query.str_param(name) {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(ProviderError::bad_request(format!(
            "{} requires a non-empty '{name}' parameter",
            query.query_type()
        ))),
    }
}

/// First parameter among `names` rendered as a comma-separated list.
pub fn joined_list(query: &QueryRequest, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| query.param(name))
        .map(|v| v.to_string_list().join(","))
        .filter(|s| !s.is_empty())
}

fn excerpt(body: &str) -> &str {
    match body.char_indices().nth(BODY_EXCERPT) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

/// URL with key-bearing query parameters masked, for logs.
fn redact(url: &Url) -> String {
    let mut shown = url.clone();
    let pairs: Vec<(String, String)> = url
        .query_pairs()
        .map(|(k, v)| {
            let masked = matches!(k.as_ref(), "apikey" | "auth_token" | "api_key");
            (k.into_owned(), if masked { "***".to_string() } else { v.into_owned() })
        })
        .collect();
    if pairs.is_empty() {
        return shown.to_string();
    }
    shown.query_pairs_mut().clear().extend_pairs(pairs);
    shown.to_string()
}
