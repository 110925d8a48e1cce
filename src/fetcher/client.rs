use crate::fetcher::{
    errors::{FetchError, is_retriable_status},
    pipeline::process_response,
    types::PageResponse,
};
use bytes::Bytes;
use reqwest::{Client, ClientBuilder, Response, StatusCode};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const USER_AGENT: &str = concat!("rss-reader/", env!("CARGO_PKG_VERSION"));

/// One client is shared by every task of a run; per-request timeouts come from config.
pub fn build_client() -> Result<Client, FetchError> {
    let mut headers = reqwest::header::HeaderMap::new();
    headers.insert(
        reqwest::header::ACCEPT,
        reqwest::header::HeaderValue::from_static(
            "text/html,application/xhtml+xml,application/rss+xml,application/xml;q=0.9,*/*;q=0.8",
        ),
    );

    ClientBuilder::new()
        .connect_timeout(Duration::from_secs(10))
        .user_agent(USER_AGENT)
        .redirect(reqwest::redirect::Policy::limited(10))
        .default_headers(headers)
        .build()
        .map_err(|e| FetchError::Unknown(e.to_string()))
}

/// Only `http` and `https` URLs are ever requested.
pub fn parse_http_url(url: &str) -> Result<Url, FetchError> {
    let parsed = Url::parse(url)?;
    match parsed.scheme() {
        "http" | "https" => Ok(parsed),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

#[instrument(skip_all, fields(url = %url))]
pub async fn fetch(client: &Client, url: &str, timeout: Duration) -> Result<PageResponse, FetchError> {
    let response = send_checked(client, url, timeout).await?;

    let final_url = response.url().clone();

    // A missing header is tolerated; plenty of small news sites omit it.
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|ct| ct.to_str().ok())
        .unwrap_or("text/html")
        .to_string();

    if !content_type.contains("text/html") && !content_type.contains("application/xhtml") {
        return Err(FetchError::UnsupportedContentType(content_type));
    }

    let body_bytes = read_body(response).await?;
    debug!(bytes = body_bytes.len(), "page downloaded");

    Ok(process_response(final_url, &content_type, &body_bytes))
}

/// Raw body of any successful response, used for the feed document itself.
#[instrument(skip_all, fields(url = %url))]
pub async fn fetch_bytes(client: &Client, url: &str, timeout: Duration) -> Result<Bytes, FetchError> {
    let response = send_checked(client, url, timeout).await?;
    read_body(response).await
}

/// Issues a GET and reports whatever status came back. Only transport-level
/// failures are errors here.
#[instrument(skip_all, fields(url = %url))]
pub async fn probe(client: &Client, url: &str, timeout: Duration) -> Result<StatusCode, FetchError> {
    let parsed = parse_http_url(url)?;
    let response = client
        .get(parsed)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;
    Ok(response.status())
}

/// Whether the resource answers with anything other than 404.
pub async fn exists(client: &Client, url: &str, timeout: Duration) -> bool {
    match probe(client, url, timeout).await {
        Ok(status) => status != StatusCode::NOT_FOUND,
        Err(e) => {
            debug!(url, error = %e, "existence check failed");
            false
        }
    }
}

async fn send_checked(client: &Client, url: &str, timeout: Duration) -> Result<Response, FetchError> {
    let parsed = parse_http_url(url)?;

    let response = client
        .get(parsed)
        .timeout(timeout)
        .send()
        .await
        .map_err(FetchError::from_reqwest_error)?;

    if let Some(content_length) = response.content_length()
        && content_length > MAX_BODY_SIZE
    {
        return Err(FetchError::BodyTooLarge(content_length));
    }

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Http {
            status,
            retriable: is_retriable_status(status),
        });
    }

    Ok(response)
}

async fn read_body(response: Response) -> Result<Bytes, FetchError> {
    let body_bytes = response
        .bytes()
        .await
        .map_err(|e| FetchError::Body(e.to_string()))?;

    // Content-Length can be absent or wrong
    if body_bytes.len() as u64 > MAX_BODY_SIZE {
        return Err(FetchError::BodyTooLarge(body_bytes.len() as u64));
    }

    Ok(body_bytes)
}
