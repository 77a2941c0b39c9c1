//! HTTP clients for the external render and suggestion services.
//!
//! Both clients report failures as [`trimline_common::Error`] so callers can
//! tell a local precondition from a boundary failure. Neither touches a
//! [`trimline_engine::RangeStore`]; callers commit results only on success.

pub mod render;
pub mod suggest;

pub use render::{HttpRenderClient, RenderService};
pub use suggest::{request_suggestions, HttpSuggestionClient, SuggestionService};

use reqwest::{Client, Response};
use std::time::Duration;
use trimline_common::{Error, Result};

fn build_http_client(timeout: Duration) -> Client {
    Client::builder().timeout(timeout).build().unwrap_or_else(|e| {
        tracing::warn!("Failed to build HTTP client with timeout: {}", e);
        Client::new()
    })
}

fn transport_error(e: reqwest::Error) -> Error {
    Error::transport(e.to_string())
}

/// Pass successful responses through; turn anything else into [`Error::Service`].
///
/// The message is the `detail` field of a JSON error body when present,
/// otherwise the raw body text.
async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| v.get("detail").and_then(|d| d.as_str()).map(str::to_string))
        .unwrap_or(body);
    tracing::warn!(status = status.as_u16(), "Service rejected request: {}", message);
    Err(Error::service(status.as_u16(), message))
}
