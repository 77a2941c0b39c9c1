use async_trait::async_trait;
use reqwest::Client;
use trimline_common::Result;
use trimline_engine::suggest::{apply_suggestions, build_request, SpriteSummary};
use trimline_engine::{RangeStore, SuggestRequest, SuggestResponse};

use super::{build_http_client, check_status, transport_error};
use crate::config::ServicesConfig;

/// The external suggestion service.
#[async_trait]
pub trait SuggestionService: Send + Sync {
    async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse>;
}

/// JSON client for the suggestion endpoint.
pub struct HttpSuggestionClient {
    client: Client,
    url: String,
}

impl HttpSuggestionClient {
    pub fn new(config: &ServicesConfig) -> Self {
        Self {
            client: build_http_client(config.timeout()),
            url: config.suggest_url.clone(),
        }
    }
}

#[async_trait]
impl SuggestionService for HttpSuggestionClient {
    async fn suggest(&self, request: &SuggestRequest) -> Result<SuggestResponse> {
        tracing::debug!(url = %self.url, duration = request.duration_sec, "Requesting suggestions");
        let response = self
            .client
            .post(&self.url)
            .json(request)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(transport_error)?;
        serde_json::from_str(&body)
            .map_err(|e| trimline_common::Error::decode(format!("suggestion response: {e}")))
    }
}

/// Ask for suggestions about the store's source and import them.
///
/// Preconditions are checked before any request. On any failure the store is
/// left exactly as it was.
pub async fn request_suggestions(
    service: &dyn SuggestionService,
    store: &mut RangeStore,
    prompt: &str,
    summary: Option<&SpriteSummary>,
) -> Result<SuggestResponse> {
    let request = build_request(prompt, store.duration(), summary)?;
    let response = service.suggest(&request).await?;
    apply_suggestions(store, &response.suggestions);
    Ok(response)
}
