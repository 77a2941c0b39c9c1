use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use trimline_common::{Error, Result};
use trimline_engine::export::{parse_export_response, ExportRequest, ExportResponse};

use super::{build_http_client, check_status, transport_error};
use crate::config::ServicesConfig;

/// The external render service.
#[async_trait]
pub trait RenderService: Send + Sync {
    /// Upload the source with its span fields and wait for the rendered artifact.
    async fn export(&self, request: &ExportRequest) -> Result<ExportResponse>;
}

/// Multipart client for the render endpoint.
pub struct HttpRenderClient {
    client: Client,
    url: String,
}

impl HttpRenderClient {
    pub fn new(config: &ServicesConfig) -> Self {
        Self {
            client: build_http_client(config.timeout()),
            url: config.render_url.clone(),
        }
    }

    async fn form(request: &ExportRequest) -> Result<Form> {
        let bytes = tokio::fs::read(&request.source).await?;
        let file_name = request
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .ok_or_else(|| {
                Error::invalid_input(format!("not a file: {}", request.source.display()))
            })?;

        let mut form = Form::new().part("file", Part::bytes(bytes).file_name(file_name));
        for (name, value) in request.form_fields() {
            form = form.text(name, value);
        }
        Ok(form)
    }
}

#[async_trait]
impl RenderService for HttpRenderClient {
    async fn export(&self, request: &ExportRequest) -> Result<ExportResponse> {
        let form = Self::form(request).await?;
        tracing::info!(
            source = %request.source.display(),
            url = %self.url,
            "Dispatching export"
        );

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(transport_error)?;
        let response = check_status(response).await?;
        let body = response.text().await.map_err(transport_error)?;
        parse_export_response(&body)
    }
}
