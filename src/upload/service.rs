use crate::error::{Error, Result};
use crate::upload::types::SelectedFile;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::Response;
use serde::Serialize;
use tracing::debug;

/// The remote summarization webhook. Both calls return the raw response
/// body; interpretation happens in [`crate::upload::response`].
#[async_trait]
pub trait SummaryService: Send + Sync {
    async fn submit(&self, id: &str, file: &SelectedFile) -> Result<String>;

    async fn check_status(&self, id: &str) -> Result<String>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusRequest<'a> {
    action: &'static str,
    file_id: &'a str,
}

#[derive(Clone)]
pub struct WebhookClient {
    client: reqwest::Client,
    url: String,
}

impl WebhookClient {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            url: url.into(),
        }
    }
}

#[async_trait]
impl SummaryService for WebhookClient {
    async fn submit(&self, id: &str, file: &SelectedFile) -> Result<String> {
        let part = Part::bytes(file.bytes.to_vec())
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(|e| Error::Transport(format!("Invalid file type: {}", e)))?;

        let form = Form::new()
            .part("file", part)
            .text("fileName", file.name.clone())
            .text("fileType", file.mime_type.clone())
            .text("fileId", id.to_string());

        let response = self
            .client
            .post(&self.url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to send request: {}", e)))?;

        debug!(file_id = id, status = %response.status(), "Submission response");
        read_body(response).await
    }

    async fn check_status(&self, id: &str) -> Result<String> {
        let request = StatusRequest {
            action: "get_summary",
            file_id: id,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Transport(format!("Failed to send request: {}", e)))?;

        read_body(response).await
    }
}

async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(Error::HttpStatus(status.as_u16()));
    }

    response
        .text()
        .await
        .map_err(|e| Error::Transport(format!("Failed to read response: {}", e)))
}
