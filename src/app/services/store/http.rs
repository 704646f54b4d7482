use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{StoreClient, StoreError};
use crate::app::domain::label::{LabelContent, LabelName};

#[derive(Serialize)]
struct CreateLabelRequest<'a> {
    name: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct UpdateLabelRequest<'a> {
    content: &'a str,
}

#[derive(Deserialize)]
struct LabelContentResponse {
    /// Text for text labels, base64 for binary ones (never decoded here).
    #[serde(default)]
    content: String,
    is_text: bool,
    size_bytes: u64,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

/// Client for the store-viewer HTTP API (`/api/labels`).
///
/// Requests are blocking `minreq` calls moved onto tokio's blocking pool.
#[derive(Debug, Clone)]
pub struct HttpStoreClient {
    base_url: Url,
    timeout_secs: u64,
}

impl HttpStoreClient {
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            StoreError::RemoteUnavailable(format!("Invalid server URL {}: {}", base_url, e))
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreError::RemoteUnavailable(format!(
                "Server URL cannot be a base: {}",
                base_url
            )));
        }
        Ok(Self {
            base_url,
            timeout_secs,
        })
    }

    /// `{base}/api/labels`, or `{base}/api/labels/{name}` with each path
    /// segment of the name percent-encoded.
    pub fn labels_url(&self, name: Option<&LabelName>) -> String {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "labels"]);
            if let Some(name) = name {
                segments.extend(name.as_str().split('/'));
            }
        }
        url.to_string()
    }

    async fn send(&self, request: minreq::Request) -> Result<minreq::Response, StoreError> {
        let request = request.with_timeout(self.timeout_secs);
        tokio::task::spawn_blocking(move || request.send())
            .await
            .map_err(|e| StoreError::RemoteUnavailable(format!("Request task failed: {}", e)))?
            .map_err(|e| StoreError::RemoteUnavailable(format!("Failed to reach store: {}", e)))
    }
}

/// Map a non-success response onto the store error taxonomy.
fn check_status(response: minreq::Response, name: Option<&LabelName>) -> Result<minreq::Response, StoreError> {
    let status = response.status_code;
    if (200..300).contains(&status) {
        return Ok(response);
    }

    let message = serde_json::from_slice::<ErrorResponse>(response.as_bytes())
        .map(|e| e.error)
        .unwrap_or_else(|_| response.reason_phrase.clone());
    let subject = name.map(|n| n.to_string()).unwrap_or_default();

    Err(match status {
        404 => StoreError::NotFound(subject),
        409 => StoreError::AlreadyExists(subject),
        _ => StoreError::RemoteUnavailable(format!("Server returned {}: {}", status, message)),
    })
}

fn json_body<T: Serialize>(request: minreq::Request, body: &T) -> Result<minreq::Request, StoreError> {
    request
        .with_json(body)
        .map_err(|e| StoreError::RemoteUnavailable(format!("Failed to encode request: {}", e)))
}

#[async_trait]
impl StoreClient for HttpStoreClient {
    async fn list_labels(&self) -> Result<Vec<LabelName>, StoreError> {
        let url = self.labels_url(None);
        debug!(%url, "listing labels");
        let response = check_status(self.send(minreq::get(url)).await?, None)?;

        let names: Vec<String> = response
            .json()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Failed to parse label list: {}", e)))?;

        Ok(names
            .into_iter()
            .filter_map(|name| match LabelName::new(name) {
                Ok(label) => Some(label),
                Err(e) => {
                    warn!("Skipping label from server: {}", e);
                    None
                }
            })
            .collect())
    }

    async fn fetch_label(&self, name: &LabelName) -> Result<LabelContent, StoreError> {
        let url = self.labels_url(Some(name));
        debug!(%url, "fetching label");
        let response = check_status(self.send(minreq::get(url)).await?, Some(name))?;

        let body: LabelContentResponse = response
            .json()
            .map_err(|e| StoreError::RemoteUnavailable(format!("Failed to parse label: {}", e)))?;

        if !body.is_text {
            return Ok(LabelContent::binary(body.size_bytes));
        }
        let content = LabelContent::text(body.content);
        if content.size_bytes() != body.size_bytes {
            debug!(
                label = %name,
                reported = body.size_bytes,
                actual = content.size_bytes(),
                "server size differs from text length"
            );
        }
        Ok(content)
    }

    async fn create_label(&self, name: &LabelName, initial_text: &str) -> Result<(), StoreError> {
        let url = self.labels_url(None);
        debug!(%url, label = %name, "creating label");
        let body = CreateLabelRequest {
            name: name.as_str(),
            content: initial_text,
        };
        let request = json_body(minreq::post(url), &body)?;
        check_status(self.send(request).await?, Some(name))?;
        Ok(())
    }

    async fn write_label(&self, name: &LabelName, text: &str) -> Result<(), StoreError> {
        let url = self.labels_url(Some(name));
        debug!(%url, bytes = text.len(), "writing label");
        let request = json_body(minreq::put(url), &UpdateLabelRequest { content: text })?;
        check_status(self.send(request).await?, Some(name))?;
        Ok(())
    }
}
