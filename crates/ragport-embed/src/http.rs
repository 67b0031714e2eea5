//! OpenAI-compatible and Azure OpenAI embedding client.

use async_trait::async_trait;
use ragport_config::{EmbeddingEndpoint, EmbeddingFlavor, EmbeddingSettings};
use ragport_core::{EmbeddingError, EmbeddingProvider, EmbeddingResponse, EmbeddingResult};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingApiResponse {
    data: Vec<EmbeddingData>,
    #[serde(default)]
    model: Option<String>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Embedding client for a single endpoint.
pub struct HttpEmbeddingProvider {
    client: Client,
    flavor: EmbeddingFlavor,
    request_url: String,
    api_key: Option<String>,
    model: String,
    dimensions: Option<usize>,
    batch_size: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(settings: &EmbeddingSettings, endpoint: &EmbeddingEndpoint) -> EmbeddingResult<Self> {
        let base = endpoint.url.trim_end_matches('/');
        let request_url = match settings.flavor {
            EmbeddingFlavor::OpenAi => format!("{base}/embeddings"),
            EmbeddingFlavor::Azure => {
                let deployment = endpoint.deployment.as_deref().unwrap_or(&settings.model);
                let api_version = endpoint
                    .api_version
                    .as_deref()
                    .unwrap_or(&settings.api_version);
                format!(
                    "{base}/openai/deployments/{deployment}/embeddings?api-version={api_version}"
                )
            }
        };

        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| EmbeddingError::Config(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            flavor: settings.flavor,
            request_url,
            api_key: endpoint.api_key.clone(),
            model: settings.model.clone(),
            dimensions: settings.dimensions,
            batch_size: settings.batch_size,
        })
    }

    pub fn request_url(&self) -> &str {
        &self.request_url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match (&self.api_key, self.flavor) {
            (Some(key), EmbeddingFlavor::Azure) => request.header("api-key", key),
            (Some(key), EmbeddingFlavor::OpenAi) => request.bearer_auth(key),
            (None, _) => request,
        }
    }

    async fn error_for(&self, response: reqwest::Response) -> EmbeddingError {
        let status = response.status();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(60);

        let detail = match response.json::<ApiErrorResponse>().await {
            Ok(body) => body.error.message,
            Err(_) => format!("HTTP {status}"),
        };

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                EmbeddingError::Authentication(detail)
            }
            StatusCode::TOO_MANY_REQUESTS => EmbeddingError::RateLimited {
                retry_after_secs: retry_after,
            },
            StatusCode::BAD_REQUEST | StatusCode::NOT_FOUND => {
                EmbeddingError::InvalidResponse(detail)
            }
            _ => EmbeddingError::Provider {
                provider: self.provider_name().to_string(),
                message: detail,
            },
        }
    }
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed_batch(&self, texts: Vec<String>) -> EmbeddingResult<Vec<EmbeddingResponse>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Embedding {} texts via {}", texts.len(), self.request_url);

        let request = EmbeddingRequest {
            model: &self.model,
            input: &texts,
        };
        let response = self
            .authorize(self.client.post(&self.request_url))
            .json(&request)
            .send()
            .await
            .map_err(|e| EmbeddingError::Http(e.to_string()))?;

        if !response.status().is_success() {
            return Err(self.error_for(response).await);
        }

        let body: EmbeddingApiResponse = response.json().await.map_err(|e| {
            EmbeddingError::InvalidResponse(format!("Failed to parse embedding response: {e}"))
        })?;

        if body.data.len() != texts.len() {
            return Err(EmbeddingError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        // Sort by index to maintain input order
        let mut data = body.data;
        data.sort_by_key(|d| d.index);
        let model = body.model.unwrap_or_else(|| self.model.clone());

        data.into_iter()
            .map(|d| {
                if let Some(expected) = self.dimensions {
                    if d.embedding.len() != expected {
                        return Err(EmbeddingError::InvalidDimensions {
                            expected,
                            actual: d.embedding.len(),
                        });
                    }
                }
                Ok(EmbeddingResponse::new(d.embedding, model.clone()))
            })
            .collect()
    }

    fn provider_name(&self) -> &str {
        match self.flavor {
            EmbeddingFlavor::OpenAi => "openai",
            EmbeddingFlavor::Azure => "azure-openai",
        }
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn batch_size(&self) -> usize {
        self.batch_size
    }
}
