//! LLM backend implementations.
//!
//! Ollama speaks its own `/api/generate` format. OpenAI and Azure share the
//! chat-completions format and differ only in URL layout and auth header.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client, RequestBuilder, Response, StatusCode};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use recap_core::{Error, Result};

use crate::config::{mask_key, LLMConfig};
use crate::types::{
    BackendKind, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ConnectionReport,
    GenerateRequest, GenerateResponse,
};

/// The configured backend. Built once with [`Backend::from_config`].
#[derive(Debug, Clone)]
pub enum Backend {
    Ollama(OllamaBackend),
    OpenAI(OpenAIBackend),
    Azure(AzureBackend),
}

#[derive(Debug, Clone)]
pub struct OllamaBackend {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Debug, Clone)]
pub struct OpenAIBackend {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

#[derive(Debug, Clone)]
pub struct AzureBackend {
    client: Client,
    endpoint: String,
    api_key: String,
    deployment: String,
    api_version: String,
}

impl Backend {
    /// Build the backend selected in `config`.
    pub fn from_config(config: &LLMConfig) -> Result<Self> {
        config.validate()?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Http(format!("Failed to build HTTP client: {}", e)))?;

        let backend = match config.backend {
            BackendKind::Ollama => Self::Ollama(OllamaBackend {
                client,
                base_url: trim_url(&config.ollama_base_url),
                model: config.ollama_model.clone(),
            }),
            BackendKind::OpenAI => Self::OpenAI(OpenAIBackend {
                client,
                base_url: trim_url(&config.openai_base_url),
                api_key: config.openai_api_key.clone().unwrap_or_default(),
                model: config.openai_model.clone(),
            }),
            BackendKind::Azure => Self::Azure(AzureBackend {
                client,
                endpoint: trim_url(config.azure_endpoint.as_deref().unwrap_or_default()),
                api_key: config.azure_api_key.clone().unwrap_or_default(),
                deployment: config.azure_deployment.clone().unwrap_or_default(),
                api_version: config.azure_api_version.clone(),
            }),
        };

        info!("Using {} backend at {}", backend.kind(), backend.endpoint());
        Ok(backend)
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Ollama(_) => BackendKind::Ollama,
            Self::OpenAI(_) => BackendKind::OpenAI,
            Self::Azure(_) => BackendKind::Azure,
        }
    }

    /// Model (or Azure deployment) used when the caller passes an empty one.
    pub fn default_model(&self) -> &str {
        match self {
            Self::Ollama(b) => &b.model,
            Self::OpenAI(b) => &b.model,
            Self::Azure(b) => &b.deployment,
        }
    }

    pub fn endpoint(&self) -> String {
        match self {
            Self::Ollama(b) => b.base_url.clone(),
            Self::OpenAI(b) => b.base_url.clone(),
            Self::Azure(b) => b.endpoint.clone(),
        }
    }

    /// One-line description with secrets masked.
    pub fn describe(&self) -> String {
        match self {
            Self::Ollama(b) => format!("ollama endpoint={} model={}", b.base_url, b.model),
            Self::OpenAI(b) => format!(
                "openai endpoint={} model={} api_key={}",
                b.base_url,
                b.model,
                mask_key(&b.api_key)
            ),
            Self::Azure(b) => format!(
                "azure endpoint={} deployment={} api_version={} api_key={}",
                b.endpoint,
                b.deployment,
                b.api_version,
                mask_key(&b.api_key)
            ),
        }
    }

    /// Send one prompt and return the full response text.
    pub async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let model = if model.trim().is_empty() {
            self.default_model()
        } else {
            model
        };
        debug!(
            "Sending {} chars to {} (model {})",
            prompt.chars().count(),
            self.kind(),
            model
        );

        let text = match self {
            Self::Ollama(b) => b.complete(prompt, model).await?,
            Self::OpenAI(b) => b.complete(prompt, model, None).await?,
            Self::Azure(b) => b.complete(prompt, model, None).await?,
        };

        debug!("Received {} chars from {}", text.chars().count(), self.kind());
        Ok(text)
    }

    /// Submit the request on a background task and return immediately.
    pub fn spawn_complete(self: Arc<Self>, prompt: String, model: String) -> JoinHandle<Result<String>> {
        tokio::spawn(async move { self.complete(&prompt, &model).await })
    }

    /// Probe the backend with the cheapest authenticated request it offers.
    pub async fn test_connection(&self) -> Result<ConnectionReport> {
        match self {
            Self::Ollama(b) => {
                let url = format!("{}/api/tags", b.base_url);
                send(b.client.get(&url)).await?;
            }
            Self::OpenAI(b) => {
                let url = format!("{}/models", b.base_url);
                send(b.client.get(&url).bearer_auth(&b.api_key)).await?;
            }
            Self::Azure(b) => {
                b.complete("ping", &b.deployment, Some(1)).await?;
            }
        }

        Ok(ConnectionReport {
            backend: self.kind(),
            endpoint: self.endpoint(),
            model: self.default_model().to_string(),
        })
    }
}

impl OllamaBackend {
    async fn complete(&self, prompt: &str, model: &str) -> Result<String> {
        let url = format!("{}/api/generate", self.base_url);
        let body = GenerateRequest {
            model,
            prompt,
            stream: false,
        };

        let response = send(self.client.post(&url).json(&body)).await?;
        let parsed: GenerateResponse = parse_json(response).await?;
        non_empty(parsed.response)
    }
}

impl OpenAIBackend {
    async fn complete(&self, prompt: &str, model: &str, max_tokens: Option<usize>) -> Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = ChatCompletionRequest {
            model: Some(model.to_string()),
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
        };

        let response = send(self.client.post(&url).bearer_auth(&self.api_key).json(&body)).await?;
        let parsed: ChatCompletionResponse = parse_json(response).await?;
        non_empty(parsed.into_text().unwrap_or_default())
    }
}

impl AzureBackend {
    /// `deployment` replaces the model name in the URL.
    async fn complete(&self, prompt: &str, deployment: &str, max_tokens: Option<usize>) -> Result<String> {
        let url = format!(
            "{}/openai/deployments/{}/chat/completions",
            self.endpoint, deployment
        );
        let body = ChatCompletionRequest {
            model: None,
            messages: vec![ChatMessage::user(prompt)],
            max_tokens,
        };

        let request = self
            .client
            .post(&url)
            .query(&[("api-version", self.api_version.as_str())])
            .header("api-key", &self.api_key)
            .json(&body);

        let response = send(request).await?;
        let parsed: ChatCompletionResponse = parse_json(response).await?;
        // A one-token probe may legitimately come back empty.
        match (parsed.into_text(), max_tokens) {
            (Some(text), _) if !text.trim().is_empty() => Ok(text),
            (_, Some(_)) => Ok(String::new()),
            _ => Err(Error::Http("Empty response from backend".into())),
        }
    }
}

/// Send a request and map transport and status failures onto the error taxonomy.
async fn send(request: RequestBuilder) -> Result<Response> {
    let response = request
        .send()
        .await
        .map_err(|e| Error::BackendUnavailable(format!("Request failed: {}", e)))?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(status_error(status, &body))
}

fn status_error(status: StatusCode, body: &str) -> Error {
    let detail = format!("API error {}: {}", status, snippet(body));
    match status.as_u16() {
        401 | 403 => Error::Authentication(detail),
        429 => Error::RateLimited(detail),
        500..=599 => Error::BackendUnavailable(detail),
        _ => Error::Http(detail),
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(response: Response) -> Result<T> {
    response
        .json::<T>()
        .await
        .map_err(|e| Error::Http(format!("Invalid response body: {}", e)))
}

fn non_empty(text: String) -> Result<String> {
    if text.trim().is_empty() {
        Err(Error::Http("Empty response from backend".into()))
    } else {
        Ok(text)
    }
}

fn snippet(body: &str) -> String {
    const MAX: usize = 200;
    let mut out: String = body.trim().chars().take(MAX).collect();
    if body.trim().chars().count() > MAX {
        out.push_str("...");
    }
    out
}

fn trim_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}
