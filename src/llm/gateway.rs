//! Clients for the HTTP model gateway.
//!
//! Both endpoints take `{api_key, prompt, model_id, ...}`; answers come back
//! under `response.content[0].text`, embeddings under `response.embedding`.

use agent_core::AnswerGenerator;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use supplychain_core_types::CollaboratorError;
use tracing::debug;

use crate::config::GatewayConfig;
use crate::retrieval::Embedder;

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    api_key: &'a str,
    prompt: &'a str,
    model_id: &'a str,
    model_params: ModelParams,
}

#[derive(Debug, Serialize)]
struct ModelParams {
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    response: GenerateBody,
}

#[derive(Debug, Deserialize)]
struct GenerateBody {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Debug, Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    api_key: &'a str,
    prompt: &'a str,
    model_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    response: EmbedBody,
}

#[derive(Debug, Deserialize)]
struct EmbedBody {
    embedding: Vec<f32>,
}

fn build_client(config: &GatewayConfig) -> Result<Client, CollaboratorError> {
    if config.api_url.trim().is_empty() {
        return Err(CollaboratorError::generation("gateway api_url is not configured"));
    }
    Client::builder()
        .timeout(config.timeout())
        .build()
        .map_err(|err| CollaboratorError::generation(format!("failed to build HTTP client: {err}")))
}

async fn post_json<B: Serialize, R: for<'de> Deserialize<'de>>(
    client: &Client,
    url: &str,
    body: &B,
    fail: fn(String) -> CollaboratorError,
) -> Result<R, CollaboratorError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|err| fail(format!("gateway request failed: {err}")))?;
    let status = response.status();
    if !status.is_success() {
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "<response unavailable>".to_string());
        return Err(fail(format!("gateway returned {status}: {text}")));
    }
    response
        .json::<R>()
        .await
        .map_err(|err| fail(format!("gateway response invalid: {err}")))
}

/// Generative answers through the gateway.
pub struct GatewayClient {
    client: Client,
    config: GatewayConfig,
}

impl GatewayClient {
    pub fn new(config: GatewayConfig) -> Result<Self, CollaboratorError> {
        let client = build_client(&config)?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl AnswerGenerator for GatewayClient {
    async fn generate(&self, prompt: &str) -> Result<String, CollaboratorError> {
        let body = GenerateRequest {
            api_key: &self.config.api_key,
            prompt,
            model_id: &self.config.model_id,
            model_params: ModelParams {
                max_tokens: self.config.max_tokens,
                temperature: self.config.temperature,
            },
        };
        debug!(model = %self.config.model_id, prompt_chars = prompt.len(), "requesting answer");
        let response: GenerateResponse =
            post_json(&self.client, &self.config.api_url, &body, CollaboratorError::generation)
                .await?;
        response
            .response
            .content
            .into_iter()
            .next()
            .and_then(|block| block.text)
            .ok_or_else(|| CollaboratorError::generation("gateway response missing content"))
    }
}

/// Query embeddings through the gateway.
pub struct GatewayEmbedder {
    client: Client,
    config: GatewayConfig,
}

impl GatewayEmbedder {
    pub fn new(config: GatewayConfig) -> Result<Self, CollaboratorError> {
        let client = build_client(&config)
            .map_err(|err| CollaboratorError::retrieval(err.message))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl Embedder for GatewayEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, CollaboratorError> {
        let body = EmbedRequest {
            api_key: &self.config.api_key,
            prompt: text,
            model_id: &self.config.embedding_model_id,
        };
        let response: EmbedResponse =
            post_json(&self.client, &self.config.api_url, &body, CollaboratorError::retrieval)
                .await?;
        Ok(response.response.embedding)
    }
}
