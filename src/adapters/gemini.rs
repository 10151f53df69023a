use crate::adapters::llm::{LLMAdapter, LLMRequest, LLMResponse, ModelConfig, Usage};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub struct GeminiAdapter {
    client: Client,
    config: ModelConfig,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    system_instruction: SystemInstruction,
    contents: Vec<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: usize,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    model_version: Option<String>,
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<usize>,
    candidates_token_count: Option<usize>,
    total_token_count: Option<usize>,
}

impl GeminiAdapter {
    pub fn new(config: ModelConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .context("Gemini API key not found. Set GEMINI_API_KEY environment variable or provide in config")?;

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| "https://generativelanguage.googleapis.com/v1beta".to_string());

        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            config,
            api_key,
            base_url,
        })
    }
}

#[async_trait]
impl LLMAdapter for GeminiAdapter {
    async fn complete(&self, request: LLMRequest) -> Result<LLMResponse> {
        let gemini_request = GeminiRequest {
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: request.system_prompt,
                }],
            },
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts: vec![Part {
                    text: request.user_prompt,
                }],
            }],
            generation_config: GenerationConfig {
                temperature: request.temperature.unwrap_or(self.config.temperature),
                max_output_tokens: request.max_tokens.unwrap_or(self.config.max_tokens),
            },
        };

        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.config.model_name,
            self.api_key
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&gemini_request)
            .send()
            .await
            .context("Failed to send request to Gemini")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .context("Failed to parse Gemini response")?;

        let content = gemini_response
            .candidates
            .unwrap_or_default()
            .into_iter()
            .flat_map(|candidate| {
                candidate
                    .content
                    .and_then(|content| content.parts)
                    .unwrap_or_default()
            })
            .filter_map(|part| part.text)
            .collect::<Vec<_>>()
            .join("\n");

        if content.trim().is_empty() {
            anyhow::bail!("Gemini API returned no text content");
        }

        let usage = gemini_response.usage_metadata.map(|meta| Usage {
            prompt_tokens: meta.prompt_token_count.unwrap_or(0),
            completion_tokens: meta.candidates_token_count.unwrap_or(0),
            total_tokens: meta.total_token_count.unwrap_or(0),
        });

        Ok(LLMResponse {
            content,
            model: gemini_response
                .model_version
                .unwrap_or_else(|| self.config.model_name.clone()),
            usage,
        })
    }

    fn model_name(&self) -> &str {
        &self.config.model_name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config(base_url: &str) -> ModelConfig {
        ModelConfig {
            model_name: "gemini-3-pro-preview".to_string(),
            api_key: Some("test-key".to_string()),
            base_url: Some(base_url.to_string()),
            ..ModelConfig::default()
        }
    }

    fn request() -> LLMRequest {
        LLMRequest {
            system_prompt: "You review formalizations.".to_string(),
            user_prompt: "Review this diff.".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }

    #[tokio::test]
    async fn decodes_candidate_text_and_usage() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock(
                "POST",
                "/models/gemini-3-pro-preview:generateContent?key=test-key",
            )
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{
                        "content": {
                            "parts": [
                                {"text": "## Review"},
                                {"text": "The formalization is correct."}
                            ]
                        }
                    }],
                    "modelVersion": "gemini-3-pro-preview",
                    "usageMetadata": {
                        "promptTokenCount": 120,
                        "candidatesTokenCount": 30,
                        "totalTokenCount": 150
                    }
                })
                .to_string(),
            )
            .create_async()
            .await;

        let adapter = GeminiAdapter::new(config(&server.url())).unwrap();
        let response = adapter.complete(request()).await.unwrap();

        mock.assert_async().await;
        assert_eq!(response.content, "## Review\nThe formalization is correct.");
        assert_eq!(response.model, "gemini-3-pro-preview");
        let usage = response.usage.unwrap();
        assert_eq!(usage.prompt_tokens, 120);
        assert_eq!(usage.completion_tokens, 30);
        assert_eq!(usage.total_tokens, 150);
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/models/gemini-3-pro-preview:generateContent?key=test-key",
            )
            .with_status(429)
            .with_body("quota exhausted")
            .create_async()
            .await;

        let adapter = GeminiAdapter::new(config(&server.url())).unwrap();
        let err = adapter.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("Gemini API error"));
        assert!(err.to_string().contains("quota exhausted"));
    }

    #[tokio::test]
    async fn empty_candidates_are_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock(
                "POST",
                "/models/gemini-3-pro-preview:generateContent?key=test-key",
            )
            .with_header("content-type", "application/json")
            .with_body(json!({"candidates": []}).to_string())
            .create_async()
            .await;

        let adapter = GeminiAdapter::new(config(&server.url())).unwrap();
        let err = adapter.complete(request()).await.unwrap_err();
        assert!(err.to_string().contains("no text content"));
    }
}
