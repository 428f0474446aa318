//! HTTP generation client (Gemini `generateContent` wire format)
//!
//! Stateless request/response. Every call carries the client-wide timeout;
//! a timed-out call is a failure and is not retried here, retry policy
//! belongs to the caller.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use tracing::debug;

use crate::errors::{EngineError, Result};
use crate::generation::types::{Evaluation, PromptMaterial};

/// Explicit configuration for the generation client. No ambient lookups:
/// construct it and pass it in.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: String::new(),
            model: "gemini-2.0-flash".to_string(),
            timeout: Duration::from_secs(30),
            temperature: 0.5,
            max_output_tokens: 512,
        }
    }
}

/// Boundary to the external text-generation service
#[async_trait]
pub trait GenerationClient: Send + Sync {
    /// Free-text generation
    async fn generate_text(&self, prompt: &PromptMaterial) -> Result<String>;

    /// Structured generation: the service must return an evaluation object
    /// matching the fixed schema; anything else is an error.
    async fn generate_evaluation(&self, prompt: &PromptMaterial) -> Result<Evaluation>;
}

/// Gemini-style HTTP implementation
pub struct HttpGenerationClient {
    client: Client,
    config: GenerationConfig,
}

impl HttpGenerationClient {
    pub fn new(config: GenerationConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(EngineError::Http)?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent?key={}",
            self.config.base_url, self.config.model, self.config.api_key
        )
    }

    async fn call(&self, prompt: &PromptMaterial, request: GenerateRequest) -> Result<String> {
        let transport_err = |reason: String| EngineError::Generation {
            session_id: prompt.session_id.to_string(),
            stage: "transport",
            reason,
        };

        debug!(session_id = %prompt.session_id, model = %self.config.model, "generation call");
        let response = self
            .client
            .post(self.endpoint())
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_err(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(transport_err(format!("service returned {status}: {body}")));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| transport_err(format!("unreadable response body: {e}")))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| transport_err("empty response content".to_string()))
    }

    fn base_request(&self, prompt: &PromptMaterial) -> GenerateRequest {
        GenerateRequest {
            contents: vec![Content {
                role: "user".to_string(),
                parts: vec![Part {
                    text: prompt.user.clone(),
                }],
            }],
            system_instruction: SystemInstruction {
                parts: vec![Part {
                    text: prompt.system.clone(),
                }],
            },
            generation_config: WireGenerationConfig {
                temperature: self.config.temperature,
                max_output_tokens: self.config.max_output_tokens,
                response_mime_type: None,
                response_schema: None,
            },
        }
    }
}

#[async_trait]
impl GenerationClient for HttpGenerationClient {
    async fn generate_text(&self, prompt: &PromptMaterial) -> Result<String> {
        self.call(prompt, self.base_request(prompt)).await
    }

    async fn generate_evaluation(&self, prompt: &PromptMaterial) -> Result<Evaluation> {
        let mut request = self.base_request(prompt);
        request.generation_config.response_mime_type = Some("application/json".to_string());
        request.generation_config.response_schema = Some(evaluation_schema());

        let raw = self.call(prompt, request).await?;
        Evaluation::parse(&raw, prompt.session_id)
    }
}

/// Response schema the service is asked to honor. Validation on our side
/// still applies; this only steers the model.
fn evaluation_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "score": {
                "type": "INTEGER",
                "description": "Score from 1 to 10 for the response quality."
            },
            "feedback": {
                "type": "STRING",
                "description": "Concise feedback, maximum 100 words."
            },
            "nextQuestion": {
                "type": "STRING",
                "description": "A relevant, follow-up interview question."
            },
            "citationIndices": {
                "type": "ARRAY",
                "description": "Indices of supporting context: 0 for resume, 1 for job description.",
                "items": { "type": "INTEGER" }
            }
        },
        "required": ["score", "feedback", "nextQuestion", "citationIndices"]
    })
}

// ---- wire types ----

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction")]
    system_instruction: SystemInstruction,
    #[serde(rename = "generationConfig")]
    generation_config: WireGenerationConfig,
}

#[derive(Debug, Serialize)]
struct SystemInstruction {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default)]
    role: String,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct WireGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType", skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
    #[serde(rename = "responseSchema", skip_serializing_if = "Option::is_none")]
    response_schema: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Content,
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_endpoint_includes_model_and_key() {
        let client = HttpGenerationClient::new(GenerationConfig {
            base_url: "http://localhost:9999/v1beta".to_string(),
            api_key: "secret".to_string(),
            model: "test-model".to_string(),
            ..Default::default()
        })
        .unwrap();

        let endpoint = client.endpoint();
        assert!(endpoint.starts_with("http://localhost:9999/v1beta/models/test-model"));
        assert!(endpoint.ends_with("key=secret"));
    }

    #[test]
    fn test_structured_request_serializes_schema_fields() {
        let client = HttpGenerationClient::new(GenerationConfig::default()).unwrap();
        let prompt = PromptMaterial {
            session_id: Uuid::new_v4(),
            system: "system".to_string(),
            user: "user".to_string(),
        };

        let mut request = client.base_request(&prompt);
        request.generation_config.response_mime_type = Some("application/json".to_string());
        request.generation_config.response_schema = Some(evaluation_schema());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(
            value["generationConfig"]["responseSchema"]["required"][0],
            "score"
        );
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "system");
    }

    #[test]
    fn test_text_request_omits_schema_fields() {
        let client = HttpGenerationClient::new(GenerationConfig::default()).unwrap();
        let prompt = PromptMaterial {
            session_id: Uuid::new_v4(),
            system: "s".to_string(),
            user: "u".to_string(),
        };

        let value = serde_json::to_value(client.base_request(&prompt)).unwrap();
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_response_parsing_shape() {
        let json = r#"{
            "candidates": [
                { "content": { "role": "model", "parts": [{ "text": "hello" }] } }
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(json).unwrap();
        assert_eq!(parsed.candidates[0].content.parts[0].text, "hello");
    }
}
