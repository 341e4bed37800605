//! Gemini-backed model session with function calling.
//!
//! Keeps the accumulated conversation contents in memory and maps the
//! domain's turn/response types onto the provider's wire format. One
//! request per turn; the whole history is resent each time.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::ProviderConfig;
use crate::domain::errors::UpstreamError;
use crate::domain::traits::ModelSession;
use crate::domain::types::{ModelResponse, ModelTurn, ThinkingEffort, ToolCallRequest};
use crate::infrastructure::tools::catalog::ToolDescriptor;

const PROVIDER: &str = "gemini";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// HTTP client reused across requests
fn http_client() -> &'static Client {
    use std::sync::OnceLock;
    static CLIENT: OnceLock<Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        Client::builder()
            .timeout(std::time::Duration::from_secs(120))
            .build()
            .expect("Failed to create HTTP client")
    })
}

/// Gemini API request format
#[derive(Debug, Serialize)]
struct GeminiRequest {
    system_instruction: GeminiSystemInstruction,
    contents: Vec<GeminiContent>,
    tools: Vec<GeminiToolDeclaration>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize)]
struct GeminiToolDeclaration {
    function_declarations: Vec<FunctionDeclaration>,
}

/// One catalog entry in the provider's declaration format.
#[derive(Debug, Clone, Serialize)]
struct FunctionDeclaration {
    name: String,
    description: String,
    parameters: Value,
}

impl FunctionDeclaration {
    fn from_descriptor(descriptor: &ToolDescriptor) -> Self {
        Self {
            name: descriptor.name.to_string(),
            description: descriptor.description.to_string(),
            parameters: descriptor.parameters.clone(),
        }
    }
}

/// Generation configuration
#[derive(Debug, Serialize)]
struct GenerationConfig {
    thinking_config: ThinkingConfig,
}

#[derive(Debug, Serialize)]
struct ThinkingConfig {
    thinking_level: String,
}

/// Gemini content (message)
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

/// Gemini content part: text, a function call from the model, or a
/// function response sent back to it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(rename = "functionCall", skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(rename = "functionResponse", skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Default::default()
        }
    }

    fn function_response(name: &str, output: &str) -> Self {
        Self {
            function_response: Some(GeminiFunctionResponse {
                name: name.to_string(),
                response: json!({ "result": output }),
            }),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    name: String,
    #[serde(default)]
    args: Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

/// Gemini API response format
#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    finish_reason: Option<String>,
}

/// The conversation handle owned by the orchestrator.
pub struct GeminiSession {
    config: ProviderConfig,
    thinking: ThinkingEffort,
    system_prompt: String,
    declarations: Vec<FunctionDeclaration>,
    history: Vec<GeminiContent>,
}

impl GeminiSession {
    pub fn new(
        config: ProviderConfig,
        thinking: ThinkingEffort,
        system_prompt: String,
        catalog: &[ToolDescriptor],
    ) -> Self {
        Self {
            config,
            thinking,
            system_prompt,
            declarations: catalog
                .iter()
                .map(FunctionDeclaration::from_descriptor)
                .collect(),
            history: Vec::new(),
        }
    }

    fn build_request(&self) -> GeminiRequest {
        GeminiRequest {
            system_instruction: GeminiSystemInstruction {
                parts: vec![GeminiPart::text(self.system_prompt.clone())],
            },
            contents: self.history.clone(),
            tools: vec![GeminiToolDeclaration {
                function_declarations: self.declarations.clone(),
            }],
            generation_config: GenerationConfig {
                thinking_config: ThinkingConfig {
                    thinking_level: self.thinking.wire_value().to_string(),
                },
            },
        }
    }

    async fn generate(&self) -> Result<GeminiContent, UpstreamError> {
        let base_url = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            base_url, self.config.model, self.config.api_key
        );

        let response = http_client()
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&self.build_request())
            .send()
            .await
            .map_err(|e| UpstreamError::new(PROVIDER, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unable to read error response".to_string());

            // Try to parse error message from response
            if let Ok(error_json) = serde_json::from_str::<Value>(&error_text)
                && let Some(message) = error_json
                    .get("error")
                    .and_then(|e| e.get("message"))
                    .and_then(|m| m.as_str())
            {
                return Err(UpstreamError::new(PROVIDER, message));
            }

            return Err(UpstreamError::new(
                PROVIDER,
                format!("HTTP {}: {}", status, error_text),
            ));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| UpstreamError::new(PROVIDER, format!("Failed to parse response: {}", e)))?;

        let Some(candidate) = gemini_response.candidates.into_iter().next() else {
            return Err(UpstreamError::new(PROVIDER, "No candidates in response"));
        };

        Ok(candidate.content.unwrap_or(GeminiContent {
            role: "model".to_string(),
            parts: Vec::new(),
        }))
    }
}

#[async_trait]
impl ModelSession for GeminiSession {
    async fn send(&mut self, turn: ModelTurn) -> Result<ModelResponse, UpstreamError> {
        let content = match turn {
            ModelTurn::UserText(text) => GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::text(text)],
            },
            ModelTurn::ToolOutput { tool_name, output } => GeminiContent {
                role: "user".to_string(),
                parts: vec![GeminiPart::function_response(&tool_name, &output)],
            },
        };
        self.history.push(content);

        let candidate = self.generate().await?;
        let (recorded, response) = digest_parts(candidate.parts);

        if !recorded.is_empty() {
            self.history.push(GeminiContent {
                role: "model".to_string(),
                parts: recorded,
            });
        }

        tracing::debug!(
            tool_calls = response.tool_calls.len(),
            has_text = response.text.is_some(),
            "model response digested"
        );
        Ok(response)
    }
}

/// Splits a candidate's parts into what the session records and what the
/// caller sees. The recorded model turn is cut after the first function
/// call: one call is handled per iteration, and the model re-issues
/// anything it still wants once it sees the result.
fn digest_parts(parts: Vec<GeminiPart>) -> (Vec<GeminiPart>, ModelResponse) {
    let mut recorded = Vec::new();
    let mut segments: Vec<String> = Vec::new();
    let mut tool_calls = Vec::new();

    for part in parts {
        let before_first_call = tool_calls.is_empty();
        if before_first_call
            && let Some(text) = &part.text
            && !text.is_empty()
        {
            segments.push(text.clone());
        }
        if let Some(call) = &part.function_call {
            tool_calls.push(ToolCallRequest {
                name: call.name.clone(),
                args: call.args.clone(),
            });
        }
        if before_first_call {
            recorded.push(part);
        }
    }

    let joined = segments.join("\n");
    let text = if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    };

    (recorded, ModelResponse { text, tool_calls })
}
