use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::error::ToolError;
use crate::request::Prompt;
use crate::schema::Schema;

pub const DEFAULT_TEXT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_IMAGE_MODEL: &str = "imagen-4.0-generate-001";

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Ordered sequence of text fragments from a streaming chat call. Fragments
/// arrive in emission order; the channel closing signals completion. An
/// `Err` item ends the stream early.
pub type ChatStream = mpsc::UnboundedReceiver<Result<String, ToolError>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    User,
    Model,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

/// Conversation history owned by the chat panel. The accumulated turns are
/// the backend's multi-turn context and are resent with every exchange.
#[derive(Debug, Clone, Default)]
pub struct ChatSession {
    pub turns: Vec<ChatTurn>,
}

impl ChatSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_user(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::User,
            text: text.into(),
        });
    }

    pub fn push_model(&mut self, text: impl Into<String>) {
        self.turns.push(ChatTurn {
            role: Role::Model,
            text: text.into(),
        });
    }

    /// Append a streamed fragment to the trailing model turn in place.
    pub fn append_to_last(&mut self, fragment: &str) {
        if let Some(last) = self.turns.last_mut() {
            last.text.push_str(fragment);
        }
    }

    /// Turns sent as backend context. The wire contract wants the first
    /// content to carry the user role, so a leading greeting from the model
    /// is display-only and skipped here.
    pub fn backend_turns(&self) -> &[ChatTurn] {
        let start = self
            .turns
            .iter()
            .position(|turn| turn.role == Role::User)
            .unwrap_or(self.turns.len());
        &self.turns[start..]
    }
}

/// One generated image, encoded for direct display.
#[derive(Debug, Clone)]
pub struct GeneratedImage {
    pub mime_type: String,
    pub data_uri: String,
}

impl GeneratedImage {
    /// Approximate decoded payload size, derived from the base64 length.
    pub fn approx_bytes(&self) -> usize {
        let encoded = self
            .data_uri
            .split_once("base64,")
            .map(|(_, data)| data.len())
            .unwrap_or(0);
        encoded * 3 / 4
    }
}

/// The injected backend collaborator: exactly the four request shapes the
/// tools need. Panels only see this trait, so tests substitute a fake.
#[async_trait]
pub trait GenerativeBackend: Send + Sync {
    /// Free-text instruction in, free-text (Markdown) result out.
    async fn generate(&self, prompt: &Prompt) -> Result<String, ToolError>;

    /// Instruction plus a response schema in, raw JSON text out.
    async fn generate_structured(&self, prompt: &Prompt, schema: &Schema)
        -> Result<String, ToolError>;

    /// One chat exchange over the accumulated history; returns the fragment
    /// stream for the reply now being generated.
    async fn stream_chat(
        &self,
        system: &str,
        history: Vec<ChatTurn>,
    ) -> Result<ChatStream, ToolError>;

    /// Instruction, count, and aspect ratio in; a list of image payloads out.
    async fn generate_images(
        &self,
        prompt: &str,
        count: u8,
        aspect_ratio: &str,
    ) -> Result<Vec<GeneratedImage>, ToolError>;
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<Content>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

impl Content {
    fn user(text: &str) -> Self {
        Self {
            role: Some("user".to_string()),
            parts: vec![Part { text: text.to_string() }],
        }
    }

    fn system(text: &str) -> Self {
        Self {
            role: None,
            parts: vec![Part { text: text.to_string() }],
        }
    }

    fn turn(turn: &ChatTurn) -> Self {
        Self {
            role: Some(turn.role.as_str().to_string()),
            parts: vec![Part {
                text: turn.text.clone(),
            }],
        }
    }
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct GenerationConfig {
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: Schema,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

/// Concatenated text of the first candidate, or `None` when the response
/// carried no usable text (an empty result set).
fn extract_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;
    let text: String = content.parts.iter().map(|part| part.text.as_str()).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// One SSE line -> one text fragment, if the line carries any.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim_start();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    let response: GenerateResponse = serde_json::from_str(data).ok()?;
    extract_text(&response)
}

#[derive(Serialize)]
struct PredictRequest {
    instances: Vec<PredictInstance>,
    parameters: PredictParameters,
}

#[derive(Serialize)]
struct PredictInstance {
    prompt: String,
}

#[derive(Serialize)]
struct PredictParameters {
    #[serde(rename = "sampleCount")]
    sample_count: u8,
    #[serde(rename = "aspectRatio")]
    aspect_ratio: String,
    #[serde(rename = "outputMimeType")]
    output_mime_type: String,
}

#[derive(Deserialize)]
struct PredictResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Deserialize)]
struct Prediction {
    #[serde(rename = "bytesBase64Encoded")]
    bytes_base64: Option<String>,
    #[serde(rename = "mimeType", default)]
    mime_type: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    text_model: String,
    image_model: String,
}

impl GeminiClient {
    pub fn new(api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: API_BASE.to_string(),
            api_key: api_key.to_string(),
            text_model: DEFAULT_TEXT_MODEL.to_string(),
            image_model: DEFAULT_IMAGE_MODEL.to_string(),
        }
    }

    pub fn with_text_model(mut self, model: &str) -> Self {
        self.text_model = model.to_string();
        self
    }

    pub fn with_image_model(mut self, model: &str) -> Self {
        self.image_model = model.to_string();
        self
    }

    async fn send(
        &self,
        url: &str,
        request: &GenerateRequest,
    ) -> Result<reqwest::Response, ToolError> {
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", &self.api_key)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::backend(format!("Gemini API error {status}: {text}")));
        }

        Ok(response)
    }
}

#[async_trait]
impl GenerativeBackend for GeminiClient {
    async fn generate(&self, prompt: &Prompt) -> Result<String, ToolError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.text_model);
        let request = GenerateRequest {
            contents: vec![Content::user(&prompt.user)],
            system_instruction: prompt.system.as_deref().map(Content::system),
            generation_config: None,
        };

        let response = self.send(&url, &request).await?;
        let body: GenerateResponse = response.json().await?;
        extract_text(&body).ok_or_else(|| ToolError::backend("the model returned an empty response"))
    }

    async fn generate_structured(
        &self,
        prompt: &Prompt,
        schema: &Schema,
    ) -> Result<String, ToolError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.text_model);
        let request = GenerateRequest {
            contents: vec![Content::user(&prompt.user)],
            system_instruction: prompt.system.as_deref().map(Content::system),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: schema.clone(),
            }),
        };

        let response = self.send(&url, &request).await?;
        let body: GenerateResponse = response.json().await?;
        extract_text(&body).ok_or_else(|| ToolError::backend("the model returned an empty response"))
    }

    async fn stream_chat(
        &self,
        system: &str,
        history: Vec<ChatTurn>,
    ) -> Result<ChatStream, ToolError> {
        let url = format!(
            "{}/models/{}:streamGenerateContent?alt=sse",
            self.base_url, self.text_model
        );
        let request = GenerateRequest {
            contents: history.iter().map(Content::turn).collect(),
            system_instruction: Some(Content::system(system)),
            generation_config: None,
        };

        let response = self.send(&url, &request).await?;

        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let mut bytes = response.bytes_stream();
            let mut buffer = String::new();

            while let Some(chunk) = bytes.next().await {
                let chunk = match chunk {
                    Ok(chunk) => chunk,
                    Err(err) => {
                        let _ = tx.send(Err(ToolError::backend(format!(
                            "stream interrupted: {err}"
                        ))));
                        return;
                    }
                };

                buffer.push_str(&String::from_utf8_lossy(&chunk));
                while let Some(newline) = buffer.find('\n') {
                    let line: String = buffer.drain(..=newline).collect();
                    if let Some(fragment) = parse_sse_line(line.trim_end()) {
                        if tx.send(Ok(fragment)).is_err() {
                            return;
                        }
                    }
                }
            }

            if let Some(fragment) = parse_sse_line(buffer.trim_end()) {
                let _ = tx.send(Ok(fragment));
            }
        });

        Ok(rx)
    }

    async fn generate_images(
        &self,
        prompt: &str,
        count: u8,
        aspect_ratio: &str,
    ) -> Result<Vec<GeneratedImage>, ToolError> {
        let url = format!("{}/models/{}:predict", self.base_url, self.image_model);
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: prompt.to_string(),
            }],
            parameters: PredictParameters {
                sample_count: count,
                aspect_ratio: aspect_ratio.to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::backend(format!("Gemini API error {status}: {text}")));
        }

        let body: PredictResponse = response.json().await?;
        let images: Vec<GeneratedImage> = body
            .predictions
            .into_iter()
            .filter_map(|prediction| {
                let data = prediction.bytes_base64?;
                let mime_type = prediction.mime_type.unwrap_or_else(|| "image/jpeg".to_string());
                Some(GeneratedImage {
                    data_uri: format!("data:{mime_type};base64,{data}"),
                    mime_type,
                })
            })
            .collect();

        if images.is_empty() {
            return Err(ToolError::backend(
                "Sorry, I couldn't generate an image for that prompt. Please try a different one.",
            ));
        }

        Ok(images)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_sse_line_extracts_fragment() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hello"}]}}]}"#;
        assert_eq!(parse_sse_line(line), Some("Hello".to_string()));
    }

    #[test]
    fn test_parse_sse_line_concatenates_parts() {
        let line = r#"data: {"candidates":[{"content":{"parts":[{"text":"Hel"},{"text":"lo"}]}}]}"#;
        assert_eq!(parse_sse_line(line), Some("Hello".to_string()));
    }

    #[test]
    fn test_parse_sse_line_ignores_noise() {
        assert_eq!(parse_sse_line(""), None);
        assert_eq!(parse_sse_line(": keep-alive"), None);
        assert_eq!(parse_sse_line("data:"), None);
        assert_eq!(parse_sse_line("data: [DONE]"), None);
        assert_eq!(parse_sse_line("data: not json"), None);
        assert_eq!(parse_sse_line(r#"data: {"candidates":[]}"#), None);
    }

    #[test]
    fn test_extract_text_empty_candidates_is_none() {
        let response: GenerateResponse = serde_json::from_value(json!({})).unwrap();
        assert!(extract_text(&response).is_none());

        let response: GenerateResponse =
            serde_json::from_value(json!({ "candidates": [{ "content": { "parts": [] } }] }))
                .unwrap();
        assert!(extract_text(&response).is_none());
    }

    #[test]
    fn test_generate_request_wire_shape() {
        let request = GenerateRequest {
            contents: vec![Content::user("hi")],
            system_instruction: Some(Content::system("be brief")),
            generation_config: Some(GenerationConfig {
                response_mime_type: "application/json".to_string(),
                response_schema: crate::schema::language_detection(),
            }),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["role"], "user");
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be brief");
        assert!(value["systemInstruction"].get("role").is_none());
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert_eq!(value["generationConfig"]["responseSchema"]["type"], "OBJECT");
    }

    #[test]
    fn test_predict_request_wire_shape() {
        let request = PredictRequest {
            instances: vec![PredictInstance {
                prompt: "a red fox".to_string(),
            }],
            parameters: PredictParameters {
                sample_count: 2,
                aspect_ratio: "16:9".to_string(),
                output_mime_type: "image/jpeg".to_string(),
            },
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["instances"][0]["prompt"], "a red fox");
        assert_eq!(value["parameters"]["sampleCount"], 2);
        assert_eq!(value["parameters"]["aspectRatio"], "16:9");
        assert_eq!(value["parameters"]["outputMimeType"], "image/jpeg");
    }

    #[test]
    fn test_chat_session_backend_turns_skip_leading_greeting() {
        let mut session = ChatSession::new();
        session.push_model("Hello! How can I help?");
        session.push_user("What is Rust?");
        session.push_model("A systems language.");

        let turns = session.backend_turns();
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].role, Role::User);

        // A session with no user turn yet sends nothing.
        let mut greeting_only = ChatSession::new();
        greeting_only.push_model("Hello!");
        assert!(greeting_only.backend_turns().is_empty());
    }

    #[test]
    fn test_append_to_last_mutates_trailing_turn() {
        let mut session = ChatSession::new();
        session.push_user("hi");
        session.push_model("");
        session.append_to_last("Hel");
        session.append_to_last("lo");
        assert_eq!(session.turns.last().unwrap().text, "Hello");
    }

    #[test]
    fn test_generated_image_approx_bytes() {
        let image = GeneratedImage {
            mime_type: "image/jpeg".to_string(),
            data_uri: format!("data:image/jpeg;base64,{}", "A".repeat(4096)),
        };
        assert_eq!(image.approx_bytes(), 3072);
    }
}
