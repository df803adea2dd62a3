//! One async entry point per tool operation: validate the raw fields, build
//! the prompt (and schema when structured), call the backend, decode. These
//! are the futures panel controllers spawn.

use std::sync::Arc;

use crate::decode::{self, ChartSpec, ContentAnalysis, LanguageDetection, MobileUiSpec, WebsiteCode};
use crate::error::ToolError;
use crate::gemini::{ChatStream, ChatTurn, GeneratedImage, GenerativeBackend};
use crate::request::{ToolRequest, CHAT_SYSTEM_INSTRUCTION};

pub async fn generate_image(
    backend: Arc<dyn GenerativeBackend>,
    prompt: String,
    count: u8,
    aspect_ratio: String,
) -> Result<Vec<GeneratedImage>, ToolError> {
    ToolRequest::Image {
        prompt: prompt.clone(),
        count,
        aspect_ratio: aspect_ratio.clone(),
    }
    .validate()?;
    backend.generate_images(&prompt, count, &aspect_ratio).await
}

pub async fn explain_code(
    backend: Arc<dyn GenerativeBackend>,
    code: String,
    language: String,
) -> Result<String, ToolError> {
    let request = ToolRequest::ExplainCode { code, language };
    request.validate()?;
    backend.generate(&request.prompt()).await
}

pub async fn generate_recipe(
    backend: Arc<dyn GenerativeBackend>,
    ingredients: String,
    diet: Option<String>,
) -> Result<String, ToolError> {
    let request = ToolRequest::Recipe { ingredients, diet };
    request.validate()?;
    backend.generate(&request.prompt()).await
}

/// Rewrites text to sound more natural. Failures propagate like every other
/// operation; the original fallback-apology behavior was intentionally not
/// kept.
pub async fn humanize_text(
    backend: Arc<dyn GenerativeBackend>,
    text: String,
) -> Result<String, ToolError> {
    let request = ToolRequest::Humanize { text };
    request.validate()?;
    backend.generate(&request.prompt()).await
}

pub async fn build_website(
    backend: Arc<dyn GenerativeBackend>,
    prompt: String,
) -> Result<WebsiteCode, ToolError> {
    let request = ToolRequest::Website { prompt };
    request.validate()?;
    let schema = request.schema().expect("website responses are structured");
    let raw = backend.generate_structured(&request.prompt(), &schema).await?;
    decode::structured(&raw)
}

pub async fn build_mobile_ui(
    backend: Arc<dyn GenerativeBackend>,
    prompt: String,
) -> Result<MobileUiSpec, ToolError> {
    let request = ToolRequest::MobileUi { prompt };
    request.validate()?;
    let schema = request.schema().expect("mobile UI responses are structured");
    let raw = backend.generate_structured(&request.prompt(), &schema).await?;
    decode::structured(&raw)
}

pub async fn generate_chart(
    backend: Arc<dyn GenerativeBackend>,
    prompt: String,
) -> Result<ChartSpec, ToolError> {
    let request = ToolRequest::Chart { prompt };
    request.validate()?;
    let schema = request.schema().expect("chart responses are structured");
    let raw = backend.generate_structured(&request.prompt(), &schema).await?;
    decode::structured(&raw)
}

pub async fn analyze_content(
    backend: Arc<dyn GenerativeBackend>,
    text: String,
) -> Result<ContentAnalysis, ToolError> {
    let request = ToolRequest::Analyze { text };
    request.validate()?;
    let schema = request.schema().expect("analysis responses are structured");
    let raw = backend.generate_structured(&request.prompt(), &schema).await?;
    decode::structured(&raw)
}

pub async fn detect_language(
    backend: Arc<dyn GenerativeBackend>,
    code: String,
) -> Result<LanguageDetection, ToolError> {
    let request = ToolRequest::DetectLanguage { code };
    request.validate()?;
    let schema = request.schema().expect("detection responses are structured");
    let raw = backend.generate_structured(&request.prompt(), &schema).await?;
    decode::structured(&raw)
}

/// Starts one chat exchange: validates the message and opens the fragment
/// stream over the accumulated history (which must already end with the new
/// user turn).
pub async fn send_chat_turn(
    backend: Arc<dyn GenerativeBackend>,
    history: Vec<ChatTurn>,
) -> Result<ChatStream, ToolError> {
    let message = history
        .last()
        .map(|turn| turn.text.clone())
        .unwrap_or_default();
    ToolRequest::ChatTurn { message }.validate()?;
    backend.stream_chat(CHAT_SYSTEM_INSTRUCTION, history).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::Prompt;
    use crate::schema::Schema;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    /// Canned backend that records traffic instead of going to the network.
    struct FakeBackend {
        calls: AtomicUsize,
        reply: Result<String, String>,
        fragments: Vec<String>,
    }

    impl FakeBackend {
        fn replying(reply: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(reply.to_string()),
                fragments: Vec::new(),
            })
        }

        fn failing(message: &str) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Err(message.to_string()),
                fragments: Vec::new(),
            })
        }

        fn streaming(fragments: &[&str]) -> Arc<Self> {
            Arc::new(Self {
                calls: AtomicUsize::new(0),
                reply: Ok(String::new()),
                fragments: fragments.iter().map(|f| f.to_string()).collect(),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn canned(&self) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply.clone().map_err(ToolError::backend)
        }
    }

    #[async_trait]
    impl GenerativeBackend for FakeBackend {
        async fn generate(&self, _prompt: &Prompt) -> Result<String, ToolError> {
            self.canned()
        }

        async fn generate_structured(
            &self,
            _prompt: &Prompt,
            _schema: &Schema,
        ) -> Result<String, ToolError> {
            self.canned()
        }

        async fn stream_chat(
            &self,
            _system: &str,
            _history: Vec<ChatTurn>,
        ) -> Result<ChatStream, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::unbounded_channel();
            for fragment in &self.fragments {
                tx.send(Ok(fragment.clone())).unwrap();
            }
            Ok(rx)
        }

        async fn generate_images(
            &self,
            _prompt: &str,
            count: u8,
            _aspect_ratio: &str,
        ) -> Result<Vec<GeneratedImage>, ToolError> {
            self.canned()?;
            Ok((0..count)
                .map(|_| GeneratedImage {
                    mime_type: "image/jpeg".to_string(),
                    data_uri: "data:image/jpeg;base64,AAAA".to_string(),
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn test_empty_input_never_reaches_the_backend() {
        let backend = FakeBackend::replying("unused");

        let err = generate_recipe(backend.clone(), String::new(), None)
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = build_website(backend.clone(), "   ".to_string())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = generate_image(backend.clone(), String::new(), 1, "1:1".to_string())
            .await
            .unwrap_err();
        assert!(err.is_validation());

        let err = send_chat_turn(backend.clone(), Vec::new()).await.unwrap_err();
        assert!(err.is_validation());

        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_plain_generation_passes_text_through() {
        let backend = FakeBackend::replying("## Fried Rice\nA quick dinner.");
        let recipe = generate_recipe(backend.clone(), "rice, egg".to_string(), None)
            .await
            .unwrap();
        assert_eq!(recipe, "## Fried Rice\nA quick dinner.");
        assert_eq!(backend.calls(), 1);
    }

    #[tokio::test]
    async fn test_detect_language_scenario() {
        let backend = FakeBackend::replying(r#"{ "language": "Python", "confidence": 0.95 }"#);
        let detection = detect_language(backend, "def f(x): return x+1".to_string())
            .await
            .unwrap();
        assert_eq!(detection.language, "Python");
        assert_eq!(decode::confidence_percent(detection.confidence), "95%");
    }

    #[tokio::test]
    async fn test_structured_reply_missing_field_is_decode_error() {
        let backend = FakeBackend::replying(r#"{ "language": "Python" }"#);
        let err = detect_language(backend, "code".to_string()).await.unwrap_err();
        assert!(matches!(err, ToolError::Decode(_)));
    }

    #[tokio::test]
    async fn test_backend_failure_stays_a_backend_error() {
        let backend = FakeBackend::failing("Gemini API error 503");
        let err = build_website(backend, "a portfolio".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Backend(_)));
    }

    #[tokio::test]
    async fn test_humanize_propagates_errors_like_other_operations() {
        let backend = FakeBackend::failing("Gemini API error 500");
        let err = humanize_text(backend, "robotic text".to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolError::Backend(_)));
    }

    #[tokio::test]
    async fn test_image_generation_returns_requested_count() {
        let backend = FakeBackend::replying("ok");
        let images = generate_image(backend, "a red fox".to_string(), 3, "16:9".to_string())
            .await
            .unwrap();
        assert_eq!(images.len(), 3);
        assert!(images[0].data_uri.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_chat_fragments_fold_in_emission_order() {
        let backend = FakeBackend::streaming(&["Hel", "lo ", "there"]);
        let mut history = Vec::new();
        history.push(ChatTurn {
            role: crate::gemini::Role::User,
            text: "hi".to_string(),
        });
        let mut stream = send_chat_turn(backend, history).await.unwrap();

        let mut reply = String::new();
        let mut fragments = 0;
        while let Some(fragment) = stream.recv().await {
            reply.push_str(&fragment.unwrap());
            fragments += 1;
        }
        assert_eq!(reply, "Hello there");
        assert_eq!(fragments, 3);
    }

    #[tokio::test]
    async fn test_analyze_content_decodes_all_fields() {
        let backend = FakeBackend::replying(
            r#"{ "classification": "Likely AI-generated", "confidence": 0.873, "reasoning": "uniform sentence structure" }"#,
        );
        let analysis = analyze_content(backend, "some essay".to_string()).await.unwrap();
        assert_eq!(analysis.classification, "Likely AI-generated");
        assert_eq!(decode::confidence_percent(analysis.confidence), "87%");
        assert_eq!(analysis.reasoning, "uniform sentence structure");
    }
}
