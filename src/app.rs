use ratatui::widgets::ListState;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TryRecvError;

use crate::decode::{ChartSpec, ContentAnalysis, LanguageDetection, MobileUiSpec, WebsiteCode};
use crate::gemini::{ChatSession, ChatStream, GeneratedImage, GenerativeBackend};
use crate::ops;
use crate::panel::AsyncTask;
use crate::request::{ToolRequest, CHAT_GREETING};
use crate::speech::{self, SpeechEngine, Voice};

pub const ASPECT_RATIOS: [&str; 5] = ["1:1", "3:4", "4:3", "9:16", "16:9"];
pub const MAX_IMAGES: u8 = 4;

pub const LANGUAGES: [(&str, &str); 9] = [
    ("javascript", "JavaScript"),
    ("python", "Python"),
    ("typescript", "TypeScript"),
    ("java", "Java"),
    ("csharp", "C#"),
    ("go", "Go"),
    ("rust", "Rust"),
    ("html", "HTML"),
    ("css", "CSS"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tool {
    Image,
    Recipe,
    Voice,
    Chat,
    Website,
    MobileUi,
    Chart,
    ContentChecker,
    CodeExplainer,
    LanguageDetector,
}

impl Tool {
    pub const ALL: [Tool; 10] = [
        Tool::Image,
        Tool::Recipe,
        Tool::Voice,
        Tool::Chat,
        Tool::Website,
        Tool::MobileUi,
        Tool::Chart,
        Tool::ContentChecker,
        Tool::CodeExplainer,
        Tool::LanguageDetector,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Tool::Image => "Image Generator",
            Tool::Recipe => "Recipe Generator",
            Tool::Voice => "Voice Generator",
            Tool::Chat => "AI Chatbot",
            Tool::Website => "Website Builder AI",
            Tool::MobileUi => "Mobile App Builder",
            Tool::Chart => "Data Visualization",
            Tool::ContentChecker => "Content Checker",
            Tool::CodeExplainer => "Code Explainer",
            Tool::LanguageDetector => "Language Detector",
        }
    }

    pub fn tagline(&self) -> &'static str {
        match self {
            Tool::Image => "Describe the image you want and let Imagen create it.",
            Tool::Recipe => "Turn the ingredients you have into a full recipe.",
            Tool::Voice => "Turn your text into speech using your system's speech engine.",
            Tool::Chat => "Have a conversation with Gemini.",
            Tool::Website => "Describe the website you want to create, and let AI build it for you.",
            Tool::MobileUi => "Describe a mobile app screen and get a component layout.",
            Tool::Chart => "Describe your data and get a chart.",
            Tool::ContentChecker => "Analyze text to detect AI-generated content and humanize it.",
            Tool::CodeExplainer => "Paste a code snippet and get a step-by-step explanation.",
            Tool::LanguageDetector => "Paste a code snippet to identify its programming language.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    Sidebar,
    Panel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WebsiteView {
    Preview,
    Code,
}

/// A single editable text value with a character-indexed cursor. All edits
/// convert the cursor to a byte index first, so multi-byte input stays safe.
#[derive(Debug, Clone, Default)]
pub struct TextField {
    pub value: String,
    pub cursor: usize,
}

impl TextField {
    fn byte_index(&self, char_idx: usize) -> usize {
        self.value
            .char_indices()
            .nth(char_idx)
            .map(|(i, _)| i)
            .unwrap_or(self.value.len())
    }

    pub fn insert(&mut self, c: char) {
        let byte_pos = self.byte_index(self.cursor);
        self.value.insert(byte_pos, c);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let byte_pos = self.byte_index(self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let byte_pos = self.byte_index(self.cursor);
            self.value.remove(byte_pos);
        }
    }

    pub fn left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn right(&mut self) {
        self.cursor = (self.cursor + 1).min(self.char_count());
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.char_count();
    }

    pub fn char_count(&self) -> usize {
        self.value.chars().count()
    }

    pub fn is_blank(&self) -> bool {
        self.value.trim().is_empty()
    }

    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.value)
    }
}

pub struct ImagePanel {
    pub prompt: TextField,
    pub count: u8,
    pub aspect_index: usize,
    pub field: usize, // 0 = prompt, 1 = count, 2 = aspect ratio
    pub task: AsyncTask<Vec<GeneratedImage>>,
}

pub struct RecipePanel {
    pub ingredients: TextField,
    pub diet: TextField,
    pub field: usize, // 0 = ingredients, 1 = diet
    pub task: AsyncTask<String>,
    pub scroll: u16,
}

pub struct VoicePanel {
    pub text: TextField,
    pub voices: AsyncTask<Vec<Voice>>,
    pub voice_state: ListState,
    pub field: usize, // 0 = text, 1 = voice list
    pub speaking: bool,
    pub error: Option<String>,
}

pub struct ChatPanel {
    pub input: TextField,
    pub session: ChatSession,
    pub stream: Option<ChatStream>,
    pub streaming: bool,
    pub error: Option<String>,
    pub scroll: u16,
}

pub struct WebsitePanel {
    pub prompt: TextField,
    pub view: WebsiteView,
    pub task: AsyncTask<WebsiteCode>,
    pub scroll: u16,
}

pub struct MobilePanel {
    pub prompt: TextField,
    pub task: AsyncTask<MobileUiSpec>,
    pub scroll: u16,
}

pub struct ChartPanel {
    pub prompt: TextField,
    pub task: AsyncTask<ChartSpec>,
    pub scroll: u16,
}

pub struct ContentPanel {
    pub text: TextField,
    pub analysis: AsyncTask<ContentAnalysis>,
    pub humanized: AsyncTask<String>,
    pub scroll: u16,
}

pub struct CodeExplainerPanel {
    pub code: TextField,
    pub language_index: usize,
    pub field: usize, // 0 = code, 1 = language
    pub task: AsyncTask<String>,
    pub scroll: u16,
}

pub struct DetectPanel {
    pub code: TextField,
    pub task: AsyncTask<LanguageDetection>,
}

pub struct App {
    pub should_quit: bool,
    pub active_tool: Tool,
    pub sidebar_state: ListState,
    pub focus: Focus,
    pub input_mode: InputMode,
    pub animation_frame: u8,

    pub backend: Arc<dyn GenerativeBackend>,
    pub speech: SpeechEngine,

    pub image: ImagePanel,
    pub recipe: RecipePanel,
    pub voice: VoicePanel,
    pub chat: ChatPanel,
    pub website: WebsitePanel,
    pub mobile: MobilePanel,
    pub chart: ChartPanel,
    pub content: ContentPanel,
    pub code: CodeExplainerPanel,
    pub detect: DetectPanel,
}

impl App {
    pub fn new(backend: Arc<dyn GenerativeBackend>) -> Self {
        let mut sidebar_state = ListState::default();
        sidebar_state.select(Some(0));

        let mut session = ChatSession::new();
        session.push_model(CHAT_GREETING);

        Self {
            should_quit: false,
            active_tool: Tool::Image,
            sidebar_state,
            focus: Focus::Sidebar,
            input_mode: InputMode::Normal,
            animation_frame: 0,

            backend,
            speech: SpeechEngine::new(),

            image: ImagePanel {
                prompt: TextField::default(),
                count: 1,
                aspect_index: 0,
                field: 0,
                task: AsyncTask::new(),
            },
            recipe: RecipePanel {
                ingredients: TextField::default(),
                diet: TextField::default(),
                field: 0,
                task: AsyncTask::new(),
                scroll: 0,
            },
            voice: VoicePanel {
                text: TextField::default(),
                voices: AsyncTask::new(),
                voice_state: ListState::default(),
                field: 0,
                speaking: false,
                error: None,
            },
            chat: ChatPanel {
                input: TextField::default(),
                session,
                stream: None,
                streaming: false,
                error: None,
                scroll: 0,
            },
            website: WebsitePanel {
                prompt: TextField::default(),
                view: WebsiteView::Preview,
                task: AsyncTask::new(),
                scroll: 0,
            },
            mobile: MobilePanel {
                prompt: TextField::default(),
                task: AsyncTask::new(),
                scroll: 0,
            },
            chart: ChartPanel {
                prompt: TextField::default(),
                task: AsyncTask::new(),
                scroll: 0,
            },
            content: ContentPanel {
                text: TextField::default(),
                analysis: AsyncTask::new(),
                humanized: AsyncTask::new(),
                scroll: 0,
            },
            code: CodeExplainerPanel {
                code: TextField::default(),
                language_index: 0,
                field: 0,
                task: AsyncTask::new(),
                scroll: 0,
            },
            detect: DetectPanel {
                code: TextField::default(),
                task: AsyncTask::new(),
            },
        }
    }

    // Sidebar navigation
    pub fn sidebar_nav_down(&mut self) {
        let len = Tool::ALL.len();
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some((i + 1).min(len - 1)));
    }

    pub fn sidebar_nav_up(&mut self) {
        let i = self.sidebar_state.selected().unwrap_or(0);
        self.sidebar_state.select(Some(i.saturating_sub(1)));
    }

    /// Activate the tool under the sidebar cursor. Entering the voice panel
    /// kicks off voice enumeration if it hasn't produced a list yet.
    pub fn select_tool(&mut self) {
        if let Some(i) = self.sidebar_state.selected() {
            self.active_tool = Tool::ALL[i];
            self.focus = Focus::Panel;
            if self.active_tool == Tool::Voice {
                self.ensure_voices_loaded();
            }
        }
    }

    fn ensure_voices_loaded(&mut self) {
        if self.voice.voices.result().is_some() || self.voice.voices.is_loading() {
            return;
        }
        self.voice.voices.start(
            speech::list_voices(),
            "Could not load voices from the system speech engine.",
        );
    }

    pub fn tick_animation(&mut self) {
        if self.any_loading() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    fn any_loading(&self) -> bool {
        self.image.task.is_loading()
            || self.recipe.task.is_loading()
            || self.voice.voices.is_loading()
            || self.chat.streaming
            || self.website.task.is_loading()
            || self.mobile.task.is_loading()
            || self.chart.task.is_loading()
            || self.content.analysis.is_loading()
            || self.content.humanized.is_loading()
            || self.code.task.is_loading()
            || self.detect.task.is_loading()
    }

    /// Fold finished work into panel state: join completed tasks, drain chat
    /// fragments in arrival order, refresh playback status. Called on every
    /// tick.
    pub async fn poll_tasks(&mut self) {
        self.image.task.poll().await;
        self.recipe.task.poll().await;
        self.voice.voices.poll().await;
        self.website.task.poll().await;
        self.mobile.task.poll().await;
        self.chart.task.poll().await;
        self.content.analysis.poll().await;
        self.content.humanized.poll().await;
        self.code.task.poll().await;
        self.detect.task.poll().await;

        self.drain_chat_stream();
        self.voice.speaking = self.speech.is_speaking();

        if self.voice.voice_state.selected().is_none() {
            if let Some(voices) = self.voice.voices.result() {
                if !voices.is_empty() {
                    self.voice.voice_state.select(Some(0));
                }
            }
        }
    }

    fn drain_chat_stream(&mut self) {
        let Some(rx) = &mut self.chat.stream else {
            return;
        };

        let mut closed = false;
        loop {
            match rx.try_recv() {
                Ok(Ok(fragment)) => self.chat.session.append_to_last(&fragment),
                Ok(Err(err)) => {
                    self.chat.error = Some(format!("Sorry, something went wrong. {err}"));
                    if let Some(last) = self.chat.session.turns.last_mut() {
                        if last.text.is_empty() {
                            last.text = "Sorry, I encountered an error. Please try again.".to_string();
                        }
                    }
                    closed = true;
                    break;
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    closed = true;
                    break;
                }
            }
        }

        if closed {
            self.chat.stream = None;
            self.chat.streaming = false;
        }
    }

    // Submissions. Each validates locally first (an empty primary field
    // never issues a network call), then spawns the operation.

    pub fn submit_image(&mut self) {
        if self.image.task.is_loading() {
            return;
        }
        let prompt = self.image.prompt.value.clone();
        let count = self.image.count;
        let aspect_ratio = ASPECT_RATIOS[self.image.aspect_index].to_string();

        let request = ToolRequest::Image {
            prompt: prompt.clone(),
            count,
            aspect_ratio: aspect_ratio.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.image.task.fail(err.to_string());
            return;
        }

        let backend = self.backend.clone();
        self.image
            .task
            .start(ops::generate_image(backend, prompt, count, aspect_ratio), failure);
    }

    pub fn submit_recipe(&mut self) {
        if self.recipe.task.is_loading() {
            return;
        }
        let ingredients = self.recipe.ingredients.value.clone();
        let diet = if self.recipe.diet.is_blank() {
            None
        } else {
            Some(self.recipe.diet.value.clone())
        };

        let request = ToolRequest::Recipe {
            ingredients: ingredients.clone(),
            diet: diet.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.recipe.task.fail(err.to_string());
            return;
        }

        self.recipe.scroll = 0;
        let backend = self.backend.clone();
        self.recipe
            .task
            .start(ops::generate_recipe(backend, ingredients, diet), failure);
    }

    pub fn submit_website(&mut self) {
        if self.website.task.is_loading() {
            return;
        }
        let prompt = self.website.prompt.value.clone();
        let request = ToolRequest::Website {
            prompt: prompt.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.website.task.fail(err.to_string());
            return;
        }

        self.website.view = WebsiteView::Preview;
        self.website.scroll = 0;
        let backend = self.backend.clone();
        self.website
            .task
            .start(ops::build_website(backend, prompt), failure);
    }

    pub fn submit_mobile(&mut self) {
        if self.mobile.task.is_loading() {
            return;
        }
        let prompt = self.mobile.prompt.value.clone();
        let request = ToolRequest::MobileUi {
            prompt: prompt.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.mobile.task.fail(err.to_string());
            return;
        }

        self.mobile.scroll = 0;
        let backend = self.backend.clone();
        self.mobile
            .task
            .start(ops::build_mobile_ui(backend, prompt), failure);
    }

    pub fn submit_chart(&mut self) {
        if self.chart.task.is_loading() {
            return;
        }
        let prompt = self.chart.prompt.value.clone();
        let request = ToolRequest::Chart {
            prompt: prompt.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.chart.task.fail(err.to_string());
            return;
        }

        self.chart.scroll = 0;
        let backend = self.backend.clone();
        self.chart
            .task
            .start(ops::generate_chart(backend, prompt), failure);
    }

    pub fn submit_analyze(&mut self) {
        if self.content.analysis.is_loading() {
            return;
        }
        let text = self.content.text.value.clone();
        let request = ToolRequest::Analyze { text: text.clone() };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.content.analysis.fail(err.to_string());
            return;
        }

        let backend = self.backend.clone();
        self.content
            .analysis
            .start(ops::analyze_content(backend, text), failure);
    }

    pub fn submit_humanize(&mut self) {
        if self.content.humanized.is_loading() {
            return;
        }
        let text = self.content.text.value.clone();
        let request = ToolRequest::Humanize { text: text.clone() };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.content.humanized.fail(err.to_string());
            return;
        }

        let backend = self.backend.clone();
        self.content
            .humanized
            .start(ops::humanize_text(backend, text), failure);
    }

    pub fn submit_explain_code(&mut self) {
        if self.code.task.is_loading() {
            return;
        }
        let code = self.code.code.value.clone();
        let language = LANGUAGES[self.code.language_index].0.to_string();
        let request = ToolRequest::ExplainCode {
            code: code.clone(),
            language: language.clone(),
        };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.code.task.fail(err.to_string());
            return;
        }

        self.code.scroll = 0;
        let backend = self.backend.clone();
        self.code
            .task
            .start(ops::explain_code(backend, code, language), failure);
    }

    pub fn submit_detect(&mut self) {
        if self.detect.task.is_loading() {
            return;
        }
        let code = self.detect.code.value.clone();
        let request = ToolRequest::DetectLanguage { code: code.clone() };
        let failure = request.failure_message();
        if let Err(err) = request.validate() {
            self.detect.task.fail(err.to_string());
            return;
        }

        let backend = self.backend.clone();
        self.detect
            .task
            .start(ops::detect_language(backend, code), failure);
    }

    /// One chat exchange: push the user turn, open the fragment stream, and
    /// append a model turn that the stream mutates in place.
    pub fn submit_chat(&mut self) {
        if self.chat.streaming {
            return;
        }
        if self.chat.input.is_blank() {
            self.chat.error = Some("Please enter a message.".to_string());
            return;
        }

        let message = self.chat.input.take();
        self.chat.error = None;
        self.chat.session.push_user(message);

        let history = self.chat.session.backend_turns().to_vec();
        self.chat.session.push_model("");
        self.chat.streaming = true;

        let (tx, rx) = mpsc::unbounded_channel();
        self.chat.stream = Some(rx);

        let backend = self.backend.clone();
        tokio::spawn(async move {
            match ops::send_chat_turn(backend, history).await {
                Ok(mut stream) => {
                    while let Some(item) = stream.recv().await {
                        if tx.send(item).is_err() {
                            return;
                        }
                    }
                }
                Err(err) => {
                    let _ = tx.send(Err(err));
                }
            }
        });
    }

    /// Reset the conversation to a fresh session.
    pub fn reset_chat(&mut self) {
        if self.chat.streaming {
            return;
        }
        self.chat.session = ChatSession::new();
        self.chat.session.push_model(CHAT_GREETING);
        self.chat.error = None;
        self.chat.scroll = 0;
    }

    /// Play/stop toggle for the voice panel; stop is the speech engine's
    /// cancel primitive.
    pub fn toggle_voice_playback(&mut self) {
        if self.speech.is_speaking() {
            self.speech.cancel();
            self.voice.speaking = false;
            return;
        }

        if self.voice.text.is_blank() {
            self.voice.error = Some("Please enter some text to generate audio.".to_string());
            return;
        }
        self.voice.error = None;

        let voice_name = self
            .voice
            .voice_state
            .selected()
            .and_then(|i| self.voice.voices.result().and_then(|voices| voices.get(i)))
            .map(|voice| voice.name.clone());

        match self.speech.speak(&self.voice.text.value, voice_name.as_deref()) {
            Ok(()) => self.voice.speaking = true,
            Err(err) => self.voice.error = Some(err.to_string()),
        }
    }

    pub fn voice_nav_down(&mut self) {
        let len = self.voice.voices.result().map(Vec::len).unwrap_or(0);
        if len > 0 {
            let i = self.voice.voice_state.selected().unwrap_or(0);
            self.voice.voice_state.select(Some((i + 1).min(len - 1)));
        }
    }

    pub fn voice_nav_up(&mut self) {
        let i = self.voice.voice_state.selected().unwrap_or(0);
        self.voice.voice_state.select(Some(i.saturating_sub(1)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ToolError;
    use crate::request::Prompt;
    use crate::schema::Schema;
    use async_trait::async_trait;
    use crate::gemini::ChatTurn;

    /// Backend stub for state-machine tests; submissions that pass
    /// validation fail fast instead of reaching a network.
    struct NoopBackend;

    #[async_trait]
    impl GenerativeBackend for NoopBackend {
        async fn generate(&self, _prompt: &Prompt) -> Result<String, ToolError> {
            Err(ToolError::backend("noop"))
        }

        async fn generate_structured(
            &self,
            _prompt: &Prompt,
            _schema: &Schema,
        ) -> Result<String, ToolError> {
            Err(ToolError::backend("noop"))
        }

        async fn stream_chat(
            &self,
            _system: &str,
            _history: Vec<ChatTurn>,
        ) -> Result<ChatStream, ToolError> {
            Err(ToolError::backend("noop"))
        }

        async fn generate_images(
            &self,
            _prompt: &str,
            _count: u8,
            _aspect_ratio: &str,
        ) -> Result<Vec<GeneratedImage>, ToolError> {
            Err(ToolError::backend("noop"))
        }
    }

    fn test_app() -> App {
        App::new(Arc::new(NoopBackend))
    }

    #[test]
    fn test_text_field_edits_multibyte_safely() {
        let mut field = TextField::default();
        for c in "héllo".chars() {
            field.insert(c);
        }
        assert_eq!(field.value, "héllo");
        assert_eq!(field.cursor, 5);

        field.left();
        field.left();
        field.left();
        field.left();
        field.insert('x');
        assert_eq!(field.value, "hxéllo");

        field.backspace();
        assert_eq!(field.value, "héllo");

        field.right();
        field.delete();
        assert_eq!(field.value, "hllo");
    }

    #[test]
    fn test_text_field_take_resets_cursor() {
        let mut field = TextField::default();
        field.insert('a');
        field.insert('b');
        assert_eq!(field.take(), "ab");
        assert!(field.value.is_empty());
        assert_eq!(field.cursor, 0);
    }

    #[tokio::test]
    async fn test_empty_submit_sets_validation_error_immediately() {
        let mut app = test_app();
        app.submit_recipe();
        assert!(!app.recipe.task.is_loading());
        assert_eq!(app.recipe.task.error(), Some("Please enter some ingredients."));

        app.submit_image();
        assert_eq!(
            app.image.task.error(),
            Some("Please enter a prompt to generate an image.")
        );
    }

    #[tokio::test]
    async fn test_empty_chat_submit_pushes_no_turns() {
        let mut app = test_app();
        let turns_before = app.chat.session.turns.len();
        app.submit_chat();
        assert_eq!(app.chat.session.turns.len(), turns_before);
        assert_eq!(app.chat.error.as_deref(), Some("Please enter a message."));
        assert!(!app.chat.streaming);
    }

    #[tokio::test]
    async fn test_chat_submit_appends_user_and_empty_model_turn() {
        let mut app = test_app();
        for c in "hi".chars() {
            app.chat.input.insert(c);
        }
        app.submit_chat();

        let turns = &app.chat.session.turns;
        assert_eq!(turns[turns.len() - 2].text, "hi");
        assert_eq!(turns[turns.len() - 1].text, "");
        assert!(app.chat.streaming);
        assert!(app.chat.input.value.is_empty());
    }

    #[tokio::test]
    async fn test_chat_error_fragment_fills_empty_turn_and_ends_stream() {
        let mut app = test_app();
        for c in "hi".chars() {
            app.chat.input.insert(c);
        }
        app.submit_chat();

        // The noop backend rejects the stream; the forwarding task delivers
        // the error as the only item.
        for _ in 0..200 {
            app.poll_tasks().await;
            if !app.chat.streaming {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
        }

        assert!(!app.chat.streaming);
        assert!(app.chat.stream.is_none());
        assert!(app.chat.error.as_deref().unwrap().starts_with("Sorry, something went wrong."));
        assert_eq!(
            app.chat.session.turns.last().unwrap().text,
            "Sorry, I encountered an error. Please try again."
        );
    }

    #[tokio::test]
    async fn test_reset_chat_restores_greeting() {
        let mut app = test_app();
        app.chat.session.push_user("hello");
        app.reset_chat();
        assert_eq!(app.chat.session.turns.len(), 1);
        assert_eq!(app.chat.session.turns[0].text, CHAT_GREETING);
    }

    #[test]
    fn test_sidebar_selection_activates_tool() {
        let mut app = test_app();
        app.sidebar_nav_down();
        app.sidebar_nav_down();
        app.sidebar_nav_down();
        app.select_tool();
        assert_eq!(app.active_tool, Tool::Chat);
        assert_eq!(app.focus, Focus::Panel);
    }

    #[test]
    fn test_sidebar_navigation_clamps() {
        let mut app = test_app();
        for _ in 0..Tool::ALL.len() + 3 {
            app.sidebar_nav_down();
        }
        assert_eq!(app.sidebar_state.selected(), Some(Tool::ALL.len() - 1));
        for _ in 0..Tool::ALL.len() + 3 {
            app.sidebar_nav_up();
        }
        assert_eq!(app.sidebar_state.selected(), Some(0));
    }

    #[tokio::test]
    async fn test_voice_empty_text_sets_inline_error() {
        let mut app = test_app();
        app.toggle_voice_playback();
        assert_eq!(
            app.voice.error.as_deref(),
            Some("Please enter some text to generate audio.")
        );
        assert!(!app.voice.speaking);
    }
}
