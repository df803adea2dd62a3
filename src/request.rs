use crate::error::ToolError;
use crate::schema::{self, Schema};

/// Instruction pair sent to the backend: an optional system instruction and
/// the user-facing content. Built from fixed templates; no user field is
/// silently omitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: Option<String>,
    pub user: String,
}

impl Prompt {
    pub fn user(user: impl Into<String>) -> Self {
        Self {
            system: None,
            user: user.into(),
        }
    }

    pub fn with_system(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self {
            system: Some(system.into()),
            user: user.into(),
        }
    }
}

/// One user submission, tagged by operation kind. Constructed fresh per
/// submission and immutable afterwards.
#[derive(Debug, Clone)]
pub enum ToolRequest {
    Image {
        prompt: String,
        count: u8,
        aspect_ratio: String,
    },
    ExplainCode {
        code: String,
        language: String,
    },
    Recipe {
        ingredients: String,
        diet: Option<String>,
    },
    Website {
        prompt: String,
    },
    MobileUi {
        prompt: String,
    },
    Chart {
        prompt: String,
    },
    Analyze {
        text: String,
    },
    Humanize {
        text: String,
    },
    DetectLanguage {
        code: String,
    },
    ChatTurn {
        message: String,
    },
}

pub const CHAT_SYSTEM_INSTRUCTION: &str = "You are a helpful and friendly AI assistant named Gemini. Keep your responses concise and informative, and use Markdown for formatting when appropriate.";

pub const CHAT_GREETING: &str = "Hello! I'm Gemini. How can I help you today?";

impl ToolRequest {
    /// The primary field must be non-empty (after trimming) before any
    /// request is built; emptiness surfaces a local validation error and no
    /// network call is made.
    pub fn validate(&self) -> Result<(), ToolError> {
        let (primary, message) = match self {
            ToolRequest::Image { prompt, .. } => (prompt, "Please enter a prompt to generate an image."),
            ToolRequest::ExplainCode { code, .. } => (code, "Please enter some code to explain."),
            ToolRequest::Recipe { ingredients, .. } => (ingredients, "Please enter some ingredients."),
            ToolRequest::Website { prompt } => (prompt, "Please describe the website you want to build."),
            ToolRequest::MobileUi { prompt } => (prompt, "Please describe the mobile app screen you want to build."),
            ToolRequest::Chart { prompt } => (prompt, "Please enter a description for the data visualization."),
            ToolRequest::Analyze { text } => (text, "Please enter some text to analyze."),
            ToolRequest::Humanize { text } => (text, "Please enter some text to humanize."),
            ToolRequest::DetectLanguage { code } => (code, "Please enter some code to detect its language."),
            ToolRequest::ChatTurn { message } => (message, "Please enter a message."),
        };

        if primary.trim().is_empty() {
            Err(ToolError::validation(message))
        } else {
            Ok(())
        }
    }

    /// Fixed instruction templates embedding the request's fields.
    pub fn prompt(&self) -> Prompt {
        match self {
            ToolRequest::Image { prompt, .. } => Prompt::user(prompt.clone()),

            ToolRequest::ExplainCode { code, language } => Prompt::user(format!(
                "You are an expert programmer and code reviewer.\n\
                 Your task is to provide a clear and concise explanation of the following code snippet written in {language}.\n\
                 \n\
                 Explain:\n\
                 - What the code does.\n\
                 - How it works, step-by-step.\n\
                 - Any potential improvements or best practices related to the code.\n\
                 \n\
                 Format your response in Markdown for readability, using code blocks for snippets.\n\
                 \n\
                 Code Snippet ({language}):\n\
                 ---\n\
                 {code}\n\
                 ---\n\
                 \n\
                 Explanation:"
            )),

            ToolRequest::Recipe { ingredients, diet } => {
                let diet_requirement = match diet {
                    Some(diet) if !diet.trim().is_empty() => format!(
                        "The recipe should adhere to the following dietary restrictions: {diet}."
                    ),
                    _ => "There are no specific dietary restrictions.".to_string(),
                };
                Prompt::user(format!(
                    "You are an expert chef. Create a delicious recipe based on the ingredients provided.\n\
                     \n\
                     Your response should be formatted in Markdown and include:\n\
                     - A creative recipe title.\n\
                     - A brief, enticing description of the dish.\n\
                     - A list of ingredients (including the ones provided and any others needed).\n\
                     - Step-by-step instructions for preparation and cooking.\n\
                     - Estimated prep time, cook time, and total time.\n\
                     - Number of servings.\n\
                     \n\
                     Ingredients provided:\n\
                     {ingredients}\n\
                     \n\
                     Dietary restrictions:\n\
                     {diet_requirement}\n\
                     \n\
                     Please generate the recipe now."
                ))
            }

            ToolRequest::Website { prompt } => Prompt::with_system(
                "You are an expert web developer. Your task is to generate a complete, single-page website based on the user's prompt.\n\
                 - You must return a single JSON object with three keys: \"html\", \"css\", and \"js\".\n\
                 - The \"html\" key should contain the body content of the page. Do NOT include <html>, <head>, or <body> tags.\n\
                 - The \"css\" key should contain all the necessary styles to make the page look modern, professional, and responsive.\n\
                 - The \"js\" key should contain any necessary JavaScript for interactivity. If no JS is needed, return an empty string.\n\
                 - Use placeholder images from a service like picsum.photos if images are requested.\n\
                 - Ensure the final result is visually appealing and adheres to modern design principles.",
                prompt.clone(),
            ),

            ToolRequest::MobileUi { prompt } => Prompt::with_system(
                "You are an expert mobile UI designer. Your task is to generate a UI layout for a mobile app screen based on the user's prompt.\n\
                 - You must return a single JSON object with a \"components\" key.\n\
                 - The \"components\" key should contain an array of component objects.\n\
                 - Each component object must have a \"type\" and a \"properties\" object.\n\
                 - A component can optionally have a \"children\" array for nested components. This is primarily for the 'container' type.\n\
                 - Supported component types are: 'container', 'header', 'text', 'image', 'button', 'input'.\n\
                 - For each type, use the appropriate properties:\n\
                 - 'header': { \"title\": \"Your Header Text\" }\n\
                 - 'text': { \"content\": \"Your paragraph text.\" }\n\
                 - 'image': { \"src\": \"https://picsum.photos/seed/picsum/400/200\", \"alt\": \"A descriptive alt text\" }\n\
                 - 'button': { \"label\": \"Click Me\" }\n\
                 - 'input': { \"placeholder\": \"Enter text here...\" }\n\
                 - 'container' type is used for grouping other components. Its 'properties' object can be empty. Its children will be rendered in a column.\n\
                 - Structure the components logically to represent the requested app screen. Make it look like a real app screen.",
                prompt.clone(),
            ),

            ToolRequest::Chart { prompt } => Prompt::with_system(
                "You are an expert data visualization AI. Your task is to transform a user's natural language prompt into a structured JSON object compatible with Chart.js.\n\
                 - You must return a single JSON object.\n\
                 - The root object must have a \"type\" property (e.g., 'bar', 'line', 'pie') and a \"data\" property.\n\
                 - The \"data\" property must contain \"labels\" (an array of strings) and \"datasets\" (an array of objects).\n\
                 - Each object in \"datasets\" must have a \"label\" (string) and \"data\" (an array of numbers corresponding to the labels).\n\
                 - You can optionally include Chart.js-compatible styling properties like \"backgroundColor\" or \"borderColor\" in the dataset objects to make the chart visually appealing. Use arrays of hex color codes for these if you do.\n\
                 - Do not invent data if the prompt doesn't provide it. If data is implicit (e.g., \"top 5 programming languages\"), use your knowledge to provide it.\n\
                 - Ensure the length of the 'data' array in each dataset matches the length of the 'labels' array.",
                prompt.clone(),
            ),

            ToolRequest::Analyze { text } => Prompt::with_system(
                "You are an expert content analyst. Your task is to analyze the provided text and determine if it was written by an AI or a human.\n\
                 - Return a single JSON object.\n\
                 - The object must have three keys: \"classification\", \"confidence\", and \"reasoning\".\n\
                 - \"classification\" must be one of three strings: 'Likely AI-generated', 'Likely Human-written', or 'Uncertain'.\n\
                 - \"confidence\" must be a number between 0 and 1, representing your confidence in the classification. 1 means 100% certain.\n\
                 - \"reasoning\" must be a string briefly explaining the factors that led to your conclusion (e.g., sentence structure, vocabulary, tone, presence of personal anecdotes).",
                format!("Please analyze the following text:\n\n---\n\n{text}"),
            ),

            ToolRequest::Humanize { text } => Prompt::user(format!(
                "You are an expert copywriter specializing in making text sound more human and natural.\n\
                 Rewrite the following text to make it less robotic and more engaging.\n\
                 - Vary sentence length and structure.\n\
                 - Use more natural language and conversational tone.\n\
                 - Inject a bit of personality where appropriate.\n\
                 - Do not add new information, just rephrase the existing content.\n\
                 - Return only the rewritten text.\n\
                 \n\
                 Original Text:\n\
                 ---\n\
                 {text}\n\
                 ---\n\
                 \n\
                 Humanized Version:"
            )),

            ToolRequest::DetectLanguage { code } => Prompt::with_system(
                "You are an expert programmer with deep knowledge of hundreds of programming languages. Your task is to analyze a code snippet and identify the programming language it is written in.\n\
                 - Return a single JSON object.\n\
                 - The object must have two keys: \"language\" and \"confidence\".\n\
                 - \"language\" must be the name of the detected programming language (e.g., \"JavaScript\", \"Python\", \"Unknown\").\n\
                 - \"confidence\" must be a number between 0 and 1, representing your confidence in the detection. 1 means 100% certain.\n\
                 - If you cannot determine the language, return \"Unknown\" with a low confidence score.",
                format!("Please analyze the following code snippet and identify its programming language:\n\n---\n\n{code}"),
            ),

            ToolRequest::ChatTurn { message } => {
                Prompt::with_system(CHAT_SYSTEM_INSTRUCTION, message.clone())
            }
        }
    }

    /// The declared response schema, for tools whose result is structured.
    pub fn schema(&self) -> Option<Schema> {
        match self {
            ToolRequest::Website { .. } => Some(schema::website()),
            ToolRequest::MobileUi { .. } => Some(schema::mobile_ui()),
            ToolRequest::Chart { .. } => Some(schema::chart()),
            ToolRequest::Analyze { .. } => Some(schema::content_analysis()),
            ToolRequest::DetectLanguage { .. } => Some(schema::language_detection()),
            _ => None,
        }
    }

    /// Generic user-facing message shown when the backend or decoder fails.
    pub fn failure_message(&self) -> &'static str {
        match self {
            ToolRequest::Image { .. } => "An error occurred while generating the image. The prompt may have been rejected. Please try again with a different prompt.",
            ToolRequest::ExplainCode { .. } => "Sorry, I couldn't explain the code. The AI may have been unable to process the request. Please try again.",
            ToolRequest::Recipe { .. } => "Sorry, I couldn't create a recipe at the moment. Please try again later.",
            ToolRequest::Website { .. } => "Sorry, I couldn't generate the website. The prompt may have been rejected or an unexpected error occurred. Please try again.",
            ToolRequest::MobileUi { .. } => "Sorry, I couldn't generate the mobile UI. The prompt may have been rejected or an unexpected error occurred. Please try again.",
            ToolRequest::Chart { .. } => "Sorry, I couldn't generate the chart. The prompt may have been unclear or an unexpected error occurred. Please try again.",
            ToolRequest::Analyze { .. } => "Sorry, I couldn't analyze the content. The AI may have been unable to process the request. Please try again.",
            ToolRequest::Humanize { .. } => "Sorry, I couldn't rewrite the text at the moment. Please try again later.",
            ToolRequest::DetectLanguage { .. } => "Sorry, I couldn't identify the language. The AI may have been unable to process the request. Please try again.",
            ToolRequest::ChatTurn { .. } => "Sorry, I encountered an error. Please try again.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_primary_field_is_rejected() {
        let requests = [
            ToolRequest::Image {
                prompt: String::new(),
                count: 1,
                aspect_ratio: "1:1".to_string(),
            },
            ToolRequest::ExplainCode {
                code: "   ".to_string(),
                language: "python".to_string(),
            },
            ToolRequest::Recipe {
                ingredients: "\n".to_string(),
                diet: None,
            },
            ToolRequest::Chart {
                prompt: String::new(),
            },
            ToolRequest::ChatTurn {
                message: "  ".to_string(),
            },
        ];
        for request in requests {
            let err = request.validate().unwrap_err();
            assert!(err.is_validation(), "expected validation error for {request:?}");
        }
    }

    #[test]
    fn test_validation_message_matches_tool() {
        let err = ToolRequest::Recipe {
            ingredients: String::new(),
            diet: None,
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "Please enter some ingredients.");
    }

    #[test]
    fn test_recipe_prompt_embeds_ingredients_and_diet() {
        let prompt = ToolRequest::Recipe {
            ingredients: "chicken breast, broccoli, rice".to_string(),
            diet: Some("vegetarian".to_string()),
        }
        .prompt();
        assert!(prompt.system.is_none());
        assert!(prompt.user.contains("chicken breast, broccoli, rice"));
        assert!(prompt
            .user
            .contains("The recipe should adhere to the following dietary restrictions: vegetarian."));
    }

    #[test]
    fn test_missing_diet_substitutes_no_constraint_clause() {
        for diet in [None, Some("   ".to_string())] {
            let prompt = ToolRequest::Recipe {
                ingredients: "rice".to_string(),
                diet,
            }
            .prompt();
            assert!(prompt.user.contains("There are no specific dietary restrictions."));
        }
    }

    #[test]
    fn test_explain_code_embeds_language_and_code() {
        let prompt = ToolRequest::ExplainCode {
            code: "fn main() {}".to_string(),
            language: "rust".to_string(),
        }
        .prompt();
        assert!(prompt.user.contains("Code Snippet (rust):"));
        assert!(prompt.user.contains("fn main() {}"));
    }

    #[test]
    fn test_structured_tools_declare_schemas() {
        assert!(ToolRequest::Website { prompt: "x".into() }.schema().is_some());
        assert!(ToolRequest::MobileUi { prompt: "x".into() }.schema().is_some());
        assert!(ToolRequest::Chart { prompt: "x".into() }.schema().is_some());
        assert!(ToolRequest::Analyze { text: "x".into() }.schema().is_some());
        assert!(ToolRequest::DetectLanguage { code: "x".into() }.schema().is_some());

        assert!(ToolRequest::Recipe {
            ingredients: "x".into(),
            diet: None
        }
        .schema()
        .is_none());
        assert!(ToolRequest::Humanize { text: "x".into() }.schema().is_none());
        assert!(ToolRequest::ChatTurn { message: "x".into() }.schema().is_none());
    }

    #[test]
    fn test_structured_prompts_carry_system_instruction() {
        let prompt = ToolRequest::DetectLanguage {
            code: "def f(x): return x+1".to_string(),
        }
        .prompt();
        assert!(prompt.system.unwrap().contains("identify the programming language"));
        assert!(prompt.user.contains("def f(x): return x+1"));
    }
}
