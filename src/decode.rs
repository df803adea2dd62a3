use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ToolError;

/// Parse the raw text of a schema-constrained response strictly as JSON.
/// A parse failure or a missing required field is a decode error, distinct
/// from a backend error. Field values are taken as received; ranges are not
/// clamped and label/data lengths are not cross-checked.
pub fn structured<T: DeserializeOwned>(raw: &str) -> Result<T, ToolError> {
    serde_json::from_str(raw.trim())
        .map_err(|err| ToolError::decode(format!("invalid structured response: {err}")))
}

/// `round(confidence * 100)` as a percentage string, e.g. 0.873 -> "87%".
pub fn confidence_percent(confidence: f64) -> String {
    format!("{}%", (confidence * 100.0).round() as i64)
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WebsiteCode {
    pub html: String,
    pub css: String,
    pub js: String,
}

impl WebsiteCode {
    /// The standard HTML wrapper embedding exactly the three fragments, the
    /// script block present even when `js` is empty. This is the document the
    /// preview displays and the copy action exports.
    pub fn full_document(&self) -> String {
        format!(
            "<!DOCTYPE html>\n\
             <html lang=\"en\">\n\
             <head>\n\
             <meta charset=\"UTF-8\">\n\
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             <title>Generated Website</title>\n\
             <style>\n{}\n</style>\n\
             </head>\n\
             <body>\n{}\n\
             <script>\n{}\n</script>\n\
             </body>\n\
             </html>",
            self.css, self.html, self.js
        )
    }
}

/// One node of a generated mobile screen. `kind` is passed through as
/// received; the renderer decides what it can display.
#[derive(Debug, Clone, Deserialize)]
pub struct UiComponent {
    #[serde(rename = "type")]
    pub kind: String,
    pub properties: serde_json::Map<String, Value>,
    #[serde(default)]
    pub children: Vec<UiComponent>,
}

impl UiComponent {
    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MobileUiSpec {
    pub components: Vec<UiComponent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartSpec {
    #[serde(rename = "type")]
    pub kind: String,
    pub data: ChartData,
    #[serde(default)]
    pub options: Option<Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChartData {
    pub labels: Vec<String>,
    pub datasets: Vec<ChartDataset>,
}

/// Styling fields accept whatever the backend sent (a single color string or
/// an array), so they stay as raw values.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartDataset {
    pub label: String,
    pub data: Vec<f64>,
    #[serde(rename = "backgroundColor", default)]
    pub background_color: Option<Value>,
    #[serde(rename = "borderColor", default)]
    pub border_color: Option<Value>,
    #[serde(rename = "borderWidth", default)]
    pub border_width: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ContentAnalysis {
    pub classification: String,
    pub confidence: f64,
    pub reasoning: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LanguageDetection {
    pub language: String,
    pub confidence: f64,
}
