use serde::Serialize;
use std::collections::BTreeMap;

/// Declarative description of the JSON shape a structured generation call
/// must return. Serializes to the Gemini `responseSchema` wire format, which
/// tags types in SCREAMING_SNAKE_CASE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SchemaType {
    String,
    Number,
    Object,
    Array,
}

#[derive(Debug, Clone, Serialize)]
pub struct Schema {
    #[serde(rename = "type")]
    kind: SchemaType,
    #[serde(skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    properties: BTreeMap<String, Schema>,
    #[serde(skip_serializing_if = "Option::is_none")]
    items: Option<Box<Schema>>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    required: Vec<String>,
}

impl Schema {
    fn new(kind: SchemaType) -> Self {
        Self {
            kind,
            description: None,
            properties: BTreeMap::new(),
            items: None,
            required: Vec::new(),
        }
    }

    pub fn string() -> Self {
        Self::new(SchemaType::String)
    }

    pub fn number() -> Self {
        Self::new(SchemaType::Number)
    }

    pub fn object(properties: Vec<(&str, Schema)>, required: &[&str]) -> Self {
        let mut schema = Self::new(SchemaType::Object);
        schema.properties = properties
            .into_iter()
            .map(|(name, prop)| (name.to_string(), prop))
            .collect();
        schema.required = required.iter().map(|name| name.to_string()).collect();
        schema
    }

    pub fn array(items: Schema) -> Self {
        let mut schema = Self::new(SchemaType::Array);
        schema.items = Some(Box::new(items));
        schema
    }

    pub fn describe(mut self, text: &str) -> Self {
        self.description = Some(text.to_string());
        self
    }
}

/// `{ html, css, js }`, all required.
pub fn website() -> Schema {
    Schema::object(
        vec![
            ("html", Schema::string()),
            ("css", Schema::string()),
            ("js", Schema::string()),
        ],
        &["html", "css", "js"],
    )
}

/// `{ components: [{ type, properties, children? }] }`. The children items
/// are declared as plain objects rather than recursively; the backend nests
/// them on its own and the decoder handles the recursion.
pub fn mobile_ui() -> Schema {
    let component = Schema::object(
        vec![
            (
                "type",
                Schema::string().describe("e.g., container, header, text, image, button, input"),
            ),
            (
                "properties",
                Schema::object(vec![], &[])
                    .describe("e.g., { title: '...' } or { content: '...' }"),
            ),
            ("children", Schema::array(Schema::object(vec![], &[]))),
        ],
        &["type", "properties"],
    );

    Schema::object(
        vec![("components", Schema::array(component))],
        &["components"],
    )
}

/// Chart.js-compatible `{ type, data: { labels, datasets }, options? }`.
pub fn chart() -> Schema {
    let dataset = Schema::object(
        vec![
            ("label", Schema::string()),
            ("data", Schema::array(Schema::number())),
            ("backgroundColor", Schema::array(Schema::string())),
            ("borderColor", Schema::array(Schema::string())),
            ("borderWidth", Schema::number()),
        ],
        &["label", "data"],
    );

    let data = Schema::object(
        vec![
            ("labels", Schema::array(Schema::string())),
            ("datasets", Schema::array(dataset)),
        ],
        &["labels", "datasets"],
    );

    Schema::object(
        vec![
            (
                "type",
                Schema::string().describe("The type of chart, e.g., 'bar', 'line', 'pie'."),
            ),
            ("data", data),
            (
                "options",
                Schema::object(vec![], &[]).describe("Optional Chart.js options object."),
            ),
        ],
        &["type", "data"],
    )
}

/// `{ classification, confidence, reasoning }`, all required.
pub fn content_analysis() -> Schema {
    Schema::object(
        vec![
            ("classification", Schema::string()),
            ("confidence", Schema::number()),
            ("reasoning", Schema::string()),
        ],
        &["classification", "confidence", "reasoning"],
    )
}

/// `{ language, confidence }`, both required.
pub fn language_detection() -> Schema {
    Schema::object(
        vec![
            ("language", Schema::string()),
            ("confidence", Schema::number()),
        ],
        &["language", "confidence"],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_website_schema_wire_shape() {
        let value = serde_json::to_value(website()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "OBJECT",
                "properties": {
                    "css": { "type": "STRING" },
                    "html": { "type": "STRING" },
                    "js": { "type": "STRING" },
                },
                "required": ["html", "css", "js"],
            })
        );
    }

    #[test]
    fn test_language_detection_schema_wire_shape() {
        let value = serde_json::to_value(language_detection()).unwrap();
        assert_eq!(
            value,
            json!({
                "type": "OBJECT",
                "properties": {
                    "confidence": { "type": "NUMBER" },
                    "language": { "type": "STRING" },
                },
                "required": ["language", "confidence"],
            })
        );
    }

    #[test]
    fn test_chart_schema_requires_label_and_data_per_dataset() {
        let value = serde_json::to_value(chart()).unwrap();
        let dataset_required = value
            .pointer("/properties/data/properties/datasets/items/required")
            .unwrap();
        assert_eq!(*dataset_required, json!(["label", "data"]));
        assert_eq!(value["required"], json!(["type", "data"]));
    }

    #[test]
    fn test_mobile_ui_children_are_plain_objects() {
        let value = serde_json::to_value(mobile_ui()).unwrap();
        let children = value
            .pointer("/properties/components/items/properties/children/items")
            .unwrap();
        assert_eq!(children["type"], "OBJECT");
        assert!(children.get("properties").is_none());
    }

    #[test]
    fn test_empty_object_omits_empty_fields() {
        let value = serde_json::to_value(Schema::object(vec![], &[])).unwrap();
        assert_eq!(value, json!({ "type": "OBJECT" }));
    }
}
