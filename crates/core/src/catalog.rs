//! Tool catalog: per-adapter parameter schemas and the derived descriptors.
//!
//! Schemas are a declarative table keyed by adapter name, not introspected
//! from the adapters themselves. Any loaded adapter without a dedicated
//! entry gets the empty permissive schema so every published tool carries
//! a contract.

use std::collections::HashMap;

use serde_json::{json, Map, Value};

use crate::error::CatalogError;
use crate::registry::AdapterRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Integer,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Integer => "integer",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

/// One parameter in a tool schema.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub name: &'static str,
    pub field_type: FieldType,
    pub description: &'static str,
    pub enum_values: Option<&'static [&'static str]>,
    pub default: Option<Value>,
    pub minimum: Option<f64>,
    pub maximum: Option<f64>,
    /// Nested property schemas for `Object` fields.
    pub properties: Option<Vec<FieldSpec>>,
}

impl FieldSpec {
    pub fn new(name: &'static str, field_type: FieldType, description: &'static str) -> Self {
        Self {
            name,
            field_type,
            description,
            enum_values: None,
            default: None,
            minimum: None,
            maximum: None,
            properties: None,
        }
    }

    pub fn with_enum(mut self, values: &'static [&'static str]) -> Self {
        self.enum_values = Some(values);
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_range(mut self, minimum: f64, maximum: f64) -> Self {
        self.minimum = Some(minimum);
        self.maximum = Some(maximum);
        self
    }

    pub fn with_properties(mut self, properties: Vec<FieldSpec>) -> Self {
        self.properties = Some(properties);
        self
    }

    fn to_value(&self) -> Value {
        let mut spec = Map::new();
        spec.insert("type".into(), json!(self.field_type.as_str()));
        if let Some(values) = self.enum_values {
            spec.insert("enum".into(), json!(values));
        }
        if let Some(default) = &self.default {
            spec.insert("default".into(), default.clone());
        }
        if let Some(minimum) = self.minimum {
            spec.insert("minimum".into(), json!(minimum));
        }
        if let Some(maximum) = self.maximum {
            spec.insert("maximum".into(), json!(maximum));
        }
        spec.insert("description".into(), json!(self.description));
        if let Some(properties) = &self.properties {
            let nested: Map<String, Value> = properties
                .iter()
                .map(|p| (p.name.to_string(), p.to_value()))
                .collect();
            spec.insert("properties".into(), Value::Object(nested));
        }
        Value::Object(spec)
    }
}

/// Declared input contract for one tool: ordered fields plus the required
/// field names. `required` must reference declared fields; `validate`
/// enforces that once at startup.
#[derive(Debug, Clone)]
pub struct ToolSchema {
    pub fields: Vec<FieldSpec>,
    pub required: &'static [&'static str],
}

impl ToolSchema {
    pub fn new(fields: Vec<FieldSpec>, required: &'static [&'static str]) -> Self {
        Self { fields, required }
    }

    /// The permissive fallback: no fields, nothing required.
    pub fn empty() -> Self {
        Self {
            fields: Vec::new(),
            required: &[],
        }
    }

    /// JSON-schema object form, as published to callers.
    pub fn to_value(&self) -> Value {
        let properties: Map<String, Value> = self
            .fields
            .iter()
            .map(|f| (f.name.to_string(), f.to_value()))
            .collect();
        json!({
            "type": "object",
            "properties": properties,
            "required": self.required,
        })
    }
}

/// The compiled-in schema table.
pub struct SchemaTable {
    entries: HashMap<&'static str, ToolSchema>,
}

impl SchemaTable {
    pub fn new(entries: HashMap<&'static str, ToolSchema>) -> Self {
        Self { entries }
    }

    /// Schemas for the built-in adapter catalog.
    pub fn builtin() -> Self {
        let mut entries = HashMap::new();
        entries.insert("gmail", gmail_schema());
        entries.insert("image", image_schema());
        entries.insert("file_manager", file_manager_schema());
        entries.insert("vision", vision_schema());
        entries.insert("openai_tts", openai_tts_schema());
        entries.insert("groq_speech", groq_speech_schema());
        Self { entries }
    }

    /// Startup check: every required field name must be declared.
    pub fn validate(&self) -> Result<(), CatalogError> {
        for (tool, schema) in &self.entries {
            for field in schema.required {
                if !schema.fields.iter().any(|f| f.name == *field) {
                    return Err(CatalogError::UnknownRequiredField {
                        tool: tool.to_string(),
                        field: field.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&ToolSchema> {
        self.entries.get(name)
    }

    /// The published schema for a tool: its dedicated entry, or the empty
    /// permissive schema for names without one.
    pub fn schema_for(&self, name: &str) -> Value {
        self.entries
            .get(name)
            .map(ToolSchema::to_value)
            .unwrap_or_else(|| ToolSchema::empty().to_value())
    }
}

/// Published name/description/schema triple for one adapter.
#[derive(Debug, Clone)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

/// Derive descriptors for every loaded adapter, in registry (declaration)
/// order. Pure read; safe to call repeatedly and concurrently.
pub fn describe(registry: &AdapterRegistry, table: &SchemaTable) -> Vec<ToolDescriptor> {
    registry
        .iter()
        .map(|provider| ToolDescriptor {
            name: provider.name.clone(),
            description: provider.description.clone(),
            input_schema: table.schema_for(&provider.name),
        })
        .collect()
}

fn gmail_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("to", FieldType::String, "Recipient email"),
            FieldSpec::new("subject", FieldType::String, "Email subject"),
            FieldSpec::new("body", FieldType::String, "Email body"),
            FieldSpec::new(
                "send_latest_image",
                FieldType::Boolean,
                "Attach the latest generated image",
            ),
            FieldSpec::new(
                "attachment_data",
                FieldType::Object,
                "Attachment data from file_manager",
            ),
        ],
        &["to", "subject", "body"],
    )
}

fn image_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("prompt", FieldType::String, "Image description"),
            FieldSpec::new("style", FieldType::String, "Image style"),
        ],
        &["prompt"],
    )
}

fn file_manager_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("action", FieldType::String, "Action to perform").with_enum(&[
                "list_files",
                "get_file_info",
                "read_file",
                "get_latest_image",
                "copy_file",
                "prepare_for_email",
                "delete_file",
            ]),
            FieldSpec::new("directory", FieldType::String, "Target directory").with_enum(&[
                "generated_images",
                "downloads",
                "temp",
                "uploads",
            ]),
            FieldSpec::new("filename", FieldType::String, "File name"),
            FieldSpec::new("pattern", FieldType::String, "Substring filter for file names"),
            FieldSpec::new("limit", FieldType::Integer, "Maximum number of results")
                .with_default(json!(10)),
        ],
        &["action"],
    )
}

fn vision_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("action", FieldType::String, "Type of visual analysis to run")
                .with_enum(&["analyze_image", "describe_image", "ocr_text"]),
            FieldSpec::new("image_path", FieldType::String, "Full path of the image to analyze"),
            FieldSpec::new(
                "user_question",
                FieldType::String,
                "Specific question about the image",
            ),
            FieldSpec::new("detail_level", FieldType::String, "Analysis detail level")
                .with_enum(&["low", "high", "auto"])
                .with_default(json!("high")),
        ],
        &["action", "image_path"],
    )
}

fn openai_tts_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("action", FieldType::String, "Action to perform")
                .with_enum(&["text_to_speech", "get_voices"]),
            FieldSpec::new("text", FieldType::String, "Text to synthesize"),
            FieldSpec::new("voice", FieldType::String, "OpenAI voice to use")
                .with_enum(&[
                    "alloy", "ash", "ballad", "coral", "echo", "fable", "nova", "onyx", "sage",
                    "shimmer",
                ])
                .with_default(json!("coral")),
            FieldSpec::new("model", FieldType::String, "OpenAI TTS model")
                .with_enum(&["gpt-4o-mini-tts"])
                .with_default(json!("gpt-4o-mini-tts")),
            FieldSpec::new("speed", FieldType::Number, "Playback speed")
                .with_range(0.25, 4.0)
                .with_default(json!(1.0)),
            FieldSpec::new("preset_accent", FieldType::String, "Preconfigured accent")
                .with_enum(&[
                    "colombiano", "mexicano", "argentino", "español", "neutral", "custom",
                ])
                .with_default(json!("neutral")),
            FieldSpec::new(
                "instructions",
                FieldType::String,
                "Specific speech instructions (accent, tone, emotion)",
            ),
            FieldSpec::new("return_audio", FieldType::Boolean, "Return audio as base64")
                .with_default(json!(false)),
        ],
        &["action", "text"],
    )
}

fn groq_speech_schema() -> ToolSchema {
    ToolSchema::new(
        vec![
            FieldSpec::new("action", FieldType::String, "Action to perform")
                .with_enum(&["speech_to_text", "transcribe_file"]),
            FieldSpec::new(
                "audio_path",
                FieldType::String,
                "Path of the audio file to transcribe",
            ),
            FieldSpec::new("language", FieldType::String, "Language code (es, en, ...)")
                .with_default(json!("es")),
            FieldSpec::new("model", FieldType::String, "Groq Whisper model")
                .with_default(json!("whisper-large-v3")),
            FieldSpec::new(
                "prompt",
                FieldType::String,
                "Optional prompt to guide the transcription",
            ),
            FieldSpec::new("temperature", FieldType::Number, "Transcription temperature")
                .with_default(json!(0)),
        ],
        &["action"],
    )
}
