use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

use crate::require_env;

const TRANSCRIPTION_URL: &str = "https://api.groq.com/openai/v1/audio/transcriptions";
const DEFAULT_MODEL: &str = "whisper-large-v3";

const SUPPORTED_FORMATS: &[&str] = &["mp3", "wav", "m4a", "ogg", "flac", "webm"];

/// Speech-to-text via Groq-hosted Whisper. Exposes both call shapes:
/// `process` is a thin alias kept for callers of the older interface.
pub struct GroqSpeechAdapter {
    client: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct SpeechInput {
    #[serde(alias = "file_path")]
    audio_path: String,
    #[serde(default = "default_language")]
    language: String,
    #[serde(default = "default_model")]
    model: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    temperature: f64,
}

fn default_language() -> String {
    "es".into()
}

fn default_model() -> String {
    DEFAULT_MODEL.into()
}

impl GroqSpeechAdapter {
    pub fn from_env() -> Result<Self, AdapterError> {
        let api_key = require_env("GROQ_API_KEY")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn check_format(path: &Path) -> Result<(), AdapterError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        if SUPPORTED_FORMATS.contains(&extension.as_str()) {
            Ok(())
        } else {
            Err(AdapterError::InvalidParams(format!(
                "unsupported audio format '{}' (supported: {})",
                extension,
                SUPPORTED_FORMATS.join(", ")
            )))
        }
    }

    async fn transcribe(&self, input: SpeechInput) -> Result<ProviderResult, AdapterError> {
        let path = Path::new(&input.audio_path);
        if !path.exists() {
            return Err(AdapterError::InvalidParams(format!(
                "audio file does not exist: {}",
                input.audio_path
            )));
        }
        Self::check_format(path)?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio")
            .to_string();
        let bytes = tokio::fs::read(path).await?;

        info!(
            "Transcribing {} ({} bytes, language {})",
            file_name,
            bytes.len(),
            input.language
        );

        let mut form = multipart::Form::new()
            .part(
                "file",
                multipart::Part::bytes(bytes).file_name(file_name.clone()),
            )
            .text("model", input.model.clone())
            .text("language", input.language.clone())
            .text("temperature", input.temperature.to_string())
            .text("response_format", "verbose_json");
        if let Some(prompt) = &input.prompt {
            form = form.text("prompt", prompt.clone());
        }

        let response = self
            .client
            .post(TRANSCRIPTION_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api(format!("{}: {}", status, text)));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;
        let transcription = body["text"].as_str().unwrap_or_default().to_string();

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Transcribed {} ({}): {}",
                    file_name, input.language, transcription
                ),
            }],
            "transcription_data": {
                "text": transcription,
                "language": body["language"].as_str().unwrap_or(&input.language),
                "duration": body["duration"],
                "model": input.model,
            }
        })))
    }
}

#[async_trait]
impl Capability for GroqSpeechAdapter {
    fn description(&self) -> Option<String> {
        Some("Groq speech-to-text (Whisper large v3)".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::EITHER
    }

    async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: SpeechInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        self.transcribe(input).await
    }

    async fn process(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        self.execute(params).await
    }
}
