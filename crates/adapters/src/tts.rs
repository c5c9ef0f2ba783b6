use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

use crate::require_env;

const SPEECH_URL: &str = "https://api.openai.com/v1/audio/speech";
const MODEL: &str = "gpt-4o-mini-tts";

const VOICES: &[(&str, &str)] = &[
    ("alloy", "Neutral, balanced voice"),
    ("ash", "Clear, articulate voice"),
    ("ballad", "Melodic, storytelling voice"),
    ("coral", "Warm, friendly voice"),
    ("echo", "Resonant, deep voice"),
    ("fable", "Expressive, narrative voice"),
    ("nova", "Bright, energetic voice"),
    ("onyx", "Authoritative, deep voice"),
    ("sage", "Calm, measured voice"),
    ("shimmer", "Soft, gentle voice"),
];

/// Text-to-speech through the OpenAI audio API, with preset accent
/// instructions for the `gpt-4o-mini-tts` model.
pub struct OpenAiTtsAdapter {
    client: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct TtsInput {
    action: String,
    #[serde(default)]
    text: String,
    #[serde(default = "default_voice")]
    voice: String,
    #[serde(default = "default_speed")]
    speed: f64,
    #[serde(default = "default_accent")]
    preset_accent: String,
    #[serde(default)]
    instructions: String,
    #[serde(default)]
    return_audio: bool,
}

fn default_voice() -> String {
    "coral".into()
}

fn default_speed() -> f64 {
    1.0
}

fn default_accent() -> String {
    "neutral".into()
}

impl OpenAiTtsAdapter {
    pub fn from_env() -> Result<Self, AdapterError> {
        let api_key = require_env("OPENAI_API_KEY")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Speech instructions for a preset accent; `custom` passes the
    /// caller's own instructions through.
    fn instructions_for(preset_accent: &str, custom: &str) -> String {
        match preset_accent {
            "custom" => custom.to_string(),
            "colombiano" => "Habla con acento colombiano amigable y cálido, con entonación \
                 melodiosa característica de Colombia. Usa un tono alegre y pausado."
                .to_string(),
            "mexicano" => "Habla con acento mexicano neutro, con entonación clara y ritmo \
                 pausado típico del español mexicano."
                .to_string(),
            "argentino" => "Habla con acento argentino rioplatense, con entonación \
                 característica y ritmo dinámico del español argentino."
                .to_string(),
            "español" => "Habla con acento español peninsular neutro, con pronunciación \
                 clara y entonación característica de España."
                .to_string(),
            _ => "Speak in a natural and clear tone.".to_string(),
        }
    }

    fn voices() -> ProviderResult {
        let voices: Vec<Value> = VOICES
            .iter()
            .map(|(id, description)| {
                json!({
                    "id": id,
                    "description": description,
                    "provider": "OpenAI",
                    "supports_instructions": true,
                })
            })
            .collect();
        ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("{} OpenAI voices available (default: coral)", VOICES.len()),
            }],
            "voices": voices,
        }))
    }

    async fn synthesize(&self, input: TtsInput) -> Result<ProviderResult, AdapterError> {
        if input.text.trim().is_empty() {
            return Err(AdapterError::InvalidParams(
                "text is required for text_to_speech".into(),
            ));
        }

        let instructions = Self::instructions_for(&input.preset_accent, &input.instructions);
        info!(
            "Synthesizing {} chars with voice '{}'",
            input.text.len(),
            input.voice
        );

        let response = self
            .client
            .post(SPEECH_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": MODEL,
                "input": input.text,
                "voice": input.voice,
                "speed": input.speed,
                "instructions": instructions,
                "response_format": "mp3",
            }))
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api(format!("{}: {}", status, text)));
        }

        let audio = response
            .bytes()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        let mut audio_data = json!({
            "voice": input.voice,
            "model": MODEL,
            "speed": input.speed,
            "format": "mp3",
            "size": audio.len(),
        });
        if input.return_audio {
            audio_data["base64"] = json!(STANDARD.encode(&audio));
        } else {
            let path = std::env::temp_dir().join(format!(
                "toolgate_tts_{}.mp3",
                chrono::Utc::now().timestamp_millis()
            ));
            tokio::fs::write(&path, &audio).await?;
            audio_data["file_path"] = json!(path.to_string_lossy());
        }

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Synthesized {} bytes of audio with voice '{}' ({} accent)",
                    audio.len(),
                    input.voice,
                    input.preset_accent
                ),
            }],
            "audio_data": audio_data,
        })))
    }
}

#[async_trait]
impl Capability for OpenAiTtsAdapter {
    fn description(&self) -> Option<String> {
        Some("OpenAI text-to-speech with 10 voices and accent presets".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::PROCESS
    }

    async fn process(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: TtsInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        match input.action.as_str() {
            "text_to_speech" => self.synthesize(input).await,
            "get_voices" => Ok(Self::voices()),
            other => Err(AdapterError::InvalidParams(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}
