use std::path::Path;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

use crate::require_env;

const CHAT_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "meta-llama/llama-4-maverick-17b-128e-instruct";
const DEFAULT_PROMPT: &str = "Describe in detail what you see in this image";

const SUPPORTED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

/// Local-image analysis through a Groq-hosted vision model. The image is
/// read from disk and sent inline as a data URL.
pub struct VisionAdapter {
    client: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct VisionInput {
    image_path: String,
    #[serde(default, alias = "user_question")]
    prompt: Option<String>,
}

impl VisionAdapter {
    pub fn from_env() -> Result<Self, AdapterError> {
        let api_key = require_env("GROQ_API_KEY")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    fn mime_type(path: &Path) -> Result<&'static str, AdapterError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "png" => Ok("image/png"),
            "jpg" | "jpeg" => Ok("image/jpeg"),
            "gif" => Ok("image/gif"),
            "webp" => Ok("image/webp"),
            "bmp" => Ok("image/bmp"),
            other => Err(AdapterError::InvalidParams(format!(
                "unsupported image format '{}' (supported: {})",
                other,
                SUPPORTED_EXTENSIONS.join(", ")
            ))),
        }
    }

    async fn analyze(&self, input: VisionInput) -> Result<ProviderResult, AdapterError> {
        let path = Path::new(&input.image_path);
        if !path.exists() {
            return Err(AdapterError::InvalidParams(format!(
                "image does not exist: {}",
                input.image_path
            )));
        }
        let mime = Self::mime_type(path)?;

        let bytes = tokio::fs::read(path).await?;
        let image_size = bytes.len();
        let data_url = format!("data:{};base64,{}", mime, STANDARD.encode(bytes));

        let prompt = input
            .prompt
            .filter(|p| !p.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PROMPT.to_string());

        info!("Analyzing image {} ({} bytes)", input.image_path, image_size);

        let response = self
            .client
            .post(CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": MODEL,
                "messages": [{
                    "role": "user",
                    "content": [
                        {"type": "text", "text": prompt},
                        {"type": "image_url", "image_url": {"url": data_url}},
                    ],
                }],
                "max_tokens": 1024,
                "temperature": 0.3,
            }))
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
        let analysis = body["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| AdapterError::Parse("no content in vision response".into()))?
            .to_string();

        Ok(ProviderResult::from_value(json!({
            "success": true,
            "analysis": analysis,
            "model_used": MODEL,
            "image_path": input.image_path,
            "prompt": prompt,
            "usage": body["usage"],
            "image_size": format!("{} bytes", image_size),
        })))
    }
}

#[async_trait]
impl Capability for VisionAdapter {
    fn description(&self) -> Option<String> {
        Some("Analyze local images with a Groq vision model".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::PROCESS
    }

    async fn process(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: VisionInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        self.analyze(input).await
    }
}
