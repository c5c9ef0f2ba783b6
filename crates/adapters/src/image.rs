use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

use crate::require_env;

const GENERATION_URL: &str = "https://api.together.xyz/v1/images/generations";
const MODEL: &str = "black-forest-labs/FLUX.1-schnell-Free";

/// Image generation via the Together API FLUX.1 endpoint. Returns the
/// image inline as base64, nothing is written to disk.
pub struct ImageAdapter {
    client: Client,
    api_key: String,
}

#[derive(Deserialize)]
struct ImageInput {
    prompt: String,
    #[serde(default = "default_style")]
    style: String,
}

fn default_style() -> String {
    "photorealistic".into()
}

impl ImageAdapter {
    pub fn from_env() -> Result<Self, AdapterError> {
        let api_key = require_env("TOGETHER_API_KEY")?;
        Ok(Self {
            client: Client::new(),
            api_key,
        })
    }

    /// Append style modifiers and normalize whitespace; prompts are capped
    /// at 500 characters for the upstream API.
    fn enhance_prompt(prompt: &str, style: &str) -> String {
        let modifier = match style.to_lowercase().as_str() {
            "photorealistic" => {
                ", photorealistic, high quality, detailed, professional photography, \
                 studio lighting, sharp focus, 8k resolution"
            }
            "artistic" => ", artistic style, beautiful composition, creative, expressive, \
                 masterpiece, fine art",
            "anime" => ", anime style, manga art, colorful, detailed animation style, japanese art",
            "cyberpunk" => {
                ", cyberpunk style, neon lights, futuristic, dark atmosphere, sci-fi, digital art"
            }
            "fantasy" => ", fantasy art, magical, ethereal, mystical, detailed fantasy illustration",
            _ => ", high quality, detailed, professional art style",
        };

        let combined = format!("{}{}", prompt.trim(), modifier);
        let normalized = combined.split_whitespace().collect::<Vec<_>>().join(" ");
        normalized.chars().take(500).collect()
    }

    async fn generate(&self, input: ImageInput) -> Result<ProviderResult, AdapterError> {
        let enhanced = Self::enhance_prompt(&input.prompt, &input.style);
        info!("Generating image: {:.50}", enhanced);

        let started = std::time::Instant::now();
        let response = self
            .client
            .post(GENERATION_URL)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "model": MODEL,
                "prompt": enhanced,
                "width": 1024,
                "height": 768,
                "steps": 4,
                "response_format": "b64_json",
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
        let image_base64 = body["data"][0]["b64_json"]
            .as_str()
            .ok_or_else(|| AdapterError::Parse("no b64_json in generation response".into()))?
            .to_string();
        let generation_seconds = started.elapsed().as_secs_f64();

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Image generated for '{}' in {:.1}s ({} style, model {})",
                    input.prompt, generation_seconds, input.style, MODEL
                ),
            }],
            "image_data": {
                "base64": image_base64,
                "data_url": format!("data:image/png;base64,{}", image_base64),
                "prompt": input.prompt,
                "style": input.style,
                "model": MODEL,
                "generation_time": generation_seconds,
            }
        })))
    }
}

#[async_trait]
impl Capability for ImageAdapter {
    fn description(&self) -> Option<String> {
        Some("Generate images with Together API FLUX.1".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::EXECUTE
    }

    async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: ImageInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        self.generate(input).await
    }
}
