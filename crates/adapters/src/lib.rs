//! Concrete capability adapters behind the core's `Capability` trait.
//!
//! Each adapter is thin glue over one external integration. Constructors
//! read their credentials from the environment and fail fast when one is
//! missing, exercising the registry's per-adapter failure isolation.

pub mod file_manager;
pub mod gmail;
pub mod image;
pub mod speech;
pub mod tts;
pub mod vision;

use std::path::PathBuf;
use std::sync::Arc;

use toolgate_core::{AdapterDeclaration, CallShapes, Capability};

pub use file_manager::FileManagerAdapter;
pub use gmail::GmailAdapter;
pub use image::ImageAdapter;
pub use speech::GroqSpeechAdapter;
pub use tts::OpenAiTtsAdapter;
pub use vision::VisionAdapter;

/// The compiled-in adapter catalog, in declaration order. `file_manager`
/// must answer `execute`; every other adapter may expose either shape.
pub fn builtin_declarations(file_root: PathBuf) -> Vec<AdapterDeclaration> {
    vec![
        AdapterDeclaration::new("gmail", CallShapes::EITHER, || {
            Ok(Arc::new(GmailAdapter::from_env()?) as Arc<dyn Capability>)
        }),
        AdapterDeclaration::new("image", CallShapes::EITHER, || {
            Ok(Arc::new(ImageAdapter::from_env()?) as Arc<dyn Capability>)
        }),
        AdapterDeclaration::new("file_manager", CallShapes::EXECUTE, move || {
            Ok(Arc::new(FileManagerAdapter::new(file_root.clone())?) as Arc<dyn Capability>)
        }),
        AdapterDeclaration::new("vision", CallShapes::EITHER, || {
            Ok(Arc::new(VisionAdapter::from_env()?) as Arc<dyn Capability>)
        }),
        AdapterDeclaration::new("openai_tts", CallShapes::EITHER, || {
            Ok(Arc::new(OpenAiTtsAdapter::from_env()?) as Arc<dyn Capability>)
        }),
        AdapterDeclaration::new("groq_speech", CallShapes::EITHER, || {
            Ok(Arc::new(GroqSpeechAdapter::from_env()?) as Arc<dyn Capability>)
        }),
    ]
}

pub(crate) fn require_env(name: &'static str) -> Result<String, toolgate_core::AdapterError> {
    std::env::var(name)
        .map_err(|_| toolgate_core::AdapterError::Configuration(format!("{} not set", name)))
}
