use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::fs;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

const DIRECTORIES: &[&str] = &["generated_images", "downloads", "temp", "uploads"];
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];
const MAX_READ_SIZE: u64 = 10 * 1024 * 1024; // 10MB

/// Local file operations confined to a fixed set of subdirectories under
/// one root. Execute-only: this adapter has no `process` shape.
pub struct FileManagerAdapter {
    root: PathBuf,
}

#[derive(Deserialize)]
struct FileManagerInput {
    action: String,
    #[serde(default = "default_directory")]
    directory: String,
    #[serde(default)]
    filename: Option<String>,
    #[serde(default)]
    pattern: Option<String>,
    #[serde(default = "default_limit")]
    limit: usize,
}

fn default_directory() -> String {
    "generated_images".into()
}

fn default_limit() -> usize {
    10
}

impl FileManagerAdapter {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, AdapterError> {
        let root = root.into();
        for dir in DIRECTORIES {
            std::fs::create_dir_all(root.join(dir))?;
        }
        Ok(Self { root })
    }

    fn directory_path(&self, directory: &str) -> Result<PathBuf, AdapterError> {
        if !DIRECTORIES.contains(&directory) {
            return Err(AdapterError::InvalidParams(format!(
                "unknown directory '{}' (allowed: {})",
                directory,
                DIRECTORIES.join(", ")
            )));
        }
        Ok(self.root.join(directory))
    }

    /// File names may not carry separators or parent references.
    fn checked_filename(filename: &str) -> Result<&str, AdapterError> {
        if filename.is_empty()
            || filename.contains('/')
            || filename.contains('\\')
            || filename.contains("..")
        {
            return Err(AdapterError::InvalidParams(format!(
                "invalid filename: '{}'",
                filename
            )));
        }
        Ok(filename)
    }

    fn file_path(&self, directory: &str, filename: &str) -> Result<PathBuf, AdapterError> {
        let dir = self.directory_path(directory)?;
        Ok(dir.join(Self::checked_filename(filename)?))
    }

    fn required_filename(input: &FileManagerInput) -> Result<&str, AdapterError> {
        input
            .filename
            .as_deref()
            .ok_or_else(|| AdapterError::InvalidParams("filename is required".into()))
    }

    async fn list_files(&self, input: &FileManagerInput) -> Result<ProviderResult, AdapterError> {
        let dir = self.directory_path(&input.directory)?;
        let mut entries = fs::read_dir(&dir).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if let Some(pattern) = &input.pattern {
                if !name.contains(pattern.as_str()) {
                    continue;
                }
            }
            let metadata = entry.metadata().await?;
            if !metadata.is_file() {
                continue;
            }
            files.push(json!({
                "filename": name,
                "size": metadata.len(),
                "modified": modified_rfc3339(&metadata),
            }));
            if files.len() >= input.limit {
                break;
            }
        }

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("{} file(s) in {}", files.len(), input.directory),
            }],
            "files": files,
            "directory": input.directory,
        })))
    }

    async fn get_file_info(&self, input: &FileManagerInput) -> Result<ProviderResult, AdapterError> {
        let filename = Self::required_filename(input)?;
        let path = self.file_path(&input.directory, filename)?;
        let metadata = fs::metadata(&path).await?;

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("{}: {} bytes", filename, metadata.len()),
            }],
            "file_info": {
                "filename": filename,
                "directory": input.directory,
                "size": metadata.len(),
                "modified": modified_rfc3339(&metadata),
            }
        })))
    }

    async fn read_file(&self, input: &FileManagerInput) -> Result<ProviderResult, AdapterError> {
        let filename = Self::required_filename(input)?;
        let path = self.file_path(&input.directory, filename)?;

        let metadata = fs::metadata(&path).await?;
        if metadata.len() > MAX_READ_SIZE {
            return Err(AdapterError::InvalidParams(format!(
                "file too large to read: {} bytes",
                metadata.len()
            )));
        }

        let bytes = fs::read(&path).await?;
        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("Read {} ({} bytes)", filename, bytes.len()),
            }],
            "file_data": {
                "filename": filename,
                "directory": input.directory,
                "base64": STANDARD.encode(&bytes),
                "size": bytes.len(),
            }
        })))
    }

    /// Newest image in the directory, for the direct-send email flow.
    async fn get_latest_image(
        &self,
        input: &FileManagerInput,
    ) -> Result<ProviderResult, AdapterError> {
        let dir = self.directory_path(&input.directory)?;
        let mut entries = fs::read_dir(&dir).await?;
        let mut latest: Option<(String, std::time::SystemTime, u64)> = None;

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().to_string();
            if !is_image(&name) {
                continue;
            }
            let metadata = entry.metadata().await?;
            let modified = metadata.modified()?;
            if latest.as_ref().map(|(_, t, _)| modified > *t).unwrap_or(true) {
                latest = Some((name, modified, metadata.len()));
            }
        }

        let (filename, _, size) = latest.ok_or_else(|| {
            AdapterError::ExecutionFailed(format!("no images found in {}", input.directory))
        })?;

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("Latest image in {}: {} ({} bytes)", input.directory, filename, size),
            }],
            "file_info": {
                "filename": filename,
                "directory": input.directory,
                "size": size,
            }
        })))
    }

    async fn copy_file(&self, input: &FileManagerInput) -> Result<ProviderResult, AdapterError> {
        let filename = Self::required_filename(input)?;
        let source = self.file_path(&input.directory, filename)?;
        // Copies land in temp; a follow-up move is out of scope here.
        let target = self.file_path("temp", filename)?;
        // fs::copy truncates the destination first, so copying a file onto
        // itself would zero it before anything is read.
        if source == target {
            return Err(AdapterError::InvalidParams(format!(
                "'{}' is already in temp",
                filename
            )));
        }
        let copied = fs::copy(&source, &target).await?;

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("Copied {} to temp ({} bytes)", filename, copied),
            }],
        })))
    }

    /// Read a file into the `attachment_data` shape the gmail adapter
    /// accepts, so the two can be chained without a size round-trip.
    async fn prepare_for_email(
        &self,
        input: &FileManagerInput,
    ) -> Result<ProviderResult, AdapterError> {
        let filename = Self::required_filename(input)?;
        let path = self.file_path(&input.directory, filename)?;

        let metadata = fs::metadata(&path).await?;
        if metadata.len() > MAX_READ_SIZE {
            return Err(AdapterError::InvalidParams(format!(
                "file too large to attach: {} bytes",
                metadata.len()
            )));
        }

        let bytes = fs::read(&path).await?;
        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("Prepared {} for email ({} bytes)", filename, bytes.len()),
            }],
            "attachment_data": {
                "filename": filename,
                "base64": STANDARD.encode(&bytes),
                "mime_type": mime_for(filename),
            }
        })))
    }

    async fn delete_file(&self, input: &FileManagerInput) -> Result<ProviderResult, AdapterError> {
        let filename = Self::required_filename(input)?;
        let path = self.file_path(&input.directory, filename)?;
        fs::remove_file(&path).await?;

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!("Deleted {} from {}", filename, input.directory),
            }],
        })))
    }
}

fn mime_for(name: &str) -> &'static str {
    let extension = Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match extension.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "pdf" => "application/pdf",
        "txt" => "text/plain",
        "mp3" => "audio/mpeg",
        _ => "application/octet-stream",
    }
}

fn is_image(name: &str) -> bool {
    Path::new(name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| IMAGE_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn modified_rfc3339(metadata: &std::fs::Metadata) -> String {
    metadata
        .modified()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339())
        .unwrap_or_default()
}

#[async_trait]
impl Capability for FileManagerAdapter {
    fn description(&self) -> Option<String> {
        Some("Manage files in the gateway's working directories".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::EXECUTE
    }

    async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: FileManagerInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        match input.action.as_str() {
            "list_files" => self.list_files(&input).await,
            "get_file_info" => self.get_file_info(&input).await,
            "read_file" => self.read_file(&input).await,
            "get_latest_image" => self.get_latest_image(&input).await,
            "copy_file" => self.copy_file(&input).await,
            "prepare_for_email" => self.prepare_for_email(&input).await,
            "delete_file" => self.delete_file(&input).await,
            other => Err(AdapterError::InvalidParams(format!(
                "unknown action '{}'",
                other
            ))),
        }
    }
}
