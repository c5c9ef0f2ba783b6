use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use toolgate_core::{AdapterError, CallShapes, Capability, ProviderResult};

use crate::require_env;

const SEND_URL: &str = "https://gmail.googleapis.com/gmail/v1/users/me/messages/send";

/// Sends mail through the Gmail REST API with a pre-obtained OAuth token.
pub struct GmailAdapter {
    client: Client,
    access_token: String,
}

#[derive(Deserialize)]
struct GmailInput {
    to: String,
    subject: String,
    body: String,
    #[serde(default)]
    attachment_data: Option<AttachmentData>,
}

#[derive(Deserialize)]
struct AttachmentData {
    filename: String,
    /// Base64-encoded file content, as produced by file_manager.
    base64: String,
    #[serde(default = "default_mime")]
    mime_type: String,
}

fn default_mime() -> String {
    "application/octet-stream".into()
}

impl GmailAdapter {
    pub fn from_env() -> Result<Self, AdapterError> {
        let access_token = require_env("GMAIL_ACCESS_TOKEN")?;
        Ok(Self {
            client: Client::new(),
            access_token,
        })
    }

    /// RFC 2822 message, multipart when an attachment is present.
    fn build_message(&self, input: &GmailInput) -> String {
        match &input.attachment_data {
            None => format!(
                "To: {}\r\nSubject: {}\r\nContent-Type: text/plain; charset=utf-8\r\n\r\n{}",
                input.to, input.subject, input.body
            ),
            Some(attachment) => {
                let boundary = "toolgate-mime-boundary";
                format!(
                    "To: {to}\r\nSubject: {subject}\r\n\
                     Content-Type: multipart/mixed; boundary={boundary}\r\n\r\n\
                     --{boundary}\r\n\
                     Content-Type: text/plain; charset=utf-8\r\n\r\n\
                     {body}\r\n\
                     --{boundary}\r\n\
                     Content-Type: {mime}\r\n\
                     Content-Transfer-Encoding: base64\r\n\
                     Content-Disposition: attachment; filename=\"{filename}\"\r\n\r\n\
                     {data}\r\n\
                     --{boundary}--",
                    to = input.to,
                    subject = input.subject,
                    boundary = boundary,
                    body = input.body,
                    mime = attachment.mime_type,
                    filename = attachment.filename,
                    data = attachment.base64,
                )
            }
        }
    }

    async fn send(&self, input: GmailInput) -> Result<ProviderResult, AdapterError> {
        let raw = URL_SAFE_NO_PAD.encode(self.build_message(&input));

        let response = self
            .client
            .post(SEND_URL)
            .bearer_auth(&self.access_token)
            .json(&json!({ "raw": raw }))
            .send()
            .await
            .map_err(|e| AdapterError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(AdapterError::Api(format!("{}: {}", status, text)));
        }

        let sent: Value = response
            .json()
            .await
            .map_err(|e| AdapterError::Parse(e.to_string()))?;
        let message_id = sent["id"].as_str().unwrap_or_default().to_string();

        info!("Email sent to {} (message id {})", input.to, message_id);

        Ok(ProviderResult::from_value(json!({
            "content": [{
                "type": "text",
                "text": format!(
                    "Email sent to {} with subject '{}'",
                    input.to, input.subject
                ),
            }],
            "message": {
                "id": message_id,
                "to": input.to,
                "subject": input.subject,
                "has_attachment": input.attachment_data.is_some(),
            }
        })))
    }
}

#[async_trait]
impl Capability for GmailAdapter {
    fn description(&self) -> Option<String> {
        Some("Send email through the Gmail REST API".into())
    }

    fn shapes(&self) -> CallShapes {
        CallShapes::EXECUTE
    }

    async fn execute(&self, params: Value) -> Result<ProviderResult, AdapterError> {
        let input: GmailInput =
            serde_json::from_value(params).map_err(|e| AdapterError::InvalidParams(e.to_string()))?;
        self.send(input).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn adapter() -> GmailAdapter {
        GmailAdapter {
            client: Client::new(),
            access_token: "test-token".into(),
        }
    }

    #[test]
    fn plain_message_has_headers_and_body() {
        let input = GmailInput {
            to: "dest@example.com".into(),
            subject: "Hi".into(),
            body: "hello there".into(),
            attachment_data: None,
        };
        let message = adapter().build_message(&input);
        assert!(message.starts_with("To: dest@example.com\r\n"));
        assert!(message.contains("Subject: Hi\r\n"));
        assert!(message.ends_with("hello there"));
    }

    #[test]
    fn attachment_produces_multipart_message() {
        let input = GmailInput {
            to: "dest@example.com".into(),
            subject: "With file".into(),
            body: "see attached".into(),
            attachment_data: Some(AttachmentData {
                filename: "photo.png".into(),
                base64: "aGVsbG8=".into(),
                mime_type: "image/png".into(),
            }),
        };
        let message = adapter().build_message(&input);
        assert!(message.contains("multipart/mixed"));
        assert!(message.contains("filename=\"photo.png\""));
        assert!(message.contains("Content-Type: image/png"));
        assert!(message.contains("aGVsbG8="));
    }

    #[test]
    fn missing_required_field_is_invalid_params() {
        let result: Result<GmailInput, _> =
            serde_json::from_value(json!({"to": "x@example.com"}));
        assert!(result.is_err());
    }
}
