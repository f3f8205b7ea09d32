//! Gemini REST client.

use std::time::Duration;

use tracing::debug;

use super::errors::summarize_error_body;
use super::wire::{Content, GenerateContentRequest, GenerateContentResponse, InlineData, Part};
use super::{AdapterError, GenerateRequest, GenerateResponse, GenerativeAdapter, PromptPart};
use crate::core::config::Config;
use crate::utils::url::construct_api_url;

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
const API_KEY_HEADER: &str = "x-goog-api-key";

#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl GeminiClient {
    pub fn new(
        api_key: Option<String>,
        base_url: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, AdapterError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;

        Ok(Self {
            http,
            base_url: base_url
                .map(|url| url.trim().to_string())
                .filter(|url| !url.is_empty())
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key: api_key.filter(|key| !key.trim().is_empty()),
        })
    }

    /// Client for the configured endpoint with the key from the environment.
    ///
    /// A missing key is not an error here; requests fail with
    /// [`AdapterError::MissingApiKey`] instead.
    pub fn from_config(config: &Config) -> Result<Self, AdapterError> {
        Self::new(
            Self::api_key_from_env(),
            config.base_url.clone().or_else(Self::base_url_from_env),
            config.request_timeout(),
        )
    }

    /// Key from `GEMINI_API_KEY`, falling back to `GOOGLE_API_KEY`.
    pub fn api_key_from_env() -> Option<String> {
        non_empty_env("GEMINI_API_KEY").or_else(|| non_empty_env("GOOGLE_API_KEY"))
    }

    pub fn base_url_from_env() -> Option<String> {
        non_empty_env("GEMINI_API_BASE")
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub(crate) fn endpoint(&self, path: &str) -> String {
        construct_api_url(&self.base_url, path)
    }

    /// Authenticated GET returning the response body on success.
    pub(crate) async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        query: &[(&str, &str)],
    ) -> Result<T, AdapterError> {
        let api_key = self.api_key.as_deref().ok_or(AdapterError::MissingApiKey)?;
        let response = self
            .http
            .get(url)
            .header(API_KEY_HEADER, api_key)
            .query(query)
            .send()
            .await?;
        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, AdapterError> {
        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<no body>".to_string());
            return Err(AdapterError::Api {
                status: status.as_u16(),
                message: summarize_error_body(&body),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|err| AdapterError::MalformedResponse(err.to_string()))
    }
}

#[async_trait::async_trait]
impl GenerativeAdapter for GeminiClient {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse, AdapterError> {
        let api_key = self.api_key.as_deref().ok_or(AdapterError::MissingApiKey)?;
        let url = self.endpoint(&format!("{}:generateContent", model_path(&request.model)));

        debug!(
            model = %request.model,
            has_image = request.has_image(),
            "sending generateContent request"
        );

        let body = build_request_body(request);
        let response = self
            .http
            .post(url)
            .header("Content-Type", "application/json")
            .header(API_KEY_HEADER, api_key)
            .json(&body)
            .send()
            .await?;

        let payload: GenerateContentResponse = Self::decode(response).await?;
        let text = extract_text(payload)?;
        debug!(chars = text.len(), "generateContent succeeded");
        Ok(GenerateResponse { text })
    }
}

/// `models/<id>` path segment; accepts ids with or without the prefix.
pub fn model_path(model: &str) -> String {
    let trimmed = model.trim();
    if trimmed.starts_with("models/") {
        trimmed.to_string()
    } else {
        format!("models/{trimmed}")
    }
}

pub(crate) fn build_request_body(request: GenerateRequest) -> GenerateContentRequest {
    let parts = request
        .parts
        .into_iter()
        .map(|part| match part {
            PromptPart::Text(text) => Part {
                text: Some(text),
                inline_data: None,
            },
            PromptPart::InlineImage { data, mime_type } => Part {
                text: None,
                inline_data: Some(InlineData { mime_type, data }),
            },
        })
        .collect();

    let system_instruction = request
        .system_instruction
        .filter(|instruction| !instruction.trim().is_empty())
        .map(|instruction| Content {
            role: None,
            parts: vec![Part {
                text: Some(instruction),
                inline_data: None,
            }],
        });

    GenerateContentRequest {
        contents: vec![Content {
            role: Some("user".to_string()),
            parts,
        }],
        system_instruction,
    }
}

pub(crate) fn extract_text(response: GenerateContentResponse) -> Result<String, AdapterError> {
    let block_reason = response
        .prompt_feedback
        .and_then(|feedback| feedback.block_reason);

    let Some(candidate) = response.candidates.into_iter().next() else {
        let reason = match block_reason {
            Some(reason) => format!("prompt blocked ({reason})"),
            None => "no candidates returned".to_string(),
        };
        return Err(AdapterError::EmptyResponse(reason));
    };

    let text: String = candidate
        .content
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect()
        })
        .unwrap_or_default();

    if text.is_empty() {
        let reason = candidate
            .finish_reason
            .map(|reason| format!("finish reason {reason}"))
            .unwrap_or_else(|| "candidate had no text".to_string());
        return Err(AdapterError::EmptyResponse(reason));
    }

    Ok(text)
}

fn non_empty_env(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{spawn_http_stub, StubResponse};
    use serde_json::json;

    fn image_request() -> GenerateRequest {
        GenerateRequest {
            model: "gemini-2.5-flash".into(),
            system_instruction: Some("You are a helpful assistant.".into()),
            parts: vec![
                PromptPart::Text("What is this?".into()),
                PromptPart::InlineImage {
                    data: "iVBORw0KGgo=".into(),
                    mime_type: "image/png".into(),
                },
            ],
        }
    }

    #[test]
    fn model_path_accepts_both_forms() {
        assert_eq!(model_path("gemini-2.5-flash"), "models/gemini-2.5-flash");
        assert_eq!(model_path("models/gemma-3-4b-it"), "models/gemma-3-4b-it");
    }

    #[test]
    fn request_body_uses_camel_case_parts() {
        let body = serde_json::to_value(build_request_body(image_request())).expect("json");
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "role": "user",
                    "parts": [
                        {"text": "What is this?"},
                        {"inlineData": {"mimeType": "image/png", "data": "iVBORw0KGgo="}}
                    ]
                }],
                "systemInstruction": {
                    "parts": [{"text": "You are a helpful assistant."}]
                }
            })
        );
    }

    #[test]
    fn blank_system_instruction_is_omitted() {
        let mut request = GenerateRequest::text("gemini-2.5-flash", "Hello");
        request.system_instruction = Some("   ".into());
        let body = serde_json::to_value(build_request_body(request)).expect("json");
        assert!(body.get("systemInstruction").is_none());
    }

    #[test]
    fn extract_text_joins_parts() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hi "}, {"text": "there"}]},
                "finishReason": "STOP"
            }]
        }))
        .expect("response");
        assert_eq!(extract_text(response).expect("text"), "Hi there");
    }

    #[test]
    fn extract_text_reports_blocked_prompt() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        }))
        .expect("response");
        assert_eq!(
            extract_text(response),
            Err(AdapterError::EmptyResponse("prompt blocked (SAFETY)".into()))
        );
    }

    #[test]
    fn extract_text_reports_empty_candidate() {
        let response: GenerateContentResponse = serde_json::from_value(json!({
            "candidates": [{"finishReason": "MAX_TOKENS"}]
        }))
        .expect("response");
        assert_eq!(
            extract_text(response),
            Err(AdapterError::EmptyResponse("finish reason MAX_TOKENS".into()))
        );
    }

    #[tokio::test]
    async fn missing_key_fails_at_request_time() {
        let client = GeminiClient::new(None, None, None).expect("client");
        assert!(!client.has_api_key());
        assert_eq!(
            client.generate(GenerateRequest::text("m", "Hi")).await,
            Err(AdapterError::MissingApiKey)
        );
    }

    #[tokio::test]
    async fn generate_round_trips_against_local_server() {
        let reply = json!({
            "candidates": [{"content": {"parts": [{"text": "Hi there"}]}}]
        });
        let (base_url, captured) = spawn_http_stub(vec![StubResponse::json(200, reply)]).await;

        let client =
            GeminiClient::new(Some("test-key".into()), Some(base_url), None).expect("client");
        let response = client.generate(image_request()).await.expect("generate");
        assert_eq!(response.text, "Hi there");

        let requests = captured.lock().await;
        assert_eq!(requests.len(), 1);
        let request = &requests[0];
        assert_eq!(
            request.request_line,
            "POST /models/gemini-2.5-flash:generateContent HTTP/1.1"
        );
        assert_eq!(request.header("x-goog-api-key"), Some("test-key"));
        let body: serde_json::Value = serde_json::from_slice(&request.body).expect("body json");
        assert_eq!(
            body["contents"][0]["parts"][1]["inlineData"]["data"],
            "iVBORw0KGgo="
        );
    }

    #[tokio::test]
    async fn api_errors_carry_status_and_summary() {
        let error = json!({"error": {"code": 429, "message": "Quota exceeded", "status": "RESOURCE_EXHAUSTED"}});
        let (base_url, _captured) = spawn_http_stub(vec![StubResponse::json(429, error)]).await;

        let client = GeminiClient::new(Some("k".into()), Some(base_url), None).expect("client");
        let err = client
            .generate(GenerateRequest::text("gemini-2.5-flash", "Hi"))
            .await
            .expect_err("should fail");
        assert_eq!(
            err,
            AdapterError::Api {
                status: 429,
                message: "Quota exceeded".into()
            }
        );
        assert_eq!(err.classify(), "Quota Exceeded");
    }
}
