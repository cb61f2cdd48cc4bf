use crate::config::AnalystConfig;
use crate::error::{Result, StatementAnalystError};
use crate::llm::types::*;
use log::debug;
use reqwest::Client;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GeminiClient {
    pub fn new(api_key: String) -> Self {
        Self {
            client: Client::new(),
            api_key,
            base_url: GEMINI_BASE_URL.to_string(),
        }
    }

    /// Point the client at another endpoint, e.g. a proxy or a local mock server.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn from_config(config: &AnalystConfig) -> Self {
        Self::new(config.api_key.clone())
    }

    /// Send one `generateContent` request. Returns `Ok(None)` when the model
    /// answered without any text (blocked, empty candidates, ...).
    pub(crate) async fn generate_content(
        &self,
        model: &str,
        system_prompt: Option<&str>,
        messages: Vec<Content>,
        max_output_tokens: Option<u32>,
    ) -> Result<Option<String>> {
        let url = format!(
            "{}/models/{}:generateContent?key={}",
            self.base_url, model, self.api_key
        );

        let payload = GenerateContentRequest {
            contents: messages,
            system_instruction: system_prompt.map(Content::user),
            generation_config: GenerationConfig {
                response_mime_type: "text/plain".to_string(),
                max_output_tokens,
            },
        };

        let res = self.client.post(&url).json(&payload).send().await?;
        let status = res.status();

        if !status.is_success() {
            let body = res.text().await?;
            return Err(StatementAnalystError::ModelApi {
                status: status.as_u16(),
                body,
            });
        }

        let body: GenerateContentResponse = res.json().await?;
        if let Some(reason) = body
            .candidates
            .as_ref()
            .and_then(|c| c.first())
            .and_then(|c| c.finish_reason.as_deref())
        {
            debug!("Gemini finish reason: {}", reason);
        }

        Ok(body.text())
    }
}
