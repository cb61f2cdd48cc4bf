use async_trait::async_trait;

use crate::aggregator::DocumentAnalyzer;
use crate::config::AnalystConfig;
use crate::error::Result;
use crate::llm::client::GeminiClient;
use crate::llm::types::Content;
use crate::statement::StatementDocument;

/// [`DocumentAnalyzer`] backed by Gemini, with statements sent as inline PDF parts.
pub struct GeminiAnalyzer {
    client: GeminiClient,
    model: String,
    max_output_tokens: Option<u32>,
}

impl GeminiAnalyzer {
    pub fn new(client: GeminiClient, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            max_output_tokens: None,
        }
    }

    pub fn from_config(config: &AnalystConfig) -> Self {
        Self {
            client: GeminiClient::from_config(config),
            model: config.model.clone(),
            max_output_tokens: config.max_output_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl DocumentAnalyzer for GeminiAnalyzer {
    async fn generate(
        &self,
        prompt: &str,
        documents: &[StatementDocument],
    ) -> Result<Option<String>> {
        let messages = vec![Content::user_with_documents(prompt, documents)];
        self.client
            .generate_content(&self.model, None, messages, self.max_output_tokens)
            .await
    }
}
