use super::{extract_sql, GenerationRequest, SqlGenerator};
use crate::config::env::GeneratorEnv;
use crate::errors::{truncate_message, GenerationError};
use async_trait::async_trait;
use serde_json::json;

/// Text-to-SQL over an OpenAI-compatible chat completions endpoint.
pub struct OpenAiGenerator {
    pub model: String,
    pub api_key: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub error_truncate_chars: usize,
    pub client: reqwest::Client,
}

impl OpenAiGenerator {
    pub fn new(env: &GeneratorEnv, error_truncate_chars: usize) -> Self {
        Self {
            model: env.model.clone(),
            api_key: env.api_key.clone(),
            base_url: env.base_url.trim_end_matches('/').to_string(),
            temperature: env.temperature,
            max_tokens: env.max_tokens,
            error_truncate_chars,
            client: reqwest::Client::new(),
        }
    }

    fn cut(&self, s: &str) -> String {
        truncate_message(s, self.error_truncate_chars)
    }
}

const SYSTEM_PROMPT: &str = "You translate questions into a single SQL query. Reply with the SQL only, without explanation.";

#[async_trait]
impl SqlGenerator for OpenAiGenerator {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, GenerationError> {
        let url = format!("{}/chat/completions", self.base_url);

        let body = json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": SYSTEM_PROMPT },
                { "role": "user", "content": req.prompt },
            ],
            "temperature": self.temperature,
            "max_tokens": self.max_tokens,
        });

        let resp = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Request(self.cut(&e.to_string())))?;

        let status = resp.status();
        if !status.is_success() {
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Status {
                status: status.as_u16(),
                body: self.cut(&error_text),
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| GenerationError::Malformed(self.cut(&e.to_string())))?;

        let text = json
            .pointer("/choices/0/message/content")
            .and_then(|v| v.as_str())
            .ok_or_else(|| GenerationError::Malformed("response missing content".into()))?;

        let sql = extract_sql(text);
        if sql.is_empty() {
            return Err(GenerationError::Malformed("empty SQL in response".into()));
        }
        tracing::debug!(event = "generation.reply", action = req.action.as_str(), chars = sql.len());
        Ok(sql)
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
