use crate::errors::GenerationError;
use async_trait::async_trait;

pub mod openai;

/// What the endpoint is asked to do with the prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationAction {
    /// Return the SQL text only; never execute it remotely.
    ShowSql,
}

impl GenerationAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationAction::ShowSql => "showsql",
        }
    }
}

#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub question: String,
    pub prompt: String,
    pub action: GenerationAction,
}

impl GenerationRequest {
    pub fn show_sql(question: &str, prompt: String) -> Self {
        Self {
            question: question.to_string(),
            prompt,
            action: GenerationAction::ShowSql,
        }
    }
}

#[async_trait]
pub trait SqlGenerator: Send + Sync {
    async fn generate(&self, req: &GenerationRequest) -> Result<String, GenerationError>;
    fn provider_name(&self) -> &'static str;
}

const FENCE_TAGS: [&str; 5] = ["sql", "sqlite", "oracle", "plsql", "postgresql"];

/// Reduces a model reply to bare SQL: drops markdown fences and their
/// language tag, surrounding whitespace and a trailing semicolon.
pub fn extract_sql(reply: &str) -> String {
    let mut text = reply.trim();

    if let Some(start) = text.find("```") {
        let after = &text[start + 3..];
        let body = match after.find("```") {
            Some(end) => &after[..end],
            None => after,
        };
        text = strip_fence_tag(body);
    }

    let text = text.trim();
    text.strip_suffix(';').unwrap_or(text).trim_end().to_string()
}

// A tag is a single non-keyword word on the opening line, or a known
// dialect name followed by a space when the whole fence sits on one line.
fn strip_fence_tag(body: &str) -> &str {
    if let Some((first, rest)) = body.split_once('\n') {
        let first = first.trim();
        let is_tag = !first.contains(char::is_whitespace)
            && !["SELECT", "WITH"].iter().any(|k| first.eq_ignore_ascii_case(k));
        return if first.is_empty() || is_tag {
            rest
        } else {
            body
        };
    }
    let trimmed = body.trim_start();
    match trimmed.split_once(char::is_whitespace) {
        Some((word, rest)) if FENCE_TAGS.iter().any(|t| word.eq_ignore_ascii_case(t)) => rest,
        _ => trimmed,
    }
}
