use thiserror::Error;

/// Fatal configuration problems. Raised before any query runs.
#[derive(Debug, Error)]
#[error("config error: {0}")]
pub struct ConfigError(pub String);

/// A failed remote generation call. The message is already truncated for reporting.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    #[error("generation request failed: {0}")]
    Request(String),
    #[error("generation endpoint returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("generation response malformed: {0}")]
    Malformed(String),
    #[error("no recorded generation for question{}", closest_hint(.closest))]
    TraceMiss { closest: Option<String> },
    #[error("recorded generation failure: {0}")]
    Recorded(String),
}

fn closest_hint(closest: &Option<String>) -> String {
    match closest {
        Some(q) => format!(" (closest recorded: {:?})", q),
        None => String::new(),
    }
}

/// Error raised by a database session. Carries the vendor message verbatim.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct DbError {
    pub message: String,
}

impl DbError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn is_already_exists(&self) -> bool {
        self.message.to_ascii_lowercase().contains("already exists")
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(e: rusqlite::Error) -> Self {
        Self::new(e.to_string())
    }
}

/// Truncates to at most `max_chars` characters on a char boundary.
pub fn truncate_message(msg: &str, max_chars: usize) -> String {
    match msg.char_indices().nth(max_chars) {
        Some((idx, _)) => msg[..idx].to_string(),
        None => msg.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_message("héllo wörld", 4), "héll");
        assert_eq!(truncate_message("short", 100), "short");
    }

    #[test]
    fn already_exists_detection_is_case_insensitive() {
        assert!(DbError::new("table REGION already exists").is_already_exists());
        assert!(!DbError::new("no such table: REGION").is_already_exists());
    }

    #[test]
    fn trace_miss_mentions_closest_question() {
        let e = GenerationError::TraceMiss {
            closest: Some("How many customers are there?".into()),
        };
        assert!(e.to_string().contains("closest recorded"));
        let e = GenerationError::TraceMiss { closest: None };
        assert_eq!(e.to_string(), "no recorded generation for question");
    }
}
