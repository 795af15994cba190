use sha2::{Digest, Sha256};

use crate::prompt::PromptStrategy;

pub fn sha256_hex(s: &str) -> String {
    let mut h = Sha256::new();
    h.update(s.as_bytes());
    hex::encode(h.finalize())
}

/// Identifies the exact generation input of one query. Two records with the
/// same fingerprint asked the endpoint the same thing.
pub fn prompt_fingerprint(provider: &str, strategy: PromptStrategy, prompt: &str) -> String {
    let parts = [
        format!("provider={}", provider),
        format!("strategy={}", strategy.as_str()),
        format!("prompt={}", prompt),
    ];
    sha256_hex(&parts.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stable_and_input_sensitive() {
        let a = prompt_fingerprint("trace", PromptStrategy::Enhanced, "q");
        assert_eq!(a, prompt_fingerprint("trace", PromptStrategy::Enhanced, "q"));
        assert_eq!(a.len(), 64);
        assert_ne!(a, prompt_fingerprint("trace", PromptStrategy::Baseline, "q"));
        assert_ne!(a, prompt_fingerprint("openai", PromptStrategy::Enhanced, "q"));
    }
}
