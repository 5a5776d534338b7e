//! Dummy LLM provider: echoes the prompt back prefixed with `[echo]`.
//! Lets the full chat path run without a model server.

use crate::llm::ProviderError;

#[derive(Debug, Clone)]
pub struct DummyProvider;

impl DummyProvider {
    pub async fn complete(&self, prompt: &str) -> Result<String, ProviderError> {
        Ok(format!("[echo] {prompt}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn complete_prefixes_echo() {
        let p = DummyProvider;
        assert_eq!(p.complete("hello").await.unwrap(), "[echo] hello");
    }

    #[tokio::test]
    async fn complete_empty_input() {
        let p = DummyProvider;
        assert_eq!(p.complete("").await.unwrap(), "[echo] ");
    }
}
