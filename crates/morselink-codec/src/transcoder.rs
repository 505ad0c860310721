use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

use crate::table::encode_with_table;

// MARK: - TranslateProvider

/// External text→Morse translation service.
///
/// Implementations live outside this crate; a deployment can defer to a
/// hosted text-generation model. A provider may fail or time out freely;
/// the transcoder swallows every failure and falls back to the table, so
/// providers are never required for correctness.
#[async_trait]
pub trait TranslateProvider: Send + Sync {
    /// Stable identifier, matched against the configured provider list.
    fn id(&self) -> &str;

    /// Translate `text` into wire-format Morse.
    async fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

// MARK: - Transcoder

/// Text→Morse transcoder: an ordered provider chain over a table fallback.
#[derive(Default)]
pub struct Transcoder {
    providers: Vec<Arc<dyn TranslateProvider>>,
}

impl Transcoder {
    /// Table-only transcoder.
    pub fn new() -> Self {
        Self { providers: Vec::new() }
    }

    pub fn with_providers(providers: Vec<Arc<dyn TranslateProvider>>) -> Self {
        Self { providers }
    }

    /// Encode `text`, trying each provider in order and returning the first
    /// non-empty success. Provider errors and empty responses are logged and
    /// skipped; once the chain is exhausted the fixed table runs. Always
    /// returns a value.
    pub async fn encode(&self, text: &str) -> String {
        for provider in &self.providers {
            match provider.translate(text).await {
                Ok(morse) if !morse.trim().is_empty() => {
                    debug!("provider {} translated {} chars", provider.id(), text.chars().count());
                    return morse;
                }
                Ok(_) => {
                    debug!("provider {} returned an empty translation", provider.id());
                }
                Err(e) => {
                    debug!("provider {} failed: {e}", provider.id());
                }
            }
        }
        encode_with_table(text)
    }
}

// MARK: - TranslateError

/// Provider-side failure. Fully swallowed by [`Transcoder::encode`]; only
/// provider implementations and their tests see these.
#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("provider unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("provider returned an unusable response: {reason}")]
    BadResponse { reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedProvider {
        id: &'static str,
        morse: &'static str,
    }

    #[async_trait]
    impl TranslateProvider for FixedProvider {
        fn id(&self) -> &str {
            self.id
        }

        async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
            Ok(self.morse.to_string())
        }
    }

    struct FailingProvider;

    #[async_trait]
    impl TranslateProvider for FailingProvider {
        fn id(&self) -> &str {
            "failing"
        }

        async fn translate(&self, _text: &str) -> Result<String, TranslateError> {
            Err(TranslateError::Unavailable { reason: "no credentials".into() })
        }
    }

    #[tokio::test]
    async fn empty_chain_uses_table() {
        let t = Transcoder::new();
        assert_eq!(t.encode("SOS").await, "... --- ...");
    }

    #[tokio::test]
    async fn first_successful_provider_wins() {
        let t = Transcoder::with_providers(vec![
            Arc::new(FailingProvider),
            Arc::new(FixedProvider { id: "a", morse: ".- .-" }),
            Arc::new(FixedProvider { id: "b", morse: "-- --" }),
        ]);
        assert_eq!(t.encode("anything").await, ".- .-");
    }

    #[tokio::test]
    async fn empty_provider_response_is_skipped() {
        let t = Transcoder::with_providers(vec![
            Arc::new(FixedProvider { id: "blank", morse: "   " }),
        ]);
        assert_eq!(t.encode("SOS").await, "... --- ...");
    }

    #[tokio::test]
    async fn all_providers_failing_falls_back_to_table() {
        let t = Transcoder::with_providers(vec![
            Arc::new(FailingProvider),
            Arc::new(FailingProvider),
        ]);
        assert_eq!(t.encode("SOS").await, "... --- ...");
    }
}
