//! Reply generation with a model-tier fallback chain.
//!
//! Tiers are tried in order and the first non-empty answer wins. When every
//! tier fails the generator still returns the configured fallback reply, so
//! callers never have to handle an error here.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::config::DEFAULT_FALLBACK_REPLY;
use crate::metrics;
use crate::prompts::ReplyPrompt;
use crate::Result;

/// Model id reported when no tier produced text.
pub const NO_MODEL: &str = "none";

/// A text-generation backend addressed by model id.
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn generate(&self, model: &str, prompt: &str) -> Result<String>;
}

/// Reply text and the tier that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedReply {
    pub text: String,
    pub model: String,
}

impl GeneratedReply {
    /// Whether the text came from the canned fallback.
    pub fn is_fallback(&self) -> bool {
        self.model == NO_MODEL
    }
}

pub struct ReplyGenerator {
    backend: Arc<dyn TextModel>,
    tiers: Vec<String>,
    prompt: ReplyPrompt,
    fallback_reply: String,
}

impl ReplyGenerator {
    pub fn new(backend: Arc<dyn TextModel>, tiers: Vec<String>, prompt: ReplyPrompt) -> Self {
        Self {
            backend,
            tiers,
            prompt,
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
        }
    }

    pub fn with_fallback_reply(mut self, fallback_reply: impl Into<String>) -> Self {
        self.fallback_reply = fallback_reply.into();
        self
    }

    pub fn tiers(&self) -> &[String] {
        &self.tiers
    }

    /// Generate a reply for `comment_text`. Never fails.
    pub async fn generate(&self, comment_text: &str) -> GeneratedReply {
        let prompt = self.prompt.compose(comment_text);

        for (attempt, model) in self.tiers.iter().enumerate() {
            debug!(model = %model, attempt = attempt + 1, "Requesting reply");
            match self.backend.generate(model, &prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(model = %model, attempt = attempt + 1, "Reply generated");
                    metrics::record_generation(model);
                    return GeneratedReply {
                        text: text.trim().to_string(),
                        model: model.clone(),
                    };
                }
                Ok(_) => {
                    warn!(model = %model, "Model returned empty text, trying next tier");
                }
                Err(e) => {
                    warn!(model = %model, error = %e, "Model failed, trying next tier");
                }
            }
        }

        warn!(
            tiers = self.tiers.len(),
            "All model tiers failed, using fallback reply"
        );
        metrics::record_generation(NO_MODEL);
        GeneratedReply {
            text: self.fallback_reply.clone(),
            model: NO_MODEL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Backend scripted per model; records every call.
    #[derive(Default)]
    struct ScriptedModel {
        answers: HashMap<String, std::result::Result<String, String>>,
        calls: Mutex<Vec<(String, String)>>,
    }

    impl ScriptedModel {
        fn answer(mut self, model: &str, text: &str) -> Self {
            self.answers.insert(model.to_string(), Ok(text.to_string()));
            self
        }

        fn fail(mut self, model: &str, detail: &str) -> Self {
            self.answers.insert(model.to_string(), Err(detail.to_string()));
            self
        }

        fn called_models(&self) -> Vec<String> {
            self.calls.lock().unwrap().iter().map(|(m, _)| m.clone()).collect()
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn generate(&self, model: &str, prompt: &str) -> Result<String> {
            self.calls
                .lock()
                .unwrap()
                .push((model.to_string(), prompt.to_string()));
            match self.answers.get(model) {
                Some(Ok(text)) => Ok(text.clone()),
                Some(Err(detail)) => Err(Error::generation(model, detail.clone())),
                None => Err(Error::generation(model, "model not found")),
            }
        }
    }

    fn tiers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn first_tier_success_stops_the_chain() {
        let backend = Arc::new(ScriptedModel::default().answer("t1", "hello").answer("t2", "unused"));
        let generator = ReplyGenerator::new(backend.clone(), tiers(&["t1", "t2"]), ReplyPrompt::default());

        let reply = generator.generate("hi").await;

        assert_eq!(reply.text, "hello");
        assert_eq!(reply.model, "t1");
        assert_eq!(backend.called_models(), vec!["t1"]);
    }

    #[tokio::test]
    async fn falls_through_to_kth_tier_after_k_attempts() {
        let backend = Arc::new(
            ScriptedModel::default()
                .fail("t1", "quota exceeded")
                .fail("t2", "model deprecated")
                .answer("t3", "third time lucky")
                .answer("t4", "never asked"),
        );
        let generator = ReplyGenerator::new(
            backend.clone(),
            tiers(&["t1", "t2", "t3", "t4"]),
            ReplyPrompt::default(),
        );

        let reply = generator.generate("price?").await;

        assert_eq!(reply.text, "third time lucky");
        assert_eq!(reply.model, "t3");
        assert!(!reply.is_fallback());
        assert_eq!(backend.called_models(), vec!["t1", "t2", "t3"]);
    }

    #[tokio::test]
    async fn empty_text_counts_as_failure() {
        let backend = Arc::new(ScriptedModel::default().answer("t1", "   ").answer("t2", " ok "));
        let generator = ReplyGenerator::new(backend.clone(), tiers(&["t1", "t2"]), ReplyPrompt::default());

        let reply = generator.generate("hi").await;

        assert_eq!(reply.text, "ok");
        assert_eq!(reply.model, "t2");
    }

    #[tokio::test]
    async fn exhaustion_returns_fallback_and_sentinel() {
        let backend = Arc::new(ScriptedModel::default().fail("t1", "down").answer("t2", ""));
        let generator = ReplyGenerator::new(backend.clone(), tiers(&["t1", "t2"]), ReplyPrompt::default());

        let reply = generator.generate("price?").await;

        assert_eq!(reply.text, DEFAULT_FALLBACK_REPLY);
        assert_eq!(reply.model, NO_MODEL);
        assert!(reply.is_fallback());
        assert_eq!(backend.called_models().len(), 2);
    }

    #[tokio::test]
    async fn empty_tier_list_goes_straight_to_fallback() {
        let backend = Arc::new(ScriptedModel::default());
        let generator = ReplyGenerator::new(backend.clone(), Vec::new(), ReplyPrompt::default())
            .with_fallback_reply("Thanks!");

        let reply = generator.generate("hi").await;

        assert_eq!(reply.text, "Thanks!");
        assert_eq!(reply.model, NO_MODEL);
        assert!(backend.called_models().is_empty());
    }

    #[tokio::test]
    async fn every_tier_receives_the_same_combined_prompt() {
        let backend = Arc::new(ScriptedModel::default().fail("t1", "down").answer("t2", "ok"));
        let prompt = ReplyPrompt::from_template("Reply in {language}.", "Bengali", "");
        let generator = ReplyGenerator::new(backend.clone(), tiers(&["t1", "t2"]), prompt);

        generator.generate("দাম কত?").await;

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].1, calls[1].1);
        assert!(calls[0].1.starts_with("Reply in Bengali."));
        assert!(calls[0].1.contains("User Comment: দাম কত?"));
    }
}
