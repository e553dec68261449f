//! Reply prompt: the system instruction sent with every comment.
//!
//! The built-in template can be replaced by a Markdown file that uses the
//! `{language}` and `{pricing_reply}` placeholders.

use std::path::Path;

use crate::config::{ReplySettings, DEFAULT_LANGUAGE, DEFAULT_PRICING_REPLY};
use crate::{Error, Result};

/// Built-in instruction template.
pub const DEFAULT_TEMPLATE: &str = "You are a helpful AI assistant for a Facebook Page.
Reply to this comment in {language}, be friendly and concise (1-2 sentences).
If someone asks about price, say '{pricing_reply}'.
Do not reply to offensive comments.";

/// System instruction plus the glue used to append a comment to it.
#[derive(Debug, Clone)]
pub struct ReplyPrompt {
    instruction: String,
}

impl ReplyPrompt {
    /// Render `template` for the given language and pricing reply.
    pub fn from_template(template: &str, language: &str, pricing_reply: &str) -> Self {
        let instruction = template
            .replace("{language}", language)
            .replace("{pricing_reply}", pricing_reply)
            .trim()
            .to_string();
        Self { instruction }
    }

    /// Build the prompt from reply settings, loading the template file if one
    /// is configured.
    pub fn from_settings(settings: &ReplySettings) -> Result<Self> {
        let template = match &settings.prompt_file {
            Some(path) => load_prompt(path)?,
            None => DEFAULT_TEMPLATE.to_string(),
        };
        Ok(Self::from_template(
            &template,
            &settings.language,
            &settings.pricing_reply,
        ))
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    /// Single text payload for the generation backend.
    pub fn compose(&self, comment_text: &str) -> String {
        format!(
            "{}\n\nUser Comment: {}\n\nYour Reply:",
            self.instruction,
            comment_text.trim()
        )
    }
}

impl Default for ReplyPrompt {
    fn default() -> Self {
        Self::from_template(DEFAULT_TEMPLATE, DEFAULT_LANGUAGE, DEFAULT_PRICING_REPLY)
    }
}

/// Load a prompt template from a file.
pub fn load_prompt(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidArgument(format!(
            "Failed to load prompt {}: {}",
            path.display(),
            e
        ))
    })
}
