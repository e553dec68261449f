//! Command-level tests against mocked Graph and Gemini HTTP servers.

mod test_autoreply;
mod test_check;
mod test_reply;

use std::time::Duration;

use comment_responder::config::{
    Config, FacebookSettings, GeminiSettings, LoopSettings, ReplySettings, ServerSettings,
    StoreSettings, DEFAULT_API_VERSION, DEFAULT_TABLE,
};

/// Config pointing both APIs at `base_url`, with the volatile store.
pub fn mock_config(base_url: &str) -> Config {
    Config {
        facebook: FacebookSettings {
            access_token: "token".to_string(),
            page_id: "page1".to_string(),
            post_id: "post9".to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            base_url: base_url.to_string(),
            page_size: 25,
            order: None,
        },
        gemini: GeminiSettings {
            api_key: "gemini_key".to_string(),
            base_url: base_url.to_string(),
            models: vec!["tier-a".to_string(), "tier-b".to_string()],
            temperature: 0.7,
            max_output_tokens: 256,
        },
        store: StoreSettings {
            mysql_url: None,
            table: DEFAULT_TABLE.to_string(),
            connect_timeout: Duration::from_secs(1),
        },
        schedule: LoopSettings {
            poll_interval: Duration::from_millis(10),
            reply_delay: Duration::ZERO,
            stale_after: None,
            http_timeout: Duration::from_secs(5),
        },
        reply: ReplySettings::default(),
        server: ServerSettings {
            port: 0,
            log_lines: 50,
        },
    }
}
