//! Configuration for the comment responder
//!
//! Values come from an optional `config.yml` and the environment (with `.env`
//! support). Environment variables take precedence over YAML values, and a
//! YAML value written as `${VAR}` is read from the environment.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::integrations::gemini::GEMINI_API_URL;
use crate::{Error, Result};

/// Graph API defaults
pub const GRAPH_API_URL: &str = "https://graph.facebook.com";
pub const DEFAULT_API_VERSION: &str = "v21.0";
pub const DEFAULT_PAGE_SIZE: u32 = 25;
pub const MAX_PAGE_SIZE: u32 = 100;

/// Loop timing defaults (seconds)
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REPLY_DELAY_SECS: u64 = 5;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;
pub const DEFAULT_STORE_TIMEOUT_SECS: u64 = 5;

pub const DEFAULT_TABLE: &str = "processed_comments";
pub const DEFAULT_PORT: u16 = 10000;
pub const DEFAULT_LOG_LINES: usize = 200;

/// Generation tiers, most preferred first.
pub const DEFAULT_MODEL_TIERS: &[&str] = &[
    "gemini-2.5-flash",
    "gemini-2.0-flash",
    "gemini-2.0-flash-lite",
    "gemini-1.5-flash",
];
pub const DEFAULT_TEMPERATURE: f32 = 0.7;
pub const DEFAULT_MAX_OUTPUT_TOKENS: u32 = 256;

pub const DEFAULT_LANGUAGE: &str = "Bengali";
pub const DEFAULT_PRICING_REPLY: &str = "Please inbox us for pricing details";
pub const DEFAULT_FALLBACK_REPLY: &str = "ধন্যবাদ আপনার মন্তব্যের জন্য! 😊";

/// Ordering directive passed to the comments edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommentOrder {
    Chronological,
    ReverseChronological,
}

impl CommentOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommentOrder::Chronological => "chronological",
            CommentOrder::ReverseChronological => "reverse_chronological",
        }
    }

    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "chronological" => Ok(CommentOrder::Chronological),
            "reverse_chronological" | "newest_first" => Ok(CommentOrder::ReverseChronological),
            other => Err(Error::InvalidArgument(format!(
                "unknown comment order: {}",
                other
            ))),
        }
    }
}

/// YAML config structures
#[derive(Debug, Default, Deserialize)]
struct YamlConfig {
    facebook: Option<FacebookYaml>,
    gemini: Option<GeminiYaml>,
    store: Option<StoreYaml>,
    #[serde(rename = "loop")]
    schedule: Option<LoopYaml>,
    reply: Option<ReplyYaml>,
    server: Option<ServerYaml>,
}

#[derive(Debug, Default, Deserialize)]
struct FacebookYaml {
    access_token: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    page_id: Option<String>,
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    post_id: Option<String>,
    api_version: Option<String>,
    base_url: Option<String>,
    page_size: Option<u32>,
    order: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GeminiYaml {
    api_key: Option<String>,
    base_url: Option<String>,
    models: Option<Vec<String>>,
    temperature: Option<f32>,
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct StoreYaml {
    mysql_url: Option<String>,
    table: Option<String>,
    connect_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoopYaml {
    poll_interval_secs: Option<u64>,
    reply_delay_secs: Option<u64>,
    stale_after_secs: Option<u64>,
    http_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ReplyYaml {
    language: Option<String>,
    pricing_reply: Option<String>,
    fallback_reply: Option<String>,
    prompt_file: Option<PathBuf>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerYaml {
    #[serde(default, deserialize_with = "deserialize_string_or_number")]
    port: Option<String>,
    log_lines: Option<usize>,
}

/// Deserialize a value that can be either a string or a number
fn deserialize_string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: Option<serde_yaml::Value> = Option::deserialize(deserializer)?;
    match value {
        None => Ok(None),
        Some(serde_yaml::Value::String(s)) => Ok(Some(s)),
        Some(serde_yaml::Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "expected string or number, got {:?}",
            other
        ))),
    }
}

/// Graph API access for the monitored page and post.
#[derive(Debug, Clone)]
pub struct FacebookSettings {
    pub access_token: String,
    pub page_id: String,
    pub post_id: String,
    pub api_version: String,
    pub base_url: String,
    pub page_size: u32,
    pub order: Option<CommentOrder>,
}

impl FacebookSettings {
    /// Graph object id of the post (`{page_id}_{post_id}`).
    pub fn full_post_id(&self) -> String {
        if self.post_id.contains('_') {
            self.post_id.clone()
        } else {
            format!("{}_{}", self.page_id, self.post_id)
        }
    }
}

#[derive(Debug, Clone)]
pub struct GeminiSettings {
    pub api_key: String,
    pub base_url: String,
    pub models: Vec<String>,
    pub temperature: f32,
    pub max_output_tokens: u32,
}

#[derive(Debug, Clone)]
pub struct StoreSettings {
    /// Absent means volatile in-memory dedup.
    pub mysql_url: Option<String>,
    pub table: String,
    /// Bounds the startup probe and every later lookup or insert.
    pub connect_timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct LoopSettings {
    pub poll_interval: Duration,
    pub reply_delay: Duration,
    /// Comments older than this are marked processed without a reply.
    pub stale_after: Option<Duration>,
    pub http_timeout: Duration,
}

impl Default for LoopSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            reply_delay: Duration::from_secs(DEFAULT_REPLY_DELAY_SECS),
            stale_after: None,
            http_timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplySettings {
    pub language: String,
    pub pricing_reply: String,
    pub fallback_reply: String,
    pub prompt_file: Option<PathBuf>,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            language: DEFAULT_LANGUAGE.to_string(),
            pricing_reply: DEFAULT_PRICING_REPLY.to_string(),
            fallback_reply: DEFAULT_FALLBACK_REPLY.to_string(),
            prompt_file: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ServerSettings {
    pub port: u16,
    pub log_lines: usize,
}

/// Main configuration struct
#[derive(Debug, Clone)]
pub struct Config {
    pub facebook: FacebookSettings,
    pub gemini: GeminiSettings,
    pub store: StoreSettings,
    pub schedule: LoopSettings,
    pub reply: ReplySettings,
    pub server: ServerSettings,
}

impl Config {
    /// Load configuration from `path`, or from `config.yml` / `../config.yml`
    /// when no path is given. A missing default file is not an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_dotenv();

        let content = match path {
            Some(path) => Some(fs::read_to_string(path).map_err(|e| {
                Error::InvalidArgument(format!(
                    "Failed to read config file {}: {}",
                    path.display(),
                    e
                ))
            })?),
            None => ["config.yml", "../config.yml"]
                .iter()
                .find_map(|candidate| fs::read_to_string(candidate).ok()),
        };

        match content {
            Some(content) => Self::from_yaml_str(&content),
            None => Self::from_yaml(YamlConfig::default()),
        }
    }

    /// Build configuration from YAML text plus the environment.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let yaml: Option<YamlConfig> = serde_yaml::from_str(content)?;
        Self::from_yaml(yaml.unwrap_or_default())
    }

    /// Load .env file into environment variables using dotenvy
    fn load_dotenv() {
        if dotenvy::dotenv().is_err() {
            let _ = dotenvy::from_filename("../.env");
        }
    }

    /// Resolve a value: `${VAR}` placeholders and explicit env keys win over YAML.
    fn resolve_env_string(value: Option<String>, env_key: &str) -> Option<String> {
        if let Some(ref v) = value {
            if v.starts_with("${") && v.ends_with('}') {
                let var_name = &v[2..v.len() - 1];
                return std::env::var(var_name)
                    .ok()
                    .or_else(|| std::env::var(env_key).ok())
                    .filter(|s| !s.trim().is_empty());
            }
        }
        if let Ok(env_val) = std::env::var(env_key) {
            if !env_val.trim().is_empty() {
                return Some(env_val);
            }
        }
        value.filter(|s| !s.trim().is_empty())
    }

    fn required(value: Option<String>, env_key: &str) -> Result<String> {
        Self::resolve_env_string(value, env_key)
            .map(|v| v.trim().to_string())
            .ok_or_else(|| Error::ConfigurationMissing(env_key.to_string()))
    }

    fn from_yaml(yaml: YamlConfig) -> Result<Self> {
        let facebook = yaml.facebook.unwrap_or_default();
        let gemini = yaml.gemini.unwrap_or_default();
        let store = yaml.store.unwrap_or_default();
        let schedule = yaml.schedule.unwrap_or_default();
        let reply = yaml.reply.unwrap_or_default();
        let server = yaml.server.unwrap_or_default();

        let page_size = facebook.page_size.unwrap_or(DEFAULT_PAGE_SIZE);
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(Error::InvalidArgument(format!(
                "facebook.page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, page_size
            )));
        }

        let order = Self::resolve_env_string(facebook.order, "COMMENT_ORDER")
            .map(|o| CommentOrder::parse(&o))
            .transpose()?;

        let models = match std::env::var("GEMINI_MODELS") {
            Ok(list) if !list.trim().is_empty() => list
                .split(',')
                .map(|m| m.trim().to_string())
                .filter(|m| !m.is_empty())
                .collect(),
            _ => gemini.models.unwrap_or_else(|| {
                DEFAULT_MODEL_TIERS.iter().map(|m| m.to_string()).collect()
            }),
        };

        let port = match Self::resolve_env_string(server.port, "PORT") {
            Some(port) => port.trim().parse::<u16>().map_err(|e| {
                Error::InvalidArgument(format!("invalid PORT {:?}: {}", port, e))
            })?,
            None => DEFAULT_PORT,
        };

        Ok(Self {
            facebook: FacebookSettings {
                access_token: Self::required(facebook.access_token, "FACEBOOK_ACCESS_TOKEN")?,
                page_id: Self::required(facebook.page_id, "PAGE_ID")?,
                post_id: Self::required(facebook.post_id, "POST_ID")?,
                api_version: facebook
                    .api_version
                    .unwrap_or_else(|| DEFAULT_API_VERSION.to_string()),
                base_url: facebook
                    .base_url
                    .unwrap_or_else(|| GRAPH_API_URL.to_string()),
                page_size,
                order,
            },
            gemini: GeminiSettings {
                api_key: Self::required(gemini.api_key, "GEMINI_API_KEY")?,
                base_url: gemini.base_url.unwrap_or_else(|| GEMINI_API_URL.to_string()),
                models,
                temperature: gemini.temperature.unwrap_or(DEFAULT_TEMPERATURE),
                max_output_tokens: gemini.max_output_tokens.unwrap_or(DEFAULT_MAX_OUTPUT_TOKENS),
            },
            store: StoreSettings {
                mysql_url: Self::resolve_env_string(store.mysql_url, "MYSQL_URL"),
                table: store.table.unwrap_or_else(|| DEFAULT_TABLE.to_string()),
                connect_timeout: Duration::from_secs(
                    store.connect_timeout_secs.unwrap_or(DEFAULT_STORE_TIMEOUT_SECS),
                ),
            },
            schedule: LoopSettings {
                poll_interval: Duration::from_secs(
                    schedule
                        .poll_interval_secs
                        .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
                ),
                reply_delay: Duration::from_secs(
                    schedule.reply_delay_secs.unwrap_or(DEFAULT_REPLY_DELAY_SECS),
                ),
                stale_after: schedule.stale_after_secs.map(Duration::from_secs),
                http_timeout: Duration::from_secs(
                    schedule.http_timeout_secs.unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
                ),
            },
            reply: ReplySettings {
                language: reply
                    .language
                    .unwrap_or_else(|| DEFAULT_LANGUAGE.to_string()),
                pricing_reply: reply
                    .pricing_reply
                    .unwrap_or_else(|| DEFAULT_PRICING_REPLY.to_string()),
                fallback_reply: reply
                    .fallback_reply
                    .unwrap_or_else(|| DEFAULT_FALLBACK_REPLY.to_string()),
                prompt_file: reply.prompt_file,
            },
            server: ServerSettings {
                port,
                log_lines: server.log_lines.unwrap_or(DEFAULT_LOG_LINES).max(1),
            },
        })
    }
}
