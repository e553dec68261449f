//! Facebook Graph API client: reads a post's comments and posts replies.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Deserializer};
use tracing::warn;

use crate::config::{CommentOrder, FacebookSettings};
use crate::responder::{CommentSource, ReplyPublisher};
use crate::{Error, Result};

/// Fields requested for every comment.
pub const COMMENT_FIELDS: &str = "id,message,from,created_time";

/// Author of a comment as reported by the Graph API.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Author {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// A top-level comment on the monitored post.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Comment {
    pub id: String,
    #[serde(default)]
    pub message: String,
    /// Hidden by Graph for users who have not granted the page visibility.
    #[serde(default)]
    pub from: Option<Author>,
    #[serde(default, deserialize_with = "deserialize_graph_time")]
    pub created_time: Option<DateTime<Utc>>,
}

impl Comment {
    pub fn author_id(&self) -> Option<&str> {
        self.from.as_ref().map(|a| a.id.as_str())
    }

    pub fn is_from(&self, account_id: &str) -> bool {
        self.author_id() == Some(account_id)
    }

    /// Whether the comment was created before `now - max_age`. Comments without
    /// a timestamp are never stale.
    pub fn is_older_than(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        let Some(created) = self.created_time else {
            return false;
        };
        match chrono::Duration::from_std(max_age) {
            Ok(max_age) => now.signed_duration_since(created) > max_age,
            Err(_) => false,
        }
    }
}

/// Graph timestamps look like `2024-05-01T10:00:00+0000`; RFC 3339 is
/// accepted as well. An unparseable value decodes as `None` so the rest of the
/// page is still usable.
fn deserialize_graph_time<'de, D>(deserializer: D) -> std::result::Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.and_then(|s| {
        let parsed = parse_graph_time(&s);
        if parsed.is_none() {
            warn!(created_time = %s, "Ignoring unparseable comment timestamp");
        }
        parsed
    }))
}

pub fn parse_graph_time(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z")
        .or_else(|_| DateTime::parse_from_rfc3339(value))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

#[derive(Debug, Deserialize)]
struct CommentPage {
    #[serde(default)]
    data: Vec<Comment>,
}

/// Graph API client bound to one page and post.
#[derive(Debug, Clone)]
pub struct GraphClient {
    http: Client,
    settings: FacebookSettings,
}

impl GraphClient {
    pub fn new(settings: FacebookSettings, timeout: Duration) -> Result<Self> {
        if settings.access_token.trim().is_empty() {
            return Err(Error::ConfigurationMissing(
                "FACEBOOK_ACCESS_TOKEN".to_string(),
            ));
        }

        let http = Client::builder()
            .user_agent("comment_responder/0.1.0")
            .timeout(timeout)
            .build()
            .map_err(|e| Error::InvalidArgument(format!("HTTP client error: {}", e)))?;

        Ok(Self { http, settings })
    }

    pub fn page_id(&self) -> &str {
        &self.settings.page_id
    }

    fn endpoint(&self, object_id: &str) -> String {
        format!(
            "{}/{}/{}/comments",
            self.settings.base_url.trim_end_matches('/'),
            self.settings.api_version,
            object_id
        )
    }

    /// Fetch the first page of top-level comments on the post.
    pub async fn get_post_comments(&self) -> Result<Vec<Comment>> {
        let url = self.endpoint(&self.settings.full_post_id());
        let limit = self.settings.page_size.to_string();
        let mut query = vec![
            ("access_token", self.settings.access_token.as_str()),
            ("fields", COMMENT_FIELDS),
            ("limit", limit.as_str()),
        ];
        if let Some(order) = self.settings.order.as_ref().map(CommentOrder::as_str) {
            query.push(("order", order));
        }

        let response = self
            .http
            .get(&url)
            .query(&query)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("request failed: {}", e)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("failed to read response: {}", e)))?;

        if status != StatusCode::OK {
            return Err(Error::SourceUnavailable(format!(
                "Facebook API error {}: {}",
                status, text
            )));
        }

        let page: CommentPage = serde_json::from_str(&text)
            .map_err(|e| Error::SourceUnavailable(format!("invalid comments payload: {}", e)))?;
        Ok(page.data)
    }

    /// Post `message` as a reply under `comment_id`.
    pub async fn post_reply(&self, comment_id: &str, message: &str) -> Result<()> {
        let url = self.endpoint(comment_id);

        let response = self
            .http
            .post(&url)
            .query(&[
                ("access_token", self.settings.access_token.as_str()),
                ("message", message),
            ])
            .send()
            .await
            .map_err(|e| Error::PublishFailure(format!("request failed: {}", e)))?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        Err(Error::PublishFailure(format!(
            "Facebook API error {}: {}",
            status, text
        )))
    }
}

#[async_trait]
impl CommentSource for GraphClient {
    async fn fetch_comments(&self) -> Result<Vec<Comment>> {
        self.get_post_comments().await
    }
}

#[async_trait]
impl ReplyPublisher for GraphClient {
    async fn publish(&self, comment_id: &str, message: &str) -> Result<()> {
        self.post_reply(comment_id, message).await
    }
}
