//! Transport seam for the page API and its HTTP implementation.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use super::PageId;
use crate::error::{Error, Result};
use crate::model::{chunk_utf16, to_notion_array, Block, TextRun, MAX_TEXT_LENGTH};

/// Default API endpoint.
pub const API_BASE: &str = "https://api.notion.com/v1";

/// API version sent with every request.
pub const NOTION_VERSION: &str = "2022-06-28";

/// A page returned by the create call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedPage {
    /// Page id
    pub id: String,

    /// Page URL
    #[serde(default)]
    pub url: String,
}

/// The two calls a page export needs.
#[async_trait]
pub trait NotionApi: Send + Sync {
    /// Create a page under `parent` with the first batch of blocks.
    async fn create_page(&self, parent: &PageId, title: &str, children: &[Block])
        -> Result<CreatedPage>;

    /// Append blocks to the end of an existing page or block.
    async fn append_children(&self, block_id: &str, children: &[Block]) -> Result<()>;
}

/// Request body of the create-page call.
pub fn create_page_body(parent: &PageId, title: &str, children: &[Block]) -> Value {
    let title: Vec<TextRun> = chunk_utf16(title.trim(), MAX_TEXT_LENGTH)
        .into_iter()
        .map(TextRun::plain)
        .collect();
    json!({
        "parent": { "type": "page_id", "page_id": parent.as_str() },
        "properties": {
            "title": { "title": to_notion_array(&title) }
        },
        "children": children_body(children),
    })
}

/// Request body of the append-children call.
pub fn append_children_body(children: &[Block]) -> Value {
    json!({ "children": children_body(children) })
}

fn children_body(children: &[Block]) -> Value {
    Value::Array(children.iter().map(Block::to_notion).collect())
}

#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: String,
    #[serde(default)]
    message: String,
}

/// Map an error response to an [`Error`].
pub fn api_error(status: u16, body: &str, retry_after: Option<u64>) -> Error {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = if parsed.message.is_empty() {
        body.trim().to_string()
    } else {
        parsed.message
    };

    match (status, parsed.code.as_str()) {
        (401, _) | (_, "unauthorized") => Error::Auth(message),
        (403, _) | (404, "object_not_found") | (_, "restricted_resource") => {
            Error::Permission(message)
        }
        (429, _) | (_, "rate_limited") => Error::RateLimit { retry_after },
        _ => Error::Api {
            status,
            code: parsed.code,
            message,
        },
    }
}

#[cfg(feature = "http")]
pub use http::{ClientConfig, HttpClient};

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use async_trait::async_trait;
    use reqwest::header::RETRY_AFTER;
    use serde_json::Value;

    use super::{
        api_error, append_children_body, create_page_body, CreatedPage, NotionApi, API_BASE,
        NOTION_VERSION,
    };
    use crate::error::Result;
    use crate::model::Block;
    use crate::notion::PageId;

    /// Connection settings for [`HttpClient`].
    #[derive(Debug, Clone)]
    pub struct ClientConfig {
        /// Integration token
        pub token: String,

        /// API endpoint
        pub base_url: String,

        /// Per-request timeout (none by default)
        pub timeout: Option<Duration>,
    }

    impl ClientConfig {
        /// Create a configuration for the given token.
        pub fn new(token: impl Into<String>) -> Self {
            Self {
                token: token.into(),
                base_url: API_BASE.to_string(),
                timeout: None,
            }
        }

        /// Set the per-request timeout.
        pub fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = Some(timeout);
            self
        }

        /// Set the API endpoint.
        pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
            self.base_url = url.into().trim_end_matches('/').to_string();
            self
        }
    }

    /// [`NotionApi`] over HTTPS.
    pub struct HttpClient {
        http: reqwest::Client,
        config: ClientConfig,
    }

    impl HttpClient {
        /// Build a client from a configuration.
        pub fn new(config: ClientConfig) -> Result<Self> {
            let mut builder = reqwest::Client::builder();
            if let Some(timeout) = config.timeout {
                builder = builder.timeout(timeout);
            }
            let http = builder.build()?;
            Ok(Self { http, config })
        }

        async fn send(&self, request: reqwest::RequestBuilder, body: &Value) -> Result<Value> {
            let response = request
                .bearer_auth(&self.config.token)
                .header("Notion-Version", NOTION_VERSION)
                .json(body)
                .send()
                .await?;

            let status = response.status();
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.trim().parse::<u64>().ok());
            let text = response.text().await?;

            if status.is_success() {
                Ok(serde_json::from_str(&text)?)
            } else {
                log::warn!("API call failed with status {}", status);
                Err(api_error(status.as_u16(), &text, retry_after))
            }
        }
    }

    #[async_trait]
    impl NotionApi for HttpClient {
        async fn create_page(
            &self,
            parent: &PageId,
            title: &str,
            children: &[Block],
        ) -> Result<CreatedPage> {
            let url = format!("{}/pages", self.config.base_url);
            log::debug!("POST {} with {} blocks", url, children.len());
            let body = create_page_body(parent, title, children);
            let value = self.send(self.http.post(&url), &body).await?;
            Ok(serde_json::from_value(value)?)
        }

        async fn append_children(&self, block_id: &str, children: &[Block]) -> Result<()> {
            let url = format!("{}/blocks/{}/children", self.config.base_url, block_id);
            log::debug!("PATCH {} with {} blocks", url, children.len());
            let body = append_children_body(children);
            self.send(self.http.patch(&url), &body).await?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_config_builder() {
            let config = ClientConfig::new("secret")
                .with_timeout(Duration::from_secs(5))
                .with_base_url("http://localhost:8080/v1/");
            assert_eq!(config.base_url, "http://localhost:8080/v1");
            assert_eq!(config.timeout, Some(Duration::from_secs(5)));
            assert!(HttpClient::new(config).is_ok());
        }
    }
}
