//! Page creation request and its validation.

use serde::{Deserialize, Serialize};

use super::PageId;
use crate::error::{Error, Result};
use crate::model::Block;
use crate::parser::normalize_link;

/// Everything needed to create one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCreationRequest {
    /// Page title
    pub title: String,

    /// Parent page id, slug or URL
    pub parent_id: String,

    /// Page content
    pub blocks: Vec<Block>,

    /// Address of the source document, linked from the page
    pub source_url: Option<String>,
}

impl PageCreationRequest {
    /// Create a request without a source link.
    pub fn new(title: impl Into<String>, parent_id: impl Into<String>, blocks: Vec<Block>) -> Self {
        Self {
            title: title.into(),
            parent_id: parent_id.into(),
            blocks,
            source_url: None,
        }
    }

    /// Set the source URL.
    pub fn with_source_url(mut self, url: impl Into<String>) -> Self {
        self.source_url = Some(url.into());
        self
    }

    /// Check the request before any network call, returning the parent id.
    pub fn validate(&self) -> Result<PageId> {
        if self.title.trim().is_empty() {
            return Err(Error::Validation("page title is required".to_string()));
        }
        if self.parent_id.trim().is_empty() {
            return Err(Error::Validation("parent page id is required".to_string()));
        }
        let parent = self.parent_id.parse::<PageId>()?;

        if let Some(url) = &self.source_url {
            if normalize_link(url).is_none() {
                return Err(Error::Validation(format!(
                    "source URL '{}' is not an absolute web address",
                    url
                )));
            }
        }
        Ok(parent)
    }
}
