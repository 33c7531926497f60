//! Page creation against the Notion API.
//!
//! [`PageAssembler`] turns a validated [`PageCreationRequest`] into one
//! create call plus ordered append calls of at most
//! [`MAX_BLOCKS_PER_REQUEST`] blocks each. The network sits behind the
//! [`NotionApi`] trait; [`HttpClient`] is the reqwest implementation.

mod assembler;
mod client;
mod page_id;
mod request;

pub use assembler::{AssemblerOptions, PageAssembler, Progress, Stage, MAX_BLOCKS_PER_REQUEST};
pub use client::{
    api_error, append_children_body, create_page_body, CreatedPage, NotionApi, API_BASE,
    NOTION_VERSION,
};
#[cfg(feature = "http")]
pub use client::{ClientConfig, HttpClient};
pub use page_id::{extract_page_id, PageId};
pub use request::PageCreationRequest;
