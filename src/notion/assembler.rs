//! Page assembly: one create call followed by ordered append calls.

use super::{CreatedPage, NotionApi, PageCreationRequest};
use crate::error::{Error, Result};
use crate::html::{convert_html, HtmlOptions};
use crate::model::{Block, Color, TextRun, MAX_CHILDREN};
use crate::parser::{MarkdownParser, ParseOptions};

/// Maximum number of top-level blocks per API call.
pub const MAX_BLOCKS_PER_REQUEST: usize = MAX_CHILDREN;

const SOURCE_ICON: &str = "🔗";

/// Export phase being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Converting the document into blocks
    Convert,
    /// Creating the page with the first batch
    Create,
    /// Appending a later batch
    Append,
    /// All batches written
    Finalize,
}

/// One progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Current phase
    pub stage: Stage,

    /// Overall completion, 0 to 100, never decreasing within an export
    pub percent: u8,

    /// Human readable status
    pub message: String,
}

impl Progress {
    fn new(stage: Stage, percent: u8, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent: percent.min(100),
            message: message.into(),
        }
    }
}

/// Options for page assembly.
#[derive(Debug, Clone)]
pub struct AssemblerOptions {
    /// Put a callout linking to the source document at the top of the page
    pub include_source_link: bool,

    /// Label before the source link
    pub source_label: String,

    /// Options for the Markdown stage
    pub parse: ParseOptions,

    /// Options for the HTML stage
    pub html: HtmlOptions,
}

impl AssemblerOptions {
    /// Create new assembler options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable the source link callout.
    pub fn with_source_link(mut self, include: bool) -> Self {
        self.include_source_link = include;
        self
    }

    /// Set the Markdown parse options.
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse = options;
        self
    }

    /// Set the HTML options.
    pub fn with_html_options(mut self, options: HtmlOptions) -> Self {
        self.html = options;
        self
    }
}

impl Default for AssemblerOptions {
    fn default() -> Self {
        Self {
            include_source_link: true,
            source_label: "Source: ".to_string(),
            parse: ParseOptions::default(),
            html: HtmlOptions::default(),
        }
    }
}

/// Writes block sequences to pages through a [`NotionApi`].
pub struct PageAssembler<C> {
    client: C,
    options: AssemblerOptions,
}

impl<C: NotionApi> PageAssembler<C> {
    /// Create an assembler with default options.
    pub fn new(client: C) -> Self {
        Self::with_options(client, AssemblerOptions::default())
    }

    /// Create an assembler with custom options.
    pub fn with_options(client: C, options: AssemblerOptions) -> Self {
        Self { client, options }
    }

    /// Get the underlying client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// Create a page and write all of its blocks.
    ///
    /// The request is validated before any call. The first batch of blocks
    /// goes with the create call and the rest follow as append calls in
    /// order. A failed append after creation is reported as
    /// [`Error::PartialUpload`] naming the page that now exists.
    pub async fn create_page(
        &self,
        request: &PageCreationRequest,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<CreatedPage> {
        let parent = request.validate()?;

        let mut blocks = Vec::with_capacity(request.blocks.len() + 1);
        if let Some(url) = request
            .source_url
            .as_deref()
            .filter(|_| self.options.include_source_link)
        {
            blocks.push(self.source_callout(url));
        }
        blocks.extend(request.blocks.iter().cloned());

        let batches: Vec<&[Block]> = blocks.chunks(MAX_BLOCKS_PER_REQUEST).collect();
        let first = batches.first().copied().unwrap_or(&[]);

        progress(Progress::new(Stage::Create, 20, "Creating page"));
        log::info!(
            "Creating page '{}' with {} blocks in {} batches",
            request.title.trim(),
            blocks.len(),
            batches.len().max(1)
        );
        let page = self
            .client
            .create_page(&parent, &request.title, first)
            .await?;
        log::debug!("Created page {}", page.id);

        let remaining = batches.get(1..).unwrap_or(&[]);
        let mut written = first.len();
        for (index, batch) in remaining.iter().enumerate() {
            let percent = 40 + (index * 55 / remaining.len()) as u8;
            progress(Progress::new(
                Stage::Append,
                percent,
                format!("Appending batch {} of {}", index + 2, batches.len()),
            ));

            if let Err(source) = self.append_blocks(&page.id, batch).await {
                log::warn!(
                    "Append failed after {} of {} blocks on page {}",
                    written,
                    blocks.len(),
                    page.id
                );
                return Err(Error::PartialUpload {
                    page_id: page.id.clone(),
                    page_url: page.url.clone(),
                    blocks_written: written,
                    source: Box::new(source),
                });
            }
            written += batch.len();
        }

        progress(Progress::new(Stage::Finalize, 100, "Page created"));
        Ok(page)
    }

    /// Append blocks to an existing page in request-sized batches.
    ///
    /// Returns the number of blocks written.
    pub async fn append_blocks(&self, page_id: &str, blocks: &[Block]) -> Result<usize> {
        let mut written = 0;
        for batch in blocks.chunks(MAX_BLOCKS_PER_REQUEST) {
            self.client.append_children(page_id, batch).await?;
            written += batch.len();
        }
        Ok(written)
    }

    /// Parse Markdown and create a page from it.
    pub async fn export_markdown(
        &self,
        title: &str,
        parent_id: &str,
        markdown: &str,
        source_url: Option<&str>,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<CreatedPage> {
        progress(Progress::new(Stage::Convert, 5, "Converting Markdown"));
        let blocks = MarkdownParser::with_options(self.options.parse.clone()).parse(markdown);
        log::debug!("Converted Markdown into {} blocks", blocks.len());

        let mut request = PageCreationRequest::new(title, parent_id, blocks);
        request.source_url = source_url.map(str::to_string);
        self.create_page(&request, progress).await
    }

    /// Convert HTML and create a page from it.
    ///
    /// An empty `title` is replaced by the document's own title when it has
    /// one.
    pub async fn export_html(
        &self,
        title: &str,
        parent_id: &str,
        html: &str,
        source_url: Option<&str>,
        progress: &mut (dyn FnMut(Progress) + Send),
    ) -> Result<CreatedPage> {
        progress(Progress::new(Stage::Convert, 2, "Converting HTML"));
        let document = convert_html(html, &self.options.html);
        let title = if title.trim().is_empty() {
            document.title.unwrap_or_default()
        } else {
            title.to_string()
        };
        self.export_markdown(&title, parent_id, &document.markdown, source_url, progress)
            .await
    }

    fn source_callout(&self, url: &str) -> Block {
        Block::Callout {
            text: vec![
                TextRun::plain(self.options.source_label.clone()),
                TextRun::link(url, url),
            ],
            icon: SOURCE_ICON.to_string(),
            color: Color::GrayBackground,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notion::PageId;
    use async_trait::async_trait;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<(String, usize)>>,
    }

    #[async_trait]
    impl NotionApi for Recorder {
        async fn create_page(
            &self,
            _parent: &PageId,
            _title: &str,
            children: &[Block],
        ) -> Result<CreatedPage> {
            self.calls
                .lock()
                .unwrap()
                .push(("create".to_string(), children.len()));
            Ok(CreatedPage {
                id: "page".to_string(),
                url: "https://notion.so/page".to_string(),
            })
        }

        async fn append_children(&self, _block_id: &str, children: &[Block]) -> Result<()> {
            self.calls
                .lock()
                .unwrap()
                .push(("append".to_string(), children.len()));
            Ok(())
        }
    }

    fn request(count: usize) -> PageCreationRequest {
        PageCreationRequest::new(
            "Title",
            "2dadca9a3fff80278295e23720dd2a53",
            vec![Block::Divider; count],
        )
    }

    #[tokio::test]
    async fn test_source_callout_comes_first() {
        let assembler = PageAssembler::new(Recorder::default());
        let request = request(100).with_source_url("https://example.com");
        assembler.create_page(&request, &mut |_| {}).await.unwrap();

        let calls = assembler.client().calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("create".to_string(), 100), ("append".to_string(), 1)]);
    }

    #[tokio::test]
    async fn test_source_link_disabled() {
        let options = AssemblerOptions::new().with_source_link(false);
        let assembler = PageAssembler::with_options(Recorder::default(), options);
        let request = request(100).with_source_url("https://example.com");
        assembler.create_page(&request, &mut |_| {}).await.unwrap();

        let calls = assembler.client().calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("create".to_string(), 100)]);
    }

    #[tokio::test]
    async fn test_append_blocks_rechunks() {
        let assembler = PageAssembler::new(Recorder::default());
        let written = assembler
            .append_blocks("page", &vec![Block::Divider; 250])
            .await
            .unwrap();
        assert_eq!(written, 250);
        let sizes: Vec<usize> = assembler
            .client()
            .calls
            .lock()
            .unwrap()
            .iter()
            .map(|(_, n)| *n)
            .collect();
        assert_eq!(sizes, vec![100, 100, 50]);
    }
}
