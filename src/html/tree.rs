//! Immutable element tree built from an html5ever parse.

use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData, RcDom};

/// Elements removed together with everything inside them.
const DROPPED_TAGS: &[&str] = &["script", "style", "noscript", "template", "iframe", "svg"];

/// Tag name given to the document root.
pub const DOCUMENT_TAG: &str = "#document";

/// A node of the parsed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    /// Element with attributes and children
    Element(Element),
    /// Raw text, whitespace untouched
    Text(String),
}

/// An HTML element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name
    pub tag: String,

    /// Attributes in source order
    pub attrs: Vec<(String, String)>,

    /// Child nodes
    pub children: Vec<HtmlNode>,
}

impl Element {
    /// Create an element without attributes.
    pub fn new(tag: impl Into<String>, children: Vec<HtmlNode>) -> Self {
        Self {
            tag: tag.into(),
            attrs: Vec::new(),
            children,
        }
    }

    /// Get an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whitespace-separated class names.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or("").split_whitespace()
    }

    /// Check the tag name.
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// Direct child elements.
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    /// First descendant element with the given tag, depth first.
    pub fn find(&self, tag: &str) -> Option<&Element> {
        self.child_elements()
            .find_map(|child| if child.is(tag) { Some(child) } else { child.find(tag) })
    }

    /// First descendant element matching a predicate, depth first.
    pub fn find_by(&self, predicate: &dyn Fn(&Element) -> bool) -> Option<&Element> {
        self.child_elements().find_map(|child| {
            if predicate(child) {
                Some(child)
            } else {
                child.find_by(predicate)
            }
        })
    }

    /// Concatenated text of all descendants, `<br>` as a newline.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, out: &mut String) {
        for child in &self.children {
            match child {
                HtmlNode::Text(text) => out.push_str(text),
                HtmlNode::Element(el) if el.is("br") => out.push('\n'),
                HtmlNode::Element(el) => el.collect_text(out),
            }
        }
    }
}

impl HtmlNode {
    /// Element view of the node.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            HtmlNode::Element(el) => Some(el),
            HtmlNode::Text(_) => None,
        }
    }
}

/// Parse an HTML document into an element tree rooted at [`DOCUMENT_TAG`].
///
/// Comments, doctypes and processing instructions are discarded, as are
/// script-like elements and their content.
pub fn parse_html(html: &str) -> Element {
    let dom = parse_document(RcDom::default(), Default::default()).one(html);
    Element::new(DOCUMENT_TAG, convert_children(&dom.document))
}

fn convert_children(handle: &Handle) -> Vec<HtmlNode> {
    handle
        .children
        .borrow()
        .iter()
        .filter_map(convert_node)
        .collect()
}

fn convert_node(handle: &Handle) -> Option<HtmlNode> {
    match handle.data {
        NodeData::Element {
            ref name,
            ref attrs,
            ..
        } => {
            let tag = name.local.as_ref().to_ascii_lowercase();
            if DROPPED_TAGS.contains(&tag.as_str()) {
                return None;
            }
            let attrs = attrs
                .borrow()
                .iter()
                .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
                .collect();
            Some(HtmlNode::Element(Element {
                tag,
                attrs,
                children: convert_children(handle),
            }))
        }
        NodeData::Text { ref contents } => Some(HtmlNode::Text(contents.borrow().to_string())),
        _ => None,
    }
}
