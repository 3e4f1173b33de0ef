//! Structured rich text as delivered by the content service: an ordered
//! sequence of typed block nodes, each carrying a plain text payload and
//! inline formatting spans.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Paragraph,
    Heading,
    ListItem,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpanKind {
    Strong,
    Emphasis,
    Hyperlink,
}

/// Inline formatting over a half-open character range of the owning node's
/// text. Carried through from the wire; plain-text extraction ignores spans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    #[serde(rename = "type")]
    pub kind: SpanKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextNode {
    #[serde(rename = "type")]
    pub kind: NodeKind,
    pub text: String,
    #[serde(default)]
    pub spans: Vec<Span>,
}

/// A rich text document: the ordered node sequence for one content block
/// body.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RichText {
    pub nodes: Vec<TextNode>,
}

impl RichText {
    pub fn new(nodes: Vec<TextNode>) -> Self {
        Self { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Reduce the document to plain text, one line per node. Formatting
    /// spans carry no text of their own and are dropped.
    pub fn as_text(&self) -> String {
        let mut text = String::new();
        for node in &self.nodes {
            if !text.is_empty() {
                text.push('\n');
            }
            text.push_str(&node.text);
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paragraph(text: &str) -> TextNode {
        TextNode {
            kind: NodeKind::Paragraph,
            text: text.to_string(),
            spans: Vec::new(),
        }
    }

    #[test]
    fn as_text_joins_nodes_with_newlines() {
        let doc = RichText::new(vec![paragraph("first"), paragraph("second")]);
        assert_eq!(doc.as_text(), "first\nsecond");
    }

    #[test]
    fn as_text_of_empty_document_is_empty() {
        assert_eq!(RichText::default().as_text(), "");
    }

    #[test]
    fn spans_do_not_contribute_text() {
        let node = TextNode {
            kind: NodeKind::Paragraph,
            text: "bold words".to_string(),
            spans: vec![Span {
                start: 0,
                end: 4,
                kind: SpanKind::Strong,
            }],
        };
        let doc = RichText::new(vec![node]);
        assert_eq!(doc.as_text(), "bold words");
    }
}
