//! HTML pretty-printer.
//!
//! The body is parsed with `scraper` (html5ever) and converted into a small
//! [`HtmlNode`] tree holding only documents, elements and text. Comments,
//! doctypes and processing instructions are dropped during conversion.
//!
//! Conversion and rendering both recurse per nesting level, so documents
//! nested deeper than [`MAX_DEPTH`] elements are refused at conversion time.

use scraper::{ElementRef, Html, Node};
use tracing::debug;

const INDENT: &str = "  ";

/// Deepest element nesting accepted from a response body.
pub const MAX_DEPTH: usize = 512;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HtmlNode {
    Document(Vec<HtmlNode>),
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    /// Parsed with the element; rendering leaves them out.
    #[allow(dead_code)]
    pub attributes: Vec<(String, String)>,
    pub children: Vec<HtmlNode>,
}

impl Element {
    fn is_transparent(&self) -> bool {
        self.tag.eq_ignore_ascii_case("head")
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HtmlParseError {
    #[error("body is not valid UTF-8: {0}")]
    Encoding(#[from] std::str::Utf8Error),
    #[error("document nests deeper than {0} elements")]
    TooDeep(usize),
}

/// Parse a byte stream into a document tree.
///
/// html5ever recovers from every markup error, so only undecodable bytes fail.
pub fn parse(body: &[u8]) -> Result<HtmlNode, HtmlParseError> {
    let source = std::str::from_utf8(body)?;
    let document = Html::parse_document(source);
    if !document.errors.is_empty() {
        debug!(count = document.errors.len(), "html parser recovered from markup errors");
    }
    let mut children = Vec::new();
    for child in document.tree.root().children() {
        if let Some(node) = convert(child.value(), ElementRef::wrap(child), 1)? {
            children.push(node);
        }
    }
    Ok(HtmlNode::Document(children))
}

fn convert(
    node: &Node,
    element: Option<ElementRef<'_>>,
    depth: usize,
) -> Result<Option<HtmlNode>, HtmlParseError> {
    match node {
        Node::Text(text) => Ok(Some(HtmlNode::Text(String::from(&**text)))),
        Node::Element(_) => element
            .map(|element| convert_element(element, depth))
            .transpose(),
        _ => Ok(None),
    }
}

fn convert_element(element: ElementRef<'_>, depth: usize) -> Result<HtmlNode, HtmlParseError> {
    if depth > MAX_DEPTH {
        return Err(HtmlParseError::TooDeep(MAX_DEPTH));
    }
    let value = element.value();
    let mut children = Vec::new();
    for child in element.children() {
        if let Some(node) = convert(child.value(), ElementRef::wrap(child), depth + 1)? {
            children.push(node);
        }
    }
    Ok(HtmlNode::Element(Element {
        tag: value.name().to_string(),
        attributes: value
            .attrs()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect(),
        children,
    }))
}

/// Render a tree. Children of the root start at level 0.
pub fn render(root: &HtmlNode) -> String {
    build(root, 0)
}

fn build(node: &HtmlNode, level: usize) -> String {
    match node {
        HtmlNode::Document(children) => build_all(children, level),
        HtmlNode::Element(element) if element.is_transparent() => {
            build_all(&element.children, level)
        }
        HtmlNode::Element(element) => {
            let pad = INDENT.repeat(level);
            let tag = &element.tag;
            match element.children.as_slice() {
                [HtmlNode::Text(text)] => format!("{pad}<{tag}>{}</{tag}>\n", text.trim()),
                children => format!(
                    "{pad}<{tag}>\n{}{pad}</{tag}>\n",
                    build_all(children, level + 1)
                ),
            }
        }
        HtmlNode::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                String::new()
            } else {
                format!("{}{trimmed}\n", INDENT.repeat(level))
            }
        }
    }
}

fn build_all(children: &[HtmlNode], level: usize) -> String {
    children.iter().map(|child| build(child, level)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> HtmlNode {
        HtmlNode::Text(s.to_string())
    }

    fn element(tag: &str, children: Vec<HtmlNode>) -> HtmlNode {
        HtmlNode::Element(Element {
            tag: tag.to_string(),
            attributes: Vec::new(),
            children,
        })
    }

    fn render_source(source: &str) -> String {
        render(&parse(source.as_bytes()).unwrap())
    }

    #[test]
    fn test_collapses_single_text_child() {
        let out = render_source("<html><body><p>Hello, World!</p></body></html>");
        assert_eq!(
            out,
            "<html>\n  <body>\n    <p>Hello, World!</p>\n  </body>\n</html>\n"
        );
    }

    #[test]
    fn test_head_is_transparent() {
        let out = render_source(
            "<html><head><title>Docs</title></head><body><h1>Index</h1></body></html>",
        );
        assert_eq!(
            out,
            "<html>\n  <title>Docs</title>\n  <body>\n    <h1>Index</h1>\n  </body>\n</html>\n"
        );
    }

    #[test]
    fn test_plain_text_becomes_body_text() {
        assert_eq!(
            render_source("just some text"),
            "<html>\n  <body>just some text</body>\n</html>\n"
        );
    }

    #[test]
    fn test_whitespace_only_text_is_skipped() {
        let tree = element(
            "ul",
            vec![
                text("\n  "),
                element("li", vec![text(" one ")]),
                text("\n"),
                element("li", vec![text("two")]),
            ],
        );
        assert_eq!(render(&tree), "<ul>\n  <li>one</li>\n  <li>two</li>\n</ul>\n");
    }

    #[test]
    fn test_mixed_content_expands() {
        let tree = element("p", vec![text(" lead "), element("b", vec![text("bold")])]);
        assert_eq!(render(&tree), "<p>\n  lead\n  <b>bold</b>\n</p>\n");
    }

    #[test]
    fn test_empty_element_expands() {
        assert_eq!(render(&element("div", Vec::new())), "<div>\n</div>\n");
    }

    #[test]
    fn test_document_does_not_indent() {
        let tree = HtmlNode::Document(vec![element("span", vec![text("x")])]);
        assert_eq!(render(&tree), "<span>x</span>\n");
    }

    #[test]
    fn test_attributes_parsed_but_not_rendered() {
        let root = parse(br#"<a href="https://example.com" id="home">Home</a>"#).unwrap();
        let out = render(&root);
        assert!(out.contains("<a>Home</a>"));
        assert!(!out.contains("href"));

        let HtmlNode::Document(children) = &root else {
            panic!("expected document root");
        };
        let HtmlNode::Element(html) = &children[0] else {
            panic!("expected html element");
        };
        let HtmlNode::Element(body) = &html.children[1] else {
            panic!("expected body element");
        };
        let HtmlNode::Element(anchor) = &body.children[0] else {
            panic!("expected anchor element");
        };
        assert!(anchor
            .attributes
            .iter()
            .any(|(name, value)| name == "href" && value == "https://example.com"));
    }

    #[test]
    fn test_entities_resolved_by_parser() {
        assert!(render_source("<p>a &amp; b</p>").contains("<p>a & b</p>"));
    }

    #[test]
    fn test_comments_dropped() {
        let out = render_source("<!DOCTYPE html><html><body><!-- note --><p>x</p></body></html>");
        assert!(!out.contains("note"));
        assert!(!out.contains("DOCTYPE"));
    }

    fn nested_divs(depth: usize) -> String {
        format!("{}x{}", "<div>".repeat(depth), "</div>".repeat(depth))
    }

    #[test]
    fn test_nesting_within_limit_renders() {
        let out = render_source(&nested_divs(100));
        let innermost = format!("{}<div>x</div>\n", INDENT.repeat(101));
        assert!(out.contains(&innermost));
    }

    #[test]
    fn test_nesting_beyond_limit_fails() {
        let err = parse(nested_divs(MAX_DEPTH + 10).as_bytes()).unwrap_err();
        assert!(matches!(err, HtmlParseError::TooDeep(MAX_DEPTH)));
    }

    #[test]
    fn test_very_deep_document_fails_without_overflow() {
        let err = parse(nested_divs(50_000).as_bytes()).unwrap_err();
        assert!(err.to_string().contains("nests deeper"));
    }

    #[test]
    fn test_invalid_utf8_fails() {
        let err = parse(&[0x3c, 0x70, 0x3e, 0xff, 0xfe]).unwrap_err();
        assert!(err.to_string().contains("UTF-8"));
    }
}
