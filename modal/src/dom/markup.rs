//! HTML fragment parsing for modal markup, enough to turn it into nodes
//! without a browser.
//!
//! Tokenizing is done by `quick-xml` in its lenient mode; the HTML tree rules
//! that matter for modal markup are applied on top: void elements, raw text
//! in `<script>`/`<style>`, implicitly closed paragraphs and list items, and
//! HTML5 character references. Like assigning `innerHTML`, parsing never
//! fails: stray closing tags are ignored, unclosed elements are closed at the
//! end of input, and comments are dropped.

use quick_xml::{
    Reader,
    escape::{resolve_html5_entity, unescape_with},
    events::{BytesStart, Event},
};

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link",
    "meta", "source", "track", "wbr",
];

/// Elements whose content is text up to the matching end tag. The last two
/// still decode character references.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style", "textarea", "title"];

/// Start tags that close an open `<p>`.
const CLOSES_PARAGRAPH: &[&str] = &[
    "address", "article", "aside", "blockquote", "details", "dialog", "div",
    "dl", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2",
    "h3", "h4", "h5", "h6", "header", "hr", "main", "menu", "nav", "ol", "p",
    "pre", "section", "table", "ul",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupNode {
    Element(MarkupElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupElement {
    /// Lowercased tag name.
    pub tag: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<MarkupNode>,
}

impl MarkupElement {
    fn from_start(start: &BytesStart<'_>) -> Self {
        let mut attributes: Vec<(String, String)> = Vec::new();
        for attribute in start
            .html_attributes()
            .with_checks(false)
            .map_while(Result::ok)
        {
            let name =
                String::from_utf8_lossy(attribute.key.as_ref()).to_ascii_lowercase();
            if name.is_empty() || attributes.iter().any(|(key, _)| *key == name) {
                continue;
            }
            let value = decode_references(&String::from_utf8_lossy(&attribute.value));
            attributes.push((name, value));
        }

        Self {
            tag: String::from_utf8_lossy(start.name().as_ref()).to_ascii_lowercase(),
            attributes,
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whitespace separated entries of the `class` attribute.
    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attribute("class").unwrap_or_default().split_whitespace()
    }
}

/// Parse a fragment into its top-level nodes.
pub fn parse_fragment(input: &str) -> Vec<MarkupNode> {
    let mut tree = TreeBuilder::default();
    let mut offset = 0;

    // Raw text elements are cut out of the input by hand, after which
    // tokenizing resumes on a fresh reader
    'segments: while offset < input.len() {
        let mut reader = Reader::from_str(&input[offset..]);
        let config = reader.config_mut();
        config.check_end_names = false;
        config.allow_unmatched_ends = true;

        loop {
            let event = match reader.read_event() {
                Ok(event) => event,
                Err(err) => {
                    tracing::debug!(%err, position = offset, "markup ends in malformed input");
                    break 'segments;
                }
            };

            match event {
                Event::Start(start) => {
                    let element = MarkupElement::from_start(&start);
                    if RAW_TEXT_ELEMENTS.contains(&element.tag.as_str()) {
                        let from = offset + position(&reader, input.len() - offset);
                        offset = tree.raw_text(element, input, from);
                        continue 'segments;
                    }
                    tree.open(element);
                }
                Event::Empty(start) => tree.leaf(MarkupElement::from_start(&start)),
                Event::End(end) => {
                    tree.close(&String::from_utf8_lossy(end.name().as_ref()).to_ascii_lowercase())
                }
                Event::Text(text) => {
                    tree.text(&decode_references(&String::from_utf8_lossy(&text)))
                }
                Event::CData(data) => tree.text(&String::from_utf8_lossy(&data)),
                Event::Eof => break 'segments,
                // Comments, doctypes, declarations and processing instructions
                _ => {}
            }
        }
    }

    tree.finish()
}

/// The first top-level element of a fragment, ignoring leading text.
pub fn first_element(input: &str) -> Option<MarkupElement> {
    parse_fragment(input).into_iter().find_map(|node| match node {
        MarkupNode::Element(element) => Some(element),
        MarkupNode::Text(_) => None,
    })
}

fn position(reader: &Reader<&[u8]>, len: usize) -> usize {
    usize::try_from(reader.buffer_position()).map_or(len, |position| position.min(len))
}

/// Decode HTML5 named and numeric character references. References that do
/// not resolve, and bare ampersands, are kept as written.
fn decode_references(raw: &str) -> String {
    if let Ok(text) = unescape_with(raw, resolve_html5_entity) {
        return text.into_owned();
    }

    let mut pieces = raw.split('&');
    let mut decoded = pieces.next().unwrap_or_default().to_string();
    for piece in pieces {
        let resolved = piece.find(';').and_then(|end| {
            let reference = format!("&{}", &piece[..=end]);
            let text = unescape_with(&reference, resolve_html5_entity)
                .ok()?
                .into_owned();
            Some((text, end + 1))
        });
        match resolved {
            Some((text, len)) => {
                decoded.push_str(&text);
                decoded.push_str(&piece[len..]);
            }
            None => {
                decoded.push('&');
                decoded.push_str(piece);
            }
        }
    }
    decoded
}

#[derive(Default)]
struct TreeBuilder {
    roots: Vec<MarkupNode>,
    open: Vec<MarkupElement>,
}

impl TreeBuilder {
    fn push(&mut self, node: MarkupNode) {
        match self.open.last_mut() {
            Some(parent) => parent.children.push(node),
            None => self.roots.push(node),
        }
    }

    /// Pop the innermost open element into its parent.
    fn pop(&mut self) {
        if let Some(element) = self.open.pop() {
            self.push(MarkupNode::Element(element));
        }
    }

    fn open(&mut self, element: MarkupElement) {
        while self
            .open
            .last()
            .is_some_and(|current| implicitly_closed_by(&current.tag, &element.tag))
        {
            self.pop();
        }

        if VOID_ELEMENTS.contains(&element.tag.as_str()) {
            self.push(MarkupNode::Element(element));
        } else {
            self.open.push(element);
        }
    }

    fn leaf(&mut self, element: MarkupElement) {
        self.push(MarkupNode::Element(element));
    }

    fn close(&mut self, tag: &str) {
        let Some(index) = self.open.iter().rposition(|element| element.tag == tag) else {
            return;
        };
        while self.open.len() > index {
            self.pop();
        }
    }

    fn text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        let siblings = match self.open.last_mut() {
            Some(parent) => &mut parent.children,
            None => &mut self.roots,
        };
        match siblings.last_mut() {
            Some(MarkupNode::Text(previous)) => previous.push_str(text),
            _ => siblings.push(MarkupNode::Text(text.to_string())),
        }
    }

    /// Attach `element` with everything up to its end tag as text. Returns
    /// the offset just past the end tag.
    fn raw_text(&mut self, mut element: MarkupElement, input: &str, from: usize) -> usize {
        let rest = &input[from..];
        // ASCII lowercasing keeps byte offsets intact
        let (len, resume) = match rest.to_ascii_lowercase().find(&format!("</{}", element.tag)) {
            Some(end) => {
                let close = rest[end..].find('>').map_or(rest.len(), |i| end + i + 1);
                (end, from + close)
            }
            None => (rest.len(), input.len()),
        };

        let text = match element.tag.as_str() {
            "script" | "style" => rest[..len].to_string(),
            _ => decode_references(&rest[..len]),
        };
        if !text.is_empty() {
            element.children.push(MarkupNode::Text(text));
        }
        self.open(element);
        self.pop();
        resume
    }

    fn finish(mut self) -> Vec<MarkupNode> {
        while !self.open.is_empty() {
            self.pop();
        }
        self.roots
    }
}

fn implicitly_closed_by(open: &str, tag: &str) -> bool {
    match open {
        "p" => CLOSES_PARAGRAPH.contains(&tag),
        "li" => tag == "li",
        "dt" | "dd" => matches!(tag, "dt" | "dd"),
        "option" => matches!(tag, "option" | "optgroup"),
        _ => false,
    }
}
