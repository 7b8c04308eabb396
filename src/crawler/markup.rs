//! HTML document model for rewriting pages
//!
//! Pages are parsed with html5ever into an `RcDom`, which tolerates
//! malformed markup the way browsers do. The tree is owned by a single
//! [`Document`]; elements selected from it can have their attributes read and
//! rewritten, and [`Document::render`] serializes the tree with every
//! mutation applied.

use encoding_rs::{Encoding, UTF_8};
use html5ever::interface::{Attribute, QualName};
use html5ever::serialize::{serialize, SerializeOpts};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, parse_document, LocalName};
use markup5ever_rcdom::{Handle, NodeData, RcDom, SerializableHandle};

/// Element selector: a tag name, optionally requiring one attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selector {
    tag: String,
    attribute: Option<String>,
}

impl Selector {
    /// Matches every element with the given tag name
    pub fn tag(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attribute: None,
        }
    }

    /// Matches elements with the given tag name that carry `attribute`
    pub fn with_attribute(tag: &str, attribute: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attribute: Some(attribute.to_ascii_lowercase()),
        }
    }

    fn matches(&self, element: &Element) -> bool {
        element.name().eq_ignore_ascii_case(&self.tag)
            && self
                .attribute
                .as_deref()
                .map_or(true, |attr| element.attr(attr).is_some())
    }
}

/// Handle to one element of a [`Document`]
///
/// Cloning the handle does not copy the element; mutations through any
/// clone are visible when the owning document is rendered.
#[derive(Clone)]
pub struct Element {
    handle: Handle,
}

impl Element {
    /// Local tag name (lowercase for HTML elements)
    pub fn name(&self) -> &str {
        match &self.handle.data {
            NodeData::Element { name, .. } => name.local.as_ref(),
            _ => "",
        }
    }

    /// Reads an attribute value
    pub fn attr(&self, name: &str) -> Option<String> {
        match &self.handle.data {
            NodeData::Element { attrs, .. } => attrs
                .borrow()
                .iter()
                .find(|attr| (&*attr.name.local).eq_ignore_ascii_case(name))
                .map(|attr| attr.value.to_string()),
            _ => None,
        }
    }

    /// Sets an attribute value, adding the attribute if it is missing
    pub fn set_attr(&self, name: &str, value: &str) {
        if let NodeData::Element { attrs, .. } = &self.handle.data {
            let mut attrs = attrs.borrow_mut();

            match attrs
                .iter_mut()
                .find(|attr| (&*attr.name.local).eq_ignore_ascii_case(name))
            {
                Some(existing) => existing.value = StrTendril::from_slice(value),
                None => attrs.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(name)),
                    value: StrTendril::from_slice(value),
                }),
            }
        }
    }
}

impl std::fmt::Debug for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Element")
            .field("name", &self.name())
            .finish()
    }
}

/// A parsed HTML page
pub struct Document {
    dom: RcDom,
    encoding: &'static Encoding,
}

impl Document {
    /// Parses page bytes
    ///
    /// The decoder is picked from, in order: a byte order mark, the
    /// `charset` parameter of `content_type`, a `<meta charset>` or
    /// `<meta http-equiv="Content-Type">` declaration in the page, and
    /// finally UTF-8. Parsing never fails: malformed markup is repaired the
    /// way a browser would.
    pub fn parse(bytes: &[u8], content_type: &str) -> Self {
        let declared = charset_label(content_type).and_then(|l| Encoding::for_label(l.as_bytes()));

        let document = Self::decode(bytes, declared.unwrap_or(UTF_8));
        if declared.is_some() || Encoding::for_bom(bytes).is_some() {
            return document;
        }

        // Declared in the markup only: parse again with the right decoder
        match document.meta_charset() {
            Some(encoding) if encoding != document.encoding => Self::decode(bytes, encoding),
            _ => document,
        }
    }

    fn decode(bytes: &[u8], encoding: &'static Encoding) -> Self {
        let (text, encoding, _) = encoding.decode(bytes);

        let dom = parse_document(RcDom::default(), Default::default())
            .one(StrTendril::from_slice(&text));

        Self { dom, encoding }
    }

    /// Encoding named by the first `<meta>` charset declaration
    ///
    /// UTF-16 labels are read as UTF-8, since a page that could be parsed
    /// as ASCII-compatible markup is not UTF-16.
    fn meta_charset(&self) -> Option<&'static Encoding> {
        self.select(&Selector::tag("meta")).iter().find_map(|meta| {
            let label = match meta.attr("charset") {
                Some(label) => label,
                None => {
                    let http_equiv = meta.attr("http-equiv")?;
                    if !http_equiv.trim().eq_ignore_ascii_case("content-type") {
                        return None;
                    }
                    let content = meta.attr("content")?;
                    charset_label(&content)?.to_string()
                }
            };

            Encoding::for_label(label.trim().as_bytes()).map(Encoding::output_encoding)
        })
    }

    /// Character encoding the page was decoded with
    pub fn encoding(&self) -> &'static Encoding {
        self.encoding
    }

    /// Collects the elements matching `selector`, in document order
    ///
    /// The returned handles stay valid while the document is alive and can
    /// be iterated any number of times.
    pub fn select(&self, selector: &Selector) -> Vec<Element> {
        let mut found = Vec::new();
        let mut stack: Vec<Handle> = vec![self.dom.document.clone()];

        while let Some(node) = stack.pop() {
            if let NodeData::Element { .. } = node.data {
                let element = Element {
                    handle: node.clone(),
                };
                if selector.matches(&element) {
                    found.push(element);
                }
            }

            // Children pushed in reverse so they pop in document order
            for child in node.children.borrow().iter().rev() {
                stack.push(child.clone());
            }
        }

        found
    }

    /// Serializes the document, re-encoded in its original charset
    pub fn render(&self) -> std::io::Result<Vec<u8>> {
        let mut buf: Vec<u8> = Vec::new();
        let serializable: SerializableHandle = self.dom.document.clone().into();
        serialize(&mut buf, &serializable, SerializeOpts::default())?;

        if self.encoding == UTF_8 {
            return Ok(buf);
        }

        let text = String::from_utf8_lossy(&buf);
        let (encoded, _, _) = self.encoding.encode(&text);
        Ok(encoded.into_owned())
    }
}

/// Extracts the `charset` parameter of a Content-Type header value
fn charset_label(content_type: &str) -> Option<&str> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        if key.trim().eq_ignore_ascii_case("charset") {
            Some(value.trim().trim_matches('"'))
        } else {
            None
        }
    })
}
