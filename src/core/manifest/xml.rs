//! Minimal XML element tree.
//!
//! Keeps qualified names (`android:name`) as written, attribute order,
//! comments and CDATA. Whitespace-only text is dropped on read and the
//! document is re-indented on write.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use crate::error::{ManifestError, Result};

const INDENT: usize = 4;

/// A child node of an element, or a top-level node outside the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    CData(String),
}

/// An XML element with ordered attributes and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Builder form of [`Element::set_attr`].
    pub fn with_attr(mut self, key: &str, value: &str) -> Self {
        self.set_attr(key, value);
        self
    }

    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing its value in place if present.
    pub fn set_attr(&mut self, key: &str, value: &str) {
        match self.attributes.iter_mut().find(|(k, _)| k == key) {
            Some((_, v)) => *v = value.to_string(),
            None => self.attributes.push((key.to_string(), value.to_string())),
        }
    }

    pub fn push(&mut self, child: Element) {
        self.children.push(Node::Element(child));
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// First child element with this name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.elements().find(|e| e.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut Element> {
        self.elements_mut().find(|e| e.name == name)
    }

    /// Child elements with this name.
    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.elements().filter(move |e| e.name == name)
    }

    /// Drop child elements for which `keep` returns false. Non-element
    /// children are kept.
    pub fn retain_elements(&mut self, mut keep: impl FnMut(&Element) -> bool) {
        self.children.retain(|node| match node {
            Node::Element(e) => keep(e),
            _ => true,
        });
    }
}

/// XML declaration fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Declaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A parsed document: declaration, root element and surrounding comments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub declaration: Option<Declaration>,
    pub prolog: Vec<Node>,
    pub root: Element,
    pub epilog: Vec<Node>,
}

fn parse_error(e: impl std::fmt::Display) -> crate::error::Error {
    ManifestError::Parse(e.to_string()).into()
}

fn utf8(bytes: &[u8]) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(String::from)
        .map_err(parse_error)
}

fn optional<E: std::fmt::Display>(
    value: Option<std::result::Result<Cow<'_, [u8]>, E>>,
) -> Result<Option<String>> {
    value
        .transpose()
        .map_err(parse_error)?
        .map(|v| utf8(&v))
        .transpose()
}

fn start_element(start: &BytesStart<'_>) -> Result<Element> {
    let mut element = Element::new(utf8(start.name().as_ref())?);
    for attribute in start.attributes() {
        let attribute = attribute.map_err(parse_error)?;
        let key = utf8(attribute.key.as_ref())?;
        let value = attribute.unescape_value().map_err(parse_error)?;
        element.attributes.push((key, value.into_owned()));
    }
    Ok(element)
}

impl Document {
    /// Parse XML text.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Parse` for malformed XML, mismatched tags, or
    /// a document without a root element.
    pub fn parse(text: &str) -> Result<Self> {
        let mut reader = Reader::from_str(text);
        reader.config_mut().trim_text(true);

        let mut declaration = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let node = match reader.read_event().map_err(parse_error)? {
                Event::Decl(decl) => {
                    declaration = Some(Declaration {
                        version: utf8(&decl.version().map_err(parse_error)?)?,
                        encoding: optional(decl.encoding())?,
                        standalone: optional(decl.standalone())?,
                    });
                    continue;
                }
                Event::Start(start) => {
                    stack.push(start_element(&start)?);
                    continue;
                }
                Event::End(_) => {
                    let Some(done) = stack.pop() else {
                        return Err(parse_error("unexpected closing tag"));
                    };
                    Node::Element(done)
                }
                Event::Empty(start) => Node::Element(start_element(&start)?),
                Event::Text(text) => Node::Text(text.unescape().map_err(parse_error)?.into_owned()),
                Event::CData(data) => Node::CData(utf8(&data)?),
                Event::Comment(comment) => Node::Comment(utf8(&comment)?),
                Event::PI(_) | Event::DocType(_) => continue,
                Event::Eof => break,
            };

            match (stack.last_mut(), node) {
                (Some(parent), node) => parent.children.push(node),
                (None, Node::Element(element)) => {
                    if root.is_some() {
                        return Err(parse_error("multiple root elements"));
                    }
                    root = Some(element);
                }
                (None, Node::Text(_)) => return Err(parse_error("text outside the root element")),
                (None, node) if root.is_none() => prolog.push(node),
                (None, node) => epilog.push(node),
            }
        }

        if !stack.is_empty() {
            return Err(parse_error("unexpected end of document"));
        }
        let root = root.ok_or_else(|| parse_error("document has no root element"))?;

        Ok(Self {
            declaration,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize with 4-space indentation.
    ///
    /// # Errors
    ///
    /// Returns `ManifestError::Write` if serialization fails.
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', INDENT);

        if let Some(decl) = &self.declaration {
            let event = BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            );
            write(&mut writer, Event::Decl(event))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        let mut out = String::from_utf8(writer.into_inner())
            .map_err(|e| ManifestError::Write(e.to_string()))?;
        out.push('\n');
        Ok(out)
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| ManifestError::Write(e.to_string()).into())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(element) => write_element(writer, element),
        Node::Text(text) => write(writer, Event::Text(BytesText::new(text))),
        Node::Comment(comment) => write(
            writer,
            Event::Comment(BytesText::from_escaped(comment.as_str())),
        ),
        Node::CData(data) => write(writer, Event::CData(BytesCData::new(data.as_str()))),
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write(writer, Event::End(BytesEnd::new(element.name.as_str())))
}
