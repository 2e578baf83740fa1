//! ENEX archive loading.
//!
//! The whole export is read into memory and turned into a small element
//! tree so the extractor can look notes up by child name.

use std::fs;
use std::path::Path;

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::{ConvertError, Result};

/// One XML element with its attributes, character data and children.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlElement {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlElement>,
    text: String,
}

impl XmlElement {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Text and CDATA directly inside this element
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// First direct child with the given name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Direct children with the given name, in document order
    pub fn children_named<'a>(
        &'a self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a XmlElement> + 'a {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// This element and all of its descendants with the given name, in
    /// document order
    pub fn descendants_named<'a>(&'a self, name: &str) -> Vec<&'a XmlElement> {
        let mut found = Vec::new();
        let mut pending = vec![self];
        while let Some(element) = pending.pop() {
            if element.name == name {
                found.push(element);
            }
            pending.extend(element.children.iter().rev());
        }
        found
    }
}

/// A parsed export file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Archive {
    root: XmlElement,
}

impl Archive {
    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    /// Every `note` element, wherever it sits in the tree
    pub fn notes(&self) -> Vec<&XmlElement> {
        self.root.descendants_named("note")
    }
}

/// Read and parse an export file
pub fn load_archive(path: &Path) -> Result<Archive> {
    if !path.exists() {
        return Err(ConvertError::SourceNotFound(path.to_path_buf()));
    }

    let content = fs::read_to_string(path)?;
    log::debug!("Read {} bytes from {:?}", content.len(), path);
    parse_archive(&content)
}

/// Parse ENEX text into an element tree
pub fn parse_archive(xml: &str) -> Result<Archive> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) => {
                stack.push(element_from_start(e)?);
            }
            Ok(Event::Empty(ref e)) => {
                let element = element_from_start(e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::End(_)) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| ConvertError::Xml("unexpected closing tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Ok(Event::Text(e)) => {
                if let Some(open) = stack.last_mut() {
                    let text = e.unescape().map_err(|e| {
                        ConvertError::Xml(format!("{} at position {}", e, reader.buffer_position()))
                    })?;
                    open.text.push_str(&text);
                }
            }
            Ok(Event::CData(e)) => {
                // ENML content is carried in CDATA
                if let Some(open) = stack.last_mut() {
                    open.text.push_str(&String::from_utf8_lossy(&e));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ConvertError::Xml(format!(
                    "{} at position {}",
                    e,
                    reader.buffer_position()
                )));
            }
            _ => {}
        }
    }

    if let Some(open) = stack.last() {
        return Err(ConvertError::Xml(format!("unclosed element <{}>", open.name)));
    }

    root.map(|root| Archive { root })
        .ok_or_else(|| ConvertError::Xml("document has no root element".to_string()))
}

fn element_from_start(start: &BytesStart) -> Result<XmlElement> {
    let mut element = XmlElement::new(String::from_utf8_lossy(start.name().as_ref()));
    for attr in start.attributes() {
        let attr = attr.map_err(|e| ConvertError::Xml(e.to_string()))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| ConvertError::Xml(e.to_string()))?
            .to_string();
        element.attributes.push((key, value));
    }
    Ok(element)
}

fn attach(
    stack: &mut [XmlElement],
    root: &mut Option<XmlElement>,
    element: XmlElement,
) -> Result<()> {
    if let Some(parent) = stack.last_mut() {
        parent.children.push(element);
        return Ok(());
    }
    if root.is_some() {
        return Err(ConvertError::Xml(format!(
            "unexpected second root element <{}>",
            element.name
        )));
    }
    *root = Some(element);
    Ok(())
}
