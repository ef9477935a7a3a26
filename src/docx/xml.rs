//! Owned, editable XML tree for OOXML package parts.
//!
//! `word/document.xml` is parsed into this tree, mutated by the formatting
//! passes, and serialized back. Elements, attributes, and text the pipeline
//! never touches round-trip unchanged, including inter-element whitespace.

use quick_xml::Reader;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};

use crate::error::{Error, Result};

#[derive(Clone, Debug, PartialEq)]
pub enum XmlNode {
    Element(XmlElement),
    Text(String),
    Comment(String),
}

#[derive(Clone, Debug, PartialEq)]
pub struct XmlElement {
    /// Qualified name as written in the source, e.g. `w:p`.
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl XmlElement {
    pub fn new(name: &str) -> Self {
        XmlElement {
            name: name.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: XmlElement) -> Self {
        self.children.push(XmlNode::Element(child));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(XmlNode::Text(text.to_string()));
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        if let Some(pair) = self.attrs.iter_mut().find(|(k, _)| k == name) {
            pair.1 = value.to_string();
        } else {
            self.attrs.push((name.to_string(), value.to_string()));
        }
    }

    pub fn remove_attr(&mut self, name: &str) {
        self.attrs.retain(|(k, _)| k != name);
    }

    pub fn elements(&self) -> impl Iterator<Item = &XmlElement> {
        self.children.iter().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn elements_mut(&mut self) -> impl Iterator<Item = &mut XmlElement> {
        self.children.iter_mut().filter_map(|n| match n {
            XmlNode::Element(el) => Some(el),
            _ => None,
        })
    }

    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.elements().find(|el| el.name == name)
    }

    pub fn child_mut(&mut self, name: &str) -> Option<&mut XmlElement> {
        self.elements_mut().find(|el| el.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlElement> {
        self.elements().filter(move |el| el.name == name)
    }

    pub fn children_named_mut<'a>(
        &'a mut self,
        name: &'a str,
    ) -> impl Iterator<Item = &'a mut XmlElement> {
        self.elements_mut().filter(move |el| el.name == name)
    }

    pub fn push(&mut self, child: XmlElement) {
        self.children.push(XmlNode::Element(child));
    }

    pub fn insert(&mut self, index: usize, child: XmlElement) {
        self.children.insert(index, XmlNode::Element(child));
    }

    pub fn remove_children(&mut self, name: &str) {
        self.children.retain(|n| match n {
            XmlNode::Element(el) => el.name != name,
            _ => true,
        });
    }

    /// Find `name` among the children, appending a fresh element if absent.
    pub fn ensure_child(&mut self, name: &str) -> &mut XmlElement {
        if let Some(pos) = self.position_of(name) {
            match &mut self.children[pos] {
                XmlNode::Element(el) => el,
                _ => unreachable!(),
            }
        } else {
            self.push(XmlElement::new(name));
            match self.children.last_mut() {
                Some(XmlNode::Element(el)) => el,
                _ => unreachable!(),
            }
        }
    }

    /// Find `name`, inserting it at the position dictated by `order` if
    /// absent. WML property containers (`w:pPr`, `w:rPr`, `w:tblPr`) require
    /// their children in schema order; `order` lists the known sequence and
    /// the new element lands before the first existing child ranked after it.
    pub fn ensure_child_ordered(&mut self, name: &str, order: &[&str]) -> &mut XmlElement {
        if self.position_of(name).is_none() {
            let rank = order.iter().position(|n| *n == name);
            let at = match rank {
                Some(rank) => self
                    .children
                    .iter()
                    .position(|n| match n {
                        XmlNode::Element(el) => order
                            .iter()
                            .position(|o| *o == el.name)
                            .is_some_and(|r| r > rank),
                        _ => false,
                    })
                    .unwrap_or(self.children.len()),
                None => self.children.len(),
            };
            self.children.insert(at, XmlNode::Element(XmlElement::new(name)));
        }
        let pos = self.position_of(name).unwrap();
        match &mut self.children[pos] {
            XmlNode::Element(el) => el,
            _ => unreachable!(),
        }
    }

    fn position_of(&self, name: &str) -> Option<usize> {
        self.children.iter().position(|n| match n {
            XmlNode::Element(el) => el.name == name,
            _ => false,
        })
    }

    /// Concatenated text of all descendant text nodes, in document order.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        for node in &self.children {
            match node {
                XmlNode::Text(t) => out.push_str(t),
                XmlNode::Element(el) => el.collect_text(out),
                XmlNode::Comment(_) => {}
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct XmlDocument {
    pub root: XmlElement,
}

/// Parse one package part into a tree. `part` is used for error context only.
pub fn parse(part: &str, xml: &str) -> Result<XmlDocument> {
    let mut reader = Reader::from_str(xml);
    let mut stack: Vec<XmlElement> = Vec::new();
    let mut root: Option<XmlElement> = None;

    let mut attach = |stack: &mut Vec<XmlElement>, root: &mut Option<XmlElement>, node: XmlNode| {
        if let Some(parent) = stack.last_mut() {
            parent.children.push(node);
        } else if let XmlNode::Element(el) = node {
            root.get_or_insert(el);
        }
    };

    loop {
        match reader.read_event().map_err(|e| Error::xml(part, e))? {
            Event::Start(e) => {
                stack.push(element_from_start(part, &e)?);
            }
            Event::Empty(e) => {
                let el = element_from_start(part, &e)?;
                attach(&mut stack, &mut root, XmlNode::Element(el));
            }
            Event::End(_) => {
                let el = stack
                    .pop()
                    .ok_or_else(|| Error::xml(part, "unbalanced end tag"))?;
                attach(&mut stack, &mut root, XmlNode::Element(el));
            }
            Event::Text(t) => {
                let raw = std::str::from_utf8(t.as_ref())
                    .map_err(|e| Error::xml(part, e))?;
                let text = quick_xml::escape::unescape(raw)
                    .map_err(|e| Error::xml(part, e))?;
                attach(&mut stack, &mut root, XmlNode::Text(text.into_owned()));
            }
            Event::CData(t) => {
                let raw = std::str::from_utf8(t.as_ref())
                    .map_err(|e| Error::xml(part, e))?
                    .to_string();
                attach(&mut stack, &mut root, XmlNode::Text(raw));
            }
            Event::Comment(t) => {
                let raw = std::str::from_utf8(t.as_ref())
                    .map_err(|e| Error::xml(part, e))?
                    .to_string();
                attach(&mut stack, &mut root, XmlNode::Comment(raw));
            }
            Event::GeneralRef(r) => {
                let name = std::str::from_utf8(r.as_ref())
                    .map_err(|e| Error::xml(part, e))?;
                let entity = format!("&{};", name);
                let text = quick_xml::escape::unescape(&entity)
                    .map_err(|e| Error::xml(part, e))?;
                attach(&mut stack, &mut root, XmlNode::Text(text.into_owned()));
            }
            Event::Decl(_) | Event::PI(_) | Event::DocType(_) => {}
            Event::Eof => break,
        }
    }

    let root = root.ok_or_else(|| Error::xml(part, "no root element"))?;
    Ok(XmlDocument { root })
}

fn element_from_start(part: &str, e: &BytesStart) -> Result<XmlElement> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut el = XmlElement {
        name,
        attrs: Vec::new(),
        children: Vec::new(),
    };
    for attr in e.attributes() {
        let attr = attr.map_err(|e| Error::xml(part, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::xml(part, e))?
            .into_owned();
        el.attrs.push((key, value));
    }
    Ok(el)
}

/// Serialize a tree back to bytes, with the standard OOXML declaration.
pub fn serialize(doc: &XmlDocument) -> Vec<u8> {
    let mut writer = quick_xml::Writer::new(Vec::new());
    // Writing into a Vec cannot fail; errors here would indicate a bug.
    let _ = writer.write_event(Event::Decl(BytesDecl::new(
        "1.0",
        Some("UTF-8"),
        Some("yes"),
    )));
    write_element(&mut writer, &doc.root);
    writer.into_inner()
}

fn write_element(writer: &mut quick_xml::Writer<Vec<u8>>, el: &XmlElement) {
    let mut start = BytesStart::new(el.name.as_str());
    for (k, v) in &el.attrs {
        start.push_attribute((k.as_str(), v.as_str()));
    }
    if el.children.is_empty() {
        let _ = writer.write_event(Event::Empty(start));
        return;
    }
    let _ = writer.write_event(Event::Start(start));
    for node in &el.children {
        match node {
            XmlNode::Element(child) => write_element(writer, child),
            XmlNode::Text(t) => {
                let _ = writer.write_event(Event::Text(BytesText::new(t)));
            }
            XmlNode::Comment(t) => {
                let _ = writer.write_event(Event::Comment(BytesText::from_escaped(t.as_str())));
            }
        }
    }
    let _ = writer.write_event(Event::End(BytesEnd::new(el.name.as_str())));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_untouched_structure() {
        let src = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://example"><w:body><w:p><w:pPr><w:jc w:val="center"/></w:pPr><w:r><w:t xml:space="preserve">你好 &amp; world</w:t></w:r></w:p></w:body></w:document>"#;
        let doc = parse("test", src).unwrap();
        let out = serialize(&doc);
        assert_eq!(String::from_utf8(out).unwrap(), src);
    }

    #[test]
    fn text_concatenates_runs() {
        let src = r#"<w:p><w:r><w:t>关于</w:t></w:r><w:r><w:t>通知</w:t></w:r></w:p>"#;
        let doc = parse("test", src).unwrap();
        assert_eq!(doc.root.text(), "关于通知");
    }

    #[test]
    fn ensure_child_ordered_respects_schema_order() {
        let mut ppr = XmlElement::new("w:pPr");
        ppr.push(XmlElement::new("w:jc"));
        ppr.ensure_child_ordered("w:spacing", &["w:pStyle", "w:spacing", "w:ind", "w:jc"]);
        let names: Vec<&str> = ppr.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:spacing", "w:jc"]);
    }

    #[test]
    fn set_attr_replaces_in_place() {
        let mut el = XmlElement::new("w:jc").with_attr("w:val", "left");
        el.set_attr("w:val", "center");
        assert_eq!(el.attr("w:val"), Some("center"));
        assert_eq!(el.attrs.len(), 1);
    }
}
