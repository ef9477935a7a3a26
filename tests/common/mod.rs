//! Shared fixture helpers: synthesize minimal DOCX packages in memory and
//! pull parts back out of the formatted output for assertions.

#![allow(dead_code)]

use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

/// Build a package whose `w:body` holds `body_xml`, plus any extra parts.
pub fn build_docx(body_xml: &str, extra_parts: &[(&str, &str)]) -> Vec<u8> {
    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{WML_NS}" xmlns:r="{REL_NS}"><w:body>{body_xml}</w:body></w:document>"#
    );

    let options = zip::write::SimpleFileOptions::default();
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let mut add = |name: &str, data: &str| {
        writer.start_file(name, options).unwrap();
        writer.write_all(data.as_bytes()).unwrap();
    };
    add("[Content_Types].xml", CONTENT_TYPES);
    add("_rels/.rels", ROOT_RELS);
    add("word/document.xml", &document);
    for (name, data) in extra_parts {
        add(name, data);
    }
    writer.finish().unwrap().into_inner()
}

/// A paragraph with one plain run.
pub fn p(text: &str) -> String {
    if text.is_empty() {
        "<w:p/>".to_string()
    } else {
        format!("<w:p><w:r><w:t>{text}</w:t></w:r></w:p>")
    }
}

/// A paragraph with an explicit original alignment.
pub fn p_aligned(text: &str, jc: &str) -> String {
    format!("<w:p><w:pPr><w:jc w:val=\"{jc}\"/></w:pPr><w:r><w:t>{text}</w:t></w:r></w:p>")
}

pub fn write_fixture(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

/// A named part of a produced package, as text.
pub fn read_part(path: &Path, part: &str) -> Option<String> {
    let file = std::fs::File::open(path).ok()?;
    let mut zip = zip::ZipArchive::new(file).ok()?;
    let mut entry = zip.by_name(part).ok()?;
    let mut out = String::new();
    entry.read_to_string(&mut out).ok()?;
    Some(out)
}

/// Entry names in archive order.
pub fn part_names(path: &Path) -> Vec<String> {
    let file = std::fs::File::open(path).unwrap();
    let mut zip = zip::ZipArchive::new(file).unwrap();
    let mut names = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        names.push(zip.by_index(i).unwrap().name().to_string());
    }
    names
}

// roxmltree helpers in the namespace-aware style the assertions need.

pub fn wml<'a>(node: roxmltree::Node<'a, 'a>, name: &str) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

/// Visible text of a `w:p`/`w:r`/`w:tc` subtree.
pub fn node_text(node: roxmltree::Node) -> String {
    let mut out = String::new();
    for desc in node.descendants() {
        if desc.tag_name().name() == "t" && desc.tag_name().namespace() == Some(WML_NS) {
            if let Some(t) = desc.text() {
                out.push_str(t);
            }
        }
    }
    out
}

/// All body-level paragraphs of a parsed document.xml.
pub fn body_paragraphs<'a>(doc: &'a roxmltree::Document<'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let body = wml(doc.root_element(), "body").expect("w:body");
    body.children()
        .filter(|n| n.tag_name().name() == "p" && n.tag_name().namespace() == Some(WML_NS))
        .collect()
}

/// The body-level paragraph whose text matches `text` exactly.
pub fn find_paragraph<'a>(
    doc: &'a roxmltree::Document<'a>,
    text: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    body_paragraphs(doc).into_iter().find(|p| node_text(*p) == text)
}
