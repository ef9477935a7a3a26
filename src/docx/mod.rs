pub mod node;
pub mod xml;

use std::io::{Cursor, Read, Write};
use std::path::Path;

use crate::error::{Error, Result};
use xml::{XmlDocument, XmlElement};

pub const DOCUMENT: &str = "word/document.xml";
pub const SETTINGS: &str = "word/settings.xml";
pub const DOC_RELS: &str = "word/_rels/document.xml.rels";
pub const CONTENT_TYPES: &str = "[Content_Types].xml";

pub const REL_TYPE_FOOTER: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/footer";
pub const REL_TYPE_SETTINGS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/settings";
pub const CT_FOOTER: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.footer+xml";
pub const CT_SETTINGS: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.settings+xml";

pub const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
pub const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PKG_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// An opened DOCX package.
///
/// All zip entries are held in memory in their original order; entries the
/// pipeline never parses are written back byte-identical. Parts that get
/// parsed (document, settings, relationships, content types) are serialized
/// from their trees at save time, and newly created parts are appended after
/// the originals in creation order, keeping output deterministic.
#[derive(Debug)]
pub struct WordPackage {
    entries: Vec<(String, Vec<u8>)>,
    pub document: XmlDocument,
    parts: Vec<(String, XmlDocument)>,
}

impl WordPackage {
    pub fn open(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
                std::io::Error::new(e.kind(), format!("{}: {}", e, path.display())),
            ),
            _ => Error::Io(e),
        })?;
        Self::from_bytes(&bytes)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let mut zip = zip::ZipArchive::new(Cursor::new(bytes))
            .map_err(|_| Error::InvalidPackage("file is not a ZIP archive".into()))?;

        let mut entries = Vec::with_capacity(zip.len());
        for i in 0..zip.len() {
            let mut entry = zip
                .by_index(i)
                .map_err(|e| Error::InvalidPackage(e.to_string()))?;
            if entry.is_dir() {
                continue;
            }
            let mut data = Vec::with_capacity(entry.size() as usize);
            entry.read_to_end(&mut data)?;
            entries.push((entry.name().to_string(), data));
        }

        let doc_xml = entries
            .iter()
            .find(|(name, _)| name == DOCUMENT)
            .map(|(_, data)| data.clone())
            .ok_or_else(|| {
                Error::InvalidPackage("missing word/document.xml (is this a DOCX file?)".into())
            })?;
        let doc_text = String::from_utf8(doc_xml)
            .map_err(|e| Error::xml(DOCUMENT, e))?;
        let document = xml::parse(DOCUMENT, &doc_text)?;

        Ok(WordPackage {
            entries,
            document,
            parts: Vec::new(),
        })
    }

    pub fn has_part(&self, name: &str) -> bool {
        self.parts.iter().any(|(n, _)| n == name)
            || self.entries.iter().any(|(n, _)| n == name)
    }

    /// The `w:body` of the main document.
    pub fn body(&self) -> Result<&XmlElement> {
        self.document
            .root
            .child("w:body")
            .ok_or_else(|| Error::xml(DOCUMENT, "missing w:body"))
    }

    pub fn body_mut(&mut self) -> Result<&mut XmlElement> {
        self.document
            .root
            .child_mut("w:body")
            .ok_or_else(|| Error::xml(DOCUMENT, "missing w:body"))
    }

    /// Parse an existing XML part on demand. Returns None when the package
    /// has no such entry.
    pub fn part_mut(&mut self, name: &str) -> Result<Option<&mut XmlDocument>> {
        if let Some(pos) = self.parts.iter().position(|(n, _)| n == name) {
            return Ok(Some(&mut self.parts[pos].1));
        }
        let Some((_, data)) = self.entries.iter().find(|(n, _)| n == name) else {
            return Ok(None);
        };
        let text = String::from_utf8(data.clone()).map_err(|e| Error::xml(name, e))?;
        let doc = xml::parse(name, &text)?;
        self.parts.push((name.to_string(), doc));
        Ok(Some(&mut self.parts.last_mut().unwrap().1))
    }

    /// Parse an existing part or create it with the given root element.
    pub fn part_or_create(
        &mut self,
        name: &str,
        make_root: impl FnOnce() -> XmlElement,
    ) -> Result<&mut XmlDocument> {
        if self.part_mut(name)?.is_some() {
            let pos = self.parts.iter().position(|(n, _)| n == name).unwrap();
            return Ok(&mut self.parts[pos].1);
        }
        self.parts
            .push((name.to_string(), XmlDocument { root: make_root() }));
        Ok(&mut self.parts.last_mut().unwrap().1)
    }

    /// Register or replace a whole part.
    pub fn set_part(&mut self, name: &str, doc: XmlDocument) {
        if let Some(pos) = self.parts.iter().position(|(n, _)| n == name) {
            self.parts[pos].1 = doc;
        } else {
            self.parts.push((name.to_string(), doc));
        }
    }

    /// Smallest `word/<stem>N.xml` name not already taken.
    pub fn free_part_name(&self, stem: &str) -> String {
        for i in 1.. {
            let candidate = format!("word/{stem}{i}.xml");
            if !self.has_part(&candidate) {
                return candidate;
            }
        }
        unreachable!()
    }

    /// Relationships of the main document part, created empty when absent.
    pub fn document_rels(&mut self) -> Result<&mut XmlDocument> {
        self.part_or_create(DOC_RELS, || {
            XmlElement::new("Relationships").with_attr("xmlns", PKG_REL_NS)
        })
    }

    /// Next unused `rId` in the document relationships.
    pub fn next_relationship_id(&mut self) -> Result<String> {
        let rels = self.document_rels()?;
        let max = rels
            .root
            .children_named("Relationship")
            .filter_map(|r| r.attr("Id"))
            .filter_map(|id| id.strip_prefix("rId"))
            .filter_map(|n| n.parse::<u32>().ok())
            .max()
            .unwrap_or(0);
        Ok(format!("rId{}", max + 1))
    }

    /// Add a relationship from the main document to `target` (a path under
    /// `word/`), returning the new id.
    pub fn add_relationship(&mut self, rel_type: &str, target: &str) -> Result<String> {
        let rid = self.next_relationship_id()?;
        let rels = self.document_rels()?;
        rels.root.push(
            XmlElement::new("Relationship")
                .with_attr("Id", &rid)
                .with_attr("Type", rel_type)
                .with_attr("Target", target),
        );
        Ok(rid)
    }

    /// Target of an existing document relationship, resolved to a part name.
    pub fn relationship_target(&mut self, rid: &str) -> Result<Option<String>> {
        let Some(rels) = self.part_mut(DOC_RELS)? else {
            return Ok(None);
        };
        Ok(rels
            .root
            .children_named("Relationship")
            .find(|r| r.attr("Id") == Some(rid))
            .and_then(|r| r.attr("Target"))
            .map(|target| {
                target
                    .strip_prefix('/')
                    .map(String::from)
                    .unwrap_or_else(|| format!("word/{target}"))
            }))
    }

    /// Ensure `[Content_Types].xml` declares `content_type` for `part_name`.
    /// Idempotent: an existing override is left alone.
    pub fn declare_content_type(&mut self, part_name: &str, content_type: &str) -> Result<()> {
        let part_path = format!("/{part_name}");
        let Some(types) = self.part_mut(CONTENT_TYPES)? else {
            // Packages without a content-types part are already malformed
            // beyond repair; don't invent one.
            return Ok(());
        };
        let exists = types
            .root
            .children_named("Override")
            .any(|o| o.attr("PartName") == Some(part_path.as_str()));
        if !exists {
            types.root.push(
                XmlElement::new("Override")
                    .with_attr("PartName", &part_path)
                    .with_attr("ContentType", content_type),
            );
        }
        Ok(())
    }

    /// Serialize all modified parts and write the package. The output is
    /// assembled fully in memory first; the file is only touched once the
    /// whole archive has been built.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = self.to_bytes()?;
        std::fs::write(path, bytes).map_err(Error::Io)
    }

    /// Assemble the rewritten package archive.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut entries = self.entries.clone();

        let mut replace = |name: &str, data: Vec<u8>| {
            if let Some(pos) = entries.iter().position(|(n, _)| n == name) {
                entries[pos].1 = data;
            } else {
                entries.push((name.to_string(), data));
            }
        };

        replace(DOCUMENT, xml::serialize(&self.document));
        for (name, doc) in &self.parts {
            replace(name, xml::serialize(doc));
        }

        let options = zip::write::SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated);
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        for (name, data) in &entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| Error::InvalidPackage(e.to_string()))?;
            writer.write_all(data)?;
        }
        let cursor = writer
            .finish()
            .map_err(|e| Error::InvalidPackage(e.to_string()))?;
        Ok(cursor.into_inner())
    }
}
