//! Page footer builder.
//!
//! Official-style page numbers alternate sides: odd pages carry the number
//! on the right, even pages on the left, each bracketed by em-dash
//! separators around a live PAGE field. The builder switches the document
//! to distinct odd/even footers and rebuilds the two footer parts from
//! scratch on every run, so re-running never stacks content.

use crate::docx::xml::{XmlDocument, XmlElement};
use crate::docx::{
    self, CT_FOOTER, CT_SETTINGS, REL_NS, REL_TYPE_FOOTER, REL_TYPE_SETTINGS, SETTINGS, WML_NS,
    WordPackage, node,
};
use crate::error::Result;
use crate::model::Alignment;
use crate::preset::FooterStyle;

/// U+3000, the full-width space used to inset the number from the margin.
const FULL_WIDTH_SPACE: &str = "\u{3000}";

#[derive(Clone, Copy, Debug, PartialEq)]
enum SectPath {
    Body,
    Para(usize),
}

/// Build odd/even footers for every section of the document.
pub fn build_footers(pkg: &mut WordPackage, style: &FooterStyle) -> Result<()> {
    ensure_even_and_odd(pkg)?;

    // Footer references carry an r:id; older generators sometimes omit the
    // namespace declaration.
    if pkg.document.root.attr("xmlns:r").is_none() {
        pkg.document.root.set_attr("xmlns:r", REL_NS);
    }
    pkg.body_mut()?.ensure_child("w:sectPr");

    // Read pass: existing footer references per section.
    let mut sections: Vec<(SectPath, Option<String>, Option<String>)> = Vec::new();
    {
        let body = pkg.body()?;
        for (i, el) in body.elements().enumerate() {
            if node::is_paragraph(el)
                && let Some(sect) = el.child("w:pPr").and_then(|pr| pr.child("w:sectPr"))
            {
                sections.push((
                    SectPath::Para(i),
                    node::footer_reference(sect, "default"),
                    node::footer_reference(sect, "even"),
                ));
            }
        }
        if let Some(sect) = body.child("w:sectPr") {
            sections.push((
                SectPath::Body,
                node::footer_reference(sect, "default"),
                node::footer_reference(sect, "even"),
            ));
        }
    }

    // Package pass: resolve or create the footer parts, rebuild content.
    let mut assignments: Vec<(SectPath, &'static str, String)> = Vec::new();
    for (path, default_rid, even_rid) in sections {
        for (kind, existing) in [("default", default_rid), ("even", even_rid)] {
            let resolved = match existing {
                Some(rid) => pkg
                    .relationship_target(&rid)?
                    .map(|target| (rid, target)),
                None => None,
            };
            let (rid, part_name) = match resolved {
                Some(found) => found,
                None => {
                    let part_name = pkg.free_part_name("footer");
                    let target = part_name.strip_prefix("word/").unwrap().to_string();
                    let rid = pkg.add_relationship(REL_TYPE_FOOTER, &target)?;
                    pkg.declare_content_type(&part_name, CT_FOOTER)?;
                    (rid, part_name)
                }
            };
            pkg.set_part(&part_name, footer_part(kind == "default", style));
            assignments.push((path, kind, rid));
        }
    }

    // Mutate pass: point each section at its parts.
    let body = pkg.body_mut()?;
    for (path, kind, rid) in assignments {
        let sect = match path {
            SectPath::Body => body.child_mut("w:sectPr"),
            SectPath::Para(i) => body
                .elements_mut()
                .nth(i)
                .and_then(|p| p.child_mut("w:pPr"))
                .and_then(|pr| pr.child_mut("w:sectPr")),
        };
        if let Some(sect) = sect {
            node::set_footer_reference(sect, kind, &rid);
        }
    }
    Ok(())
}

/// Distinct odd/even footers are a document-wide switch in `settings.xml`.
/// The part is created (and registered) when the package lacks one.
fn ensure_even_and_odd(pkg: &mut WordPackage) -> Result<()> {
    let existed = pkg.has_part(SETTINGS);
    let settings = pkg.part_or_create(SETTINGS, || {
        XmlElement::new("w:settings").with_attr("xmlns:w", WML_NS)
    })?;
    settings.root.ensure_child("w:evenAndOddHeaders");
    if !existed {
        pkg.add_relationship(REL_TYPE_SETTINGS, "settings.xml")?;
        pkg.declare_content_type(SETTINGS, CT_SETTINGS)?;
    }
    Ok(())
}

/// One complete footer part. Odd (the `default` footer) is right-aligned
/// with a leading full-width space; even is left-aligned with a trailing
/// one. Both hold `— <PAGE> —` in the configured footer font.
fn footer_part(odd: bool, style: &FooterStyle) -> XmlDocument {
    let mut p = XmlElement::new("w:p");
    let align = if odd { Alignment::Right } else { Alignment::Left };
    p.push(
        XmlElement::new("w:pPr")
            .with_child(XmlElement::new("w:jc").with_attr("w:val", align.jc_val())),
    );

    if odd {
        p.push(text_run(FULL_WIDTH_SPACE, style));
    }
    p.push(text_run("— ", style));
    for run in page_field_runs(style) {
        p.push(run);
    }
    p.push(text_run(" —", style));
    if !odd {
        p.push(text_run(FULL_WIDTH_SPACE, style));
    }

    let root = XmlElement::new("w:ftr")
        .with_attr("xmlns:w", WML_NS)
        .with_attr("xmlns:r", REL_NS)
        .with_child(p);
    XmlDocument { root }
}

fn run_props(style: &FooterStyle) -> XmlElement {
    let half = node::pts_to_half(style.size).to_string();
    XmlElement::new("w:rPr")
        .with_child(
            XmlElement::new("w:rFonts")
                .with_attr("w:ascii", &style.latin_font)
                .with_attr("w:hAnsi", &style.latin_font)
                .with_attr("w:eastAsia", &style.cjk_font),
        )
        .with_child(XmlElement::new("w:sz").with_attr("w:val", &half))
        .with_child(XmlElement::new("w:szCs").with_attr("w:val", &half))
}

fn text_run(text: &str, style: &FooterStyle) -> XmlElement {
    XmlElement::new("w:r")
        .with_child(run_props(style))
        .with_child(node::make_text(text))
}

/// The live page number: a begin/instruction/end field character triple.
fn page_field_runs(style: &FooterStyle) -> Vec<XmlElement> {
    let begin = XmlElement::new("w:r")
        .with_child(run_props(style))
        .with_child(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "begin"));
    let instr = XmlElement::new("w:r").with_child(run_props(style)).with_child(
        XmlElement::new("w:instrText")
            .with_attr("xml:space", "preserve")
            .with_text("PAGE"),
    );
    let end = XmlElement::new("w:r")
        .with_child(run_props(style))
        .with_child(XmlElement::new("w:fldChar").with_attr("w:fldCharType", "end"));
    vec![begin, instr, end]
}
