//! The formatting pipeline.
//!
//! Stage order is load-bearing: headings are split first, then the
//! paragraph texts are snapshotted, and only then does mutation begin.
//! Classification always reads the frozen snapshot, since the
//! position-dependent rules (leading-zone titles, trailing-zone signatures)
//! would misfire if paragraphs shifted underneath them mid-scan.

pub mod classify;
pub mod footer;
pub mod split;
pub mod style;
pub mod table;

use crate::docx::xml::XmlElement;
use crate::docx::{WordPackage, node};
use crate::error::Result;
use crate::model::Summary;
use crate::preset::{PageMargins, Preset};

/// Run the whole pipeline over an opened package: split fused headings,
/// classify and restyle every paragraph, rebalance tables, rebuild footers.
/// Nothing is persisted here; the caller owns the save.
pub fn run(pkg: &mut WordPackage, preset: &Preset) -> Result<Summary> {
    log::info!("preset: {}", preset.name);

    pkg.document.root.remove_children("w:background");

    let body = pkg.body_mut()?;
    let splits = split::split_headings(body);
    if splits > 0 {
        log::info!("split {splits} fused heading paragraph(s)");
    }

    // Frozen snapshot for the classifier, taken after splitting and before
    // any styling.
    let snapshot: Vec<String> = body
        .children_named("w:p")
        .map(node::para_text)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect();
    let total = body.children_named("w:p").count();

    set_section_margins(body, &preset.margins);

    let mut summary = Summary::default();
    let mut index = 0usize;
    for el in body.elements_mut() {
        if !node::is_paragraph(el) {
            continue;
        }
        let i = index;
        index += 1;

        let text = node::para_text(el);
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let role = classify::classify(text, i, total, node::alignment(el), &snapshot);
        style::apply(el, preset.style_for(role), role, preset);
        summary.record(role);
        log::debug!("[{:<10}] {}", role.name(), preview(text));
    }
    log::info!("styled {} paragraph(s)", summary.total());

    let content_width = body
        .child("w:sectPr")
        .map(node::content_width_twips)
        .unwrap_or(9000.0) as f64;
    let tables = table::layout_tables(body, &preset.table, content_width);
    if tables > 0 {
        log::info!("laid out {tables} table(s)");
    }

    if preset.page_numbers {
        footer::build_footers(pkg, &preset.footer)?;
    }

    Ok(summary)
}

/// Apply the preset margins to every section, including mid-document
/// sections carried inside a paragraph's `w:pPr`.
fn set_section_margins(body: &mut XmlElement, margins: &PageMargins) {
    body.ensure_child("w:sectPr");
    for p in body.elements_mut() {
        if node::is_paragraph(p)
            && let Some(sect) = p
                .child_mut("w:pPr")
                .and_then(|pr| pr.child_mut("w:sectPr"))
        {
            node::set_margins(sect, margins.top, margins.bottom, margins.left, margins.right);
        }
    }
    let sect = body.child_mut("w:sectPr").unwrap();
    node::set_margins(sect, margins.top, margins.bottom, margins.left, margins.right);
}

fn preview(text: &str) -> String {
    let mut out: String = text.chars().take(35).collect();
    if text.chars().count() > 35 {
        out.push('…');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docx::xml;

    #[test]
    fn margins_written_in_twips() {
        let src = "<w:body><w:p/><w:sectPr><w:pgSz w:w=\"11906\" w:h=\"16838\"/></w:sectPr></w:body>";
        let mut body = xml::parse("test", src).unwrap().root;
        let margins = PageMargins {
            top: 3.7,
            bottom: 3.5,
            left: 2.8,
            right: 2.6,
        };
        set_section_margins(&mut body, &margins);
        let mar = body.child("w:sectPr").unwrap().child("w:pgMar").unwrap();
        // 3.7 cm = 2098 twips
        assert_eq!(mar.attr("w:top"), Some("2098"));
        assert_eq!(mar.attr("w:left"), Some("1587"));
    }

    #[test]
    fn missing_sectpr_is_created_at_body_end() {
        let src = "<w:body><w:p/></w:body>";
        let mut body = xml::parse("test", src).unwrap().root;
        set_section_margins(
            &mut body,
            &PageMargins {
                top: 2.0,
                bottom: 2.0,
                left: 2.0,
                right: 2.0,
            },
        );
        let names: Vec<&str> = body.elements().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["w:p", "w:sectPr"]);
    }

    #[test]
    fn preview_truncates_long_text() {
        let long: String = "长".repeat(40);
        assert_eq!(preview(&long).chars().count(), 36);
        assert_eq!(preview("短文本"), "短文本");
    }
}
