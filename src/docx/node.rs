//! Typed accessors and mutators over WML elements.
//!
//! These work directly on the editable tree: readers mirror how Word
//! resolves inline properties, writers keep property-container children in
//! schema order so strict consumers accept the output.

use crate::model::{Alignment, LineSpacing};

use super::xml::{XmlElement, XmlNode};

/// Child order of `w:pPr` (trimmed to the elements this crate writes or
/// commonly encounters).
const PPR_ORDER: &[&str] = &[
    "w:pStyle",
    "w:keepNext",
    "w:keepLines",
    "w:pageBreakBefore",
    "w:framePr",
    "w:widowControl",
    "w:numPr",
    "w:pBdr",
    "w:shd",
    "w:tabs",
    "w:snapToGrid",
    "w:spacing",
    "w:ind",
    "w:contextualSpacing",
    "w:jc",
    "w:outlineLvl",
    "w:rPr",
    "w:sectPr",
];

const RPR_ORDER: &[&str] = &[
    "w:rStyle",
    "w:rFonts",
    "w:b",
    "w:bCs",
    "w:i",
    "w:iCs",
    "w:caps",
    "w:smallCaps",
    "w:strike",
    "w:dstrike",
    "w:vanish",
    "w:color",
    "w:spacing",
    "w:kern",
    "w:sz",
    "w:szCs",
    "w:highlight",
    "w:u",
    "w:shd",
    "w:vertAlign",
    "w:lang",
];

const TBLPR_ORDER: &[&str] = &[
    "w:tblStyle",
    "w:tblpPr",
    "w:tblW",
    "w:jc",
    "w:tblCellSpacing",
    "w:tblInd",
    "w:tblBorders",
    "w:shd",
    "w:tblLayout",
    "w:tblCellMar",
    "w:tblLook",
];

const TCPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:tcW",
    "w:gridSpan",
    "w:vMerge",
    "w:tcBorders",
    "w:shd",
    "w:noWrap",
    "w:tcMar",
    "w:textDirection",
    "w:vAlign",
];

const TRPR_ORDER: &[&str] = &[
    "w:cnfStyle",
    "w:gridBefore",
    "w:gridAfter",
    "w:cantSplit",
    "w:trHeight",
    "w:tblHeader",
    "w:jc",
];

pub(crate) fn pts_to_twips(pts: f32) -> i64 {
    (pts * 20.0).round() as i64
}

pub(crate) fn pts_to_half(pts: f32) -> i64 {
    (pts * 2.0).round() as i64
}

pub(crate) fn cm_to_twips(cm: f32) -> i64 {
    (cm * 1440.0 / 2.54).round() as i64
}

/// `w:pPr`, created as the first child if missing.
fn ensure_ppr(p: &mut XmlElement) -> &mut XmlElement {
    if p.child("w:pPr").is_none() {
        p.insert(0, XmlElement::new("w:pPr"));
    }
    p.child_mut("w:pPr").unwrap()
}

fn ensure_rpr(r: &mut XmlElement) -> &mut XmlElement {
    if r.child("w:rPr").is_none() {
        r.insert(0, XmlElement::new("w:rPr"));
    }
    r.child_mut("w:rPr").unwrap()
}

/// Visible text of a paragraph: concatenation of descendant `w:t` content.
/// Field instructions (`w:instrText`) and deleted text are not visible.
pub fn para_text(p: &XmlElement) -> String {
    let mut out = String::new();
    collect_wt(p, &mut out);
    out
}

fn collect_wt(el: &XmlElement, out: &mut String) {
    for child in el.elements() {
        if child.name == "w:t" {
            out.push_str(&child.text());
        } else if child.name != "w:instrText" && child.name != "w:delText" {
            collect_wt(child, out);
        }
    }
}

pub fn is_paragraph(el: &XmlElement) -> bool {
    el.name == "w:p"
}

pub fn is_table(el: &XmlElement) -> bool {
    el.name == "w:tbl"
}

pub fn is_blank_paragraph(el: &XmlElement) -> bool {
    is_paragraph(el) && para_text(el).trim().is_empty()
}

/// Original `w:jc` of the paragraph, if any was set inline.
pub fn alignment(p: &XmlElement) -> Option<Alignment> {
    p.child("w:pPr")
        .and_then(|ppr| ppr.child("w:jc"))
        .and_then(|jc| jc.attr("w:val"))
        .map(Alignment::from_jc)
}

pub fn set_alignment(p: &mut XmlElement, align: Alignment) {
    let ppr = ensure_ppr(p);
    ppr.ensure_child_ordered("w:jc", PPR_ORDER)
        .set_attr("w:val", align.jc_val());
}

/// Set first-line indent and zero out left/right/hanging indents.
pub fn set_indent(p: &mut XmlElement, first_line_pts: f32) {
    let ppr = ensure_ppr(p);
    let ind = ppr.ensure_child_ordered("w:ind", PPR_ORDER);
    ind.set_attr("w:left", "0");
    ind.set_attr("w:right", "0");
    ind.remove_attr("w:hanging");
    ind.set_attr("w:firstLine", &pts_to_twips(first_line_pts).to_string());
}

pub fn set_line_spacing(p: &mut XmlElement, spacing: LineSpacing) {
    let ppr = ensure_ppr(p);
    let sp = ppr.ensure_child_ordered("w:spacing", PPR_ORDER);
    match spacing {
        LineSpacing::Exact(pts) => {
            sp.set_attr("w:line", &pts_to_twips(pts).to_string());
            sp.set_attr("w:lineRule", "exact");
        }
        LineSpacing::Multiple(factor) => {
            // 240 twentieths = single spacing
            sp.set_attr("w:line", &((factor * 240.0).round() as i64).to_string());
            sp.set_attr("w:lineRule", "auto");
        }
    }
}

pub fn set_space_around(p: &mut XmlElement, before_pts: f32, after_pts: f32) {
    let ppr = ensure_ppr(p);
    let sp = ppr.ensure_child_ordered("w:spacing", PPR_ORDER);
    sp.set_attr("w:before", &pts_to_twips(before_pts).to_string());
    sp.set_attr("w:after", &pts_to_twips(after_pts).to_string());
}

/// Space before the paragraph in hundredths of a line (`w:beforeLines`),
/// which scales with the paragraph's own line height.
pub fn set_space_before_lines(p: &mut XmlElement, hundredths: i64) {
    let ppr = ensure_ppr(p);
    let sp = ppr.ensure_child_ordered("w:spacing", PPR_ORDER);
    sp.set_attr("w:beforeLines", &hundredths.to_string());
}

/// Strip paragraph-level shading left over from pasted content.
pub fn remove_para_shading(p: &mut XmlElement) {
    if let Some(ppr) = p.child_mut("w:pPr") {
        ppr.remove_children("w:shd");
    }
}

pub fn runs_mut(p: &mut XmlElement) -> Vec<&mut XmlElement> {
    // Runs may sit under w:hyperlink or w:sdt wrappers as well as directly
    // under the paragraph.
    fn collect<'a>(el: &'a mut XmlElement, out: &mut Vec<&'a mut XmlElement>) {
        for child in el.elements_mut() {
            if child.name == "w:r" {
                out.push(child);
            } else if child.name == "w:hyperlink" || child.name == "w:sdt"
                || child.name == "w:sdtContent" || child.name == "w:smartTag"
            {
                collect(child, out);
            }
        }
    }
    let mut out = Vec::new();
    collect(p, &mut out);
    out
}

/// Rewrite one run's character formatting to the normalized shape: explicit
/// CJK + Latin faces, explicit size, requested weight, everything else
/// (italic, underline, strike, vertical alignment, highlight, shading)
/// cleared and the color forced to black.
pub fn normalize_run(r: &mut XmlElement, cjk: &str, latin: &str, size_pts: f32, bold: bool) {
    let rpr = ensure_rpr(r);

    let fonts = rpr.ensure_child_ordered("w:rFonts", RPR_ORDER);
    fonts.set_attr("w:ascii", latin);
    fonts.set_attr("w:hAnsi", latin);
    fonts.set_attr("w:eastAsia", cjk);
    fonts.remove_attr("w:asciiTheme");
    fonts.remove_attr("w:hAnsiTheme");
    fonts.remove_attr("w:eastAsiaTheme");

    if bold {
        rpr.ensure_child_ordered("w:b", RPR_ORDER).attrs.clear();
        rpr.ensure_child_ordered("w:bCs", RPR_ORDER).attrs.clear();
    } else {
        rpr.remove_children("w:b");
        rpr.remove_children("w:bCs");
    }

    for cleared in [
        "w:i",
        "w:iCs",
        "w:u",
        "w:strike",
        "w:dstrike",
        "w:vertAlign",
        "w:highlight",
        "w:shd",
        "w:em",
    ] {
        rpr.remove_children(cleared);
    }

    rpr.ensure_child_ordered("w:color", RPR_ORDER)
        .set_attr("w:val", "000000");

    let half = pts_to_half(size_pts).to_string();
    rpr.ensure_child_ordered("w:sz", RPR_ORDER).set_attr("w:val", &half);
    rpr.ensure_child_ordered("w:szCs", RPR_ORDER)
        .set_attr("w:val", &half);
}

/// A plain run holding `text`, optionally bold. Whitespace-significant text
/// gets `xml:space="preserve"`.
pub fn make_run(text: &str, bold: bool) -> XmlElement {
    let mut r = XmlElement::new("w:r");
    if bold {
        let rpr = XmlElement::new("w:rPr")
            .with_child(XmlElement::new("w:b"))
            .with_child(XmlElement::new("w:bCs"));
        r.push(rpr);
    }
    r.push(make_text(text));
    r
}

pub fn make_text(text: &str) -> XmlElement {
    let mut t = XmlElement::new("w:t").with_text(text);
    if text != text.trim() {
        t.set_attr("xml:space", "preserve");
    }
    t
}

/// A paragraph holding a single plain run (or no run for empty text).
pub fn make_paragraph(text: &str) -> XmlElement {
    let mut p = XmlElement::new("w:p");
    if !text.is_empty() {
        p.push(make_run(text, false));
    }
    p
}

/// Replace a paragraph's entire run content with plain runs, keeping `w:pPr`
/// and dropping everything else (the split sub-behaviors own the paragraph
/// once they fire).
pub fn replace_runs(p: &mut XmlElement, segments: &[(String, bool)]) {
    p.children.retain(|n| match n {
        XmlNode::Element(el) => el.name == "w:pPr",
        _ => false,
    });
    for (text, bold) in segments {
        if !text.is_empty() {
            p.push(make_run(text, *bold));
        }
    }
}

// --- tables ---

pub fn table_rows(tbl: &XmlElement) -> Vec<&XmlElement> {
    tbl.children_named("w:tr").collect()
}

pub fn row_cells(tr: &XmlElement) -> Vec<&XmlElement> {
    tr.children_named("w:tc").collect()
}

pub fn cell_text(tc: &XmlElement) -> String {
    let mut out = String::new();
    for p in tc.children_named("w:p") {
        out.push_str(&para_text(p));
    }
    out
}

fn ensure_tblpr(tbl: &mut XmlElement) -> &mut XmlElement {
    if tbl.child("w:tblPr").is_none() {
        tbl.insert(0, XmlElement::new("w:tblPr"));
    }
    tbl.child_mut("w:tblPr").unwrap()
}

fn single_border(sz_eighths: i64) -> XmlElement {
    XmlElement::new("")
        .with_attr("w:val", "single")
        .with_attr("w:sz", &sz_eighths.to_string())
        .with_attr("w:space", "0")
        .with_attr("w:color", "000000")
}

fn border_set(container: &mut XmlElement, edges: &[&str], sz_eighths: i64) {
    container.children.clear();
    for edge in edges {
        let mut b = single_border(sz_eighths);
        b.name = edge.to_string();
        container.push(b);
    }
}

/// Uniform single-stroke border on all four edges plus the interior grid.
pub fn set_table_borders(tbl: &mut XmlElement, stroke_pts: f32) {
    let sz = (stroke_pts * 8.0).round() as i64;
    let tblpr = ensure_tblpr(tbl);
    let borders = tblpr.ensure_child_ordered("w:tblBorders", TBLPR_ORDER);
    border_set(
        borders,
        &["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"],
        sz,
    );
}

/// Table width as a percentage of the content width (`w:tblW` counts in
/// fiftieths of a percent).
pub fn set_table_width_pct(tbl: &mut XmlElement, pct: f32) {
    let tblpr = ensure_tblpr(tbl);
    let w = tblpr.ensure_child_ordered("w:tblW", TBLPR_ORDER);
    w.set_attr("w:w", &((pct * 50.0).round() as i64).to_string());
    w.set_attr("w:type", "pct");
}

pub fn set_table_indent_zero(tbl: &mut XmlElement) {
    let tblpr = ensure_tblpr(tbl);
    let ind = tblpr.ensure_child_ordered("w:tblInd", TBLPR_ORDER);
    ind.set_attr("w:w", "0");
    ind.set_attr("w:type", "dxa");
}

pub fn set_cell_margins(tbl: &mut XmlElement, top: f32, bottom: f32, left: f32, right: f32) {
    let tblpr = ensure_tblpr(tbl);
    let mar = tblpr.ensure_child_ordered("w:tblCellMar", TBLPR_ORDER);
    mar.children.clear();
    for (edge, pts) in [
        ("w:top", top),
        ("w:left", left),
        ("w:bottom", bottom),
        ("w:right", right),
    ] {
        let m = XmlElement::new(edge)
            .with_attr("w:w", &pts_to_twips(pts).to_string())
            .with_attr("w:type", "dxa");
        mar.push(m);
    }
}

/// Replace the column grid. `w:tblGrid` sits between `w:tblPr` and the rows.
pub fn set_table_grid(tbl: &mut XmlElement, widths_twips: &[i64]) {
    tbl.remove_children("w:tblGrid");
    let mut grid = XmlElement::new("w:tblGrid");
    for w in widths_twips {
        grid.push(XmlElement::new("w:gridCol").with_attr("w:w", &w.to_string()));
    }
    let at = tbl
        .children
        .iter()
        .position(|n| matches!(n, XmlNode::Element(el) if el.name == "w:tr"))
        .unwrap_or(tbl.children.len());
    tbl.children.insert(at, XmlNode::Element(grid));
}

fn ensure_tcpr(tc: &mut XmlElement) -> &mut XmlElement {
    if tc.child("w:tcPr").is_none() {
        tc.insert(0, XmlElement::new("w:tcPr"));
    }
    tc.child_mut("w:tcPr").unwrap()
}

pub fn set_cell_width(tc: &mut XmlElement, twips: i64) {
    let tcpr = ensure_tcpr(tc);
    let w = tcpr.ensure_child_ordered("w:tcW", TCPR_ORDER);
    w.set_attr("w:w", &twips.to_string());
    w.set_attr("w:type", "dxa");
}

pub fn set_cell_borders(tc: &mut XmlElement, stroke_pts: f32) {
    let sz = (stroke_pts * 8.0).round() as i64;
    let tcpr = ensure_tcpr(tc);
    let borders = tcpr.ensure_child_ordered("w:tcBorders", TCPR_ORDER);
    border_set(borders, &["w:top", "w:left", "w:bottom", "w:right"], sz);
}

pub fn set_row_height_at_least(tr: &mut XmlElement, pts: f32) {
    if tr.child("w:trPr").is_none() {
        tr.insert(0, XmlElement::new("w:trPr"));
    }
    let trpr = tr.child_mut("w:trPr").unwrap();
    let h = trpr.ensure_child_ordered("w:trHeight", TRPR_ORDER);
    h.set_attr("w:val", &pts_to_twips(pts).to_string());
    h.set_attr("w:hRule", "atLeast");
}

// --- sections ---

const SECTPR_ORDER: &[&str] = &[
    "w:headerReference",
    "w:footerReference",
    "w:footnotePr",
    "w:endnotePr",
    "w:type",
    "w:pgSz",
    "w:pgMar",
    "w:pgBorders",
    "w:pgNumType",
    "w:cols",
    "w:titlePg",
    "w:docGrid",
];

/// A4 portrait in twips, the default when `w:pgSz` is absent.
const DEFAULT_PAGE_WIDTH: f32 = 11906.0;

pub fn set_margins(sect: &mut XmlElement, top_cm: f32, bottom_cm: f32, left_cm: f32, right_cm: f32) {
    let mar = sect.ensure_child_ordered("w:pgMar", SECTPR_ORDER);
    mar.set_attr("w:top", &cm_to_twips(top_cm).to_string());
    mar.set_attr("w:bottom", &cm_to_twips(bottom_cm).to_string());
    mar.set_attr("w:left", &cm_to_twips(left_cm).to_string());
    mar.set_attr("w:right", &cm_to_twips(right_cm).to_string());
}

/// Width between the margins, in twips, for sizing table columns.
pub fn content_width_twips(sect: &XmlElement) -> f32 {
    let page_w = sect
        .child("w:pgSz")
        .and_then(|n| n.attr("w:w"))
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(DEFAULT_PAGE_WIDTH);
    let mar = sect.child("w:pgMar");
    let left = mar
        .and_then(|m| m.attr("w:left"))
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(1800.0);
    let right = mar
        .and_then(|m| m.attr("w:right"))
        .and_then(|v| v.parse::<f32>().ok())
        .unwrap_or(1800.0);
    (page_w - left - right).max(1.0)
}

/// Relationship id of an existing footer reference of the given type.
pub fn footer_reference(sect: &XmlElement, kind: &str) -> Option<String> {
    sect.children_named("w:footerReference")
        .find(|el| el.attr("w:type") == Some(kind))
        .and_then(|el| el.attr("r:id"))
        .map(|s| s.to_string())
}

/// Point the section's footer reference of `kind` at `rid`, replacing any
/// existing reference of that type. References lead the `w:sectPr` content.
pub fn set_footer_reference(sect: &mut XmlElement, kind: &str, rid: &str) {
    if let Some(existing) = sect
        .children_named_mut("w:footerReference")
        .find(|el| el.attr("w:type") == Some(kind))
    {
        existing.set_attr("r:id", rid);
        return;
    }
    let fr = XmlElement::new("w:footerReference")
        .with_attr("w:type", kind)
        .with_attr("r:id", rid);
    let at = sect
        .children
        .iter()
        .position(|n| {
            !matches!(n, XmlNode::Element(el)
                if el.name == "w:headerReference" || el.name == "w:footerReference")
        })
        .unwrap_or(sect.children.len());
    sect.children.insert(at, XmlNode::Element(fr));
}
