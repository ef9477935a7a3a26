//! Table layout engine.
//!
//! Rebuilds every table's frame, grid, and cell formatting: uniform borders,
//! percentage width, content-weighted column balancing inside a clamp band,
//! and a per-cell alignment policy driven by what the cell holds. Around the
//! table it styles caption paragraphs and guarantees a single blank
//! separator paragraph on each side.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::docx::node;
use crate::docx::xml::{XmlElement, XmlNode};
use crate::model::{Alignment, LineSpacing};
use crate::preset::TableStyle;

static NUMERIC: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+(\.\d+)?[%％]?$").unwrap());
static TABLE_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^表\s*[0-9０-９一二三四五六七八九十]+").unwrap());
static UNIT_NOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^单位[：:]").unwrap());

/// Space before a unit-note caption, in hundredths of a line.
const UNIT_NOTE_BEFORE_LINES: i64 = 50;

/// Lay out every table in the body. `content_width_twips` is the section
/// width between the margins, used to convert column percentages into grid
/// widths. Returns the number of tables touched.
pub fn layout_tables(body: &mut XmlElement, style: &TableStyle, content_width_twips: f64) -> usize {
    let mut count = 0;
    for el in body.elements_mut() {
        if node::is_table(el) {
            layout_one(el, style, content_width_twips);
            count += 1;
        }
    }
    style_captions(body, style);
    separate_tables(body);
    count
}

fn layout_one(tbl: &mut XmlElement, style: &TableStyle, content_width_twips: f64) {
    let rows = node::table_rows(tbl);
    if rows.is_empty() {
        // Degenerate tables are tolerated, never fatal.
        return;
    }

    // Read-only scan: column count, header texts, per-column text weights.
    let mut col_count = 0usize;
    for row in &rows {
        let mut cols = 0usize;
        for cell in node::row_cells(row) {
            cols += grid_span(cell);
        }
        col_count = col_count.max(cols);
    }
    if col_count == 0 {
        return;
    }

    let header_texts: Vec<String> = {
        let mut texts = vec![String::new(); col_count];
        let mut col = 0usize;
        for cell in node::row_cells(rows[0]) {
            if col < col_count {
                texts[col] = node::cell_text(cell).trim().to_string();
            }
            col += grid_span(cell);
        }
        texts
    };
    let serial_col: Vec<bool> = header_texts
        .iter()
        .map(|h| h.contains("序号") || h.contains('序'))
        .collect();

    let mut weights = vec![0.0f64; col_count];
    for row in &rows {
        let mut col = 0usize;
        for cell in node::row_cells(row) {
            let span = grid_span(cell);
            let w = text_weight(&node::cell_text(cell)) / span as f64;
            for c in col..(col + span).min(col_count) {
                if w > weights[c] {
                    weights[c] = w;
                }
            }
            col += span;
        }
    }
    for w in weights.iter_mut() {
        // Empty columns still get a sliver of width.
        *w = w.max(1.0);
    }
    drop(rows);

    // Table frame.
    node::set_table_borders(tbl, style.border_width);
    node::set_table_width_pct(tbl, style.width_pct);
    node::set_table_indent_zero(tbl);
    node::set_cell_margins(
        tbl,
        style.margin_top,
        style.margin_bottom,
        style.margin_left,
        style.margin_right,
    );

    let col_twips: Option<Vec<i64>> = style.auto_fit_columns.then(|| {
        let pcts = balanced_columns(&weights, style.min_col_pct, style.max_col_pct);
        pcts.iter()
            .map(|p| (content_width_twips * p / 100.0).round() as i64)
            .collect()
    });
    if let Some(ref widths) = col_twips {
        node::set_table_grid(tbl, widths);
    }

    // Mutation pass over rows and cells.
    let mut row_idx = 0usize;
    for tr in tbl.children_named_mut("w:tr") {
        if let Some(h) = style.min_row_height {
            node::set_row_height_at_least(tr, h);
        }
        let header = row_idx == 0;
        let mut col = 0usize;
        for tc in tr.children_named_mut("w:tc") {
            let span = grid_span(tc);
            if let Some(ref widths) = col_twips {
                let lo = col.min(widths.len() - 1);
                let hi = (col + span).clamp(lo + 1, widths.len());
                let width: i64 = widths[lo..hi].iter().sum();
                node::set_cell_width(tc, width);
            }
            node::set_cell_borders(tc, style.border_width);

            let text = node::cell_text(tc).trim().to_string();
            let serial = serial_col.get(col).copied().unwrap_or(false);
            let align = cell_alignment(&text, header, serial, style.short_text_len);
            format_cell_content(tc, style, align, header);
            col += span;
        }
        row_idx += 1;
    }
}

fn grid_span(tc: &XmlElement) -> usize {
    tc.child("w:tcPr")
        .and_then(|pr| pr.child("w:gridSpan"))
        .and_then(|gs| gs.attr("w:val"))
        .and_then(|v| v.parse::<usize>().ok())
        .unwrap_or(1)
        .max(1)
}

/// Column-sizing score: ASCII counts half, everything else (CJK) full width.
fn text_weight(text: &str) -> f64 {
    text.trim()
        .chars()
        .map(|ch| if ch.is_ascii() { 0.5 } else { 1.0 })
        .sum()
}

/// Normalize weights to percentages, clamp each into `[min, max]` with
/// proportional redistribution, and round so the result sums to exactly 100
/// (the last column absorbs rounding drift).
///
/// When the band itself is infeasible (n·min > 100 or n·max < 100) a single
/// clamp-and-renormalize pass runs instead; percentages then still sum to
/// 100 but may leave the band.
pub(crate) fn balanced_columns(weights: &[f64], min: f64, max: f64) -> Vec<f64> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: f64 = weights.iter().sum::<f64>().max(f64::MIN_POSITIVE);
    let mut pcts: Vec<f64> = weights.iter().map(|w| w / total * 100.0).collect();

    let feasible = n as f64 * min <= 100.0 && n as f64 * max >= 100.0;
    if feasible {
        for _ in 0..n {
            for p in pcts.iter_mut() {
                *p = p.clamp(min, max);
            }
            let sum: f64 = pcts.iter().sum();
            let diff = sum - 100.0;
            if diff.abs() < 1e-9 {
                break;
            }
            if diff > 0.0 {
                let room: f64 = pcts.iter().map(|p| p - min).sum();
                if room <= 0.0 {
                    break;
                }
                for p in pcts.iter_mut() {
                    *p -= diff * (*p - min) / room;
                }
            } else {
                let room: f64 = pcts.iter().map(|p| max - *p).sum();
                if room <= 0.0 {
                    break;
                }
                for p in pcts.iter_mut() {
                    *p += (-diff) * (max - *p) / room;
                }
            }
        }
    } else {
        for p in pcts.iter_mut() {
            *p = p.clamp(min, max);
        }
        let sum: f64 = pcts.iter().sum();
        for p in pcts.iter_mut() {
            *p *= 100.0 / sum;
        }
    }

    // Round in basis points so the invariant is exact, not approximate.
    let mut bp: Vec<i64> = pcts.iter().map(|p| (p * 100.0).round() as i64).collect();
    let drift: i64 = 10_000 - bp.iter().sum::<i64>();
    *bp.last_mut().unwrap() += drift;
    bp.iter().map(|b| *b as f64 / 100.0).collect()
}

/// The alignment policy, evaluated in order.
fn cell_alignment(text: &str, header: bool, serial_col: bool, short_len: usize) -> Alignment {
    if header {
        return Alignment::Center;
    }
    if text.contains("合计") || text.contains("总计") {
        return Alignment::Center;
    }
    if serial_col {
        return Alignment::Center;
    }
    let stripped: String = text.chars().filter(|c| *c != ',' && *c != '，').collect();
    if !stripped.is_empty() && NUMERIC.is_match(&stripped) {
        return Alignment::Right;
    }
    if text.chars().count() <= short_len {
        return Alignment::Center;
    }
    Alignment::Left
}

fn format_cell_content(tc: &mut XmlElement, style: &TableStyle, align: Alignment, header: bool) {
    let bold = header && style.header_bold;
    let spacing = style
        .line_spacing
        .map(LineSpacing::Exact)
        .unwrap_or(LineSpacing::Multiple(1.0));
    for p in tc.children_named_mut("w:p") {
        node::set_alignment(p, align);
        node::set_indent(p, style.first_line_indent);
        node::set_space_around(p, 0.0, 0.0);
        node::set_line_spacing(p, spacing);
        for r in node::runs_mut(p) {
            node::normalize_run(r, &style.cjk_font, &style.latin_font, style.size, bold);
        }
    }
}

/// Caption paragraphs adjacent to a table: a `表N` title right before it and
/// a `单位：` note right after it. Blank separators inserted by earlier runs
/// are skipped when looking for them.
fn style_captions(body: &mut XmlElement, style: &TableStyle) {
    let mut plans: Vec<(usize, bool)> = Vec::new();
    let children = &body.children;
    for (i, child) in children.iter().enumerate() {
        let XmlNode::Element(el) = child else { continue };
        if !node::is_table(el) {
            continue;
        }
        if let Some(j) = neighbor(children, i, -1)
            && let XmlNode::Element(p) = &children[j]
            && node::is_paragraph(p)
            && TABLE_TITLE.is_match(node::para_text(p).trim())
        {
            plans.push((j, true));
        }
        if let Some(j) = neighbor(children, i, 1)
            && let XmlNode::Element(p) = &children[j]
            && node::is_paragraph(p)
            && UNIT_NOTE.is_match(node::para_text(p).trim())
        {
            plans.push((j, false));
        }
    }
    for (j, is_title) in plans {
        let Some(XmlNode::Element(p)) = body.children.get_mut(j) else {
            continue;
        };
        if is_title {
            node::set_alignment(p, Alignment::Center);
            node::set_indent(p, 0.0);
            node::set_line_spacing(p, LineSpacing::Multiple(1.0));
            for r in node::runs_mut(p) {
                node::normalize_run(r, &style.cjk_font, &style.latin_font, style.size, true);
            }
        } else {
            node::set_alignment(p, Alignment::Right);
            node::set_indent(p, 0.0);
            node::set_space_before_lines(p, UNIT_NOTE_BEFORE_LINES);
            for r in node::runs_mut(p) {
                node::normalize_run(r, &style.cjk_font, &style.latin_font, style.size, false);
            }
        }
    }
}

/// Nearest non-blank neighbor in the given direction, skipping blank
/// paragraphs (at most one in well-formed output).
fn neighbor(children: &[XmlNode], from: usize, dir: isize) -> Option<usize> {
    let mut i = from as isize + dir;
    while i >= 0 && (i as usize) < children.len() {
        match &children[i as usize] {
            XmlNode::Element(el) if node::is_blank_paragraph(el) => i += dir,
            XmlNode::Element(_) => return Some(i as usize),
            _ => i += dir,
        }
    }
    None
}

/// Ensure exactly one blank paragraph between each table and any non-blank
/// neighbor. Inserts only when the adjacent block is non-blank, so repeat
/// runs do not accumulate separators.
fn separate_tables(body: &mut XmlElement) {
    let table_indices: Vec<usize> = body
        .children
        .iter()
        .enumerate()
        .filter_map(|(i, n)| match n {
            XmlNode::Element(el) if node::is_table(el) => Some(i),
            _ => None,
        })
        .collect();

    for &i in table_indices.iter().rev() {
        let needs_after = match body.children.get(i + 1) {
            Some(XmlNode::Element(el)) => !node::is_blank_paragraph(el),
            Some(_) => false,
            None => false,
        };
        if needs_after {
            body.insert(i + 1, node::make_paragraph(""));
        }
        let needs_before = i > 0
            && match &body.children[i - 1] {
                XmlNode::Element(el) => !node::is_blank_paragraph(el),
                _ => false,
            };
        if needs_before {
            body.insert(i, node::make_paragraph(""));
        }
    }
}
