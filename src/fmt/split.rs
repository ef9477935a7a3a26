//! Heading splitter pre-pass.
//!
//! A common defect in source documents is a heading and its body text fused
//! into one paragraph: `（二）加强宣传教育，营造良好氛围。`. The splitter
//! detaches the body part into its own paragraph before classification so
//! each piece gets its proper role.

use crate::docx::node;
use crate::docx::xml::{XmlElement, XmlNode};

use super::classify::heading_marker_len;

/// Separators that end the heading part. A comma is rewritten to a full
/// stop on the heading side; colons and full stops are kept as-is.
const SEPARATORS: [char; 4] = ['：', ':', '。', '，'];

/// Decide whether `text` should split, returning `(heading, remainder)`.
/// Only paragraphs starting with a heading marker are candidates, and only
/// when non-empty text follows the first separator.
pub(crate) fn split_text(text: &str) -> Option<(String, String)> {
    let marker_end = heading_marker_len(text)?;
    let remainder = &text[marker_end..];
    let (at, sep) = remainder
        .char_indices()
        .find(|(_, ch)| SEPARATORS.contains(ch))?;
    let tail = &remainder[at + sep.len_utf8()..];
    if tail.trim().is_empty() {
        return None;
    }
    let kept = if sep == '，' { '。' } else { sep };
    let head = format!("{}{}{}", &text[..marker_end], &remainder[..at], kept);
    Some((head, tail.to_string()))
}

/// Run the splitter over every paragraph of the body. Candidates are
/// collected from a snapshot first and the insertions applied back-to-front,
/// so shifting indices never invalidate the scan and freshly inserted
/// paragraphs are not re-examined.
pub fn split_headings(body: &mut XmlElement) -> usize {
    let mut plans: Vec<(usize, String, String)> = Vec::new();
    for (i, child) in body.children.iter().enumerate() {
        let XmlNode::Element(el) = child else { continue };
        if !node::is_paragraph(el) {
            continue;
        }
        let text = node::para_text(el);
        if let Some((head, tail)) = split_text(text.trim()) {
            plans.push((i, head, tail));
        }
    }
    let count = plans.len();
    for (i, head, tail) in plans.into_iter().rev() {
        if let Some(XmlNode::Element(el)) = body.children.get_mut(i) {
            node::replace_runs(el, &[(head, false)]);
            body.insert(i + 1, node::make_paragraph(&tail));
        }
    }
    count
}
