//! Style applicator: rewrites one paragraph to its role's StyleSpec.
//!
//! Formatting is normalized, not extended. Decorations the preset never
//! asks for (italic, underline, strikethrough, highlights, odd colors) are
//! stripped so the output is uniform regardless of what the source carried.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::docx::node;
use crate::docx::xml::XmlElement;
use crate::model::{LineSpacing, Role};
use crate::preset::{Preset, StyleSpec};

/// `一是` / `二是` style lead-in phrases at the start of a body paragraph,
/// optionally trailed by a separator mark.
static LEAD_IN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]{1,3}是[，、：]?").unwrap());

/// Apply `spec` to the paragraph. For body paragraphs the preset may request
/// one of two run-splitting sub-behaviors (mutually exclusive, lead-in
/// first); when one fires the paragraph's run list is rebuilt from scratch.
pub fn apply(p: &mut XmlElement, spec: &StyleSpec, role: Role, preset: &Preset) {
    node::set_alignment(p, spec.align);
    node::set_indent(p, spec.first_line_indent);
    node::set_line_spacing(
        p,
        spec.line_spacing
            .map(LineSpacing::Exact)
            .unwrap_or(LineSpacing::Multiple(1.5)),
    );
    node::set_space_around(p, spec.space_before, spec.space_after);
    node::remove_para_shading(p);

    let segments = if role == Role::Body {
        split_segments(&node::para_text(p), preset)
    } else {
        None
    };

    match segments {
        Some(segments) => {
            node::replace_runs(p, &segments);
            let bold_flags: Vec<bool> = segments
                .iter()
                .filter(|(text, _)| !text.is_empty())
                .map(|(_, bold)| *bold)
                .collect();
            for (run, seg_bold) in node::runs_mut(p).into_iter().zip(bold_flags) {
                node::normalize_run(
                    run,
                    &spec.cjk_font,
                    &spec.latin_font,
                    spec.size,
                    spec.bold || seg_bold,
                );
            }
        }
        None => {
            for run in node::runs_mut(p) {
                node::normalize_run(run, &spec.cjk_font, &spec.latin_font, spec.size, spec.bold);
            }
        }
    }
}

/// The run segments a body paragraph should be rebuilt from, or `None` when
/// no sub-behavior applies and the existing runs are kept.
fn split_segments(text: &str, preset: &Preset) -> Option<Vec<(String, bool)>> {
    if preset.bold_lead_in
        && let Some(m) = LEAD_IN.find(text)
    {
        // Only the ordinal phrase itself goes bold; a trailing separator
        // stays in the normal-weight remainder.
        let phrase_end = text[..m.end()]
            .rfind('是')
            .map(|i| i + '是'.len_utf8())
            .unwrap_or(m.end());
        return Some(vec![
            (text[..phrase_end].to_string(), true),
            (text[phrase_end..].to_string(), false),
        ]);
    }
    if preset.bold_first_sentence
        && let Some(at) = text.find('。')
    {
        let split = at + '。'.len_utf8();
        if !text[split..].trim().is_empty() {
            return Some(vec![
                (text[..split].to_string(), true),
                (text[split..].to_string(), false),
            ]);
        }
    }
    None
}
