//! Paragraph role classification.
//!
//! An ordered decision table: each rule is a `(predicate, role)` pair and the
//! first match wins, so rule order *is* the tie-break policy. Every predicate
//! is pure; position-dependent rules read the frozen `all_texts` snapshot
//! captured before any document mutation.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::model::{Alignment, Role};

static HEADING1: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+、").unwrap());
static HEADING2: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^（[一二三四五六七八九十]+）|^\([一二三四五六七八九十]+\)").unwrap());
static HEADING3: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+\.\s*\S").unwrap());
static HEADING4: Lazy<Regex> = Lazy::new(|| Regex::new(r"^（\d+）|^\(\d+\)").unwrap());

static RECIPIENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Han}+[：:]$").unwrap());
static ATTACHMENT: Lazy<Regex> = Lazy::new(|| Regex::new(r"^附件[0-9０-９]*[：:]?").unwrap());

static CLOSING_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^特此(通知|报告|函告|函复|公告|说明|证明)[。！!]?$",
        r"^此致[，,]?$",
        r"^敬礼[！!。]?$",
        r"^(妥否|当否|可否)[，,]?请(批示|指示|审示|批复)[。]?$",
        r"^请予(审批|批准|批示)[。]?$",
        r"^以上(请示|报告|意见)(妥否|当否)?[，,]?请批示[。]?$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

static DATE_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"^\d{4}年\d{1,2}月\d{1,2}日$",
        r"^\d{4}-\d{1,2}-\d{1,2}$",
        r"^\d{4}/\d{1,2}/\d{1,2}$",
        r"^\d{4}\.\d{1,2}\.\d{1,2}$",
        r"^[〇○零一二三四五六七八九]{2,4}年[一二三四五六七八九十]{1,3}月[一二三四五六七八九十]{1,3}日$",
    ]
    .iter()
    .map(|p| Regex::new(p).unwrap())
    .collect()
});

/// Organizational-entity suffixes that mark a signature line.
const SIGNATURE_SUFFIXES: &[&str] = &[
    "公司",
    "集团",
    "局",
    "厅",
    "部",
    "处",
    "科",
    "司",
    "委员会",
    "办公室",
    "中心",
    "学校",
    "大学",
    "学院",
    "医院",
    "支队",
    "大队",
    "总队",
    "银行",
    "协会",
    "学会",
    "研究所",
    "事务所",
    "人民政府",
];

static TITLE_GUANYU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^关于.{2,30}的(通知|报告|请示|函|意见|决定|公告|通报|批复|汇报|方案|总结)$")
        .unwrap()
});
static TITLE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^.{2,20}(通知|报告|请示|函|意见|决定|公告|通报|批复|汇报材料|工作汇报|工作方案|工作总结)$",
    )
    .unwrap()
});
static TITLE_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[一二三四五六七八九十]+、|^[（(]|^\d").unwrap());

/// How many trailing snapshot entries the signature heuristic scans.
const SIGNATURE_WINDOW: usize = 10;
/// How many paragraphs of the snapshot may precede a title.
const TITLE_WINDOW: usize = 5;

struct Ctx<'a> {
    text: &'a str,
    index: usize,
    alignment: Option<Alignment>,
    all_texts: &'a [String],
}

type Rule = (for<'a, 'b> fn(&'a Ctx<'b>) -> bool, Role);

/// The decision table. Heading markers outrank everything, the trailing-zone
/// rules (signature) outrank the leading-zone rules (title), and body is the
/// fallback for whatever remains.
static RULES: &[Rule] = &[
    (is_heading1, Role::Heading1),
    (is_heading2, Role::Heading2),
    (is_heading3, Role::Heading3),
    (is_heading4, Role::Heading4),
    (is_recipient, Role::Recipient),
    (is_attachment, Role::Attachment),
    (is_closing, Role::Closing),
    (is_date, Role::Date),
    (is_signature, Role::Signature),
    (is_title, Role::Title),
];

fn is_heading1(c: &Ctx) -> bool {
    HEADING1.is_match(c.text)
}

fn is_heading2(c: &Ctx) -> bool {
    HEADING2.is_match(c.text)
}

fn is_heading3(c: &Ctx) -> bool {
    HEADING3.is_match(c.text) && char_len(c.text) < 60
}

fn is_heading4(c: &Ctx) -> bool {
    HEADING4.is_match(c.text) && char_len(c.text) < 60
}

fn is_recipient(c: &Ctx) -> bool {
    RECIPIENT.is_match(c.text) && char_len(c.text) < 20
}

fn is_attachment(c: &Ctx) -> bool {
    ATTACHMENT.is_match(c.text)
}

fn is_closing(c: &Ctx) -> bool {
    CLOSING_PATTERNS.iter().any(|p| p.is_match(c.text))
}

fn is_date(c: &Ctx) -> bool {
    is_date_literal(c.text)
}

/// Assign a role to a paragraph.
///
/// * `text` - the paragraph's visible text.
/// * `index`/`total` - position within the full paragraph sequence.
/// * `alignment` - the paragraph's alignment before any restyling.
/// * `all_texts` - snapshot of all non-empty paragraph texts, captured once
///   before the mutation pass.
///
/// Deterministic and side-effect-free: equal inputs always yield the same
/// role.
pub fn classify(
    text: &str,
    index: usize,
    total: usize,
    alignment: Option<Alignment>,
    all_texts: &[String],
) -> Role {
    debug_assert!(index < total || total == 0);
    let text = text.trim();
    if text.is_empty() {
        return Role::Empty;
    }
    let ctx = Ctx {
        text,
        index,
        alignment,
        all_texts,
    };
    RULES
        .iter()
        .find(|(pred, _)| pred(&ctx))
        .map(|(_, role)| *role)
        .unwrap_or(Role::Body)
}

pub(crate) fn is_date_literal(text: &str) -> bool {
    DATE_PATTERNS.iter().any(|p| p.is_match(text))
}

/// Leading heading marker, shared with the heading splitter.
pub(crate) fn heading_marker_len(text: &str) -> Option<usize> {
    for re in [&*HEADING1, &*HEADING2, &*HEADING4] {
        if let Some(m) = re.find(text) {
            return Some(m.end());
        }
    }
    // For "N." the marker is just the digits and the dot, not the content
    // the pattern requires after it.
    if HEADING3.is_match(text) {
        let end = text
            .char_indices()
            .find(|(_, ch)| *ch == '.')
            .map(|(i, _)| i + 1);
        return end;
    }
    None
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

fn is_signature(c: &Ctx) -> bool {
    if char_len(c.text) >= 30 {
        return false;
    }
    // The paragraph is located in the snapshot by value equality; with
    // duplicated texts this may pick the first occurrence. Known limitation,
    // kept to match the source behavior.
    let Some(pos) = c.all_texts.iter().position(|t| t == c.text) else {
        return false;
    };
    if pos + SIGNATURE_WINDOW < c.all_texts.len() {
        return false;
    }
    if SIGNATURE_SUFFIXES.iter().any(|s| c.text.ends_with(s)) {
        return true;
    }
    c.all_texts[pos + 1..]
        .iter()
        .take(3)
        .any(|t| is_date_literal(t))
}

fn is_title(c: &Ctx) -> bool {
    if c.index >= TITLE_WINDOW {
        return false;
    }
    if TITLE_GUANYU.is_match(c.text) || TITLE_SUFFIX.is_match(c.text) {
        return true;
    }
    let len = char_len(c.text);
    let ends_sentence = c
        .text
        .chars()
        .last()
        .is_some_and(|ch| "。．.！!？?；;".contains(ch));
    if len > 15 && len < 80 && !ends_sentence && !TITLE_MARKER.is_match(c.text) {
        return true;
    }
    c.alignment == Some(Alignment::Center) && len < 60
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn classify_plain(text: &str, index: usize, total: usize) -> Role {
        classify(text, index, total, None, &texts(&[text]))
    }

    #[test]
    fn heading_markers_by_level() {
        assert_eq!(classify_plain("一、总体要求", 10, 50), Role::Heading1);
        assert_eq!(classify_plain("（三）落实责任", 10, 50), Role::Heading2);
        assert_eq!(classify_plain("(三)落实责任", 10, 50), Role::Heading2);
        assert_eq!(classify_plain("3.加强管理", 10, 50), Role::Heading3);
        assert_eq!(classify_plain("（2）具体措施", 10, 50), Role::Heading4);
        assert_eq!(classify_plain("(2)具体措施", 10, 50), Role::Heading4);
    }

    #[test]
    fn heading_rules_win_over_title_fallback() {
        // Short enough to look title-like, but the marker decides.
        assert_eq!(classify_plain("一、概述", 10, 50), Role::Heading1);
        assert_eq!(
            classify("一、概述", 0, 50, Some(Alignment::Center), &texts(&["一、概述"])),
            Role::Heading1
        );
    }

    #[test]
    fn long_numbered_paragraph_is_body() {
        let long = "1.各单位要高度重视此次检查工作，严格按照要求逐项落实，确保在规定时间内完成全部整改任务并形成书面报告，同时建立长效机制，加强日常巡查和隐患排查，发现问题及时整改到位。";
        assert_eq!(classify_plain(long, 10, 50), Role::Body);
    }

    #[test]
    fn recipient_line() {
        assert_eq!(classify_plain("各区县教育局：", 1, 20), Role::Recipient);
        // Mixed script is not a recipient line.
        assert_eq!(classify_plain("abc单位：", 18, 20), Role::Body);
    }

    #[test]
    fn attachment_variants() {
        assert_eq!(classify_plain("附件：检查评分表", 18, 20), Role::Attachment);
        assert_eq!(classify_plain("附件1：整改清单", 18, 20), Role::Attachment);
        assert_eq!(classify_plain("附件2", 18, 20), Role::Attachment);
    }

    #[test]
    fn closing_phrases() {
        assert_eq!(classify_plain("特此通知。", 18, 20), Role::Closing);
        assert_eq!(classify_plain("此致", 18, 20), Role::Closing);
        assert_eq!(classify_plain("敬礼！", 18, 20), Role::Closing);
        assert_eq!(classify_plain("妥否，请批示。", 18, 20), Role::Closing);
    }

    #[test]
    fn date_formats() {
        for date in [
            "2024年3月15日",
            "2024-03-15",
            "2024/3/15",
            "2024.03.15",
            "二〇二四年三月十五日",
        ] {
            assert_eq!(classify_plain(date, 19, 20), Role::Date, "{date}");
        }
        assert_eq!(classify_plain("2024年3月15日印发", 19, 20), Role::Body);
    }

    #[test]
    fn date_at_last_position_right_zone() {
        let all = texts(&["关于开展安全检查工作的通知", "正文内容", "2024年3月15日"]);
        assert_eq!(classify("2024年3月15日", 2, 3, None, &all), Role::Date);
    }

    #[test]
    fn signature_by_entity_suffix() {
        let all = texts(&["正文", "市教育局办公室", "2024年3月15日"]);
        assert_eq!(classify("市教育局办公室", 1, 3, None, &all), Role::Signature);
    }

    #[test]
    fn signature_by_date_lookahead() {
        // No entity suffix, but a date within the next three texts.
        let all = texts(&["正文", "安全检查工作组", "2024年3月15日"]);
        assert_eq!(classify("安全检查工作组", 1, 3, None, &all), Role::Signature);
    }

    #[test]
    fn signature_needs_trailing_zone() {
        // Same text early in a long document stays body.
        let mut items: Vec<String> = (0..20).map(|i| format!("第{i}段正文内容")).collect();
        items.insert(2, "市教育局办公室".to_string());
        assert_eq!(classify("市教育局办公室", 2, 21, None, &items), Role::Body);
    }

    #[test]
    fn title_patterns_in_leading_zone() {
        assert_eq!(
            classify_plain("关于开展安全检查工作的通知", 0, 30),
            Role::Title
        );
        assert_eq!(classify_plain("市政府2024年度工作总结", 1, 30), Role::Title);
        // Outside the leading zone the same text is body.
        assert_eq!(
            classify_plain("关于开展安全检查工作的通知", 7, 30),
            Role::Body
        );
    }

    #[test]
    fn title_by_centered_short_text() {
        assert_eq!(
            classify("年度考核方案", 0, 30, Some(Alignment::Center), &texts(&["年度考核方案"])),
            Role::Title
        );
        assert_eq!(
            classify("年度考核方案", 0, 30, None, &texts(&["年度考核方案"])),
            Role::Body
        );
    }

    #[test]
    fn title_by_length_without_sentence_end() {
        let text = "全市中小学校园安全管理专项整治行动部署";
        assert_eq!(classify_plain(text, 0, 30), Role::Title);
        let with_period = format!("{text}。");
        assert_eq!(classify_plain(&with_period, 0, 30), Role::Body);
    }

    #[test]
    fn determinism() {
        let all = texts(&["关于开展安全检查工作的通知", "正文"]);
        let first = classify("关于开展安全检查工作的通知", 0, 2, None, &all);
        for _ in 0..10 {
            assert_eq!(
                classify("关于开展安全检查工作的通知", 0, 2, None, &all),
                first
            );
        }
    }

    #[test]
    fn marker_lengths() {
        assert_eq!(heading_marker_len("一、概述"), Some("一、".len()));
        assert_eq!(heading_marker_len("（二）宣传"), Some("（二）".len()));
        assert_eq!(heading_marker_len("12.内容"), Some(3));
        assert_eq!(heading_marker_len("正文内容"), None);
    }
}
