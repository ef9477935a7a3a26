mod common;

use common::{build_docx, find_paragraph, node_text, p, read_part, wml, wml_attr, write_fixture};
use docxfmt::{Preset, Role, format_file};

/// A small but complete official document: title, recipient, headings (one
/// fused with body text), body with a lead-in phrase, attachment, closing,
/// signature, and date line.
fn official_fixture() -> Vec<u8> {
    let body = [
        p("关于开展安全检查工作的通知"),
        p("各区县教育局："),
        p("一、总体要求"),
        p("一是强化责任落实，二是加强督导检查，确保各项措施落地见效。"),
        p("（二）加强宣传教育，营造良好氛围。"),
        p("附件：安全检查评分表"),
        p("特此通知。"),
        p("市教育局"),
        p("2024年3月15日"),
    ]
    .concat();
    build_docx(&body, &[])
}

#[test]
fn roles_assigned_across_the_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");

    let summary = format_file(&input, &output, &Preset::official()).unwrap();

    assert_eq!(summary.count(Role::Title), 1);
    assert_eq!(summary.count(Role::Recipient), 1);
    assert_eq!(summary.count(Role::Heading1), 1);
    assert_eq!(summary.count(Role::Heading2), 1);
    assert_eq!(summary.count(Role::Body), 2);
    assert_eq!(summary.count(Role::Attachment), 1);
    assert_eq!(summary.count(Role::Closing), 1);
    assert_eq!(summary.count(Role::Signature), 1);
    assert_eq!(summary.count(Role::Date), 1);
    assert_eq!(summary.total(), 10);
}

#[test]
fn title_centered_in_title_face() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");
    format_file(&input, &output, &Preset::official()).unwrap();

    let xml = read_part(&output, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let title = find_paragraph(&doc, "关于开展安全检查工作的通知").unwrap();

    let ppr = wml(title, "pPr").unwrap();
    assert_eq!(wml_attr(ppr, "jc"), Some("center"));
    let ind = wml(ppr, "ind").unwrap();
    assert_eq!(ind.attribute((common::WML_NS, "firstLine")), Some("0"));

    let run = wml(title, "r").unwrap();
    let rpr = wml(run, "rPr").unwrap();
    let fonts = wml(rpr, "rFonts").unwrap();
    assert_eq!(
        fonts.attribute((common::WML_NS, "eastAsia")),
        Some("方正小标宋简体")
    );
    assert_eq!(wml_attr(rpr, "sz"), Some("44"));
}

#[test]
fn fused_heading_splits_into_heading_and_body() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");
    format_file(&input, &output, &Preset::official()).unwrap();

    let xml = read_part(&output, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();

    let heading = find_paragraph(&doc, "（二）加强宣传教育。").unwrap();
    let body = find_paragraph(&doc, "营造良好氛围。").unwrap();

    // heading2 renders in 楷体, the split-off remainder in the body face
    let heading_fonts = wml(wml(wml(heading, "r").unwrap(), "rPr").unwrap(), "rFonts").unwrap();
    assert_eq!(
        heading_fonts.attribute((common::WML_NS, "eastAsia")),
        Some("楷体_GB2312")
    );
    let body_fonts = wml(wml(wml(body, "r").unwrap(), "rPr").unwrap(), "rFonts").unwrap();
    assert_eq!(
        body_fonts.attribute((common::WML_NS, "eastAsia")),
        Some("仿宋_GB2312")
    );
}

#[test]
fn date_line_right_aligned_with_exact_spacing() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");
    format_file(&input, &output, &Preset::official()).unwrap();

    let xml = read_part(&output, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let date = find_paragraph(&doc, "2024年3月15日").unwrap();

    let ppr = wml(date, "pPr").unwrap();
    assert_eq!(wml_attr(ppr, "jc"), Some("right"));
    let spacing = wml(ppr, "spacing").unwrap();
    assert_eq!(spacing.attribute((common::WML_NS, "line")), Some("560"));
    assert_eq!(spacing.attribute((common::WML_NS, "lineRule")), Some("exact"));
}

#[test]
fn lead_in_phrase_bolded_in_body() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");
    format_file(&input, &output, &Preset::official()).unwrap();

    let xml = read_part(&output, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let para =
        find_paragraph(&doc, "一是强化责任落实，二是加强督导检查，确保各项措施落地见效。").unwrap();

    let runs: Vec<roxmltree::Node> = para
        .children()
        .filter(|n| n.tag_name().name() == "r")
        .collect();
    assert_eq!(runs.len(), 2);
    assert_eq!(node_text(runs[0]), "一是");
    let first_rpr = wml(runs[0], "rPr").unwrap();
    assert!(wml(first_rpr, "b").is_some());
    let second_rpr = wml(runs[1], "rPr").unwrap();
    assert!(wml(second_rpr, "b").is_none());
}

#[test]
fn margins_and_footers_written() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let output = dir.path().join("output.docx");
    format_file(&input, &output, &Preset::official()).unwrap();

    let xml = read_part(&output, "word/document.xml").unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let body = wml(doc.root_element(), "body").unwrap();
    let sect = wml(body, "sectPr").unwrap();

    let mar = wml(sect, "pgMar").unwrap();
    assert_eq!(mar.attribute((common::WML_NS, "top")), Some("2098"));
    assert_eq!(mar.attribute((common::WML_NS, "bottom")), Some("1984"));

    let refs: Vec<&str> = sect
        .children()
        .filter(|n| n.tag_name().name() == "footerReference")
        .filter_map(|n| n.attribute((common::WML_NS, "type")))
        .collect();
    assert!(refs.contains(&"default"));
    assert!(refs.contains(&"even"));

    let settings = read_part(&output, "word/settings.xml").unwrap();
    assert!(settings.contains("evenAndOddHeaders"));

    let footer = read_part(&output, "word/footer1.xml").unwrap();
    assert!(footer.contains("PAGE"));
    assert!(footer.contains("fldChar"));
    assert!(footer.contains("—"));
}

#[test]
fn second_run_is_byte_stable() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &official_fixture());
    let once = dir.path().join("once.docx");
    let twice = dir.path().join("twice.docx");

    format_file(&input, &once, &Preset::official()).unwrap();
    format_file(&once, &twice, &Preset::official()).unwrap();

    for part in [
        "word/document.xml",
        "word/settings.xml",
        "word/footer1.xml",
        "word/footer2.xml",
        "word/_rels/document.xml.rels",
        "[Content_Types].xml",
    ] {
        assert_eq!(
            read_part(&once, part),
            read_part(&twice, part),
            "{part} changed on the second run"
        );
    }
}

#[test]
fn empty_paragraphs_are_skipped() {
    let body = [p("关于开展安全检查工作的通知"), p(""), p("正文内容。"), p("")].concat();
    let dir = tempfile::tempdir().unwrap();
    let input = write_fixture(dir.path(), "input.docx", &build_docx(&body, &[]));
    let output = dir.path().join("output.docx");

    let summary = format_file(&input, &output, &Preset::official()).unwrap();
    assert_eq!(summary.total(), 2);
    assert_eq!(summary.count(Role::Empty), 0);
}
