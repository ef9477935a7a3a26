//! Named style presets: one complete styling rule set per document family.
//!
//! A preset maps every paragraph [`Role`] to a [`StyleSpec`] and carries the
//! page, table, and footer parameters. Built-ins cover the official-document,
//! academic, and legal families; a custom preset deserializes from JSON with
//! missing role entries filled from the body spec at load time, so style
//! lookup can never fail mid-run.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::{Alignment, Role};

/// Concrete font/alignment/indent/spacing values for one role.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StyleSpec {
    /// East Asian font face, e.g. `仿宋_GB2312`.
    pub cjk_font: String,
    /// Latin font face, e.g. `Times New Roman`.
    pub latin_font: String,
    /// Font size in points (written with half-point precision).
    pub size: f32,
    #[serde(default)]
    pub bold: bool,
    pub align: Alignment,
    /// First-line indent in points. 0 means flush.
    #[serde(default)]
    pub first_line_indent: f32,
    /// Exact line height in points; `None` means 1.5× spacing.
    #[serde(default)]
    pub line_spacing: Option<f32>,
    #[serde(default)]
    pub space_before: f32,
    #[serde(default)]
    pub space_after: f32,
}

impl StyleSpec {
    fn new(cjk: &str, size: f32, align: Alignment, indent: f32) -> Self {
        StyleSpec {
            cjk_font: cjk.to_string(),
            latin_font: "Times New Roman".to_string(),
            size,
            bold: false,
            align,
            first_line_indent: indent,
            line_spacing: None,
            space_before: 0.0,
            space_after: 0.0,
        }
    }

    fn bold(mut self) -> Self {
        self.bold = true;
        self
    }

    fn spacing(mut self, pts: f32) -> Self {
        self.line_spacing = Some(pts);
        self
    }
}

/// Page margins in centimeters.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct PageMargins {
    pub top: f32,
    pub bottom: f32,
    pub left: f32,
    pub right: f32,
}

/// Table restructuring parameters.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TableStyle {
    /// Border stroke weight in points, applied to the table frame, the
    /// interior grid, and every cell.
    pub border_width: f32,
    /// Table width as a percentage of the content width.
    pub width_pct: f32,
    /// Cell margins in points.
    pub margin_top: f32,
    pub margin_bottom: f32,
    pub margin_left: f32,
    pub margin_right: f32,
    /// Content-weighted column balancing; when off the original grid stays.
    pub auto_fit_columns: bool,
    /// Clamp band for balanced column widths, in percent.
    pub min_col_pct: f64,
    pub max_col_pct: f64,
    pub cjk_font: String,
    pub latin_font: String,
    pub size: f32,
    pub header_bold: bool,
    /// First-line indent forced onto cell paragraphs, in points.
    pub first_line_indent: f32,
    /// Exact line height in points for cell paragraphs; `None` means single.
    pub line_spacing: Option<f32>,
    /// Minimum row height in points (`hRule="atLeast"`), when set.
    pub min_row_height: Option<f32>,
    /// Cells at most this many characters are centered.
    pub short_text_len: usize,
}

impl Default for TableStyle {
    fn default() -> Self {
        TableStyle {
            border_width: 0.5,
            width_pct: 100.0,
            margin_top: 0.0,
            margin_bottom: 0.0,
            margin_left: 5.4,
            margin_right: 5.4,
            auto_fit_columns: true,
            min_col_pct: 8.0,
            max_col_pct: 45.0,
            cjk_font: "仿宋_GB2312".to_string(),
            latin_font: "Times New Roman".to_string(),
            size: 12.0,
            header_bold: true,
            first_line_indent: 0.0,
            line_spacing: None,
            min_row_height: None,
            short_text_len: 4,
        }
    }
}

/// Footer typography.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct FooterStyle {
    pub cjk_font: String,
    pub latin_font: String,
    pub size: f32,
}

impl Default for FooterStyle {
    fn default() -> Self {
        FooterStyle {
            cjk_font: "宋体".to_string(),
            latin_font: "Times New Roman".to_string(),
            size: 14.0,
        }
    }
}

/// A complete, immutable styling rule set.
#[derive(Clone, Debug)]
pub struct Preset {
    pub name: String,
    pub margins: PageMargins,
    pub title: StyleSpec,
    pub recipient: StyleSpec,
    pub heading1: StyleSpec,
    pub heading2: StyleSpec,
    pub heading3: StyleSpec,
    pub heading4: StyleSpec,
    pub body: StyleSpec,
    pub signature: StyleSpec,
    pub date: StyleSpec,
    pub attachment: StyleSpec,
    pub closing: StyleSpec,
    pub table: TableStyle,
    pub footer: FooterStyle,
    /// Bold the first sentence of each body paragraph.
    pub bold_first_sentence: bool,
    /// Bold `一是`/`二是` lead-in phrases in body paragraphs.
    pub bold_lead_in: bool,
    /// Rebuild odd/even page-number footers.
    pub page_numbers: bool,
}

impl Preset {
    /// 公文 (official document) preset: GB/T 9704 typography.
    pub fn official() -> Preset {
        let body = StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Justify, 32.0).spacing(28.0);
        Preset {
            name: "official".to_string(),
            margins: PageMargins {
                top: 3.7,
                bottom: 3.5,
                left: 2.8,
                right: 2.6,
            },
            title: StyleSpec::new("方正小标宋简体", 22.0, Alignment::Center, 0.0).spacing(28.0),
            recipient: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Left, 0.0).spacing(28.0),
            heading1: StyleSpec::new("黑体", 16.0, Alignment::Left, 32.0).spacing(28.0),
            heading2: StyleSpec::new("楷体_GB2312", 16.0, Alignment::Left, 32.0).spacing(28.0),
            heading3: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Left, 32.0).spacing(28.0),
            heading4: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Left, 32.0).spacing(28.0),
            signature: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Right, 0.0).spacing(28.0),
            date: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Right, 0.0).spacing(28.0),
            attachment: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Left, 32.0).spacing(28.0),
            closing: StyleSpec::new("仿宋_GB2312", 16.0, Alignment::Justify, 32.0).spacing(28.0),
            body,
            table: TableStyle {
                min_row_height: Some(22.0),
                ..TableStyle::default()
            },
            footer: FooterStyle::default(),
            bold_first_sentence: false,
            bold_lead_in: true,
            page_numbers: true,
        }
    }

    /// 学术论文 (academic paper) preset.
    pub fn academic() -> Preset {
        let body = StyleSpec::new("宋体", 12.0, Alignment::Justify, 24.0);
        Preset {
            name: "academic".to_string(),
            margins: PageMargins {
                top: 2.5,
                bottom: 2.5,
                left: 2.5,
                right: 2.5,
            },
            title: StyleSpec::new("黑体", 18.0, Alignment::Center, 0.0).bold(),
            recipient: body.clone(),
            heading1: StyleSpec::new("黑体", 15.0, Alignment::Left, 0.0).bold(),
            heading2: StyleSpec::new("黑体", 14.0, Alignment::Left, 0.0).bold(),
            heading3: StyleSpec::new("黑体", 12.0, Alignment::Left, 0.0),
            heading4: StyleSpec::new("宋体", 12.0, Alignment::Left, 0.0),
            signature: StyleSpec::new("宋体", 12.0, Alignment::Right, 0.0),
            date: StyleSpec::new("宋体", 12.0, Alignment::Right, 0.0),
            attachment: StyleSpec::new("宋体", 12.0, Alignment::Left, 0.0),
            closing: body.clone(),
            body,
            table: TableStyle {
                cjk_font: "宋体".to_string(),
                size: 10.5,
                ..TableStyle::default()
            },
            footer: FooterStyle {
                size: 10.5,
                ..FooterStyle::default()
            },
            bold_first_sentence: false,
            bold_lead_in: false,
            page_numbers: true,
        }
    }

    /// 法律文书 (legal document) preset.
    pub fn legal() -> Preset {
        let body = StyleSpec::new("宋体", 14.0, Alignment::Justify, 28.0);
        Preset {
            name: "legal".to_string(),
            margins: PageMargins {
                top: 3.0,
                bottom: 2.5,
                left: 3.0,
                right: 2.5,
            },
            title: StyleSpec::new("宋体", 22.0, Alignment::Center, 0.0).bold(),
            recipient: StyleSpec::new("宋体", 14.0, Alignment::Left, 0.0),
            heading1: StyleSpec::new("黑体", 14.0, Alignment::Left, 0.0),
            heading2: StyleSpec::new("黑体", 14.0, Alignment::Left, 0.0),
            heading3: StyleSpec::new("宋体", 14.0, Alignment::Left, 0.0),
            heading4: StyleSpec::new("宋体", 14.0, Alignment::Left, 0.0),
            signature: StyleSpec::new("宋体", 14.0, Alignment::Right, 0.0),
            date: StyleSpec::new("宋体", 14.0, Alignment::Right, 0.0),
            attachment: StyleSpec::new("宋体", 14.0, Alignment::Left, 0.0),
            closing: body.clone(),
            body,
            table: TableStyle {
                cjk_font: "宋体".to_string(),
                ..TableStyle::default()
            },
            footer: FooterStyle::default(),
            bold_first_sentence: false,
            bold_lead_in: false,
            page_numbers: true,
        }
    }

    pub fn builtin(name: &str) -> Option<Preset> {
        match name {
            "official" => Some(Preset::official()),
            "academic" => Some(Preset::academic()),
            "legal" => Some(Preset::legal()),
            _ => None,
        }
    }

    /// The StyleSpec for a role. Total: every role resolves, `Empty` and any
    /// future role fall back to the body spec.
    pub fn style_for(&self, role: Role) -> &StyleSpec {
        match role {
            Role::Title => &self.title,
            Role::Recipient => &self.recipient,
            Role::Heading1 => &self.heading1,
            Role::Heading2 => &self.heading2,
            Role::Heading3 => &self.heading3,
            Role::Heading4 => &self.heading4,
            Role::Signature => &self.signature,
            Role::Date => &self.date,
            Role::Attachment => &self.attachment,
            Role::Closing => &self.closing,
            Role::Body | Role::Empty => &self.body,
        }
    }

    /// Load a custom preset from JSON. Only `margins` and `body` are
    /// mandatory; any role spec left out inherits the body spec here, at
    /// load time, so lookups never fall through later.
    pub fn from_json(json: &str) -> Result<Preset> {
        let file: PresetFile =
            serde_json::from_str(json).map_err(|e| Error::Preset(e.to_string()))?;
        if file.body.size <= 0.0 {
            return Err(Error::Preset("body font size must be positive".into()));
        }
        let body = file.body.clone();
        let fallback = |spec: Option<StyleSpec>| spec.unwrap_or_else(|| body.clone());
        Ok(Preset {
            name: file.name,
            margins: file.margins,
            title: fallback(file.title),
            recipient: fallback(file.recipient),
            heading1: fallback(file.heading1),
            heading2: fallback(file.heading2),
            heading3: fallback(file.heading3),
            heading4: fallback(file.heading4),
            signature: fallback(file.signature),
            date: fallback(file.date),
            attachment: fallback(file.attachment),
            closing: fallback(file.closing),
            body: file.body,
            table: file.table,
            footer: file.footer,
            bold_first_sentence: file.bold_first_sentence,
            bold_lead_in: file.bold_lead_in,
            page_numbers: file.page_numbers,
        })
    }
}

/// On-disk shape of a custom preset.
#[derive(Deserialize)]
struct PresetFile {
    #[serde(default = "default_custom_name")]
    name: String,
    margins: PageMargins,
    body: StyleSpec,
    title: Option<StyleSpec>,
    recipient: Option<StyleSpec>,
    heading1: Option<StyleSpec>,
    heading2: Option<StyleSpec>,
    heading3: Option<StyleSpec>,
    heading4: Option<StyleSpec>,
    signature: Option<StyleSpec>,
    date: Option<StyleSpec>,
    attachment: Option<StyleSpec>,
    closing: Option<StyleSpec>,
    #[serde(default)]
    table: TableStyle,
    #[serde(default)]
    footer: FooterStyle,
    #[serde(default)]
    bold_first_sentence: bool,
    #[serde(default)]
    bold_lead_in: bool,
    #[serde(default = "default_true")]
    page_numbers: bool,
}

fn default_custom_name() -> String {
    "custom".to_string()
}

fn default_true() -> bool {
    true
}
