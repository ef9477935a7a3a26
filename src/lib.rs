//! # docxfmt
//!
//! Normalizes the layout and typography of Chinese official-style DOCX
//! documents: every paragraph is classified into a semantic role (title,
//! recipient line, heading levels, body, signature, date, attachment,
//! closing), then restyled to a named preset; tables are rebalanced with
//! content-weighted column widths and a per-cell alignment policy; odd/even
//! page-number footers are regenerated.
//!
//! ```no_run
//! use std::path::Path;
//! use docxfmt::{format_file, Preset};
//!
//! fn main() -> docxfmt::Result<()> {
//!     let summary = format_file(
//!         Path::new("draft.docx"),
//!         Path::new("formatted.docx"),
//!         &Preset::official(),
//!     )?;
//!     println!("{summary}");
//!     Ok(())
//! }
//! ```

mod docx;
mod error;
mod fmt;
mod model;
mod preset;

pub use error::{Error, Result};
pub use model::{Alignment, Role, Summary};
pub use preset::{FooterStyle, PageMargins, Preset, StyleSpec, TableStyle};

use std::path::Path;
use std::time::Instant;

/// Format a document end to end: open `input`, run the pipeline with
/// `preset`, write the result to `output`. The output is assembled fully in
/// memory; on any error nothing is written.
pub fn format_file(input: &Path, output: &Path, preset: &Preset) -> Result<Summary> {
    let t0 = Instant::now();

    let mut pkg = docx::WordPackage::open(input)?;
    let t_parse = t0.elapsed();

    let summary = fmt::run(&mut pkg, preset)?;
    let t_format = t0.elapsed();

    pkg.save(output)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, format={:.1}ms, write={:.1}ms, total={:.1}ms ({} paragraphs)",
        t_parse.as_secs_f64() * 1000.0,
        (t_format - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_format).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        summary.total(),
    );

    Ok(summary)
}

/// Format a package already held in memory, returning the rewritten bytes.
/// Useful when the document does not live on disk.
pub fn format_bytes(input: &[u8], preset: &Preset) -> Result<(Vec<u8>, Summary)> {
    let mut pkg = docx::WordPackage::from_bytes(input)?;
    let summary = fmt::run(&mut pkg, preset)?;
    Ok((pkg.to_bytes()?, summary))
}
