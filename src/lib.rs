mod docx;
mod error;
mod html;
mod images;
pub mod model;
pub mod normalize;

pub use docx::geometry::read_display_sizes;
pub use docx::parse_bytes;
pub use error::Error;
pub use html::{ImageConverter, clean_word_paste, plain_text_to_html};
pub use model::ConversionResult;

use std::path::Path;
use std::time::Instant;

use images::ImageResolver;

/// Convert DOCX bytes into editor-ready HTML plus informational messages.
///
/// Only an unreadable container or document part is an error; anything that
/// goes wrong with a single image or formatting fact is logged and skipped.
pub fn convert_docx_to_html(input: &[u8]) -> Result<ConversionResult, Error> {
    let t0 = Instant::now();

    let display_sizes = read_display_sizes(input)?;
    let t_scan = t0.elapsed();

    let mut zip = docx::open_archive(input)?;
    let document = docx::parse(&mut zip)?;
    let (tree, facts) = normalize::collect_facts(document.children);
    let tree = normalize::transform(tree);
    let t_parse = t0.elapsed();

    let mut messages = document.messages;
    let mut resolver = ImageResolver::new(&display_sizes);
    let raw_html = html::write(&tree, &mut zip, &mut resolver, &mut messages);
    let metadata = resolver.into_metadata();
    let t_write = t0.elapsed();

    let html = html::reconcile(&raw_html, &facts, &metadata, &display_sizes);
    let t_total = t0.elapsed();

    log::info!(
        "Timing: scan={:.1}ms, parse={:.1}ms, write={:.1}ms, reconcile={:.1}ms, total={:.1}ms \
         ({} images, {} highlights, {} alignments, {} sizes, {} blank paragraphs)",
        t_scan.as_secs_f64() * 1000.0,
        (t_parse - t_scan).as_secs_f64() * 1000.0,
        (t_write - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_write).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        metadata.len(),
        facts.highlights.len(),
        facts.alignments.len(),
        facts.font_sizes.len(),
        facts.empty_paragraphs,
    );

    Ok(ConversionResult { html, messages })
}

pub fn convert_docx_file(input: &Path) -> Result<ConversionResult, Error> {
    let bytes = std::fs::read(input).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound | std::io::ErrorKind::PermissionDenied => Error::Io(
            std::io::Error::new(e.kind(), format!("{}: {}", e, input.display())),
        ),
        _ => Error::Io(e),
    })?;
    convert_docx_to_html(&bytes)
}
