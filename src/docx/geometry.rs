//! Image display geometry read straight from the raw `word/document.xml` text.
//!
//! The structural walk never sees drawing extents, so this scan recovers them
//! independently. Every `wp:inline`/`wp:anchor` that embeds a picture yields one
//! [`ImageDisplaySize`], aligned by the enclosing paragraph's `w:jc`. Shapes,
//! text boxes and charts have no `a:blip` and are skipped, as are `mc:Fallback`
//! branches and text box content, which the walker never turns into images.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::Error;
use crate::model::{Alignment, ImageDisplaySize};

use super::{Archive, DOCUMENT_PART, open_archive, read_zip_text, styles::parse_alignment};

const EMU_PER_PIXEL: f64 = 9525.0;

// Self-closing `<w:p/>` never matches: the last attribute character must not be `/`.
static RE_PARAGRAPH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<w:p(?:\s[^>]*[^/>])?>(.*?)</w:p>"#).expect("valid paragraph regex")
});
static RE_IGNORED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(concat!(
        r#"(?s)<mc:Fallback(?:\s[^>]*[^/>])?>.*?</mc:Fallback>"#,
        r#"|<w:txbxContent(?:\s[^>]*[^/>])?>.*?</w:txbxContent>"#,
    ))
    .expect("valid ignored-content regex")
});
static RE_DRAWING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<wp:(?:inline|anchor)\b.*?</wp:(?:inline|anchor)>"#)
        .expect("valid drawing regex")
});
static RE_BLIP_EMBED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<a:blip\b[^>]*?\br:embed="[^"]+""#).expect("valid blip regex")
});
static RE_EXTENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<wp:extent\b[^>]*?\bcx="(\d+)"[^>]*?\bcy="(\d+)""#).expect("valid extent regex")
});
static RE_JUSTIFICATION: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"<w:jc\b[^>]*?\bw:val="([A-Za-z]+)""#).expect("valid justification regex")
});

pub(crate) fn emu_to_px(emu: u64) -> u32 {
    (emu as f64 / EMU_PER_PIXEL).round() as u32
}

/// Scan document XML text for picture extents, in document order.
pub(crate) fn scan_xml(xml: &str) -> Vec<ImageDisplaySize> {
    let xml = RE_IGNORED.replace_all(xml, "");
    let mut sizes = Vec::new();
    for paragraph in RE_PARAGRAPH.captures_iter(&xml) {
        let body = &paragraph[1];
        if !body.contains("<a:blip") {
            continue;
        }

        // Run properties never carry w:jc, so the first one is the paragraph's.
        let alignment = RE_JUSTIFICATION
            .captures(body)
            .map(|c| parse_alignment(&c[1]))
            .unwrap_or(Alignment::Left);

        for drawing in RE_DRAWING.find_iter(body) {
            let drawing = drawing.as_str();
            if !RE_BLIP_EMBED.is_match(drawing) {
                log::debug!("Skipping drawing without an embedded picture");
                continue;
            }
            let extent = RE_EXTENT.captures(drawing);
            let dimension = |group: usize| {
                extent
                    .as_ref()
                    .and_then(|c| c[group].parse::<u64>().ok())
                    .map(emu_to_px)
            };
            sizes.push(ImageDisplaySize {
                sequence: sizes.len(),
                width_px: dimension(1),
                height_px: dimension(2),
                alignment,
            });
        }
    }
    sizes
}

pub(crate) fn scan(zip: &mut Archive) -> Vec<ImageDisplaySize> {
    let Some(xml) = read_zip_text(zip, DOCUMENT_PART) else {
        log::warn!("{DOCUMENT_PART} not found, image sizes fall back to intrinsic dimensions");
        return Vec::new();
    };
    let sizes = scan_xml(&xml);
    log::debug!("Found {} picture extents in {DOCUMENT_PART}", sizes.len());
    sizes
}

/// Read image display sizes from DOCX bytes. Only an unreadable container is an error.
pub fn read_display_sizes(input: &[u8]) -> Result<Vec<ImageDisplaySize>, Error> {
    let mut zip = open_archive(input)?;
    Ok(scan(&mut zip))
}
