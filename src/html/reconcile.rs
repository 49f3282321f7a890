//! Post-serialization passes that re-attach formatting facts to the HTML.
//!
//! The writer output carries no link back to the element tree, so every fact
//! is relocated by its text. Pass order matters: empty paragraphs are restored
//! before anything matches on text, and images are styled last so earlier
//! passes never see the `clear: both` wrappers.
//!
//! Facts are matched against the first occurrence of their text in element
//! content. When the same text appears more than once, the earliest
//! occurrence wins even if the fact came from a later run.

use std::sync::LazyLock;

use regex::Regex;

use crate::model::{
    Alignment, AlignmentFact, Facts, FontSizeFact, HighlightFact, ImageDisplaySize, ImageMetadata,
};
use crate::normalize::empty_paragraph_marker;

use super::escape_text;

static RE_IMG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<img\b[^>]*>").expect("valid img regex"));
static RE_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

/// True when byte offset `pos` sits in element content rather than inside a tag.
fn in_content(html: &str, pos: usize) -> bool {
    let before = &html[..pos];
    match (before.rfind('<'), before.rfind('>')) {
        (Some(lt), Some(gt)) => gt > lt,
        (Some(_), None) => false,
        _ => true,
    }
}

fn content_occurrences<'h>(html: &'h str, needle: &'h str) -> impl Iterator<Item = usize> + 'h {
    html.match_indices(needle)
        .map(|(pos, _)| pos)
        .filter(move |pos| in_content(html, *pos))
}

/// The tag that closes immediately before `pos`, if any.
fn preceding_tag(html: &str, pos: usize) -> Option<&str> {
    let before = &html[..pos];
    if !before.ends_with('>') {
        return None;
    }
    before.rfind('<').map(|lt| &before[lt..])
}

fn strip_tags(html: &str) -> String {
    RE_TAG.replace_all(html, "").into_owned()
}

fn splice(html: &mut String, pos: usize, len: usize, replacement: &str) {
    html.replace_range(pos..pos + len, replacement);
}

pub(super) fn restore_empty_paragraphs(html: &str, count: usize) -> String {
    let mut html = html.to_string();
    for index in 1..=count {
        let placeholder = format!("<p>{}</p>", empty_paragraph_marker(index));
        match html.find(&placeholder) {
            Some(pos) => splice(&mut html, pos, placeholder.len(), "<p><br /></p>"),
            None => log::warn!("Empty paragraph marker {index} not found in output"),
        }
    }
    html
}

pub(super) fn apply_highlights(html: &str, facts: &[HighlightFact]) -> String {
    let mut html = html.to_string();
    for fact in facts {
        let needle = escape_text(&fact.matched_text);
        let Some(pos) = content_occurrences(&html, &needle).next() else {
            log::warn!("Highlight not applied, text not found: {:?}", fact.matched_text);
            continue;
        };
        if preceding_tag(&html, pos).is_some_and(|tag| tag.starts_with("<mark ")) {
            log::debug!("Highlight for {:?} already applied", fact.matched_text);
            continue;
        }
        let wrapped = format!(
            "<mark style=\"background-color: {};\">{needle}</mark>",
            fact.css_color
        );
        splice(&mut html, pos, needle.len(), &wrapped);
    }
    html
}

/// Offsets of bare `<tag>` openings with their inner content up to the next `</tag>`.
fn bare_elements<'h>(html: &'h str, tag: &str) -> Vec<(usize, &'h str)> {
    let open = format!("<{tag}>");
    let close = format!("</{tag}>");
    html.match_indices(&open)
        .filter_map(|(pos, _)| {
            let start = pos + open.len();
            let end = html[start..].find(&close)? + start;
            Some((pos, &html[start..end]))
        })
        .collect()
}

fn find_container(html: &str, tag: &str, needle: &str) -> Option<usize> {
    let candidates = bare_elements(html, tag);
    if let Some((pos, _)) = candidates.iter().find(|(_, inner)| *inner == needle) {
        return Some(*pos);
    }
    let stripped: Vec<(usize, String)> = candidates
        .iter()
        .map(|(pos, inner)| (*pos, strip_tags(inner)))
        .collect();
    stripped
        .iter()
        .find(|(_, text)| text == needle)
        .or_else(|| stripped.iter().find(|(_, text)| text.contains(needle)))
        .map(|(pos, _)| *pos)
}

pub(super) fn apply_alignments(html: &str, facts: &[AlignmentFact]) -> String {
    let mut html = html.to_string();
    for fact in facts {
        let tag = if fact.is_list_item { "li" } else { "p" };
        let needle = escape_text(&fact.matched_text);
        let Some(pos) = find_container(&html, tag, &needle) else {
            log::warn!(
                "Alignment {} not applied, no <{tag}> contains {:?}",
                fact.alignment.as_css(),
                fact.matched_text
            );
            continue;
        };
        let opening = format!("<{tag} style=\"text-align: {};\">", fact.alignment.as_css());
        splice(&mut html, pos, tag.len() + 2, &opening);
    }
    html
}

pub(super) fn apply_font_sizes(html: &str, facts: &[FontSizeFact]) -> String {
    let mut html = html.to_string();
    for fact in facts {
        let needle = escape_text(&fact.matched_text);
        let target = content_occurrences(&html, &needle).find(|pos| {
            !preceding_tag(&html, *pos)
                .is_some_and(|tag| tag.starts_with("<span style=\"font-size:"))
        });
        let Some(pos) = target else {
            log::warn!("Font size not applied, text not found: {:?}", fact.matched_text);
            continue;
        };
        let wrapped = format!(
            "<span style=\"font-size: {};\">{needle}</span>",
            fact.css_size
        );
        splice(&mut html, pos, needle.len(), &wrapped);
    }
    html
}

fn image_style(metadata: &ImageMetadata, alignment: Alignment) -> String {
    let mut parts: Vec<String> = Vec::new();
    if let Some(w) = metadata.width_px {
        parts.push(format!("width: {w}px;"));
    }
    if let Some(h) = metadata.height_px {
        parts.push(format!("height: {h}px;"));
    }
    match alignment {
        Alignment::Center => {
            parts.push("display: block; margin-left: auto; margin-right: auto;".into())
        }
        Alignment::Right => {
            parts.push("display: block; margin-left: auto; margin-right: 0;".into())
        }
        Alignment::Left | Alignment::Justify => {}
    }
    parts.join(" ")
}

fn with_style(tag: &str, style: &str) -> String {
    if style.is_empty() {
        return tag.to_string();
    }
    let body = tag.trim_end_matches('>').trim_end_matches('/').trim_end();
    format!("{body} style=\"{style}\" />")
}

pub(super) fn apply_image_geometry(
    html: &str,
    metadata: &[ImageMetadata],
    display_sizes: &[ImageDisplaySize],
) -> String {
    // With differing counts the positional pairing is unreliable for every image.
    let counts_match = metadata.len() == display_sizes.len();
    if !counts_match {
        log::warn!(
            "Image count mismatch: {} resolved, {} with display geometry; alignment not applied",
            metadata.len(),
            display_sizes.len()
        );
    }

    let mut out = String::with_capacity(html.len());
    let mut cursor = 0;
    for (index, found) in RE_IMG.find_iter(html).enumerate() {
        let Some(meta) = metadata.get(index).filter(|m| m.sequence == index) else {
            log::warn!("Image {index} has no resolved metadata, left unstyled");
            continue;
        };
        let display = display_sizes
            .get(index)
            .filter(|d| counts_match && d.sequence == meta.sequence);
        let alignment = match display {
            Some(display) => display.alignment,
            None => {
                log::warn!("Image {index} has no matching display geometry, left aligned");
                Alignment::Left
            }
        };

        let (mut start, mut end) = (found.start(), found.end());
        if html[cursor..start].ends_with("<p>") && html[end..].starts_with("</p>") {
            start -= "<p>".len();
            end += "</p>".len();
        }

        out.push_str(&html[cursor..start]);
        out.push_str("<p style=\"clear: both;\">");
        out.push_str(&with_style(found.as_str(), &image_style(meta, alignment)));
        out.push_str("</p>");
        cursor = end;
    }
    out.push_str(&html[cursor..]);
    out
}

/// Apply every collected fact to the writer's HTML, in pass order.
pub(crate) fn reconcile(
    html: &str,
    facts: &Facts,
    metadata: &[ImageMetadata],
    display_sizes: &[ImageDisplaySize],
) -> String {
    let html = restore_empty_paragraphs(html, facts.empty_paragraphs);
    let html = apply_highlights(&html, &facts.highlights);
    let html = apply_alignments(&html, &facts.alignments);
    let html = apply_font_sizes(&html, &facts.font_sizes);
    apply_image_geometry(&html, metadata, display_sizes)
}
