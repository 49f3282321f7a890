use std::sync::LazyLock;

use regex::Regex;

use super::escape_text;

static RE_OFFICE_PARAGRAPH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<o:p\s*/?>|</o:p>").expect("valid o:p regex"));
static RE_MSO_CLASS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"class="Mso[^"]*""#).expect("valid class regex"));
static RE_MSO_STYLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"style="[^"]*mso-[^"]*""#).expect("valid style regex"));
static RE_FONT_OR_SPAN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<(/)?(font|span)[^>]*>").expect("valid font regex"));

/// Strip Word clipboard noise from pasted HTML while keeping its structure.
pub fn clean_word_paste(html: &str) -> String {
    let html = RE_OFFICE_PARAGRAPH.replace_all(html, "");
    let html = RE_MSO_CLASS.replace_all(&html, "");
    let html = RE_MSO_STYLE.replace_all(&html, "");
    let html = RE_FONT_OR_SPAN.replace_all(&html, "");
    html.replace("&nbsp;", " ")
}

/// Wrap pasted plain text in paragraphs, one per line.
pub fn plain_text_to_html(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                "<p><br /></p>".to_string()
            } else {
                format!("<p>{}</p>", escape_text(line))
            }
        })
        .collect()
}
