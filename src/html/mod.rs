mod paste;
mod reconcile;

pub use paste::{clean_word_paste, plain_text_to_html};
pub(crate) use reconcile::reconcile;

use crate::docx::{Archive, read_zip_bytes};
use crate::error::Error;
use crate::model::{Element, Image, Paragraph, Run, StyleRef, Tag, VertAlign};

/// Paragraph styles rendered as a plain `<p>` without a warning.
const KNOWN_PARAGRAPH_STYLES: &[&str] = &["Normal", "List Paragraph", "Body Text", "No Spacing"];

/// Character styles that need no markup of their own.
const KNOWN_RUN_STYLES: &[&str] = &["Default Paragraph Font", "Hyperlink", "Strong", "Emphasis"];

/// Called once per image, in the order the writer reaches them.
pub trait ImageConverter {
    /// Returns the value for the image's `src` attribute.
    fn convert(&mut self, image: &Image, data: Result<Vec<u8>, Error>) -> String;
}

pub(crate) fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

pub(crate) fn escape_attribute(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

struct HtmlWriter<'w, 'a> {
    zip: &'w mut Archive<'a>,
    images: &'w mut dyn ImageConverter,
    messages: &'w mut Vec<String>,
}

impl HtmlWriter<'_, '_> {
    fn warn(&mut self, message: String) {
        if !self.messages.contains(&message) {
            log::debug!("{message}");
            self.messages.push(message);
        }
    }

    fn check_style(&mut self, kind: &str, style: Option<&StyleRef>, known: &[&str]) {
        let Some(style) = style else {
            return;
        };
        let name = style.display_name();
        if !known.iter().any(|k| k.eq_ignore_ascii_case(name)) {
            self.warn(format!(
                "Unrecognised {kind} style: '{}' (Style ID: {})",
                style.display_name(),
                style.id
            ));
        }
    }

    fn elements(&mut self, elements: &[Element], out: &mut String) {
        for element in elements {
            self.element(element, out);
        }
    }

    fn element(&mut self, element: &Element, out: &mut String) {
        match element {
            Element::Paragraph(paragraph) => {
                let inner = self.paragraph_content(paragraph);
                // Empty paragraphs are dropped; blank lines only survive as placeholders.
                if !inner.is_empty() {
                    out.push_str("<p>");
                    out.push_str(&inner);
                    out.push_str("</p>");
                }
            }
            Element::Run(run) => self.run(run, out),
            Element::Text(text) => out.push_str(&escape_text(text)),
            Element::Break => out.push_str("<br />"),
            Element::Hyperlink(link) => {
                out.push_str(&format!("<a href=\"{}\">", escape_attribute(&link.href)));
                self.elements(&link.children, out);
                out.push_str("</a>");
            }
            Element::List(list) => {
                let tag = if list.ordered { "ol" } else { "ul" };
                out.push_str(&format!("<{tag}>"));
                self.elements(&list.children, out);
                out.push_str(&format!("</{tag}>"));
            }
            Element::ListItem(item) => {
                out.push_str("<li>");
                for child in &item.children {
                    match child {
                        Element::Paragraph(paragraph) => {
                            let inner = self.paragraph_content(paragraph);
                            out.push_str(&inner);
                        }
                        other => self.element(other, out),
                    }
                }
                out.push_str("</li>");
            }
            Element::Image(image) => self.image(image, out),
            Element::Tag(tag) => self.tag(tag, out),
        }
    }

    fn paragraph_content(&mut self, paragraph: &Paragraph) -> String {
        self.check_style("paragraph", paragraph.style.as_ref(), KNOWN_PARAGRAPH_STYLES);
        let mut inner = String::new();
        self.elements(&paragraph.children, &mut inner);
        inner
    }

    fn run(&mut self, run: &Run, out: &mut String) {
        self.check_style("run", run.style.as_ref(), KNOWN_RUN_STYLES);

        let mut tags: Vec<&str> = Vec::new();
        if run.bold {
            tags.push("strong");
        }
        if run.italic {
            tags.push("em");
        }
        if run.underline {
            tags.push("u");
        }
        if run.strikethrough {
            tags.push("s");
        }
        match run.vertical_align {
            VertAlign::Superscript => tags.push("sup"),
            VertAlign::Subscript => tags.push("sub"),
            VertAlign::Baseline => {}
        }

        for tag in tags.iter().rev() {
            out.push_str(&format!("<{tag}>"));
        }
        self.elements(&run.children, out);
        for tag in &tags {
            out.push_str(&format!("</{tag}>"));
        }
    }

    fn image(&mut self, image: &Image, out: &mut String) {
        let data = if image.part.is_empty() {
            Err(Error::ImageDecode("image has no media part".into()))
        } else {
            read_zip_bytes(self.zip, &image.part)
        };
        let src = self.images.convert(image, data);
        out.push_str(&format!("<img src=\"{}\"", escape_attribute(&src)));
        if !image.alt_text.is_empty() {
            out.push_str(&format!(" alt=\"{}\"", escape_attribute(&image.alt_text)));
        }
        out.push_str(" />");
    }

    fn tag(&mut self, tag: &Tag, out: &mut String) {
        out.push('<');
        out.push_str(tag.name);
        for (name, value) in &tag.attributes {
            out.push_str(&format!(" {name}=\"{}\"", escape_attribute(value)));
        }
        out.push('>');
        self.elements(&tag.children, out);
        out.push_str(&format!("</{}>", tag.name));
    }
}

/// Serialize the element tree. Structural warnings are appended to `messages`.
pub(crate) fn write(
    children: &[Element],
    zip: &mut Archive,
    images: &mut dyn ImageConverter,
    messages: &mut Vec<String>,
) -> String {
    let mut writer = HtmlWriter {
        zip,
        images,
        messages,
    };
    let mut out = String::new();
    writer.elements(children, &mut out);
    out
}
