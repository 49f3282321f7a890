use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
    Right,
    Justify,
}

impl Alignment {
    pub fn as_css(self) -> &'static str {
        match self {
            Alignment::Left => "left",
            Alignment::Center => "center",
            Alignment::Right => "right",
            Alignment::Justify => "justify",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum VertAlign {
    #[default]
    Baseline,
    Superscript,
    Subscript,
}

/// A style reference as it appears on a paragraph or run: the id used in the
/// XML plus the human name resolved from styles.xml, when defined.
#[derive(Clone, Debug, PartialEq)]
pub struct StyleRef {
    pub id: String,
    pub name: Option<String>,
}

impl StyleRef {
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Numbering {
    pub num_id: u32,
    pub level: u8,
    pub ordered: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Paragraph {
    pub style: Option<StyleRef>,
    pub alignment: Alignment,
    pub numbering: Option<Numbering>,
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Run {
    pub style: Option<StyleRef>,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub strikethrough: bool,
    pub vertical_align: VertAlign,
    /// Raw `w:highlight` value, e.g. "yellow" or "darkGreen".
    pub highlight: Option<String>,
    /// `w:sz` in half-points.
    pub font_size: Option<u32>,
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Hyperlink {
    pub href: String,
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct List {
    pub ordered: bool,
    pub children: Vec<Element>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ListItem {
    pub children: Vec<Element>,
}

/// An embedded picture. The bytes stay in the package until the writer asks
/// for them.
#[derive(Clone, Debug, PartialEq)]
pub struct Image {
    /// Zip path of the media part, e.g. `word/media/image1.png`.
    pub part: String,
    pub content_type: String,
    pub alt_text: String,
}

/// An HTML element stand-in produced by the transform pass.
#[derive(Clone, Debug, PartialEq)]
pub struct Tag {
    pub name: &'static str,
    pub attributes: Vec<(&'static str, String)>,
    pub children: Vec<Element>,
}

impl Tag {
    pub fn new(name: &'static str, children: Vec<Element>) -> Self {
        Self {
            name,
            attributes: Vec::new(),
            children,
        }
    }

    pub fn with_attribute(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((name, value.into()));
        self
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Element {
    Paragraph(Paragraph),
    Run(Run),
    Text(String),
    Break,
    Hyperlink(Hyperlink),
    List(List),
    ListItem(ListItem),
    Image(Image),
    Tag(Tag),
}

impl Element {
    pub fn children(&self) -> &[Element] {
        match self {
            Element::Paragraph(p) => &p.children,
            Element::Run(r) => &r.children,
            Element::Hyperlink(h) => &h.children,
            Element::List(l) => &l.children,
            Element::ListItem(li) => &li.children,
            Element::Tag(t) => &t.children,
            Element::Text(_) | Element::Break | Element::Image(_) => &[],
        }
    }

    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match self {
            Element::Paragraph(p) => Some(&mut p.children),
            Element::Run(r) => Some(&mut r.children),
            Element::Hyperlink(h) => Some(&mut h.children),
            Element::List(l) => Some(&mut l.children),
            Element::ListItem(li) => Some(&mut li.children),
            Element::Tag(t) => Some(&mut t.children),
            Element::Text(_) | Element::Break | Element::Image(_) => None,
        }
    }

    /// Concatenation of every descendant text leaf.
    pub fn text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Element::Text(t) => out.push_str(t),
            other => {
                for child in other.children() {
                    child.collect_text(out);
                }
            }
        }
    }

    pub fn text_leaves(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_text_leaves(&mut out);
        out
    }

    fn collect_text_leaves<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Element::Text(t) => out.push(t),
            other => {
                for child in other.children() {
                    child.collect_text_leaves(out);
                }
            }
        }
    }

    pub fn contains_image(&self) -> bool {
        matches!(self, Element::Image(_)) || self.children().iter().any(Element::contains_image)
    }
}

/// Parsed `word/document.xml` body plus the converter's structural warnings.
pub struct Document {
    pub children: Vec<Element>,
    pub messages: Vec<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct HighlightFact {
    pub matched_text: String,
    pub css_color: &'static str,
}

#[derive(Clone, Debug, PartialEq)]
pub struct AlignmentFact {
    pub matched_text: String,
    pub alignment: Alignment,
    pub is_list_item: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FontSizeFact {
    pub matched_text: String,
    pub css_size: String,
}

/// Side tables gathered by the pre-pass, in document order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Facts {
    pub highlights: Vec<HighlightFact>,
    pub alignments: Vec<AlignmentFact>,
    pub font_sizes: Vec<FontSizeFact>,
    pub empty_paragraphs: usize,
}

/// Author-intended image geometry read from the raw document XML.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageDisplaySize {
    pub sequence: usize,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
    pub alignment: Alignment,
}

/// What the resolver learned about an image, in the order the writer met it.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageMetadata {
    pub sequence: usize,
    pub content_type: String,
    pub alt_text: String,
    pub width_px: Option<u32>,
    pub height_px: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ConversionResult {
    pub html: String,
    pub messages: Vec<String>,
}
