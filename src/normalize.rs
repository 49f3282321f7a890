//! Tree passes run between parsing and serialization.
//!
//! [`collect_facts`] records formatting the HTML writer cannot express and
//! pins blank paragraphs with placeholder tokens; [`transform`] rewrites runs
//! and heading paragraphs into tag stand-ins.

use crate::model::{
    Alignment, AlignmentFact, Element, Facts, FontSizeFact, HighlightFact, Paragraph, Run,
    StyleRef, Tag,
};

const HEADING_STYLES: &[(&str, &str)] = &[
    ("Heading 1", "h1"),
    ("Heading 2", "h2"),
    ("Heading 3", "h3"),
];

const DEFAULT_HIGHLIGHT: &str = "#ffff00";

/// Placeholder text for the `index`-th blank paragraph (1-based).
pub(crate) fn empty_paragraph_marker(index: usize) -> String {
    format!("__docx_html_empty_paragraph_{index}__")
}

/// CSS color for a `w:highlight` value.
pub(crate) fn highlight_color(name: &str) -> &'static str {
    match name {
        "yellow" => "#ffff00",
        "green" => "#00ff00",
        "cyan" => "#00ffff",
        "magenta" => "#ff00ff",
        "blue" => "#0000ff",
        "red" => "#ff0000",
        "darkBlue" => "#000080",
        "darkCyan" => "#008080",
        "darkGreen" => "#008000",
        "darkMagenta" => "#800080",
        "darkRed" => "#800000",
        "darkYellow" => "#808000",
        "lightGray" => "#c0c0c0",
        _ => DEFAULT_HIGHLIGHT,
    }
}

fn heading_tag(paragraph: &Paragraph) -> Option<&'static str> {
    let name = paragraph.style.as_ref()?.name.as_deref()?;
    HEADING_STYLES
        .iter()
        .find(|(style, _)| style.eq_ignore_ascii_case(name))
        .map(|(_, tag)| *tag)
}

fn is_highlight_style(style: &StyleRef) -> bool {
    style.display_name().eq_ignore_ascii_case("Highlight")
}

fn is_blank(children: &[Element]) -> bool {
    let text: String = children.iter().map(Element::text).collect();
    text.trim().is_empty() && !children.iter().any(Element::contains_image)
}

#[derive(Default)]
struct FactCollector {
    facts: Facts,
}

impl FactCollector {
    fn visit(&mut self, element: &mut Element, in_list_item: bool) {
        match element {
            Element::Paragraph(paragraph) => {
                // List items render without a <p>, so a marker there would never be restored.
                if !in_list_item && is_blank(&paragraph.children) {
                    self.facts.empty_paragraphs += 1;
                    // Must serialize as a plain <p>, never a heading.
                    paragraph.style = None;
                    paragraph.children =
                        vec![Element::Text(empty_paragraph_marker(self.facts.empty_paragraphs))];
                    return;
                }
                if !in_list_item
                    && paragraph.alignment != Alignment::Left
                    && heading_tag(paragraph).is_none()
                {
                    // Image-only paragraphs are aligned from geometry instead.
                    let text: String = paragraph.children.iter().map(Element::text).collect();
                    if !text.trim().is_empty() {
                        self.facts.alignments.push(AlignmentFact {
                            matched_text: text,
                            alignment: paragraph.alignment,
                            is_list_item: false,
                        });
                    }
                }
            }
            Element::ListItem(item) => {
                let aligned = item.children.iter().find_map(|child| match child {
                    Element::Paragraph(p) if p.alignment != Alignment::Left => Some(p.alignment),
                    _ => None,
                });
                if let Some(alignment) = aligned {
                    let text: String = item.children.iter().map(Element::text).collect();
                    if !text.trim().is_empty() {
                        self.facts.alignments.push(AlignmentFact {
                            matched_text: text,
                            alignment,
                            is_list_item: true,
                        });
                    }
                }
            }
            Element::Run(run) => self.record_run(run),
            _ => {}
        }

        let in_list_item = in_list_item || matches!(element, Element::ListItem(_));
        if let Some(children) = element.children_mut() {
            for child in children {
                self.visit(child, in_list_item);
            }
        }
    }

    fn record_run(&mut self, run: &Run) {
        if run.highlight.is_none() && run.font_size.is_none() {
            return;
        }
        let leaves: Vec<&str> = run
            .children
            .iter()
            .flat_map(|child| child.text_leaves())
            // Whitespace-only leaves would match the first space anywhere in the output.
            .filter(|text| !text.trim().is_empty())
            .collect();

        if let Some(name) = &run.highlight {
            let css_color = highlight_color(name);
            for text in &leaves {
                self.facts.highlights.push(HighlightFact {
                    matched_text: text.to_string(),
                    css_color,
                });
            }
        }
        if let Some(half_points) = run.font_size {
            let css_size = format_points(half_points);
            for text in &leaves {
                self.facts.font_sizes.push(FontSizeFact {
                    matched_text: text.to_string(),
                    css_size: css_size.clone(),
                });
            }
        }
    }
}

fn format_points(half_points: u32) -> String {
    if half_points % 2 == 0 {
        format!("{}pt", half_points / 2)
    } else {
        format!("{}.5pt", half_points / 2)
    }
}

/// Record side-channel facts and replace blank paragraphs with placeholder tokens.
pub fn collect_facts(mut children: Vec<Element>) -> (Vec<Element>, Facts) {
    let mut collector = FactCollector::default();
    for child in &mut children {
        collector.visit(child, false);
    }
    (children, collector.facts)
}

/// Rewrite one element into its tag stand-in, if it has one.
pub fn transform_element(element: Element) -> Element {
    match element {
        Element::Run(run) if run.style.as_ref().is_some_and(is_highlight_style) => {
            Element::Tag(
                Tag::new("span", run.children).with_attribute("style", "background-color: yellow;"),
            )
        }
        Element::Run(mut run) => {
            if run.bold {
                run.children = vec![Element::Tag(Tag::new("strong", run.children))];
                run.bold = false;
            }
            if run.italic {
                run.children = vec![Element::Tag(Tag::new("em", run.children))];
                run.italic = false;
            }
            if run.underline {
                run.children = vec![Element::Tag(Tag::new("u", run.children))];
                run.underline = false;
            }
            Element::Run(run)
        }
        Element::Paragraph(paragraph) => match heading_tag(&paragraph) {
            Some(tag) => Element::Tag(Tag::new(tag, paragraph.children)),
            None => Element::Paragraph(paragraph),
        },
        other => other,
    }
}

/// Apply [`transform_element`] bottom-up over the whole tree.
pub fn transform(children: Vec<Element>) -> Vec<Element> {
    children.into_iter().map(transform_tree).collect()
}

fn transform_tree(mut element: Element) -> Element {
    if let Some(children) = element.children_mut() {
        let taken = std::mem::take(children);
        *children = transform(taken);
    }
    transform_element(element)
}
