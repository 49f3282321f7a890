mod content_types;
pub(crate) mod geometry;
mod numbering;
mod styles;

use std::collections::HashMap;
use std::io::{Cursor, Read};

use crate::error::Error;
use crate::model::{
    Alignment, Document, Element, Hyperlink, Image, List, ListItem, Numbering, Paragraph, Run,
    StyleRef, VertAlign,
};

use content_types::{ContentTypes, is_browser_image, parse_content_types};
use numbering::{NumberingInfo, parse_numbering};
use styles::{StylesInfo, parse_alignment, parse_styles};

pub(crate) type Archive<'a> = zip::ZipArchive<Cursor<&'a [u8]>>;

pub(crate) const DOCUMENT_PART: &str = "word/document.xml";

pub(super) const WML_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const DML_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const WPD_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

/// Parse a WML boolean toggle element (e.g., w:b, w:i, w:strike).
/// Present with no val or val != "0"/"false" means true.
pub(super) fn wml_bool(parent: roxmltree::Node, name: &str) -> Option<bool> {
    wml(parent, name).map(|n| {
        n.attribute((WML_NS, "val"))
            .is_none_or(|v| v != "0" && v != "false")
    })
}

pub(super) fn wml<'a>(
    node: roxmltree::Node<'a, 'a>,
    name: &str,
) -> Option<roxmltree::Node<'a, 'a>> {
    node.children()
        .find(|n| n.tag_name().name() == name && n.tag_name().namespace() == Some(WML_NS))
}

pub(super) fn wml_attr<'a>(node: roxmltree::Node<'a, 'a>, child: &str) -> Option<&'a str> {
    wml(node, child).and_then(|n| n.attribute((WML_NS, "val")))
}

fn is_wml(node: roxmltree::Node, name: &str) -> bool {
    node.tag_name().name() == name && node.tag_name().namespace() == Some(WML_NS)
}

pub(crate) fn open_archive(input: &[u8]) -> Result<Archive<'_>, Error> {
    zip::ZipArchive::new(Cursor::new(input))
        .map_err(|_| Error::InvalidArchive("file is not a ZIP archive".into()))
}

pub(super) fn read_zip_text(zip: &mut Archive, name: &str) -> Option<String> {
    let mut content = String::new();
    zip.by_name(name).ok()?.read_to_string(&mut content).ok()?;
    Some(content)
}

pub(crate) fn read_zip_bytes(zip: &mut Archive, name: &str) -> Result<Vec<u8>, Error> {
    let mut entry = zip
        .by_name(name)
        .map_err(|e| Error::ImageDecode(format!("{name}: {e}")))?;
    let mut data = Vec::new();
    entry.read_to_end(&mut data)?;
    Ok(data)
}

fn parse_rels_xml(xml_content: &str) -> HashMap<String, String> {
    let mut rels = HashMap::new();
    let Ok(xml) = roxmltree::Document::parse(xml_content) else {
        return rels;
    };
    for node in xml.root_element().children() {
        if node.tag_name().name() == "Relationship"
            && let (Some(id), Some(target)) = (node.attribute("Id"), node.attribute("Target"))
        {
            rels.insert(id.to_string(), target.to_string());
        }
    }
    rels
}

fn parse_relationships(zip: &mut Archive) -> HashMap<String, String> {
    let Some(xml_content) = read_zip_text(zip, "word/_rels/document.xml.rels") else {
        return HashMap::new();
    };
    parse_rels_xml(&xml_content)
}

/// Resolve a relationship target relative to the `word/` directory into a zip path.
fn part_path(target: &str) -> String {
    target
        .strip_prefix('/')
        .map(String::from)
        .unwrap_or_else(|| format!("word/{}", target.trim_start_matches("./")))
}

/// Flatten SDT wrappers and table cells into the sequence of block nodes.
fn collect_block_nodes<'a>(parent: roxmltree::Node<'a, 'a>) -> Vec<roxmltree::Node<'a, 'a>> {
    let mut nodes = Vec::new();
    for child in parent.children() {
        if is_wml(child, "sdt") {
            if let Some(content) = wml(child, "sdtContent") {
                nodes.extend(collect_block_nodes(content));
            }
        } else if is_wml(child, "tbl") {
            for row in child.children().filter(|n| is_wml(*n, "tr")) {
                for cell in row.children().filter(|n| is_wml(*n, "tc")) {
                    nodes.extend(collect_block_nodes(cell));
                }
            }
        } else {
            nodes.push(child);
        }
    }
    nodes
}

struct ParseContext<'s> {
    styles: &'s StylesInfo,
    numbering: &'s NumberingInfo,
    rels: &'s HashMap<String, String>,
    content_types: &'s ContentTypes,
    messages: Vec<String>,
}

impl ParseContext<'_> {
    fn warn(&mut self, message: String) {
        if !self.messages.contains(&message) {
            log::debug!("{message}");
            self.messages.push(message);
        }
    }

    fn paragraph(&mut self, node: roxmltree::Node) -> Paragraph {
        let styles = self.styles;
        let numbering_info = self.numbering;
        let ppr = wml(node, "pPr");

        let style = ppr.and_then(|ppr| wml_attr(ppr, "pStyle")).map(|id| {
            let def = styles.paragraph_styles.get(id);
            if def.is_none() {
                self.warn(format!(
                    "Paragraph style with ID {id} was referenced but not defined in the document"
                ));
            }
            (id, def)
        });

        let alignment = ppr
            .and_then(|ppr| wml_attr(ppr, "jc"))
            .map(parse_alignment)
            .or_else(|| style.and_then(|(_, def)| def.and_then(|d| d.alignment)))
            .unwrap_or(Alignment::Left);

        let numbering = ppr.and_then(|ppr| wml(ppr, "numPr")).and_then(|num_pr| {
            let num_id = wml_attr(num_pr, "numId")?;
            let parsed_id = num_id.parse::<u32>().ok().filter(|id| *id != 0)?;
            let level = wml_attr(num_pr, "ilvl")
                .and_then(|v| v.parse::<u8>().ok())
                .unwrap_or(0);
            Some(Numbering {
                num_id: parsed_id,
                level,
                ordered: numbering_info.is_ordered(num_id, level),
            })
        });

        let style = style.map(|(id, def)| StyleRef {
            id: id.to_string(),
            name: def.and_then(|d| d.name.clone()),
        });

        Paragraph {
            style,
            alignment,
            numbering,
            children: self.inline_children(node),
        }
    }

    fn inline_children(&mut self, parent: roxmltree::Node) -> Vec<Element> {
        let mut children = Vec::new();
        for child in parent.children() {
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                "r" => children.push(Element::Run(self.run(child))),
                "hyperlink" => {
                    let href = child
                        .attribute((REL_NS, "id"))
                        .and_then(|rid| self.rels.get(rid))
                        .cloned()
                        .or_else(|| child.attribute((WML_NS, "anchor")).map(|a| format!("#{a}")));
                    let inner = self.inline_children(child);
                    match href {
                        Some(href) => children.push(Element::Hyperlink(Hyperlink {
                            href,
                            children: inner,
                        })),
                        None => children.extend(inner),
                    }
                }
                "sdt" => {
                    if let Some(content) = wml(child, "sdtContent") {
                        children.extend(self.inline_children(content));
                    }
                }
                "ins" | "smartTag" | "customXml" | "fldSimple" => {
                    children.extend(self.inline_children(child));
                }
                _ => {}
            }
        }
        children
    }

    fn run(&mut self, node: roxmltree::Node) -> Run {
        let styles = self.styles;
        let rpr = wml(node, "rPr");

        let style = rpr.and_then(|n| wml_attr(n, "rStyle")).map(|id| {
            let def = styles.character_styles.get(id);
            if def.is_none() {
                self.warn(format!(
                    "Run style with ID {id} was referenced but not defined in the document"
                ));
            }
            StyleRef {
                id: id.to_string(),
                name: def.and_then(|d| d.name.clone()),
            }
        });

        let bold = rpr.and_then(|n| wml_bool(n, "b")).unwrap_or(false);
        let italic = rpr.and_then(|n| wml_bool(n, "i")).unwrap_or(false);
        let underline = rpr
            .and_then(|n| wml(n, "u"))
            .is_some_and(|u| u.attribute((WML_NS, "val")).is_some_and(|v| v != "none"));
        let strikethrough = rpr
            .and_then(|n| wml_bool(n, "strike").or_else(|| wml_bool(n, "dstrike")))
            .unwrap_or(false);
        let vertical_align = rpr
            .and_then(|n| wml_attr(n, "vertAlign"))
            .map(|v| match v {
                "superscript" => VertAlign::Superscript,
                "subscript" => VertAlign::Subscript,
                _ => VertAlign::Baseline,
            })
            .unwrap_or_default();
        let highlight = rpr
            .and_then(|n| wml_attr(n, "highlight"))
            .filter(|v| *v != "none")
            .map(|v| v.to_string());
        let font_size = rpr
            .and_then(|n| wml_attr(n, "sz"))
            .and_then(|v| v.parse::<u32>().ok());

        let mut children = Vec::new();
        let mut pending_text = String::new();
        let flush = |pending: &mut String, children: &mut Vec<Element>| {
            if !pending.is_empty() {
                children.push(Element::Text(std::mem::take(pending)));
            }
        };

        for child in node.children() {
            if child.tag_name().name() == "AlternateContent" {
                let choice = child.children().find(|n| n.tag_name().name() == "Choice");
                let drawings = choice
                    .into_iter()
                    .flat_map(|c| c.descendants())
                    .filter(|n| is_wml(*n, "drawing") && !in_text_box(*n));
                for drawing in drawings {
                    flush(&mut pending_text, &mut children);
                    children.extend(self.drawing(drawing));
                }
                continue;
            }
            if child.tag_name().namespace() != Some(WML_NS) {
                continue;
            }
            match child.tag_name().name() {
                "t" => {
                    if let Some(t) = child.text() {
                        // Word treats newlines in w:t as whitespace; only w:br creates line breaks
                        pending_text.push_str(&t.replace('\n', " "));
                    }
                }
                "tab" => pending_text.push('\t'),
                "noBreakHyphen" => pending_text.push('\u{2011}'),
                "br" | "cr" => {
                    let kind = child.attribute((WML_NS, "type"));
                    if matches!(kind, Some("page") | Some("column")) {
                        continue;
                    }
                    flush(&mut pending_text, &mut children);
                    children.push(Element::Break);
                }
                "drawing" => {
                    flush(&mut pending_text, &mut children);
                    children.extend(self.drawing(child));
                }
                _ => {}
            }
        }
        flush(&mut pending_text, &mut children);

        Run {
            style,
            bold,
            italic,
            underline,
            strikethrough,
            vertical_align,
            highlight,
            font_size,
            children,
        }
    }

    fn drawing(&mut self, drawing: roxmltree::Node) -> Vec<Element> {
        let mut images = Vec::new();
        for container in drawing.children() {
            let name = container.tag_name().name();
            if (name != "inline" && name != "anchor")
                || container.tag_name().namespace() != Some(WPD_NS)
            {
                continue;
            }

            let Some(embed_id) = find_blip_embed(container) else {
                log::warn!("Drawing without an embedded picture skipped");
                continue;
            };

            let part = match self.rels.get(embed_id) {
                Some(target) => part_path(target),
                None => {
                    log::warn!("Image relationship {embed_id} not found");
                    String::new()
                }
            };

            let content_type = self.content_types.find(&part);
            if !is_browser_image(&content_type) {
                self.warn(format!(
                    "Image of type {content_type} is unlikely to display in web browsers"
                ));
            }

            let doc_pr = container.children().find(|n| {
                n.tag_name().name() == "docPr" && n.tag_name().namespace() == Some(WPD_NS)
            });
            let alt_text = doc_pr
                .and_then(|n| {
                    n.attribute("descr")
                        .filter(|d| !d.trim().is_empty())
                        .or_else(|| n.attribute("title"))
                })
                .unwrap_or("")
                .to_string();

            images.push(Element::Image(Image {
                part,
                content_type,
                alt_text,
            }));
        }
        images
    }
}

/// Text box content is not part of the body flow; pictures inside it are skipped.
fn in_text_box(node: roxmltree::Node) -> bool {
    node.ancestors().any(|a| is_wml(a, "txbxContent"))
}

fn find_blip_embed<'a>(container: roxmltree::Node<'a, 'a>) -> Option<&'a str> {
    container
        .descendants()
        .filter(|n| n.tag_name().name() == "blip" && n.tag_name().namespace() == Some(DML_NS))
        .filter(|n| !in_text_box(*n))
        .find_map(|n| n.attribute((REL_NS, "embed")))
}

/// Group numbered paragraphs into (possibly nested) lists.
///
/// A new list starts at the same level when the numbering instance or the
/// list kind changes.
fn group_lists(blocks: Vec<Element>) -> Vec<Element> {
    struct OpenList {
        level: u8,
        num_id: u32,
        list: List,
    }

    let mut out: Vec<Element> = Vec::new();
    let mut open: Vec<OpenList> = Vec::new();

    fn close_top(open: &mut Vec<OpenList>, out: &mut Vec<Element>) {
        let Some(top) = open.pop() else {
            return;
        };
        let list = Element::List(top.list);
        match open.last_mut() {
            Some(parent) => match parent.list.children.last_mut() {
                Some(Element::ListItem(item)) => item.children.push(list),
                _ => parent.list.children.push(Element::ListItem(ListItem {
                    children: vec![list],
                })),
            },
            None => out.push(list),
        }
    }

    for block in blocks {
        let numbering = match &block {
            Element::Paragraph(p) => p.numbering,
            _ => None,
        };
        let Some(num) = numbering else {
            while !open.is_empty() {
                close_top(&mut open, &mut out);
            }
            out.push(block);
            continue;
        };

        while open.last().is_some_and(|top| top.level > num.level) {
            close_top(&mut open, &mut out);
        }
        if open.last().is_some_and(|top| {
            top.level == num.level && (top.num_id != num.num_id || top.list.ordered != num.ordered)
        }) {
            close_top(&mut open, &mut out);
        }

        let item = Element::ListItem(ListItem {
            children: vec![block],
        });
        match open.last_mut() {
            Some(top) if top.level == num.level => top.list.children.push(item),
            _ => open.push(OpenList {
                level: num.level,
                num_id: num.num_id,
                list: List {
                    ordered: num.ordered,
                    children: vec![item],
                },
            }),
        }
    }
    while !open.is_empty() {
        close_top(&mut open, &mut out);
    }
    out
}

/// Walk `word/document.xml` into an element tree.
pub(crate) fn parse(zip: &mut Archive) -> Result<Document, Error> {
    let styles = parse_styles(zip);
    let numbering = parse_numbering(zip);
    let rels = parse_relationships(zip);
    let content_types = parse_content_types(zip);

    let xml_content = read_zip_text(zip, DOCUMENT_PART).ok_or_else(|| {
        Error::MissingDocumentPart(format!("{DOCUMENT_PART} (is this a DOCX file?)"))
    })?;
    let xml = roxmltree::Document::parse(&xml_content)?;
    let body = wml(xml.root_element(), "body")
        .ok_or_else(|| Error::MissingDocumentPart("w:body".into()))?;

    let mut ctx = ParseContext {
        styles: &styles,
        numbering: &numbering,
        rels: &rels,
        content_types: &content_types,
        messages: Vec::new(),
    };

    let blocks: Vec<Element> = collect_block_nodes(body)
        .into_iter()
        .filter(|node| is_wml(*node, "p"))
        .map(|node| Element::Paragraph(ctx.paragraph(node)))
        .collect();

    Ok(Document {
        children: group_lists(blocks),
        messages: ctx.messages,
    })
}

/// Parse a DOCX held in memory.
pub fn parse_bytes(input: &[u8]) -> Result<Document, Error> {
    let mut zip = open_archive(input)?;
    parse(&mut zip)
}
