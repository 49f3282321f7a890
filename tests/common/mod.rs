#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;

const DOCUMENT_NAMESPACES: &str = concat!(
    r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" "#,
    r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" "#,
    r#"xmlns:wp="http://schemas.openxmlformats.org/drawingml/2006/wordprocessingDrawing" "#,
    r#"xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" "#,
    r#"xmlns:pic="http://schemas.openxmlformats.org/drawingml/2006/picture" "#,
    r#"xmlns:mc="http://schemas.openxmlformats.org/markup-compatibility/2006" "#,
    r#"xmlns:wps="http://schemas.microsoft.com/office/word/2010/wordprocessingShape" "#,
    r#"xmlns:v="urn:schemas-microsoft-com:vml""#,
);

const IMAGE_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/image";
const HYPERLINK_REL: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/hyperlink";

pub const EMU_PER_PX: u64 = 9525;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// In-memory DOCX assembled from raw WordprocessingML fragments.
#[derive(Default)]
pub struct DocxBuilder {
    body: String,
    styles: Option<String>,
    numbering: Option<String>,
    relationships: Vec<(String, String, String, bool)>,
    media: Vec<(String, Vec<u8>)>,
    skip_document: bool,
}

impl DocxBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn block(mut self, xml: impl AsRef<str>) -> Self {
        self.body.push_str(xml.as_ref());
        self
    }

    /// `styles` are `(type, id, name)` triples, e.g. `("paragraph", "Heading1", "heading 1")`.
    pub fn styles(mut self, styles: &[(&str, &str, &str)]) -> Self {
        let defs: String = styles
            .iter()
            .map(|(kind, id, name)| {
                format!(
                    r#"<w:style w:type="{kind}" w:styleId="{id}"><w:name w:val="{name}"/></w:style>"#
                )
            })
            .collect();
        self.styles = Some(format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:styles {DOCUMENT_NAMESPACES}>{defs}</w:styles>"#
        ));
        self
    }

    pub fn raw_styles(mut self, xml: impl Into<String>) -> Self {
        self.styles = Some(xml.into());
        self
    }

    pub fn numbering(mut self, xml: impl Into<String>) -> Self {
        self.numbering = Some(xml.into());
        self
    }

    /// Register an image relationship and store `data` under `word/media/{file}`.
    pub fn image(mut self, rel_id: &str, file: &str, data: Vec<u8>) -> Self {
        self.relationships
            .push((rel_id.into(), IMAGE_REL.into(), format!("media/{file}"), false));
        self.media.push((format!("word/media/{file}"), data));
        self
    }

    /// Register an image relationship whose target is never written.
    pub fn dangling_image(mut self, rel_id: &str, file: &str) -> Self {
        self.relationships
            .push((rel_id.into(), IMAGE_REL.into(), format!("media/{file}"), false));
        self
    }

    pub fn hyperlink(mut self, rel_id: &str, url: &str) -> Self {
        self.relationships
            .push((rel_id.into(), HYPERLINK_REL.into(), url.into(), true));
        self
    }

    pub fn without_document(mut self) -> Self {
        self.skip_document = true;
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(zip::CompressionMethod::Stored);
        let mut put = |name: &str, data: &[u8]| {
            zip.start_file(name, options).unwrap();
            zip.write_all(data).unwrap();
        };

        put("[Content_Types].xml", content_types().as_bytes());
        if !self.skip_document {
            let document = format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {DOCUMENT_NAMESPACES}><w:body>{}<w:sectPr/></w:body></w:document>"#,
                self.body
            );
            put("word/document.xml", document.as_bytes());
        }

        let rels: String = self
            .relationships
            .iter()
            .map(|(id, kind, target, external)| {
                let mode = if *external { r#" TargetMode="External""# } else { "" };
                format!(r#"<Relationship Id="{id}" Type="{kind}" Target="{target}"{mode}/>"#)
            })
            .collect();
        let rels = format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>"#
        );
        put("word/_rels/document.xml.rels", rels.as_bytes());

        if let Some(styles) = &self.styles {
            put("word/styles.xml", styles.as_bytes());
        }
        if let Some(numbering) = &self.numbering {
            put("word/numbering.xml", numbering.as_bytes());
        }
        for (name, data) in &self.media {
            put(name, data);
        }

        zip.finish().unwrap().into_inner()
    }
}

fn content_types() -> String {
    concat!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#,
        r#"<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">"#,
        r#"<Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>"#,
        r#"<Default Extension="xml" ContentType="application/xml"/>"#,
        r#"<Default Extension="png" ContentType="image/png"/>"#,
        r#"<Default Extension="emf" ContentType="image/x-emf"/>"#,
        r#"<Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>"#,
        r#"</Types>"#,
    )
    .to_string()
}

pub fn numbering_xml(abstract_formats: &[&[&str]]) -> String {
    let mut abstracts = String::new();
    let mut nums = String::new();
    for (index, levels) in abstract_formats.iter().enumerate() {
        let lvls: String = levels
            .iter()
            .enumerate()
            .map(|(ilvl, fmt)| {
                format!(r#"<w:lvl w:ilvl="{ilvl}"><w:numFmt w:val="{fmt}"/></w:lvl>"#)
            })
            .collect();
        abstracts.push_str(&format!(
            r#"<w:abstractNum w:abstractNumId="{index}">{lvls}</w:abstractNum>"#
        ));
        nums.push_str(&format!(
            r#"<w:num w:numId="{}"><w:abstractNumId w:val="{index}"/></w:num>"#,
            index + 1
        ));
    }
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:numbering {DOCUMENT_NAMESPACES}>{abstracts}{nums}</w:numbering>"#
    )
}

pub fn paragraph(inner: impl AsRef<str>) -> String {
    format!("<w:p>{}</w:p>", inner.as_ref())
}

pub fn aligned(jc: &str, inner: impl AsRef<str>) -> String {
    format!(
        r#"<w:p><w:pPr><w:jc w:val="{jc}"/></w:pPr>{}</w:p>"#,
        inner.as_ref()
    )
}

pub fn styled(style_id: &str, inner: impl AsRef<str>) -> String {
    format!(
        r#"<w:p><w:pPr><w:pStyle w:val="{style_id}"/></w:pPr>{}</w:p>"#,
        inner.as_ref()
    )
}

pub fn list_item(num_id: u32, ilvl: u8, inner: impl AsRef<str>) -> String {
    format!(
        r#"<w:p><w:pPr><w:numPr><w:ilvl w:val="{ilvl}"/><w:numId w:val="{num_id}"/></w:numPr></w:pPr>{}</w:p>"#,
        inner.as_ref()
    )
}

pub fn run(text: &str) -> String {
    format!(r#"<w:r><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

pub fn formatted_run(properties: &str, text: &str) -> String {
    format!(r#"<w:r><w:rPr>{properties}</w:rPr><w:t xml:space="preserve">{text}</w:t></w:r>"#)
}

/// A run holding one inline picture sized `width_px` x `height_px`.
pub fn picture(rel_id: &str, id: u32, width_px: u64, height_px: u64, alt: &str) -> String {
    let (cx, cy) = (width_px * EMU_PER_PX, height_px * EMU_PER_PX);
    format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline distT="0" distB="0" distL="0" distR="0">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}" descr="{alt}"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill>"#,
            r#"<pic:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="{cx}" cy="{cy}"/></a:xfrm></pic:spPr>"#,
            r#"</pic:pic></a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        cx = cx,
        cy = cy,
        id = id,
        alt = alt,
        rel_id = rel_id,
    )
}

/// A floating text box run, as Word writes it: a `wps` shape with a VML fallback.
pub fn text_box(width_px: u64, height_px: u64, text: &str) -> String {
    let (cx, cy) = (width_px * EMU_PER_PX, height_px * EMU_PER_PX);
    format!(
        concat!(
            r#"<w:r><mc:AlternateContent><mc:Choice Requires="wps"><w:drawing>"#,
            r#"<wp:anchor distT="0" distB="0" distL="114300" distR="114300">"#,
            r#"<wp:extent cx="{cx}" cy="{cy}"/><wp:docPr id="90" name="Text Box 90"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.microsoft.com/office/word/2010/wordprocessingShape">"#,
            r#"<wps:wsp><wps:txbx><w:txbxContent><w:p><w:r><w:t>{text}</w:t></w:r></w:p>"#,
            r#"</w:txbxContent></wps:txbx></wps:wsp></a:graphicData></a:graphic>"#,
            r#"</wp:anchor></w:drawing></mc:Choice><mc:Fallback><w:pict><v:shape>"#,
            r#"<v:textbox><w:txbxContent><w:p><w:r><w:t>{text}</w:t></w:r></w:p>"#,
            r#"</w:txbxContent></v:textbox></v:shape></w:pict></mc:Fallback>"#,
            r#"</mc:AlternateContent></w:r>"#,
        ),
        cx = cx,
        cy = cy,
        text = text,
    )
}

/// A picture run with no `wp:extent`, so no display geometry is declared.
pub fn unsized_picture(rel_id: &str, id: u32) -> String {
    format!(
        concat!(
            r#"<w:r><w:drawing><wp:inline>"#,
            r#"<wp:docPr id="{id}" name="Picture {id}"/>"#,
            r#"<a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/picture">"#,
            r#"<pic:pic><pic:blipFill><a:blip r:embed="{rel_id}"/></pic:blipFill></pic:pic>"#,
            r#"</a:graphicData></a:graphic></wp:inline></w:drawing></w:r>"#,
        ),
        id = id,
        rel_id = rel_id,
    )
}

pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    image::RgbImage::new(width, height)
        .write_to(&mut out, image::ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Every `<img ...>` tag in document order.
pub fn img_tags(html: &str) -> Vec<&str> {
    let mut tags = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find("<img ") {
        let Some(len) = rest[start..].find('>') else {
            break;
        };
        tags.push(&rest[start..start + len + 1]);
        rest = &rest[start + len + 1..];
    }
    tags
}

pub fn attribute<'h>(tag: &'h str, name: &str) -> Option<&'h str> {
    let key = format!(" {name}=\"");
    let start = tag.find(&key)? + key.len();
    let len = tag[start..].find('"')?;
    Some(&tag[start..start + len])
}
