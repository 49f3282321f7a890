use std::collections::HashMap;

use super::{Archive, read_zip_text};

const CT_NS: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Formats a browser can render from a data URI.
const BROWSER_IMAGE_TYPES: &[&str] = &[
    "image/png",
    "image/gif",
    "image/jpeg",
    "image/svg+xml",
    "image/tiff",
    "image/webp",
    "image/bmp",
];

#[derive(Default)]
pub(super) struct ContentTypes {
    defaults: HashMap<String, String>,
    overrides: HashMap<String, String>,
}

impl ContentTypes {
    /// Content type for a zip path such as `word/media/image1.png`.
    pub(super) fn find(&self, part: &str) -> String {
        let key = format!("/{}", part.trim_start_matches('/'));
        if let Some(ct) = self.overrides.get(&key) {
            return ct.clone();
        }
        let ext = part
            .rsplit_once('.')
            .map(|(_, e)| e.to_ascii_lowercase())
            .unwrap_or_default();
        if let Some(ct) = self.defaults.get(&ext) {
            return ct.clone();
        }
        fallback_content_type(&ext).to_string()
    }
}

pub(super) fn is_browser_image(content_type: &str) -> bool {
    BROWSER_IMAGE_TYPES.contains(&content_type)
}

fn fallback_content_type(ext: &str) -> &'static str {
    match ext {
        "png" => "image/png",
        "gif" => "image/gif",
        "jpg" | "jpeg" | "jpe" => "image/jpeg",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "svg" => "image/svg+xml",
        "webp" => "image/webp",
        "emf" => "image/x-emf",
        "wmf" => "image/x-wmf",
        _ => "application/octet-stream",
    }
}

pub(super) fn parse_content_types(zip: &mut Archive) -> ContentTypes {
    let mut types = ContentTypes::default();
    let Some(xml_content) = read_zip_text(zip, "[Content_Types].xml") else {
        return types;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        return types;
    };
    for node in xml.root_element().children() {
        if node.tag_name().namespace() != Some(CT_NS) {
            continue;
        }
        let Some(content_type) = node.attribute("ContentType") else {
            continue;
        };
        match node.tag_name().name() {
            "Default" => {
                if let Some(ext) = node.attribute("Extension") {
                    types
                        .defaults
                        .insert(ext.to_ascii_lowercase(), content_type.to_string());
                }
            }
            "Override" => {
                if let Some(part) = node.attribute("PartName") {
                    types
                        .overrides
                        .insert(part.to_string(), content_type.to_string());
                }
            }
            _ => {}
        }
    }
    types
}
