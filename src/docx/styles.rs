use std::collections::HashMap;

use crate::model::Alignment;

use super::{Archive, WML_NS, read_zip_text, wml, wml_attr};

pub(super) struct StyleDef {
    pub(super) name: Option<String>,
    pub(super) alignment: Option<Alignment>,
    pub(super) based_on: Option<String>,
}

#[derive(Default)]
pub(super) struct StylesInfo {
    pub(super) paragraph_styles: HashMap<String, StyleDef>,
    pub(super) character_styles: HashMap<String, StyleDef>,
}

pub(super) fn parse_alignment(val: &str) -> Alignment {
    match val {
        "center" => Alignment::Center,
        "right" | "end" => Alignment::Right,
        "both" | "distribute" => Alignment::Justify,
        _ => Alignment::Left,
    }
}

pub(super) fn parse_styles(zip: &mut Archive) -> StylesInfo {
    let Some(xml_content) = read_zip_text(zip, "word/styles.xml") else {
        return StylesInfo::default();
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        log::warn!("word/styles.xml is not well-formed, style names will be unavailable");
        return StylesInfo::default();
    };

    let mut styles = StylesInfo::default();

    for style_node in xml.root_element().children() {
        if style_node.tag_name().name() != "style"
            || style_node.tag_name().namespace() != Some(WML_NS)
        {
            continue;
        }
        let Some(style_id) = style_node.attribute((WML_NS, "styleId")) else {
            continue;
        };

        let name = wml_attr(style_node, "name").map(|s| s.to_string());
        let based_on = wml_attr(style_node, "basedOn").map(|s| s.to_string());

        match style_node.attribute((WML_NS, "type")) {
            Some("paragraph") => {
                let alignment = wml(style_node, "pPr")
                    .and_then(|ppr| wml_attr(ppr, "jc"))
                    .map(parse_alignment);
                styles.paragraph_styles.insert(
                    style_id.to_string(),
                    StyleDef {
                        name,
                        alignment,
                        based_on,
                    },
                );
            }
            Some("character") => {
                styles.character_styles.insert(
                    style_id.to_string(),
                    StyleDef {
                        name,
                        alignment: None,
                        based_on,
                    },
                );
            }
            _ => {}
        }
    }

    resolve_based_on(&mut styles.paragraph_styles);
    styles
}

/// Fill in alignment inherited through `w:basedOn` chains.
fn resolve_based_on(styles: &mut HashMap<String, StyleDef>) {
    let ids: Vec<String> = styles.keys().cloned().collect();
    for id in ids {
        let mut chain: Vec<String> = Vec::new();
        let mut current = id.clone();
        loop {
            if chain.contains(&current) {
                break;
            }
            chain.push(current.clone());
            match styles.get(&current).and_then(|s| s.based_on.clone()) {
                Some(parent) => current = parent,
                None => break,
            }
        }

        // Closest ancestor wins.
        let inherited = chain
            .iter()
            .filter_map(|ancestor| styles.get(ancestor).and_then(|s| s.alignment))
            .next();

        if let Some(s) = styles.get_mut(&id) {
            s.alignment = s.alignment.or(inherited);
        }
    }
}
