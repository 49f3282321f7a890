use std::collections::HashMap;

use super::{Archive, WML_NS, read_zip_text, wml_attr};

#[derive(Default)]
pub(super) struct NumberingInfo {
    /// abstractNumId -> ilvl -> numFmt
    abstract_nums: HashMap<String, HashMap<u8, String>>,
    num_to_abstract: HashMap<String, String>,
}

impl NumberingInfo {
    pub(super) fn is_ordered(&self, num_id: &str, level: u8) -> bool {
        self.num_to_abstract
            .get(num_id)
            .and_then(|abs_id| self.abstract_nums.get(abs_id))
            .and_then(|levels| levels.get(&level))
            .is_some_and(|fmt| fmt != "bullet" && fmt != "none")
    }
}

pub(super) fn parse_numbering(zip: &mut Archive) -> NumberingInfo {
    let mut info = NumberingInfo::default();

    let Some(xml_content) = read_zip_text(zip, "word/numbering.xml") else {
        return info;
    };
    let Ok(xml) = roxmltree::Document::parse(&xml_content) else {
        return info;
    };

    for node in xml.root_element().children() {
        if node.tag_name().namespace() != Some(WML_NS) {
            continue;
        }
        match node.tag_name().name() {
            "abstractNum" => {
                let Some(abs_id) = node.attribute((WML_NS, "abstractNumId")) else {
                    continue;
                };
                let mut levels: HashMap<u8, String> = HashMap::new();
                for lvl in node.children() {
                    if lvl.tag_name().name() != "lvl" || lvl.tag_name().namespace() != Some(WML_NS)
                    {
                        continue;
                    }
                    let Some(ilvl) = lvl
                        .attribute((WML_NS, "ilvl"))
                        .and_then(|v| v.parse::<u8>().ok())
                    else {
                        continue;
                    };
                    let num_fmt = wml_attr(lvl, "numFmt").unwrap_or("bullet").to_string();
                    levels.insert(ilvl, num_fmt);
                }
                info.abstract_nums.insert(abs_id.to_string(), levels);
            }
            "num" => {
                let Some(num_id) = node.attribute((WML_NS, "numId")) else {
                    continue;
                };
                let Some(abs_id) = wml_attr(node, "abstractNumId") else {
                    continue;
                };
                info.num_to_abstract
                    .insert(num_id.to_string(), abs_id.to_string());
            }
            _ => {}
        }
    }

    info
}
