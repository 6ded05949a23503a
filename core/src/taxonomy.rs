//! Classification of records for wiki output, inferred from dump naming conventions.

use crate::record::{ObjectRecord, RecordKind};
use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

/// Base classes a blueprint chain can bottom out in.
const BASE_CLASS_SUFFIXES: &[&str] = &["Item"];

/// Console-name prefixes used when the base class itself carries no sub-type.
const CONSOLE_NAME_HINTS: &[(&str, &str)] = &[
    ("BP_Magazine_", "magazine"),
    ("BP_Ammo_", "bullet"),
    ("BP_Firearm_", "firearm"),
    ("BP_Melee_", "melee"),
    ("BP_Clothing_", "clothing"),
];

fn item_type_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^ItemType'IT_(\w+)'$").ok())
        .as_ref()
}

fn build_category_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^BuildObjectCategory'BOC_(\w+)'$").ok())
        .as_ref()
}

fn base_class_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| {
            let suffixes = BASE_CLASS_SUFFIXES.join("|");
            Regex::new(&format!(r"^Class'(\w*?)({suffixes})'$")).ok()
        })
        .as_ref()
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Taxonomy {
    pub template: Option<String>,
    pub super_type: Option<String>,
    pub sub_type: Option<String>,
    pub display_tag: Option<String>,
    pub categories: Vec<String>,
}

impl Taxonomy {
    pub fn derive(record: &ObjectRecord) -> Self {
        if let Some(sub) = record
            .properties
            .reference("Type")
            .and_then(|reference| {
                item_type_pattern()?
                    .captures(&reference.object_name)
                    .map(|caps| caps[1].to_lowercase())
            })
        {
            return Self::from_parts(Some("item"), Some("item"), Some(sub));
        }

        if let Some(caps) = record
            .template
            .as_ref()
            .and_then(|chain| base_class_pattern()?.captures(&chain.object_name))
        {
            let base = caps[2].to_lowercase();
            let prefix = caps[1].to_lowercase();
            let sub = if prefix.is_empty() {
                infer_sub_type(record)
            } else {
                Some(prefix)
            };
            return Self::from_parts(Some(&base), Some(&base), sub);
        }

        match record.kind {
            RecordKind::Fluid => {
                Self::from_parts(Some("item"), Some("fluid"), Some("fluid".to_string()))
            }
            RecordKind::Recipe => {
                let sub = snake_case(bare_type_name(record));
                Self::from_parts(None, Some("recipe"), Some(sub))
            }
            RecordKind::BuildObject => match build_group(record) {
                Some(group) => Self::from_parts(Some("item"), Some("buildable object"), Some(group)),
                None => Self::default(),
            },
            RecordKind::FoodConditionSet => Self::from_parts(None, Some("food_condition_set"), None),
            _ => Self::default(),
        }
    }

    fn from_parts(template: Option<&str>, super_type: Option<&str>, sub_type: Option<String>) -> Self {
        let display_tag = sub_type
            .as_deref()
            .or(super_type)
            .map(title_case);

        let mut categories = Vec::new();
        for label in sub_type.as_deref().into_iter().chain(super_type) {
            let label = title_case(label);
            if !categories.contains(&label) {
                categories.push(label);
            }
        }

        Self {
            template: template.map(str::to_string),
            super_type: super_type.map(str::to_string),
            sub_type,
            display_tag,
            categories,
        }
    }

    /// No classification: the record gets no wiki page.
    pub fn is_empty(&self) -> bool {
        self.template.is_none() && self.super_type.is_none() && self.sub_type.is_none()
    }

    pub fn is_sub_type(&self, sub_type: &str) -> bool {
        self.sub_type.as_deref() == Some(sub_type)
    }

    pub fn is_super_type(&self, super_type: &str) -> bool {
        self.super_type.as_deref() == Some(super_type)
    }

    /// Output folder, `template/sub_type` (or just the template).
    pub fn folder(&self) -> Option<String> {
        let template = self.template.as_deref()?;
        Some(match self.sub_type.as_deref() {
            Some(sub) => format!("{template}/{sub}"),
            None => template.to_string(),
        })
    }
}

fn infer_sub_type(record: &ObjectRecord) -> Option<String> {
    let console_name = record.console_name();
    CONSOLE_NAME_HINTS
        .iter()
        .find(|(prefix, _)| console_name.starts_with(prefix))
        .map(|(_, sub)| sub.to_string())
        .or_else(|| {
            record
                .properties
                .contains("MeleeDamageType")
                .then(|| "melee".to_string())
        })
}

/// Lowercased `BOC_<Group>` of the build object's category.
fn build_group(record: &ObjectRecord) -> Option<String> {
    let category = record.properties.reference("BuildObjectCategory")?;
    let caps = build_category_pattern()?.captures(&category.object_name)?;
    Some(caps[1].to_lowercase())
}

fn bare_type_name(record: &ObjectRecord) -> &str {
    record
        .type_name
        .strip_prefix("UE")
        .filter(|rest| rest.starts_with(|c: char| c.is_ascii_uppercase()))
        .unwrap_or(&record.type_name)
}

/// `HeatConverterRecipe` -> `heat_converter_recipe`.
fn snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    for (i, c) in value.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if i > 0 {
                out.push('_');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// `food_condition_set` -> `Food Condition Set`.
pub fn title_case(value: &str) -> String {
    value
        .split(|c: char| c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
