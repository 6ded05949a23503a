//! Renderer-agnostic display data: what a wiki page for one object shows.

use crate::conditions::ConditionEffects;
use crate::dismantle::DismantleResults;
use crate::recipes::RecipeSummary;
use crate::repair::RepairRequirements;
use crate::scavenging::Scavenging;
use pakdump_core::Taxonomy;
use serde::Serialize;
use std::fmt;

/// Stack size the game uses when a stackable item does not set one.
pub const DEFAULT_STACK_SIZE: i64 = 50;

// ---------------------------------------------------------------------------
// Wiki references
// ---------------------------------------------------------------------------

/// Link to another wiki page, rendered as `[[Page_Name|label]]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WikiReference {
    pub page: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl WikiReference {
    pub fn new(page: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            text: None,
        }
    }

    pub fn with_text(page: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            page: page.into(),
            text: Some(text.into()),
        }
    }

    /// Page titles use underscores for spaces.
    pub fn page_name(&self) -> String {
        self.page.replace(' ', "_")
    }

    /// Label shown to the reader.
    pub fn label(&self) -> &str {
        self.text.as_deref().unwrap_or(&self.page)
    }
}

impl fmt::Display for WikiReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.text {
            Some(text) => write!(f, "[[{}|{}]]", self.page_name(), text),
            None => write!(f, "[[{}]]", self.page_name()),
        }
    }
}

/// `2× [[Iron_Scrap]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemCountReference {
    pub reference: WikiReference,
    pub count: i64,
}

impl ItemCountReference {
    pub fn new(name: impl Into<String>, count: i64) -> Self {
        Self {
            reference: WikiReference::new(name),
            count,
        }
    }

    pub fn name(&self) -> &str {
        &self.reference.page
    }
}

impl fmt::Display for ItemCountReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}× {}", self.count, self.reference)
    }
}

/// `1-5× [[Plastic_Scrap]]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ItemMinMaxReference {
    pub reference: WikiReference,
    pub min: i64,
    pub max: i64,
}

impl ItemMinMaxReference {
    pub fn new(name: impl Into<String>, min: i64, max: i64) -> Self {
        Self {
            reference: WikiReference::new(name),
            min,
            max,
        }
    }

    pub fn name(&self) -> &str {
        &self.reference.page
    }
}

impl fmt::Display for ItemMinMaxReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}× {}", self.min, self.max, self.reference)
    }
}

// ---------------------------------------------------------------------------
// Infoboxes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemInfobox {
    pub title: String,
    pub image: String,
    pub item_id: String,
    pub description: Option<String>,
    pub weight: Option<String>,
    pub stackable: bool,
    pub max_stack: Option<i64>,
}

impl ItemInfobox {
    /// `"No"`, or `"Yes (60)"` with the stack size.
    pub fn stackable_str(&self) -> String {
        if !self.stackable {
            return "No".to_string();
        }
        format!("Yes ({})", self.max_stack.unwrap_or(DEFAULT_STACK_SIZE))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MeleeStats {
    pub damage_type: Option<String>,
    pub swing_time: Option<f64>,
    pub base_damage: Option<f64>,
    /// Base damage per second of swinging.
    pub base_dps: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeaponInfobox {
    #[serde(flatten)]
    pub item: ItemInfobox,
    pub firearm_damage: Option<String>,
    pub ammo_type: Option<String>,
    pub ammo_capacity: Option<String>,
    pub melee: Option<MeleeStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClothingInfobox {
    #[serde(flatten)]
    pub item: ItemInfobox,
    pub insulation: Option<f64>,
    pub armor: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluidInfobox {
    pub title: String,
    pub image: String,
    pub item_id: String,
    pub freezing_point: Option<String>,
    pub thirst_per_ml: Option<f64>,
    pub decays: bool,
    pub sanitizes_wounds: bool,
}

/// Infobox variant; `template` names the wiki template that renders it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "template", rename_all = "snake_case")]
pub enum Infobox {
    Item(ItemInfobox),
    Weapon(WeaponInfobox),
    Clothing(ClothingInfobox),
    Fluid(FluidInfobox),
}

impl Infobox {
    pub fn title(&self) -> &str {
        match self {
            Infobox::Item(item) => &item.title,
            Infobox::Weapon(weapon) => &weapon.item.title,
            Infobox::Clothing(clothing) => &clothing.item.title,
            Infobox::Fluid(fluid) => &fluid.title,
        }
    }
}

// ---------------------------------------------------------------------------
// Page aggregate
// ---------------------------------------------------------------------------

/// Ways to get hold of the object.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Obtaining {
    pub crafting: Vec<RecipeSummary>,
    pub cooking: Vec<RecipeSummary>,
    pub scavenging: Option<Scavenging>,
}

impl Obtaining {
    pub fn is_empty(&self) -> bool {
        self.crafting.is_empty() && self.cooking.is_empty() && self.scavenging.is_none()
    }
}

/// What the object is good for once you have it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Usage {
    pub dismantle: Option<DismantleResults>,
    pub repair: Option<RepairRequirements>,
    pub conditions: Vec<ConditionEffects>,
}

impl Usage {
    pub fn is_empty(&self) -> bool {
        self.dismantle.is_none() && self.repair.is_none() && self.conditions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DisplayData {
    /// Graph key of the node the page was derived from.
    pub key: String,
    pub console_name: String,
    /// Output folder, `template/sub_type`.
    pub folder: String,
    pub title: String,
    pub taxonomy: Taxonomy,
    pub infobox: Infobox,
    pub categories: Vec<String>,
    /// `None` when the object cannot be obtained in any known way.
    pub obtaining: Option<Obtaining>,
    pub usage: Option<Usage>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wiki_reference_formatting() {
        let linked = WikiReference::with_text("Wolfram 17 Magazine - 17 Round", "17 Rounds");
        assert_eq!(linked.to_string(), "[[Wolfram_17_Magazine_-_17_Round|17 Rounds]]");
        assert_eq!(linked.label(), "17 Rounds");

        let plain = WikiReference::new("Plastic Scrap");
        assert_eq!(plain.to_string(), "[[Plastic_Scrap]]");
        assert_eq!(plain.label(), "Plastic Scrap");
    }

    #[test]
    fn test_count_references() {
        assert_eq!(ItemCountReference::new("Iron Scrap", 2).to_string(), "2× [[Iron_Scrap]]");
        assert_eq!(
            ItemMinMaxReference::new("Plastic Scrap", 1, 5).to_string(),
            "1-5× [[Plastic_Scrap]]"
        );
    }

    #[test]
    fn test_stackable_str() {
        let mut item = ItemInfobox {
            title: "9mm Round".into(),
            image: "BP_Ammo_9mm.png".into(),
            item_id: "BP_Ammo_9mm".into(),
            description: None,
            weight: None,
            stackable: false,
            max_stack: None,
        };
        assert_eq!(item.stackable_str(), "No");
        item.stackable = true;
        assert_eq!(item.stackable_str(), "Yes (50)");
        item.max_stack = Some(60);
        assert_eq!(item.stackable_str(), "Yes (60)");
    }
}
