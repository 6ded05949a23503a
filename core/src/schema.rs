//! Typed shapes of the structured property payloads the derivation reads.

use crate::reference::ObjectReference;
use serde::{Deserialize, Serialize};

/// `{"Item": <ref>, "Quantity": n}` as used by recipes and repair costs.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct QuantityRef {
    #[serde(rename = "Item")]
    pub item: ObjectReference,
    #[serde(rename = "Quantity")]
    pub quantity: i64,
}

/// `{"Key": "...", "Value": x}` pairs used for condition magnitudes and XP.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct KeyValue {
    #[serde(rename = "Key")]
    pub key: String,
    #[serde(rename = "Value")]
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ItemCount {
    pub min: i64,
    #[serde(default)]
    pub max: Option<i64>,
}

impl ItemCount {
    /// Upper bound; a missing max means exactly `min`.
    pub fn upper(&self) -> i64 {
        self.max.unwrap_or(self.min)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub enum Rarity {
    #[serde(rename = "ERarity::Common")]
    Common,
    #[serde(rename = "ERarity::Likely")]
    Likely,
    #[serde(rename = "ERarity::Uncommon")]
    Uncommon,
    #[serde(rename = "ERarity::Rare")]
    Rare,
    #[serde(rename = "ERarity::VeryRare")]
    VeryRare,
}

/// One weighted entry of an `ItemList`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemListEntry {
    #[serde(rename = "Item")]
    pub item: ObjectReference,
    #[serde(rename = "ItemCount")]
    pub item_count: ItemCount,
    #[serde(rename = "SpawnChance", default)]
    pub spawn_chance: Option<Rarity>,
    #[serde(rename = "ChanceToNotSpawn", default)]
    pub chance_to_not_spawn: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ItemListProps {
    #[serde(rename = "Items", default)]
    pub items: Vec<ItemListEntry>,
}

/// One nested list of an `ItemSpawnlist`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpawnListEntry {
    #[serde(rename = "List")]
    pub list: ObjectReference,
    #[serde(rename = "SpawnChance", default)]
    pub spawn_chance: Option<Rarity>,
    #[serde(rename = "ChanceToNotSpawn", default)]
    pub chance_to_not_spawn: f64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ItemSpawnListProps {
    #[serde(rename = "Lists", default)]
    pub lists: Vec<SpawnListEntry>,
    #[serde(rename = "ItemCount")]
    pub item_count: ItemCount,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct FoodConditionSetProps {
    #[serde(rename = "ConditionsOnEat", default)]
    pub conditions: Vec<KeyValue>,
    #[serde(rename = "AddictionTypesOnEat", default)]
    pub addictions: Vec<KeyValue>,
    #[serde(rename = "XPGain", default)]
    pub xp_gain: Vec<KeyValue>,
    #[serde(rename = "BloodSugarImpact", default)]
    pub blood_sugar_impact: Option<f64>,
}

/// One alternative ingredient set of a recipe.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct PossibleIngredients {
    #[serde(rename = "Ingredients", default)]
    pub ingredients: Vec<QuantityRef>,
    #[serde(rename = "ToolObjects", default)]
    pub tool_objects: Vec<ObjectReference>,
    #[serde(rename = "Fluids", default)]
    pub fluids: Vec<KeyValue>,
}
