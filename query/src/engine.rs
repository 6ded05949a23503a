use crate::conditions::{condition_effects, humanize};
use crate::dismantle::dismantle_results;
use crate::display::{
    ClothingInfobox, DisplayData, FluidInfobox, Infobox, ItemInfobox, MeleeStats, Obtaining, Usage,
    WeaponInfobox, WikiReference,
};
use crate::metrology::{temperature_str, weight_str};
use crate::recipes::recipes;
use crate::repair::repair_requirements;
use crate::scavenging::scavenging;
use ingestion::ReferenceResolver;
use pakdump_core::{ObjectRecord, RecordKind};
use regex::Regex;
use std::sync::OnceLock;
use storage::{Node, ObjectGraph, RelationKind};
use tracing::{debug, warn};

fn damage_type_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^DT_(\w+?)(?:_C)?$").ok())
        .as_ref()
}

/// Read-only derivation of wiki display data from an imported graph.
///
/// Multi-hop lookups follow graph edges; records that were never imported
/// (spawn lists, condition sets, tools referenced from recipes) are loaded
/// through the resolver. Every gap is soft: the field is left empty and a
/// warning is logged.
pub struct DerivationEngine<'g> {
    graph: &'g ObjectGraph,
    resolver: &'g ReferenceResolver,
}

impl<'g> DerivationEngine<'g> {
    pub fn new(graph: &'g ObjectGraph, resolver: &'g ReferenceResolver) -> Self {
        Self { graph, resolver }
    }

    /// Display data for every node with a wiki template, in graph order.
    pub fn display_data(&self) -> Vec<DisplayData> {
        self.graph
            .nodes()
            .filter_map(|node| self.prepare_display_data(node))
            .collect()
    }

    /// `None` for records the taxonomy gives no template (item types, recipes,
    /// unclassified blueprints, ...).
    pub fn prepare_display_data(&self, node: &Node) -> Option<DisplayData> {
        let record = node.record();
        let taxonomy = record.taxonomy();
        let folder = taxonomy.folder()?;

        let infobox = self.infobox(node);
        let data = DisplayData {
            key: node.id().to_string(),
            console_name: record.console_name().to_string(),
            folder,
            title: infobox.title().to_string(),
            taxonomy: taxonomy.clone(),
            categories: self.categories(node),
            obtaining: Some(self.obtaining(node)).filter(|obtaining| !obtaining.is_empty()),
            usage: Some(self.usage(node)).filter(|usage| !usage.is_empty()),
            infobox,
        };
        debug!(key = %data.key, folder = %data.folder, "Prepared display data");
        Some(data)
    }

    pub fn infobox(&self, node: &Node) -> Infobox {
        let record = node.record();
        let taxonomy = record.taxonomy();

        if taxonomy.is_sub_type("clothing") {
            return Infobox::Clothing(ClothingInfobox {
                item: item_infobox(record),
                insulation: record.properties.f64("Insulation"),
                armor: record.properties.f64("Armor"),
            });
        }
        if taxonomy.is_super_type("fluid") {
            return Infobox::Fluid(fluid_infobox(record));
        }
        if taxonomy.is_sub_type("firearm") {
            let bullet = self.bullet_info(node);
            return Infobox::Weapon(WeaponInfobox {
                item: item_infobox(record),
                firearm_damage: bullet.as_ref().map(|(_, damage)| damage.to_string()),
                ammo_type: bullet.map(|(name, _)| name),
                ammo_capacity: self.magazine_capacity_str(node),
                melee: None,
            });
        }
        if taxonomy.is_sub_type("melee") {
            return Infobox::Weapon(WeaponInfobox {
                item: item_infobox(record),
                firearm_damage: None,
                ammo_type: None,
                ammo_capacity: None,
                melee: Some(melee_stats(record)),
            });
        }
        Infobox::Item(item_infobox(record))
    }

    /// Ammo name and rounded bullet damage, following
    /// firearm -> first magazine -> ammo -> bullet type.
    pub fn bullet_info(&self, node: &Node) -> Option<(String, i64)> {
        let magazine_key = node.edge_keys(RelationKind::HasMagazine).next()?;
        let magazine = self.graph.get_node(magazine_key, RecordKind::Blueprint)?;

        let ammo_key = magazine.record().properties.reference("BulletType")?.object_name;
        let Some(ammo) = self.graph.get_node(&ammo_key, RecordKind::Blueprint) else {
            warn!(magazine = %magazine.id(), ammo = %ammo_key, "Magazine ammo not in graph");
            return None;
        };

        let bullet_key = ammo.record().properties.reference("BulletType")?.object_name;
        let Some(bullet) = self.graph.get_node(&bullet_key, RecordKind::BulletType) else {
            warn!(ammo = %ammo.id(), bullet = %bullet_key, "Bullet type not in graph");
            return None;
        };
        let damage = bullet.record().properties.f64("BulletDamage")?;
        Some((ammo.record().display_name(), damage.round() as i64))
    }

    /// One entry per magazine, `[[Magazine_Name|N Rounds]]`. A magazine
    /// without its own capacity, or a firearm without magazines, falls back
    /// to the firearm's `AmmoCapacity` as plain `N Rounds`.
    pub fn magazine_capacity_str(&self, node: &Node) -> Option<String> {
        let fallback = node
            .record()
            .properties
            .i64("AmmoCapacity")
            .map(|capacity| format!("{capacity} Rounds"));

        let mut entries: Vec<String> = Vec::new();
        for magazine in self.graph.targets(node.id(), RelationKind::HasMagazine) {
            let entry = match magazine.record().properties.i64("Capacity") {
                Some(capacity) => Some(
                    WikiReference::with_text(magazine.record().display_name(), format!("{capacity} Rounds"))
                        .to_string(),
                ),
                None => fallback.clone(),
            };
            if let Some(entry) = entry.filter(|entry| !entries.contains(entry)) {
                entries.push(entry);
            }
        }

        if entries.is_empty() {
            return fallback;
        }
        Some(entries.join("<br>"))
    }

    /// Taxonomy categories followed by the labels of linked item types.
    pub fn categories(&self, node: &Node) -> Vec<String> {
        let mut categories = node.record().taxonomy().categories.clone();
        for item_type in self.graph.targets(node.id(), RelationKind::HasItemType) {
            let label = item_type.record().display_name();
            if !categories.contains(&label) {
                categories.push(label);
            }
        }
        categories
    }

    pub fn obtaining(&self, node: &Node) -> Obtaining {
        Obtaining {
            crafting: recipes(self.graph, self.resolver, node, RelationKind::HasCraftingRecipe),
            cooking: recipes(self.graph, self.resolver, node, RelationKind::HasCookingRecipe),
            scavenging: scavenging(self.graph, self.resolver, node),
        }
    }

    pub fn usage(&self, node: &Node) -> Usage {
        let record = node.record();
        Usage {
            dismantle: record
                .properties
                .reference("DismantlingResults")
                .and_then(|reference| dismantle_results(self.resolver, &reference)),
            repair: repair_requirements(self.resolver, record),
            conditions: condition_effects(self.resolver, record),
        }
    }
}

fn item_infobox(record: &ObjectRecord) -> ItemInfobox {
    let props = &record.properties;
    ItemInfobox {
        title: record.display_name(),
        image: format!("{}.png", record.console_name()),
        item_id: record.console_name().to_string(),
        description: props.text("Description"),
        weight: props.f64("Weight").map(weight_str),
        stackable: props.bool("bStackable").unwrap_or(false),
        max_stack: props.i64("MaxStack"),
    }
}

fn fluid_infobox(record: &ObjectRecord) -> FluidInfobox {
    let props = &record.properties;
    FluidInfobox {
        title: record.display_name(),
        image: format!("{}.png", record.console_name()),
        item_id: record.console_name().to_string(),
        freezing_point: props.f64("FreezingPoint").map(temperature_str),
        thirst_per_ml: props.f64("ThirstSatisfactionPerMilliliter"),
        decays: props.bool("bDecays").unwrap_or(false),
        sanitizes_wounds: props.bool("bSanitizesWounds").unwrap_or(false),
    }
}

fn melee_stats(record: &ObjectRecord) -> MeleeStats {
    let props = &record.properties;
    let swing_time = props.f64("MeleeSwingDuration");
    let base_damage = props.f64("MeleeBaseDamage");
    MeleeStats {
        damage_type: props.reference("MeleeDamageType").and_then(|reference| {
            let caps = damage_type_pattern()?.captures(reference.name())?;
            Some(humanize(&caps[1]))
        }),
        swing_time,
        base_damage,
        base_dps: match (base_damage, swing_time) {
            (Some(damage), Some(swing)) if swing > 0.0 => Some(damage / swing),
            _ => None,
        },
    }
}
