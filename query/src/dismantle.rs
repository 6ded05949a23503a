//! Dismantle yield tables built from item spawn lists.

use crate::display::ItemMinMaxReference;
use crate::resolve_soft;
use ingestion::ReferenceResolver;
use pakdump_core::schema::{ItemListProps, ItemSpawnListProps, Rarity};
use pakdump_core::{ObjectReference, RecordKind};
use serde::Serialize;
use tracing::warn;

/// One nested list of the spawn list: the items it can yield.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DismantleGroup {
    pub items: Vec<ItemMinMaxReference>,
    pub spawn_chance: Option<Rarity>,
    pub chance_to_not_spawn: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DismantleResults {
    /// Console name of the spawn list.
    pub source: String,
    /// Number of rolls over the groups.
    pub min: i64,
    pub max: i64,
    pub groups: Vec<DismantleGroup>,
}

impl DismantleResults {
    /// At least one group yields something and the roll count is not negative.
    pub fn is_valid(&self) -> bool {
        self.min >= 0 && self.groups.iter().any(|group| !group.items.is_empty())
    }

    pub fn rolls_str(&self) -> String {
        if self.min == 0 && self.max == 0 {
            return "No rolls".to_string();
        }
        format!("{} - {}", self.min, self.max)
    }
}

/// Resolve a `DismantlingResults` reference into its yield table.
///
/// The reference must lead to an item spawn list whose lists are plain item
/// lists; anything else is logged and left out. `None` when nothing valid remains.
pub fn dismantle_results(
    resolver: &ReferenceResolver,
    reference: &ObjectReference,
) -> Option<DismantleResults> {
    let spawn_list = resolve_soft(resolver, reference)?;
    if spawn_list.kind != RecordKind::ItemSpawnList {
        warn!(
            reference = %reference.object_name,
            kind = %spawn_list.kind,
            "Dismantle results are not an item spawn list"
        );
        return None;
    }
    let props: ItemSpawnListProps = match spawn_list.properties.decode() {
        Ok(props) => props,
        Err(err) => {
            warn!(reference = %reference.object_name, error = %err, "Malformed item spawn list");
            return None;
        }
    };

    let mut results = DismantleResults {
        source: spawn_list.console_name().to_string(),
        min: props.item_count.min,
        max: props.item_count.upper(),
        groups: Vec::with_capacity(props.lists.len()),
    };

    for entry in &props.lists {
        let Some(list) = resolve_soft(resolver, &entry.list) else {
            continue;
        };
        if list.kind != RecordKind::SpawnList {
            warn!(list = %entry.list.object_name, kind = %list.kind, "Nested dismantle list is not an item list");
            continue;
        }
        let items: ItemListProps = match list.properties.decode() {
            Ok(items) => items,
            Err(err) => {
                warn!(list = %entry.list.object_name, error = %err, "Malformed item list");
                continue;
            }
        };

        let items = items
            .items
            .iter()
            .filter_map(|item| {
                let record = resolve_soft(resolver, &item.item)?;
                if !record.is_blueprint() {
                    warn!(item = %item.item.object_name, "Dismantle item is not a blueprint");
                    return None;
                }
                Some(ItemMinMaxReference::new(
                    record.display_name(),
                    item.item_count.min,
                    item.item_count.upper(),
                ))
            })
            .collect();

        results.groups.push(DismantleGroup {
            items,
            spawn_chance: entry.spawn_chance,
            chance_to_not_spawn: entry.chance_to_not_spawn,
        });
    }

    results.is_valid().then_some(results)
}
