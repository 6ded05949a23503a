use crate::display::{ItemCountReference, WikiReference};
use crate::resolve_soft;
use ingestion::ReferenceResolver;
use pakdump_core::schema::QuantityRef;
use pakdump_core::ObjectRecord;
use serde::Serialize;
use tracing::warn;

/// Materials and tools needed to repair an item.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RepairRequirements {
    pub ingredients: Vec<ItemCountReference>,
    pub tools: Vec<WikiReference>,
}

impl RepairRequirements {
    pub fn is_valid(&self) -> bool {
        !self.ingredients.is_empty() || !self.tools.is_empty()
    }
}

pub fn repair_requirements(resolver: &ReferenceResolver, record: &ObjectRecord) -> Option<RepairRequirements> {
    let ingredients = match record.properties.typed::<Vec<QuantityRef>>("RepairIngredients") {
        Ok(ingredients) => ingredients.unwrap_or_default(),
        Err(err) => {
            warn!(record = %record.name, error = %err, "Malformed repair ingredients");
            Vec::new()
        }
    };

    let requirements = RepairRequirements {
        ingredients: ingredients
            .iter()
            .filter_map(|ingredient| {
                let item = resolve_soft(resolver, &ingredient.item)?;
                Some(ItemCountReference::new(item.display_name(), ingredient.quantity))
            })
            .collect(),
        tools: record
            .properties
            .references("RepairToolObjects")
            .iter()
            .filter_map(|tool| resolve_soft(resolver, tool))
            .map(|tool| WikiReference::new(tool.display_name()))
            .collect(),
    };
    requirements.is_valid().then_some(requirements)
}
