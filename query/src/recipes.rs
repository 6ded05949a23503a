//! Crafting and cooking recipes that produce an item.

use crate::display::{ItemCountReference, WikiReference};
use crate::resolve_soft;
use ingestion::ReferenceResolver;
use pakdump_core::schema::{PossibleIngredients, QuantityRef};
use pakdump_core::ObjectRecord;
use serde::Serialize;
use storage::{Node, ObjectGraph, RelationKind};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeSummary {
    pub key: String,
    pub name: String,
    /// Seconds.
    pub craft_time: Option<f64>,
    pub ingredients: Vec<ItemCountReference>,
    pub tools: Vec<WikiReference>,
    pub results: Vec<ItemCountReference>,
}

/// Summaries for every recipe reached over `relation`
/// (`HAS_CRAFTING_RECIPE` or `HAS_COOKING_RECIPE`).
pub fn recipes(
    graph: &ObjectGraph,
    resolver: &ReferenceResolver,
    node: &Node,
    relation: RelationKind,
) -> Vec<RecipeSummary> {
    graph
        .targets(node.id(), relation)
        .into_iter()
        .map(|recipe| recipe_summary(resolver, recipe.id(), recipe.record()))
        .collect()
}

/// Only the first ingredient alternative is listed.
pub fn recipe_summary(resolver: &ReferenceResolver, key: &str, record: &ObjectRecord) -> RecipeSummary {
    let props = &record.properties;
    let alternatives = match props.typed::<Vec<PossibleIngredients>>("PossibleIngredients") {
        Ok(alternatives) => alternatives.unwrap_or_default(),
        Err(err) => {
            warn!(recipe = %key, error = %err, "Malformed recipe ingredients");
            Vec::new()
        }
    };
    let results = match props.typed::<Vec<QuantityRef>>("Results") {
        Ok(results) => results.unwrap_or_default(),
        Err(err) => {
            warn!(recipe = %key, error = %err, "Malformed recipe results");
            Vec::new()
        }
    };
    let first = alternatives.into_iter().next().unwrap_or_default();

    RecipeSummary {
        key: key.to_string(),
        name: props.text("RecipeName").unwrap_or_else(|| record.display_name()),
        craft_time: props.f64("CraftTime"),
        ingredients: count_references(resolver, &first.ingredients),
        tools: first
            .tool_objects
            .iter()
            .filter_map(|tool| resolve_soft(resolver, tool))
            .map(|tool| WikiReference::new(tool.display_name()))
            .collect(),
        results: count_references(resolver, &results),
    }
}

fn count_references(resolver: &ReferenceResolver, entries: &[QuantityRef]) -> Vec<ItemCountReference> {
    entries
        .iter()
        .filter_map(|entry| {
            let item = resolve_soft(resolver, &entry.item)?;
            Some(ItemCountReference::new(item.display_name(), entry.quantity))
        })
        .collect()
}
