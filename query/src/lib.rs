pub mod conditions;
pub mod dismantle;
pub mod display;
pub mod engine;
pub mod metrology;
pub mod recipes;
pub mod repair;
pub mod scavenging;

pub use conditions::{ConditionEffects, ConditionTrigger, Effect};
pub use dismantle::{DismantleGroup, DismantleResults};
pub use display::{
    DisplayData, Infobox, ItemCountReference, ItemMinMaxReference, Obtaining, Usage, WikiReference,
};
pub use engine::DerivationEngine;
pub use recipes::RecipeSummary;
pub use repair::RepairRequirements;
pub use scavenging::{FluidContent, Scavenging};

use ingestion::ReferenceResolver;
use pakdump_core::{ObjectRecord, ObjectReference};
use std::sync::Arc;
use tracing::warn;

/// Derivation never fails: a reference that cannot be loaded is logged and
/// treated as absent.
pub(crate) fn resolve_soft(
    resolver: &ReferenceResolver,
    reference: &ObjectReference,
) -> Option<Arc<ObjectRecord>> {
    match resolver.resolve(reference) {
        Ok(record) => Some(record),
        Err(err) => {
            warn!(reference = %reference.object_name, error = %err, "Skipping unresolvable reference");
            None
        }
    }
}
