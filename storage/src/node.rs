use pakdump_core::{ObjectRecord, RecordKind};
use std::fmt;
use std::sync::Arc;

/// Directed "has-a" relation between two objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RelationKind {
    HasItemType,
    HasAmmo,
    HasBulletType,
    HasMagazine,
    HasFluid,
    HasCraftingRecipe,
    HasCookingRecipe,
    HasSchematic,
    HasDismantleResult,
    HasToolGroup,
}

impl RelationKind {
    pub const ALL: [RelationKind; 10] = [
        RelationKind::HasItemType,
        RelationKind::HasAmmo,
        RelationKind::HasBulletType,
        RelationKind::HasMagazine,
        RelationKind::HasFluid,
        RelationKind::HasCraftingRecipe,
        RelationKind::HasCookingRecipe,
        RelationKind::HasSchematic,
        RelationKind::HasDismantleResult,
        RelationKind::HasToolGroup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationKind::HasItemType => "HAS_ITEM_TYPE",
            RelationKind::HasAmmo => "HAS_AMMO",
            RelationKind::HasBulletType => "HAS_BULLET_TYPE",
            RelationKind::HasMagazine => "HAS_MAGAZINE",
            RelationKind::HasFluid => "HAS_FLUID",
            RelationKind::HasCraftingRecipe => "HAS_CRAFTING_RECIPE",
            RelationKind::HasCookingRecipe => "HAS_COOKING_RECIPE",
            RelationKind::HasSchematic => "HAS_SCHEMATIC",
            RelationKind::HasDismantleResult => "HAS_DISMANTLE_RESULT",
            RelationKind::HasToolGroup => "HAS_TOOL_GROUP",
        }
    }
}

impl fmt::Display for RelationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Edge representation: (relation, key of the other endpoint)
pub type EdgeData = (RelationKind, String);

/// One object in the graph. Edge lists hold keys into the graph arena and are
/// only changed through [`crate::ObjectGraph`].
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) id: String,
    pub(crate) record: Arc<ObjectRecord>,
    pub(crate) edges: Vec<EdgeData>,
    pub(crate) neighbours: Vec<EdgeData>,
    pub(crate) modified: bool,
}

impl Node {
    pub(crate) fn new(record: Arc<ObjectRecord>) -> Self {
        Self {
            id: record.object_name(),
            record,
            edges: Vec::new(),
            neighbours: Vec::new(),
            modified: true,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn record(&self) -> &Arc<ObjectRecord> {
        &self.record
    }

    pub fn kind(&self) -> RecordKind {
        self.record.kind
    }

    /// Outgoing edges in insertion order.
    pub fn edges(&self) -> &[EdgeData] {
        &self.edges
    }

    /// Incoming edges in insertion order; the key is the source node.
    pub fn neighbours(&self) -> &[EdgeData] {
        &self.neighbours
    }

    pub fn is_modified(&self) -> bool {
        self.modified
    }

    pub fn edge_keys(&self, relation: RelationKind) -> impl Iterator<Item = &str> {
        self.edges
            .iter()
            .filter(move |(kind, _)| *kind == relation)
            .map(|(_, key)| key.as_str())
    }

    pub fn neighbour_keys(&self, relation: RelationKind) -> impl Iterator<Item = &str> {
        self.neighbours
            .iter()
            .filter(move |(kind, _)| *kind == relation)
            .map(|(_, key)| key.as_str())
    }
}
