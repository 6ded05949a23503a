use crate::resolver::{ReferenceResolver, ResolveError};
use crate::scan::ScanRules;
use pakdump_core::config::ImportConfig;
use pakdump_core::schema::QuantityRef;
use pakdump_core::{ErrorCode, ObjectRecord, PakdumpError, RecordKind};
use std::collections::HashSet;
use std::io;
use std::ops::AddAssign;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use storage::{GraphError, ObjectGraph, RelationKind};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const ROOT_TYPE: &str = "ItemRoot";
pub const ROOT_NAME: &str = "ItemRoot";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Resolve error: {0}")]
    Resolve(#[from] ResolveError),
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
    #[error("Failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl PakdumpError for ImportError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ImportError::Resolve(err) => err.error_code(),
            ImportError::Graph(err) => err.error_code(),
            ImportError::Scan { .. } => ErrorCode::Internal,
        }
    }
}

/// Counters for one import run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportReport {
    pub files_seen: usize,
    pub imported: usize,
    pub skipped: usize,
    pub edges_added: usize,
}

impl AddAssign for ImportReport {
    fn add_assign(&mut self, other: Self) {
        self.files_seen += other.files_seen;
        self.imported += other.imported;
        self.skipped += other.skipped;
        self.edges_added += other.edges_added;
    }
}

/// Fixed-shape import targets for the category importers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    ItemType,
    BulletType,
    ToolGroup,
    Fluid,
    Ammo,
    Magazine,
    Firearm,
}

impl Category {
    /// Folder under the dump root, file pattern and expected kind.
    pub fn default_source(&self) -> (&'static str, &'static str, RecordKind) {
        match self {
            Category::ItemType => ("ItemTypes", "IT_*", RecordKind::ItemType),
            Category::BulletType => ("BulletTypes", "BT_*", RecordKind::BulletType),
            Category::ToolGroup => ("Tools", "T_*", RecordKind::ToolGroup),
            Category::Fluid => ("Fluids", "FL_*", RecordKind::Fluid),
            Category::Ammo => ("Items/Ammo", "BP_Ammo_*", RecordKind::Blueprint),
            Category::Magazine => ("Items/Ammo", "BP_Magazine_*", RecordKind::Blueprint),
            Category::Firearm => ("Items/Weapons/Ranged", "BP_Firearm_*", RecordKind::Blueprint),
        }
    }

    /// Leaf categories have no outgoing edges and may be re-imported.
    pub fn is_leaf(&self) -> bool {
        matches!(
            self,
            Category::ItemType | Category::BulletType | Category::ToolGroup | Category::Fluid
        )
    }
}

/// Populates an [`ObjectGraph`] from the dump, one file at a time.
pub struct GraphImporter<'r> {
    resolver: &'r ReferenceResolver,
    config: ImportConfig,
    rules: ScanRules,
}

impl<'r> GraphImporter<'r> {
    pub fn new(resolver: &'r ReferenceResolver, config: ImportConfig) -> Self {
        let rules = ScanRules::new(resolver.config().extension.clone(), &config);
        Self {
            resolver,
            config,
            rules,
        }
    }

    pub fn root_key() -> String {
        format!("{}'{}'", ROOT_TYPE, ROOT_NAME)
    }

    /// Insert the synthetic root every item type hangs off.
    pub fn install_root(&self, graph: &mut ObjectGraph) -> Result<(), ImportError> {
        let root = Arc::new(ObjectRecord::new(RecordKind::Generic, ROOT_TYPE, ROOT_NAME));
        let key = root.object_name();
        graph.upsert(root, true)?;
        graph.set_root(&key)?;
        Ok(())
    }

    /// Fresh graph with the root installed and every configured subtree imported.
    pub fn build_graph(&self) -> Result<(ObjectGraph, ImportReport), ImportError> {
        let mut graph = ObjectGraph::new();
        self.install_root(&mut graph)?;
        let report = self.import_all(&mut graph)?;
        Ok((graph, report))
    }

    /// Generic import of every configured subtree in order. A file reached by
    /// more than one subtree is imported once.
    pub fn import_all(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        let mut visited = HashSet::new();
        let mut report = ImportReport::default();
        for subtree in &self.config.subtrees {
            report += self.import_subtree(graph, subtree, &mut visited)?;
        }
        info!(
            files = report.files_seen,
            imported = report.imported,
            skipped = report.skipped,
            edges = report.edges_added,
            nodes = graph.len(),
            "Import finished"
        );
        Ok(report)
    }

    /// Generic import of one subtree: `Items` for the files directly inside,
    /// `Items/*` for the whole tree below.
    pub fn import_folder(&self, graph: &mut ObjectGraph, subtree: &str) -> Result<ImportReport, ImportError> {
        self.import_subtree(graph, subtree, &mut HashSet::new())
    }

    fn import_subtree(
        &self,
        graph: &mut ObjectGraph,
        subtree: &str,
        visited: &mut HashSet<PathBuf>,
    ) -> Result<ImportReport, ImportError> {
        let (relative, recursive) = match subtree.strip_suffix("/*") {
            Some(base) => (base, true),
            None => (subtree, false),
        };
        let dir = self.resolver.root().join(relative);
        let Some(files) = self.scan(&dir, self.rules.scan_tree(&dir, recursive))? else {
            return Ok(ImportReport::default());
        };

        let mut report = ImportReport::default();
        for path in files {
            if !visited.insert(path.clone()) {
                continue;
            }
            report.files_seen += 1;
            let Some(record) = self.load(&path)? else {
                report.skipped += 1;
                continue;
            };

            let key = record.object_name();
            graph.upsert(Arc::clone(&record), true)?;
            if let Some(alias) = record.default_object_name() {
                graph.register_alias(alias, &key)?;
            }
            report.imported += 1;
            report.edges_added += self.wire(graph, &record, &key)?;
        }
        debug!(subtree, imported = report.imported, "Imported subtree");
        Ok(report)
    }

    pub fn import_category(
        &self,
        graph: &mut ObjectGraph,
        dir: &Path,
        pattern: &str,
        expected_kind: RecordKind,
        category: Category,
    ) -> Result<ImportReport, ImportError> {
        let dir = self.resolver.root().join(dir);
        let Some(files) = self.scan(&dir, self.rules.scan_dir(&dir, pattern))? else {
            return Ok(ImportReport::default());
        };

        let mut report = ImportReport::default();
        for path in files {
            report.files_seen += 1;
            let Some(record) = self.load(&path)? else {
                report.skipped += 1;
                continue;
            };
            if record.kind != expected_kind {
                warn!(
                    path = %path.display(),
                    expected = %expected_kind,
                    found = %record.kind,
                    "Skipping object of unexpected kind"
                );
                report.skipped += 1;
                continue;
            }

            let key = record.object_name();
            graph.upsert(Arc::clone(&record), category.is_leaf())?;
            report.imported += 1;
            report.edges_added += self.wire_category(graph, &record, &key, category)?;
        }
        info!(?category, imported = report.imported, skipped = report.skipped, "Imported category");
        Ok(report)
    }

    fn import_default(&self, graph: &mut ObjectGraph, category: Category) -> Result<ImportReport, ImportError> {
        let (dir, pattern, kind) = category.default_source();
        self.import_category(graph, Path::new(dir), pattern, kind, category)
    }

    pub fn import_item_types(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::ItemType)
    }

    pub fn import_bullet_types(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::BulletType)
    }

    pub fn import_tool_groups(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::ToolGroup)
    }

    pub fn import_fluids(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::Fluid)
    }

    pub fn import_ammo(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::Ammo)
    }

    pub fn import_magazines(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::Magazine)
    }

    pub fn import_firearms(&self, graph: &mut ObjectGraph) -> Result<ImportReport, ImportError> {
        self.import_default(graph, Category::Firearm)
    }

    /// A missing directory is an empty import, not an error.
    fn scan(&self, dir: &Path, scanned: io::Result<Vec<PathBuf>>) -> Result<Option<Vec<PathBuf>>, ImportError> {
        match scanned {
            Ok(files) => Ok(Some(files)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                warn!(dir = %dir.display(), "Import directory does not exist");
                Ok(None)
            }
            Err(source) => Err(ImportError::Scan {
                path: dir.to_path_buf(),
                source,
            }),
        }
    }

    /// Resolve one file; non-fatal failures are logged and yield `None`.
    fn load(&self, path: &Path) -> Result<Option<Arc<ObjectRecord>>, ImportError> {
        match self.resolver.resolve_path(path) {
            Ok(record) => Ok(Some(record)),
            Err(err) if err.is_fatal() => Err(err.into()),
            Err(err) => {
                warn!(path = %path.display(), error = %err, "Skipping object file");
                Ok(None)
            }
        }
    }

    fn wire_category(
        &self,
        graph: &mut ObjectGraph,
        record: &ObjectRecord,
        key: &str,
        category: Category,
    ) -> Result<usize, GraphError> {
        let props = &record.properties;
        let mut links = Vec::new();

        match category {
            Category::ItemType => {
                if let Some(root) = graph.root() {
                    links.push(Link::new(root.id(), RelationKind::HasItemType, key, RecordKind::ItemType));
                }
            }
            Category::BulletType | Category::ToolGroup | Category::Fluid => {}
            Category::Ammo | Category::Magazine | Category::Firearm => {
                if let Some(item_type) = props.reference("Type") {
                    links.push(Link::new(
                        key,
                        RelationKind::HasItemType,
                        &item_type.object_name,
                        RecordKind::ItemType,
                    ));
                }
                match category {
                    Category::Ammo => {
                        if let Some(bullet) = props.reference("BulletType") {
                            links.push(Link::new(
                                key,
                                RelationKind::HasBulletType,
                                &bullet.object_name,
                                RecordKind::BulletType,
                            ));
                        }
                    }
                    Category::Magazine => {
                        if let Some(ammo) = props.reference("BulletType") {
                            links.push(Link::new(key, RelationKind::HasAmmo, &ammo.object_name, RecordKind::Blueprint));
                        }
                    }
                    _ => {
                        for magazine in props.references("MagazineItems") {
                            links.push(Link::new(
                                key,
                                RelationKind::HasMagazine,
                                &magazine.object_name,
                                RecordKind::Blueprint,
                            ));
                        }
                    }
                }
            }
        }

        apply_links(graph, links)
    }

    fn wire(&self, graph: &mut ObjectGraph, record: &ObjectRecord, key: &str) -> Result<usize, GraphError> {
        let props = &record.properties;
        let taxonomy = record.taxonomy();
        let mut links = Vec::new();

        if record.kind == RecordKind::ItemType {
            if let Some(root) = graph.root() {
                links.push(Link::new(root.id(), RelationKind::HasItemType, key, RecordKind::ItemType));
            }
        }
        if let Some(item_type) = props.reference("Type") {
            links.push(Link::new(
                key,
                RelationKind::HasItemType,
                &item_type.object_name,
                RecordKind::ItemType,
            ));
        }
        if let Some(fluid) = props.reference("DefaultFluid") {
            links.push(Link::new(key, RelationKind::HasFluid, &fluid.object_name, RecordKind::Fluid));
        }
        if let Some(bullet) = props.reference("BulletType") {
            if taxonomy.is_sub_type("magazine") {
                links.push(Link::new(key, RelationKind::HasAmmo, &bullet.object_name, RecordKind::Blueprint));
            } else if taxonomy.is_sub_type("bullet") {
                links.push(Link::new(
                    key,
                    RelationKind::HasBulletType,
                    &bullet.object_name,
                    RecordKind::BulletType,
                ));
            }
        }
        for magazine in props.references("MagazineItems") {
            links.push(Link::new(
                key,
                RelationKind::HasMagazine,
                &magazine.object_name,
                RecordKind::Blueprint,
            ));
        }
        for tool in props.references("RepairToolObjects") {
            links.push(Link::new(key, RelationKind::HasToolGroup, &tool.object_name, RecordKind::ToolGroup));
        }
        if let Some(spawn_list) = props.reference("DismantlingResults") {
            links.push(Link::new(
                key,
                RelationKind::HasDismantleResult,
                &spawn_list.object_name,
                RecordKind::ItemSpawnList,
            ));
        }

        if record.kind == RecordKind::Recipe {
            let relation = recipe_relation(record);
            for result in recipe_results(record) {
                // The produced item owns the edge, so it must already be in the graph.
                let Some(item) = graph.get_node(&result.item.object_name, RecordKind::Blueprint) else {
                    debug!(recipe = key, item = %result.item.object_name, "Recipe result not in graph");
                    continue;
                };
                links.push(Link::new(item.id(), relation, key, RecordKind::Recipe));
            }
        }

        apply_links(graph, links)
    }
}

struct Link {
    from: String,
    relation: RelationKind,
    to: String,
    target_kind: RecordKind,
}

impl Link {
    fn new(from: &str, relation: RelationKind, to: &str, target_kind: RecordKind) -> Self {
        Self {
            from: from.to_string(),
            relation,
            to: to.to_string(),
            target_kind,
        }
    }
}

/// Add each link whose target exists with the expected kind and that is not
/// already present. Returns the number of edges added.
fn apply_links(graph: &mut ObjectGraph, links: Vec<Link>) -> Result<usize, GraphError> {
    let mut added = 0;
    for link in links {
        let Some(target) = graph.get_node(&link.to, link.target_kind) else {
            debug!(from = %link.from, relation = %link.relation, to = %link.to, "Edge target not in graph");
            continue;
        };
        let target = target.id().to_string();
        if graph.has_edge(&link.from, link.relation, &target) {
            continue;
        }
        graph.add_edge(&link.from, link.relation, &target)?;
        added += 1;
    }
    Ok(added)
}

fn recipe_relation(record: &ObjectRecord) -> RelationKind {
    let cooking_type = record
        .properties
        .reference("RecipeType")
        .map(|recipe_type| recipe_type.object_name.contains("Cooking"))
        .unwrap_or(false);
    if record.name.starts_with("RP_") || cooking_type {
        RelationKind::HasCookingRecipe
    } else {
        RelationKind::HasCraftingRecipe
    }
}

fn recipe_results(record: &ObjectRecord) -> Vec<QuantityRef> {
    match record.properties.typed::<Vec<QuantityRef>>("Results") {
        Ok(results) => results.unwrap_or_default(),
        Err(err) => {
            warn!(recipe = %record.name, error = %err, "Unreadable recipe results");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_recipe_relation() {
        let crafting = ObjectRecord::new(RecordKind::Recipe, "BaseRecipe", "CR_Gunpowder");
        assert_eq!(recipe_relation(&crafting), RelationKind::HasCraftingRecipe);

        let cooking = ObjectRecord::new(RecordKind::Recipe, "BaseRecipe", "RP_Stew");
        assert_eq!(recipe_relation(&cooking), RelationKind::HasCookingRecipe);

        let mut properties = pakdump_core::Properties::new();
        properties.insert(
            "RecipeType",
            json!({"ObjectName": "RecipeType'RT_Cooking'", "ObjectPath": "Vein/Content/Vein/Recipes/RT_Cooking.0"}),
        );
        let typed = ObjectRecord::new(RecordKind::Recipe, "HeatConverterRecipe", "HR_Bread").with_properties(properties);
        assert_eq!(recipe_relation(&typed), RelationKind::HasCookingRecipe);
    }

    #[test]
    fn test_report_accumulates() {
        let mut report = ImportReport {
            files_seen: 2,
            imported: 1,
            skipped: 1,
            edges_added: 3,
        };
        report += ImportReport {
            files_seen: 1,
            imported: 1,
            skipped: 0,
            edges_added: 1,
        };
        assert_eq!(report.files_seen, 3);
        assert_eq!(report.edges_added, 4);
    }

    #[test]
    fn test_category_sources() {
        assert_eq!(Category::Magazine.default_source().1, "BP_Magazine_*");
        assert!(Category::Fluid.is_leaf());
        assert!(!Category::Firearm.is_leaf());
    }
}
