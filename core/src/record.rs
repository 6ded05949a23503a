use crate::properties::Properties;
use crate::reference::ObjectReference;
use crate::taxonomy::Taxonomy;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Closed set of object kinds the dump can contain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Generic,
    Blueprint,
    Recipe,
    Fluid,
    ToolGroup,
    ItemType,
    BulletType,
    /// Weighted list of items (`ItemList`).
    SpawnList,
    /// Collection of spawn lists rolled together (`ItemSpawnlist`).
    ItemSpawnList,
    FoodConditionSet,
    /// Player-buildable structure (`BuildObject`).
    BuildObject,
}

const KIND_REGISTRY: &[(&str, RecordKind)] = &[
    ("BlueprintGeneratedClass", RecordKind::Blueprint),
    ("BaseRecipe", RecordKind::Recipe),
    ("HeatConverterRecipe", RecordKind::Recipe),
    ("FluidDefinition", RecordKind::Fluid),
    ("Tool", RecordKind::ToolGroup),
    ("ItemType", RecordKind::ItemType),
    ("BulletType", RecordKind::BulletType),
    ("ItemList", RecordKind::SpawnList),
    ("ItemSpawnlist", RecordKind::ItemSpawnList),
    ("FoodConditionSet", RecordKind::FoodConditionSet),
    ("ItemRoot", RecordKind::Generic),
    ("BuildObject", RecordKind::BuildObject),
    ("BuildObjectCategory", RecordKind::Generic),
    ("BodySetup", RecordKind::Generic),
    ("EquippableItemAttachmentSlot", RecordKind::Generic),
    ("DoorWhitelist", RecordKind::Generic),
    ("FenceWhitelist", RecordKind::Generic),
];

fn registry() -> &'static HashMap<String, RecordKind> {
    static REGISTRY: OnceLock<HashMap<String, RecordKind>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        KIND_REGISTRY
            .iter()
            .map(|(name, kind)| (name.to_ascii_lowercase(), *kind))
            .collect()
    })
}

impl RecordKind {
    /// Look up the kind for a raw `Type` tag. Case-insensitive; a leading
    /// `UE` is ignored, so `UEBulletType`, `bullettype` and `BulletType` agree.
    pub fn from_type_name(type_name: &str) -> Option<RecordKind> {
        let lowered = type_name.trim().to_ascii_lowercase();
        let registry = registry();
        registry.get(&lowered).copied().or_else(|| {
            lowered
                .strip_prefix("ue")
                .and_then(|rest| registry.get(rest).copied())
        })
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecordKind::Generic => "generic",
            RecordKind::Blueprint => "blueprint",
            RecordKind::Recipe => "recipe",
            RecordKind::Fluid => "fluid",
            RecordKind::ToolGroup => "tool_group",
            RecordKind::ItemType => "item_type",
            RecordKind::BulletType => "bullet_type",
            RecordKind::SpawnList => "spawn_list",
            RecordKind::ItemSpawnList => "item_spawn_list",
            RecordKind::FoodConditionSet => "food_condition_set",
            RecordKind::BuildObject => "build_object",
        }
    }
}

/// `Type'Name'` with a leading `UE` dropped from the type tag, so
/// `UEFluidDefinition'FL_Wine'` and `FluidDefinition'FL_Wine'` name the same
/// object. `None` when the key is already in that form.
pub fn normalize_object_name(key: &str) -> Option<String> {
    let (type_name, rest) = key.split_once('\'')?;
    let stripped = type_name.strip_prefix("UE")?;
    stripped
        .starts_with(|c: char| c.is_ascii_uppercase())
        .then(|| format!("{stripped}'{rest}"))
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One parsed object from the dump, with template inheritance already applied.
///
/// Shared as `Arc<ObjectRecord>` between the resolver cache, graph nodes and
/// derivation. The only interior state is the memoized taxonomy.
#[derive(Debug, Clone)]
pub struct ObjectRecord {
    pub kind: RecordKind,
    pub type_name: String,
    pub name: String,
    /// Inheritance chain pointer: the template's chain pointer or the class `SuperStruct`.
    pub template: Option<ObjectReference>,
    pub properties: Properties,
    /// Name of the blueprint's default object, e.g. `Default__BP_Ammo_9mm_C`.
    pub default_instance: Option<String>,
    pub source: Option<PathBuf>,
    taxonomy: OnceLock<Taxonomy>,
}

impl ObjectRecord {
    pub fn new(kind: RecordKind, type_name: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            kind,
            type_name: type_name.into(),
            name: name.into(),
            template: None,
            properties: Properties::default(),
            default_instance: None,
            source: None,
            taxonomy: OnceLock::new(),
        }
    }

    pub fn with_template(mut self, template: Option<ObjectReference>) -> Self {
        self.template = template;
        self
    }

    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }

    pub fn with_default_instance(mut self, default_instance: Option<String>) -> Self {
        self.default_instance = default_instance;
        self
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Globally unique key: `Type'Name'`.
    pub fn object_name(&self) -> String {
        format!("{}'{}'", self.type_name, self.name)
    }

    /// Key the dump uses for the default object in `Template` references:
    /// the class name is the instance's type, `BP_X_C'Default__BP_X_C'`.
    pub fn default_object_name(&self) -> Option<String> {
        self.default_instance
            .as_ref()
            .map(|instance| format!("{}'{}'", self.name, instance))
    }

    /// Short name used by the game console and for output files: the source
    /// file stem, or the record name when there is no source.
    pub fn console_name(&self) -> &str {
        self.source
            .as_deref()
            .and_then(Path::file_stem)
            .and_then(|stem| stem.to_str())
            .unwrap_or(&self.name)
    }

    /// In-game name when the record carries one, otherwise the console name.
    pub fn display_name(&self) -> String {
        self.properties
            .text("Name")
            .unwrap_or_else(|| self.console_name().to_string())
    }

    pub fn is_blueprint(&self) -> bool {
        self.kind == RecordKind::Blueprint
    }

    pub fn taxonomy(&self) -> &Taxonomy {
        self.taxonomy.get_or_init(|| Taxonomy::derive(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_lookup_is_case_and_prefix_insensitive() {
        assert_eq!(RecordKind::from_type_name("BulletType"), Some(RecordKind::BulletType));
        assert_eq!(RecordKind::from_type_name("UEBulletType"), Some(RecordKind::BulletType));
        assert_eq!(RecordKind::from_type_name("bullettype"), Some(RecordKind::BulletType));
        assert_eq!(RecordKind::from_type_name("ItemSpawnlist"), Some(RecordKind::ItemSpawnList));
        assert_eq!(RecordKind::from_type_name("HeatConverterRecipe"), Some(RecordKind::Recipe));
        assert_eq!(RecordKind::from_type_name("BuildObject"), Some(RecordKind::BuildObject));
        assert_eq!(RecordKind::from_type_name("BuildObjectCategory"), Some(RecordKind::Generic));
        assert_eq!(RecordKind::from_type_name("StaticMesh"), None);
    }

    #[test]
    fn test_record_names() {
        let record = ObjectRecord::new(RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Ammo_9mm_C")
            .with_default_instance(Some("Default__BP_Ammo_9mm_C".into()))
            .with_source("/dump/Items/Ammo/BP_Ammo_9mm.json");

        assert_eq!(record.object_name(), "BlueprintGeneratedClass'BP_Ammo_9mm_C'");
        assert_eq!(
            record.default_object_name().as_deref(),
            Some("BP_Ammo_9mm_C'Default__BP_Ammo_9mm_C'")
        );
        assert_eq!(record.console_name(), "BP_Ammo_9mm");
        assert_eq!(record.display_name(), "BP_Ammo_9mm");
    }

    #[test]
    fn test_normalize_object_name_drops_ue_prefix() {
        assert_eq!(
            normalize_object_name("UEFluidDefinition'FL_AnabolicSteroid'").as_deref(),
            Some("FluidDefinition'FL_AnabolicSteroid'")
        );
        assert_eq!(normalize_object_name("FluidDefinition'FL_Wine'"), None);
        assert_eq!(normalize_object_name("UEnum'E_Color'"), None);
        assert_eq!(normalize_object_name("ItemRoot"), None);
    }

    #[test]
    fn test_display_name_prefers_in_game_name() {
        let mut properties = Properties::new();
        properties.insert("Name", json!({"SourceString": "9mm Round"}));
        let record = ObjectRecord::new(RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Ammo_9mm_C")
            .with_properties(properties);
        assert_eq!(record.display_name(), "9mm Round");

        let root = ObjectRecord::new(RecordKind::Generic, "ItemRoot", "ItemRoot");
        assert_eq!(root.console_name(), "ItemRoot");
    }
}
