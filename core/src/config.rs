use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

pub use config::ConfigError;

/// Where the dump lives and how symbolic object paths map onto it.
#[derive(Debug, Deserialize, Clone)]
pub struct DumpConfig {
    pub root: PathBuf,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(default = "default_strip_prefixes")]
    pub strip_prefixes: Vec<String>,
}

impl DumpConfig {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extension: default_extension(),
            strip_prefixes: default_strip_prefixes(),
        }
    }
}

/// Ordered import plan for the generic importer plus scan exclusion rules.
///
/// Subtree entries are relative to the dump root. `Items` imports the files
/// directly inside `Items`; `Items/*` imports `Items` and every directory below it.
/// Order matters: edges only form towards nodes imported earlier.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ImportConfig {
    #[serde(default = "default_subtrees")]
    pub subtrees: Vec<String>,
    #[serde(default = "default_excluded_prefixes")]
    pub excluded_prefixes: Vec<String>,
    #[serde(default = "default_stale_markers")]
    pub stale_markers: Vec<String>,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            subtrees: default_subtrees(),
            excluded_prefixes: default_excluded_prefixes(),
            stale_markers: default_stale_markers(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub dump: DumpConfig,
    #[serde(default)]
    pub import: ImportConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from("config")
    }

    pub fn load_from(dir: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let dir = dir.as_ref();
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let builder = Config::builder()
            .add_source(File::with_name(&dir.join("default").to_string_lossy()))
            .add_source(File::with_name(&dir.join(&run_mode).to_string_lossy()).required(false))
            .add_source(environment());

        builder.build()?.try_deserialize()
    }
}

/// `PAKDUMP_DUMP__ROOT=/data/Vein` sets `dump.root`.
fn environment() -> Environment {
    Environment::with_prefix("PAKDUMP")
        .prefix_separator("_")
        .separator("__")
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_strip_prefixes() -> Vec<String> {
    ["/Game/", "Vein/Content/Vein/", "Vein/"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_subtrees() -> Vec<String> {
    [
        "ItemTypes",
        "BulletTypes",
        "Tools",
        "Fluids",
        "Spawnlists/*",
        "Items/Materials",
        "Items/Ammo",
        "Items/*",
        "Recipes/*",
        "BuildObjects/*",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_excluded_prefixes() -> Vec<String> {
    ["SM_", "SK_", "PHYS_", "Placeholder", "Thumbnail"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_stale_markers() -> Vec<String> {
    ["old", "backup", "backups", "deprecated"]
        .into_iter()
        .map(String::from)
        .collect()
}
