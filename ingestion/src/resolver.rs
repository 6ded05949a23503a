use crate::extract::{detect_kind, parse_container};
use dashmap::DashMap;
use pakdump_core::config::DumpConfig;
use pakdump_core::{ErrorCode, ObjectRecord, ObjectReference, PakdumpError, Properties, RecordKind};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("Object file not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Malformed object file {path}: {reason}")]
    Format { path: PathBuf, reason: String },
    #[error("Unknown object kind {kind} for {name}")]
    UnknownKind { kind: String, name: String },
    #[error("Broken template chain at {path}: {reason}")]
    Template { path: PathBuf, reason: String },
}

impl ResolveError {
    /// Fatal errors abort a category scan instead of skipping the file.
    pub fn is_fatal(&self) -> bool {
        matches!(self, ResolveError::UnknownKind { .. } | ResolveError::Template { .. })
    }
}

impl PakdumpError for ResolveError {
    fn error_code(&self) -> ErrorCode {
        match self {
            ResolveError::NotFound(_) => ErrorCode::NotFound,
            ResolveError::Io { .. } => ErrorCode::Internal,
            ResolveError::Format { .. } | ResolveError::Template { .. } => ErrorCode::InvalidData,
            ResolveError::UnknownKind { .. } => ErrorCode::TypeMismatch,
        }
    }
}

/// Loads object files on demand and resolves template inheritance.
///
/// Every file is parsed at most once per resolver; later lookups return the
/// same `Arc`, so record identity can be compared with `Arc::ptr_eq`.
pub struct ReferenceResolver {
    config: DumpConfig,
    cache: DashMap<PathBuf, Arc<ObjectRecord>>,
}

impl ReferenceResolver {
    pub fn new(config: DumpConfig) -> Self {
        Self {
            config,
            cache: DashMap::new(),
        }
    }

    pub fn config(&self) -> &DumpConfig {
        &self.config
    }

    pub fn root(&self) -> &Path {
        &self.config.root
    }

    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Map a symbolic object path (`Vein/Content/Vein/Items/Ammo/BP_Ammo_9mm.0`)
    /// to its file under the dump root.
    pub fn file_path(&self, object_path: &str) -> PathBuf {
        let without_index = match object_path.rsplit_once('.') {
            Some((stem, index)) if !index.is_empty() && index.bytes().all(|b| b.is_ascii_digit()) => stem,
            _ => object_path,
        };
        let relative = self
            .config
            .strip_prefixes
            .iter()
            .find_map(|prefix| without_index.strip_prefix(prefix.as_str()))
            .unwrap_or(without_index)
            .trim_start_matches('/');
        self.config
            .root
            .join(format!("{}.{}", relative, self.config.extension))
    }

    pub fn resolve(&self, reference: &ObjectReference) -> Result<Arc<ObjectRecord>, ResolveError> {
        self.resolve_path(&self.file_path(&reference.object_path))
    }

    pub fn resolve_path(&self, path: &Path) -> Result<Arc<ObjectRecord>, ResolveError> {
        self.resolve_chain(path, &mut Vec::new())
    }

    fn resolve_chain(&self, path: &Path, chain: &mut Vec<PathBuf>) -> Result<Arc<ObjectRecord>, ResolveError> {
        if let Some(hit) = self.cache.get(path) {
            return Ok(Arc::clone(hit.value()));
        }
        if chain.iter().any(|seen| seen == path) {
            return Err(ResolveError::Template {
                path: path.to_path_buf(),
                reason: "template cycle".to_string(),
            });
        }

        chain.push(path.to_path_buf());
        let loaded = self.load(path, chain);
        chain.pop();

        let record = Arc::new(loaded?);
        // First insert wins so concurrent callers still share one record.
        let stored = self
            .cache
            .entry(path.to_path_buf())
            .or_insert(record)
            .value()
            .clone();
        Ok(stored)
    }

    fn load(&self, path: &Path, chain: &mut Vec<PathBuf>) -> Result<ObjectRecord, ResolveError> {
        let bytes = fs::read(path).map_err(|source| match source.kind() {
            io::ErrorKind::NotFound => ResolveError::NotFound(path.to_path_buf()),
            _ => ResolveError::Io {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let container = parse_container(&bytes).map_err(|err| ResolveError::Format {
            path: path.to_path_buf(),
            reason: err.to_string(),
        })?;

        let class = container.class;
        let kind = detect_kind(&class).ok_or_else(|| ResolveError::UnknownKind {
            kind: class.type_name.clone(),
            name: class.name.clone(),
        })?;
        debug!(path = %path.display(), %kind, name = %class.name, "Loading object");

        let record = ObjectRecord::new(kind, class.type_name.clone(), class.name.clone()).with_source(path);

        let instance = match container.instance {
            Some(instance) if kind == RecordKind::Blueprint => instance,
            _ => {
                return Ok(record
                    .with_template(class.super_struct.clone())
                    .with_properties(class.properties()));
            }
        };

        let own = instance.properties();
        let default_instance = Some(instance.name.clone()).filter(|name| !name.is_empty());
        let record = record.with_default_instance(default_instance);

        let Some(template_ref) = instance.template else {
            return Ok(record.with_template(class.super_struct).with_properties(own));
        };

        let template = self
            .resolve_chain(&self.file_path(&template_ref.object_path), chain)
            .map_err(|err| match err {
                ResolveError::Template { .. } | ResolveError::UnknownKind { .. } => err,
                other => ResolveError::Template {
                    path: path.to_path_buf(),
                    reason: format!("template {}: {}", template_ref.object_name, other),
                },
            })?;
        if !template.is_blueprint() || template.default_instance.is_none() {
            return Err(ResolveError::Template {
                path: path.to_path_buf(),
                reason: format!(
                    "template {} is not a blueprint with a default object",
                    template_ref.object_name
                ),
            });
        }

        let chain_pointer = template.template.clone().or(Some(template_ref));
        Ok(record
            .with_template(chain_pointer)
            .with_properties(Properties::inherit(&template.properties, &own)))
    }
}
