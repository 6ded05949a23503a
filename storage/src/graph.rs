use crate::node::{Node, RelationKind};
use pakdump_core::{normalize_object_name, ErrorCode, ObjectRecord, PakdumpError, RecordKind};
use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Error, Debug)]
pub enum GraphError {
    #[error("Record has no name")]
    MissingName,
    #[error("Node already exists: {0}")]
    Conflict(String),
    #[error("Kind mismatch for {key}: existing {existing}, incoming {incoming}")]
    TypeMismatch {
        key: String,
        existing: RecordKind,
        incoming: RecordKind,
    },
    #[error("Node not found: {0}")]
    NodeNotFound(String),
    #[error("No start node given and no root set")]
    MissingRoot,
}

impl PakdumpError for GraphError {
    fn error_code(&self) -> ErrorCode {
        match self {
            GraphError::MissingName => ErrorCode::InvalidData,
            GraphError::Conflict(_) => ErrorCode::Conflict,
            GraphError::TypeMismatch { .. } => ErrorCode::TypeMismatch,
            GraphError::NodeNotFound(_) | GraphError::MissingRoot => ErrorCode::NotFound,
        }
    }
}

/// Typed bidirectional graph of dump objects keyed by object name.
///
/// Every outgoing edge has a mirrored neighbour entry on the target; both are
/// only touched by [`ObjectGraph::add_edge`] and [`ObjectGraph::remove_edge`].
#[derive(Debug, Default)]
pub struct ObjectGraph {
    nodes: HashMap<String, Node>,
    order: Vec<String>,
    root: Option<String>,
    aliases: HashMap<String, String>,
}

/// Both directions of one relation around a node.
#[derive(Debug)]
pub struct Related<'a> {
    pub edges: Vec<&'a Node>,
    pub neighbours: Vec<&'a Node>,
}

impl ObjectGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, or replace the record of an existing node when
    /// `allow_update` is set. Replacing keeps the node's edges.
    pub fn upsert(&mut self, record: Arc<ObjectRecord>, allow_update: bool) -> Result<&Node, GraphError> {
        if record.name.is_empty() {
            return Err(GraphError::MissingName);
        }
        let key = record.object_name();

        match self.nodes.entry(key) {
            Entry::Occupied(entry) => {
                let node = entry.into_mut();
                if !allow_update {
                    return Err(GraphError::Conflict(node.id.clone()));
                }
                if node.kind() != record.kind {
                    return Err(GraphError::TypeMismatch {
                        key: node.id.clone(),
                        existing: node.kind(),
                        incoming: record.kind,
                    });
                }
                debug!(key = %node.id, "Updating node");
                node.record = record;
                node.modified = true;
                Ok(node)
            }
            Entry::Vacant(entry) => {
                let key = entry.key().clone();
                if let Some(normalized) = normalize_object_name(&key) {
                    self.aliases.entry(normalized).or_insert_with(|| key.clone());
                }
                self.order.push(key);
                Ok(entry.insert(Node::new(record)))
            }
        }
    }

    /// Stored key for `key`, following at most one alias hop. A key whose
    /// type tag carries a `UE` prefix also matches its unprefixed form.
    fn canonical_key(&self, key: &str) -> Option<&str> {
        self.lookup(key).or_else(|| {
            let normalized = normalize_object_name(key)?;
            self.lookup(&normalized)
        })
    }

    fn lookup(&self, key: &str) -> Option<&str> {
        self.nodes
            .get_key_value(key)
            .or_else(|| {
                self.aliases
                    .get(key)
                    .and_then(|canonical| self.nodes.get_key_value(canonical.as_str()))
            })
            .map(|(stored, _)| stored.as_str())
    }

    /// Untyped lookup by key or alias.
    pub fn node(&self, key: &str) -> Option<&Node> {
        self.canonical_key(key).and_then(|key| self.nodes.get(key))
    }

    /// Typed lookup by key or alias. A node of another kind counts as absent.
    pub fn get_node(&self, key: &str, expected: RecordKind) -> Option<&Node> {
        let node = self.node(key)?;
        if node.kind() != expected {
            warn!(key, expected = %expected, found = %node.kind(), "Node has unexpected kind");
            return None;
        }
        Some(node)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.canonical_key(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|key| self.nodes.get(key))
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.values().map(|node| node.edges.len()).sum()
    }

    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref().and_then(|key| self.nodes.get(key))
    }

    pub fn set_root(&mut self, key: &str) -> Result<(), GraphError> {
        let canonical = self
            .canonical_key(key)
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))?
            .to_string();
        self.root = Some(canonical);
        Ok(())
    }

    /// Make `alias` resolve to `canonical` in lookups and edge operations.
    pub fn register_alias(&mut self, alias: impl Into<String>, canonical: &str) -> Result<(), GraphError> {
        let alias = alias.into();
        if !self.nodes.contains_key(canonical) {
            return Err(GraphError::NodeNotFound(canonical.to_string()));
        }
        if alias != canonical {
            self.aliases.insert(alias, canonical.to_string());
        }
        Ok(())
    }

    fn endpoints(&self, from: &str, to: &str) -> Result<(String, String), GraphError> {
        let from = self
            .canonical_key(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        let to = self
            .canonical_key(to)
            .ok_or_else(|| GraphError::NodeNotFound(to.to_string()))?;
        Ok((from.to_string(), to.to_string()))
    }

    pub fn add_edge(&mut self, from: &str, relation: RelationKind, to: &str) -> Result<(), GraphError> {
        let (from, to) = self.endpoints(from, to)?;
        if let Some(node) = self.nodes.get_mut(&from) {
            node.edges.push((relation, to.clone()));
        }
        if let Some(node) = self.nodes.get_mut(&to) {
            node.neighbours.push((relation, from.clone()));
        }
        debug!(%from, %relation, %to, "Added edge");
        Ok(())
    }

    /// Remove the most recently added matching edge and its neighbour entry.
    /// Returns `false` when no such edge exists.
    pub fn remove_edge(&mut self, from: &str, relation: RelationKind, to: &str) -> Result<bool, GraphError> {
        let (from, to) = self.endpoints(from, to)?;

        let Some(source) = self.nodes.get_mut(&from) else {
            return Ok(false);
        };
        let Some(position) = source
            .edges
            .iter()
            .rposition(|(kind, key)| *kind == relation && *key == to)
        else {
            return Ok(false);
        };
        source.edges.remove(position);

        if let Some(target) = self.nodes.get_mut(&to) {
            if let Some(position) = target
                .neighbours
                .iter()
                .rposition(|(kind, key)| *kind == relation && *key == from)
            {
                target.neighbours.remove(position);
            }
        }
        Ok(true)
    }

    pub fn has_edge(&self, from: &str, relation: RelationKind, to: &str) -> bool {
        let Ok((from, to)) = self.endpoints(from, to) else {
            return false;
        };
        self.nodes
            .get(&from)
            .map(|node| node.edges.iter().any(|(kind, key)| *kind == relation && *key == to))
            .unwrap_or(false)
    }

    /// Targets of `key`'s outgoing `relation` edges, in edge order.
    pub fn targets(&self, key: &str, relation: RelationKind) -> Vec<&Node> {
        self.node(key)
            .map(|node| node.edge_keys(relation).filter_map(|k| self.nodes.get(k)).collect())
            .unwrap_or_default()
    }

    /// Sources of `relation` edges pointing at `key`, in insertion order.
    pub fn sources(&self, key: &str, relation: RelationKind) -> Vec<&Node> {
        self.node(key)
            .map(|node| node.neighbour_keys(relation).filter_map(|k| self.nodes.get(k)).collect())
            .unwrap_or_default()
    }

    pub fn related(&self, key: &str, relation: RelationKind) -> Option<Related<'_>> {
        self.node(key)?;
        Some(Related {
            edges: self.targets(key, relation),
            neighbours: self.sources(key, relation),
        })
    }

    /// Nodes inserted or updated since they were last marked saved.
    pub fn modified_nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes().filter(|node| node.modified)
    }

    pub fn mark_saved(&mut self, key: &str) -> Result<(), GraphError> {
        let canonical = self
            .canonical_key(key)
            .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))?
            .to_string();
        if let Some(node) = self.nodes.get_mut(&canonical) {
            node.modified = false;
        }
        Ok(())
    }

    /// Breadth-first traversal from `start` (or the root) along `allowed`
    /// relations; an empty slice follows every relation.
    pub fn walk(&self, start: Option<&str>, allowed: &[RelationKind]) -> Result<Walk<'_>, GraphError> {
        let start = match start {
            Some(key) => self
                .canonical_key(key)
                .ok_or_else(|| GraphError::NodeNotFound(key.to_string()))?,
            None => self.root.as_deref().ok_or(GraphError::MissingRoot)?,
        };
        Ok(Walk::new(self, start, allowed))
    }
}

/// Lazy breadth-first iterator over an [`ObjectGraph`]. Each reachable node
/// is yielded once, in discovery order.
pub struct Walk<'a> {
    graph: &'a ObjectGraph,
    queue: VecDeque<&'a str>,
    visited: HashSet<&'a str>,
    allowed: Vec<RelationKind>,
}

impl<'a> Walk<'a> {
    fn new(graph: &'a ObjectGraph, start: &'a str, allowed: &[RelationKind]) -> Self {
        let mut visited = HashSet::new();
        visited.insert(start);
        Self {
            graph,
            queue: VecDeque::from([start]),
            visited,
            allowed: allowed.to_vec(),
        }
    }

    fn follows(&self, relation: RelationKind) -> bool {
        self.allowed.is_empty() || self.allowed.contains(&relation)
    }
}

impl<'a> Iterator for Walk<'a> {
    type Item = &'a Node;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        while let Some(key) = self.queue.pop_front() {
            let Some(node) = graph.nodes.get(key) else {
                continue;
            };
            for (relation, target) in &node.edges {
                if self.follows(*relation) && self.visited.insert(target.as_str()) {
                    self.queue.push_back(target.as_str());
                }
            }
            return Some(node);
        }
        None
    }
}
