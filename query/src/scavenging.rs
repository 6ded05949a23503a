//! Fluid contents of containers, seen from both ends of `HAS_FLUID`.

use crate::display::WikiReference;
use crate::metrology::fluid_volume_str;
use crate::resolve_soft;
use ingestion::ReferenceResolver;
use pakdump_core::RecordKind;
use serde::Serialize;
use storage::{Node, ObjectGraph, RelationKind};

/// The fluid a container spawns with.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FluidContent {
    pub fluid: WikiReference,
    pub min: Option<String>,
    pub max: Option<String>,
    pub capacity: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Scavenging {
    /// Set on containers.
    pub contents: Option<FluidContent>,
    /// Set on fluids: every container found holding it.
    pub containers: Vec<WikiReference>,
}

impl Scavenging {
    pub fn is_valid(&self) -> bool {
        self.contents.is_some() || !self.containers.is_empty()
    }
}

pub fn scavenging(graph: &ObjectGraph, resolver: &ReferenceResolver, node: &Node) -> Option<Scavenging> {
    let scavenging = Scavenging {
        contents: fluid_content(graph, resolver, node),
        containers: containers(graph, node),
    };
    scavenging.is_valid().then_some(scavenging)
}

/// `DefaultFluid` of a container, with its volumes formatted for display.
pub fn fluid_content(graph: &ObjectGraph, resolver: &ReferenceResolver, node: &Node) -> Option<FluidContent> {
    let props = &node.record().properties;
    let reference = props.reference("DefaultFluid")?;
    let name = match graph.node(&reference.object_name) {
        Some(fluid) if fluid.kind() == RecordKind::Fluid => fluid.record().display_name(),
        _ => resolve_soft(resolver, &reference)?.display_name(),
    };
    Some(FluidContent {
        fluid: WikiReference::new(name),
        min: props.f64("DefaultFluidMin").map(fluid_volume_str),
        max: props.f64("DefaultFluidMax").map(fluid_volume_str),
        capacity: props.f64("FluidCapacity").map(fluid_volume_str),
    })
}

/// Containers pointing at a fluid node, in import order.
pub fn containers(graph: &ObjectGraph, node: &Node) -> Vec<WikiReference> {
    if node.kind() != RecordKind::Fluid {
        return Vec::new();
    }
    graph
        .sources(node.id(), RelationKind::HasFluid)
        .into_iter()
        .map(|container| WikiReference::new(container.record().display_name()))
        .collect()
}
