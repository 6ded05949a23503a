use pakdump_core::{ErrorCode, ObjectRecord, PakdumpError, Properties, RecordKind};
use std::sync::Arc;
use storage::{GraphError, ObjectGraph, RelationKind};

fn record(kind: RecordKind, type_name: &str, name: &str) -> Arc<ObjectRecord> {
    Arc::new(ObjectRecord::new(kind, type_name, name))
}

fn firearm_graph() -> ObjectGraph {
    let mut graph = ObjectGraph::new();
    graph.upsert(record(RecordKind::Generic, "ItemRoot", "ItemRoot"), false).unwrap();
    graph.set_root("ItemRoot'ItemRoot'").unwrap();
    for (kind, type_name, name) in [
        (RecordKind::ItemType, "ItemType", "IT_Firearm"),
        (RecordKind::ItemType, "ItemType", "IT_Magazine"),
        (RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Firearm_Flock17_C"),
        (RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Magazine_Wolfram17_17_C"),
        (RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Ammo_9mm_C"),
        (RecordKind::BulletType, "BulletType", "BT_9mm"),
    ] {
        graph.upsert(record(kind, type_name, name), false).unwrap();
    }

    let edges = [
        ("ItemRoot'ItemRoot'", RelationKind::HasItemType, "ItemType'IT_Firearm'"),
        ("ItemRoot'ItemRoot'", RelationKind::HasItemType, "ItemType'IT_Magazine'"),
        ("BlueprintGeneratedClass'BP_Firearm_Flock17_C'", RelationKind::HasItemType, "ItemType'IT_Firearm'"),
        ("BlueprintGeneratedClass'BP_Firearm_Flock17_C'", RelationKind::HasMagazine, "BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'"),
        ("BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'", RelationKind::HasItemType, "ItemType'IT_Magazine'"),
        ("BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'", RelationKind::HasAmmo, "BlueprintGeneratedClass'BP_Ammo_9mm_C'"),
        ("BlueprintGeneratedClass'BP_Ammo_9mm_C'", RelationKind::HasBulletType, "BulletType'BT_9mm'"),
    ];
    for (from, relation, to) in edges {
        graph.add_edge(from, relation, to).unwrap();
    }
    graph
}

#[test]
fn test_upsert_preserves_record_identity() {
    let mut graph = ObjectGraph::new();
    let ammo = record(RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Ammo_9mm_C");

    let node = graph.upsert(ammo.clone(), false).unwrap();
    assert!(Arc::ptr_eq(node.record(), &ammo));

    let node = graph
        .get_node("BlueprintGeneratedClass'BP_Ammo_9mm_C'", RecordKind::Blueprint)
        .unwrap();
    assert!(Arc::ptr_eq(node.record(), &ammo));
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_upsert_conflict_without_update() {
    let mut graph = ObjectGraph::new();
    graph.upsert(record(RecordKind::ItemType, "ItemType", "IT_Bullet"), false).unwrap();

    let err = graph
        .upsert(record(RecordKind::ItemType, "ItemType", "IT_Bullet"), false)
        .unwrap_err();
    assert!(matches!(err, GraphError::Conflict(ref key) if key == "ItemType'IT_Bullet'"));
    assert_eq!(err.error_code(), ErrorCode::Conflict);
    assert_eq!(graph.len(), 1);
}

#[test]
fn test_update_replaces_record_and_keeps_edges() {
    let mut graph = firearm_graph();
    let key = "BlueprintGeneratedClass'BP_Firearm_Flock17_C'";
    graph.mark_saved(key).unwrap();

    let mut properties = Properties::new();
    properties.insert("AmmoCapacity", serde_json::json!(17));
    let replacement = Arc::new(
        ObjectRecord::new(RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Firearm_Flock17_C")
            .with_properties(properties),
    );
    let edges_before = graph.node(key).unwrap().edges().to_vec();

    let node = graph.upsert(replacement.clone(), true).unwrap();
    assert!(Arc::ptr_eq(node.record(), &replacement));
    assert_eq!(node.edges(), edges_before.as_slice());
    assert!(node.is_modified());
    assert!(graph.modified_nodes().any(|n| n.id() == key));
}

#[test]
fn test_update_with_other_kind_is_rejected() {
    let mut graph = ObjectGraph::new();
    graph.upsert(record(RecordKind::ItemType, "ItemType", "IT_Bullet"), false).unwrap();

    let err = graph
        .upsert(record(RecordKind::BulletType, "ItemType", "IT_Bullet"), true)
        .unwrap_err();
    assert!(matches!(err, GraphError::TypeMismatch { .. }));
    assert_eq!(err.error_code(), ErrorCode::TypeMismatch);
}

#[test]
fn test_upsert_rejects_empty_name() {
    let mut graph = ObjectGraph::new();
    let err = graph.upsert(record(RecordKind::Generic, "ItemRoot", ""), false).unwrap_err();
    assert!(matches!(err, GraphError::MissingName));
}

#[test]
fn test_get_node_checks_kind() {
    let graph = firearm_graph();
    assert!(graph.get_node("BulletType'BT_9mm'", RecordKind::BulletType).is_some());
    assert!(graph.get_node("BulletType'BT_9mm'", RecordKind::Blueprint).is_none());
    assert!(graph.get_node("BulletType'BT_Missing'", RecordKind::BulletType).is_none());
}

#[test]
fn test_edges_are_mirrored_as_neighbours() {
    let graph = firearm_graph();
    let magazine = graph.node("BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'").unwrap();
    assert_eq!(
        magazine.neighbours(),
        &[(
            RelationKind::HasMagazine,
            "BlueprintGeneratedClass'BP_Firearm_Flock17_C'".to_string()
        )]
    );

    let item_type = graph.node("ItemType'IT_Firearm'").unwrap();
    let sources: Vec<&str> = item_type.neighbour_keys(RelationKind::HasItemType).collect();
    assert_eq!(
        sources,
        vec!["ItemRoot'ItemRoot'", "BlueprintGeneratedClass'BP_Firearm_Flock17_C'"]
    );
}

#[test]
fn test_add_then_remove_edge_restores_lists() {
    let mut graph = firearm_graph();
    let from = "BlueprintGeneratedClass'BP_Firearm_Flock17_C'";
    let to = "BlueprintGeneratedClass'BP_Ammo_9mm_C'";
    let edges_before = graph.node(from).unwrap().edges().to_vec();
    let neighbours_before = graph.node(to).unwrap().neighbours().to_vec();

    graph.add_edge(from, RelationKind::HasAmmo, to).unwrap();
    assert!(graph.has_edge(from, RelationKind::HasAmmo, to));

    assert!(graph.remove_edge(from, RelationKind::HasAmmo, to).unwrap());
    assert!(!graph.has_edge(from, RelationKind::HasAmmo, to));
    assert_eq!(graph.node(from).unwrap().edges(), edges_before.as_slice());
    assert_eq!(graph.node(to).unwrap().neighbours(), neighbours_before.as_slice());

    assert!(!graph.remove_edge(from, RelationKind::HasAmmo, to).unwrap());
}

#[test]
fn test_duplicate_edges_remove_one_at_a_time() {
    let mut graph = firearm_graph();
    let from = "ItemRoot'ItemRoot'";
    let to = "BulletType'BT_9mm'";
    graph.add_edge(from, RelationKind::HasBulletType, to).unwrap();
    graph.add_edge(from, RelationKind::HasBulletType, to).unwrap();

    graph.remove_edge(from, RelationKind::HasBulletType, to).unwrap();
    assert!(graph.has_edge(from, RelationKind::HasBulletType, to));
    assert_eq!(graph.sources(to, RelationKind::HasBulletType).len(), 2);
}

#[test]
fn test_edge_to_missing_node_fails() {
    let mut graph = firearm_graph();
    let err = graph
        .add_edge("ItemRoot'ItemRoot'", RelationKind::HasItemType, "ItemType'IT_Nothing'")
        .unwrap_err();
    assert!(matches!(err, GraphError::NodeNotFound(ref key) if key == "ItemType'IT_Nothing'"));
    assert_eq!(err.error_code(), ErrorCode::NotFound);
}

#[test]
fn test_walk_visits_each_reachable_node_once() {
    let graph = firearm_graph();
    let visited: Vec<&str> = graph.walk(None, &[]).unwrap().map(|node| node.id()).collect();

    // IT_Firearm is reachable from the root and from the firearm.
    assert_eq!(visited.len(), 3);
    assert_eq!(visited[0], "ItemRoot'ItemRoot'");
    assert!(visited.contains(&"ItemType'IT_Firearm'"));

    let from_firearm: Vec<&str> = graph
        .walk(Some("BlueprintGeneratedClass'BP_Firearm_Flock17_C'"), &[])
        .unwrap()
        .map(|node| node.id())
        .collect();
    assert_eq!(
        from_firearm,
        vec![
            "BlueprintGeneratedClass'BP_Firearm_Flock17_C'",
            "ItemType'IT_Firearm'",
            "BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'",
            "ItemType'IT_Magazine'",
            "BlueprintGeneratedClass'BP_Ammo_9mm_C'",
            "BulletType'BT_9mm'",
        ]
    );
}

#[test]
fn test_walk_follows_only_allowed_relations() {
    let graph = firearm_graph();
    let visited: Vec<&str> = graph
        .walk(
            Some("BlueprintGeneratedClass'BP_Firearm_Flock17_C'"),
            &[RelationKind::HasMagazine, RelationKind::HasAmmo],
        )
        .unwrap()
        .map(|node| node.id())
        .collect();
    assert_eq!(
        visited,
        vec![
            "BlueprintGeneratedClass'BP_Firearm_Flock17_C'",
            "BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'",
            "BlueprintGeneratedClass'BP_Ammo_9mm_C'",
        ]
    );
}

#[test]
fn test_walk_without_root_fails() {
    let graph = ObjectGraph::new();
    assert!(matches!(graph.walk(None, &[]), Err(GraphError::MissingRoot)));
    assert!(matches!(
        graph.walk(Some("ItemType'IT_Bullet'"), &[]),
        Err(GraphError::NodeNotFound(_))
    ));
}

#[test]
fn test_aliases_resolve_one_hop() {
    let mut graph = firearm_graph();
    graph
        .register_alias(
            "BP_Ammo_9mm_C'Default__BP_Ammo_9mm_C'",
            "BlueprintGeneratedClass'BP_Ammo_9mm_C'",
        )
        .unwrap();

    let node = graph
        .get_node("BP_Ammo_9mm_C'Default__BP_Ammo_9mm_C'", RecordKind::Blueprint)
        .unwrap();
    assert_eq!(node.id(), "BlueprintGeneratedClass'BP_Ammo_9mm_C'");
    assert!(graph.has_edge(
        "BP_Ammo_9mm_C'Default__BP_Ammo_9mm_C'",
        RelationKind::HasBulletType,
        "BulletType'BT_9mm'"
    ));
    assert!(graph.register_alias("x", "ItemType'IT_Nothing'").is_err());
}

#[test]
fn test_ue_prefixed_type_tags_match_either_way() {
    let mut graph = ObjectGraph::new();
    graph
        .upsert(record(RecordKind::Fluid, "UEFluidDefinition", "FL_AnabolicSteroid"), false)
        .unwrap();
    graph
        .upsert(record(RecordKind::Fluid, "FluidDefinition", "FL_Wine"), false)
        .unwrap();
    graph
        .upsert(record(RecordKind::Blueprint, "BlueprintGeneratedClass", "BP_Syringe_C"), false)
        .unwrap();

    let steroid = graph
        .get_node("FluidDefinition'FL_AnabolicSteroid'", RecordKind::Fluid)
        .unwrap();
    assert_eq!(steroid.id(), "UEFluidDefinition'FL_AnabolicSteroid'");
    assert_eq!(
        graph.node("UEFluidDefinition'FL_Wine'").unwrap().id(),
        "FluidDefinition'FL_Wine'"
    );

    graph
        .add_edge(
            "BlueprintGeneratedClass'BP_Syringe_C'",
            RelationKind::HasFluid,
            "FluidDefinition'FL_AnabolicSteroid'",
        )
        .unwrap();
    let containers = graph.sources("UEFluidDefinition'FL_AnabolicSteroid'", RelationKind::HasFluid);
    assert_eq!(containers.len(), 1);
    assert_eq!(containers[0].id(), "BlueprintGeneratedClass'BP_Syringe_C'");
    assert_eq!(graph.len(), 3);
}

#[test]
fn test_walk_terminates_on_cycles() {
    let mut graph = ObjectGraph::new();
    for name in ["IT_A", "IT_B", "IT_C"] {
        graph.upsert(record(RecordKind::ItemType, "ItemType", name), false).unwrap();
    }
    let edges = [
        ("ItemType'IT_A'", "ItemType'IT_B'"),
        ("ItemType'IT_B'", "ItemType'IT_A'"),
        ("ItemType'IT_B'", "ItemType'IT_B'"),
        ("ItemType'IT_B'", "ItemType'IT_C'"),
        ("ItemType'IT_C'", "ItemType'IT_C'"),
        ("ItemType'IT_C'", "ItemType'IT_A'"),
    ];
    for (from, to) in edges {
        graph.add_edge(from, RelationKind::HasItemType, to).unwrap();
    }

    let visited: Vec<&str> = graph
        .walk(Some("ItemType'IT_A'"), &[])
        .unwrap()
        .map(|node| node.id())
        .collect();
    assert_eq!(visited, vec!["ItemType'IT_A'", "ItemType'IT_B'", "ItemType'IT_C'"]);

    let from_c: Vec<&str> = graph
        .walk(Some("ItemType'IT_C'"), &[RelationKind::HasItemType])
        .unwrap()
        .map(|node| node.id())
        .collect();
    assert_eq!(from_c, vec!["ItemType'IT_C'", "ItemType'IT_A'", "ItemType'IT_B'"]);
}

#[test]
fn test_walk_on_self_loop_yields_node_once() {
    let mut graph = ObjectGraph::new();
    graph.upsert(record(RecordKind::ItemType, "ItemType", "IT_Loop"), false).unwrap();
    graph
        .add_edge("ItemType'IT_Loop'", RelationKind::HasItemType, "ItemType'IT_Loop'")
        .unwrap();

    let mut walk = graph.walk(Some("ItemType'IT_Loop'"), &[]).unwrap();
    assert_eq!(walk.next().map(|node| node.id()), Some("ItemType'IT_Loop'"));
    assert!(walk.next().is_none());
}

#[test]
fn test_related_and_saved_bookkeeping() {
    let mut graph = firearm_graph();
    let related = graph
        .related("BlueprintGeneratedClass'BP_Magazine_Wolfram17_17_C'", RelationKind::HasAmmo)
        .unwrap();
    assert_eq!(related.edges.len(), 1);
    assert!(related.neighbours.is_empty());

    assert_eq!(graph.modified_nodes().count(), graph.len());
    let keys: Vec<String> = graph.nodes().map(|node| node.id().to_string()).collect();
    for key in &keys {
        graph.mark_saved(key).unwrap();
    }
    assert_eq!(graph.modified_nodes().count(), 0);
    assert_eq!(graph.edge_count(), 7);
}
