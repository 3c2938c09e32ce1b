//! Map graph <-> map file codec
//!
//! Saving writes every edge on both endpoints: the owning side of a one-way
//! transition gets `one-way`, the far side gets a `one-way-blocked` mirror,
//! symmetric types are mirrored verbatim. Loading is the reverse and
//! reconciles the mirrors; when hand-edited records disagree, the later one
//! wins and a warning is logged.
//!
//! Structural problems (bad map id or name, bad grid size, out-of-bounds or
//! duplicate cells) reject the file as a whole. Everything else is repaired while loading:
//! dangling edges stay (the runtime refuses them with `NoDestination`),
//! edges between two empty cells are dropped, unknown transition types load
//! as impassable.

use std::collections::{BTreeMap, HashSet};

use gridloom_domain::{
    ConditionAction, Direction, GridSize, MapGraph, MapId, Position, Transition, TransitionKind,
};

use crate::error::MapFileError;
use crate::record::{
    GridSizeRecord, MapFile, NodeRecord, PositionRecord, TransitionRecord, WireTransitionKind,
};

// ============================================================================
// Saving
// ============================================================================

/// Serialize a map graph into its file representation.
///
/// Only edges between adjacent cells fit the per-direction slot layout;
/// non-adjacent links are skipped with a warning.
pub fn save_map(map: &MapGraph) -> MapFile {
    let records = map
        .size()
        .positions()
        .filter_map(|position| {
            let node = map.node(position)?;
            let mut transitions = BTreeMap::new();
            for slot in map.transitions().list_outgoing(position) {
                let Some(resolved) = slot.transition else {
                    continue;
                };
                transitions.insert(
                    slot.direction,
                    transition_record(resolved.transition, slot.direction),
                );
            }
            Some(NodeRecord {
                column: position.x,
                row: position.y,
                node: node.clone(),
                transitions,
            })
        })
        .collect();

    for (key, _) in map.transitions().iter() {
        if !key.from.is_adjacent_to(key.to) {
            tracing::warn!(edge = %key, "Transition links non-adjacent cells, not saved");
        }
    }

    MapFile {
        map_id: map.id().as_str().to_string(),
        name: map.name().to_string(),
        grid_size: GridSizeRecord {
            width: map.size().width(),
            height: map.size().height(),
        },
        default_start: PositionRecord {
            x: map.default_start().x,
            y: map.default_start().y,
        },
        nodes: records,
    }
}

/// The record for one directional slot, as seen from the node on `slot_direction`'s
/// near side
fn transition_record(transition: &Transition, slot_direction: Direction) -> TransitionRecord {
    let mut record = TransitionRecord {
        kind: wire_kind(transition.kind),
        conditions: transition.conditions.clone(),
        direction: transition.direction,
        allowed_direction: None,
        blocked_direction: None,
    };
    if transition.kind == TransitionKind::OneWay {
        let permitted = transition.direction.unwrap_or(slot_direction);
        if permitted == slot_direction {
            record.direction = Some(permitted);
        } else {
            // this endpoint sits on the blocked side of the one-way
            record.kind = WireTransitionKind::OneWayBlocked;
            record.direction = None;
            record.allowed_direction = Some(permitted);
            record.blocked_direction = Some(slot_direction);
        }
    }
    record
}

fn wire_kind(kind: TransitionKind) -> WireTransitionKind {
    match kind {
        TransitionKind::None => WireTransitionKind::None,
        TransitionKind::Bidirectional => WireTransitionKind::Bidirectional,
        TransitionKind::OneWay => WireTransitionKind::OneWay,
        TransitionKind::Locked => WireTransitionKind::Locked,
        TransitionKind::Secret => WireTransitionKind::Secret,
    }
}

/// `save_map` straight to pretty-printed JSON
pub fn to_json_string(map: &MapGraph) -> Result<String, MapFileError> {
    Ok(save_map(map).to_json()?)
}

// ============================================================================
// Loading
// ============================================================================

/// Rebuild a map graph from its file representation.
///
/// Fails on structural errors without partially loading anything; everything
/// recoverable is repaired and logged.
pub fn load_map(file: &MapFile) -> Result<MapGraph, MapFileError> {
    let id = MapId::new(file.map_id.clone())?;
    let size = GridSize::new(file.grid_size.width, file.grid_size.height)?;
    let mut map = MapGraph::try_new(id, file.name.clone(), size)?;

    // First pass: structural validation and node content
    let mut seen = HashSet::new();
    for record in &file.nodes {
        let position = Position::new(record.column, record.row);
        if !size.contains(position) {
            return Err(MapFileError::NodeOutOfBounds {
                column: record.column,
                row: record.row,
                width: size.width(),
                height: size.height(),
            });
        }
        if !seen.insert(position) {
            return Err(MapFileError::DuplicateNode {
                column: record.column,
                row: record.row,
            });
        }
        if record.node.is_empty() {
            tracing::warn!(%position, "Node record has no content, cell stays empty");
            continue;
        }
        let outcome = map.save_node(position, record.node.clone())?;
        for conflict in outcome.entry_conflicts {
            tracing::warn!(%conflict, "Entry point reassigned while loading");
        }
    }

    let start = Position::new(file.default_start.x, file.default_start.y);
    if !size.contains(start) {
        return Err(MapFileError::StartOutOfBounds {
            x: start.x,
            y: start.y,
        });
    }
    map.set_default_start(start)?;

    // Second pass: transitions, reconciling the two records of each edge
    for record in &file.nodes {
        let from = Position::new(record.column, record.row);
        for (slot_direction, slot) in &record.transitions {
            let to = from.step(*slot_direction);
            let transition = reconstruct_transition(slot, *slot_direction, from);

            if let Some(existing) = map.transitions().get(from, to) {
                if *existing.transition == transition {
                    continue;
                }
                tracing::warn!(
                    %from,
                    %to,
                    "Mirrored transition records disagree, keeping the later one"
                );
            }
            if let Err(error) = map.set_transition(from, to, transition) {
                tracing::warn!(%from, %to, %error, "Transition record unusable, skipped");
            }
        }
    }

    map.transitions().validate()?;
    Ok(map)
}

/// Turn one slot record back into the domain transition it describes
fn reconstruct_transition(
    record: &TransitionRecord,
    slot_direction: Direction,
    from: Position,
) -> Transition {
    let (kind, direction) = match record.kind {
        WireTransitionKind::None => (TransitionKind::None, record.direction),
        WireTransitionKind::Bidirectional => (TransitionKind::Bidirectional, record.direction),
        WireTransitionKind::Locked => (TransitionKind::Locked, record.direction),
        WireTransitionKind::Secret => (TransitionKind::Secret, record.direction),
        WireTransitionKind::OneWay => {
            let permitted = record.direction.or(record.allowed_direction).unwrap_or_else(|| {
                tracing::warn!(
                    %from,
                    slot = %slot_direction,
                    "One-way record lacks a direction, assuming the slot direction"
                );
                slot_direction
            });
            (TransitionKind::OneWay, Some(permitted))
        }
        WireTransitionKind::OneWayBlocked => {
            let permitted = record
                .allowed_direction
                .or_else(|| record.blocked_direction.map(|d| d.opposite()))
                .unwrap_or_else(|| {
                    tracing::warn!(
                        %from,
                        slot = %slot_direction,
                        "Blocked mirror lacks a direction, assuming the opposite slot"
                    );
                    slot_direction.opposite()
                });
            (TransitionKind::OneWay, Some(permitted))
        }
        WireTransitionKind::Unknown => {
            tracing::warn!(
                %from,
                slot = %slot_direction,
                "Unknown transition type, loading as impassable"
            );
            (TransitionKind::None, None)
        }
    };
    for condition in &record.conditions {
        if condition.action == ConditionAction::ChangeIf && condition.change_target.is_none() {
            tracing::warn!(
                %from,
                slot = %slot_direction,
                name = %condition.predicate.name,
                "changeIf condition has no changeTarget and will never retype the transition"
            );
        }
    }
    Transition {
        kind,
        direction,
        conditions: record.conditions.clone(),
    }
}

/// Parse JSON and rebuild the graph in one step
pub fn from_json_str(json: &str) -> Result<MapGraph, MapFileError> {
    let file = MapFile::from_json(json)?;
    load_map(&file)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridloom_domain::{
        ComparisonOp, Node, NodeCondition, StatePredicate, TransitionCondition,
    };

    /// Authored map exercising every transition type plus entry tags and fog
    fn authored_map() -> MapGraph {
        let mut map = MapGraph::new(
            MapId::new("keep").unwrap(),
            "The Keep",
            GridSize::new(4, 3).unwrap(),
        );
        let hall = Position::new(1, 1);
        let vault = Position::new(2, 1);
        let cellar = Position::new(2, 2);

        map.save_node(
            hall,
            Node::new()
                .with_name("Hall")
                .with_passage("Drafty.")
                .with_tag("entry-main")
                .with_fog_of_war(true)
                .with_condition(NodeCondition::new(
                    StatePredicate::quest("siege", ComparisonOp::Eq, "over"),
                    "Sunlight again.",
                )),
        )
        .unwrap();
        map.save_node(vault, Node::new().with_name("Vault")).unwrap();
        map.save_node(cellar, Node::new().with_name("Cellar")).unwrap();

        map.set_default_start(hall).unwrap();
        map.set_transition(
            hall,
            vault,
            Transition::locked().with_condition(TransitionCondition::unlock_if(
                StatePredicate::item("key", ComparisonOp::Ge, "1"),
            )),
        )
        .unwrap();
        map.set_transition(vault, cellar, Transition::one_way(Direction::South))
            .unwrap();
        map
    }

    mod saving {
        use super::*;

        #[test]
        fn test_every_edge_appears_on_both_endpoints() {
            let file = save_map(&authored_map());

            let hall = record_at(&file, 1, 1);
            let vault = record_at(&file, 2, 1);
            assert_eq!(
                hall.transitions[&Direction::East].kind,
                WireTransitionKind::Locked
            );
            assert_eq!(
                vault.transitions[&Direction::West].kind,
                WireTransitionKind::Locked
            );
            // conditions mirrored verbatim
            assert_eq!(
                vault.transitions[&Direction::West].conditions,
                hall.transitions[&Direction::East].conditions
            );
        }

        #[test]
        fn test_one_way_mirror_is_blocked_on_the_far_side() {
            let file = save_map(&authored_map());

            let vault = record_at(&file, 2, 1);
            let south = &vault.transitions[&Direction::South];
            assert_eq!(south.kind, WireTransitionKind::OneWay);
            assert_eq!(south.direction, Some(Direction::South));

            let cellar = record_at(&file, 2, 2);
            let north = &cellar.transitions[&Direction::North];
            assert_eq!(north.kind, WireTransitionKind::OneWayBlocked);
            assert_eq!(north.allowed_direction, Some(Direction::South));
            assert_eq!(north.blocked_direction, Some(Direction::North));
        }

        #[test]
        fn test_rows_are_sorted_row_major() {
            let file = save_map(&authored_map());
            let order: Vec<(i32, i32)> =
                file.nodes.iter().map(|r| (r.column, r.row)).collect();
            assert_eq!(order, vec![(1, 1), (2, 1), (2, 2)]);
        }

        #[test]
        fn test_non_adjacent_links_are_not_saved() {
            let mut map = authored_map();
            map.set_transition(
                Position::new(1, 1),
                Position::new(2, 2),
                Transition::bidirectional(),
            )
            .unwrap();

            let file = save_map(&map);
            let total_slots: usize = file.nodes.iter().map(|r| r.transitions.len()).sum();
            // 2 edges x 2 endpoints; the diagonal link has no slot
            assert_eq!(total_slots, 4);
        }

        #[test]
        fn test_header_carries_map_identity() {
            let file = save_map(&authored_map());
            assert_eq!(file.map_id, "keep");
            assert_eq!(file.name, "The Keep");
            assert_eq!(file.grid_size, GridSizeRecord { width: 4, height: 3 });
            assert_eq!(file.default_start, PositionRecord { x: 1, y: 1 });
        }
    }

    mod loading {
        use super::*;

        #[test]
        fn test_round_trip_preserves_semantics() {
            let original = authored_map();
            let loaded = load_map(&save_map(&original)).unwrap();

            assert_eq!(loaded.id(), original.id());
            assert_eq!(loaded.name(), original.name());
            assert_eq!(loaded.node_count(), original.node_count());
            assert_eq!(loaded.default_start(), original.default_start());
            assert!(loaded.fog_of_war());
            assert_eq!(
                loaded.entry_points().resolve("entry-main"),
                Some(Position::new(1, 1))
            );

            let hall = loaded.node(Position::new(1, 1)).unwrap();
            assert_eq!(hall.passage, "Drafty.");
            assert_eq!(hall.conditions.len(), 1);

            let locked = loaded
                .transitions()
                .get(Position::new(1, 1), Position::new(2, 1))
                .unwrap();
            assert_eq!(locked.transition.kind, TransitionKind::Locked);
            assert_eq!(locked.transition.conditions.len(), 1);

            let chute = loaded
                .transitions()
                .get(Position::new(2, 1), Position::new(2, 2))
                .unwrap();
            assert_eq!(chute.transition.kind, TransitionKind::OneWay);
            assert_eq!(chute.transition.direction, Some(Direction::South));

            assert_eq!(loaded.transitions().len(), original.transitions().len());
            assert!(loaded.transitions().validate().is_ok());
        }

        #[test]
        fn test_duplicate_cells_reject_the_file() {
            let mut file = save_map(&authored_map());
            let copy = file.nodes[0].clone();
            file.nodes.push(copy);
            assert!(matches!(
                load_map(&file),
                Err(MapFileError::DuplicateNode { column: 1, row: 1 })
            ));
        }

        #[test]
        fn test_out_of_bounds_cells_reject_the_file() {
            let mut file = save_map(&authored_map());
            file.nodes[0].column = 9;
            assert!(matches!(
                load_map(&file),
                Err(MapFileError::NodeOutOfBounds { column: 9, .. })
            ));
        }

        #[test]
        fn test_out_of_bounds_start_rejects_the_file() {
            let mut file = save_map(&authored_map());
            file.default_start = PositionRecord { x: -1, y: 0 };
            assert!(matches!(
                load_map(&file),
                Err(MapFileError::StartOutOfBounds { x: -1, y: 0 })
            ));
        }

        #[test]
        fn test_invalid_grid_size_rejects_the_file() {
            let mut file = save_map(&authored_map());
            file.grid_size = GridSizeRecord { width: 0, height: 3 };
            assert!(matches!(load_map(&file), Err(MapFileError::Domain(_))));
        }

        #[test]
        fn test_overlong_map_name_rejects_the_file() {
            let mut file = save_map(&authored_map());
            file.name = "x".repeat(300);
            assert!(matches!(load_map(&file), Err(MapFileError::Domain(_))));
        }

        #[test]
        fn test_dangling_edge_is_kept() {
            // hall has an east edge in the file, but the vault record is gone
            let mut file = save_map(&authored_map());
            file.nodes.retain(|r| (r.column, r.row) != (2, 1));

            let loaded = load_map(&file).unwrap();
            assert!(loaded.node(Position::new(2, 1)).is_none());
            assert!(loaded
                .transitions()
                .contains(Position::new(1, 1), Position::new(2, 1)));
        }

        #[test]
        fn test_disagreeing_mirrors_resolve_to_the_later_record() {
            let mut file = save_map(&authored_map());
            // hand-edit the vault's side of the locked door to bidirectional
            let vault_index = file
                .nodes
                .iter()
                .position(|r| (r.column, r.row) == (2, 1))
                .unwrap();
            if let Some(slot) = file.nodes[vault_index]
                .transitions
                .get_mut(&Direction::West)
            {
                slot.kind = WireTransitionKind::Bidirectional;
                slot.conditions.clear();
            }

            let loaded = load_map(&file).unwrap();
            let edge = loaded
                .transitions()
                .get(Position::new(1, 1), Position::new(2, 1))
                .unwrap();
            // the vault record comes later in row-major order and wins
            assert_eq!(edge.transition.kind, TransitionKind::Bidirectional);
            assert!(edge.transition.conditions.is_empty());
        }

        #[test]
        fn test_unknown_transition_type_loads_as_impassable() {
            let json = r#"{
                "mapId": "tiny",
                "name": "Tiny",
                "gridSize": {"width": 2, "height": 1},
                "defaultStart": {"x": 0, "y": 0},
                "nodes": [
                    {"column": 0, "row": 0, "name": "A",
                     "transitions": {"east": {"type": "teleporter"}}},
                    {"column": 1, "row": 0, "name": "B"}
                ]
            }"#;
            let loaded = from_json_str(json).unwrap();
            let edge = loaded
                .transitions()
                .get(Position::new(0, 0), Position::new(1, 0))
                .unwrap();
            assert_eq!(edge.transition.kind, TransitionKind::None);
        }

        #[test]
        fn test_one_way_blocked_alone_reconstructs_the_edge() {
            // only the blocked side survives in the file
            let json = r#"{
                "mapId": "tiny",
                "name": "Tiny",
                "gridSize": {"width": 2, "height": 1},
                "defaultStart": {"x": 0, "y": 0},
                "nodes": [
                    {"column": 0, "row": 0, "name": "A"},
                    {"column": 1, "row": 0, "name": "B",
                     "transitions": {"west": {"type": "one-way-blocked",
                                              "allowedDirection": "east",
                                              "blockedDirection": "west"}}}
                ]
            }"#;
            let loaded = from_json_str(json).unwrap();
            let edge = loaded
                .transitions()
                .get(Position::new(0, 0), Position::new(1, 0))
                .unwrap();
            assert_eq!(edge.transition.kind, TransitionKind::OneWay);
            assert_eq!(edge.transition.direction, Some(Direction::East));
        }

        #[test]
        fn test_empty_node_record_leaves_the_cell_empty() {
            let json = r#"{
                "mapId": "tiny",
                "name": "Tiny",
                "gridSize": {"width": 2, "height": 1},
                "defaultStart": {"x": 0, "y": 0},
                "nodes": [
                    {"column": 0, "row": 0, "name": "A"},
                    {"column": 1, "row": 0}
                ]
            }"#;
            let loaded = from_json_str(json).unwrap();
            assert_eq!(loaded.node_count(), 1);
            assert!(loaded.node(Position::new(1, 0)).is_none());
        }

        #[test]
        fn test_entry_tag_collision_keeps_the_later_node() {
            let json = r#"{
                "mapId": "tiny",
                "name": "Tiny",
                "gridSize": {"width": 2, "height": 1},
                "defaultStart": {"x": 0, "y": 0},
                "nodes": [
                    {"column": 0, "row": 0, "name": "A", "tags": ["entry-main"]},
                    {"column": 1, "row": 0, "name": "B", "tags": ["entry-main"]}
                ]
            }"#;
            let loaded = from_json_str(json).unwrap();
            assert_eq!(
                loaded.entry_points().resolve("entry-main"),
                Some(Position::new(1, 0))
            );
            assert!(!loaded.node(Position::new(0, 0)).unwrap().has_tag("entry-main"));
        }

        #[test]
        fn test_json_round_trip_through_strings() {
            let original = authored_map();
            let json = to_json_string(&original).unwrap();
            let loaded = from_json_str(&json).unwrap();
            assert_eq!(loaded.node_count(), original.node_count());
            assert_eq!(loaded.transitions().len(), original.transitions().len());
        }
    }

    fn record_at(file: &MapFile, column: i32, row: i32) -> &NodeRecord {
        file.nodes
            .iter()
            .find(|r| r.column == column && r.row == row)
            .unwrap_or_else(|| panic!("no record at ({column}, {row})"))
    }
}
