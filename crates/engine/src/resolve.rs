//! Traversal and presentation resolution
//!
//! The movement check runs as a fixed pipeline: edge lookup, effective type
//! via `changeIf`, secrecy, lock refinement, one-way direction, and finally
//! the condition gate. Each stage refuses with its own [`RejectReason`] so
//! hosts can tell the player why a step failed, and the first refusal wins.

use serde::{Deserialize, Serialize};

use gridloom_domain::{
    ConditionAction, Direction, MapGraph, Node, Position, Transition, TransitionKind,
};

use crate::eval;
use crate::state::GameStateView;

/// Why a traversal attempt was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RejectReason {
    /// No transition exists toward that neighbor
    NoEdge,
    /// The effective type forbids passage (explicit `none` or locked)
    Blocked,
    /// The transition is still a secret
    Hidden,
    /// One-way transition traversed against its permitted direction
    WrongWay,
    /// A condition attached to the transition does not hold
    ConditionUnmet,
    /// The traversal is fine but no node exists on the other side
    NoDestination,
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RejectReason::NoEdge => "no passage leads that way",
            RejectReason::Blocked => "the way is blocked",
            RejectReason::Hidden => "nothing suggests a passage there",
            RejectReason::WrongWay => "the passage only opens from the other side",
            RejectReason::ConditionUnmet => "something still bars the way",
            RejectReason::NoDestination => "there is nothing on the other side",
        };
        write!(f, "{text}")
    }
}

/// The transition type in effect right now: the first `changeIf` whose
/// predicate holds overrides the authored type
pub fn effective_kind(transition: &Transition, state: &dyn GameStateView) -> TransitionKind {
    for condition in &transition.conditions {
        if condition.action != ConditionAction::ChangeIf {
            continue;
        }
        let Some(target) = condition.change_target else {
            tracing::debug!("changeIf condition without a target, skipping");
            continue;
        };
        if eval::evaluate(&condition.predicate, state) {
            return target;
        }
    }
    transition.kind
}

/// Walk lock/unlock conditions in authored order; the last one whose
/// predicate holds decides. The effective type seeds the initial state.
fn locked_after_refinement(
    transition: &Transition,
    effective: TransitionKind,
    state: &dyn GameStateView,
) -> bool {
    let mut locked = effective == TransitionKind::Locked;
    for condition in &transition.conditions {
        match condition.action {
            ConditionAction::LockIf if eval::evaluate(&condition.predicate, state) => {
                locked = true;
            }
            ConditionAction::UnlockIf if eval::evaluate(&condition.predicate, state) => {
                locked = false;
            }
            _ => {}
        }
    }
    locked
}

/// A secret transition is given away by any true `unlockIf`
fn has_true_unlock(transition: &Transition, state: &dyn GameStateView) -> bool {
    transition.conditions.iter().any(|condition| {
        condition.action == ConditionAction::UnlockIf && eval::evaluate(&condition.predicate, state)
    })
}

/// Check whether a step from `from` toward `direction` is permitted.
///
/// Returns the target cell on success. Does not require a node on the target
/// cell; [`check_move`] adds that.
pub fn can_traverse(
    map: &MapGraph,
    from: Position,
    direction: Direction,
    state: &dyn GameStateView,
) -> Result<Position, RejectReason> {
    let to = from.step(direction);
    let Some(transition) = map.transition(from, to) else {
        return Err(RejectReason::NoEdge);
    };

    let effective = effective_kind(transition, state);
    if effective == TransitionKind::None {
        return Err(RejectReason::Blocked);
    }
    if effective == TransitionKind::Secret {
        // undiscovered secrets report like walls; an unlock gives them away
        if !has_true_unlock(transition, state) {
            return Err(RejectReason::Hidden);
        }
    } else if locked_after_refinement(transition, effective, state) {
        return Err(RejectReason::Blocked);
    }
    // The permitted direction is stored absolutely, so no orientation fixup
    // is needed no matter which way the store keyed the edge
    if effective == TransitionKind::OneWay && transition.direction != Some(direction) {
        return Err(RejectReason::WrongWay);
    }
    // Condition gate: every attached predicate must hold, regardless of the
    // action it was authored for
    if !transition
        .conditions
        .iter()
        .all(|c| eval::evaluate(&c.predicate, state))
    {
        return Err(RejectReason::ConditionUnmet);
    }

    Ok(to)
}

/// Full movement check: traversal plus a node to arrive on
pub fn check_move(
    map: &MapGraph,
    from: Position,
    direction: Direction,
    state: &dyn GameStateView,
) -> Result<Position, RejectReason> {
    let to = can_traverse(map, from, direction, state)?;
    if !map.has_node(to) {
        return Err(RejectReason::NoDestination);
    }
    Ok(to)
}

/// The node as the player should currently see it: the first matching
/// presentation condition replaces the passage and, when set, the icon.
/// The stored node is never touched.
pub fn effective_node(node: &Node, state: &dyn GameStateView) -> Node {
    let mut shown = node.clone();
    for condition in &node.conditions {
        if eval::evaluate(&condition.predicate, state) {
            shown.passage.clone_from(&condition.passage);
            if let Some(icon) = &condition.icon {
                shown.icon.clone_from(icon);
            }
            break;
        }
    }
    shown
}

/// One directional slot around a cell, resolved against current state
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub direction: Direction,
    pub target: Position,
    /// Effective transition type, when an edge exists at all
    pub kind: Option<TransitionKind>,
    /// Why a step would be refused; `None` means the step is possible
    pub reject: Option<RejectReason>,
}

impl EdgeView {
    pub fn traversable(&self) -> bool {
        self.reject.is_none()
    }

    /// Hosts drawing player-facing maps usually render hidden slots exactly
    /// like absent ones
    pub fn visibly_connected(&self) -> bool {
        self.kind.is_some() && self.reject != Some(RejectReason::Hidden)
    }
}

/// Resolve one direction around `from`
pub fn edge_view(
    map: &MapGraph,
    from: Position,
    direction: Direction,
    state: &dyn GameStateView,
) -> EdgeView {
    let target = from.step(direction);
    let kind = map
        .transition(from, target)
        .map(|transition| effective_kind(transition, state));
    let reject = check_move(map, from, direction, state).err();
    EdgeView {
        direction,
        target,
        kind,
        reject,
    }
}

/// Resolve all four directions around `from`, in [`Direction::ALL`] order
pub fn outgoing_views(
    map: &MapGraph,
    from: Position,
    state: &dyn GameStateView,
) -> [EdgeView; 4] {
    Direction::ALL.map(|direction| edge_view(map, from, direction, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::InMemoryState;
    use gridloom_domain::{
        ComparisonOp, GridSize, MapId, NodeCondition, StatePredicate, TransitionCondition,
    };
    use serde_json::json;

    fn two_cell_map(transition: Transition) -> (MapGraph, Position, Position) {
        let mut map = MapGraph::new(
            MapId::new("test").unwrap(),
            "Test",
            GridSize::new(3, 3).unwrap(),
        );
        let a = Position::new(0, 0);
        let b = Position::new(1, 0);
        map.save_node(a, Node::new().with_name("A")).unwrap();
        map.save_node(b, Node::new().with_name("B")).unwrap();
        map.set_transition(a, b, transition).unwrap();
        (map, a, b)
    }

    mod reject_reasons {
        use super::*;

        #[test]
        fn test_missing_edge() {
            let (map, a, _) = two_cell_map(Transition::bidirectional());
            let state = InMemoryState::new();
            assert_eq!(
                can_traverse(&map, a, Direction::South, &state),
                Err(RejectReason::NoEdge)
            );
        }

        #[test]
        fn test_none_type_blocks() {
            let (map, a, _) = two_cell_map(Transition::new(TransitionKind::None));
            let state = InMemoryState::new();
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Err(RejectReason::Blocked)
            );
        }

        #[test]
        fn test_secret_hides() {
            let (map, a, _) = two_cell_map(Transition::secret());
            let state = InMemoryState::new();
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Err(RejectReason::Hidden)
            );
        }

        #[test]
        fn test_locked_blocks_without_unlock() {
            let (map, a, _) = two_cell_map(Transition::locked());
            let state = InMemoryState::new();
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Err(RejectReason::Blocked)
            );
        }

        #[test]
        fn test_missing_destination_node() {
            let mut map = MapGraph::new(
                MapId::new("test").unwrap(),
                "Test",
                GridSize::new(3, 1).unwrap(),
            );
            let a = Position::new(0, 0);
            map.save_node(a, Node::new().with_name("A")).unwrap();
            map.set_transition(a, Position::new(1, 0), Transition::bidirectional())
                .unwrap();

            let state = InMemoryState::new();
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Ok(Position::new(1, 0))
            );
            assert_eq!(
                check_move(&map, a, Direction::East, &state),
                Err(RejectReason::NoDestination)
            );
        }
    }

    mod one_way {
        use super::*;

        #[test]
        fn test_permits_only_the_stored_direction() {
            let (map, a, b) = two_cell_map(Transition::one_way(Direction::East));
            let state = InMemoryState::new();
            assert_eq!(check_move(&map, a, Direction::East, &state), Ok(b));
            assert_eq!(
                check_move(&map, b, Direction::West, &state),
                Err(RejectReason::WrongWay)
            );
        }

        #[test]
        fn test_direction_is_absolute_regardless_of_key_orientation() {
            // same edge, stored from the far endpoint
            let mut map = MapGraph::new(
                MapId::new("test").unwrap(),
                "Test",
                GridSize::new(3, 3).unwrap(),
            );
            let a = Position::new(0, 0);
            let b = Position::new(1, 0);
            map.save_node(a, Node::new().with_name("A")).unwrap();
            map.save_node(b, Node::new().with_name("B")).unwrap();
            map.set_transition(b, a, Transition::one_way(Direction::East))
                .unwrap();

            let state = InMemoryState::new();
            assert_eq!(check_move(&map, a, Direction::East, &state), Ok(b));
            assert_eq!(
                check_move(&map, b, Direction::West, &state),
                Err(RejectReason::WrongWay)
            );
        }
    }

    mod change_if {
        use super::*;

        #[test]
        fn test_first_matching_change_wins() {
            let predicate = StatePredicate::variable("bridge", ComparisonOp::Eq, "down");
            let transition = Transition::bidirectional()
                .with_condition(TransitionCondition::change_if(
                    predicate.clone(),
                    TransitionKind::None,
                ))
                .with_condition(TransitionCondition::change_if(
                    predicate,
                    TransitionKind::Secret,
                ));
            let (map, a, _) = two_cell_map(transition);

            let state = InMemoryState::new().with_variable("bridge", json!("down"));
            // first changeIf applies, second never consulted
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Err(RejectReason::Blocked)
            );
        }

        #[test]
        fn test_secret_opens_when_retyped() {
            let reveal = StatePredicate::variable("lever", ComparisonOp::Eq, "pulled");
            let transition = Transition::secret().with_condition(
                TransitionCondition::change_if(reveal, TransitionKind::Bidirectional),
            );
            let (map, a, b) = two_cell_map(transition);

            let hidden = InMemoryState::new();
            assert_eq!(
                check_move(&map, a, Direction::East, &hidden),
                Err(RejectReason::Hidden)
            );

            let revealed = InMemoryState::new().with_variable("lever", json!("pulled"));
            assert_eq!(check_move(&map, a, Direction::East, &revealed), Ok(b));
        }
    }

    mod lock_refinement {
        use super::*;

        #[test]
        fn test_unlock_opens_a_locked_transition() {
            let transition = Transition::locked().with_condition(
                TransitionCondition::unlock_if(StatePredicate::item(
                    "key",
                    ComparisonOp::Ge,
                    "1",
                )),
            );
            let (map, a, b) = two_cell_map(transition);

            let without_key = InMemoryState::new();
            assert_eq!(
                check_move(&map, a, Direction::East, &without_key),
                Err(RejectReason::Blocked)
            );

            let with_key = InMemoryState::new().with_item("key", 1);
            assert_eq!(check_move(&map, a, Direction::East, &with_key), Ok(b));
        }

        #[test]
        fn test_later_conditions_override_earlier_ones() {
            let alarm = StatePredicate::variable("alarm", ComparisonOp::Eq, "true");
            let transition = Transition::bidirectional()
                .with_condition(TransitionCondition::unlock_if(alarm.clone()))
                .with_condition(TransitionCondition::lock_if(alarm));
            let (map, a, _) = two_cell_map(transition);

            let state = InMemoryState::new().with_variable("alarm", json!(true));
            assert_eq!(
                can_traverse(&map, a, Direction::East, &state),
                Err(RejectReason::Blocked)
            );
        }

        #[test]
        fn test_unlock_reveals_a_secret() {
            let transition = Transition::secret().with_condition(
                TransitionCondition::unlock_if(StatePredicate::variable(
                    "studied",
                    ComparisonOp::Eq,
                    "true",
                )),
            );
            let (map, a, b) = two_cell_map(transition);

            let unaware = InMemoryState::new();
            assert_eq!(
                check_move(&map, a, Direction::East, &unaware),
                Err(RejectReason::Hidden)
            );
            assert_eq!(
                check_move(&map, b, Direction::West, &unaware),
                Err(RejectReason::Hidden)
            );

            let aware = InMemoryState::new().with_variable("studied", json!(true));
            assert_eq!(check_move(&map, a, Direction::East, &aware), Ok(b));
            assert_eq!(check_move(&map, b, Direction::West, &aware), Ok(a));
        }
    }

    mod condition_gate {
        use super::*;

        #[test]
        fn test_every_attached_predicate_must_hold() {
            // A dormant changeIf still gates traversal through its predicate
            let transition = Transition::bidirectional().with_condition(
                TransitionCondition::change_if(
                    StatePredicate::variable("storm", ComparisonOp::Eq, "true"),
                    TransitionKind::None,
                ),
            );
            let (map, a, _) = two_cell_map(transition);

            let calm = InMemoryState::new().with_variable("storm", json!(false));
            assert_eq!(
                can_traverse(&map, a, Direction::East, &calm),
                Err(RejectReason::ConditionUnmet)
            );

            let stormy = InMemoryState::new().with_variable("storm", json!(true));
            assert_eq!(
                can_traverse(&map, a, Direction::East, &stormy),
                Err(RejectReason::Blocked)
            );
        }
    }

    mod node_presentation {
        use super::*;

        #[test]
        fn test_first_matching_condition_overrides_copy_only() {
            let node = Node::new()
                .with_name("Door")
                .with_passage("The door is shut.")
                .with_icon("door-closed")
                .with_condition(
                    NodeCondition::new(
                        StatePredicate::variable("door", ComparisonOp::Eq, "open"),
                        "The door stands open.",
                    )
                    .with_icon("door-open"),
                )
                .with_condition(NodeCondition::new(
                    StatePredicate::variable("door", ComparisonOp::Eq, "open"),
                    "Unreachable: first match already won.",
                ));

            let state = InMemoryState::new().with_variable("door", json!("open"));
            let shown = effective_node(&node, &state);
            assert_eq!(shown.passage, "The door stands open.");
            assert_eq!(shown.icon, "door-open");
            // original untouched
            assert_eq!(node.passage, "The door is shut.");
        }

        #[test]
        fn test_evaluation_stops_at_the_first_match() {
            use crate::state::MockGameStateView;

            let node = Node::new()
                .with_passage("Base.")
                .with_condition(NodeCondition::new(
                    StatePredicate::variable("c1", ComparisonOp::Eq, "true"),
                    "Skipped: predicate false.",
                ))
                .with_condition(NodeCondition::new(
                    StatePredicate::variable("c2", ComparisonOp::Eq, "true"),
                    "Second condition wins.",
                ))
                .with_condition(NodeCondition::new(
                    StatePredicate::variable("c3", ComparisonOp::Eq, "true"),
                    "Never consulted.",
                ));

            let mut state = MockGameStateView::new();
            state
                .expect_variable()
                .withf(|path| path == "c1")
                .times(1)
                .returning(|_| Some(json!(false)));
            state
                .expect_variable()
                .withf(|path| path == "c2")
                .times(1)
                .returning(|_| Some(json!(true)));
            // no expectation for "c3": looking it up would fail the test

            assert_eq!(
                effective_node(&node, &state).passage,
                "Second condition wins."
            );
        }

        #[test]
        fn test_no_match_keeps_authored_copy() {
            let node = Node::new().with_passage("Quiet.").with_condition(
                NodeCondition::new(
                    StatePredicate::variable("noise", ComparisonOp::Eq, "loud"),
                    "Deafening.",
                ),
            );
            let shown = effective_node(&node, &InMemoryState::new());
            assert_eq!(shown.passage, "Quiet.");
        }

        #[test]
        fn test_icon_only_changes_when_condition_sets_one() {
            let node = Node::new().with_icon("well").with_condition(NodeCondition::new(
                StatePredicate::variable("dry", ComparisonOp::Eq, "true"),
                "The well is dry.",
            ));
            let state = InMemoryState::new().with_variable("dry", json!(true));
            assert_eq!(effective_node(&node, &state).icon, "well");
        }
    }

    mod views {
        use super::*;

        #[test]
        fn test_outgoing_views_cover_all_directions() {
            let (map, a, b) = two_cell_map(Transition::bidirectional());
            let state = InMemoryState::new();
            let views = outgoing_views(&map, a, &state);

            assert_eq!(views.len(), 4);
            let east = views
                .iter()
                .find(|v| v.direction == Direction::East)
                .unwrap();
            assert_eq!(east.target, b);
            assert!(east.traversable());
            assert_eq!(east.kind, Some(TransitionKind::Bidirectional));

            let north = views
                .iter()
                .find(|v| v.direction == Direction::North)
                .unwrap();
            assert!(!north.traversable());
            assert_eq!(north.reject, Some(RejectReason::NoEdge));
            assert_eq!(north.kind, None);
        }

        #[test]
        fn test_hidden_edges_are_not_visibly_connected() {
            let (map, a, _) = two_cell_map(Transition::secret());
            let views = outgoing_views(&map, a, &InMemoryState::new());
            let east = views
                .iter()
                .find(|v| v.direction == Direction::East)
                .unwrap();
            assert_eq!(east.kind, Some(TransitionKind::Secret));
            assert!(!east.visibly_connected());
        }
    }
}
