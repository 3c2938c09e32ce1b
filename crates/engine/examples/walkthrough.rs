//! Author a tiny map, start a session, and walk it.
//!
//! Run with: `cargo run -p gridloom-engine --example walkthrough`
//! Set `RUST_LOG=gridloom_engine=debug` to watch move resolution.

use anyhow::Result;
use serde_json::json;
use tracing_subscriber::EnvFilter;

use gridloom_engine::domain::{
    ComparisonOp, Direction, GridSize, MapGraph, MapId, Node, Position, StatePredicate,
    Transition, TransitionCondition,
};
use gridloom_engine::{InMemoryState, MoveOutcome, RuntimeSession};

fn build_map() -> Result<MapGraph> {
    let mut map = MapGraph::new(
        MapId::new("demo")?,
        "Demo Dungeon",
        GridSize::new(3, 1)?,
    );

    let gate = Position::new(0, 0);
    let hall = Position::new(1, 0);
    let crypt = Position::new(2, 0);

    map.save_node(
        gate,
        Node::new()
            .with_name("Gate")
            .with_passage("Rusted bars, slightly ajar.")
            .with_tag("entry-main"),
    )?;
    map.save_node(
        hall,
        Node::new().with_name("Hall").with_passage("Your steps echo."),
    )?;
    map.save_node(
        crypt,
        Node::new().with_name("Crypt").with_passage("Dust and patience."),
    )?;

    map.set_transition(gate, hall, Transition::bidirectional())?;
    map.set_transition(
        hall,
        crypt,
        Transition::locked().with_condition(TransitionCondition::unlock_if(
            StatePredicate::item("crypt-key", ComparisonOp::Ge, "1"),
        )),
    )?;

    Ok(map)
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let mut session = RuntimeSession::start_at_entry(build_map()?, "entry-main")?;
    let mut state = InMemoryState::new().with_variables(json!({}));

    for (label, direction) in [
        ("walk into the hall", Direction::East),
        ("try the crypt door", Direction::East),
    ] {
        report(label, session.move_to(direction, &state));
    }

    println!("... picking up the crypt key ...");
    state.set_item_count("crypt-key", 1);

    report("try the crypt door again", session.move_to(Direction::East, &state));
    println!("final position: {}", session.position());

    Ok(())
}

fn report(label: &str, outcome: MoveOutcome) {
    match outcome {
        MoveOutcome::Moved { node, .. } => {
            println!("{label}: arrived at {} - {}", node.name, node.passage);
        }
        MoveOutcome::Rejected { reason } => {
            println!("{label}: {reason}");
        }
    }
}
