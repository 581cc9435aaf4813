//! Player state reconstruction
//!
//! The event log only records what changed. Folding it over the map yields a
//! full timeline: where the player stood after every event.

use super::types::{Event, EventType, NodeId, Problem};
use crate::error::TrialError;

/// Player state after one event
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    pub loc: (f64, f64),
    pub node_id: NodeId,
    /// Seconds since trial start
    pub time: f64,
    pub event_type: EventType,
}

/// Reconstruct the state timeline from a raw event log.
///
/// The first state is a synthetic `Start` at the map's middle node, time 0.
/// Each event then produces one state: events carrying a node id move the
/// player there, all others keep the previous location.
pub fn reconstruct(problem: &Problem, events: &[Event]) -> Result<Vec<State>, TrialError> {
    let start = problem.start_node().clone();
    let start_loc = problem
        .node_loc(&start)
        .ok_or_else(|| TrialError::UnknownNode(start.clone()))?;

    let mut states = Vec::with_capacity(events.len() + 1);
    let mut current = State {
        loc: start_loc,
        node_id: start,
        time: 0.0,
        event_type: EventType::Start,
    };
    states.push(current.clone());

    for event in events {
        current.time = event.time;
        current.event_type = event.event_type;
        if let Some(node_id) = &event.node_id {
            current.loc = problem
                .node_loc(node_id)
                .ok_or_else(|| TrialError::UnknownNode(node_id.clone()))?;
            current.node_id = node_id.clone();
        }
        states.push(current.clone());
    }

    Ok(states)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::test_support::line_problem;

    #[test]
    fn single_move_from_start() {
        let problem = line_problem(2);
        let events = vec![Event::new(EventType::Move, 7.5, Some(NodeId::from("1")))];

        let states = reconstruct(&problem, &events).unwrap();

        assert_eq!(
            states,
            vec![
                State {
                    loc: (0.0, 0.0),
                    node_id: NodeId::from("0"),
                    time: 0.0,
                    event_type: EventType::Start,
                },
                State {
                    loc: (1.0, 0.0),
                    node_id: NodeId::from("1"),
                    time: 7.5,
                    event_type: EventType::Move,
                },
            ]
        );
    }

    #[test]
    fn events_without_node_carry_location_forward() {
        let problem = line_problem(3);
        let events = vec![
            Event::new(EventType::Move, 1.0, Some(NodeId::from("1"))),
            Event::new(EventType::OracleRequest, 2.0, None),
            Event::new(EventType::Collect, 2.5, None),
            Event::new(EventType::Move, 3.0, Some(NodeId::from("2"))),
        ];

        let states = reconstruct(&problem, &events).unwrap();

        assert_eq!(states.len(), events.len() + 1);
        for pair in states.windows(2) {
            assert!(pair[1].time >= pair[0].time);
            if !matches!(pair[1].event_type, EventType::Move | EventType::Start) {
                assert_eq!(pair[1].loc, pair[0].loc);
                assert_eq!(pair[1].node_id, pair[0].node_id);
            }
        }
        assert_eq!(states[3].event_type, EventType::Collect);
        assert_eq!(states[3].loc, (1.0, 0.0));
        assert_eq!(states[4].loc, (2.0, 0.0));
    }

    #[test]
    fn empty_log_yields_only_start() {
        let problem = line_problem(2);
        let states = reconstruct(&problem, &[]).unwrap();
        assert_eq!(states.len(), 1);
        assert_eq!(states[0].event_type, EventType::Start);
        assert_eq!(states[0].time, 0.0);
    }

    #[test]
    fn unknown_node_is_a_lookup_failure() {
        let problem = line_problem(2);
        let events = vec![Event::new(EventType::Move, 1.0, Some(NodeId::from("99")))];
        assert_eq!(
            reconstruct(&problem, &events),
            Err(TrialError::UnknownNode(NodeId::from("99")))
        );
    }
}
