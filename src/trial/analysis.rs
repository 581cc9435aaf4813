//! Summary facts derived from a reconstructed state timeline

use log::debug;
use std::fmt;

use super::state::State;
use super::types::{EventType, NodeId, Problem};
use crate::constants::NO_ORACLE_REQUEST;
use crate::helpers::dist;

/// Cardinal direction of a single grid step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Right,
    Left,
    Up,
    Down,
}

impl Direction {
    /// Direction of a unit step, or `None` unless the delta is exactly one
    /// unit along exactly one axis (diagonals and zero deltas are rejected).
    pub fn from_delta(dx: f64, dy: f64) -> Option<Self> {
        if dy == 0.0 && dx == 1.0 {
            Some(Direction::Right)
        } else if dy == 0.0 && dx == -1.0 {
            Some(Direction::Left)
        } else if dx == 0.0 && dy == 1.0 {
            Some(Direction::Up)
        } else if dx == 0.0 && dy == -1.0 {
            Some(Direction::Down)
        } else {
            None
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Direction::Right => "right",
            Direction::Left => "left",
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Direction of travel between two adjacent nodes.
///
/// # Panics
///
/// If either node is missing from the map, or the nodes are not grid-adjacent.
pub fn move_dir(problem: &Problem, from: &NodeId, to: &NodeId) -> Direction {
    let (Some(a), Some(b)) = (problem.node_loc(from), problem.node_loc(to)) else {
        panic!("move_dir: unknown node in {} -> {}", from, to);
    };
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    match Direction::from_delta(dx, dy) {
        Some(dir) => dir,
        None => panic!(
            "move_dir: {} -> {} is not a unit step (delta {}, {})",
            from, to, dx, dy
        ),
    }
}

/// Time of the last state.
///
/// The host's own finish timestamp drifts from the client clock, so the last
/// logged event is the authoritative end of the trial.
pub fn duration(states: &[State]) -> f64 {
    states.last().map_or(0.0, |s| s.time)
}

/// Gems collected at the moment of the first oracle request, or -1 if the
/// oracle was never called.
pub fn oracle_request_index(states: &[State]) -> i32 {
    let mut n_gems = 0;
    for state in states {
        match state.event_type {
            EventType::Collect => n_gems += 1,
            EventType::OracleRequest => return n_gems,
            EventType::Start | EventType::Move => {}
        }
    }
    NO_ORACLE_REQUEST
}

/// Delay before each state (the first is measured from 0)
pub fn time_deltas(states: &[State]) -> Vec<f64> {
    let mut last = 0.0;
    states
        .iter()
        .map(|s| {
            let delta = s.time - last;
            last = s.time;
            delta
        })
        .collect()
}

pub fn collect_indices(states: &[State]) -> Vec<usize> {
    states
        .iter()
        .enumerate()
        .filter(|(_, s)| s.event_type == EventType::Collect)
        .map(|(i, _)| i)
        .collect()
}

/// Distance walked along the reconstructed locations
pub fn path_length(states: &[State]) -> f64 {
    states.windows(2).map(|w| dist(w[0].loc, w[1].loc)).sum()
}

/// Direction of every move that is a unit step; other moves are skipped
pub fn move_dirs(states: &[State]) -> Vec<Direction> {
    states
        .windows(2)
        .filter(|w| w[1].event_type == EventType::Move)
        .filter_map(|w| {
            let (dx, dy) = (w[1].loc.0 - w[0].loc.0, w[1].loc.1 - w[0].loc.1);
            let dir = Direction::from_delta(dx, dy);
            if dir.is_none() {
                debug!(
                    "Skipping non-adjacent move {} -> {} at t={}",
                    w[0].node_id, w[1].node_id, w[1].time
                );
            }
            dir
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trial::state::reconstruct;
    use crate::trial::test_support::{grid_problem, line_problem};
    use crate::trial::types::Event;

    fn ev(event_type: EventType, time: f64, node: Option<&str>) -> Event {
        Event::new(event_type, time, node.map(NodeId::from))
    }

    #[test]
    fn move_dir_covers_all_four_directions() {
        let problem = grid_problem(3);
        let center = NodeId::from("4");
        assert_eq!(move_dir(&problem, &center, &NodeId::from("5")), Direction::Right);
        assert_eq!(move_dir(&problem, &center, &NodeId::from("3")), Direction::Left);
        assert_eq!(move_dir(&problem, &center, &NodeId::from("7")), Direction::Up);
        assert_eq!(move_dir(&problem, &center, &NodeId::from("1")), Direction::Down);
    }

    #[test]
    #[should_panic(expected = "not a unit step")]
    fn move_dir_rejects_offsetting_diagonal() {
        // (1, -1) sums to zero but is not adjacent
        let problem = grid_problem(3);
        move_dir(&problem, &NodeId::from("4"), &NodeId::from("2"));
    }

    #[test]
    #[should_panic(expected = "not a unit step")]
    fn move_dir_rejects_zero_delta() {
        let problem = grid_problem(3);
        move_dir(&problem, &NodeId::from("4"), &NodeId::from("4"));
    }

    #[test]
    #[should_panic(expected = "not a unit step")]
    fn move_dir_rejects_two_step_jump() {
        let problem = line_problem(3);
        move_dir(&problem, &NodeId::from("0"), &NodeId::from("2"));
    }

    #[test]
    fn from_delta_requires_single_axis_unit() {
        assert_eq!(Direction::from_delta(1.0, -1.0), None);
        assert_eq!(Direction::from_delta(-1.0, 1.0), None);
        assert_eq!(Direction::from_delta(0.0, 0.0), None);
        assert_eq!(Direction::from_delta(0.0, -1.0), Some(Direction::Down));
    }

    #[test]
    fn duration_uses_last_event_time() {
        let problem = line_problem(2);
        let states = reconstruct(
            &problem,
            &[
                ev(EventType::Move, 10.0, Some("1")),
                ev(EventType::Collect, 42.0, None),
            ],
        )
        .unwrap();
        assert_eq!(duration(&states), 42.0);
        assert_eq!(duration(&[]), 0.0);
    }

    #[test]
    fn oracle_index_counts_gems_before_first_request() {
        let problem = line_problem(3);
        let states = reconstruct(
            &problem,
            &[
                ev(EventType::Move, 1.0, Some("1")),
                ev(EventType::Collect, 1.5, None),
                ev(EventType::Move, 2.0, Some("2")),
                ev(EventType::Collect, 2.5, None),
                ev(EventType::OracleRequest, 3.0, None),
                ev(EventType::Collect, 4.0, None),
                ev(EventType::OracleRequest, 5.0, None),
            ],
        )
        .unwrap();
        assert_eq!(oracle_request_index(&states), 2);
    }

    #[test]
    fn oracle_index_is_sentinel_without_request() {
        let problem = line_problem(2);
        let states = reconstruct(
            &problem,
            &[
                ev(EventType::Move, 1.0, Some("1")),
                ev(EventType::Collect, 2.0, None),
            ],
        )
        .unwrap();
        assert_eq!(oracle_request_index(&states), -1);

        let immediate =
            reconstruct(&problem, &[ev(EventType::OracleRequest, 0.5, None)]).unwrap();
        assert_eq!(oracle_request_index(&immediate), 0);
    }

    #[test]
    fn deltas_and_collects_line_up_with_states() {
        let problem = line_problem(3);
        let states = reconstruct(
            &problem,
            &[
                ev(EventType::Move, 2.0, Some("1")),
                ev(EventType::Collect, 2.5, None),
                ev(EventType::Move, 4.0, Some("2")),
            ],
        )
        .unwrap();
        assert_eq!(time_deltas(&states), vec![0.0, 2.0, 0.5, 1.5]);
        assert_eq!(collect_indices(&states), vec![2]);
        assert_eq!(path_length(&states), 2.0);
        assert_eq!(move_dirs(&states), vec![Direction::Right, Direction::Right]);
    }
}
