//! Synthetic maps for unit tests

use std::collections::BTreeMap;

use super::types::{Conditions, Link, Node, NodeId, Problem};

fn node(x: f64, y: f64) -> Node {
    Node {
        x,
        y,
        reward_rank: None,
        reward_value: 0.0,
    }
}

/// Nodes `0..n` along the x axis, linked in a chain, starting at node 0
pub(crate) fn line_problem(n: u32) -> Problem {
    let nodes: BTreeMap<NodeId, Node> = (0..n)
        .map(|i| (NodeId::from(i), node(i as f64, 0.0)))
        .collect();
    let links = (1..n)
        .map(|i| Link {
            src: NodeId::from(i - 1),
            tgt: NodeId::from(i),
        })
        .collect();
    Problem {
        map_name: format!("line{}", n),
        nodes,
        links,
        middle_node: NodeId::from(0),
        conditions: Conditions::default(),
    }
}

/// `n`x`n` grid with id `y * n + x`, starting at the center node
pub(crate) fn grid_problem(n: u32) -> Problem {
    let mut nodes = BTreeMap::new();
    let mut links = Vec::new();
    for y in 0..n {
        for x in 0..n {
            let id = y * n + x;
            nodes.insert(NodeId::from(id), node(x as f64, y as f64));
            if x + 1 < n {
                links.push(Link {
                    src: NodeId::from(id),
                    tgt: NodeId::from(id + 1),
                });
            }
            if y + 1 < n {
                links.push(Link {
                    src: NodeId::from(id),
                    tgt: NodeId::from(id + n),
                });
            }
        }
    }
    Problem {
        map_name: format!("grid{}", n),
        nodes,
        links,
        middle_node: NodeId::from(n * n / 2),
        conditions: Conditions {
            oracle: Some("A".to_string()),
            other: BTreeMap::new(),
        },
    }
}
