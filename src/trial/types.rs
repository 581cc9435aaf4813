//! Typed schema for the experiment's JSON documents
//!
//! Three documents describe a trial: the match metadata, the map ("problem")
//! the trial was played on, and the player's own trial record. Optional fields
//! are defaulted here so downstream code never probes raw JSON.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

// =============================================================================
// NODE IDS
// =============================================================================

/// Map node identifier.
///
/// Maps key nodes by string, while event logs sometimes write the same id as a
/// number; both forms normalize to the string key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<u32> for NodeId {
    fn from(id: u32) -> Self {
        Self(id.to_string())
    }
}

impl Serialize for NodeId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for NodeId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct NodeIdVisitor;

        impl Visitor<'_> for NodeIdVisitor {
            type Value = NodeId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a node id string or integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<NodeId, E> {
                Ok(NodeId::new(v))
            }

            fn visit_string<E: de::Error>(self, v: String) -> Result<NodeId, E> {
                Ok(NodeId(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<NodeId, E> {
                Ok(NodeId(v.to_string()))
            }
        }

        deserializer.deserialize_any(NodeIdVisitor)
    }
}

// =============================================================================
// PROBLEM (MAP)
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
    /// Display order of the reward; absent or `null` in many maps
    #[serde(default)]
    pub reward_rank: Option<f64>,
    #[serde(default)]
    pub reward_value: f64,
}

impl Node {
    pub fn loc(&self) -> (f64, f64) {
        (self.x, self.y)
    }

    pub fn has_reward(&self) -> bool {
        self.reward_value > 0.0
    }
}

/// Experimental conditions attached to a map
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conditions {
    /// Oracle accuracy class ("A" accurate, "I" inaccurate)
    #[serde(default)]
    pub oracle: Option<String>,
    /// Any other condition entries, kept verbatim
    #[serde(flatten)]
    pub other: BTreeMap<String, Value>,
}

/// Map document as stored on disk
#[derive(Debug, Clone, Deserialize)]
pub struct ProblemDoc {
    pub nodes: BTreeMap<NodeId, Node>,
    /// Keys are `"<src>_<tgt>"`; values are unused
    pub links: BTreeMap<String, Value>,
    pub middle_node: NodeId,
    #[serde(default)]
    pub conditions: Conditions,
}

/// Undirected edge between two nodes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub src: NodeId,
    pub tgt: NodeId,
}

impl Link {
    /// Parse a composite `"<src>_<tgt>"` link key
    pub fn parse_key(key: &str) -> Option<Self> {
        let (src, tgt) = key.split_once('_')?;
        if src.is_empty() || tgt.is_empty() || tgt.contains('_') {
            return None;
        }
        Some(Self {
            src: NodeId::new(src),
            tgt: NodeId::new(tgt),
        })
    }
}

/// Validated map: every link endpoint and the middle node exist in `nodes`
#[derive(Debug, Clone, PartialEq)]
pub struct Problem {
    pub map_name: String,
    pub nodes: BTreeMap<NodeId, Node>,
    pub links: Vec<Link>,
    pub middle_node: NodeId,
    pub conditions: Conditions,
}

impl Problem {
    /// Validate a raw map document
    pub fn from_doc(map_name: &str, doc: ProblemDoc) -> Result<Self, String> {
        if !doc.nodes.contains_key(&doc.middle_node) {
            return Err(format!("middle node {} is not a node", doc.middle_node));
        }

        let mut links = Vec::with_capacity(doc.links.len());
        for key in doc.links.keys() {
            let link =
                Link::parse_key(key).ok_or_else(|| format!("malformed link key {:?}", key))?;
            for end in [&link.src, &link.tgt] {
                if !doc.nodes.contains_key(end) {
                    return Err(format!("link {} references unknown node {}", key, end));
                }
            }
            links.push(link);
        }

        Ok(Self {
            map_name: map_name.to_string(),
            nodes: doc.nodes,
            links,
            middle_node: doc.middle_node,
            conditions: doc.conditions,
        })
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn node_loc(&self, id: &NodeId) -> Option<(f64, f64)> {
        self.nodes.get(id).map(Node::loc)
    }

    pub fn start_node(&self) -> &NodeId {
        &self.middle_node
    }

    pub fn oracle_acc(&self) -> Option<&str> {
        self.conditions.oracle.as_deref()
    }

    /// Sum of all positive reward values on the map
    pub fn max_reward(&self) -> f64 {
        self.nodes
            .values()
            .filter(|n| n.has_reward())
            .map(|n| n.reward_value)
            .sum()
    }

    /// Axis-aligned bounds of node coordinates: (min_x, min_y, max_x, max_y)
    pub fn bounds(&self) -> Option<(f64, f64, f64, f64)> {
        self.nodes.values().fold(None, |acc, n| {
            Some(match acc {
                None => (n.x, n.y, n.x, n.y),
                Some((x0, y0, x1, y1)) => (x0.min(n.x), y0.min(n.y), x1.max(n.x), y1.max(n.y)),
            })
        })
    }
}

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    Start,
    Move,
    Collect,
    OracleRequest,
}

impl EventType {
    pub fn label(&self) -> &'static str {
        match self {
            EventType::Start => "start",
            EventType::Move => "move",
            EventType::Collect => "collect",
            EventType::OracleRequest => "oracle_request",
        }
    }
}

/// One entry of a player's event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub event_type: EventType,
    /// Seconds since trial start
    pub time: f64,
    #[serde(default)]
    pub node_id: Option<NodeId>,
}

impl Event {
    pub fn new(event_type: EventType, time: f64, node_id: Option<NodeId>) -> Self {
        Self {
            event_type,
            time,
            node_id,
        }
    }
}

// =============================================================================
// PLAYER TRIAL DOCUMENT
// =============================================================================

/// `trial<N>.json`
#[derive(Debug, Clone, Deserialize)]
pub struct PlayerDoc {
    pub trial_data: TrialData,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrialData {
    /// Ordered event log; `null` in some records
    #[serde(rename = "TrialEventData", default)]
    pub events: Option<Vec<Event>>,
    #[serde(rename = "oracleRequested", default)]
    pub oracle_requested: bool,
    #[serde(default)]
    pub gems_collected: Vec<Value>,
    #[serde(default)]
    pub score: f64,
}

impl TrialData {
    pub fn events(&self) -> &[Event] {
        self.events.as_deref().unwrap_or(&[])
    }

    pub fn n_gems(&self) -> usize {
        self.gems_collected.len()
    }
}

// =============================================================================
// MATCH METADATA
// =============================================================================

/// `metadata.json` for one match
#[derive(Debug, Clone, Deserialize)]
pub struct MatchMetadata {
    #[serde(default)]
    pub trials: BTreeMap<String, TrialMeta>,
    #[serde(rename = "matchData")]
    pub match_data: MatchData,
}

impl MatchMetadata {
    pub fn trial(&self, trial_idx: usize) -> Option<&TrialMeta> {
        self.trials.get(&trial_idx.to_string())
    }

    pub fn map_name(&self, trial_idx: usize) -> Option<&str> {
        self.match_data.map_order.get(trial_idx).map(String::as_str)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MatchData {
    pub map_order: Vec<String>,
}

/// Per-trial entry in the match metadata
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TrialMeta {
    /// Host start timestamp, milliseconds
    #[serde(default)]
    pub ts_started: Option<f64>,
    /// Host finish timestamp, milliseconds
    #[serde(default)]
    pub ts_finished: Option<f64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn node_ids_accept_strings_and_integers() {
        let ids: Vec<NodeId> = serde_json::from_value(json!(["12", 12, "a"])).unwrap();
        assert_eq!(ids[0], ids[1]);
        assert_eq!(ids[2].as_str(), "a");
    }

    #[test]
    fn event_types_use_snake_case() {
        let event: Event = serde_json::from_value(json!({
            "eventType": "oracle_request",
            "time": 3.5
        }))
        .unwrap();
        assert_eq!(event.event_type, EventType::OracleRequest);
        assert_eq!(event.node_id, None);

        let bad = serde_json::from_value::<Event>(json!({"eventType": "teleport", "time": 1}));
        assert!(bad.is_err());
    }

    #[test]
    fn node_rewards_default_to_zero() {
        let node: Node = serde_json::from_value(json!({"X": 1, "Y": 2})).unwrap();
        assert_eq!(node.reward_rank, None);
        assert_eq!(node.reward_value, 0.0);
        assert!(!node.has_reward());
    }

    #[test]
    fn reward_rank_tolerates_null_and_floats() {
        let nodes: Vec<Node> = serde_json::from_value(json!([
            {"X": 0, "Y": 0, "reward_rank": null},
            {"X": 1, "Y": 0, "reward_rank": 1.0, "reward_value": 5},
            {"X": 2, "Y": 0, "reward_rank": 2}
        ]))
        .unwrap();
        assert_eq!(nodes[0].reward_rank, None);
        assert_eq!(nodes[1].reward_rank, Some(1.0));
        assert_eq!(nodes[2].reward_rank, Some(2.0));
        assert!(nodes[1].has_reward());
    }

    #[test]
    fn link_keys_split_into_endpoints() {
        let link = Link::parse_key("3_14").unwrap();
        assert_eq!(link.src, NodeId::from("3"));
        assert_eq!(link.tgt, NodeId::from("14"));
        assert!(Link::parse_key("314").is_none());
        assert!(Link::parse_key("_1").is_none());
        assert!(Link::parse_key("1_2_3").is_none());
    }

    fn doc(links: Value, middle: Value) -> ProblemDoc {
        serde_json::from_value(json!({
            "nodes": {
                "0": {"X": 0, "Y": 0},
                "1": {"X": 1, "Y": 0, "reward_rank": 1, "reward_value": 10}
            },
            "links": links,
            "middle_node": middle,
            "conditions": {"oracle": "A", "best_strat": "OF"}
        }))
        .unwrap()
    }

    #[test]
    fn problem_validation_accepts_consistent_map() {
        let problem = Problem::from_doc("m1", doc(json!({"0_1": 1}), json!(0))).unwrap();
        assert_eq!(problem.links.len(), 1);
        assert_eq!(problem.middle_node, NodeId::from("0"));
        assert_eq!(problem.oracle_acc(), Some("A"));
        assert_eq!(problem.conditions.other.get("best_strat"), Some(&json!("OF")));
        assert_eq!(problem.max_reward(), 10.0);
        assert_eq!(problem.bounds(), Some((0.0, 0.0, 1.0, 0.0)));
    }

    #[test]
    fn problem_validation_rejects_dangling_references() {
        assert!(Problem::from_doc("m1", doc(json!({"0_7": 1}), json!(0))).is_err());
        assert!(Problem::from_doc("m1", doc(json!({"0_1": 1}), json!(9))).is_err());
    }

    #[test]
    fn null_event_log_reads_as_empty() {
        let doc: PlayerDoc = serde_json::from_value(json!({
            "trial_data": {"TrialEventData": null, "score": 4}
        }))
        .unwrap();
        assert!(doc.trial_data.events().is_empty());
        assert!(!doc.trial_data.oracle_requested);
        assert_eq!(doc.trial_data.score, 4.0);
    }

    #[test]
    fn metadata_indexes_trials_by_string_key() {
        let meta: MatchMetadata = serde_json::from_value(json!({
            "trials": {"0": {"ts_started": 1000, "ts_finished": 5000, "player": "p1"}},
            "matchData": {"map_order": ["alpha", "beta"]}
        }))
        .unwrap();
        assert_eq!(meta.trial(0).and_then(|t| t.ts_started), Some(1000.0));
        assert_eq!(meta.trial(0).and_then(|t| t.extra.get("player")), Some(&json!("p1")));
        assert!(meta.trial(1).is_none());
        assert_eq!(meta.map_name(1), Some("beta"));
        assert_eq!(meta.map_name(2), None);
    }
}
