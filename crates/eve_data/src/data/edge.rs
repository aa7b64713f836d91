use super::node::NodeId;
use super::value::Value;
use serde::{Deserialize, Serialize};

/// Relation a conditional edge checks between the carried value and its
/// comparator.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Condition {
    EqualTo,
    NotEqualTo,
    LessThan,
    LessOrEqual,
    GreaterThan,
    GreaterOrEqual,
    Unconditional,
}

impl Condition {
    pub const ALL: [Condition; 7] = [
        Condition::EqualTo,
        Condition::NotEqualTo,
        Condition::LessThan,
        Condition::LessOrEqual,
        Condition::GreaterThan,
        Condition::GreaterOrEqual,
        Condition::Unconditional,
    ];

    /// Evaluates `param <condition> comparator`.
    pub fn holds(self, param: &Value, comparator: &Value) -> bool {
        match self {
            Condition::EqualTo => param == comparator,
            Condition::NotEqualTo => param != comparator,
            Condition::LessThan => param < comparator,
            Condition::LessOrEqual => param <= comparator,
            Condition::GreaterThan => param > comparator,
            Condition::GreaterOrEqual => param >= comparator,
            Condition::Unconditional => true,
        }
    }
}

/// Guarded transition owned by its source node. The destination is an arena
/// index; several edges may share one destination and cycles are allowed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ConditionalEdge {
    pub condition: Condition,
    pub comparator: Value,
    pub destination: Option<NodeId>,
    /// A dead edge never activates again.
    pub alive: bool,
}

impl ConditionalEdge {
    pub fn new(condition: Condition, comparator: Value, destination: NodeId) -> Self {
        Self {
            condition,
            comparator,
            destination: Some(destination),
            alive: true,
        }
    }

    pub fn unconditional(destination: NodeId) -> Self {
        Self::new(Condition::Unconditional, Value::default(), destination)
    }

    pub fn can_activate(&self, param: &Value) -> bool {
        self.alive && self.condition.holds(param, &self.comparator)
    }

    /// Whether the edge points anywhere. Whether that index resolves inside a
    /// particular arena is checked at traversal time.
    pub fn has_destination(&self) -> bool {
        self.destination.is_some()
    }
}
