use super::value::Value;
use serde::{Deserialize, Serialize};

/// Operation performed by a node's function.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Add,
    Subtract,
    Multiply,
    Divide,
    /// Requests the evaluating node's own reference.
    Identity,
    /// Rebinds another node's function. The only operation with an effect
    /// outside its return value.
    Inject,
    /// Any operation tag this build does not recognise. Evaluates to the
    /// operand unchanged.
    #[serde(other)]
    Unknown,
}

impl Operation {
    pub const ARITHMETIC: [Operation; 4] = [
        Operation::Add,
        Operation::Subtract,
        Operation::Multiply,
        Operation::Divide,
    ];

    pub fn is_arithmetic(self) -> bool {
        Self::ARITHMETIC.contains(&self)
    }
}

/// An operation bound to a fixed operand. Immutable once constructed.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Computation {
    pub operation: Operation,
    pub operand: Value,
}

impl Computation {
    pub fn new(operation: Operation, operand: Value) -> Self {
        Self { operation, operand }
    }

    /// `Identity` ignores its operand.
    pub fn identity() -> Self {
        Self::new(Operation::Identity, Value::default())
    }

    /// An injection that installs `function` on whichever node it is handed.
    pub fn inject(function: Computation) -> Self {
        Self::new(Operation::Inject, function.into())
    }
}

impl Default for Computation {
    fn default() -> Self {
        Self::new(Operation::Add, Value::default())
    }
}
