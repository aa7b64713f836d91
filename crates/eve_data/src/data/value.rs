use super::computation::Computation;
use super::net::NodeRef;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::ops::{Add, Div, Mul, Sub};

/// Terminal signal carried as a value instead of a Rust error.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sentinel {
    /// An `Inject` could not resolve its operand or destination.
    ComputationHalted,
    /// Produced by `Identity`; replaced by the evaluating node's reference.
    IdentityUnknown,
}

/// Payload that is not arithmetic: an embedded computation, a node reference
/// or a sentinel.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Abstract {
    /// A computation travelling through the graph, consumed by `Inject`.
    Computation(Box<Computation>),
    /// A reference to a node in some particle's activation net.
    Node(NodeRef),
    /// An error or identity request.
    Sentinel(Sentinel),
}

/// Tagged value used as computation input, output and inter-particle message.
///
/// Equality is field-wise within one payload kind. Values of different kinds
/// are never equal. Two abstract payloads compare by identity: the same node
/// reference, the same sentinel tag or structurally equal computations.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Integer(i64),
    Bytes(Vec<u8>),
    Abstract(Abstract),
}

impl Default for Value {
    fn default() -> Self {
        Value::Integer(0)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Value::Bytes(value)
    }
}

impl From<Computation> for Value {
    fn from(value: Computation) -> Self {
        Value::Abstract(Abstract::Computation(Box::new(value)))
    }
}

impl From<NodeRef> for Value {
    fn from(value: NodeRef) -> Self {
        Value::Abstract(Abstract::Node(value))
    }
}

impl From<Sentinel> for Value {
    fn from(value: Sentinel) -> Self {
        Value::Abstract(Abstract::Sentinel(value))
    }
}

impl Value {
    #[must_use]
    pub fn halted() -> Self {
        Sentinel::ComputationHalted.into()
    }

    #[must_use]
    pub fn identity_unknown() -> Self {
        Sentinel::IdentityUnknown.into()
    }

    /// True for any sentinel payload, including identity requests.
    pub fn is_error(&self) -> bool {
        matches!(self, Value::Abstract(Abstract::Sentinel(_)))
    }

    pub fn is_identity(&self) -> bool {
        matches!(
            self,
            Value::Abstract(Abstract::Sentinel(Sentinel::IdentityUnknown))
        )
    }

    pub fn is_halted(&self) -> bool {
        matches!(
            self,
            Value::Abstract(Abstract::Sentinel(Sentinel::ComputationHalted))
        )
    }

    /// Integer zero, or a byte vector whose bytes are all zero (including the
    /// empty vector). Abstract payloads are never zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Integer(i) => *i == 0,
            Value::Bytes(b) => b.iter().all(|&x| x == 0),
            Value::Abstract(_) => false,
        }
    }

    pub fn is_abstract(&self) -> bool {
        matches!(self, Value::Abstract(_))
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_node(&self) -> Option<&NodeRef> {
        match self {
            Value::Abstract(Abstract::Node(node)) => Some(node),
            _ => None,
        }
    }

    pub fn as_computation(&self) -> Option<&Computation> {
        match self {
            Value::Abstract(Abstract::Computation(computation)) => Some(computation),
            _ => None,
        }
    }

    pub fn less_than(&self, other: &Value) -> bool {
        self < other
    }

    pub fn greater_than(&self, other: &Value) -> bool {
        self > other
    }

    /// Zero of the same payload kind. Abstract payloads have no zero and are
    /// returned unchanged.
    #[must_use]
    pub fn zeroed(&self) -> Value {
        match self {
            Value::Integer(_) => Value::Integer(0),
            Value::Bytes(b) => Value::Bytes(vec![0; b.len()]),
            Value::Abstract(_) => self.clone(),
        }
    }

    /// Combines two values of the same arithmetic kind. Byte vectors combine
    /// positionally over the left operand's length; missing right-hand bytes
    /// leave the left byte as is. Mismatched kinds and abstract payloads
    /// return the left operand untouched.
    fn combine(
        &self,
        rhs: &Value,
        int_op: impl Fn(i64, i64) -> i64,
        byte_op: impl Fn(u8, u8) -> u8,
    ) -> Value {
        match (self, rhs) {
            (Value::Integer(a), Value::Integer(b)) => Value::Integer(int_op(*a, *b)),
            (Value::Bytes(a), Value::Bytes(b)) => Value::Bytes(
                a.iter()
                    .enumerate()
                    .map(|(i, &x)| b.get(i).map_or(x, |&y| byte_op(x, y)))
                    .collect(),
            ),
            _ => self.clone(),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Integer(a), Value::Integer(b)) => Some(a.cmp(b)),
            (Value::Bytes(a), Value::Bytes(b)) => Some(a.cmp(b)),
            _ if self == other => Some(Ordering::Equal),
            _ => None,
        }
    }
}

impl Add for &Value {
    type Output = Value;

    fn add(self, rhs: &Value) -> Value {
        self.combine(rhs, i64::wrapping_add, u8::wrapping_add)
    }
}

impl Sub for &Value {
    type Output = Value;

    fn sub(self, rhs: &Value) -> Value {
        self.combine(rhs, i64::wrapping_sub, u8::wrapping_sub)
    }
}

impl Mul for &Value {
    type Output = Value;

    fn mul(self, rhs: &Value) -> Value {
        self.combine(rhs, i64::wrapping_mul, u8::wrapping_mul)
    }
}

impl Div for &Value {
    type Output = Value;

    /// Division by a zero-valued operand of the same kind yields the zero of
    /// that kind. Individual zero bytes divide to zero.
    fn div(self, rhs: &Value) -> Value {
        let same_kind = matches!(
            (self, rhs),
            (Value::Integer(_), Value::Integer(_)) | (Value::Bytes(_), Value::Bytes(_))
        );
        if same_kind && rhs.is_zero() {
            return self.zeroed();
        }
        self.combine(
            rhs,
            |a, b| if b == 0 { 0 } else { a.wrapping_div(b) },
            |a, b| a.checked_div(b).unwrap_or(0),
        )
    }
}
