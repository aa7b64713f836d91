use eve_data::{Computation, NodeRef, Operation, Value};

/// Request to replace the function of the node at `target`.
///
/// Injections are messages rather than direct mutation so they go through the
/// same locks as every other node write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Injection {
    pub target: NodeRef,
    pub function: Computation,
}

/// Result of applying a computation: the returned value plus the injection it
/// requested, if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Applied {
    pub value: Value,
    pub injection: Option<Injection>,
}

impl From<Value> for Applied {
    fn from(value: Value) -> Self {
        Self {
            value,
            injection: None,
        }
    }
}

/// Applies `computation` to `input`.
///
/// Arithmetic combines `input` with the operand. `Identity` ignores `input`
/// and returns the identity sentinel. `Inject` needs an embedded computation as
/// its operand and a node reference as `input`; it then yields the operand and
/// an [`Injection`], otherwise the halted sentinel.
pub fn apply(computation: &Computation, input: &Value) -> Applied {
    let operand = &computation.operand;
    match computation.operation {
        Operation::Add => (input + operand).into(),
        Operation::Subtract => (input - operand).into(),
        Operation::Multiply => (input * operand).into(),
        Operation::Divide => (input / operand).into(),
        Operation::Identity => Value::identity_unknown().into(),
        Operation::Inject => match (operand.as_computation(), input.as_node()) {
            (Some(function), Some(&target)) => Applied {
                value: operand.clone(),
                injection: Some(Injection {
                    target,
                    function: function.clone(),
                }),
            },
            _ => Value::halted().into(),
        },
        Operation::Unknown => operand.clone().into(),
    }
}
