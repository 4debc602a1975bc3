use crate::ast::{BinaryOp, Operand};
use crate::parser::{parse_condition, ParseError, ParsedCondition};
use playbook_core::Value;
use std::collections::BTreeMap;
use tracing::debug;

/// Why a condition has no truth value. Callers treat every variant as "not possible",
/// which is distinct from evaluating to `false`.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum EvalError {
    #[error("variable `{0}` has no bound value")]
    Unbound(String),
    #[error("operator `{op}` is not defined for non-integer operands `{lhs}` and `{rhs}`")]
    Unsupported {
        op: BinaryOp,
        lhs: String,
        rhs: String,
    },
}

/// A single binary comparison whose reference operands are bound late.
#[derive(Debug, Clone)]
pub struct Condition {
    expression: String,
    parsed: ParsedCondition,
    unknown_vars: Vec<String>,
    values: BTreeMap<String, Value>,
}

impl Condition {
    pub fn parse(expression: &str) -> Result<Self, ParseError> {
        let parsed = parse_condition(expression)?;
        let unknown_vars = parsed.references();
        Ok(Self {
            expression: expression.to_string(),
            parsed,
            unknown_vars,
            values: BTreeMap::new(),
        })
    }

    pub fn op(&self) -> BinaryOp {
        self.parsed.op
    }

    /// Reference tokens that must be bound before [`Condition::evaluate`] can succeed.
    pub fn unknown_vars(&self) -> &[String] {
        &self.unknown_vars
    }

    pub fn set_var_value(&mut self, name: impl Into<String>, value: Value) {
        self.values.insert(name.into(), value);
    }

    pub fn bound_values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    pub fn evaluate(&self) -> Result<bool, EvalError> {
        let lhs = self.operand_text(&self.parsed.lhs)?;
        let rhs = self.operand_text(&self.parsed.rhs)?;
        debug!(expression = %self.expression, %lhs, op = %self.parsed.op, %rhs, "evaluating condition");
        evaluate_binary(lhs.as_str(), self.parsed.op, rhs.as_str())
    }

    fn operand_text(&self, operand: &Operand) -> Result<String, EvalError> {
        match operand {
            Operand::Literal(text) => Ok(text.clone()),
            Operand::Reference(token) => self
                .values
                .get(token)
                .map(Value::as_string)
                .ok_or_else(|| EvalError::Unbound(token.clone())),
        }
    }
}

/// Compares numerically when both sides parse as integers, otherwise falls back to exact
/// string equality for `==` and `!=`.
pub fn evaluate_binary(lhs: &str, op: BinaryOp, rhs: &str) -> Result<bool, EvalError> {
    if let (Ok(left), Ok(right)) = (lhs.parse::<i64>(), rhs.parse::<i64>()) {
        return Ok(match op {
            BinaryOp::Eq => left == right,
            BinaryOp::Ne => left != right,
            BinaryOp::Gt => left > right,
            BinaryOp::Ge => left >= right,
            BinaryOp::Lt => left < right,
            BinaryOp::Le => left <= right,
        });
    }

    match op {
        BinaryOp::Eq => Ok(lhs == rhs),
        BinaryOp::Ne => Ok(lhs != rhs),
        _ => Err(EvalError::Unsupported {
            op,
            lhs: lhs.to_string(),
            rhs: rhs.to_string(),
        }),
    }
}

#[cfg(test)]
#[path = "evaluator_test.rs"]
mod tests;
