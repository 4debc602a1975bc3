use crate::ast::{BinaryOp, Operand};

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty condition expression")]
    Empty,
    #[error("no supported binary operator splits `{expression}` into two operands")]
    NoOperator { expression: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCondition {
    pub op: BinaryOp,
    pub lhs: Operand,
    pub rhs: Operand,
}

impl ParsedCondition {
    /// Reference tokens in left-to-right order, without duplicates.
    pub fn references(&self) -> Vec<String> {
        let mut out = Vec::<String>::with_capacity(2);
        for operand in [&self.lhs, &self.rhs] {
            if let Operand::Reference(token) = operand {
                if !out.contains(token) {
                    out.push(token.clone());
                }
            }
        }
        out
    }
}

/// Splits `expression` on the first operator in [`BinaryOp::PARSE_ORDER`] that yields
/// exactly two non-empty trimmed operands.
pub fn parse_condition(expression: &str) -> Result<ParsedCondition, ParseError> {
    if expression.trim().is_empty() {
        return Err(ParseError::Empty);
    }

    for op in BinaryOp::PARSE_ORDER {
        let parts = expression.split(op.symbol()).collect::<Vec<_>>();
        let [lhs, rhs] = parts.as_slice() else {
            continue;
        };
        let (lhs, rhs) = (lhs.trim(), rhs.trim());
        if lhs.is_empty() || rhs.is_empty() {
            continue;
        }
        return Ok(ParsedCondition {
            op,
            lhs: Operand::from_token(lhs),
            rhs: Operand::from_token(rhs),
        });
    }

    Err(ParseError::NoOperator {
        expression: expression.to_string(),
    })
}

#[cfg(test)]
#[path = "parser_test.rs"]
mod tests;
