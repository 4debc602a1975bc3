use playbook_core::needs_resolution;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = "<")]
    Lt,
}

impl BinaryOp {
    /// Order in which operators are tried when splitting an expression.
    /// Two-character operators precede `>` and `<`, which are prefixes of them.
    pub const PARSE_ORDER: [BinaryOp; 6] = [
        BinaryOp::Eq,
        BinaryOp::Ne,
        BinaryOp::Ge,
        BinaryOp::Le,
        BinaryOp::Gt,
        BinaryOp::Lt,
    ];

    pub fn symbol(self) -> &'static str {
        match self {
            Self::Eq => "==",
            Self::Ne => "!=",
            Self::Ge => ">=",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Lt => "<",
        }
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

/// One side of a comparison.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Operand {
    Literal(String),
    /// `@...` or `$...` token bound later through [`crate::Condition::set_var_value`].
    Reference(String),
}

impl Operand {
    pub fn from_token(token: &str) -> Self {
        if needs_resolution(token) {
            Self::Reference(token.to_string())
        } else {
            Self::Literal(token.to_string())
        }
    }

    pub fn token(&self) -> &str {
        match self {
            Self::Literal(token) | Self::Reference(token) => token.as_str(),
        }
    }
}
