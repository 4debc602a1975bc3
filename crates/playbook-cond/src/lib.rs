pub mod ast;
pub mod evaluator;
pub mod parser;

pub use ast::{BinaryOp, Operand};
pub use evaluator::{evaluate_binary, Condition, EvalError};
pub use parser::{parse_condition, ParseError, ParsedCondition};
