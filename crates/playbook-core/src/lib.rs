pub mod field_path;
pub mod issues;
pub mod value;
pub mod var_ref;

pub use field_path::FieldPath;
pub use issues::{IssueSeverity, StructuredIssue};
pub use value::{Value, LIST_SEPARATOR};
pub use var_ref::{needs_resolution, NodeField, VarRef};
