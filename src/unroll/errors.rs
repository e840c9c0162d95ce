use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum UnrollError {
    #[error("Malformed column name '{column}' in table '{table}': class marker has no enclosing class segment")]
    MalformedColumnName { table: String, column: String },
    #[error("Unsupported recursion shape in table '{table}': {reason}")]
    UnsupportedRecursionShape { table: String, reason: String },
}
