use std::path::PathBuf;

use thiserror::Error;

/// Everything that can abort a parse. A parse either returns a complete
/// module or one of these; no partial model is ever handed back.
#[derive(Debug, Error)]
pub enum ThriftError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("syntax error at line {line}, column {column}: {msg}")]
    Lexical {
        msg: String,
        line: usize,
        column: usize,
    },

    #[error("grammar error at line {line}: expected {expected}, found {found}")]
    Grammar {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("unresolved reference {path:?} at line {line}")]
    UnresolvedReference { path: String, line: usize },

    #[error("type mismatch at line {line}: expected {expected}, found {found}")]
    TypeMismatch {
        expected: String,
        found: String,
        line: usize,
    },

    #[error("field {field:?} is required to build a constant of type {ty:?}")]
    MissingRequiredField { field: String, ty: String },

    #[error("no field named {field:?} in type {ty:?}")]
    UnknownField { field: String, ty: String },

    #[error("no member of enum {name:?} has value {value}")]
    InvalidEnumValue { name: String, value: i64 },

    #[error("service {service:?} cannot extend {target:?} at line {line}")]
    ExtendsTarget {
        service: String,
        target: String,
        line: usize,
    },

    #[error("invalid module path: {0}")]
    ModulePath(String),

    #[error("circular include of {path:?}")]
    CircularInclude { path: PathBuf },
}
