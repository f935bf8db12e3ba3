//! Evaluation errors.

use std::io;

use binidl_ir::{Name, SchemaError};

/// Why a marshal or unmarshal through the evaluator failed.
#[derive(Debug, thiserror::Error)]
pub enum EvalError {
    /// The sink or source failed, including short reads.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The graph could not be planned.
    #[error(transparent)]
    Schema(#[from] SchemaError),

    /// No record of this name exists in the graph.
    #[error("unknown record type `{0}`")]
    UnknownType(Name),

    /// The type's codec lives outside the schema.
    #[error("type `{0}` has an external codec and cannot be evaluated")]
    External(Name),

    /// The value does not have the shape the schema requires.
    #[error("value at `{path}` does not match the schema: {reason}")]
    Shape { path: String, reason: String },

    /// A plan addressed bytes outside its active view.
    #[error("plan for `{record}` is malformed: {reason}")]
    Plan { record: Name, reason: String },
}

impl EvalError {
    /// The I/O error kind, if this is an I/O failure.
    pub fn io_kind(&self) -> Option<io::ErrorKind> {
        match self {
            EvalError::Io(err) => Some(err.kind()),
            _ => None,
        }
    }
}
