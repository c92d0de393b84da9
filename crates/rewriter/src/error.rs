use thiserror::Error;

/// Errors that abort the rewrite of an operation.
///
/// Every variant is a deterministic function of the document and the schema;
/// callers reject the request before execution starts.
#[derive(Debug, Clone, Eq, PartialEq, Error)]
pub enum RewriteError {
    #[error("Fragment '{name}' does not exist.")]
    FragmentNotFound { name: String },

    #[error("Fragment '{name}' spreads itself.")]
    FragmentCycle { name: String },

    #[error("Field '{field}' does not exist on type '{type_name}'.")]
    FieldNotFound { field: String, type_name: String },

    #[error("Type '{type_name}' does not exist in the schema.")]
    UnknownType { type_name: String },

    #[error(
        "Selection '{selection}' is requested under different conditions at the same level, which cannot be handled \
         yet."
    )]
    ConflictingConditions { selection: String },

    #[error("Operation '{name}' does not exist in the document.")]
    OperationNotFound { name: String },

    #[error("The document contains several operations, an operation name is required.")]
    AmbiguousOperation,

    #[error("The document does not contain any operation.")]
    NoOperation,

    #[error("The schema does not support {operation_type} operations.")]
    RootTypeNotFound { operation_type: String },
}

pub type Result<T, E = RewriteError> = std::result::Result<T, E>;
