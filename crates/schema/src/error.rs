use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("Failed to parse the schema document: {0}")]
    Parse(#[from] parser::Error),

    #[error("The schema does not define a query type '{type_name}'.")]
    MissingQueryType { type_name: String },

    #[error("Root type '{type_name}' must be an object type.")]
    RootTypeNotObject { type_name: String },
}
