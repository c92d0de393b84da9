#![forbid(unsafe_code)]

mod composed_schema;
mod error;

pub use composed_schema::{ComposedSchema, MetaDirective, MetaField, MetaType, TypeKind};
pub use error::SchemaError;
