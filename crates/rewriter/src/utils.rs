use parser::{
    types::{Directive, DocumentOperations, ExecutableDocument, OperationDefinition},
    Pos,
    Positioned,
};
use tracing::instrument;
use value::{Name, Value};

use crate::{Result, RewriteError};

/// Wraps a freshly built node, the rewritten document carries no source locations.
#[inline]
pub(crate) fn positioned<T>(node: T) -> Positioned<T> {
    Positioned::new(node, Pos::default())
}

pub(crate) fn clean_arguments(
    arguments: &[(Positioned<Name>, Positioned<Value>)],
) -> Vec<(Positioned<Name>, Positioned<Value>)> {
    arguments
        .iter()
        .map(|(name, value)| (positioned(name.node.clone()), positioned(value.node.clone())))
        .collect()
}

pub(crate) fn clean_directive(directive: &Directive) -> Positioned<Directive> {
    positioned(Directive {
        name: positioned(directive.name.node.clone()),
        arguments: clean_arguments(&directive.arguments),
    })
}

/// Get the operation definition from a document.
///
/// Without a name the document must contain exactly one operation.
#[instrument(err(Debug), skip(document), level = "trace")]
pub fn get_operation<'a>(
    document: &'a ExecutableDocument,
    operation_name: Option<&str>,
) -> Result<(Option<&'a Name>, &'a Positioned<OperationDefinition>)> {
    match (&document.operations, operation_name) {
        (DocumentOperations::Single(operation), None) => Ok((None, operation)),
        (DocumentOperations::Single(_), Some(name)) => Err(RewriteError::OperationNotFound { name: name.to_string() }),
        (DocumentOperations::Multiple(operations), Some(name)) => operations
            .get_key_value(name)
            .map(|(name, operation)| (Some(name), operation))
            .ok_or_else(|| RewriteError::OperationNotFound { name: name.to_string() }),
        (DocumentOperations::Multiple(operations), None) => {
            let mut iter = operations.iter();
            match (iter.next(), iter.next()) {
                (Some((name, operation)), None) => Ok((Some(name), operation)),
                (Some(_), Some(_)) => Err(RewriteError::AmbiguousOperation),
                (None, _) => Err(RewriteError::NoOperation),
            }
        },
    }
}
