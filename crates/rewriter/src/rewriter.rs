use std::collections::HashMap;

use graphfold_schema::ComposedSchema;
use parser::{
    types::{DocumentOperations, ExecutableDocument, FragmentDefinition, OperationDefinition, SelectionSet},
    Positioned,
};
use tracing::instrument;
use value::Name;

use crate::{
    collector::Collector,
    context::TypeRef,
    printer::{operation_keyword, print_selection_set},
    utils::{clean_directive, get_operation, positioned},
    Result,
    RewriteError,
    RewriterOptions,
};

/// An operation after rewriting, with the name it had in the source document.
#[derive(Debug, Clone)]
pub struct RewrittenOperation {
    pub name: Option<Name>,
    pub definition: OperationDefinition,
}

/// Rewrites operations against a composed schema.
///
/// Fragment spreads are inlined, duplicate selections are merged and
/// `@skip` / `@include` conditions are normalized. The schema is only read, one
/// rewriter can serve any number of documents.
pub struct DocumentRewriter<'a> {
    schema: &'a ComposedSchema,
    options: RewriterOptions,
}

impl<'a> DocumentRewriter<'a> {
    pub fn new(schema: &'a ComposedSchema) -> Self {
        Self {
            schema,
            options: RewriterOptions::default(),
        }
    }

    pub fn options(self, options: RewriterOptions) -> Self {
        Self { options, ..self }
    }

    pub fn remove_statically_excluded_selections(mut self, enabled: bool) -> Self {
        self.options.remove_statically_excluded_selections = enabled;
        self
    }

    pub fn ignore_missing_type_system_members(mut self, enabled: bool) -> Self {
        self.options.ignore_missing_type_system_members = enabled;
        self
    }

    /// Rewrites the selected operation into a document holding only that
    /// operation and no fragment definitions.
    #[instrument(err(Debug), skip(self, document), level = "trace")]
    pub fn rewrite_document(
        &self,
        document: &ExecutableDocument,
        operation_name: Option<&str>,
    ) -> Result<ExecutableDocument> {
        let operation = self.rewrite_operation(document, operation_name)?;
        let operations = match operation.name {
            Some(name) => DocumentOperations::Multiple(HashMap::from([(name, positioned(operation.definition))])),
            None => DocumentOperations::Single(positioned(operation.definition)),
        };

        Ok(ExecutableDocument {
            operations,
            fragments: HashMap::new(),
        })
    }

    /// Rewrites the selected operation without wrapping it into a document.
    pub fn rewrite_operation(
        &self,
        document: &ExecutableDocument,
        operation_name: Option<&str>,
    ) -> Result<RewrittenOperation> {
        let (name, operation) = get_operation(document, operation_name)?;
        let selection_set = self.rewrite_selection_set(
            &operation.node,
            &document.fragments,
        )?;
        tracing::debug!(operation = ?name, selection_set = %print_selection_set(&selection_set), "Operation rewritten");

        let operation = &operation.node;
        Ok(RewrittenOperation {
            name: name.cloned(),
            definition: OperationDefinition {
                ty: operation.ty,
                variable_definitions: operation.variable_definitions.clone(),
                directives: operation
                    .directives
                    .iter()
                    .map(|directive| clean_directive(&directive.node))
                    .collect(),
                selection_set: positioned(selection_set),
            },
        })
    }

    fn rewrite_selection_set(
        &self,
        operation: &OperationDefinition,
        fragments: &HashMap<Name, Positioned<FragmentDefinition>>,
    ) -> Result<SelectionSet> {
        let root_type = self
            .schema
            .root_type(operation.ty)
            .ok_or_else(|| RewriteError::RootTypeNotFound {
                operation_type: operation_keyword(operation.ty).to_string(),
            })?;

        let mut collector = Collector::new(self.schema, self.options, fragments);
        let root = collector.arena.create_context(None, TypeRef::Named(root_type));
        collector.collect_selections(&operation.selection_set.node, root)?;

        Ok(SelectionSet {
            items: collector.rewrite_selections(root),
        })
    }
}
