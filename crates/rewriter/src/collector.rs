use std::collections::HashMap;

use graphfold_schema::ComposedSchema;
use parser::{
    types::{
        BaseType,
        Directive,
        DirectiveLocation,
        Field,
        FragmentDefinition,
        FragmentSpread,
        InlineFragment,
        Selection,
        SelectionSet,
        Type,
        TypeCondition,
    },
    Positioned,
};
use value::Name;

use crate::{
    context::{ContextArena, ContextId, TypeRef},
    directives::{divide_directives, is_statically_skipped},
    utils::{clean_arguments, positioned},
    Result,
    RewriteError,
    RewriterOptions,
};

/// Walks an operation and files every selection into the context tree.
pub(crate) struct Collector<'a> {
    pub(crate) schema: &'a ComposedSchema,
    pub(crate) options: RewriterOptions,
    pub(crate) arena: ContextArena<'a>,
    fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    expanding: Vec<&'a str>,
}

impl<'a> Collector<'a> {
    pub(crate) fn new(
        schema: &'a ComposedSchema,
        options: RewriterOptions,
        fragments: &'a HashMap<Name, Positioned<FragmentDefinition>>,
    ) -> Self {
        Self {
            schema,
            options,
            arena: ContextArena::default(),
            fragments,
            expanding: Vec::new(),
        }
    }

    pub(crate) fn collect_selections(&mut self, selection_set: &'a SelectionSet, context: ContextId) -> Result<()> {
        for selection in &selection_set.items {
            match &selection.node {
                Selection::Field(field) => self.collect_field(&field.node, context)?,
                Selection::InlineFragment(fragment) => self.collect_inline_fragment(&fragment.node, context)?,
                Selection::FragmentSpread(spread) => self.collect_fragment_spread(&spread.node, context)?,
            }
        }
        Ok(())
    }

    fn collect_field(&mut self, field: &'a Field, context: ContextId) -> Result<()> {
        if self.options.remove_statically_excluded_selections && is_statically_skipped(&field.directives) {
            tracing::debug!(field = %field.response_key().node, "Removing statically excluded field");
            return Ok(());
        }

        let field_type = self.field_type(self.arena[context].ty, field)?;

        let (conditional, directives) = divide_directives(self.schema, &field.directives, DirectiveLocation::Field);
        let target = match conditional {
            Some(conditional) => self.get_or_create_conditional_context(context, conditional),
            None => context,
        };

        let clean_field = Field {
            alias: field.alias.as_ref().map(|alias| positioned(alias.node.clone())),
            name: positioned(field.name.node.clone()),
            arguments: clean_arguments(&field.arguments),
            directives,
            selection_set: positioned(SelectionSet::default()),
        };
        let child_type = if field.selection_set.node.items.is_empty() {
            None
        } else {
            Some(field_type)
        };

        if let Some(child) = self.get_or_create_field_context(target, clean_field, child_type)? {
            self.collect_selections(&field.selection_set.node, child)?;
        }
        Ok(())
    }

    fn collect_inline_fragment(&mut self, fragment: &'a InlineFragment, context: ContextId) -> Result<()> {
        let type_condition = fragment
            .type_condition
            .as_ref()
            .map(|type_condition| &type_condition.node.on.node);
        self.collect_fragment(type_condition, &fragment.directives, &fragment.selection_set.node, context)
    }

    fn collect_fragment_spread(&mut self, spread: &'a FragmentSpread, context: ContextId) -> Result<()> {
        let fragments = self.fragments;
        let name = spread.fragment_name.node.as_str();
        let fragment = fragments
            .get(name)
            .ok_or_else(|| RewriteError::FragmentNotFound { name: name.to_string() })?;
        if self.expanding.contains(&name) {
            return Err(RewriteError::FragmentCycle { name: name.to_string() });
        }

        self.expanding.push(name);
        let result = self.collect_fragment(
            Some(&fragment.node.type_condition.node.on.node),
            &spread.directives,
            &fragment.node.selection_set.node,
            context,
        );
        self.expanding.pop();
        result
    }

    /// Files the selections of an inline fragment or a fragment spread.
    ///
    /// A fragment that neither narrows the type nor keeps directives of its
    /// own disappears, its selections join the (possibly conditional)
    /// enclosing context.
    fn collect_fragment(
        &mut self,
        type_condition: Option<&'a Name>,
        directives: &'a [Positioned<Directive>],
        selection_set: &'a SelectionSet,
        context: ContextId,
    ) -> Result<()> {
        if self.options.remove_statically_excluded_selections && is_statically_skipped(directives) {
            tracing::debug!(type_condition = ?type_condition, "Removing statically excluded fragment");
            return Ok(());
        }

        let enclosing_type = self.arena[context].ty;
        let (refinement, child_type) = match type_condition {
            Some(name) => {
                let ty = self.type_condition(name)?;
                if is_type_refinement(ty, enclosing_type) {
                    (Some(name), ty)
                } else {
                    (None, enclosing_type)
                }
            },
            None => (None, enclosing_type),
        };

        let (conditional, directives) = divide_directives(self.schema, directives, DirectiveLocation::InlineFragment);
        let target = match conditional {
            Some(conditional) => self.get_or_create_conditional_context(context, conditional),
            None => context,
        };

        if refinement.is_none() && directives.is_empty() {
            return self.collect_selections(selection_set, target);
        }

        let clean_fragment = InlineFragment {
            type_condition: refinement.map(|name| {
                positioned(TypeCondition {
                    on: positioned(name.clone()),
                })
            }),
            directives,
            selection_set: positioned(SelectionSet::default()),
        };
        let child = self.get_or_create_fragment_context(target, clean_fragment, child_type)?;
        self.collect_selections(selection_set, child)
    }

    /// Resolves the type a field returns, validating that the field exists.
    fn field_type(&self, parent_type: TypeRef<'a>, field: &Field) -> Result<TypeRef<'a>> {
        let parent_type = match parent_type {
            TypeRef::Named(ty) => ty,
            TypeRef::Missing => return Ok(TypeRef::Missing),
        };

        let name = field.name.node.as_str();
        if name == "__typename" {
            return Ok(TypeRef::Missing);
        }

        match parent_type.field_by_name(name) {
            Some(definition) => match self.schema.get_type(&definition.ty) {
                Some(ty) => Ok(TypeRef::Named(ty)),
                None => self.missing_type(named_type(&definition.ty)),
            },
            None if self.options.ignore_missing_type_system_members => {
                tracing::debug!(field = name, type_name = %parent_type.name, "Field is missing from the schema");
                Ok(TypeRef::Missing)
            },
            None => Err(RewriteError::FieldNotFound {
                field: name.to_string(),
                type_name: parent_type.name.to_string(),
            }),
        }
    }

    fn type_condition(&self, name: &Name) -> Result<TypeRef<'a>> {
        match self.schema.type_by_name(name) {
            Some(ty) => Ok(TypeRef::Named(ty)),
            None => self.missing_type(name),
        }
    }

    fn missing_type(&self, type_name: &str) -> Result<TypeRef<'a>> {
        if self.options.ignore_missing_type_system_members {
            tracing::debug!(type_name, "Type is missing from the schema");
            Ok(TypeRef::Missing)
        } else {
            Err(RewriteError::UnknownType {
                type_name: type_name.to_string(),
            })
        }
    }
}

fn named_type(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(ty) => named_type(ty),
    }
}

/// A fragment refines the type unless its type condition covers the enclosing type.
fn is_type_refinement(type_condition: TypeRef<'_>, enclosing_type: TypeRef<'_>) -> bool {
    match (type_condition, enclosing_type) {
        (TypeRef::Named(type_condition), TypeRef::Named(enclosing_type)) => {
            !type_condition.is_assignable_from(enclosing_type)
        },
        _ => true,
    }
}
