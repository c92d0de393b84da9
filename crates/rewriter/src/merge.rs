//! Reconciles selections seen under different conditions.
//!
//! A selection lives in exactly one context of its selection-set level. When
//! it is first seen inside a conditional branch, the branch is recorded in the
//! level's `references_in_conditional_contexts`. A later sighting in an
//! enclosing context promotes the conditional copy, a later sighting inside a
//! branch below an existing copy narrows into that copy.

use std::mem;

use parser::types::{Field, InlineFragment};

use crate::{
    collector::Collector,
    conditional::Conditional,
    context::{CleanSelection, ContextId, TypeRef},
    key::SelectionKey,
    Result,
    RewriteError,
};

impl<'a> Collector<'a> {
    /// Returns the branch of `context` for `conditional`, creating it on first use.
    ///
    /// Parts of the conditional already in force on `context` or one of its
    /// ancestors are dropped first, nothing left means `context` itself.
    pub(crate) fn get_or_create_conditional_context(&mut self, context: ContextId, conditional: Conditional) -> ContextId {
        let conditional = match self.remove_inherited_conditionals(context, conditional) {
            Some(conditional) => conditional,
            None => return context,
        };

        if let Some(child) = self.arena[context].conditionals.get(&conditional) {
            return *child;
        }
        let child = self.arena.create_conditional_context(context, conditional.clone());
        self.arena[context].conditionals.insert(conditional, child);
        child
    }

    fn remove_inherited_conditionals(&self, context: ContextId, conditional: Conditional) -> Option<Conditional> {
        let mut conditional = conditional;
        for ancestor in self.arena.ancestors(context) {
            if let Some(inherited) = &ancestor.conditional {
                conditional = conditional.without(inherited)?;
            }
        }
        Some(conditional)
    }

    /// Rebuilds `chain` below `context`, outermost conditional first.
    fn recreate_conditional_hierarchy(&mut self, context: ContextId, chain: &[Conditional]) -> ContextId {
        chain.iter().fold(context, |context, conditional| {
            self.get_or_create_conditional_context(context, conditional.clone())
        })
    }

    /// Files a clean field, returning the context its sub-selections go to.
    ///
    /// `child_type` is `None` for leaf fields.
    pub(crate) fn get_or_create_field_context(
        &mut self,
        context: ContextId,
        field: Field,
        child_type: Option<TypeRef<'a>>,
    ) -> Result<Option<ContextId>> {
        self.get_or_create_selection_context(context, CleanSelection::Field(field), child_type)
    }

    pub(crate) fn get_or_create_fragment_context(
        &mut self,
        context: ContextId,
        fragment: InlineFragment,
        child_type: TypeRef<'a>,
    ) -> Result<ContextId> {
        match self.get_or_create_selection_context(context, CleanSelection::Fragment(fragment), Some(child_type))? {
            Some(child) => Ok(child),
            None => unreachable!("inline fragments always own a child context"),
        }
    }

    fn get_or_create_selection_context(
        &mut self,
        context: ContextId,
        selection: CleanSelection,
        child_type: Option<TypeRef<'a>>,
    ) -> Result<Option<ContextId>> {
        let key = selection.key();

        if let Some(child) = self.arena[context].selection(&key) {
            return Ok(child);
        }

        if let Some((holder, child)) = self.find_in_enclosing_branches(context, &key) {
            tracing::debug!(selection = %key, "Narrowing conditional selection into the enclosing copy");
            let chain = self.arena.conditional_chain(holder, context);
            return Ok(child.map(|child| self.recreate_conditional_hierarchy(child, &chain)));
        }

        let child = child_type.map(|ty| self.arena.create_context(Some(context), ty));
        self.arena[context].insert_selection(key.clone(), selection, child);
        self.register_selection(context, key, child.is_none())?;
        Ok(child)
    }

    /// Finds a copy of the selection in a context enclosing the conditional
    /// branch `context` at the same level, with that copy's child.
    fn find_in_enclosing_branches(
        &self,
        context: ContextId,
        key: &SelectionKey,
    ) -> Option<(ContextId, Option<ContextId>)> {
        let mut current = context;
        while self.arena[current].is_conditional() {
            current = self.arena[current].parent?;
            if let Some(child) = self.arena[current].selection(key) {
                return Some((current, child));
            }
        }
        None
    }

    /// Updates the level's record of conditional copies after the selection
    /// was filed into `context`.
    fn register_selection(&mut self, context: ContextId, key: SelectionKey, is_leaf: bool) -> Result<()> {
        let level = self.arena[context].unconditional;
        let holders = self.arena[level]
            .references_in_conditional_contexts
            .remove(&key)
            .unwrap_or_default();

        let mut remaining = Vec::with_capacity(holders.len() + 1);
        for holder in holders {
            if self.arena.is_conditional_descendant(holder, context) {
                self.promote(holder, context, &key)?;
                continue;
            }

            let holder_is_leaf = matches!(self.arena[holder].selection(&key), Some(None));
            if !is_leaf || !holder_is_leaf {
                return Err(RewriteError::ConflictingConditions {
                    selection: key.to_string(),
                });
            }
            remaining.push(holder);
        }

        if self.arena[context].is_conditional() {
            remaining.push(context);
        }
        if !remaining.is_empty() {
            self.arena[level]
                .references_in_conditional_contexts
                .insert(key, remaining);
        }
        Ok(())
    }

    /// Moves the copy held by the conditional branch `holder` into `target`,
    /// pushing the branch's conditions down onto the copy's children.
    fn promote(&mut self, holder: ContextId, target: ContextId, key: &SelectionKey) -> Result<()> {
        tracing::debug!(selection = %key, "Promoting conditional selection");
        let chain = self.arena.conditional_chain(target, holder);
        let source = self.arena[holder].remove_selection(key);
        let destination = self.arena[target].selection(key).flatten();

        if let (Some(source), Some(destination)) = (source, destination) {
            let destination = self.recreate_conditional_hierarchy(destination, &chain);
            self.merge_contexts(source, destination)?;
        }
        Ok(())
    }

    /// Refiles every selection of `source` into `target`, recursively.
    fn merge_contexts(&mut self, source: ContextId, target: ContextId) -> Result<()> {
        let fields = mem::take(&mut self.arena[source].fields);
        let fragments = mem::take(&mut self.arena[source].fragments);
        let conditionals = mem::take(&mut self.arena[source].conditionals);
        self.arena[source].references_in_conditional_contexts.clear();

        for entry in fields.into_values().flat_map(|bucket| bucket.into_values()) {
            let child_type = entry.child.map(|child| self.arena[child].ty);
            let destination = self.get_or_create_field_context(target, entry.node, child_type)?;
            if let (Some(child), Some(destination)) = (entry.child, destination) {
                self.merge_contexts(child, destination)?;
            }
        }

        for entry in fragments.into_values().flat_map(|bucket| bucket.into_values()) {
            let child_type = self.arena[entry.child].ty;
            let destination = self.get_or_create_fragment_context(target, entry.node, child_type)?;
            self.merge_contexts(entry.child, destination)?;
        }

        for (conditional, child) in conditionals {
            let destination = self.get_or_create_conditional_context(target, conditional);
            self.merge_contexts(child, destination)?;
        }
        Ok(())
    }
}
