use std::{
    collections::HashMap,
    ops::{Index, IndexMut},
};

use graphfold_schema::MetaType;
use indexmap::IndexMap;
use parser::types::{Field, InlineFragment};
use value::Name;

use crate::{
    conditional::Conditional,
    key::{FieldKey, FragmentKey, SelectionKey},
};

/// Handle of a context inside a [`ContextArena`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct ContextId(usize);

/// The composite type selections of a context apply to.
#[derive(Debug, Clone, Copy)]
pub(crate) enum TypeRef<'a> {
    Named(&'a MetaType),
    /// Stands in for a type missing from the schema, nothing below it is validated.
    Missing,
}

#[derive(Debug)]
pub(crate) struct FieldEntry {
    pub(crate) node: Field,
    pub(crate) child: Option<ContextId>,
}

#[derive(Debug)]
pub(crate) struct FragmentEntry {
    pub(crate) node: InlineFragment,
    pub(crate) child: ContextId,
}

/// A clean selection waiting to be filed into a context.
#[derive(Debug)]
pub(crate) enum CleanSelection {
    Field(Field),
    Fragment(InlineFragment),
}

impl CleanSelection {
    pub(crate) fn key(&self) -> SelectionKey {
        match self {
            CleanSelection::Field(field) => SelectionKey::field(field),
            CleanSelection::Fragment(fragment) => SelectionKey::fragment(fragment),
        }
    }
}

/// Selections gathered for one type under one conditional branch.
#[derive(Debug)]
pub(crate) struct Context<'a> {
    pub(crate) parent: Option<ContextId>,
    pub(crate) ty: TypeRef<'a>,
    /// `None` for the unconditional context of a selection set.
    pub(crate) conditional: Option<Conditional>,
    /// Nearest unconditional context of the same selection set, the context itself when unconditional.
    pub(crate) unconditional: ContextId,
    pub(crate) fields: IndexMap<Name, IndexMap<FieldKey, FieldEntry>>,
    pub(crate) fragments: IndexMap<String, IndexMap<FragmentKey, FragmentEntry>>,
    pub(crate) conditionals: IndexMap<Conditional, ContextId>,
    /// Conditional contexts of this selection set holding a selection not (yet) seen here.
    pub(crate) references_in_conditional_contexts: HashMap<SelectionKey, Vec<ContextId>>,
}

impl<'a> Context<'a> {
    fn new(parent: Option<ContextId>, ty: TypeRef<'a>, conditional: Option<Conditional>, unconditional: ContextId) -> Self {
        Self {
            parent,
            ty,
            conditional,
            unconditional,
            fields: Default::default(),
            fragments: Default::default(),
            conditionals: Default::default(),
            references_in_conditional_contexts: Default::default(),
        }
    }

    #[inline]
    pub(crate) fn is_conditional(&self) -> bool {
        self.conditional.is_some()
    }

    /// Looks a selection up, `Some(child)` when the selection is present.
    pub(crate) fn selection(&self, key: &SelectionKey) -> Option<Option<ContextId>> {
        match key {
            SelectionKey::Field { response_name, key } => self
                .fields
                .get(response_name)
                .and_then(|bucket| bucket.get(key))
                .map(|entry| entry.child),
            SelectionKey::Fragment(key) => self
                .fragments
                .get(key.bucket())
                .and_then(|bucket| bucket.get(key))
                .map(|entry| Some(entry.child)),
        }
    }

    pub(crate) fn insert_selection(&mut self, key: SelectionKey, selection: CleanSelection, child: Option<ContextId>) {
        match (key, selection) {
            (SelectionKey::Field { response_name, key }, CleanSelection::Field(node)) => {
                self.fields
                    .entry(response_name)
                    .or_default()
                    .insert(key, FieldEntry { node, child });
            },
            (SelectionKey::Fragment(key), CleanSelection::Fragment(node)) => {
                if let Some(child) = child {
                    self.fragments
                        .entry(key.bucket().to_string())
                        .or_default()
                        .insert(key, FragmentEntry { node, child });
                }
            },
            _ => unreachable!("selection keys are derived from the selection"),
        }
    }

    /// Detaches a selection, returning its child context when it had one.
    pub(crate) fn remove_selection(&mut self, key: &SelectionKey) -> Option<ContextId> {
        match key {
            SelectionKey::Field { response_name, key } => {
                let bucket = self.fields.get_mut(response_name)?;
                let entry = bucket.shift_remove(key)?;
                if bucket.is_empty() {
                    self.fields.shift_remove(response_name);
                }
                entry.child
            },
            SelectionKey::Fragment(key) => {
                let bucket = self.fragments.get_mut(key.bucket())?;
                let entry = bucket.shift_remove(key)?;
                if bucket.is_empty() {
                    self.fragments.shift_remove(key.bucket());
                }
                Some(entry.child)
            },
        }
    }
}

/// Owns every context created while rewriting one operation.
#[derive(Debug, Default)]
pub(crate) struct ContextArena<'a> {
    contexts: Vec<Context<'a>>,
}

impl<'a> ContextArena<'a> {
    /// Creates the unconditional context of a selection set.
    pub(crate) fn create_context(&mut self, parent: Option<ContextId>, ty: TypeRef<'a>) -> ContextId {
        let id = ContextId(self.contexts.len());
        self.contexts.push(Context::new(parent, ty, None, id));
        tracing::trace!(?id, ?parent, "Created context");
        id
    }

    /// Creates a conditional branch below `parent`, the caller registers it in `parent.conditionals`.
    pub(crate) fn create_conditional_context(&mut self, parent: ContextId, conditional: Conditional) -> ContextId {
        let id = ContextId(self.contexts.len());
        let ty = self[parent].ty;
        let unconditional = self[parent].unconditional;
        self.contexts
            .push(Context::new(Some(parent), ty, Some(conditional), unconditional));
        tracing::trace!(?id, ?parent, "Created conditional context");
        id
    }

    /// Iterates over `id` and all of its ancestors.
    pub(crate) fn ancestors(&self, id: ContextId) -> impl Iterator<Item = &Context<'a>> {
        std::iter::successors(Some(&self[id]), move |context| context.parent.map(|parent| &self[parent]))
    }

    /// Returns `true` if `id` is `ancestor` or is reached from it through conditional branches only.
    pub(crate) fn is_conditional_descendant(&self, id: ContextId, ancestor: ContextId) -> bool {
        let mut current = id;
        loop {
            if current == ancestor {
                return true;
            }
            let context = &self[current];
            match (context.is_conditional(), context.parent) {
                (true, Some(parent)) => current = parent,
                _ => return false,
            }
        }
    }

    /// Conditionals between `ancestor` (exclusive) and `id` (inclusive), outermost first.
    pub(crate) fn conditional_chain(&self, ancestor: ContextId, id: ContextId) -> Vec<Conditional> {
        let mut chain = Vec::new();
        let mut current = id;
        while current != ancestor {
            let context = &self[current];
            match (&context.conditional, context.parent) {
                (Some(conditional), Some(parent)) => {
                    chain.push(conditional.clone());
                    current = parent;
                },
                _ => break,
            }
        }
        chain.reverse();
        chain
    }
}

impl<'a> Index<ContextId> for ContextArena<'a> {
    type Output = Context<'a>;

    fn index(&self, id: ContextId) -> &Self::Output {
        &self.contexts[id.0]
    }
}

impl<'a> IndexMut<ContextId> for ContextArena<'a> {
    fn index_mut(&mut self, id: ContextId) -> &mut Self::Output {
        &mut self.contexts[id.0]
    }
}

#[cfg(test)]
mod tests {
    use value::Value;

    use super::*;
    use crate::conditional::Condition;

    fn conditional(name: &str) -> Conditional {
        Conditional::new(None, Some(Condition::new(Value::Variable(Name::new(name))))).unwrap()
    }

    #[test]
    fn conditional_branches() {
        let mut arena = ContextArena::default();
        let root = arena.create_context(None, TypeRef::Missing);
        let x = arena.create_conditional_context(root, conditional("x"));
        let y = arena.create_conditional_context(x, conditional("y"));
        let child = arena.create_context(Some(y), TypeRef::Missing);

        assert_eq!(arena[y].unconditional, root);
        assert_eq!(arena[child].unconditional, child);
        assert!(arena.is_conditional_descendant(y, root));
        assert!(!arena.is_conditional_descendant(child, root));
        assert_eq!(arena.conditional_chain(root, y), vec![conditional("x"), conditional("y")]);
        assert_eq!(arena.ancestors(child).count(), 4);
    }
}
