use parser::{
    types::{Directive, Field, InlineFragment, Selection, SelectionSet},
    Positioned,
};
use value::Name;

use crate::{collector::Collector, context::ContextId, utils::positioned};

impl<'a> Collector<'a> {
    /// Builds the selections of a context: fields, then fragments, then one
    /// group per conditional branch.
    pub(crate) fn rewrite_selections(&self, context: ContextId) -> Vec<Positioned<Selection>> {
        let context = &self.arena[context];
        let mut selections = Vec::new();

        for entry in context.fields.values().flat_map(|bucket| bucket.values()) {
            let mut field = entry.node.clone();
            if let Some(child) = entry.child {
                let mut items = self.rewrite_selections(child);
                if items.is_empty() {
                    if !self.options.remove_statically_excluded_selections {
                        continue;
                    }
                    items.push(typename_selection());
                }
                field.selection_set = positioned(SelectionSet { items });
            }
            selections.push(positioned(Selection::Field(positioned(field))));
        }

        for entry in context.fragments.values().flat_map(|bucket| bucket.values()) {
            let items = self.rewrite_selections(entry.child);
            if items.is_empty() {
                continue;
            }
            let mut fragment = entry.node.clone();
            fragment.selection_set = positioned(SelectionSet { items });
            selections.push(positioned(Selection::InlineFragment(positioned(fragment))));
        }

        for (conditional, child) in &context.conditionals {
            let mut items = self.rewrite_selections(*child);
            if items.len() == 1 && directives_mut(&mut items[0].node).is_empty() {
                if let Some(mut selection) = items.pop() {
                    *directives_mut(&mut selection.node) = conditional.to_directives();
                    selections.push(selection);
                }
            } else if !items.is_empty() {
                selections.push(positioned(Selection::InlineFragment(positioned(InlineFragment {
                    type_condition: None,
                    directives: conditional.to_directives(),
                    selection_set: positioned(SelectionSet { items }),
                }))));
            }
        }

        selections
    }
}

fn directives_mut(selection: &mut Selection) -> &mut Vec<Positioned<Directive>> {
    match selection {
        Selection::Field(field) => &mut field.node.directives,
        Selection::FragmentSpread(spread) => &mut spread.node.directives,
        Selection::InlineFragment(fragment) => &mut fragment.node.directives,
    }
}

fn typename_selection() -> Positioned<Selection> {
    positioned(Selection::Field(positioned(Field {
        alias: None,
        name: positioned(Name::new("__typename")),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: positioned(SelectionSet::default()),
    })))
}
