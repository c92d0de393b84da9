use std::hash::{Hash, Hasher};

use parser::{types::Directive, Positioned};
use value::{Name, Value};

use crate::{key::ValueKey, utils::positioned};

/// The `if` expression of a `@skip` or `@include` directive.
#[derive(Debug, Clone)]
pub(crate) struct Condition {
    value: Value,
    key: ValueKey,
}

impl Condition {
    pub(crate) fn new(value: Value) -> Self {
        let key = ValueKey::new(&value);
        Self { value, key }
    }

    pub(crate) fn value(&self) -> &Value {
        &self.value
    }
}

impl PartialEq for Condition {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for Condition {}

impl Hash for Condition {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

/// The `@skip` / `@include` pair governing a branch of selections.
///
/// At least one part is always present.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Conditional {
    skip: Option<Condition>,
    include: Option<Condition>,
}

impl Conditional {
    pub(crate) fn new(skip: Option<Condition>, include: Option<Condition>) -> Option<Self> {
        if skip.is_none() && include.is_none() {
            return None;
        }
        Some(Self { skip, include })
    }

    pub(crate) fn skip(&self) -> Option<&Condition> {
        self.skip.as_ref()
    }

    pub(crate) fn include(&self) -> Option<&Condition> {
        self.include.as_ref()
    }

    /// Drops every part already in force through `inherited`.
    pub(crate) fn without(self, inherited: &Conditional) -> Option<Self> {
        let skip = self.skip.filter(|skip| inherited.skip.as_ref() != Some(skip));
        let include = self.include.filter(|include| inherited.include.as_ref() != Some(include));
        Conditional::new(skip, include)
    }

    /// Rebuilds the directives, `@skip` first.
    pub(crate) fn to_directives(&self) -> Vec<Positioned<Directive>> {
        [("skip", &self.skip), ("include", &self.include)]
            .into_iter()
            .filter_map(|(name, condition)| {
                condition.as_ref().map(|condition| {
                    positioned(Directive {
                        name: positioned(Name::new(name)),
                        arguments: vec![(positioned(Name::new("if")), positioned(condition.value().clone()))],
                    })
                })
            })
            .collect()
    }
}
