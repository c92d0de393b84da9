//! Canonical identities used to deduplicate selections.
//!
//! Syntax nodes carry positions and keep arguments in source order, so they
//! are normalized once into hashable keys and the keys are used for every
//! lookup.

use std::fmt::{self, Display, Formatter};

use parser::{
    types::{Directive, Field, InlineFragment},
    Positioned,
};
use value::{Name, Value};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum ValueKey {
    Null,
    Variable(String),
    Number(String),
    String(String),
    Boolean(bool),
    Binary(Vec<u8>),
    Enum(String),
    List(Vec<ValueKey>),
    Object(Vec<(String, ValueKey)>),
}

impl ValueKey {
    pub(crate) fn new(value: &Value) -> Self {
        match value {
            Value::Variable(name) => ValueKey::Variable(name.to_string()),
            Value::Null => ValueKey::Null,
            Value::Number(number) => ValueKey::Number(number.to_string()),
            Value::String(s) => ValueKey::String(s.clone()),
            Value::Boolean(b) => ValueKey::Boolean(*b),
            Value::Binary(bytes) => ValueKey::Binary(bytes.to_vec()),
            Value::Enum(name) => ValueKey::Enum(name.to_string()),
            Value::List(items) => ValueKey::List(items.iter().map(ValueKey::new).collect()),
            Value::Object(object) => {
                let mut entries = object
                    .iter()
                    .map(|(name, value)| (name.to_string(), ValueKey::new(value)))
                    .collect::<Vec<_>>();
                entries.sort_by(|(a, _), (b, _)| a.cmp(b));
                ValueKey::Object(entries)
            },
        }
    }
}

fn arguments_key(arguments: &[(Positioned<Name>, Positioned<Value>)]) -> Vec<(String, ValueKey)> {
    let mut key = arguments
        .iter()
        .map(|(name, value)| (name.node.to_string(), ValueKey::new(&value.node)))
        .collect::<Vec<_>>();
    key.sort_by(|(a, _), (b, _)| a.cmp(b));
    key
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct DirectiveKey {
    name: String,
    arguments: Vec<(String, ValueKey)>,
}

impl DirectiveKey {
    pub(crate) fn new(directive: &Directive) -> Self {
        Self {
            name: directive.name.node.to_string(),
            arguments: arguments_key(&directive.arguments),
        }
    }
}

fn directives_key(directives: &[Positioned<Directive>]) -> Vec<DirectiveKey> {
    directives
        .iter()
        .map(|directive| DirectiveKey::new(&directive.node))
        .collect()
}

/// Identity of a clean field: alias, name, arguments (order independent) and
/// the non-conditional directives it kept.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FieldKey {
    alias: Option<String>,
    name: String,
    arguments: Vec<(String, ValueKey)>,
    directives: Vec<DirectiveKey>,
}

impl FieldKey {
    pub(crate) fn new(field: &Field) -> Self {
        Self {
            alias: field.alias.as_ref().map(|alias| alias.node.to_string()),
            name: field.name.node.to_string(),
            arguments: arguments_key(&field.arguments),
            directives: directives_key(&field.directives),
        }
    }
}

/// Identity of a clean inline fragment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct FragmentKey {
    type_condition: Option<String>,
    directives: Vec<DirectiveKey>,
}

impl FragmentKey {
    pub(crate) fn new(fragment: &InlineFragment) -> Self {
        Self {
            type_condition: fragment
                .type_condition
                .as_ref()
                .map(|type_condition| type_condition.node.on.node.to_string()),
            directives: directives_key(&fragment.directives),
        }
    }

    /// Bucket name in a context's fragment map, empty for untyped fragments.
    pub(crate) fn bucket(&self) -> &str {
        self.type_condition.as_deref().unwrap_or_default()
    }
}

/// A deduplicated selection inside one context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) enum SelectionKey {
    Field { response_name: Name, key: FieldKey },
    Fragment(FragmentKey),
}

impl SelectionKey {
    pub(crate) fn field(field: &Field) -> Self {
        SelectionKey::Field {
            response_name: field.response_key().node.clone(),
            key: FieldKey::new(field),
        }
    }

    pub(crate) fn fragment(fragment: &InlineFragment) -> Self {
        SelectionKey::Fragment(FragmentKey::new(fragment))
    }
}

impl Display for SelectionKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            SelectionKey::Field { response_name, key } if response_name.as_str() != key.name => {
                write!(f, "{}: {}", response_name, key.name)
            },
            SelectionKey::Field { response_name, .. } => write!(f, "{}", response_name),
            SelectionKey::Fragment(key) => match &key.type_condition {
                Some(type_condition) => write!(f, "... on {}", type_condition),
                None => f.write_str("..."),
            },
        }
    }
}
