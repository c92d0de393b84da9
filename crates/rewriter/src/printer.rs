//! Compact GraphQL rendering of executable documents.
//!
//! Used to show rewritten operations and to compare them in tests, so the
//! output is deterministic: operations and fragments are sorted by name.

use std::fmt::{self, Display, Formatter};

use parser::{
    types::{
        Directive,
        DocumentOperations,
        ExecutableDocument,
        Field,
        FragmentDefinition,
        FragmentSpread,
        InlineFragment,
        OperationDefinition,
        OperationType,
        Selection,
        SelectionSet,
        VariableDefinition,
    },
    Positioned,
};

/// Renders every operation of the document followed by its fragments.
pub fn print_document(document: &ExecutableDocument) -> String {
    DisplayDocument(document).to_string()
}

pub fn print_operation(name: Option<&str>, operation: &OperationDefinition) -> String {
    DisplayOperation { name, operation }.to_string()
}

pub fn print_selection_set(selection_set: &SelectionSet) -> String {
    DisplaySelectionSet(selection_set).to_string()
}

pub(crate) fn operation_keyword(ty: OperationType) -> &'static str {
    match ty {
        OperationType::Query => "query",
        OperationType::Mutation => "mutation",
        OperationType::Subscription => "subscription",
    }
}

struct DisplayDocument<'a>(&'a ExecutableDocument);

impl Display for DisplayDocument<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut definitions = Vec::new();

        match &self.0.operations {
            DocumentOperations::Single(operation) => definitions.push(
                DisplayOperation {
                    name: None,
                    operation: &operation.node,
                }
                .to_string(),
            ),
            DocumentOperations::Multiple(operations) => {
                let mut operations = operations.iter().collect::<Vec<_>>();
                operations.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
                definitions.extend(operations.into_iter().map(|(name, operation)| {
                    DisplayOperation {
                        name: Some(name.as_str()),
                        operation: &operation.node,
                    }
                    .to_string()
                }));
            },
        }

        let mut fragments = self.0.fragments.iter().collect::<Vec<_>>();
        fragments.sort_by(|(a, _), (b, _)| a.as_str().cmp(b.as_str()));
        definitions.extend(
            fragments
                .into_iter()
                .map(|(name, fragment)| {
                    DisplayFragment {
                        name: name.as_str(),
                        fragment: &fragment.node,
                    }
                    .to_string()
                }),
        );

        f.write_str(&definitions.join("\n"))
    }
}

struct DisplayOperation<'a> {
    name: Option<&'a str>,
    operation: &'a OperationDefinition,
}

impl Display for DisplayOperation<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let operation = self.operation;
        let shorthand = self.name.is_none()
            && operation.ty == OperationType::Query
            && operation.variable_definitions.is_empty()
            && operation.directives.is_empty();
        if shorthand {
            return DisplaySelectionSet(&operation.selection_set.node).fmt(f);
        }

        f.write_str(operation_keyword(operation.ty))?;
        if let Some(name) = self.name {
            write!(f, " {}", name)?;
        }
        if !operation.variable_definitions.is_empty() {
            f.write_str("(")?;
            for (idx, definition) in operation.variable_definitions.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                DisplayVariableDefinition(&definition.node).fmt(f)?;
            }
            f.write_str(")")?;
        }
        write_directives(f, &operation.directives)?;
        f.write_str(" ")?;
        DisplaySelectionSet(&operation.selection_set.node).fmt(f)
    }
}

struct DisplayVariableDefinition<'a>(&'a VariableDefinition);

impl Display for DisplayVariableDefinition<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let definition = self.0;
        write!(f, "${}: {}", definition.name.node, definition.var_type.node)?;
        if let Some(default_value) = &definition.default_value {
            write!(f, " = {}", default_value.node)?;
        }
        write_directives(f, &definition.directives)
    }
}

struct DisplayFragment<'a> {
    name: &'a str,
    fragment: &'a FragmentDefinition,
}

impl Display for DisplayFragment<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "fragment {} on {}",
            self.name, self.fragment.type_condition.node.on.node
        )?;
        write_directives(f, &self.fragment.directives)?;
        f.write_str(" ")?;
        DisplaySelectionSet(&self.fragment.selection_set.node).fmt(f)
    }
}

struct DisplaySelectionSet<'a>(&'a SelectionSet);

impl Display for DisplaySelectionSet<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.0.items.is_empty() {
            return f.write_str("{ }");
        }
        f.write_str("{")?;
        for selection in &self.0.items {
            f.write_str(" ")?;
            match &selection.node {
                Selection::Field(field) => DisplayField(&field.node).fmt(f)?,
                Selection::FragmentSpread(spread) => DisplayFragmentSpread(&spread.node).fmt(f)?,
                Selection::InlineFragment(fragment) => DisplayInlineFragment(&fragment.node).fmt(f)?,
            }
        }
        f.write_str(" }")
    }
}

struct DisplayField<'a>(&'a Field);

impl Display for DisplayField<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let field = self.0;
        if let Some(alias) = &field.alias {
            write!(f, "{}: ", alias.node)?;
        }
        f.write_str(&field.name.node)?;
        if !field.arguments.is_empty() {
            f.write_str("(")?;
            for (idx, (name, value)) in field.arguments.iter().enumerate() {
                if idx > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{}: {}", name.node, value.node)?;
            }
            f.write_str(")")?;
        }
        write_directives(f, &field.directives)?;
        if !field.selection_set.node.items.is_empty() {
            f.write_str(" ")?;
            DisplaySelectionSet(&field.selection_set.node).fmt(f)?;
        }
        Ok(())
    }
}

struct DisplayFragmentSpread<'a>(&'a FragmentSpread);

impl Display for DisplayFragmentSpread<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "...{}", self.0.fragment_name.node)?;
        write_directives(f, &self.0.directives)
    }
}

struct DisplayInlineFragment<'a>(&'a InlineFragment);

impl Display for DisplayInlineFragment<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let fragment = self.0;
        f.write_str("...")?;
        if let Some(type_condition) = &fragment.type_condition {
            write!(f, " on {}", type_condition.node.on.node)?;
        }
        write_directives(f, &fragment.directives)?;
        f.write_str(" ")?;
        DisplaySelectionSet(&fragment.selection_set.node).fmt(f)
    }
}

fn write_directives(f: &mut Formatter<'_>, directives: &[Positioned<Directive>]) -> fmt::Result {
    for directive in directives {
        write!(f, " @{}", directive.node.name.node)?;
        write_arguments(
            f,
            directive
                .node
                .arguments
                .iter()
                .map(|(name, value)| (name.node.as_str(), &value.node as &dyn Display)),
        )?;
    }
    Ok(())
}

fn write_arguments<'a>(
    f: &mut Formatter<'_>,
    arguments: impl ExactSizeIterator<Item = (&'a str, &'a dyn Display)>,
) -> fmt::Result {
    if arguments.len() == 0 {
        return Ok(());
    }
    f.write_str("(")?;
    for (idx, (name, value)) in arguments.enumerate() {
        if idx > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}: {}", name, value)?;
    }
    f.write_str(")")
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn shorthand_query() {
        let document = parser::parse_query("{ a b: c(x: 1, y: \"s\") { d ...F ... on T @foo(v: [$v]) { e } } }").unwrap();
        assert_eq!(
            print_document(&document),
            r#"{ a b: c(x: 1, y: "s") { d ...F ... on T @foo(v: [$v]) { e } } }"#
        );
    }

    #[test]
    fn named_operations_are_sorted() {
        let document = parser::parse_query(
            "mutation B($id: ID! = \"1\") @m { b(id: $id) } query A { a @skip(if: $s) } fragment F on Q { x }",
        )
        .unwrap();
        assert_eq!(
            print_document(&document),
            "query A { a @skip(if: $s) }\nmutation B($id: ID! = \"1\") @m { b(id: $id) }\nfragment F on Q { x }"
        );
    }

    #[test]
    fn anonymous_operation_with_variables() {
        let document = parser::parse_query("query ($a: [Int]) { a(x: $a) }").unwrap();
        assert_eq!(print_document(&document), "query($a: [Int]) { a(x: $a) }");
    }

    #[test]
    fn variable_directives() {
        let document = parser::parse_query("query Q($a: Int = 1 @tag(name: \"x\") @internal) { a(x: $a) }").unwrap();
        assert_eq!(
            print_document(&document),
            r#"query Q($a: Int = 1 @tag(name: "x") @internal) { a(x: $a) }"#
        );
    }

    #[test]
    fn single_operation_and_selection_set() {
        let document = parser::parse_query("subscription OnPost { posts { id } }").unwrap();
        let operation = match &document.operations {
            DocumentOperations::Multiple(operations) => &operations.values().next().unwrap().node,
            DocumentOperations::Single(_) => unreachable!(),
        };
        assert_eq!(
            print_operation(Some("OnPost"), operation),
            "subscription OnPost { posts { id } }"
        );
        assert_eq!(print_selection_set(&operation.selection_set.node), "{ posts { id } }");
        assert_eq!(print_selection_set(&SelectionSet::default()), "{ }");
    }
}
