use graphfold_schema::ComposedSchema;
use parser::{
    types::{Directive, DirectiveLocation},
    Positioned,
};
use value::Value;

use crate::{
    conditional::{Condition, Conditional},
    utils::clean_directive,
};

#[inline]
fn if_argument(directive: &Directive) -> Option<&Value> {
    directive.get_argument("if").map(|value| &value.node)
}

/// Splits directives into the conditional they form and the directives that
/// pass through unchanged.
///
/// `@skip` and `@include` with a literal `if` never take part in the
/// conditional and are removed, as is `@defer(if: false)`. Excluding literals
/// are handled by static pruning before this is called.
pub(crate) fn divide_directives(
    schema: &ComposedSchema,
    directives: &[Positioned<Directive>],
    location: DirectiveLocation,
) -> (Option<Conditional>, Vec<Positioned<Directive>>) {
    if directives.is_empty() {
        return (None, Vec::new());
    }

    let mut skip = None;
    let mut include = None;
    let mut remaining = Vec::new();

    for directive in directives {
        let name = directive.node.name.node.as_str();
        if let Some(definition) = schema.directive(name) {
            if !definition.has_location(location) {
                tracing::trace!(directive = name, ?location, "Dropping misplaced directive");
                continue;
            }
        }

        match name {
            "skip" => match if_argument(&directive.node) {
                None | Some(Value::Boolean(_)) => {},
                Some(value) => skip = Some(Condition::new(value.clone())),
            },
            "include" => match if_argument(&directive.node) {
                None | Some(Value::Boolean(_)) => {},
                Some(value) => include = Some(Condition::new(value.clone())),
            },
            "defer" if matches!(if_argument(&directive.node), Some(Value::Boolean(false))) => {},
            _ => remaining.push(clean_directive(&directive.node)),
        }
    }

    (Conditional::new(skip, include), remaining)
}

/// Returns `true` if the directives exclude the selection for every request.
pub(crate) fn is_statically_skipped(directives: &[Positioned<Directive>]) -> bool {
    directives.iter().any(|directive| {
        match (directive.node.name.node.as_str(), if_argument(&directive.node)) {
            ("skip", Some(Value::Boolean(true))) => true,
            ("include", Some(Value::Boolean(false))) => true,
            _ => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use parser::types::{DocumentOperations, Selection};
    use test_case::test_case;

    use super::*;

    const SDL: &str = r#"
        type Query { a: Int }
        directive @fieldOnly on FIELD
        directive @fragmentOnly on INLINE_FRAGMENT
    "#;

    fn field_directives(query: &str) -> Vec<Positioned<Directive>> {
        let document = parser::parse_query(query).unwrap();
        let operation = match document.operations {
            DocumentOperations::Single(operation) => operation,
            DocumentOperations::Multiple(_) => unreachable!(),
        };
        match operation.node.selection_set.node.items.into_iter().next().unwrap().node {
            Selection::Field(field) => field.node.directives,
            _ => unreachable!(),
        }
    }

    fn names(directives: &[Positioned<Directive>]) -> Vec<String> {
        directives
            .iter()
            .map(|directive| directive.node.name.node.to_string())
            .collect()
    }

    #[test]
    fn no_directives() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let (conditional, remaining) = divide_directives(&schema, &[], DirectiveLocation::Field);
        assert!(conditional.is_none());
        assert!(remaining.is_empty());
    }

    #[test]
    fn variables_form_the_conditional() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let directives = field_directives("{ a @include(if: $i) @fieldOnly @skip(if: $s) }");
        let (conditional, remaining) = divide_directives(&schema, &directives, DirectiveLocation::Field);
        let conditional = conditional.unwrap();
        assert_eq!(conditional.skip().map(|c| c.value().to_string()), Some("$s".to_string()));
        assert_eq!(conditional.include().map(|c| c.value().to_string()), Some("$i".to_string()));
        assert_eq!(names(&remaining), vec!["fieldOnly"]);
    }

    #[test]
    fn trivially_true_conditions_are_removed() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let directives = field_directives("{ a @skip(if: false) @include(if: true) }");
        let (conditional, remaining) = divide_directives(&schema, &directives, DirectiveLocation::Field);
        assert!(conditional.is_none());
        assert!(remaining.is_empty());
    }

    #[test]
    fn excluding_literals_are_removed() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let directives = field_directives("{ a @skip(if: true) @include(if: false) @include(if: $i) }");
        let (conditional, remaining) = divide_directives(&schema, &directives, DirectiveLocation::Field);
        let conditional = conditional.unwrap();
        assert!(conditional.skip().is_none());
        assert_eq!(conditional.include().map(|c| c.value().to_string()), Some("$i".to_string()));
        assert!(remaining.is_empty());

        let directives = field_directives("{ a @skip(if: true) }");
        let (conditional, remaining) = divide_directives(&schema, &directives, DirectiveLocation::Field);
        assert!(conditional.is_none());
        assert!(remaining.is_empty());
    }

    #[test]
    fn misplaced_directives_are_dropped() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let directives = field_directives("{ a @fieldOnly @fragmentOnly @unknown }");
        let (_, remaining) = divide_directives(&schema, &directives, DirectiveLocation::InlineFragment);
        assert_eq!(names(&remaining), vec!["fragmentOnly", "unknown"]);
    }

    #[test]
    fn defer_if_false_is_removed() {
        let schema = ComposedSchema::parse(SDL).unwrap();
        let directives = field_directives("{ a @defer(if: false) @defer(if: $d) @defer }");
        let (conditional, remaining) = divide_directives(&schema, &directives, DirectiveLocation::InlineFragment);
        assert!(conditional.is_none());
        assert_eq!(names(&remaining), vec!["defer", "defer"]);
    }

    #[test_case("{ a @skip(if: true) }", true ; "skip true")]
    #[test_case("{ a @include(if: false) }", true ; "include false")]
    #[test_case("{ a @skip(if: false) }", false ; "skip false")]
    #[test_case("{ a @include(if: true) }", false ; "include true")]
    #[test_case("{ a @skip(if: $v) }", false ; "skip variable")]
    #[test_case("{ a @other(if: true) }", false ; "other directive")]
    fn statically_skipped(query: &str, expected: bool) {
        assert_eq!(is_statically_skipped(&field_directives(query)), expected);
    }
}
