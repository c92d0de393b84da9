use graphfold_rewriter::{print_document, DocumentRewriter, RewriteError, RewriterOptions};
use graphfold_schema::ComposedSchema;
use parser::types::{DocumentOperations, Selection, SelectionSet};
use pretty_assertions::assert_eq;
use test_case::test_case;

fn schema() -> ComposedSchema {
    ComposedSchema::parse(include_str!("test.graphql")).unwrap()
}

fn rewrite_with(query: &str, operation_name: Option<&str>, options: RewriterOptions) -> Result<String, RewriteError> {
    let schema = schema();
    let document = parser::parse_query(query).unwrap();
    DocumentRewriter::new(&schema)
        .options(options)
        .rewrite_document(&document, operation_name)
        .map(|document| print_document(&document))
}

fn rewrite(query: &str) -> Result<String, RewriteError> {
    rewrite_with(query, None, RewriterOptions::default())
}

fn prune(query: &str) -> Result<String, RewriteError> {
    rewrite_with(query, None, RewriterOptions {
        remove_statically_excluded_selections: true,
        ..Default::default()
    })
}

fn contains_fragment_spread(selection_set: &SelectionSet) -> bool {
    selection_set.items.iter().any(|selection| match &selection.node {
        Selection::FragmentSpread(_) => true,
        Selection::Field(field) => contains_fragment_spread(&field.node.selection_set.node),
        Selection::InlineFragment(fragment) => contains_fragment_spread(&fragment.node.selection_set.node),
    })
}

#[test_case("{ me { id name } }" ; "plain")]
#[test_case("{ me { id name name @include(if: $x) } }" ; "narrowed leaf")]
#[test_case("{ me { friends { name ... @include(if: $x) { id @skip(if: $y) } } } }" ; "nested conditionals")]
#[test_case("{ me { id ... @include(if: $x) { name username } } }" ; "wrapped group")]
#[test_case("{ search(text: \"a\") { ... on User { name } ... on Post @cached(ttl: 1) { title } } }" ; "fragments")]
#[test_case("{ me @include(if: $x) { friends { id } } me { name } }" ; "promotion")]
fn idempotent(query: &str) {
    let once = rewrite(query).unwrap();
    let twice = rewrite(&once).unwrap();
    assert_eq!(twice, once);
}

#[test]
fn fragment_transparency() {
    let with_fragments = r#"
        query {
            me {
                ...UserFields
                friends { ...UserFields @include(if: $x) }
            }
            search(text: "a") { ...PostFields ...UserFields }
        }
        fragment UserFields on User { id name }
        fragment PostFields on Post { title author { ...UserFields } }
    "#;
    let inlined = r#"
        {
            me {
                ... on User { id name }
                friends { ... on User @include(if: $x) { id name } }
            }
            search(text: "a") {
                ... on Post { title author { ... on User { id name } } }
                ... on User { id name }
            }
        }
    "#;

    let schema = schema();
    let document = parser::parse_query(with_fragments).unwrap();
    let rewritten = DocumentRewriter::new(&schema).rewrite_document(&document, None).unwrap();
    assert!(rewritten.fragments.is_empty());
    match &rewritten.operations {
        DocumentOperations::Single(operation) => {
            assert!(!contains_fragment_spread(&operation.node.selection_set.node))
        },
        DocumentOperations::Multiple(_) => panic!("expected an anonymous operation"),
    }

    assert_eq!(print_document(&rewritten), rewrite(inlined).unwrap());
    assert_eq!(
        print_document(&rewritten),
        r#"{ me { id name friends { ... @include(if: $x) { id name } } } search(text: "a") { ... on Post { title author { id name } } ... on User { id name } } }"#
    );
}

#[test]
fn static_pruning() {
    assert_eq!(prune("{ me { id @skip(if: true) name } }").unwrap(), "{ me { name } }");
    assert_eq!(prune("{ me { ... @skip(if: true) { name } id } }").unwrap(), "{ me { id } }");
    assert_eq!(
        prune("{ me { profile { bio @include(if: false) } id } }").unwrap(),
        "{ me { profile { __typename } id } }"
    );
    assert_eq!(
        prune("{ me { ... on User @include(if: false) { name } } }").unwrap(),
        "{ me { __typename } }"
    );
    assert_eq!(prune("{ me { id @skip(if: $x) } }").unwrap(), "{ me { id @skip(if: $x) } }");
}

#[test]
fn excluding_literals_without_pruning() {
    assert_eq!(rewrite("{ me { id @skip(if: true) name } }").unwrap(), "{ me { id name } }");
    assert_eq!(
        rewrite("{ me { ... @include(if: false) { name } id } }").unwrap(),
        "{ me { name id } }"
    );
}

#[test]
fn empty_selections_without_pruning_are_dropped() {
    let schema = schema();
    let document = parser::parse_query("{ me { profile { bio } } }").unwrap();
    let rewriter = DocumentRewriter::new(&schema).remove_statically_excluded_selections(false);
    assert_eq!(
        print_document(&rewriter.rewrite_document(&document, None).unwrap()),
        "{ me { profile { bio } } }"
    );
}

#[test_case("{ me { ...Missing } }", RewriteError::FragmentNotFound { name: "Missing".to_string() } ; "unknown fragment")]
#[test_case(
    "{ me { ...A } } fragment A on User { friends { ...A } }",
    RewriteError::FragmentCycle { name: "A".to_string() } ;
    "fragment cycle"
)]
#[test_case(
    "{ me { age } }",
    RewriteError::FieldNotFound { field: "age".to_string(), type_name: "User".to_string() } ;
    "unknown field"
)]
#[test_case(
    "{ me { ... on Unknown { id } } }",
    RewriteError::UnknownType { type_name: "Unknown".to_string() } ;
    "unknown type condition"
)]
#[test_case(
    "{ me @include(if: $x) { id } me @skip(if: $y) { name } }",
    RewriteError::ConflictingConditions { selection: "me".to_string() } ;
    "conflicting conditions"
)]
#[test_case(
    r#"{ search(text: "a") { ... on User @include(if: $x) { id } ... on User @skip(if: $y) { name } } }"#,
    RewriteError::ConflictingConditions { selection: "... on User".to_string() } ;
    "conflicting fragment conditions"
)]
#[test_case(
    "subscription { me { id } }",
    RewriteError::RootTypeNotFound { operation_type: "subscription".to_string() } ;
    "missing root type"
)]
#[test_case("query A { me { id } } query B { me { id } }", RewriteError::AmbiguousOperation ; "ambiguous operation")]
fn errors(query: &str, expected: RewriteError) {
    assert_eq!(rewrite(query).unwrap_err(), expected);
}

#[test]
fn error_messages_name_the_culprit() {
    let err = rewrite("{ me { ...Missing } }").unwrap_err();
    assert_eq!(err.to_string(), "Fragment 'Missing' does not exist.");
    let err = rewrite("{ me { age } }").unwrap_err();
    assert_eq!(err.to_string(), "Field 'age' does not exist on type 'User'.");
    let err = rewrite(r#"{ search(text: "a") { ... on User @include(if: $x) { id } ... on User @skip(if: $y) { name } } }"#)
        .unwrap_err();
    assert!(err.to_string().starts_with("Selection '... on User' is requested under different conditions"));
}

#[test]
fn conflicting_leaf_conditions_coexist() {
    assert_eq!(
        rewrite("{ me { name @include(if: $x) name @skip(if: $y) } }").unwrap(),
        "{ me { name @include(if: $x) name @skip(if: $y) } }"
    );
}

#[test]
fn missing_type_system_members() {
    let options = RewriterOptions {
        ignore_missing_type_system_members: true,
        ..Default::default()
    };
    assert_eq!(
        rewrite_with("{ me { age { x x } name ... on Unknown { y } } }", None, options).unwrap(),
        "{ me { age { x } name ... on Unknown { y } } }"
    );
}

#[test]
fn operation_selection() {
    let query = "query A($id: ID!) { user(id: $id) { id } } query B @cached { me { name name } }";
    assert_eq!(
        rewrite_with(query, Some("A"), RewriterOptions::default()).unwrap(),
        "query A($id: ID!) { user(id: $id) { id } }"
    );
    assert_eq!(
        rewrite_with(query, Some("B"), RewriterOptions::default()).unwrap(),
        "query B @cached { me { name } }"
    );
    assert_eq!(
        rewrite_with(query, Some("C"), RewriterOptions::default()).unwrap_err(),
        RewriteError::OperationNotFound { name: "C".to_string() }
    );
}

#[test]
fn rewrite_operation_keeps_the_name() {
    let schema = schema();
    let document = parser::parse_query("mutation Create { createPost(title: \"t\") { id } }").unwrap();
    let operation = DocumentRewriter::new(&schema)
        .rewrite_operation(&document, None)
        .unwrap();
    assert_eq!(operation.name.as_deref(), Some("Create"));
    assert_eq!(operation.definition.selection_set.node.items.len(), 1);
}
