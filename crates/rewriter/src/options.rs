use serde::Deserialize;

/// Switches that change how the rewriter treats the operation.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Deserialize)]
#[serde(default, rename_all = "snake_case")]
pub struct RewriterOptions {
    /// Drop selections carrying a literal `@skip(if: true)` or `@include(if: false)`.
    ///
    /// Fields whose sub-selection ends up empty receive a `__typename` filler.
    pub remove_statically_excluded_selections: bool,

    /// Keep going when a field or type condition is missing from the schema
    /// instead of failing. Nothing below such a selection is validated.
    pub ignore_missing_type_system_members: bool,
}
