// Language label resolution
// Maps the labels callers use to the identifiers the execution service reports

use crate::client::RuntimeDescriptor;

/// Human-facing label → service language identifier
///
/// Labels not listed here fall back to their lower-cased form.
pub const LANGUAGE_ALIASES: &[(&str, &str)] = &[
    ("C", "c"),
    ("C++", "c++"),
    ("C#", "csharp"),
    ("Go", "go"),
    ("Golang", "go"),
    ("Java", "java"),
    ("JavaScript", "javascript"),
    ("Node.js", "javascript"),
    ("Kotlin", "kotlin"),
    ("PHP", "php"),
    ("Python", "python"),
    ("Python3", "python"),
    ("Ruby", "ruby"),
    ("Rust", "rust"),
    ("Swift", "swift"),
    ("TypeScript", "typescript"),
];

/// Resolve a caller label to the service's language identifier
pub fn resolve_language(label: &str) -> String {
    LANGUAGE_ALIASES
        .iter()
        .find(|(alias, _)| *alias == label)
        .map(|(_, id)| id.to_string())
        .unwrap_or_else(|| label.to_lowercase())
}

/// First runtime whose language identifier equals `language`
///
/// Runtime aliases are not consulted; an unknown identifier is reported as
/// unsupported rather than silently substituted.
pub fn find_runtime<'a>(
    runtimes: &'a [RuntimeDescriptor],
    language: &str,
) -> Option<&'a RuntimeDescriptor> {
    runtimes.iter().find(|runtime| runtime.language == language)
}
