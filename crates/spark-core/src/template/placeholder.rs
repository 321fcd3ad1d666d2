//! Project-name variable derivation and placeholder substitution

/// The template's own package name; literal occurrences in text files are
/// replaced with the new project's name.
pub const TEMPLATE_NAME_TOKEN: &str = "create-spark";

/// The template's separator-free name, used where identifiers must not
/// contain separators (e.g. app URL schemes).
pub const TEMPLATE_SCHEME_TOKEN: &str = "createspark";

pub const NAME_MARKER: &str = "{{PROJECT_NAME}}";
pub const SLUG_MARKER: &str = "{{PROJECT_SLUG}}";
pub const SCHEME_MARKER: &str = "{{PROJECT_SCHEME}}";
pub const DESCRIPTION_MARKER: &str = "{{PROJECT_DESCRIPTION}}";

/// Name variants derived from a project name, substituted into text files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectVariables {
    /// The project name exactly as given.
    pub name: String,
    /// Lowercased name with every character outside `[a-z0-9-]` replaced
    /// by `-`.
    pub slug: String,
    /// Lowercased name with every non-alphanumeric character removed.
    pub scheme: String,
    pub description: String,
}

impl ProjectVariables {
    pub fn derive(project_name: &str) -> Self {
        let lowered = project_name.to_lowercase();
        let slug = lowered
            .chars()
            .map(|c| {
                if c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' {
                    c
                } else {
                    '-'
                }
            })
            .collect();
        let scheme = lowered.chars().filter(char::is_ascii_alphanumeric).collect();

        Self {
            name: project_name.to_string(),
            slug,
            scheme,
            description: format!("A React Native app created with {}", TEMPLATE_NAME_TOKEN),
        }
    }
}

/// Replace every literal occurrence of the template name tokens and the
/// bracketed placeholder markers with the derived variables.
///
/// Markers with no corresponding variable are left intact: residue the
/// caller can see, not a failure. Only `Text`-classified files go through
/// this; binary content is never touched.
pub fn substitute(content: &str, variables: &ProjectVariables) -> String {
    content
        .replace(TEMPLATE_NAME_TOKEN, &variables.name)
        .replace(TEMPLATE_SCHEME_TOKEN, &variables.scheme)
        .replace(NAME_MARKER, &variables.name)
        .replace(SLUG_MARKER, &variables.slug)
        .replace(SCHEME_MARKER, &variables.scheme)
        .replace(DESCRIPTION_MARKER, &variables.description)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_derive_variables_folds_and_replaces() {
        let vars = ProjectVariables::derive("My Cool App!");
        assert_eq!(vars.name, "My Cool App!");
        assert_eq!(vars.slug, "my-cool-app-");
        assert_eq!(vars.scheme, "mycoolapp");
    }

    #[test]
    fn test_derive_variables_keeps_valid_slug_chars() {
        let vars = ProjectVariables::derive("app-2024");
        assert_eq!(vars.slug, "app-2024");
        assert_eq!(vars.scheme, "app2024");
    }

    #[test]
    fn test_derive_variables_non_ascii_is_stripped() {
        let vars = ProjectVariables::derive("Café App");
        assert_eq!(vars.slug, "caf--app");
        assert_eq!(vars.scheme, "cafapp");
    }

    #[test]
    fn test_substitute_markers_and_name_tokens() {
        let vars = ProjectVariables::derive("Demo");
        let content = r#"{"name": "{{PROJECT_NAME}}", "slug": "{{PROJECT_SLUG}}", "scheme": "createspark", "source": "create-spark"}"#;
        let result = substitute(content, &vars);
        assert_eq!(
            result,
            r#"{"name": "Demo", "slug": "demo", "scheme": "demo", "source": "Demo"}"#
        );
    }

    #[test]
    fn test_substitute_leaves_unknown_markers_intact() {
        let vars = ProjectVariables::derive("Demo");
        let content = "{{PROJECT_AUTHOR}} made {{PROJECT_NAME}}";
        assert_eq!(substitute(content, &vars), "{{PROJECT_AUTHOR}} made Demo");
    }

    #[test]
    fn test_substitute_description_marker() {
        let vars = ProjectVariables::derive("Demo");
        let result = substitute("{{PROJECT_DESCRIPTION}}", &vars);
        assert!(result.contains("A React Native app"));
    }

    #[test]
    fn test_substitute_is_idempotent_for_plain_names() {
        // Holds as long as no marker is a substring of a derived value;
        // a project literally named "{{PROJECT_NAME}}" would break this.
        let vars = ProjectVariables::derive("My Cool App!");
        let content = "app {{PROJECT_NAME}} ({{PROJECT_SLUG}}/createspark)";
        let once = substitute(content, &vars);
        assert_eq!(substitute(&once, &vars), once);
    }
}
