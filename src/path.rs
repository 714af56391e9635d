//! Dotted path composition and identifier validation.
//!
//! Every error reported by the build pipeline carries a `path=` locator
//! composed from these helpers, so two independent phases never disagree on
//! how a node's address is spelled.

use once_cell::sync::Lazy;
use regex::Regex;

/// Placeholder used in a composed path when a node's own name is missing.
///
/// The raw validator still reports a missing name as an error; this constant
/// only affects how the *path* of such a node is rendered while walking its
/// (otherwise still-processed) children.
pub const MISSING_NAME: &str = "<missing>";

/// A dotted path from the root, e.g. `build.docker.compose`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DottedPath {
    segments: Vec<String>,
}

impl DottedPath {
    /// Creates an empty (root) path.
    #[must_use]
    pub fn root() -> Self {
        Self {
            segments: Vec::new(),
        }
    }

    /// Creates a path with a single segment.
    #[must_use]
    pub fn new(segment: impl Into<String>) -> Self {
        Self {
            segments: vec![segment.into()],
        }
    }

    /// Returns a new path with `segment` appended.
    #[must_use]
    pub fn child(&self, segment: &str) -> Self {
        let rendered = if segment.is_empty() {
            MISSING_NAME
        } else {
            segment
        };
        let mut segments = self.segments.clone();
        segments.push(rendered.to_string());
        Self { segments }
    }

    /// Renders the path the way every error message spells it: segments
    /// joined with `.`, empty path rendered as `<root>`.
    #[must_use]
    pub fn display(&self) -> String {
        if self.segments.is_empty() {
            "<root>".to_string()
        } else {
            self.segments.join(".")
        }
    }
}

impl std::fmt::Display for DottedPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.display())
    }
}

/// Parameter names must match `[A-Za-z_][A-Za-z0-9_]*` — hyphens are
/// rejected because they cannot survive into a `{{ params.name }}` lookup.
static PARAM_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid regex"));

/// Step ids and input/parameter *reference* names match
/// `[A-Za-z0-9_][A-Za-z0-9_-]*` — hyphens are allowed here because these
/// names are never substituted through `{{ params.* }}`.
static REF_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_][A-Za-z0-9_-]*$").expect("valid regex"));

/// Returns `true` if `name` is a valid parameter declaration name.
#[must_use]
pub fn is_valid_param_name(name: &str) -> bool {
    PARAM_NAME.is_match(name)
}

/// Returns `true` if `name` is a valid step id / input / step-reference name.
#[must_use]
pub fn is_valid_ref_name(name: &str) -> bool {
    REF_NAME.is_match(name)
}

/// Validates a parameter declaration name, returning a hint when the only
/// problem is a hyphen (the single most common authoring mistake described
/// in the engine-to-parser contract).
///
/// # Errors
///
/// Returns `Err(hint)` when the name does not match `[A-Za-z_][A-Za-z0-9_]*`.
pub fn validate_param_name(name: &str) -> Result<(), String> {
    if is_valid_param_name(name) {
        return Ok(());
    }
    if name.contains('-') {
        Err(format!(
            "parameter name '{name}' contains a hyphen; use underscores instead (hyphens are not recognised inside {{{{ params.* }}}})"
        ))
    } else {
        Err(format!(
            "parameter name '{name}' must match [A-Za-z_][A-Za-z0-9_]*"
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_displays_as_root_marker() {
        assert_eq!(DottedPath::root().display(), "<root>");
    }

    #[test]
    fn child_composes_dotted_segments() {
        let path = DottedPath::new("build").child("docker").child("compose");
        assert_eq!(path.display(), "build.docker.compose");
    }

    #[test]
    fn child_substitutes_missing_name() {
        let path = DottedPath::new("build").child("");
        assert_eq!(path.display(), "build.<missing>");
    }

    #[test]
    fn param_name_rejects_hyphen() {
        assert!(!is_valid_param_name("my-param"));
        assert!(is_valid_param_name("my_param"));
    }

    #[test]
    fn ref_name_allows_hyphen() {
        assert!(is_valid_ref_name("step-1"));
        assert!(is_valid_ref_name("step_1"));
        assert!(!is_valid_ref_name("-step"));
    }

    #[test]
    fn validate_param_name_hints_at_hyphen() {
        let err = validate_param_name("docker-file").unwrap_err();
        assert!(err.contains("hyphen"));
        assert!(err.contains("underscores"));
    }
}
