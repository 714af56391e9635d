//! The runtime validator (spec.md §4.5): structural checks applied to the
//! expanded tree, after every `uses` delegation and template reference has
//! already been resolved. Nothing here re-parses a template or looks at a
//! type registry — by this point there is only the sealed
//! [`crate::runtime::RuntimeNode`] shape to walk.

use std::collections::HashSet;

use crate::error::{BuildError, ErrorKind, Phase};
use crate::path::DottedPath;
use crate::runtime::{Container, RuntimeNode};

/// Validates the root container produced by [`crate::expand::expand`].
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered, tagged `phase=runtime`.
/// Per spec.md's path convention, the root container's own `root` segment
/// is never part of a reported path — only its children's names are.
pub fn validate_root(root: &Container) -> Result<(), BuildError> {
    if root.children.is_empty() {
        return Err(BuildError::new(
            Phase::Runtime,
            DottedPath::root().display(),
            ErrorKind::InvalidNode,
            "a built tree must declare at least one node",
        ));
    }
    check_duplicate_names(&root.children, &DottedPath::root())?;
    for child in &root.children {
        validate_node(child, &DottedPath::root().child(child.name()))?;
    }
    Ok(())
}

fn validate_node(node: &RuntimeNode, path: &DottedPath) -> Result<(), BuildError> {
    match node {
        RuntimeNode::Container(c) => validate_container(c, path),
        RuntimeNode::Runnable(r) => validate_argv(&r.argv, path),
        RuntimeNode::Pipeline(p) => {
            if p.steps.is_empty() {
                return Err(BuildError::new(
                    Phase::Runtime,
                    path.display(),
                    ErrorKind::InvalidNode,
                    "a pipeline must declare at least one step",
                ));
            }
            for step in &p.steps {
                validate_argv(&step.argv, path)?;
            }
            Ok(())
        }
    }
}

fn validate_container(container: &Container, path: &DottedPath) -> Result<(), BuildError> {
    if container.children.is_empty() {
        return Err(BuildError::new(
            Phase::Runtime,
            path.display(),
            ErrorKind::InvalidNode,
            "a container must have at least one child",
        ));
    }
    check_duplicate_names(&container.children, path)?;
    for child in &container.children {
        validate_node(child, &path.child(child.name()))?;
    }
    Ok(())
}

fn validate_argv(argv: &[String], path: &DottedPath) -> Result<(), BuildError> {
    if argv.first().map(|s| s.trim().is_empty()).unwrap_or(true) {
        return Err(BuildError::new(
            Phase::Runtime,
            path.display(),
            ErrorKind::InvalidNode,
            "argv[0] must be non-empty after expansion",
        ));
    }
    Ok(())
}

fn check_duplicate_names(children: &[RuntimeNode], path: &DottedPath) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for child in children {
        if !seen.insert(child.name()) {
            return Err(BuildError::new(
                Phase::Runtime,
                path.display(),
                ErrorKind::DuplicateChild,
                format!("duplicate child name '{}'", child.name()),
            ));
        }
    }
    Ok(())
}
