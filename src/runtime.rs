//! The runtime (post-expansion) data model (spec.md §3) and the node
//! accessors used to resolve an entrypoint (spec.md §6b).
//!
//! Runtime nodes form a closed, three-variant tagged union. External code
//! cannot add a fourth variant — every traversal in [`crate::validate_runtime`]
//! and [`crate::executor`] is exhaustive (spec.md §9 "Sealed variants").

use std::collections::HashMap;

use crate::raw::{Capture, OnFail, ParamDefs};
use crate::raw::Stream;

/// A parsed `{{ steps.<id>.<stream> }}` / `stdin` reference, resolved once
/// during expansion so the executor never re-parses the reference string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepRef {
    /// Referenced step id.
    pub step_id: String,
    /// Referenced stream.
    pub stream: Stream,
}

/// One step of an expanded [`Pipeline`].
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineStep {
    /// Static step id (absent unless the author declared one).
    pub id: Option<String>,
    /// Fully materialised argument vector (argv\[0\] is the program).
    pub argv: Vec<String>,
    /// Working directory override.
    pub cwd: Option<String>,
    /// Environment variable overlay.
    pub env: HashMap<String, String>,
    /// What to buffer from this step's output.
    pub capture: Capture,
    /// Whether a captured stream is also mirrored to the terminal.
    pub tee: bool,
    /// Parsed stdin reference, if any.
    pub stdin: Option<StepRef>,
    /// Failure-handling policy.
    pub on_fail: OnFail,
}

/// A leaf node that executes one external command.
#[derive(Debug, Clone, PartialEq)]
pub struct Runnable {
    /// Node name.
    pub name: String,
    /// Fully materialised argument vector (argv\[0\] is the program).
    pub argv: Vec<String>,
    /// Working directory override.
    pub cwd: Option<String>,
    /// Environment variable overlay.
    pub env: HashMap<String, String>,
    /// Declared inputs, kept for collection at execution time.
    pub inputs: ParamDefs,
}

/// An ordered sequence of steps executed sequentially.
#[derive(Debug, Clone, PartialEq)]
pub struct Pipeline {
    /// Node name.
    pub name: String,
    /// Steps, in declaration order. Never empty (enforced by
    /// [`crate::validate_runtime`]).
    pub steps: Vec<PipelineStep>,
    /// Declared inputs.
    pub inputs: ParamDefs,
}

/// A node that groups children and is not directly executable.
#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    /// Node name.
    pub name: String,
    /// Child nodes, in declaration order.
    pub children: Vec<RuntimeNode>,
}

/// The sealed runtime node variant set (spec.md §3, §9).
#[derive(Debug, Clone, PartialEq)]
pub enum RuntimeNode {
    /// A group of children.
    Container(Container),
    /// A leaf that executes one command.
    Runnable(Runnable),
    /// A sequence of pipeline steps.
    Pipeline(Pipeline),
}

impl RuntimeNode {
    /// Returns this node's own name, whichever variant it is.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Container(c) => &c.name,
            Self::Runnable(r) => &r.name,
            Self::Pipeline(p) => &p.name,
        }
    }

    /// Looks up a direct child by name. Only [`Container`] has children; any
    /// other variant returns `None`.
    #[must_use]
    pub fn child(&self, name: &str) -> Option<&RuntimeNode> {
        match self {
            Self::Container(c) => c.children.iter().find(|n| n.name() == name),
            Self::Runnable(_) | Self::Pipeline(_) => None,
        }
    }
}

/// A failure resolving an [`Entrypoint`] against a built tree.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectError {
    /// No node exists at the given dotted path.
    #[error("no node found at path '{0}'")]
    NotFound(String),
    /// The path resolved to a [`Container`], which is not directly
    /// executable.
    #[error("'{0}' is a container, not a runnable or pipeline")]
    NotExecutable(String),
}

/// The result of resolving an entrypoint: either a [`Runnable`] (with
/// trailing positional arguments appended to its argv) or a [`Pipeline`]
/// (spec.md §6b).
#[derive(Debug, Clone, PartialEq)]
pub enum Selected<'a> {
    /// A runnable, plus the final argv (declared argv + trailing positional
    /// args appended).
    Runnable {
        /// The resolved node.
        node: &'a Runnable,
        /// `node.argv` with the entrypoint's trailing positional args
        /// appended.
        argv: Vec<String>,
    },
    /// A pipeline, selected as-is (positional args do not apply to
    /// pipelines; only their declared `inputs` vary per run).
    Pipeline(&'a Pipeline),
}

/// Resolves a dotted sequence of name segments against a built tree,
/// starting at `root` (the tree's root [`Container`]).
///
/// # Errors
///
/// Returns [`SelectError::NotFound`] if any segment has no matching child,
/// or [`SelectError::NotExecutable`] if the final segment resolves to a
/// [`Container`].
pub fn resolve_entrypoint<'a>(
    root: &'a RuntimeNode,
    path: &[String],
    extra_args: &[String],
) -> Result<Selected<'a>, SelectError> {
    let mut current = root;
    let mut walked = Vec::new();
    for segment in path {
        walked.push(segment.clone());
        current = current
            .child(segment)
            .ok_or_else(|| SelectError::NotFound(walked.join(".")))?;
    }

    match current {
        RuntimeNode::Runnable(r) => {
            let mut argv = r.argv.clone();
            argv.extend(extra_args.iter().cloned());
            Ok(Selected::Runnable { node: r, argv })
        }
        RuntimeNode::Pipeline(p) => Ok(Selected::Pipeline(p)),
        RuntimeNode::Container(c) => Err(SelectError::NotExecutable(c.name.clone())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runnable(name: &str, argv: &[&str]) -> RuntimeNode {
        RuntimeNode::Runnable(Runnable {
            name: name.to_string(),
            argv: argv.iter().map(|s| s.to_string()).collect(),
            cwd: None,
            env: HashMap::new(),
            inputs: ParamDefs::new(),
        })
    }

    #[test]
    fn resolve_entrypoint_finds_nested_runnable_and_appends_args() {
        let root = RuntimeNode::Container(Container {
            name: "root".to_string(),
            children: vec![RuntimeNode::Container(Container {
                name: "build".to_string(),
                children: vec![runnable("compile", &["cargo", "build"])],
            })],
        });

        let path = vec!["build".to_string(), "compile".to_string()];
        let extra = vec!["--release".to_string()];
        match resolve_entrypoint(&root, &path, &extra).unwrap() {
            Selected::Runnable { argv, .. } => {
                assert_eq!(argv, vec!["cargo", "build", "--release"]);
            }
            Selected::Pipeline(_) => panic!("expected runnable"),
        }
    }

    #[test]
    fn resolve_entrypoint_reports_not_found_with_walked_path() {
        let root = RuntimeNode::Container(Container {
            name: "root".to_string(),
            children: vec![runnable("build", &["echo", "hi"])],
        });
        let path = vec!["build".to_string(), "missing".to_string()];
        let err = resolve_entrypoint(&root, &path, &[]).unwrap_err();
        assert_eq!(err, SelectError::NotFound("build.missing".to_string()));
    }

    #[test]
    fn resolve_entrypoint_rejects_container_as_not_executable() {
        let root = RuntimeNode::Container(Container {
            name: "root".to_string(),
            children: vec![RuntimeNode::Container(Container {
                name: "build".to_string(),
                children: vec![runnable("compile", &["cargo", "build"])],
            })],
        });
        let path = vec!["build".to_string()];
        let err = resolve_entrypoint(&root, &path, &[]).unwrap_err();
        assert_eq!(err, SelectError::NotExecutable("build".to_string()));
    }
}
