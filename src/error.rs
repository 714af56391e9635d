//! Error types for the build pipeline and the pipeline executor.
//!
//! Errors are classified by **phase** (where the failure was observed) and
//! **kind** (what went wrong); both are structural so callers can branch on
//! them without string matching, while the rendered message stays advisory.

use thiserror::Error;

/// The phase of the build pipeline (or the executor) that observed a
/// failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// A document failed to decode into the raw model (host concern; the
    /// engine only ever reports this for structurally degenerate input,
    /// e.g. no documents at all).
    Parse,
    /// Raw validator (pre-expansion).
    Raw,
    /// Expander.
    Expand,
    /// Runtime validator (post-expansion).
    Runtime,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Parse => "parse",
            Self::Raw => "raw",
            Self::Expand => "expand",
            Self::Runtime => "runtime",
        };
        write!(f, "{s}")
    }
}

/// Stable error kinds, shared by every phase (not every kind is reachable
/// from every phase, but callers branching on `kind` never need to know
/// which phase raised it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required structural element was missing or malformed.
    InvalidNode,
    /// A type name was registered twice.
    TypeAlreadyExists,
    /// A `uses` entry named a type the registry does not contain.
    UnknownType,
    /// A `uses` chain revisited a type already being expanded.
    CycleDetected,
    /// Two direct siblings ended up with the same name after expansion.
    DuplicateChild,
    /// A caller supplied a parameter name the target type does not declare.
    UnknownParam,
    /// A declared parameter had neither a caller-supplied value nor a
    /// default.
    MissingParam,
    /// A `{{ inputs.X }}` reference named an input the enclosing node does
    /// not declare.
    UnknownInput,
    /// A `{{ steps.X.Y }}` / `stdin` reference named a step id that is not a
    /// strictly prior step in the same pipeline.
    StepRefUnknown,
    /// A step reference named a real prior step but the referenced stream
    /// was never captured.
    StepRefUncaptured,
    /// A `stdin`/step reference string did not parse as
    /// `steps.<id>.<stdout|stderr>`.
    StepRefBadFormat,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::InvalidNode => "invalid-node",
            Self::TypeAlreadyExists => "type-already-exists",
            Self::UnknownType => "unknown-type",
            Self::CycleDetected => "cycle-detected",
            Self::DuplicateChild => "duplicate-child",
            Self::UnknownParam => "unknown-param",
            Self::MissingParam => "missing-param",
            Self::UnknownInput => "unknown-input",
            Self::StepRefUnknown => "step-ref-unknown",
            Self::StepRefUncaptured => "step-ref-uncaptured",
            Self::StepRefBadFormat => "step-ref-bad-format",
        };
        write!(f, "{s}")
    }
}

/// A single build-pipeline failure: `phase=<phase> path=<path> : <message>`,
/// optionally followed by a hint.
#[derive(Debug, Clone, Error)]
#[error("phase={phase} path={path} : {message}{}", hint.as_ref().map(|h| format!(" (hint: {h})")).unwrap_or_default())]
pub struct BuildError {
    /// Phase that observed the failure.
    pub phase: Phase,
    /// Dotted path of the node the failure was observed at.
    pub path: String,
    /// Stable kind, for programmatic branching.
    pub kind: ErrorKind,
    /// Human-readable message.
    pub message: String,
    /// Optional hint (e.g. the hyphen-in-param-name guidance).
    pub hint: Option<String>,
}

impl BuildError {
    /// Creates a new build error with no hint.
    #[must_use]
    pub fn new(
        phase: Phase,
        path: impl Into<String>,
        kind: ErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            phase,
            path: path.into(),
            kind,
            message: message.into(),
            hint: None,
        }
    }

    /// Attaches a hint to this error.
    #[must_use]
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

/// Failure surfaced while resolving or substituting a template reference.
/// Carried inside [`BuildError`] (kind depends on the offending reference)
/// or returned directly by [`crate::template`] helpers used outside a build.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{{ params.X }}` reference named a parameter not present in the
    /// resolved parameter map.
    #[error("unknown parameter '{0}' referenced in template")]
    UnknownParam(String),
    /// Content inside `{{ ... }}` did not match any of the three recognised
    /// forms.
    #[error(
        "unrecognised template reference '{{{{ {0} }}}}' (hint: the legacy '{{{{ .name }}}}' form is not supported; use params./inputs./steps. namespaces)"
    )]
    Unrecognised(String),
}

/// Failure surfaced by the pipeline executor. Unlike [`BuildError`], this is
/// the *last unrecovered* failure at the pipeline boundary: most step
/// failures are absorbed by an on-fail policy before ever reaching here.
#[derive(Debug, Error)]
pub enum ExecError {
    /// A required input had neither a caller-supplied value nor a default.
    #[error("missing required input '{name}'")]
    MissingInput {
        /// Name of the unset input.
        name: String,
    },
    /// A step failed and its on-fail policy was `fail` (the default), or a
    /// `retry` step exhausted every attempt.
    #[error("step '{step_id}' failed after {attempts} attempt(s): {source}")]
    StepFailed {
        /// Id of the failing step.
        step_id: String,
        /// Total attempts made (1 unless the step's policy was `retry`).
        attempts: usize,
        /// Underlying failure.
        #[source]
        source: Box<ExecError>,
    },
    /// The external process could not even be spawned.
    #[error("failed to spawn process for step '{step_id}': {source}")]
    Spawn {
        /// Id of the step whose process could not be spawned.
        step_id: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The process ran and exited with a non-zero status.
    #[error("step '{step_id}' exited with status {code}")]
    NonZeroExit {
        /// Id of the failing step.
        step_id: String,
        /// Process exit code (−1 if terminated by a signal).
        code: i32,
    },
    /// The pipeline run was cancelled before this step could complete.
    #[error("pipeline cancelled before step '{step_id}' completed")]
    Cancelled {
        /// Id of the step that was in flight (or next up) when cancelled.
        step_id: String,
    },
}
