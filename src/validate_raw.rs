//! The raw validator (spec.md §4.1): structural checks applied to a node
//! list before any expansion happens. Every rule here is re-used, phase
//! re-tagged as `expand`, when the expander walks a type body's own
//! `RawNode` shape (see [`crate::expand`]).

use std::collections::{HashMap, HashSet};

use crate::error::{BuildError, ErrorKind, Phase};
use crate::path::{self, is_valid_ref_name, DottedPath};
use crate::raw::{Capture, OnFail, ParamDefs, RawNode, RawStep, Stream};
use crate::template::{self, Reference};

/// Validates every declared parameter name in `defs` against the
/// `[A-Za-z_][A-Za-z0-9_]*` rule (spec.md §3 "Name rules"), attaching the
/// hyphen hint from [`path::validate_param_name`] when that's the only
/// problem. Shared by [`validate_placement`] (a node's own `inputs`) and
/// [`crate::registry::TypeRegistry::register`] (a type's declared
/// `params`) so both call sites report byte-identical wording.
///
/// # Errors
///
/// Returns the first offending name, tagged `ErrorKind::InvalidNode`.
pub(crate) fn validate_param_defs(defs: &ParamDefs, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    for name in defs.keys() {
        if let Err(hint) = path::validate_param_name(name) {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                format!("invalid parameter name '{name}'"),
            )
            .with_hint(hint));
        }
    }
    Ok(())
}

/// Validates a top-level node list (spec.md's "Raw validator" entry point).
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered, tagged `phase=raw`.
pub fn validate_nodes(nodes: &[RawNode]) -> Result<(), BuildError> {
    validate_siblings(nodes, Phase::Raw, &DottedPath::root())
}

/// Validates one sibling group (direct children of `parent`), checking name
/// presence and sibling-name uniqueness before recursing into each node.
pub(crate) fn validate_siblings(
    nodes: &[RawNode],
    phase: Phase,
    parent: &DottedPath,
) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for node in nodes {
        let path = parent.child(&node.name);
        if node.name.is_empty() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "node name must be non-empty",
            ));
        }
        if !seen.insert(node.name.as_str()) {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::DuplicateChild,
                format!("duplicate sibling name '{}'", node.name),
            ));
        }
        validate_node(node, phase, &path)?;
    }
    Ok(())
}

/// Validates a single node's structural shape and, recursively, its
/// contents.
pub(crate) fn validate_node(node: &RawNode, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    validate_xor(node, phase, path)?;
    validate_placement(node, phase, path)?;

    if node.has_command() {
        validate_command_content(node, phase, path)
    } else if let Some(children) = &node.children {
        if children.is_empty() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "children must be non-empty",
            ));
        }
        validate_siblings(children, phase, path)
    } else if let Some(uses) = &node.uses {
        if uses.is_empty() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "uses must be non-empty",
            ));
        }
        Ok(())
    } else if let Some(steps) = &node.steps {
        validate_steps(steps, phase, path, node.inputs.as_ref())
    } else {
        unreachable!("validate_xor guarantees exactly one bucket is populated")
    }
}

/// The XOR rule: exactly one of {command-or-argv, children, uses, steps}.
pub(crate) fn validate_xor(node: &RawNode, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    match node.structural_bucket_count() {
        1 => Ok(()),
        0 => Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "node must set exactly one of command, children, uses, or steps",
        )),
        _ => Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "cannot combine command, children, uses, and steps on the same node",
        )),
    }
}

/// `inputs` only on command/steps nodes; `with` only on uses nodes; every
/// `with.per_type` entry names a non-empty type.
pub(crate) fn validate_placement(
    node: &RawNode,
    phase: Phase,
    path: &DottedPath,
) -> Result<(), BuildError> {
    if let Some(inputs) = &node.inputs {
        if !(node.has_command() || node.steps.is_some()) {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "inputs is only valid on a command or steps node",
            ));
        }
        validate_param_defs(inputs, phase, path)?;
    }
    if let Some(with) = &node.with {
        if node.uses.is_none() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "with is only valid on a node that sets uses",
            ));
        }
        for entry in &with.per_type {
            if entry.type_name.is_empty() {
                return Err(BuildError::new(
                    phase,
                    path.display(),
                    ErrorKind::InvalidNode,
                    "with.per_type entries must declare a non-empty type",
                ));
            }
        }
    }
    Ok(())
}

/// Scans one string for `{{ ... }}` references and converts any
/// [`crate::error::TemplateError`] into a [`BuildError`].
fn scan_refs(text: &str, phase: Phase, path: &DottedPath) -> Result<Vec<Reference>, BuildError> {
    template::scan(text).map_err(|e| BuildError::new(phase, path.display(), ErrorKind::InvalidNode, e.to_string()))
}

/// Validates a command node's content: non-empty effective command, and
/// every `{{ inputs.X }}` / `{{ steps.X.Y }}` reference appearing in
/// `command`, `argv`, `cwd`, `env`. Step references are forbidden here —
/// there is no enclosing step list for them to address.
fn validate_command_content(node: &RawNode, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    if node.command.is_some() && node.argv.is_some() {
        return Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "cannot combine command and argv on the same node",
        ));
    }
    if let Some(command) = &node.command {
        if command.trim().is_empty() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "command must be non-empty after trimming",
            ));
        }
    }
    if let Some(argv) = &node.argv {
        if argv.first().map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "argv[0] must be non-empty",
            ));
        }
    }

    let mut texts: Vec<&str> = Vec::new();
    if let Some(command) = &node.command {
        texts.push(command);
    }
    if let Some(argv) = &node.argv {
        texts.extend(argv.iter().map(String::as_str));
    }
    if let Some(cwd) = &node.cwd {
        texts.push(cwd);
    }
    if let Some(env) = &node.env {
        texts.extend(env.values().map(String::as_str));
    }

    for text in texts {
        for reference in scan_refs(text, phase, path)? {
            match reference {
                Reference::Inputs(name) => {
                    if !declares_input(node.inputs.as_ref(), &name) {
                        return Err(BuildError::new(
                            phase,
                            path.display(),
                            ErrorKind::UnknownInput,
                            format!("'{{{{ inputs.{name} }}}}' references an undeclared input"),
                        ));
                    }
                }
                Reference::Steps { .. } => {
                    return Err(BuildError::new(
                        phase,
                        path.display(),
                        ErrorKind::StepRefUnknown,
                        "step references are not allowed outside a pipeline",
                    ));
                }
                Reference::Params(_) => {}
            }
        }
    }
    Ok(())
}

fn declares_input(inputs: Option<&ParamDefs>, name: &str) -> bool {
    inputs.is_some_and(|defs| defs.contains_key(name))
}

/// Validates a pipeline's step list (spec.md §4.1.1).
pub(crate) fn validate_steps(
    steps: &[RawStep],
    phase: Phase,
    path: &DottedPath,
    declared_inputs: Option<&ParamDefs>,
) -> Result<(), BuildError> {
    if steps.is_empty() {
        return Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "steps must be non-empty",
        ));
    }

    let mut prior: HashMap<String, Capture> = HashMap::new();
    for (index, step) in steps.iter().enumerate() {
        let step_path = path.child(&format!("steps[{index}]"));
        validate_step_command(step, phase, &step_path)?;

        if let Some(id) = &step.id {
            if id.contains("{{") {
                return Err(BuildError::new(
                    phase,
                    step_path.display(),
                    ErrorKind::InvalidNode,
                    "step id must be static (no template references)",
                ));
            }
            if !is_valid_ref_name(id) {
                return Err(BuildError::new(
                    phase,
                    step_path.display(),
                    ErrorKind::InvalidNode,
                    format!("step id '{id}' must match [A-Za-z0-9_][A-Za-z0-9_-]*"),
                ));
            }
            if prior.contains_key(id) {
                return Err(BuildError::new(
                    phase,
                    step_path.display(),
                    ErrorKind::DuplicateChild,
                    format!("duplicate step id '{id}'"),
                ));
            }
        }

        if step.capture.is_captured() && step.id.is_none() {
            return Err(BuildError::new(
                phase,
                step_path.display(),
                ErrorKind::InvalidNode,
                "a capturing step must declare an id",
            ));
        }
        if step.tee && !step.capture.is_captured() {
            return Err(BuildError::new(
                phase,
                step_path.display(),
                ErrorKind::InvalidNode,
                "tee requires capture to be set",
            ));
        }

        if let Some(stdin) = &step.stdin {
            validate_step_ref_string(stdin, &prior, phase, &step_path)?;
        }

        validate_step_template_refs(step, &prior, declared_inputs, phase, &step_path)?;
        validate_on_fail(&step.on_fail, phase, &step_path)?;

        if let Some(id) = &step.id {
            prior.insert(id.clone(), step.capture);
        }
    }
    Ok(())
}

fn validate_step_command(step: &RawStep, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    if !step.has_command() {
        return Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "step must set exactly one of command or argv",
        ));
    }
    if step.command.is_some() && step.argv.is_some() {
        return Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::InvalidNode,
            "step cannot combine command and argv",
        ));
    }
    if let Some(command) = &step.command {
        if command.trim().is_empty() {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "step command must be non-empty after trimming",
            ));
        }
    }
    if let Some(argv) = &step.argv {
        if argv.first().map(|s| s.trim().is_empty()).unwrap_or(true) {
            return Err(BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                "step argv[0] must be non-empty",
            ));
        }
    }
    Ok(())
}

/// Parses `raw` as `steps.<id>.<stdout|stderr>` and checks it against
/// `prior` (the strictly-earlier steps seen so far and their declared
/// capture).
fn validate_step_ref_string(
    raw: &str,
    prior: &HashMap<String, Capture>,
    phase: Phase,
    path: &DottedPath,
) -> Result<(), BuildError> {
    match template::parse_reference(raw) {
        Some(Reference::Steps { id, stream }) => check_prior_step(&id, stream, prior, phase, path),
        _ => Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::StepRefBadFormat,
            format!("stdin reference '{raw}' must match steps.<id>.<stdout|stderr>"),
        )),
    }
}

fn check_prior_step(
    id: &str,
    stream: Stream,
    prior: &HashMap<String, Capture>,
    phase: Phase,
    path: &DottedPath,
) -> Result<(), BuildError> {
    match prior.get(id) {
        None => Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::StepRefUnknown,
            format!("'{id}' is not a strictly prior step in this pipeline"),
        )),
        Some(capture) if !capture.captures(stream) => Err(BuildError::new(
            phase,
            path.display(),
            ErrorKind::StepRefUncaptured,
            format!("step '{id}' does not capture its {stream} stream"),
        )),
        Some(_) => Ok(()),
    }
}

fn validate_step_template_refs(
    step: &RawStep,
    prior: &HashMap<String, Capture>,
    declared_inputs: Option<&ParamDefs>,
    phase: Phase,
    path: &DottedPath,
) -> Result<(), BuildError> {
    let mut texts: Vec<&str> = Vec::new();
    if let Some(command) = &step.command {
        texts.push(command);
    }
    if let Some(argv) = &step.argv {
        texts.extend(argv.iter().map(String::as_str));
    }
    if let Some(cwd) = &step.cwd {
        texts.push(cwd);
    }
    if let Some(env) = &step.env {
        texts.extend(env.values().map(String::as_str));
    }

    for text in texts {
        for reference in scan_refs(text, phase, path)? {
            match reference {
                Reference::Steps { id, stream } => check_prior_step(&id, stream, prior, phase, path)?,
                Reference::Inputs(name) => {
                    if !declares_input(declared_inputs, &name) {
                        return Err(BuildError::new(
                            phase,
                            path.display(),
                            ErrorKind::UnknownInput,
                            format!("'{{{{ inputs.{name} }}}}' references an undeclared input"),
                        ));
                    }
                }
                Reference::Params(_) => {}
            }
        }
    }
    Ok(())
}

fn validate_on_fail(on_fail: &OnFail, phase: Phase, path: &DottedPath) -> Result<(), BuildError> {
    use crate::raw::FailAction;

    let action = on_fail
        .resolve()
        .map_err(|other| {
            BuildError::new(
                phase,
                path.display(),
                ErrorKind::InvalidNode,
                format!("unknown on_fail action '{other}'"),
            )
        })?;

    match action {
        FailAction::Retry => {
            match on_fail.attempts {
                Some(n) if n >= 2 => {}
                _ => {
                    return Err(BuildError::new(
                        phase,
                        path.display(),
                        ErrorKind::InvalidNode,
                        "on_fail.attempts must be >= 2 when action is retry",
                    ));
                }
            }
            if let Some(delay) = &on_fail.delay {
                crate::duration::parse(delay).map_err(|e| {
                    BuildError::new(
                        phase,
                        path.display(),
                        ErrorKind::InvalidNode,
                        format!("invalid on_fail.delay '{delay}': {e}"),
                    )
                })?;
            }
            Ok(())
        }
        FailAction::Fail | FailAction::Continue => {
            if on_fail.attempts.is_some() || on_fail.delay.is_some() {
                return Err(BuildError::new(
                    phase,
                    path.display(),
                    ErrorKind::InvalidNode,
                    "on_fail.attempts/delay are only meaningful when action is retry",
                ));
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node(name: &str) -> RawNode {
        RawNode {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn xor_violation_reports_cannot_combine() {
        let mut n = node("x");
        n.command = Some("go build".to_string());
        n.uses = Some(vec!["t".to_string()]);
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.phase, Phase::Raw);
        assert_eq!(err.path, "x");
        assert!(err.message.contains("cannot combine"));
    }

    #[test]
    fn duplicate_sibling_name_is_rejected() {
        let mut a = node("dup");
        a.command = Some("echo a".to_string());
        let mut b = node("dup");
        b.command = Some("echo b".to_string());
        let err = validate_nodes(&[a, b]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::DuplicateChild);
    }

    #[test]
    fn step_reference_rejected_outside_pipeline() {
        let mut n = node("x");
        n.command = Some("echo {{ steps.a.stdout }}".to_string());
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StepRefUnknown);
    }

    #[test]
    fn stdin_must_reference_strictly_prior_captured_step() {
        let steps = vec![
            RawStep {
                id: Some("list".to_string()),
                argv: Some(vec!["ls".to_string()]),
                capture: Capture::Stdout,
                ..Default::default()
            },
            RawStep {
                argv: Some(vec!["cat".to_string()]),
                stdin: Some("steps.list.stderr".to_string()),
                ..Default::default()
            },
        ];
        let mut n = node("pipe");
        n.steps = Some(steps);
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StepRefUncaptured);
    }

    #[test]
    fn forward_reference_is_unknown_not_future() {
        let steps = vec![
            RawStep {
                argv: Some(vec!["echo".to_string(), "{{ steps.later.stdout }}".to_string()]),
                ..Default::default()
            },
            RawStep {
                id: Some("later".to_string()),
                argv: Some(vec!["ls".to_string()]),
                capture: Capture::Stdout,
                ..Default::default()
            },
        ];
        let mut n = node("pipe");
        n.steps = Some(steps);
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::StepRefUnknown);
    }

    #[test]
    fn retry_requires_attempts_at_least_two() {
        let steps = vec![RawStep {
            argv: Some(vec!["cmd".to_string()]),
            on_fail: OnFail {
                action: "retry".to_string(),
                attempts: Some(1),
                delay: None,
            },
            ..Default::default()
        }];
        let mut n = node("pipe");
        n.steps = Some(steps);
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNode);
    }

    #[test]
    fn valid_pipeline_passes() {
        let steps = vec![
            RawStep {
                id: Some("list".to_string()),
                argv: Some(vec!["ls".to_string()]),
                capture: Capture::Stdout,
                ..Default::default()
            },
            RawStep {
                argv: Some(vec![
                    "echo".to_string(),
                    "{{ steps.list.stdout }}".to_string(),
                ]),
                on_fail: OnFail {
                    action: "retry".to_string(),
                    attempts: Some(3),
                    delay: Some("10ms".to_string()),
                },
                ..Default::default()
            },
        ];
        let mut n = node("pipe");
        n.steps = Some(steps);
        assert!(validate_nodes(&[n]).is_ok());
    }

    #[test]
    fn hyphenated_input_name_is_rejected_with_hint() {
        let mut n = node("x");
        n.command = Some("echo {{ inputs.env_name }}".to_string());
        let mut inputs = ParamDefs::new();
        inputs.insert(
            "env-name".to_string(),
            crate::raw::ParamDecl::Required(crate::raw::RequiredMarker),
        );
        n.inputs = Some(inputs);
        let err = validate_nodes(&[n]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNode);
        assert!(err.hint.unwrap().contains("underscores"));
    }
}
