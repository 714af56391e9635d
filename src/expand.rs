//! The expander (spec.md §4.4): turns the raw node list into a single root
//! [`Container`] by resolving `uses` delegations against the [`TypeRegistry`],
//! substituting `{{ params.* }}` references, and detecting `uses` cycles.
//!
//! Every rule here re-validates a type body's raw shape with
//! [`crate::validate_raw`], phase re-tagged as [`Phase::Expand`] — see that
//! module's doc comment.

use std::collections::{HashMap, HashSet};

use crate::error::{BuildError, ErrorKind, Phase};
use crate::path::DottedPath;
use crate::raw::{
    ParamDecl, ParamValue, PerTypeParams, RawNode, RawStep, TypeBody, WithBlock,
};
use crate::registry::TypeRegistry;
use crate::runtime::{Container, Pipeline, PipelineStep, Runnable, RuntimeNode, StepRef};
use crate::template::{self, Reference};
use crate::validate_raw;

/// Expands a top-level node list into the root [`Container`] (spec.md
/// §4.4's entry point).
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered, tagged `phase=expand`.
pub fn expand(nodes: &[RawNode], registry: &TypeRegistry) -> Result<Container, BuildError> {
    let mut children = Vec::new();
    let mut stack: Vec<String> = Vec::new();
    for node in nodes {
        let path = DottedPath::root().child(&node.name);
        children.push(expand_one(node, &HashMap::new(), &path, registry, &mut stack)?);
    }
    check_duplicate_siblings(&children, &DottedPath::root())?;
    Ok(Container {
        name: "root".to_string(),
        children,
    })
}

/// Expands one raw node, given the parameter map resolved for it (empty for
/// a plain top-level/children-bucket node; the resolved `uses` params when
/// this call represents a type body being instantiated).
fn expand_one(
    raw: &RawNode,
    params: &HashMap<String, String>,
    path: &DottedPath,
    registry: &TypeRegistry,
    stack: &mut Vec<String>,
) -> Result<RuntimeNode, BuildError> {
    let substituted = substitute_node(raw, params, path)?;
    validate_raw::validate_node(&substituted, Phase::Expand, path)?;

    if substituted.has_command() {
        Ok(RuntimeNode::Runnable(build_runnable(&substituted)))
    } else if let Some(steps) = &substituted.steps {
        Ok(RuntimeNode::Pipeline(build_pipeline(&substituted, steps)))
    } else if let Some(uses) = &substituted.uses {
        expand_uses(&substituted, uses, path, registry, stack)
    } else if let Some(children) = &substituted.children {
        let mut out = Vec::new();
        for child in children {
            let child_path = path.child(&child.name);
            out.push(expand_one(child, &HashMap::new(), &child_path, registry, stack)?);
        }
        check_duplicate_siblings(&out, path)?;
        Ok(RuntimeNode::Container(Container {
            name: substituted.name.clone(),
            children: out,
        }))
    } else {
        unreachable!("validate_node guarantees exactly one structural bucket is populated")
    }
}

/// Handles a node's `uses` delegation: the single-use name-override
/// shortcut, or a multi-use container (spec.md §4.4 points 2-3).
///
/// The raw model's XOR rule means a node with `uses` set never also has its
/// own `children`; "mixed" multi-use/children assembly described loosely in
/// spec.md §4.4 point 3 is therefore read here as "multiple `uses` entries,
/// each contributing one child" (see DESIGN.md for this reading).
fn expand_uses(
    node: &RawNode,
    uses: &[String],
    path: &DottedPath,
    registry: &TypeRegistry,
    stack: &mut Vec<String>,
) -> Result<RuntimeNode, BuildError> {
    validate_per_type_membership(node, uses, path)?;

    if uses.len() == 1 {
        let expanded = expand_type_use(node, &uses[0], path, registry, stack)?;
        Ok(rename(expanded, &node.name))
    } else {
        let mut out = Vec::new();
        for type_name in uses {
            let child_path = path.child(type_name);
            out.push(expand_type_use(node, type_name, &child_path, registry, stack)?);
        }
        check_duplicate_siblings(&out, path)?;
        Ok(RuntimeNode::Container(Container {
            name: node.name.clone(),
            children: out,
        }))
    }
}

/// Expands one `uses` entry: looks up the type, resolves its parameters,
/// pushes it onto the cycle-detection stack, and recursively expands its
/// body.
fn expand_type_use(
    node: &RawNode,
    type_name: &str,
    path: &DottedPath,
    registry: &TypeRegistry,
    stack: &mut Vec<String>,
) -> Result<RuntimeNode, BuildError> {
    let type_body: std::sync::Arc<TypeBody> = registry.get(type_name).ok_or_else(|| {
        BuildError::new(
            Phase::Expand,
            path.display(),
            ErrorKind::UnknownType,
            format!("unknown type '{type_name}'"),
        )
    })?;

    if stack.iter().any(|t| t == type_name) {
        return Err(BuildError::new(
            Phase::Expand,
            path.display(),
            ErrorKind::CycleDetected,
            format!("cycle detected: '{type_name}' is already being expanded"),
        ));
    }

    let resolved = resolve_params(node, type_name, &type_body.params, path)?;

    stack.push(type_name.to_string());
    let result = expand_one(&type_body.node, &resolved, path, registry, stack);
    stack.pop();
    result
}

/// Every `with.per_type` entry must name a type present in this node's
/// `uses` list (spec.md §4.4.1).
fn validate_per_type_membership(
    node: &RawNode,
    uses: &[String],
    path: &DottedPath,
) -> Result<(), BuildError> {
    let Some(with) = &node.with else {
        return Ok(());
    };
    for entry in &with.per_type {
        if !uses.iter().any(|u| u == &entry.type_name) {
            return Err(BuildError::new(
                Phase::Expand,
                path.display(),
                ErrorKind::InvalidNode,
                format!(
                    "with.per_type entry references type '{}', which is not in this node's uses list",
                    entry.type_name
                ),
            ));
        }
    }
    Ok(())
}

/// Resolves the parameter map for one `uses` entry (spec.md §4.4.1):
/// caller-supplied `with.shared` + the matching `with.per_type` entry,
/// falling back to each declared parameter's default, erroring on anything
/// missing or unrecognised.
fn resolve_params(
    node: &RawNode,
    type_name: &str,
    type_params: &crate::raw::ParamDefs,
    path: &DottedPath,
) -> Result<HashMap<String, String>, BuildError> {
    let mut caller: HashMap<String, String> = HashMap::new();
    if let Some(with) = &node.with {
        for (k, v) in &with.shared {
            caller.insert(k.clone(), v.clone().into_string());
        }
        if let Some(entry) = with.per_type.iter().find(|e| e.type_name == type_name) {
            for (k, v) in &entry.params {
                caller.insert(k.clone(), v.clone().into_string());
            }
        }
    }

    for key in caller.keys() {
        if !type_params.contains_key(key) {
            return Err(BuildError::new(
                Phase::Expand,
                path.display(),
                ErrorKind::UnknownParam,
                format!("'{key}' is not a declared parameter of type '{type_name}'"),
            ));
        }
    }

    let mut resolved = HashMap::new();
    for (name, decl) in type_params {
        match caller.get(name) {
            Some(v) => {
                resolved.insert(name.clone(), v.clone());
            }
            None => match decl {
                ParamDecl::Default(v) => {
                    resolved.insert(name.clone(), v.clone().into_string());
                }
                ParamDecl::Required(_) => {
                    return Err(BuildError::new(
                        Phase::Expand,
                        path.display(),
                        ErrorKind::MissingParam,
                        format!("missing required parameter '{name}' for type '{type_name}'"),
                    ));
                }
            },
        }
    }
    Ok(resolved)
}

/// Renames the top of an expanded node, used by the single-use
/// name-override shortcut.
fn rename(node: RuntimeNode, new_name: &str) -> RuntimeNode {
    match node {
        RuntimeNode::Container(mut c) => {
            c.name = new_name.to_string();
            RuntimeNode::Container(c)
        }
        RuntimeNode::Runnable(mut r) => {
            r.name = new_name.to_string();
            RuntimeNode::Runnable(r)
        }
        RuntimeNode::Pipeline(mut p) => {
            p.name = new_name.to_string();
            RuntimeNode::Pipeline(p)
        }
    }
}

fn check_duplicate_siblings(children: &[RuntimeNode], path: &DottedPath) -> Result<(), BuildError> {
    let mut seen = HashSet::new();
    for child in children {
        if !seen.insert(child.name()) {
            return Err(BuildError::new(
                Phase::Expand,
                path.display(),
                ErrorKind::DuplicateChild,
                format!("duplicate child name '{}'", child.name()),
            ));
        }
    }
    Ok(())
}

fn build_runnable(node: &RawNode) -> Runnable {
    let argv = materialise_argv(node.command.as_deref(), node.argv.as_deref());
    Runnable {
        name: node.name.clone(),
        argv,
        cwd: node.cwd.clone(),
        env: node.env.clone().unwrap_or_default(),
        inputs: node.inputs.clone().unwrap_or_default(),
    }
}

fn build_pipeline(node: &RawNode, steps: &[RawStep]) -> Pipeline {
    Pipeline {
        name: node.name.clone(),
        steps: steps.iter().map(build_step).collect(),
        inputs: node.inputs.clone().unwrap_or_default(),
    }
}

fn build_step(step: &RawStep) -> PipelineStep {
    let argv = materialise_argv(step.command.as_deref(), step.argv.as_deref());
    let stdin = step.stdin.as_deref().map(|raw| {
        match template::parse_reference(raw) {
            Some(Reference::Steps { id, stream }) => StepRef { step_id: id, stream },
            _ => unreachable!("raw validation rejects a malformed stdin reference"),
        }
    });
    PipelineStep {
        id: step.id.clone(),
        argv,
        cwd: step.cwd.clone(),
        env: step.env.clone().unwrap_or_default(),
        capture: step.capture,
        tee: step.tee,
        stdin,
        on_fail: step.on_fail.clone(),
    }
}

/// A single-string `command` is split on whitespace (no shell quoting
/// honoured, per spec.md §9's open question); an `argv` list is kept
/// verbatim.
fn materialise_argv(command: Option<&str>, argv: Option<&[String]>) -> Vec<String> {
    match (command, argv) {
        (Some(cmd), None) => cmd.split_whitespace().map(str::to_string).collect(),
        (None, Some(argv)) => argv.to_vec(),
        _ => unreachable!("raw validation enforces exactly one of command/argv"),
    }
}

fn expand_text(text: &str, params: &HashMap<String, String>, path: &DottedPath) -> Result<String, BuildError> {
    template::expand_params(text, params).map_err(|e| {
        let kind = match &e {
            crate::error::TemplateError::UnknownParam(_) => ErrorKind::UnknownParam,
            crate::error::TemplateError::Unrecognised(_) => ErrorKind::InvalidNode,
        };
        BuildError::new(Phase::Expand, path.display(), kind, e.to_string())
    })
}

/// Applies the expansion-time substitution pass across every string-valued
/// field of a raw node and its children, recursively (spec.md §4.3) —
/// `name`, `command`, each `argv` token, `cwd`, each `env` value, every
/// `with` value (so templated params propagate into nested expansions),
/// and every step field except `id` and `stdin`.
fn substitute_node(
    node: &RawNode,
    params: &HashMap<String, String>,
    path: &DottedPath,
) -> Result<RawNode, BuildError> {
    let mut out = node.clone();
    out.name = expand_text(&node.name, params, path)?;

    if let Some(command) = &node.command {
        out.command = Some(expand_text(command, params, path)?);
    }
    if let Some(argv) = &node.argv {
        out.argv = Some(
            argv.iter()
                .map(|t| expand_text(t, params, path))
                .collect::<Result<_, _>>()?,
        );
    }
    if let Some(cwd) = &node.cwd {
        out.cwd = Some(expand_text(cwd, params, path)?);
    }
    if let Some(env) = &node.env {
        let mut new_env = HashMap::new();
        for (k, v) in env {
            new_env.insert(k.clone(), expand_text(v, params, path)?);
        }
        out.env = Some(new_env);
    }
    if let Some(with) = &node.with {
        out.with = Some(substitute_with(with, params, path)?);
    }
    if let Some(children) = &node.children {
        out.children = Some(
            children
                .iter()
                .map(|c| substitute_node(c, params, path))
                .collect::<Result<_, _>>()?,
        );
    }
    if let Some(steps) = &node.steps {
        out.steps = Some(
            steps
                .iter()
                .map(|s| substitute_step(s, params, path))
                .collect::<Result<_, _>>()?,
        );
    }
    Ok(out)
}

fn substitute_with(
    with: &WithBlock,
    params: &HashMap<String, String>,
    path: &DottedPath,
) -> Result<WithBlock, BuildError> {
    let mut out = WithBlock::default();
    for (k, v) in &with.shared {
        let substituted = expand_text(&v.clone().into_string(), params, path)?;
        out.shared.insert(k.clone(), ParamValue::String(substituted));
    }
    for entry in &with.per_type {
        let mut new_params = HashMap::new();
        for (k, v) in &entry.params {
            let substituted = expand_text(&v.clone().into_string(), params, path)?;
            new_params.insert(k.clone(), ParamValue::String(substituted));
        }
        out.per_type.push(PerTypeParams {
            type_name: entry.type_name.clone(),
            params: new_params,
        });
    }
    Ok(out)
}

fn substitute_step(
    step: &RawStep,
    params: &HashMap<String, String>,
    path: &DottedPath,
) -> Result<RawStep, BuildError> {
    let mut out = step.clone();
    if let Some(command) = &step.command {
        out.command = Some(expand_text(command, params, path)?);
    }
    if let Some(argv) = &step.argv {
        out.argv = Some(
            argv.iter()
                .map(|t| expand_text(t, params, path))
                .collect::<Result<_, _>>()?,
        );
    }
    if let Some(cwd) = &step.cwd {
        out.cwd = Some(expand_text(cwd, params, path)?);
    }
    if let Some(env) = &step.env {
        let mut new_env = HashMap::new();
        for (k, v) in env {
            new_env.insert(k.clone(), expand_text(v, params, path)?);
        }
        out.env = Some(new_env);
    }
    Ok(out)
}
