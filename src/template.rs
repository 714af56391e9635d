//! The template engine (spec.md §4.3).
//!
//! Recognises exactly three `{{ ... }}` reference forms. `params.<name>` is
//! resolved at expansion time; `inputs.<name>` and `steps.<id>.<stream>`
//! are resolved at execution time and must survive expansion byte-for-byte
//! (including any internal whitespace the author wrote) — this module is a
//! single-pass, namespace-aware substitution so the two execution-time
//! namespaces never need a sentinel-escape round trip (spec.md §9).

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

use crate::error::TemplateError;
use crate::raw::Stream;

/// Matches the *entire* `{{ ... }}` span, capturing everything between the
/// braces (not across a `}}`) so the original spacing of the inner content
/// is always recoverable from the match itself.
static TEMPLATE_SPAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{([^{}]*)\}\}").expect("regex"));

/// A single parsed `{{ ... }}` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    /// `{{ params.<name> }}` — resolved at expansion time.
    Params(String),
    /// `{{ inputs.<name> }}` — resolved at execution time.
    Inputs(String),
    /// `{{ steps.<id>.<stream> }}` — resolved at execution time.
    Steps {
        /// Referenced step id.
        id: String,
        /// Referenced stream.
        stream: Stream,
    },
}

/// Parses the trimmed content of one `{{ ... }}` span into a [`Reference`],
/// or `None` if it matches none of the three recognised forms.
#[must_use]
pub fn parse_reference(inner: &str) -> Option<Reference> {
    let inner = inner.trim();
    let (namespace, rest) = inner.split_once('.')?;
    match namespace {
        "params" if !rest.is_empty() && !rest.contains('.') => {
            Some(Reference::Params(rest.to_string()))
        }
        "inputs" if !rest.is_empty() && !rest.contains('.') => {
            Some(Reference::Inputs(rest.to_string()))
        }
        "steps" => {
            let (id, stream) = rest.rsplit_once('.')?;
            let stream: Stream = stream.parse().ok()?;
            if id.is_empty() {
                return None;
            }
            Some(Reference::Steps {
                id: id.to_string(),
                stream,
            })
        }
        _ => None,
    }
}

/// Scans `text` for every `{{ ... }}` span and parses each into a
/// [`Reference`], in left-to-right order.
///
/// # Errors
///
/// Returns [`TemplateError::Unrecognised`] on the first span that matches
/// none of the three forms (e.g. the legacy `{{ .name }}` form).
pub fn scan(text: &str) -> Result<Vec<Reference>, TemplateError> {
    if !text.contains("{{") {
        return Ok(Vec::new());
    }
    let mut refs = Vec::new();
    for caps in TEMPLATE_SPAN.captures_iter(text) {
        let inner = caps.get(1).expect("group 1 always present").as_str();
        match parse_reference(inner) {
            Some(r) => refs.push(r),
            None => return Err(TemplateError::Unrecognised(inner.trim().to_string())),
        }
    }
    Ok(refs)
}

/// Applies the expansion-time substitution pass: `params.<name>` is
/// replaced by its resolved value; `inputs.*` and `steps.*` spans are
/// re-emitted exactly as they were spelled (whitespace included) so they
/// survive to the execution layer; anything else is an error.
///
/// Short-circuits (returns `text` unchanged, without even looking at
/// `params`) when `text` contains no `{{` at all.
///
/// # Errors
///
/// Returns [`TemplateError::UnknownParam`] if a `{{ params.X }}` reference
/// names a key absent from `params`, or [`TemplateError::Unrecognised`] for
/// any other unrecognised `{{ ... }}` content.
pub fn expand_params(text: &str, params: &HashMap<String, String>) -> Result<String, TemplateError> {
    if !text.contains("{{") {
        return Ok(text.to_string());
    }

    let mut error = None;
    let replaced = TEMPLATE_SPAN.replace_all(text, |caps: &regex::Captures<'_>| {
        if error.is_some() {
            return String::new();
        }
        let full = caps.get(0).expect("group 0 always present").as_str();
        let inner = caps.get(1).expect("group 1 always present").as_str();
        match parse_reference(inner) {
            Some(Reference::Params(name)) => match params.get(&name) {
                Some(value) => value.clone(),
                None => {
                    error = Some(TemplateError::UnknownParam(name));
                    String::new()
                }
            },
            Some(Reference::Inputs(_) | Reference::Steps { .. }) => full.to_string(),
            None => {
                error = Some(TemplateError::Unrecognised(inner.trim().to_string()));
                String::new()
            }
        }
    });

    match error {
        Some(e) => Err(e),
        None => Ok(replaced.into_owned()),
    }
}

/// Applies the execution-time substitution pass: `{{ inputs.<name> }}` is
/// replaced from `inputs`, `{{ steps.<id>.<stream> }}` is replaced from
/// `captures` (keyed `"<id>.<stream>"`). Any reference whose key is absent
/// is left as literal text — the raw/runtime validators are responsible
/// for ensuring that does not happen in a well-formed pipeline.
#[must_use]
pub fn resolve_execution_refs(
    text: &str,
    inputs: &HashMap<String, String>,
    captures: &HashMap<String, String>,
) -> String {
    if !text.contains("{{") {
        return text.to_string();
    }
    TEMPLATE_SPAN
        .replace_all(text, |caps: &regex::Captures<'_>| {
            let full = caps.get(0).expect("group 0 always present").as_str();
            let inner = caps.get(1).expect("group 1 always present").as_str();
            match parse_reference(inner) {
                Some(Reference::Inputs(name)) => {
                    inputs.get(&name).cloned().unwrap_or_else(|| full.to_string())
                }
                Some(Reference::Steps { id, stream }) => captures
                    .get(&format!("{id}.{stream}"))
                    .cloned()
                    .unwrap_or_else(|| full.to_string()),
                Some(Reference::Params(_)) | None => full.to_string(),
            }
        })
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fast_path_returns_input_unchanged_with_no_braces() {
        let params = HashMap::new();
        assert_eq!(expand_params("plain text", &params).unwrap(), "plain text");
    }

    #[test]
    fn expand_params_substitutes_params_namespace() {
        let mut params = HashMap::new();
        params.insert("file".to_string(), "dc.yml".to_string());
        let out = expand_params("compose -f {{ params.file }}", &params).unwrap();
        assert_eq!(out, "compose -f dc.yml");
    }

    #[test]
    fn expand_params_preserves_inputs_and_steps_verbatim() {
        let params = HashMap::new();
        let out = expand_params(
            "{{ inputs.env }} and {{steps.build.stdout}}",
            &params,
        )
        .unwrap();
        assert_eq!(out, "{{ inputs.env }} and {{steps.build.stdout}}");
    }

    #[test]
    fn expand_params_errors_on_missing_param() {
        let params = HashMap::new();
        let err = expand_params("{{ params.missing }}", &params).unwrap_err();
        assert_eq!(err, TemplateError::UnknownParam("missing".to_string()));
    }

    #[test]
    fn expand_params_rejects_legacy_dot_form() {
        let params = HashMap::new();
        let err = expand_params("{{ .name }}", &params).unwrap_err();
        assert!(matches!(err, TemplateError::Unrecognised(_)));
    }

    #[test]
    fn scan_finds_all_three_forms_in_order() {
        let refs = scan("{{ params.a }} {{ inputs.b }} {{ steps.c.stdout }}").unwrap();
        assert_eq!(
            refs,
            vec![
                Reference::Params("a".to_string()),
                Reference::Inputs("b".to_string()),
                Reference::Steps {
                    id: "c".to_string(),
                    stream: Stream::Stdout
                },
            ]
        );
    }

    #[test]
    fn resolve_execution_refs_substitutes_inputs_and_steps() {
        let mut inputs = HashMap::new();
        inputs.insert("env".to_string(), "prod".to_string());
        let mut captures = HashMap::new();
        captures.insert("list.stdout".to_string(), "a.txt\nb.txt".to_string());

        let out = resolve_execution_refs(
            "deploy --env {{ inputs.env }}: {{ steps.list.stdout }}",
            &inputs,
            &captures,
        );
        assert_eq!(out, "deploy --env prod: a.txt\nb.txt");
    }

    #[test]
    fn resolve_execution_refs_leaves_unknown_reference_literal() {
        let inputs = HashMap::new();
        let captures = HashMap::new();
        let out = resolve_execution_refs("{{ steps.unknown.stdout }}", &inputs, &captures);
        assert_eq!(out, "{{ steps.unknown.stdout }}");
    }
}
