//! The raw, user-authored node shape: a `RawNode` is exactly one of a
//! command, a set of children, a `uses` delegation, or a pipeline's steps
//! (the XOR rule enforced by [`crate::validate_raw`]).

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::step::RawStep;

/// A caller- or type-supplied parameter value before it has been
/// normalised to a `String` for template substitution (spec: "numeric
/// scalars stringified").
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamValue {
    /// A string value, used verbatim.
    String(String),
    /// A YAML/JSON integer value.
    Int(i64),
    /// A YAML/JSON floating point value.
    Float(f64),
    /// A YAML/JSON boolean value.
    Bool(bool),
}

impl ParamValue {
    /// Normalises any scalar form to the string form templates operate on.
    #[must_use]
    pub fn into_string(self) -> String {
        match self {
            Self::String(s) => s,
            Self::Int(i) => i.to_string(),
            Self::Float(f) => f.to_string(),
            Self::Bool(b) => b.to_string(),
        }
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

/// A single `with.per_type` entry: parameters destined for one specific
/// type among a node's `uses` list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PerTypeParams {
    /// Name of the type these params apply to. Must be non-empty and must
    /// appear in the owning node's `uses` list.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Parameter values for that type.
    #[serde(default)]
    pub params: HashMap<String, ParamValue>,
}

/// The caller-side parameter carrier attached to an abstract node, in
/// either shared or per-type form. Exactly one of the two variants is
/// meaningful for a given node; both may be empty maps/lists but the field
/// presence distinguishes "no with block" (`None` on [`RawNode::with`])
/// from "a with block with nothing in it" (structurally valid but pointless).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WithBlock {
    /// Parameters applied to every type in the node's `uses` list.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub shared: HashMap<String, ParamValue>,
    /// Parameters applied only to the named type.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub per_type: Vec<PerTypeParams>,
}

/// A declared parameter: either required (caller must supply a value) or
/// defaulted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParamDecl {
    /// No default; the caller must supply a value or expansion fails with
    /// `missing-param`.
    Required(RequiredMarker),
    /// A default value used when the caller does not supply one.
    Default(ParamValue),
}

/// Marker type so `required` can be spelled as a bare YAML/JSON `null` or
/// the literal string `"required"`, matching how the teacher's own
/// `Option`-shaped declarations read in example documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Option<String>", into = "Option<String>")]
pub struct RequiredMarker;

impl TryFrom<Option<String>> for RequiredMarker {
    type Error = String;

    fn try_from(value: Option<String>) -> Result<Self, Self::Error> {
        match value.as_deref() {
            None | Some("required") => Ok(Self),
            Some(other) => Err(format!(
                "expected null or \"required\" for a parameter with no default, got \"{other}\""
            )),
        }
    }
}

impl From<RequiredMarker> for Option<String> {
    fn from(_: RequiredMarker) -> Self {
        None
    }
}

/// A type's (or node's) declared parameter set: name → required/default.
pub type ParamDefs = HashMap<String, ParamDecl>;

/// A single `uses` entry is just a type name; ordering within the list is
/// significant (it is the order children are generated in).
pub type UsesList = Vec<String>;

/// The raw, pre-expansion node shape.
///
/// Exactly one of `{command-or-argv, children, uses, steps}` may be
/// populated — enforced by [`crate::validate_raw`], not by this type, so
/// that a document's author-time shape is preserved byte-for-byte for
/// error reporting.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawNode {
    /// Node name. Non-empty, case-sensitive, unique among direct siblings.
    #[serde(default)]
    pub name: String,
    /// Single-string command form (split on whitespace after substitution).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    /// Token-list command form (kept verbatim, no further splitting).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub argv: Option<Vec<String>>,
    /// Working directory override.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<String>,
    /// Environment variable overlay.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub env: Option<HashMap<String, String>>,
    /// Child nodes (container form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<RawNode>>,
    /// Type names this node delegates to (abstract-node form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uses: Option<UsesList>,
    /// Pipeline steps (pipeline form).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub steps: Option<Vec<RawStep>>,
    /// Caller-side parameters for this node's `uses` targets.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub with: Option<WithBlock>,
    /// Declared inputs (runnable/pipeline nodes only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<ParamDefs>,
}

impl RawNode {
    /// Returns `true` if this node has a command populated (either form).
    #[must_use]
    pub fn has_command(&self) -> bool {
        self.command.is_some() || self.argv.is_some()
    }

    /// Counts how many of the four structural buckets are populated.
    /// A value other than 1 is an XOR violation.
    #[must_use]
    pub fn structural_bucket_count(&self) -> usize {
        usize::from(self.has_command())
            + usize::from(self.children.is_some())
            + usize::from(self.uses.is_some())
            + usize::from(self.steps.is_some())
    }
}

/// A type body: a `RawNode` plus the parameters it declares.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TypeBody {
    /// The node produced when this type is expanded.
    #[serde(flatten)]
    pub node: RawNode,
    /// Parameters this type accepts.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub params: ParamDefs,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn structural_bucket_count_detects_xor_violation() {
        let mut node = RawNode {
            name: "x".into(),
            command: Some("go build".into()),
            ..Default::default()
        };
        assert_eq!(node.structural_bucket_count(), 1);

        node.uses = Some(vec!["t".into()]);
        assert_eq!(node.structural_bucket_count(), 2);
    }

    #[test]
    fn param_value_stringifies_numeric_scalars() {
        assert_eq!(ParamValue::Int(42).into_string(), "42");
        assert_eq!(ParamValue::Bool(true).into_string(), "true");
        assert_eq!(ParamValue::String("dev".into()).into_string(), "dev");
    }

    #[test]
    fn required_marker_accepts_null_or_required_string() {
        let decl: ParamDecl = serde_json::from_str("null").unwrap();
        assert!(matches!(decl, ParamDecl::Required(_)));

        let decl: ParamDecl = serde_json::from_str("\"required\"").unwrap();
        assert!(matches!(decl, ParamDecl::Required(_)));

        let decl: ParamDecl = serde_json::from_str("\"dev\"").unwrap();
        assert!(matches!(decl, ParamDecl::Default(ParamValue::String(s)) if s == "dev"));
    }
}
