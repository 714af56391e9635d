//! A decoded raw document: an optional type library plus an ordered node
//! list. Multiple documents are merged before validation (spec.md §6):
//! type names across documents share one namespace (duplicates are an
//! error, caught by [`crate::registry::TypeRegistry::register`]), and node
//! lists are concatenated in supplied order.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::node::{RawNode, TypeBody};

/// One decoded input document.
///
/// Accepts both the full form (`{types: {...}, nodes: [...]}`) and the
/// shorthand form (a bare node list), matching the engine-to-parser
/// contract in spec.md §6.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "DocumentRepr")]
pub struct RawDocument {
    /// Named, reusable type bodies declared by this document.
    pub types: HashMap<String, TypeBody>,
    /// Top-level nodes declared by this document.
    pub nodes: Vec<RawNode>,
}

/// Wire-level shape `RawDocument` deserializes through: either the full
/// form or the bare-list shorthand.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum DocumentRepr {
    Shorthand(Vec<RawNode>),
    Full {
        #[serde(default)]
        types: HashMap<String, TypeBody>,
        #[serde(default)]
        nodes: Vec<RawNode>,
    },
}

impl From<DocumentRepr> for RawDocument {
    fn from(repr: DocumentRepr) -> Self {
        match repr {
            DocumentRepr::Shorthand(nodes) => Self {
                types: HashMap::new(),
                nodes,
            },
            DocumentRepr::Full { types, nodes } => Self { types, nodes },
        }
    }
}

impl RawDocument {
    /// Creates a document with an explicit type map and node list.
    #[must_use]
    pub fn new(types: HashMap<String, TypeBody>, nodes: Vec<RawNode>) -> Self {
        Self { types, nodes }
    }

    /// Creates a type-less document from a bare node list (the shorthand
    /// form).
    #[must_use]
    pub fn from_nodes(nodes: Vec<RawNode>) -> Self {
        Self {
            types: HashMap::new(),
            nodes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shorthand_form_deserializes_to_typeless_document() {
        let yaml = "- name: x\n  command: echo hi\n";
        let doc: RawDocument = serde_yaml::from_str(yaml).unwrap();
        assert!(doc.types.is_empty());
        assert_eq!(doc.nodes.len(), 1);
        assert_eq!(doc.nodes[0].name, "x");
    }

    #[test]
    fn full_form_deserializes_types_and_nodes() {
        let yaml = "types:\n  t:\n    command: echo ok\nnodes:\n  - name: x\n    uses: [t]\n";
        let doc: RawDocument = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(doc.types.len(), 1);
        assert_eq!(doc.nodes.len(), 1);
    }
}
