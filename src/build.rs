//! Glues the three build phases together (spec.md §2's "Data flow" row):
//! merge raw documents → raw validator → expander → runtime validator.

use crate::error::BuildError;
use crate::expand;
use crate::raw::RawDocument;
use crate::registry::TypeRegistry;
use crate::runtime::RuntimeNode;
use crate::validate_raw;
use crate::validate_runtime;

/// Builds a runtime tree from one or more decoded documents.
///
/// Documents are merged per spec.md §6: type names share one namespace
/// across documents (duplicates are an error) and node lists are
/// concatenated in supplied order.
///
/// # Errors
///
/// Returns the first [`BuildError`] encountered across any phase; the build
/// aborts on first error (spec.md §7).
pub fn build(documents: &[RawDocument]) -> Result<RuntimeNode, BuildError> {
    let registry = TypeRegistry::from_documents(documents.iter().map(|d| &d.types))?;
    let nodes: Vec<_> = documents.iter().flat_map(|d| d.nodes.clone()).collect();

    validate_raw::validate_nodes(&nodes)?;
    let root = expand::expand(&nodes, &registry)?;
    validate_runtime::validate_root(&root)?;

    Ok(RuntimeNode::Container(root))
}
