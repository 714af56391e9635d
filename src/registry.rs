//! The type registry: a name → type-body map the expander consults when a
//! node `uses` an abstract type (spec.md §4.2).

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{BuildError, ErrorKind, Phase};
use crate::path::DottedPath;
use crate::raw::TypeBody;

/// Holds every type declared across one or more merged documents.
///
/// Registration is the only place duplicate type names are rejected; once
/// built, lookups are infallible with respect to the registry itself (an
/// unresolved `uses` entry is a separate, per-node error raised by the
/// expander).
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: HashMap<String, Arc<TypeBody>>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `body` under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::TypeAlreadyExists` if `name` is already
    /// registered (across any prior document); type names share one
    /// namespace regardless of which document declared them.
    pub fn register(&mut self, name: impl Into<String>, body: TypeBody) -> Result<(), BuildError> {
        let name = name.into();
        let path = DottedPath::root().child(&name);
        if self.types.contains_key(&name) {
            return Err(BuildError::new(
                Phase::Raw,
                path.display(),
                ErrorKind::TypeAlreadyExists,
                format!("type '{name}' is already registered"),
            ));
        }
        crate::validate_raw::validate_param_defs(&body.params, Phase::Raw, &path)?;
        self.types.insert(name, Arc::new(body));
        Ok(())
    }

    /// Builds a registry from every document's type map in order, failing
    /// on the first duplicate name encountered.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::TypeAlreadyExists` for the first duplicate.
    pub fn from_documents<'a>(
        documents: impl IntoIterator<Item = &'a HashMap<String, TypeBody>>,
    ) -> Result<Self, BuildError> {
        let mut registry = Self::new();
        for types in documents {
            for (name, body) in types {
                registry.register(name.clone(), body.clone())?;
            }
        }
        Ok(registry)
    }

    /// Looks up a type by exact name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<TypeBody>> {
        self.types.get(name).cloned()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Number of registered types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns `true` if no types are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::RawNode;

    fn body(command: &str) -> TypeBody {
        TypeBody {
            node: RawNode {
                command: Some(command.to_string()),
                ..Default::default()
            },
            params: HashMap::new(),
        }
    }

    #[test]
    fn register_then_get_round_trips() {
        let mut registry = TypeRegistry::new();
        registry.register("docker-build", body("docker build .")).unwrap();
        assert!(registry.contains("docker-build"));
        assert_eq!(registry.len(), 1);
        assert!(registry.get("missing").is_none());
    }

    #[test]
    fn register_rejects_duplicate_name() {
        let mut registry = TypeRegistry::new();
        registry.register("t", body("echo a")).unwrap();
        let err = registry.register("t", body("echo b")).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeAlreadyExists);
    }

    #[test]
    fn register_rejects_hyphenated_param_name_with_hint() {
        let mut registry = TypeRegistry::new();
        let mut params = HashMap::new();
        params.insert(
            "docker-file".to_string(),
            crate::raw::ParamDecl::Default(crate::raw::ParamValue::String("Dockerfile".to_string())),
        );
        let body = TypeBody {
            node: RawNode {
                command: Some("docker build".to_string()),
                ..Default::default()
            },
            params,
        };
        let err = registry.register("t", body).unwrap_err();
        assert_eq!(err.kind, ErrorKind::InvalidNode);
        assert!(err.hint.unwrap().contains("underscores"));
    }

    #[test]
    fn from_documents_merges_and_rejects_cross_document_duplicate() {
        let mut first = HashMap::new();
        first.insert("a".to_string(), body("echo a"));
        let mut second = HashMap::new();
        second.insert("a".to_string(), body("echo dup"));

        let err = TypeRegistry::from_documents([&first, &second]).unwrap_err();
        assert_eq!(err.kind, ErrorKind::TypeAlreadyExists);
    }
}
