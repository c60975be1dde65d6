//! Resource registry mapping resource names to handlers
//!
//! Handlers are registered during initialization. Once the API starts serving,
//! the registry is moved behind an `Arc` and only read.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::codec::{Codec, JsonCodec};
use crate::error::{Error, Result};
use crate::handlers::{DynResourceHandler, ResourceHandler};

/// What to do when a resource name is registered twice
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Fail with [`Error::DuplicateResource`]
    #[default]
    Reject,
    /// Replace the existing handler
    Overwrite,
}

/// Registry of resource handlers keyed by resource name
pub struct ResourceRegistry<C: Codec = JsonCodec> {
    handlers: HashMap<String, Arc<dyn DynResourceHandler<C>>>,
    policy: DuplicatePolicy,
}

impl<C: Codec> ResourceRegistry<C> {
    /// Create an empty registry that rejects duplicate names
    pub fn new() -> Self {
        Self::with_policy(DuplicatePolicy::default())
    }

    /// Create an empty registry with the given duplicate policy
    pub fn with_policy(policy: DuplicatePolicy) -> Self {
        Self {
            handlers: HashMap::new(),
            policy,
        }
    }

    /// Duplicate policy in effect
    pub fn policy(&self) -> DuplicatePolicy {
        self.policy
    }

    /// Register a handler under its resource name
    pub fn register<H>(&mut self, handler: H) -> Result<()>
    where
        H: ResourceHandler,
    {
        self.register_arc(Arc::new(handler))
    }

    /// Register a handler that is already shared
    pub fn register_arc(&mut self, handler: Arc<dyn DynResourceHandler<C>>) -> Result<()> {
        let name = handler.name().to_string();
        validate_name(&name)?;

        if self.handlers.contains_key(&name) {
            match self.policy {
                DuplicatePolicy::Reject => {
                    tracing::error!(resource = %name, "Resource is already registered");
                    return Err(Error::DuplicateResource(name));
                }
                DuplicatePolicy::Overwrite => {
                    tracing::warn!(resource = %name, "Replacing registered resource handler");
                }
            }
        }

        tracing::info!(
            resource = %name,
            versions = ?handler.supported_versions(),
            "Registered resource handler"
        );
        self.handlers.insert(name, handler);
        Ok(())
    }

    /// Look up the handler for a resource name
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn DynResourceHandler<C>>> {
        self.handlers
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownResource(name.to_string()))
    }

    /// Whether a handler is registered under `name`
    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Registered resource names, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Number of registered resources
    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    /// Whether no resource is registered
    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl<C: Codec> Default for ResourceRegistry<C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: Codec> fmt::Debug for ResourceRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("resources", &self.names())
            .field("policy", &self.policy)
            .finish()
    }
}

// A resource name is a single path segment
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.contains('/') {
        return Err(Error::InvalidResourceName(name.to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Named(&'static str);

    impl ResourceHandler for Named {
        type Resource = String;
        type Input = serde::de::IgnoredAny;

        fn resource_name(&self) -> &str {
            self.0
        }
    }

    struct Versioned;

    impl ResourceHandler for Versioned {
        type Resource = String;
        type Input = serde::de::IgnoredAny;

        fn resource_name(&self) -> &str {
            "myresource"
        }

        fn versions(&self) -> &[&'static str] {
            &["v2"]
        }
    }

    #[test]
    fn test_register_and_resolve() {
        let mut registry: ResourceRegistry = ResourceRegistry::new();
        registry.register(Named("myresource")).unwrap();

        let handler = registry.resolve("myresource").unwrap();
        assert_eq!(handler.name(), "myresource");
        assert!(registry.contains("myresource"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_returns_registered_instance() {
        let mut registry: ResourceRegistry = ResourceRegistry::new();
        let handler = Arc::new(Named("myresource"));
        registry.register_arc(handler.clone()).unwrap();

        let resolved = registry.resolve("myresource").unwrap();
        assert_eq!(
            Arc::as_ptr(&resolved) as *const (),
            Arc::as_ptr(&handler) as *const ()
        );
    }

    #[test]
    fn test_unknown_resource() {
        let registry: ResourceRegistry = ResourceRegistry::new();
        assert!(registry.is_empty());
        match registry.resolve("missing") {
            Err(Error::UnknownResource(name)) => assert_eq!(name, "missing"),
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("resolved an unregistered resource"),
        }
    }

    #[test]
    fn test_duplicate_rejected_by_default() {
        let mut registry: ResourceRegistry = ResourceRegistry::new();
        registry.register(Named("myresource")).unwrap();

        let err = registry.register(Versioned).unwrap_err();
        assert!(matches!(err, Error::DuplicateResource(ref n) if n == "myresource"));

        // First registration is untouched
        let handler = registry.resolve("myresource").unwrap();
        assert!(handler.supported_versions().is_empty());
    }

    #[test]
    fn test_duplicate_overwrites_when_configured() {
        let mut registry: ResourceRegistry = ResourceRegistry::with_policy(DuplicatePolicy::Overwrite);
        registry.register(Named("myresource")).unwrap();
        registry.register(Versioned).unwrap();

        assert_eq!(registry.len(), 1);
        let handler = registry.resolve("myresource").unwrap();
        assert_eq!(handler.supported_versions(), &["v2"]);
    }

    #[test]
    fn test_invalid_names() {
        let mut registry: ResourceRegistry = ResourceRegistry::new();
        assert!(matches!(
            registry.register(Named("")),
            Err(Error::InvalidResourceName(_))
        ));
        assert!(matches!(
            registry.register(Named("a/b")),
            Err(Error::InvalidResourceName(_))
        ));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_names_sorted() {
        let mut registry: ResourceRegistry = ResourceRegistry::new();
        registry.register(Named("zebras")).unwrap();
        registry.register(Named("apples")).unwrap();
        assert_eq!(registry.names(), vec!["apples", "zebras"]);
    }

    #[test]
    fn test_policy_deserializes_lowercase() {
        let policy: DuplicatePolicy = serde_json::from_str("\"overwrite\"").unwrap();
        assert_eq!(policy, DuplicatePolicy::Overwrite);
    }
}
