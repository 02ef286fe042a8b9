//! # Namespace Registry
//!
//! Prefix <-> namespace bindings owned by one store handle. Nothing here is
//! persisted; the registry lives as long as the open handle.
//!
//! The mapping is kept one-to-one: binding a prefix or a namespace that is
//! already bound replaces the old binding (last write wins).

/// Insertion-ordered prefix/namespace bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NamespaceRegistry {
    bindings: Vec<(String, String)>,
}

impl NamespaceRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `prefix` to `namespace`, dropping any binding that used either.
    pub fn bind(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        let prefix = prefix.into();
        let namespace = namespace.into();
        self.bindings
            .retain(|(p, ns)| *p != prefix && *ns != namespace);
        self.bindings.push((prefix, namespace));
    }

    /// Namespace bound to `prefix`.
    #[must_use]
    pub fn namespace(&self, prefix: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(p, _)| p == prefix)
            .map(|(_, ns)| ns.as_str())
    }

    /// Prefix bound to `namespace`.
    #[must_use]
    pub fn prefix(&self, namespace: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, ns)| ns == namespace)
            .map(|(p, _)| p.as_str())
    }

    /// All `(prefix, namespace)` pairs in the order they were bound.
    pub fn namespaces(&self) -> Bindings<'_> {
        Bindings {
            inner: self.bindings.iter(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Drop every binding.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

/// Lazy iterator over a registry's bindings, borrowed from it.
#[derive(Debug, Clone)]
pub struct Bindings<'a> {
    inner: std::slice::Iter<'a, (String, String)>,
}

impl<'a> Iterator for Bindings<'a> {
    type Item = (&'a str, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(p, ns)| (p.as_str(), ns.as_str()))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl ExactSizeIterator for Bindings<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_both_directions() {
        let mut registry = NamespaceRegistry::new();
        registry.bind("schema", "https://schema.org/");

        assert_eq!(registry.namespace("schema"), Some("https://schema.org/"));
        assert_eq!(registry.prefix("https://schema.org/"), Some("schema"));
        assert_eq!(registry.namespace("ex"), None);
        assert_eq!(registry.prefix("https://example.com/"), None);
    }

    #[test]
    fn rebinding_prefix_replaces_namespace() {
        let mut registry = NamespaceRegistry::new();
        registry.bind("ex", "https://example.com/");
        registry.bind("ex", "https://example.org/");

        assert_eq!(registry.namespace("ex"), Some("https://example.org/"));
        assert_eq!(registry.prefix("https://example.com/"), None);
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn rebinding_namespace_replaces_prefix() {
        let mut registry = NamespaceRegistry::new();
        registry.bind("ex", "https://example.com/");
        registry.bind("eg", "https://example.com/");

        assert_eq!(registry.prefix("https://example.com/"), Some("eg"));
        assert_eq!(registry.namespace("ex"), None);
    }

    #[test]
    fn iteration_follows_insertion_order_and_restarts() {
        let mut registry = NamespaceRegistry::new();
        registry.bind("z", "urn:z:");
        registry.bind("a", "urn:a:");
        registry.bind("m", "urn:m:");

        let first: Vec<_> = registry.namespaces().collect();
        let second: Vec<_> = registry.namespaces().collect();
        assert_eq!(first, vec![("z", "urn:z:"), ("a", "urn:a:"), ("m", "urn:m:")]);
        assert_eq!(first, second);
    }
}
