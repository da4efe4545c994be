use super::{DeclarationError, TypeBuilder, TypeDescriptor};
use indexmap::IndexMap;
use std::{collections::HashMap, sync::Arc};

/// Lookup tables for every declared type.
///
/// A registry is filled during a declaration phase and only read afterwards. Declarations take
/// `&mut self`, so sharing it (e.g. behind an `Arc`) once declarations are done is enough to
/// make concurrent reads safe.
///
/// Besides the lookups by name, the registry owns the implementer maps: for every base type,
/// which wire typenames resolve to which concrete descriptor when decoding a polymorphic
/// object.
#[derive(Debug, Default)]
pub struct Registry {
    by_name: IndexMap<String, Arc<TypeDescriptor>>,
    by_typename: HashMap<String, Arc<TypeDescriptor>>,
    query_roots: HashMap<String, Arc<TypeDescriptor>>,
    mutate_roots: HashMap<String, Arc<TypeDescriptor>>,
    implementers: HashMap<String, IndexMap<String, Arc<TypeDescriptor>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a type from its declaration and registers it.
    ///
    /// If the type extends another one, its typename is registered as an implementer of the
    /// parent and of every ancestor the parent chain has at this moment. Types declared later
    /// somewhere up the chain are not propagated back.
    ///
    /// Nothing is registered unless every check passes.
    pub fn declare(&mut self, builder: TypeBuilder) -> Result<Arc<TypeDescriptor>, DeclarationError> {
        let ancestors = match builder.parent() {
            Some(parent) => self.ancestors(parent)?,
            None => Vec::new(),
        };

        let descriptor = builder.build()?;

        self.ensure_available(&descriptor)?;
        for ancestor in &ancestors {
            self.ensure_implementer_available(ancestor, descriptor.typename())?;
        }

        let descriptor = self.insert(descriptor);

        for ancestor in ancestors {
            self.implementers
                .entry(ancestor)
                .or_default()
                .insert(descriptor.typename().to_string(), descriptor.clone());
        }

        tracing::trace!(
            name = descriptor.name(),
            typename = descriptor.typename(),
            "declared type"
        );

        Ok(descriptor)
    }

    /// Registers an already built descriptor under its names.
    ///
    /// # Returns
    ///
    /// * `Ok(Arc<TypeDescriptor>)` - The shared descriptor, as stored in the registry.
    /// * `Err(DeclarationError::DuplicateRegistration)` - If its declared name, typename or one
    ///   of its root names is already taken.
    pub fn register_type(
        &mut self,
        descriptor: TypeDescriptor,
    ) -> Result<Arc<TypeDescriptor>, DeclarationError> {
        self.ensure_available(&descriptor)?;
        Ok(self.insert(descriptor))
    }

    /// Declares that `concrete` satisfies `base` when the server answers with `typename`.
    ///
    /// Used for relations that inheritance does not express, such as interfaces or unions.
    /// Both types must already be registered, and `typename` cannot be the base's own.
    pub fn register_implementer(
        &mut self,
        base: &TypeDescriptor,
        typename: &str,
        concrete: &Arc<TypeDescriptor>,
    ) -> Result<(), DeclarationError> {
        for name in [base.name(), concrete.name()] {
            if !self.by_name.contains_key(name) {
                return Err(DeclarationError::UnknownType(name.to_string()));
            }
        }

        // The base's own typename always decodes as the base.
        if typename == base.typename() {
            return Err(DeclarationError::DuplicateRegistration {
                kind: "implementer",
                name: format!("{}/{typename}", base.name()),
            });
        }
        self.ensure_implementer_available(base.name(), typename)?;

        self.implementers
            .entry(base.name().to_string())
            .or_default()
            .insert(typename.to_string(), concrete.clone());

        Ok(())
    }

    /// Looks up a type by its query root name, then by its mutation root name.
    pub fn resolve_by_root_name(&self, root: &str) -> Option<&Arc<TypeDescriptor>> {
        self.query_roots
            .get(root)
            .or_else(|| self.mutate_roots.get(root))
    }

    /// Looks up a type by its wire typename, regardless of any base type.
    pub fn resolve_by_wire_name(&self, typename: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_typename.get(typename)
    }

    /// Looks up a type by its declared name.
    pub fn resolve_by_name(&self, name: &str) -> Option<&Arc<TypeDescriptor>> {
        self.by_name.get(name)
    }

    /// Looks up the concrete type registered for `typename` in the implementer map of `base`.
    pub fn resolve_implementer(
        &self,
        base: &TypeDescriptor,
        typename: &str,
    ) -> Option<&Arc<TypeDescriptor>> {
        self.implementers
            .get(base.name())
            .and_then(|implementers| implementers.get(typename))
    }

    /// The implementer map of `base`, in registration order.
    pub fn implementers(
        &self,
        base: &TypeDescriptor,
    ) -> impl Iterator<Item = (&str, &Arc<TypeDescriptor>)> {
        self.implementers
            .get(base.name())
            .into_iter()
            .flat_map(|implementers| implementers.iter().map(|(k, v)| (k.as_str(), v)))
    }

    /// Every registered type, in declaration order.
    pub fn types(&self) -> impl Iterator<Item = &Arc<TypeDescriptor>> {
        self.by_name.values()
    }

    fn ancestors(&self, parent: &str) -> Result<Vec<String>, DeclarationError> {
        let mut chain = Vec::new();
        let mut next = Some(parent);

        while let Some(name) = next {
            let descriptor = self
                .by_name
                .get(name)
                .ok_or_else(|| DeclarationError::UnknownType(name.to_string()))?;
            chain.push(descriptor.name().to_string());
            next = descriptor.parent();
        }

        Ok(chain)
    }

    fn ensure_available(&self, descriptor: &TypeDescriptor) -> Result<(), DeclarationError> {
        let duplicate = |kind, name: &str| DeclarationError::DuplicateRegistration {
            kind,
            name: name.to_string(),
        };

        if self.by_name.contains_key(descriptor.name()) {
            return Err(duplicate("type", descriptor.name()));
        }
        if self.by_typename.contains_key(descriptor.typename()) {
            return Err(duplicate("typename", descriptor.typename()));
        }
        // Decoding looks roots up in both tables, so a name belongs to one type only.
        let root_taken =
            |root: &str| self.query_roots.contains_key(root) || self.mutate_roots.contains_key(root);

        if let Some(root) = descriptor.query_root_name()
            && root_taken(root)
        {
            return Err(duplicate("query root", root));
        }
        if let Some(root) = descriptor.mutate_root_name()
            && root_taken(root)
        {
            return Err(duplicate("mutation root", root));
        }

        Ok(())
    }

    fn ensure_implementer_available(&self, base: &str, typename: &str) -> Result<(), DeclarationError> {
        let taken = self
            .implementers
            .get(base)
            .is_some_and(|implementers| implementers.contains_key(typename));

        if taken {
            return Err(DeclarationError::DuplicateRegistration {
                kind: "implementer",
                name: format!("{base}/{typename}"),
            });
        }

        Ok(())
    }

    fn insert(&mut self, descriptor: TypeDescriptor) -> Arc<TypeDescriptor> {
        let descriptor = Arc::new(descriptor);

        if let Some(root) = descriptor.query_root_name() {
            self.query_roots.insert(root.to_string(), descriptor.clone());
        }
        if let Some(root) = descriptor.mutate_root_name() {
            self.mutate_roots.insert(root.to_string(), descriptor.clone());
        }
        self.by_typename
            .insert(descriptor.typename().to_string(), descriptor.clone());
        self.by_name
            .insert(descriptor.name().to_string(), descriptor.clone());

        descriptor
    }
}
