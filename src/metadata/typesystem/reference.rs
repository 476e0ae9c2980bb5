use std::{
    fmt,
    sync::{Arc, Weak},
};

use crate::{
    metadata::{
        config::ModuleOptions,
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity},
        lazy::LazyCell,
        module::ModuleDefinition,
        owned::{Owned, OwnerLink},
        tables::TableId,
        token::Token,
        traits::MetadataMember,
        typesystem::{ResolutionScope, TypeDefinition},
    },
    Error::RecursionLimit,
    Result,
};

/// A reference to a type defined in another module or assembly (a `TypeRef` row).
///
/// Type references are owned by the module whose `TypeRef` table lists them. Resolution looks
/// the referenced type up through the reference's scope: the current module when there is no
/// scope, another module, another assembly through the module's resolver, or the resolved
/// enclosing type for nested references.
pub struct TypeReference {
    me: Weak<TypeReference>,
    token: Token,
    namespace: LazyCell<String>,
    name: LazyCell<String>,
    scope: LazyCell<Option<ResolutionScope>>,
    link: OwnerLink<ModuleDefinition, TypeReference>,
}

impl TypeReference {
    /// Creates a reference that has not been assigned a row
    #[must_use]
    pub fn new(namespace: &str, name: &str, scope: Option<ResolutionScope>) -> Arc<Self> {
        Self::with_token(Token::unbound(TableId::TypeRef), namespace, name, scope)
    }

    /// Creates a reference for an existing `TypeRef` row
    #[must_use]
    pub fn with_token(
        token: Token,
        namespace: &str,
        name: &str,
        scope: Option<ResolutionScope>,
    ) -> Arc<Self> {
        Self::backed(
            token,
            LazyCell::new(namespace.to_string()),
            LazyCell::new(name.to_string()),
            LazyCell::new(scope),
            OwnerLink::new(),
        )
    }

    pub(crate) fn backed(
        token: Token,
        namespace: LazyCell<String>,
        name: LazyCell<String>,
        scope: LazyCell<Option<ResolutionScope>>,
        link: OwnerLink<ModuleDefinition, TypeReference>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| TypeReference {
            me: me.clone(),
            token,
            namespace,
            name,
            scope,
            link,
        })
    }

    /// Namespace of the referenced type
    ///
    /// # Errors
    /// Returns an error if the backing string cannot be read.
    pub fn namespace(&self) -> Result<String> {
        self.namespace.get()
    }

    /// Replaces the namespace
    pub fn set_namespace(&self, namespace: &str) {
        self.namespace.set(namespace.to_string());
    }

    /// Simple name of the referenced type
    ///
    /// # Errors
    /// Returns an error if the backing string cannot be read.
    pub fn name(&self) -> Result<String> {
        self.name.get()
    }

    /// Replaces the simple name
    pub fn set_name(&self, name: &str) {
        self.name.set(name.to_string());
    }

    /// Where the referenced type is looked up
    ///
    /// # Errors
    /// Returns an error if the backing row references a missing scope.
    pub fn scope(&self) -> Result<Option<ResolutionScope>> {
        self.scope.get()
    }

    /// Replaces the resolution scope
    pub fn set_scope(&self, scope: Option<ResolutionScope>) {
        self.scope.set(scope);
    }

    /// The module whose `TypeRef` table holds this reference
    pub fn module(&self) -> Option<Arc<ModuleDefinition>> {
        self.link.owner()
    }

    /// Namespace-qualified name, `Enclosing/Name` for nested references
    ///
    /// # Errors
    /// Returns an error if a backing string cannot be read, or
    /// [`crate::Error::RecursionLimit`] if the scope chain is cyclic.
    pub fn full_name(&self) -> Result<String> {
        self.full_name_bounded(0)
    }

    fn full_name_bounded(&self, depth: usize) -> Result<String> {
        let limit = self.max_depth();
        if depth > limit {
            return Err(RecursionLimit(limit));
        }

        let name = self.name()?;
        if let Some(ResolutionScope::TypeRef(enclosing)) = self.scope()? {
            if let Some(enclosing) = enclosing.upgrade() {
                return Ok(format!(
                    "{}/{}",
                    enclosing.full_name_bounded(depth + 1)?,
                    name
                ));
            }
        }

        let namespace = self.namespace()?;
        if namespace.is_empty() {
            Ok(name)
        } else {
            Ok(format!("{namespace}.{name}"))
        }
    }

    /// Returns true if the referenced type resolves to a value type
    pub fn is_value_type(&self) -> bool {
        self.resolve().is_some_and(|def| def.is_value_type())
    }

    /// Resolves the reference to its definition.
    ///
    /// Failures are recorded in the owning module's diagnostics when the module's options ask
    /// for it.
    pub fn resolve(&self) -> Option<Arc<TypeDefinition>> {
        self.resolve_bounded(0)
    }

    fn resolve_bounded(&self, depth: usize) -> Option<Arc<TypeDefinition>> {
        let module = self.module();
        let resolved = if depth > self.max_depth() {
            None
        } else {
            self.lookup(module.as_ref(), depth)
        };

        if resolved.is_none() {
            if let Some(module) = &module {
                if module.options().report_unresolved {
                    let name = self
                        .full_name()
                        .unwrap_or_else(|_| format!("{:?}", self.token));
                    module.diagnostics().push(
                        Diagnostic::new(
                            DiagnosticSeverity::Warning,
                            DiagnosticCategory::Resolution,
                            format!("Unable to resolve type reference {name}"),
                        )
                        .with_token(self.token),
                    );
                }
            }
        }

        resolved
    }

    fn lookup(
        &self,
        module: Option<&Arc<ModuleDefinition>>,
        depth: usize,
    ) -> Option<Arc<TypeDefinition>> {
        let namespace = self.namespace().ok()?;
        let name = self.name().ok()?;

        match self.scope().ok()? {
            None => module?.find_type(&namespace, &name),
            Some(ResolutionScope::Module(target)) => target.upgrade()?.find_type(&namespace, &name),
            Some(ResolutionScope::AssemblyRef(assembly)) => module?
                .resolver()?
                .resolve(assembly.identity())?
                .find_type(&namespace, &name),
            Some(ResolutionScope::TypeRef(enclosing)) => enclosing
                .upgrade()?
                .resolve_bounded(depth + 1)?
                .nested_types()
                .find(|nested| nested.name().is_ok_and(|candidate| candidate == name)),
        }
    }

    /// A strong reference to this type reference
    pub fn upgrade(&self) -> Option<Arc<TypeReference>> {
        self.me.upgrade()
    }

    fn max_depth(&self) -> usize {
        self.module()
            .map_or(ModuleOptions::default().max_resolution_depth, |module| {
                module.options().max_resolution_depth
            })
    }
}

impl MetadataMember for TypeReference {
    fn token(&self) -> Token {
        self.token
    }
}

impl Owned<ModuleDefinition> for TypeReference {
    fn owner_link(&self) -> &OwnerLink<ModuleDefinition, TypeReference> {
        &self.link
    }
}

impl fmt::Debug for TypeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeReference")
            .field("token", &self.token)
            .field("name", &self.full_name().unwrap_or_default())
            .field("scope", &self.scope().ok().flatten())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::{AssemblyIdentity, AssemblyVersion},
        resolver::ModuleCache,
        typesystem::{AssemblyReference, TypeAttributes},
    };

    #[test]
    fn resolves_within_owning_module() {
        let module = ModuleDefinition::new("Sample.dll");
        let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
        module.types().add(widget.clone());

        let reference = TypeReference::new("Sample", "Widget", None);
        module.type_references().add(reference.clone());

        assert!(Arc::ptr_eq(&reference.resolve().unwrap(), &widget));
        assert!(!module.diagnostics().has_any());
    }

    #[test]
    fn resolves_nested_reference_through_enclosing() {
        let module = ModuleDefinition::new("Sample.dll");
        let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
        let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
        module.types().add(outer.clone());
        outer.nested_types().add(inner.clone());

        let outer_ref = TypeReference::new("Sample", "Outer", None);
        let inner_ref = TypeReference::new(
            "",
            "Inner",
            Some(ResolutionScope::TypeRef(Arc::downgrade(&outer_ref))),
        );
        module.type_references().add(outer_ref.clone());
        module.type_references().add(inner_ref.clone());

        assert_eq!(inner_ref.full_name().unwrap(), "Sample.Outer/Inner");
        assert!(Arc::ptr_eq(&inner_ref.resolve().unwrap(), &inner));
    }

    #[test]
    fn resolves_across_assemblies_through_resolver() {
        let library = ModuleDefinition::new("Library.dll");
        library.set_assembly(Some(AssemblyIdentity::new(
            "Library",
            AssemblyVersion::new(1, 0, 0, 0),
        )));
        let shape = TypeDefinition::new("Library", "Shape", TypeAttributes::PUBLIC, None);
        library.types().add(shape.clone());

        let cache = Arc::new(ModuleCache::new());
        cache.register(&library);

        let app = ModuleDefinition::new("App.dll");
        app.set_resolver(Some(cache));
        let assembly = AssemblyReference::new(AssemblyIdentity::new(
            "Library",
            AssemblyVersion::new(1, 0, 0, 0),
        ));
        let reference = TypeReference::new(
            "Library",
            "Shape",
            Some(ResolutionScope::AssemblyRef(assembly)),
        );
        app.type_references().add(reference.clone());

        assert!(Arc::ptr_eq(&reference.resolve().unwrap(), &shape));
    }

    #[test]
    fn unresolved_reference_is_reported() {
        let module = ModuleDefinition::new("Sample.dll");
        let reference = TypeReference::new("Sample", "Missing", None);
        module.type_references().add(reference.clone());

        assert!(reference.resolve().is_none());
        assert!(!reference.is_value_type());

        let reports = module.diagnostics().by_category(DiagnosticCategory::Resolution);
        assert!(!reports.is_empty());
        assert!(reports[0].message.contains("Sample.Missing"));
    }

    #[test]
    fn cyclic_scope_chain_terminates() {
        let module = ModuleDefinition::new("Sample.dll");
        let first = TypeReference::new("", "First", None);
        let second = TypeReference::new(
            "",
            "Second",
            Some(ResolutionScope::TypeRef(Arc::downgrade(&first))),
        );
        first.set_scope(Some(ResolutionScope::TypeRef(Arc::downgrade(&second))));
        module.type_references().add(first.clone());
        module.type_references().add(second.clone());

        assert!(first.resolve().is_none());
        assert!(matches!(
            first.full_name(),
            Err(crate::Error::RecursionLimit(_))
        ));
    }
}
