//! The module: root of the entity graph.
//!
//! A [`ModuleDefinition`] owns its top-level types, its type references and its assembly
//! references. It also carries what every entity below it consults: the loading options, the
//! diagnostics sink and the resolver used for cross-assembly references.
//!
//! Modules come from two places. [`ModuleDefinition::new`] builds an empty synthetic module;
//! [`crate::metadata::loader::load_module`] builds a backed one whose entities decode their
//! fields from a [`crate::metadata::loader::MetadataImage`] on first access.

use std::{
    fmt,
    sync::{Arc, RwLock, Weak},
};

use rayon::prelude::*;
use uguid::Guid;

use crate::{
    metadata::{
        config::ModuleOptions,
        diagnostics::Diagnostics,
        identity::{AssemblyIdentity, AssemblyVersion},
        lazy::LazyCell,
        loader::LoadContext,
        owned::{ItemSource, LazyOwnedCollection, OwnedCollection},
        resolver::AssemblyResolver,
        signatures::TypeTokenResolver,
        tables::TableId,
        token::Token,
        traits::MetadataMember,
        typesystem::{AssemblyReference, TypeDefOrRef, TypeDefinition, TypeReference},
    },
    Result,
};

/// Everything a backed [`ModuleDefinition`] is built from.
pub(crate) struct ModuleParts {
    pub name: LazyCell<String>,
    pub mvid: Guid,
    pub assembly: Option<AssemblyIdentity>,
    pub types: Option<ItemSource<TypeDefinition>>,
    pub type_references: Option<ItemSource<TypeReference>>,
    pub options: ModuleOptions,
    pub diagnostics: Arc<Diagnostics>,
    pub backing: Option<Arc<LoadContext>>,
}

/// A .NET module and everything defined in it.
///
/// # Examples
///
/// ```rust
/// use dotmodel::prelude::*;
///
/// let module = ModuleDefinition::new("Sample.dll");
/// let widget = TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None);
/// module.types().add(widget.clone());
///
/// assert!(module.find_type("Sample", "Widget").is_some());
/// assert!(module.find_type("Sample", "Gadget").is_none());
/// ```
pub struct ModuleDefinition {
    token: Token,
    name: LazyCell<String>,
    mvid: RwLock<Guid>,
    assembly: RwLock<Option<AssemblyIdentity>>,
    types: LazyOwnedCollection<ModuleDefinition, TypeDefinition>,
    type_references: LazyOwnedCollection<ModuleDefinition, TypeReference>,
    assembly_references: boxcar::Vec<Arc<AssemblyReference>>,
    options: ModuleOptions,
    diagnostics: Arc<Diagnostics>,
    resolver: RwLock<Option<Arc<dyn AssemblyResolver>>>,
    backing: Option<Arc<LoadContext>>,
}

impl ModuleDefinition {
    /// Creates an empty module with default options
    #[must_use]
    pub fn new(name: &str) -> Arc<Self> {
        Self::with_options(name, ModuleOptions::default())
    }

    /// Creates an empty module
    #[must_use]
    pub fn with_options(name: &str, options: ModuleOptions) -> Arc<Self> {
        Self::from_parts(ModuleParts {
            name: LazyCell::new(name.to_string()),
            mvid: Guid::from_bytes([0; 16]),
            assembly: None,
            types: None,
            type_references: None,
            options,
            diagnostics: Arc::new(Diagnostics::new()),
            backing: None,
        })
    }

    pub(crate) fn from_parts(parts: ModuleParts) -> Arc<Self> {
        Arc::new_cyclic(|me: &Weak<ModuleDefinition>| ModuleDefinition {
            token: Token::from_parts(TableId::Module, 1),
            name: parts.name,
            mvid: RwLock::new(parts.mvid),
            assembly: RwLock::new(parts.assembly),
            types: LazyOwnedCollection::with_source(me.clone(), parts.types),
            type_references: LazyOwnedCollection::with_source(me.clone(), parts.type_references),
            assembly_references: boxcar::Vec::new(),
            options: parts.options,
            diagnostics: parts.diagnostics,
            resolver: RwLock::new(None),
            backing: parts.backing,
        })
    }

    /// File name of the module
    ///
    /// # Errors
    /// Returns an error if the backing string cannot be read.
    pub fn name(&self) -> Result<String> {
        self.name.get()
    }

    /// Replaces the file name
    pub fn set_name(&self, name: &str) {
        self.name.set(name.to_string());
    }

    /// Module version id
    pub fn mvid(&self) -> Guid {
        *read_lock!(self.mvid)
    }

    /// Replaces the module version id
    pub fn set_mvid(&self, mvid: Guid) {
        *write_lock!(self.mvid) = mvid;
    }

    /// Identity of the assembly this module is the manifest of
    pub fn assembly(&self) -> Option<AssemblyIdentity> {
        read_lock!(self.assembly).clone()
    }

    /// Replaces the assembly identity
    pub fn set_assembly(&self, assembly: Option<AssemblyIdentity>) {
        *write_lock!(self.assembly) = assembly;
    }

    /// The assembly identity, or one derived from the file name with version 0.0.0.0
    pub fn effective_identity(&self) -> AssemblyIdentity {
        if let Some(identity) = self.assembly() {
            return identity;
        }

        let name = self.name().unwrap_or_default();
        let stem = name
            .strip_suffix(".dll")
            .or_else(|| name.strip_suffix(".exe"))
            .or_else(|| name.strip_suffix(".netmodule"))
            .unwrap_or(&name);
        AssemblyIdentity::new(stem, AssemblyVersion::default())
    }

    /// Top-level types
    pub fn types(&self) -> &OwnedCollection<ModuleDefinition, TypeDefinition> {
        self.types.get()
    }

    /// Type references, in `TypeRef` table order
    pub fn type_references(&self) -> &OwnedCollection<ModuleDefinition, TypeReference> {
        self.type_references.get()
    }

    /// Referenced assemblies, in `AssemblyRef` table order followed by imported ones
    pub fn assembly_references(&self) -> Vec<Arc<AssemblyReference>> {
        self.assembly_references
            .iter()
            .map(|(_, reference)| reference.clone())
            .collect()
    }

    /// Appends an assembly reference
    pub fn add_assembly_reference(&self, reference: Arc<AssemblyReference>) {
        self.assembly_references.push(reference);
    }

    /// The first assembly reference whose name matches `identity`
    pub fn find_assembly_reference(
        &self,
        identity: &AssemblyIdentity,
    ) -> Option<Arc<AssemblyReference>> {
        self.assembly_references
            .iter()
            .map(|(_, reference)| reference)
            .find(|reference| reference.identity().matches_name(identity))
            .cloned()
    }

    /// Options the module was created with
    pub fn options(&self) -> &ModuleOptions {
        &self.options
    }

    /// Problems found while loading and resolving
    pub fn diagnostics(&self) -> &Arc<Diagnostics> {
        &self.diagnostics
    }

    /// Resolver for references into other assemblies
    pub fn resolver(&self) -> Option<Arc<dyn AssemblyResolver>> {
        read_lock!(self.resolver).clone()
    }

    /// Replaces the resolver
    pub fn set_resolver(&self, resolver: Option<Arc<dyn AssemblyResolver>>) {
        *write_lock!(self.resolver) = resolver;
    }

    /// The top-level type `namespace.name`
    pub fn find_type(&self, namespace: &str, name: &str) -> Option<Arc<TypeDefinition>> {
        self.types().find(|ty| {
            ty.name().is_ok_and(|candidate| candidate == name)
                && ty.namespace().is_ok_and(|candidate| candidate == namespace)
        })
    }

    /// Every type of the module, nested types after their enclosing type
    pub fn all_types(&self) -> Vec<Arc<TypeDefinition>> {
        let mut all = Vec::new();
        let mut pending = self.types().iter().rev().collect::<Vec<_>>();

        while let Some(ty) = pending.pop() {
            pending.extend(ty.nested_types().iter().rev());
            all.push(ty);
        }

        all
    }

    pub(crate) fn backing(&self) -> Option<&Arc<LoadContext>> {
        self.backing.as_ref()
    }

    /// The type definition or reference with `token`
    pub fn lookup_type(&self, token: Token) -> Option<TypeDefOrRef> {
        if token.is_unbound() {
            return None;
        }

        if let Some(backing) = &self.backing {
            if let Some(found) = backing.type_by_token(token) {
                return Some(found);
            }
        }

        match token.table_id()? {
            TableId::TypeDef => self
                .all_types()
                .iter()
                .find(|ty| ty.token() == token)
                .map(TypeDefOrRef::from),
            TableId::TypeRef => self
                .type_references()
                .find(|reference| reference.token() == token)
                .map(|reference| TypeDefOrRef::from(&reference)),
            _ => None,
        }
    }

    /// Forces every lazy field and collection of the module.
    ///
    /// Types are processed in parallel.
    ///
    /// # Errors
    /// Returns the first error a source reports.
    pub fn materialize_all(&self) -> Result<()> {
        self.name()?;

        self.all_types()
            .par_iter()
            .try_for_each(|ty| -> Result<()> {
                ty.namespace()?;
                ty.name()?;
                ty.base_type()?;
                for attribute in ty.custom_attributes().iter() {
                    attribute.value()?;
                }

                for method in ty.methods().iter() {
                    method.name()?;
                    for attribute in method.custom_attributes().iter() {
                        attribute.value()?;
                    }
                }

                for property in ty.properties().iter() {
                    property.name()?;
                    property.signature()?;
                    if let Some(constant) = property.constant()? {
                        constant.value()?;
                    }
                    property.semantics();
                    for attribute in property.custom_attributes().iter() {
                        attribute.value()?;
                    }
                }

                Ok(())
            })?;

        self.type_references()
            .iter()
            .collect::<Vec<_>>()
            .par_iter()
            .try_for_each(|reference| -> Result<()> {
                reference.namespace()?;
                reference.name()?;
                reference.scope()?;
                Ok(())
            })
    }
}

impl MetadataMember for ModuleDefinition {
    fn token(&self) -> Token {
        self.token
    }
}

impl TypeTokenResolver for ModuleDefinition {
    fn resolve_type_token(&self, token: Token) -> Option<TypeDefOrRef> {
        self.lookup_type(token)
    }
}

impl fmt::Debug for ModuleDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModuleDefinition")
            .field("name", &self.name().unwrap_or_default())
            .field("mvid", &self.mvid().to_string())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::typesystem::TypeAttributes;

    #[test]
    fn all_types_lists_nested_after_enclosing() {
        let module = ModuleDefinition::new("Sample.dll");
        let outer = TypeDefinition::new("Sample", "Outer", TypeAttributes::PUBLIC, None);
        let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
        let last = TypeDefinition::new("Sample", "Last", TypeAttributes::PUBLIC, None);
        module.types().add(outer.clone());
        module.types().add(last.clone());
        outer.nested_types().add(inner.clone());

        let names = module
            .all_types()
            .iter()
            .map(|ty| ty.full_name().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(names, vec!["Sample.Outer", "Sample.Outer/Inner", "Sample.Last"]);
    }

    #[test]
    fn lookup_by_token() {
        let module = ModuleDefinition::new("Sample.dll");
        let token = Token::from_parts(TableId::TypeDef, 3);
        let ty = TypeDefinition::with_token(token, "Sample", "Widget", TypeAttributes::PUBLIC, None);
        module.types().add(ty.clone());

        assert_eq!(module.lookup_type(token), Some(TypeDefOrRef::from(&ty)));
        assert!(module
            .lookup_type(Token::from_parts(TableId::TypeRef, 3))
            .is_none());
        assert!(module.lookup_type(Token::unbound(TableId::TypeDef)).is_none());
    }

    #[test]
    fn identity_falls_back_to_file_name() {
        let module = ModuleDefinition::new("Library.dll");
        assert_eq!(module.effective_identity().name, "Library");

        module.set_assembly(Some(AssemblyIdentity::new(
            "Real.Name",
            AssemblyVersion::new(1, 2, 3, 4),
        )));
        assert_eq!(module.effective_identity().name, "Real.Name");
    }

    #[test]
    fn assembly_references_keep_order() {
        let module = ModuleDefinition::new("Sample.dll");
        let corlib = AssemblyReference::new(AssemblyIdentity::new(
            "mscorlib",
            AssemblyVersion::new(4, 0, 0, 0),
        ));
        let system = AssemblyReference::new(AssemblyIdentity::new(
            "System",
            AssemblyVersion::new(4, 0, 0, 0),
        ));
        module.add_assembly_reference(corlib.clone());
        module.add_assembly_reference(system);

        assert_eq!(module.assembly_references().len(), 2);
        let probe = AssemblyIdentity::new("MSCORLIB", AssemblyVersion::default());
        assert!(Arc::ptr_eq(
            &module.find_assembly_reference(&probe).unwrap(),
            &corlib
        ));
    }

    #[test]
    fn materialize_synthetic_module() {
        let module = ModuleDefinition::new("Sample.dll");
        module
            .types()
            .add(TypeDefinition::new("Sample", "Widget", TypeAttributes::PUBLIC, None));
        assert!(module.materialize_all().is_ok());
    }
}
