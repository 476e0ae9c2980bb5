//! Importing types into another module.
//!
//! A type is usable from a module if it is defined there or referenced through one of the
//! module's own type references. [`ReferenceImporter`] turns a type from anywhere into such a
//! handle: it reuses matching type and assembly references of the target module and creates
//! the missing ones.
//!
//! # Examples
//!
//! ```rust
//! use dotmodel::metadata::importer::ReferenceImporter;
//! use dotmodel::prelude::*;
//!
//! let library = ModuleDefinition::new("Library.dll");
//! let shape = TypeDefinition::new("Library", "Shape", TypeAttributes::PUBLIC, None);
//! library.types().add(shape.clone());
//!
//! let app = ModuleDefinition::new("App.dll");
//! let importer = ReferenceImporter::new(&app);
//!
//! let imported = importer.import_type(&TypeDefOrRef::from(&shape))?;
//! assert!(imported.is_imported_in(&app));
//! assert_eq!(imported.full_name().as_deref(), Some("Library.Shape"));
//! assert_eq!(app.assembly_references()[0].name(), "Library");
//! # Ok::<(), dotmodel::Error>(())
//! ```

use std::sync::{Arc, Weak};

use crate::{
    metadata::{
        identity::AssemblyIdentity,
        module::ModuleDefinition,
        signatures::{
            CorLibType, PropertySignature, TypeDefOrRefSignature, TypeSignature,
            TypeSignatureVisitor,
        },
        traits::Importable,
        typesystem::{AssemblyReference, ResolutionScope, TypeDefOrRef, TypeReference},
    },
    Error::{RecursionLimit, TypeError},
    Result,
};

/// Creates references in a target module for types defined elsewhere.
pub struct ReferenceImporter {
    target: Arc<ModuleDefinition>,
}

impl ReferenceImporter {
    /// An importer into `target`
    #[must_use]
    pub fn new(target: &Arc<ModuleDefinition>) -> Self {
        ReferenceImporter {
            target: Arc::clone(target),
        }
    }

    /// The module references are created in
    #[must_use]
    pub fn target(&self) -> &Arc<ModuleDefinition> {
        &self.target
    }

    /// A handle to `ty` that is usable from the target module.
    ///
    /// Handles that already are usable are returned unchanged.
    ///
    /// # Errors
    /// Returns [`crate::Error::TypeError`] if `ty` no longer exists or cannot be located, and
    /// [`crate::Error::RecursionLimit`] for enclosing chains deeper than the target's
    /// resolution depth.
    pub fn import_type(&self, ty: &TypeDefOrRef) -> Result<TypeDefOrRef> {
        self.import_bounded(ty, 0)
    }

    /// Imports every type a signature mentions
    ///
    /// # Errors
    /// See [`ReferenceImporter::import_type`].
    pub fn import_type_signature(&self, signature: &TypeSignature) -> Result<TypeSignature> {
        let mut visitor = self;
        signature.accept(&mut visitor)
    }

    /// Imports the property type and every parameter type
    ///
    /// # Errors
    /// See [`ReferenceImporter::import_type`].
    pub fn import_property_signature(
        &self,
        signature: &PropertySignature,
    ) -> Result<PropertySignature> {
        Ok(PropertySignature {
            has_this: signature.has_this,
            property_type: self.import_type_signature(&signature.property_type)?,
            parameters: signature
                .parameters
                .iter()
                .map(|parameter| self.import_type_signature(parameter))
                .collect::<Result<Vec<_>>>()?,
        })
    }

    fn import_bounded(&self, ty: &TypeDefOrRef, depth: usize) -> Result<TypeDefOrRef> {
        let limit = self.target.options().max_resolution_depth;
        if depth > limit {
            return Err(RecursionLimit(limit));
        }

        if ty.is_imported_in(&self.target) {
            return Ok(ty.clone());
        }

        let gone = || TypeError("Cannot import a type that no longer exists".to_string());
        let name = ty.name().ok_or_else(gone)?;
        let namespace = ty.namespace().ok_or_else(gone)?;

        let scope = match ty {
            TypeDefOrRef::Definition(definition) => {
                let definition = definition.upgrade().ok_or_else(gone)?;
                match definition.declaring_type() {
                    Some(enclosing) => ResolutionScope::TypeRef(
                        self.import_enclosing(&TypeDefOrRef::from(&enclosing), depth)?,
                    ),
                    None => {
                        let module = definition.module().ok_or_else(|| {
                            TypeError(format!("Type {name} does not belong to a module"))
                        })?;
                        ResolutionScope::AssemblyRef(
                            self.assembly_reference(&module.effective_identity()),
                        )
                    }
                }
            }
            TypeDefOrRef::Reference(reference) => {
                let reference = reference.upgrade().ok_or_else(gone)?;
                match reference.scope()? {
                    Some(ResolutionScope::AssemblyRef(assembly)) => {
                        ResolutionScope::AssemblyRef(self.assembly_reference(assembly.identity()))
                    }
                    Some(ResolutionScope::TypeRef(enclosing)) => {
                        let enclosing = enclosing.upgrade().ok_or_else(gone)?;
                        ResolutionScope::TypeRef(
                            self.import_enclosing(&TypeDefOrRef::from(&enclosing), depth)?,
                        )
                    }
                    Some(ResolutionScope::Module(module)) => {
                        let module = module.upgrade().ok_or_else(gone)?;
                        if Arc::ptr_eq(&module, &self.target) {
                            let definition =
                                self.target.find_type(&namespace, &name).ok_or_else(|| {
                                    TypeError(format!(
                                        "Type {} is not defined in the target module",
                                        ty.full_name().unwrap_or(name.clone())
                                    ))
                                })?;
                            return Ok(TypeDefOrRef::from(&definition));
                        }
                        ResolutionScope::AssemblyRef(
                            self.assembly_reference(&module.effective_identity()),
                        )
                    }
                    None => {
                        let module = reference.module().ok_or_else(|| {
                            TypeError(format!("Type reference {name} has no scope or module"))
                        })?;
                        ResolutionScope::AssemblyRef(
                            self.assembly_reference(&module.effective_identity()),
                        )
                    }
                }
            }
        };

        let reference = self.type_reference(&namespace, &name, scope);
        Ok(TypeDefOrRef::from(&reference))
    }

    fn import_enclosing(&self, enclosing: &TypeDefOrRef, depth: usize) -> Result<Weak<TypeReference>> {
        match self.import_bounded(enclosing, depth + 1)? {
            TypeDefOrRef::Reference(reference) => Ok(reference),
            TypeDefOrRef::Definition(_) => Err(TypeError(
                "Enclosing type resolved to a definition of the target module".to_string(),
            )),
        }
    }

    fn assembly_reference(&self, identity: &AssemblyIdentity) -> Arc<AssemblyReference> {
        if let Some(existing) = self.target.find_assembly_reference(identity) {
            return existing;
        }

        let reference = AssemblyReference::new(identity.clone());
        self.target.add_assembly_reference(reference.clone());
        reference
    }

    fn type_reference(
        &self,
        namespace: &str,
        name: &str,
        scope: ResolutionScope,
    ) -> Arc<TypeReference> {
        let existing = self.target.type_references().find(|candidate| {
            candidate.name().is_ok_and(|candidate| candidate == name)
                && candidate.namespace().is_ok_and(|candidate| candidate == namespace)
                && candidate
                    .scope()
                    .ok()
                    .flatten()
                    .is_some_and(|candidate| same_scope(&candidate, &scope))
        });
        if let Some(existing) = existing {
            return existing;
        }

        let reference = TypeReference::new(namespace, name, Some(scope));
        self.target.type_references().add(reference.clone());
        reference
    }
}

fn same_scope(first: &ResolutionScope, second: &ResolutionScope) -> bool {
    match (first, second) {
        (ResolutionScope::AssemblyRef(a), ResolutionScope::AssemblyRef(b)) => {
            a.identity().matches_name(b.identity())
        }
        _ => first == second,
    }
}

impl TypeSignatureVisitor for &ReferenceImporter {
    type Output = Result<TypeSignature>;

    fn visit_corlib_type(&mut self, ty: CorLibType) -> Self::Output {
        Ok(TypeSignature::CorLib(ty))
    }

    fn visit_type_def_or_ref(&mut self, signature: &TypeDefOrRefSignature) -> Self::Output {
        let imported = self.import_type(signature.type_handle())?;
        Ok(TypeSignature::TypeDefOrRef(
            TypeDefOrRefSignature::with_classification(imported, signature.is_value_type()),
        ))
    }
}

impl Importable for TypeDefOrRef {
    type Imported = TypeDefOrRef;

    fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        TypeDefOrRef::is_imported_in(self, module)
    }

    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported> {
        importer.import_type(self)
    }
}

impl Importable for TypeDefOrRefSignature {
    type Imported = TypeDefOrRefSignature;

    fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        TypeDefOrRefSignature::is_imported_in(self, module)
    }

    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported> {
        let imported = importer.import_type(self.type_handle())?;
        Ok(TypeDefOrRefSignature::with_classification(
            imported,
            self.is_value_type(),
        ))
    }
}

impl Importable for TypeSignature {
    type Imported = TypeSignature;

    fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        TypeSignature::is_imported_in(self, module)
    }

    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported> {
        importer.import_type_signature(self)
    }
}

impl Importable for PropertySignature {
    type Imported = PropertySignature;

    fn is_imported_in(&self, module: &ModuleDefinition) -> bool {
        PropertySignature::is_imported_in(self, module)
    }

    fn import_with(&self, importer: &ReferenceImporter) -> Result<Self::Imported> {
        importer.import_property_signature(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{
        identity::AssemblyVersion,
        typesystem::{TypeAttributes, TypeDefinition},
    };

    fn library() -> (Arc<ModuleDefinition>, Arc<TypeDefinition>, Arc<TypeDefinition>) {
        let library = ModuleDefinition::new("Library.dll");
        library.set_assembly(Some(AssemblyIdentity::new(
            "Library",
            AssemblyVersion::new(1, 0, 0, 0),
        )));
        let outer = TypeDefinition::new("Library", "Outer", TypeAttributes::PUBLIC, None);
        let inner = TypeDefinition::new("", "Inner", TypeAttributes::NESTED_PUBLIC, None);
        library.types().add(outer.clone());
        outer.nested_types().add(inner.clone());
        (library, outer, inner)
    }

    #[test]
    fn local_types_are_returned_unchanged() {
        let (library, outer, _) = library();
        let importer = ReferenceImporter::new(&library);

        let handle = TypeDefOrRef::from(&outer);
        assert_eq!(importer.import_type(&handle).unwrap(), handle);
        assert!(library.type_references().is_empty());
    }

    #[test]
    fn references_are_reused() {
        let (_library, outer, _) = library();
        let app = ModuleDefinition::new("App.dll");
        let importer = ReferenceImporter::new(&app);

        let first = importer.import_type(&TypeDefOrRef::from(&outer)).unwrap();
        let second = importer.import_type(&TypeDefOrRef::from(&outer)).unwrap();
        assert_eq!(first, second);
        assert_eq!(app.type_references().len(), 1);
        assert_eq!(app.assembly_references().len(), 1);
    }

    #[test]
    fn nested_types_are_scoped_to_their_enclosing_reference() {
        let (_library, _, inner) = library();
        let app = ModuleDefinition::new("App.dll");
        let importer = ReferenceImporter::new(&app);

        let imported = importer.import_type(&TypeDefOrRef::from(&inner)).unwrap();
        assert_eq!(imported.full_name().as_deref(), Some("Library.Outer/Inner"));
        assert_eq!(app.type_references().len(), 2);
        assert!(imported.is_imported_in(&app));
    }

    #[test]
    fn foreign_references_are_rescoped() {
        let (library, outer, _) = library();
        let app = ModuleDefinition::new("App.dll");
        let tool = ModuleDefinition::new("Tool.dll");

        let in_app = ReferenceImporter::new(&app)
            .import_type(&TypeDefOrRef::from(&outer))
            .unwrap();
        let in_tool = ReferenceImporter::new(&tool).import_type(&in_app).unwrap();

        assert!(in_tool.is_imported_in(&tool));
        assert_eq!(tool.assembly_references()[0].name(), "Library");
        drop(library);
    }

    #[test]
    fn signatures_keep_their_classification() {
        let (_library, outer, _) = library();
        let app = ModuleDefinition::new("App.dll");
        let importer = ReferenceImporter::new(&app);

        let signature = PropertySignature {
            has_this: true,
            property_type: TypeSignature::TypeDefOrRef(
                TypeDefOrRefSignature::with_classification(TypeDefOrRef::from(&outer), true),
            ),
            parameters: vec![TypeSignature::CorLib(CorLibType::I4)],
        };
        assert!(!signature.is_imported_in(&app));

        let imported = signature.import_with(&importer).unwrap();
        assert!(imported.is_imported_in(&app));
        assert!(imported.property_type.is_value_type());
        assert_eq!(imported.parameters, signature.parameters);
    }

    #[test]
    fn dead_types_cannot_be_imported() {
        let app = ModuleDefinition::new("App.dll");
        let dead = {
            let ty = TypeDefinition::new("Gone", "Type", TypeAttributes::PUBLIC, None);
            TypeDefOrRef::from(&ty)
        };

        assert!(matches!(
            ReferenceImporter::new(&app).import_type(&dead),
            Err(TypeError(_))
        ));
    }
}
