//! `LoadContext` - Backing state shared by every entity of a loaded module.
//!
//! The context owns the [`MetadataImage`], the entity registries and the relation indexes the
//! loaders derive from the tables. The module holds it strongly; entity sources and deferred
//! owner links hold it weakly and query it on first access.

use std::sync::{Arc, OnceLock, Weak};

use crossbeam_skiplist::SkipMap;

use crate::{
    metadata::{
        config::ModuleOptions,
        diagnostics::{Diagnostic, DiagnosticCategory, DiagnosticSeverity, Diagnostics},
        loader::MetadataImage,
        members::{MethodDefinition, PropertyDefinition},
        module::ModuleDefinition,
        tables::TableId,
        token::Token,
        typesystem::{AssemblyReference, TypeDefOrRef, TypeDefinition, TypeReference},
    },
    Error, Result,
};

pub(crate) struct LoadContext {
    pub me: Weak<LoadContext>,
    pub image: Arc<MetadataImage>,
    pub options: ModuleOptions,
    pub diagnostics: Arc<Diagnostics>,
    pub module: OnceLock<Weak<ModuleDefinition>>,

    pub assembly_refs: SkipMap<Token, Arc<AssemblyReference>>,
    pub type_refs: SkipMap<Token, Arc<TypeReference>>,
    pub type_defs: SkipMap<Token, Arc<TypeDefinition>>,
    pub methods: SkipMap<Token, Arc<MethodDefinition>>,
    pub properties: SkipMap<Token, Arc<PropertyDefinition>>,

    /// Methods of each type, from the `TypeDef` member lists
    pub type_methods: SkipMap<Token, Vec<Token>>,
    /// Properties of each type, from `PropertyMap`
    pub type_properties: SkipMap<Token, Vec<Token>>,
    /// Nested types of each enclosing type
    pub nested_types: SkipMap<Token, Vec<Token>>,
    /// Enclosing type of each nested type
    pub enclosing_type: SkipMap<Token, Token>,
    pub method_owner: SkipMap<Token, Token>,
    pub property_owner: SkipMap<Token, Token>,
    /// `MethodSemantics` rows of each property
    pub semantics: SkipMap<Token, Vec<u32>>,
    /// `Constant` row of each parent
    pub constants: SkipMap<Token, u32>,
    /// `CustomAttribute` rows of each parent
    pub custom_attributes: SkipMap<Token, Vec<u32>>,
}

impl LoadContext {
    pub fn new(
        image: Arc<MetadataImage>,
        options: ModuleOptions,
        diagnostics: Arc<Diagnostics>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|me| LoadContext {
            me: me.clone(),
            image,
            options,
            diagnostics,
            module: OnceLock::new(),
            assembly_refs: SkipMap::new(),
            type_refs: SkipMap::new(),
            type_defs: SkipMap::new(),
            methods: SkipMap::new(),
            properties: SkipMap::new(),
            type_methods: SkipMap::new(),
            type_properties: SkipMap::new(),
            nested_types: SkipMap::new(),
            enclosing_type: SkipMap::new(),
            method_owner: SkipMap::new(),
            property_owner: SkipMap::new(),
            semantics: SkipMap::new(),
            constants: SkipMap::new(),
            custom_attributes: SkipMap::new(),
        })
    }

    /// Recovers the context from a weak reference held by a source
    pub fn upgrade(weak: &Weak<LoadContext>) -> Result<Arc<LoadContext>> {
        weak.upgrade().ok_or_else(|| {
            Error::Error("The module backing this entity has been dropped".to_string())
        })
    }

    pub fn module(&self) -> Result<Arc<ModuleDefinition>> {
        self.module
            .get()
            .and_then(Weak::upgrade)
            .ok_or_else(|| Error::Error("The module has been dropped".to_string()))
    }

    pub fn string(&self, index: u32) -> Result<String> {
        Ok(self.image.strings.get(index as usize)?.to_string())
    }

    pub fn blob(&self, index: u32) -> Result<Vec<u8>> {
        Ok(self.image.blob.get(index as usize)?.to_vec())
    }

    pub fn type_by_token(&self, token: Token) -> Option<TypeDefOrRef> {
        match token.table_id()? {
            TableId::TypeDef => self
                .type_defs
                .get(&token)
                .map(|entry| TypeDefOrRef::from(entry.value())),
            TableId::TypeRef => self
                .type_refs
                .get(&token)
                .map(|entry| TypeDefOrRef::from(entry.value())),
            _ => None,
        }
    }

    /// Handles a dangling or inconsistent index.
    ///
    /// Strict loads fail with [`Error::Malformed`]; lenient loads record a warning and the
    /// caller skips the offending link.
    pub fn dangling(
        &self,
        category: DiagnosticCategory,
        token: Token,
        message: String,
    ) -> Result<()> {
        if !self.options.lenient {
            return Err(malformed_error!("{} ({})", message, token));
        }

        self.diagnostics.push(
            Diagnostic::new(DiagnosticSeverity::Warning, category, message).with_token(token),
        );
        Ok(())
    }

    /// Entities of `registry` for `tokens`, skipping the ones not loaded
    pub fn collect<T>(registry: &SkipMap<Token, Arc<T>>, tokens: &[Token]) -> Vec<Arc<T>> {
        tokens
            .iter()
            .filter_map(|token| registry.get(token).map(|entry| entry.value().clone()))
            .collect()
    }

    /// Appends `value` to the entry for `key` in a one-to-many relation index.
    ///
    /// Each relation index is filled by a single loader; concurrent calls on one map lose updates.
    pub fn relate<V: Clone + Send + 'static>(map: &SkipMap<Token, Vec<V>>, key: Token, value: V) {
        let mut values = map
            .get(&key)
            .map(|entry| entry.value().clone())
            .unwrap_or_default();
        values.push(value);
        map.insert(key, values);
    }
}
