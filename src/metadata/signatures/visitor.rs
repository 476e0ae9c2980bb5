use crate::metadata::signatures::{CorLibType, TypeDefOrRefSignature};

/// Double dispatch over the [`crate::metadata::signatures::TypeSignature`] variants.
///
/// Adding a variant adds a method here, so every visitor is forced to handle it.
///
/// ```rust
/// use dotmodel::metadata::signatures::{
///     CorLibType, TypeDefOrRefSignature, TypeSignature, TypeSignatureVisitor,
/// };
///
/// struct ElementTypes(Vec<u8>);
///
/// impl TypeSignatureVisitor for ElementTypes {
///     type Output = ();
///
///     fn visit_corlib_type(&mut self, ty: CorLibType) {
///         self.0.push(ty.element_type());
///     }
///
///     fn visit_type_def_or_ref(&mut self, signature: &TypeDefOrRefSignature) {
///         self.0.push(if signature.is_value_type() { 0x11 } else { 0x12 });
///     }
/// }
///
/// let mut visitor = ElementTypes(Vec::new());
/// TypeSignature::CorLib(CorLibType::I4).accept(&mut visitor);
/// TypeSignature::CorLib(CorLibType::String).accept(&mut visitor);
/// assert_eq!(visitor.0, vec![0x08, 0x0e]);
/// ```
pub trait TypeSignatureVisitor {
    /// Result of visiting one signature
    type Output;

    /// Called for core library primitives
    fn visit_corlib_type(&mut self, ty: CorLibType) -> Self::Output;

    /// Called for references to type definitions and type references
    fn visit_type_def_or_ref(&mut self, signature: &TypeDefOrRefSignature) -> Self::Output;
}
