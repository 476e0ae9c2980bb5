use crate::{
    metadata::{tables::TableId, token::Token},
    Result,
};

/// The coded index kinds used by the tables this crate models (ECMA-335 II.24.2.6).
///
/// A coded index packs a table tag into the low bits of a row index. The tag width is the
/// number of bits needed to distinguish the tables the kind can reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CodedIndexType {
    /// References `TypeDef`, `TypeRef`, or `TypeSpec` tables.
    TypeDefOrRef,

    /// References `Field`, `Param`, or `Property` tables.
    HasConstant,

    /// References any of the 22 tables that can carry custom attributes.
    HasCustomAttribute,

    /// References `Event` or `Property` tables.
    HasSemantics,

    /// References `MethodDef` or `MemberRef` tables. Tags 0, 1 and 4 are unused.
    CustomAttributeType,

    /// References `Module`, `ModuleRef`, `AssemblyRef`, or `TypeRef` tables.
    ResolutionScope,
}

impl CodedIndexType {
    /// Returns the tables that can be referenced, in tag order.
    #[must_use]
    pub fn tables(&self) -> &'static [TableId] {
        match self {
            CodedIndexType::TypeDefOrRef => {
                &[TableId::TypeDef, TableId::TypeRef, TableId::TypeSpec]
            }
            CodedIndexType::HasConstant => &[TableId::Field, TableId::Param, TableId::Property],
            CodedIndexType::HasCustomAttribute => &[
                TableId::MethodDef,
                TableId::Field,
                TableId::TypeRef,
                TableId::TypeDef,
                TableId::Param,
                TableId::InterfaceImpl,
                TableId::MemberRef,
                TableId::Module,
                TableId::DeclSecurity,
                TableId::Property,
                TableId::Event,
                TableId::StandAloneSig,
                TableId::ModuleRef,
                TableId::TypeSpec,
                TableId::Assembly,
                TableId::AssemblyRef,
                TableId::File,
                TableId::ExportedType,
                TableId::ManifestResource,
                TableId::GenericParam,
                TableId::GenericParamConstraint,
                TableId::MethodSpec,
            ],
            CodedIndexType::HasSemantics => &[TableId::Event, TableId::Property],
            CodedIndexType::CustomAttributeType => &[
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MethodDef,
                TableId::MemberRef,
                TableId::MemberRef,
            ],
            CodedIndexType::ResolutionScope => &[
                TableId::Module,
                TableId::ModuleRef,
                TableId::AssemblyRef,
                TableId::TypeRef,
            ],
        }
    }

    /// Number of low bits holding the table tag
    #[must_use]
    pub fn tag_bits(&self) -> u32 {
        let count = self.tables().len() as u32;
        u32::BITS - (count - 1).leading_zeros()
    }

    fn tag_of(&self, table: TableId) -> Option<u32> {
        match self {
            CodedIndexType::CustomAttributeType => match table {
                TableId::MethodDef => Some(2),
                TableId::MemberRef => Some(3),
                _ => None,
            },
            _ => self
                .tables()
                .iter()
                .position(|candidate| *candidate == table)
                .map(|tag| tag as u32),
        }
    }
}

/// A decoded coded index: target table, row and the equivalent token.
#[derive(Clone, Debug, PartialEq)]
pub struct CodedIndex {
    /// The [`TableId`] this index is referring to.
    pub tag: TableId,
    /// The 1-based row this index is pointing to; 0 is the null reference.
    pub row: u32,
    /// The token for `tag` and `row`.
    pub token: Token,
}

impl CodedIndex {
    /// Creates a coded index for `row` in `tag`
    #[must_use]
    pub fn new(tag: TableId, row: u32) -> CodedIndex {
        CodedIndex {
            tag,
            row,
            token: Token::from_parts(tag, row),
        }
    }

    /// Creates a coded index pointing at the row an existing token names
    ///
    /// # Errors
    /// Returns an error if the token does not name a known table.
    pub fn from_token(token: Token) -> Result<CodedIndex> {
        match token.table_id() {
            Some(tag) => Ok(CodedIndex::new(tag, token.row())),
            None => Err(malformed_error!("Token {} names no known table", token)),
        }
    }

    /// Decodes a raw coded index value of the given kind.
    ///
    /// # Errors
    /// Returns [`crate::Error::Malformed`] if the tag is outside the tables the kind allows.
    pub fn decode(value: u32, ci_type: CodedIndexType) -> Result<CodedIndex> {
        let bits = ci_type.tag_bits();
        let tag = value & ((1 << bits) - 1);
        let row = value >> bits;

        match ci_type.tables().get(tag as usize) {
            Some(table) => Ok(CodedIndex::new(*table, row)),
            None => Err(malformed_error!(
                "Invalid tag {} for coded index {:?}",
                tag,
                ci_type
            )),
        }
    }

    /// Encodes this index as a raw coded index value of the given kind.
    ///
    /// # Errors
    /// Returns [`crate::Error::EncodingInvalid`] if the kind cannot reference this table.
    pub fn encode(&self, ci_type: CodedIndexType) -> Result<u32> {
        let Some(tag) = ci_type.tag_of(self.tag) else {
            return Err(crate::Error::EncodingInvalid(format!(
                "{:?} cannot be expressed as {:?}",
                self.tag, ci_type
            )));
        };

        Ok((self.row << ci_type.tag_bits()) | tag)
    }

    /// Returns true if this index points at no row
    #[must_use]
    pub fn is_null(&self) -> bool {
        self.row == 0
    }
}
