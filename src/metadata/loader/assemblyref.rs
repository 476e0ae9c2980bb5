//! `AssemblyRef` loader.

use crate::{
    metadata::{
        diagnostics::DiagnosticCategory,
        identity::{AssemblyIdentity, AssemblyVersion},
        loader::{LoadContext, MetadataLoader},
        tables::{AssemblyRefRaw, TableId},
        typesystem::AssemblyReference,
    },
    Result,
};

pub(crate) struct AssemblyRefLoader;

impl MetadataLoader for AssemblyRefLoader {
    fn load(&self, context: &LoadContext) -> Result<()> {
        for row in &context.image.assembly_ref {
            match identity(context, row) {
                Ok(identity) => {
                    context
                        .assembly_refs
                        .insert(row.token, AssemblyReference::with_token(row.token, identity));
                }
                Err(error) => {
                    context.dangling(DiagnosticCategory::Table, row.token, error.to_string())?;
                }
            }
        }
        Ok(())
    }

    fn table_id(&self) -> TableId {
        TableId::AssemblyRef
    }
}

/// Identities are small and read by every resolution, so they are decoded eagerly
fn identity(context: &LoadContext, row: &AssemblyRefRaw) -> Result<AssemblyIdentity> {
    let version_part = |value: u32| {
        u16::try_from(value)
            .map_err(|_| malformed_error!("Assembly version component {} exceeds 16 bits", value))
    };

    let version = AssemblyVersion::new(
        version_part(row.major_version)?,
        version_part(row.minor_version)?,
        version_part(row.build_number)?,
        version_part(row.revision_number)?,
    );

    let mut identity = AssemblyIdentity::new(context.string(row.name)?, version);
    if row.culture != 0 {
        identity.culture = Some(context.string(row.culture)?);
    }
    Ok(identity)
}
