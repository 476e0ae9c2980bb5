//! Assembly identities.
//!
//! An [`AssemblyIdentity`] names an assembly by simple name, four-part version and culture.
//! Modules carry the identity of the assembly they belong to; assembly references carry the
//! identity they ask for, and resolvers match on it.

use std::fmt;

use crate::Result;

/// Four-part assembly version
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AssemblyVersion {
    /// Major version number
    pub major: u16,
    /// Minor version number
    pub minor: u16,
    /// Build number
    pub build: u16,
    /// Revision number
    pub revision: u16,
}

impl AssemblyVersion {
    /// Creates a version from its four components
    #[must_use]
    pub fn new(major: u16, minor: u16, build: u16, revision: u16) -> Self {
        AssemblyVersion {
            major,
            minor,
            build,
            revision,
        }
    }

    /// Parses `major[.minor[.build[.revision]]]`; missing components are zero.
    ///
    /// # Errors
    /// Returns an error if the version string has an invalid format.
    pub fn parse(version_str: &str) -> Result<Self> {
        let parts: Vec<&str> = version_str.split('.').collect();

        if parts.is_empty() || parts.len() > 4 {
            return Err(malformed_error!("Invalid version format: {}", version_str));
        }

        let mut components = [0u16; 4];
        for (i, part) in parts.iter().enumerate() {
            components[i] = part
                .parse::<u16>()
                .map_err(|_| malformed_error!("Invalid version component: {}", part))?;
        }

        Ok(Self::new(
            components[0],
            components[1],
            components[2],
            components[3],
        ))
    }
}

impl fmt::Display for AssemblyVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}.{}.{}.{}",
            self.major, self.minor, self.build, self.revision
        )
    }
}

/// Name, version and culture of an assembly
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AssemblyIdentity {
    /// Simple name, without extension
    pub name: String,
    /// Version
    pub version: AssemblyVersion,
    /// Culture, `None` for culture-neutral assemblies
    pub culture: Option<String>,
}

impl AssemblyIdentity {
    /// Creates a culture-neutral identity
    #[must_use]
    pub fn new(name: impl Into<String>, version: AssemblyVersion) -> Self {
        AssemblyIdentity {
            name: name.into(),
            version,
            culture: None,
        }
    }

    /// Parses a display name such as `mscorlib, Version=4.0.0.0, Culture=neutral`.
    ///
    /// Components other than `Version` and `Culture` are ignored.
    ///
    /// # Errors
    /// Returns an error if the name is empty or the version is malformed.
    pub fn parse(display_name: &str) -> Result<Self> {
        let mut parts = display_name.split(',').map(str::trim);

        let name = parts.next().unwrap_or_default().to_string();
        if name.is_empty() {
            return Err(malformed_error!("Assembly name cannot be empty"));
        }

        let mut identity = AssemblyIdentity::new(name, AssemblyVersion::default());
        for part in parts {
            if let Some(value) = part.strip_prefix("Version=") {
                identity.version = AssemblyVersion::parse(value)?;
            } else if let Some(value) = part.strip_prefix("Culture=") {
                if value != "neutral" {
                    identity.culture = Some(value.to_string());
                }
            }
        }

        Ok(identity)
    }

    /// Display name in the `Name, Version=..., Culture=...` form
    #[must_use]
    pub fn display_name(&self) -> String {
        format!(
            "{}, Version={}, Culture={}",
            self.name,
            self.version,
            self.culture.as_deref().unwrap_or("neutral")
        )
    }

    /// Returns true if the simple names match, ignoring ASCII case
    #[must_use]
    pub fn matches_name(&self, other: &AssemblyIdentity) -> bool {
        self.name.eq_ignore_ascii_case(&other.name)
    }
}

impl fmt::Display for AssemblyIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_display_name() {
        let identity =
            AssemblyIdentity::parse("mscorlib, Version=4.0.0.0, Culture=neutral, PublicKeyToken=b77a5c561934e089")
                .unwrap();

        assert_eq!(identity.name, "mscorlib");
        assert_eq!(identity.version, AssemblyVersion::new(4, 0, 0, 0));
        assert!(identity.culture.is_none());
        assert_eq!(
            identity.display_name(),
            "mscorlib, Version=4.0.0.0, Culture=neutral"
        );
    }

    #[test]
    fn parse_partial_version_and_culture() {
        let identity = AssemblyIdentity::parse("Lib, Version=2.1, Culture=de-DE").unwrap();
        assert_eq!(identity.version, AssemblyVersion::new(2, 1, 0, 0));
        assert_eq!(identity.culture.as_deref(), Some("de-DE"));
    }

    #[test]
    fn parse_errors() {
        assert!(AssemblyIdentity::parse("").is_err());
        assert!(AssemblyIdentity::parse("Lib, Version=1.x").is_err());
        assert!(AssemblyVersion::parse("1.2.3.4.5").is_err());
    }

    #[test]
    fn name_matching_ignores_case() {
        let a = AssemblyIdentity::new("System.Runtime", AssemblyVersion::new(8, 0, 0, 0));
        let b = AssemblyIdentity::new("system.runtime", AssemblyVersion::default());
        assert!(a.matches_name(&b));
        assert_ne!(a, b);
    }
}
