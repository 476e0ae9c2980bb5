//! Module loading and resolution options.
//!
//! [`ModuleOptions`] controls how the loader treats dangling cross-table references, whether
//! failed type resolutions are reported to the module's diagnostics, and how deep scope and
//! inheritance walks may go before giving up.

/// Options attached to every [`crate::metadata::module::ModuleDefinition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModuleOptions {
    /// Skip rows with dangling indexes and report them instead of failing the load
    pub lenient: bool,

    /// Record a diagnostic whenever a type reference fails to resolve
    pub report_unresolved: bool,

    /// Maximum depth of enclosing-scope and base-type chains
    pub max_resolution_depth: usize,
}

impl Default for ModuleOptions {
    fn default() -> Self {
        Self {
            lenient: false,
            report_unresolved: true,
            max_resolution_depth: 64,
        }
    }
}

impl ModuleOptions {
    /// Fail the load on the first dangling index.
    #[must_use]
    pub fn strict() -> Self {
        Self::default()
    }

    /// Load whatever can be loaded and report the rest.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            lenient: true,
            ..Self::default()
        }
    }

    /// Lenient loading without resolution reports, for tooling that probes many references.
    #[must_use]
    pub fn quiet() -> Self {
        Self {
            lenient: true,
            report_unresolved: false,
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_options_presets() {
        let default = ModuleOptions::default();
        assert!(!default.lenient);
        assert!(default.report_unresolved);
        assert_eq!(default.max_resolution_depth, 64);

        assert_eq!(ModuleOptions::strict(), default);

        let lenient = ModuleOptions::lenient();
        assert!(lenient.lenient);
        assert!(lenient.report_unresolved);

        let quiet = ModuleOptions::quiet();
        assert!(quiet.lenient);
        assert!(!quiet.report_unresolved);
    }
}
