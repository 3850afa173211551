//! Session configuration.

use crate::base::Name;

/// Knobs for one analysis session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Name of the module under analysis, reported in logs.
    pub module_name: Name,
    /// Force return-type resolution of interop methods against their
    /// declaring class before reading the return type.
    pub interop_return_type_workaround: bool,
    /// Size of the dedicated worker pool for parallel traversal.
    /// `None` uses the global rayon pool.
    pub parallelism: Option<usize>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            module_name: Name::new_static("main"),
            interop_return_type_workaround: true,
            parallelism: None,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_module_name(mut self, name: impl Into<Name>) -> Self {
        self.module_name = name.into();
        self
    }

    pub fn with_interop_return_type_workaround(mut self, enabled: bool) -> Self {
        self.interop_return_type_workaround = enabled;
        self
    }

    pub fn with_parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads.max(1));
        self
    }
}
