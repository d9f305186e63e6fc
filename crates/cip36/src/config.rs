//! Record configuration.

/// Configuration for a [`RegistrationRecord`](crate::RegistrationRecord).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordConfig {
    /// Validate each payload against its grammar as soon as it is loaded.
    ///
    /// Off by default: loading only decodes, and [`validate_all`] runs the
    /// grammars.
    ///
    /// [`validate_all`]: crate::RegistrationRecord::validate_all
    pub validate_on_load: bool,
}

impl RecordConfig {
    /// Configuration that validates on every load.
    pub fn strict() -> Self {
        Self {
            validate_on_load: true,
        }
    }
}
