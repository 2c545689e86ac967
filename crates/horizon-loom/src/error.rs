//! Error types for the design system engine.
//!
//! Only configuration-time problems surface as errors: invalid utility or
//! variant names handed to the plugin API, or a mis-scoped `initial` theme
//! directive. Anything that goes wrong while parsing or compiling a
//! candidate degrades to "no output for this candidate" instead.

/// Result type alias for design system operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while configuring the design system.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A theme namespace directive carried a value other than `initial`.
    #[error("Invalid theme value `{value}` for namespace `{key}`")]
    InvalidThemeValue { key: String, value: String },

    /// A plugin registered a utility under an unacceptable name.
    #[error(
        "`{name}` is not a valid utility name. Utilities must be a single class \
         name and start with a lowercase letter, e.g. `scrollbar-none`"
    )]
    InvalidUtilityName { name: String },

    /// A plugin registered a variant under an unacceptable name.
    #[error("`{name}` is not a valid variant name")]
    InvalidVariantName { name: String },
}

impl Error {
    /// Create an invalid-theme-value error.
    pub fn invalid_theme_value(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::InvalidThemeValue {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Create an invalid-utility-name error.
    pub fn invalid_utility_name(name: impl Into<String>) -> Self {
        Self::InvalidUtilityName { name: name.into() }
    }

    /// Create an invalid-variant-name error.
    pub fn invalid_variant_name(name: impl Into<String>) -> Self {
        Self::InvalidVariantName { name: name.into() }
    }
}
