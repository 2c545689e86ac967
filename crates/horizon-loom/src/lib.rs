//! Utility-class compilation engine for Horizon Loom.
//!
//! This crate turns utility class strings into style rules, featuring:
//!
//! - **Theme**: ordered design-token store with inline/reference semantics
//! - **Candidate parsing**: the `variant:variant:root-value/modifier!` grammar,
//!   arbitrary values, and legacy alias remapping
//! - **Registries**: extensible utility and variant generators with
//!   deterministic fallthrough
//! - **Sorting**: a total order over class lists for cascade-stable output
//! - **Plugins**: a registration surface for custom utilities and variants
//!
//! # Example
//!
//! ```ignore
//! use horizon_loom::prelude::*;
//!
//! let mut theme = Theme::new();
//! theme.add("--color-red-500", "#ef4444", ThemeOptions::default())?;
//!
//! let mut ds = build_design_system(theme);
//! let css = ds.candidates_to_css(["hover:bg-red-500"]);
//! ```

pub mod apply;
pub mod ast;
pub mod candidate;
pub mod compile;
pub mod data_type;
pub mod design_system;
pub mod escape;
pub mod plugin;
pub mod sort;
pub mod theme;
pub mod utilities;
pub mod variants;

mod error;

pub use error::{Error, Result};

/// Prelude module with commonly used types.
pub mod prelude {
    pub use crate::ast::{at_rule, comment, decl, rule, to_css, AstNode};
    pub use crate::candidate::{
        Candidate, CandidateKind, CandidateModifier, CandidateValue, Variant, VariantValue,
    };
    pub use crate::compile::{CompileCtx, CompiledClass};
    pub use crate::data_type::{infer_data_type, DataType};
    pub use crate::design_system::{build_design_system, DesignSystem};
    pub use crate::plugin::{MatchOptions, PluginApi, VariantSpec};
    pub use crate::theme::{Theme, ThemeOptions};
    pub use crate::utilities::{Modifiers, Utilities, UtilityKind, UtilityResult};
    pub use crate::variants::{VariantKind, VariantResult, Variants};
    pub use crate::{Error, Result};
}
