//! The registration surface handed to plugins.
//!
//! [`PluginApi`] borrows a [`DesignSystem`] mutably and exposes the three
//! registration entry points: static variants, static utility fragments,
//! and functional utilities backed by the shared value-resolution
//! machinery. Names are validated up front; registration invalidates the
//! design system's caches.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::apply::substitute_apply;
use crate::ast::{at_rule, AstNode};
use crate::candidate::CandidateKind;
use crate::compile::CompileCtx;
use crate::data_type::DataType;
use crate::design_system::DesignSystem;
use crate::error::{Error, Result};
use crate::utilities::{
    resolve_functional, Modifiers, ResolveOptions, ResolvedFunctional, UtilityResult,
};
use crate::variants::wrap_selector;

static UTILITY_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9/%._-]*$").unwrap());
static VARIANT_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z][a-zA-Z0-9_-]*$").unwrap());

/// How a plugin-registered variant transforms the candidate output.
pub enum VariantSpec {
    /// Wrap in one selector (`&:hover`) or, with a leading `@`, one
    /// at-rule (`@media print`).
    Single(String),
    /// Duplicate the output under several selectors.
    Parallel(Vec<String>),
    /// An explicit template tree; `@slot` marks the insertion point.
    Tree(Vec<AstNode>),
}

/// Value-resolution configuration for [`PluginApi::match_utilities`].
#[derive(Clone, Default)]
pub struct MatchOptions {
    /// Accepted data types; empty means any.
    pub types: Vec<DataType>,
    /// Bareword value table, `DEFAULT` included.
    pub values: HashMap<String, String>,
    pub modifiers: Modifiers,
    pub supports_negative_values: bool,
}

impl MatchOptions {
    fn to_resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            types: self.types.clone(),
            values: self.values.clone(),
            theme_keys: vec![],
            modifiers: self.modifiers.clone(),
            supports_negative: self.supports_negative_values,
        }
    }
}

/// Mutable registration handle over a design system.
pub struct PluginApi<'a> {
    ds: &'a mut DesignSystem,
}

impl DesignSystem {
    /// The registration surface handed to plugins.
    pub fn plugin_api(&mut self) -> PluginApi<'_> {
        PluginApi { ds: self }
    }
}

impl PluginApi<'_> {
    /// Register a static variant under `name`.
    pub fn add_variant(&mut self, name: &str, spec: VariantSpec) -> Result<()> {
        if !VARIANT_NAME.is_match(name) {
            return Err(Error::invalid_variant_name(name));
        }

        match spec {
            VariantSpec::Single(selector) => {
                if let Some(rest) = selector.strip_prefix('@') {
                    let (at_name, params) = rest.split_once(' ').unwrap_or((rest, ""));
                    let at_name = at_name.to_string();
                    let params = params.trim().to_string();
                    self.ds.variants.static_variant(name, move |nodes| {
                        let inner = std::mem::take(nodes);
                        nodes.push(at_rule(at_name.clone(), params.clone(), inner));
                    });
                } else {
                    self.ds.variants.static_variant(name, move |nodes| {
                        wrap_selector(nodes, selector.clone());
                    });
                }
            }
            VariantSpec::Parallel(selectors) => {
                self.ds.variants.static_variant(name, move |nodes| {
                    let inner = std::mem::take(nodes);
                    for selector in &selectors {
                        nodes.push(crate::ast::rule(selector.clone(), inner.clone()));
                    }
                });
            }
            VariantSpec::Tree(template) => {
                self.ds.variants.from_ast(name, template);
            }
        }

        self.ds.invalidate_caches();
        Ok(())
    }

    /// Register static utility fragments. Keys are class selectors
    /// (`.tab-2`); fragments may contain `@apply`, expanded against the
    /// current design system at registration time.
    pub fn add_utilities(
        &mut self,
        utilities: impl IntoIterator<Item = (String, Vec<AstNode>)>,
    ) -> Result<()> {
        for (selector, mut fragment) in utilities {
            let name = selector
                .strip_prefix('.')
                .filter(|name| UTILITY_NAME.is_match(name))
                .ok_or_else(|| Error::invalid_utility_name(&selector))?;

            {
                let ctx = CompileCtx {
                    theme: &self.ds.theme,
                    utilities: &self.ds.utilities,
                    variants: &self.ds.variants,
                    aliases: &self.ds.aliases,
                };
                substitute_apply(&mut fragment, &ctx);
            }

            self.ds.utilities.static_utility(name, move |candidate, _| {
                if candidate.negative {
                    return UtilityResult::Decline;
                }
                UtilityResult::Emit(fragment.clone())
            });
        }

        self.ds.invalidate_caches();
        Ok(())
    }

    /// Register functional utilities. `run` receives the resolved value
    /// and modifier; value resolution follows `options`. Emitted fragments
    /// may contain `@apply`.
    pub fn match_utilities(
        &mut self,
        utilities: impl IntoIterator<
            Item = (String, Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>),
        >,
        options: &MatchOptions,
    ) -> Result<()> {
        for (name, run) in utilities {
            if !UTILITY_NAME.is_match(&name) {
                return Err(Error::invalid_utility_name(&name));
            }

            let resolve_options = options.to_resolve_options();
            self.ds.utilities.functional(name, move |candidate, ctx| {
                let CandidateKind::Functional { value, modifier, .. } = &candidate.kind else {
                    return UtilityResult::Decline;
                };

                match resolve_functional(
                    value.as_ref(),
                    modifier.as_ref(),
                    candidate.negative,
                    &resolve_options,
                    ctx.theme,
                ) {
                    ResolvedFunctional::Value { value, modifier } => {
                        let mut nodes = run(&value, modifier.as_deref());
                        substitute_apply(&mut nodes, ctx);
                        UtilityResult::Emit(nodes)
                    }
                    ResolvedFunctional::Decline => UtilityResult::Decline,
                    ResolvedFunctional::Invalid => UtilityResult::Invalid,
                }
            });
        }

        self.ds.invalidate_caches();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{decl, rule};
    use crate::design_system::build_design_system;
    use crate::theme::{Theme, ThemeOptions};

    fn test_system() -> DesignSystem {
        let mut theme = Theme::new();
        theme.add("--color-red-500", "#ef4444", ThemeOptions::default()).unwrap();
        build_design_system(theme)
    }

    #[test]
    fn add_variant_single_selector() {
        let mut ds = test_system();
        ds.plugin_api()
            .add_variant("hocus", VariantSpec::Single("&:is(:hover, :focus)".into()))
            .unwrap();

        let css = ds.candidates_to_css(["hocus:flex"]);
        assert_eq!(
            css[0].as_deref(),
            Some(".hocus\\:flex {\n  &:is(:hover, :focus) {\n    display: flex;\n  }\n}\n")
        );
    }

    #[test]
    fn add_variant_at_rule() {
        let mut ds = test_system();
        ds.plugin_api()
            .add_variant("print", VariantSpec::Single("@media print".into()))
            .unwrap();

        let css = ds.candidates_to_css(["print:hidden"]);
        assert_eq!(
            css[0].as_deref(),
            Some(".print\\:hidden {\n  @media print {\n    display: none;\n  }\n}\n")
        );
    }

    #[test]
    fn add_variant_rejects_bad_names() {
        let mut ds = test_system();
        let result = ds
            .plugin_api()
            .add_variant("Not Valid", VariantSpec::Single("&:hover".into()));
        assert!(matches!(result, Err(Error::InvalidVariantName { .. })));
    }

    #[test]
    fn add_utilities_registers_static_fragments() {
        let mut ds = test_system();
        ds.plugin_api()
            .add_utilities([(
                ".tab-4".to_string(),
                vec![decl("tab-size", "4")],
            )])
            .unwrap();

        let css = ds.candidates_to_css(["tab-4"]);
        assert_eq!(css[0].as_deref(), Some(".tab-4 {\n  tab-size: 4;\n}\n"));
    }

    #[test]
    fn add_utilities_expands_apply() {
        let mut ds = test_system();
        ds.plugin_api()
            .add_utilities([(
                ".card".to_string(),
                vec![at_rule("apply", "flex bg-red-500", vec![])],
            )])
            .unwrap();

        let css = ds.candidates_to_css(["card"]);
        let rendered = css[0].as_deref().unwrap();
        assert!(rendered.contains("display: flex;"));
        assert!(rendered.contains("background-color: var(--color-red-500, #ef4444);"));
    }

    #[test]
    fn add_utilities_requires_class_selector_keys() {
        let mut ds = test_system();
        let result = ds
            .plugin_api()
            .add_utilities([("tab-4".to_string(), vec![decl("tab-size", "4")])]);
        assert!(matches!(result, Err(Error::InvalidUtilityName { .. })));

        let result = ds
            .plugin_api()
            .add_utilities([(".Tab".to_string(), vec![decl("tab-size", "4")])]);
        assert!(matches!(result, Err(Error::InvalidUtilityName { .. })));
    }

    #[test]
    fn match_utilities_resolves_values_and_declines() {
        let mut ds = test_system();
        let options = MatchOptions {
            types: vec![DataType::Length],
            values: [("thin".to_string(), "2px".to_string())].into(),
            ..Default::default()
        };
        ds.plugin_api()
            .match_utilities(
                [(
                    "scrollbar".to_string(),
                    Box::new(|value: &str, _: Option<&str>| vec![decl("scrollbar-width", value)])
                        as Box<dyn Fn(&str, Option<&str>) -> Vec<AstNode>>,
                )],
                &options,
            )
            .unwrap();

        let css = ds.candidates_to_css(["scrollbar-thin", "scrollbar-[33%]", "scrollbar-[10px]"]);
        assert_eq!(
            css[0].as_deref(),
            Some(".scrollbar-thin {\n  scrollbar-width: 2px;\n}\n")
        );
        // 33% infers as a percentage, which this utility does not accept.
        assert_eq!(css[1], None);
        assert_eq!(
            css[2].as_deref(),
            Some(".scrollbar-\\[10px\\] {\n  scrollbar-width: 10px;\n}\n")
        );
    }

    #[test]
    fn later_registrations_shadow_built_ins() {
        let mut ds = test_system();
        ds.plugin_api()
            .add_utilities([(".flex".to_string(), vec![rule("&", vec![decl("display", "flex")])])])
            .unwrap();

        // Latest registration wins resolution for the shared root.
        let css = ds.candidates_to_css(["flex"]);
        assert!(css[0].is_some());
    }
}
