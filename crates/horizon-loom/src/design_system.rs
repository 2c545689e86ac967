//! The design-system facade.
//!
//! [`DesignSystem`] owns the theme, the utility and variant registries, the
//! legacy alias table, and per-input caches for parsing and compilation.
//! Caches key on the exact input string and are never invalidated; plugin
//! registration clears them wholesale. Rebuild the instance to pick up a
//! changed theme.

use std::collections::HashMap;

use crate::ast::{rule, to_css, AstNode};
use crate::candidate::{self, Candidate, Variant, LEGACY_ALIASES};
use crate::compile::{self, CompileCtx, CompiledClass};
use crate::escape::class_selector;
use crate::sort::sort_class_list;
use crate::theme::Theme;
use crate::utilities::{create_utilities, Utilities, UtilityKind};
use crate::variants::{create_variants, VariantKind, Variants};

/// Dotted-path namespace heads that differ from their theme prefix.
const THEME_PATH_HEADS: &[(&str, &str)] = &[
    ("colors", "--color"),
    ("screens", "--breakpoint"),
    ("fontSize", "--font-size"),
    ("borderRadius", "--radius"),
    ("boxShadow", "--shadow"),
];

pub struct DesignSystem {
    pub theme: Theme,
    pub(crate) utilities: Utilities,
    pub(crate) variants: Variants,
    pub(crate) aliases: HashMap<String, String>,
    parsed_candidates: HashMap<String, Vec<Candidate>>,
    parsed_variants: HashMap<String, Option<Variant>>,
    compiled: HashMap<String, Option<CompiledClass>>,
}

/// Build a design system with the built-in utilities, variants and legacy
/// alias table installed.
pub fn build_design_system(theme: Theme) -> DesignSystem {
    tracing::debug!(tokens = theme.len(), "building design system");
    let variants = create_variants(&theme);
    DesignSystem {
        theme,
        utilities: create_utilities(),
        variants,
        aliases: LEGACY_ALIASES
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect(),
        parsed_candidates: HashMap::new(),
        parsed_variants: HashMap::new(),
        compiled: HashMap::new(),
    }
}

impl DesignSystem {
    /// Parse a raw class string, cached. Ambiguous inputs yield several
    /// candidates, unknown ones none.
    pub fn parse_candidate(&mut self, input: &str) -> Vec<Candidate> {
        if let Some(hit) = self.parsed_candidates.get(input) {
            return hit.clone();
        }
        let parsed =
            candidate::parse_candidate(input, &self.utilities, &self.variants, &self.aliases);
        self.parsed_candidates.insert(input.to_string(), parsed.clone());
        parsed
    }

    /// Parse a single variant token, cached.
    pub fn parse_variant(&mut self, input: &str) -> Option<Variant> {
        if let Some(hit) = self.parsed_variants.get(input) {
            return hit.clone();
        }
        let parsed = candidate::parse_variant(input, &self.variants);
        self.parsed_variants.insert(input.to_string(), parsed.clone());
        parsed
    }

    /// Compile a raw class string to its style fragment and sort key,
    /// cached. `None` for anything that is not a known class.
    pub fn compile_ast_nodes(&mut self, raw: &str) -> Option<CompiledClass> {
        if let Some(hit) = self.compiled.get(raw) {
            return hit.clone();
        }
        let ctx = CompileCtx {
            theme: &self.theme,
            utilities: &self.utilities,
            variants: &self.variants,
            aliases: &self.aliases,
        };
        let compiled = compile::compile_ast_nodes(raw, &ctx);
        self.compiled.insert(raw.to_string(), compiled.clone());
        compiled
    }

    /// Per-class CSS: each known class becomes a `.{escaped}` rule, each
    /// unknown class `None`. Output depends only on the individual inputs,
    /// never on their order.
    pub fn candidates_to_css<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Vec<Option<String>> {
        classes
            .into_iter()
            .map(|raw| {
                self.compile_ast_nodes(raw).map(|compiled| {
                    to_css(&[rule(class_selector(raw), compiled.nodes)])
                })
            })
            .collect()
    }

    /// One merged rule list for a class set, ordered by sort key. Equal
    /// keys (two values of one utility) tie-break on the canonical class
    /// name, so the output never depends on submission order. Unknown
    /// classes contribute nothing.
    pub fn compile_candidates<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Vec<AstNode> {
        let mut compiled: Vec<(String, CompiledClass)> = classes
            .into_iter()
            .filter_map(|raw| self.compile_ast_nodes(raw).map(|c| (raw.to_string(), c)))
            .collect();
        compiled.sort_by_key(|(_, c)| (c.sort_key, c.candidate.to_class()));
        compiled
            .into_iter()
            .map(|(raw, c)| rule(class_selector(&raw), c.nodes))
            .collect()
    }

    /// Each class paired with its sort key; `None` for unknown classes.
    pub fn class_order<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Vec<(String, Option<u64>)> {
        classes
            .into_iter()
            .map(|raw| {
                let key = self.compile_ast_nodes(raw).map(|c| c.sort_key);
                (raw.to_string(), key)
            })
            .collect()
    }

    /// Stable total order over a class list: unknown classes first in
    /// input order, then known classes by sort key.
    pub fn sorted_class_list<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a str>,
    ) -> Vec<String> {
        let mut keyed = self.class_order(classes);
        sort_class_list(&mut keyed);
        keyed.into_iter().map(|(name, _)| name).collect()
    }

    /// Registered utility roots with their kinds, in registration order.
    pub fn class_list(&self) -> Vec<(String, UtilityKind)> {
        self.utilities
            .names()
            .into_iter()
            .map(|(name, kind)| (name.to_string(), kind))
            .collect()
    }

    /// Registered variant roots with their kinds, in registration order.
    pub fn variant_list(&self) -> Vec<(String, VariantKind)> {
        self.variants
            .names()
            .into_iter()
            .map(|(name, kind)| (name.to_string(), kind))
            .collect()
    }

    /// Resolve a dotted config path (`colors.red.500`) against the theme,
    /// falling back to `default` when no token exists.
    pub fn resolve_theme_value(&self, path: &str, default: Option<&str>) -> Option<String> {
        let mut segments = path.split('.');
        let head = segments.next()?;
        if head.is_empty() {
            return default.map(str::to_string);
        }

        let namespace = THEME_PATH_HEADS
            .iter()
            .find(|(name, _)| *name == head)
            .map(|(_, ns)| (*ns).to_string())
            .unwrap_or_else(|| format!("--{head}"));

        let rest: Vec<&str> = segments.collect();
        let value = if rest.is_empty() {
            self.theme.resolve(None, &[&namespace])
        } else {
            self.theme.resolve(Some(&rest.join("-")), &[&namespace])
        };

        value.or_else(|| default.map(str::to_string))
    }

    /// Plugin registration mutates the registries, so cached parses and
    /// compilations may be stale. Dropped wholesale.
    pub(crate) fn invalidate_caches(&mut self) {
        tracing::debug!(
            candidates = self.parsed_candidates.len(),
            compiled = self.compiled.len(),
            "invalidating caches after registration"
        );
        self.parsed_candidates.clear();
        self.parsed_variants.clear();
        self.compiled.clear();
    }
}
