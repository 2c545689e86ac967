//! Variant registry.
//!
//! A variant wraps generated style output in an outer context: a selector
//! (`hover` → `&:hover`), a media condition (`dark`, `sm`), or a composition
//! around another variant (`group-hover`, `not-focus`). Appliers transform
//! the node list in place; registration order doubles as the variant's
//! position in the sort order.

use std::collections::HashMap;

use crate::ast::{at_rule, rule, AstNode};
use crate::candidate::{Variant, VariantValue};
use crate::theme::Theme;

/// The shape of a registered variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantKind {
    Static,
    Functional,
    Compound,
}

/// Outcome of applying a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VariantResult {
    Applied,
    /// The variant does not apply to this candidate; the whole candidate is
    /// discarded.
    Invalid,
}

enum VariantApply {
    Static(Box<dyn Fn(&mut Vec<AstNode>)>),
    Functional(Box<dyn Fn(&mut Vec<AstNode>, Option<&VariantValue>) -> VariantResult>),
    Compound(Box<dyn Fn(&mut Vec<AstNode>, &Variant, &Variants) -> VariantResult>),
}

struct VariantEntry {
    kind: VariantKind,
    index: usize,
    apply: VariantApply,
}

/// Named variant generators, keyed by root.
#[derive(Default)]
pub struct Variants {
    entries: HashMap<String, VariantEntry>,
    next_index: usize,
}

/// Wrap the current nodes in a single selector rule.
pub(crate) fn wrap_selector(nodes: &mut Vec<AstNode>, selector: impl Into<String>) {
    let inner = std::mem::take(nodes);
    nodes.push(rule(selector, inner));
}

/// Wrap the current nodes in a media at-rule.
pub(crate) fn wrap_media(nodes: &mut Vec<AstNode>, params: impl Into<String>) {
    let inner = std::mem::take(nodes);
    nodes.push(at_rule("media", params, inner));
}

impl Variants {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static variant. Re-registering a name replaces the old
    /// entry and moves it to the end of the declaration order.
    pub fn static_variant(
        &mut self,
        name: impl Into<String>,
        apply: impl Fn(&mut Vec<AstNode>) + 'static,
    ) {
        self.insert(name.into(), VariantKind::Static, VariantApply::Static(Box::new(apply)));
    }

    /// Register a functional variant.
    pub fn functional(
        &mut self,
        name: impl Into<String>,
        apply: impl Fn(&mut Vec<AstNode>, Option<&VariantValue>) -> VariantResult + 'static,
    ) {
        self.insert(
            name.into(),
            VariantKind::Functional,
            VariantApply::Functional(Box::new(apply)),
        );
    }

    /// Register a compound variant: one that composes around an inner
    /// variant. The applier receives the registry so it can materialize the
    /// inner variant.
    pub fn compound(
        &mut self,
        name: impl Into<String>,
        apply: impl Fn(&mut Vec<AstNode>, &Variant, &Variants) -> VariantResult + 'static,
    ) {
        self.insert(
            name.into(),
            VariantKind::Compound,
            VariantApply::Compound(Box::new(apply)),
        );
    }

    /// Register a static variant from a declarative template tree.
    ///
    /// `@slot` at-rules mark where the candidate's output is inserted; if
    /// the template has none, empty rules serve as insertion points instead.
    pub fn from_ast(&mut self, name: impl Into<String>, template: Vec<AstNode>) {
        self.static_variant(name, move |nodes| {
            let inner = std::mem::take(nodes);
            let mut tree = template.clone();

            let mut replaced = substitute_slots(&mut tree, &inner, false);
            if !replaced {
                replaced = substitute_slots(&mut tree, &inner, true);
            }
            if !replaced {
                tracing::warn!("variant template has no `@slot` or empty rule; output dropped");
            }

            *nodes = tree;
        });
    }

    fn insert(&mut self, name: String, kind: VariantKind, apply: VariantApply) {
        let index = self.next_index;
        self.next_index += 1;
        self.entries.insert(name, VariantEntry { kind, index, apply });
    }

    /// The kind registered under `root`, if any.
    pub fn kind_of(&self, root: &str) -> Option<VariantKind> {
        self.entries.get(root).map(|entry| entry.kind)
    }

    /// Whether `root` is registered.
    pub fn contains(&self, root: &str) -> bool {
        self.entries.contains_key(root)
    }

    /// Declaration-order index of `root`, if registered.
    pub fn order_of(&self, root: &str) -> Option<usize> {
        self.entries.get(root).map(|entry| entry.index)
    }

    /// Apply a parsed variant to a node list.
    pub fn apply(&self, variant: &Variant, nodes: &mut Vec<AstNode>) -> VariantResult {
        let Some(entry) = self.entries.get(variant.root()) else {
            return VariantResult::Invalid;
        };

        match (&entry.apply, variant) {
            (VariantApply::Static(apply), Variant::Static { .. }) => {
                apply(nodes);
                VariantResult::Applied
            }
            (VariantApply::Functional(apply), Variant::Functional { value, .. }) => {
                apply(nodes, value.as_ref())
            }
            (VariantApply::Compound(apply), Variant::Compound { inner, .. }) => {
                apply(nodes, inner, self)
            }
            _ => VariantResult::Invalid,
        }
    }

    /// All registered variant names in declaration order.
    pub fn names(&self) -> Vec<(&str, VariantKind)> {
        let mut names: Vec<_> = self
            .entries
            .iter()
            .map(|(name, entry)| (entry.index, name.as_str(), entry.kind))
            .collect();
        names.sort_by_key(|(index, ..)| *index);
        names.into_iter().map(|(_, name, kind)| (name, kind)).collect()
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Replace insertion points in `tree` with `inner`. When `fill_empty_rules`
/// is set, empty rules count as insertion points; otherwise only `@slot`
/// at-rules do.
fn substitute_slots(tree: &mut Vec<AstNode>, inner: &[AstNode], fill_empty_rules: bool) -> bool {
    let mut replaced = false;
    let mut idx = 0;

    while idx < tree.len() {
        let is_slot = matches!(
            &tree[idx],
            AstNode::AtRule { name, .. } if !fill_empty_rules && name == "slot"
        );
        if is_slot {
            tree.splice(idx..=idx, inner.to_vec());
            replaced = true;
            idx += inner.len();
            continue;
        }

        match &mut tree[idx] {
            AstNode::Rule { nodes, .. } if fill_empty_rules && nodes.is_empty() => {
                *nodes = inner.to_vec();
                replaced = true;
            }
            AstNode::Rule { nodes, .. } | AstNode::AtRule { nodes, .. } => {
                replaced |= substitute_slots(nodes, inner, fill_empty_rules);
            }
            _ => {}
        }
        idx += 1;
    }

    replaced
}

/// Extract the selector suffix a variant would wrap output in, by applying
/// it to an empty probe. Only plain `&`-prefixed selector wraps qualify;
/// media or multi-rule variants yield `None`.
fn probe_selector(variants: &Variants, variant: &Variant) -> Option<String> {
    let mut probe = vec![];
    if variants.apply(variant, &mut probe) == VariantResult::Invalid {
        return None;
    }

    match probe.as_slice() {
        [AstNode::Rule { selector, .. }] => selector.strip_prefix('&').map(str::to_string),
        _ => None,
    }
}

/// Build the default variant set against a theme.
///
/// Responsive variants are generated from the `--breakpoint` namespace, so
/// the theme must be fully configured before the registry is built.
pub fn create_variants(theme: &Theme) -> Variants {
    let mut variants = Variants::new();

    let pseudo_classes = [
        ("hover", "&:hover"),
        ("focus", "&:focus"),
        ("focus-within", "&:focus-within"),
        ("focus-visible", "&:focus-visible"),
        ("active", "&:active"),
        ("visited", "&:visited"),
        ("disabled", "&:disabled"),
        ("checked", "&:checked"),
        ("first", "&:first-child"),
        ("last", "&:last-child"),
        ("odd", "&:nth-child(odd)"),
        ("even", "&:nth-child(even)"),
    ];
    for (name, selector) in pseudo_classes {
        variants.static_variant(name, move |nodes| wrap_selector(nodes, selector));
    }

    let pseudo_elements = [
        ("before", "&::before"),
        ("after", "&::after"),
        ("placeholder", "&::placeholder"),
        ("selection", "&::selection"),
    ];
    for (name, selector) in pseudo_elements {
        variants.static_variant(name, move |nodes| wrap_selector(nodes, selector));
    }

    variants.compound("not", |nodes, inner, registry| {
        let Some(suffix) = probe_selector(registry, inner) else {
            return VariantResult::Invalid;
        };
        wrap_selector(nodes, format!("&:not({suffix})"));
        VariantResult::Applied
    });

    variants.compound("group", |nodes, inner, registry| {
        let Some(suffix) = probe_selector(registry, inner) else {
            return VariantResult::Invalid;
        };
        wrap_selector(nodes, format!("&:is(:where(.group){suffix} *)"));
        VariantResult::Applied
    });

    variants.compound("peer", |nodes, inner, registry| {
        let Some(suffix) = probe_selector(registry, inner) else {
            return VariantResult::Invalid;
        };
        wrap_selector(nodes, format!("&:is(:where(.peer){suffix} ~ *)"));
        VariantResult::Applied
    });

    variants.static_variant("dark", |nodes| {
        wrap_media(nodes, "(prefers-color-scheme: dark)");
    });

    // Responsive variants come from the theme's breakpoint tokens, in the
    // order the theme declares them.
    let mut breakpoints = HashMap::new();
    for (name, value) in theme.namespace("--breakpoint") {
        let Some(name) = name else { continue };
        breakpoints.insert(name.clone(), value.clone());

        variants.static_variant(name, move |nodes| {
            wrap_media(nodes, format!("(width >= {value})"));
        });
    }

    variants.functional("max", move |nodes, value| {
        let width = match value {
            Some(VariantValue::Arbitrary(value)) => value.clone(),
            Some(VariantValue::Named(name)) => match breakpoints.get(name) {
                Some(value) => value.clone(),
                None => return VariantResult::Invalid,
            },
            None => return VariantResult::Invalid,
        };

        wrap_media(nodes, format!("(width < {width})"));
        VariantResult::Applied
    });

    variants
}
