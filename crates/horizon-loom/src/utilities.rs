//! Utility registry and value resolution.
//!
//! A utility is a named generator mapping a candidate to style-fragment
//! output. Static utilities are value-independent (`flex`); functional
//! utilities resolve a value through a bareword table and/or the theme
//! (`bg-red-500`, `w-[33px]`).
//!
//! Several generators may be registered for the same root. Resolution runs
//! them newest-first so later registrations (plugins) win, with an explicit
//! three-state result to keep fallthrough unambiguous: [`UtilityResult::Decline`]
//! passes the candidate to the next generator, [`UtilityResult::Invalid`]
//! rejects the candidate outright.

use std::collections::HashMap;

use crate::ast::{decl, AstNode};
use crate::candidate::{Candidate, CandidateKind, CandidateModifier, CandidateValue};
use crate::compile::CompileCtx;
use crate::data_type::{infer_data_type, DataType};
use crate::theme::Theme;

/// The shape of a registered utility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UtilityKind {
    Static,
    Functional,
}

/// Outcome of running one utility generator.
pub enum UtilityResult {
    /// The generator matched; emit these nodes.
    Emit(Vec<AstNode>),
    /// The generator does not apply; another generator for the same root
    /// may still match.
    Decline,
    /// The candidate is structurally invalid for this root; no other
    /// generator may claim it.
    Invalid,
}

/// Outcome of resolving a candidate against every generator for its root.
pub(crate) enum ResolveOutcome {
    /// Matched: the emitted nodes and the registration index of the
    /// generator that produced them (the sorter's utility order).
    Emit(Vec<AstNode>, usize),
    Decline,
    Invalid,
}

type UtilityFn = Box<dyn Fn(&Candidate, &CompileCtx<'_>) -> UtilityResult>;

struct UtilityEntry {
    kind: UtilityKind,
    index: usize,
    run: UtilityFn,
}

/// Named utility generators, keyed by root.
#[derive(Default)]
pub struct Utilities {
    entries: HashMap<String, Vec<UtilityEntry>>,
    next_index: usize,
}

impl Utilities {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a static utility under `name`.
    pub fn static_utility(
        &mut self,
        name: impl Into<String>,
        run: impl Fn(&Candidate, &CompileCtx<'_>) -> UtilityResult + 'static,
    ) {
        self.insert(name.into(), UtilityKind::Static, Box::new(run));
    }

    /// Register a functional utility under `root`.
    pub fn functional(
        &mut self,
        root: impl Into<String>,
        run: impl Fn(&Candidate, &CompileCtx<'_>) -> UtilityResult + 'static,
    ) {
        self.insert(root.into(), UtilityKind::Functional, Box::new(run));
    }

    fn insert(&mut self, name: String, kind: UtilityKind, run: UtilityFn) {
        let index = self.next_index;
        self.next_index += 1;
        self.entries
            .entry(name)
            .or_default()
            .push(UtilityEntry { kind, index, run });
    }

    /// Whether a static utility named `name` exists.
    pub fn has_static(&self, name: &str) -> bool {
        self.entries
            .get(name)
            .is_some_and(|entries| entries.iter().any(|e| e.kind == UtilityKind::Static))
    }

    /// Whether any functional generator is registered for `root`.
    pub fn has_functional(&self, root: &str) -> bool {
        self.entries
            .get(root)
            .is_some_and(|entries| entries.iter().any(|e| e.kind == UtilityKind::Functional))
    }

    /// Resolve a candidate through the generators for its root,
    /// newest-first.
    pub(crate) fn resolve(&self, candidate: &Candidate, ctx: &CompileCtx<'_>) -> ResolveOutcome {
        let (root, kind) = match &candidate.kind {
            CandidateKind::Static { root } => (root, UtilityKind::Static),
            CandidateKind::Functional { root, .. } => (root, UtilityKind::Functional),
            // Arbitrary properties bypass the registry entirely.
            CandidateKind::Arbitrary { .. } => return ResolveOutcome::Decline,
        };

        let Some(entries) = self.entries.get(root.as_str()) else {
            return ResolveOutcome::Decline;
        };

        for entry in entries.iter().rev() {
            if entry.kind != kind {
                continue;
            }
            match (entry.run)(candidate, ctx) {
                UtilityResult::Emit(nodes) => return ResolveOutcome::Emit(nodes, entry.index),
                UtilityResult::Decline => continue,
                UtilityResult::Invalid => return ResolveOutcome::Invalid,
            }
        }

        ResolveOutcome::Decline
    }

    /// All registered utility names with their kinds, in first-registration
    /// order. Roots with several generators appear once.
    pub fn names(&self) -> Vec<(&str, UtilityKind)> {
        let mut names: Vec<_> = self
            .entries
            .iter()
            .filter_map(|(name, entries)| {
                entries
                    .iter()
                    .map(|e| e.index)
                    .min()
                    .map(|index| (index, name.as_str(), entries[0].kind))
            })
            .collect();
        names.sort_by_key(|(index, ..)| *index);
        names.into_iter().map(|(_, name, kind)| (name, kind)).collect()
    }

    /// Number of distinct utility roots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Modifier acceptance for a functional utility.
#[derive(Debug, Clone, Default)]
pub enum Modifiers {
    /// No modifier table; only the implicit color-alpha path applies.
    #[default]
    None,
    /// Any modifier value passes through raw.
    Any,
    /// Barewords resolve through this table.
    Map(HashMap<String, String>),
}

/// Configuration for the shared functional-value resolution machinery.
#[derive(Default)]
pub(crate) struct ResolveOptions {
    /// Accepted data types. Empty means "any".
    pub types: Vec<DataType>,
    /// Bareword value table; `DEFAULT` is used when no value is written.
    pub values: HashMap<String, String>,
    /// Theme namespaces tried, in priority order, for named values not in
    /// the table.
    pub theme_keys: Vec<&'static str>,
    pub modifiers: Modifiers,
    pub supports_negative: bool,
}

pub(crate) enum ResolvedFunctional {
    Value {
        value: String,
        modifier: Option<String>,
    },
    Decline,
    Invalid,
}

/// Resolve a functional candidate's value and modifier.
///
/// This is the machinery behind both the built-in utilities and
/// `match_utilities`: value tables with `DEFAULT`, implicit color values,
/// arbitrary-value type filtering and inference, modifier tables with the
/// numeric-alpha fallback for colors, alpha composition, and negation.
pub(crate) fn resolve_functional(
    value: Option<&CandidateValue>,
    modifier: Option<&CandidateModifier>,
    negative: bool,
    options: &ResolveOptions,
    theme: &Theme,
) -> ResolvedFunctional {
    if negative && !options.supports_negative {
        return ResolvedFunctional::Decline;
    }

    let is_color = options.types.contains(&DataType::Color);
    let is_any = options.types.is_empty() || options.types.contains(&DataType::Any);

    // Throw out arbitrary values of an unsupported type. Declined, not
    // rejected: on a layered root (`text-[length:2rem]` against the color
    // generator) a sibling generator may still accept the type.
    if let Some(CandidateValue::Arbitrary { value, data_type }) = value {
        if !is_any {
            let supported = match data_type {
                Some(tag) => options.types.contains(tag),
                None => infer_data_type(value, &options.types).is_some(),
            };
            if !supported {
                return ResolvedFunctional::Decline;
            }
        }
    }

    let lookup = |name: &str| -> Option<String> {
        if let Some(hit) = options.values.get(name) {
            return Some(hit.clone());
        }
        if is_color {
            // Color utilities implicitly support these unless overridden.
            match name {
                "inherit" => return Some("inherit".to_string()),
                "transparent" => return Some("transparent".to_string()),
                "current" => return Some("currentColor".to_string()),
                _ => {}
            }
        }
        None
    };

    let mut resolved = match value {
        None => match lookup("DEFAULT") {
            Some(value) => Some(value),
            None => theme.resolve(None, &options.theme_keys),
        },
        Some(CandidateValue::Named(name)) => match lookup(name) {
            Some(value) => Some(value),
            None => theme.resolve(Some(name), &options.theme_keys),
        },
        Some(CandidateValue::Arbitrary { value, .. }) => Some(value.clone()),
    };

    let Some(mut value_str) = resolved.take() else {
        return ResolvedFunctional::Decline;
    };

    let resolved_modifier = match modifier {
        None => None,
        Some(CandidateModifier::Arbitrary(raw)) => Some(raw.clone()),
        Some(CandidateModifier::Named(raw)) => match &options.modifiers {
            Modifiers::Any => Some(raw.clone()),
            Modifiers::Map(map) if map.contains_key(raw) => map.get(raw).cloned(),
            _ if is_color && raw.parse::<f64>().is_ok() => Some(format!("{raw}%")),
            _ => None,
        },
    };

    // A modifier was written but did not resolve. Arbitrary values block
    // fallthrough so an unrelated utility cannot claim the candidate.
    if modifier.is_some() && resolved_modifier.is_none() {
        return if value.is_some_and(CandidateValue::is_arbitrary) {
            ResolvedFunctional::Invalid
        } else {
            ResolvedFunctional::Decline
        };
    }

    if is_color {
        if let Some(alpha) = &resolved_modifier {
            value_str = with_alpha(&value_str, alpha);
        }
    }

    if negative {
        value_str = with_negative(&value_str);
    }

    ResolvedFunctional::Value {
        value: value_str,
        modifier: resolved_modifier,
    }
}

/// Compose a color value with an alpha percentage.
pub fn with_alpha(value: &str, alpha: &str) -> String {
    let alpha = alpha.trim();
    // Plain numbers (`0.5`) become percentages (`50%`).
    let alpha = match alpha.parse::<f64>() {
        Ok(number) => format!("{}%", number * 100.0),
        Err(_) => alpha.to_string(),
    };

    format!("color-mix(in srgb, {value} {alpha}, transparent)")
}

/// Sign-flip a resolved value.
pub fn with_negative(value: &str) -> String {
    format!("calc({value} * -1)")
}

fn static_decls(
    utilities: &mut Utilities,
    name: &'static str,
    declarations: &'static [(&'static str, &'static str)],
) {
    utilities.static_utility(name, move |candidate, _| {
        if candidate.negative {
            return UtilityResult::Decline;
        }
        UtilityResult::Emit(
            declarations
                .iter()
                .map(|(property, value)| decl(*property, *value))
                .collect(),
        )
    });
}

/// Register a theme-driven functional utility: value resolution through
/// `options`, declarations built by `make`.
fn theme_functional(
    utilities: &mut Utilities,
    root: &'static str,
    options: ResolveOptions,
    make: impl Fn(&str) -> Vec<AstNode> + 'static,
) {
    utilities.functional(root, move |candidate, ctx| {
        let CandidateKind::Functional { value, modifier, .. } = &candidate.kind else {
            return UtilityResult::Decline;
        };

        match resolve_functional(
            value.as_ref(),
            modifier.as_ref(),
            candidate.negative,
            &options,
            ctx.theme,
        ) {
            ResolvedFunctional::Value { value, .. } => UtilityResult::Emit(make(&value)),
            ResolvedFunctional::Decline => UtilityResult::Decline,
            ResolvedFunctional::Invalid => UtilityResult::Invalid,
        }
    });
}

fn values(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Build the default utility set.
///
/// Generators read the theme at compile time through [`CompileCtx`], so the
/// registry itself does not capture theme state.
pub fn create_utilities() -> Utilities {
    let mut utilities = Utilities::new();

    // Display.
    static_decls(&mut utilities, "block", &[("display", "block")]);
    static_decls(&mut utilities, "inline-block", &[("display", "inline-block")]);
    static_decls(&mut utilities, "inline", &[("display", "inline")]);
    static_decls(&mut utilities, "flex", &[("display", "flex")]);
    static_decls(&mut utilities, "inline-flex", &[("display", "inline-flex")]);
    static_decls(&mut utilities, "grid", &[("display", "grid")]);
    static_decls(&mut utilities, "inline-grid", &[("display", "inline-grid")]);
    static_decls(&mut utilities, "contents", &[("display", "contents")]);
    static_decls(&mut utilities, "hidden", &[("display", "none")]);

    // Position.
    static_decls(&mut utilities, "static", &[("position", "static")]);
    static_decls(&mut utilities, "fixed", &[("position", "fixed")]);
    static_decls(&mut utilities, "absolute", &[("position", "absolute")]);
    static_decls(&mut utilities, "relative", &[("position", "relative")]);
    static_decls(&mut utilities, "sticky", &[("position", "sticky")]);

    // Text overflow.
    static_decls(
        &mut utilities,
        "truncate",
        &[
            ("overflow", "hidden"),
            ("text-overflow", "ellipsis"),
            ("white-space", "nowrap"),
        ],
    );
    static_decls(&mut utilities, "text-clip", &[("text-overflow", "clip")]);
    static_decls(&mut utilities, "text-ellipsis", &[("text-overflow", "ellipsis")]);

    // Box decoration.
    static_decls(
        &mut utilities,
        "box-decoration-slice",
        &[("box-decoration-break", "slice")],
    );
    static_decls(
        &mut utilities,
        "box-decoration-clone",
        &[("box-decoration-break", "clone")],
    );

    // Outline.
    static_decls(
        &mut utilities,
        "outline-hidden",
        &[
            ("outline", "2px solid transparent"),
            ("outline-offset", "2px"),
        ],
    );

    // Flex alignment.
    static_decls(&mut utilities, "items-start", &[("align-items", "flex-start")]);
    static_decls(&mut utilities, "items-center", &[("align-items", "center")]);
    static_decls(&mut utilities, "items-end", &[("align-items", "flex-end")]);
    static_decls(&mut utilities, "justify-start", &[("justify-content", "flex-start")]);
    static_decls(&mut utilities, "justify-center", &[("justify-content", "center")]);
    static_decls(&mut utilities, "justify-end", &[("justify-content", "flex-end")]);
    static_decls(
        &mut utilities,
        "justify-between",
        &[("justify-content", "space-between")],
    );

    // Flex grow/shrink.
    theme_functional(
        &mut utilities,
        "grow",
        ResolveOptions {
            types: vec![DataType::Number],
            values: values(&[("DEFAULT", "1"), ("0", "0")]),
            ..Default::default()
        },
        |value| vec![decl("flex-grow", value)],
    );
    theme_functional(
        &mut utilities,
        "shrink",
        ResolveOptions {
            types: vec![DataType::Number],
            values: values(&[("DEFAULT", "1"), ("0", "0")]),
            ..Default::default()
        },
        |value| vec![decl("flex-shrink", value)],
    );

    // Spacing.
    let paddings: &[(&'static str, &'static [&'static str])] = &[
        ("p", &["padding"]),
        ("px", &["padding-inline"]),
        ("py", &["padding-block"]),
        ("pt", &["padding-top"]),
        ("pr", &["padding-right"]),
        ("pb", &["padding-bottom"]),
        ("pl", &["padding-left"]),
    ];
    for &(root, properties) in paddings {
        theme_functional(
            &mut utilities,
            root,
            ResolveOptions {
                types: vec![DataType::Length, DataType::Percentage],
                theme_keys: vec!["--padding", "--spacing"],
                ..Default::default()
            },
            move |value| properties.iter().map(|p| decl(*p, value)).collect(),
        );
    }

    let margins: &[(&'static str, &'static [&'static str])] = &[
        ("m", &["margin"]),
        ("mx", &["margin-inline"]),
        ("my", &["margin-block"]),
        ("mt", &["margin-top"]),
        ("mr", &["margin-right"]),
        ("mb", &["margin-bottom"]),
        ("ml", &["margin-left"]),
    ];
    for &(root, properties) in margins {
        theme_functional(
            &mut utilities,
            root,
            ResolveOptions {
                types: vec![DataType::Length, DataType::Percentage],
                values: values(&[("auto", "auto")]),
                theme_keys: vec!["--margin", "--spacing"],
                supports_negative: true,
                ..Default::default()
            },
            move |value| properties.iter().map(|p| decl(*p, value)).collect(),
        );
    }

    // Gap.
    let gaps: &[(&'static str, &'static [&'static str])] = &[
        ("gap", &["gap"]),
        ("gap-x", &["column-gap"]),
        ("gap-y", &["row-gap"]),
    ];
    for &(root, properties) in gaps {
        theme_functional(
            &mut utilities,
            root,
            ResolveOptions {
                types: vec![DataType::Length, DataType::Percentage],
                theme_keys: vec!["--gap", "--spacing"],
                ..Default::default()
            },
            move |value| properties.iter().map(|p| decl(*p, value)).collect(),
        );
    }

    // Sizing.
    theme_functional(
        &mut utilities,
        "w",
        ResolveOptions {
            types: vec![DataType::Length, DataType::Percentage],
            values: values(&[
                ("auto", "auto"),
                ("full", "100%"),
                ("screen", "100vw"),
                ("min", "min-content"),
                ("max", "max-content"),
                ("fit", "fit-content"),
            ]),
            theme_keys: vec!["--width", "--spacing"],
            ..Default::default()
        },
        |value| vec![decl("width", value)],
    );
    theme_functional(
        &mut utilities,
        "h",
        ResolveOptions {
            types: vec![DataType::Length, DataType::Percentage],
            values: values(&[
                ("auto", "auto"),
                ("full", "100%"),
                ("screen", "100vh"),
                ("min", "min-content"),
                ("max", "max-content"),
                ("fit", "fit-content"),
            ]),
            theme_keys: vec!["--height", "--spacing"],
            ..Default::default()
        },
        |value| vec![decl("height", value)],
    );

    // Background color.
    theme_functional(
        &mut utilities,
        "bg",
        ResolveOptions {
            types: vec![DataType::Color],
            theme_keys: vec!["--background-color", "--color"],
            ..Default::default()
        },
        |value| vec![decl("background-color", value)],
    );

    // Font size, with its paired line-height sibling token. Registered
    // before the text color generator so color lookups are tried first.
    utilities.functional("text", |candidate, ctx| {
        let CandidateKind::Functional { value, modifier, .. } = &candidate.kind else {
            return UtilityResult::Decline;
        };
        if candidate.negative {
            return UtilityResult::Decline;
        }

        let (font_size, line_height) = match value {
            Some(CandidateValue::Named(name)) => {
                match ctx.theme.resolve_with(name, &["--font-size"], &["--line-height"]) {
                    Some((size, extra)) => {
                        let line_height = extra
                            .iter()
                            .find(|(suffix, _)| suffix == "--line-height")
                            .map(|(_, value)| value.clone());
                        (size, line_height)
                    }
                    None => return UtilityResult::Decline,
                }
            }
            Some(CandidateValue::Arbitrary { value, data_type }) => {
                let accepted = [DataType::Length, DataType::Percentage];
                let supported = match data_type {
                    Some(tag) => accepted.contains(tag),
                    None => infer_data_type(value, &accepted).is_some(),
                };
                if !supported {
                    return UtilityResult::Decline;
                }
                (value.clone(), None)
            }
            None => return UtilityResult::Decline,
        };

        // A modifier overrides the paired line-height.
        let line_height = match modifier {
            None => line_height,
            Some(CandidateModifier::Arbitrary(raw)) => Some(raw.clone()),
            Some(CandidateModifier::Named(raw)) => {
                match ctx.theme.resolve(Some(raw), &["--line-height"]) {
                    Some(resolved) => Some(resolved),
                    None => return UtilityResult::Decline,
                }
            }
        };

        let mut nodes = vec![decl("font-size", font_size)];
        if let Some(line_height) = line_height {
            nodes.push(decl("line-height", line_height));
        }
        UtilityResult::Emit(nodes)
    });

    // Text color.
    theme_functional(
        &mut utilities,
        "text",
        ResolveOptions {
            types: vec![DataType::Color],
            theme_keys: vec!["--text-color", "--color"],
            ..Default::default()
        },
        |value| vec![decl("color", value)],
    );

    // Border width and color, layered on one root.
    theme_functional(
        &mut utilities,
        "border",
        ResolveOptions {
            types: vec![DataType::LineWidth, DataType::Length],
            values: values(&[("DEFAULT", "1px")]),
            theme_keys: vec!["--border-width"],
            ..Default::default()
        },
        |value| vec![decl("border-width", value)],
    );
    theme_functional(
        &mut utilities,
        "border",
        ResolveOptions {
            types: vec![DataType::Color],
            theme_keys: vec!["--border-color", "--color"],
            ..Default::default()
        },
        |value| vec![decl("border-color", value)],
    );

    // Border radius.
    theme_functional(
        &mut utilities,
        "rounded",
        ResolveOptions {
            types: vec![DataType::Length, DataType::Percentage],
            values: values(&[("none", "0"), ("full", "calc(infinity * 1px)")]),
            theme_keys: vec!["--radius"],
            ..Default::default()
        },
        |value| vec![decl("border-radius", value)],
    );

    // Box shadow.
    theme_functional(
        &mut utilities,
        "shadow",
        ResolveOptions {
            values: values(&[("none", "0 0 #0000")]),
            theme_keys: vec!["--shadow"],
            ..Default::default()
        },
        |value| vec![decl("box-shadow", value)],
    );

    // Opacity.
    theme_functional(
        &mut utilities,
        "opacity",
        ResolveOptions {
            types: vec![DataType::Number, DataType::Percentage],
            theme_keys: vec!["--opacity"],
            ..Default::default()
        },
        |value| vec![decl("opacity", value)],
    );

    // Z-index and order.
    theme_functional(
        &mut utilities,
        "z",
        ResolveOptions {
            types: vec![DataType::Integer],
            values: values(&[("auto", "auto")]),
            theme_keys: vec!["--z-index"],
            supports_negative: true,
            ..Default::default()
        },
        |value| vec![decl("z-index", value)],
    );
    theme_functional(
        &mut utilities,
        "order",
        ResolveOptions {
            types: vec![DataType::Integer],
            values: values(&[("first", "-9999"), ("last", "9999"), ("none", "0")]),
            theme_keys: vec!["--order"],
            supports_negative: true,
            ..Default::default()
        },
        |value| vec![decl("order", value)],
    );

    utilities
}
