//! Candidate tokenization.
//!
//! A candidate is one utility-class token: `bg-red-500`, `hover:flex`,
//! `sm:w-[33px]`, `-mx-4`, `[color:red]`. The grammar is
//!
//! ```text
//! [!]['-']variant(':'variant)*':' root['-'value]['/'modifier]['!']
//! ```
//!
//! Parsing is registry-driven: a root only parses if a utility is registered
//! for it, and a variant only parses if the variant registry knows its root.
//! Because a string like `bg-red-500/50` is ambiguous (is `/50` a modifier
//! or part of the value?), [`parse_candidate`] returns every structurally
//! plausible parse in preference order; the compiler takes the first one a
//! generator accepts. Malformed input yields an empty list, never an error.

use std::collections::HashMap;

use crate::data_type::DataType;
use crate::utilities::Utilities;
use crate::variants::{VariantKind, Variants};

/// Legacy class names remapped to their canonical spelling before parsing.
///
/// Seeded into the design system's alias table once during construction.
pub(crate) const LEGACY_ALIASES: &[(&str, &str)] = &[
    ("overflow-clip", "text-clip"),
    ("overflow-ellipsis", "text-ellipsis"),
    ("decoration-slice", "box-decoration-slice"),
    ("decoration-clone", "box-decoration-clone"),
    ("flex-grow", "grow"),
    ("flex-grow-0", "grow-0"),
    ("flex-shrink", "shrink"),
    ("flex-shrink-0", "shrink-0"),
    ("outline-none", "outline-hidden"),
    ("shadow", "shadow-sm"),
    ("inset-shadow", "inset-shadow-sm"),
    ("drop-shadow", "drop-shadow-sm"),
    ("blur", "blur-sm"),
    ("rounded", "rounded-sm"),
];

/// A parsed utility-class token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    pub kind: CandidateKind,
    /// Variants as written, outermost (leftmost) first.
    pub variants: Vec<Variant>,
    pub important: bool,
    pub negative: bool,
}

/// The root-specific part of a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateKind {
    /// A value-independent utility: `flex`.
    Static { root: String },
    /// A value-driven utility: `bg-red-500`, `w-[33px]`, `bg-red-500/50`.
    Functional {
        root: String,
        value: Option<CandidateValue>,
        modifier: Option<CandidateModifier>,
    },
    /// An arbitrary property: `[color:red]`.
    Arbitrary { property: String, value: String },
}

/// The value part of a functional candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateValue {
    /// A bareword looked up in value tables or the theme: `red-500`.
    Named(String),
    /// A bracketed literal, optionally tagged with a data type:
    /// `[33px]`, `[length:var(--w)]`.
    Arbitrary {
        value: String,
        data_type: Option<DataType>,
    },
}

impl CandidateValue {
    /// The raw value string, regardless of kind.
    pub fn value(&self) -> &str {
        match self {
            Self::Named(value) => value,
            Self::Arbitrary { value, .. } => value,
        }
    }

    /// Whether this is a bracketed arbitrary value.
    pub fn is_arbitrary(&self) -> bool {
        matches!(self, Self::Arbitrary { .. })
    }
}

/// The modifier part of a functional candidate (after `/`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CandidateModifier {
    Named(String),
    Arbitrary(String),
}

impl CandidateModifier {
    /// The raw modifier string, regardless of kind.
    pub fn value(&self) -> &str {
        match self {
            Self::Named(value) => value,
            Self::Arbitrary(value) => value,
        }
    }
}

/// A parsed variant: a named transformer wrapping generated output in a
/// selector or media context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Variant {
    /// `hover`, `dark`, `sm`.
    Static { root: String },
    /// `max-lg`, `max-[600px]`.
    Functional {
        root: String,
        value: Option<VariantValue>,
    },
    /// `group-hover`, `not-focus`: a variant composed around another one.
    Compound { root: String, inner: Box<Variant> },
}

impl Variant {
    /// The registry root this variant resolves through.
    pub fn root(&self) -> &str {
        match self {
            Self::Static { root } | Self::Functional { root, .. } | Self::Compound { root, .. } => {
                root
            }
        }
    }
}

/// The value part of a functional variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VariantValue {
    Named(String),
    Arbitrary(String),
}

/// Split `input` on `sep`, ignoring separators inside `[...]` or `(...)`.
pub(crate) fn segment(input: &str, sep: char) -> Vec<&str> {
    let mut parts = vec![];
    let mut depth = 0i32;
    let mut start = 0;

    for (idx, ch) in input.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            _ if ch == sep && depth == 0 => {
                parts.push(&input[start..idx]);
                start = idx + ch.len_utf8();
            }
            _ => {}
        }
    }

    parts.push(&input[start..]);
    parts
}

/// Positions of top-level `-` separators, right to left.
fn dash_boundaries(input: &str) -> Vec<usize> {
    let mut boundaries = vec![];
    let mut depth = 0i32;

    for (idx, ch) in input.char_indices() {
        match ch {
            '[' | '(' => depth += 1,
            ']' | ')' => depth -= 1,
            '-' if depth == 0 => boundaries.push(idx),
            _ => {}
        }
    }

    boundaries.reverse();
    boundaries
}

/// Decode an arbitrary-value payload: `_` is an escaped space, `\_` a
/// literal underscore.
pub(crate) fn decode_arbitrary(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' if chars.peek() == Some(&'_') => {
                chars.next();
                out.push('_');
            }
            '_' => out.push(' '),
            _ => out.push(ch),
        }
    }

    out
}

/// Re-encode a decoded arbitrary payload for printing.
fn encode_arbitrary(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            ' ' => out.push('_'),
            '_' => out.push_str("\\_"),
            _ => out.push(ch),
        }
    }
    out
}

fn is_valid_property(property: &str) -> bool {
    let stripped = property.strip_prefix("--").unwrap_or(property);
    !stripped.is_empty()
        && stripped.starts_with(|c: char| c.is_ascii_alphabetic())
        && stripped.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

/// Parse one raw token into every plausible [`Candidate`].
///
/// Resolution order: arbitrary-property syntax, then an exact static-utility
/// match, then functional roots longest-first. Anything unparseable yields
/// an empty list.
pub fn parse_candidate(
    input: &str,
    utilities: &Utilities,
    variants: &Variants,
    aliases: &HashMap<String, String>,
) -> Vec<Candidate> {
    let mut rest = input;

    // `!` may appear as a leading or a trailing marker, but not both.
    let mut important = false;
    if let Some(stripped) = rest.strip_prefix('!') {
        important = true;
        rest = stripped;
    }
    if let Some(stripped) = rest.strip_suffix('!') {
        if important {
            return vec![];
        }
        important = true;
        rest = stripped;
    }

    let mut segments = segment(rest, ':');
    let base = match segments.pop() {
        Some(base) if !base.is_empty() => base,
        _ => return vec![],
    };

    let mut parsed_variants = Vec::with_capacity(segments.len());
    for variant in segments {
        match parse_variant(variant, variants) {
            Some(parsed) => parsed_variants.push(parsed),
            None => return vec![],
        }
    }

    let mut negative = false;
    let mut base = base;
    if let Some(stripped) = base.strip_prefix('-') {
        if stripped.is_empty() {
            return vec![];
        }
        negative = true;
        base = stripped;
    }

    // Arbitrary property: `[color:red]`.
    if let Some(inner) = base.strip_prefix('[') {
        let Some(inner) = inner.strip_suffix(']') else {
            return vec![];
        };
        if negative {
            return vec![];
        }
        let Some((property, value)) = inner.split_once(':') else {
            return vec![];
        };
        if !is_valid_property(property) || value.is_empty() {
            return vec![];
        }

        return vec![Candidate {
            kind: CandidateKind::Arbitrary {
                property: property.to_string(),
                value: decode_arbitrary(value),
            },
            variants: parsed_variants,
            important,
            negative,
        }];
    }

    // Legacy alias remap applies to the base token only; variants and
    // markers around it are preserved.
    let aliased;
    if let Some(canonical) = aliases.get(base) {
        aliased = canonical.clone();
        base = &aliased;
    }

    let mut candidates = vec![];

    // With a top-level `/` the token is ambiguous: `w-1/2` may be value `1`
    // with modifier `2`, or the plain value `1/2`. Emit the modifier parse
    // first, then the unsplit one.
    let slash_parts = segment(base, '/');
    let attempts: Vec<(&str, Option<&str>)> = match slash_parts.as_slice() {
        [value] => vec![(*value, None)],
        [value, modifier] => vec![(*value, Some(*modifier)), (base, None)],
        _ => return vec![],
    };

    for (base, modifier_str) in attempts {
        let modifier = match modifier_str {
            None => None,
            Some("") => continue,
            Some(raw) => match parse_modifier(raw) {
                Some(modifier) => Some(modifier),
                None => continue,
            },
        };

        // Exact static utility match. Static utilities take no modifier.
        if modifier.is_none() && !negative && utilities.has_static(base) {
            candidates.push(Candidate {
                kind: CandidateKind::Static {
                    root: base.to_string(),
                },
                variants: parsed_variants.clone(),
                important,
                negative,
            });
        }

        // Functional roots, longest first: `bg-red-500` tries `bg-red-500`,
        // `bg-red`, then `bg`.
        let mut roots = vec![(base, None)];
        for boundary in dash_boundaries(base) {
            roots.push((&base[..boundary], Some(&base[boundary + 1..])));
        }

        for (root, value_str) in roots {
            if !utilities.has_functional(root) {
                continue;
            }

            let value = match value_str {
                None => None,
                Some("") => continue,
                Some(raw) => match parse_value(raw) {
                    Some(value) => Some(value),
                    None => continue,
                },
            };

            candidates.push(Candidate {
                kind: CandidateKind::Functional {
                    root: root.to_string(),
                    value,
                    modifier: modifier.clone(),
                },
                variants: parsed_variants.clone(),
                important,
                negative,
            });
        }
    }

    candidates
}

fn parse_value(raw: &str) -> Option<CandidateValue> {
    if let Some(inner) = raw.strip_prefix('[') {
        let inner = inner.strip_suffix(']')?;
        if inner.is_empty() {
            return None;
        }

        // Optional `type:` tag: only known data-type names count, so
        // `[url:var(--x)]` tags while `[no-repeat]` stays untagged.
        if let Some((tag, value)) = inner.split_once(':') {
            if let Some(data_type) = DataType::from_tag(tag) {
                if value.is_empty() {
                    return None;
                }
                return Some(CandidateValue::Arbitrary {
                    value: decode_arbitrary(value),
                    data_type: Some(data_type),
                });
            }
        }

        return Some(CandidateValue::Arbitrary {
            value: decode_arbitrary(inner),
            data_type: None,
        });
    }

    Some(CandidateValue::Named(raw.to_string()))
}

fn parse_modifier(raw: &str) -> Option<CandidateModifier> {
    if let Some(inner) = raw.strip_prefix('[') {
        let inner = inner.strip_suffix(']')?;
        if inner.is_empty() {
            return None;
        }
        return Some(CandidateModifier::Arbitrary(decode_arbitrary(inner)));
    }

    Some(CandidateModifier::Named(raw.to_string()))
}

/// Parse one variant segment against the variant registry.
///
/// Compound roots recurse into their inner variant (`group-hover`), and a
/// shorter root is tried whenever the longer parse fails.
pub fn parse_variant(input: &str, variants: &Variants) -> Option<Variant> {
    if input.is_empty() {
        return None;
    }

    if variants.kind_of(input) == Some(VariantKind::Static) {
        return Some(Variant::Static {
            root: input.to_string(),
        });
    }

    for boundary in dash_boundaries(input) {
        let (root, rest) = (&input[..boundary], &input[boundary + 1..]);
        if rest.is_empty() {
            continue;
        }

        match variants.kind_of(root) {
            Some(VariantKind::Compound) => {
                if let Some(inner) = parse_variant(rest, variants) {
                    return Some(Variant::Compound {
                        root: root.to_string(),
                        inner: Box::new(inner),
                    });
                }
            }
            Some(VariantKind::Functional) => {
                let value = if let Some(inner) = rest.strip_prefix('[') {
                    let inner = inner.strip_suffix(']')?;
                    if inner.is_empty() {
                        return None;
                    }
                    VariantValue::Arbitrary(decode_arbitrary(inner))
                } else {
                    VariantValue::Named(rest.to_string())
                };

                return Some(Variant::Functional {
                    root: root.to_string(),
                    value: Some(value),
                });
            }
            _ => {}
        }
    }

    None
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Variant::Static { root } => write!(f, "{root}"),
            Variant::Functional { root, value } => {
                write!(f, "{root}")?;
                match value {
                    Some(VariantValue::Named(value)) => write!(f, "-{value}"),
                    Some(VariantValue::Arbitrary(value)) => {
                        write!(f, "-[{}]", encode_arbitrary(value))
                    }
                    None => Ok(()),
                }
            }
            Variant::Compound { root, inner } => write!(f, "{root}-{inner}"),
        }
    }
}

impl Candidate {
    /// Print the canonical class name for this candidate.
    ///
    /// Canonical form uses the trailing `!` important marker, so
    /// `parse → print` normalizes legacy spellings.
    pub fn to_class(&self) -> String {
        let mut out = String::new();

        for variant in &self.variants {
            out.push_str(&variant.to_string());
            out.push(':');
        }

        if self.negative {
            out.push('-');
        }

        match &self.kind {
            CandidateKind::Static { root } => out.push_str(root),
            CandidateKind::Functional {
                root,
                value,
                modifier,
            } => {
                out.push_str(root);
                match value {
                    Some(CandidateValue::Named(value)) => {
                        out.push('-');
                        out.push_str(value);
                    }
                    Some(CandidateValue::Arbitrary { value, data_type }) => {
                        out.push_str("-[");
                        if let Some(data_type) = data_type {
                            out.push_str(data_type.tag());
                            out.push(':');
                        }
                        out.push_str(&encode_arbitrary(value));
                        out.push(']');
                    }
                    None => {}
                }
                match modifier {
                    Some(CandidateModifier::Named(value)) => {
                        out.push('/');
                        out.push_str(value);
                    }
                    Some(CandidateModifier::Arbitrary(value)) => {
                        out.push_str("/[");
                        out.push_str(&encode_arbitrary(value));
                        out.push(']');
                    }
                    None => {}
                }
            }
            CandidateKind::Arbitrary { property, value } => {
                out.push('[');
                out.push_str(property);
                out.push(':');
                out.push_str(&encode_arbitrary(value));
                out.push(']');
            }
        }

        if self.important {
            out.push('!');
        }

        out
    }
}
