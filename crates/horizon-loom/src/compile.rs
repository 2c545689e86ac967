//! Candidate compilation.
//!
//! Turns a parsed candidate into a style-fragment tree rooted at `&` (the
//! class placeholder), applies variants and the important marker, and
//! attaches the sort key the stylesheet assembler orders rules by.

use std::collections::HashMap;

use crate::ast::{decl, AstNode};
use crate::candidate::{parse_candidate, Candidate, CandidateKind};
use crate::theme::Theme;
use crate::utilities::{ResolveOutcome, Utilities};
use crate::variants::{VariantResult, Variants};

/// Arbitrary properties bypass the registry, so they have no registration
/// index. They order after every registered utility.
const ARBITRARY_PROPERTY_ORDER: u32 = u32::MAX;

/// Shared borrows of the engine state a generator may need at compile
/// time. Passed into every utility closure.
pub struct CompileCtx<'a> {
    pub theme: &'a Theme,
    pub utilities: &'a Utilities,
    pub variants: &'a Variants,
    pub aliases: &'a HashMap<String, String>,
}

/// A successfully compiled candidate.
#[derive(Debug, Clone)]
pub struct CompiledClass {
    pub candidate: Candidate,
    pub nodes: Vec<AstNode>,
    pub sort_key: u64,
}

/// Compile one raw class string.
///
/// Candidate parses are tried in order; the first parse whose generator
/// emits wins. A generator returning invalid rejects the whole class, so
/// later parses cannot reinterpret it. Returns `None` for anything that is
/// not a known class.
pub fn compile_ast_nodes(raw: &str, ctx: &CompileCtx<'_>) -> Option<CompiledClass> {
    for candidate in parse_candidate(raw, ctx.utilities, ctx.variants, ctx.aliases) {
        let (mut nodes, order) = match &candidate.kind {
            CandidateKind::Arbitrary { property, value } => (
                vec![decl(property.clone(), value.clone())],
                ARBITRARY_PROPERTY_ORDER,
            ),
            _ => match ctx.utilities.resolve(&candidate, ctx) {
                ResolveOutcome::Emit(nodes, index) => {
                    (nodes, u32::try_from(index).unwrap_or(u32::MAX))
                }
                ResolveOutcome::Decline => continue,
                ResolveOutcome::Invalid => return None,
            },
        };

        if candidate.important {
            for node in &mut nodes {
                node.mark_important();
            }
        }

        // Variants wrap right-to-left so the leftmost written variant ends
        // up outermost.
        let mut applied = true;
        for variant in candidate.variants.iter().rev() {
            match ctx.variants.apply(variant, &mut nodes) {
                VariantResult::Applied => {}
                VariantResult::Invalid => {
                    applied = false;
                    break;
                }
            }
        }
        if !applied {
            continue;
        }

        let sort_key = sort_key(&candidate, order, ctx.variants);
        return Some(CompiledClass {
            candidate,
            nodes,
            sort_key,
        });
    }

    None
}

/// The total-order key for a compiled candidate.
///
/// The high 32 bits hold the variant weight, the low 32 bits the utility
/// registration order, so variant-free rules group first and variant sets
/// group together regardless of the utilities under them.
fn sort_key(candidate: &Candidate, utility_order: u32, variants: &Variants) -> u64 {
    (u64::from(variant_weight(candidate, variants)) << 32) | u64::from(utility_order)
}

/// One bit per applied variant, by registration order. Orders past 31
/// share the top bit; the sum saturates rather than wrapping.
fn variant_weight(candidate: &Candidate, variants: &Variants) -> u32 {
    let mut weight = 0u32;
    for variant in &candidate.variants {
        let Some(order) = variants.order_of(variant.root()) else {
            continue;
        };
        weight = weight.saturating_add(1u32 << order.min(31));
    }
    weight
}
