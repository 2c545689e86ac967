//! `@apply` expansion inside registered fragment trees.
//!
//! Plugin-supplied utility and variant fragments may embed
//! `@apply class…;` statements. Expansion replaces each with the compiled
//! declarations of the named classes, in sort-key order. Unknown classes
//! are logged and dropped rather than failing the fragment.

use crate::ast::AstNode;
use crate::compile::{compile_ast_nodes, CompileCtx, CompiledClass};

/// Expand every `@apply` at-rule in `nodes`, recursively.
pub fn substitute_apply(nodes: &mut Vec<AstNode>, ctx: &CompileCtx<'_>) {
    let mut idx = 0;
    while idx < nodes.len() {
        let params = match &nodes[idx] {
            AstNode::AtRule { name, params, .. } if name == "apply" => Some(params.clone()),
            _ => None,
        };

        if let Some(params) = params {
            let mut compiled: Vec<CompiledClass> = vec![];
            for class in params.split_ascii_whitespace() {
                match compile_ast_nodes(class, ctx) {
                    Some(entry) => compiled.push(entry),
                    None => tracing::warn!(class, "unknown class in @apply, dropping"),
                }
            }
            compiled.sort_by_key(|entry| entry.sort_key);

            let replacement: Vec<AstNode> =
                compiled.into_iter().flat_map(|entry| entry.nodes).collect();
            let skip = replacement.len();
            nodes.splice(idx..idx + 1, replacement);
            // Substituted nodes are final output, not re-scanned.
            idx += skip;
            continue;
        }

        match &mut nodes[idx] {
            AstNode::Rule { nodes, .. } | AstNode::AtRule { nodes, .. } => {
                substitute_apply(nodes, ctx);
            }
            _ => {}
        }
        idx += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::ast::{at_rule, rule, to_css};
    use crate::theme::{Theme, ThemeOptions};
    use crate::utilities::create_utilities;
    use crate::variants::create_variants;

    #[test]
    fn expands_apply_in_nested_rules() {
        let mut theme = Theme::new();
        theme.add("--color-red-500", "#ef4444", ThemeOptions::default()).unwrap();
        let utilities = create_utilities();
        let variants = create_variants(&theme);
        let aliases = HashMap::new();
        let ctx = CompileCtx {
            theme: &theme,
            utilities: &utilities,
            variants: &variants,
            aliases: &aliases,
        };

        let mut tree = vec![rule(
            ".btn",
            vec![at_rule("apply", "flex bg-red-500", vec![])],
        )];
        substitute_apply(&mut tree, &ctx);

        assert_eq!(
            to_css(&tree),
            ".btn {\n  display: flex;\n  background-color: var(--color-red-500, #ef4444);\n}\n"
        );
    }

    #[test]
    fn unknown_classes_are_dropped() {
        let theme = Theme::new();
        let utilities = create_utilities();
        let variants = create_variants(&theme);
        let aliases = HashMap::new();
        let ctx = CompileCtx {
            theme: &theme,
            utilities: &utilities,
            variants: &variants,
            aliases: &aliases,
        };

        let mut tree = vec![rule(".btn", vec![at_rule("apply", "no-such-class flex", vec![])])];
        substitute_apply(&mut tree, &ctx);

        assert_eq!(to_css(&tree), ".btn {\n  display: flex;\n}\n");
    }

    #[test]
    fn applied_classes_keep_their_variants() {
        let theme = Theme::new();
        let utilities = create_utilities();
        let variants = create_variants(&theme);
        let aliases = HashMap::new();
        let ctx = CompileCtx {
            theme: &theme,
            utilities: &utilities,
            variants: &variants,
            aliases: &aliases,
        };

        let mut tree = vec![rule(".btn", vec![at_rule("apply", "hover:hidden", vec![])])];
        substitute_apply(&mut tree, &ctx);

        assert_eq!(
            to_css(&tree),
            ".btn {\n  &:hover {\n    display: none;\n  }\n}\n"
        );
    }
}
