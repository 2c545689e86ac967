//! Style-fragment tree.
//!
//! Compiled candidates produce a small tree of [`AstNode`]s: style rules,
//! at-rules, declarations, and comments. Trees are merged by concatenation
//! and serialized to stylesheet text with [`to_css`]. Serialization is a
//! pure function of the tree, so a fixed tree always produces byte-identical
//! output.

/// A node in the style-fragment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
    /// A style rule: `selector { nodes }`.
    Rule {
        selector: String,
        nodes: Vec<AstNode>,
    },
    /// An at-rule: `@name params { nodes }`.
    ///
    /// An at-rule with no nodes serializes as a statement (`@name params;`).
    AtRule {
        name: String,
        params: String,
        nodes: Vec<AstNode>,
    },
    /// A declaration: `property: value;`.
    Declaration {
        property: String,
        value: String,
        important: bool,
    },
    /// A comment: `/* value */`.
    Comment { value: String },
}

/// Create a style rule node.
pub fn rule(selector: impl Into<String>, nodes: Vec<AstNode>) -> AstNode {
    AstNode::Rule {
        selector: selector.into(),
        nodes,
    }
}

/// Create an at-rule node.
pub fn at_rule(name: impl Into<String>, params: impl Into<String>, nodes: Vec<AstNode>) -> AstNode {
    AstNode::AtRule {
        name: name.into(),
        params: params.into(),
        nodes,
    }
}

/// Create a declaration node.
pub fn decl(property: impl Into<String>, value: impl Into<String>) -> AstNode {
    AstNode::Declaration {
        property: property.into(),
        value: value.into(),
        important: false,
    }
}

/// Create a comment node.
pub fn comment(value: impl Into<String>) -> AstNode {
    AstNode::Comment {
        value: value.into(),
    }
}

impl AstNode {
    /// Mark every declaration in this subtree as `!important`.
    pub fn mark_important(&mut self) {
        match self {
            AstNode::Declaration { important, .. } => *important = true,
            AstNode::Rule { nodes, .. } | AstNode::AtRule { nodes, .. } => {
                for node in nodes {
                    node.mark_important();
                }
            }
            AstNode::Comment { .. } => {}
        }
    }

    /// Whether serializing this node would produce any output.
    fn is_empty(&self) -> bool {
        match self {
            AstNode::Rule { nodes, .. } => nodes.iter().all(AstNode::is_empty),
            _ => false,
        }
    }
}

/// Serialize a list of nodes to CSS text.
///
/// Rules that contain no output are dropped entirely. Nested rules keep
/// their `&` nesting selectors; consumers targeting older environments can
/// flatten the output themselves.
pub fn to_css(nodes: &[AstNode]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(node, 0, &mut out);
    }
    out
}

fn write_node(node: &AstNode, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);

    match node {
        AstNode::Rule { selector, nodes } => {
            if node.is_empty() {
                return;
            }
            out.push_str(&indent);
            out.push_str(selector);
            out.push_str(" {\n");
            for child in nodes {
                write_node(child, depth + 1, out);
            }
            out.push_str(&indent);
            out.push_str("}\n");
        }
        AstNode::AtRule {
            name,
            params,
            nodes,
        } => {
            out.push_str(&indent);
            out.push('@');
            out.push_str(name);
            if !params.is_empty() {
                out.push(' ');
                out.push_str(params);
            }
            if nodes.is_empty() {
                out.push_str(";\n");
            } else {
                out.push_str(" {\n");
                for child in nodes {
                    write_node(child, depth + 1, out);
                }
                out.push_str(&indent);
                out.push_str("}\n");
            }
        }
        AstNode::Declaration {
            property,
            value,
            important,
        } => {
            out.push_str(&indent);
            out.push_str(property);
            out.push_str(": ");
            out.push_str(value);
            if *important {
                out.push_str(" !important");
            }
            out.push_str(";\n");
        }
        AstNode::Comment { value } => {
            out.push_str(&indent);
            out.push_str("/* ");
            out.push_str(value);
            out.push_str(" */\n");
        }
    }
}
