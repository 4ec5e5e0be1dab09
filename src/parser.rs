//! Textual tree notation.
//!
//! Trees are written in bracket notation, one `[` per subtree:
//!
//! ```text
//! [S
//!     [NP [John, name=subject]]
//!     [Aux, empty]
//!     [VP [slept, name=verb]]
//! ]
//! ```
//!
//! Gorn addresses are inferred from the bracketing. Node text carries the
//! label plus optional `empty`, `content`, and `name=<ident>` annotations;
//! `%` starts a comment. Surface order and movement arcs live in companion
//! files with their own line formats (see [`parse_linear`], [`parse_moves`]).

use regex::Regex;

use crate::address::Address;
use crate::builder::NodeSpec;
use crate::errors::{MgError, MgResult};
use crate::tree::GornTree;

pub struct ForestParser {
    label_re: Regex,
    empty_re: Regex,
    content_re: Regex,
    name_re: Regex,
}

impl Default for ForestParser {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, PartialEq)]
enum Token {
    Open,
    Close,
    Text,
}

impl ForestParser {
    pub fn new() -> Self {
        ForestParser {
            label_re: Regex::new(r"^\s*([\w$'\-\\{}.]*)").expect("static regex"),
            empty_re: Regex::new(r",\s*empty\b").expect("static regex"),
            content_re: Regex::new(r",\s*content\b").expect("static regex"),
            name_re: Regex::new(r",\s*name\s*=\s*([\w\-']*)").expect("static regex"),
        }
    }

    /// Parse a bracketed tree into node descriptors with inferred addresses.
    pub fn parse(&self, input: &str) -> MgResult<Vec<NodeSpec>> {
        let tokens = tokenize(input);
        let opens = tokens.iter().filter(|(t, _)| *t == Token::Open).count();
        let closes = tokens.iter().filter(|(t, _)| *t == Token::Close).count();
        if opens != closes {
            return Err(MgError::Spec(format!(
                "unbalanced brackets: {} open vs {} close",
                opens, closes
            )));
        }

        let mut specs = Vec::new();
        let mut branches: Vec<u8> = Vec::new();
        let mut previous: Option<Token> = None;

        for (token, text) in &tokens {
            match token {
                Token::Open => {
                    if previous.is_none() {
                        branches.clear();
                    } else if previous == Some(Token::Close) {
                        // a new subtree after a closed one is its sibling
                        match branches.last_mut() {
                            Some(last) => *last += 1,
                            None => {
                                return Err(MgError::Spec(
                                    "sibling subtree at root level".into(),
                                ))
                            }
                        }
                    } else {
                        branches.push(1);
                    }
                }
                Token::Close => {
                    if previous == Some(Token::Close) {
                        branches.pop();
                    }
                }
                Token::Text => {
                    let address = branches.iter().map(|b| b.to_string()).collect::<String>();
                    Address::new(address.clone())?;
                    specs.push(self.extract_properties(text, address));
                }
            }
            previous = Some(*token);
        }
        Ok(specs)
    }

    /// Turn one node's text into its descriptor.
    fn extract_properties(&self, text: &str, address: String) -> NodeSpec {
        let label = self
            .label_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string())
            .unwrap_or_default();
        let mut spec = NodeSpec::new(address, label);
        if self.empty_re.is_match(text) {
            spec.empty = Some(true);
        }
        if self.content_re.is_match(text) {
            spec.content = Some(true);
        }
        spec.name = self
            .name_re
            .captures(text)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());
        spec
    }
}

/// Split on brackets, trimming whitespace and `%` comments per token.
fn tokenize(input: &str) -> Vec<(Token, String)> {
    let mut tokens = Vec::new();
    let mut buffer = String::new();
    for c in input.chars() {
        match c {
            '[' | ']' => {
                push_text(&mut tokens, &buffer);
                buffer.clear();
                tokens.push((
                    if c == '[' { Token::Open } else { Token::Close },
                    c.to_string(),
                ));
            }
            _ => buffer.push(c),
        }
    }
    push_text(&mut tokens, &buffer);
    tokens
}

fn push_text(tokens: &mut Vec<(Token, String)>, buffer: &str) {
    let text = buffer.split('%').next().unwrap_or("").trim();
    if !text.is_empty() {
        tokens.push((Token::Text, text.to_string()));
    }
}

/// Parse a linearization file: one `label; address` line per leaf, in
/// surface order.
pub fn parse_linear(input: &str) -> MgResult<Vec<(String, String)>> {
    let mut order = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let mut parts = line.splitn(2, ';');
        let label = parts.next().unwrap_or("").trim();
        let address = parts
            .next()
            .ok_or_else(|| {
                MgError::Spec(format!(
                    "line {}: expected \"label; address\", got {:?}",
                    number + 1,
                    line
                ))
            })?
            .trim();
        order.push((label.to_string(), address.to_string()));
    }
    Ok(order)
}

/// Parse a movement file: one arc per line, source and target as the first
/// and last `(...)` group (tikz anchors after `.` are ignored), the feature
/// from `move={...}`.
pub fn parse_moves(input: &str) -> MgResult<Vec<(String, String, String)>> {
    let group_re = Regex::new(r"\((.*?)\)").expect("static regex");
    let feature_re = Regex::new(r"move\s*=\s*\{([^}]*)\}").expect("static regex");

    let mut moves = Vec::new();
    for (number, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('%') || line.starts_with('#') {
            continue;
        }
        let groups: Vec<&str> = group_re
            .captures_iter(line)
            .filter_map(|c| c.get(1).map(|m| m.as_str()))
            .collect();
        let feature = feature_re
            .captures(line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim());
        match (groups.first(), groups.last(), feature) {
            (Some(source), Some(target), Some(feature)) => {
                moves.push((
                    strip_anchor(source).to_string(),
                    strip_anchor(target).to_string(),
                    feature.to_string(),
                ));
            }
            _ => {
                return Err(MgError::Spec(format!(
                    "line {}: expected \"(source) ... (target) ... move={{feature}}\", got {:?}",
                    number + 1,
                    line
                )))
            }
        }
    }
    Ok(moves)
}

fn strip_anchor(node_ref: &str) -> &str {
    node_ref.split('.').next().unwrap_or(node_ref).trim()
}

/// Cross-check a linearization against a parsed tree: every address must
/// carry the label the linearization claims for it.
pub fn check_order(tree: &GornTree, order: &[(String, String)]) -> MgResult<()> {
    for (label, address) in order {
        let address = tree.resolve(address)?;
        let node = tree.node(&address)?;
        if node.label != *label {
            return Err(MgError::LabelMismatch {
                address: address.to_string(),
                expected: label.clone(),
                found: node.label.clone(),
            });
        }
    }
    Ok(())
}
