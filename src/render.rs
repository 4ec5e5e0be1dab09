//! Rendering: terminal trees, LaTeX exports, and comparison reports.

use std::fmt::Write as _;

use colored::Colorize;
use termtree::Tree as DisplayTree;

use crate::address::Address;
use crate::comparison::SetOutcome;
use crate::errors::MgResult;
use crate::metrics::Verdict;
use crate::node::GornNode;
use crate::tree::GornTree;

/// Render the subtree at `address` for the terminal, one `label [i/o]`
/// node per line.
pub fn display_tree(tree: &GornTree, address: &Address) -> MgResult<DisplayTree<String>> {
    let node = tree.node(address)?;
    let label = match (node.index, node.outdex) {
        (Some(index), Some(outdex)) => format!("{} [{}/{}]", node.label, index, outdex),
        _ => node.label.clone(),
    };
    let leaves = tree
        .daughters(address)
        .iter()
        .map(|daughter| display_tree(tree, daughter))
        .collect::<MgResult<Vec<_>>>()?;
    Ok(DisplayTree::new(label).with_leaves(leaves))
}

/// LaTeX forest code for the whole tree, using the `\Lab` macro family:
/// `\IBLab` for high-tenure interior nodes, `\BLab` for high-tenure leaves
/// (both get their outdex boxed), plain `\Lab` otherwise.
pub fn forest_export(tree: &GornTree) -> MgResult<String> {
    forest_subtree(tree, &Address::root(), 0)
}

fn forest_subtree(tree: &GornTree, address: &Address, indent: usize) -> MgResult<String> {
    let offset = " ".repeat(4 * indent);
    let label = forest_label(tree.node(address)?);
    if tree.is_leaf(address) {
        return Ok(format!("{}[{}]", offset, label));
    }
    let daughters = tree
        .daughters(address)
        .iter()
        .map(|daughter| forest_subtree(tree, daughter, indent + 1))
        .collect::<MgResult<Vec<_>>>()?
        .join("\n");
    Ok(format!("{}[{}\n{}\n{}]", offset, label, daughters, offset))
}

fn forest_label(node: &GornNode) -> String {
    let (index, outdex) = match (node.index, node.outdex) {
        (Some(index), Some(outdex)) => (index, outdex),
        _ => return node.label.clone(),
    };
    let macro_name = if outdex - index > 2 && node.leaf != Some(true) {
        "IBLab"
    } else if outdex - index > 2 {
        "BLab"
    } else {
        "Lab"
    };
    format!(
        "\\{}{{{}}}{{{}}}{{{}}}, name={}",
        macro_name, node.label, index, outdex, node.name
    )
}

/// tikz overlay placing every node's index and outdex next to its tree
/// position; high-tenure outdices are boxed. Suitable for a
/// `<name>_io.forest` companion file.
pub fn io_overlay(tree: &GornTree) -> String {
    let mut out = String::new();
    for node in tree.iter() {
        let (Some(index), Some(outdex)) = (node.index, node.outdex) else {
            continue;
        };
        let boxed = if outdex - index > 2 { ", boxed" } else { "" };
        let _ = writeln!(
            out,
            "{:<24}{:<8} at ({});",
            "\\node[index]",
            format!("{{{}}}", index),
            node.name
        );
        let _ = writeln!(
            out,
            "{:<24}{:<8} at ({});",
            format!("\\node[outdex{}]", boxed),
            format!("{{{}}}", outdex),
            node.name
        );
        out.push_str("%\n");
    }
    // forest chokes on trailing empty lines
    out.push('%');
    out
}

fn colored_verdict(verdict: Verdict) -> colored::ColoredString {
    match verdict {
        Verdict::Success => "success".green(),
        Verdict::Tie => "tie".yellow(),
        Verdict::Failure => "failure".red(),
    }
}

/// Human-readable report over a full comparison run: one value table per
/// contrast, then the aggregate classification.
pub fn render_report(outcome: &SetOutcome) -> String {
    let mut out = String::new();
    let width = outcome
        .outcomes
        .iter()
        .flat_map(|o| o.traces.iter())
        .map(|t| t.metric.len())
        .max()
        .unwrap_or(6)
        .max(6);

    for contrast in &outcome.outcomes {
        let _ = writeln!(out, "{}", contrast.name.cyan().bold());
        for trace in &contrast.traces {
            let winner = trace
                .winner_value
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | ");
            let loser = trace
                .loser_value
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(" | ");
            let _ = writeln!(
                out,
                "  {:<width$}  {:>12}  {:>12}  {}",
                trace.metric,
                winner,
                loser,
                colored_verdict(trace.verdict),
                width = width
            );
        }
    }

    let _ = writeln!(out, "{}", format!("aggregate: {}", outcome.name).cyan().bold());
    for (heading, metrics) in [
        ("success", &outcome.success),
        ("tie", &outcome.tie),
        ("failure", &outcome.failure),
    ] {
        let listing = if metrics.is_empty() {
            "-".to_string()
        } else {
            metrics.iter().cloned().collect::<Vec<_>>().join(", ")
        };
        let _ = writeln!(out, "  {:<8} {}", heading, listing);
    }
    out
}
