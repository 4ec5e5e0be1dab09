use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::address::Address;
use crate::cli::args::{Cli, Commands};
use crate::cli::output;
use crate::errors::MgResult;
use crate::files::{
    comparisons_from_file, metrics_from_file, tree_from_file, trees_from_dir, LINEAR_EXTENSION,
    TREE_EXTENSION,
};
use crate::parser::{check_order, parse_linear};
use crate::registry::ReducerRegistry;
use crate::render::{display_tree, forest_export, io_overlay, render_report};
use crate::tree::GornTree;

pub fn execute_command(cli: &Cli) -> MgResult<()> {
    match &cli.command {
        Some(Commands::Annotate {
            base,
            autolinearize,
            latex,
            io_overlay,
        }) => _annotate(base, *autolinearize, *latex, *io_overlay),
        Some(Commands::Batch {
            directory,
            autolinearize,
            out,
        }) => _batch(directory, *autolinearize, out.as_deref()),
        Some(Commands::Check { base }) => _check(base),
        Some(Commands::Compare {
            trees,
            metrics,
            contrasts,
            ranks,
            autolinearize,
        }) => _compare(trees, metrics, contrasts, *ranks, *autolinearize),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

#[instrument]
fn _annotate(base: &Path, autolinearize: bool, latex: bool, overlay: bool) -> MgResult<()> {
    debug!("base: {:?}", base);
    let tree = tree_from_file(base, autolinearize)?;
    if latex {
        output::info(&forest_export(&tree)?);
    } else {
        output::info(&display_tree(&tree, &Address::root())?);
    }
    if overlay {
        let target = overlay_path(base.parent().unwrap_or(Path::new(".")), &tree);
        fs::write(&target, io_overlay(&tree))?;
        output::success(&format!("wrote {}", target.display()));
    }
    Ok(())
}

#[instrument]
fn _batch(directory: &Path, autolinearize: bool, out: Option<&Path>) -> MgResult<()> {
    debug!("directory: {:?}", directory);
    let trees = trees_from_dir(directory, autolinearize)?;
    let out_dir = out.unwrap_or(directory);
    for tree in &trees {
        let target = overlay_path(out_dir, tree);
        fs::write(&target, io_overlay(tree))?;
        output::success_detail(&format!("{} -> {}", tree.name, target.display()));
    }
    output::action("annotated", &format!("{} trees", trees.len()));
    Ok(())
}

#[instrument]
fn _check(base: &Path) -> MgResult<()> {
    debug!("base: {:?}", base);
    // building runs the closure checks and the annotator
    let tree = tree_from_file(base, false)?;
    output::success(&format!("{}: consistent, {} nodes", tree.name, tree.len()));

    let linear_path = PathBuf::from(format!(
        "{}{}",
        base.to_string_lossy().trim_end_matches(TREE_EXTENSION),
        LINEAR_EXTENSION
    ));
    if linear_path.exists() {
        let order = parse_linear(&fs::read_to_string(&linear_path)?)?;
        check_order(&tree, &order)?;
        output::success(&format!("{}: labels match the tree", linear_path.display()));
    } else {
        output::detail("no .linear file; structural order in use");
    }
    Ok(())
}

#[instrument]
fn _compare(
    trees: &Path,
    metrics: &Path,
    contrasts: &Path,
    ranks: usize,
    autolinearize: bool,
) -> MgResult<()> {
    debug!("trees: {:?}, metrics: {:?}, contrasts: {:?}", trees, metrics, contrasts);
    let registry = ReducerRegistry::with_defaults();
    let ranked = metrics_from_file(metrics, ranks, &registry)?;
    output::detail(&format!("{} metrics under test", ranked.len()));

    let set = comparisons_from_file(contrasts, trees, ranked, autolinearize)?;
    let outcome = set.compare()?;
    output::info(&render_report(&outcome));
    Ok(())
}

fn overlay_path(directory: &Path, tree: &GornTree) -> PathBuf {
    directory.join(format!("{}_io.forest", tree.name))
}
