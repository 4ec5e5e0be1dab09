//! Loading trees, metrics, and comparison sets from their file formats.
//!
//! A tree *foo* is specified by up to three files:
//!
//! - `foo.tree.forest` — bracketed tree, required
//! - `foo.linear` — surface leaf order, optional (structural order otherwise)
//! - `foo.move.forest` — movement arcs, optional
//!
//! Metric and comparison files are line-oriented, `;`-separated, with `#`
//! comments.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::str::FromStr;

use itertools::Itertools;
use rayon::prelude::*;
use tracing::{debug, instrument};
use walkdir::WalkDir;

use crate::builder::TreeBuilder;
use crate::comparison::{Comparison, ComparisonSet};
use crate::errors::{MgError, MgResult};
use crate::metrics::{Metric, MetricSpec, RankedMetric};
use crate::parser::{parse_linear, parse_moves, ForestParser};
use crate::registry::ReducerRegistry;
use crate::tree::GornTree;
use crate::values::LoadType;

pub const TREE_EXTENSION: &str = ".tree.forest";
pub const LINEAR_EXTENSION: &str = ".linear";
pub const MOVE_EXTENSION: &str = ".move.forest";

/// Build a fully annotated tree from `foo.tree.forest` and its companions.
///
/// `base` may carry the `.tree.forest` extension or not. With
/// `autolinearize` (or without a `.linear` file) the structural leaf order
/// is used.
#[instrument(level = "debug")]
pub fn tree_from_file(base: impl AsRef<Path> + std::fmt::Debug, autolinearize: bool) -> MgResult<GornTree> {
    let base = strip_extension(base.as_ref());
    let name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let tree_path = with_extension(&base, TREE_EXTENSION);
    let source = read(&tree_path)?;
    let specs = ForestParser::new()
        .parse(&source)
        .map_err(|e| in_file(&tree_path, e))?;

    let mut builder = TreeBuilder::new(name).nodes(specs);

    let linear_path = with_extension(&base, LINEAR_EXTENSION);
    if !autolinearize && linear_path.exists() {
        let order = parse_linear(&read(&linear_path)?).map_err(|e| in_file(&linear_path, e))?;
        builder = builder.leaf_order(order.into_iter().map(|(_, address)| address));
    } else {
        debug!(tree = %base.display(), "no linearization used; falling back to structural order");
    }

    let move_path = with_extension(&base, MOVE_EXTENSION);
    if move_path.exists() {
        let moves = parse_moves(&read(&move_path)?).map_err(|e| in_file(&move_path, e))?;
        builder = builder.movement(moves);
    }

    builder.build()
}

/// Batch-build every `*.tree.forest` under a directory. Trees are
/// independent, so they are parsed and annotated in parallel; each tree's
/// metric cache starts empty and private.
#[instrument(level = "debug")]
pub fn trees_from_dir(directory: impl AsRef<Path> + std::fmt::Debug, autolinearize: bool) -> MgResult<Vec<GornTree>> {
    let directory = directory.as_ref();
    if !directory.is_dir() {
        return Err(MgError::FileNotFound(directory.to_path_buf()));
    }
    let mut bases: Vec<PathBuf> = WalkDir::new(directory)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .filter(|entry| entry.path().to_string_lossy().ends_with(TREE_EXTENSION))
        .map(|entry| strip_extension(entry.path()))
        .collect();
    bases.sort();

    bases
        .par_iter()
        .map(|base| tree_from_file(base, autolinearize))
        .collect()
}

/// Build ranked metrics from a `*.metrics` file.
///
/// Line format: `name; load_type; operator; trivial; filters`. Trailing
/// fields may be omitted. The filter field lists node-type tokens separated
/// by commas; a `*` expands the line into every subset of the listed
/// filters. `ranks` composes the resulting base metrics into all cascades
/// of exactly that length.
#[instrument(level = "debug", skip(registry))]
pub fn metrics_from_file(
    path: impl AsRef<Path> + std::fmt::Debug,
    ranks: usize,
    registry: &ReducerRegistry,
) -> MgResult<Vec<RankedMetric>> {
    let path = path.as_ref();
    let mut base_metrics = Vec::new();
    for (number, line) in read(path)?.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        for spec in parse_metric_line(line).map_err(|e| {
            in_file(path, MgError::Spec(format!("line {}: {}", number + 1, e)))
        })? {
            base_metrics.push(Metric::from_spec(&spec, registry)?);
        }
    }

    Ok((0..ranks)
        .map(|_| base_metrics.clone())
        .multi_cartesian_product()
        .filter_map(|combination| RankedMetric::new(combination).ok())
        .collect())
}

/// Structured alternative to the line format: a TOML file with one
/// `[[metric]]` table per metric, deserialized straight into [`MetricSpec`]
/// records (no filter-variant expansion; variants are spelled out).
#[instrument(level = "debug", skip(registry))]
pub fn metrics_from_toml(
    path: impl AsRef<Path> + std::fmt::Debug,
    ranks: usize,
    registry: &ReducerRegistry,
) -> MgResult<Vec<RankedMetric>> {
    #[derive(serde::Deserialize)]
    struct MetricFile {
        metric: Vec<MetricSpec>,
    }

    let path = path.as_ref();
    let file: MetricFile = toml::from_str(&read(path)?).map_err(|e| MgError::ParseError {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    let base_metrics = file
        .metric
        .iter()
        .map(|spec| Metric::from_spec(spec, registry))
        .collect::<MgResult<Vec<_>>>()?;

    Ok((0..ranks)
        .map(|_| base_metrics.clone())
        .multi_cartesian_product()
        .filter_map(|combination| RankedMetric::new(combination).ok())
        .collect())
}

/// One `*.metrics` line, expanded over its filter variants.
fn parse_metric_line(line: &str) -> Result<Vec<MetricSpec>, String> {
    let fields: Vec<&str> = line.split(';').map(str::trim).collect();
    let name = fields.first().copied().unwrap_or_default();
    if name.is_empty() {
        return Err("metric needs a name".into());
    }
    let load_type = match fields.get(1).copied().unwrap_or_default() {
        "" => LoadType::Tenure,
        text => LoadType::from_str(text).map_err(|e| e.to_string())?,
    };
    let operator = fields.get(2).copied().unwrap_or_default().to_string();
    let trivial = match fields.get(3).copied().unwrap_or_default() {
        "" | "false" | "False" | "0" => false,
        "true" | "True" | "1" => true,
        other => return Err(format!("expected a boolean trivial flag, got {:?}", other)),
    };
    let filters = fields.get(4).copied().unwrap_or_default();

    Ok(expand_filters(filters)
        .into_iter()
        .map(|filter_set| MetricSpec {
            // filter variants need distinct names: the per-tree value cache
            // is keyed by metric name
            name: if filter_set.is_empty() {
                name.to_string()
            } else {
                format!("{}[{}]", name, filter_set.iter().sorted().join(""))
            },
            load_type,
            operator: operator.clone(),
            trivial,
            filters: filter_set,
        })
        .collect())
}

/// `"I, U"` → one filter set; `"I, U, *"` → every subset of `{I, U}`.
fn expand_filters(field: &str) -> Vec<Vec<String>> {
    let tokens: Vec<String> = field
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "*")
        .map(str::to_string)
        .collect();
    if field.split(',').any(|t| t.trim() == "*") {
        tokens
            .iter()
            .powerset()
            .map(|subset| subset.into_iter().cloned().collect())
            .collect()
    } else {
        vec![tokens]
    }
}

/// Build a comparison set from a `*.compare` file.
///
/// Line format: `name; winner; loser`, where winner and loser are tree base
/// names resolved against `tree_dir`. Trees appearing in several contrasts
/// are loaded once and shared, so metric values are memoized across the set.
#[instrument(level = "debug", skip(metrics))]
pub fn comparisons_from_file(
    path: impl AsRef<Path> + std::fmt::Debug,
    tree_dir: impl AsRef<Path> + std::fmt::Debug,
    metrics: Vec<RankedMetric>,
    autolinearize: bool,
) -> MgResult<ComparisonSet> {
    let path = path.as_ref();
    let tree_dir = tree_dir.as_ref();
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut set = ComparisonSet::new(name);
    for metric in metrics {
        set.add_metric(metric);
    }

    let mut cache: HashMap<String, Rc<GornTree>> = HashMap::new();
    let mut load = |base: &str| -> MgResult<Rc<GornTree>> {
        if let Some(tree) = cache.get(base) {
            return Ok(Rc::clone(tree));
        }
        let tree = Rc::new(tree_from_file(tree_dir.join(base), autolinearize)?);
        cache.insert(base.to_string(), Rc::clone(&tree));
        Ok(tree)
    };

    for (number, line) in read(path)?.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.split(';').map(str::trim).collect();
        let &[contrast, winner, loser] = fields.as_slice() else {
            return Err(in_file(
                path,
                MgError::Spec(format!(
                    "line {}: expected \"name; winner; loser\", got {:?}",
                    number + 1,
                    line
                )),
            ));
        };
        set.add(Comparison::new(contrast, load(winner)?, load(loser)?));
    }
    Ok(set)
}

fn strip_extension(path: &Path) -> PathBuf {
    let text = path.to_string_lossy();
    match text.strip_suffix(TREE_EXTENSION) {
        Some(stripped) => PathBuf::from(stripped),
        None => path.to_path_buf(),
    }
}

fn with_extension(base: &Path, extension: &str) -> PathBuf {
    PathBuf::from(format!("{}{}", base.display(), extension))
}

fn read(path: &Path) -> MgResult<String> {
    std::fs::read_to_string(path).map_err(|e| {
        if e.kind() == std::io::ErrorKind::NotFound {
            MgError::FileNotFound(path.to_path_buf())
        } else {
            MgError::FileReadError(e)
        }
    })
}

fn in_file(path: &Path, error: MgError) -> MgError {
    match error {
        MgError::Spec(reason) => MgError::ParseError {
            path: path.to_path_buf(),
            reason,
        },
        other => other,
    }
}
