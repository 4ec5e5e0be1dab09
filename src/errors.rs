//! Error taxonomy for tree construction, annotation, and metric comparison.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum MgError {
    #[error("invalid Gorn address: {0:?}")]
    InvalidAddress(String),

    #[error("no node at address: {0}")]
    UnknownAddress(String),

    #[error("no node named: {0}")]
    UnknownName(String),

    #[error("duplicate node at address: {0}")]
    DuplicateAddress(String),

    #[error("tree {tree:?} is structurally inconsistent: {reason}")]
    StructuralInconsistency { tree: String, reason: String },

    #[error("tree {0:?} has no linear leaf order; supply one or derive it from the tree")]
    MissingLinearOrder(String),

    #[error("neither {0} nor {1} dominates any surface leaf")]
    AmbiguousPrecedence(String, String),

    #[error("tree {0:?} is already annotated; annotation runs once per tree")]
    AlreadyAnnotated(String),

    #[error("unregistered operator: {0:?}")]
    UnregisteredOperator(String),

    #[error("metric {metric:?} produced incomparable values {left} and {right}")]
    IncomparableValues {
        metric: String,
        left: String,
        right: String,
    },

    #[error("invalid specification: {0}")]
    Spec(String),

    #[error("failed to parse {path}: {reason}")]
    ParseError { path: PathBuf, reason: String },

    #[error("label mismatch in linearization: address {address} has label {found:?}, not {expected:?}")]
    LabelMismatch {
        address: String,
        expected: String,
        found: String,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("failed to read file: {0}")]
    FileReadError(#[from] std::io::Error),
}

pub type MgResult<T> = Result<T, MgError>;
