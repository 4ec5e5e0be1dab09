//! Memory-load metrics over annotated derivation trees.
//!
//! Trees are flat maps keyed by Gorn addresses with a separate surface
//! order over their leaves. Construction annotates every node with an
//! index/outdex pair; tenure- and movement-based load values extracted from
//! the annotation feed metrics, which ranked cascades and comparison sets
//! then test against empirically attested processing contrasts.
//!
//! ```
//! use mgload::builder::{NodeSpec, TreeBuilder};
//! use mgload::values::tenure_extract;
//!
//! let tree = TreeBuilder::new("intransitive")
//!     .nodes([
//!         NodeSpec::new("", "S"),
//!         NodeSpec::new("1", "NP"),
//!         NodeSpec::new("2", "VP"),
//!         NodeSpec::new("21", "sleeps"),
//!     ])
//!     .build()
//!     .unwrap();
//!
//! let trivial: Vec<u32> = tenure_extract(&tree, &[] as &[&str], true)
//!     .into_values()
//!     .collect();
//! assert_eq!(trivial.len(), 4);
//! ```

pub mod address;
pub mod annotate;
pub mod builder;
pub mod cli;
pub mod comparison;
pub mod errors;
pub mod files;
pub mod metrics;
pub mod node;
pub mod parser;
pub mod registry;
pub mod render;
pub mod tree;
pub mod util;
pub mod values;

pub use address::Address;
pub use builder::{NodeSpec, TreeBuilder};
pub use comparison::{Comparison, ComparisonSet};
pub use errors::{MgError, MgResult};
pub use metrics::{Metric, MetricSpec, RankedMetric, Verdict};
pub use node::GornNode;
pub use registry::ReducerRegistry;
pub use tree::GornTree;
pub use values::{LoadType, MetricValue};
