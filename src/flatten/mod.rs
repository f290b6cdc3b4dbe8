//! Values flattening - turn nested values trees into top-level keys
//!
//! This module walks a nested values tree and produces a single-level mapping
//! whose keys spell out the path to each value in lower snake case.
//!
//! ## Pipeline
//!
//! `reader` parses a values file into a [`Node`] tree, `Flattener` decomposes
//! nested mappings up to the configured depth, and `writer` serializes the
//! flat mapping back out as YAML or JSON.

pub mod types;
pub mod normalize;
pub mod extractor;
pub mod reader;
pub mod writer;

pub use types::{FlattenConfig, Mapping, Node, Scalar, BARRIER_KEYS, DEFAULT_DEPTH, DEFAULT_MAX_NESTING};
pub use normalize::{join_key, normalize_key, SEPARATOR};
pub use extractor::{flatten_values, Flattener};
pub use reader::{load_values, parse_values, parse_values_with_limit, strip_comments};
pub use writer::{default_output_path, write_flat_file, FlatWriter, OutputFormat};
