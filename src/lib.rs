//! # flatvars - Flat Helm values generator
//!
//! Flattens nested values files so that every variable sits at the top level,
//! with keys that spell out the original path in lower snake case.
//!
//! ## Modules
//!
//! - **flatten**: Parse, flatten and serialize values trees
//! - **error**: Error type shared by every stage
//!
//! ## Quick Start
//!
//! ```rust
//! use flatvars::flatten::{parse_values, Flattener, FlattenConfig, Node};
//!
//! # fn main() -> flatvars::Result<()> {
//! let values = parse_values(
//!     "image:\n  repository: nginx\n  pullPolicy: IfNotPresent\npodAnnotations:\n  team: web\n",
//! )?;
//!
//! let flattener = Flattener::new(FlattenConfig::default());
//! let flat = flattener.flatten(&values)?;
//!
//! assert_eq!(flat.get("image_repository"), Some(&Node::from("nginx")));
//! assert_eq!(flat.get("image_pull_policy"), Some(&Node::from("IfNotPresent")));
//! assert_eq!(flat.get("pod_annotations_team"), Some(&Node::from("web")));
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use tracing::info;

pub mod error;
pub mod flatten;

// Re-export commonly used types for convenience
pub use error::{FlatvarsError, Result};
pub use flatten::{
    flatten_values, normalize_key, FlatWriter, FlattenConfig, Flattener, Mapping, Node, OutputFormat, Scalar,
};

/// Load a values file and flatten it
pub fn flatten_path(input: &Path, config: FlattenConfig) -> Result<Mapping> {
    let values = flatten::load_values(input, config.max_nesting)?;
    let flat = Flattener::new(config).flatten(&values)?;
    info!(
        input_keys = values.len(),
        output_keys = flat.len(),
        "flattened values"
    );
    Ok(flat)
}

/// Main entry point: flatten a values file and write the result to `output`
pub fn flatten_file(input: &Path, output: &Path, config: FlattenConfig, format: OutputFormat) -> Result<Mapping> {
    let flat = flatten_path(input, config)?;
    flatten::write_flat_file(output, &flat, format)?;
    Ok(flat)
}
