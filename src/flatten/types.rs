use indexmap::IndexMap;

/// Default number of nested mapping levels decomposed into top-level keys
pub const DEFAULT_DEPTH: usize = 2;

/// Default recursion ceiling for traversals over input trees
pub const DEFAULT_MAX_NESTING: usize = 128;

/// Key suffixes whose subtrees are kept intact once the depth budget runs out
pub const BARRIER_KEYS: &[&str] = &["annotations"];

/// A leaf value in a values tree
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Scalar {
    Null,
    Bool(bool),
    Number(serde_yaml::Number),
    String(String),
}

/// A node in a values tree
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl Node {
    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(mapping) => Some(mapping),
            _ => None,
        }
    }

    pub fn is_mapping(&self) -> bool {
        matches!(self, Node::Mapping(_))
    }
}

impl From<Scalar> for Node {
    fn from(scalar: Scalar) -> Self {
        Node::Scalar(scalar)
    }
}

impl From<Mapping> for Node {
    fn from(mapping: Mapping) -> Self {
        Node::Mapping(mapping)
    }
}

impl From<Vec<Node>> for Node {
    fn from(items: Vec<Node>) -> Self {
        Node::Sequence(items)
    }
}

impl From<&str> for Node {
    fn from(value: &str) -> Self {
        Node::Scalar(Scalar::String(value.to_string()))
    }
}

impl From<String> for Node {
    fn from(value: String) -> Self {
        Node::Scalar(Scalar::String(value))
    }
}

impl From<i64> for Node {
    fn from(value: i64) -> Self {
        Node::Scalar(Scalar::Number(value.into()))
    }
}

impl From<bool> for Node {
    fn from(value: bool) -> Self {
        Node::Scalar(Scalar::Bool(value))
    }
}

/// Insertion-ordered mapping from string keys to nodes.
///
/// Inserting an existing key replaces its value but keeps the position of the
/// first insertion, so merges are last-write-wins.
pub type Mapping = IndexMap<String, Node>;

/// Configuration for the flattening process
#[derive(Debug, Clone)]
pub struct FlattenConfig {
    /// Number of nested mapping levels to decompose (0 = only split the
    /// children of top-level mappings)
    pub depth_limit: usize,

    /// Prefix prepended to every output key
    pub prefix: String,

    /// Key suffixes that keep a subtree intact
    pub barrier_keys: Vec<String>,

    /// Check barriers before the depth budget instead of only after it runs out
    pub strict_barriers: bool,

    /// Recursion ceiling for raw input nesting
    pub max_nesting: usize,
}

impl Default for FlattenConfig {
    fn default() -> Self {
        FlattenConfig {
            depth_limit: DEFAULT_DEPTH,
            prefix: String::new(),
            barrier_keys: BARRIER_KEYS.iter().map(|key| key.to_string()).collect(),
            strict_barriers: false,
            max_nesting: DEFAULT_MAX_NESTING,
        }
    }
}
