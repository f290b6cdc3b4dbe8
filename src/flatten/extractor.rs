use crate::error::{FlatvarsError, Result};
use crate::flatten::normalize::{join_key, normalize_key, SEPARATOR};
use crate::flatten::types::{FlattenConfig, Mapping, Node};
use tracing::debug;

/// The core flattener that turns a nested values tree into top-level keys
#[derive(Debug, Clone, Default)]
pub struct Flattener {
    config: FlattenConfig,
}

impl Flattener {
    pub fn new(config: FlattenConfig) -> Self {
        Flattener { config }
    }

    pub fn config(&self) -> &FlattenConfig {
        &self.config
    }

    /// Flatten a values mapping into a single-level mapping
    pub fn flatten(&self, values: &Mapping) -> Result<Mapping> {
        let prefix = Some(self.config.prefix.as_str()).filter(|prefix| !prefix.is_empty());
        self.flatten_mapping(values, prefix, 0)
    }

    /// Flatten a node that must be a mapping at the top level
    pub fn flatten_node(&self, node: &Node) -> Result<Mapping> {
        match node {
            Node::Mapping(values) => self.flatten(values),
            Node::Sequence(_) => Err(FlatvarsError::malformed(
                "expected a mapping at the top level, found a sequence",
            )),
            Node::Scalar(_) => Err(FlatvarsError::malformed(
                "expected a mapping at the top level, found a scalar",
            )),
        }
    }

    /// Recursively flatten one mapping.
    ///
    /// `depth` is the nesting level of this frame; every child of the frame
    /// sees the same remaining budget. `prefix` is `None` only at the root
    /// without a configured prefix.
    fn flatten_mapping(&self, values: &Mapping, prefix: Option<&str>, depth: usize) -> Result<Mapping> {
        if depth > self.config.max_nesting {
            return Err(FlatvarsError::NestingTooDeep {
                limit: self.config.max_nesting,
            });
        }

        let mut flat = Mapping::new();

        for (key, value) in values.iter() {
            let path = join_key(prefix, key);

            let Node::Mapping(nested) = value else {
                Self::emit(&mut flat, &path, value.clone());
                continue;
            };

            if self.config.strict_barriers && self.is_barrier(key) {
                debug!(key = %path, "barrier key kept intact");
                Self::emit(&mut flat, &path, value.clone());
                continue;
            }

            if depth < self.config.depth_limit {
                let nested_flat = self.flatten_mapping(nested, Some(&path), depth + 1)?;
                for (flat_key, flat_value) in nested_flat {
                    Self::merge(&mut flat, flat_key, flat_value);
                }
            } else if self.is_barrier(key) {
                debug!(key = %path, "barrier key kept intact");
                Self::emit(&mut flat, &path, value.clone());
            } else {
                // Depth exhausted: split exactly one more level
                for (child_key, child) in nested.iter() {
                    Self::emit(&mut flat, &join_key(Some(&path), child_key), child.clone());
                }
            }
        }

        Ok(flat)
    }

    /// Check whether a key keeps its subtree intact
    fn is_barrier(&self, key: &str) -> bool {
        if key.contains('/') {
            return true;
        }

        let last_segment = key.rsplit(SEPARATOR).next().unwrap_or(key);
        self.config
            .barrier_keys
            .iter()
            .any(|barrier| barrier == last_segment)
    }

    fn emit(flat: &mut Mapping, path: &str, value: Node) {
        Self::merge(flat, normalize_key(path), value);
    }

    fn merge(flat: &mut Mapping, key: String, value: Node) {
        if flat.contains_key(&key) {
            debug!(key = %key, "key collision, keeping the later value");
        }
        flat.insert(key, value);
    }
}

/// Flatten `values` with the default barrier keys.
///
/// Keys are built by joining `prefix` and the traversed path with `_`, then
/// normalized to lower snake case.
pub fn flatten_values(values: &Mapping, depth_limit: usize, prefix: &str) -> Result<Mapping> {
    let config = FlattenConfig {
        depth_limit,
        prefix: prefix.to_string(),
        ..FlattenConfig::default()
    };
    Flattener::new(config).flatten(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::reader::parse_values;

    fn values(yaml: &str) -> Mapping {
        parse_values(yaml).unwrap()
    }

    fn keys(mapping: &Mapping) -> Vec<&str> {
        mapping.keys().map(String::as_str).collect()
    }

    #[test]
    fn test_two_level_mapping() {
        let flat = flatten_values(&values("a:\n  b: 1\n  c: 2\n"), 2, "").unwrap();

        assert_eq!(keys(&flat), vec!["a_b", "a_c"]);
        assert_eq!(flat.get("a_b"), Some(&Node::from(1)));
        assert_eq!(flat.get("a_c"), Some(&Node::from(2)));
    }

    #[test]
    fn test_barrier_kept_intact_at_depth_zero() {
        let input = values("meta:\n  annotations:\n    x: 1\n    y: 2\n");
        let flat = flatten_values(&input, 0, "").unwrap();

        assert_eq!(keys(&flat), vec!["meta_annotations"]);
        let kept = flat.get("meta_annotations").and_then(Node::as_mapping).unwrap();
        assert_eq!(kept, &values("x: 1\ny: 2\n"));
    }

    #[test]
    fn test_barrier_suffix_on_exhausted_key() {
        let input = values("pod_annotations:\n  team: core\n");
        let flat = flatten_values(&input, 0, "").unwrap();

        assert_eq!(keys(&flat), vec!["pod_annotations"]);
        assert!(flat.get("pod_annotations").unwrap().is_mapping());
    }

    #[test]
    fn test_slash_key_is_barrier() {
        let input = values("example.com/config:\n  mode: strict\n");
        let flat = flatten_values(&input, 0, "").unwrap();

        assert_eq!(keys(&flat), vec!["example.com/config"]);
        assert!(flat.get("example.com/config").unwrap().is_mapping());
    }

    #[test]
    fn test_depth_zero_splits_one_level() {
        let input = values("image:\n  repository: nginx\n  pullPolicy: Always\n  extra:\n    deep: true\n");
        let flat = flatten_values(&input, 0, "").unwrap();

        assert_eq!(
            keys(&flat),
            vec!["image_repository", "image_pull_policy", "image_extra"]
        );
        assert_eq!(flat.get("image_extra"), Some(&Node::Mapping(values("deep: true"))));
    }

    #[test]
    fn test_depth_is_bounded_per_level_not_per_sibling() {
        let input = values("a:\n  x:\n    y: 1\nb:\n  x:\n    y: 2\nc:\n  x:\n    y: 3\n");
        let flat = flatten_values(&input, 1, "").unwrap();

        assert_eq!(keys(&flat), vec!["a_x_y", "b_x_y", "c_x_y"]);
    }

    #[test]
    fn test_depth_limit_stops_descent() {
        let input = values("a:\n  b:\n    c:\n      d: 1\n");
        let flat = flatten_values(&input, 1, "").unwrap();

        assert_eq!(keys(&flat), vec!["a_b_c"]);
        assert_eq!(flat.get("a_b_c"), Some(&Node::Mapping(values("d: 1"))));
    }

    #[test]
    fn test_prefix_is_normalized() {
        let input = values("image:\n  tag: latest\n");
        let flat = flatten_values(&input, 2, "myApp").unwrap();

        assert_eq!(keys(&flat), vec!["my_app_image_tag"]);
    }

    #[test]
    fn test_collision_last_write_wins() {
        let input = values("imageTag: first\nimage_tag: second\n");
        let flat = flatten_values(&input, 2, "").unwrap();

        assert_eq!(flat.len(), 1);
        assert_eq!(flat.get("image_tag"), Some(&Node::from("second")));
    }

    #[test]
    fn test_collision_between_nested_and_flat_keys() {
        let input = values("image:\n  tag: nested\nimage_tag: top\nother: 1\n");
        let flat = flatten_values(&input, 2, "").unwrap();

        assert_eq!(keys(&flat), vec!["image_tag", "other"]);
        assert_eq!(flat.get("image_tag"), Some(&Node::from("top")));
    }

    #[test]
    fn test_merged_anchor_flattens_like_plain_keys() {
        let input = values("base: &b\n  port: 80\nsvc:\n  <<: *b\n  name: web\n");
        let flat = flatten_values(&input, 2, "").unwrap();

        assert_eq!(flat.get("svc_port"), Some(&Node::from(80)));
        assert_eq!(flat.get("svc_name"), Some(&Node::from("web")));
        assert!(flat.keys().all(|key| !key.contains("<<")));
    }

    #[test]
    fn test_empty_top_level_key_keeps_its_segment() {
        let input = values("\"\":\n  x: 1\nx: 2\n");
        let flat = flatten_values(&input, 2, "").unwrap();

        assert_eq!(flat.len(), 2);
        assert_eq!(flat.get("_x"), Some(&Node::from(1)));
        assert_eq!(flat.get("x"), Some(&Node::from(2)));
    }

    #[test]
    fn test_empty_key_at_exhausted_depth() {
        let input = values("\"\":\n  x: 1\n");
        let flat = flatten_values(&input, 0, "").unwrap();

        assert_eq!(keys(&flat), vec!["_x"]);
    }

    #[test]
    fn test_sequences_pass_through() {
        let input = values("hosts:\n  - name: a\n    paths:\n      nested: true\n  - plain\n");
        let flat = flatten_values(&input, 5, "").unwrap();

        assert_eq!(flat.get("hosts"), input.get("hosts"));
    }

    #[test]
    fn test_strict_barriers_ignore_depth_budget() {
        let input = values("metadata:\n  annotations:\n    x: 1\n");

        let relaxed = flatten_values(&input, 2, "").unwrap();
        assert_eq!(keys(&relaxed), vec!["metadata_annotations_x"]);

        let strict = Flattener::new(FlattenConfig {
            strict_barriers: true,
            ..FlattenConfig::default()
        })
        .flatten(&input)
        .unwrap();
        assert_eq!(keys(&strict), vec!["metadata_annotations"]);
        assert!(strict.get("metadata_annotations").unwrap().is_mapping());
    }

    #[test]
    fn test_custom_barrier_keys() {
        let flattener = Flattener::new(FlattenConfig {
            depth_limit: 0,
            barrier_keys: vec!["labels".to_string()],
            ..FlattenConfig::default()
        });
        let flat = flattener
            .flatten(&values("pod_labels:\n  app: web\nannotations:\n  a: b\n"))
            .unwrap();

        assert_eq!(keys(&flat), vec!["pod_labels", "annotations_a"]);
    }

    #[test]
    fn test_empty_nested_mapping_disappears_when_descended() {
        let flat = flatten_values(&values("resources: {}\nname: web\n"), 2, "").unwrap();

        assert_eq!(keys(&flat), vec!["name"]);
    }

    #[test]
    fn test_flatten_node_rejects_non_mapping() {
        let flattener = Flattener::default();

        let err = flattener.flatten_node(&Node::from(vec![Node::from(1)])).unwrap_err();
        assert!(matches!(err, FlatvarsError::MalformedInput { .. }));

        let err = flattener.flatten_node(&Node::from("scalar")).unwrap_err();
        assert!(matches!(err, FlatvarsError::MalformedInput { .. }));
    }

    #[test]
    fn test_nesting_ceiling() {
        let flattener = Flattener::new(FlattenConfig {
            depth_limit: 10,
            max_nesting: 1,
            ..FlattenConfig::default()
        });

        let err = flattener.flatten(&values("a:\n  b:\n    c: 1\n")).unwrap_err();
        assert!(matches!(err, FlatvarsError::NestingTooDeep { limit: 1 }));
    }
}
