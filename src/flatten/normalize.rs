//! Key normalization for flattened values
//!
//! Composite keys are underscore-joined paths whose segments may carry
//! camelCase words from the source file, e.g. `image_pullPolicy`. Every
//! uppercase letter after the first character of a segment starts a new
//! word; words are lower-cased and joined with the separator, so the example
//! becomes `image_pull_policy`.

/// Separator between path segments in flattened keys
pub const SEPARATOR: char = '_';

/// Join a path prefix and a key with the separator.
///
/// `None` marks the root, so top-level keys carry no leading separator. An
/// empty `Some("")` prefix is a real (empty) segment and keeps its separator.
pub fn join_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) => format!("{prefix}{SEPARATOR}{key}"),
        None => key.to_string(),
    }
}

/// Normalize a composite key into lower snake case.
///
/// Empty segments (from doubled separators) are preserved.
pub fn normalize_key(composite: &str) -> String {
    composite
        .split(SEPARATOR)
        .map(split_case_boundaries)
        .collect::<Vec<_>>()
        .join("_")
}

/// Split one segment at uppercase letters and lower-case the words
fn split_case_boundaries(segment: &str) -> String {
    let boundaries = segment
        .char_indices()
        .skip(1)
        .filter(|(_, ch)| ch.is_uppercase())
        .map(|(idx, _)| idx);

    let mut words = Vec::new();
    let mut start = 0;
    for end in boundaries.chain(std::iter::once(segment.len())) {
        words.push(segment[start..end].to_lowercase());
        start = end;
    }

    words.join("_")
}
