//! Path algebra over dotted column names and underscore-joined table names.
//!
//! Nested classes show up in two naming schemes:
//!
//! - column names, where `.` separates nesting levels
//!   (`coverageList.insuredEntityList.oid`)
//! - sampler-generated table names, where `_` separates them
//!   (`quote_coverageList_coverageList`)
//!
//! Array-valued containers carry a `List` suffix that is not part of the class
//! name, so `coverageList` and `coverage` denote the same class.

use std::fmt;

pub const LIST_SUFFIX: &str = "List";
pub const COLUMN_SEPARATOR: char = '.';
pub const TABLE_SEPARATOR: char = '_';

/// Parent reference used when a class is nested directly inside itself
pub const SELF_PARENT_REFERENCE: &str = "pid";
/// The document identity field
pub const DOCUMENT_ID_FIELD: &str = "_id";

/// Strip the array-container suffix: `coverageList` -> `coverage`
pub fn normalize_segment(segment: &str) -> &str {
    match segment.strip_suffix(LIST_SUFFIX) {
        Some(bare) if !bare.is_empty() => bare,
        _ => segment,
    }
}

/// Two path segments name the same class modulo the `List` suffix
pub fn same_class(a: &str, b: &str) -> bool {
    normalize_segment(a) == normalize_segment(b)
}

/// `<class>_id`, the name of a column referencing an instance of `class`
pub fn id_reference(segment: &str) -> String {
    format!("{}{}", normalize_segment(segment), DOCUMENT_ID_FIELD)
}

pub fn column_segments(column_name: &str) -> Vec<&str> {
    column_name.split(COLUMN_SEPARATOR).collect()
}

pub fn table_segments(table_name: &str) -> Vec<&str> {
    table_name.split(TABLE_SEPARATOR).collect()
}

/// Ordered nesting segments from a schema root down to a nested class,
/// e.g. `[quote, coverageList, insuredEntityList]`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ClassPath(Vec<String>);

impl ClassPath {
    pub fn new<S: Into<String>>(segments: impl IntoIterator<Item = S>) -> Self {
        ClassPath(segments.into_iter().map(Into::into).collect())
    }

    /// Whether the path reaches below its root, i.e. the class is actually nested
    pub fn is_nested(&self) -> bool {
        self.0.len() >= 2
    }

    pub fn root(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// The innermost segment, i.e. the class itself
    pub fn stage(&self) -> Option<&str> {
        self.0.last().map(String::as_str)
    }

    pub fn parent(&self) -> Option<&str> {
        let n = self.0.len();
        (n >= 2).then(|| self.0[n - 2].as_str())
    }

    /// Segments strictly between the root and the class
    pub fn intermediates(&self) -> &[String] {
        match self.0.len() {
            0..=2 => &[],
            n => &self.0[1..n - 1],
        }
    }

    /// Name of the column referencing this class's parent instance.
    ///
    /// `None` below two segments, `pid` when the class is nested directly in
    /// itself, and `<parent>_id` otherwise.
    pub fn parent_reference_name(&self) -> Option<String> {
        let stage = self.stage()?;
        let parent = self.parent()?;
        if same_class(parent, stage) {
            Some(SELF_PARENT_REFERENCE.to_string())
        } else {
            Some(id_reference(parent))
        }
    }
}

impl fmt::Display for ClassPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

/// A table name in which one segment repeats back to back
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfRecursion {
    /// The repeated segment as written in the table name (`coverageList`)
    pub segment: String,
    /// How many times the segment occurs in the table name
    pub depth: usize,
    /// Reason the collapser cannot handle this name, if any
    pub unsupported: Option<String>,
}

impl SelfRecursion {
    /// Suffix-normalised class name of the repeated segment
    pub fn class_name(&self) -> &str {
        normalize_segment(&self.segment)
    }
}

/// Find a segment that repeats with only separators between repetitions.
///
/// The first back-to-back repeat in the table name decides the recursive
/// segment. Trailing segments after the recursive run (a class nested under
/// a recursive class) or a second, different repeated run (compound
/// recursion) are reported through `unsupported` rather than rejected here.
pub fn detect_self_recursion(table_name: &str) -> Option<SelfRecursion> {
    let tokens = table_segments(table_name);
    let start = tokens
        .windows(2)
        .position(|pair| !pair[0].is_empty() && pair[0] == pair[1])?;
    let segment = tokens[start];

    let run_end = tokens[start..]
        .iter()
        .position(|token| *token != segment)
        .map_or(tokens.len(), |offset| start + offset);
    let depth = tokens.iter().filter(|token| **token == segment).count();

    let other_run = tokens[run_end..]
        .windows(2)
        .find(|pair| !pair[0].is_empty() && pair[0] == pair[1] && pair[0] != segment)
        .map(|pair| pair[0]);

    let unsupported = if let Some(other) = other_run {
        Some(format!(
            "compound recursion of '{}' and '{}'",
            segment, other
        ))
    } else if run_end < tokens.len() {
        Some(format!(
            "class '{}' is nested under recursive class '{}'",
            tokens[tokens.len() - 1],
            segment
        ))
    } else {
        None
    };

    Some(SelfRecursion {
        segment: segment.to_string(),
        depth,
        unsupported,
    })
}

/// Nearest distinct ancestor of the innermost class in a table name.
///
/// Repeated segments are counted once, so `quote_coverageList_coverageList`
/// has ancestor `quote` and `coverageList_coverageList` has none.
pub fn table_ancestor(table_name: &str) -> Option<String> {
    let mut distinct: Vec<&str> = Vec::new();
    for token in table_segments(table_name) {
        if !distinct.contains(&token) {
            distinct.push(token);
        }
    }
    match distinct.len() {
        0 | 1 => None,
        n => Some(normalize_segment(distinct[n - 2]).to_string()).filter(|s| !s.is_empty()),
    }
}

/// Whether `table_name` ends with one or more `_<segment>` repetitions
pub fn ends_with_recursive_segment(table_name: &str, segment: &str) -> bool {
    let tokens = table_segments(table_name);
    tokens.len() >= 2 && tokens.last() == Some(&segment)
}

/// Column name relative to a `depth`-long leading run of `segment`.
///
/// `coverageList.coverageList.code` at depth 2 becomes `code`. Columns that
/// do not sit under the full run belong to an ancestor level and yield `None`,
/// as does a run with nothing after it.
pub fn strip_recursive_prefix(column_name: &str, segment: &str, depth: usize) -> Option<String> {
    let tokens = column_segments(column_name);
    if depth == 0 || tokens.len() <= depth {
        return None;
    }
    if tokens[..depth].iter().any(|token| *token != segment) {
        return None;
    }
    Some(tokens[depth..].join("."))
}
