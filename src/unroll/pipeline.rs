//! Extraction pipeline synthesis.
//!
//! Instances of a nested class are pulled out of their documents one nesting
//! level at a time: `$unwind` the array, `$replaceRoot` into it, and repeat.
//! Only the innermost level injects a reference to its parent before it is
//! promoted to the document root. When a class occurs along several nesting
//! paths, the first path is the primary pipeline and every other path runs in
//! a `$unionWith` sub-pipeline against the same collection.

use super::class_index::ClassOccurrence;
use super::options::UnrollOptions;
use super::path::{id_reference, same_class, ClassPath, DOCUMENT_ID_FIELD, SELF_PARENT_REFERENCE};
use crate::drdl::stage::field_path;
use crate::drdl::Stage;

/// How an extracted class instance refers back to its parent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentLink {
    /// Direct child of the root document: `<root>_id` from the document `_id`
    Root(String),
    /// Child of another nested class: `<parent>_id` from the parent's marker field
    Named(String),
    /// Nested directly inside itself: `pid` from the parent's marker field
    SelfNested,
}

impl ParentLink {
    /// Resolve the link for `stage` nested under `parent` in a path rooted at `root`
    pub fn resolve(stage: &str, parent: &str, root: &str) -> Self {
        if same_class(parent, root) {
            ParentLink::Root(parent.to_string())
        } else if !same_class(parent, stage) {
            ParentLink::Named(parent.to_string())
        } else {
            ParentLink::SelfNested
        }
    }

    fn target_field(&self, stage: &str) -> String {
        let reference = match self {
            ParentLink::Root(parent) | ParentLink::Named(parent) => id_reference(parent),
            ParentLink::SelfNested => SELF_PARENT_REFERENCE.to_string(),
        };
        format!("{}.{}", stage, reference)
    }

    fn source_expr(&self, options: &UnrollOptions) -> String {
        match self {
            ParentLink::Root(_) => field_path(DOCUMENT_ID_FIELD),
            ParentLink::Named(_) | ParentLink::SelfNested => options.class_marker_expr(),
        }
    }
}

/// The four-step program extracting `stage` and tagging it with its parent.
///
/// The trailing `$project` removes the leftover copy of `stage` that
/// `$replaceRoot` leaves behind when the promoted object nests itself.
pub fn base_program(stage: &str, link: &ParentLink, options: &UnrollOptions) -> Vec<Stage> {
    vec![
        Stage::unwind(stage),
        Stage::add_fields(link.target_field(stage), link.source_expr(options)),
        Stage::replace_root(stage),
        Stage::project_out(stage),
    ]
}

/// Descend one nesting level without injecting a parent reference
pub fn peel_level(stage: &str) -> [Stage; 2] {
    [Stage::unwind(stage), Stage::replace_root(stage)]
}

/// Program extracting the innermost class of `path`.
///
/// Paths shorter than two segments are not nested and yield no stages.
pub fn generic_program(path: &ClassPath, options: &UnrollOptions) -> Vec<Stage> {
    let (Some(root), Some(parent), Some(stage)) = (path.root(), path.parent(), path.stage()) else {
        return Vec::new();
    };

    let mut program: Vec<Stage> = path
        .intermediates()
        .iter()
        .flat_map(|segment| peel_level(segment))
        .collect();
    program.extend(base_program(stage, &ParentLink::resolve(stage, parent, root), options));
    program
}

/// Program extracting `segment` instances nested `level` levels inside
/// themselves, each tagged with a `pid` reference.
pub fn nested_level_program(segment: &str, level: usize, options: &UnrollOptions) -> Vec<Stage> {
    let mut program: Vec<Stage> = (0..level).flat_map(|_| peel_level(segment)).collect();
    program.extend(base_program(segment, &ParentLink::SelfNested, options));
    program
}

/// Pipeline collecting a class from every place it occurs.
pub fn class_pipeline(occurrences: &[ClassOccurrence<'_>], options: &UnrollOptions) -> Vec<Stage> {
    let Some(first) = occurrences.first() else {
        return Vec::new();
    };
    if !first.class_path.is_nested() {
        return Vec::new();
    }

    let collection = &first.table.collection;
    let mut pipeline = generic_program(&first.class_path, options);
    for occurrence in &occurrences[1..] {
        if !occurrence.class_path.is_nested() {
            continue;
        }
        pipeline.push(Stage::union_with(
            collection.clone(),
            generic_program(&occurrence.class_path, options),
        ));
    }
    pipeline
}
