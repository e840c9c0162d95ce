//! Column merging for synthesized class tables.
//!
//! Every table a class occurs in contributes the columns that sit under the
//! class, renamed relative to it (`coverageList.coverageList.code` becomes
//! `code`). The first occurrence of a relative name wins. Each occurrence then
//! contributes the column referencing its parent instance.

use log::trace;

use super::class_index::{ClassIndex, ClassOccurrence};
use super::options::UnrollOptions;
use super::path::{column_segments, normalize_segment, DOCUMENT_ID_FIELD};
use crate::drdl::Column;
use crate::utils::FirstWinsIndex;

/// Why a source column is not carried into a class table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Nested objects never surface the document `_id`
    IdentityField,
    /// The column sits above the class, in one of its ancestors
    BelongsToAncestor,
    /// An earlier occurrence already contributed this relative name
    AlreadySeen,
    /// The column sits under another class that gets its own table
    SeparatelyTabled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnDecision {
    Accept(String),
    Skip(SkipReason),
}

/// Column name relative to the innermost segment naming `class_name`.
///
/// Only non-final segments are considered, so a scalar field that happens to
/// share the class name does not count. Returns `None` when the column does
/// not sit under the class at all.
pub fn relative_column_name(class_name: &str, column_name: &str) -> Option<String> {
    let segments = column_segments(column_name);
    let last = segments.len().saturating_sub(1);
    let position = segments[..last]
        .iter()
        .rposition(|segment| normalize_segment(segment) == class_name)?;
    Some(segments[position + 1..].join("."))
}

/// Decide whether `column_name` belongs in the table for `class_name`.
pub fn classify_column(
    class_name: &str,
    column_name: &str,
    accepted: &FirstWinsIndex<String, Column>,
    separately_tabled: &ClassIndex<'_>,
) -> ColumnDecision {
    let relative = relative_column_name(class_name, column_name);
    let name = relative.as_deref().unwrap_or(column_name);

    if name == DOCUMENT_ID_FIELD {
        return ColumnDecision::Skip(SkipReason::IdentityField);
    }
    let Some(relative) = relative else {
        return ColumnDecision::Skip(SkipReason::BelongsToAncestor);
    };
    if accepted.contains_key(relative.as_str()) {
        return ColumnDecision::Skip(SkipReason::AlreadySeen);
    }
    let segments = column_segments(&relative);
    if segments.len() > 1 && separately_tabled.contains(normalize_segment(segments[0])) {
        return ColumnDecision::Skip(SkipReason::SeparatelyTabled);
    }
    ColumnDecision::Accept(relative)
}

/// Build the column set for one class from all of its occurrences.
pub fn merge_columns(
    occurrences: &[ClassOccurrence<'_>],
    separately_tabled: &ClassIndex<'_>,
    options: &UnrollOptions,
) -> Vec<Column> {
    let mut accepted: FirstWinsIndex<String, Column> = FirstWinsIndex::new();

    for occurrence in occurrences {
        trace!(
            "Merging columns of '{}' from {} ({})",
            occurrence.class_name,
            occurrence.table.table,
            occurrence.class_path
        );
        for column in &occurrence.table.columns {
            if options.is_index_column(&column.name) {
                continue;
            }
            match classify_column(
                &occurrence.class_name,
                &column.name,
                &accepted,
                separately_tabled,
            ) {
                ColumnDecision::Accept(relative) => {
                    trace!("  {} <-- {}", relative, column.name);
                    let renamed = column.renamed(&relative);
                    accepted.insert_if_absent(relative, renamed);
                }
                ColumnDecision::Skip(reason) => {
                    trace!("  skip {}: {:?}", column.name, reason);
                }
            }
        }

        if let Some(parent_reference) = occurrence.class_path.parent_reference_name() {
            let column = Column::object_id(&parent_reference);
            accepted.insert_if_absent(parent_reference, column);
        }
    }

    accepted.into_values().collect()
}
