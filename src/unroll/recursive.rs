//! Collapsing of self-recursive classes.
//!
//! A tree-shaped subdocument (a `coverageList` holding more `coverageList`s)
//! shows up as one sampled table per depth:
//!
//! ```text
//! quote_coverageList
//! quote_coverageList_coverageList
//! quote_coverageList_coverageList_coverageList
//! ```
//!
//! The deepest table carries every column seen at any depth, so it is kept as
//! the canonical table for the family. Its columns lose the repeated prefix,
//! its pipeline unions one extraction program per depth, and it is renamed
//! to the bare class name. The shallower per-depth tables are then dropped.
//!
//! A class nested under a recursive class, or two recursive classes in one
//! table name, cannot be collapsed this way. Such tables are reported and
//! left untouched.

use indexmap::IndexMap;
use log::{debug, trace, warn};

use super::errors::UnrollError;
use super::options::UnrollOptions;
use super::path::{
    detect_self_recursion, ends_with_recursive_segment, id_reference, normalize_segment,
    strip_recursive_prefix, table_ancestor, DOCUMENT_ID_FIELD, SELF_PARENT_REFERENCE,
};
use super::pipeline::{base_program, nested_level_program, ParentLink};
use crate::drdl::{Column, Stage, Table};
use crate::utils::FirstWinsIndex;

/// The deepest table seen for one recursive segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecursiveFamily {
    /// Repeated segment as written in table names (`coverageList`)
    pub segment: String,
    /// Maximum number of repetitions seen in any table name
    pub depth: usize,
    /// Position of the deepest table in the table list
    pub table_position: usize,
}

/// Find the deepest table of every recursive family.
///
/// Ties keep the first table seen. Tables whose recursion shape cannot be
/// collapsed are skipped with a warning, or rejected in strict mode.
pub fn find_recursive_families(
    tables: &[Table],
    options: &UnrollOptions,
) -> Result<Vec<RecursiveFamily>, UnrollError> {
    let mut families: IndexMap<String, RecursiveFamily> = IndexMap::new();

    for (position, table) in tables.iter().enumerate() {
        let Some(recursion) = detect_self_recursion(&table.table) else {
            continue;
        };
        if let Some(reason) = recursion.unsupported {
            if options.strict_recursion {
                return Err(UnrollError::UnsupportedRecursionShape {
                    table: table.table.clone(),
                    reason,
                });
            }
            warn!(
                "Leaving table '{}' as is: unsupported recursion shape ({})",
                table.table, reason
            );
            continue;
        }

        let candidate = RecursiveFamily {
            segment: recursion.segment.clone(),
            depth: recursion.depth,
            table_position: position,
        };
        match families.get_mut(&recursion.segment) {
            Some(current) if current.depth >= candidate.depth => {}
            Some(current) => *current = candidate,
            None => {
                families.insert(recursion.segment, candidate);
            }
        }
    }

    Ok(families.into_values().collect())
}

/// Columns of the collapsed table: the fields under the full recursive run,
/// renamed relative to it, plus `pid` and the ancestor reference when there
/// is one.
///
/// Ancestor-level columns (the document `_id`, shallower class markers) are
/// dropped along with index columns, since the pipeline has unwound past them.
pub fn collapsed_columns(
    table: &Table,
    family: &RecursiveFamily,
    ancestor: Option<&str>,
    options: &UnrollOptions,
) -> Vec<Column> {
    let mut columns: FirstWinsIndex<String, Column> = FirstWinsIndex::new();
    for column in &table.columns {
        if options.is_index_column(&column.name) {
            continue;
        }
        let Some(name) = strip_recursive_prefix(&column.name, &family.segment, family.depth)
            .filter(|name| name != DOCUMENT_ID_FIELD)
        else {
            trace!("  skip {}: outside the recursive run", column.name);
            continue;
        };
        let sql_name = strip_recursive_prefix(&column.sql_name, &family.segment, family.depth)
            .unwrap_or_else(|| name.clone());
        columns.insert_if_absent(
            name.clone(),
            Column {
                name,
                sql_name,
                ..column.clone()
            },
        );
    }

    columns.insert_if_absent(
        SELF_PARENT_REFERENCE.to_string(),
        Column::object_id(SELF_PARENT_REFERENCE),
    );
    if let Some(ancestor) = ancestor {
        let reference = id_reference(ancestor);
        let column = Column::object_id(&reference);
        columns.insert_if_absent(reference, column);
    }
    columns.into_values().collect()
}

/// Pipeline of the collapsed table: the top-level extraction, then one
/// `$unionWith` per deeper level.
pub fn collapsed_pipeline(
    family: &RecursiveFamily,
    ancestor: Option<&str>,
    collection: &str,
    options: &UnrollOptions,
) -> Vec<Stage> {
    let link = match ancestor {
        Some(ancestor) => ParentLink::Root(ancestor.to_string()),
        None => ParentLink::SelfNested,
    };
    let mut pipeline = base_program(&family.segment, &link, options);
    for level in 1..family.depth {
        pipeline.push(Stage::union_with(
            collection,
            nested_level_program(&family.segment, level, options),
        ));
    }
    pipeline
}

fn collapse_table(table: &Table, family: &RecursiveFamily, options: &UnrollOptions) -> Table {
    let ancestor = table_ancestor(&table.table);
    let name = format!(
        "{}{}",
        options.collapsed_table_prefix,
        normalize_segment(&family.segment)
    );
    debug!(
        "Collapsing recursive class '{}' (depth {}) from '{}' into '{}'",
        family.segment, family.depth, table.table, name
    );

    Table {
        table: name,
        collection: table.collection.clone(),
        pipeline: collapsed_pipeline(family, ancestor.as_deref(), &table.collection, options),
        columns: collapsed_columns(table, family, ancestor.as_deref(), options),
    }
}

/// Collapse every self-recursive family in `tables`.
///
/// The deepest table of each family is rewritten in place. Every other table
/// whose name ends in the family's segment is removed. Families are all found
/// before anything is removed.
pub fn collapse_recursive(
    tables: Vec<Table>,
    options: &UnrollOptions,
) -> Result<Vec<Table>, UnrollError> {
    let families = find_recursive_families(&tables, options)?;
    if families.is_empty() {
        return Ok(tables);
    }

    let mut collapsed = Vec::with_capacity(tables.len());
    for (position, table) in tables.into_iter().enumerate() {
        if let Some(family) = families.iter().find(|f| f.table_position == position) {
            collapsed.push(collapse_table(&table, family, options));
            continue;
        }
        if let Some(family) = families
            .iter()
            .find(|f| ends_with_recursive_segment(&table.table, &f.segment))
        {
            debug!(
                "Dropping '{}': subsumed by collapsed class '{}'",
                table.table, family.segment
            );
            continue;
        }
        collapsed.push(table);
    }
    Ok(collapsed)
}
