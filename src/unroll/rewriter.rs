//! Top-level schema rewriting.
//!
//! For every database the class index is built once, then each class becomes
//! one table whose columns and pipeline are derived from all of its
//! occurrences. The root table (the first table of the database) is kept as
//! is and the rest of the sampled tables are replaced by the class tables.
//! Depending on the mode, self-recursive families are collapsed afterwards.

use log::info;

use super::class_index::{ClassIndex, ClassOccurrence};
use super::columns::merge_columns;
use super::errors::UnrollError;
use super::options::UnrollOptions;
use super::pipeline::class_pipeline;
use super::recursive::collapse_recursive;
use crate::drdl::{Database, DrdlDocument, Table};

/// Build the table for one class from its occurrences
pub fn class_table(
    class_name: &str,
    occurrences: &[ClassOccurrence<'_>],
    index: &ClassIndex<'_>,
    options: &UnrollOptions,
) -> Table {
    let collection = occurrences
        .first()
        .map(|occurrence| occurrence.table.collection.clone())
        .unwrap_or_default();

    Table {
        table: class_name.to_string(),
        collection,
        pipeline: class_pipeline(occurrences, options),
        columns: merge_columns(occurrences, index, options),
    }
}

/// Replace the sampled tables with the root table plus one table per class
pub fn flatten_tables(tables: &[Table], options: &UnrollOptions) -> Result<Vec<Table>, UnrollError> {
    let index = ClassIndex::build(tables, &options.class_marker)?;
    let Some(root) = tables.first() else {
        return Ok(Vec::new());
    };

    let mut flattened = Vec::with_capacity(index.len() + 1);
    flattened.push(root.clone());
    for (class_name, occurrences) in index.iter() {
        flattened.push(class_table(class_name, occurrences, &index, options));
    }
    Ok(flattened)
}

/// Rewrite a table list according to the configured mode
pub fn rewrite_tables(tables: Vec<Table>, options: &UnrollOptions) -> Result<Vec<Table>, UnrollError> {
    let tables = if options.mode.flattens() {
        flatten_tables(&tables, options)?
    } else {
        tables
    };
    if options.mode.collapses() {
        collapse_recursive(tables, options)
    } else {
        Ok(tables)
    }
}

pub fn rewrite_database(database: Database, options: &UnrollOptions) -> Result<Database, UnrollError> {
    let before = database.tables.len();
    let tables = rewrite_tables(database.tables, options)?;
    info!(
        "Rewrote database '{}' ({}): {} tables -> {} tables",
        database.db,
        options.mode,
        before,
        tables.len()
    );
    Ok(Database {
        db: database.db,
        tables,
    })
}

pub fn rewrite_document(
    document: DrdlDocument,
    options: &UnrollOptions,
) -> Result<DrdlDocument, UnrollError> {
    let schema = document
        .schema
        .into_iter()
        .map(|database| rewrite_database(database, options))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(DrdlDocument { schema })
}

/// Rewrite every document, failing as a whole if any database fails
pub fn rewrite_documents(
    documents: Vec<DrdlDocument>,
    options: &UnrollOptions,
) -> Result<Vec<DrdlDocument>, UnrollError> {
    documents
        .into_iter()
        .map(|document| rewrite_document(document, options))
        .collect()
}
