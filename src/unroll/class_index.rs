//! Discovery of nested classes.
//!
//! A column whose last path segment is the class marker (`coverageList.oid`)
//! marks the enclosing segment as a nested class. Every such column yields one
//! [`ClassOccurrence`], and occurrences are grouped by suffix-normalised class
//! name in scan order.

use log::debug;

use super::errors::UnrollError;
use super::path::{column_segments, normalize_segment, table_segments, ClassPath};
use crate::drdl::{Column, Table};
use crate::utils::FirstWinsIndex;

/// One place in the source schema where a nested class appears
#[derive(Debug, Clone, PartialEq)]
pub struct ClassOccurrence<'a> {
    pub class_name: String,
    pub table: &'a Table,
    pub class_path: ClassPath,
}

/// Class name -> occurrences, in the order the class-marker columns were scanned
#[derive(Debug, Clone, Default)]
pub struct ClassIndex<'a> {
    classes: FirstWinsIndex<String, Vec<ClassOccurrence<'a>>>,
}

impl<'a> ClassIndex<'a> {
    /// Scan every table's columns for class markers
    pub fn build(tables: &'a [Table], class_marker: &str) -> Result<Self, UnrollError> {
        let mut index = ClassIndex::default();
        for table in tables {
            for column in &table.columns {
                if let Some(occurrence) = occurrence_for_column(table, column, class_marker)? {
                    index
                        .classes
                        .entry_or_insert_with(occurrence.class_name.clone(), Vec::new)
                        .push(occurrence);
                }
            }
        }
        index.log_summary();
        Ok(index)
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    /// Whether `class_name` gets a table of its own
    pub fn contains(&self, class_name: &str) -> bool {
        self.classes.contains_key(class_name)
    }

    pub fn occurrences(&self, class_name: &str) -> Option<&[ClassOccurrence<'a>]> {
        self.classes.get(class_name).map(Vec::as_slice)
    }

    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.classes.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[ClassOccurrence<'a>])> {
        self.classes
            .iter()
            .map(|(name, occurrences)| (name.as_str(), occurrences.as_slice()))
    }

    fn log_summary(&self) {
        debug!("Nested classes detected: {}", self.classes.len());
        for (name, occurrences) in self.classes.iter() {
            debug!("  {}", name);
            for occurrence in occurrences {
                debug!("    {} (from {})", occurrence.class_path, occurrence.table.table);
            }
        }
    }
}

/// Build the occurrence a class-marker column stands for, if it is one.
///
/// The class path is the root segment of the table name followed by every
/// column segment except the marker.
pub fn occurrence_for_column<'a>(
    table: &'a Table,
    column: &Column,
    class_marker: &str,
) -> Result<Option<ClassOccurrence<'a>>, UnrollError> {
    let segments = column_segments(&column.name);
    let Some((last, enclosing)) = segments.split_last() else {
        return Ok(None);
    };
    if *last != class_marker {
        return Ok(None);
    }

    let class_segment = match enclosing.last() {
        Some(segment) if !segment.is_empty() => *segment,
        _ => {
            return Err(UnrollError::MalformedColumnName {
                table: table.table.clone(),
                column: column.name.clone(),
            })
        }
    };

    let root = table_segments(&table.table)[0];
    let class_path = ClassPath::new(std::iter::once(root).chain(enclosing.iter().copied()));

    Ok(Some(ClassOccurrence {
        class_name: normalize_segment(class_segment).to_string(),
        table,
        class_path,
    }))
}
