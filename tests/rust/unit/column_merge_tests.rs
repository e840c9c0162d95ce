//! Column merge properties: order independence, completeness, no marker leakage
//! and parent-reference naming.

use drdl_unroll::drdl::{Column, Table};
use drdl_unroll::unroll::columns::{merge_columns, relative_column_name};
use drdl_unroll::unroll::{ClassIndex, ClassPath, UnrollOptions};

fn table(name: &str, columns: &[&str]) -> Table {
    Table::new(name, "quotes").with_columns(
        columns
            .iter()
            .map(|c| Column::new(*c, "string", "varchar"))
            .collect(),
    )
}

fn sampled_tables() -> Vec<Table> {
    vec![
        table("quote", &["_id", "quoteNumber"]),
        table(
            "quote_coverageList",
            &["_id", "coverageList.oid", "coverageList.code", "coverageList_idx"],
        ),
        table(
            "quote_coverageList_coverageList",
            &[
                "_id",
                "coverageList.oid",
                "coverageList.coverageList.oid",
                "coverageList.coverageList.code",
                "coverageList.coverageList.deductible",
                "coverageList.coverageList_idx",
            ],
        ),
        table(
            "quote_coverageList_insuredEntityList",
            &[
                "_id",
                "coverageList.oid",
                "coverageList.insuredEntityList.oid",
                "coverageList.insuredEntityList.name",
                "coverageList.insuredEntityList_idx",
            ],
        ),
    ]
}

fn sorted_names(columns: &[Column]) -> Vec<String> {
    let mut names: Vec<String> = columns.iter().map(|c| c.name.clone()).collect();
    names.sort();
    names
}

#[test]
fn test_merge_is_order_independent() {
    let tables = sampled_tables();
    let index = ClassIndex::build(&tables, "oid").unwrap();
    let options = UnrollOptions::default();

    for class_name in index.class_names() {
        let occurrences = index.occurrences(class_name).unwrap();
        let forward = merge_columns(occurrences, &index, &options);
        let again = merge_columns(occurrences, &index, &options);
        let mut reversed_occurrences = occurrences.to_vec();
        reversed_occurrences.reverse();
        let reversed = merge_columns(&reversed_occurrences, &index, &options);

        assert_eq!(forward, again, "class {}", class_name);
        assert_eq!(
            sorted_names(&forward),
            sorted_names(&reversed),
            "class {}",
            class_name
        );
    }
}

#[test]
fn test_every_merged_column_comes_from_a_source_column() {
    let tables = sampled_tables();
    let index = ClassIndex::build(&tables, "oid").unwrap();
    let options = UnrollOptions::default();

    for (class_name, occurrences) in index.iter() {
        let parent_references: Vec<String> = occurrences
            .iter()
            .filter_map(|o| o.class_path.parent_reference_name())
            .collect();

        for column in merge_columns(occurrences, &index, &options) {
            if parent_references.contains(&column.name) {
                continue;
            }
            let found = occurrences.iter().any(|o| {
                o.table.columns.iter().any(|source| {
                    relative_column_name(class_name, &source.name).as_deref()
                        == Some(column.name.as_str())
                })
            });
            assert!(found, "{}.{} has no source column", class_name, column.name);
        }
    }
}

#[test]
fn test_no_marker_leakage() {
    let tables = sampled_tables();
    let options = UnrollOptions::default();
    let index = ClassIndex::build(&tables, &options.class_marker).unwrap();
    let marker_suffix = format!(".{}", options.class_marker);

    for (class_name, occurrences) in index.iter() {
        for column in merge_columns(occurrences, &index, &options) {
            assert!(
                !column.name.ends_with(&marker_suffix),
                "{} leaks class marker column {}",
                class_name,
                column.name
            );
            assert!(
                !column.name.contains(&options.index_marker),
                "{} leaks index column {}",
                class_name,
                column.name
            );
        }
    }
}

#[test]
fn test_parent_reference_naming() {
    assert_eq!(
        ClassPath::new(["coverageList", "coverageList"]).parent_reference_name(),
        Some("pid".to_string())
    );
    assert_eq!(
        ClassPath::new(["quote", "coverageList", "insuredEntityList"]).parent_reference_name(),
        Some("coverage_id".to_string())
    );
    assert_eq!(ClassPath::new(["quote"]).parent_reference_name(), None);
}

#[test]
fn test_parent_reference_columns_are_object_ids() {
    let tables = sampled_tables();
    let index = ClassIndex::build(&tables, "oid").unwrap();
    let columns = merge_columns(
        index.occurrences("insuredEntity").unwrap(),
        &index,
        &UnrollOptions::default(),
    );
    let names: Vec<&str> = columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["oid", "name", "coverage_id"]);
    assert_eq!(columns[2].mongo_type, "bson.ObjectId");
    assert_eq!(columns[2].sql_type, "objectid");
}
