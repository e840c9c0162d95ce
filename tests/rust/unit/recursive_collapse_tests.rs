//! Self-recursion collapse: one table per recursive family, `depth - 1`
//! unions, and no per-depth tables left behind.

use drdl_unroll::drdl::{Column, Table};
use drdl_unroll::unroll::path::detect_self_recursion;
use drdl_unroll::unroll::{collapse_recursive, UnrollError, UnrollOptions};

fn recursive_family(root: &str, segment: &str, max_depth: usize) -> Vec<Table> {
    let mut tables = vec![Table::new(root, "quotes").with_columns(vec![Column::object_id("_id")])];
    for depth in 1..=max_depth {
        let name = std::iter::once(root.to_string())
            .chain(std::iter::repeat(segment.to_string()).take(depth))
            .collect::<Vec<_>>()
            .join("_");
        let prefix = vec![segment; depth].join(".");
        tables.push(Table::new(name, "quotes").with_columns(vec![
            Column::object_id("_id"),
            Column::object_id(format!("{}.oid", prefix)),
            Column::new(format!("{}.code", prefix), "string", "varchar"),
            Column::new(format!("{}_idx", prefix), "int", "int"),
        ]));
    }
    tables
}

#[test]
fn test_collapse_produces_one_table_per_family() {
    for max_depth in 2..=5 {
        let tables = recursive_family("quote", "coverageList", max_depth);
        let collapsed = collapse_recursive(tables, &UnrollOptions::default()).unwrap();

        let names: Vec<&str> = collapsed.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(names, vec!["quote", "coverage"], "depth {}", max_depth);
        assert_eq!(collapsed[1].union_count(), max_depth - 1, "depth {}", max_depth);
        assert!(collapsed
            .iter()
            .all(|t| !t.table.ends_with("_coverageList")));
    }
}

#[test]
fn test_collapsed_columns_lose_the_repeated_prefix() {
    let collapsed =
        collapse_recursive(recursive_family("quote", "coverageList", 3), &UnrollOptions::default())
            .unwrap();
    let coverage = &collapsed[1];
    let names: Vec<&str> = coverage.columns.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["oid", "code", "pid", "quote_id"]);
    assert!(coverage.columns.iter().all(|c| c.name == c.sql_name));
}

#[test]
fn test_collapsed_tables_have_no_marker_leakage() {
    let options = UnrollOptions::default();
    for max_depth in 2..=4 {
        let collapsed =
            collapse_recursive(recursive_family("quote", "coverageList", max_depth), &options)
                .unwrap();
        let coverage = &collapsed[1];
        for column in &coverage.columns {
            let segments: Vec<&str> = column.name.split('.').collect();
            assert!(
                !(segments.len() > 1 && segments.last() == Some(&options.class_marker.as_str())),
                "class marker leaked at depth {}: {}",
                max_depth,
                column.name
            );
            assert!(!options.is_index_column(&column.name), "index column {}", column.name);
            assert_ne!(column.name, "_id", "document identity at depth {}", max_depth);
            assert!(!column.name.contains("coverageList"), "ancestor column {}", column.name);
        }
    }
}

#[test]
fn test_detector_reports_maximum_depth() {
    let found = detect_self_recursion("quote_coverageList_coverageList_coverageList_coverageList")
        .unwrap();
    assert_eq!(found.depth, 4);
    assert_eq!(found.class_name(), "coverage");
}

#[test]
fn test_two_independent_families_collapse_separately() {
    let mut tables = recursive_family("quote", "coverageList", 2);
    tables.extend(recursive_family("org", "unitList", 3).into_iter().skip(1));

    let collapsed = collapse_recursive(tables, &UnrollOptions::default()).unwrap();
    let names: Vec<&str> = collapsed.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, vec!["quote", "coverage", "unit"]);
    assert_eq!(collapsed[1].union_count(), 1);
    assert_eq!(collapsed[2].union_count(), 2);
}

#[test]
fn test_compound_recursion_is_observable() {
    let tables = vec![Table::new(
        "quote_coverageList_coverageList_insuredEntityList_insuredEntityList",
        "quotes",
    )];
    let options = UnrollOptions {
        strict_recursion: true,
        ..UnrollOptions::default()
    };
    match collapse_recursive(tables, &options) {
        Err(UnrollError::UnsupportedRecursionShape { table, reason }) => {
            assert!(table.ends_with("insuredEntityList"));
            assert!(reason.contains("coverageList"));
        }
        other => panic!("expected UnsupportedRecursionShape, got {:?}", other),
    }
}
