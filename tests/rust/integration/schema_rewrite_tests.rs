//! Whole-schema rewrites of the bundled sample DRDL.

use drdl_unroll::drdl::{parse_documents, render_documents, DrdlFormat, Stage, Table};
use drdl_unroll::unroll::{rewrite_document, RewriteMode, UnrollOptions};

const QUOTES: &str = include_str!("../../../demos/quotes.drdl");

fn rewritten_tables(mode: RewriteMode) -> Vec<Table> {
    let mut documents = parse_documents(QUOTES, DrdlFormat::Yaml).unwrap();
    let document = rewrite_document(documents.remove(0), &UnrollOptions::default().with_mode(mode))
        .unwrap();
    document.schema.into_iter().next().unwrap().tables
}

fn column_names(table: &Table) -> Vec<&str> {
    table.columns.iter().map(|c| c.name.as_str()).collect()
}

#[test]
fn test_flatten_sample_schema() {
    let tables = rewritten_tables(RewriteMode::Flatten);
    let names: Vec<&str> = tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(names, vec!["quote", "coverage", "insuredEntity", "driver"]);

    let coverage = &tables[1];
    assert_eq!(
        column_names(coverage),
        vec!["oid", "code", "premium", "quote_id", "deductible", "pid"]
    );
    assert_eq!(coverage.union_count(), 3);
    assert!(coverage.pipeline.len() > 4);

    let insured = &tables[2];
    assert_eq!(
        column_names(insured),
        vec!["oid", "name", "birthDate", "coverage_id"]
    );
    assert_eq!(
        insured.pipeline,
        vec![
            Stage::unwind("coverageList"),
            Stage::replace_root("coverageList"),
            Stage::unwind("insuredEntityList"),
            Stage::add_fields("insuredEntityList.coverage_id", "$oid"),
            Stage::replace_root("insuredEntityList"),
            Stage::project_out("insuredEntityList"),
        ]
    );

    let driver = &tables[3];
    assert_eq!(column_names(driver), vec!["oid", "name", "quote_id"]);
    assert_eq!(driver.column("birthDate"), None);
}

#[test]
fn test_root_table_is_untouched() {
    let source = parse_documents(QUOTES, DrdlFormat::Yaml).unwrap();
    let tables = rewritten_tables(RewriteMode::Flatten);
    assert_eq!(tables[0], source[0].schema[0].tables[0]);
}

#[test]
fn test_flatten_and_collapse_leaves_class_tables() {
    // Class tables are named after their class, so there is nothing left to collapse.
    assert_eq!(
        rewritten_tables(RewriteMode::FlattenAndCollapse),
        rewritten_tables(RewriteMode::Flatten)
    );
}

#[test]
fn test_collapse_sample_schema() {
    let tables = rewritten_tables(RewriteMode::Collapse);
    let names: Vec<&str> = tables.iter().map(|t| t.table.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "quote",
            "coverage",
            "quote_coverageList_insuredEntityList",
            "quote_driverList"
        ]
    );
    let coverage = &tables[1];
    assert_eq!(coverage.union_count(), 1);
    assert_eq!(
        column_names(coverage),
        vec!["oid", "code", "deductible", "pid", "quote_id"]
    );
}

#[test]
fn test_non_nested_schema_round_trips() {
    let source = r#"
schema:
  - db: flat
    tables:
      - table: customer
        collection: customers
        columns:
          - MongoType: bson.ObjectId
            Name: _id
            SqlName: _id
            SqlType: objectid
          - MongoType: string
            Name: name
            SqlName: name
            SqlType: varchar
"#;
    let documents = parse_documents(source, DrdlFormat::Yaml).unwrap();
    let rewritten = rewrite_document(documents[0].clone(), &UnrollOptions::default()).unwrap();
    assert_eq!(rewritten, documents[0]);

    let rendered = render_documents(&[rewritten], DrdlFormat::Yaml).unwrap();
    assert_eq!(parse_documents(&rendered, DrdlFormat::Yaml).unwrap(), documents);
}

#[test]
fn test_rendered_output_reparses() {
    let mut documents = parse_documents(QUOTES, DrdlFormat::Yaml).unwrap();
    let rewritten = rewrite_document(documents.remove(0), &UnrollOptions::default()).unwrap();

    let yaml = render_documents(std::slice::from_ref(&rewritten), DrdlFormat::Yaml).unwrap();
    assert!(yaml.contains("$unionWith"));
    assert!(yaml.contains("preserveNullAndEmptyArrays: false"));
    assert_eq!(parse_documents(&yaml, DrdlFormat::Yaml).unwrap(), vec![rewritten.clone()]);

    let json = render_documents(std::slice::from_ref(&rewritten), DrdlFormat::Json).unwrap();
    assert_eq!(parse_documents(&json, DrdlFormat::Json).unwrap(), vec![rewritten]);
}
