use serde::{Deserialize, Serialize};

use super::stage::Stage;

/// A DRDL document, as produced by mongosqld's schema sampler:
///
/// ```yaml
/// schema:
///   - db: insurance
///     tables:
///       - table: quote
///         collection: quotes
///         pipeline: []
///         columns:
///           - MongoType: bson.ObjectId
///             Name: _id
///             SqlName: _id
///             SqlType: objectid
///       - table: quote_coverageList
///         collection: quotes
///         pipeline: []
///         columns:
///           - MongoType: bson.ObjectId
///             Name: coverageList.oid
///             SqlName: coverageList.oid
///             SqlType: objectid
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrdlDocument {
    pub schema: Vec<Database>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Database {
    pub db: String,
    #[serde(default)]
    pub tables: Vec<Table>,
}

/// A named projection over a collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub table: String,
    pub collection: String,
    #[serde(
        default,
        skip_serializing_if = "Vec::is_empty",
        with = "serde_yaml::with::singleton_map_recursive"
    )]
    pub pipeline: Vec<Stage>,
    #[serde(default)]
    pub columns: Vec<Column>,
}

impl Table {
    pub fn new(name: impl Into<String>, collection: impl Into<String>) -> Self {
        Table {
            table: name.into(),
            collection: collection.into(),
            pipeline: Vec::new(),
            columns: Vec::new(),
        }
    }

    pub fn with_columns(mut self, columns: Vec<Column>) -> Self {
        self.columns = columns;
        self
    }

    /// Number of `$unionWith` stages at the top level of the pipeline
    pub fn union_count(&self) -> usize {
        self.pipeline.iter().filter(|stage| stage.is_union()).count()
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }
}

/// One scalar or reference field of a table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    #[serde(rename = "MongoType")]
    pub mongo_type: String,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "SqlName")]
    pub sql_name: String,
    #[serde(rename = "SqlType")]
    pub sql_type: String,
}

/// Type tags of the synthetic parent-reference columns
pub const OBJECT_ID_MONGO_TYPE: &str = "bson.ObjectId";
pub const OBJECT_ID_SQL_TYPE: &str = "objectid";

impl Column {
    pub fn new(
        name: impl Into<String>,
        mongo_type: impl Into<String>,
        sql_type: impl Into<String>,
    ) -> Self {
        let name = name.into();
        Column {
            mongo_type: mongo_type.into(),
            sql_name: name.clone(),
            name,
            sql_type: sql_type.into(),
        }
    }

    /// An object-identifier column, used for synthesized parent references
    pub fn object_id(name: impl Into<String>) -> Self {
        Column::new(name, OBJECT_ID_MONGO_TYPE, OBJECT_ID_SQL_TYPE)
    }

    /// Copy of this column with both `Name` and `SqlName` replaced
    pub fn renamed(&self, name: &str) -> Self {
        Column {
            name: name.to_string(),
            sql_name: name.to_string(),
            ..self.clone()
        }
    }
}
