//! Aggregation pipeline stages emitted into DRDL tables.
//!
//! A pipeline is an ordered `Vec<Stage>`. The stage set is closed: the
//! compiler only ever emits these five shapes, and each one serializes under
//! its own single `$`-prefixed key:
//!
//! ```yaml
//! pipeline:
//!   - $unwind:
//!       path: $coverageList
//!       preserveNullAndEmptyArrays: false
//!   - $addFields:
//!       coverageList.quote_id: $_id
//!   - $replaceRoot:
//!       newRoot: $coverageList
//!   - $project:
//!       coverageList: 0
//!   - $unionWith:
//!       coll: quotes
//!       pipeline: [...]
//! ```
//!
//! serde_yaml renders externally tagged enums as YAML tags by default, so the
//! containing fields use `serde_yaml::with::singleton_map_recursive` to keep
//! the single-key map form above.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Prefix a field name to make it a field-path expression (`$field`)
pub fn field_path(field: &str) -> String {
    format!("${}", field)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Stage {
    #[serde(rename = "$unwind")]
    Unwind(Unwind),
    #[serde(rename = "$addFields")]
    AddFields(AddFields),
    #[serde(rename = "$replaceRoot")]
    ReplaceRoot(ReplaceRoot),
    #[serde(rename = "$project")]
    Project(Project),
    #[serde(rename = "$unionWith")]
    UnionWith(UnionWith),
}

impl Stage {
    /// `$unwind` over `field`, dropping documents where the array is missing or empty
    pub fn unwind(field: &str) -> Self {
        Stage::Unwind(Unwind {
            path: field_path(field),
            preserve_null_and_empty_arrays: false,
        })
    }

    pub fn add_fields(target_field: impl Into<String>, source_expr: impl Into<String>) -> Self {
        Stage::AddFields(AddFields {
            target_field: target_field.into(),
            source_expr: source_expr.into(),
        })
    }

    /// `$replaceRoot` promoting `field` to be the new document root
    pub fn replace_root(field: &str) -> Self {
        Stage::ReplaceRoot(ReplaceRoot {
            new_root: field_path(field),
        })
    }

    /// `$project` excluding `field`
    pub fn project_out(field: &str) -> Self {
        Stage::Project(Project {
            excluded_field: field.to_string(),
        })
    }

    pub fn union_with(collection: impl Into<String>, pipeline: Vec<Stage>) -> Self {
        Stage::UnionWith(UnionWith {
            coll: collection.into(),
            pipeline,
        })
    }

    /// The MongoDB operator this stage serializes under
    pub fn operator(&self) -> &'static str {
        match self {
            Stage::Unwind(_) => "$unwind",
            Stage::AddFields(_) => "$addFields",
            Stage::ReplaceRoot(_) => "$replaceRoot",
            Stage::Project(_) => "$project",
            Stage::UnionWith(_) => "$unionWith",
        }
    }

    pub fn is_union(&self) -> bool {
        matches!(self, Stage::UnionWith(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Unwind {
    pub path: String,
    #[serde(default)]
    pub preserve_null_and_empty_arrays: bool,
}

/// `$addFields` with exactly one `{ target: expr }` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct AddFields {
    pub target_field: String,
    pub source_expr: String,
}

impl TryFrom<BTreeMap<String, String>> for AddFields {
    type Error = String;

    fn try_from(map: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((target_field, source_expr)), None) => Ok(AddFields {
                target_field,
                source_expr,
            }),
            _ => Err("$addFields must hold exactly one field".to_string()),
        }
    }
}

impl From<AddFields> for BTreeMap<String, String> {
    fn from(stage: AddFields) -> Self {
        BTreeMap::from([(stage.target_field, stage.source_expr)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReplaceRoot {
    pub new_root: String,
}

/// `$project` excluding a single field (`{ field: 0 }`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "BTreeMap<String, i64>", into = "BTreeMap<String, i64>")]
pub struct Project {
    pub excluded_field: String,
}

impl TryFrom<BTreeMap<String, i64>> for Project {
    type Error = String;

    fn try_from(map: BTreeMap<String, i64>) -> Result<Self, Self::Error> {
        let mut entries = map.into_iter();
        match (entries.next(), entries.next()) {
            (Some((excluded_field, 0)), None) => Ok(Project { excluded_field }),
            _ => Err("$project must exclude exactly one field".to_string()),
        }
    }
}

impl From<Project> for BTreeMap<String, i64> {
    fn from(stage: Project) -> Self {
        BTreeMap::from([(stage.excluded_field, 0)])
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnionWith {
    pub coll: String,
    #[serde(default)]
    pub pipeline: Vec<Stage>,
}
