use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_CLASS_MARKER: &str = "oid";
pub const DEFAULT_INDEX_MARKER: &str = "_idx";

/// Which rewrite passes run over each database
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RewriteMode {
    /// One table per nested class, merged across every place it occurs
    #[default]
    Flatten,
    /// Flatten, then collapse self-recursive tables in the result
    FlattenAndCollapse,
    /// Only collapse self-recursive tables, over the source table list
    Collapse,
}

impl RewriteMode {
    pub fn flattens(self) -> bool {
        matches!(self, RewriteMode::Flatten | RewriteMode::FlattenAndCollapse)
    }

    pub fn collapses(self) -> bool {
        matches!(self, RewriteMode::Collapse | RewriteMode::FlattenAndCollapse)
    }
}

impl fmt::Display for RewriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RewriteMode::Flatten => write!(f, "flatten"),
            RewriteMode::FlattenAndCollapse => write!(f, "flatten-and-collapse"),
            RewriteMode::Collapse => write!(f, "collapse"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rewrite mode '{0}' (expected flatten, flatten-and-collapse or collapse)")]
pub struct ParseRewriteModeError(String);

impl FromStr for RewriteMode {
    type Err = ParseRewriteModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "flatten" => Ok(RewriteMode::Flatten),
            "flatten-and-collapse" => Ok(RewriteMode::FlattenAndCollapse),
            "collapse" => Ok(RewriteMode::Collapse),
            _ => Err(ParseRewriteModeError(s.to_string())),
        }
    }
}

/// Parameters threaded through every rewrite pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrollOptions {
    /// Trailing path segment that marks a nested class (`coverageList.oid`)
    pub class_marker: String,
    /// Substring marking array-position metadata columns (`coverageList_idx`)
    pub index_marker: String,
    pub mode: RewriteMode,
    /// Prepended to the name of each collapsed recursive table
    pub collapsed_table_prefix: String,
    /// Fail instead of warning on recursion shapes the collapser cannot handle
    pub strict_recursion: bool,
}

impl Default for UnrollOptions {
    fn default() -> Self {
        Self {
            class_marker: DEFAULT_CLASS_MARKER.to_string(),
            index_marker: DEFAULT_INDEX_MARKER.to_string(),
            mode: RewriteMode::default(),
            collapsed_table_prefix: String::new(),
            strict_recursion: false,
        }
    }
}

impl UnrollOptions {
    pub fn with_mode(mut self, mode: RewriteMode) -> Self {
        self.mode = mode;
        self
    }

    /// `$<class_marker>`, the field holding a nested object's identity
    pub fn class_marker_expr(&self) -> String {
        format!("${}", self.class_marker)
    }

    pub fn is_index_column(&self, column_name: &str) -> bool {
        column_name.contains(&self.index_marker)
    }
}
