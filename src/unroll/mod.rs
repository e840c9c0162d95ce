//! The DRDL flattening compiler.
//!
//! Data flows one way through the passes:
//!
//! ```text
//! source tables -> ClassIndex -> per class (columns, pipeline) -> rewritten tables
//!                                                               -> collapsed tables
//! ```
//!
//! Nothing is shared between classes except the read-only [`ClassIndex`].

pub mod class_index;
pub mod columns;
pub mod errors;
pub mod options;
pub mod path;
pub mod pipeline;
pub mod recursive;
pub mod rewriter;

pub use class_index::{ClassIndex, ClassOccurrence};
pub use errors::UnrollError;
pub use options::{RewriteMode, UnrollOptions, DEFAULT_CLASS_MARKER, DEFAULT_INDEX_MARKER};
pub use path::ClassPath;
pub use recursive::collapse_recursive;
pub use rewriter::{flatten_tables, rewrite_database, rewrite_document, rewrite_documents, rewrite_tables};
