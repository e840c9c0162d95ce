//! drdl-unroll - relational flattening for nested-document DRDL schemas
//!
//! This crate turns a sampled DRDL schema (a root collection plus dotted
//! column paths encoding object nesting and arrays) into relational tables:
//! - One table per nested class, merged across every place the class occurs
//! - An aggregation pipeline per table that extracts the class instances
//! - Collapsing of self-recursive classes into a single table
//!
//! The pipelines are only emitted, never executed.

pub mod config;
pub mod drdl;
pub mod runner;
pub mod unroll;
pub mod utils;
