//! # Core models for TE insertion mapping.
//!
//! This crate holds the data model shared by the mapper and the CLI: aligned
//! segments as produced by the aligner, reads classified into junction and
//! anchor evidence, breakpoint clusters, and the final insertion calls. It also
//! contains a couple of small file helpers.
//!
pub mod errors;
pub mod models;
pub mod utils;
