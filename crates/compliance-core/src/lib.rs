//! Core types, rule catalogs, predicates, and configuration for compliance-check.
//!
//! This crate provides the foundational data structures used across all crates:
//! - [`types`]: levels, severities, evidence, and per-rule outcomes
//! - [`artifact`]: the immutable text under analysis
//! - [`rule`] and [`catalog`]: rules and their ordered, mergeable collections
//! - [`loader`]: catalog files (JSON/YAML) into [`catalog::RuleCatalog`]
//! - [`predicate`]: the [`Predicate`](predicate::Predicate) trait, evaluation
//!   context, cancellation, and built-in predicates
//! - [`config`]: configuration loading from `.compliance/config.json`
//! - [`error`]: the error taxonomy

pub mod artifact;
pub mod catalog;
pub mod config;
pub mod error;
pub mod loader;
pub mod predicate;
pub mod rule;
pub mod types;
