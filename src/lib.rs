//! trialome: clinical decision pathways cross-referenced with recruiting trials
//!
//! Layers, inner to outer:
//! - [`domain`]: graph documents, tree building, classification, sanitization
//! - [`application`]: tree registry, trial lookups, trial table
//! - [`infrastructure`]: filesystem and registry clients, service wiring
//! - [`cli`]: argument parsing and command dispatch

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;
