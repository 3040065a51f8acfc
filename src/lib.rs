//! repo-context: Turn a Git repository into one LLM-friendly context document
//!
//! The pipeline enumerates the files git knows about, filters them, decodes
//! and converts their content, and assembles a single markdown document.

pub mod cli;
pub mod config;
pub mod convert;
pub mod domain;
pub mod error;
pub mod fetch;
pub mod load;
pub mod render;
pub mod scan;
pub mod utils;
