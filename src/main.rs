//! repo-context: Turn a Git repository into one LLM-friendly context document
//!
//! Walks the working tree of a local or cloned repository and writes a single
//! markdown document with a header, a directory tree and one section per file.

use anyhow::Result;

mod cli;
mod config;
mod convert;
mod domain;
mod error;
mod fetch;
mod load;
mod render;
mod scan;
mod utils;

fn main() -> Result<()> {
    cli::run()
}
