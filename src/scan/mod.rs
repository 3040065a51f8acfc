//! Repository enumeration: git listing, pattern filtering, tree rendering.

pub mod filter;
pub mod repository;
pub mod tree;

pub use filter::PathFilter;
pub use repository::GitRepository;
pub use tree::generate_tree;
