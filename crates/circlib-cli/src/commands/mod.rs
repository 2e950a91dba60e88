//! CLI command implementations.

pub mod assemble;
pub mod common;
pub mod families;
pub mod instantiate;
pub mod show;
pub mod templates;
pub mod version;
