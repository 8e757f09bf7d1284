//! Output generation for the aggregate document.
//!
//! # Submodules
//!
//! - [`json`]: writes and reloads the persisted JSON document
//! - [`markdown`]: renders the document as a readable Markdown digest
//!
//! # Output Structure
//!
//! ```text
//! veille_tech.json      # overwritten on every run
//! veille_tech.md        # optional, with --markdown-output
//! ```

pub mod json;
pub mod markdown;
