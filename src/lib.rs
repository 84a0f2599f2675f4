//! # Docker Compose Make
//!
//! Split a `docker-compose.yml` into a template plus one file per service,
//! and build the compose file back from those pieces, keeping comments where
//! they were.
//!
//! ## Quick Example
//!
//! ```
//! use std::path::Path;
//! use dcm::strategy::{Mode, Source};
//!
//! let compose = "\
//! services:
//!   # front end
//!   web:
//!     image: nginx # pinned
//! volumes:
//!   data: {}
//! ";
//! let split = Mode::Tree
//!     .strategy()
//!     .decompose(Source::new(Path::new("docker-compose.yml"), compose), "services")
//!     .unwrap();
//!
//! assert_eq!(split.entries[0].name, "web");
//! assert_eq!(split.entries[0].content, "# front end\nweb:\n  image: nginx # pinned\n");
//! assert!(split.template.contains("<dcm: include services\\>"));
//! ```
//!
//! ## Layout
//!
//! - **`yaml`**: lossless documents (`yaml_edit` lines plus the `serde_yaml`
//!   value) cut into one block per key.
//! - **`section`**: finds the top-level section that holds the services.
//! - **`strategy`**: the decompose and compose transforms, in a tree-based,
//!   a line-based and a reformatting flavor.
//! - **`decomposer`** and **`builder`**: the file-level operations behind
//!   `dcm decompose` and `dcm build`.
//! - **`config`**, **`defaults`**: file names and policies for a run.
//! - **`backup`**, **`prompt`**, **`path`**: backups, overwrite confirmation
//!   and filesystem helpers.

pub mod backup;
pub mod builder;
pub mod config;
pub mod decomposer;
pub mod defaults;
pub mod error;
pub mod output;
pub mod path;
pub mod prompt;
pub mod section;
pub mod strategy;
pub mod yaml;

#[cfg(test)]
mod strategy_proptest;
