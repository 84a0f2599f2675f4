//! Shared test utilities for integration and E2E tests.
//!
//! Add `mod common;` to a test file, then:
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! #[test]
//! fn test_example() {
//!     let fixture = TestFixture::new().with_compose(fixtures::COMPOSE);
//!     fixture.command().arg("decompose").assert().success();
//! }
//! ```

use assert_cmd::cargo::cargo_bin_cmd;
use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    #[allow(unused_imports)]
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    #[allow(unused_imports)]
    pub use assert_fs::TempDir;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::fixtures;
    pub use super::TestFixture;
}

/// Compose documents, templates and entry files used across tests.
#[allow(dead_code)]
pub mod fixtures {
    /// A compose file with comments in every interesting position.
    pub const COMPOSE: &str = "\
# Stack for local development
version: \"3.8\"

# All containers
services:
  # Front end
  web:
    image: nginx:1.25 # pinned
    ports:
      - \"80:80\"
    # - \"443:443\"

  db:
    image: postgres:16
    environment:
      POSTGRES_PASSWORD: example

# Volume configuration
volumes:
  data: {}
";

    /// The template from the concrete scenario: a marker and a volume.
    pub const TEMPLATE: &str = "services:\n<dcm: include services\\>\nvolumes:\n  data:\n    name: d\n";

    pub const APP: &str = "  app:\n    image: x\n";
    pub const REDIS: &str = "  redis:\n    image: y\n";

    /// Marker line for the default section.
    pub const PLACEHOLDER: &str = "<dcm: include services\\>";
}

/// A temporary project directory.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    /// Create a new test fixture with an empty temporary directory.
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add `docker-compose.yml` with the given content.
    pub fn with_compose(self, content: &str) -> Self {
        self.with_file("docker-compose.yml", content)
    }

    /// Add `docker-compose-dcm.yml` with the given content.
    #[allow(dead_code)]
    pub fn with_template(self, content: &str) -> Self {
        self.with_file("docker-compose-dcm.yml", content)
    }

    /// Add `services/<name>.yml`.
    #[allow(dead_code)]
    pub fn with_entry(self, name: &str, content: &str) -> Self {
        self.with_file(&format!("services/{name}.yml"), content)
    }

    /// The scenario project: template plus `app` and `redis` entries.
    #[allow(dead_code)]
    pub fn with_build_inputs(self) -> Self {
        self.with_template(fixtures::TEMPLATE)
            .with_entry("app", fixtures::APP)
            .with_entry("redis", fixtures::REDIS)
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Get the path to the temporary directory.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Create a child path in the temp directory.
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// Read a file in the project.
    #[allow(dead_code)]
    pub fn read(&self, path: &str) -> String {
        std::fs::read_to_string(self.path().join(path)).expect("Failed to read file")
    }

    /// Names of the directory entries in the project, sorted.
    #[allow(dead_code)]
    pub fn listing(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(self.path())
            .expect("Failed to list directory")
            .map(|e| e.expect("Failed to read entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// A `dcm` command running in the fixture directory with color and
    /// inherited logging settings turned off.
    #[allow(dead_code)]
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = cargo_bin_cmd!("dcm");
        cmd.current_dir(self.path())
            .env("NO_COLOR", "1")
            .env_remove("RUST_LOG")
            .env_remove("DCM_DIRECTORY");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
