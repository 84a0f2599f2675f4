//! # Version Command Implementation
//!
//! Prints the package name, version and repository. Release builds may set
//! `DCM_GIT_COMMIT` and `DCM_BUILD_TIME` at compile time; they are shown when
//! present.

use anyhow::Result;

use dcm::output::OutputConfig;

const NAME: &str = env!("CARGO_PKG_NAME");
const VERSION: &str = env!("CARGO_PKG_VERSION");
const REPOSITORY: &str = env!("CARGO_PKG_REPOSITORY");

/// Execute the `version` command.
pub fn execute(out: &OutputConfig) -> Result<()> {
    let lines = lines(option_env!("DCM_GIT_COMMIT"), option_env!("DCM_BUILD_TIME"));
    for (i, line) in lines.iter().enumerate() {
        if i == 0 {
            println!("{}", out.value(line));
        } else {
            println!("{line}");
        }
    }
    Ok(())
}

fn lines(commit: Option<&str>, build_time: Option<&str>) -> Vec<String> {
    let mut lines = vec![format!("{NAME} {VERSION}"), format!("repository: {REPOSITORY}")];
    if let Some(commit) = commit.filter(|c| !c.is_empty()) {
        lines.push(format!("commit: {commit}"));
    }
    if let Some(time) = build_time.filter(|t| !t.is_empty()) {
        lines.push(format!("built: {time}"));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lines_without_build_info() {
        let lines = lines(None, Some(""));
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("dcm "));
        assert!(lines[1].contains("github.com"));
    }

    #[test]
    fn test_lines_with_build_info() {
        let lines = lines(Some("abc1234"), Some("2024-05-01"));
        assert_eq!(lines[2], "commit: abc1234");
        assert_eq!(lines[3], "built: 2024-05-01");
    }
}
