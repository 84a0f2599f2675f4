//! # Terminal Output
//!
//! Decides whether progress lines use color and emoji, following the
//! `--color` flag and the usual environment conventions:
//!
//! - `NO_COLOR` (any value) turns color off
//! - `CLICOLOR=0` turns color off
//! - `CLICOLOR_FORCE` (non-zero) turns color on even when not on a TTY
//! - `TERM=dumb` turns color off
//!
//! `--color always` and `--color never` override all of them.

use std::env;
use std::fmt::Display;

use console::style;

/// Value of the `--color` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ColorChoice {
    #[default]
    Auto,
    Always,
    Never,
}

/// Output preferences for one run.
#[derive(Debug, Clone, Copy)]
pub struct OutputConfig {
    pub use_color: bool,
}

impl OutputConfig {
    pub fn new(choice: ColorChoice) -> Self {
        let use_color = match choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => detect_color_support(),
        };
        console::set_colors_enabled(use_color);
        Self { use_color }
    }

    /// `fancy` when color is on, `plain` otherwise.
    pub fn emoji<'a>(&self, fancy: &'a str, plain: &'a str) -> &'a str {
        if self.use_color {
            fancy
        } else {
            plain
        }
    }

    /// A success line such as `✅ Compose file 'x' created`.
    pub fn success(&self, message: impl Display) -> String {
        format!("{} {}", self.emoji("✅", "[OK]"), message)
    }

    /// A warning line such as `⚠️ template file not found: x`.
    pub fn warning(&self, message: impl Display) -> String {
        format!("{} {}", self.emoji("⚠️", "[WARN]"), message)
    }

    /// A highlighted value, bold when color is on.
    pub fn value(&self, value: impl Display) -> String {
        if self.use_color {
            style(value).bold().to_string()
        } else {
            value.to_string()
        }
    }
}

fn detect_color_support() -> bool {
    if env::var_os("NO_COLOR").is_some() {
        return false;
    }
    if env::var("CLICOLOR").is_ok_and(|v| v == "0") {
        return false;
    }
    if env::var("CLICOLOR_FORCE").is_ok_and(|v| v != "0" && !v.is_empty()) {
        return true;
    }
    if env::var("TERM").is_ok_and(|v| v == "dumb") {
        return false;
    }
    console::Term::stdout().features().colors_supported()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_always_and_never() {
        assert!(OutputConfig::new(ColorChoice::Always).use_color);
        assert!(!OutputConfig::new(ColorChoice::Never).use_color);
    }

    #[test]
    fn test_plain_output() {
        let out = OutputConfig { use_color: false };
        assert_eq!(out.emoji("✅", "[OK]"), "[OK]");
        assert_eq!(out.success("done"), "[OK] done");
        assert_eq!(out.warning("missing"), "[WARN] missing");
        assert_eq!(out.value("docker-compose.yml"), "docker-compose.yml");
    }

    #[test]
    fn test_fancy_emoji() {
        let out = OutputConfig { use_color: true };
        assert_eq!(out.emoji("✅", "[OK]"), "✅");
    }
}
