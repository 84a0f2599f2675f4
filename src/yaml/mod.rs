//! Lossless YAML documents
//!
//! A [`Document`] keeps the source lines exactly as written next to the
//! parsed value. The lines come from [`yaml_edit`], which parses without
//! losing comments, blank lines or key styling and prints its input back
//! verbatim. The value comes from `serde_yaml`: it validates the document,
//! reports errors with a line number and lists the keys of every mapping in
//! order. The strategies use those keys to cut the lines into [`Block`]s and
//! move them between documents, so nothing they do not touch is rewritten.
//!
//! Multi-document streams are rejected.
//!
//! ## Example
//!
//! ```
//! use dcm::yaml;
//!
//! let doc = yaml::parse("# web tier\nweb:\n  image: nginx # pinned\n").unwrap();
//! let root = doc.root_blocks().unwrap();
//! assert_eq!(root.blocks[0].name, "web");
//! assert_eq!(root.blocks[0].head, ["# web tier"]);
//! assert_eq!(doc.text(), "# web tier\nweb:\n  image: nginx # pinned\n");
//! ```

mod block;

use std::str::FromStr;

use serde_yaml::{Mapping, Value};
use thiserror::Error;
use yaml_edit::Yaml;

pub use block::{
    bare_key_line, content_indent, indent_of, inline_value, is_comment, keeps_trailing_blanks,
    split_blocks, Block, Blocks,
};

/// A structural error in document text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{}{}", location(.line), .message)]
pub struct ParseError {
    /// 1-based line number where the problem was detected, when known.
    pub line: Option<usize>,
    pub message: String,
}

fn location(line: &Option<usize>) -> String {
    line.map(|l| format!("line {l}: ")).unwrap_or_default()
}

impl From<serde_yaml::Error> for ParseError {
    fn from(err: serde_yaml::Error) -> Self {
        Self {
            line: err.location().map(|l| l.line()),
            message: err.to_string(),
        }
    }
}

/// A parsed document: verbatim lines plus the value they hold.
#[derive(Debug, Clone)]
pub struct Document {
    lines: Vec<String>,
    value: Value,
}

impl Document {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    /// The root mapping, if the document holds one.
    pub fn root(&self) -> Option<&Mapping> {
        self.value.as_mapping()
    }

    /// The document text, one newline per line.
    pub fn text(&self) -> String {
        self.lines.iter().map(|l| format!("{l}\n")).collect()
    }

    /// The root mapping cut into one block per key. A document whose root
    /// is not a mapping yields no blocks and keeps every line in `lead`.
    pub fn root_blocks(&self) -> Result<Blocks, ParseError> {
        let count = self.root().map_or(0, Mapping::len);
        let indent = content_indent(&self.lines).unwrap_or(0);
        split_blocks(&self.lines, indent, count)
    }
}

/// Parse `text` into a [`Document`].
pub fn parse(text: &str) -> Result<Document, ParseError> {
    let value: Value = serde_yaml::from_str(text)?;
    let lossless = Yaml::from_str(text).map_err(|e| ParseError {
        line: None,
        message: e.to_string(),
    })?;
    let lines = lossless.to_string().lines().map(str::to_string).collect();
    Ok(Document { lines, value })
}

/// Text of a mapping key, for keys written as scalars.
pub fn key_text(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_is_reproduced_verbatim() {
        let text = "\
---
# head
a:   1   # spaced
'b': \"two\"

c: |
  keep
  this
d: [1, 2]   # flow
";
        let doc = parse(text).unwrap();
        assert_eq!(doc.text(), text);
        assert_eq!(doc.root().map(Mapping::len), Some(4));
    }

    #[test]
    fn test_root_blocks_follow_key_order() {
        let doc = parse("z: 1\n# about a\na:\n  b: 2\n").unwrap();
        let root = doc.root_blocks().unwrap();
        let names: Vec<&str> = root.blocks.iter().map(|b| b.name.as_str()).collect();
        assert_eq!(names, ["z", "a"]);
        assert_eq!(root.blocks[1].head, ["# about a"]);
    }

    #[test]
    fn test_indented_root() {
        let doc = parse("  app:\n    image: x\n").unwrap();
        let root = doc.root_blocks().unwrap();
        assert_eq!(root.indent, 2);
        assert_eq!(root.blocks[0].body, ["  app:", "    image: x"]);
    }

    #[test]
    fn test_parse_error_reports_line() {
        let err = parse("a: 1\nb: [1, 2\n").unwrap_err();
        assert!(err.line.is_some());
        assert!(err.to_string().starts_with("line "));
    }

    #[test]
    fn test_tab_indentation_is_rejected() {
        assert!(parse("web:\n\timage: x\n").is_err());
    }

    #[test]
    fn test_unterminated_quoted_scalar_is_rejected() {
        assert!(parse("a: \"abc\nb: 1\n").is_err());
        assert!(parse("a: 'abc\n").is_err());
    }

    #[test]
    fn test_unterminated_flow_collection_is_rejected() {
        assert!(parse("a: [1, 2\n").is_err());
        assert!(parse("a: {b: 1\n").is_err());
    }

    #[test]
    fn test_multiple_documents_are_rejected() {
        assert!(parse("a: 1\n---\nb: 2\n").is_err());
    }

    #[test]
    fn test_duplicate_keys_are_rejected() {
        assert!(parse("a: 1\na: 2\n").is_err());
    }

    #[test]
    fn test_keep_chomped_scalar_round_trip() {
        let text = "cfg: |+\n  a\n\nnext: 1\n";
        let doc = parse(text).unwrap();
        assert_eq!(doc.value()["cfg"], "a\n\n");

        let lines = doc.root_blocks().unwrap().into_lines();
        let rebuilt: String = lines.iter().map(|l| format!("{l}\n")).collect();
        assert_eq!(rebuilt, text);
        let again: Value = serde_yaml::from_str(&rebuilt).unwrap();
        assert_eq!(&again, doc.value());
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("# nothing here\n").unwrap();
        assert!(doc.root().is_none());
        let root = doc.root_blocks().unwrap();
        assert!(root.blocks.is_empty());
        assert_eq!(root.lead, ["# nothing here"]);
    }

    #[test]
    fn test_key_text() {
        assert_eq!(key_text(&Value::from("web")), Some("web".to_string()));
        assert_eq!(key_text(&Value::from(80)), Some("80".to_string()));
        assert_eq!(key_text(&Value::Null), None);
    }
}
