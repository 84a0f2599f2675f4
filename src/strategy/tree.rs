//! Tree-oriented strategy over lossless YAML documents.
//!
//! The parsed value says which keys a mapping holds; [`crate::yaml`] cuts the
//! verbatim lines into one block per key. Whole blocks are moved between the
//! source, the template and the entries, so every comment attached to an
//! entry key or nested inside its value travels with it.

use std::collections::HashMap;
use std::path::Path;

use serde_yaml::Value;

use crate::defaults::{self, ENTRY_INDENT};
use crate::error::{Error, Result};
use crate::section::{find_section, find_section_index};
use crate::strategy::{finish_lines, Decomposition, Entry, Source, Strategy};
use crate::yaml::{self, Block, Blocks, Document};

/// Moves key blocks between documents without reformatting them.
#[derive(Debug, Clone, Copy, Default)]
pub struct TreeStrategy;

impl Strategy for TreeStrategy {
    fn decompose(&self, source: Source<'_>, section: &str) -> Result<Decomposition> {
        let doc = parse(source)?;
        let missing = || Error::SectionMissing {
            section: section.to_string(),
            path: source.path.to_path_buf(),
        };
        let index = find_section_index(&doc, section).ok_or_else(missing)?;
        let value = find_section(&doc, section).ok_or_else(missing)?;
        let mut root = blocks(&doc, source)?;
        let block = root.blocks.get_mut(index).ok_or_else(missing)?;

        let entries = split_entries(block, value, section, source.path)?;
        space_out(&mut root.blocks, index + 1, false);

        Ok(Decomposition {
            template: finish_lines(&root.into_lines()),
            entries,
        })
    }

    fn compose(
        &self,
        template: Source<'_>,
        entries: &[Source<'_>],
        section: &str,
    ) -> Result<String> {
        let placeholder = defaults::placeholder(section);
        let doc = parse(template)?;
        let missing = || Error::SectionMissing {
            section: section.to_string(),
            path: template.path.to_path_buf(),
        };
        let value = find_section(&doc, section).ok_or_else(missing)?;
        let mut root = blocks(&doc, template)?;

        let carried = match take_placeholder(&mut root, section, value, &placeholder) {
            Some(comments) => comments,
            None => {
                log::warn!(
                    "{} has no '{}' placeholder; replacing the whole '{}' section",
                    template.path.display(),
                    placeholder,
                    section
                );
                Vec::new()
            }
        };

        let mut merged = merge_entries(entries)?;
        if let Some(first) = merged.first_mut() {
            let mut head = carried;
            head.append(&mut first.head);
            first.head = head;
        }
        space_out(&mut merged, 1, true);

        let pad = " ".repeat(ENTRY_INDENT);
        let index = root.position(section).ok_or_else(missing)?;
        let block = &mut root.blocks[index];
        let mut body = vec![yaml::bare_key_line(block.key_line())];
        for line in merged.iter().flat_map(Block::lines) {
            if line.trim().is_empty() {
                body.push(String::new());
            } else {
                body.push(format!("{pad}{line}"));
            }
        }
        block.body = body;
        space_out(&mut root.blocks, 1, true);

        let lines: Vec<String> = root
            .into_lines()
            .into_iter()
            .filter(|line| !line.contains(placeholder.as_str()))
            .collect();
        Ok(finish_lines(&lines))
    }
}

fn parse(source: Source<'_>) -> Result<Document> {
    yaml::parse(source.text).map_err(|e| Error::Parse {
        path: source.path.to_path_buf(),
        source: e,
    })
}

fn blocks(doc: &Document, source: Source<'_>) -> Result<Blocks> {
    doc.root_blocks().map_err(|e| Error::Parse {
        path: source.path.to_path_buf(),
        source: e,
    })
}

/// Put a blank line above every block from `from` on. `bare_only` skips
/// blocks that already have a head comment. Blank lines ending a
/// keep-chomped scalar already separate the block after it.
fn space_out(blocks: &mut [Block], from: usize, bare_only: bool) {
    for i in from.max(1)..blocks.len() {
        if blocks[i - 1].keeps_trailing_blanks() {
            continue;
        }
        let block = &mut blocks[i];
        if !(bare_only && block.has_head_comment()) {
            block.ensure_leading_blank_line();
        }
    }
}

/// Cut the section's value into entries and leave the section key with the
/// placeholder under it.
fn split_entries(block: &mut Block, value: &Value, section: &str, path: &Path) -> Result<Vec<Entry>> {
    let key_line = block.key_line().to_string();
    let rest = block.body.split_off(1);
    block.body = vec![
        yaml::bare_key_line(&key_line),
        defaults::placeholder(section),
    ];
    let invalid = || Error::InvalidSection {
        section: section.to_string(),
        path: path.to_path_buf(),
    };

    let mapping = match value {
        Value::Null => {
            block.body.extend(rest);
            return Ok(Vec::new());
        }
        Value::Mapping(mapping) => mapping,
        _ => return Err(invalid()),
    };
    let inline = yaml::inline_value(&key_line).unwrap_or_default();
    if inline.starts_with('{') {
        return if mapping.is_empty() {
            Ok(Vec::new())
        } else {
            Err(invalid())
        };
    }

    let indent = yaml::content_indent(&rest).ok_or_else(invalid)?;
    let split = yaml::split_blocks(&rest, indent, mapping.len()).map_err(|e| Error::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;
    let Blocks {
        mut blocks, trail, ..
    } = split;
    if let Some(last) = blocks.last_mut() {
        // Comments after the last entry close the section; keep them with
        // that entry rather than dropping them from the template.
        last.body.extend(trail);
    }

    let mut entries = Vec::with_capacity(blocks.len());
    for (mut entry, value) in blocks.into_iter().zip(mapping.values()) {
        check_entry_value(&entry.name, value, path)?;
        log::debug!("Splitting entry '{}'", entry.name);
        entry.trim_leading_blank_lines();
        entry.dedent(indent);
        entries.push(Entry {
            content: finish_lines(&entry.lines().collect::<Vec<_>>()),
            name: entry.name,
        });
    }
    Ok(entries)
}

fn check_entry_value(name: &str, value: &Value, path: &Path) -> Result<()> {
    if value.is_mapping() || value.is_null() {
        return Ok(());
    }
    Err(Error::MalformedEntry {
        path: path.to_path_buf(),
        message: format!("entry '{name}' does not hold a mapping"),
    })
}

/// Remove the placeholder from the template, returning the comments written
/// above it. `None` when the template has no placeholder.
fn take_placeholder(
    root: &mut Blocks,
    section: &str,
    value: &Value,
    placeholder: &str,
) -> Option<Vec<String>> {
    // At column zero the marker reads as a root key of its own.
    let found = root
        .blocks
        .iter()
        .position(|b| b.body.len() == 1 && b.key_line().trim() == placeholder);
    if let Some(pos) = found {
        return Some(root.blocks.remove(pos).head);
    }

    let index = root.position(section)?;
    let block = &mut root.blocks[index];

    // Indented under the section key it is a line of the section's value.
    let found = block.body.iter().skip(1).position(|l| l.trim() == placeholder);
    if let Some(pos) = found {
        let carried = block.body[1..=pos]
            .iter()
            .filter(|l| yaml::is_comment(l))
            .map(|l| l.trim().to_string())
            .collect();
        block.body.truncate(1);
        return Some(carried);
    }

    // Or a quoted scalar standing in for the whole value.
    if value.as_str().is_some_and(|v| v.trim() == placeholder) {
        block.body.truncate(1);
        return Some(Vec::new());
    }
    None
}

/// Blocks of every entry document at column zero, in the order given.
fn merge_entries(entries: &[Source<'_>]) -> Result<Vec<Block>> {
    let mut merged: Vec<Block> = Vec::new();
    let mut seen: HashMap<String, &Path> = HashMap::new();

    for entry in entries {
        let doc = parse(*entry)?;
        let malformed = || Error::MalformedEntry {
            path: entry.path.to_path_buf(),
            message: "expected a mapping with an entry key".to_string(),
        };
        let mapping = doc.root().filter(|m| !m.is_empty()).ok_or_else(malformed)?;
        let Blocks {
            indent,
            mut blocks,
            trail,
            ..
        } = blocks(&doc, *entry)?;
        if let Some(last) = blocks.last_mut() {
            last.body.extend(trail);
        }

        for (mut block, value) in blocks.into_iter().zip(mapping.values()) {
            check_entry_value(&block.name, value, entry.path)?;
            if let Some(first) = seen.insert(block.name.clone(), entry.path) {
                return Err(Error::DuplicateEntry {
                    name: block.name,
                    first: first.to_path_buf(),
                    second: entry.path.to_path_buf(),
                });
            }
            log::debug!("Merging entry '{}' from {}", block.name, entry.path.display());
            block.dedent(indent);
            if merged.is_empty() {
                block.trim_leading_blank_lines();
            }
            merged.push(block);
        }
    }
    Ok(merged)
}

#[cfg(test)]
mod tests {
    use super::*;

    const COMPOSE: &str = "\
# Main docker-compose configuration
services:
  # Application service configuration
  app: # Main application
    build: # Build configuration
      context: ./app
    environment: # Environment variables
      #- REDIS_URL=redis:6001 # Old redis port
      - REDIS_URL=redis:6379 # Current redis port
  # Redis service configuration
  redis:
    image: redis:alpine
# Volume configuration
volumes:
  redis-data:
    name: go-redis
";

    fn src(text: &str) -> Source<'_> {
        Source::new(Path::new("docker-compose.yml"), text)
    }

    #[test]
    fn test_decompose_splits_entries_with_their_comments() {
        let out = TreeStrategy.decompose(src(COMPOSE), "services").unwrap();

        assert_eq!(out.entries.len(), 2);
        assert_eq!(out.entries[0].name, "app");
        assert_eq!(
            out.entries[0].content,
            "\
# Application service configuration
app: # Main application
  build: # Build configuration
    context: ./app
  environment: # Environment variables
    #- REDIS_URL=redis:6001 # Old redis port
    - REDIS_URL=redis:6379 # Current redis port
"
        );
        assert_eq!(
            out.entries[1].content,
            "# Redis service configuration\nredis:\n  image: redis:alpine\n"
        );
    }

    #[test]
    fn test_decompose_template_holds_placeholder() {
        let out = TreeStrategy.decompose(src(COMPOSE), "services").unwrap();
        assert_eq!(
            out.template,
            "\
# Main docker-compose configuration
services:
<dcm: include services\\>

# Volume configuration
volumes:
  redis-data:
    name: go-redis
"
        );
    }

    #[test]
    fn test_decompose_missing_section() {
        let err = TreeStrategy
            .decompose(src("volumes:\n  data: {}\n"), "services")
            .unwrap_err();
        assert!(matches!(err, Error::SectionMissing { .. }));
    }

    #[test]
    fn test_decompose_empty_section() {
        let out = TreeStrategy
            .decompose(src("services:\nvolumes:\n  data: {}\n"), "services")
            .unwrap();
        assert!(out.entries.is_empty());
        assert_eq!(
            out.template,
            "services:\n<dcm: include services\\>\n\nvolumes:\n  data: {}\n"
        );
    }

    #[test]
    fn test_decompose_rejects_scalar_entry() {
        let err = TreeStrategy
            .decompose(src("services:\n  web: nginx\n"), "services")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { .. }));
    }

    #[test]
    fn test_decompose_rejects_sequence_section() {
        let err = TreeStrategy
            .decompose(src("services:\n  - web\n"), "services")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSection { .. }));
    }

    #[test]
    fn test_decompose_keeps_empty_entry() {
        let out = TreeStrategy
            .decompose(src("services:\n  idle:\n  web:\n    image: x\n"), "services")
            .unwrap();
        assert_eq!(out.entries[0].content, "idle:\n");
    }

    #[test]
    fn test_decompose_moves_section_foot_to_last_entry() {
        let out = TreeStrategy
            .decompose(
                src("services:\n  web:\n    image: x\n  # db:\n  #   image: y\nvolumes: {}\n"),
                "services",
            )
            .unwrap();
        assert_eq!(
            out.entries[0].content,
            "web:\n  image: x\n# db:\n#   image: y\n"
        );
        assert!(!out.template.contains("# db"));
    }

    #[test]
    fn test_decompose_leaves_keys_before_section_alone() {
        let out = TreeStrategy
            .decompose(
                src("version: '3'\nservices:\n  web:\n    image: x\nvolumes: {}\n"),
                "services",
            )
            .unwrap();
        assert_eq!(
            out.template,
            "version: '3'\nservices:\n<dcm: include services\\>\n\nvolumes: {}\n"
        );
    }

    #[test]
    fn test_decompose_keeps_lines_verbatim() {
        let out = TreeStrategy
            .decompose(
                src("x-env: &env\n  A:    '1'\nservices:\n  web:\n    environment: *env\n    ports: [ \"80:80\" ]\n"),
                "services",
            )
            .unwrap();
        assert!(out.template.starts_with("x-env: &env\n  A:    '1'\n"));
        assert_eq!(
            out.entries[0].content,
            "web:\n  environment: *env\n  ports: [ \"80:80\" ]\n"
        );
    }

    #[test]
    fn test_keep_chomped_scalar_keeps_its_blank_lines() {
        let compose = "services:\n  web:\n    cfg: |+\n      a\n\n  db:\n    image: y\n";
        let out = TreeStrategy.decompose(src(compose), "services").unwrap();
        assert_eq!(out.entries[0].content, "web:\n  cfg: |+\n    a\n\n");

        let entries: Vec<Source<'_>> = out
            .entries
            .iter()
            .map(|e| Source::new(Path::new("services/entry.yml"), &e.content))
            .collect();
        let merged = TreeStrategy
            .compose(src(&out.template), &entries, "services")
            .unwrap();

        assert_eq!(merged, compose);
        let value: serde_yaml::Value = serde_yaml::from_str(&merged).unwrap();
        assert_eq!(value["services"]["web"]["cfg"], "a\n\n");
    }

    #[test]
    fn test_decompose_flow_section() {
        let out = TreeStrategy
            .decompose(src("services: {}\n"), "services")
            .unwrap();
        assert!(out.entries.is_empty());
        assert_eq!(out.template, "services:\n<dcm: include services\\>\n");

        let err = TreeStrategy
            .decompose(src("services: {web: {image: x}}\n"), "services")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidSection { .. }));
    }

    #[test]
    fn test_compose_carries_comments_above_placeholder() {
        let template = "services:\n# generated below\n<dcm: include services\\>\nvolumes: {}\n";
        let entry = Source::new(Path::new("services/web.yml"), "web:\n  image: x\n");
        let out = TreeStrategy
            .compose(src(template), &[entry], "services")
            .unwrap();
        assert_eq!(
            out,
            "services:\n  # generated below\n  web:\n    image: x\n\nvolumes: {}\n"
        );
    }

    #[test]
    fn test_compose_quoted_placeholder() {
        let template = "services: '<dcm: include services\\>'\n";
        let entry = Source::new(Path::new("services/web.yml"), "web:\n  image: x\n");
        let out = TreeStrategy
            .compose(src(template), &[entry], "services")
            .unwrap();
        assert_eq!(out, "services:\n  web:\n    image: x\n");
    }

    #[test]
    fn test_compose_concrete_scenario() {
        let template = "services:\n<dcm: include services\\>\nvolumes:\n  data:\n    name: d\n";
        let app = "  app:\n    image: x\n";
        let redis = "  redis:\n    image: y\n";
        let entries = [
            Source::new(Path::new("services/app.yml"), app),
            Source::new(Path::new("services/redis.yml"), redis),
        ];

        let out = TreeStrategy
            .compose(src(template), &entries, "services")
            .unwrap();

        assert_eq!(
            out,
            "services:\n  app:\n    image: x\n\n  redis:\n    image: y\n\nvolumes:\n  data:\n    name: d\n"
        );
    }

    #[test]
    fn test_compose_round_trip_restores_comments() {
        let out = TreeStrategy.decompose(src(COMPOSE), "services").unwrap();
        let paths: Vec<String> = out
            .entries
            .iter()
            .map(|e| format!("services/{}.yml", e.name))
            .collect();
        let entries: Vec<Source<'_>> = out
            .entries
            .iter()
            .zip(&paths)
            .map(|(e, p)| Source::new(Path::new(p), &e.content))
            .collect();

        let merged = TreeStrategy
            .compose(src(&out.template), &entries, "services")
            .unwrap();

        assert_eq!(
            merged,
            "\
# Main docker-compose configuration
services:
  # Application service configuration
  app: # Main application
    build: # Build configuration
      context: ./app
    environment: # Environment variables
      #- REDIS_URL=redis:6001 # Old redis port
      - REDIS_URL=redis:6379 # Current redis port
  # Redis service configuration
  redis:
    image: redis:alpine

# Volume configuration
volumes:
  redis-data:
    name: go-redis
"
        );
    }

    #[test]
    fn test_compose_without_entries_leaves_section_empty() {
        let out = TreeStrategy
            .compose(src("services:\n<dcm: include services\\>\n"), &[], "services")
            .unwrap();
        assert_eq!(out, "services:\n");
    }

    #[test]
    fn test_compose_accepts_indented_placeholder() {
        let template = "services:\n  <dcm: include services\\>\n";
        let entry = Source::new(Path::new("services/web.yml"), "web:\n  image: x\n");
        let out = TreeStrategy
            .compose(src(template), &[entry], "services")
            .unwrap();
        assert_eq!(out, "services:\n  web:\n    image: x\n");
    }

    #[test]
    fn test_compose_missing_section() {
        let err = TreeStrategy
            .compose(src("volumes: {}\n"), &[], "services")
            .unwrap_err();
        assert!(matches!(err, Error::SectionMissing { .. }));
    }

    #[test]
    fn test_compose_duplicate_entry() {
        let a = Source::new(Path::new("services/a.yml"), "web:\n  image: x\n");
        let b = Source::new(Path::new("services/b.yml"), "web:\n  image: y\n");
        let err = TreeStrategy
            .compose(src("services:\n<dcm: include services\\>\n"), &[a, b], "services")
            .unwrap_err();
        match err {
            Error::DuplicateEntry { name, first, second } => {
                assert_eq!(name, "web");
                assert_eq!(first, Path::new("services/a.yml"));
                assert_eq!(second, Path::new("services/b.yml"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_compose_malformed_entry() {
        let bad = Source::new(Path::new("services/bad.yml"), "- not a mapping\n");
        let err = TreeStrategy
            .compose(src("services:\n<dcm: include services\\>\n"), &[bad], "services")
            .unwrap_err();
        assert!(matches!(err, Error::MalformedEntry { .. }));
    }

    #[test]
    fn test_compose_entry_parse_error_names_file() {
        let bad = Source::new(Path::new("services/bad.yml"), "web:\n\timage: x\n");
        let err = TreeStrategy
            .compose(src("services:\n<dcm: include services\\>\n"), &[bad], "services")
            .unwrap_err();
        assert!(err.to_string().contains("services/bad.yml"));
    }
}
