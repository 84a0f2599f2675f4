//! Line-oriented strategy.
//!
//! Lines are classified one at a time and fed through an explicit state
//! machine. Entries must be indented by exactly [`ENTRY_INDENT`] spaces under
//! the section header, and a top-level key is any `key:` line at column zero.

use std::collections::HashMap;
use std::path::Path;

use regex::Regex;

use crate::defaults::{self, ENTRY_INDENT};
use crate::error::{Error, Result};
use crate::strategy::{finish_lines, Decomposition, Entry, Source, Strategy};
use crate::yaml::keeps_trailing_blanks;

/// Works on raw lines without parsing YAML.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStrategy;

#[derive(Debug, Clone, PartialEq, Eq)]
enum LineClass {
    Blank,
    Comment,
    SectionHeader,
    TopLevelKey,
    EntryKey(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum State {
    OutsideSection,
    InSection,
    InEntry,
    AfterSection,
}

struct Classifier {
    section_header: Regex,
    top_level_key: Regex,
    entry_key: Regex,
}

impl Classifier {
    fn new(section: &str) -> Result<Self> {
        Ok(Self {
            section_header: Regex::new(&format!(
                r"^{}:\s*(?:#.*)?$",
                regex::escape(section)
            ))?,
            top_level_key: Regex::new(r"^[^\s#][^:]*:(?:\s|$)")?,
            entry_key: Regex::new(&format!(
                r"^ {{{ENTRY_INDENT}}}([^\s#:][^:]*):(?:\s|$)"
            ))?,
        })
    }

    fn classify(&self, line: &str) -> LineClass {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            LineClass::Blank
        } else if trimmed.starts_with('#') {
            LineClass::Comment
        } else if self.section_header.is_match(line) {
            LineClass::SectionHeader
        } else if self.top_level_key.is_match(line) {
            LineClass::TopLevelKey
        } else if let Some(caps) = self.entry_key.captures(line) {
            LineClass::EntryKey(unquote(caps[1].trim()).to_string())
        } else {
            LineClass::Other
        }
    }
}

struct EntryBuf {
    name: String,
    lines: Vec<String>,
}

/// Decompose state: the template and entries collected so far, plus comment
/// and blank lines whose owner is not known yet.
struct Splitter<'a> {
    source: Source<'a>,
    section: &'a str,
    placeholder: String,
    state: State,
    template: Vec<String>,
    entries: Vec<EntryBuf>,
    pending: Vec<String>,
}

impl<'a> Splitter<'a> {
    fn feed(&mut self, line: &str, class: LineClass) -> Result<()> {
        match (self.state.clone(), class) {
            (State::OutsideSection, LineClass::SectionHeader) => {
                self.template.push(line.trim_end().to_string());
                self.template.push(self.placeholder.clone());
                self.state = State::InSection;
            }
            (State::OutsideSection | State::AfterSection, class) => {
                if matches!(class, LineClass::TopLevelKey | LineClass::SectionHeader) {
                    self.separate_top_level_key();
                }
                self.push_template(line);
            }
            (_, LineClass::Blank | LineClass::Comment) => {
                self.pending.push(line.trim_end().to_string());
            }
            (_, LineClass::EntryKey(name)) => {
                if self.entries.iter().any(|e| e.name == name) {
                    return Err(Error::DuplicateEntry {
                        name,
                        first: self.source.path.to_path_buf(),
                        second: self.source.path.to_path_buf(),
                    });
                }
                let head = if self.state == State::InEntry {
                    self.close_entry(ENTRY_INDENT + 1)
                } else {
                    std::mem::take(&mut self.pending)
                };
                let mut lines: Vec<String> = head
                    .into_iter()
                    .skip_while(|l| l.trim().is_empty())
                    .collect();
                lines.push(line.trim_end().to_string());
                self.entries.push(EntryBuf { name, lines });
                self.state = State::InEntry;
            }
            (_, LineClass::TopLevelKey | LineClass::SectionHeader) => {
                let rest = if self.state == State::InEntry {
                    self.close_entry(1)
                } else {
                    std::mem::take(&mut self.pending)
                };
                for pending in rest {
                    self.push_template(&pending);
                }
                self.separate_top_level_key();
                self.push_template(line);
                self.state = State::AfterSection;
            }
            (State::InEntry, LineClass::Other) => {
                let mut pending = std::mem::take(&mut self.pending);
                if let Some(entry) = self.entries.last_mut() {
                    entry.lines.append(&mut pending);
                    entry.lines.push(line.trim_end().to_string());
                }
            }
            (_, LineClass::Other) => {
                return Err(Error::MalformedEntry {
                    path: self.source.path.to_path_buf(),
                    message: format!(
                        "expected an entry key indented by {ENTRY_INDENT} spaces, found '{}'",
                        line.trim()
                    ),
                });
            }
        }
        Ok(())
    }

    fn finish(mut self) -> Result<Decomposition> {
        if self.state == State::OutsideSection {
            return Err(Error::SectionMissing {
                section: self.section.to_string(),
                path: self.source.path.to_path_buf(),
            });
        }
        let rest = if self.state == State::InEntry {
            self.close_entry(1)
        } else {
            std::mem::take(&mut self.pending)
        };
        for pending in rest {
            self.push_template(&pending);
        }

        let entries = self
            .entries
            .into_iter()
            .map(|entry| Entry {
                content: finish_lines(&dedent(&entry.lines)),
                name: entry.name,
            })
            .collect();
        let template: Vec<String> = self
            .template
            .into_iter()
            .skip_while(|l| l.is_empty())
            .collect();
        Ok(Decomposition {
            template: finish_lines(&template),
            entries,
        })
    }

    /// Move the buffered lines that still belong to the current entry into
    /// it: blank lines ending a keep-chomped scalar, then everything up to
    /// the last comment indented at least `min_indent`. The remainder is
    /// returned.
    fn close_entry(&mut self, min_indent: usize) -> Vec<String> {
        let mut pending = std::mem::take(&mut self.pending);
        if let Some(entry) = self.entries.last_mut() {
            if keeps_trailing_blanks(&entry.lines) {
                let blanks = pending.iter().take_while(|l| l.trim().is_empty()).count();
                entry.lines.extend(pending.drain(..blanks));
            }
        }
        let prefix = pending
            .iter()
            .take_while(|l| l.trim().is_empty() || indent_of(l) >= min_indent)
            .count();
        let split = pending[..prefix]
            .iter()
            .rposition(|l| !l.trim().is_empty())
            .map_or(0, |idx| idx + 1);
        let rest = pending.split_off(split);
        if let Some(entry) = self.entries.last_mut() {
            entry.lines.append(&mut pending);
        }
        rest
    }

    fn push_template(&mut self, line: &str) {
        let line = line.trim_end();
        if line.is_empty() && self.template.last().is_some_and(|l| l.is_empty()) {
            return;
        }
        self.template.push(line.to_string());
    }

    /// Keep top-level keys visually apart unless a comment or blank line
    /// already precedes them.
    fn separate_top_level_key(&mut self) {
        let needs_blank = self
            .template
            .last()
            .is_some_and(|l| !l.is_empty() && !l.trim_start().starts_with('#'));
        if needs_blank {
            self.template.push(String::new());
        }
    }
}

impl Strategy for TextStrategy {
    fn decompose(&self, source: Source<'_>, section: &str) -> Result<Decomposition> {
        let classifier = Classifier::new(section)?;
        let mut splitter = Splitter {
            source,
            section,
            placeholder: defaults::placeholder(section),
            state: State::OutsideSection,
            template: Vec::new(),
            entries: Vec::new(),
            pending: Vec::new(),
        };
        for line in source.text.lines() {
            let class = classifier.classify(line);
            splitter.feed(line, class)?;
        }
        let out = splitter.finish()?;
        log::debug!("Split {} entries from {}", out.entries.len(), source.path.display());
        Ok(out)
    }

    fn compose(
        &self,
        template: Source<'_>,
        entries: &[Source<'_>],
        section: &str,
    ) -> Result<String> {
        let classifier = Classifier::new(section)?;
        let placeholder = defaults::placeholder(section);
        let lines: Vec<&str> = template.text.lines().collect();

        let header = lines
            .iter()
            .position(|l| classifier.classify(l) == LineClass::SectionHeader)
            .ok_or_else(|| Error::SectionMissing {
                section: section.to_string(),
                path: template.path.to_path_buf(),
            })?;
        let marker = lines[header + 1..]
            .iter()
            .position(|l| l.trim() == placeholder)
            .map(|offset| header + 1 + offset)
            .ok_or_else(|| Error::PlaceholderMissing {
                placeholder: placeholder.clone(),
                path: template.path.to_path_buf(),
            })?;

        let body = indent_entries(&classifier, entries)?;

        let mut out: Vec<String> = lines[..marker].iter().map(|l| l.to_string()).collect();
        out.extend(body.iter().cloned());
        let after = &lines[marker + 1..];
        if !body.is_empty()
            && !keeps_trailing_blanks(&body)
            && after.first().is_some_and(|l| !l.trim().is_empty())
        {
            out.push(String::new());
        }
        out.extend(
            after
                .iter()
                .filter(|l| !l.contains(placeholder.as_str()))
                .map(|l| l.to_string()),
        );
        Ok(finish_lines(&out))
    }
}

/// Indented section body for `entries`, one blank line between entries.
fn indent_entries(classifier: &Classifier, entries: &[Source<'_>]) -> Result<Vec<String>> {
    let mut seen: HashMap<String, &Path> = HashMap::new();
    let mut body = Vec::new();
    let mut separated = true;
    let pad = " ".repeat(ENTRY_INDENT);

    for entry in entries {
        let lines: Vec<&str> = entry.text.lines().collect();
        let first = lines
            .iter()
            .find(|l| !matches!(classifier.classify(l), LineClass::Blank | LineClass::Comment))
            .ok_or_else(|| Error::MalformedEntry {
                path: entry.path.to_path_buf(),
                message: "no entry key found".to_string(),
            })?;
        let name = entry_name(classifier, first).ok_or_else(|| Error::MalformedEntry {
            path: entry.path.to_path_buf(),
            message: format!("expected an entry key, found '{}'", first.trim()),
        })?;
        if let Some(previous) = seen.insert(name.clone(), entry.path) {
            return Err(Error::DuplicateEntry {
                name,
                first: previous.to_path_buf(),
                second: entry.path.to_path_buf(),
            });
        }
        log::debug!("Merging entry '{}' from {}", name, entry.path.display());

        // Entry files written with the key already indented are taken as is.
        let offset = indent_of(first);
        let mut block: Vec<String> = lines
            .iter()
            .map(|l| {
                if l.trim().is_empty() {
                    String::new()
                } else if offset >= ENTRY_INDENT {
                    l.trim_end().to_string()
                } else {
                    format!("{pad}{}", l.trim_end())
                }
            })
            .skip_while(|l| l.is_empty())
            .collect();
        let keep = keeps_trailing_blanks(&block);
        if !keep {
            while block.last().is_some_and(|l| l.is_empty()) {
                block.pop();
            }
        }

        if !separated {
            body.push(String::new());
        }
        body.append(&mut block);
        separated = keep;
    }
    Ok(body)
}

/// Name of the entry whose key line is `line`, at column zero or at the
/// entry indentation.
fn entry_name(classifier: &Classifier, line: &str) -> Option<String> {
    match classifier.classify(line) {
        LineClass::EntryKey(name) => Some(name),
        LineClass::TopLevelKey | LineClass::SectionHeader => {
            let key = line.split_once(':').map(|(key, _)| key.trim())?;
            Some(unquote(key).to_string())
        }
        _ => None,
    }
}

fn dedent(lines: &[String]) -> Vec<String> {
    let pad = " ".repeat(ENTRY_INDENT);
    lines
        .iter()
        .map(|l| {
            if l.trim().is_empty() {
                String::new()
            } else {
                l.strip_prefix(pad.as_str()).unwrap_or(l).to_string()
            }
        })
        .collect()
}

fn indent_of(line: &str) -> usize {
    line.len() - line.trim_start_matches(' ').len()
}

fn unquote(key: &str) -> &str {
    for quote in ['"', '\''] {
        if let Some(inner) = key
            .strip_prefix(quote)
            .and_then(|rest| rest.strip_suffix(quote))
        {
            return inner;
        }
    }
    key
}
