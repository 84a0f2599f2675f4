//! Formatting strategy: documents go through `serde_yaml` and come out in its
//! layout. Comments and quoting choices are not kept.

use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_yaml::{Mapping, Value};

use crate::defaults;
use crate::error::{Error, Result};
use crate::strategy::{finish_text, Decomposition, Entry, Source, Strategy};
use crate::yaml::{self, ParseError};

/// Rewrites the compose file, the template and every entry in a uniform
/// layout.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatStrategy;

/// A compose document: top-level keys in order.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(transparent)]
struct ComposeFile {
    sections: Mapping,
}

/// The value of one entry, kept as an untyped mapping so no field is lost.
type Service = Option<Mapping>;

impl ComposeFile {
    fn load(source: Source<'_>) -> Result<Self> {
        let value: Option<Self> = serde_yaml::from_str(source.text).map_err(|e| Error::Parse {
            path: source.path.to_path_buf(),
            source: ParseError::from(e),
        })?;
        Ok(value.unwrap_or_default())
    }

    fn key(&self, name: &str) -> Option<Value> {
        self.sections
            .keys()
            .find(|k| yaml::key_text(k).as_deref() == Some(name))
            .cloned()
    }
}

impl Strategy for FormatStrategy {
    fn decompose(&self, source: Source<'_>, section: &str) -> Result<Decomposition> {
        let file = ComposeFile::load(source)?;
        let key = file.key(section).ok_or_else(|| Error::SectionMissing {
            section: section.to_string(),
            path: source.path.to_path_buf(),
        })?;

        let mut template = Vec::new();
        let mut entries = Vec::new();
        for (k, value) in &file.sections {
            if *k != key {
                template.push(emit_pair(k, value)?);
                continue;
            }
            template.push(format!("{section}:\n{}\n", defaults::placeholder(section)));
            let services: Option<Mapping> =
                serde_yaml::from_value(value.clone()).map_err(|_| Error::InvalidSection {
                    section: section.to_string(),
                    path: source.path.to_path_buf(),
                })?;
            for (name, service) in services.unwrap_or_default() {
                let service = entry_value(&name, service, source.path)?;
                log::debug!("Formatting entry '{}'", name_of(&name));
                entries.push(Entry {
                    name: name_of(&name),
                    content: emit_service(&name, service)?,
                });
            }
        }

        Ok(Decomposition {
            template: finish_text(&template.join("\n")),
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
        let mut file = ComposeFile::load(template)?;
        let key = file.key(section).ok_or_else(|| Error::SectionMissing {
            section: section.to_string(),
            path: template.path.to_path_buf(),
        })?;

        let root_marker = file
            .sections
            .iter()
            .find(|(k, v)| is_placeholder(k, v, &placeholder))
            .map(|(k, _)| k.clone());
        let found = match root_marker {
            Some(marker) => file.sections.remove(&marker).is_some(),
            None => match file.sections.get(&key) {
                Some(Value::Mapping(m)) => m.iter().any(|(k, v)| is_placeholder(k, v, &placeholder)),
                Some(Value::String(s)) => s.trim() == placeholder,
                _ => false,
            },
        };
        if !found {
            log::warn!(
                "{} has no '{}' placeholder; replacing the whole '{}' section",
                template.path.display(),
                placeholder,
                section
            );
        }

        let merged = merge_entries(entries)?;
        let value = if merged.is_empty() {
            Value::Null
        } else {
            Value::Mapping(merged)
        };
        file.sections.insert(key, value);

        let parts = file
            .sections
            .iter()
            .map(|(k, v)| emit_pair(k, v))
            .collect::<Result<Vec<_>>>()?;
        Ok(finish_text(&parts.join("\n")))
    }
}

fn merge_entries(entries: &[Source<'_>]) -> Result<Mapping> {
    let mut merged = Mapping::new();
    let mut seen: HashMap<String, &Path> = HashMap::new();

    for entry in entries {
        let doc = ComposeFile::load(*entry)?;
        if doc.sections.is_empty() {
            return Err(Error::MalformedEntry {
                path: entry.path.to_path_buf(),
                message: "expected a mapping with an entry key".to_string(),
            });
        }
        for (name, value) in doc.sections {
            let service = entry_value(&name, value, entry.path)?;
            let text = name_of(&name);
            if let Some(first) = seen.insert(text.clone(), entry.path) {
                return Err(Error::DuplicateEntry {
                    name: text,
                    first: first.to_path_buf(),
                    second: entry.path.to_path_buf(),
                });
            }
            log::debug!("Merging entry '{}' from {}", text, entry.path.display());
            merged.insert(name, service.map_or(Value::Null, Value::Mapping));
        }
    }
    Ok(merged)
}

fn entry_value(name: &Value, value: Value, path: &Path) -> Result<Service> {
    serde_yaml::from_value(value).map_err(|_| Error::MalformedEntry {
        path: path.to_path_buf(),
        message: format!("entry '{}' does not hold a mapping", name_of(name)),
    })
}

fn name_of(key: &Value) -> String {
    yaml::key_text(key).unwrap_or_else(|| format!("{key:?}"))
}

fn is_placeholder(key: &Value, value: &Value, placeholder: &str) -> bool {
    match (yaml::key_text(key), value.as_str()) {
        (Some(k), Some(v)) => format!("{k}: {v}") == placeholder,
        _ => false,
    }
}

fn emit_service(name: &Value, service: Service) -> Result<String> {
    emit_pair(name, &service.map_or(Value::Null, Value::Mapping))
}

/// One `key: value` document. A null value is written as a bare `key:`.
fn emit_pair(key: &Value, value: &Value) -> Result<String> {
    if value.is_null() {
        let key = serde_yaml::to_string(key)?;
        return Ok(format!("{}:\n", key.trim_end()));
    }
    let mut single = Mapping::new();
    single.insert(key.clone(), value.clone());
    Ok(serde_yaml::to_string(&single)?)
}
