//! Property-based tests for the decompose and compose strategies.
//!
//! Compose files are generated from a small grammar of services, each with an
//! image, an optional head comment and an optional port list, and fed through
//! every strategy. Comment survival is checked for the two that keep them.

#[cfg(test)]
mod proptest_tests {
    use crate::backup::backup_name;
    use crate::defaults::PLACEHOLDER;
    use crate::strategy::{Decomposition, Mode, Source};
    use proptest::prelude::*;
    use std::collections::{BTreeMap, HashSet};
    use std::path::{Path, PathBuf};

    #[derive(Debug, Clone)]
    struct Service {
        image: String,
        comment: Option<String>,
        port: Option<u16>,
    }

    fn service() -> impl Strategy<Value = Service> {
        (
            "[a-z]{1,8}(:[0-9]{1,2})?",
            proptest::option::of("[a-zA-Z][a-zA-Z ]{0,19}"),
            proptest::option::of(1024u16..9000),
        )
            .prop_map(|(image, comment, port)| Service {
                image,
                comment,
                port,
            })
    }

    fn services() -> impl Strategy<Value = BTreeMap<String, Service>> {
        proptest::collection::btree_map("svc[a-z0-9]{0,6}", service(), 0..6)
    }

    fn compose_text(services: &BTreeMap<String, Service>) -> String {
        let mut out = String::from("# stack\nservices:\n");
        for (name, svc) in services {
            if let Some(comment) = &svc.comment {
                out.push_str(&format!("  # {}\n", comment.trim()));
            }
            out.push_str(&format!("  {name}:\n    image: \"{}\"\n", svc.image));
            if let Some(port) = svc.port {
                out.push_str(&format!("    ports:\n      - \"{port}:{port}\" # host\n"));
            }
        }
        out.push_str("volumes:\n  data:\n    name: d\n");
        out
    }

    fn round_trip(mode: Mode, text: &str) -> (Decomposition, String) {
        let strategy = mode.strategy();
        let split = strategy
            .decompose(Source::new(Path::new("docker-compose.yml"), text), "services")
            .unwrap();
        let paths: Vec<PathBuf> = split
            .entries
            .iter()
            .map(|e| PathBuf::from(format!("services/{}.yml", e.name)))
            .collect();
        let sources: Vec<Source<'_>> = split
            .entries
            .iter()
            .zip(&paths)
            .map(|(e, p)| Source::new(p, &e.content))
            .collect();
        let merged = strategy
            .compose(
                Source::new(Path::new("docker-compose-dcm.yml"), &split.template),
                &sources,
                "services",
            )
            .unwrap();
        (split, merged)
    }

    fn semantic(text: &str) -> serde_yaml::Value {
        serde_yaml::from_str(text).unwrap()
    }

    proptest! {
        /// Property: a keep-chomped scalar keeps its trailing blank lines
        #[test]
        fn keep_chomped_scalar_round_trip(blanks in 1usize..4, last in proptest::bool::ANY) {
            let cfg = format!("    cfg: |+\n      a\n{}", "\n".repeat(blanks));
            let other = "  db:\n    image: y\n";
            let text = if last {
                format!("services:\n{other}  web:\n{cfg}")
            } else {
                format!("services:\n  web:\n{cfg}{other}")
            };
            for mode in [Mode::Tree, Mode::Text] {
                let (_, merged) = round_trip(mode, &text);
                prop_assert_eq!(semantic(&merged), semantic(&text), "mode {}", mode);
            }
        }

        /// Property: compose(decompose(D)) is semantically equal to D
        #[test]
        fn round_trip_is_semantically_equal(services in services()) {
            let text = compose_text(&services);
            for mode in [Mode::Tree, Mode::Text, Mode::Format] {
                let (_, merged) = round_trip(mode, &text);
                prop_assert_eq!(semantic(&merged), semantic(&text), "mode {}", mode);
                prop_assert!(merged.ends_with('\n') && !merged.ends_with("\n\n"));
            }
        }

        /// Property: one entry per service, each naming exactly that service
        #[test]
        fn decompose_preserves_entry_count(services in services()) {
            let text = compose_text(&services);
            for mode in [Mode::Tree, Mode::Text, Mode::Format] {
                let (split, _) = round_trip(mode, &text);
                prop_assert_eq!(split.entries.len(), services.len());
                for (entry, name) in split.entries.iter().zip(services.keys()) {
                    prop_assert_eq!(&entry.name, name);
                    let value = semantic(&entry.content);
                    let mapping = value.as_mapping().unwrap();
                    prop_assert_eq!(mapping.len(), 1);
                    prop_assert!(mapping.contains_key(name.as_str()));
                }
            }
        }

        /// Property: the template holds the marker once and the merged file never does
        #[test]
        fn placeholder_appears_only_in_template(services in services()) {
            let text = compose_text(&services);
            for mode in [Mode::Tree, Mode::Text, Mode::Format] {
                let (split, merged) = round_trip(mode, &text);
                prop_assert_eq!(split.template.matches(PLACEHOLDER).count(), 1);
                prop_assert!(!merged.contains(PLACEHOLDER));
            }
        }

        /// Property: head and inline comments survive in the entry and the merged file
        #[test]
        fn comments_survive_round_trip(services in services()) {
            let text = compose_text(&services);
            for mode in [Mode::Tree, Mode::Text] {
                let (split, merged) = round_trip(mode, &text);
                for (entry, svc) in split.entries.iter().zip(services.values()) {
                    if let Some(comment) = &svc.comment {
                        let line = format!("# {}", comment.trim());
                        prop_assert!(entry.content.contains(&line));
                        prop_assert!(merged.contains(&line));
                    }
                    if svc.port.is_some() {
                        prop_assert!(entry.content.contains("# host"));
                    }
                }
            }
        }

        /// Property: the backup name is never one that is already taken
        #[test]
        fn backup_name_skips_taken_names(taken_count in 0usize..6) {
            let path = Path::new("dir/docker-compose.yml");
            let mut taken = HashSet::new();
            taken.insert(PathBuf::from("dir/docker-compose-20240131.yml"));
            for n in 1..taken_count {
                taken.insert(PathBuf::from(format!("dir/docker-compose-20240131.{n}.yml")));
            }
            if taken_count == 0 {
                taken.clear();
            }

            let name = backup_name(path, "20240131", |p| taken.contains(p));

            prop_assert!(!taken.contains(&name));
            let expected = match taken_count {
                0 => PathBuf::from("dir/docker-compose-20240131.yml"),
                n => PathBuf::from(format!("dir/docker-compose-20240131.{}.yml", n.max(1))),
            };
            prop_assert_eq!(name, expected);
        }
    }
}
