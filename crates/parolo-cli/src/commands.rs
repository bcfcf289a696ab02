//! Subcommand execution.

use std::io::{Read, Write};

use anyhow::{Context, Result};
use parolo::{Parolo, ParoloSettings, display};
use parolo_core::constants::LATEST_SELECTOR;
use serde_json::{Map, Value};

use crate::Command;

fn to_map(pairs: Vec<(String, Value)>) -> Map<String, Value> {
    pairs.into_iter().collect()
}

fn read_text(file: Option<&std::path::Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            let _ = std::io::stdin()
                .read_to_string(&mut text)
                .context("Failed to read prompt text from stdin")?;
            Ok(text)
        }
    }
}

/// Execute `command`, writing results to `out`.
pub(crate) fn run(
    parolo: &Parolo,
    settings: &ParoloSettings,
    command: Command,
    out: &mut dyn Write,
) -> Result<()> {
    let prompts = parolo.prompts();
    let legacy = parolo.legacy();

    match command {
        Command::Put { name, file, meta } => {
            let text = read_text(file.as_deref())?;
            let metadata = (!meta.is_empty()).then(|| to_map(meta));
            let outcome = prompts
                .save(&name, &text, metadata)
                .with_context(|| format!("Failed to save '{name}'"))?;
            let state = if outcome.created { "created" } else { "unchanged" };
            writeln!(out, "{state} {name} {} {}", outcome.version, outcome.hash)?;
        }
        Command::Get { name, version } => {
            write!(out, "{}", legacy.get_prompt(&name, &version)?)?;
        }
        Command::Versions { name, meta } => {
            if meta {
                write!(out, "{}", display::version_list(&prompts.versions_with_meta(&name)?))?;
            } else {
                for file in prompts.versions(&name)? {
                    writeln!(out, "{file}")?;
                }
            }
        }
        Command::Log { name, limit } => {
            let limit = limit.unwrap_or(settings.history.default_limit);
            let entries = legacy.log(&name, limit)?;
            if entries.is_empty() {
                writeln!(out, "No versions found for '{name}'")?;
            } else {
                write!(out, "{}", display::history(&name, &entries))?;
            }
        }
        Command::Info { name, version } => match legacy.version_info(&name, &version) {
            Some(meta) => write!(out, "{}", display::version_info(&name, &version, &meta))?,
            None => writeln!(out, "No metadata found for {name} {version}")?,
        },
        Command::List { meta, json } => {
            let all = if meta {
                prompts.list_with_meta()?
            } else {
                prompts.list()?
            };
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&all)?)?;
            } else {
                for summary in &all {
                    let latest = if summary.has_latest { "" } else { " (no latest)" };
                    writeln!(out, "{}\t{} versions{latest}", summary.name, summary.versions)?;
                }
            }
        }
        Command::Overview => {
            for (name, count) in prompts.overview()? {
                writeln!(out, "{name}: {count}")?;
            }
        }
        Command::Render {
            name,
            version,
            vars,
        } => {
            let vars = to_map(vars);
            let text = match version {
                Some(v) => prompts.render_version(&name, &v, &vars)?,
                None => prompts.render(&name, &vars)?,
            };
            write!(out, "{text}")?;
        }
        Command::Format {
            name,
            version,
            vars,
        } => {
            write!(out, "{}", legacy.format_prompt(&name, &version, &to_map(vars))?)?;
        }
        Command::Vars { name, legacy: placeholders } => {
            let vars = if placeholders {
                legacy.fields(&name, LATEST_SELECTOR)?
            } else {
                prompts.vars(&name)?
            };
            for var in vars {
                writeln!(out, "{var}")?;
            }
        }
        Command::Token { name } => {
            writeln!(out, "{}", prompts.token(&name)?)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exec(parolo: &Parolo, command: Command) -> String {
        let mut buf = Vec::new();
        run(parolo, &ParoloSettings::default(), command, &mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    fn put_file(parolo: &Parolo, dir: &std::path::Path, name: &str, text: &str) -> String {
        let path = dir.join(format!("{name}.input"));
        std::fs::write(&path, text).unwrap();
        exec(
            parolo,
            Command::Put {
                name: name.into(),
                file: Some(path),
                meta: vec![("owner".into(), Value::from("cli"))],
            },
        )
    }

    #[test]
    fn put_reports_created_then_unchanged() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());

        assert!(put_file(&parolo, inputs.path(), "greet", "Hi").starts_with("created greet v0001 "));
        assert!(put_file(&parolo, inputs.path(), "greet", "Hi").starts_with("unchanged greet v0001 "));

        let meta = parolo.prompts().meta("greet", "v0001").unwrap();
        assert_eq!(meta.custom_str("owner"), Some("cli"));
    }

    #[test]
    fn get_versions_and_overview() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let _ = put_file(&parolo, inputs.path(), "greet", "one");
        let _ = put_file(&parolo, inputs.path(), "greet", "two");

        let got = exec(
            &parolo,
            Command::Get {
                name: "greet".into(),
                version: "v0001".into(),
            },
        );
        assert_eq!(got, "one");

        let versions = exec(
            &parolo,
            Command::Versions {
                name: "greet".into(),
                meta: false,
            },
        );
        assert_eq!(versions, "v0001.txt\nv0002.txt\n");

        assert_eq!(exec(&parolo, Command::Overview), "greet: 2\n");
    }

    #[test]
    fn log_of_unknown_prompt() {
        let root = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let text = exec(
            &parolo,
            Command::Log {
                name: "ghost".into(),
                limit: None,
            },
        );
        assert_eq!(text, "No versions found for 'ghost'\n");
    }

    #[test]
    fn format_fills_placeholders() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let _ = put_file(&parolo, inputs.path(), "mail", "Dear {name}");

        let text = exec(
            &parolo,
            Command::Format {
                name: "mail".into(),
                version: "latest".into(),
                vars: vec![("name".into(), Value::from("Ada"))],
            },
        );
        assert_eq!(text, "Dear Ada");
    }

    #[test]
    fn vars_lists_legacy_placeholders() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let _ = put_file(&parolo, inputs.path(), "mail", "Dear {title} {name}, {title}");

        let text = exec(
            &parolo,
            Command::Vars {
                name: "mail".into(),
                legacy: true,
            },
        );
        assert_eq!(text, "title\nname\n");
    }

    #[test]
    fn list_json_is_valid() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let _ = put_file(&parolo, inputs.path(), "a", "A");

        let text = exec(&parolo, Command::List { meta: true, json: true });
        let value: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value[0]["name"], "a");
        assert_eq!(value[0]["latest_version"], "v0001");
    }

    #[test]
    fn render_missing_variable_is_an_error() {
        let root = tempfile::tempdir().unwrap();
        let inputs = tempfile::tempdir().unwrap();
        let parolo = Parolo::open(root.path());
        let _ = put_file(&parolo, inputs.path(), "greet", "Hi {{ who }}");

        let mut buf = Vec::new();
        let err = run(
            &parolo,
            &ParoloSettings::default(),
            Command::Render {
                name: "greet".into(),
                version: None,
                vars: Vec::new(),
            },
            &mut buf,
        )
        .unwrap_err();
        assert!(err.to_string().contains("who"));
    }
}
