//! # parolo
//!
//! Command-line access to a Parolo prompt store.

#![deny(unsafe_code)]

mod commands;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;

/// Versioned prompt store.
#[derive(Parser, Debug)]
#[command(name = "parolo", version, about = "Versioned prompt store")]
struct Cli {
    /// Store root (overrides `PAROLO_HOME` and settings).
    #[arg(long, global = true)]
    home: Option<PathBuf>,

    /// Log level for stderr output (overrides settings; `RUST_LOG` wins).
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Save a prompt, minting a version if the content changed.
    Put {
        /// Prompt name.
        name: String,
        /// Read the text from this file instead of stdin.
        #[arg(long)]
        file: Option<PathBuf>,
        /// Custom metadata entry (`key=value`, value parsed as JSON if valid).
        #[arg(long = "meta", value_parser = parse_pair)]
        meta: Vec<(String, Value)>,
    },
    /// Print the current text, or one version.
    Get {
        /// Prompt name.
        name: String,
        /// Version id (`v0001`, `1`) or `latest`.
        #[arg(long, default_value = "latest")]
        version: String,
    },
    /// List a prompt's versions.
    Versions {
        /// Prompt name.
        name: String,
        /// Include timestamp and hash.
        #[arg(long)]
        meta: bool,
    },
    /// Show recent version history, newest first.
    Log {
        /// Prompt name.
        name: String,
        /// Number of versions (defaults to `history.defaultLimit`).
        #[arg(long, short = 'n')]
        limit: Option<usize>,
    },
    /// Show the metadata of one version.
    Info {
        /// Prompt name.
        name: String,
        /// Version id.
        version: String,
    },
    /// List every prompt in the store.
    List {
        /// Include details of each prompt's newest version.
        #[arg(long)]
        meta: bool,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Version count per prompt.
    Overview,
    /// Render a prompt as a strict template.
    Render {
        /// Prompt name.
        name: String,
        /// Version id; the current text when omitted.
        #[arg(long)]
        version: Option<String>,
        /// Template variable (`key=value`, value parsed as JSON if valid).
        #[arg(long = "var", value_parser = parse_pair)]
        vars: Vec<(String, Value)>,
    },
    /// Fill `{name}` placeholders.
    Format {
        /// Prompt name.
        name: String,
        /// Version id or `latest`.
        #[arg(long, default_value = "latest")]
        version: String,
        /// Placeholder value (`key=value`).
        #[arg(long = "var", value_parser = parse_pair)]
        vars: Vec<(String, Value)>,
    },
    /// List the template variables a prompt references.
    Vars {
        /// Prompt name.
        name: String,
        /// List `{name}` placeholders instead of template variables.
        #[arg(long)]
        legacy: bool,
    },
    /// Print the change token of a prompt.
    Token {
        /// Prompt name.
        name: String,
    },
}

/// Parse `key=value`; the value is JSON when it parses as JSON, else a string.
fn parse_pair(raw: &str) -> std::result::Result<(String, Value), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got {raw:?}"))?;
    if key.is_empty() {
        return Err(format!("empty key in {raw:?}"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_owned()));
    Ok((key.to_owned(), value))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings = parolo_settings::get_settings().clone();
    if let Some(home) = &cli.home {
        settings.base_dir = Some(home.to_string_lossy().into_owned());
    }
    if let Some(level) = &cli.log_level {
        settings.logging.level.clone_from(level);
    }
    parolo_core::logging::init_subscriber(&settings.logging.level);

    let parolo = parolo::Parolo::from_settings(&settings);
    tracing::debug!(base_dir = %parolo.store().base_dir().display(), "store opened");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    commands::run(&parolo, &settings, cli.command, &mut out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_pair_prefers_json() {
        assert_eq!(parse_pair("n=3").unwrap(), ("n".into(), Value::from(3)));
        assert_eq!(parse_pair("flag=true").unwrap().1, Value::Bool(true));
        assert_eq!(
            parse_pair("name=Ada Lovelace").unwrap().1,
            Value::from("Ada Lovelace")
        );
        assert_eq!(parse_pair("eq=a=b").unwrap().1, Value::from("a=b"));
    }

    #[test]
    fn parse_pair_rejects_malformed() {
        assert!(parse_pair("novalue").is_err());
        assert!(parse_pair("=x").is_err());
    }

    #[test]
    fn cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "parolo", "render", "greet", "--var", "name=Ada", "--home", "/tmp/p",
        ])
        .unwrap();
        assert_eq!(cli.home, Some(PathBuf::from("/tmp/p")));
        match cli.command {
            Command::Render { name, vars, version } => {
                assert_eq!(name, "greet");
                assert_eq!(vars, [("name".to_string(), Value::from("Ada"))]);
                assert!(version.is_none());
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
