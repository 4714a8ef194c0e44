//! Command-line options
//!
//! Flags are layered over an optional JSON configuration file: a value given
//! on the command line always wins over the file, and the file wins over the
//! built-in defaults.

use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use shouldify_core::{ShouldifyConfig, Vocabulary};

/// Parsed command-line options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub paths: Vec<PathBuf>,
    pub check: bool,
    pub dry_run: bool,
    pub vocabulary: Option<Vocabulary>,
    pub import: Option<String>,
    pub config: Option<PathBuf>,
    pub jobs: Option<usize>,
    pub no_backup: bool,
    pub output: Option<PathBuf>,
    pub debug: bool,
}

pub fn command() -> Command {
    Command::new("shouldify")
        .version(shouldify_core::VERSION)
        .about("Convert NUnit Assert calls in C# sources to fluent assertions")
        .arg(
            Arg::new("paths")
                .value_name("PATH")
                .help("Files or directories to convert")
                .required(true)
                .num_args(1..)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Report findings without rewriting; exit with 1 when any are found")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Convert without writing any file")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("vocabulary")
                .long("vocabulary")
                .value_name("NAME")
                .help("Target assertion spelling: fluent or shouldly"),
        )
        .arg(
            Arg::new("import")
                .long("import")
                .value_name("NS")
                .help("Namespace to import in converted files"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_name("FILE")
                .help("JSON configuration file")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("jobs")
                .long("jobs")
                .short('j')
                .value_name("N")
                .help("Number of worker threads")
                .value_parser(value_parser!(usize)),
        )
        .arg(
            Arg::new("no-backup")
                .long("no-backup")
                .help("Do not keep .bak copies of rewritten files")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("output")
                .long("output")
                .short('o')
                .value_name("DIR")
                .help("Write converted files under DIR instead of in place")
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .help("Enable debug logging")
                .action(ArgAction::SetTrue),
        )
}

impl Options {
    pub fn from_matches(matches: &ArgMatches) -> Result<Self> {
        let vocabulary = matches
            .get_one::<String>("vocabulary")
            .map(|name| name.parse::<Vocabulary>())
            .transpose()
            .map_err(|e| anyhow!(e))?;

        Ok(Self {
            paths: matches
                .get_many::<PathBuf>("paths")
                .map(|paths| paths.cloned().collect())
                .unwrap_or_default(),
            check: matches.get_flag("check"),
            dry_run: matches.get_flag("dry-run"),
            vocabulary,
            import: matches.get_one::<String>("import").cloned(),
            config: matches.get_one::<PathBuf>("config").cloned(),
            jobs: matches.get_one::<usize>("jobs").copied(),
            no_backup: matches.get_flag("no-backup"),
            output: matches.get_one::<PathBuf>("output").cloned(),
            debug: matches.get_flag("debug"),
        })
    }

    /// Parses `args`, the first of which is the binary name.
    pub fn parse_from<I, T>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let matches = command().try_get_matches_from(args)?;
        Self::from_matches(&matches)
    }

    /// The effective configuration: defaults, then the config file, then
    /// command-line flags.
    pub fn resolve_config(&self) -> Result<ShouldifyConfig> {
        let mut config = match &self.config {
            Some(path) => ShouldifyConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => ShouldifyConfig::default(),
        };

        if let Some(vocabulary) = self.vocabulary {
            config.vocabulary = vocabulary;
        }
        if let Some(import) = &self.import {
            if import.trim().is_empty() {
                return Err(anyhow!("--import must name a namespace"));
            }
            config.import_namespace = import.clone();
        }
        if let Some(jobs) = self.jobs {
            if jobs == 0 {
                return Err(anyhow!("--jobs must be at least 1"));
            }
            config.jobs = jobs;
        }
        if self.no_backup {
            config.backup_originals = false;
        }
        if self.dry_run {
            config.dry_run = true;
        }
        Ok(config)
    }
}
