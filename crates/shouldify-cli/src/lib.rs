//! Shouldify command-line front end
//!
//! Converts NUnit `Assert` calls in C# files and directories to a fluent
//! assertion vocabulary, or reports them with `--check`.

pub mod options;
pub mod report;

use std::io::Write;

use anyhow::Result;
use shouldify_core::FileMigrator;
use tracing::info;

pub use options::{command, Options};

/// Runs a conversion, writes its report to `out` and returns the process
/// exit code: 1 when `--check` found convertible assertions or some file
/// failed to convert.
pub fn run(options: &Options, out: &mut impl Write) -> Result<u8> {
    let config = options.resolve_config()?;
    info!(
        vocabulary = %config.vocabulary,
        jobs = config.jobs,
        check = options.check,
        "Starting conversion"
    );

    let mut migrator = FileMigrator::new(config).check_only(options.check);
    if let Some(dir) = &options.output {
        migrator = migrator.output_dir(dir);
    }
    let summary = migrator.migrate_paths(&options.paths)?;

    report::write_report(out, &summary, options.check)?;

    let failed = !summary.success() || (options.check && summary.findings > 0);
    Ok(u8::from(failed))
}
