/*!
# FileMigrator - File-based Migration

Walks files and directories, migrates every C# source it finds and writes
the result in place or under an output directory. Files are processed by a
fixed pool of worker threads fed through a channel; each worker owns its
own parser.
*/

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::thread;

use anyhow::{anyhow, Context, Result};
use crossbeam_channel::unbounded;
use tracing::{debug, info, warn};

use super::migrator::Migrator;
use super::patterns::Finding;
use super::rules::RuleStats;
use crate::catalog::{Catalog, ShapeKey};
use crate::syntax::{CSharpParser, LineCol, LineIndex};
use crate::ShouldifyConfig;

/// Result of migrating one file.
#[derive(Debug, Clone)]
pub struct FileReport {
    pub path: PathBuf,
    pub findings: Vec<Finding>,
    /// Start position of each finding, parallel to `findings`.
    pub positions: Vec<LineCol>,
    pub changed: bool,
    pub written: bool,
    pub has_parse_errors: bool,
    pub stats: BTreeMap<ShapeKey, RuleStats>,
}

/// Summary of a migration run.
#[derive(Debug, Default)]
pub struct MigrationSummary {
    pub files_processed: u64,
    pub files_changed: u64,
    pub findings: u64,
    pub errors: Vec<String>,
    pub reports: Vec<FileReport>,
    pub stats: BTreeMap<ShapeKey, RuleStats>,
}

impl MigrationSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, report: FileReport) {
        self.files_processed += 1;
        if report.changed {
            self.files_changed += 1;
        }
        self.findings += report.findings.len() as u64;
        for (shape, stats) in &report.stats {
            self.stats
                .entry(*shape)
                .or_insert_with(|| RuleStats::new(shape.to_string()))
                .merge(stats);
        }
        self.reports.push(report);
    }

    pub fn merge(&mut self, other: MigrationSummary) {
        self.errors.extend(other.errors);
        for report in other.reports {
            self.record(report);
        }
    }

    pub fn rewrites(&self) -> u64 {
        self.stats.values().map(|s| s.rewrites).sum()
    }

    /// Findings whose rewrite failed and were left as written.
    pub fn unconverted(&self) -> u64 {
        self.stats.values().map(|s| s.errors).sum()
    }

    pub fn success_rate(&self) -> f64 {
        if self.findings == 0 {
            0.0
        } else {
            self.rewrites() as f64 / self.findings as f64
        }
    }

    pub fn success(&self) -> bool {
        self.errors.is_empty()
    }
}

/// A file to migrate and where its output goes.
#[derive(Debug, Clone)]
struct Job {
    source: PathBuf,
    destination: PathBuf,
}

pub struct FileMigrator {
    config: ShouldifyConfig,
    output_dir: Option<PathBuf>,
    check_only: bool,
}

impl FileMigrator {
    pub fn new(config: ShouldifyConfig) -> Self {
        Self {
            config,
            output_dir: None,
            check_only: false,
        }
    }

    /// Write results under `dir`, mirroring each input root's structure,
    /// instead of in place.
    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    /// Only report findings; never rewrite.
    pub fn check_only(mut self, check_only: bool) -> Self {
        self.check_only = check_only;
        self
    }

    pub fn config(&self) -> &ShouldifyConfig {
        &self.config
    }

    /// Migrates every matching file under `paths`. Per-file failures are
    /// collected in the summary.
    pub fn migrate_paths<P: AsRef<Path>>(&self, paths: &[P]) -> Result<MigrationSummary> {
        let mut jobs = Vec::new();
        for path in paths {
            let path = path.as_ref();
            if !path.exists() {
                return Err(anyhow!("Path does not exist: {}", path.display()));
            }
            self.collect_jobs(path, path, &mut jobs)?;
        }
        info!("Migrating {} file(s) with {} worker(s)", jobs.len(), self.worker_count(jobs.len()));

        let mut summary = self.run_jobs(jobs);
        summary.reports.sort_by(|a, b| a.path.cmp(&b.path));
        summary.errors.sort();

        info!(
            "Processed {} file(s): {} finding(s), {} changed, {} error(s)",
            summary.files_processed,
            summary.findings,
            summary.files_changed,
            summary.errors.len()
        );
        Ok(summary)
    }

    fn worker_count(&self, jobs: usize) -> usize {
        self.config.jobs.max(1).min(jobs.max(1))
    }

    fn run_jobs(&self, jobs: Vec<Job>) -> MigrationSummary {
        let workers = self.worker_count(jobs.len());
        let (job_tx, job_rx) = unbounded::<Job>();
        let (result_tx, result_rx) = unbounded::<(PathBuf, Result<FileReport>)>();

        for job in jobs {
            // The receiver is alive until the scope below ends.
            let _ = job_tx.send(job);
        }
        drop(job_tx);

        thread::scope(|scope| {
            for _ in 0..workers {
                let job_rx = job_rx.clone();
                let result_tx = result_tx.clone();
                scope.spawn(move || {
                    let mut parser = match CSharpParser::new() {
                        Ok(parser) => parser,
                        Err(e) => {
                            for job in job_rx.iter() {
                                let _ = result_tx.send((job.source, Err(anyhow!("{e}"))));
                            }
                            return;
                        }
                    };
                    let migrator = Migrator::from_config(Catalog::global(), &self.config);
                    for job in job_rx.iter() {
                        let report = self.migrate_file(&mut parser, &migrator, &job);
                        let _ = result_tx.send((job.source, report));
                    }
                });
            }
        });
        drop(result_tx);

        let mut summary = MigrationSummary::new();
        for (path, result) in result_rx.iter() {
            match result {
                Ok(report) => summary.record(report),
                Err(e) => {
                    warn!("Failed to migrate {}: {:#}", path.display(), e);
                    summary.errors.push(format!("Error processing {}: {:#}", path.display(), e));
                }
            }
        }
        summary
    }

    fn migrate_file(
        &self,
        parser: &mut CSharpParser,
        migrator: &Migrator<'_>,
        job: &Job,
    ) -> Result<FileReport> {
        let source = fs::read_to_string(&job.source)
            .with_context(|| format!("reading {}", job.source.display()))?;

        let (findings, output, has_parse_errors, stats) = if self.check_only {
            let file = parser.parse(&source)?;
            let findings: Vec<Finding> = migrator.scan(&file.root).collect();
            (findings, None, file.has_errors, BTreeMap::new())
        } else {
            let migrated = migrator.migrate_source(parser, &source)?;
            let output = migrated.changed().then_some(migrated.output);
            (migrated.findings, output, migrated.has_parse_errors, migrated.stats)
        };

        if has_parse_errors {
            warn!("{} contains syntax errors", job.source.display());
        }

        let index = LineIndex::new(&source);
        let positions = findings.iter().map(|f| index.line_col(f.span.start)).collect();
        for finding in &findings {
            debug!("{}: {} [{}]", job.source.display(), finding.message(), finding.shape);
        }

        let changed = output.is_some();
        let mut written = false;
        if let Some(output) = output {
            if !self.config.dry_run {
                self.write_output(job, &output)?;
                written = true;
            }
        }

        Ok(FileReport {
            path: job.source.clone(),
            findings,
            positions,
            changed,
            written,
            has_parse_errors,
            stats,
        })
    }

    fn write_output(&self, job: &Job, output: &str) -> Result<()> {
        let in_place = job.destination == job.source;
        if in_place && self.config.backup_originals {
            let backup = backup_path(&job.source);
            fs::copy(&job.source, &backup)
                .with_context(|| format!("backing up {}", job.source.display()))?;
        }
        if let Some(parent) = job.destination.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&job.destination, output)
            .with_context(|| format!("writing {}", job.destination.display()))?;
        info!("Wrote {}", job.destination.display());
        Ok(())
    }

    /// Symlinked directories below `root` are skipped; following them could
    /// loop forever.
    fn collect_jobs(&self, root: &Path, path: &Path, jobs: &mut Vec<Job>) -> Result<()> {
        if path != root && path.is_dir() && fs::symlink_metadata(path)?.file_type().is_symlink() {
            debug!("Skipping symlinked directory {}", path.display());
            return Ok(());
        }
        if path.is_dir() {
            let mut entries = fs::read_dir(path)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<std::io::Result<Vec<_>>>()?;
            entries.sort();
            for entry in entries {
                self.collect_jobs(root, &entry, jobs)?;
            }
        } else if path == root || self.should_process_file(path) {
            jobs.push(Job {
                source: path.to_path_buf(),
                destination: self.destination_for(root, path)?,
            });
        }
        Ok(())
    }

    fn destination_for(&self, root: &Path, path: &Path) -> Result<PathBuf> {
        let Some(output_dir) = &self.output_dir else {
            return Ok(path.to_path_buf());
        };
        let relative = if path == root {
            let name = path
                .file_name()
                .ok_or_else(|| anyhow!("no file name: {}", path.display()))?;
            PathBuf::from(name)
        } else {
            path.strip_prefix(root)?.to_path_buf()
        };
        Ok(output_dir.join(relative))
    }

    /// Check if a file should be processed based on its extension
    fn should_process_file(&self, path: &Path) -> bool {
        if let Some(extension) = path.extension() {
            let ext_str = extension.to_string_lossy().to_lowercase();
            self.config
                .source_extensions
                .iter()
                .any(|ext| ext.trim_start_matches('.').to_lowercase() == ext_str)
        } else {
            false
        }
    }
}

/// `Foo.cs` -> `Foo.cs.bak`.
pub fn backup_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(".bak");
    PathBuf::from(name)
}
