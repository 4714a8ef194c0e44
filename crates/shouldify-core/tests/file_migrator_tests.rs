/*!
# FileMigrator Integration Tests

Directory walking, in-place and output-directory writes, backups, dry-run
and check-only modes.
*/

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::TempDir;

use shouldify_core::migrate::file_migrator::backup_path;
use shouldify_core::{FileMigrator, ShouldifyConfig};

const LEGACY: &str = "using NUnit.Framework;\n\nclass A\n{\n    void Check()\n    {\n        Assert.AreEqual(1, total);\n        Assert.IsTrue(done);\n    }\n}\n";
const CONVERTED: &str = "using NUnit.Framework;\nusing Shouldly;\n\nclass A\n{\n    void Check()\n    {\n        total.shouldEqual(1);\n        done.shouldBeTrue();\n    }\n}\n";
const CLEAN: &str = "class B\n{\n    void Check() { }\n}\n";

fn write(dir: &Path, relative: &str, text: &str) -> anyhow::Result<()> {
    let path = dir.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

fn config() -> ShouldifyConfig {
    ShouldifyConfig {
        jobs: 2,
        ..ShouldifyConfig::default()
    }
}

fn fixture() -> anyhow::Result<TempDir> {
    let dir = TempDir::new()?;
    write(dir.path(), "A.cs", LEGACY)?;
    write(dir.path(), "nested/B.cs", CLEAN)?;
    write(dir.path(), "nested/deeper/C.cs", LEGACY)?;
    write(dir.path(), "notes.txt", "Assert.AreEqual(1, total);")?;
    Ok(dir)
}

#[test]
fn test_migrates_directory_in_place_with_backups() -> anyhow::Result<()> {
    let dir = fixture()?;
    let summary = FileMigrator::new(config()).migrate_paths(&[dir.path()])?;

    assert!(summary.success(), "{:?}", summary.errors);
    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.files_changed, 2);
    assert_eq!(summary.findings, 4);
    assert_eq!(summary.rewrites(), 4);

    assert_eq!(fs::read_to_string(dir.path().join("A.cs"))?, CONVERTED);
    assert_eq!(fs::read_to_string(dir.path().join("nested/deeper/C.cs"))?, CONVERTED);
    assert_eq!(fs::read_to_string(dir.path().join("nested/B.cs"))?, CLEAN);
    assert_eq!(fs::read_to_string(backup_path(&dir.path().join("A.cs")))?, LEGACY);
    assert!(!backup_path(&dir.path().join("nested/B.cs")).exists());
    assert_eq!(
        fs::read_to_string(dir.path().join("notes.txt"))?,
        "Assert.AreEqual(1, total);"
    );
    Ok(())
}

#[test]
fn test_reports_are_sorted_with_positions() -> anyhow::Result<()> {
    let dir = fixture()?;
    let summary = FileMigrator::new(config())
        .check_only(true)
        .migrate_paths(&[dir.path()])?;

    let paths: Vec<_> = summary.reports.iter().map(|r| r.path.clone()).collect();
    let mut sorted = paths.clone();
    sorted.sort();
    assert_eq!(paths, sorted);

    let report = summary
        .reports
        .iter()
        .find(|r| r.path.ends_with("A.cs"))
        .expect("report for A.cs");
    assert_eq!(report.positions.len(), 2);
    assert_eq!((report.positions[0].line, report.positions[0].col), (7, 9));
    assert_eq!((report.positions[1].line, report.positions[1].col), (8, 9));
    Ok(())
}

#[test]
fn test_check_only_never_writes() -> anyhow::Result<()> {
    let dir = fixture()?;
    let summary = FileMigrator::new(config())
        .check_only(true)
        .migrate_paths(&[dir.path()])?;

    assert_eq!(summary.findings, 4);
    assert_eq!(summary.files_changed, 0);
    assert_eq!(fs::read_to_string(dir.path().join("A.cs"))?, LEGACY);
    assert!(!backup_path(&dir.path().join("A.cs")).exists());
    Ok(())
}

#[test]
fn test_dry_run_counts_changes_without_writing() -> anyhow::Result<()> {
    let dir = fixture()?;
    let summary = FileMigrator::new(ShouldifyConfig {
        dry_run: true,
        ..config()
    })
    .migrate_paths(&[dir.path()])?;

    assert_eq!(summary.files_changed, 2);
    assert!(summary.reports.iter().all(|r| !r.written));
    assert_eq!(fs::read_to_string(dir.path().join("A.cs"))?, LEGACY);
    Ok(())
}

#[test]
fn test_output_directory_mirrors_structure() -> anyhow::Result<()> {
    let dir = fixture()?;
    let out = TempDir::new()?;
    let summary = FileMigrator::new(config())
        .output_dir(out.path())
        .migrate_paths(&[dir.path()])?;

    assert!(summary.success());
    assert_eq!(fs::read_to_string(out.path().join("A.cs"))?, CONVERTED);
    assert_eq!(fs::read_to_string(out.path().join("nested/deeper/C.cs"))?, CONVERTED);
    // Unchanged files are not copied, originals are untouched.
    assert!(!out.path().join("nested/B.cs").exists());
    assert_eq!(fs::read_to_string(dir.path().join("A.cs"))?, LEGACY);
    assert!(!backup_path(&dir.path().join("A.cs")).exists());
    Ok(())
}

#[test]
fn test_explicit_file_and_missing_path() -> anyhow::Result<()> {
    let dir = fixture()?;
    let file = dir.path().join("A.cs");
    let summary = FileMigrator::new(ShouldifyConfig {
        backup_originals: false,
        ..config()
    })
    .migrate_paths(&[&file])?;

    assert_eq!(summary.files_processed, 1);
    assert!(!backup_path(&file).exists());
    assert!(FileMigrator::new(config())
        .migrate_paths(&[dir.path().join("missing")])
        .is_err());
    Ok(())
}

#[test]
fn test_unreadable_file_is_collected_as_error() -> anyhow::Result<()> {
    let dir = fixture()?;
    // Invalid UTF-8 cannot be read as source text.
    fs::write(dir.path().join("Broken.cs"), [0xff, 0xfe, 0x00, 0x41])?;

    let summary = FileMigrator::new(config()).migrate_paths(&[dir.path()])?;
    assert_eq!(summary.errors.len(), 1);
    assert!(summary.errors[0].contains("Broken.cs"));
    assert_eq!(summary.files_processed, 3);
    Ok(())
}

#[cfg(unix)]
#[test]
fn test_symlinked_directories_are_not_followed() -> anyhow::Result<()> {
    let dir = fixture()?;
    // A link back to the root would otherwise recurse forever.
    std::os::unix::fs::symlink(dir.path(), dir.path().join("nested/loop"))?;

    let summary = FileMigrator::new(config())
        .check_only(true)
        .migrate_paths(&[dir.path()])?;
    assert!(summary.success(), "{:?}", summary.errors);
    assert_eq!(summary.files_processed, 3);
    assert_eq!(summary.findings, 4);
    Ok(())
}
