//! # Shouldify Core
//!
//! Conversion engine that rewrites legacy NUnit assertions into a fluent
//! assertion vocabulary, including:
//! - A lossless, immutable C# syntax tree built on tree-sitter
//! - The shape catalog of recognized assertion calls
//! - Matcher, rewriter and tree editor
//! - Single-fix, fix-all and file-level entry points
//!
//! This crate provides the components that host front ends (the command
//! line tool, editor integrations, batch runners) build on.

#![warn(clippy::all)]

use std::path::Path;

use serde::{Deserialize, Serialize};

pub mod catalog;
pub mod migrate;
pub mod syntax;

// Re-export commonly used types
pub use catalog::{Catalog, CatalogError, ShapeKey, TargetVerb, Vocabulary};
pub use migrate::{
    EditError, FileMigrator, Finding, Matcher, MigrationSummary, Migrator, RewriteError, Rewriter,
    SourceMigration,
};
pub use syntax::{CSharpParser, ParseError, SourceFile, SyntaxNode};

/// Shouldify version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Namespace imported by converted files unless configured otherwise.
pub const DEFAULT_IMPORT_NAMESPACE: &str = "Shouldly";

/// Initialize tracing for Shouldify components
pub fn init_tracing() {
    init_tracing_with("shouldify_core=info");
}

/// Initialize tracing with `directive` as the default filter. `RUST_LOG`
/// takes precedence when set.
pub fn init_tracing_with(directive: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(directive));
    // A subscriber may already be installed by the host.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Migration configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShouldifyConfig {
    /// Target vocabulary spelling
    pub vocabulary: Vocabulary,
    /// Namespace added as a using directive to converted files
    pub import_namespace: String,
    /// File extensions processed when walking directories
    pub source_extensions: Vec<String>,
    /// Keep a `.bak` copy of files rewritten in place
    pub backup_originals: bool,
    /// Compute results without writing files
    pub dry_run: bool,
    /// Worker threads used by the file driver
    pub jobs: usize,
}

impl Default for ShouldifyConfig {
    fn default() -> Self {
        Self {
            vocabulary: Vocabulary::default(),
            import_namespace: DEFAULT_IMPORT_NAMESPACE.to_string(),
            source_extensions: vec!["cs".to_string()],
            backup_originals: true,
            dry_run: false,
            jobs: std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
        }
    }
}

impl ShouldifyConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ShouldifyError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&text)
    }

    fn validate(&self) -> Result<()> {
        if self.import_namespace.trim().is_empty() {
            return Err(ShouldifyError::Config("import_namespace must not be empty".to_string()));
        }
        if self.source_extensions.is_empty() {
            return Err(ShouldifyError::Config(
                "source_extensions must name at least one extension".to_string(),
            ));
        }
        Ok(())
    }
}

/// Error types for Shouldify core operations
#[derive(thiserror::Error, Debug)]
pub enum ShouldifyError {
    /// Parser setup or parse failure
    #[error("Parse error: {0}")]
    Parse(#[from] ParseError),

    /// Invalid shape catalog
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// Replacement construction failed
    #[error("Rewrite error: {0}")]
    Rewrite(#[from] RewriteError),

    /// Tree edit failed
    #[error("Edit error: {0}")]
    Edit(#[from] EditError),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type for Shouldify core operations
pub type Result<T> = std::result::Result<T, ShouldifyError>;
