/*!
# Assertion Migration

Recognizes legacy NUnit assertion calls and rewrites them into a fluent
assertion vocabulary.

## Architecture

- `patterns`: the `Matcher`, classifying invocations against the catalog and
  emitting `Finding`s
- `rules`: declarative `RewriteRule`s, captured operands and per-shape stats
- `rewriter`: builds the replacement expression for a matched call
- `editor`: splices replacements into the immutable tree and ensures the
  using directive
- `migrator`: host entry points (scan, fix one, fix all, migrate source)
- `file_migrator`: walks directories and migrates files on worker threads

## Example Usage

```rust,no_run
use shouldify_core::migrate::Migrator;
use shouldify_core::syntax::CSharpParser;

let mut parser = CSharpParser::new()?;
let migrated = Migrator::default().migrate_source(
    &mut parser,
    "class T { void M() { Assert.AreEqual(1337, contestant); } }",
)?;
assert!(migrated.output.contains("contestant.shouldEqual(1337)"));
# Ok::<(), shouldify_core::ShouldifyError>(())
```
*/

pub mod editor;
pub mod file_migrator;
pub mod migrator;
pub mod patterns;
pub mod rewriter;
pub mod rules;

pub use editor::{ensure_import, EditError, Replacement};
pub use file_migrator::{FileMigrator, FileReport, MigrationSummary};
pub use migrator::{Migrator, SourceMigration};
pub use patterns::{Finding, MatchedCall, Matcher, DIAGNOSTIC_ID};
pub use rewriter::{NameScope, RewriteError, Rewriter};
pub use rules::{Captures, Operand, RewriteRule, RuleStats, TargetArg};
