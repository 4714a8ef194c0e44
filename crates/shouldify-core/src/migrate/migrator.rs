/*!
# Migrator

Entry points offered to hosts: scan a tree for findings, fix one finding,
fix all findings in one pass, or run the whole parse/scan/fix/render cycle
over a source string.
*/

use std::collections::{BTreeMap, HashMap, HashSet};

use tracing::{debug, warn};

use super::editor::{self, EditError, Replacement};
use super::patterns::{Finding, MatchedCall, Matcher, Scan};
use super::rewriter::{NameScope, Rewriter};
use super::rules::RuleStats;
use crate::catalog::{Catalog, ShapeKey, Vocabulary};
use crate::syntax::{CSharpParser, NodeId, SyntaxNode};
use crate::{Result, ShouldifyConfig, ShouldifyError};

/// Outcome of migrating one source text.
#[derive(Debug, Clone)]
pub struct SourceMigration {
    pub findings: Vec<Finding>,
    pub output: String,
    pub has_parse_errors: bool,
    pub stats: BTreeMap<ShapeKey, RuleStats>,
}

impl SourceMigration {
    /// Whether any call was rewritten.
    pub fn changed(&self) -> bool {
        self.stats.values().any(|s| s.rewrites > 0)
    }

    pub fn rewrites(&self) -> u64 {
        self.stats.values().map(|s| s.rewrites).sum()
    }

    pub fn errors(&self) -> u64 {
        self.stats.values().map(|s| s.errors).sum()
    }
}

pub struct Migrator<'c> {
    matcher: Matcher<'c>,
    rewriter: Rewriter,
    import_namespace: String,
}

impl Default for Migrator<'static> {
    fn default() -> Self {
        Self::new(Catalog::global())
    }
}

impl<'c> Migrator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self {
            matcher: Matcher::new(catalog),
            rewriter: Rewriter::default(),
            import_namespace: crate::DEFAULT_IMPORT_NAMESPACE.to_string(),
        }
    }

    pub fn from_config(catalog: &'c Catalog, config: &ShouldifyConfig) -> Self {
        Self::new(catalog)
            .with_vocabulary(config.vocabulary)
            .with_import(config.import_namespace.clone())
    }

    pub fn with_vocabulary(mut self, vocabulary: Vocabulary) -> Self {
        self.rewriter = Rewriter::new(vocabulary);
        self
    }

    pub fn with_import(mut self, namespace: impl Into<String>) -> Self {
        self.import_namespace = namespace.into();
        self
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.rewriter.vocabulary()
    }

    pub fn scan(&self, root: &SyntaxNode) -> Scan<'c> {
        self.matcher.scan(root)
    }

    /// Rewrites the single call `finding` points at.
    pub fn fix_one(&self, root: &SyntaxNode, finding: &Finding) -> Result<SyntaxNode> {
        let located = editor::locate(root, finding.span)?;
        let expression = self.rewrite_call(located.invocation(), finding, located.ancestors())?;

        let replacement = Replacement::for_target(expression, &located);
        let edited = editor::apply(root, finding.span, &replacement)?;
        debug!("Rewrote {} at {}", finding.shape, finding.span);
        Ok(editor::ensure_import(&edited, &self.import_namespace))
    }

    /// Rewrites every finding in one pass. Targets are resolved to node
    /// identities up front, so rewriting one never moves another. Fails on
    /// the first finding that no longer matches the tree.
    pub fn fix_all(&self, root: &SyntaxNode, findings: &[Finding]) -> Result<SyntaxNode> {
        if findings.is_empty() {
            return Ok(root.clone());
        }

        let mut expected: HashMap<NodeId, Finding> = HashMap::with_capacity(findings.len());
        for finding in findings {
            let located = editor::locate(root, finding.span)?;
            expected.insert(located.invocation().id(), *finding);
        }
        let targets: HashSet<NodeId> = expected.keys().copied().collect();

        let edited = editor::rewrite_all(root, &targets, |original, node, ancestors| {
            let finding = &expected[&original.id()];
            let expression = self.rewrite_call(node, finding, ancestors)?;
            debug!("Rewrote {} at {}", finding.shape, finding.span);
            Ok::<_, ShouldifyError>(expression.with_trivia_of(node))
        })?;

        Ok(editor::ensure_import(&edited, &self.import_namespace))
    }

    /// Like [`Migrator::fix_all`], but a finding that cannot be rewritten is
    /// counted as an error for its shape and its call is left as written.
    /// The import is only added when at least one call was rewritten.
    pub fn fix_all_with_stats(
        &self,
        root: &SyntaxNode,
        findings: &[Finding],
    ) -> Result<(SyntaxNode, BTreeMap<ShapeKey, RuleStats>)> {
        let mut stats: BTreeMap<ShapeKey, RuleStats> = BTreeMap::new();
        let mut expected: HashMap<NodeId, Finding> = HashMap::with_capacity(findings.len());
        for finding in findings {
            stats_for(&mut stats, finding.shape).findings += 1;
            match editor::locate(root, finding.span) {
                Ok(located) => {
                    expected.insert(located.invocation().id(), *finding);
                }
                Err(e) => {
                    warn!("Skipping {}: {}", finding.shape, e);
                    stats_for(&mut stats, finding.shape).errors += 1;
                }
            }
        }
        let targets: HashSet<NodeId> = expected.keys().copied().collect();

        let edited = editor::rewrite_all(root, &targets, |original, node, ancestors| {
            let finding = &expected[&original.id()];
            let entry = stats_for(&mut stats, finding.shape);
            match self.rewrite_call(node, finding, ancestors) {
                Ok(expression) => {
                    entry.rewrites += 1;
                    debug!("Rewrote {} at {}", finding.shape, finding.span);
                    Ok::<_, ShouldifyError>(expression.with_trivia_of(node))
                }
                Err(e) => {
                    entry.errors += 1;
                    warn!("Left {} at {} unchanged: {}", finding.shape, finding.span, e);
                    Ok(node.clone())
                }
            }
        })?;

        let rewritten = stats.values().any(|s| s.rewrites > 0);
        let root = if rewritten {
            editor::ensure_import(&edited, &self.import_namespace)
        } else {
            edited
        };
        Ok((root, stats))
    }

    /// Parses, scans, fixes everything and renders `source`.
    pub fn migrate_source(
        &self,
        parser: &mut CSharpParser,
        source: &str,
    ) -> Result<SourceMigration> {
        let file = parser.parse(source)?;
        if file.has_errors {
            warn!("Source has syntax errors; converting recognizable calls only");
        }

        let findings: Vec<Finding> = self.scan(&file.root).collect();
        let (root, stats) = self.fix_all_with_stats(&file.root, &findings)?;

        Ok(SourceMigration {
            findings,
            output: root.text(),
            has_parse_errors: file.has_errors,
            stats,
        })
    }

    /// Re-classifies `node` against `finding` and builds its replacement.
    fn rewrite_call(
        &self,
        node: &SyntaxNode,
        finding: &Finding,
        ancestors: &[SyntaxNode],
    ) -> Result<SyntaxNode> {
        let call = self.classify_expected(node, finding)?;
        // Collecting a scope walks the enclosing member; only synthesized
        // predicates read it.
        let scope = if call.shape.rule.synthesizes_predicate() {
            NameScope::enclosing(ancestors)
        } else {
            NameScope::empty()
        };
        Ok(self.rewriter.build(&call, &scope)?)
    }

    fn classify_expected(&self, node: &SyntaxNode, finding: &Finding) -> Result<MatchedCall<'c>> {
        match self.matcher.classify(node) {
            Some(call) if call.shape.key == finding.shape => Ok(call),
            _ => Err(EditError::ShapeChanged {
                location: finding.span,
                expected: finding.shape.to_string(),
            }
            .into()),
        }
    }
}

fn stats_for(stats: &mut BTreeMap<ShapeKey, RuleStats>, shape: ShapeKey) -> &mut RuleStats {
    stats
        .entry(shape)
        .or_insert_with(|| RuleStats::new(shape.to_string()))
}
