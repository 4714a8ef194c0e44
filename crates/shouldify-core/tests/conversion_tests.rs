/*!
# Conversion Integration Tests

End-to-end conversions of legacy assertions through the `Migrator` entry
points: fix-all, single fix, trivia and import handling.
*/

use pretty_assertions::assert_eq;

use shouldify_core::migrate::{EditError, Finding, Migrator};
use shouldify_core::syntax::{has_syntax_errors, CSharpParser, TextRange};
use shouldify_core::{ShouldifyError, Vocabulary};

const INDENT: &str = "            ";

/// A test class whose single test method holds `statements`, one per line.
fn test_file(usings: &str, statements: &[&str]) -> String {
    let body = statements
        .iter()
        .map(|s| format!("{INDENT}{s}\n"))
        .collect::<String>();
    format!(
        "{usings}\nnamespace Tests\n{{\n    public class ContestantTests\n    {{\n        [Test]\n        public void Check()\n        {{\n{body}        }}\n    }}\n}}\n"
    )
}

fn migrate(vocabulary: Vocabulary, source: &str) -> anyhow::Result<String> {
    let mut parser = CSharpParser::new()?;
    let migrated = Migrator::default()
        .with_vocabulary(vocabulary)
        .migrate_source(&mut parser, source)?;
    Ok(migrated.output)
}

fn assert_converts(
    vocabulary: Vocabulary,
    legacy: &[&str],
    converted: &[&str],
) -> anyhow::Result<()> {
    let source = test_file("using NUnit.Framework;\n", legacy);
    let expected = test_file("using NUnit.Framework;\nusing Shouldly;\n", converted);
    assert_eq!(migrate(vocabulary, &source)?, expected);
    Ok(())
}

#[test]
fn test_converts_direct_equality() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["Assert.AreEqual(1337, contestant);"],
        &["contestant.shouldEqual(1337);"],
    )
}

#[test]
fn test_converts_negated_constraint() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["Assert.That(contestant, Is.Not.EqualTo(1336));"],
        &["contestant.shouldNotEqual(1336);"],
    )
}

#[test]
fn test_parenthesizes_comparison_receiver() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["Assert.IsTrue(i == 0);"],
        &["(i == 0).shouldBeTrue();"],
    )
}

#[test]
fn test_converts_equivalence_with_ignore_order() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["CollectionAssert.AreEquivalent(expected, actual);"],
        &["actual.shouldEqual(expected, ignoreOrder: true);"],
    )
}

#[test]
fn test_converts_throws_to_static_receiver() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["Assert.Throws<ArgumentException>(() => f());"],
        &["should.throw<ArgumentException>(() => f());"],
    )
}

#[test]
fn test_converts_member_access_constraint() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &["Assert.That(contestants, Is.Empty);", "Assert.That(names, Is.Unique);"],
        &["contestants.shouldBeEmpty();", "names.shouldBeUnique();"],
    )
}

#[test]
fn test_converts_shouldly_vocabulary() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Shouldly,
        &[
            "Assert.IsTrue(contestant > 1000);",
            "Assert.IsInstanceOf<string>(contestant);",
            "CollectionAssert.AllItemsAreInstancesOfType(collection, typeof(string));",
            "CollectionAssert.AllItemsAreNotNull(collection);",
            "Assert.IsNaN(contestant);",
            "CollectionAssert.AreEquivalent(expected, actual);",
            "Assert.That(contestant, Has.No.Member(13));",
            "StringAssert.StartsWith(\"Mr\", name);",
        ],
        &[
            "(contestant > 1000).ShouldBeTrue();",
            "contestant.ShouldBeOfType<string>();",
            "collection.ShouldAllBe(item => item is string);",
            "collection.ShouldNotContain(item => item == null);",
            "double.IsNaN(contestant).ShouldBeTrue();",
            "actual.ShouldBe(expected, ignoreOrder: true);",
            "contestant.ShouldNotContain(13);",
            "name.ShouldStartWith(\"Mr\");",
        ],
    )
}

#[test]
fn test_converts_typeof_forms() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Shouldly,
        &[
            "Assert.IsInstanceOf(typeof(Widget), result);",
            "Assert.That(result, Is.TypeOf(typeof(Widget)));",
            "Assert.That(result, Is.Not.TypeOf<Gadget>());",
        ],
        &[
            "result.ShouldBeOfType<Widget>();",
            "result.ShouldBeOfType<Widget>();",
            "result.ShouldNotBeOfType<Gadget>();",
        ],
    )
}

#[test]
fn test_resolves_classic_and_qualified_receivers() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &[
            "ClassicAssert.IsNotNull(result);",
            "NUnit.Framework.Assert.Greater(score, 10);",
        ],
        &["result.shouldNotBeNull();", "score.shouldBeGreaterThan(10);"],
    )
}

#[test]
fn test_preserves_comments_and_operand_text() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Fluent,
        &[
            "// the answer",
            "Assert.AreEqual(Compute( 6 ,7 ), answer); // checked",
        ],
        &[
            "// the answer",
            "answer.shouldEqual(Compute( 6 ,7 )); // checked",
        ],
    )
}

#[test]
fn test_leaves_unconvertible_calls_untouched() -> anyhow::Result<()> {
    let source = test_file(
        "using NUnit.Framework;\n",
        &[
            "Assert.AreEqual(1, x, \"with message\");",
            "Assert.AreEqual(expected: 1, actual: x);",
            "Assert.That(flag, Is.Not.True);",
            "Assert.That(value, Is.EqualTo(1.0).Within(0.1));",
            "Assert.That(value, Is.Not.Not.Null);",
            "Assert.That(list, Has.Count.EqualTo(3));",
            "Assert.That(text, Has.Length.EqualTo(2));",
            "Assert.That(list, Has.Some.EqualTo(1));",
            "Assert.That(() => f(), Throws.TypeOf<E>());",
            "Assert.That(list, Is.All.Not.Null);",
            "Verify.AreEqual(1, x);",
        ],
    );
    assert_eq!(migrate(Vocabulary::Fluent, &source)?, source);
    Ok(())
}

#[test]
fn test_composes_nested_rewrites() -> anyhow::Result<()> {
    assert_converts(
        Vocabulary::Shouldly,
        &["Assert.Throws<InvalidOperationException>(() => Assert.AreEqual(1, Run()));"],
        &["Should.Throw<InvalidOperationException>(() => Run().ShouldBe(1));"],
    )
}

#[test]
fn test_expression_bodied_member_falls_back_to_invocation() -> anyhow::Result<()> {
    let source = "using NUnit.Framework;\nclass T\n{\n    void Check() => Assert.IsTrue(ok);\n}\n";
    assert_eq!(
        migrate(Vocabulary::Fluent, source)?,
        "using NUnit.Framework;\nusing Shouldly;\nclass T\n{\n    void Check() => ok.shouldBeTrue();\n}\n"
    );
    Ok(())
}

#[test]
fn test_keeps_crlf_line_endings() -> anyhow::Result<()> {
    let source =
        test_file("using NUnit.Framework;\n", &["Assert.IsFalse(done);"]).replace('\n', "\r\n");
    let expected = test_file(
        "using NUnit.Framework;\nusing Shouldly;\n",
        &["done.shouldBeFalse();"],
    )
    .replace('\n', "\r\n");
    assert_eq!(migrate(Vocabulary::Fluent, &source)?, expected);
    Ok(())
}

#[test]
fn test_fix_one_matches_fix_all() -> anyhow::Result<()> {
    let source = test_file(
        "using NUnit.Framework;\n",
        &[
            "Assert.AreEqual(1, a);",
            "Assert.IsNull(b);",
            "Assert.That(c, Is.GreaterThan(2));",
        ],
    );
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default().with_vocabulary(Vocabulary::Shouldly);

    let file = parser.parse(&source)?;
    let findings: Vec<Finding> = migrator.scan(&file.root).collect();
    assert_eq!(findings.len(), 3);
    let all_at_once = migrator.fix_all(&file.root, &findings)?.text();

    // One fix at a time, rescanning in between.
    let mut root = file.root.clone();
    while let Some(finding) = migrator.scan(&root).next() {
        root = migrator.fix_one(&root, &finding)?;
    }

    assert_eq!(root.text(), all_at_once);
    assert!(!has_syntax_errors(&all_at_once)?);
    assert_eq!(file.text(), source);
    Ok(())
}

#[test]
fn test_stale_finding_fails_loudly() -> anyhow::Result<()> {
    let source = test_file("using NUnit.Framework;\n", &["Assert.AreEqual(1337, contestant);"]);
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default();

    let file = parser.parse(&source)?;
    let finding = migrator.scan(&file.root).next().expect("one finding");
    let fixed = migrator.fix_one(&file.root, &finding)?;

    let err = migrator.fix_one(&fixed, &finding).unwrap_err();
    assert!(matches!(
        err,
        ShouldifyError::Edit(
            EditError::ReplacementTargetMissing { .. } | EditError::ShapeChanged { .. }
        )
    ));
    Ok(())
}

#[test]
fn test_reports_full_call_span() -> anyhow::Result<()> {
    let source = test_file("using NUnit.Framework;\n", &["Assert.That(x, Is.EqualTo(4));"]);
    let mut parser = CSharpParser::new()?;
    let file = parser.parse(&source)?;

    let findings: Vec<Finding> = Migrator::default().scan(&file.root).collect();
    assert_eq!(findings.len(), 1);
    let span = findings[0].span;
    assert_eq!(&source[span.start..span.end], "Assert.That(x, Is.EqualTo(4))");
    assert_eq!(findings[0].shape.to_string(), "Assert.That(2)[EqualTo(1)]");
    assert_eq!(findings[0].diagnostic_id(), "SHU001");
    Ok(())
}

#[test]
fn test_import_added_once_with_custom_namespace() -> anyhow::Result<()> {
    let source = test_file(
        "using NUnit.Framework;\nusing Acme.Should;\n",
        &["Assert.IsTrue(ok);", "Assert.IsFalse(failed);"],
    );
    let mut parser = CSharpParser::new()?;
    let migrated = Migrator::default()
        .with_import("Acme.Should")
        .migrate_source(&mut parser, &source)?;

    assert_eq!(migrated.output.matches("using Acme.Should;").count(), 1);
    assert!(!migrated.output.contains("using Shouldly;"));
    assert_eq!(migrated.stats.values().map(|s| s.rewrites).sum::<u64>(), 2);
    Ok(())
}

#[test]
fn test_unrewritable_finding_is_counted_as_error() -> anyhow::Result<()> {
    let source = test_file(
        "using NUnit.Framework;\n",
        &["Assert.AreEqual(1, a);", "Assert.IsNull(b);"],
    );
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default().with_vocabulary(Vocabulary::Shouldly);
    let file = parser.parse(&source)?;

    let mut findings: Vec<Finding> = migrator.scan(&file.root).collect();
    assert_eq!(findings.len(), 2);
    // The second call no longer has the shape it was reported with.
    findings[1].shape = findings[0].shape;

    assert!(migrator.fix_all(&file.root, &findings).is_err());

    let (root, stats) = migrator.fix_all_with_stats(&file.root, &findings)?;
    let equal = &stats[&findings[0].shape];
    assert_eq!((equal.findings, equal.rewrites, equal.errors), (2, 1, 1));
    assert!((equal.success_rate() - 0.5).abs() < f64::EPSILON);

    let text = root.text();
    assert!(text.contains("a.ShouldBe(1);"), "{text}");
    assert!(text.contains("Assert.IsNull(b);"), "{text}");
    Ok(())
}

#[test]
fn test_no_import_when_nothing_was_rewritten() -> anyhow::Result<()> {
    let source = test_file("using NUnit.Framework;\n", &["Assert.IsTrue(ok);"]);
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default();
    let file = parser.parse(&source)?;

    let mut finding = migrator.scan(&file.root).next().expect("one finding");
    finding.span = TextRange::new(0, 5);

    let (root, stats) = migrator.fix_all_with_stats(&file.root, &[finding])?;
    assert_eq!(root.text(), source);
    let counted = &stats[&finding.shape];
    assert_eq!((counted.findings, counted.rewrites, counted.errors), (1, 0, 1));
    Ok(())
}

#[test]
fn test_migrate_source_counts_rewrites() -> anyhow::Result<()> {
    let source = test_file(
        "using NUnit.Framework;\n",
        &["Assert.IsTrue(ok);", "Assert.IsTrue(done);", "Assert.IsNull(b);"],
    );
    let mut parser = CSharpParser::new()?;
    let migrated = Migrator::default().migrate_source(&mut parser, &source)?;

    assert!(migrated.changed());
    assert_eq!(migrated.rewrites(), 3);
    assert_eq!(migrated.errors(), 0);
    let is_true = migrated
        .stats
        .values()
        .find(|s| s.shape == "Assert.IsTrue(1)")
        .expect("IsTrue stats");
    assert_eq!((is_true.findings, is_true.rewrites), (2, 2));
    Ok(())
}
