/*!
# Shape Catalog Integration Tests

Builds a synthetic legacy call for every registered shape and checks that it
is found once, converts to code that re-parses cleanly, keeps its operands
verbatim and is not found again afterwards.
*/

use shouldify_core::catalog::{Catalog, ConstraintShape, Shape};
use shouldify_core::migrate::{Finding, Migrator, Operand, RewriteRule};
use shouldify_core::syntax::{has_syntax_errors, CSharpParser};
use shouldify_core::Vocabulary;

/// Legacy source text for `shape`, built to exactly its key.
fn synthesize(shape: &Shape) -> String {
    let key = shape.key;
    let operands = shape.rule.operands();

    let mut args: Vec<String> = (0..key.arg_count)
        .map(|i| {
            if operands.contains(&Operand::TypeOfArg(i)) {
                "typeof(Widget)".to_string()
            } else if matches!(shape.rule, RewriteRule::Static { .. }) {
                "() => Run()".to_string()
            } else {
                format!("operand{i}")
            }
        })
        .collect();

    if let Some(constraint) = key.constraint {
        args[1] = constraint_text(constraint, &operands);
    }

    let generic = if operands.contains(&Operand::TypeArg) {
        "<ArgumentException>"
    } else {
        ""
    };
    format!("{}.{}{}({})", key.receiver, key.method, generic, args.join(", "))
}

fn constraint_text(constraint: ConstraintShape, operands: &[Operand]) -> String {
    let root = if constraint.negated { "Is.Not" } else { "Is" };
    let verb = constraint.verb;
    if operands.contains(&Operand::ConstraintTypeArg) {
        format!("{root}.{verb}<Widget>()")
    } else if constraint.arg_count == 0 {
        format!("{root}.{verb}")
    } else if operands.contains(&Operand::ConstraintTypeOfArg(0)) {
        format!("{root}.{verb}(typeof(Widget))")
    } else {
        format!("{root}.{verb}(expected)")
    }
}

fn wrap(call: &str) -> String {
    format!(
        "using NUnit.Framework;\n\nclass Sample\n{{\n    void Check()\n    {{\n        {call};\n    }}\n}}\n"
    )
}

#[test]
fn test_every_shape_yields_one_full_span_finding() -> anyhow::Result<()> {
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default();

    for shape in Catalog::global().iter() {
        let call = synthesize(shape);
        let source = wrap(&call);
        let file = parser.parse(&source)?;

        let findings: Vec<Finding> = migrator.scan(&file.root).collect();
        assert_eq!(findings.len(), 1, "{call}");
        let span = findings[0].span;
        assert_eq!(&source[span.start..span.end], call, "{}", shape.key);
        assert_eq!(findings[0].shape, shape.key, "{call}");
    }
    Ok(())
}

#[test]
fn test_every_rewrite_reparses_and_is_not_reconverted() -> anyhow::Result<()> {
    let mut parser = CSharpParser::new()?;

    for vocabulary in [Vocabulary::Shouldly, Vocabulary::Fluent] {
        let migrator = Migrator::default().with_vocabulary(vocabulary);
        for shape in Catalog::global().iter() {
            // `throw` is a C# keyword, so the fluent static verbs only parse
            // in hosts that escape it.
            let is_static = matches!(shape.rule, RewriteRule::Static { .. });
            if vocabulary == Vocabulary::Fluent && is_static {
                continue;
            }

            let call = synthesize(shape);
            let migrated = migrator.migrate_source(&mut parser, &wrap(&call))?;
            let output = migrated.output;

            assert!(!has_syntax_errors(&output)?, "{vocabulary}: {call} -> {output}");
            assert!(!output.contains(&call), "{call} survived in {output}");
            assert_eq!(output.matches("using Shouldly;").count(), 1, "{output}");

            let rescanned = parser.parse(&output)?;
            assert_eq!(migrator.scan(&rescanned.root).count(), 0, "{output}");
        }
    }
    Ok(())
}

#[test]
fn test_operands_keep_their_text() -> anyhow::Result<()> {
    let mut parser = CSharpParser::new()?;
    let migrator = Migrator::default().with_vocabulary(Vocabulary::Shouldly);

    for shape in Catalog::global().iter() {
        let call = synthesize(shape);
        let output = migrator.migrate_source(&mut parser, &wrap(&call))?.output;

        for i in 0..shape.key.arg_count {
            let operand = format!("operand{i}");
            if call.contains(&operand) && shape.rule.operands().contains(&Operand::Arg(i)) {
                assert!(output.contains(&operand), "{operand} lost converting {call}");
            }
        }
        if call.contains("(expected)") {
            assert!(output.contains("expected"), "{call} -> {output}");
        }
        if call.contains("Widget") {
            assert!(output.contains("Widget"), "{call} -> {output}");
        }
    }
    Ok(())
}

#[test]
fn test_catalog_covers_every_family() {
    use shouldify_core::catalog::Family;

    let catalog = Catalog::global();
    for family in [Family::Direct, Family::Constraint, Family::Throwing, Family::NullaryTarget] {
        assert!(
            catalog.iter().any(|shape| shape.family == family),
            "no shapes in {family:?}"
        );
    }
}
