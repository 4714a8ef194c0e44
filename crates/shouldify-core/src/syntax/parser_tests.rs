use pretty_assertions::assert_eq;

use super::*;

const SAMPLE: &str = "using NUnit.Framework;\r\n\r\nnamespace Tests\r\n{\r\n    public class Sample\r\n    {\r\n        // arrange\r\n        [Test]\r\n        public void Works()\r\n        {\r\n            Assert.AreEqual(1337, contestant); /* inline */\r\n            Assert.IsTrue(x > 1);\r\n        }\r\n    }\r\n}\r\n";

fn parse(source: &str) -> SourceFile {
    CSharpParser::new()
        .expect("grammar loads")
        .parse(source)
        .expect("parse succeeds")
}

fn invocations(root: &SyntaxNode) -> Vec<Positioned> {
    root.descendants()
        .filter(|p| p.node.kind() == SyntaxKind::INVOCATION_EXPRESSION)
        .collect()
}

#[test]
fn round_trips_source_exactly() {
    let sources = [
        SAMPLE,
        "",
        "   \n",
        "class A { void M() { Assert.That(x, Is.Not.EqualTo(1)); } } // tail",
        "class B {\n\tvoid M() {\n\t\tAssert.Throws<E>(() => f( /* c */ ));\n\t}\n}",
    ];
    for source in sources {
        let file = parse(source);
        assert_eq!(file.text(), source);
        assert_eq!(file.root.text_len(), source.len());
    }
}

#[test]
fn comments_become_trivia() {
    let file = parse(SAMPLE);
    let has_comment_node = file
        .root
        .descendants()
        .any(|p| p.node.kind() == SyntaxKind::COMMENT);
    assert!(!has_comment_node);

    let comments: Vec<String> = file
        .root
        .tokens()
        .iter()
        .flat_map(|t| t.leading().iter().chain(t.trailing()))
        .filter(|t| t.kind == TriviaKind::Comment)
        .map(|t| t.text.clone())
        .collect();
    assert_eq!(comments, vec!["// arrange".to_string(), "/* inline */".to_string()]);
}

#[test]
fn trailing_trivia_stops_after_first_newline() {
    let file = parse(SAMPLE);
    let statement = file
        .root
        .descendants()
        .find(|p| p.node.kind() == SyntaxKind::EXPRESSION_STATEMENT)
        .expect("statement");

    let trailing: Vec<&str> = statement
        .node
        .trailing_trivia()
        .iter()
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(trailing, vec![" ", "/* inline */", "\r\n"]);

    let leading: Vec<&str> = statement
        .node
        .leading_trivia()
        .iter()
        .map(|t| t.text.as_str())
        .collect();
    assert_eq!(leading, vec!["            "]);
}

#[test]
fn trimmed_range_covers_invocation_text() {
    let file = parse(SAMPLE);
    let text = file.text();
    let found = invocations(&file.root);
    assert_eq!(found.len(), 2);

    let range = found[0].trimmed_range();
    assert_eq!(&text[range.start..range.end], "Assert.AreEqual(1337, contestant)");
    assert_eq!(found[0].node.trimmed_text(), "Assert.AreEqual(1337, contestant)");
}

#[test]
fn invocation_exposes_function_and_arguments() {
    let file = parse("class A { void M() { Assert.AreEqual(1, x); } }");
    let call = invocations(&file.root).remove(0).node;

    let function = call.child_by_field("function").expect("function field");
    assert_eq!(function.kind(), SyntaxKind::MEMBER_ACCESS_EXPRESSION);
    assert_eq!(function.trimmed_text(), "Assert.AreEqual");

    let arguments = call.child_by_field("arguments").expect("arguments field");
    assert_eq!(arguments.kind(), SyntaxKind::ARGUMENT_LIST);
    assert_eq!(arguments.child_nodes().count(), 2);
}

#[test]
fn replacing_a_node_keeps_unrelated_identity() {
    let file = parse(SAMPLE);
    let found = invocations(&file.root);
    let first = found[0].node.clone();
    let second_id = found[1].node.id();

    let replacement = make::identifier("done").with_trivia_of(&first);
    let edited = file
        .root
        .replace_descendant(first.id(), replacement)
        .expect("target exists");

    assert!(edited.text().contains("            done; /* inline */"));
    assert!(edited.descendants().any(|p| p.node.id() == second_id));
    assert!(!edited.descendants().any(|p| p.node.id() == first.id()));
    // The previous version is untouched.
    assert_eq!(file.text(), SAMPLE);
}

#[test]
fn path_to_range_finds_innermost_invocation() {
    let file = parse("class A { void M() { Assert.That(Foo(1), Is.EqualTo(2)); } }");
    let text = file.text();
    let start = text.find("Foo(1)").expect("inner call");
    let path = file
        .root
        .path_to_range(
            TextRange::new(start, start + "Foo(1)".len()),
            SyntaxKind::INVOCATION_EXPRESSION,
        )
        .expect("path");

    assert_eq!(path[0].id(), file.root.id());
    assert_eq!(path.last().map(|n| n.trimmed_text()), Some("Foo(1)".to_string()));
    assert!(path.iter().any(|n| n.kind().is_statement()));
}

#[test]
fn reports_recovered_syntax_errors() {
    assert!(!has_syntax_errors("class A { }").expect("parse"));
    let broken = parse("class A { void M( { Assert.IsTrue(x); }");
    assert!(broken.has_errors);
    assert_eq!(broken.text(), "class A { void M( { Assert.IsTrue(x); }");
}
