/*!
# Tree Editor

Splices replacements into an immutable tree and maintains the using
directive the fluent vocabulary needs.

Single edits locate their target by the trimmed range a finding reported.
Batch edits are keyed by node identity and applied bottom-up, so a
replacement nested inside another target's arguments is rebuilt first and
the outer rewrite sees it.
*/

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::syntax::{make, Child, NodeId, SyntaxElement, SyntaxKind, SyntaxNode, TextRange, Trivia};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EditError {
    #[error("no invocation found at {location}")]
    ReplacementTargetMissing { location: TextRange },

    #[error("node at {location} no longer has shape {expected}")]
    ShapeChanged { location: TextRange, expected: String },
}

/// Path from the root to a located invocation.
#[derive(Debug, Clone)]
pub struct Located {
    path: Vec<SyntaxNode>,
}

impl Located {
    pub fn invocation(&self) -> &SyntaxNode {
        // Paths are never empty: `locate` only builds them from a match.
        &self.path[self.path.len() - 1]
    }

    /// Ancestors of the invocation, outermost first.
    pub fn ancestors(&self) -> &[SyntaxNode] {
        &self.path[..self.path.len() - 1]
    }

    /// The nearest enclosing statement, if any.
    pub fn statement(&self) -> Option<&SyntaxNode> {
        self.ancestors().iter().rev().find(|node| node.kind().is_statement())
    }

    /// The node a replacement is spliced into: the statement or, outside
    /// statements, the invocation itself.
    pub fn splice_target(&self) -> &SyntaxNode {
        self.statement().unwrap_or_else(|| self.invocation())
    }
}

pub fn locate(root: &SyntaxNode, location: TextRange) -> Result<Located, EditError> {
    match root.path_to_range(location, SyntaxKind::INVOCATION_EXPRESSION) {
        Some(path) if !path.is_empty() => Ok(Located { path }),
        _ => Err(EditError::ReplacementTargetMissing { location }),
    }
}

/// A replacement expression plus the outer trivia of the splice target.
#[derive(Debug, Clone)]
pub struct Replacement {
    pub expression: SyntaxNode,
    pub leading: Vec<Trivia>,
    pub trailing: Vec<Trivia>,
}

impl Replacement {
    /// Keeps the splice target's trivia.
    pub fn for_target(expression: SyntaxNode, located: &Located) -> Self {
        let target = located.splice_target();
        Self {
            expression,
            leading: target.leading_trivia().to_vec(),
            trailing: target.trailing_trivia().to_vec(),
        }
    }
}

/// Replaces the invocation at `location` and returns the new root.
pub fn apply(
    root: &SyntaxNode,
    location: TextRange,
    replacement: &Replacement,
) -> Result<SyntaxNode, EditError> {
    let located = locate(root, location)?;
    let invocation = located.invocation();
    let expression = replacement.expression.with_trivia_of(invocation);

    let spliced = match located.statement() {
        Some(statement) => statement
            .replace_descendant(invocation.id(), expression)
            .ok_or(EditError::ReplacementTargetMissing { location })?,
        None => expression,
    };
    let spliced = spliced
        .with_leading_trivia(replacement.leading.clone())
        .with_trailing_trivia(replacement.trailing.clone());

    root.replace_descendant(located.splice_target().id(), spliced)
        .ok_or(EditError::ReplacementTargetMissing { location })
}

/// Rebuilds every node in `targets` bottom-up through `rewrite`, which
/// receives the original target, the same node with its rewritten
/// descendants already in place, and the original ancestors (outermost
/// first).
pub fn rewrite_all<E, F>(
    root: &SyntaxNode,
    targets: &HashSet<NodeId>,
    mut rewrite: F,
) -> Result<SyntaxNode, E>
where
    F: FnMut(&SyntaxNode, &SyntaxNode, &[SyntaxNode]) -> Result<SyntaxNode, E>,
{
    let mut ancestors = Vec::new();
    rebuild(root, targets, &mut ancestors, &mut rewrite)
}

fn rebuild<E, F>(
    node: &SyntaxNode,
    targets: &HashSet<NodeId>,
    ancestors: &mut Vec<SyntaxNode>,
    rewrite: &mut F,
) -> Result<SyntaxNode, E>
where
    F: FnMut(&SyntaxNode, &SyntaxNode, &[SyntaxNode]) -> Result<SyntaxNode, E>,
{
    ancestors.push(node.clone());
    let mut changed = false;
    let mut children = Vec::with_capacity(node.children().len());
    for child in node.children() {
        let element = match &child.element {
            SyntaxElement::Node(inner) => {
                let rebuilt = rebuild(inner, targets, ancestors, rewrite);
                let rebuilt = match rebuilt {
                    Ok(rebuilt) => rebuilt,
                    Err(e) => {
                        ancestors.pop();
                        return Err(e);
                    }
                };
                changed |= rebuilt.id() != inner.id();
                SyntaxElement::Node(rebuilt)
            }
            SyntaxElement::Token(token) => SyntaxElement::Token(token.clone()),
        };
        children.push(Child {
            field: child.field,
            element,
        });
    }
    ancestors.pop();

    let current = if changed {
        node.with_children(children)
    } else {
        node.clone()
    };

    if targets.contains(&node.id()) {
        rewrite(node, &current, ancestors)
    } else {
        Ok(current)
    }
}

/// Normalized namespace of a using directive: `global`, `using` and `;`
/// dropped, everything else concatenated. `using static X;` and aliases
/// keep their extra tokens and so never equal a plain namespace.
fn using_namespace(directive: &SyntaxNode) -> String {
    directive
        .tokens()
        .iter()
        .filter(|token| !matches!(token.text(), "global" | "using" | ";"))
        .map(|token| token.text().to_string())
        .collect()
}

/// Whether `namespace` is imported for all code in the file: by a top-level
/// directive, or by every namespace declared at the top level when nothing
/// else is.
pub fn has_import(root: &SyntaxNode, namespace: &str) -> bool {
    let wanted: String = namespace.chars().filter(|c| !c.is_whitespace()).collect();
    imports(root, &wanted)
}

fn imports(scope: &SyntaxNode, wanted: &str) -> bool {
    let body = scope.child_of_kind(SyntaxKind::DECLARATION_LIST).unwrap_or(scope);
    let mut namespaces = 0;
    let mut covered = true;
    for child in body.child_nodes() {
        match child.kind() {
            SyntaxKind::USING_DIRECTIVE if using_namespace(child) == wanted => return true,
            SyntaxKind::NAMESPACE_DECLARATION => {
                namespaces += 1;
                covered &= imports(child, wanted);
            }
            kind if FILE_PREAMBLE_KINDS.contains(&kind.as_str()) => {}
            _ => covered = false,
        }
    }
    namespaces > 0 && covered
}

/// Top-level nodes that hold no code needing the import.
const FILE_PREAMBLE_KINDS: &[&str] = &[
    "using_directive",
    "extern_alias_directive",
    "global_attribute",
    "shebang_directive",
    "file_scoped_namespace_declaration",
];

/// `\r\n` when the file already uses it, `\n` otherwise.
fn newline_style(root: &SyntaxNode) -> &'static str {
    let crlf = root
        .tokens()
        .iter()
        .flat_map(|token| token.leading().iter().chain(token.trailing()))
        .find(|trivia| trivia.is_newline())
        .is_some_and(|trivia| trivia.text == "\r\n");
    if crlf {
        "\r\n"
    } else {
        "\n"
    }
}

/// Adds `using <namespace>;` after the last top-level using directive, or
/// at the top of the file when there is none. Idempotent.
pub fn ensure_import(root: &SyntaxNode, namespace: &str) -> SyntaxNode {
    if root.kind() != SyntaxKind::COMPILATION_UNIT {
        warn!("Cannot add using directive to {}", root.kind());
        return root.clone();
    }
    if has_import(root, namespace) {
        return root.clone();
    }

    let newline = newline_style(root);
    let last_using = root.children().iter().rposition(|child| {
        child
            .element
            .as_node()
            .is_some_and(|node| node.kind() == SyntaxKind::USING_DIRECTIVE)
    });

    match last_using {
        Some(index) => {
            let previous_ends_line = root.children()[index]
                .element
                .as_node()
                .is_some_and(|node| node.trailing_trivia().iter().any(Trivia::is_newline));
            let leading = if previous_ends_line {
                Vec::new()
            } else {
                vec![Trivia::newline(newline)]
            };
            let directive = make::using_directive(namespace)
                .with_leading_trivia(leading)
                .with_trailing_trivia(vec![Trivia::newline(newline)]);
            debug!("Added using directive for {}", namespace);
            root.insert_child(index + 1, Child::node(directive))
        }
        None => {
            // Header comments stay above the new directive.
            let header = root.leading_trivia().to_vec();
            let mut children = root.children().to_vec();
            if let Some(first) = children.first_mut() {
                first.element = match &first.element {
                    SyntaxElement::Node(node) => {
                        SyntaxElement::Node(node.with_leading_trivia(Vec::new()))
                    }
                    SyntaxElement::Token(token) => {
                        SyntaxElement::Token(token.with_leading(Vec::new()))
                    }
                };
            }
            let directive = make::using_directive(namespace)
                .with_leading_trivia(header)
                .with_trailing_trivia(vec![Trivia::newline(newline)]);
            children.insert(0, Child::node(directive));
            debug!("Added using directive for {}", namespace);
            root.with_children(children)
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::syntax::CSharpParser;

    fn parse(source: &str) -> SyntaxNode {
        CSharpParser::new().unwrap().parse(source).unwrap().root
    }

    #[test]
    fn inserts_import_after_last_using() {
        let root = parse("using System;\nusing NUnit.Framework;\n\n\nnamespace A { }\n");
        let edited = ensure_import(&root, "Shouldly");
        assert_eq!(
            edited.text(),
            "using System;\nusing NUnit.Framework;\nusing Shouldly;\n\n\nnamespace A { }\n"
        );
        assert_eq!(ensure_import(&edited, "Shouldly").text(), edited.text());
    }

    #[test]
    fn keeps_crlf_line_endings() {
        let root = parse("using NUnit.Framework;\r\nclass A { }\r\n");
        assert_eq!(
            ensure_import(&root, "Shouldly").text(),
            "using NUnit.Framework;\r\nusing Shouldly;\r\nclass A { }\r\n"
        );
    }

    #[test]
    fn inserts_at_top_below_header_comment() {
        let root = parse("// header\nclass A { }\n");
        assert_eq!(
            ensure_import(&root, "Shouldly").text(),
            "// header\nusing Shouldly;\nclass A { }\n"
        );
    }

    #[test]
    fn global_using_counts_as_present() {
        let root = parse("global using Shouldly;\nclass A { }\n");
        assert!(has_import(&root, "Shouldly"));
        assert!(!has_import(&parse("using static Shouldly;\n"), "Shouldly"));
        assert_eq!(ensure_import(&root, "Shouldly").text(), root.text());
    }

    #[test]
    fn namespace_level_using_counts_when_it_covers_the_file() {
        let root =
            parse("using NUnit.Framework;\nnamespace A\n{\n    using Shouldly;\n    class T { }\n}\n");
        assert!(has_import(&root, "Shouldly"));
        assert_eq!(ensure_import(&root, "Shouldly").text(), root.text());

        let file_scoped = parse("namespace A;\nusing Shouldly;\nclass T { }\n");
        assert!(has_import(&file_scoped, "Shouldly"));

        // Code in namespace B still needs the directive.
        let partial = parse("namespace A { using Shouldly; }\nnamespace B { class T { } }\n");
        assert!(!has_import(&partial, "Shouldly"));
        let outside = parse("namespace A { using Shouldly; }\nclass T { }\n");
        assert!(!has_import(&outside, "Shouldly"));
    }

    #[test]
    fn missing_location_is_reported() {
        let root = parse("class A { void M() { Run(); } }");
        let replacement = Replacement {
            expression: make::identifier("x"),
            leading: Vec::new(),
            trailing: Vec::new(),
        };
        let location = TextRange::new(0, 3);
        assert_eq!(
            apply(&root, location, &replacement).unwrap_err(),
            EditError::ReplacementTargetMissing { location }
        );
    }
}
