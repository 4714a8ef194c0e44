/*!
# C# Parser

Wraps tree-sitter-c-sharp and converts its concrete syntax tree into the
lossless [`SyntaxNode`] representation.

Conversion runs in two passes. The first collects every leaf in source
order and splits the text between leaves into trivia: everything up to and
including the first newline trails the previous token, the rest leads the
next one. The second pass rebuilds the node structure and hands out the
prepared tokens in the same order. Comments are trivia, never nodes.
*/

use tracing::{debug, trace};

use super::{Child, SyntaxKind, SyntaxNode, SyntaxToken, Trivia, TriviaKind};

/// Errors raised while setting up or running the C# parser.
#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("failed to load the C# grammar: {0}")]
    Language(String),

    #[error("parser returned no tree")]
    Cancelled,
}

/// A parsed compilation unit.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub root: SyntaxNode,
    /// Whether tree-sitter recovered from syntax errors. The tree is still
    /// lossless and usable.
    pub has_errors: bool,
}

impl SourceFile {
    pub fn text(&self) -> String {
        self.root.text()
    }
}

/// Reusable parser. Not shareable across threads; create one per worker.
pub struct CSharpParser {
    parser: tree_sitter::Parser,
}

impl CSharpParser {
    pub fn new() -> Result<Self, ParseError> {
        let mut parser = tree_sitter::Parser::new();
        let language: tree_sitter::Language = tree_sitter_c_sharp::LANGUAGE.into();
        parser
            .set_language(&language)
            .map_err(|e| ParseError::Language(e.to_string()))?;
        Ok(Self { parser })
    }

    pub fn parse(&mut self, source: &str) -> Result<SourceFile, ParseError> {
        let tree = self.parser.parse(source, None).ok_or(ParseError::Cancelled)?;
        let ts_root = tree.root_node();

        let mut leaves = Vec::new();
        collect_leaves(ts_root, &mut leaves);
        let (tokens, eof_leading) = attach_trivia(source, &leaves);
        trace!("Collected {} tokens", tokens.len());

        let mut builder = TreeBuilder {
            tokens: tokens.into_iter(),
        };
        let mut children = builder.build_children(ts_root);
        children.push(Child::token(SyntaxToken::with_trivia(
            SyntaxKind::END_OF_FILE,
            "",
            eof_leading,
            Vec::new(),
        )));

        let root = SyntaxNode::new(SyntaxKind::new(ts_root.kind()), children);
        let has_errors = ts_root.has_error();
        if has_errors {
            debug!("Source contains syntax errors; continuing with recovered tree");
        }

        debug_assert_eq!(root.text_len(), source.len());
        Ok(SourceFile { root, has_errors })
    }
}

/// Parses `source` and reports whether tree-sitter had to recover from
/// syntax errors.
pub fn has_syntax_errors(source: &str) -> Result<bool, ParseError> {
    Ok(CSharpParser::new()?.parse(source)?.has_errors)
}

#[derive(Debug, Clone, Copy)]
struct Leaf {
    kind: &'static str,
    start: usize,
    end: usize,
}

fn is_comment(node: tree_sitter::Node<'_>) -> bool {
    node.kind() == SyntaxKind::COMMENT.as_str()
}

fn for_each_child<'t>(
    node: tree_sitter::Node<'t>,
    mut f: impl FnMut(tree_sitter::Node<'t>, Option<&'static str>),
) {
    let mut cursor = node.walk();
    if !cursor.goto_first_child() {
        return;
    }
    loop {
        let child = cursor.node();
        if !is_comment(child) {
            f(child, cursor.field_name());
        }
        if !cursor.goto_next_sibling() {
            break;
        }
    }
}

fn collect_leaves(node: tree_sitter::Node<'_>, out: &mut Vec<Leaf>) {
    for_each_child(node, |child, _| {
        if child.child_count() == 0 {
            out.push(Leaf {
                kind: child.kind(),
                start: child.start_byte(),
                end: child.end_byte(),
            });
        } else {
            collect_leaves(child, out);
        }
    });
}

/// Assigns the gaps between leaves to tokens. Returns the tokens and the
/// leading trivia of the end-of-file token.
fn attach_trivia(source: &str, leaves: &[Leaf]) -> (Vec<SyntaxToken>, Vec<Trivia>) {
    struct Draft {
        kind: &'static str,
        text: String,
        leading: Vec<Trivia>,
        trailing: Vec<Trivia>,
    }

    let mut drafts: Vec<Draft> = Vec::with_capacity(leaves.len());
    let mut pos = 0;

    for leaf in leaves {
        let start = leaf.start.max(pos);
        let end = leaf.end.max(start);
        let gap = lex_trivia(source.get(pos..start).unwrap_or_default());

        let leading = match drafts.last_mut() {
            Some(previous) => {
                let (trailing, leading) = split_trailing(gap);
                previous.trailing = trailing;
                leading
            }
            None => gap,
        };

        drafts.push(Draft {
            kind: leaf.kind,
            text: source.get(start..end).unwrap_or_default().to_string(),
            leading,
            trailing: Vec::new(),
        });
        pos = end;
    }

    let rest = lex_trivia(source.get(pos..).unwrap_or_default());
    let eof_leading = match drafts.last_mut() {
        Some(previous) => {
            let (trailing, leading) = split_trailing(rest);
            previous.trailing = trailing;
            leading
        }
        None => rest,
    };

    let tokens = drafts
        .into_iter()
        .map(|d| SyntaxToken::with_trivia(SyntaxKind::new(d.kind), d.text, d.leading, d.trailing))
        .collect();
    (tokens, eof_leading)
}

/// Splits gap trivia into the part trailing the previous token (through the
/// first newline) and the part leading the next one.
fn split_trailing(mut pieces: Vec<Trivia>) -> (Vec<Trivia>, Vec<Trivia>) {
    match pieces.iter().position(Trivia::is_newline) {
        Some(index) => {
            let leading = pieces.split_off(index + 1);
            (pieces, leading)
        }
        None => (pieces, Vec::new()),
    }
}

/// Splits inter-token text into whitespace, newline, comment and skipped
/// pieces.
pub(crate) fn lex_trivia(text: &str) -> Vec<Trivia> {
    let mut pieces = Vec::new();
    let bytes = text.as_bytes();
    let mut i = 0;

    while i < bytes.len() {
        let start = i;
        let kind = match bytes[i] {
            b'\r' if bytes.get(i + 1) == Some(&b'\n') => {
                i += 2;
                TriviaKind::Newline
            }
            b'\n' | b'\r' => {
                i += 1;
                TriviaKind::Newline
            }
            b' ' | b'\t' | b'\x0B' | b'\x0C' => {
                while i < bytes.len() && matches!(bytes[i], b' ' | b'\t' | b'\x0B' | b'\x0C') {
                    i += 1;
                }
                TriviaKind::Whitespace
            }
            b'/' if bytes.get(i + 1) == Some(&b'/') => {
                while i < bytes.len() && !matches!(bytes[i], b'\n' | b'\r') {
                    i += 1;
                }
                TriviaKind::Comment
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                i = text[i + 2..]
                    .find("*/")
                    .map(|close| i + 2 + close + 2)
                    .unwrap_or(bytes.len());
                TriviaKind::Comment
            }
            _ => {
                while i < bytes.len()
                    && !matches!(bytes[i], b' ' | b'\t' | b'\n' | b'\r' | b'\x0B' | b'\x0C')
                {
                    i += 1;
                }
                TriviaKind::Skipped
            }
        };
        pieces.push(Trivia::new(kind, &text[start..i]));
    }

    pieces
}

struct TreeBuilder {
    tokens: std::vec::IntoIter<SyntaxToken>,
}

impl TreeBuilder {
    fn next_token(&mut self, kind: &'static str) -> SyntaxToken {
        self.tokens
            .next()
            .unwrap_or_else(|| SyntaxToken::new(SyntaxKind::new(kind), ""))
    }

    fn build_children(&mut self, node: tree_sitter::Node<'_>) -> Vec<Child> {
        let mut children = Vec::new();
        for_each_child(node, |child, field| {
            let element = if child.child_count() == 0 && !child.is_named() {
                Child::token(self.next_token(child.kind()))
            } else {
                Child::node(self.build_node(child))
            };
            children.push(Child {
                field,
                element: element.element,
            });
        });
        children
    }

    fn build_node(&mut self, node: tree_sitter::Node<'_>) -> SyntaxNode {
        let kind = SyntaxKind::new(node.kind());
        if node.child_count() == 0 {
            let token = self.next_token(node.kind());
            return SyntaxNode::new(kind, vec![Child::token(token)]);
        }
        let children = self.build_children(node);
        SyntaxNode::new(kind, children)
    }
}
