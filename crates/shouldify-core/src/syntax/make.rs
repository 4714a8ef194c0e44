//! Constructors for synthesized syntax. Produced nodes carry single-space
//! trivia where C# formatting expects it and nothing at their outer edges.

use super::{Child, SyntaxKind, SyntaxNode, SyntaxToken, Trivia};

fn punct(text: &'static str) -> SyntaxToken {
    SyntaxToken::new(SyntaxKind::new(text), text)
}

fn spaced(text: &'static str) -> SyntaxToken {
    SyntaxToken::with_trivia(
        SyntaxKind::new(text),
        text,
        Vec::new(),
        vec![Trivia::whitespace(" ")],
    )
}

fn padded(text: &'static str) -> SyntaxToken {
    SyntaxToken::with_trivia(
        SyntaxKind::new(text),
        text,
        vec![Trivia::whitespace(" ")],
        vec![Trivia::whitespace(" ")],
    )
}

fn leaf(kind: SyntaxKind, text: &str) -> SyntaxNode {
    SyntaxNode::new(kind, vec![Child::token(SyntaxToken::new(kind, text))])
}

pub fn identifier(name: &str) -> SyntaxNode {
    leaf(SyntaxKind::IDENTIFIER, name)
}

pub fn predefined_type(name: &str) -> SyntaxNode {
    leaf(SyntaxKind::PREDEFINED_TYPE, name)
}

pub fn null_literal() -> SyntaxNode {
    leaf(SyntaxKind::NULL_LITERAL, "null")
}

pub fn boolean_literal(value: bool) -> SyntaxNode {
    leaf(SyntaxKind::BOOLEAN_LITERAL, if value { "true" } else { "false" })
}

/// `Name` or `Name<T1, T2>`.
pub fn simple_name(name: &str, type_args: Vec<SyntaxNode>) -> SyntaxNode {
    if type_args.is_empty() {
        return identifier(name);
    }
    let mut list = vec![Child::token(punct("<"))];
    list.extend(separated(type_args));
    list.push(Child::token(punct(">")));

    SyntaxNode::new(
        SyntaxKind::GENERIC_NAME,
        vec![
            Child::node(identifier(name)).field("name"),
            Child::node(SyntaxNode::new(SyntaxKind::TYPE_ARGUMENT_LIST, list)),
        ],
    )
}

/// `A.B.C` built as nested qualified names.
pub fn dotted_name(path: &str) -> SyntaxNode {
    let mut segments = path.split('.').map(str::trim).filter(|s| !s.is_empty());
    let first = identifier(segments.next().unwrap_or_default());
    segments.fold(first, |qualifier, segment| {
        SyntaxNode::new(
            SyntaxKind::QUALIFIED_NAME,
            vec![
                Child::node(qualifier).field("qualifier"),
                Child::token(punct(".")),
                Child::node(identifier(segment)).field("name"),
            ],
        )
    })
}

pub fn member_access(expression: SyntaxNode, name: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::MEMBER_ACCESS_EXPRESSION,
        vec![
            Child::node(expression).field("expression"),
            Child::token(punct(".")),
            Child::node(name).field("name"),
        ],
    )
}

pub fn argument(expression: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(SyntaxKind::ARGUMENT, vec![Child::node(expression)])
}

/// `name: expression`.
pub fn named_argument(name: &str, expression: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::ARGUMENT,
        vec![
            Child::node(identifier(name)).field("name"),
            Child::token(spaced(":")),
            Child::node(expression),
        ],
    )
}

pub fn argument_list(arguments: Vec<SyntaxNode>) -> SyntaxNode {
    let mut children = vec![Child::token(punct("("))];
    children.extend(separated(arguments));
    children.push(Child::token(punct(")")));
    SyntaxNode::new(SyntaxKind::ARGUMENT_LIST, children)
}

pub fn invocation(function: SyntaxNode, arguments: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::INVOCATION_EXPRESSION,
        vec![
            Child::node(function).field("function"),
            Child::node(arguments).field("arguments"),
        ],
    )
}

pub fn parenthesized(expression: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::PARENTHESIZED_EXPRESSION,
        vec![
            Child::token(punct("(")),
            Child::node(expression),
            Child::token(punct(")")),
        ],
    )
}

/// `param => body`.
pub fn simple_lambda(param: &str, body: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::LAMBDA_EXPRESSION,
        vec![
            Child::node(identifier(param)).field("parameters"),
            Child::token(padded("=>")),
            Child::node(body).field("body"),
        ],
    )
}

/// `left op right`.
pub fn binary(left: SyntaxNode, operator: &'static str, right: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::BINARY_EXPRESSION,
        vec![
            Child::node(left).field("left"),
            Child::token(padded(operator)).field("operator"),
            Child::node(right).field("right"),
        ],
    )
}

/// `expression is Type`.
pub fn is_type(expression: SyntaxNode, ty: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::IS_EXPRESSION,
        vec![
            Child::node(expression),
            Child::token(padded("is")),
            Child::node(ty),
        ],
    )
}

pub fn expression_statement(expression: SyntaxNode) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::EXPRESSION_STATEMENT,
        vec![Child::node(expression), Child::token(punct(";"))],
    )
}

/// `using Namespace;`
pub fn using_directive(namespace: &str) -> SyntaxNode {
    SyntaxNode::new(
        SyntaxKind::USING_DIRECTIVE,
        vec![
            Child::token(spaced("using")),
            Child::node(dotted_name(namespace)),
            Child::token(punct(";")),
        ],
    )
}

fn separated(items: Vec<SyntaxNode>) -> Vec<Child> {
    let mut children = Vec::with_capacity(items.len() * 2);
    for (index, item) in items.into_iter().enumerate() {
        if index > 0 {
            children.push(Child::token(spaced(",")));
        }
        children.push(Child::node(item));
    }
    children
}
