/*!
# Call Patterns

Recognizes legacy assertion invocations and classifies them against the
shape catalog.

Classification only reads syntax. A call is reported when its receiver is
one of the known assertion classes, its method and positional argument
count name a catalog shape, every argument is positional, and every operand
the shape's rule needs can be captured. Everything else is left alone.
*/

use std::fmt;

use tracing::trace;

use super::rules::Captures;
use crate::catalog::{
    Catalog, ConstraintShape, ConstraintVerb, MethodKind, ReceiverKind, Shape, ShapeKey,
};
use crate::syntax::{Preorder, SyntaxKind, SyntaxNode, TextRange};

/// Diagnostic id reported for every convertible call.
pub const DIAGNOSTIC_ID: &str = "SHU001";

/// Deepest qualifier chain accepted between a constraint root and its verb,
/// e.g. `Is.Not.EqualTo`.
const MAX_QUALIFIER_DEPTH: usize = 2;

const CONSTRAINT_ROOTS: &[&str] = &["Is", "Has", "Does"];
const NEGATORS: &[&str] = &["Not", "No"];

/// A convertible call: where it is and which shape it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Finding {
    /// Trimmed range of the invocation expression.
    pub span: TextRange,
    pub shape: ShapeKey,
}

impl Finding {
    pub fn diagnostic_id(&self) -> &'static str {
        DIAGNOSTIC_ID
    }

    pub fn message(&self) -> &'static str {
        "Convert to fluent assertion"
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} [{}] at {}", DIAGNOSTIC_ID, self.message(), self.shape, self.span)
    }
}

/// A classified invocation together with the syntax its rule consumes.
#[derive(Debug, Clone)]
pub struct MatchedCall<'c> {
    pub shape: &'c Shape,
    pub captures: Captures,
}

#[derive(Debug, Clone, Copy)]
pub struct Matcher<'c> {
    catalog: &'c Catalog,
}

impl Default for Matcher<'static> {
    fn default() -> Self {
        Self::new(Catalog::global())
    }
}

impl<'c> Matcher<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &'c Catalog {
        self.catalog
    }

    /// Lazily reports every convertible call in pre-order.
    pub fn scan(&self, root: &SyntaxNode) -> Scan<'c> {
        Scan {
            matcher: *self,
            walk: root.descendants(),
        }
    }

    /// Classifies a single invocation node.
    pub fn classify(&self, node: &SyntaxNode) -> Option<MatchedCall<'c>> {
        if node.kind() != SyntaxKind::INVOCATION_EXPRESSION {
            return None;
        }
        let call = decompose(node)?;

        let mut captures = Captures {
            args: call.args,
            type_args: call.type_args,
            ..Captures::default()
        };

        let constraint = if call.method == MethodKind::That {
            let expression = captures.args.get(1)?;
            let Some(parsed) = parse_constraint(expression) else {
                trace!("Unrecognized constraint expression: {}", expression.trimmed_text());
                return None;
            };
            let shape = ConstraintShape {
                verb: parsed.verb,
                negated: parsed.negated,
                arg_count: parsed.args.len(),
            };
            captures.constraint_args = parsed.args;
            captures.constraint_type_args = parsed.type_args;
            Some(shape)
        } else {
            None
        };

        let key = ShapeKey {
            receiver: call.receiver,
            method: call.method,
            arg_count: captures.args.len(),
            constraint,
        };
        let shape = self.catalog.lookup(&key)?;

        if !captures.satisfy(&shape.rule) {
            trace!("Operands of {} could not be captured", key);
            return None;
        }

        Some(MatchedCall { shape, captures })
    }
}

/// Iterator returned by [`Matcher::scan`].
pub struct Scan<'c> {
    matcher: Matcher<'c>,
    walk: Preorder,
}

impl Iterator for Scan<'_> {
    type Item = Finding;

    fn next(&mut self) -> Option<Self::Item> {
        for positioned in self.walk.by_ref() {
            if let Some(call) = self.matcher.classify(&positioned.node) {
                return Some(Finding {
                    span: positioned.trimmed_range(),
                    shape: call.shape.key,
                });
            }
        }
        None
    }
}

struct CallSite {
    receiver: ReceiverKind,
    method: MethodKind,
    type_args: Vec<SyntaxNode>,
    args: Vec<SyntaxNode>,
}

/// `Receiver.Method<T...>(args...)` with only positional arguments.
fn decompose(invocation: &SyntaxNode) -> Option<CallSite> {
    let function = function_of(invocation)?;
    if function.kind() != SyntaxKind::MEMBER_ACCESS_EXPRESSION {
        return None;
    }
    let (receiver_expr, name) = member_parts(function)?;
    let receiver = ReceiverKind::from_simple_name(&last_identifier(receiver_expr)?)?;
    let (method_name, type_args) = simple_name(name)?;
    let method = MethodKind::from_name(&method_name)?;
    let args = positional_arguments(arguments_of(invocation)?)?;

    Some(CallSite {
        receiver,
        method,
        type_args,
        args,
    })
}

fn function_of(invocation: &SyntaxNode) -> Option<&SyntaxNode> {
    invocation
        .child_by_field("function")
        .or_else(|| invocation.child_nodes().next())
}

fn arguments_of(invocation: &SyntaxNode) -> Option<&SyntaxNode> {
    invocation
        .child_by_field("arguments")
        .or_else(|| invocation.child_of_kind(SyntaxKind::ARGUMENT_LIST))
}

fn member_parts(access: &SyntaxNode) -> Option<(&SyntaxNode, &SyntaxNode)> {
    let expression = access
        .child_by_field("expression")
        .or_else(|| access.child_nodes().next())?;
    let name = access
        .child_by_field("name")
        .or_else(|| access.child_nodes().last())?;
    if expression.id() == name.id() {
        return None;
    }
    Some((expression, name))
}

/// Rightmost identifier of `A`, `A.B` or `global::A.B`, ignoring generics.
fn last_identifier(expression: &SyntaxNode) -> Option<String> {
    match expression.kind() {
        SyntaxKind::IDENTIFIER => Some(expression.trimmed_text()),
        SyntaxKind::MEMBER_ACCESS_EXPRESSION => {
            let (_, name) = member_parts(expression)?;
            (name.kind() == SyntaxKind::IDENTIFIER).then(|| name.trimmed_text())
        }
        kind if kind == SyntaxKind::QUALIFIED_NAME || kind.as_str() == "alias_qualified_name" => {
            let name = expression
                .child_by_field("name")
                .or_else(|| expression.child_nodes().last())?;
            (name.kind() == SyntaxKind::IDENTIFIER).then(|| name.trimmed_text())
        }
        _ => None,
    }
}

/// Splits `Name` or `Name<T...>` into its text and type arguments.
fn simple_name(name: &SyntaxNode) -> Option<(String, Vec<SyntaxNode>)> {
    match name.kind() {
        SyntaxKind::IDENTIFIER => Some((name.trimmed_text(), Vec::new())),
        SyntaxKind::GENERIC_NAME => {
            let identifier = name
                .child_by_field("name")
                .or_else(|| name.child_of_kind(SyntaxKind::IDENTIFIER))?;
            let type_args = name
                .child_of_kind(SyntaxKind::TYPE_ARGUMENT_LIST)?
                .child_nodes()
                .cloned()
                .collect();
            Some((identifier.trimmed_text(), type_args))
        }
        _ => None,
    }
}

/// Argument expressions, or `None` if any argument is named or passed by
/// `ref`, `out` or `in`.
fn positional_arguments(list: &SyntaxNode) -> Option<Vec<SyntaxNode>> {
    list.child_nodes()
        .map(|argument| {
            if argument.kind() != SyntaxKind::ARGUMENT {
                return None;
            }
            let named = argument.child_by_field("name").is_some() || argument.has_token(":");
            let by_ref = ["ref", "out", "in"].iter().any(|m| argument.has_token(m));
            if named || by_ref {
                return None;
            }
            argument.child_nodes().last().cloned()
        })
        .collect()
}

#[derive(Debug)]
struct ParsedConstraint {
    verb: ConstraintVerb,
    negated: bool,
    args: Vec<SyntaxNode>,
    type_args: Vec<SyntaxNode>,
}

/// Parses `Root[.Not].Verb`, `Root[.Not].Verb(args)` or
/// `Root[.Not].Verb<T>()` where `Root` is `Is`, `Has` or `Does`.
fn parse_constraint(expression: &SyntaxNode) -> Option<ParsedConstraint> {
    let (access, args) = match expression.kind() {
        SyntaxKind::INVOCATION_EXPRESSION => {
            let function = function_of(expression)?;
            (function, positional_arguments(arguments_of(expression)?)?)
        }
        SyntaxKind::MEMBER_ACCESS_EXPRESSION => (expression, Vec::new()),
        _ => return None,
    };
    if access.kind() != SyntaxKind::MEMBER_ACCESS_EXPRESSION {
        return None;
    }

    let (qualifier, name) = member_parts(access)?;
    let (verb_name, type_args) = simple_name(name)?;
    let verb = ConstraintVerb::from_constraint_name(&verb_name)?;
    let negated = parse_qualifiers(qualifier, 1)?;

    Some(ParsedConstraint {
        verb,
        negated,
        args,
        type_args,
    })
}

/// Walks the qualifier chain left of the verb. Returns whether it negates.
fn parse_qualifiers(qualifier: &SyntaxNode, depth: usize) -> Option<bool> {
    if depth > MAX_QUALIFIER_DEPTH {
        return None;
    }
    match qualifier.kind() {
        SyntaxKind::IDENTIFIER => {
            let text = qualifier.trimmed_text();
            CONSTRAINT_ROOTS.contains(&text.as_str()).then_some(false)
        }
        SyntaxKind::MEMBER_ACCESS_EXPRESSION => {
            let (root, name) = member_parts(qualifier)?;
            if name.kind() != SyntaxKind::IDENTIFIER {
                return None;
            }
            let negator = name.trimmed_text();
            if !NEGATORS.contains(&negator.as_str()) {
                return None;
            }
            // A single negation only; `Is.Not.Not` has no shape.
            match parse_qualifiers(root, depth + 1)? {
                false => Some(true),
                true => None,
            }
        }
        _ => None,
    }
}
