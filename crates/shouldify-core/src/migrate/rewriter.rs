/*!
# Rewriter

Builds the fluent replacement for a classified legacy call. The produced
expression carries no outer trivia; the editor dresses it in the trivia of
the node it replaces.
*/

use std::collections::HashSet;

use tracing::trace;

use super::patterns::MatchedCall;
use super::rules::{Captures, Operand, RewriteRule, Subject, TargetArg};
use crate::catalog::{ShapeKey, Vocabulary};
use crate::syntax::{make, SyntaxKind, SyntaxNode};

/// Errors raised while building a replacement.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RewriteError {
    #[error("operand {operand:?} of {shape} is missing from the matched call")]
    MissingOperand { operand: Operand, shape: String },
}

/// Expression kinds that must be parenthesized before `.verb(...)` can be
/// appended without changing precedence.
const LOOSE_BINDING_KINDS: &[&str] = &[
    "binary_expression",
    "conditional_expression",
    "assignment_expression",
    "lambda_expression",
    "anonymous_method_expression",
    "is_expression",
    "is_pattern_expression",
    "as_expression",
    "prefix_unary_expression",
    "postfix_unary_expression",
    "cast_expression",
    "await_expression",
    "conditional_access_expression",
    "switch_expression",
    "range_expression",
    "with_expression",
    "query_expression",
    "throw_expression",
    "ref_expression",
];

/// Declarations whose identifiers bound the scope a synthesized lambda
/// parameter must not collide with.
const MEMBER_KINDS: &[&str] = &[
    "method_declaration",
    "constructor_declaration",
    "destructor_declaration",
    "local_function_statement",
    "property_declaration",
    "indexer_declaration",
    "accessor_declaration",
    "operator_declaration",
    "conversion_operator_declaration",
    "field_declaration",
];

/// Whether `node` binds looser than member access.
pub fn needs_parentheses(node: &SyntaxNode) -> bool {
    LOOSE_BINDING_KINDS.contains(&node.kind().as_str())
}

/// Names visible around a rewrite site.
#[derive(Debug, Clone, Default)]
pub struct NameScope {
    taken: HashSet<String>,
}

impl NameScope {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collects every identifier under `node`.
    pub fn from_node(node: &SyntaxNode) -> Self {
        let taken = node
            .descendants()
            .filter(|p| p.node.kind() == SyntaxKind::IDENTIFIER)
            .map(|p| p.node.trimmed_text())
            .collect();
        Self { taken }
    }

    /// Scope of the innermost enclosing member in `ancestors` (outermost
    /// first), or of the whole tree when the call sits outside any member.
    pub fn enclosing(ancestors: &[SyntaxNode]) -> Self {
        ancestors
            .iter()
            .rev()
            .find(|node| MEMBER_KINDS.contains(&node.kind().as_str()))
            .or_else(|| ancestors.first())
            .map(Self::from_node)
            .unwrap_or_default()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// `base`, or `base1`, `base2`, ... whichever is free first.
    pub fn fresh(&self, base: &str) -> String {
        if !self.contains(base) {
            return base.to_string();
        }
        (1..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| !self.contains(candidate))
            .unwrap_or_else(|| base.to_string())
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Rewriter {
    vocabulary: Vocabulary,
}

impl Rewriter {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self { vocabulary }
    }

    pub fn vocabulary(&self) -> Vocabulary {
        self.vocabulary
    }

    /// Builds the replacement expression for `call`.
    pub fn build(
        &self,
        call: &MatchedCall<'_>,
        scope: &NameScope,
    ) -> Result<SyntaxNode, RewriteError> {
        let key = call.shape.key;
        let resolver = OperandResolver {
            captures: &call.captures,
            key,
        };

        let (receiver, verb, type_arg, args) = match &call.shape.rule {
            RewriteRule::Fluent {
                subject,
                verb,
                type_arg,
                args,
            } => (self.subject(&resolver, *subject)?, *verb, type_arg, args),
            RewriteRule::Static { verb, type_arg, args } => (
                make::identifier(self.vocabulary.static_receiver()),
                *verb,
                type_arg,
                args,
            ),
        };

        let type_args = type_arg
            .map(|operand| resolver.resolve(operand))
            .transpose()?
            .into_iter()
            .collect();

        let arguments = args
            .iter()
            .map(|arg| self.target_argument(&resolver, *arg, scope))
            .collect::<Result<Vec<_>, _>>()?;

        let method = make::simple_name(self.vocabulary.method_name(verb), type_args);
        let replacement = make::invocation(
            make::member_access(receiver, method),
            make::argument_list(arguments),
        );
        trace!("{} -> {}", key, replacement.text());
        Ok(replacement)
    }

    fn subject(
        &self,
        resolver: &OperandResolver<'_>,
        subject: Subject,
    ) -> Result<SyntaxNode, RewriteError> {
        match subject {
            Subject::Operand(operand) => {
                let expression = resolver.resolve(operand)?;
                Ok(if needs_parentheses(&expression) {
                    make::parenthesized(expression)
                } else {
                    expression
                })
            }
            Subject::NaNCheck(operand) => {
                let expression = resolver.resolve(operand)?;
                Ok(make::invocation(
                    make::member_access(make::predefined_type("double"), make::identifier("IsNaN")),
                    make::argument_list(vec![make::argument(expression)]),
                ))
            }
        }
    }

    fn target_argument(
        &self,
        resolver: &OperandResolver<'_>,
        arg: TargetArg,
        scope: &NameScope,
    ) -> Result<SyntaxNode, RewriteError> {
        Ok(match arg {
            TargetArg::Operand(operand) => make::argument(resolver.resolve(operand)?),
            TargetArg::IgnoreOrder => make::named_argument(
                self.vocabulary.ignore_order_flag(),
                make::boolean_literal(true),
            ),
            TargetArg::ItemIsType(operand) => {
                let ty = resolver.resolve(operand)?;
                let param = scope.fresh("item");
                make::argument(make::simple_lambda(
                    &param,
                    make::is_type(make::identifier(&param), ty),
                ))
            }
            TargetArg::ItemIsNull => {
                let param = scope.fresh("item");
                make::argument(make::simple_lambda(
                    &param,
                    make::binary(make::identifier(&param), "==", make::null_literal()),
                ))
            }
        })
    }
}

struct OperandResolver<'a> {
    captures: &'a Captures,
    key: ShapeKey,
}

impl OperandResolver<'_> {
    /// Captured syntax for `operand`, stripped of its outer trivia.
    fn resolve(&self, operand: Operand) -> Result<SyntaxNode, RewriteError> {
        self.captures
            .resolve(operand)
            .map(|node| node.trimmed())
            .ok_or_else(|| RewriteError::MissingOperand {
                operand,
                shape: self.key.to_string(),
            })
    }
}
