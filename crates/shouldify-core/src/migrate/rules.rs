/*!
# Rewrite Rules

Declarative description of how a matched legacy call is rebuilt. A rule
names the operands it relocates from the legacy call, the target verb and
any arguments the target call takes; the rewriter interprets it.
*/

use crate::catalog::TargetVerb;
use crate::syntax::{SyntaxKind, SyntaxNode};

/// A piece of the legacy call that a rule relocates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// Positional argument `n` of the legacy call.
    Arg(usize),
    /// Positional argument `n` of the constraint call (`Is.EqualTo(x)`).
    ConstraintArg(usize),
    /// Sole generic type argument of the legacy method (`Throws<T>`).
    TypeArg,
    /// Sole generic type argument of the constraint (`Is.TypeOf<T>()`).
    ConstraintTypeArg,
    /// Type named by `typeof(T)` at legacy argument `n`.
    TypeOfArg(usize),
    /// Type named by `typeof(T)` at constraint argument `n`.
    ConstraintTypeOfArg(usize),
}

/// Receiver of a fluent target call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Subject {
    Operand(Operand),
    /// `double.IsNaN(operand)`
    NaNCheck(Operand),
}

impl Subject {
    fn operand(self) -> Operand {
        match self {
            Subject::Operand(operand) | Subject::NaNCheck(operand) => operand,
        }
    }
}

/// Argument of the target call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetArg {
    Operand(Operand),
    /// `ignoreOrder: true`
    IgnoreOrder,
    /// `item => item is T`
    ItemIsType(Operand),
    /// `item => item == null`
    ItemIsNull,
}

impl TargetArg {
    pub fn synthesizes_predicate(self) -> bool {
        matches!(self, TargetArg::ItemIsType(_) | TargetArg::ItemIsNull)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RewriteRule {
    /// `subject.verb<type_arg>(args)`
    Fluent {
        subject: Subject,
        verb: TargetVerb,
        type_arg: Option<Operand>,
        args: Vec<TargetArg>,
    },
    /// `receiver.verb<type_arg>(args)` on the vocabulary's static receiver.
    Static {
        verb: TargetVerb,
        type_arg: Option<Operand>,
        args: Vec<TargetArg>,
    },
}

impl RewriteRule {
    pub fn fluent(subject: Operand, verb: TargetVerb) -> Self {
        RewriteRule::Fluent {
            subject: Subject::Operand(subject),
            verb,
            type_arg: None,
            args: Vec::new(),
        }
    }

    pub fn nan_check(subject: Operand, verb: TargetVerb) -> Self {
        RewriteRule::Fluent {
            subject: Subject::NaNCheck(subject),
            verb,
            type_arg: None,
            args: Vec::new(),
        }
    }

    pub fn on_static(verb: TargetVerb) -> Self {
        RewriteRule::Static {
            verb,
            type_arg: None,
            args: Vec::new(),
        }
    }

    pub fn arg(self, operand: Operand) -> Self {
        self.target_arg(TargetArg::Operand(operand))
    }

    pub fn target_arg(mut self, arg: TargetArg) -> Self {
        match &mut self {
            RewriteRule::Fluent { args, .. } | RewriteRule::Static { args, .. } => args.push(arg),
        }
        self
    }

    pub fn type_arg(mut self, operand: Operand) -> Self {
        match &mut self {
            RewriteRule::Fluent { type_arg, .. } | RewriteRule::Static { type_arg, .. } => {
                *type_arg = Some(operand)
            }
        }
        self
    }

    pub fn verb(&self) -> TargetVerb {
        match self {
            RewriteRule::Fluent { verb, .. } | RewriteRule::Static { verb, .. } => *verb,
        }
    }

    pub fn args(&self) -> &[TargetArg] {
        match self {
            RewriteRule::Fluent { args, .. } | RewriteRule::Static { args, .. } => args,
        }
    }

    /// Whether the target call takes a synthesized `item => ...` predicate.
    pub fn synthesizes_predicate(&self) -> bool {
        self.args().iter().any(|arg| arg.synthesizes_predicate())
    }

    /// Every operand the rule reads from the legacy call.
    pub fn operands(&self) -> Vec<Operand> {
        let (subject, type_arg, args) = match self {
            RewriteRule::Fluent {
                subject,
                type_arg,
                args,
                ..
            } => (Some(subject.operand()), *type_arg, args),
            RewriteRule::Static { type_arg, args, .. } => (None, *type_arg, args),
        };

        let mut operands: Vec<Operand> = subject.into_iter().chain(type_arg).collect();
        operands.extend(args.iter().filter_map(|arg| match arg {
            TargetArg::Operand(operand) | TargetArg::ItemIsType(operand) => Some(*operand),
            TargetArg::IgnoreOrder | TargetArg::ItemIsNull => None,
        }));
        operands
    }

    /// Whether the target call forwards at least one argument.
    pub fn forwards_arguments(&self) -> bool {
        !self.args().is_empty()
    }
}

/// Syntax captured from a matched legacy call.
#[derive(Debug, Clone, Default)]
pub struct Captures {
    pub args: Vec<SyntaxNode>,
    pub type_args: Vec<SyntaxNode>,
    pub constraint_args: Vec<SyntaxNode>,
    pub constraint_type_args: Vec<SyntaxNode>,
}

impl Captures {
    pub fn resolve(&self, operand: Operand) -> Option<SyntaxNode> {
        match operand {
            Operand::Arg(index) => self.args.get(index).cloned(),
            Operand::ConstraintArg(index) => self.constraint_args.get(index).cloned(),
            Operand::TypeArg => single(&self.type_args),
            Operand::ConstraintTypeArg => single(&self.constraint_type_args),
            Operand::TypeOfArg(index) => self.args.get(index).and_then(typeof_operand),
            Operand::ConstraintTypeOfArg(index) => {
                self.constraint_args.get(index).and_then(typeof_operand)
            }
        }
    }

    /// True when every operand of `rule` resolves.
    pub fn satisfy(&self, rule: &RewriteRule) -> bool {
        rule.operands().into_iter().all(|operand| self.resolve(operand).is_some())
    }
}

fn single(nodes: &[SyntaxNode]) -> Option<SyntaxNode> {
    match nodes {
        [node] => Some(node.clone()),
        _ => None,
    }
}

fn typeof_operand(node: &SyntaxNode) -> Option<SyntaxNode> {
    if node.kind() != SyntaxKind::TYPEOF_EXPRESSION {
        return None;
    }
    node.child_by_field("type")
        .or_else(|| node.child_nodes().next())
        .cloned()
}

/// Statistics for one catalog shape across a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleStats {
    pub shape: String,
    pub findings: u64,
    pub rewrites: u64,
    pub errors: u64,
}

impl RuleStats {
    pub fn new(shape: impl Into<String>) -> Self {
        Self {
            shape: shape.into(),
            ..Self::default()
        }
    }

    pub fn success_rate(&self) -> f64 {
        if self.findings == 0 {
            0.0
        } else {
            self.rewrites as f64 / self.findings as f64
        }
    }

    pub fn merge(&mut self, other: &RuleStats) {
        self.findings += other.findings;
        self.rewrites += other.rewrites;
        self.errors += other.errors;
    }
}
