/*!
# Shape Catalog

Immutable table mapping each recognized legacy call shape to the rewrite
rule that replaces it. Shapes are keyed by receiver, method, positional
argument count and, for `Assert.That`, the shape of the nested constraint.

The built-in catalog is constructed once per process and shared by every
matcher and rewriter.
*/

use std::fmt;
use std::sync::LazyLock;

use indexmap::IndexMap;

use crate::migrate::rules::RewriteRule;

pub mod builtin;
pub mod vocabulary;

pub use vocabulary::{TargetVerb, Vocabulary};

macro_rules! named_enum {
    ($(#[$meta:meta])* $vis:vis enum $name:ident { $($variant:ident),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis enum $name {
            $($variant),+
        }

        impl $name {
            pub fn name(self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),+
                }
            }

            pub fn from_name(name: &str) -> Option<Self> {
                match name {
                    $(stringify!($variant) => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }
    };
}

named_enum! {
    /// Static receiver class of a legacy assertion.
    pub enum ReceiverKind {
        Assert,
        CollectionAssert,
        StringAssert,
    }
}

impl ReceiverKind {
    /// Resolves a receiver by its simple name. `ClassicAssert` is NUnit's
    /// legacy home of the classic model and behaves as `Assert`.
    pub fn from_simple_name(name: &str) -> Option<Self> {
        match name {
            "ClassicAssert" => Some(ReceiverKind::Assert),
            other => Self::from_name(other),
        }
    }
}

named_enum! {
    /// Legacy assertion method.
    pub enum MethodKind {
        AreEqual,
        AreNotEqual,
        AreSame,
        AreNotSame,
        IsTrue,
        True,
        IsFalse,
        False,
        IsNull,
        Null,
        IsNotNull,
        NotNull,
        IsNaN,
        IsEmpty,
        IsNotEmpty,
        IsInstanceOf,
        IsNotInstanceOf,
        IsAssignableFrom,
        Contains,
        DoesNotContain,
        StartsWith,
        EndsWith,
        Greater,
        GreaterOrEqual,
        Less,
        LessOrEqual,
        AreEquivalent,
        AllItemsAreInstancesOfType,
        AllItemsAreNotNull,
        AllItemsAreUnique,
        Throws,
        ThrowsAsync,
        DoesNotThrow,
        DoesNotThrowAsync,
        That,
    }
}

named_enum! {
    /// Final verb of an `Assert.That` constraint expression.
    pub enum ConstraintVerb {
        EqualTo,
        GreaterThan,
        GreaterThanOrEqualTo,
        LessThan,
        LessThanOrEqualTo,
        Contain,
        StartWith,
        EndWith,
        Member,
        Unique,
        Empty,
        Null,
        True,
        False,
        TypeOf,
        StringContaining,
        StringStarting,
        StringEnding,
    }
}

impl ConstraintVerb {
    /// Accepts the NUnit spellings that share a meaning (`Contains`,
    /// `StartsWith`, `EndsWith`).
    pub fn from_constraint_name(name: &str) -> Option<Self> {
        match name {
            "Contains" => Some(ConstraintVerb::Contain),
            "StartsWith" => Some(ConstraintVerb::StartWith),
            "EndsWith" => Some(ConstraintVerb::EndWith),
            other => Self::from_name(other),
        }
    }
}

/// Shape of a nested constraint: verb, negation and argument count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintShape {
    pub verb: ConstraintVerb,
    pub negated: bool,
    pub arg_count: usize,
}

/// Identity of a catalog shape. Also used as the shape id of findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeKey {
    pub receiver: ReceiverKind,
    pub method: MethodKind,
    pub arg_count: usize,
    pub constraint: Option<ConstraintShape>,
}

impl ShapeKey {
    pub fn new(receiver: ReceiverKind, method: MethodKind, arg_count: usize) -> Self {
        Self {
            receiver,
            method,
            arg_count,
            constraint: None,
        }
    }

    /// `Assert.That(actual, <constraint>)`.
    pub fn that(verb: ConstraintVerb, negated: bool, arg_count: usize) -> Self {
        Self {
            receiver: ReceiverKind::Assert,
            method: MethodKind::That,
            arg_count: 2,
            constraint: Some(ConstraintShape {
                verb,
                negated,
                arg_count,
            }),
        }
    }
}

impl fmt::Display for ShapeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}({})", self.receiver, self.method, self.arg_count)?;
        if let Some(constraint) = &self.constraint {
            let not = if constraint.negated { "Not." } else { "" };
            write!(f, "[{}{}({})]", not, constraint.verb, constraint.arg_count)?;
        }
        Ok(())
    }
}

/// Rule family; each family is matched by the same decomposition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// Target call forwards one or more arguments.
    Direct,
    /// `Assert.That(actual, constraint)`.
    Constraint,
    /// Exception assertions targeting the static receiver.
    Throwing,
    /// Target call takes no arguments.
    NullaryTarget,
}

#[derive(Debug, Clone)]
pub struct Shape {
    pub key: ShapeKey,
    pub family: Family,
    pub rule: RewriteRule,
}

impl Shape {
    pub fn new(key: ShapeKey, family: Family, rule: RewriteRule) -> Self {
        Self { key, family, rule }
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("duplicate catalog shape {key}")]
    DuplicateKey { key: String },

    #[error("shape {key} is registered in the wrong family: {reason}")]
    FamilyMismatch { key: String, reason: &'static str },
}

#[derive(Debug, Clone)]
pub struct Catalog {
    shapes: IndexMap<ShapeKey, Shape>,
}

static BUILTIN: LazyLock<Catalog> = LazyLock::new(|| match Catalog::builtin() {
    Ok(catalog) => catalog,
    // A malformed built-in table is a programming error, never a runtime condition.
    Err(e) => panic!("built-in assertion catalog is invalid: {e}"),
});

impl Catalog {
    pub fn from_shapes(shapes: impl IntoIterator<Item = Shape>) -> Result<Self, CatalogError> {
        let mut table = IndexMap::new();
        for shape in shapes {
            check_family(&shape)?;
            let key = shape.key;
            if table.insert(key, shape).is_some() {
                return Err(CatalogError::DuplicateKey {
                    key: key.to_string(),
                });
            }
        }
        Ok(Self { shapes: table })
    }

    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_shapes(builtin::shapes())
    }

    /// Process-wide built-in catalog.
    pub fn global() -> &'static Catalog {
        &BUILTIN
    }

    pub fn lookup(&self, key: &ShapeKey) -> Option<&Shape> {
        self.shapes.get(key)
    }

    pub fn rule_for(
        &self,
        receiver: ReceiverKind,
        method: MethodKind,
        arg_count: usize,
    ) -> Option<&RewriteRule> {
        self.lookup(&ShapeKey::new(receiver, method, arg_count))
            .map(|shape| &shape.rule)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> + '_ {
        self.shapes.values()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }
}

fn check_family(shape: &Shape) -> Result<(), CatalogError> {
    let reason = match shape.family {
        Family::Constraint if shape.key.constraint.is_none() => {
            Some("constraint shape without constraint")
        }
        Family::Constraint => None,
        _ if shape.key.constraint.is_some() => Some("constraint key outside the constraint family"),
        Family::Throwing if !matches!(shape.rule, RewriteRule::Static { .. }) => {
            Some("throwing shape must target the static receiver")
        }
        Family::Direct if !shape.rule.forwards_arguments() => {
            Some("direct shape forwards no arguments")
        }
        Family::NullaryTarget if shape.rule.forwards_arguments() => {
            Some("nullary shape forwards arguments")
        }
        _ => None,
    };
    match reason {
        Some(reason) => Err(CatalogError::FamilyMismatch {
            key: shape.key.to_string(),
            reason,
        }),
        None => Ok(()),
    }
}
