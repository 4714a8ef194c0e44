//! The built-in shape table.
//!
//! Argument order follows NUnit: `AreEqual(expected, actual)`,
//! `Contains(expected, collection)`, `StartsWith(expected, actual)`, while
//! `CollectionAssert.Contains(collection, expected)` and the comparison
//! asserts (`Greater(arg1, arg2)`) put the subject first.

use super::{ConstraintVerb, Family, MethodKind, ReceiverKind, Shape, ShapeKey, TargetVerb};
use crate::migrate::rules::{Operand, RewriteRule, TargetArg};

use ConstraintVerb as C;
use MethodKind as M;
use Operand::{Arg, ConstraintArg, ConstraintTypeArg, ConstraintTypeOfArg, TypeArg, TypeOfArg};
use ReceiverKind::{Assert, CollectionAssert, StringAssert};
use TargetVerb as V;

pub fn shapes() -> Vec<Shape> {
    let mut shapes = direct_shapes();
    shapes.extend(nullary_shapes());
    shapes.extend(throwing_shapes());
    shapes.extend(constraint_shapes());
    shapes
}

fn shape(
    receiver: ReceiverKind,
    method: MethodKind,
    arg_count: usize,
    family: Family,
    rule: RewriteRule,
) -> Shape {
    Shape::new(ShapeKey::new(receiver, method, arg_count), family, rule)
}

/// `subject.verb(expected)` with NUnit's (expected, actual) order.
fn expected_actual(receiver: ReceiverKind, method: MethodKind, verb: TargetVerb) -> Shape {
    shape(
        receiver,
        method,
        2,
        Family::Direct,
        RewriteRule::fluent(Arg(1), verb).arg(Arg(0)),
    )
}

/// `subject.verb(other)` where the subject comes first.
fn subject_first(receiver: ReceiverKind, method: MethodKind, verb: TargetVerb) -> Shape {
    shape(
        receiver,
        method,
        2,
        Family::Direct,
        RewriteRule::fluent(Arg(0), verb).arg(Arg(1)),
    )
}

fn nullary(receiver: ReceiverKind, method: MethodKind, verb: TargetVerb) -> Shape {
    shape(receiver, method, 1, Family::NullaryTarget, RewriteRule::fluent(Arg(0), verb))
}

fn direct_shapes() -> Vec<Shape> {
    vec![
        expected_actual(Assert, M::AreEqual, V::Equal),
        expected_actual(Assert, M::AreNotEqual, V::NotEqual),
        expected_actual(Assert, M::AreSame, V::BeSameAs),
        expected_actual(Assert, M::AreNotSame, V::NotBeSameAs),
        expected_actual(Assert, M::IsAssignableFrom, V::BeAssignableTo),
        expected_actual(Assert, M::Contains, V::Contain),
        subject_first(Assert, M::Greater, V::BeGreaterThan),
        subject_first(Assert, M::GreaterOrEqual, V::BeGreaterThanOrEqualTo),
        subject_first(Assert, M::Less, V::BeLessThan),
        subject_first(Assert, M::LessOrEqual, V::BeLessThanOrEqualTo),
        expected_actual(CollectionAssert, M::AreEqual, V::Equal),
        expected_actual(CollectionAssert, M::AreNotEqual, V::NotEqual),
        shape(
            CollectionAssert,
            M::AreEquivalent,
            2,
            Family::Direct,
            RewriteRule::fluent(Arg(1), V::Equal)
                .arg(Arg(0))
                .target_arg(TargetArg::IgnoreOrder),
        ),
        subject_first(CollectionAssert, M::Contains, V::Contain),
        subject_first(CollectionAssert, M::DoesNotContain, V::NotContain),
        shape(
            CollectionAssert,
            M::AllItemsAreInstancesOfType,
            2,
            Family::Direct,
            RewriteRule::fluent(Arg(0), V::AllSatisfy)
                .target_arg(TargetArg::ItemIsType(TypeOfArg(1))),
        ),
        shape(
            CollectionAssert,
            M::AllItemsAreNotNull,
            1,
            Family::Direct,
            RewriteRule::fluent(Arg(0), V::NotContain).target_arg(TargetArg::ItemIsNull),
        ),
        expected_actual(StringAssert, M::Contains, V::Contain),
        expected_actual(StringAssert, M::DoesNotContain, V::NotContain),
        expected_actual(StringAssert, M::StartsWith, V::StartWith),
        expected_actual(StringAssert, M::EndsWith, V::EndWith),
    ]
}

fn nullary_shapes() -> Vec<Shape> {
    let mut shapes = vec![
        nullary(Assert, M::IsTrue, V::BeTrue),
        nullary(Assert, M::True, V::BeTrue),
        nullary(Assert, M::IsFalse, V::BeFalse),
        nullary(Assert, M::False, V::BeFalse),
        nullary(Assert, M::IsNull, V::BeNull),
        nullary(Assert, M::Null, V::BeNull),
        nullary(Assert, M::IsNotNull, V::NotBeNull),
        nullary(Assert, M::NotNull, V::NotBeNull),
        nullary(Assert, M::IsEmpty, V::BeEmpty),
        nullary(Assert, M::IsNotEmpty, V::NotBeEmpty),
        nullary(CollectionAssert, M::IsEmpty, V::BeEmpty),
        nullary(CollectionAssert, M::IsNotEmpty, V::NotBeEmpty),
        nullary(CollectionAssert, M::AllItemsAreUnique, V::BeUnique),
        shape(
            Assert,
            M::IsNaN,
            1,
            Family::NullaryTarget,
            RewriteRule::nan_check(Arg(0), V::BeTrue),
        ),
    ];

    for (method, verb) in [(M::IsInstanceOf, V::BeOfType), (M::IsNotInstanceOf, V::NotBeOfType)] {
        // IsInstanceOf<T>(actual)
        shapes.push(shape(
            Assert,
            method,
            1,
            Family::NullaryTarget,
            RewriteRule::fluent(Arg(0), verb).type_arg(TypeArg),
        ));
        // IsInstanceOf(typeof(T), actual)
        shapes.push(shape(
            Assert,
            method,
            2,
            Family::NullaryTarget,
            RewriteRule::fluent(Arg(1), verb).type_arg(TypeOfArg(0)),
        ));
    }

    shapes
}

fn throwing_shapes() -> Vec<Shape> {
    vec![
        shape(
            Assert,
            M::Throws,
            1,
            Family::Throwing,
            RewriteRule::on_static(V::Throw).type_arg(TypeArg).arg(Arg(0)),
        ),
        shape(
            Assert,
            M::ThrowsAsync,
            1,
            Family::Throwing,
            RewriteRule::on_static(V::ThrowAsync).type_arg(TypeArg).arg(Arg(0)),
        ),
        shape(
            Assert,
            M::DoesNotThrow,
            1,
            Family::Throwing,
            RewriteRule::on_static(V::NotThrow).arg(Arg(0)),
        ),
        shape(
            Assert,
            M::DoesNotThrowAsync,
            1,
            Family::Throwing,
            RewriteRule::on_static(V::NotThrowAsync).arg(Arg(0)),
        ),
    ]
}

/// Constraint verbs that forward their single argument:
/// (verb, positive target, negated target).
const FORWARDING_CONSTRAINTS: &[(ConstraintVerb, TargetVerb, TargetVerb)] = &[
    (C::EqualTo, V::Equal, V::NotEqual),
    (C::GreaterThan, V::BeGreaterThan, V::NotBeGreaterThan),
    (C::GreaterThanOrEqualTo, V::BeGreaterThanOrEqualTo, V::NotBeGreaterThanOrEqualTo),
    (C::LessThan, V::BeLessThan, V::NotBeLessThan),
    (C::LessThanOrEqualTo, V::BeLessThanOrEqualTo, V::NotBeLessThanOrEqualTo),
    (C::Contain, V::Contain, V::NotContain),
    (C::Member, V::Contain, V::NotContain),
    (C::StringContaining, V::Contain, V::NotContain),
    (C::StartWith, V::StartWith, V::NotStartWith),
    (C::StringStarting, V::StartWith, V::NotStartWith),
    (C::EndWith, V::EndWith, V::NotEndWith),
    (C::StringEnding, V::EndWith, V::NotEndWith),
];

/// Constraint verbs without arguments: (verb, positive, negated if any).
const NULLARY_CONSTRAINTS: &[(ConstraintVerb, TargetVerb, Option<TargetVerb>)] = &[
    (C::Null, V::BeNull, Some(V::NotBeNull)),
    (C::Empty, V::BeEmpty, Some(V::NotBeEmpty)),
    (C::Unique, V::BeUnique, Some(V::NotBeUnique)),
    (C::True, V::BeTrue, None),
    (C::False, V::BeFalse, None),
];

fn constraint(verb: ConstraintVerb, negated: bool, arg_count: usize, rule: RewriteRule) -> Shape {
    Shape::new(ShapeKey::that(verb, negated, arg_count), Family::Constraint, rule)
}

fn constraint_shapes() -> Vec<Shape> {
    let mut shapes = Vec::new();

    for &(verb, positive, negative) in FORWARDING_CONSTRAINTS {
        for (negated, target) in [(false, positive), (true, negative)] {
            shapes.push(constraint(
                verb,
                negated,
                1,
                RewriteRule::fluent(Arg(0), target).arg(ConstraintArg(0)),
            ));
        }
    }

    for &(verb, positive, negative) in NULLARY_CONSTRAINTS {
        shapes.push(constraint(verb, false, 0, RewriteRule::fluent(Arg(0), positive)));
        if let Some(negative) = negative {
            shapes.push(constraint(verb, true, 0, RewriteRule::fluent(Arg(0), negative)));
        }
    }

    for (negated, target) in [(false, V::BeOfType), (true, V::NotBeOfType)] {
        // Is.TypeOf<T>()
        shapes.push(constraint(
            C::TypeOf,
            negated,
            0,
            RewriteRule::fluent(Arg(0), target).type_arg(ConstraintTypeArg),
        ));
        // Is.TypeOf(typeof(T))
        shapes.push(constraint(
            C::TypeOf,
            negated,
            1,
            RewriteRule::fluent(Arg(0), target).type_arg(ConstraintTypeOfArg(0)),
        ));
    }

    shapes
}
