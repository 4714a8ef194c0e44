/*!
# Target Vocabulary

Abstract assertion verbs produced by rewrite rules, and the concrete method
names each supported vocabulary spells them with.
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Abstract verb of a fluent assertion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetVerb {
    Equal,
    NotEqual,
    BeSameAs,
    NotBeSameAs,
    BeTrue,
    BeFalse,
    BeNull,
    NotBeNull,
    BeOfType,
    NotBeOfType,
    BeAssignableTo,
    Contain,
    NotContain,
    AllSatisfy,
    BeUnique,
    NotBeUnique,
    StartWith,
    NotStartWith,
    EndWith,
    NotEndWith,
    BeEmpty,
    NotBeEmpty,
    BeGreaterThan,
    NotBeGreaterThan,
    BeGreaterThanOrEqualTo,
    NotBeGreaterThanOrEqualTo,
    BeLessThan,
    NotBeLessThan,
    BeLessThanOrEqualTo,
    NotBeLessThanOrEqualTo,
    Throw,
    ThrowAsync,
    NotThrow,
    NotThrowAsync,
}

impl TargetVerb {
    /// Verbs invoked on the vocabulary's static receiver instead of a subject.
    pub fn is_static(self) -> bool {
        matches!(
            self,
            TargetVerb::Throw
                | TargetVerb::ThrowAsync
                | TargetVerb::NotThrow
                | TargetVerb::NotThrowAsync
        )
    }

    /// (fluent, Shouldly) spellings.
    fn spellings(self) -> (&'static str, &'static str) {
        use TargetVerb::*;
        match self {
            Equal => ("shouldEqual", "ShouldBe"),
            NotEqual => ("shouldNotEqual", "ShouldNotBe"),
            BeSameAs => ("shouldBeSameAs", "ShouldBeSameAs"),
            NotBeSameAs => ("shouldNotBeSameAs", "ShouldNotBeSameAs"),
            BeTrue => ("shouldBeTrue", "ShouldBeTrue"),
            BeFalse => ("shouldBeFalse", "ShouldBeFalse"),
            BeNull => ("shouldBeNull", "ShouldBeNull"),
            NotBeNull => ("shouldNotBeNull", "ShouldNotBeNull"),
            BeOfType => ("shouldBeOfType", "ShouldBeOfType"),
            NotBeOfType => ("shouldNotBeOfType", "ShouldNotBeOfType"),
            BeAssignableTo => ("shouldBeAssignableTo", "ShouldBeAssignableTo"),
            Contain => ("shouldContain", "ShouldContain"),
            NotContain => ("shouldNotContain", "ShouldNotContain"),
            AllSatisfy => ("shouldAllSatisfy", "ShouldAllBe"),
            BeUnique => ("shouldBeUnique", "ShouldBeUnique"),
            NotBeUnique => ("shouldNotBeUnique", "ShouldNotBeUnique"),
            StartWith => ("shouldStartWith", "ShouldStartWith"),
            NotStartWith => ("shouldNotStartWith", "ShouldNotStartWith"),
            EndWith => ("shouldEndWith", "ShouldEndWith"),
            NotEndWith => ("shouldNotEndWith", "ShouldNotEndWith"),
            BeEmpty => ("shouldBeEmpty", "ShouldBeEmpty"),
            NotBeEmpty => ("shouldNotBeEmpty", "ShouldNotBeEmpty"),
            BeGreaterThan => ("shouldBeGreaterThan", "ShouldBeGreaterThan"),
            NotBeGreaterThan => ("shouldNotBeGreaterThan", "ShouldNotBeGreaterThan"),
            BeGreaterThanOrEqualTo => (
                "shouldBeGreaterThanOrEqualTo",
                "ShouldBeGreaterThanOrEqualTo",
            ),
            NotBeGreaterThanOrEqualTo => (
                "shouldNotBeGreaterThanOrEqualTo",
                "ShouldNotBeGreaterThanOrEqualTo",
            ),
            BeLessThan => ("shouldBeLessThan", "ShouldBeLessThan"),
            NotBeLessThan => ("shouldNotBeLessThan", "ShouldNotBeLessThan"),
            BeLessThanOrEqualTo => ("shouldBeLessThanOrEqualTo", "ShouldBeLessThanOrEqualTo"),
            NotBeLessThanOrEqualTo => (
                "shouldNotBeLessThanOrEqualTo",
                "ShouldNotBeLessThanOrEqualTo",
            ),
            Throw => ("throw", "Throw"),
            ThrowAsync => ("throwAsync", "ThrowAsync"),
            NotThrow => ("notThrow", "NotThrow"),
            NotThrowAsync => ("notThrowAsync", "NotThrowAsync"),
        }
    }
}

/// Concrete spelling of the fluent assertion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Vocabulary {
    /// `actual.shouldEqual(expected)`, `should.throw<T>(action)`.
    #[default]
    Fluent,
    /// `actual.ShouldBe(expected)`, `Should.Throw<T>(action)`.
    Shouldly,
}

impl Vocabulary {
    pub fn method_name(self, verb: TargetVerb) -> &'static str {
        let (fluent, shouldly) = verb.spellings();
        match self {
            Vocabulary::Fluent => fluent,
            Vocabulary::Shouldly => shouldly,
        }
    }

    /// Receiver of the static verbs.
    pub fn static_receiver(self) -> &'static str {
        match self {
            Vocabulary::Fluent => "should",
            Vocabulary::Shouldly => "Should",
        }
    }

    /// Name of the named argument that relaxes sequence ordering.
    pub fn ignore_order_flag(self) -> &'static str {
        "ignoreOrder"
    }

    pub fn name(self) -> &'static str {
        match self {
            Vocabulary::Fluent => "fluent",
            Vocabulary::Shouldly => "shouldly",
        }
    }
}

impl fmt::Display for Vocabulary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Vocabulary {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fluent" => Ok(Vocabulary::Fluent),
            "shouldly" => Ok(Vocabulary::Shouldly),
            other => Err(format!("unknown vocabulary '{other}' (expected 'fluent' or 'shouldly')")),
        }
    }
}
