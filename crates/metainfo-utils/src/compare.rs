use std::{cmp::Ordering, fmt, str::FromStr};

use crate::{
    error::{ParseError, ParseResult},
    vercmp::{compare_versions, VercmpFlags},
};

/// Comparison operator carried by a relation.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Compare {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    #[default]
    Ge,
}

impl Compare {
    pub const ALL: [Compare; 6] = [
        Compare::Eq,
        Compare::Ne,
        Compare::Lt,
        Compare::Gt,
        Compare::Le,
        Compare::Ge,
    ];

    /// Whether `ordering`, the result of comparing left to right, satisfies
    /// this operator.
    pub fn matches(self, ordering: Ordering) -> bool {
        match self {
            Compare::Eq => ordering == Ordering::Equal,
            Compare::Ne => ordering != Ordering::Equal,
            Compare::Lt => ordering == Ordering::Less,
            Compare::Gt => ordering == Ordering::Greater,
            Compare::Le => ordering != Ordering::Greater,
            Compare::Ge => ordering != Ordering::Less,
        }
    }

    /// Tests `a <op> b` on plain ordered values.
    pub fn holds<T: Ord + ?Sized>(self, a: &T, b: &T) -> bool {
        self.matches(a.cmp(b))
    }

    /// Tests `a <op> b` using version ordering.
    pub fn matches_versions(self, a: Option<&str>, b: Option<&str>, flags: VercmpFlags) -> bool {
        self.matches(compare_versions(a, b, flags))
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Compare::Eq => "eq",
            Compare::Ne => "ne",
            Compare::Lt => "lt",
            Compare::Gt => "gt",
            Compare::Le => "le",
            Compare::Ge => "ge",
        }
    }

    /// Two-character form used in version prefixes, e.g. `>=`.
    pub fn as_symbols(self) -> &'static str {
        match self {
            Compare::Eq => "==",
            Compare::Ne => "!=",
            Compare::Lt => "<<",
            Compare::Gt => ">>",
            Compare::Le => "<=",
            Compare::Ge => ">=",
        }
    }

    /// Human readable operator, for messages.
    pub fn as_math(self) -> &'static str {
        match self {
            Compare::Eq => "=",
            Compare::Ne => "≠",
            Compare::Lt => "<",
            Compare::Gt => ">",
            Compare::Le => "≤",
            Compare::Ge => "≥",
        }
    }
}

impl FromStr for Compare {
    type Err = ParseError;

    fn from_str(s: &str) -> ParseResult<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ParseError::Empty { kind: "comparison" });
        }
        Compare::ALL
            .into_iter()
            .find(|c| c.as_str() == s || c.as_symbols() == s)
            .ok_or_else(|| {
                ParseError::UnknownValue {
                    kind: "comparison",
                    value: s.to_string(),
                }
            })
    }
}

impl fmt::Display for Compare {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
