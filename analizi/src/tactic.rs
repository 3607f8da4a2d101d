//! Tactics, used as hints to synthesise placeholders.

use crate::Expr;
use alloc::boxed::Box;
use core::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq)]
pub enum Tactic {
    /// do nothing
    Id,
    /// always fail
    Fail,
    /// close the goal with a hypothesis
    Assumption,
    /// succeed only if no goals are left
    Now,
    Exact(Expr),
    Apply(Expr),
    Repeat(Box<Tactic>),
    /// `t1 ; t2`
    Then(Box<Tactic>, Box<Tactic>),
    /// `t1 | t2`
    OrElse(Box<Tactic>, Box<Tactic>),
}

impl Tactic {
    pub fn then(self, other: Self) -> Self {
        Self::Then(Box::new(self), Box::new(other))
    }

    pub fn or_else(self, other: Self) -> Self {
        Self::OrElse(Box::new(self), Box::new(other))
    }
}

impl Display for Tactic {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Id => "id".fmt(f),
            Self::Fail => "fail".fmt(f),
            Self::Assumption => "assumption".fmt(f),
            Self::Now => "now".fmt(f),
            Self::Exact(e) => write!(f, "exact {}", e),
            Self::Apply(e) => write!(f, "apply {}", e),
            Self::Repeat(t) => write!(f, "repeat ({})", t),
            Self::Then(t1, t2) => write!(f, "({} ; {})", t1, t2),
            Self::OrElse(t1, t2) => write!(f, "({} | {})", t1, t2),
        }
    }
}
