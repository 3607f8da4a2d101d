//! Universe levels.

use crate::Name;
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::{self, Display};

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Level {
    Zero,
    Succ(Rc<Level>),
    Max(Rc<Level>, Rc<Level>),
    IMax(Rc<Level>, Rc<Level>),
    /// universe parameter of a declaration
    Param(Name),
    /// universe declared by the `universe` command
    Global(Name),
    /// to be filled in by the elaborator
    Placeholder,
}

impl Level {
    pub fn succ(self) -> Self {
        Self::Succ(Rc::new(self))
    }

    pub fn max(self, other: Self) -> Self {
        Self::Max(Rc::new(self), Rc::new(other))
    }

    pub fn imax(self, other: Self) -> Self {
        Self::IMax(Rc::new(self), Rc::new(other))
    }

    /// Add a constant to a level.
    ///
    /// ~~~
    /// # use analizi::Level;
    /// assert_eq!(Level::Zero.add(2), Level::of_nat(2));
    /// ~~~
    pub fn add(self, n: usize) -> Self {
        (0..n).fold(self, |l, _| l.succ())
    }

    pub fn of_nat(n: usize) -> Self {
        Self::Zero.add(n)
    }

    /// Split a level into a base level and the number of successors on top of it.
    pub fn to_offset(&self) -> (&Self, usize) {
        let mut l = self;
        let mut n = 0;
        while let Self::Succ(pred) = l {
            l = pred;
            n += 1;
        }
        (l, n)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Self::Placeholder)
    }

    /// Fold n-ary `max` to the right.
    pub fn max_all(ls: Vec<Self>) -> Option<Self> {
        ls.into_iter().rev().reduce(|acc, l| l.max(acc))
    }

    /// Fold n-ary `imax` to the right.
    pub fn imax_all(ls: Vec<Self>) -> Option<Self> {
        ls.into_iter().rev().reduce(|acc, l| l.imax(acc))
    }

    /// Replace parameters `ps` by levels `ls`.
    pub fn instantiate(&self, ps: &[Name], ls: &[Level]) -> Self {
        match self {
            Self::Param(p) => match ps.iter().position(|q| q == p) {
                Some(i) => ls.get(i).cloned().unwrap_or_else(|| self.clone()),
                None => self.clone(),
            },
            Self::Succ(l) => l.instantiate(ps, ls).succ(),
            Self::Max(l1, l2) => l1.instantiate(ps, ls).max(l2.instantiate(ps, ls)),
            Self::IMax(l1, l2) => l1.instantiate(ps, ls).imax(l2.instantiate(ps, ls)),
            Self::Zero | Self::Global(_) | Self::Placeholder => self.clone(),
        }
    }

    /// Add the parameters of the level to `acc`, without duplicates.
    pub fn params(&self, acc: &mut Vec<Name>) {
        match self {
            Self::Param(p) => {
                if !acc.contains(p) {
                    acc.push(p.clone())
                }
            }
            Self::Succ(l) => l.params(acc),
            Self::Max(l1, l2) | Self::IMax(l1, l2) => {
                l1.params(acc);
                l2.params(acc)
            }
            Self::Zero | Self::Global(_) | Self::Placeholder => (),
        }
    }

    fn is_atomic(&self) -> bool {
        match self.to_offset() {
            (Self::Zero, _) => true,
            (_, 0) => !matches!(self, Self::Max(..) | Self::IMax(..)),
            _ => false,
        }
    }

    fn fmt_arg(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_atomic() {
            self.fmt(f)
        } else {
            write!(f, "({})", self)
        }
    }
}

impl Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.to_offset() {
            (Self::Zero, n) => n.fmt(f),
            (l, n) if n > 0 => {
                l.fmt_arg(f)?;
                write!(f, "+{}", n)
            }
            _ => match self {
                Self::Max(l1, l2) => {
                    write!(f, "max ")?;
                    l1.fmt_arg(f)?;
                    write!(f, " ")?;
                    l2.fmt_arg(f)
                }
                Self::IMax(l1, l2) => {
                    write!(f, "imax ")?;
                    l1.fmt_arg(f)?;
                    write!(f, " ")?;
                    l2.fmt_arg(f)
                }
                Self::Param(n) | Self::Global(n) => n.fmt(f),
                Self::Placeholder => "_".fmt(f),
                Self::Zero | Self::Succ(_) => Ok(()),
            },
        }
    }
}

#[test]
fn display() {
    let u = || Level::Param(Name::new("u"));
    let v = || Level::Global(Name::new("v"));
    assert_eq!(Level::of_nat(3).to_string(), "3");
    assert_eq!(u().add(2).to_string(), "u+2");
    assert_eq!(u().max(v().succ()).to_string(), "max u (v+1)");
    assert_eq!(u().max(v()).add(1).to_string(), "(max u v)+1");
    let ls = Vec::from([u(), v(), Level::Zero]);
    assert_eq!(Level::max_all(ls).unwrap().to_string(), "max u (max v 0)");
}

#[test]
fn instantiate() {
    let u = Name::new("u");
    let l = Level::Param(u.clone()).max(Level::Zero).succ();
    let inst = l.instantiate(&[u], &[Level::of_nat(1)]);
    assert_eq!(inst, Level::of_nat(1).max(Level::Zero).succ());

    let mut ps = Vec::new();
    l.params(&mut ps);
    l.params(&mut ps);
    assert_eq!(ps, Vec::from([Name::new("u")]));
}
