//! Hierarchical names.

use alloc::rc::Rc;
use core::borrow::Borrow;
use core::fmt::{self, Display};

/// Name consisting of dot-separated components, such as `nat.succ`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Name(Rc<str>);

impl Name {
    pub fn new(s: &str) -> Self {
        Self(Rc::from(s))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Append a component.
    ///
    /// ~~~
    /// # use analizi::Name;
    /// assert_eq!(Name::new("l").append("1").as_str(), "l.1");
    /// ~~~
    pub fn append(&self, s: &str) -> Self {
        Self::new(&format!("{}.{}", self, s))
    }

    pub fn components(&self) -> impl Iterator<Item = &str> {
        self.0.split('.')
    }

    /// Return true if the name has only one component.
    pub fn is_atomic(&self) -> bool {
        !self.0.contains('.')
    }
}

impl Borrow<str> for Name {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Name {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Name {
    fn from(s: String) -> Self {
        Self(Rc::from(s))
    }
}

impl Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.0.fmt(f)
    }
}
