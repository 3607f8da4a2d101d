//! Declarations, universes and notation of a session.

use crate::kernel::{IdExtension, NormalizerExtension};
use crate::notation::{NotationEntry, Tables};
use crate::{Expr, Name};
use alloc::rc::Rc;
use alloc::vec::Vec;
use core::fmt::{self, Display};

/// Immutable HashMap for fast cloning of environments.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;
type FnvHashSet<K> = im::hashset::HashSet<K, fnv::FnvBuildHasher>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeclKind {
    Axiom,
    Definition,
    Theorem,
}

impl Display for DeclKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Axiom => "axiom",
            Self::Definition => "definition",
            Self::Theorem => "theorem",
        }
        .fmt(f)
    }
}

/// Declaration of a constant.
#[derive(Clone, Debug)]
pub struct Decl {
    pub name: Name,
    pub univ_params: Vec<Name>,
    pub ty: Expr,
    pub value: Option<Expr>,
    pub kind: DeclKind,
}

impl Decl {
    pub fn axiom(name: Name, univ_params: Vec<Name>, ty: Expr) -> Self {
        let (value, kind) = (None, DeclKind::Axiom);
        Self { name, univ_params, ty, value, kind }
    }

    pub fn definition(name: Name, univ_params: Vec<Name>, ty: Expr, value: Expr) -> Self {
        let (value, kind) = (Some(value), DeclKind::Definition);
        Self { name, univ_params, ty, value, kind }
    }

    pub fn theorem(name: Name, univ_params: Vec<Name>, ty: Expr, value: Expr) -> Self {
        let (value, kind) = (Some(value), DeclKind::Theorem);
        Self { name, univ_params, ty, value, kind }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    Reintroduction(Name),
    UniverseReintroduction(Name),
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Reintroduction(n) => write!(f, "already declared object '{}'", n),
            Self::UniverseReintroduction(n) => write!(f, "already declared universe '{}'", n),
        }
    }
}

/// Environment of a session.
///
/// Besides declarations and universes, the environment holds
/// the tables that drive the parser, as well as
/// the normalizer extension of the kernel.
/// Cloning an environment is cheap.
#[derive(Clone)]
pub struct Environment {
    decls: FnvHashMap<Name, Rc<Decl>>,
    universes: FnvHashSet<Name>,
    tables: Tables,
    /// global notation, replayed when a scope is closed
    notations: im::Vector<NotationEntry>,
    ext: Rc<dyn NormalizerExtension>,
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

impl Environment {
    /// Construct an environment with the builtin notation and commands.
    pub fn new() -> Self {
        Self::with_tables(crate::parser::builtin::tables())
    }

    pub fn with_tables(tables: Tables) -> Self {
        Self {
            decls: Default::default(),
            universes: Default::default(),
            tables,
            notations: im::Vector::new(),
            ext: Rc::new(IdExtension),
        }
    }

    pub fn get(&self, name: &str) -> Option<&Decl> {
        self.decls.get(name).map(|d| &**d)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.decls.contains_key(name)
    }

    /// Add a declaration, failing if its name is already declared.
    ///
    /// ~~~
    /// # use analizi::{Environment, Expr, Name};
    /// # use analizi::env::{Decl, Error};
    /// let mut env = Environment::new();
    /// let decl = || Decl::axiom(Name::new("A"), Vec::new(), Expr::prop());
    /// assert!(env.add(decl()).is_ok());
    /// assert_eq!(env.add(decl()), Err(Error::Reintroduction(Name::new("A"))));
    /// ~~~
    pub fn add(&mut self, decl: Decl) -> Result<(), Error> {
        if self.contains(decl.name.as_str()) {
            return Err(Error::Reintroduction(decl.name));
        }
        debug!("Add {} {}", decl.kind, decl.name);
        self.decls.insert(decl.name.clone(), Rc::new(decl));
        Ok(())
    }

    pub fn decls(&self) -> impl Iterator<Item = &Decl> {
        self.decls.values().map(|d| &**d)
    }

    pub fn add_universe(&mut self, name: Name) -> Result<(), Error> {
        if self.universes.contains(&name) {
            return Err(Error::UniverseReintroduction(name));
        }
        debug!("Add universe {}", name);
        self.universes.insert(name);
        Ok(())
    }

    pub fn is_universe(&self, name: &str) -> bool {
        self.universes.contains(name)
    }

    pub fn tables(&self) -> &Tables {
        &self.tables
    }

    pub fn set_tables(&mut self, tables: Tables) {
        self.tables = tables
    }

    /// Add notation to the tables.
    ///
    /// Persistent notation survives the closing of the scope it was declared in.
    pub fn add_notation(&mut self, entry: NotationEntry, persistent: bool) {
        entry.apply(&mut self.tables);
        if persistent {
            self.notations.push_back(entry)
        }
    }

    /// Number of persistent notation entries.
    pub fn notation_count(&self) -> usize {
        self.notations.len()
    }

    /// Reapply the persistent notation entries declared since the `from`-th one.
    pub fn replay_notations(&mut self, from: usize) {
        for entry in self.notations.iter().skip(from) {
            entry.apply(&mut self.tables)
        }
    }

    pub fn extension(&self) -> &Rc<dyn NormalizerExtension> {
        &self.ext
    }

    pub fn set_extension(&mut self, ext: Rc<dyn NormalizerExtension>) {
        self.ext = ext
    }
}
