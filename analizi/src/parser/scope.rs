//! Local scopes and local declarations.

use super::{Parameter, Parser, Snapshot};
use crate::error::Error;
use crate::expr::{BinderInfo, Expr, Local};
use crate::{Level, Name};
use core::ops::{Deref, DerefMut};

/// Local scope that is closed when dropped.
pub struct LocalScope<'p, 'a>(&'p mut Parser<'a>);

impl<'p, 'a> Deref for LocalScope<'p, 'a> {
    type Target = Parser<'a>;
    fn deref(&self) -> &Self::Target {
        self.0
    }
}

impl<'p, 'a> DerefMut for LocalScope<'p, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.0
    }
}

impl<'p, 'a> Drop for LocalScope<'p, 'a> {
    fn drop(&mut self) {
        self.0.pop_local_scope();
    }
}

/// Scope in which `Type` introduces fresh universe parameters
/// and unknown universe names are declared on first use.
pub struct ParamUniverseScope<'p, 'a> {
    p: &'p mut Parser<'a>,
    old: bool,
}

impl<'p, 'a> Deref for ParamUniverseScope<'p, 'a> {
    type Target = Parser<'a>;
    fn deref(&self) -> &Self::Target {
        self.p
    }
}

impl<'p, 'a> DerefMut for ParamUniverseScope<'p, 'a> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.p
    }
}

impl<'p, 'a> Drop for ParamUniverseScope<'p, 'a> {
    fn drop(&mut self) {
        self.p.type_use_placeholder = self.old;
    }
}

impl<'a> Parser<'a> {
    /// Open a local scope.
    ///
    /// Local declarations and notation added from now on
    /// are discarded when the scope is closed,
    /// except for notation that was added persistently.
    pub fn push_local_scope(&mut self) {
        self.local_level_decls.push();
        self.local_decls.push();
        self.scopes.push(Snapshot {
            tables: self.env.tables().clone(),
            notations: self.env.notation_count(),
        });
        trace!("push local scope (depth {})", self.scopes.len());
    }

    /// Close the innermost local scope.
    ///
    /// Return false if there is no open scope.
    pub fn pop_local_scope(&mut self) -> bool {
        let snapshot = match self.scopes.pop() {
            Some(snapshot) => snapshot,
            None => return false,
        };
        trace!("pop local scope (depth {})", self.scopes.len());
        self.local_level_decls.pop();
        self.local_decls.pop();
        self.env.set_tables(snapshot.tables);
        self.env.replay_notations(snapshot.notations);
        true
    }

    /// Open a local scope that is closed when the result is dropped.
    pub fn local_scope(&mut self) -> LocalScope<'_, 'a> {
        self.push_local_scope();
        LocalScope(self)
    }

    /// Run `f` in a new local scope.
    pub fn with_local_scope<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        let mut scope = self.local_scope();
        f(&mut scope)
    }

    /// Run `f`, forgetting the locals it declares.
    ///
    /// Unlike [`Parser::with_local_scope`], this keeps
    /// universe levels and notation declared by `f`.
    pub(crate) fn with_binder_scope<T, F>(&mut self, f: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Self) -> Result<T, Error>,
    {
        self.local_decls.push();
        let r = f(self);
        self.local_decls.pop();
        r
    }

    /// Parse with `Type` introducing universe parameters
    /// until the result is dropped.
    pub fn param_universe_scope(&mut self) -> ParamUniverseScope<'_, 'a> {
        let old = self.type_use_placeholder;
        self.type_use_placeholder = false;
        ParamUniverseScope { p: self, old }
    }

    /// Number of open local scopes.
    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn add_local_level(&mut self, name: Name, l: Level) {
        self.local_level_decls.insert(name, l)
    }

    /// Declare a local under the given name.
    pub fn add_local_expr(&mut self, name: Name, local: Local, info: BinderInfo) {
        let pos = self.pos();
        self.local_decls.insert(name, Parameter { pos, local, info })
    }

    /// Declare a local under its own name.
    pub fn add_local(&mut self, local: Local) {
        let info = local.info;
        self.add_local_expr(local.name.clone(), local, info)
    }

    pub fn add_parameter(&mut self, p: Parameter) {
        self.local_decls.insert(p.local.name.clone(), p)
    }

    pub fn get_local(&self, name: &str) -> Option<&Parameter> {
        self.local_decls.get(name)
    }

    /// Index of a local declaration, in order of declaration.
    pub fn get_local_index(&self, name: &str) -> Option<usize> {
        self.local_decls.index_of(name)
    }

    pub fn get_local_level_index(&self, name: &str) -> Option<usize> {
        self.local_level_decls.index_of(name)
    }

    /// Create a local with a fresh identifier.
    pub fn mk_local(&mut self, name: Name, ty: Expr, info: BinderInfo) -> Local {
        let id = self.next_local;
        self.next_local += 1;
        Local { name, id, ty, info }
    }
}

#[cfg(test)]
mod tests {
    use crate::{Environment, Expr, IoState, Level, Name, Parser};

    #[test]
    fn scopes() {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, "");
        {
            let mut scope = p.local_scope();
            scope.add_local_level(Name::new("u"), Level::Param(Name::new("u")));
            assert_eq!(scope.get_local_level_index("u"), Some(0));
            assert_eq!(scope.scope_depth(), 1);
        }
        assert_eq!(p.get_local_level_index("u"), None);
        assert!(!p.pop_local_scope());

        // the scope is closed also on errors
        let r: Result<(), _> = p.with_local_scope(|p| {
            let local = p.mk_local(Name::new("x"), Expr::prop(), Default::default());
            p.add_local(local);
            Err(p.error("failure"))
        });
        assert!(r.is_err());
        assert!(p.get_local("x").is_none());
        assert_eq!(p.scope_depth(), 0);
    }

    #[test]
    fn fresh_universes() {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, "");
        assert_eq!(p.mk_type(), Expr::sort(Level::Placeholder));
        let (t1, t2) = {
            let mut scope = p.param_universe_scope();
            (scope.mk_type(), scope.mk_type())
        };
        assert_ne!(t1, t2);
        assert_eq!(p.local_level_decls().len(), 2);
        assert_eq!(p.mk_type(), Expr::sort(Level::Placeholder));
    }
}
