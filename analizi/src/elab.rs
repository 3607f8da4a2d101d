//! Interface to the elaborator.

use crate::expr::{Expr, ExprKind, Tag};
use crate::{Environment, Level, Name, Tactic};
use alloc::string::String;
use core::fmt::{self, Display};

/// Map from tags of placeholders to tactics that synthesise them.
pub type Hints = fnv::FnvHashMap<Tag, Tactic>;

#[derive(Clone, Debug, PartialEq)]
pub struct Error {
    pub msg: String,
    pub expr: Option<Expr>,
}

impl Error {
    pub fn new(msg: impl Into<String>) -> Self {
        let msg = msg.into();
        Self { msg, expr: None }
    }

    pub fn with_expr(self, expr: Expr) -> Self {
        let expr = Some(expr);
        Self { expr, ..self }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.expr {
            Some(e) => write!(f, "{}, at term\n  {}", self.msg, e),
            None => self.msg.fmt(f),
        }
    }
}

/// Turn parsed terms into kernel terms.
pub trait Elaborator {
    /// Elaborate a term with given universe parameters.
    fn elaborate(
        &mut self,
        env: &Environment,
        e: &Expr,
        lparams: &[Name],
        hints: &Hints,
    ) -> Result<Expr, Error>;

    /// Elaborate the type and the value of a definition.
    fn elaborate_def(
        &mut self,
        env: &Environment,
        ty: &Expr,
        val: &Expr,
        lparams: &[Name],
        hints: &Hints,
    ) -> Result<(Expr, Expr), Error> {
        let ty = self.elaborate(env, ty, lparams, hints)?;
        let val = self.elaborate(env, val, lparams, hints)?;
        Ok((ty, val))
    }

    /// Infer the type of an elaborated term, if possible.
    fn infer_type(&mut self, env: &Environment, e: &Expr) -> Option<Expr> {
        let _ = (env, e);
        None
    }
}

/// Elaborator that returns terms unchanged.
///
/// It infers types only structurally,
/// which suffices for the `check` command on simple terms.
pub struct Passthrough;

impl Elaborator for Passthrough {
    fn elaborate(&mut self, _: &Environment, e: &Expr, _: &[Name], _: &Hints) -> Result<Expr, Error> {
        if e.has_loose_vars() {
            return Err(Error::new("term has loose bound variables").with_expr(e.clone()));
        }
        Ok(e.clone())
    }

    fn infer_type(&mut self, env: &Environment, e: &Expr) -> Option<Expr> {
        match e.kind() {
            ExprKind::Sort(l) => Some(Expr::sort(l.clone().succ())),
            ExprKind::Constant(c, ls) => {
                let decl = env.get(c.as_str())?;
                Some(decl.ty.instantiate_univ_params(&decl.univ_params, ls))
            }
            ExprKind::Local(l) => Some(l.ty.clone()),
            ExprKind::App(f, a) => match self.infer_type(env, f)?.kind() {
                ExprKind::Pi(_, body) => Some(body.instantiate(a)),
                _ => None,
            },
            ExprKind::Pi(..) => Some(Expr::sort(Level::Placeholder)),
            _ => None,
        }
    }
}

#[test]
fn infer() {
    use crate::env::Decl;
    use crate::expr::{cst, Binder};
    let mut env = Environment::new();
    let b = Binder {
        name: Name::new("x"),
        ty: cst("A"),
        info: Default::default(),
    };
    let f_ty = Expr::pi(b, Expr::app(cst("P"), Expr::var(0)));
    env.add(Decl::axiom(Name::new("f"), Vec::new(), f_ty)).unwrap();

    let mut elab = Passthrough;
    let ty = elab.infer_type(&env, &Expr::app(cst("f"), cst("a")));
    assert_eq!(ty, Some(Expr::app(cst("P"), cst("a"))));
    assert_eq!(elab.infer_type(&env, &cst("g")), None);
    assert_eq!(
        elab.infer_type(&env, &Expr::prop()),
        Some(Expr::sort(Level::of_nat(1)))
    );

    let hints = Hints::default();
    assert!(elab.elaborate(&env, &Expr::var(0), &[], &hints).is_err());
}
