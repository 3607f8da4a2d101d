//! Normalizer extensions and weak head normalisation.
//!
//! The kernel can be instantiated with extensions that add reduction rules
//! to the core calculus, for example for inductive types.
//! Extensions are part of the trusted code base.

use crate::expr::{Expr, ExprKind};
use crate::Environment;
use alloc::rc::Rc;

/// What an extension may use while reducing.
pub trait ExtensionContext {
    fn env(&self) -> &Environment;

    /// Weak head normal form of an expression.
    fn whnf(&mut self, e: &Expr) -> Expr;
}

pub trait NormalizerExtension {
    /// Perform one reduction step on `e`, or return `None` if no rule applies.
    fn reduce(&self, e: &Expr, ctx: &mut dyn ExtensionContext) -> Option<Expr>;

    /// Return true if the extension may reduce `e`
    /// once placeholders in `e` are instantiated.
    fn may_reduce_later(&self, e: &Expr, ctx: &mut dyn ExtensionContext) -> bool;

    /// Return true if the extension supports a feature with the given name.
    ///
    /// This is only used for sanity checks.
    fn supports(&self, feature: &str) -> bool;
}

/// Extension that never reduces anything.
pub struct IdExtension;

impl NormalizerExtension for IdExtension {
    fn reduce(&self, _: &Expr, _: &mut dyn ExtensionContext) -> Option<Expr> {
        None
    }

    fn may_reduce_later(&self, _: &Expr, _: &mut dyn ExtensionContext) -> bool {
        false
    }

    fn supports(&self, _: &str) -> bool {
        false
    }
}

/// Composition of two extensions, see [`compose`].
pub struct Composed(Rc<dyn NormalizerExtension>, Rc<dyn NormalizerExtension>);

impl NormalizerExtension for Composed {
    fn reduce(&self, e: &Expr, ctx: &mut dyn ExtensionContext) -> Option<Expr> {
        self.0.reduce(e, ctx).or_else(|| self.1.reduce(e, ctx))
    }

    fn may_reduce_later(&self, e: &Expr, ctx: &mut dyn ExtensionContext) -> bool {
        self.0.may_reduce_later(e, ctx) || self.1.may_reduce_later(e, ctx)
    }

    fn supports(&self, feature: &str) -> bool {
        self.0.supports(feature) || self.1.supports(feature)
    }
}

/// Compose two extensions.
///
/// The composed extension first tries to reduce with `ext1`;
/// only if `ext1` does not apply, it tries `ext2`.
/// It may reduce later if one of the two may reduce later and
/// it supports the features that one of the two supports.
/// Composition is thus associative, and
/// `ext1` wins when both extensions apply.
pub fn compose(
    ext1: Rc<dyn NormalizerExtension>,
    ext2: Rc<dyn NormalizerExtension>,
) -> Rc<dyn NormalizerExtension> {
    Rc::new(Composed(ext1, ext2))
}

/// Weak head normaliser using beta reduction,
/// unfolding of definitions, and
/// the extension of the environment.
pub struct Normalizer<'e> {
    env: &'e Environment,
    ext: Rc<dyn NormalizerExtension>,
    /// remaining reduction steps, unbounded if `None`
    fuel: Option<usize>,
    exhausted: bool,
}

impl<'e> Normalizer<'e> {
    pub fn new(env: &'e Environment) -> Self {
        let ext = env.extension().clone();
        let (fuel, exhausted) = (None, false);
        Self {
            env,
            ext,
            fuel,
            exhausted,
        }
    }

    /// Perform at most `fuel` reduction steps.
    pub fn with_fuel(self, fuel: usize) -> Self {
        let fuel = Some(fuel);
        Self { fuel, ..self }
    }

    /// Return true if normalisation stopped because it ran out of fuel.
    ///
    /// In that case, [`ExtensionContext::whnf`] returns the last term reached,
    /// which is not necessarily in weak head normal form.
    pub fn exhausted(&self) -> bool {
        self.exhausted
    }

    /// Perform beta reduction or unfold a definition at the head.
    fn step(&self, e: &Expr) -> Option<Expr> {
        let (head, args) = e.app_args();
        match head.kind() {
            ExprKind::Lambda(_, body) if !args.is_empty() => {
                let body = body.instantiate(args[0]);
                Some(Expr::mk_app(body, args[1..].iter().map(|a| (*a).clone())))
            }
            ExprKind::Constant(c, ls) => {
                let decl = self.env.get(c.as_str())?;
                let value = decl.value.as_ref()?;
                let value = value.instantiate_univ_params(&decl.univ_params, ls);
                trace!("unfold {}", c);
                Some(Expr::mk_app(value, args.into_iter().cloned()))
            }
            _ => None,
        }
    }
}

impl<'e> ExtensionContext for Normalizer<'e> {
    fn env(&self) -> &Environment {
        self.env
    }

    fn whnf(&mut self, e: &Expr) -> Expr {
        let mut e = e.clone();
        loop {
            if self.exhausted {
                return e;
            }
            let e2 = match self.step(&e) {
                Some(e2) => e2,
                None => match self.ext.clone().reduce(&e, self) {
                    Some(e2) => e2,
                    None => return e,
                },
            };
            match &mut self.fuel {
                Some(0) => {
                    self.exhausted = true;
                    return e;
                }
                Some(fuel) => *fuel -= 1,
                None => (),
            }
            e = e2;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::Decl;
    use crate::expr::cst;
    use crate::Name;

    /// Rewrite a constant in head position to an expression.
    struct Rewrite(&'static str, Expr);

    impl NormalizerExtension for Rewrite {
        fn reduce(&self, e: &Expr, _: &mut dyn ExtensionContext) -> Option<Expr> {
            let (head, args) = e.app_args();
            let args = args.into_iter().cloned();
            (*head == cst(self.0)).then(|| Expr::mk_app(self.1.clone(), args))
        }

        fn may_reduce_later(&self, e: &Expr, _: &mut dyn ExtensionContext) -> bool {
            e.is_placeholder()
        }

        fn supports(&self, feature: &str) -> bool {
            feature == self.0
        }
    }

    #[test]
    fn compose_order() {
        let env = Environment::new();
        let mut ctx = Normalizer::new(&env);

        let ext1: Rc<dyn NormalizerExtension> = Rc::new(Rewrite("c", cst("a")));
        let ext2: Rc<dyn NormalizerExtension> = Rc::new(Rewrite("c", cst("b")));
        let ext3: Rc<dyn NormalizerExtension> = Rc::new(Rewrite("d", cst("b")));

        let ext = compose(ext1.clone(), ext2.clone());
        assert_eq!(ext.reduce(&cst("c"), &mut ctx), Some(cst("a")));
        let ext = compose(ext2, ext1);
        assert_eq!(ext.reduce(&cst("c"), &mut ctx), Some(cst("b")));

        let ext = compose(ext, ext3);
        assert_eq!(ext.reduce(&cst("d"), &mut ctx), Some(cst("b")));
        assert_eq!(ext.reduce(&cst("e"), &mut ctx), None);
        assert!(ext.supports("c") && ext.supports("d") && !ext.supports("e"));
        assert!(ext.may_reduce_later(&Expr::placeholder(), &mut ctx));
    }

    #[test]
    fn identity() {
        let env = Environment::new();
        let mut ctx = Normalizer::new(&env);
        let id: Rc<dyn NormalizerExtension> = Rc::new(IdExtension);
        let ext = compose(id, Rc::new(Rewrite("c", cst("a"))));
        assert_eq!(ext.reduce(&cst("c"), &mut ctx), Some(cst("a")));
        assert!(!IdExtension.may_reduce_later(&cst("c"), &mut ctx));
    }

    #[test]
    fn whnf() -> Result<(), crate::env::Error> {
        let mut env = Environment::new();
        let ty = Expr::sort(crate::Level::Placeholder);
        // def k := fun x, fun y, x
        let b = |x| crate::expr::Binder {
            name: Name::new(x),
            ty: ty.clone(),
            info: Default::default(),
        };
        let k = Expr::lambda(b("x"), Expr::lambda(b("y"), Expr::var(1)));
        env.add(Decl::definition(Name::new("k"), Vec::new(), ty.clone(), k))?;
        env.set_extension(Rc::new(Rewrite("c", cst("k"))));

        let e = Expr::mk_app(cst("c"), [cst("a"), cst("b")]);
        assert_eq!(Normalizer::new(&env).whnf(&e), cst("a"));

        // c ~> k, unfold k, two beta steps
        let mut n = Normalizer::new(&env).with_fuel(4);
        assert_eq!(n.whnf(&e), cst("a"));
        assert!(!n.exhausted());

        let mut n = Normalizer::new(&env).with_fuel(1);
        assert_eq!(n.whnf(&e), Expr::mk_app(cst("k"), [cst("a"), cst("b")]));
        assert!(n.exhausted());
        Ok(())
    }

    #[test]
    fn fuel() {
        let env = Environment::new();
        let ty = Expr::sort(crate::Level::Placeholder);
        let b = crate::expr::Binder {
            name: Name::new("x"),
            ty,
            info: Default::default(),
        };
        // (fun x, x x) (fun x, x x) reduces to itself
        let delta = Expr::lambda(b, Expr::app(Expr::var(0), Expr::var(0)));
        let omega = Expr::app(delta.clone(), delta);
        let mut n = Normalizer::new(&env).with_fuel(100);
        assert_eq!(n.whnf(&omega), omega);
        assert!(n.exhausted());
    }
}
