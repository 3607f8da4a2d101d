//! Expressions with de Bruijn indices and tagged nodes.
//!
//! Expressions are shared and immutable, except for their tag.
//! The parser tags expressions to attach source positions and tactic hints
//! to them without changing their structure.

use crate::{Level, Name};
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec::Vec;
use core::cell::Cell;
use core::fmt::{self, Display};
use num::{BigInt, BigRational};

/// Identifier of an expression node.
pub type Tag = usize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum BinderInfo {
    #[default]
    Explicit,
    /// `{x : A}`
    Implicit,
    /// `⦃x : A⦄`
    StrictImplicit,
    /// `[x : A]`
    InstImplicit,
}

impl BinderInfo {
    fn brackets(self) -> (&'static str, &'static str) {
        match self {
            Self::Explicit => ("(", ")"),
            Self::Implicit => ("{", "}"),
            Self::StrictImplicit => ("⦃", "⦄"),
            Self::InstImplicit => ("[", "]"),
        }
    }
}

/// Bound variable of a lambda or Pi.
///
/// The name is only used for printing,
/// so binders are equal if their types and infos are equal.
#[derive(Clone, Debug)]
pub struct Binder {
    pub name: Name,
    pub ty: Expr,
    pub info: BinderInfo,
}

impl PartialEq for Binder {
    fn eq(&self, other: &Self) -> bool {
        self.ty == other.ty && self.info == other.info
    }
}

/// Local constant, a free variable with a type.
///
/// Locals are identified by their `id`, which is unique within a parser.
#[derive(Clone, Debug)]
pub struct Local {
    pub name: Name,
    pub id: usize,
    pub ty: Expr,
    pub info: BinderInfo,
}

impl PartialEq for Local {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Literal {
    Nat(BigInt),
    Decimal(BigRational),
    Str(String),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    /// bound variable (de Bruijn index)
    Var(usize),
    Sort(Level),
    Constant(Name, Vec<Level>),
    Local(Local),
    Placeholder,
    App(Expr, Expr),
    Lambda(Binder, Expr),
    Pi(Binder, Expr),
    Lit(Literal),
}

#[derive(Debug)]
struct Node {
    kind: ExprKind,
    tag: Cell<Option<Tag>>,
}

#[derive(Clone, Debug)]
pub struct Expr(Rc<Node>);

/// Structural equality, ignoring tags and binder names.
impl PartialEq for Expr {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0) || self.0.kind == other.0.kind
    }
}

impl From<ExprKind> for Expr {
    fn from(kind: ExprKind) -> Self {
        Self(Rc::new(Node {
            kind,
            tag: Cell::new(None),
        }))
    }
}

impl Expr {
    pub fn kind(&self) -> &ExprKind {
        &self.0.kind
    }

    pub fn tag(&self) -> Option<Tag> {
        self.0.tag.get()
    }

    pub fn set_tag(&self, tag: Tag) {
        self.0.tag.set(Some(tag))
    }

    pub fn var(i: usize) -> Self {
        ExprKind::Var(i).into()
    }

    pub fn sort(l: Level) -> Self {
        ExprKind::Sort(l).into()
    }

    /// `Prop`, the sort of propositions.
    pub fn prop() -> Self {
        Self::sort(Level::Zero)
    }

    pub fn constant(name: Name, ls: Vec<Level>) -> Self {
        ExprKind::Constant(name, ls).into()
    }

    pub fn local(l: Local) -> Self {
        ExprKind::Local(l).into()
    }

    pub fn placeholder() -> Self {
        ExprKind::Placeholder.into()
    }

    pub fn app(f: Self, a: Self) -> Self {
        ExprKind::App(f, a).into()
    }

    pub fn lambda(b: Binder, body: Self) -> Self {
        ExprKind::Lambda(b, body).into()
    }

    pub fn pi(b: Binder, body: Self) -> Self {
        ExprKind::Pi(b, body).into()
    }

    /// Non-dependent function type.
    pub fn arrow(dom: Self, cod: Self) -> Self {
        let b = Binder {
            name: Name::new("a"),
            ty: dom,
            info: BinderInfo::Explicit,
        };
        Self::pi(b, cod.lift(1, 0))
    }

    pub fn lit(l: Literal) -> Self {
        ExprKind::Lit(l).into()
    }

    /// Apply a function to several arguments.
    pub fn mk_app(f: Self, args: impl IntoIterator<Item = Self>) -> Self {
        args.into_iter().fold(f, Self::app)
    }

    /// Split `f a1 ... an` into `f` and `[a1, ..., an]`.
    pub fn app_args(&self) -> (&Self, Vec<&Self>) {
        let mut args = Vec::new();
        let mut head = self;
        while let ExprKind::App(f, a) = head.kind() {
            args.push(a);
            head = f;
        }
        args.reverse();
        (head, args)
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind(), ExprKind::Placeholder)
    }

    pub fn as_local(&self) -> Option<&Local> {
        match self.kind() {
            ExprKind::Local(l) => Some(l),
            _ => None,
        }
    }

    /// Rebuild the expression bottom-up.
    ///
    /// `f` is called on every subexpression with
    /// the number of binders above the subexpression;
    /// if it returns `Some(e)`, the subexpression is replaced by `e`.
    /// Unchanged subexpressions are shared with the original and
    /// rebuilt nodes keep the tag of the node they replace.
    pub fn replace<F>(&self, f: &mut F) -> Self
    where
        F: FnMut(&Self, usize) -> Option<Self>,
    {
        self.replace_at(0, f)
    }

    fn replace_at<F>(&self, offset: usize, f: &mut F) -> Self
    where
        F: FnMut(&Self, usize) -> Option<Self>,
    {
        if let Some(e) = f(self, offset) {
            return e;
        }
        let kind = match self.kind() {
            ExprKind::App(g, a) => {
                let (g2, a2) = (g.replace_at(offset, f), a.replace_at(offset, f));
                if g2.ptr_eq(g) && a2.ptr_eq(a) {
                    return self.clone();
                }
                ExprKind::App(g2, a2)
            }
            ExprKind::Lambda(b, body) | ExprKind::Pi(b, body) => {
                let ty = b.ty.replace_at(offset, f);
                let body2 = body.replace_at(offset + 1, f);
                if ty.ptr_eq(&b.ty) && body2.ptr_eq(body) {
                    return self.clone();
                }
                let b = Binder { ty, ..b.clone() };
                match self.kind() {
                    ExprKind::Lambda(..) => ExprKind::Lambda(b, body2),
                    _ => ExprKind::Pi(b, body2),
                }
            }
            ExprKind::Local(l) => {
                let ty = l.ty.replace_at(offset, f);
                if ty.ptr_eq(&l.ty) {
                    return self.clone();
                }
                ExprKind::Local(Local { ty, ..l.clone() })
            }
            _ => return self.clone(),
        };
        let e = Self::from(kind);
        if let Some(tag) = self.tag() {
            e.set_tag(tag)
        }
        e
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Return true if a subexpression satisfies `f`.
    pub fn any(&self, f: &mut impl FnMut(&Self, usize) -> bool) -> bool {
        self.any_at(0, f)
    }

    fn any_at(&self, offset: usize, f: &mut impl FnMut(&Self, usize) -> bool) -> bool {
        if f(self, offset) {
            return true;
        }
        match self.kind() {
            ExprKind::App(g, a) => g.any_at(offset, f) || a.any_at(offset, f),
            ExprKind::Lambda(b, body) | ExprKind::Pi(b, body) => {
                b.ty.any_at(offset, f) || body.any_at(offset + 1, f)
            }
            ExprKind::Local(l) => l.ty.any_at(offset, f),
            _ => false,
        }
    }

    /// Call `f` on subexpressions, descending into the children of
    /// a subexpression only if `f` returns true for it.
    pub fn for_each(&self, f: &mut impl FnMut(&Self, usize) -> bool) {
        self.for_each_at(0, f)
    }

    fn for_each_at(&self, offset: usize, f: &mut impl FnMut(&Self, usize) -> bool) {
        if !f(self, offset) {
            return;
        }
        match self.kind() {
            ExprKind::App(g, a) => {
                g.for_each_at(offset, f);
                a.for_each_at(offset, f)
            }
            ExprKind::Lambda(b, body) | ExprKind::Pi(b, body) => {
                b.ty.for_each_at(offset, f);
                body.for_each_at(offset + 1, f)
            }
            ExprKind::Local(l) => l.ty.for_each_at(offset, f),
            _ => (),
        }
    }

    /// Copy all nodes of the expression except for the types of locals.
    ///
    /// The copy shares no tagged nodes with the original.
    pub fn deep_copy(&self) -> Self {
        let kind = match self.kind() {
            ExprKind::App(g, a) => ExprKind::App(g.deep_copy(), a.deep_copy()),
            ExprKind::Lambda(b, body) => ExprKind::Lambda(b.deep_copy(), body.deep_copy()),
            ExprKind::Pi(b, body) => ExprKind::Pi(b.deep_copy(), body.deep_copy()),
            kind => kind.clone(),
        };
        Self::from(kind)
    }

    /// Return true if the variable with index `i` occurs free.
    pub fn has_loose_var(&self, i: usize) -> bool {
        self.any(&mut |e, off| matches!(e.kind(), ExprKind::Var(j) if *j == i + off))
    }

    /// Return true if some variable occurs free.
    pub fn has_loose_vars(&self) -> bool {
        self.any(&mut |e, off| matches!(e.kind(), ExprKind::Var(j) if *j >= off))
    }

    /// Increase free variables of index at least `k` by `n`.
    pub fn lift(&self, n: usize, k: usize) -> Self {
        if n == 0 {
            return self.clone();
        }
        self.replace(&mut |e, off| match e.kind() {
            ExprKind::Var(i) if *i >= k + off => Some(Self::var(i + n)),
            _ => None,
        })
    }

    /// Replace locals by bound variables.
    ///
    /// The last local becomes the variable with index 0.
    pub fn abstract_locals(&self, locals: &[Local]) -> Self {
        let n = locals.len();
        self.replace(&mut |e, off| match e.kind() {
            ExprKind::Local(l) => locals
                .iter()
                .rposition(|l2| l2.id == l.id)
                .map(|i| Self::var(off + n - 1 - i)),
            _ => None,
        })
    }

    /// Replace the loose variables with indices `0..args.len()`
    /// by `args` in reverse order, so that
    /// the last argument replaces the variable with index 0.
    pub fn instantiate_rev(&self, args: &[Self]) -> Self {
        let n = args.len();
        if n == 0 {
            return self.clone();
        }
        self.replace(&mut |e, off| match e.kind() {
            ExprKind::Var(i) if *i >= off => Some(if *i < off + n {
                args[n - 1 - (i - off)].lift(off, 0)
            } else {
                Self::var(i - n)
            }),
            _ => None,
        })
    }

    /// Replace the variable with index 0 by `arg`.
    pub fn instantiate(&self, arg: &Self) -> Self {
        self.instantiate_rev(core::slice::from_ref(arg))
    }

    /// Replace universe parameters in all levels.
    pub fn instantiate_univ_params(&self, ps: &[Name], ls: &[Level]) -> Self {
        if ps.is_empty() {
            return self.clone();
        }
        self.replace(&mut |e, _| match e.kind() {
            ExprKind::Sort(l) => Some(Self::sort(l.instantiate(ps, ls))),
            ExprKind::Constant(c, cls) => {
                let cls = cls.iter().map(|l| l.instantiate(ps, ls)).collect();
                Some(Self::constant(c.clone(), cls))
            }
            _ => None,
        })
    }

    fn fmt_with(&self, f: &mut fmt::Formatter, names: &mut Vec<Name>) -> fmt::Result {
        match self.kind() {
            ExprKind::Var(i) => match names.iter().rev().nth(*i) {
                Some(x) => x.fmt(f),
                None => write!(f, "#{}", i),
            },
            ExprKind::Sort(Level::Zero) => "Prop".fmt(f),
            ExprKind::Sort(Level::Placeholder) => "Type".fmt(f),
            ExprKind::Sort(l) => write!(f, "Type.{{{}}}", l),
            ExprKind::Constant(c, ls) if ls.is_empty() => c.fmt(f),
            ExprKind::Constant(c, ls) => {
                write!(f, "{}.{{", c)?;
                for (i, l) in ls.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    l.fmt(f)?;
                }
                write!(f, "}}")
            }
            ExprKind::Local(l) => l.name.fmt(f),
            ExprKind::Placeholder => "_".fmt(f),
            ExprKind::App(..) => {
                let (head, args) = self.app_args();
                head.fmt_arg(f, names, true)?;
                args.iter().try_for_each(|a| {
                    write!(f, " ")?;
                    a.fmt_arg(f, names, false)
                })
            }
            ExprKind::Lambda(..) => {
                write!(f, "fun")?;
                let mut e = self;
                let mut pushed = 0;
                while let ExprKind::Lambda(b, body) = e.kind() {
                    write!(f, " ")?;
                    b.fmt_with(f, names)?;
                    names.push(b.name.clone());
                    pushed += 1;
                    e = body;
                }
                write!(f, ", ")?;
                e.fmt_with(f, names)?;
                names.truncate(names.len() - pushed);
                Ok(())
            }
            ExprKind::Pi(b, body) if b.info == BinderInfo::Explicit && !body.has_loose_var(0) => {
                b.ty.fmt_arg(f, names, true)?;
                write!(f, " → ")?;
                names.push(b.name.clone());
                body.fmt_with(f, names)?;
                names.pop();
                Ok(())
            }
            ExprKind::Pi(b, body) => {
                write!(f, "Π ")?;
                b.fmt_with(f, names)?;
                write!(f, ", ")?;
                names.push(b.name.clone());
                body.fmt_with(f, names)?;
                names.pop();
                Ok(())
            }
            ExprKind::Lit(Literal::Nat(n)) => n.fmt(f),
            ExprKind::Lit(Literal::Decimal(q)) => q.fmt(f),
            ExprKind::Lit(Literal::Str(s)) => write!(f, "{:?}", s),
        }
    }

    /// Print an expression in argument position,
    /// parenthesising it if it is not atomic.
    fn fmt_arg(&self, f: &mut fmt::Formatter, names: &mut Vec<Name>, head: bool) -> fmt::Result {
        let paren = match self.kind() {
            ExprKind::App(..) => !head,
            ExprKind::Lambda(..) | ExprKind::Pi(..) => true,
            ExprKind::Sort(l) => !head && !matches!(l, Level::Zero | Level::Placeholder),
            _ => false,
        };
        if paren {
            write!(f, "(")?;
            self.fmt_with(f, names)?;
            write!(f, ")")
        } else {
            self.fmt_with(f, names)
        }
    }
}

impl Binder {
    fn deep_copy(&self) -> Self {
        let ty = self.ty.deep_copy();
        Self { ty, ..self.clone() }
    }

    fn fmt_with(&self, f: &mut fmt::Formatter, names: &mut Vec<Name>) -> fmt::Result {
        let (l, r) = self.info.brackets();
        write!(f, "{}{} : ", l, self.name)?;
        self.ty.fmt_with(f, names)?;
        write!(f, "{}", r)
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_with(f, &mut Vec::new())
    }
}

#[cfg(test)]
pub(crate) fn cst(s: &str) -> Expr {
    Expr::constant(Name::new(s), Vec::new())
}

#[cfg(test)]
fn local(name: &str, id: usize, ty: Expr) -> Local {
    Local {
        name: Name::new(name),
        id,
        ty,
        info: BinderInfo::Explicit,
    }
}

#[test]
fn abstract_instantiate() {
    let (a, b) = (local("a", 0, cst("A")), local("b", 1, cst("B")));
    let e = Expr::mk_app(cst("f"), [Expr::local(a.clone()), Expr::local(b.clone())]);

    let abs = e.abstract_locals(&[a, b]);
    assert_eq!(abs, Expr::mk_app(cst("f"), [Expr::var(1), Expr::var(0)]));
    assert!(abs.has_loose_vars() && !e.has_loose_vars());

    let inst = abs.instantiate_rev(&[cst("x"), cst("y")]);
    assert_eq!(inst, Expr::mk_app(cst("f"), [cst("x"), cst("y")]));
}

#[test]
fn instantiate_under_binder() {
    let b = |ty| Binder {
        name: Name::new("x"),
        ty,
        info: BinderInfo::Explicit,
    };
    // fun x : #0, x #1
    let e = Expr::lambda(b(Expr::var(0)), Expr::mk_app(Expr::var(0), [Expr::var(1)]));
    // instantiating with a term containing a loose variable lifts it below the binder
    let inst = e.instantiate(&Expr::var(5));
    let expected = Expr::lambda(b(Expr::var(5)), Expr::mk_app(Expr::var(0), [Expr::var(6)]));
    assert_eq!(inst, expected);
}

#[test]
fn tags_ignored() {
    let (x, y) = (cst("x"), cst("x"));
    x.set_tag(3);
    assert_eq!(x, y);
    assert_eq!(x.tag(), Some(3));
    assert_eq!(y.tag(), None);

    // rebuilding keeps tags of changed nodes
    let a = local("a", 0, cst("A"));
    let e = Expr::app(cst("f"), Expr::local(a.clone()));
    e.set_tag(7);
    assert_eq!(e.abstract_locals(&[a]).tag(), Some(7));
}

#[test]
fn display() {
    let b = |x: &str, ty| Binder {
        name: Name::new(x),
        ty,
        info: BinderInfo::Explicit,
    };
    let id = Expr::lambda(b("A", Expr::sort(Level::Placeholder)), {
        Expr::lambda(b("x", Expr::var(0)), Expr::var(0))
    });
    assert_eq!(id.to_string(), "fun (A : Type) (x : A), x");

    let arr = Expr::arrow(cst("A"), Expr::arrow(cst("B"), cst("C")));
    assert_eq!(arr.to_string(), "A → B → C");

    let dep = Expr::pi(b("n", cst("nat")), Expr::app(cst("vec"), Expr::var(0)));
    assert_eq!(dep.to_string(), "Π (n : nat), vec n");

    let app = Expr::mk_app(cst("f"), [Expr::app(cst("g"), cst("a")), cst("b")]);
    assert_eq!(app.to_string(), "f (g a) b");
}

#[test]
fn deep_copy() {
    let e = Expr::app(cst("f"), cst("a"));
    e.set_tag(0);
    if let ExprKind::App(f, _) = e.kind() {
        f.set_tag(1)
    }
    let c = e.deep_copy();
    assert_eq!(c, e);
    let mut tags = Vec::new();
    c.for_each(&mut |e, _| {
        tags.push(e.tag());
        true
    });
    assert_eq!(tags, [None, None, None]);
}
