//! Collecting universe parameters and local constants of expressions.

use crate::expr::{Expr, ExprKind, Local};
use crate::Name;
use alloc::vec::Vec;
use fnv::FnvHashSet;

/// Add the universe parameters occurring in `e` to `ps`,
/// in order of first occurrence and without duplicates.
pub fn collect_univ_params(e: &Expr, ps: &mut Vec<Name>) {
    e.any(&mut |e, _| {
        match e.kind() {
            ExprKind::Sort(l) => l.params(ps),
            ExprKind::Constant(_, ls) => ls.iter().for_each(|l| l.params(ps)),
            _ => (),
        }
        false
    });
}

/// Collect the local constants occurring in `e`, including
/// the locals occurring in their types.
///
/// Every local comes after the locals its type depends on.
pub fn collect_locals(e: &Expr) -> Vec<Local> {
    let mut seen = FnvHashSet::default();
    let mut locals = Vec::new();
    collect_locals_core(e, &mut seen, &mut locals);
    locals
}

fn collect_locals_core(e: &Expr, seen: &mut FnvHashSet<usize>, acc: &mut Vec<Local>) {
    let mut found = Vec::new();
    e.any(&mut |e, _| {
        if let ExprKind::Local(l) = e.kind() {
            if !seen.contains(&l.id) {
                found.push(l.clone());
            }
        }
        false
    });
    for l in found {
        if seen.insert(l.id) {
            collect_locals_core(&l.ty, seen, acc);
            acc.push(l)
        }
    }
}

/// Return true if `e` contains a local constant with given name.
pub fn contains_local(e: &Expr, name: &Name) -> bool {
    e.any(&mut |e, _| matches!(e.kind(), ExprKind::Local(l) if l.name == *name))
}

/// Return true if `e` contains the local constant `l`.
pub fn depends_on(e: &Expr, l: &Local) -> bool {
    e.any(&mut |e, _| matches!(e.kind(), ExprKind::Local(l2) if l2.id == l.id))
}

/// Return true if one of `es` contains the local constant `l`.
pub fn any_depends_on<'e>(es: impl IntoIterator<Item = &'e Expr>, l: &Local) -> bool {
    es.into_iter().any(|e| depends_on(e, l))
}

#[cfg(test)]
use crate::expr::{cst, BinderInfo};

#[cfg(test)]
fn local(name: &str, id: usize, ty: Expr) -> Local {
    let name = Name::new(name);
    let info = BinderInfo::Explicit;
    Local { name, id, ty, info }
}

#[test]
fn locals() {
    let a = local("A", 0, Expr::sort(crate::Level::Placeholder));
    let x = local("x", 1, Expr::local(a.clone()));
    let y = local("y", 2, cst("nat"));
    let e = Expr::mk_app(cst("f"), [Expr::local(x.clone()), Expr::local(y.clone())]);

    let ids: Vec<_> = collect_locals(&e).iter().map(|l| l.id).collect();
    assert_eq!(ids, Vec::from([0, 1, 2]));

    assert!(depends_on(&e, &a));
    assert!(!depends_on(&e, &local("z", 3, cst("nat"))));
    assert!(contains_local(&e, &Name::new("y")));
    assert!(any_depends_on([&cst("c"), &e], &y));
}

#[test]
fn univ_params() {
    use crate::Level;
    let u = || Level::Param(Name::new("u"));
    let v = || Level::Param(Name::new("v"));
    let e = Expr::app(Expr::constant(Name::new("c"), Vec::from([v()])), Expr::sort(u().max(v())));
    let mut ps = Vec::new();
    collect_univ_params(&e, &mut ps);
    assert_eq!(ps, Vec::from([Name::new("v"), Name::new("u")]));
}
