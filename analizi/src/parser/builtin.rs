//! Builtin tokens, notation, commands and tactics.

use super::{command, tactic, Parser};
use crate::error::Error;
use crate::expr::Binder;
use crate::notation::{Action, TacticCmd, Tables, Transition, ARROW_PREC, MAX_PREC};
use crate::{Expr, Name, Pos, Tactic};

/// Parse the optional level of `Type`.
fn parse_type(p: &mut Parser, _: &[Expr], _: Pos) -> Result<Expr, Error> {
    if p.curr_is_token(".{") {
        p.next()?;
        let l = p.parse_level(0)?;
        p.check_token_next("}", "invalid Type expression, '}' expected")?;
        Ok(Expr::sort(l))
    } else {
        Ok(p.mk_type())
    }
}

/// Parse the tactic after `by`, yielding a placeholder that the tactic should fill.
fn parse_by(p: &mut Parser, _: &[Expr], pos: Pos) -> Result<Expr, Error> {
    let t = p.parse_tactic(0)?;
    let e = p.save_pos(Expr::placeholder(), pos);
    p.save_hint(&e, t);
    Ok(e)
}

fn nud_tables(t: &mut Tables) {
    use Action::{Binders, Expr as E, Ext, ScopedExpr, Skip};
    let v0 = Expr::var(0);
    t.nud.add(&[Transition::new("(", E(0)), Transition::new(")", Skip)], v0.clone());
    for fun in ["fun", "λ"] {
        let ts = [Transition::new(fun, Binders), Transition::new(",", ScopedExpr(0, true))];
        t.nud.add(&ts, v0.clone());
    }
    for pi in ["Pi", "Π", "forall", "∀"] {
        let ts = [Transition::new(pi, Binders), Transition::new(",", ScopedExpr(0, false))];
        t.nud.add(&ts, v0.clone());
    }
    t.nud.add(&[Transition::new("Type", Ext(parse_type))], v0.clone());
    t.nud.add(&[Transition::new("Prop", Skip)], Expr::prop());
    t.nud.add(&[Transition::new("_", Skip)], Expr::placeholder());
    t.nud.add(&[Transition::new("by", Ext(parse_by))], v0);

    // A -> B
    let b = Binder {
        name: Name::new("a"),
        ty: Expr::var(1),
        info: Default::default(),
    };
    let arrow = Expr::pi(b, Expr::var(1));
    for tk in ["->", "→"] {
        t.tokens.insert(tk, ARROW_PREC);
        t.led.add(&[Transition::new(tk, E(ARROW_PREC - 1))], arrow.clone());
    }
}

fn cmd_tables(t: &mut Tables) {
    t.add_cmd("universe", "declare a global universe level", command::universe);
    t.add_cmd("variable", "declare a variable", command::variables);
    t.add_cmd("variables", "declare variables", command::variables);
    t.add_cmd("axiom", "declare an axiom", command::axiom);
    t.add_cmd("constant", "declare a constant", command::axiom);
    t.add_cmd("definition", "add a definition", command::definition);
    t.add_cmd("theorem", "add a theorem", command::theorem);
    t.add_cmd("check", "type check an expression", command::check);
    t.add_cmd("eval", "normalise an expression", command::eval);
    t.add_cmd("print", "print a string or a declaration", command::print);
    t.add_cmd("section", "open a section", command::section);
    t.add_cmd("end", "close the current section", command::end);
    t.add_cmd("set_option", "set an option", command::set_option);
    t.add_cmd("infixl", "declare left-associative infix notation", command::infixl);
    t.add_cmd("infix", "declare infix notation", command::infixl);
    t.add_cmd("infixr", "declare right-associative infix notation", command::infixr);
    t.add_cmd("prefix", "declare prefix notation", command::prefix);
    t.add_cmd("postfix", "declare postfix notation", command::postfix);
    t.add_cmd("notation", "declare mixfix notation", command::notation);
    t.add_cmd("local", "declare notation local to the current section", command::local);
}

fn tactic_tables(t: &mut Tables) {
    use TacticCmd::{Led, Nud};
    t.add_tactic("exact", Nud(tactic::exact));
    t.add_tactic("apply", Nud(tactic::apply));
    t.add_tactic("repeat", Nud(tactic::repeat));
    t.add_tactic("id", Nud(|_| Ok(Tactic::Id)));
    t.add_tactic("fail", Nud(|_| Ok(Tactic::Fail)));
    t.add_tactic("assumption", Nud(|_| Ok(Tactic::Assumption)));
    t.add_tactic("now", Nud(|_| Ok(Tactic::Now)));
    t.add_tactic(";", Led(tactic::THEN_PREC, tactic::then));
    t.add_tactic("|", Led(tactic::OR_ELSE_PREC, tactic::or_else));
}

/// Tables of a fresh environment.
pub fn tables() -> Tables {
    let mut t = Tables::default();
    let max = ["(", "Type", "Prop", "_"];
    let zero = [
        ")", "{", "}", "[", "]", "⦃", "⦄", ",", ":", ":=", ".{", "fun", "λ", "Pi", "Π", "forall",
        "∀", "by", ";", "|", "+",
    ];
    max.iter().for_each(|tk| t.tokens.insert(tk, MAX_PREC));
    zero.iter().for_each(|tk| t.tokens.insert(tk, 0));
    nud_tables(&mut t);
    cmd_tables(&mut t);
    tactic_tables(&mut t);
    t
}

#[test]
fn builtin() {
    let t = tables();
    assert!(t.tokens.get("universe").map_or(false, |i| i.is_command()));
    assert_eq!(t.tokens.get("(").map(|i| i.prec()), Some(MAX_PREC));
    assert!(t.nud.find("fun").is_some() && t.led.find("→").is_some());
    assert!(t.cmds.get("local").is_some());
    assert_eq!(t.tokens.longest_prefix(":=x").map(|(n, _)| n), Some(2));
}
