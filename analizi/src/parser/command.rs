//! Builtin commands.

use super::{Parameter, Parser};
use crate::env::{Decl, DeclKind};
use crate::error::Error;
use crate::expr::{Expr, ExprKind, Local};
use crate::io::OptionValue;
use crate::kernel::{ExtensionContext, Normalizer};
use crate::locals::{collect_locals, collect_univ_params};
use crate::notation::{Action, NotationEntry, Transition};
use crate::{Level, Name, Pos, Prec};
use alloc::format;
use alloc::string::{String, ToString};
use alloc::vec::Vec;

/// Commands that declare notation.
/// Maximal number of reduction steps performed by `eval`.
const EVAL_FUEL: usize = 10_000;

const NOTATION_CMDS: [&str; 6] = ["infixl", "infixr", "infix", "prefix", "postfix", "notation"];

pub(crate) fn is_notation_cmd(kw: &str) -> bool {
    NOTATION_CMDS.contains(&kw)
}

pub(crate) fn universe(p: &mut Parser) -> Result<(), Error> {
    let pos = p.pos();
    let id = p.check_id_next("invalid universe declaration, identifier expected")?;
    info!("Declare universe {}", id);
    p.env_mut().add_universe(id).map_err(|e| Error::nested(e, pos))
}

/// Parse universe parameters `.{u1 ... un}`, if present.
fn parse_univ_params(p: &mut Parser) -> Result<Vec<Name>, Error> {
    let mut ls = Vec::new();
    if p.curr_is_token(".{") {
        p.next()?;
        while !p.curr_is_token("}") {
            ls.push(p.check_id_next("invalid universe parameter, identifier expected")?);
        }
        p.next()?;
    }
    Ok(ls)
}

/// Locals of the open sections that occur in the given expressions,
/// in order of declaration.
fn section_params(es: &[&Expr]) -> Vec<Parameter> {
    let mut locals: Vec<Local> = Vec::new();
    for e in es {
        for l in collect_locals(e) {
            if !locals.contains(&l) {
                locals.push(l)
            }
        }
    }
    locals.sort_by_key(|l| l.id);
    let pos = Pos::default();
    let param = |local: Local| Parameter {
        pos,
        info: local.info,
        local,
    };
    locals.into_iter().map(param).collect()
}

/// Universe parameters of a declaration:
/// the explicit ones followed by the ones occurring in `es`.
fn univ_params(explicit: &[Name], es: &[&Expr]) -> Vec<Name> {
    let mut ps = explicit.to_vec();
    es.iter().for_each(|e| collect_univ_params(e, &mut ps));
    ps
}

/// Parse `id.{us} binders : type := value`.
///
/// The value is parsed only if `kind` is not an axiom.
/// The type is optional only for definitions.
fn parse_decl(p: &mut Parser, kind: DeclKind) -> Result<Decl, Error> {
    let pos = p.cmd_pos();
    let id = p.check_id_next("invalid declaration, identifier expected")?;
    let explicit = parse_univ_params(p)?;
    for u in &explicit {
        p.add_local_level(u.clone(), Level::Param(u.clone()));
    }

    let mut ps = Vec::new();
    let ty = {
        let mut scope = p.param_universe_scope();
        if !scope.curr_is_token(":") && !scope.curr_is_token(":=") {
            scope.parse_binders(&mut ps)?;
        }
        if scope.curr_is_token(":") {
            scope.next()?;
            scope.parse_expr(0)?
        } else if kind == DeclKind::Definition {
            let pos = scope.pos();
            scope.save_pos(Expr::placeholder(), pos)
        } else {
            return Err(scope.error("invalid declaration, ':' expected"));
        }
    };
    let val = if kind == DeclKind::Axiom {
        None
    } else {
        p.check_token_next(":=", "invalid declaration, ':=' expected")?;
        Some(p.parse_expr(0)?)
    };

    let ty = p.pi_abstract(&ps, &ty, pos);
    let val = val.map(|val| p.lambda_abstract(&ps, &val, pos));

    let es: Vec<&Expr> = core::iter::once(&ty).chain(val.as_ref()).collect();
    let sps = section_params(&es);
    let ty = p.pi_abstract(&sps, &ty, pos);
    let val = val.map(|val| p.lambda_abstract(&sps, &val, pos));

    let es: Vec<&Expr> = core::iter::once(&ty).chain(val.as_ref()).collect();
    let lparams = univ_params(&explicit, &es);
    Ok(match val {
        None => {
            let ty = p.elaborate(&ty, &lparams)?;
            Decl::axiom(id, lparams, ty)
        }
        Some(val) => {
            let (ty, val) = p.elaborate_def(&ty, &val, &lparams)?;
            match kind {
                DeclKind::Theorem => Decl::theorem(id, lparams, ty, val),
                _ => Decl::definition(id, lparams, ty, val),
            }
        }
    })
}

fn declare(p: &mut Parser, kind: DeclKind) -> Result<(), Error> {
    let pos = p.cmd_pos();
    let decl = p.with_local_scope(|p| parse_decl(p, kind))?;
    info!("Declare {} {}", decl.kind, decl.name);
    p.env_mut().add(decl).map_err(|e| Error::nested(e, pos))
}

pub(crate) fn axiom(p: &mut Parser) -> Result<(), Error> {
    declare(p, DeclKind::Axiom)
}

pub(crate) fn definition(p: &mut Parser) -> Result<(), Error> {
    declare(p, DeclKind::Definition)
}

pub(crate) fn theorem(p: &mut Parser) -> Result<(), Error> {
    declare(p, DeclKind::Theorem)
}

/// Declare variables.
///
/// Inside a section, variables become locals until the end of the section.
/// Outside of sections, they become axioms.
pub(crate) fn variables(p: &mut Parser) -> Result<(), Error> {
    if !p.sections.is_empty() {
        let mut ps = Vec::new();
        p.param_universe_scope().parse_binders(&mut ps)?;
        ps.iter().for_each(|param| debug!("Variable {}", param.local.name));
        return Ok(());
    }

    let ps = p.with_local_scope(|p| {
        let mut ps = Vec::new();
        p.param_universe_scope().parse_binders(&mut ps)?;
        Ok(ps)
    })?;
    // constants replacing the locals of previous variables
    let mut consts: Vec<(Local, Expr)> = Vec::new();
    for param in ps {
        let ty = param.local.ty.replace(&mut |e, _| match e.kind() {
            ExprKind::Local(l) => consts.iter().find(|(l2, _)| l2 == l).map(|(_, c)| c.clone()),
            _ => None,
        });
        let lparams = univ_params(&[], &[&ty]);
        let ty = p.elaborate(&ty, &lparams)?;
        let name = param.local.name.clone();
        let levels = lparams.iter().cloned().map(Level::Param).collect();
        info!("Declare variable {}", name);
        let decl = Decl::axiom(name.clone(), lparams, ty);
        p.env_mut().add(decl).map_err(|e| Error::nested(e, param.pos))?;
        consts.push((param.local, Expr::constant(name, levels)));
    }
    Ok(())
}

pub(crate) fn check(p: &mut Parser) -> Result<(), Error> {
    let e = p.parse_expr(0)?;
    let lparams = univ_params(&[], &[&e]);
    let e = p.elaborate(&e, &lparams)?;
    let ty = p.infer_type(&e);
    if p.verbose {
        let out = p.ios_mut().regular();
        match ty {
            Some(ty) => writeln!(out, "{} : {}", e, ty)?,
            None => writeln!(out, "{}", e)?,
        }
    }
    Ok(())
}

pub(crate) fn eval(p: &mut Parser) -> Result<(), Error> {
    let e = p.parse_expr(0)?;
    let lparams = univ_params(&[], &[&e]);
    let e = p.elaborate(&e, &lparams)?;
    let mut norm = Normalizer::new(p.env()).with_fuel(EVAL_FUEL);
    let r = norm.whnf(&e);
    if norm.exhausted() {
        let msg = format!("no weak head normal form found within {} steps", EVAL_FUEL);
        return Err(Error::nested(msg, p.cmd_pos()));
    }
    if p.verbose {
        writeln!(p.ios_mut().regular(), "{}", r)?;
    }
    Ok(())
}

fn fmt_decl(decl: &Decl) -> String {
    let mut s = format!("{} {}", decl.kind, decl.name);
    if !decl.univ_params.is_empty() {
        let ps: Vec<_> = decl.univ_params.iter().map(|u| u.to_string()).collect();
        s += &format!(".{{{}}}", ps.join(" "));
    }
    s += &format!(" : {}", decl.ty);
    if let (DeclKind::Definition, Some(val)) = (decl.kind, &decl.value) {
        s += &format!(" := {}", val);
    }
    s
}

/// Print a string or a declaration.
pub(crate) fn print(p: &mut Parser) -> Result<(), Error> {
    let s = if p.curr_is_string() {
        let s = p.str_val().to_string();
        p.next()?;
        s
    } else if p.curr_is_identifier() {
        let pos = p.pos();
        let id = p.name_val();
        p.next()?;
        let decl = p.env().get(id.as_str());
        let decl = decl.ok_or_else(|| Error::parse(format!("unknown identifier '{}'", id), pos));
        fmt_decl(decl?)
    } else {
        return Err(p.error("invalid print command, string or identifier expected"));
    };
    if p.verbose {
        writeln!(p.ios_mut().regular(), "{}", s)?;
    }
    Ok(())
}

/// Open a section, which is a local scope that ends with `end`.
pub(crate) fn section(p: &mut Parser) -> Result<(), Error> {
    let name = if p.curr_is_identifier() {
        Some(p.check_id_next("invalid section, identifier expected")?)
    } else {
        None
    };
    debug!("Open section {}", name.as_ref().map_or("", |n| n.as_str()));
    p.push_local_scope();
    p.sections.push(name);
    Ok(())
}

pub(crate) fn end(p: &mut Parser) -> Result<(), Error> {
    let pos = p.cmd_pos();
    let name = if p.curr_is_identifier() {
        Some(p.check_id_next("invalid 'end', identifier expected")?)
    } else {
        None
    };
    let open = match p.sections.last() {
        Some(open) => open.clone(),
        None => return Err(Error::parse("invalid 'end', there is no open section", pos)),
    };
    if open != name {
        let msg = match open {
            Some(open) => format!("invalid 'end', expected name '{}'", open),
            None => "invalid 'end', the section is unnamed".to_string(),
        };
        return Err(Error::parse(msg, pos));
    }
    p.sections.pop();
    p.pop_local_scope();
    Ok(())
}

pub(crate) fn set_option(p: &mut Parser) -> Result<(), Error> {
    let id = p.check_id_next("invalid set_option, identifier expected")?;
    let value = if p.curr_is_token_or_id("true") {
        OptionValue::Bool(true)
    } else if p.curr_is_token_or_id("false") {
        OptionValue::Bool(false)
    } else if p.curr_is_numeral() {
        OptionValue::Nat(p.get_small_nat()? as u64)
    } else if p.curr_is_string() {
        OptionValue::Str(p.str_val().into())
    } else {
        let msg = "invalid option value, 'true', 'false', string or numeral expected";
        return Err(p.error(msg));
    };
    p.next()?;
    debug!("Set option {} = {}", id, value);
    p.ios_mut().options.set(id, value);
    p.updt_options();
    Ok(())
}

/// Fixity of a single-token notation.
#[derive(Clone, Copy)]
enum Fixity {
    Infixl,
    Infixr,
    Prefix,
    Postfix,
}

fn parse_quoted_symbol(p: &mut Parser) -> Result<String, Error> {
    if !p.curr_is_quoted_symbol() {
        return Err(p.error("invalid notation declaration, quoted symbol expected"));
    }
    let tk = p.str_val().trim().to_string();
    if tk.is_empty() {
        return Err(p.error("invalid notation declaration, empty token"));
    }
    p.next()?;
    Ok(tk)
}

/// Parse an optional precedence `: n`.
fn parse_opt_prec(p: &mut Parser) -> Result<Option<Prec>, Error> {
    if !p.curr_is_token(":") {
        return Ok(None);
    }
    p.next()?;
    Ok(Some(p.parse_small_nat()? as Prec))
}

/// Precedence of a token: the given one, else the current one, else 0.
fn token_prec(p: &Parser, tk: &str, prec: Option<Prec>) -> Prec {
    let current = || p.env().tables().tokens.get(tk).map(|i| i.prec());
    prec.or_else(current).unwrap_or(0)
}

fn parse_fixity(p: &mut Parser, fixity: Fixity, persistent: bool) -> Result<(), Error> {
    let tk = parse_quoted_symbol(p)?;
    let prec = parse_opt_prec(p)?;
    let prec = token_prec(p, &tk, prec);
    p.check_token_next(":=", "invalid notation declaration, ':=' expected")?;
    let f = p.parse_expr(0)?;

    let v = Expr::var;
    let (nud, action, accept) = match fixity {
        Fixity::Infixl => (false, Action::Expr(prec), Expr::mk_app(f, [v(1), v(0)])),
        Fixity::Infixr => {
            let rbp = prec.saturating_sub(1);
            (false, Action::Expr(rbp), Expr::mk_app(f, [v(1), v(0)]))
        }
        Fixity::Prefix => (true, Action::Expr(prec), Expr::app(f, v(0))),
        Fixity::Postfix => (false, Action::Skip, Expr::app(f, v(0))),
    };
    let ts = alloc::vec![Transition::new(&tk, action)];
    let entry = if nud {
        NotationEntry::Nud(ts, accept)
    } else {
        NotationEntry::Led(ts, accept)
    };
    p.add_notation(NotationEntry::Token(tk, prec), persistent);
    p.add_notation(entry, persistent);
    Ok(())
}

/// Mixfix notation, before it is added to the tables.
struct Mixfix {
    tokens: Vec<(String, Prec)>,
    transitions: Vec<Transition>,
    accept: Expr,
    /// true if the notation starts with an argument
    led: bool,
}

/// Parse `notation` followed by quoted tokens and identifiers,
/// each with optional precedence, followed by `:=` and an expression.
///
/// For example:
///
/// ~~~ text
/// notation `if` c `then` t:45 `else` e:45 := ite c t e
/// notation a `∘`:60 b := comp a b
/// ~~~
///
/// The identifiers are arguments of the notation and
/// may occur in the expression after `:=`.
/// The precedence of a token determines its left binding power,
/// whereas the precedence of an argument is the right binding power
/// used to parse the argument.
fn parse_mixfix_core(p: &mut Parser) -> Result<Mixfix, Error> {
    let mut tokens = Vec::new();
    let mut transitions = Vec::new();
    let mut args: Vec<Local> = Vec::new();
    let mut led = false;
    // token still waiting for its action
    let mut pending: Option<String> = None;
    loop {
        if p.curr_is_quoted_symbol() {
            let tk = parse_quoted_symbol(p)?;
            let prec = parse_opt_prec(p)?;
            tokens.push((tk.clone(), token_prec(p, &tk, prec)));
            if let Some(prev) = pending.replace(tk) {
                transitions.push(Transition::new(&prev, Action::Skip))
            }
        } else if p.curr_is_identifier() {
            let pos = p.pos();
            let name = p.name_val();
            p.next()?;
            let rbp = parse_opt_prec(p)?.unwrap_or(0);
            match pending.take() {
                Some(tk) => transitions.push(Transition::new(&tk, Action::Expr(rbp))),
                None if tokens.is_empty() && args.is_empty() => led = true,
                None => {
                    let msg = "invalid notation declaration, arguments must be separated by tokens";
                    return Err(Error::parse(msg, pos));
                }
            }
            let local = p.mk_local(name, Expr::placeholder(), Default::default());
            p.add_local(local.clone());
            args.push(local);
        } else {
            break;
        }
    }
    if let Some(tk) = pending {
        transitions.push(Transition::new(&tk, Action::Skip))
    }
    if transitions.is_empty() {
        return Err(p.error("invalid notation declaration, quoted symbol expected"));
    }
    p.check_token_next(":=", "invalid notation declaration, ':=' expected")?;
    let accept = p.parse_expr(0)?.abstract_locals(&args);
    Ok(Mixfix {
        tokens,
        transitions,
        accept,
        led,
    })
}

fn parse_mixfix(p: &mut Parser, persistent: bool) -> Result<(), Error> {
    let m = p.with_local_scope(parse_mixfix_core)?;
    for (tk, prec) in m.tokens {
        p.add_notation(NotationEntry::Token(tk, prec), persistent);
    }
    let entry = if m.led {
        NotationEntry::Led(m.transitions, m.accept)
    } else {
        NotationEntry::Nud(m.transitions, m.accept)
    };
    p.add_notation(entry, persistent);
    Ok(())
}

/// Parse the notation declaration introduced by the command keyword `kw`.
fn parse_notation_decl(p: &mut Parser, kw: &str, persistent: bool) -> Result<(), Error> {
    match kw {
        "infixl" | "infix" => parse_fixity(p, Fixity::Infixl, persistent),
        "infixr" => parse_fixity(p, Fixity::Infixr, persistent),
        "prefix" => parse_fixity(p, Fixity::Prefix, persistent),
        "postfix" => parse_fixity(p, Fixity::Postfix, persistent),
        _ => parse_mixfix(p, persistent),
    }
}

pub(crate) fn infixl(p: &mut Parser) -> Result<(), Error> {
    parse_notation_decl(p, "infixl", true)
}

pub(crate) fn infixr(p: &mut Parser) -> Result<(), Error> {
    parse_notation_decl(p, "infixr", true)
}

pub(crate) fn prefix(p: &mut Parser) -> Result<(), Error> {
    parse_notation_decl(p, "prefix", true)
}

pub(crate) fn postfix(p: &mut Parser) -> Result<(), Error> {
    parse_notation_decl(p, "postfix", true)
}

pub(crate) fn notation(p: &mut Parser) -> Result<(), Error> {
    parse_notation_decl(p, "notation", true)
}

/// `local` followed by a notation declaration.
pub(crate) fn local(p: &mut Parser) -> Result<(), Error> {
    if !p.parse_local_notation_decl()? {
        return Err(p.error("invalid 'local' command, notation declaration expected"));
    }
    Ok(())
}

impl<'a> Parser<'a> {
    /// Parse a notation declaration that is discarded at the end of the current scope.
    ///
    /// Return false if the current token does not start a notation declaration.
    pub fn parse_local_notation_decl(&mut self) -> Result<bool, Error> {
        if !self.curr_is_command() || !is_notation_cmd(self.token_text()) {
            return Ok(false);
        }
        let kw = self.token_text().to_string();
        self.next()?;
        parse_notation_decl(self, &kw, false)?;
        Ok(true)
    }
}
