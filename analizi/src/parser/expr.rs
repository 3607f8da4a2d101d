//! Expressions and binders.

use super::{Parameter, Parser};
use crate::error::Error;
use crate::expr::{Binder, BinderInfo, Expr, Literal};
use crate::notation::{Action, ParseTable, MAX_PREC};
use crate::{Level, Pos, Prec};
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use analizi_scan::TokenKind;

/// Opening tokens of bracketed binders, with closing token and binder info.
static BRACKETS: [(&str, &str, BinderInfo); 4] = [
    ("(", ")", BinderInfo::Explicit),
    ("{", "}", BinderInfo::Implicit),
    ("⦃", "⦄", BinderInfo::StrictImplicit),
    ("[", "]", BinderInfo::InstImplicit),
];

impl<'a> Parser<'a> {
    /// Left binding power of the current token.
    fn curr_lbp(&self) -> Prec {
        match self.curr() {
            TokenKind::Keyword => self.token_info().map_or(0, |i| i.prec()),
            TokenKind::Identifier
            | TokenKind::Numeral
            | TokenKind::Decimal
            | TokenKind::String => MAX_PREC,
            _ => 0,
        }
    }

    /// Parse an expression whose operators bind stronger than `rbp`.
    pub fn parse_expr(&mut self, rbp: Prec) -> Result<Expr, Error> {
        let mut left = self.parse_nud()?;
        while rbp < self.curr_lbp() {
            left = self.parse_led(left)?;
        }
        Ok(left)
    }

    fn parse_nud(&mut self) -> Result<Expr, Error> {
        match self.curr() {
            TokenKind::Keyword => {
                let nud = self.env.tables().nud.clone();
                if nud.find(self.token_text()).is_none() {
                    let msg = format!("invalid expression, unexpected token '{}'", self.token_text());
                    return Err(self.error(msg));
                }
                self.parse_notation(nud, None)
            }
            TokenKind::Identifier => self.parse_id(),
            TokenKind::Numeral => self.parse_numeral_expr(),
            TokenKind::Decimal => self.parse_decimal_expr(),
            TokenKind::String => self.parse_string_expr(),
            TokenKind::ScriptBlock => self.parse_script_expr(),
            TokenKind::Eof => Err(self.error("invalid expression, unexpected end of input")),
            _ => Err(self.error("invalid expression, unexpected token")),
        }
    }

    fn parse_led(&mut self, left: Expr) -> Result<Expr, Error> {
        let led = &self.env.tables().led;
        if self.curr_is_keyword() && led.find(self.token_text()).is_some() {
            let led = led.clone();
            self.parse_notation(led, Some(left))
        } else {
            let pos = self.pos_of(&left);
            let arg = self.parse_expr(MAX_PREC)?;
            Ok(self.mk_app(left, arg, pos))
        }
    }

    /// Parse notation by following the transitions of a parse table.
    ///
    /// If `left` is given, it is the first argument of the notation.
    /// The result is the expression accepted by the last node,
    /// with its loose variables replaced by the parsed arguments.
    fn parse_notation(&mut self, table: ParseTable, left: Option<Expr>) -> Result<Expr, Error> {
        let pos = match &left {
            Some(left) => self.pos_of(left),
            None => self.pos(),
        };
        let e = self.with_binder_scope(|p| p.parse_notation_args(table, left, pos))?;
        Ok(self.rec_save_pos(e, pos))
    }

    fn parse_notation_args(&mut self, table: ParseTable, left: Option<Expr>, pos: Pos) -> Result<Expr, Error> {
        let mut args: Vec<Expr> = left.into_iter().collect();
        let mut ps: Vec<Parameter> = Vec::new();
        let mut table = table;
        while self.curr_is_keyword() {
            let (action, next) = match table.find(self.token_text()) {
                Some((action, next)) => (action.clone(), next.clone()),
                None => break,
            };
            self.next()?;
            match action {
                Action::Skip => (),
                Action::Expr(rbp) => args.push(self.parse_expr(rbp)?),
                Action::Binder => ps.push(self.parse_binder()?),
                Action::Binders => self.parse_binders(&mut ps)?,
                Action::ScopedExpr(rbp, lambda) => {
                    let body = self.parse_scoped_expr(&ps, rbp)?;
                    args.push(if ps.is_empty() {
                        body
                    } else {
                        self.abstract_params(&ps, &body, lambda, pos)
                    })
                }
                Action::Ext(f) => {
                    let e = f(self, &args, pos)?;
                    args.push(e)
                }
            }
            table = next;
        }
        match table.accept() {
            Some(accept) => Ok(accept.deep_copy().instantiate_rev(&args)),
            None => {
                let expected: Vec<String> = table.tokens().iter().map(|tk| format!("'{}'", tk)).collect();
                let msg = format!("invalid expression, expected {}", expected.join(" or "));
                Err(self.error(msg))
            }
        }
    }

    /// Parse an identifier, possibly with explicit universe levels `c.{l1 ... ln}`.
    fn parse_id(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let id = self.name_val();
        self.next()?;
        let ls = if self.curr_is_token(".{") {
            self.next()?;
            let mut ls = Vec::new();
            while !self.curr_is_token("}") {
                ls.push(self.parse_level(0)?);
            }
            self.next()?;
            Some(ls)
        } else {
            None
        };

        if let Some(param) = self.get_local(id.as_str()) {
            if ls.is_some() {
                let msg = "invalid use of explicit universe levels, identifier is a local";
                return Err(Error::parse(msg, pos));
            }
            let local = Expr::local(param.local.clone());
            return Ok(self.copy_with_new_pos(&local, pos));
        }

        let arity = match self.env.get(id.as_str()) {
            Some(decl) => decl.univ_params.len(),
            None => return Err(Error::parse(format!("unknown identifier '{}'", id), pos)),
        };
        let ls = match ls {
            Some(ls) if ls.len() > arity => {
                let msg = format!("too many universe levels for '{}'", id);
                return Err(Error::parse(msg, pos));
            }
            Some(ls) => ls,
            None => alloc::vec![Level::Placeholder; arity],
        };
        let e = self.propagate_levels(&Expr::constant(id, Vec::new()), ls);
        Ok(self.save_pos(e, pos))
    }

    fn parse_numeral_expr(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let n = self.num_val().to_integer();
        self.next()?;
        Ok(self.save_pos(Expr::lit(Literal::Nat(n)), pos))
    }

    fn parse_decimal_expr(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let q = self.num_val().clone();
        self.next()?;
        Ok(self.save_pos(Expr::lit(Literal::Decimal(q)), pos))
    }

    fn parse_string_expr(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let s = self.str_val().into();
        self.next()?;
        Ok(self.save_pos(Expr::lit(Literal::Str(s)), pos))
    }

    /// Evaluate a script block to an expression.
    fn parse_script_expr(&mut self) -> Result<Expr, Error> {
        let pos = self.pos();
        let code = String::from(self.str_val());
        self.next()?;
        let ss = match self.scripting.as_mut() {
            Some(ss) => ss,
            None => return Err(Error::parse("script blocks are not supported", pos)),
        };
        let e = ss.eval_expr(&code, &self.env, pos);
        let e = e.map_err(|msg| Error::nested(msg, pos))?;
        Ok(self.rec_save_pos(e, pos))
    }

    pub fn mk_app(&mut self, f: Expr, a: Expr, pos: Pos) -> Expr {
        self.save_pos(Expr::app(f, a), pos)
    }

    /// `Type` with a fresh universe parameter,
    /// or with a placeholder level outside of parameter universe scopes.
    pub fn mk_type(&mut self) -> Expr {
        if self.type_use_placeholder {
            return Expr::sort(Level::Placeholder);
        }
        let name = loop {
            self.next_univ += 1;
            let name = crate::Name::new(&format!("l_{}", self.next_univ));
            if !self.local_level_decls.contains(name.as_str()) && !self.env.is_universe(name.as_str())
            {
                break name;
            }
        };
        let l = Level::Param(name.clone());
        self.add_local_level(name, l.clone());
        Expr::sort(l)
    }

    /// Parse a single binder, which becomes visible as local.
    ///
    /// Binders have the shape `x`, `x : A`, `(x : A)`, `{x : A}`, `⦃x : A⦄` or `[x : A]`.
    pub fn parse_binder(&mut self) -> Result<Parameter, Error> {
        if self.curr_is_identifier() {
            return self.parse_binder_core(BinderInfo::Explicit);
        }
        let (close, info) = self.parse_binder_open()?;
        let param = self.parse_binder_core(info)?;
        self.check_binder_close(close)?;
        Ok(param)
    }

    fn parse_binder_open(&mut self) -> Result<(&'static str, BinderInfo), Error> {
        for (open, close, info) in BRACKETS {
            if self.curr_is_token(open) {
                self.next()?;
                return Ok((close, info));
            }
        }
        Err(self.error("invalid binder, '(', '{', '[' or '⦃' expected"))
    }

    fn check_binder_close(&mut self, close: &str) -> Result<(), Error> {
        if !self.curr_is_token(close) {
            return Err(self.error(format!("invalid binder, '{}' expected", close)));
        }
        self.next()
    }

    /// Parse `x` or `x : A`.
    fn parse_binder_core(&mut self, info: BinderInfo) -> Result<Parameter, Error> {
        let pos = self.pos();
        let id = self.check_id_next("invalid binder, identifier expected")?;
        let ty = if self.curr_is_token(":") {
            self.next()?;
            self.parse_expr(0)?
        } else {
            self.save_pos(Expr::placeholder(), pos)
        };
        let local = self.mk_local(id, ty, info);
        let param = Parameter { pos, local, info };
        self.add_parameter(param.clone());
        Ok(param)
    }

    /// Parse `x1 ... xn` or `x1 ... xn : A`.
    fn parse_binder_block(&mut self, ps: &mut Vec<Parameter>, info: BinderInfo) -> Result<(), Error> {
        let names = self.parse_names()?;
        if names.is_empty() {
            return Err(self.error("invalid binder, identifier expected"));
        }
        let ty = if self.curr_is_token(":") {
            self.next()?;
            Some(self.parse_expr(0)?)
        } else {
            None
        };
        for (pos, name) in names {
            let ty = match &ty {
                Some(ty) => ty.clone(),
                None => self.save_pos(Expr::placeholder(), pos),
            };
            let local = self.mk_local(name, ty, info);
            let param = Parameter { pos, local, info };
            self.add_parameter(param.clone());
            ps.push(param)
        }
        Ok(())
    }

    fn parse_binders_core(&mut self, ps: &mut Vec<Parameter>) -> Result<(), Error> {
        if self.curr_is_identifier() {
            return self.parse_binder_block(ps, BinderInfo::Explicit);
        }
        while let Some((_, close, info)) = BRACKETS.iter().find(|(open, ..)| self.curr_is_token(open)) {
            self.next()?;
            self.parse_binder_block(ps, *info)?;
            self.check_binder_close(close)?;
        }
        Ok(())
    }

    /// Parse one or more binder blocks, which become visible as locals.
    ///
    /// Either a single block without brackets, such as `x y : A`,
    /// or a sequence of bracketed blocks, such as `(x y : A) {B : Type}`.
    pub fn parse_binders(&mut self, ps: &mut Vec<Parameter>) -> Result<(), Error> {
        let old = ps.len();
        self.parse_binders_core(ps)?;
        if ps.len() == old {
            return Err(self.error("invalid binder declaration, at least one binder expected"));
        }
        Ok(())
    }

    /// Parse an expression in which the given parameters are visible.
    pub fn parse_scoped_expr(&mut self, ps: &[Parameter], rbp: Prec) -> Result<Expr, Error> {
        self.with_binder_scope(|p| {
            ps.iter().for_each(|param| p.add_parameter(param.clone()));
            p.parse_expr(rbp)
        })
    }

    /// Bind the parameters in `e`, by lambdas if `lambda` is true, else by Pis.
    pub fn abstract_params(&mut self, ps: &[Parameter], e: &Expr, lambda: bool, pos: Pos) -> Expr {
        let locals: Vec<_> = ps.iter().map(|p| p.local.clone()).collect();
        let mut r = e.abstract_locals(&locals);
        for (i, p) in ps.iter().enumerate().rev() {
            let b = Binder {
                name: p.local.name.clone(),
                ty: p.local.ty.abstract_locals(&locals[..i]),
                info: p.info,
            };
            r = if lambda { Expr::lambda(b, r) } else { Expr::pi(b, r) };
            r = self.save_pos(r, pos);
        }
        r
    }

    pub fn lambda_abstract(&mut self, ps: &[Parameter], e: &Expr, pos: Pos) -> Expr {
        self.abstract_params(ps, e, true, pos)
    }

    pub fn pi_abstract(&mut self, ps: &[Parameter], e: &Expr, pos: Pos) -> Expr {
        self.abstract_params(ps, e, false, pos)
    }
}

#[cfg(test)]
mod tests {
    use crate::expr::{Binder, BinderInfo, ExprKind};
    use crate::{Environment, Expr, IoState, Level, Name, Parser};

    fn parse(env: Environment, s: &str) -> Result<Expr, crate::Error> {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(env, &mut ios, s);
        p.scan()?;
        p.parse_expr(0)
    }

    fn env_with(axioms: &[&str]) -> Environment {
        use crate::env::Decl;
        let mut env = Environment::new();
        for a in axioms {
            env.add(Decl::axiom(Name::new(a), Vec::new(), Expr::prop())).unwrap();
        }
        env
    }

    fn c(s: &str) -> Expr {
        Expr::constant(Name::new(s), Vec::new())
    }

    #[test]
    fn application() {
        let env = env_with(&["f", "a", "b"]);
        let e = parse(env, "f a (f b)").unwrap();
        let expected = Expr::mk_app(c("f"), [c("a"), Expr::app(c("f"), c("b"))]);
        assert_eq!(e, expected);
    }

    #[test]
    fn lambda() {
        let env = env_with(&["A"]);
        let e = parse(env, "fun (x : A) y, x").unwrap_err();
        assert!(e.to_string().contains("','"));

        let env = env_with(&["A"]);
        let e = parse(env, "fun (x : A) (y : A), x").unwrap();
        let b = |name: &str| Binder {
            name: Name::new(name),
            ty: c("A"),
            info: BinderInfo::Explicit,
        };
        let expected = Expr::lambda(b("x"), Expr::lambda(b("y"), Expr::var(1)));
        assert_eq!(e, expected);
    }

    #[test]
    fn dependent_binder_types() {
        let env = env_with(&["P"]);
        let e = parse(env, "Pi {A : Prop} (a : A), P a").unwrap();
        let (b1, body) = match e.kind() {
            ExprKind::Pi(b, body) => (b, body),
            _ => panic!("Pi expected"),
        };
        assert_eq!(b1.info, BinderInfo::Implicit);
        match body.kind() {
            ExprKind::Pi(b2, body) => {
                assert_eq!(b2.ty, Expr::var(0));
                assert_eq!(*body, Expr::app(c("P"), Expr::var(0)));
            }
            _ => panic!("Pi expected"),
        }
    }

    #[test]
    fn arrow() {
        let env = env_with(&["A", "B", "C"]);
        let e = parse(env, "A -> B → C").unwrap();
        let expected = Expr::arrow(c("A"), Expr::arrow(c("B"), c("C")));
        assert_eq!(e, expected);
    }

    #[test]
    fn sorts() {
        let env = Environment::new();
        assert_eq!(parse(env.clone(), "Prop").unwrap(), Expr::prop());
        assert_eq!(parse(env.clone(), "Type").unwrap(), Expr::sort(Level::Placeholder));
        let e = parse(env.clone(), "Type.{2}").unwrap();
        assert_eq!(e, Expr::sort(Level::of_nat(2)));
        assert!(parse(env, "Type.{u}").is_err());
    }

    #[test]
    fn unknown_identifier() {
        match parse(Environment::new(), "\n  foo") {
            Err(crate::Error::Parse(e)) => {
                assert_eq!(e.msg, "unknown identifier 'foo'");
                assert_eq!(e.pos, crate::Pos::new(2, 2));
            }
            _ => panic!("parse error expected"),
        }
    }
}
