//! Parser of commands, expressions, universe levels and tactics.
//!
//! The parser reads tokens from a [`TokenSource`] and
//! builds expressions by precedence climbing:
//! which tokens start or continue an expression and
//! how strongly they bind is entirely determined by
//! the tables in the environment, which grow when notation is declared.
//!
//! ~~~
//! use analizi::{parse_commands, Environment, IoState};
//!
//! let src = r#"
//! axiom A : Type
//! axiom f : A -> A
//! infixl `*`:70 := f
//! definition twice (a : A) : A := f (f a)
//! check twice
//! "#;
//! let mut env = Environment::new();
//! let mut ios = IoState::sink();
//! assert!(parse_commands(&mut env, &mut ios, src, "<doc>", None, false)?);
//! assert!(env.get("twice").is_some());
//! # Ok::<_, analizi::Error>(())
//! ~~~

pub mod builtin;
mod command;
mod expr;
mod level;
mod scope;
mod tactic;

pub use scope::{LocalScope, ParamUniverseScope};

use crate::elab::{Elaborator, Hints, Passthrough};
use crate::error::Error;
use crate::expr::{BinderInfo, Expr, Local, Tag};
use crate::io::{IoState, SHOW_ERRORS, VERBOSE};
use crate::local::LocalDecls;
use crate::notation::{NotationEntry, Tables};
use crate::script::Scripting;
use crate::{Environment, Level, Name, Pos, Tactic};
use alloc::boxed::Box;
use alloc::string::{String, ToString};
use alloc::sync::Arc;
use alloc::vec::Vec;
use analizi_scan::{BigRational, Scanner, TokenInfo, TokenKind, TokenSource};
use core::sync::atomic::{AtomicBool, Ordering};
use fnv::FnvHashMap;
use num::ToPrimitive;
use std::path::Path;

/// Parsed binder.
#[derive(Clone, Debug)]
pub struct Parameter {
    pub pos: Pos,
    pub local: Local,
    pub info: BinderInfo,
}

/// State restored when a local scope is closed.
struct Snapshot {
    tables: Tables,
    notations: usize,
}

pub struct Parser<'a> {
    env: Environment,
    ios: &'a mut IoState,
    scripting: Option<&'a mut dyn Scripting>,
    elab: Box<dyn Elaborator + 'a>,
    interrupt: Option<Arc<AtomicBool>>,
    verbose: bool,
    use_exceptions: bool,
    show_errors: bool,

    scanner: Box<dyn TokenSource + 'a>,
    curr: TokenKind,
    /// true if the last scan failed, in which case
    /// `curr` is the kind of the token before the failure
    scan_failed: bool,
    local_level_decls: LocalDecls<Level>,
    local_decls: LocalDecls<Parameter>,
    scopes: Vec<Snapshot>,
    /// names of open sections
    sections: Vec<Option<Name>>,
    last_cmd_pos: Pos,
    last_script_pos: Pos,
    next_tag: Tag,
    next_local: usize,
    /// counter for names of universe parameters introduced by `Type`
    next_univ: usize,
    found_errors: bool,
    pos_table: FnvHashMap<Tag, Pos>,
    hints: Hints,
    /// If true, `Type` is parsed as `Type.{_}`, else
    /// as `Type.{l}` for a fresh local universe level `l`.
    type_use_placeholder: bool,
}

impl<'a> Parser<'a> {
    /// Construct a parser.
    ///
    /// No token is read before [`Parser::scan`] is called.
    pub fn new(
        env: Environment,
        ios: &'a mut IoState,
        scanner: Box<dyn TokenSource + 'a>,
        scripting: Option<&'a mut dyn Scripting>,
        use_exceptions: bool,
    ) -> Self {
        let mut p = Self {
            env,
            ios,
            scripting,
            elab: Box::new(Passthrough),
            interrupt: None,
            verbose: true,
            use_exceptions,
            show_errors: true,
            scanner,
            curr: TokenKind::Eof,
            scan_failed: false,
            local_level_decls: LocalDecls::new(),
            local_decls: LocalDecls::new(),
            scopes: Vec::new(),
            sections: Vec::new(),
            last_cmd_pos: Pos::new(1, 0),
            last_script_pos: Pos::new(1, 0),
            next_tag: 0,
            next_local: 0,
            next_univ: 0,
            found_errors: false,
            pos_table: FnvHashMap::default(),
            hints: Hints::default(),
            type_use_placeholder: true,
        };
        p.updt_options();
        p
    }

    /// Construct a parser over a string that
    /// returns every error to the caller.
    pub fn from_str(env: Environment, ios: &'a mut IoState, input: &'a str) -> Self {
        let scanner = Box::new(Scanner::new(input, "<string>"));
        Self::new(env, ios, scanner, None, true)
    }

    pub fn with_elaborator(self, elab: Box<dyn Elaborator + 'a>) -> Self {
        Self { elab, ..self }
    }

    /// Abort parsing as soon as the flag is set.
    pub fn with_interrupt(self, flag: Arc<AtomicBool>) -> Self {
        let interrupt = Some(flag);
        Self { interrupt, ..self }
    }

    /// Start with given local declarations.
    pub fn with_local_decls(self, lds: LocalDecls<Level>, eds: LocalDecls<Parameter>) -> Self {
        let next_local = eds.entries().iter().map(|(_, p)| p.local.id + 1).max();
        let next_local = next_local.unwrap_or(0).max(self.next_local);
        Self {
            local_level_decls: lds,
            local_decls: eds,
            next_local,
            ..self
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn into_env(self) -> Environment {
        self.env
    }

    pub fn ios(&self) -> &IoState {
        self.ios
    }

    pub fn ios_mut(&mut self) -> &mut IoState {
        self.ios
    }

    pub fn local_level_decls(&self) -> &LocalDecls<Level> {
        &self.local_level_decls
    }

    pub fn local_expr_decls(&self) -> &LocalDecls<Parameter> {
        &self.local_decls
    }

    pub fn hints(&self) -> &Hints {
        &self.hints
    }

    pub fn found_errors(&self) -> bool {
        self.found_errors
    }

    /// Position of the last command keyword.
    pub fn cmd_pos(&self) -> Pos {
        self.last_cmd_pos
    }

    /// Position of the last script block.
    pub fn script_pos(&self) -> Pos {
        self.last_script_pos
    }

    pub fn set_line(&mut self, line: usize) {
        self.scanner.set_line(line)
    }

    /// Refresh the flags that depend on options.
    pub(crate) fn updt_options(&mut self) {
        self.verbose = self.ios.options.get_bool(VERBOSE, true);
        self.show_errors = self.ios.options.get_bool(SHOW_ERRORS, true);
    }

    /// Read the next token.
    pub fn scan(&mut self) -> Result<TokenKind, Error> {
        if let Some(flag) = &self.interrupt {
            if flag.load(Ordering::Relaxed) {
                return Err(Error::Interrupt);
            }
        }
        let kind = self.scanner.scan(&self.env.tables().tokens);
        self.scan_failed = kind.is_err();
        self.curr = kind?;
        Ok(self.curr)
    }

    /// Read the next token if the current one is not the end of input.
    pub fn next(&mut self) -> Result<(), Error> {
        if self.curr != TokenKind::Eof {
            self.scan()?;
        }
        Ok(())
    }

    pub fn curr(&self) -> TokenKind {
        self.curr
    }

    /// Position of the current token.
    pub fn pos(&self) -> Pos {
        self.scanner.pos()
    }

    pub fn curr_is_identifier(&self) -> bool {
        self.curr == TokenKind::Identifier
    }

    pub fn curr_is_numeral(&self) -> bool {
        self.curr == TokenKind::Numeral
    }

    pub fn curr_is_string(&self) -> bool {
        self.curr == TokenKind::String
    }

    pub fn curr_is_keyword(&self) -> bool {
        self.curr == TokenKind::Keyword
    }

    pub fn curr_is_command(&self) -> bool {
        self.curr == TokenKind::CommandKeyword
    }

    pub fn curr_is_quoted_symbol(&self) -> bool {
        self.curr == TokenKind::QuotedSymbol
    }

    /// Return true if the current token is a keyword or command keyword `tk`.
    pub fn curr_is_token(&self, tk: &str) -> bool {
        matches!(self.curr, TokenKind::Keyword | TokenKind::CommandKeyword)
            && self.token_text() == tk
    }

    /// Return true if the current token is a keyword or an identifier `tk`.
    pub fn curr_is_token_or_id(&self, tk: &str) -> bool {
        (self.curr_is_identifier() || self.curr_is_token(tk)) && self.token_text() == tk
    }

    /// Move to the next token if the current token is `tk`, else fail.
    pub fn check_token_next(&mut self, tk: &str, msg: &str) -> Result<(), Error> {
        if !self.curr_is_token(tk) {
            return Err(self.error(msg));
        }
        self.next()
    }

    /// Return the current identifier and move to the next token,
    /// failing if the current token is not an identifier.
    pub fn check_id_next(&mut self, msg: &str) -> Result<Name, Error> {
        if !self.curr_is_identifier() {
            return Err(self.error(msg));
        }
        let id = self.name_val();
        self.next()?;
        Ok(id)
    }

    pub fn num_val(&self) -> &BigRational {
        self.scanner.num_val()
    }

    pub fn name_val(&self) -> Name {
        Name::new(self.scanner.name_val())
    }

    pub fn str_val(&self) -> &str {
        self.scanner.str_val()
    }

    pub fn token_text(&self) -> &str {
        self.scanner.token_text()
    }

    pub fn token_info(&self) -> Option<&TokenInfo> {
        self.scanner.token_info()
    }

    pub fn stream_name(&self) -> &str {
        self.scanner.stream_name()
    }

    /// Parser error at the current position.
    pub fn error(&self, msg: impl Into<String>) -> Error {
        Error::parse(msg, self.pos())
    }

    /// Parse a sequence of identifiers.
    pub fn parse_names(&mut self) -> Result<Vec<(Pos, Name)>, Error> {
        let mut names = Vec::new();
        while self.curr_is_identifier() {
            names.push((self.pos(), self.name_val()));
            self.next()?;
        }
        Ok(names)
    }

    /// Value of the current numeral, which has to fit in a machine integer.
    pub fn get_small_nat(&self) -> Result<usize, Error> {
        let n = self.num_val();
        n.is_integer()
            .then(|| n.to_integer().to_u32())
            .flatten()
            .map(|n| n as usize)
            .ok_or_else(|| self.error("invalid numeral, value does not fit in a machine integer"))
    }

    pub fn parse_small_nat(&mut self) -> Result<usize, Error> {
        if !self.curr_is_numeral() {
            return Err(self.error("(small) natural number expected"));
        }
        let n = self.get_small_nat()?;
        self.next()?;
        Ok(n)
    }

    /// Return the tag of an expression, tagging it if necessary.
    ///
    /// Tags are never reused.
    pub fn get_tag(&mut self, e: &Expr) -> Tag {
        match e.tag() {
            Some(tag) => tag,
            None => {
                let tag = self.next_tag;
                self.next_tag += 1;
                e.set_tag(tag);
                tag
            }
        }
    }

    fn stamp(&mut self, e: &Expr, pos: Pos) {
        let tag = self.get_tag(e);
        self.pos_table.entry(tag).or_insert(pos);
    }

    /// Record the position of an expression,
    /// unless the expression already has a position.
    pub fn save_pos(&mut self, e: Expr, pos: Pos) -> Expr {
        self.stamp(&e, pos);
        e
    }

    /// Record the position of all subexpressions without position.
    pub fn rec_save_pos(&mut self, e: Expr, pos: Pos) -> Expr {
        let mut todo = Vec::new();
        let table = &self.pos_table;
        e.for_each(&mut |e, _| {
            let known = e.tag().map_or(false, |tag| table.contains_key(&tag));
            if !known {
                todo.push(e.clone())
            }
            !known
        });
        todo.iter().for_each(|e| self.stamp(e, pos));
        e
    }

    /// Copy an expression, giving all its nodes the position `pos`.
    pub fn copy_with_new_pos(&mut self, e: &Expr, pos: Pos) -> Expr {
        let e = e.deep_copy();
        let mut nodes = Vec::new();
        e.for_each(&mut |e, _| {
            nodes.push(e.clone());
            true
        });
        nodes.iter().for_each(|n| self.stamp(n, pos));
        e
    }

    /// Position of an expression, or `default` if it has none.
    pub fn pos_of_or(&self, e: &Expr, default: Pos) -> Pos {
        let pos = e.tag().and_then(|tag| self.pos_table.get(&tag));
        pos.copied().unwrap_or(default)
    }

    /// Position of an expression, or the current position if it has none.
    pub fn pos_of(&self, e: &Expr) -> Pos {
        self.pos_of_or(e, self.pos())
    }

    /// Use tactic `t` to synthesise the placeholder `e`.
    pub fn save_hint(&mut self, e: &Expr, t: Tactic) {
        let tag = self.get_tag(e);
        self.hints.insert(tag, t);
    }

    /// Give universe levels to constants without explicit levels.
    pub fn propagate_levels(&self, e: &Expr, ls: Vec<Level>) -> Expr {
        if ls.is_empty() {
            return e.clone();
        }
        e.replace(&mut |e, _| match e.kind() {
            crate::expr::ExprKind::Constant(c, cls) if cls.is_empty() => {
                Some(Expr::constant(c.clone(), ls.clone()))
            }
            _ => None,
        })
    }

    pub fn elaborate(&mut self, e: &Expr, lparams: &[Name]) -> Result<Expr, Error> {
        let pos = self.pos_of_or(e, self.last_cmd_pos);
        let r = self.elab.elaborate(&self.env, e, lparams, &self.hints);
        r.map_err(|err| Error::nested(err, pos))
    }

    pub fn elaborate_def(
        &mut self,
        ty: &Expr,
        val: &Expr,
        lparams: &[Name],
    ) -> Result<(Expr, Expr), Error> {
        let pos = self.pos_of_or(val, self.last_cmd_pos);
        let r = self.elab.elaborate_def(&self.env, ty, val, lparams, &self.hints);
        r.map_err(|err| Error::nested(err, pos))
    }

    pub fn infer_type(&mut self, e: &Expr) -> Option<Expr> {
        self.elab.infer_type(&self.env, e)
    }

    /// Extend the tables of the environment.
    pub fn add_notation(&mut self, entry: NotationEntry, persistent: bool) {
        trace!("add notation {:?} (persistent: {})", entry, persistent);
        self.env.add_notation(entry, persistent)
    }

    /// Parse all commands until the end of input.
    ///
    /// Return true if no error was found.
    pub fn parse_commands(&mut self) -> Result<bool, Error> {
        self.protected_call(|p| p.scan().map(|_| ()))?;
        while self.curr != TokenKind::Eof {
            match self.curr {
                TokenKind::CommandKeyword => self.protected_call(Self::parse_command)?,
                TokenKind::ScriptBlock => self.protected_call(Self::parse_script)?,
                _ => self.protected_call(|p| Err(p.error("command expected")))?,
            }
        }
        if !self.sections.is_empty() {
            warn!("{} section(s) left open", self.sections.len());
            while self.sections.pop().is_some() {
                self.pop_local_scope();
            }
        }
        Ok(!self.found_errors)
    }

    /// Run `f`, reporting errors and skipping to the next command
    /// if the error is recoverable and exceptions are disabled.
    pub fn protected_call<F>(&mut self, f: F) -> Result<(), Error>
    where
        F: FnOnce(&mut Self) -> Result<(), Error>,
    {
        match f(self) {
            Ok(()) => Ok(()),
            Err(e) => {
                self.found_errors = true;
                if self.use_exceptions || !e.is_recoverable() {
                    return Err(e);
                }
                self.display_error(&e)?;
                self.sync_command()
            }
        }
    }

    fn display_error(&mut self, e: &Error) -> Result<(), Error> {
        if let Error::Parse(pe) | Error::Nested(pe) = e {
            debug!("error at {}: {}", pe.pos, pe.msg);
            if self.show_errors {
                let name = self.stream_name().to_string();
                let (line, col) = (pe.pos.line, pe.pos.col);
                writeln!(self.ios.diagnostic(), "{}:{}:{}: error: {}", name, line, col, pe)?;
            }
        }
        Ok(())
    }

    /// Skip tokens until the next command keyword, script block, or end of input.
    fn sync_command(&mut self) -> Result<(), Error> {
        use TokenKind::{CommandKeyword, Eof, ScriptBlock};
        while self.scan_failed || !matches!(self.curr, CommandKeyword | ScriptBlock | Eof) {
            match self.scan() {
                Err(e) if !e.is_recoverable() => return Err(e),
                _ => (),
            }
        }
        Ok(())
    }

    fn parse_command(&mut self) -> Result<(), Error> {
        let name = self.token_text().to_string();
        let pos = self.pos();
        let cmd = self.env.tables().cmds.get(&name).cloned();
        let cmd = cmd.ok_or_else(|| Error::parse(format!("unknown command '{}'", name), pos))?;
        self.last_cmd_pos = pos;
        self.hints.clear();
        self.pos_table.clear();
        self.next_univ = 0;
        trace!("command {} at {}", name, pos);
        self.next()?;
        (cmd.f)(self)
    }

    fn parse_script(&mut self) -> Result<(), Error> {
        let code = self.str_val().to_string();
        let pos = self.pos();
        self.last_script_pos = pos;
        self.next()?;
        match self.scripting.as_mut() {
            None => Err(Error::parse("script blocks are not supported", pos)),
            Some(ss) => ss
                .run(&code, &mut self.env, self.ios, pos)
                .map_err(|msg| Error::nested(msg, pos)),
        }
    }
}

/// Parse all commands of a string.
///
/// The environment is updated only if parsing does not abort.
/// Return true if no error was found.
pub fn parse_commands(
    env: &mut Environment,
    ios: &mut IoState,
    input: &str,
    stream_name: &str,
    scripting: Option<&mut dyn Scripting>,
    use_exceptions: bool,
) -> Result<bool, Error> {
    let scanner = Box::new(Scanner::new(input, stream_name));
    let scripting = match scripting {
        Some(ss) => Some(&mut *ss as &mut dyn Scripting),
        None => None,
    };
    let mut p = Parser::new(env.clone(), ios, scanner, scripting, use_exceptions);
    let ok = p.parse_commands()?;
    *env = p.into_env();
    Ok(ok)
}

/// Parse all commands of a file.
pub fn parse_commands_file(
    env: &mut Environment,
    ios: &mut IoState,
    path: impl AsRef<Path>,
    scripting: Option<&mut dyn Scripting>,
    use_exceptions: bool,
) -> Result<bool, Error> {
    let path = path.as_ref();
    let input = std::fs::read_to_string(path)?;
    let name = path.display().to_string();
    parse_commands(env, ios, &input, &name, scripting, use_exceptions)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags() {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, "");
        let es: Vec<_> = (0..10).map(|_| Expr::prop()).collect();
        let mut tags: Vec<_> = es.iter().map(|e| p.get_tag(e)).collect();
        // tagging twice yields the same tag
        assert_eq!(p.get_tag(&es[3]), tags[3]);
        tags.sort();
        tags.dedup();
        assert_eq!(tags.len(), es.len());
    }

    #[test]
    fn positions() {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, "");
        let (p1, p2) = (Pos::new(3, 4), Pos::new(5, 6));
        let e = p.save_pos(Expr::prop(), p1);
        assert_eq!(p.pos_of(&e), p1);
        let e = p.save_pos(e, p2);
        assert_eq!(p.pos_of(&e), p1);

        let app = p.rec_save_pos(Expr::app(e.clone(), Expr::prop()), p2);
        assert_eq!(p.pos_of(&app), p2);
        assert_eq!(p.pos_of(&e), p1);

        let copy = p.copy_with_new_pos(&app, p2);
        let arg = match copy.kind() {
            crate::expr::ExprKind::App(f, _) => f.clone(),
            _ => panic!("application expected"),
        };
        assert_eq!(p.pos_of(&arg), p2);
        assert_eq!(p.pos_of_or(&Expr::prop(), p1), p1);
    }

    #[test]
    fn positions_per_command() -> Result<(), Error> {
        let mut ios = IoState::sink();
        let src = "check Prop\ncheck Prop -> Prop\ncheck Prop\n";
        let mut p = Parser::from_str(Environment::new(), &mut ios, src);
        assert!(p.parse_commands()?);
        // only the positions of the last command remain
        assert_eq!(p.pos_table.len(), 1);
        Ok(())
    }
}
