//! Tables that drive the parser.
//!
//! Notation is data: a parse table is a trie over token texts,
//! each transition carrying an action that says
//! what to parse after the token.
//! Nodes of the trie may accept, yielding an expression
//! whose loose variables refer to the parsed arguments.

use crate::error::Error;
use crate::parser::Parser;
use crate::{Expr, Pos, Prec, Tactic};
use alloc::string::String;
use alloc::vec::Vec;
use analizi_scan::TokenTable;
use core::fmt;

/// Immutable HashMap for fast cloning of tables.
type FnvHashMap<K, V> = im::hashmap::HashMap<K, V, fnv::FnvBuildHasher>;

/// Precedence of application.
pub const MAX_PREC: Prec = 1024;
/// Precedence of the function arrow.
pub const ARROW_PREC: Prec = 25;

/// Parse function of an extension action.
///
/// It receives the arguments parsed so far and
/// the position of the first token of the notation.
pub type ParseFn = fn(&mut Parser<'_>, &[Expr], Pos) -> Result<Expr, Error>;

/// What to parse after a token.
#[derive(Clone)]
pub enum Action {
    /// nothing
    Skip,
    /// an expression with given right binding power
    Expr(Prec),
    /// one binder, which is visible in the rest of the notation
    Binder,
    /// one or more binders, which are visible in the rest of the notation
    Binders,
    /// an expression with given right binding power,
    /// abstracted over the binders parsed so far
    /// (by lambda if the flag is true, else by Pi)
    ScopedExpr(Prec, bool),
    /// anything, by a parse function
    Ext(ParseFn),
}

impl fmt::Debug for Action {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Skip => write!(f, "Skip"),
            Self::Expr(rbp) => write!(f, "Expr({})", rbp),
            Self::Binder => write!(f, "Binder"),
            Self::Binders => write!(f, "Binders"),
            Self::ScopedExpr(rbp, lambda) => write!(f, "ScopedExpr({}, {})", rbp, lambda),
            Self::Ext(_) => write!(f, "Ext"),
        }
    }
}

/// Token followed by an action.
#[derive(Clone, Debug)]
pub struct Transition {
    pub token: String,
    pub action: Action,
}

impl Transition {
    pub fn new(token: &str, action: Action) -> Self {
        let token = token.into();
        Self { token, action }
    }
}

/// Trie of transitions.
#[derive(Clone, Debug, Default)]
pub struct ParseTable {
    children: FnvHashMap<String, (Action, ParseTable)>,
    accept: Option<Expr>,
}

impl ParseTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path of transitions that ends in an accepting node.
    ///
    /// Existing paths with the same prefix are kept;
    /// the action of a shared transition is overwritten.
    pub fn add(&mut self, ts: &[Transition], accept: Expr) {
        match ts.split_first() {
            None => self.accept = Some(accept),
            Some((t, rest)) => {
                let mut next = self.find(&t.token).map(|(_, n)| n.clone()).unwrap_or_default();
                next.add(rest, accept);
                self.children.insert(t.token.clone(), (t.action.clone(), next));
            }
        }
    }

    pub fn find(&self, token: &str) -> Option<&(Action, ParseTable)> {
        self.children.get(token)
    }

    pub fn accept(&self) -> Option<&Expr> {
        self.accept.as_ref()
    }

    /// Tokens of the transitions, sorted.
    pub fn tokens(&self) -> Vec<&str> {
        let mut tokens: Vec<_> = self.children.keys().map(|tk| tk.as_str()).collect();
        tokens.sort_unstable();
        tokens
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty() && self.accept.is_none()
    }
}

pub type CmdFn = fn(&mut Parser<'_>) -> Result<(), Error>;

#[derive(Clone)]
pub struct CmdInfo {
    pub descr: &'static str,
    pub f: CmdFn,
}

pub type CmdTable = FnvHashMap<String, CmdInfo>;

pub type TacticNudFn = fn(&mut Parser<'_>) -> Result<Tactic, Error>;
pub type TacticLedFn = fn(&mut Parser<'_>, Tactic) -> Result<Tactic, Error>;

/// Tactic notation.
#[derive(Clone)]
pub enum TacticCmd {
    /// prefix tactic, such as `exact e`
    Nud(TacticNudFn),
    /// infix tactic with given left binding power, such as `t1 ; t2`
    Led(Prec, TacticLedFn),
}

pub type TacticTable = FnvHashMap<String, TacticCmd>;

/// All tables that drive the parser.
#[derive(Clone, Default)]
pub struct Tables {
    pub tokens: TokenTable,
    pub nud: ParseTable,
    pub led: ParseTable,
    pub cmds: CmdTable,
    pub tactics: TacticTable,
}

impl Tables {
    /// Register a command together with its keyword.
    pub fn add_cmd(&mut self, name: &str, descr: &'static str, f: CmdFn) {
        self.tokens.insert_command(name);
        self.cmds.insert(name.into(), CmdInfo { descr, f });
    }

    pub fn add_tactic(&mut self, name: &str, cmd: TacticCmd) {
        self.tactics.insert(name.into(), cmd);
    }
}

/// Entry of a notation declaration.
#[derive(Clone, Debug)]
pub enum NotationEntry {
    Token(String, Prec),
    Nud(Vec<Transition>, Expr),
    Led(Vec<Transition>, Expr),
}

impl NotationEntry {
    pub fn apply(&self, tables: &mut Tables) {
        match self {
            Self::Token(tk, prec) => tables.tokens.insert(tk, *prec),
            Self::Nud(ts, accept) => tables.nud.add(ts, accept.clone()),
            Self::Led(ts, accept) => tables.led.add(ts, accept.clone()),
        }
    }
}

#[test]
fn trie() {
    use crate::expr::cst;
    let mut t = ParseTable::new();
    let if_then = [
        Transition::new("if", Action::Expr(0)),
        Transition::new("then", Action::Expr(0)),
    ];
    let else_ = Transition::new("else", Action::Expr(0));
    t.add(&if_then, cst("ite1"));
    let ite: Vec<_> = if_then.iter().cloned().chain([else_]).collect();
    t.add(&ite, cst("ite2"));

    let (_, t_if) = t.find("if").unwrap();
    let (_, t_then) = t_if.find("then").unwrap();
    assert_eq!(t_then.accept(), Some(&cst("ite1")));
    let (_, t_else) = t_then.find("else").unwrap();
    assert_eq!(t_else.accept(), Some(&cst("ite2")));
    assert!(t.find("then").is_none());

    // tables are persistent
    let snapshot = t.clone();
    t.add(&[Transition::new("neg", Action::Expr(40))], cst("neg"));
    assert!(snapshot.find("neg").is_none() && t.find("neg").is_some());
}
