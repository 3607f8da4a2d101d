//! Classification of lexemes into tokens.

use crate::lex::{is_id_rest, is_id_start, is_symbol, Lexeme};
use crate::{Pos, TokenInfo, TokenTable};
use core::fmt::{self, Display};
use logos::Logos;
use num::{BigInt, BigRational, Zero};

/// Kind of the current token.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Keyword,
    CommandKeyword,
    ScriptBlock,
    Identifier,
    Numeral,
    Decimal,
    String,
    QuotedSymbol,
    Eof,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnknownSymbol(String),
    UnterminatedComment,
    UnterminatedScript,
    InvalidString,
}

/// Lexical error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Error {
    pub pos: Pos,
    pub kind: ErrorKind,
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::UnknownSymbol(s) => write!(f, "unknown symbol '{}'", s),
            Self::UnterminatedComment => "unterminated comment".fmt(f),
            Self::UnterminatedScript => "unterminated script block".fmt(f),
            Self::InvalidString => "invalid string literal".fmt(f),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.kind.fmt(f)
    }
}

impl std::error::Error for Error {}

/// Source of tokens for the parser.
///
/// The token table is passed on every call to `scan`,
/// because it may change between two tokens.
pub trait TokenSource {
    /// Read the next token.
    fn scan(&mut self, table: &TokenTable) -> Result<TokenKind, Error>;

    /// Position of the current token.
    fn pos(&self) -> Pos;

    /// Set the line number of the current position.
    fn set_line(&mut self, line: usize);

    /// Value of the current numeral or decimal.
    fn num_val(&self) -> &BigRational;

    /// Name of the current identifier or keyword.
    fn name_val(&self) -> &str;

    /// Payload of the current string, quoted symbol or script block.
    fn str_val(&self) -> &str;

    /// Information about the current keyword.
    fn token_info(&self) -> Option<&TokenInfo>;

    /// Raw text of the current token.
    fn token_text(&self) -> &str;

    fn stream_name(&self) -> &str;
}

/// Token source over a string.
pub struct Scanner<'s> {
    src: &'s str,
    name: String,
    offset: usize,
    line: usize,
    line_start: usize,

    pos: Pos,
    text: &'s str,
    num: BigRational,
    string: String,
    info: Option<TokenInfo>,
}

impl<'s> Scanner<'s> {
    pub fn new(src: &'s str, name: impl Into<String>) -> Self {
        Self {
            src,
            name: name.into(),
            offset: 0,
            line: 1,
            line_start: 0,
            pos: Pos::new(1, 0),
            text: "",
            num: BigRational::zero(),
            string: String::new(),
            info: None,
        }
    }

    /// Move the cursor forward, keeping track of lines.
    fn advance(&mut self, to: usize) {
        let skipped = &self.src[self.offset..to];
        for (i, c) in skipped.char_indices() {
            if c == '\n' {
                self.line += 1;
                self.line_start = self.offset + i + 1;
            }
        }
        self.offset = to;
    }

    /// Position of an offset on the current line.
    fn pos_at(&self, offset: usize) -> Pos {
        let col = self.src[self.line_start..offset].chars().count();
        Pos::new(self.line, col)
    }

    /// Extend an identifier by dot-separated components.
    fn dotted(&self, mut end: usize) -> usize {
        loop {
            let mut chars = self.src[end..].chars();
            match (chars.next(), chars.next()) {
                (Some('.'), Some(c)) if is_id_start(c) => {
                    end += 1 + c.len_utf8();
                    end += prefix_len(&self.src[end..], is_id_rest);
                }
                _ => return end,
            }
        }
    }

    fn ident(&mut self, start: usize, end: usize, table: &TokenTable) -> TokenKind {
        let src = self.src;
        let end = self.dotted(end);
        self.text = &src[start..end];
        self.advance(end);
        match table.get(self.text) {
            Some(info) => {
                self.info = Some(info.clone());
                info.kind()
            }
            None => TokenKind::Identifier,
        }
    }

    fn number(&mut self, start: usize, end: usize) -> TokenKind {
        let src = self.src;
        let int = nat(&src[start..end]);
        let mut chars = src[end..].chars();
        let kind = match (chars.next(), chars.next()) {
            (Some('.'), Some(c)) if c.is_ascii_digit() => {
                let frac = &src[end + 1..];
                let frac = &frac[..prefix_len(frac, |c| c.is_ascii_digit())];
                let denom = num::pow(BigInt::from(10), frac.len());
                self.num = BigRational::new(int * &denom + nat(frac), denom);
                self.text = &src[start..end + 1 + frac.len()];
                TokenKind::Decimal
            }
            _ => {
                self.num = BigRational::from_integer(int);
                self.text = &src[start..end];
                TokenKind::Numeral
            }
        };
        self.advance(start + self.text.len());
        kind
    }

    /// Cut the longest known token out of a run of symbol characters.
    fn symbol(&mut self, start: usize, table: &TokenTable) -> Result<TokenKind, Error> {
        let src = self.src;
        let run = &src[start..];
        let run = &run[..prefix_len(run, is_symbol)];
        match table.longest_prefix(run) {
            Some((len, info)) => {
                self.text = &run[..len];
                self.info = Some(info.clone());
                self.advance(start + len);
                Ok(info.kind())
            }
            None => {
                let c = run.chars().next().unwrap_or(' ');
                self.advance(start + c.len_utf8());
                Err(self.error(ErrorKind::UnknownSymbol(c.to_string())))
            }
        }
    }

    /// Classify a lexer error and skip the offending input.
    fn skip_error(&mut self, start: usize, end: usize) -> Error {
        let rest = &self.src[start..];
        let (kind, to) = if rest.starts_with("/-") {
            (ErrorKind::UnterminatedComment, self.src.len())
        } else if rest.starts_with("(*") {
            (ErrorKind::UnterminatedScript, self.src.len())
        } else if rest.starts_with('"') {
            let eol = rest.find('\n').map_or(self.src.len(), |i| start + i);
            (ErrorKind::InvalidString, eol.max(end))
        } else {
            let c = rest.chars().next().unwrap_or(' ');
            (ErrorKind::UnknownSymbol(c.to_string()), start + c.len_utf8())
        };
        self.advance(to.max(start + 1).min(self.src.len()));
        self.error(kind)
    }

    fn error(&self, kind: ErrorKind) -> Error {
        Error {
            pos: self.pos,
            kind,
        }
    }
}

/// Length in bytes of the longest prefix whose characters satisfy `f`.
fn prefix_len(s: &str, f: impl Fn(char) -> bool) -> usize {
    s.chars().take_while(|c| f(*c)).map(char::len_utf8).sum()
}

fn nat(digits: &str) -> BigInt {
    digits.bytes().fold(BigInt::zero(), |acc, d| {
        acc * 10u32 + u32::from(d - b'0')
    })
}

impl<'s> TokenSource for Scanner<'s> {
    fn scan(&mut self, table: &TokenTable) -> Result<TokenKind, Error> {
        let src = self.src;
        loop {
            let mut lexer = Lexeme::lexer(&src[self.offset..]);
            let lexeme = lexer.next();
            let span = lexer.span();
            let (start, end) = (self.offset + span.start, self.offset + span.end);

            self.info = None;
            let lexeme = match lexeme {
                None => {
                    self.advance(src.len());
                    self.pos = self.pos_at(src.len());
                    self.text = "";
                    return Ok(TokenKind::Eof);
                }
                Some(Lexeme::Space) => {
                    self.advance(end);
                    continue;
                }
                Some(lexeme) => lexeme,
            };

            self.advance(start);
            self.pos = self.pos_at(start);
            self.text = &src[start..end];
            return match lexeme {
                Lexeme::Ident(_) => Ok(self.ident(start, end, table)),
                Lexeme::Numeral(_) => Ok(self.number(start, end)),
                Lexeme::Symbol(_) => self.symbol(start, table),
                Lexeme::Str(s) => {
                    self.string = s;
                    self.advance(end);
                    Ok(TokenKind::String)
                }
                Lexeme::Quoted(q) => {
                    self.string = q.to_string();
                    self.advance(end);
                    Ok(TokenKind::QuotedSymbol)
                }
                Lexeme::Script(code) => {
                    self.string = code.to_string();
                    self.advance(end);
                    Ok(TokenKind::ScriptBlock)
                }
                Lexeme::Space | Lexeme::Error => Err(self.skip_error(start, end)),
            };
        }
    }

    fn pos(&self) -> Pos {
        self.pos
    }

    fn set_line(&mut self, line: usize) {
        self.line = line;
        self.pos.line = line;
    }

    fn num_val(&self) -> &BigRational {
        &self.num
    }

    fn name_val(&self) -> &str {
        self.text
    }

    fn str_val(&self) -> &str {
        &self.string
    }

    fn token_info(&self) -> Option<&TokenInfo> {
        self.info.as_ref()
    }

    fn token_text(&self) -> &str {
        self.text
    }

    fn stream_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
fn table() -> TokenTable {
    let mut table = TokenTable::new();
    for tk in ["(", ")", ",", "λ", "fun", ".{", "}"] {
        table.insert(tk, 0)
    }
    table.insert("+", 65);
    table.insert("++", 65);
    table.insert_command("check");
    table
}

#[cfg(test)]
fn tokens(s: &str) -> Result<Vec<(TokenKind, String)>, Error> {
    let table = table();
    let mut scanner = Scanner::new(s, "test");
    let mut tokens = Vec::new();
    loop {
        match scanner.scan(&table)? {
            TokenKind::Eof => return Ok(tokens),
            kind => tokens.push((kind, scanner.token_text().to_string())),
        }
    }
}

#[test]
fn positive() -> Result<(), Error> {
    use TokenKind::*;
    let toks = tokens;
    let t = |k, s: &str| (k, s.to_string());

    assert_eq!(
        toks("check λx, (f x)++a.b")?,
        vec![
            t(CommandKeyword, "check"),
            t(Keyword, "λ"),
            t(Identifier, "x"),
            t(Keyword, ","),
            t(Keyword, "("),
            t(Identifier, "f"),
            t(Identifier, "x"),
            t(Keyword, ")"),
            t(Keyword, "++"),
            t(Identifier, "a.b"),
        ]
    );
    assert_eq!(
        toks("Type.{u} fun 1 2.50 -- comment\n/- block -/ +")?,
        vec![
            t(Identifier, "Type"),
            t(Keyword, ".{"),
            t(Identifier, "u"),
            t(Keyword, "}"),
            t(Keyword, "fun"),
            t(Numeral, "1"),
            t(Decimal, "2.50"),
            t(Keyword, "+"),
        ]
    );
    Ok(())
}

#[test]
fn values() -> Result<(), Error> {
    let table = table();
    let mut scanner = Scanner::new("2.50 \"a\\tb\" `+` (* run *)\n  x", "test");

    assert_eq!(scanner.scan(&table)?, TokenKind::Decimal);
    assert_eq!(*scanner.num_val(), BigRational::new(5.into(), 2.into()));

    assert_eq!(scanner.scan(&table)?, TokenKind::String);
    assert_eq!(scanner.str_val(), "a\tb");

    assert_eq!(scanner.scan(&table)?, TokenKind::QuotedSymbol);
    assert_eq!(scanner.str_val(), "+");

    assert_eq!(scanner.scan(&table)?, TokenKind::ScriptBlock);
    assert_eq!(scanner.str_val(), " run ");
    assert_eq!(scanner.pos(), Pos::new(1, 16));

    assert_eq!(scanner.scan(&table)?, TokenKind::Identifier);
    assert_eq!(scanner.pos(), Pos::new(2, 2));

    assert_eq!(scanner.scan(&table)?, TokenKind::Eof);
    assert_eq!(scanner.scan(&table)?, TokenKind::Eof);
    Ok(())
}

#[test]
fn negative() {
    let err = |s| tokens(s).unwrap_err();
    let unknown = |c: &str| ErrorKind::UnknownSymbol(c.to_string());
    assert_eq!(err("x § y").kind, unknown("§"));
    assert_eq!(err("x § y").pos, Pos::new(1, 2));
    assert_eq!(err("a\n*").pos, Pos::new(2, 0));
    assert_eq!(err("/- open").kind, ErrorKind::UnterminatedComment);
    assert_eq!(err("(* open").kind, ErrorKind::UnterminatedScript);
    assert_eq!(err("\"a\\qb\"").kind, ErrorKind::InvalidString);
}

#[test]
fn recovery() {
    let table = table();
    let mut scanner = Scanner::new("§ check", "test");
    assert!(scanner.scan(&table).is_err());
    assert_eq!(scanner.scan(&table), Ok(TokenKind::CommandKeyword));
}
