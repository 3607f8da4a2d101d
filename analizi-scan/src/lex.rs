//! Lexemes, the raw material of tokens.
//!
//! The lexer does not know about keywords:
//! it only separates identifiers, literals, comments and symbol characters.
//! Grouping symbol characters into tokens is done by the scanner,
//! because the set of symbol tokens grows when notation is declared.

use logos::{Lexer, Logos};

#[derive(Logos, Debug, PartialEq, Eq)]
pub enum Lexeme<'s> {
    /// Identifier component (without dots)
    #[regex("[a-zA-Z_α-κμ-ωΑ-ΟΡ-Ω][a-zA-Z0-9_'α-κμ-ωΑ-ΟΡ-Ω]*")]
    Ident(&'s str),

    #[regex("[0-9]+")]
    Numeral(&'s str),

    /// String literal, unescaped
    #[regex(r#""([^"\\]|\\.)*""#, string)]
    Str(String),

    /// Symbol between backquotes, as used in notation declarations
    #[regex("`[^`\n]+`", quoted)]
    Quoted(&'s str),

    /// Script block `(* ... *)`, yielding its contents
    #[token("(*", script)]
    Script(&'s str),

    /// A single symbol character
    #[regex(r#"[^ \t\r\n\fa-zA-Z0-9_'"`α-κμ-ωΑ-ΟΡ-Ω]"#)]
    Symbol(&'s str),

    #[regex(r"[ \t\r\n\f]+")]
    #[regex("--[^\n]*")]
    #[token("/-", comment)]
    Space,

    #[error]
    Error,
}

/// Return true if the character may start an identifier.
///
/// `λ` and `Π` are excluded, so that `λx` and `Πx` lex as two tokens.
pub fn is_id_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || is_greek(c)
}

/// Return true if the character may occur in an identifier after its first character.
pub fn is_id_rest(c: char) -> bool {
    is_id_start(c) || c.is_ascii_digit() || c == '\''
}

/// Return true if the character may be part of a symbol token.
pub fn is_symbol(c: char) -> bool {
    !(c.is_whitespace() || is_id_rest(c) || c == '"' || c == '`')
}

fn is_greek(c: char) -> bool {
    matches!(c, 'α'..='κ' | 'μ'..='ω' | 'Α'..='Ο' | 'Ρ'..='Ω')
}

fn string<'s>(lex: &mut Lexer<'s, Lexeme<'s>>) -> Option<String> {
    let s = lex.slice();
    unescape(&s[1..s.len() - 1])
}

fn quoted<'s>(lex: &mut Lexer<'s, Lexeme<'s>>) -> &'s str {
    let s = lex.slice();
    &s[1..s.len() - 1]
}

fn script<'s>(lex: &mut Lexer<'s, Lexeme<'s>>) -> Option<&'s str> {
    let rest = lex.remainder();
    let len = rest.find("*)")?;
    lex.bump(len + 2); // include len of `*)`
    Some(&rest[..len])
}

fn comment<'s>(lex: &mut Lexer<'s, Lexeme<'s>>) -> Option<()> {
    // number of open comments
    let mut open = 1;
    let prefix: &[_] = &['/', '-'];
    while open > 0 {
        // go to first occurrence of either '/' or '-'
        lex.bump(lex.remainder().find(prefix)?);
        if lex.remainder().starts_with("/-") {
            open += 1;
            lex.bump(2);
        } else if lex.remainder().starts_with("-/") {
            open -= 1;
            lex.bump(2);
        } else {
            lex.bump(1);
        }
    }
    Some(())
}

fn unescape(s: &str) -> Option<String> {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        out.push(match chars.next()? {
            'n' => '\n',
            't' => '\t',
            '\\' => '\\',
            '"' => '"',
            '\'' => '\'',
            _ => return None,
        });
    }
    Some(out)
}

#[test]
fn lexemes() {
    let lex = |s| Lexeme::lexer(s).filter(|l| *l != Lexeme::Space).collect::<Vec<_>>();
    use Lexeme::*;
    assert_eq!(
        lex("λx, f' x -- rest\n"),
        vec![Symbol("λ"), Ident("x"), Symbol(","), Ident("f'"), Ident("x")]
    );
    assert_eq!(lex(r#""a\nb" `+`"#), vec![Str("a\nb".into()), Quoted("+")]);
    assert_eq!(lex("/- a /- b -/ c -/ 12"), vec![Numeral("12")]);
    assert_eq!(lex("(* print 1 *)"), vec![Script(" print 1 ")]);
    assert_eq!(Lexeme::lexer("/- open").next(), Some(Error));
}

#[test]
fn classes() {
    assert!(is_id_start('α') && !is_id_start('λ') && !is_id_start('Π'));
    assert!(is_symbol('λ') && is_symbol('→') && is_symbol('('));
    assert!(!is_symbol('x') && !is_symbol('\'') && !is_symbol('"'));
}
