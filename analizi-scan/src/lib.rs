//! Token source for the analizi prover front end.
//!
//! The scanner turns a string into classified tokens.
//! Which symbols and words count as keywords is decided by a [`TokenTable`]
//! that is passed to every call of [`TokenSource::scan`],
//! so that notation declared in the middle of a file
//! is recognised by the rest of the file.
//!
//! Example usage:
//!
//! ~~~
//! use analizi_scan::{Scanner, TokenKind, TokenSource, TokenTable};
//!
//! let mut table = TokenTable::new();
//! table.insert("+", 65);
//! table.insert_command("check");
//!
//! let mut scanner = Scanner::new("check x+1 -- comment", "<doc>");
//! assert_eq!(scanner.scan(&table)?, TokenKind::CommandKeyword);
//! assert_eq!(scanner.scan(&table)?, TokenKind::Identifier);
//! assert_eq!(scanner.scan(&table)?, TokenKind::Keyword);
//! assert_eq!(scanner.token_info().map(|i| i.prec()), Some(65));
//! assert_eq!(scanner.scan(&table)?, TokenKind::Numeral);
//! assert_eq!(scanner.scan(&table)?, TokenKind::Eof);
//! # Ok::<_, analizi_scan::Error>(())
//! ~~~
#![forbid(unsafe_code)]

pub mod lex;
mod pos;
mod scanner;
mod table;

pub use pos::Pos;
pub use scanner::{Error, ErrorKind, Scanner, TokenKind, TokenSource};
pub use table::{Prec, TokenInfo, TokenTable};

pub use num::{BigInt, BigRational};
