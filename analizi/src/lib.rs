#![forbid(unsafe_code)]

//! Front end of a dependently typed prover with extensible notation.
//!
//! # Usage
//!
//! Users communicate with the prover by *commands*, such as
//! declarations of axioms and definitions, queries like `check`, and
//! notation declarations that extend the syntax of expressions.
//! The state of a session is an [`Environment`], which holds
//! the declarations as well as the tables that drive the [`Parser`].
//! Because the tables are part of the environment,
//! notation declared by a command is available to all following commands.
//!
//! The following example declares a few constants together with notation
//! and checks a term that uses the notation.
//!
//! ~~~
//! use analizi::io::SharedBuf;
//! use analizi::{parse_commands, Environment, IoState};
//!
//! let src = r#"
//! axiom nat : Type.{1}
//! axiom zero : nat
//! axiom add : nat -> nat -> nat
//! axiom mul : nat -> nat -> nat
//! infixl `+`:65 := add
//! infixl `*`:70 := mul
//! check zero + zero * zero
//! "#;
//!
//! let out = SharedBuf::new();
//! let mut ios = IoState::new(Box::new(out.clone()), Box::new(std::io::sink()));
//! let mut env = Environment::new();
//! assert!(parse_commands(&mut env, &mut ios, src, "<doc>", None, false)?);
//! assert_eq!(out.contents(), "add zero (mul zero zero) : nat\n");
//! # Ok::<_, analizi::Error>(())
//! ~~~
//!
//! Malformed commands are reported on the diagnostic stream
//! of the [`IoState`], and parsing continues with the next command.
//!
//! # Organisation
//!
//! * Expressions ([`Expr`]) use de Bruijn indices for bound variables and
//!   local constants ([`expr::Local`]) for variables in scope while parsing.
//! * The [`notation`] module defines the tables that
//!   map tokens to parse actions.
//! * The [`parser`] module parses commands, expressions, levels, and tactics.
//! * The [`elab`] and [`kernel`] modules define the interfaces to
//!   the elaborator and to extensions of the normaliser.

extern crate alloc;
#[macro_use]
extern crate log;

pub mod elab;
pub mod env;
pub mod error;
pub mod expr;
pub mod io;
pub mod kernel;
mod level;
mod local;
pub mod locals;
mod name;
pub mod notation;
pub mod parser;
pub mod script;
mod tactic;

pub use analizi_scan::{Pos, Prec};
pub use env::Environment;
pub use error::Error;
pub use expr::Expr;
pub use io::IoState;
pub use level::Level;
pub use local::LocalDecls;
pub use name::Name;
pub use parser::{parse_commands, parse_commands_file, Parser};
pub use tactic::Tactic;
