//! Universe levels.
//!
//! Levels are parsed by the same precedence climbing as expressions,
//! with `+ n` as only infix operator:
//!
//! ~~~ text
//! l ::= n | _ | u | ( l ) | max l l ... | imax l l ... | l + n
//! ~~~

use super::Parser;
use crate::error::Error;
use crate::{Level, Prec};
use alloc::format;
use alloc::vec::Vec;

/// Left binding power of `+` in levels.
const PLUS_PREC: Prec = 10;

/// Largest number of successors on top of a level, such as `n` in `u+n`.
const MAX_LEVEL_OFFSET: usize = 1024;

impl<'a> Parser<'a> {
    fn curr_level_lbp(&self) -> Prec {
        if self.curr_is_token("+") {
            PLUS_PREC
        } else {
            0
        }
    }

    pub fn parse_level(&mut self, rbp: Prec) -> Result<Level, Error> {
        let mut left = self.parse_level_nud()?;
        while rbp < self.curr_level_lbp() {
            left = self.parse_level_led(left)?;
        }
        Ok(left)
    }

    /// Return true if the current token may start a level.
    fn curr_starts_level(&self) -> bool {
        self.curr_is_identifier()
            || self.curr_is_numeral()
            || self.curr_is_token("(")
            || self.curr_is_token("_")
    }

    fn parse_level_nud(&mut self) -> Result<Level, Error> {
        if self.curr_is_token_or_id("max") {
            self.parse_max_imax(true)
        } else if self.curr_is_token_or_id("imax") {
            self.parse_max_imax(false)
        } else if self.curr_is_token("_") {
            self.next()?;
            Ok(Level::Placeholder)
        } else if self.curr_is_token("(") {
            self.next()?;
            let l = self.parse_level(0)?;
            self.check_token_next(")", "invalid level expression, ')' expected")?;
            Ok(l)
        } else if self.curr_is_numeral() {
            Ok(Level::of_nat(self.parse_level_offset(0)?))
        } else if self.curr_is_identifier() {
            self.parse_level_id()
        } else {
            Err(self.error("invalid level expression"))
        }
    }

    fn parse_max_imax(&mut self, is_max: bool) -> Result<Level, Error> {
        let pos = self.pos();
        let kw = if is_max { "max" } else { "imax" };
        self.next()?;
        let mut ls = Vec::new();
        while self.curr_starts_level() {
            ls.push(self.parse_level(0)?);
        }
        if ls.len() < 2 {
            let msg = format!("invalid level expression, {} must have at least two arguments", kw);
            return Err(Error::parse(msg, pos));
        }
        let l = if is_max {
            Level::max_all(ls)
        } else {
            Level::imax_all(ls)
        };
        l.ok_or_else(|| Error::parse("invalid level expression", pos))
    }

    fn parse_level_id(&mut self) -> Result<Level, Error> {
        let pos = self.pos();
        let id = self.name_val();
        self.next()?;
        if let Some(l) = self.local_level_decls.get(id.as_str()) {
            Ok(l.clone())
        } else if self.env.is_universe(id.as_str()) {
            Ok(Level::Global(id))
        } else if !self.type_use_placeholder {
            let l = Level::Param(id.clone());
            self.add_local_level(id, l.clone());
            Ok(l)
        } else {
            Err(Error::parse(format!("unknown universe '{}'", id), pos))
        }
    }

    fn parse_level_led(&mut self, left: Level) -> Result<Level, Error> {
        self.next()?;
        if !self.curr_is_numeral() {
            let msg = "invalid level expression, right hand side of '+' (numeral) expected";
            return Err(self.error(msg));
        }
        let n = self.parse_level_offset(left.to_offset().1)?;
        Ok(left.add(n))
    }

    /// Parse a numeral to be added to a level with `base` successors.
    fn parse_level_offset(&mut self, base: usize) -> Result<usize, Error> {
        let pos = self.pos();
        let n = self.parse_small_nat()?;
        if base.saturating_add(n) > MAX_LEVEL_OFFSET {
            let msg = format!("invalid level expression, offset exceeds {}", MAX_LEVEL_OFFSET);
            return Err(Error::parse(msg, pos));
        }
        Ok(n)
    }
}
