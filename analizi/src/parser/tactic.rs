//! Tactic expressions.

use super::Parser;
use crate::error::Error;
use crate::notation::TacticCmd;
use crate::{Prec, Tactic};
use alloc::boxed::Box;
use analizi_scan::TokenKind;

/// Binding power of the argument of `repeat`.
pub(crate) const REPEAT_PREC: Prec = 30;
/// Left binding power of `;`.
pub(crate) const THEN_PREC: Prec = 20;
/// Left binding power of `|`.
pub(crate) const OR_ELSE_PREC: Prec = 10;

impl<'a> Parser<'a> {
    fn curr_tactic_cmd(&self) -> Option<TacticCmd> {
        match self.curr() {
            TokenKind::Keyword | TokenKind::Identifier => {
                self.env.tables().tactics.get(self.token_text()).cloned()
            }
            _ => None,
        }
    }

    fn curr_tactic_lbp(&self) -> Prec {
        match self.curr_tactic_cmd() {
            Some(TacticCmd::Led(prec, _)) => prec,
            _ => 0,
        }
    }

    pub fn parse_tactic(&mut self, rbp: Prec) -> Result<Tactic, Error> {
        let mut left = self.parse_tactic_nud()?;
        while rbp < self.curr_tactic_lbp() {
            left = match self.curr_tactic_cmd() {
                Some(TacticCmd::Led(_, f)) => {
                    self.next()?;
                    f(self, left)?
                }
                _ => return Err(self.error("invalid tactic expression")),
            };
        }
        Ok(left)
    }

    fn parse_tactic_nud(&mut self) -> Result<Tactic, Error> {
        if self.curr_is_token("(") {
            self.next()?;
            let t = self.parse_tactic(0)?;
            self.check_token_next(")", "invalid tactic expression, ')' expected")?;
            return Ok(t);
        }
        match self.curr_tactic_cmd() {
            Some(TacticCmd::Nud(f)) => {
                self.next()?;
                f(self)
            }
            _ => Err(self.error("invalid tactic expression")),
        }
    }
}

pub(crate) fn exact(p: &mut Parser) -> Result<Tactic, Error> {
    Ok(Tactic::Exact(p.parse_expr(0)?))
}

pub(crate) fn apply(p: &mut Parser) -> Result<Tactic, Error> {
    Ok(Tactic::Apply(p.parse_expr(0)?))
}

pub(crate) fn repeat(p: &mut Parser) -> Result<Tactic, Error> {
    Ok(Tactic::Repeat(Box::new(p.parse_tactic(REPEAT_PREC)?)))
}

pub(crate) fn then(p: &mut Parser, left: Tactic) -> Result<Tactic, Error> {
    Ok(left.then(p.parse_tactic(THEN_PREC)?))
}

pub(crate) fn or_else(p: &mut Parser, left: Tactic) -> Result<Tactic, Error> {
    Ok(left.or_else(p.parse_tactic(OR_ELSE_PREC)?))
}

#[cfg(test)]
mod tests {
    use crate::{Environment, IoState, Parser, Tactic};

    fn tactic(s: &str) -> Tactic {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, s);
        p.scan().unwrap();
        p.parse_tactic(0).unwrap()
    }

    #[test]
    fn precedence() {
        use Tactic::*;
        let t = tactic("assumption ; id | fail");
        let expected = Assumption.then(Id).or_else(Fail);
        assert_eq!(t, expected);

        let t = tactic("assumption ; (id | fail)");
        assert_eq!(t, Assumption.then(Id.or_else(Fail)));

        let t = tactic("repeat assumption ; now");
        assert_eq!(t, Repeat(Box::new(Assumption)).then(Now));
    }

    #[test]
    fn invalid() {
        let mut ios = IoState::sink();
        let mut p = Parser::from_str(Environment::new(), &mut ios, "; id");
        p.scan().unwrap();
        assert!(p.parse_tactic(0).is_err());
    }
}
