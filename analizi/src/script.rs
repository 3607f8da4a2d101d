//! Interface to an embedded scripting engine.

use crate::{Environment, Expr, IoState, Pos};
use alloc::string::String;

/// Runs the code of script blocks `(* ... *)`.
pub trait Scripting {
    /// Run a script block in command position.
    ///
    /// The script may modify the environment.
    fn run(
        &mut self,
        code: &str,
        env: &mut Environment,
        ios: &mut IoState,
        pos: Pos,
    ) -> Result<(), String>;

    /// Evaluate a script block in expression position to an expression.
    fn eval_expr(&mut self, code: &str, env: &Environment, pos: Pos) -> Result<Expr, String> {
        let _ = (code, env, pos);
        Err("scripts cannot produce expressions".into())
    }
}
