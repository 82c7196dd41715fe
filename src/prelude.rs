// ABOUTME: Embedded standard library, evaluated into the root environment at startup

use crate::env::Environment;
use crate::error::LispyError;
use std::rc::Rc;

/// The Lispy standard library source, bundled into the binary.
pub const PRELUDE: &str = include_str!("stdlib/prelude.lisp");

/// Evaluate the prelude against `env`. Called once by `new_root_env`,
/// after the intrinsics are registered.
pub fn load(env: &Rc<Environment>) -> Result<(), LispyError> {
    crate::eval_source(PRELUDE, env)?;
    Ok(())
}
