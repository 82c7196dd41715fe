//! # Built-in Functions Module
//!
//! The intrinsics registered into the root environment, organized by
//! category. Each category is a sub-module with its own register function.
//!
//! - **[arithmetic]**: `+ - * / % #` plus `rand` and `number`
//! - **[comparison]**: `= < <= > >=`
//! - **[logic]**: `and or not`
//! - **[lists]**: `car cdr cons list quote applyTo`
//! - **[strings]**: `str symbol readstring`
//! - **[types]**: `type quote?`
//! - **[console]**: `println readline`
//!
//! Everything else the language offers is defined in Lispy itself by the
//! prelude, on top of these.

use crate::env::Environment;
use std::rc::Rc;

pub mod arithmetic;
pub mod comparison;
pub mod console;
pub mod lists;
pub mod logic;
pub mod strings;
pub mod types;

/// Register every intrinsic in the environment.
pub fn register_builtins(env: &Rc<Environment>) {
    arithmetic::register(env);
    comparison::register(env);
    logic::register(env);
    lists::register(env);
    strings::register(env);
    types::register(env);
    console::register(env);
}
