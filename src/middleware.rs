//! Transformations applied to the resolved command list
//!
//! Middlewares run once, in registration order, right before the commands are handed
//! to the execution engine. The stack always starts with [`identity`].

use crate::command::Command;
use std::sync::Arc;

/// A transformation of the command list
pub type Middleware = Arc<dyn Fn(Vec<Box<dyn Command>>) -> Vec<Box<dyn Command>> + Send + Sync>;

/// Middleware returning the commands untouched
pub fn identity() -> Middleware {
    Arc::new(|commands| commands)
}

/// Apply every middleware, in order
pub fn apply(middlewares: &[Middleware], commands: Vec<Box<dyn Command>>) -> Vec<Box<dyn Command>> {
    middlewares
        .iter()
        .fold(commands, |commands, middleware| middleware(commands))
}
